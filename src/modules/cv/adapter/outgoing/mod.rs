mod cv_repository_store;
pub use cv_repository_store::StoreCVRepository;
