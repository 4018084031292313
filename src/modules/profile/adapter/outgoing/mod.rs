mod image_storage_gcs;
mod user_repository_store;

pub use image_storage_gcs::GcsImageStorage;
pub use user_repository_store::StoreUserRepository;
