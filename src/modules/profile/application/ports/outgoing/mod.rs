pub mod image_storage;
pub mod user_repository;

pub use image_storage::{user_profile_image_path, ImageStorage, ImageStorageError};
pub use user_repository::{UserRepository, UserRepositoryError};
