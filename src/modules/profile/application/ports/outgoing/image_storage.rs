use async_trait::async_trait;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ImageStorageError {
    #[error("access to the object was denied")]
    AccessDenied,

    #[error("object not found")]
    NotFound,

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Blob storage boundary for profile images, addressed by path string.
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Uploads the bytes and returns the path they were stored under.
    async fn upload(&self, object_path: &str, data: Vec<u8>) -> Result<String, ImageStorageError>;

    async fn download(&self, object_path: &str) -> Result<Vec<u8>, ImageStorageError>;
}

/// Canonical location of a user's profile image.
pub fn user_profile_image_path(uid: &str) -> String {
    format!("profile_images/{}", uid)
}
