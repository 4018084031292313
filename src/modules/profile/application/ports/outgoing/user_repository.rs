use async_trait::async_trait;

use crate::profile::domain::entities::UserInfo;
use crate::shared::codec::DecodeError;
use crate::shared::store::StoreError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum UserRepositoryError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Gateway between the profile aggregate and the remote keyed store.
///
/// `fetch_current` and `save_for_current_user` resolve the authenticated
/// identity first; with nobody signed in they return `None` / do nothing,
/// indistinguishable from "no data".
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn fetch(&self, uid: &str) -> Result<Option<UserInfo>, UserRepositoryError>;

    async fn fetch_current(&self) -> Result<Option<UserInfo>, UserRepositoryError>;

    /// Writes the whole aggregate at `users/{uid}`.
    async fn save(&self, user_info: &UserInfo, uid: &str) -> Result<(), UserRepositoryError>;

    async fn save_for_current_user(&self, user_info: &UserInfo)
        -> Result<(), UserRepositoryError>;
}
