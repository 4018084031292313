use std::sync::Arc;

use async_trait::async_trait;

use crate::profile::application::ports::outgoing::{UserRepository, UserRepositoryError};
use crate::profile::domain::entities::UserInfo;
use crate::shared::codec;
use crate::shared::identity::IdentityProvider;
use crate::shared::store::{DocumentStore, StorePath};

const USER_COLLECTION: &str = "users";

/// Profile gateway over the remote keyed document store; one aggregate
/// per user at `users/{uid}`.
pub struct StoreUserRepository {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl StoreUserRepository {
    pub fn new(store: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    fn user_path(uid: &str) -> StorePath {
        StorePath::new([USER_COLLECTION, uid])
    }
}

#[async_trait]
impl UserRepository for StoreUserRepository {
    async fn fetch(&self, uid: &str) -> Result<Option<UserInfo>, UserRepositoryError> {
        let Some(value) = self.store.read(&Self::user_path(uid)).await? else {
            return Ok(None);
        };
        Ok(Some(codec::decode(value)?))
    }

    async fn fetch_current(&self) -> Result<Option<UserInfo>, UserRepositoryError> {
        match self.identity.current_uid() {
            Some(uid) => self.fetch(&uid).await,
            None => Ok(None),
        }
    }

    async fn save(&self, user_info: &UserInfo, uid: &str) -> Result<(), UserRepositoryError> {
        self.store
            .write(&Self::user_path(uid), codec::encode(user_info))
            .await?;
        Ok(())
    }

    async fn save_for_current_user(
        &self,
        user_info: &UserInfo,
    ) -> Result<(), UserRepositoryError> {
        match self.identity.current_uid() {
            Some(uid) => self.save(user_info, &uid).await,
            None => Ok(()),
        }
    }
}
