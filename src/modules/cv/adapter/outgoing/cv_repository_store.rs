use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::cv::application::ports::outgoing::{CVRepository, CVRepositoryError};
use crate::cv::domain::entities::CVInfo;
use crate::shared::codec;
use crate::shared::identity::IdentityProvider;
use crate::shared::store::{DocumentStore, StorePath};

const CV_COLLECTION: &str = "cvs";

/// CV gateway over the remote keyed document store.
///
/// Aggregates live at `cvs/{uid}/{cv.uuid}`. Reads decode the whole
/// collection subtree at once, so one bad child fails the fetch.
pub struct StoreCVRepository {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl StoreCVRepository {
    pub fn new(store: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    fn collection_path(uid: &str) -> StorePath {
        StorePath::new([CV_COLLECTION, uid])
    }
}

#[async_trait]
impl CVRepository for StoreCVRepository {
    async fn fetch_all(&self, uid: &str) -> Result<Vec<CVInfo>, CVRepositoryError> {
        let Some(value) = self.store.read(&Self::collection_path(uid)).await? else {
            return Ok(Vec::new());
        };

        let children: BTreeMap<String, CVInfo> = codec::decode(value)?;
        Ok(children.into_values().collect())
    }

    async fn fetch_all_of_current_user(&self) -> Result<Vec<CVInfo>, CVRepositoryError> {
        match self.identity.current_uid() {
            Some(uid) => self.fetch_all(&uid).await,
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, cv: &CVInfo, uid: &str) -> Result<(), CVRepositoryError> {
        let path = Self::collection_path(uid).child(&cv.uuid);
        self.store.write(&path, codec::encode(cv)).await?;
        Ok(())
    }

    async fn save_for_current_user(&self, cv: &CVInfo) -> Result<(), CVRepositoryError> {
        match self.identity.current_uid() {
            Some(uid) => self.save(cv, &uid).await,
            None => Ok(()),
        }
    }

    async fn save_title(
        &self,
        title: &str,
        last_modified: &str,
        uid: &str,
        cv_uuid: &str,
    ) -> Result<(), CVRepositoryError> {
        let path = Self::collection_path(uid).child(cv_uuid);
        let mut fields = Map::new();
        fields.insert("title".to_string(), Value::String(title.to_string()));
        fields.insert(
            "lastModified".to_string(),
            Value::String(last_modified.to_string()),
        );
        self.store.merge(&path, fields).await?;
        Ok(())
    }

    async fn save_title_for_current_user(
        &self,
        title: &str,
        last_modified: &str,
        cv_uuid: &str,
    ) -> Result<(), CVRepositoryError> {
        match self.identity.current_uid() {
            Some(uid) => self.save_title(title, last_modified, &uid, cv_uuid).await,
            None => Ok(()),
        }
    }

    async fn remove(&self, cv_uuid: &str, uid: &str) -> Result<(), CVRepositoryError> {
        let path = Self::collection_path(uid).child(cv_uuid);
        self.store.delete(&path).await?;
        Ok(())
    }

    async fn remove_for_current_user(&self, cv_uuid: &str) -> Result<(), CVRepositoryError> {
        match self.identity.current_uid() {
            Some(uid) => self.remove(cv_uuid, &uid).await,
            None => Ok(()),
        }
    }
}
