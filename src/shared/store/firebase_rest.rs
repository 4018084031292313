use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{DocumentStore, StoreError, StorePath};
use crate::config::SyncConfig;

/// Realtime Database REST adapter.
///
/// Paths map to `{base}/{path}.json`. `merge` uses PATCH, which the
/// database applies to the target object atomically, and a JSON `null`
/// body on read means "nothing stored here".
#[derive(Debug, Clone)]
pub struct RestDocumentStore {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl RestDocumentStore {
    pub fn new(base_url: impl Into<String>, auth_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(
            config.database_url.clone(),
            config.database_auth_token.clone(),
        )
    }

    fn endpoint(&self, path: &StorePath) -> String {
        match &self.auth_token {
            Some(token) => format!("{}/{}.json?auth={}", self.base_url, path, token),
            None => format!("{}/{}.json", self.base_url, path),
        }
    }
}

fn request_error(err: reqwest::Error) -> StoreError {
    StoreError::Request(err.to_string())
}

#[async_trait]
impl DocumentStore for RestDocumentStore {
    async fn read(&self, path: &StorePath) -> Result<Option<Value>, StoreError> {
        let value: Value = self
            .client
            .get(self.endpoint(path))
            .send()
            .await
            .map_err(request_error)?
            .error_for_status()
            .map_err(request_error)?
            .json()
            .await
            .map_err(request_error)?;

        if value.is_null() {
            Ok(None)
        } else {
            Ok(Some(value))
        }
    }

    async fn write(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        self.client
            .put(self.endpoint(path))
            .json(&value)
            .send()
            .await
            .map_err(request_error)?
            .error_for_status()
            .map_err(request_error)?;

        Ok(())
    }

    async fn merge(&self, path: &StorePath, fields: Map<String, Value>) -> Result<(), StoreError> {
        self.client
            .patch(self.endpoint(path))
            .json(&Value::Object(fields))
            .send()
            .await
            .map_err(request_error)?
            .error_for_status()
            .map_err(request_error)?;

        Ok(())
    }

    async fn delete(&self, path: &StorePath) -> Result<(), StoreError> {
        self.client
            .delete(self.endpoint(path))
            .send()
            .await
            .map_err(request_error)?
            .error_for_status()
            .map_err(request_error)?;

        Ok(())
    }
}
