use async_trait::async_trait;

use crate::cv::domain::entities::CVInfo;
use crate::shared::codec::DecodeError;
use crate::shared::store::StoreError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum CVRepositoryError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Gateway between CV aggregates and the remote keyed store.
///
/// The "current user" variants resolve the authenticated identity first
/// and short-circuit to an empty result (or a silent no-op for writes)
/// when nobody is signed in. Callers cannot tell "not signed in" apart
/// from "no data"; that is the documented contract.
#[async_trait]
pub trait CVRepository: Send + Sync {
    /// All CVs under the owner's collection; an absent collection is an
    /// empty list, a single child that fails to decode fails the whole
    /// fetch.
    async fn fetch_all(&self, uid: &str) -> Result<Vec<CVInfo>, CVRepositoryError>;

    async fn fetch_all_of_current_user(&self) -> Result<Vec<CVInfo>, CVRepositoryError>;

    /// Writes the whole aggregate at `cvs/{uid}/{cv.uuid}`.
    async fn save(&self, cv: &CVInfo, uid: &str) -> Result<(), CVRepositoryError>;

    async fn save_for_current_user(&self, cv: &CVInfo) -> Result<(), CVRepositoryError>;

    /// Updates `title` and `lastModified` of one CV in a single atomic
    /// multi-field write.
    async fn save_title(
        &self,
        title: &str,
        last_modified: &str,
        uid: &str,
        cv_uuid: &str,
    ) -> Result<(), CVRepositoryError>;

    async fn save_title_for_current_user(
        &self,
        title: &str,
        last_modified: &str,
        cv_uuid: &str,
    ) -> Result<(), CVRepositoryError>;

    async fn remove(&self, cv_uuid: &str, uid: &str) -> Result<(), CVRepositoryError>;

    async fn remove_for_current_user(&self, cv_uuid: &str) -> Result<(), CVRepositoryError>;
}
