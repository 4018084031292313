use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::config::SyncConfig;
use crate::profile::application::ports::outgoing::{ImageStorage, ImageStorageError};

/// TTL for signed upload URLs.
const SIGNED_URL_TTL: Duration = Duration::from_secs(15 * 60);

/// google-cloud-storage uses a bucket resource name format:
/// `projects/_/buckets/{bucket}`.
fn bucket_resource(bucket: &str) -> String {
    format!("projects/_/buckets/{}", bucket)
}

fn map_storage_error(msg: &str) -> ImageStorageError {
    let m = msg.to_lowercase();

    if m.contains("permission") || m.contains("forbidden") || m.contains("denied") {
        ImageStorageError::AccessDenied
    } else if m.contains("404") || m.contains("not found") {
        ImageStorageError::NotFound
    } else {
        ImageStorageError::Unavailable(msg.to_string())
    }
}

/// Internal seam to keep the adapter testable without mocking
/// google-cloud-storage types/streams.
#[async_trait]
trait GcsClient: Send + Sync {
    async fn sign_put_url(
        &self,
        bucket_resource: &str,
        object_name: &str,
        ttl: Duration,
    ) -> Result<String, String>;

    async fn download_object_bytes(
        &self,
        bucket_resource: &str,
        object_name: &str,
    ) -> Result<Vec<u8>, String>;
}

#[cfg(test)]
struct ArcGcsClient(Arc<dyn GcsClient>);

#[cfg(test)]
#[async_trait]
impl GcsClient for ArcGcsClient {
    async fn sign_put_url(
        &self,
        bucket_resource: &str,
        object_name: &str,
        ttl: Duration,
    ) -> Result<String, String> {
        self.0.sign_put_url(bucket_resource, object_name, ttl).await
    }

    async fn download_object_bytes(
        &self,
        bucket_resource: &str,
        object_name: &str,
    ) -> Result<Vec<u8>, String> {
        self.0
            .download_object_bytes(bucket_resource, object_name)
            .await
    }
}

/// Profile-image storage over the app's GCS bucket: uploads go through a
/// signed PUT URL, downloads stream the object bytes. The client is
/// initialized lazily on first use.
pub struct GcsImageStorage {
    client: Arc<OnceCell<Box<dyn GcsClient>>>,
    http: reqwest::Client,
    bucket: String,
    signed_url_ttl: Duration,
}

impl GcsImageStorage {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            client: Arc::new(OnceCell::new()),
            http: reqwest::Client::new(),
            bucket: bucket.into(),
            signed_url_ttl: SIGNED_URL_TTL,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.profile_image_bucket.clone())
    }

    async fn get_client(&self) -> Result<&dyn GcsClient, ImageStorageError> {
        self.client
            .get_or_try_init(|| async {
                let real_client = RealGcsClient::new()
                    .await
                    .map_err(|e| ImageStorageError::Unavailable(e.to_string()))?;
                Ok(Box::new(real_client) as Box<dyn GcsClient>)
            })
            .await
            .map(|boxed| &**boxed)
    }

    #[cfg(test)]
    fn with_client(client: Arc<dyn GcsClient>) -> Self {
        let once = OnceCell::new();
        let _ = once.set(Box::new(ArcGcsClient(client)) as Box<dyn GcsClient>);

        Self {
            client: Arc::new(once),
            http: reqwest::Client::new(),
            bucket: "test-bucket".to_string(),
            signed_url_ttl: SIGNED_URL_TTL,
        }
    }
}

#[async_trait]
impl ImageStorage for GcsImageStorage {
    async fn upload(&self, object_path: &str, data: Vec<u8>) -> Result<String, ImageStorageError> {
        let client = self.get_client().await?;

        let url = client
            .sign_put_url(
                &bucket_resource(&self.bucket),
                object_path,
                self.signed_url_ttl,
            )
            .await
            .map_err(|e| map_storage_error(&e))?;

        self.http
            .put(url)
            .body(data)
            .send()
            .await
            .map_err(|e| ImageStorageError::Unavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| map_storage_error(&e.to_string()))?;

        Ok(object_path.to_string())
    }

    async fn download(&self, object_path: &str) -> Result<Vec<u8>, ImageStorageError> {
        let client = self.get_client().await?;

        client
            .download_object_bytes(&bucket_resource(&self.bucket), object_path)
            .await
            .map_err(|e| map_storage_error(&e))
    }
}

// ============================================================================
// Real Google Cloud Storage client (google-cloud-storage)
// ============================================================================

struct RealGcsClient {
    storage: google_cloud_storage::client::Storage,
    signer: google_cloud_auth::signer::Signer,
}

impl RealGcsClient {
    async fn new() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let storage = google_cloud_storage::client::Storage::builder()
            .build()
            .await
            .map_err(|e| {
                tracing::error!("failed to build GCS storage client: {:?}", e);
                e
            })?;

        let signer = google_cloud_auth::credentials::Builder::default()
            .build_signer()
            .map_err(|e| {
                tracing::error!("failed to build GCS signer: {:?}", e);
                e
            })?;

        Ok(Self { storage, signer })
    }
}

#[async_trait]
impl GcsClient for RealGcsClient {
    async fn sign_put_url(
        &self,
        bucket_resource: &str,
        object_name: &str,
        ttl: Duration,
    ) -> Result<String, String> {
        let url = google_cloud_storage::builder::storage::SignedUrlBuilder::for_object(
            bucket_resource.to_string(),
            object_name.to_string(),
        )
        .with_method(google_cloud_storage::http::Method::PUT)
        .with_expiration(ttl)
        .sign_with(&self.signer)
        .await
        .map_err(|e| e.to_string())?;

        Ok(url)
    }

    async fn download_object_bytes(
        &self,
        bucket_resource: &str,
        object_name: &str,
    ) -> Result<Vec<u8>, String> {
        let mut stream = self
            .storage
            .read_object(bucket_resource.to_string(), object_name.to_string())
            .send()
            .await
            .map_err(|e| e.to_string())?;

        use futures::StreamExt;

        let mut out: Vec<u8> = Vec::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| e.to_string())?;
            out.extend_from_slice(&chunk);
        }

        Ok(out)
    }
}
