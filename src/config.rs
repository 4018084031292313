use std::env;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set in the environment")]
    MissingVar(&'static str),
}

/// Connection settings for the remote store and the profile-image bucket.
///
/// Loaded from `.env.{RUST_ENV}` when present, falling back to `.env`.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Realtime Database base URL, e.g. `https://<project>.firebaseio.com`.
    pub database_url: String,
    /// Optional database secret appended as the `auth` query parameter.
    pub database_auth_token: Option<String>,
    /// GCS bucket holding profile images.
    pub profile_image_bucket: String,
}

impl SyncConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let env_file = format!(".env.{}", env_name);
        if dotenvy::from_filename(&env_file).is_err() {
            dotenvy::dotenv().ok();
        }

        let database_url = env::var("FIREBASE_DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("FIREBASE_DATABASE_URL"))?;
        let database_auth_token = env::var("FIREBASE_DATABASE_SECRET").ok();
        let profile_image_bucket = env::var("PROFILE_IMAGE_BUCKET")
            .map_err(|_| ConfigError::MissingVar("PROFILE_IMAGE_BUCKET"))?;

        Ok(Self {
            database_url: database_url.trim_end_matches('/').to_string(),
            database_auth_token,
            profile_image_bucket,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_database_url_is_reported() {
        env::remove_var("FIREBASE_DATABASE_URL");
        env::set_var("PROFILE_IMAGE_BUCKET", "cv-sync-profile-images");

        let result = SyncConfig::from_env();

        assert!(matches!(
            result,
            Err(ConfigError::MissingVar("FIREBASE_DATABASE_URL"))
        ));
    }
}
