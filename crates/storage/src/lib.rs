//! Designbase object storage
//!
//! Provides write-once blob storage for uploaded assets with support for:
//! - S3-compatible buckets for production (AWS or custom endpoints)
//! - In-memory mock storage for testing and development
//! - Public URL resolution for publicly readable buckets
//! - Storage key sanitization helpers

pub mod keys;
pub mod mock;
pub mod s3;

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage configuration error: {0}")]
    Configuration(String),

    #[error("Object already exists: {key}")]
    AlreadyExists { key: String },

    #[error("Upload failed for {key}: {message}")]
    Upload { key: String, message: String },
}

/// Options for a single upload.
///
/// `overwrite: false` gives write-once-per-key semantics: the upload fails
/// if the key already exists in the bucket.
#[derive(Debug, Clone, Copy)]
pub struct UploadOptions {
    pub overwrite: bool,
    pub cache_control: Option<Duration>,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            cache_control: None,
        }
    }
}

/// Object storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider (s3, mock)
    pub provider: String,
    /// Bucket holding uploaded objects
    pub bucket: String,
    /// Region for the S3 provider
    pub region: String,
    /// Custom endpoint for S3-compatible services (path-style addressing)
    pub endpoint: Option<String>,
    /// Base URL under which bucket objects are publicly readable
    pub public_base_url: String,
}

impl StorageConfig {
    /// Create storage config from environment variables.
    pub fn from_env() -> Result<Self, StorageError> {
        let provider = std::env::var("STORAGE_PROVIDER").unwrap_or_else(|_| "mock".to_string());

        let bucket = std::env::var("STORAGE_BUCKET")
            .unwrap_or_else(|_| "designbase-assets".to_string());

        let region = std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string());

        let endpoint = std::env::var("STORAGE_ENDPOINT").ok();

        let public_base_url = std::env::var("STORAGE_PUBLIC_BASE_URL").unwrap_or_default();
        if provider != "mock" && public_base_url.is_empty() {
            return Err(StorageError::Configuration(
                "STORAGE_PUBLIC_BASE_URL is required for the s3 provider".to_string(),
            ));
        }

        Ok(Self {
            provider,
            bucket,
            region,
            endpoint,
            public_base_url,
        })
    }

    /// Public URL for an object key, assuming the bucket is publicly
    /// readable. No signing, no expiry.
    pub fn public_url(&self, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.public_base_url.trim_end_matches('/'),
            self.bucket,
            key
        )
    }
}

/// Object storage trait for different implementations.
#[async_trait::async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload raw bytes at the given key.
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        options: &UploadOptions,
    ) -> Result<(), StorageError>;

    /// Resolve the stable public URL for an object key.
    fn public_url(&self, key: &str) -> String;
}

/// Factory for creating ObjectStorage implementations.
pub struct StorageFactory;

impl StorageFactory {
    /// Create an ObjectStorage based on configuration.
    pub async fn create(config: StorageConfig) -> Result<Box<dyn ObjectStorage>, StorageError> {
        match config.provider.as_str() {
            "s3" => {
                tracing::info!(bucket = %config.bucket, "Creating S3 object storage");
                Ok(Box::new(s3::S3ObjectStorage::new(&config).await?))
            }
            "mock" => {
                tracing::info!("Creating mock object storage");
                Ok(Box::new(mock::MockObjectStorage::new()))
            }
            provider => Err(StorageError::Configuration(format!(
                "Unknown storage provider: {}. Supported providers: s3, mock",
                provider
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_upload_options_default_is_write_once() {
        let options = UploadOptions::default();
        assert!(!options.overwrite);
        assert!(options.cache_control.is_none());
    }

    #[test]
    fn test_config_public_url_joins_base_bucket_and_key() {
        let config = StorageConfig {
            provider: "s3".to_string(),
            bucket: "designbase-assets".to_string(),
            region: "us-east-1".to_string(),
            endpoint: None,
            public_base_url: "https://cdn.designbase.app/storage/".to_string(),
        };
        assert_eq!(
            config.public_url("p1/2026-08-06_tok_file.png"),
            "https://cdn.designbase.app/storage/designbase-assets/p1/2026-08-06_tok_file.png"
        );
    }

    #[test]
    #[serial]
    fn test_config_from_env_defaults_to_mock() {
        std::env::remove_var("STORAGE_PROVIDER");
        std::env::remove_var("STORAGE_BUCKET");
        std::env::remove_var("STORAGE_PUBLIC_BASE_URL");

        let config = StorageConfig::from_env().unwrap();
        assert_eq!(config.provider, "mock");
        assert_eq!(config.bucket, "designbase-assets");
    }

    #[test]
    #[serial]
    fn test_config_from_env_s3_requires_public_base_url() {
        std::env::set_var("STORAGE_PROVIDER", "s3");
        std::env::remove_var("STORAGE_PUBLIC_BASE_URL");

        let result = StorageConfig::from_env();
        assert!(result.is_err());

        std::env::remove_var("STORAGE_PROVIDER");
    }

    #[tokio::test]
    async fn test_factory_mock_succeeds() {
        let config = StorageConfig {
            provider: "mock".to_string(),
            bucket: "designbase-assets".to_string(),
            region: "us-east-1".to_string(),
            endpoint: None,
            public_base_url: String::new(),
        };
        let result = StorageFactory::create(config).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_factory_unknown_provider() {
        let config = StorageConfig {
            provider: "ftp".to_string(),
            bucket: "designbase-assets".to_string(),
            region: "us-east-1".to_string(),
            endpoint: None,
            public_base_url: String::new(),
        };
        let err = match StorageFactory::create(config).await {
            Err(e) => e,
            Ok(_) => panic!("Expected error for unknown provider"),
        };
        assert!(err.to_string().contains("Unknown storage provider: ftp"));
    }
}
