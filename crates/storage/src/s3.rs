//! S3 object storage implementation
//!
//! Real client for AWS S3 and S3-compatible services. Custom endpoints
//! use path-style addressing. Write-once uploads are enforced with a
//! conditional `If-None-Match: *` request.

use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use crate::{ObjectStorage, StorageConfig, StorageError, UploadOptions};

/// S3-backed object storage.
pub struct S3ObjectStorage {
    client: Client,
    config: StorageConfig,
}

impl S3ObjectStorage {
    /// Create a new S3 client from configuration.
    pub async fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        if config.bucket.is_empty() {
            return Err(StorageError::Configuration(
                "STORAGE_BUCKET is required for the s3 provider".to_string(),
            ));
        }

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()));
        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        let client = if config.endpoint.is_some() {
            let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
                .force_path_style(true)
                .build();
            Client::from_conf(s3_config)
        } else {
            Client::new(&sdk_config)
        };

        Ok(Self {
            client,
            config: config.clone(),
        })
    }
}

#[async_trait::async_trait]
impl ObjectStorage for S3ObjectStorage {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        options: &UploadOptions,
    ) -> Result<(), StorageError> {
        let size = bytes.len();

        let mut request = self
            .client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .body(ByteStream::from(bytes));

        if let Some(cache) = options.cache_control {
            request = request.cache_control(format!("max-age={}", cache.as_secs()));
        }
        if !options.overwrite {
            request = request.if_none_match("*");
        }

        request.send().await.map_err(|e| {
            // A failed If-None-Match precondition means the key is taken.
            if e.raw_response().map(|r| r.status().as_u16()) == Some(412) {
                StorageError::AlreadyExists {
                    key: key.to_string(),
                }
            } else {
                StorageError::Upload {
                    key: key.to_string(),
                    message: DisplayErrorContext(&e).to_string(),
                }
            }
        })?;

        tracing::debug!(key, size, "Object uploaded to S3");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        self.config.public_url(key)
    }
}
