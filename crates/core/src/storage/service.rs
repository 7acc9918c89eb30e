//! Storage service implementation using Apache OpenDAL.

use std::time::Duration;

use bytes::Bytes;
use logisco_shared::types::TripId;
use opendal::{Operator, services};
use tracing::{debug, warn};
use uuid::Uuid;

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;
use crate::trip::store::BillStore;

/// Object storage for bill documents.
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// In-memory storage with default limits.
    ///
    /// # Errors
    ///
    /// Returns an error if the memory backend cannot be initialized.
    pub fn in_memory() -> Result<Self, StorageError> {
        Self::from_config(StorageConfig::new(StorageProvider::Memory))
    }

    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        let config_err = |e: opendal::Error| StorageError::configuration(e.to_string());

        let operator = match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);
                Operator::new(builder).map_err(config_err)?.finish()
            }
            StorageProvider::AzureBlob {
                account,
                access_key,
                container,
            } => {
                let builder = services::Azblob::default()
                    .account_name(account)
                    .account_key(access_key)
                    .container(container);
                Operator::new(builder).map_err(config_err)?.finish()
            }
            StorageProvider::LocalFs { root } => {
                let root = root
                    .to_str()
                    .ok_or_else(|| StorageError::configuration("invalid path"))?;
                Operator::new(services::Fs::default().root(root))
                    .map_err(config_err)?
                    .finish()
            }
            StorageProvider::Memory => Operator::new(services::Memory::default())
                .map_err(config_err)?
                .finish(),
        };
        Ok(operator)
    }

    /// Check a bill against the size limit and accepted formats.
    ///
    /// # Errors
    ///
    /// `EmptyBill`, `BillTooLarge` or `UnsupportedBillType`.
    pub fn validate_upload(&self, content_type: &str, size: u64) -> Result<(), StorageError> {
        if size == 0 {
            return Err(StorageError::EmptyBill);
        }
        let max = self.config.max_file_size;
        if size > max {
            return Err(StorageError::BillTooLarge { size, max });
        }
        if !self.config.is_mime_type_allowed(content_type) {
            return Err(StorageError::UnsupportedBillType {
                content_type: content_type.to_string(),
            });
        }
        Ok(())
    }

    /// Write a validated object.
    ///
    /// # Errors
    ///
    /// Returns an error if validation or the write fails.
    pub async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), StorageError> {
        self.validate_upload(content_type, bytes.len() as u64)?;
        if self.operator.info().full_capability().write_with_content_type {
            self.operator
                .write_with(key, bytes)
                .content_type(content_type)
                .await?;
        } else {
            self.operator.write(key, bytes).await?;
        }
        debug!(key = %key, provider = self.provider_name(), "Stored object");
        Ok(())
    }

    /// Generate a presigned read URL.
    ///
    /// # Errors
    ///
    /// Returns `PresignNotSupported` for providers without presigning
    /// (local filesystem, memory).
    pub async fn presign_download(&self, key: &str, ttl_secs: u64) -> Result<String, StorageError> {
        let presigned = self
            .operator
            .presign_read(key, Duration::from_secs(ttl_secs))
            .await?;
        Ok(presigned.uri().to_string())
    }

    /// Delete an object. Deleting a missing object succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.operator.delete(key).await.map_err(StorageError::from)
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

impl BillStore for StorageService {
    async fn upload(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError> {
        self.put(key, bytes, content_type).await?;
        Ok(key.to_string())
    }

    async fn temporary_url(&self, reference: &str, ttl_secs: u64) -> Option<String> {
        match self.presign_download(reference, ttl_secs).await {
            Ok(url) => Some(url),
            Err(StorageError::PresignNotSupported) => None,
            Err(e) => {
                warn!(reference = %reference, error = %e, "Failed to presign bill");
                None
            }
        }
    }

    async fn remove(&self, reference: &str) -> Result<(), StorageError> {
        self.delete(reference).await
    }
}

/// Storage key for a new bill: `{trip_id}/{random uuid}.{ext}`.
///
/// The extension comes from the sanitized original filename; files without
/// one are stored as `.bin`.
#[must_use]
pub fn bill_key(trip_id: TripId, filename: &str) -> String {
    let sanitized = sanitize_filename(filename);
    let ext = sanitized
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8)
        .unwrap_or_else(|| "bin".to_string());
    format!("{trip_id}/{}.{ext}", Uuid::new_v4())
}

/// Sanitize a filename for use in a storage key.
///
/// Only allows ASCII alphanumeric characters, dots, hyphens, and underscores.
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
