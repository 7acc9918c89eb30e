//! Bill storage errors.

use thiserror::Error;

/// Errors raised while storing or serving bill documents.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Bill has no content.
    #[error("bill file is empty")]
    EmptyBill,

    /// Bill is larger than the configured limit.
    #[error("bill is {size} bytes, limit is {max} bytes")]
    BillTooLarge {
        /// Uploaded size.
        size: u64,
        /// Configured limit.
        max: u64,
    },

    /// Content type is not an accepted bill format.
    #[error("bills of type '{content_type}' are not accepted")]
    UnsupportedBillType {
        /// The rejected content type.
        content_type: String,
    },

    /// No object under the key.
    #[error("no bill stored at {key}")]
    NotFound {
        /// The missing key.
        key: String,
    },

    /// The backend cannot hand out temporary URLs.
    #[error("storage backend cannot issue temporary URLs")]
    PresignNotSupported,

    /// Backend could not be built from settings.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// Backend call failed.
    #[error("storage operation failed: {0}")]
    Operation(String),
}

impl StorageError {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an operation error.
    #[must_use]
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }

    /// True when the bill itself was refused, as opposed to the backend
    /// failing. Rejected bills are the uploader's to fix.
    #[must_use]
    pub fn is_rejected_bill(&self) -> bool {
        matches!(
            self,
            Self::EmptyBill | Self::BillTooLarge { .. } | Self::UnsupportedBillType { .. }
        )
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::NotFound {
                key: err.to_string(),
            },
            opendal::ErrorKind::Unsupported => Self::PresignNotSupported,
            _ => Self::Operation(err.to_string()),
        }
    }
}
