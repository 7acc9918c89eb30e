//! Bill document storage on Apache OpenDAL.
//!
//! Bills are stored under `{trip_id}/{uuid}.{ext}` and the key is kept on
//! the expense row. Readers never get the key itself, only a short-lived
//! presigned URL, and only from backends that can presign (S3-compatible
//! and Azure Blob). The local filesystem and memory backends serve
//! development and tests.

mod config;
mod error;
mod service;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::{StorageService, bill_key, sanitize_filename};
