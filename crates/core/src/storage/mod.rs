//! Storage gateway for the object store being normalized.
//!
//! This module provides the `ObjectStore` trait and an S3 implementation.
//! The gateway is deliberately thin: list one page, get one object, put one
//! object. Every call is a fresh round trip, nothing is cached.
//!
//! Listing is exposed as a lazy page cursor (`list_pages`) so a bucket with
//! millions of keys never has to be materialized in memory.
//!
//! # Example
//!
//! ```ignore
//! use objconv_core::storage::{list_pages, S3ObjectStore, StorageConfig};
//!
//! let store = S3ObjectStore::connect(StorageConfig::new("media", "us-east-1")).await;
//!
//! let mut pages = list_pages(&store);
//! while let Some(page) = pages.next_page().await {
//!     for object in page?.objects {
//!         println!("{}", object.key);
//!     }
//! }
//! ```

mod config;
mod cursor;
mod error;
mod s3;
mod traits;
mod types;

pub use config::{StorageConfig, MAX_PAGE_SIZE};
pub use cursor::{list_pages, PageCursor};
pub use error::StorageError;
pub use s3::S3ObjectStore;
pub use traits::ObjectStore;
pub use types::{ImagePayload, ObjectDescriptor, ObjectPage};
