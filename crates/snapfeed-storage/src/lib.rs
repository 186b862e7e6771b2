//! Snapfeed Image Storage
//!
//! This crate stores uploaded post images and hands back the filename
//! the post record refers to.

pub mod backend;
pub mod error;
pub mod local;

pub use backend::ImageStore;
pub use error::StorageError;
pub use local::LocalImageStore;
