//! Locate, download and restore streamed MySQL backups kept in an
//! S3-compatible object store.

pub mod catalog;
pub mod config;
pub mod connection;
pub mod errors;
pub mod list;
pub mod logging;
pub mod restore;
pub mod selector;
pub mod shared;
pub mod transfer;
