//! examkit-stores: Backends for exam lookup, result storage, and caching.
//!
//! Implements the `ExamSource`, `ResultStore`, and `KeyValueCache` traits
//! over HTTP, local directories, and memory, plus the config that picks
//! between them.

pub mod config;
pub mod directory;
pub mod error;
pub mod file_cache;
pub mod http;
pub mod mock;

pub use config::{create_exam_source, create_result_store, load_config, ExamkitConfig};
pub use error::StoreError;
pub use file_cache::FileCache;
