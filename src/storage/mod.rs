//! Storage Module
//!
//! This module provides the document store, the index table, the lazy TTL
//! model and the persistence backends.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Database                             │
//! │   documents: key -> Record      indices: name -> bucket     │
//! └──────────────────────────────┬──────────────────────────────┘
//!                                │ load once / save after writes
//!                                ▼
//!              ┌───────────────────────────────────┐
//!              │   Persistence (JSON file, memory) │
//!              └───────────────────────────────────┘
//! ```
//!
//! ## Features
//!
//! - **Write-time snapshots**: each record remembers its field names and values
//! - **Lazy TTL**: expiry is computed on read and never deletes anything
//! - **Range scans**: inclusive numeric filter over every document
//!
//! ## Example
//!
//! ```
//! use indexkv::storage::{Database, Record, TtlStatus};
//! use serde_json::json;
//!
//! let mut db = Database::new();
//! let payload = json!({"name": "Ariz"}).as_object().cloned().unwrap();
//! db.insert("user:1".to_string(), Record::new(payload, Some(1000), 0));
//!
//! let record = db.get("user:1").unwrap();
//! assert_eq!(record.ttl_status(500), TtlStatus::Remaining(500));
//! assert_eq!(record.ttl_status(2000), TtlStatus::Expired);
//! ```

pub mod engine;
pub mod persistence;
pub mod record;
pub mod ttl;

// Re-export commonly used types
pub use engine::{Database, Documents, IndexBucket, Indices, RANGE_BUCKET_PREFIX};
pub use persistence::{
    JsonFilePersistence, MemoryPersistence, NoPersistence, Persistence, PersistenceError,
    PersistenceResult,
};
pub use record::{Payload, Record};
pub use ttl::{now_millis, TtlStatus};
