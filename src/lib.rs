//! # IndexKV - An Embeddable JSON Document Store
//!
//! IndexKV is a small, in-memory document store driven by a textual command
//! language. Documents are JSON objects stored under string keys; fields can
//! be recorded in equality indices, and numeric fields can be queried by range.
//!
//! ## Features
//!
//! - **Command Language**: five whitespace-tokenized commands, case-insensitive verbs
//! - **Validated Indices**: `INDEX` checks fields and values against a write-time snapshot
//! - **Range Queries**: inclusive numeric scans whose results are cached as index buckets
//! - **Lazy TTL**: expiry is reported on read and never deletes anything
//! - **Pluggable Persistence**: load once, save after every successful write
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              IndexKV                                    │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐                  │
//! │  │    REPL     │───>│   Session   │───>│  Command    │                  │
//! │  │ (tokio I/O) │    │             │    │  Handler    │                  │
//! │  └─────────────┘    └──────┬──────┘    └──────┬──────┘                  │
//! │                            │                  │                         │
//! │                            ▼                  ▼                         │
//! │  ┌─────────────┐    ┌──────────────────────────────────────────────┐    │
//! │  │ Tokenizer   │    │                 Database                     │    │
//! │  │ + Coercions │    │   documents: key -> Record                   │    │
//! │  └─────────────┘    │   indices:   bucket -> { entry -> value }    │    │
//! │                     └──────────────────────────────────────────────┘    │
//! │                            │                                            │
//! │                            ▼                                            │
//! │                     ┌─────────────────────────────────────────────┐     │
//! │                     │   Persistence (JSON file / memory / none)   │     │
//! │                     └─────────────────────────────────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use indexkv::session::Session;
//! use indexkv::storage::NoPersistence;
//!
//! let mut session = Session::open(NoPersistence).unwrap();
//!
//! session.execute(r#"SET a {"n": 5}"#);
//! session.execute(r#"SET b {"n": 10}"#);
//! session.execute(r#"SET c {"n": 15}"#);
//!
//! let reply = session.execute("RANGE n 5 10").unwrap();
//! assert!(reply.to_string().contains("\"a\""));
//! assert!(!reply.to_string().contains("\"c\""));
//! ```
//!
//! ## Supported Commands
//!
//! - `SET <key> <jsonObject> [ttlMillis]`
//! - `GET <key>`
//! - `DEL <key>`
//! - `INDEX <baseKey> <field> <value>`
//! - `RANGE <field> <start> <end>`
//!
//! Every command returns either a success string or `Error: <message>`.
//!
//! ## Module Overview
//!
//! - [`protocol`]: Tokenizer and explicit value coercions
//! - [`storage`]: Database, records, TTL status and persistence backends
//! - [`commands`]: Dispatcher and command handlers
//! - [`session`]: Database + persistence lifecycle
//! - [`render`]: Table and index views
//! - [`repl`]: Async interactive loop

pub mod commands;
pub mod protocol;
pub mod render;
pub mod repl;
pub mod session;
pub mod storage;

// Re-export commonly used types for convenience
pub use commands::{Command, CommandError, CommandHandler, Reply};
pub use protocol::CommandLine;
pub use repl::ReplOptions;
pub use session::Session;
pub use storage::{Database, JsonFilePersistence, MemoryPersistence, NoPersistence, Persistence, Record};

/// The default snapshot file used by the binary
pub const DEFAULT_DATA_FILE: &str = "indexkv.json";

/// Version of IndexKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
