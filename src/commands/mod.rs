//! Command Handler Module
//!
//! This module implements the command processing layer of the store.
//! It receives raw command lines, executes them against the database,
//! and returns display-ready replies.
//!
//! ## Architecture
//!
//! ```text
//! Command line
//!       │
//!       ▼
//! ┌─────────────────┐
//! │   Tokenizer     │  (protocol module)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ CommandHandler  │  (this module)
//! │                 │
//! │  - Dispatch     │
//! │  - Validate     │
//! │  - Execute      │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Database     │  (storage module)
//! └─────────────────┘
//! ```
//!
//! ## Supported Commands
//!
//! - `SET`, `GET`, `DEL`
//! - `INDEX`
//! - `RANGE`

pub mod error;
pub mod handler;

// Re-export the main command handler
pub use error::{CommandError, CommandResult};
pub use handler::{
    range_bucket_name, Command, CommandHandler, Reply, EXPIRED_NOTICE, INDEXED, NO_RESULTS, STORED,
};
