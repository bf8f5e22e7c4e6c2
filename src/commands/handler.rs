//! Command Handler Module
//!
//! This module implements the five commands of the store and the dispatcher
//! that routes a tokenized line to them.
//!
//! ## Supported Commands
//!
//! - `SET key {json} [ttl_ms]` - Create or overwrite a document
//! - `GET key` - Read a document (reports expiry, never deletes)
//! - `DEL key` - Delete a document and its equality index bucket
//! - `INDEX base_key field value` - Record an indexed field/value pair
//! - `RANGE field start end` - Inclusive numeric range query, cached as a bucket
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CommandHandler                          │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐      │
//! │  │ tokenize()  │───>│  dispatch() │───>│  cmd_*()    │      │
//! │  └─────────────┘    └─────────────┘    └─────────────┘      │
//! │                                               │             │
//! │                                               ▼             │
//! │                                        &mut Database        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every handler validates all of its inputs before it mutates anything, so a
//! failed command leaves the database exactly as it was.

use crate::commands::error::{CommandError, CommandResult};
use crate::protocol::{canonical_string, format_number, parse_number, payload_span, CommandLine};
use crate::storage::{now_millis, Database, IndexBucket, Payload, Record, RANGE_BUCKET_PREFIX};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Acknowledgement returned by a successful `SET`.
pub const STORED: &str = "OK";

/// Acknowledgement returned by a successful `INDEX`.
pub const INDEXED: &str = "Index created.";

/// Returned by `GET` for a record past its expiry time.
pub const EXPIRED_NOTICE: &str = "This key has expired. Use DEL to remove it.";

/// Returned by `RANGE` when nothing matched.
pub const NO_RESULTS: &str = "No results.";

/// The commands understood by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Set,
    Get,
    Del,
    Index,
    Range,
}

impl Command {
    /// All commands, in help order.
    pub const ALL: [Command; 5] = [
        Command::Set,
        Command::Get,
        Command::Del,
        Command::Index,
        Command::Range,
    ];

    /// Looks up an uppercased verb.
    pub fn lookup(verb: &str) -> Option<Self> {
        match verb {
            "SET" => Some(Command::Set),
            "GET" => Some(Command::Get),
            "DEL" => Some(Command::Del),
            "INDEX" => Some(Command::Index),
            "RANGE" => Some(Command::Range),
            _ => None,
        }
    }

    /// The command's verb.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Set => "SET",
            Command::Get => "GET",
            Command::Del => "DEL",
            Command::Index => "INDEX",
            Command::Range => "RANGE",
        }
    }

    /// The command's argument syntax.
    pub fn usage(&self) -> &'static str {
        match self {
            Command::Set => "SET <key> <jsonObject> [ttlMillis]",
            Command::Get => "GET <key>",
            Command::Del => "DEL <key>",
            Command::Index => "INDEX <baseKey> <field> <value>",
            Command::Range => "RANGE <field> <start> <end>",
        }
    }

    /// Returns true if a successful run of this command changes the database.
    ///
    /// `RANGE` counts: it rewrites its cached result bucket.
    pub fn is_write(&self) -> bool {
        !matches!(self, Command::Get)
    }
}

/// The outcome of executing one command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// The command that ran, `None` if the verb was unknown
    pub command: Option<Command>,
    /// The handler's result
    pub result: CommandResult,
}

impl Reply {
    /// Returns true if the command succeeded.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Returns true if the command succeeded and may have changed the database.
    pub fn mutated(&self) -> bool {
        self.is_ok() && self.command.map(|c| c.is_write()).unwrap_or(false)
    }
}

impl fmt::Display for Reply {
    /// The user-facing form: the success text, or `Error: <message>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            Ok(text) => write!(f, "{}", text),
            Err(e) => write!(f, "Error: {}", e),
        }
    }
}

/// Executes commands against a database.
///
/// The handler borrows the database for its lifetime and evaluates TTLs
/// against a single clock reading.
///
/// # Example
///
/// ```
/// use indexkv::commands::CommandHandler;
/// use indexkv::storage::Database;
///
/// let mut db = Database::new();
/// let mut handler = CommandHandler::new(&mut db);
///
/// let reply = handler.execute(r#"SET user:1 {"status": "active"}"#).unwrap();
/// assert!(reply.is_ok());
///
/// let reply = handler.execute("INDEX user:1 status banned").unwrap();
/// assert!(reply.to_string().starts_with("Error: Invalid value"));
/// ```
pub struct CommandHandler<'a> {
    /// The database
    db: &'a mut Database,
    /// Clock reading (epoch ms) used for TTLs
    now: i64,
}

impl<'a> CommandHandler<'a> {
    /// Creates a handler using the current wall-clock time.
    pub fn new(db: &'a mut Database) -> Self {
        Self::at(db, now_millis())
    }

    /// Creates a handler that treats `now` (epoch ms) as the current time.
    pub fn at(db: &'a mut Database, now: i64) -> Self {
        Self { db, now }
    }

    /// Executes a raw command line.
    ///
    /// Returns `None` for a blank line; nothing is executed in that case.
    pub fn execute(&mut self, line: &str) -> Option<Reply> {
        let line = CommandLine::parse(line)?;
        let verb = line.verb();

        let Some(command) = Command::lookup(&verb) else {
            debug!(verb = %verb, "Unknown command");
            return Some(Reply {
                command: None,
                result: Err(CommandError::UnknownCommand(verb)),
            });
        };

        let result = self.dispatch(command, line.args());
        if let Err(e) = &result {
            debug!(command = command.name(), error = %e, "Command failed");
        }

        Some(Reply {
            command: Some(command),
            result,
        })
    }

    /// Dispatches a command to its handler.
    fn dispatch(&mut self, command: Command, args: &[&str]) -> CommandResult {
        match command {
            Command::Set => self.cmd_set(args),
            Command::Get => self.cmd_get(args),
            Command::Del => self.cmd_del(args),
            Command::Index => self.cmd_index(args),
            Command::Range => self.cmd_range(args),
        }
    }

    // ========================================================================
    // Document Commands
    // ========================================================================

    /// SET key {json} [ttl_ms]
    fn cmd_set(&mut self, args: &[&str]) -> CommandResult {
        let key = args.first().ok_or(CommandError::MissingArgument("key"))?;

        let span = payload_span(&args[1..])
            .ok_or_else(|| CommandError::InvalidJson("no JSON object found".to_string()))?;

        let payload: Payload = serde_json::from_str(&span.json)
            .map_err(|e| CommandError::InvalidJson(e.to_string()))?;

        // Fractional milliseconds are dropped and infinities saturate
        let ttl_ms = span.ttl.map(|ttl| ttl as i64);

        debug!(key = %key, ttl_ms = ?ttl_ms, fields = payload.len(), "SET");
        self.db
            .insert(key.to_string(), Record::new(payload, ttl_ms, self.now));

        Ok(STORED.to_string())
    }

    /// GET key
    fn cmd_get(&mut self, args: &[&str]) -> CommandResult {
        let key = args.first().ok_or(CommandError::MissingArgument("key"))?;

        let record = self
            .db
            .get(key)
            .ok_or_else(|| CommandError::KeyNotFound(key.to_string()))?;

        if record.is_expired(self.now) {
            debug!(key = %key, "GET on expired key");
            return Ok(EXPIRED_NOTICE.to_string());
        }

        Ok(record.to_pretty_json())
    }

    /// DEL key
    fn cmd_del(&mut self, args: &[&str]) -> CommandResult {
        let key = args.first().ok_or(CommandError::MissingArgument("key"))?;

        self.db
            .remove(key)
            .ok_or_else(|| CommandError::KeyNotFound(key.to_string()))?;

        debug!(key = %key, "DEL");
        Ok(format!("Deleted key: {}", key))
    }

    // ========================================================================
    // Index Commands
    // ========================================================================

    /// INDEX base_key field value
    fn cmd_index(&mut self, args: &[&str]) -> CommandResult {
        let base = args.first().ok_or(CommandError::MissingArgument("base key"))?;

        let record = self
            .db
            .get(base)
            .ok_or_else(|| CommandError::BaseKeyNotFound(base.to_string()))?;

        let field = args.get(1).ok_or(CommandError::MissingArgument("field"))?;
        let value = args.get(2).ok_or(CommandError::MissingArgument("value"))?;

        if !record.field_names.contains(*field) {
            return Err(CommandError::InvalidField {
                field: field.to_string(),
                allowed: record.field_names.clone(),
            });
        }

        if !record.field_values.contains(*value) {
            return Err(CommandError::InvalidValue {
                value: value.to_string(),
                allowed: record.field_values.clone(),
            });
        }

        // The snapshot says the value exists somewhere in the document;
        // it must also be what this particular field holds.
        let actual = record.field(field).map(canonical_string).unwrap_or_default();
        if actual != *value {
            return Err(CommandError::ValueMismatch {
                field: field.to_string(),
                value: value.to_string(),
                actual,
            });
        }

        debug!(base = %base, field = %field, value = %value, "INDEX");
        self.db
            .set_index_entry(base, field, Value::String(value.to_string()));

        Ok(INDEXED.to_string())
    }

    /// RANGE field start end
    fn cmd_range(&mut self, args: &[&str]) -> CommandResult {
        let field = args.first().ok_or(CommandError::MissingArgument("field"))?;
        let start_raw = args.get(1).copied().unwrap_or_default();
        let end_raw = args.get(2).copied().unwrap_or_default();

        let (start, end) = match (parse_number(start_raw), parse_number(end_raw)) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                return Err(CommandError::NonNumericRange {
                    start: start_raw.to_string(),
                    end: end_raw.to_string(),
                })
            }
        };

        let bucket: IndexBucket = self
            .db
            .range_scan(field, start, end)
            .into_iter()
            .map(|(key, payload)| (key, Value::Object(payload)))
            .collect();

        let name = range_bucket_name(field, start, end);
        debug!(bucket = %name, matches = bucket.len(), "RANGE");

        let output = if bucket.is_empty() {
            NO_RESULTS.to_string()
        } else {
            pretty(&bucket)
        };

        self.db.replace_bucket(name, bucket);
        Ok(output)
    }
}

/// Name of the bucket caching the results of `RANGE field start end`.
pub fn range_bucket_name(field: &str, start: f64, end: f64) -> String {
    format!(
        "{}{}:{}-{}",
        RANGE_BUCKET_PREFIX,
        field,
        format_number(start),
        format_number(end)
    )
}

fn pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}
