//! Stored Documents
//!
//! A [`Record`] is one document plus the metadata captured when it was
//! written: its TTL and a snapshot of the payload's top-level field names and
//! canonical field values. `INDEX` validates against that snapshot.
//!
//! Records are never edited in place. `SET` replaces the whole record, which
//! is the only point where the snapshot is recomputed.

use crate::protocol::coerce::canonical_string;
use crate::storage::ttl::TtlStatus;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// A document payload: always a JSON object at the top level.
pub type Payload = Map<String, Value>;

/// One stored document with TTL and validation metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// The document itself
    pub payload: Payload,
    /// TTL given at creation, in milliseconds
    pub ttl_ms: Option<i64>,
    /// Absolute expiry time (epoch ms), `None` if no TTL was given
    pub expires_at: Option<i64>,
    /// Top-level field names at write time
    pub field_names: BTreeSet<String>,
    /// Canonical forms of the top-level field values at write time
    pub field_values: BTreeSet<String>,
}

impl Record {
    /// Creates a record written at `now` (epoch ms).
    pub fn new(payload: Payload, ttl_ms: Option<i64>, now: i64) -> Self {
        let field_names = payload.keys().cloned().collect();
        let field_values = payload.values().map(canonical_string).collect();

        Self {
            expires_at: ttl_ms.map(|ttl| now.saturating_add(ttl)),
            ttl_ms,
            payload,
            field_names,
            field_values,
        }
    }

    /// Checks whether this record has passed its expiry time.
    #[inline]
    pub fn is_expired(&self, now: i64) -> bool {
        TtlStatus::of(self, now).is_expired()
    }

    /// Returns the TTL status at `now`.
    pub fn ttl_status(&self, now: i64) -> TtlStatus {
        TtlStatus::of(self, now)
    }

    /// Reads a top-level field of the payload.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.payload.get(name)
    }

    /// Serializes the payload as indented JSON.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.payload).unwrap_or_else(|_| "{}".to_string())
    }
}
