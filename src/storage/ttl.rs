//! Lazy TTL Support
//!
//! Records may carry an absolute expiry time. Unlike a cache, nothing here
//! ever removes a record: expiry is a state computed from the clock when
//! somebody looks.
//!
//! ## Time Representation
//!
//! Times are wall-clock milliseconds since the Unix epoch (`i64`). Unlike
//! `Instant`, this survives a save/load round trip through the persistence
//! layer, so an expired record is still expired after a restart.
//!
//! ## Status Refresh
//!
//! A display may call [`TtlStatus::of`] for every record on a timer to show a
//! countdown. The computation only reads the record.

use crate::storage::record::Record;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// The TTL state of a record at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlStatus {
    /// The record was stored without a TTL
    Persistent,
    /// The record is live for this many more milliseconds
    Remaining(i64),
    /// The expiry time has passed
    Expired,
}

impl TtlStatus {
    /// Computes the status of `record` at `now` (epoch milliseconds).
    pub fn of(record: &Record, now: i64) -> Self {
        match record.expires_at {
            None => TtlStatus::Persistent,
            Some(expires_at) if now > expires_at => TtlStatus::Expired,
            Some(expires_at) => TtlStatus::Remaining(expires_at.saturating_sub(now)),
        }
    }

    /// Returns true if the expiry time has passed.
    #[inline]
    pub fn is_expired(&self) -> bool {
        matches!(self, TtlStatus::Expired)
    }
}

impl fmt::Display for TtlStatus {
    /// Table form: `-` for no TTL, whole seconds rounded up, or `Expired`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TtlStatus::Persistent => write!(f, "-"),
            TtlStatus::Remaining(ms) => write!(f, "{}s", ms.saturating_add(999) / 1000),
            TtlStatus::Expired => write!(f, "Expired"),
        }
    }
}
