//! Document Store and Index Table
//!
//! This module implements [`Database`], the single owner of all state:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Database                            │
//! │                                                              │
//! │  documents: key ──> Record                                   │
//! │  ┌───────────┐ ┌───────────┐ ┌───────────┐                   │
//! │  │ user:1    │ │ user:2    │ │ order:9   │ ...               │
//! │  └───────────┘ └───────────┘ └───────────┘                   │
//! │                                                              │
//! │  indices: bucket name ──> { entry ──> value }                │
//! │  ┌────────────────────────┐ ┌──────────────────────────────┐ │
//! │  │ user:1                 │ │ RANGE:age:18-30              │ │
//! │  │   status -> "active"   │ │   user:1 -> {...payload...}  │ │
//! │  └────────────────────────┘ └──────────────────────────────┘ │
//! │   equality bucket             range bucket                  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Decisions
//!
//! 1. **One owner, no locks**: commands run one at a time against `&mut Database`.
//! 2. **Ordered maps**: `BTreeMap` keeps scans, results and dumps in key order.
//! 3. **Two bucket shapes, one table**: equality buckets map field to value,
//!    range buckets map document key to payload. Both are `IndexBucket`.
//! 4. **No expiry sweeping**: expired records stay until `DEL`.

use crate::protocol::coerce::numeric_value;
use crate::storage::record::{Payload, Record};
use serde_json::Value;
use std::collections::BTreeMap;

/// All stored documents, by key.
pub type Documents = BTreeMap<String, Record>;

/// One index bucket: field -> value (equality) or key -> payload (range).
pub type IndexBucket = BTreeMap<String, Value>;

/// All index buckets, by name.
pub type Indices = BTreeMap<String, IndexBucket>;

/// Prefix of bucket names written by range queries.
pub const RANGE_BUCKET_PREFIX: &str = "RANGE:";

/// The document store and index table.
///
/// # Example
///
/// ```
/// use indexkv::storage::{Database, Record};
/// use serde_json::json;
///
/// let mut db = Database::new();
/// let payload = json!({"n": 5}).as_object().cloned().unwrap();
/// db.insert("a".to_string(), Record::new(payload, None, 0));
///
/// let hits = db.range_scan("n", 0.0, 10.0);
/// assert_eq!(hits.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Database {
    documents: Documents,
    indices: Indices,
}

impl Database {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a database from previously exported maps, verbatim.
    ///
    /// Stale or redundant index entries are kept as they are.
    pub fn from_parts(documents: Documents, indices: Indices) -> Self {
        Self { documents, indices }
    }

    /// Consumes the database, returning its maps.
    pub fn into_parts(self) -> (Documents, Indices) {
        (self.documents, self.indices)
    }

    /// All stored documents.
    pub fn documents(&self) -> &Documents {
        &self.documents
    }

    /// All index buckets.
    pub fn indices(&self) -> &Indices {
        &self.indices
    }

    /// Returns the number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns true if no documents are stored.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    // ========================================================================
    // Documents
    // ========================================================================

    /// Stores a record, replacing any existing record under `key`.
    ///
    /// An index bucket named `key` is left untouched, even if it now refers
    /// to values the new record no longer has.
    ///
    /// Returns the replaced record, if any.
    pub fn insert(&mut self, key: String, record: Record) -> Option<Record> {
        self.documents.insert(key, record)
    }

    /// Gets the record for a key, expired or not.
    pub fn get(&self, key: &str) -> Option<&Record> {
        self.documents.get(key)
    }

    /// Checks if a record exists under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.documents.contains_key(key)
    }

    /// Removes a record and the equality bucket of the same name.
    ///
    /// Range buckets that captured the document are not touched.
    /// Returns the removed record, or `None` if the key did not exist.
    pub fn remove(&mut self, key: &str) -> Option<Record> {
        let record = self.documents.remove(key)?;
        self.indices.remove(key);
        Some(record)
    }

    // ========================================================================
    // Index table
    // ========================================================================

    /// Gets an index bucket by name.
    pub fn bucket(&self, name: &str) -> Option<&IndexBucket> {
        self.indices.get(name)
    }

    /// Sets `field = value` in the bucket `name`, creating the bucket if needed.
    ///
    /// A previous value for the same field is overwritten.
    pub fn set_index_entry(&mut self, name: &str, field: &str, value: Value) {
        self.indices
            .entry(name.to_string())
            .or_default()
            .insert(field.to_string(), value);
    }

    /// Replaces the bucket `name` wholesale.
    pub fn replace_bucket(&mut self, name: String, bucket: IndexBucket) -> Option<IndexBucket> {
        self.indices.insert(name, bucket)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Scans every record for `start <= doc[field] <= end`.
    ///
    /// Records where `field` is absent or not numeric are skipped. Expired
    /// records are included. Returns matching payloads by key.
    pub fn range_scan(&self, field: &str, start: f64, end: f64) -> BTreeMap<String, Payload> {
        self.documents
            .iter()
            .filter(|(_, record)| {
                record
                    .field(field)
                    .and_then(numeric_value)
                    .map(|n| start <= n && n <= end)
                    .unwrap_or(false)
            })
            .map(|(key, record)| (key.clone(), record.payload.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => Record::new(map, None, 0),
            _ => panic!("test payload must be an object"),
        }
    }

    #[test]
    fn test_insert_get() {
        let mut db = Database::new();

        assert!(db.insert("a".into(), record(json!({"x": 1}))).is_none());
        assert_eq!(db.get("a").unwrap().field("x"), Some(&json!(1)));

        // Overwrite returns the old record
        let old = db.insert("a".into(), record(json!({"x": 2}))).unwrap();
        assert_eq!(old.field("x"), Some(&json!(1)));
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn test_insert_keeps_equality_bucket() {
        let mut db = Database::new();
        db.insert("u".into(), record(json!({"status": "active"})));
        db.set_index_entry("u", "status", json!("active"));

        db.insert("u".into(), record(json!({"status": "banned"})));

        assert_eq!(db.bucket("u").unwrap().get("status"), Some(&json!("active")));
    }

    #[test]
    fn test_remove_cascades_to_equality_bucket_only() {
        let mut db = Database::new();
        db.insert("u".into(), record(json!({"n": 1})));
        db.set_index_entry("u", "n", json!("1"));

        let mut range = IndexBucket::new();
        range.insert("u".into(), json!({"n": 1}));
        db.replace_bucket("RANGE:n:0-5".into(), range);

        assert!(db.remove("u").is_some());
        assert!(!db.contains("u"));
        assert!(db.bucket("u").is_none());
        assert!(db.bucket("RANGE:n:0-5").unwrap().contains_key("u"));

        assert!(db.remove("u").is_none());
    }

    #[test]
    fn test_set_index_entry_overwrites_field() {
        let mut db = Database::new();
        db.set_index_entry("u", "status", json!("active"));
        db.set_index_entry("u", "role", json!("admin"));
        db.set_index_entry("u", "status", json!("idle"));

        let bucket = db.bucket("u").unwrap();
        assert_eq!(bucket.len(), 2);
        assert_eq!(bucket.get("status"), Some(&json!("idle")));
    }

    #[test]
    fn test_range_scan_inclusive_and_skips_non_numeric() {
        let mut db = Database::new();
        db.insert("a".into(), record(json!({"n": 5})));
        db.insert("b".into(), record(json!({"n": 10})));
        db.insert("c".into(), record(json!({"n": 15})));
        db.insert("d".into(), record(json!({"n": "7"})));
        db.insert("e".into(), record(json!({"n": "seven"})));
        db.insert("f".into(), record(json!({"m": 6})));

        let hits = db.range_scan("n", 5.0, 10.0);
        let keys: Vec<&str> = hits.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b", "d"]);

        assert!(db.range_scan("n", 100.0, 200.0).is_empty());
        assert!(db.range_scan("n", 10.0, 5.0).is_empty());
    }

    #[test]
    fn test_range_scan_includes_expired_records() {
        let mut db = Database::new();
        let payload = json!({"n": 1}).as_object().cloned().unwrap();
        db.insert("old".into(), Record::new(payload, Some(1), 0));

        assert!(db.get("old").unwrap().is_expired(1_000));
        assert_eq!(db.range_scan("n", 0.0, 2.0).len(), 1);
    }

    #[test]
    fn test_parts_round_trip_verbatim() {
        let mut db = Database::new();
        db.insert("a".into(), record(json!({"n": 1})));
        // A bucket for a key that no longer exists survives the round trip
        db.set_index_entry("ghost", "n", json!("1"));

        let (documents, indices) = db.clone().into_parts();
        let restored = Database::from_parts(documents, indices);
        assert_eq!(restored, db);
        assert!(restored.bucket("ghost").is_some());
    }
}
