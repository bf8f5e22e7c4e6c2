//! Store Sessions
//!
//! A [`Session`] ties a [`Database`] to a [`Persistence`] backend for the
//! lifetime of an embedding application:
//!
//! ```text
//! open() ──> load() ──> Database
//!                          │
//!   execute(line) ─────────┤ CommandHandler
//!                          │
//!                          └─> save() after every successful write
//! ```
//!
//! A failed save is logged and does not change the command's reply: the
//! in-memory state is authoritative and the next successful write retries.

use crate::commands::{CommandHandler, Reply};
use crate::storage::{now_millis, Database, Persistence, PersistenceResult};
use tracing::{error, info};

/// A database plus the backend it is loaded from and saved to.
///
/// # Example
///
/// ```
/// use indexkv::session::Session;
/// use indexkv::storage::MemoryPersistence;
///
/// let mut session = Session::open(MemoryPersistence::new()).unwrap();
/// let reply = session.execute(r#"SET a {"n": 1}"#).unwrap();
/// assert!(reply.is_ok());
/// assert_eq!(session.persistence().saves(), 1);
/// ```
#[derive(Debug)]
pub struct Session<P: Persistence> {
    db: Database,
    persistence: P,
}

impl<P: Persistence> Session<P> {
    /// Loads the database from `persistence`.
    pub fn open(mut persistence: P) -> PersistenceResult<Self> {
        let (documents, indices) = persistence.load()?;
        let db = Database::from_parts(documents, indices);

        info!(
            documents = db.len(),
            buckets = db.indices().len(),
            "Session opened"
        );

        Ok(Self { db, persistence })
    }

    /// Executes a command line at the current wall-clock time.
    pub fn execute(&mut self, line: &str) -> Option<Reply> {
        self.execute_at(line, now_millis())
    }

    /// Executes a command line treating `now` (epoch ms) as the current time.
    ///
    /// Returns `None` for a blank line.
    pub fn execute_at(&mut self, line: &str, now: i64) -> Option<Reply> {
        let reply = CommandHandler::at(&mut self.db, now).execute(line)?;

        if reply.mutated() {
            if let Err(e) = self.persistence.save(self.db.documents(), self.db.indices()) {
                error!(error = %e, "Failed to save snapshot");
            }
        }

        Some(reply)
    }

    /// The current database.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// The persistence backend.
    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Consumes the session, returning the database and backend.
    pub fn into_parts(self) -> (Database, P) {
        (self.db, self.persistence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Documents, Indices, JsonFilePersistence, MemoryPersistence, PersistenceError};
    use std::io;

    const T0: i64 = 1_700_000_000_000;

    #[test]
    fn test_saves_only_after_successful_writes() {
        let mut session = Session::open(MemoryPersistence::new()).unwrap();

        session.execute_at(r#"SET a {"n": 1}"#, T0);
        session.execute_at("GET a", T0);
        session.execute_at("GET missing", T0);
        session.execute_at("DEL missing", T0);
        session.execute_at("NOPE", T0);
        session.execute_at("", T0);
        assert_eq!(session.persistence().saves(), 1);

        session.execute_at("INDEX a n 1", T0);
        session.execute_at("RANGE n 0 5", T0);
        session.execute_at("DEL a", T0);
        assert_eq!(session.persistence().saves(), 4);
    }

    #[test]
    fn test_reopen_restores_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");

        {
            let mut session = Session::open(JsonFilePersistence::new(&path)).unwrap();
            session.execute_at(r#"SET u {"status": "active", "n": 4} 100"#, T0);
            session.execute_at("INDEX u status active", T0);
            session.execute_at("RANGE n 0 10", T0);
        }

        let mut session = Session::open(JsonFilePersistence::new(&path)).unwrap();
        let db = session.database();
        assert_eq!(db.len(), 1);
        assert!(db.bucket("u").is_some());
        assert!(db.bucket("RANGE:n:0-10").is_some());

        // Expiry is absolute, so the record is still expired after reload
        let reply = session.execute_at("GET u", T0 + 1_000).unwrap();
        assert_eq!(reply.to_string(), crate::commands::EXPIRED_NOTICE);
    }

    struct FailingPersistence {
        attempts: usize,
    }

    impl Persistence for FailingPersistence {
        fn load(&mut self) -> PersistenceResult<(Documents, Indices)> {
            Ok((Documents::new(), Indices::new()))
        }

        fn save(&mut self, _: &Documents, _: &Indices) -> PersistenceResult<()> {
            self.attempts += 1;
            Err(PersistenceError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    #[test]
    fn test_save_failure_keeps_reply_and_state() {
        let mut session = Session::open(FailingPersistence { attempts: 0 }).unwrap();

        let reply = session.execute_at(r#"SET a {"n": 1}"#, T0).unwrap();
        assert!(reply.is_ok());
        assert!(session.database().contains("a"));
        assert_eq!(session.persistence().attempts, 1);
    }

    #[test]
    fn test_open_propagates_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, "garbage").unwrap();

        assert!(Session::open(JsonFilePersistence::new(&path)).is_err());
    }
}
