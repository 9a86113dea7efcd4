//! Local persistence for the boards.
//!
//! Everything lives in one `SQLite` file, `~/.quad/quad.sqlite` by default:
//!
//! ```text
//! trips      # travel plans
//! orders     # delivery board posts
//! alerts     # emergency board
//! profiles   # one row per member
//! ```
//!
//! Ids are stored as hyphenated UUID strings, timestamps as RFC 3339 text,
//! enums as their display labels. Listing methods return newest first.
//!
//! Matching never reads the store directly. Callers load a snapshot, hand it
//! to [`crate::matcher`], and reload when [`Storage::changes_since`] says
//! another process has written.

mod alert;
mod order;
mod profile;
mod trip;

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use jiff::Timestamp;
use rusqlite::Connection;
use tracing::debug;
use uuid::Uuid;

use crate::config;
use crate::model::UnknownLabel;

pub use alert::AlertFilter;
pub use order::OrderFilter;
pub use trip::TripFilter;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} already exists: {id}")]
    AlreadyExists { kind: &'static str, id: Uuid },

    #[error("{kind} {id} was changed by someone else; reload and try again")]
    Conflict { kind: &'static str, id: Uuid },

    #[error("no {kind} matching '{reference}'")]
    NoMatch {
        kind: &'static str,
        reference: String,
    },

    #[error(
        "'{reference}' is ambiguous: matches {} {kind}s ({})",
        .candidates.len(),
        .candidates.join(", ")
    )]
    Ambiguous {
        kind: &'static str,
        reference: String,
        candidates: Vec<String>,
    },

    #[error("corrupt data: {0}")]
    Corrupt(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<UnknownLabel> for StorageError {
    fn from(e: UnknownLabel) -> Self {
        Self::Corrupt(e.to_string())
    }
}

pub type Result<T> = core::result::Result<T, StorageError>;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS trips (
        id          TEXT PRIMARY KEY,
        user_id     TEXT NOT NULL,
        origin      TEXT NOT NULL,
        destination TEXT NOT NULL,
        travel_time TEXT NOT NULL,
        mode        TEXT NOT NULL,
        created_at  TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS orders (
        id           TEXT PRIMARY KEY,
        user_id      TEXT NOT NULL,
        kind         TEXT NOT NULL,
        item         TEXT NOT NULL,
        location     TEXT NOT NULL,
        destination  TEXT,
        delivery_fee INTEGER NOT NULL,
        status       TEXT NOT NULL,
        accepted_by  TEXT,
        created_at   TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS alerts (
        id          TEXT PRIMARY KEY,
        user_id     TEXT NOT NULL,
        kind        TEXT NOT NULL,
        description TEXT NOT NULL,
        latitude    REAL,
        longitude   REAL,
        is_sos      INTEGER NOT NULL,
        status      TEXT NOT NULL,
        created_at  TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS profiles (
        user_id               TEXT PRIMARY KEY,
        full_name             TEXT NOT NULL,
        diet                  TEXT NOT NULL,
        frequent_routes       TEXT NOT NULL,
        notifications_enabled INTEGER NOT NULL
    );
";

/// Tables whose rows are addressed by UUID.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Table {
    Trips,
    Orders,
    Alerts,
}

impl Table {
    fn name(self) -> &'static str {
        match self {
            Self::Trips => "trips",
            Self::Orders => "orders",
            Self::Alerts => "alerts",
        }
    }

    fn kind(self) -> &'static str {
        match self {
            Self::Trips => "trip",
            Self::Orders => "order",
            Self::Alerts => "alert",
        }
    }
}

/// Local `SQLite`-backed storage for all boards.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Opens (or creates) the database at `path`, creating parent directories
    /// and the schema as needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        debug!(path = %path.display(), "opened store");
        Ok(Self { conn })
    }

    /// Returns the default database path: `<quad home>/quad.sqlite`.
    pub fn default_path() -> Option<PathBuf> {
        config::home().map(|h| h.join("quad.sqlite"))
    }

    // ── Change detection ──

    /// A counter that moves whenever another connection commits a write.
    ///
    /// Writes made through this connection do not move it.
    pub fn data_version(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("PRAGMA data_version", [], |row| row.get(0))?)
    }

    /// Reports whether the store changed since `last`, updating `last` if so.
    pub fn changes_since(&self, last: &mut i64) -> Result<bool> {
        let current = self.data_version()?;
        if current == *last {
            return Ok(false);
        }
        debug!(from = *last, to = current, "store changed");
        *last = current;
        Ok(true)
    }

    // ── Id resolution ──

    /// Resolves a full UUID or an unambiguous prefix to an id in `table`.
    pub(crate) fn resolve(&self, table: Table, reference: &str) -> Result<Uuid> {
        if let Ok(id) = reference.parse::<Uuid>() {
            return Ok(id);
        }

        let no_match = || StorageError::NoMatch {
            kind: table.kind(),
            reference: reference.to_string(),
        };

        let prefix = reference.to_ascii_lowercase();
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
            return Err(no_match());
        }

        let mut stmt = self.conn.prepare(&format!(
            "SELECT id FROM {} WHERE substr(id, 1, ?2) = ?1",
            table.name()
        ))?;
        let mut rows = stmt.query(rusqlite::params![prefix, prefix.len()])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(row.get::<_, String>(0)?);
        }

        match ids.as_slice() {
            [] => Err(no_match()),
            [id] => parse_id(id),
            _ => Err(StorageError::Ambiguous {
                kind: table.kind(),
                reference: reference.to_string(),
                candidates: ids
                    .iter()
                    .map(|id| id.get(..8).unwrap_or(id.as_str()).to_string())
                    .collect(),
            }),
        }
    }

    /// Explains why a conditional update touched no rows: the row is gone,
    /// or its status moved on since it was loaded.
    fn stale_write(&self, table: Table, id: Uuid) -> StorageError {
        let exists = self.conn.query_row(
            &format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)", table.name()),
            [id.to_string()],
            |row| row.get::<_, bool>(0),
        );
        match exists {
            Ok(true) => StorageError::Conflict {
                kind: table.kind(),
                id,
            },
            Ok(false) => StorageError::NotFound {
                kind: table.kind(),
                id: id.to_string(),
            },
            Err(e) => e.into(),
        }
    }

    pub fn resolve_trip(&self, reference: &str) -> Result<Uuid> {
        self.resolve(Table::Trips, reference)
    }

    pub fn resolve_order(&self, reference: &str) -> Result<Uuid> {
        self.resolve(Table::Orders, reference)
    }

    pub fn resolve_alert(&self, reference: &str) -> Result<Uuid> {
        self.resolve(Table::Alerts, reference)
    }
}

/// Maps a primary-key violation on insert to [`StorageError::AlreadyExists`].
fn insert_error(kind: &'static str, id: Uuid, e: rusqlite::Error) -> StorageError {
    match e {
        rusqlite::Error::SqliteFailure(ref failure, _)
            if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            StorageError::AlreadyExists { kind, id }
        }
        other => other.into(),
    }
}

fn parse_id(s: &str) -> Result<Uuid> {
    s.parse::<Uuid>()
        .map_err(|e| StorageError::Corrupt(format!("invalid id {s:?}: {e}")))
}

fn parse_timestamp(s: &str) -> Result<Timestamp> {
    s.parse::<Timestamp>()
        .map_err(|e| StorageError::Corrupt(format!("invalid timestamp {s:?}: {e}")))
}

fn parse_label<T>(s: &str) -> Result<T>
where
    T: FromStr<Err = UnknownLabel>,
{
    Ok(s.parse::<T>()?)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use tempfile::TempDir;

    use crate::model::{Order, OrderKind, OrderStatus, TravelMode, Trip};

    pub(crate) fn test_storage() -> (TempDir, Storage) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::open(dir.path().join("quad").join("quad.sqlite")).unwrap();
        (dir, storage)
    }

    pub(crate) fn sample_trip(user: &str, destination: &str) -> Trip {
        Trip {
            id: Uuid::new_v4(),
            user: user.into(),
            origin: "Hostel 1".into(),
            destination: destination.into(),
            travel_time: "5:00 PM".into(),
            mode: TravelMode::Cab,
            created_at: Timestamp::now(),
        }
    }

    pub(crate) fn sample_order(user: &str, location: &str) -> Order {
        Order {
            id: Uuid::new_v4(),
            user: user.into(),
            kind: OrderKind::Request,
            item: "Burger".into(),
            location: location.into(),
            destination: Some("Hostel 4".into()),
            delivery_fee: 20,
            status: OrderStatus::Open,
            accepted_by: None,
            created_at: Timestamp::now(),
        }
    }

    #[test]
    fn open_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a").join("b").join("quad.sqlite");

        Storage::open(&path).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn reopen_keeps_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quad.sqlite");
        let trip = sample_trip("asha@campus.edu", "Airport");

        Storage::open(&path).unwrap().insert_trip(&trip).unwrap();
        let loaded = Storage::open(&path).unwrap().load_trip(trip.id).unwrap();

        assert_eq!(loaded, trip);
    }

    #[test]
    fn data_version_moves_on_foreign_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quad.sqlite");
        let watcher = Storage::open(&path).unwrap();
        let writer = Storage::open(&path).unwrap();

        let mut last = watcher.data_version().unwrap();
        assert!(!watcher.changes_since(&mut last).unwrap());

        writer
            .insert_trip(&sample_trip("asha@campus.edu", "Airport"))
            .unwrap();

        assert!(watcher.changes_since(&mut last).unwrap());
        assert!(!watcher.changes_since(&mut last).unwrap());
    }

    #[test]
    fn resolve_full_id_and_prefix() {
        let (_dir, storage) = test_storage();
        let trip = sample_trip("asha@campus.edu", "Airport");
        storage.insert_trip(&trip).unwrap();

        let full = trip.id.to_string();
        assert_eq!(storage.resolve_trip(&full).unwrap(), trip.id);
        assert_eq!(storage.resolve_trip(&full[..6]).unwrap(), trip.id);
        assert_eq!(
            storage.resolve_trip(&full[..6].to_uppercase()).unwrap(),
            trip.id
        );
    }

    #[test]
    fn resolve_unknown_prefix_fails() {
        let (_dir, storage) = test_storage();
        storage
            .insert_trip(&sample_trip("asha@campus.edu", "Airport"))
            .unwrap();

        let err = storage.resolve_order("abc").unwrap_err();
        assert!(matches!(err, StorageError::NoMatch { kind: "order", .. }));

        let err = storage.resolve_trip("%").unwrap_err();
        assert!(matches!(err, StorageError::NoMatch { .. }));

        let err = storage.resolve_trip("").unwrap_err();
        assert!(matches!(err, StorageError::NoMatch { .. }));
    }

    #[test]
    fn resolve_ambiguous_prefix_fails() {
        let (_dir, storage) = test_storage();
        let mut a = sample_trip("asha@campus.edu", "Airport");
        let mut b = sample_trip("asha@campus.edu", "City Mall");
        a.id = "aaaa0000-0000-4000-8000-000000000001".parse().unwrap();
        b.id = "aaaa0000-0000-4000-8000-000000000002".parse().unwrap();
        storage.insert_trip(&a).unwrap();
        storage.insert_trip(&b).unwrap();

        let err = storage.resolve_trip("aaaa").unwrap_err();
        assert!(matches!(
            &err,
            StorageError::Ambiguous { candidates, .. } if candidates.len() == 2
        ));
        assert!(err.to_string().contains("matches 2 trips"));

        assert_eq!(
            storage
                .resolve_trip("aaaa0000-0000-4000-8000-000000000002")
                .unwrap(),
            b.id
        );
    }

    #[test]
    fn ambiguous_prefix_tolerates_short_corrupt_ids() {
        let (_dir, storage) = test_storage();
        let mut trip = sample_trip("asha@campus.edu", "Airport");
        trip.id = "ab000000-0000-4000-8000-000000000001".parse().unwrap();
        storage.insert_trip(&trip).unwrap();
        storage
            .conn
            .execute(
                "INSERT INTO trips (id, user_id, origin, destination, travel_time, mode, created_at)
                 VALUES ('ab', 'ravi@campus.edu', 'Gate', 'Mall', '6:00 PM', 'Cab', '2026-01-01T00:00:00Z')",
                [],
            )
            .unwrap();

        let err = storage.resolve_trip("ab").unwrap_err();
        assert!(matches!(
            &err,
            StorageError::Ambiguous { candidates, .. }
                if candidates == &["ab000000".to_string(), "ab".to_string()]
                    || candidates == &["ab".to_string(), "ab000000".to_string()]
        ));
    }
}
