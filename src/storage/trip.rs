//! Trip storage: post, load, and list travel plans.

use rusqlite::Row;
use tracing::debug;
use uuid::Uuid;

use crate::model::Trip;

use super::{Result, Storage, StorageError, insert_error, parse_id, parse_label, parse_timestamp};

const COLUMNS: &str = "id, user_id, origin, destination, travel_time, mode, created_at";

/// Narrows [`Storage::list_trips`]. The default lists every trip.
#[derive(Debug, Clone, Default)]
pub struct TripFilter {
    /// Only trips posted by this member.
    pub user: Option<String>,
}

impl Storage {
    /// Inserts a new trip.
    pub fn insert_trip(&self, trip: &Trip) -> Result<()> {
        self.conn
            .execute(
                &format!("INSERT INTO trips ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
                rusqlite::params![
                    trip.id.to_string(),
                    &trip.user,
                    &trip.origin,
                    &trip.destination,
                    &trip.travel_time,
                    trip.mode.as_str(),
                    trip.created_at.to_string(),
                ],
            )
            .map_err(|e| insert_error("trip", trip.id, e))?;
        debug!(id = %trip.id, destination = %trip.destination, "inserted trip");
        Ok(())
    }

    /// Loads a single trip.
    pub fn load_trip(&self, id: Uuid) -> Result<Trip> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {COLUMNS} FROM trips WHERE id = ?1"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return read_trip(row);
        }
        Err(StorageError::NotFound {
            kind: "trip",
            id: id.to_string(),
        })
    }

    /// Lists trips matching `filter`, newest first.
    pub fn list_trips(&self, filter: &TripFilter) -> Result<Vec<Trip>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COLUMNS} FROM trips WHERE (?1 IS NULL OR user_id = ?1)"
        ))?;
        let mut rows = stmt.query([filter.user.as_deref()])?;
        let mut trips = Vec::new();
        while let Some(row) = rows.next()? {
            trips.push(read_trip(row)?);
        }
        trips.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(trips)
    }
}

fn read_trip(row: &Row<'_>) -> Result<Trip> {
    let id: String = row.get(0)?;
    let mode: String = row.get(5)?;
    let created_at: String = row.get(6)?;

    Ok(Trip {
        id: parse_id(&id)?,
        user: row.get(1)?,
        origin: row.get(2)?,
        destination: row.get(3)?,
        travel_time: row.get(4)?,
        mode: parse_label(&mode)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;

    use crate::model::TravelMode;
    use crate::storage::tests::{sample_trip, test_storage};

    #[test]
    fn insert_and_load_trip() {
        let (_dir, storage) = test_storage();
        let mut trip = sample_trip("asha@campus.edu", "Railway Stn");
        trip.mode = TravelMode::Auto;

        storage.insert_trip(&trip).unwrap();
        let loaded = storage.load_trip(trip.id).unwrap();

        assert_eq!(loaded, trip);
    }

    #[test]
    fn insert_duplicate_trip_fails() {
        let (_dir, storage) = test_storage();
        let trip = sample_trip("asha@campus.edu", "Airport");

        storage.insert_trip(&trip).unwrap();
        let err = storage.insert_trip(&trip).unwrap_err();

        assert!(matches!(err, StorageError::AlreadyExists { kind: "trip", .. }));
    }

    #[test]
    fn load_nonexistent_trip_fails() {
        let (_dir, storage) = test_storage();
        let err = storage.load_trip(Uuid::new_v4()).unwrap_err();

        assert!(matches!(err, StorageError::NotFound { kind: "trip", .. }));
    }

    #[test]
    fn list_trips_empty() {
        let (_dir, storage) = test_storage();
        let trips = storage.list_trips(&TripFilter::default()).unwrap();

        assert!(trips.is_empty());
    }

    #[test]
    fn list_trips_newest_first() {
        let (_dir, storage) = test_storage();

        let mut older = sample_trip("asha@campus.edu", "Airport");
        older.created_at = Timestamp::new(1_000_000_000, 0).unwrap();

        let mut newer = sample_trip("ravi@campus.edu", "City Mall");
        newer.created_at = Timestamp::new(1_000_000_000, 500).unwrap();

        storage.insert_trip(&older).unwrap();
        storage.insert_trip(&newer).unwrap();

        let trips = storage.list_trips(&TripFilter::default()).unwrap();
        assert_eq!(trips.len(), 2);
        assert_eq!(trips[0].destination, "City Mall");
        assert_eq!(trips[1].destination, "Airport");
    }

    #[test]
    fn list_trips_by_user() {
        let (_dir, storage) = test_storage();
        storage
            .insert_trip(&sample_trip("asha@campus.edu", "Airport"))
            .unwrap();
        storage
            .insert_trip(&sample_trip("ravi@campus.edu", "City Mall"))
            .unwrap();

        let filter = TripFilter {
            user: Some("ravi@campus.edu".into()),
        };
        let trips = storage.list_trips(&filter).unwrap();

        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].user, "ravi@campus.edu");
    }
}
