//! Alert storage: the emergency board.

use rusqlite::Row;
use tracing::{debug, info};
use uuid::Uuid;

use crate::model::{Alert, AlertStatus};

use super::{Result, Storage, StorageError, insert_error, parse_id, parse_label, parse_timestamp};

const COLUMNS: &str =
    "id, user_id, kind, description, latitude, longitude, is_sos, status, created_at";

/// Narrows [`Storage::list_alerts`].
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub status: Option<AlertStatus>,
    pub user: Option<String>,
}

impl Storage {
    /// Inserts a new alert.
    pub fn insert_alert(&self, alert: &Alert) -> Result<()> {
        self.conn
            .execute(
                &format!("INSERT INTO alerts ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"),
                rusqlite::params![
                    alert.id.to_string(),
                    &alert.user,
                    alert.kind.as_str(),
                    &alert.description,
                    alert.latitude,
                    alert.longitude,
                    alert.is_sos,
                    alert.status.as_str(),
                    alert.created_at.to_string(),
                ],
            )
            .map_err(|e| insert_error("alert", alert.id, e))?;
        if alert.is_sos {
            info!(id = %alert.id, user = %alert.user, "SOS raised");
        } else {
            debug!(id = %alert.id, kind = %alert.kind, "inserted alert");
        }
        Ok(())
    }

    /// Overwrites an existing alert, matched by id.
    pub fn update_alert(&self, alert: &Alert) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE alerts
             SET user_id = ?1, kind = ?2, description = ?3, latitude = ?4, longitude = ?5,
                 is_sos = ?6, status = ?7, created_at = ?8
             WHERE id = ?9",
            rusqlite::params![
                &alert.user,
                alert.kind.as_str(),
                &alert.description,
                alert.latitude,
                alert.longitude,
                alert.is_sos,
                alert.status.as_str(),
                alert.created_at.to_string(),
                alert.id.to_string(),
            ],
        )?;
        if rows == 0 {
            return Err(StorageError::NotFound {
                kind: "alert",
                id: alert.id.to_string(),
            });
        }
        debug!(id = %alert.id, status = %alert.status, "updated alert");
        Ok(())
    }

    /// Loads a single alert.
    pub fn load_alert(&self, id: Uuid) -> Result<Alert> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {COLUMNS} FROM alerts WHERE id = ?1"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return read_alert(row);
        }
        Err(StorageError::NotFound {
            kind: "alert",
            id: id.to_string(),
        })
    }

    /// Lists alerts matching `filter`, newest first.
    pub fn list_alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COLUMNS} FROM alerts
             WHERE (?1 IS NULL OR status = ?1)
               AND (?2 IS NULL OR user_id = ?2)"
        ))?;
        let mut rows = stmt.query(rusqlite::params![
            filter.status.map(AlertStatus::as_str),
            filter.user.as_deref(),
        ])?;
        let mut alerts = Vec::new();
        while let Some(row) = rows.next()? {
            alerts.push(read_alert(row)?);
        }
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(alerts)
    }
}

fn read_alert(row: &Row<'_>) -> Result<Alert> {
    let id: String = row.get(0)?;
    let kind: String = row.get(2)?;
    let status: String = row.get(7)?;
    let created_at: String = row.get(8)?;

    Ok(Alert {
        id: parse_id(&id)?,
        user: row.get(1)?,
        kind: parse_label(&kind)?,
        description: row.get(3)?,
        latitude: row.get(4)?,
        longitude: row.get(5)?,
        is_sos: row.get(6)?,
        status: parse_label(&status)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::AlertKind;
    use crate::storage::tests::test_storage;

    #[test]
    fn insert_and_load_sos() {
        let (_dir, storage) = test_storage();
        let alert = Alert::sos("asha@campus.edu", Some((19.1334, 72.9133)));

        storage.insert_alert(&alert).unwrap();
        let loaded = storage.load_alert(alert.id).unwrap();

        assert_eq!(loaded, alert);
    }

    #[test]
    fn active_alerts_only() {
        let (_dir, storage) = test_storage();

        let active = Alert::help("asha@campus.edu", AlertKind::Medical, "Fever, need a ride");
        let mut resolved = Alert::help("ravi@campus.edu", AlertKind::Other, "Lost ID card");
        resolved.resolve().unwrap();
        storage.insert_alert(&active).unwrap();
        storage.insert_alert(&resolved).unwrap();

        let filter = AlertFilter {
            status: Some(AlertStatus::Active),
            ..AlertFilter::default()
        };
        let alerts = storage.list_alerts(&filter).unwrap();

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].id, active.id);
    }

    #[test]
    fn resolve_persists() {
        let (_dir, storage) = test_storage();
        let mut alert = Alert::sos("asha@campus.edu", None);
        storage.insert_alert(&alert).unwrap();

        alert.resolve().unwrap();
        storage.update_alert(&alert).unwrap();

        let loaded = storage.load_alert(alert.id).unwrap();
        assert_eq!(loaded.status, AlertStatus::Resolved);
        assert!(loaded.latitude.is_none());
    }

    #[test]
    fn update_nonexistent_alert_fails() {
        let (_dir, storage) = test_storage();
        let alert = Alert::sos("asha@campus.edu", None);
        let err = storage.update_alert(&alert).unwrap_err();

        assert!(matches!(err, StorageError::NotFound { kind: "alert", .. }));
    }

    #[test]
    fn filter_by_user() {
        let (_dir, storage) = test_storage();
        storage
            .insert_alert(&Alert::sos("asha@campus.edu", None))
            .unwrap();
        storage
            .insert_alert(&Alert::sos("ravi@campus.edu", None))
            .unwrap();

        let filter = AlertFilter {
            user: Some("ravi@campus.edu".into()),
            ..AlertFilter::default()
        };
        let alerts = storage.list_alerts(&filter).unwrap();

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].user, "ravi@campus.edu");
    }
}
