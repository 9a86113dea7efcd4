//! Profile storage: one row per member, written by upsert.

use tracing::debug;

use crate::model::Profile;

use super::{Result, Storage, parse_label};

impl Storage {
    /// Inserts the profile, or replaces the member's existing one.
    pub fn upsert_profile(&self, profile: &Profile) -> Result<()> {
        let routes = serde_json::to_string(&profile.frequent_routes)?;
        self.conn.execute(
            "INSERT INTO profiles (user_id, full_name, diet, frequent_routes, notifications_enabled)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (user_id) DO UPDATE SET
                 full_name = excluded.full_name,
                 diet = excluded.diet,
                 frequent_routes = excluded.frequent_routes,
                 notifications_enabled = excluded.notifications_enabled",
            rusqlite::params![
                &profile.user,
                &profile.full_name,
                profile.diet.as_str(),
                routes,
                profile.notifications_enabled,
            ],
        )?;
        debug!(user = %profile.user, "upserted profile");
        Ok(())
    }

    /// Loads a member's profile, or `None` if they haven't set one up.
    pub fn load_profile(&self, user: &str) -> Result<Option<Profile>> {
        let mut stmt = self.conn.prepare(
            "SELECT full_name, diet, frequent_routes, notifications_enabled
             FROM profiles WHERE user_id = ?1",
        )?;
        let mut rows = stmt.query([user])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let diet: String = row.get(1)?;
        let routes: String = row.get(2)?;
        Ok(Some(Profile {
            user: user.to_string(),
            full_name: row.get(0)?,
            diet: parse_label(&diet)?,
            frequent_routes: serde_json::from_str(&routes)?,
            notifications_enabled: row.get(3)?,
        }))
    }
}
