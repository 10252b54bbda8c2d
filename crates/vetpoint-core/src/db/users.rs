//! Clinic user profile operations.

use rusqlite::{params, OptionalExtension};

use super::patients::parse_timestamp;
use super::{Database, DbResult};
use crate::models::ClinicUser;

impl Database {
    /// Insert or replace a clinic user's profile.
    ///
    /// `created_at` is kept from the first save.
    pub fn upsert_user(&self, user: &ClinicUser) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO clinic_users (
                id, name, email, clinic_name, license_number,
                specialty, phone_number, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                email = excluded.email,
                clinic_name = excluded.clinic_name,
                license_number = excluded.license_number,
                specialty = excluded.specialty,
                phone_number = excluded.phone_number
            "#,
            params![
                user.id,
                user.name,
                user.email,
                user.clinic_name,
                user.license_number,
                user.specialty,
                user.phone_number,
                user.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get a clinic user's profile.
    pub fn get_user(&self, id: &str) -> DbResult<Option<ClinicUser>> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT id, name, email, clinic_name, license_number,
                       specialty, phone_number, created_at
                FROM clinic_users
                WHERE id = ?
                "#,
                [id],
                |row| {
                    Ok((
                        ClinicUser {
                            id: row.get(0)?,
                            name: row.get(1)?,
                            email: row.get(2)?,
                            clinic_name: row.get(3)?,
                            license_number: row.get(4)?,
                            specialty: row.get(5)?,
                            phone_number: row.get(6)?,
                            created_at: Default::default(),
                        },
                        row.get::<_, String>(7)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(mut user, created_at)| {
            user.created_at = parse_timestamp(&created_at)?;
            Ok(user)
        })
        .transpose()
    }
}
