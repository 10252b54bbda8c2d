//! Patient database operations.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{Gender, Patient, PatientStatus};

const SELECT_PATIENT: &str = r#"
    SELECT id, name, species, breed, age, gender,
           owner_name, owner_email, owner_phone,
           symptoms, diagnosis, treatment, notes,
           date_created, last_visit, next_appointment, photos, status
    FROM patients
"#;

impl Database {
    /// Insert a new patient for a clinic user.
    pub fn insert_patient(&self, user_id: &str, patient: &Patient) -> DbResult<()> {
        let photos_json = serde_json::to_string(&patient.photos)?;

        self.conn.execute(
            r#"
            INSERT INTO patients (
                id, user_id, name, species, breed, age, gender,
                owner_name, owner_email, owner_phone,
                symptoms, diagnosis, treatment, notes,
                date_created, last_visit, next_appointment, photos, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)
            "#,
            params![
                patient.id,
                user_id,
                patient.name,
                patient.species,
                patient.breed,
                patient.age,
                patient.gender.map(|g| g.as_str()),
                patient.owner_name,
                patient.owner_email,
                patient.owner_phone,
                patient.symptoms,
                patient.diagnosis,
                patient.treatment,
                patient.notes,
                patient.date_created.to_rfc3339(),
                patient.last_visit.map(|t| t.to_rfc3339()),
                patient.next_appointment.map(|t| t.to_rfc3339()),
                photos_json,
                patient.status.as_str(),
            ],
        )?;
        Ok(())
    }

    /// Update an existing patient. `date_created` is never rewritten.
    pub fn update_patient(&self, user_id: &str, patient: &Patient) -> DbResult<bool> {
        let photos_json = serde_json::to_string(&patient.photos)?;

        let rows_affected = self.conn.execute(
            r#"
            UPDATE patients SET
                name = ?3,
                species = ?4,
                breed = ?5,
                age = ?6,
                gender = ?7,
                owner_name = ?8,
                owner_email = ?9,
                owner_phone = ?10,
                symptoms = ?11,
                diagnosis = ?12,
                treatment = ?13,
                notes = ?14,
                last_visit = ?15,
                next_appointment = ?16,
                photos = ?17,
                status = ?18
            WHERE id = ?1 AND user_id = ?2
            "#,
            params![
                patient.id,
                user_id,
                patient.name,
                patient.species,
                patient.breed,
                patient.age,
                patient.gender.map(|g| g.as_str()),
                patient.owner_name,
                patient.owner_email,
                patient.owner_phone,
                patient.symptoms,
                patient.diagnosis,
                patient.treatment,
                patient.notes,
                patient.last_visit.map(|t| t.to_rfc3339()),
                patient.next_appointment.map(|t| t.to_rfc3339()),
                photos_json,
                patient.status.as_str(),
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, user_id: &str, id: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!("{SELECT_PATIENT} WHERE id = ?1 AND user_id = ?2"),
                [id, user_id],
                read_row,
            )
            .optional()?
            .map(Patient::try_from)
            .transpose()
    }

    /// List a clinic user's patients in insertion order.
    pub fn list_patients(&self, user_id: &str) -> DbResult<Vec<Patient>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_PATIENT} WHERE user_id = ?1 ORDER BY rowid"))?;

        let rows = stmt.query_map([user_id], read_row)?;

        let mut patients = Vec::new();
        for row in rows {
            patients.push(row?.try_into()?);
        }
        Ok(patients)
    }

    /// Delete a patient.
    pub fn delete_patient(&self, user_id: &str, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "DELETE FROM patients WHERE id = ?1 AND user_id = ?2",
            [id, user_id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Count a clinic user's patients.
    pub fn count_patients(&self, user_id: &str) -> DbResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM patients WHERE user_id = ?1",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

/// Intermediate row struct for database mapping.
struct PatientRow {
    id: String,
    name: String,
    species: String,
    breed: Option<String>,
    age: Option<u32>,
    gender: Option<String>,
    owner_name: String,
    owner_email: String,
    owner_phone: Option<String>,
    symptoms: String,
    diagnosis: Option<String>,
    treatment: Option<String>,
    notes: Option<String>,
    date_created: String,
    last_visit: Option<String>,
    next_appointment: Option<String>,
    photos: String,
    status: String,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<PatientRow> {
    Ok(PatientRow {
        id: row.get(0)?,
        name: row.get(1)?,
        species: row.get(2)?,
        breed: row.get(3)?,
        age: row.get(4)?,
        gender: row.get(5)?,
        owner_name: row.get(6)?,
        owner_email: row.get(7)?,
        owner_phone: row.get(8)?,
        symptoms: row.get(9)?,
        diagnosis: row.get(10)?,
        treatment: row.get(11)?,
        notes: row.get(12)?,
        date_created: row.get(13)?,
        last_visit: row.get(14)?,
        next_appointment: row.get(15)?,
        photos: row.get(16)?,
        status: row.get(17)?,
    })
}

impl TryFrom<PatientRow> for Patient {
    type Error = DbError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        let photos: Vec<String> = serde_json::from_str(&row.photos)?;
        let status = row
            .status
            .parse::<PatientStatus>()
            .map_err(|e| DbError::Constraint(e.to_string()))?;
        let gender = row
            .gender
            .map(|g| g.parse::<Gender>())
            .transpose()
            .map_err(|e| DbError::Constraint(e.to_string()))?;

        Ok(Patient {
            id: row.id,
            name: row.name,
            species: row.species,
            breed: row.breed,
            age: row.age,
            gender,
            owner_name: row.owner_name,
            owner_email: row.owner_email,
            owner_phone: row.owner_phone,
            symptoms: row.symptoms,
            diagnosis: row.diagnosis,
            treatment: row.treatment,
            notes: row.notes,
            date_created: parse_timestamp(&row.date_created)?,
            last_visit: row.last_visit.as_deref().map(parse_timestamp).transpose()?,
            next_appointment: row
                .next_appointment
                .as_deref()
                .map(parse_timestamp)
                .transpose()?,
            photos,
            status,
        })
    }
}

pub(crate) fn parse_timestamp(s: &str) -> DbResult<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}
