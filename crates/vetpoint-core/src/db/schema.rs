//! SQLite schema definition.

/// Complete database schema for VetPoint.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Clinic Users
-- ============================================================================

CREATE TABLE IF NOT EXISTS clinic_users (
    id TEXT PRIMARY KEY,                         -- identity from the auth provider
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    clinic_name TEXT NOT NULL DEFAULT '',
    license_number TEXT NOT NULL DEFAULT '',
    specialty TEXT,
    phone_number TEXT,
    created_at TEXT NOT NULL
);

-- ============================================================================
-- Patients (scoped per clinic user)
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    name TEXT NOT NULL,
    species TEXT NOT NULL,
    breed TEXT,
    age INTEGER CHECK (age IS NULL OR age >= 0),
    gender TEXT CHECK (gender IS NULL OR gender IN ('male', 'female')),
    owner_name TEXT NOT NULL,
    owner_email TEXT NOT NULL,
    owner_phone TEXT,
    symptoms TEXT NOT NULL,
    diagnosis TEXT,
    treatment TEXT,
    notes TEXT,
    date_created TEXT NOT NULL,
    last_visit TEXT,
    next_appointment TEXT,
    photos TEXT NOT NULL DEFAULT '[]',           -- JSON array of strings
    status TEXT NOT NULL DEFAULT 'active'
        CHECK (status IN ('active', 'in_treatment', 'recovered', 'emergency'))
);

CREATE INDEX IF NOT EXISTS idx_patients_user ON patients(user_id);
CREATE INDEX IF NOT EXISTS idx_patients_appointment ON patients(next_appointment);

-- date_created is immutable
CREATE TRIGGER IF NOT EXISTS patients_date_created_immutable BEFORE UPDATE OF date_created ON patients
WHEN new.date_created IS NOT old.date_created
BEGIN
    SELECT RAISE(ABORT, 'date_created is immutable');
END;
"#;
