//! SQLite schema for the job store.
//!
//! Versions are tracked in `PRAGMA user_version`. Each entry upgrades the
//! database from the previous version.

use rusqlite::Connection;

use crate::error::Result;

pub struct VersionedSchema {
    pub version: i64,
    pub up: &'static str,
}

pub const VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 1,
    up: "
        CREATE TABLE jobs (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            identity_key    TEXT    NOT NULL UNIQUE,
            title           TEXT    NOT NULL,
            company         TEXT    NOT NULL DEFAULT '',
            location        TEXT    NOT NULL DEFAULT '',
            salary_min      REAL,
            salary_max      REAL,
            salary_currency TEXT,
            salary_interval TEXT,
            job_url         TEXT    NOT NULL UNIQUE,
            source          TEXT    NOT NULL,
            description     TEXT    NOT NULL DEFAULT '',
            level           TEXT,
            category        TEXT    NOT NULL,
            date_posted     TEXT,
            created_at      TEXT    NOT NULL
        );
        CREATE INDEX idx_jobs_created_at ON jobs (created_at);
        CREATE INDEX idx_jobs_level ON jobs (level);
    ",
}];

pub fn latest_version() -> i64 {
    VERSIONED_SCHEMAS.last().map_or(0, |s| s.version)
}

/// Bring the database up to the latest schema version.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    let current: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    if current >= latest_version() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for schema in VERSIONED_SCHEMAS.iter().filter(|s| s.version > current) {
        log::info!("Migrating job store schema to version {}", schema.version);
        tx.execute_batch(schema.up)?;
    }
    tx.pragma_update(None, "user_version", latest_version())?;
    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrate_is_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();

        let version: i64 = conn
            .query_row("PRAGMA user_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, latest_version());

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='jobs'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(tables, 1);
    }
}
