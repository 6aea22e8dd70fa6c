//! Ordered schema steps.
//!
//! # Invariants
//! - Step versions start at 1 and increase by one.
//! - `PRAGMA user_version` always equals the last committed step.
//! - Each step commits together with its version bump.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// One forward-only schema change.
#[derive(Debug)]
pub struct SchemaStep {
    pub version: u32,
    pub name: &'static str,
    sql: &'static str,
}

static STEPS: [SchemaStep; 2] = [
    SchemaStep {
        version: 1,
        name: "init",
        sql: include_str!("0001_init.sql"),
    },
    SchemaStep {
        version: 2,
        name: "participant_email_unique",
        sql: include_str!("0002_participant_email_unique.sql"),
    },
];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |step| step.version)
}

/// Reads the schema version stored in the database header.
pub fn schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
}

/// Steps newer than `current`, oldest first.
pub fn pending_steps(current: u32) -> impl Iterator<Item = &'static SchemaStep> {
    STEPS.iter().filter(move |step| step.version > current)
}

/// Runs every pending step and returns how many were applied.
///
/// # Errors
/// - `SchemaTooNew` when the database is ahead of this build.
/// - `Migration` naming the first step that failed.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let found = schema_version(conn)?;
    let supported = latest_version();
    if found > supported {
        return Err(DbError::SchemaTooNew { found, supported });
    }

    let mut applied = 0;
    for step in pending_steps(found) {
        run_step(conn, step).map_err(|source| DbError::Migration {
            version: step.version,
            name: step.name,
            source,
        })?;
        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            step.version, step.name
        );
        applied += 1;
    }
    Ok(applied)
}

fn run_step(conn: &mut Connection, step: &SchemaStep) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(step.sql)?;
    tx.pragma_update(None, "user_version", step.version)?;
    tx.commit()
}

#[cfg(test)]
mod tests {
    use super::{
        apply_migrations, latest_version, pending_steps, run_step, schema_version, STEPS,
    };
    use rusqlite::Connection;

    #[test]
    fn step_versions_are_contiguous_from_one() {
        for (index, step) in STEPS.iter().enumerate() {
            assert_eq!(step.version as usize, index + 1, "step {}", step.name);
        }
        assert_eq!(latest_version() as usize, STEPS.len());
    }

    #[test]
    fn pending_steps_skip_applied_versions() {
        let names: Vec<_> = pending_steps(1).map(|step| step.name).collect();
        assert_eq!(names, vec!["participant_email_unique"]);
        assert_eq!(pending_steps(latest_version()).count(), 0);
    }

    #[test]
    fn apply_migrations_runs_each_step_once() {
        let mut conn = Connection::open_in_memory().unwrap();

        assert_eq!(apply_migrations(&mut conn).unwrap(), STEPS.len());
        assert_eq!(schema_version(&conn).unwrap(), latest_version());
        assert_eq!(apply_migrations(&mut conn).unwrap(), 0);
    }

    fn has_index(conn: &Connection, name: &str) -> bool {
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'index' AND name = ?1);",
            [name],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn participant_email_index_arrives_with_its_own_step() {
        let mut conn = Connection::open_in_memory().unwrap();

        run_step(&mut conn, &STEPS[0]).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), 1);
        assert!(!has_index(&conn, "idx_participants_event_email"));

        assert_eq!(apply_migrations(&mut conn).unwrap(), 1);
        assert!(has_index(&conn, "idx_participants_event_email"));
    }
}
