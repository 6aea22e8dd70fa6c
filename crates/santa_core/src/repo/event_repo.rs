//! Exchange event persistence.
//!
//! # Invariants
//! - `mark_drawn` is a check-and-set: it flips `drawn` only from 0 to 1 and
//!   reports whether this call performed the flip.

use super::{parse_bool, parse_uuid, RepoError, RepoResult};
use crate::model::event::{Event, EventId, NewEvent};
use crate::model::user::UserId;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const EVENT_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    description,
    budget_cents,
    exchange_date,
    organizer_uuid,
    drawn,
    created_at
FROM events";

/// Repository interface for exchange events.
pub trait EventRepository {
    fn create_event(&self, organizer_id: UserId, event: &NewEvent) -> RepoResult<Event>;
    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>>;
    /// Lists events owned by `organizer_id`, newest first.
    fn list_events_for_organizer(&self, organizer_id: UserId) -> RepoResult<Vec<Event>>;
    /// Sets `drawn` if unset. Returns `false` when the event was already drawn.
    fn mark_drawn(&self, id: EventId) -> RepoResult<bool>;
}

/// SQLite-backed event repository.
pub struct SqliteEventRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEventRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EventRepository for SqliteEventRepository<'_> {
    fn create_event(&self, organizer_id: UserId, event: &NewEvent) -> RepoResult<Event> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO events (
                uuid,
                name,
                description,
                budget_cents,
                exchange_date,
                organizer_uuid
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                id.to_string(),
                event.name.as_str(),
                event.description.as_str(),
                event.budget_cents,
                event.exchange_date.as_str(),
                organizer_id.to_string(),
            ],
        )?;

        self.get_event(id)?
            .ok_or_else(|| RepoError::InvalidData(format!("event {id} missing after insert")))
    }

    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>> {
        self.conn
            .query_row(
                &format!("{EVENT_SELECT_SQL} WHERE uuid = ?1;"),
                [id.to_string()],
                read_event_row,
            )
            .optional()?
            .map(parse_event_row)
            .transpose()
    }

    fn list_events_for_organizer(&self, organizer_id: UserId) -> RepoResult<Vec<Event>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EVENT_SELECT_SQL}
             WHERE organizer_uuid = ?1
             ORDER BY created_at DESC, rowid DESC;"
        ))?;
        let mut rows = stmt.query([organizer_id.to_string()])?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(parse_event_row(read_event_row(row)?)?);
        }
        Ok(events)
    }

    fn mark_drawn(&self, id: EventId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE events SET drawn = 1 WHERE uuid = ?1 AND drawn = 0;",
            [id.to_string()],
        )?;
        if changed == 1 {
            return Ok(true);
        }

        match self.get_event(id)? {
            Some(_) => Ok(false),
            None => Err(RepoError::NotFound(id)),
        }
    }
}

struct RawEvent {
    uuid: String,
    name: String,
    description: String,
    budget_cents: i64,
    exchange_date: String,
    organizer_uuid: String,
    drawn: i64,
    created_at: i64,
}

fn read_event_row(row: &Row<'_>) -> rusqlite::Result<RawEvent> {
    Ok(RawEvent {
        uuid: row.get("uuid")?,
        name: row.get("name")?,
        description: row.get("description")?,
        budget_cents: row.get("budget_cents")?,
        exchange_date: row.get("exchange_date")?,
        organizer_uuid: row.get("organizer_uuid")?,
        drawn: row.get("drawn")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_event_row(raw: RawEvent) -> RepoResult<Event> {
    Ok(Event {
        id: parse_uuid(&raw.uuid, "events.uuid")?,
        name: raw.name,
        description: raw.description,
        budget_cents: raw.budget_cents,
        exchange_date: raw.exchange_date,
        organizer_id: parse_uuid(&raw.organizer_uuid, "events.organizer_uuid")?,
        drawn: parse_bool(raw.drawn, "events.drawn")?,
        created_at: raw.created_at,
    })
}
