//! Participant persistence, including draw results.

use super::{map_unique_violation, parse_uuid, RepoError, RepoResult};
use crate::model::event::EventId;
use crate::model::participant::{NewParticipant, Participant, ParticipantId};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const PARTICIPANT_SELECT_SQL: &str = "SELECT
    uuid,
    event_uuid,
    name,
    email,
    wishlist,
    assigned_to
FROM participants";

/// Repository interface for event participants.
pub trait ParticipantRepository {
    /// Inserts a participant. Fails with `Duplicate("participant email")`
    /// when the email is already used in the same event.
    fn create_participant(
        &self,
        event_id: EventId,
        participant: &NewParticipant,
    ) -> RepoResult<Participant>;
    fn get_participant(&self, id: ParticipantId) -> RepoResult<Option<Participant>>;
    /// Lists participants of one event in insertion order.
    fn list_participants(&self, event_id: EventId) -> RepoResult<Vec<Participant>>;
    fn find_participant_by_email(
        &self,
        event_id: EventId,
        email: &str,
    ) -> RepoResult<Option<Participant>>;
    /// Records that `giver` gives to `receiver`.
    fn set_assignment(&self, giver: ParticipantId, receiver: ParticipantId) -> RepoResult<()>;
}

/// SQLite-backed participant repository.
pub struct SqliteParticipantRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteParticipantRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ParticipantRepository for SqliteParticipantRepository<'_> {
    fn create_participant(
        &self,
        event_id: EventId,
        participant: &NewParticipant,
    ) -> RepoResult<Participant> {
        let id = Uuid::new_v4();
        self.conn
            .execute(
                "INSERT INTO participants (uuid, event_uuid, name, email, wishlist)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    id.to_string(),
                    event_id.to_string(),
                    participant.name.as_str(),
                    participant.email.as_deref(),
                    participant.wishlist.as_str(),
                ],
            )
            .map_err(|err| map_unique_violation(err, "participant email"))?;

        self.get_participant(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("participant {id} missing after insert"))
        })
    }

    fn get_participant(&self, id: ParticipantId) -> RepoResult<Option<Participant>> {
        self.conn
            .query_row(
                &format!("{PARTICIPANT_SELECT_SQL} WHERE uuid = ?1;"),
                [id.to_string()],
                read_participant_row,
            )
            .optional()?
            .map(parse_participant_row)
            .transpose()
    }

    fn list_participants(&self, event_id: EventId) -> RepoResult<Vec<Participant>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PARTICIPANT_SELECT_SQL}
             WHERE event_uuid = ?1
             ORDER BY created_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([event_id.to_string()])?;
        let mut participants = Vec::new();
        while let Some(row) = rows.next()? {
            participants.push(parse_participant_row(read_participant_row(row)?)?);
        }
        Ok(participants)
    }

    fn find_participant_by_email(
        &self,
        event_id: EventId,
        email: &str,
    ) -> RepoResult<Option<Participant>> {
        self.conn
            .query_row(
                &format!(
                    "{PARTICIPANT_SELECT_SQL}
                     WHERE event_uuid = ?1
                       AND email = ?2 COLLATE NOCASE;"
                ),
                params![event_id.to_string(), email],
                read_participant_row,
            )
            .optional()?
            .map(parse_participant_row)
            .transpose()
    }

    fn set_assignment(&self, giver: ParticipantId, receiver: ParticipantId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE participants SET assigned_to = ?2 WHERE uuid = ?1;",
            params![giver.to_string(), receiver.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(giver));
        }
        Ok(())
    }
}

struct RawParticipant {
    uuid: String,
    event_uuid: String,
    name: String,
    email: Option<String>,
    wishlist: String,
    assigned_to: Option<String>,
}

fn read_participant_row(row: &Row<'_>) -> rusqlite::Result<RawParticipant> {
    Ok(RawParticipant {
        uuid: row.get("uuid")?,
        event_uuid: row.get("event_uuid")?,
        name: row.get("name")?,
        email: row.get("email")?,
        wishlist: row.get("wishlist")?,
        assigned_to: row.get("assigned_to")?,
    })
}

fn parse_participant_row(raw: RawParticipant) -> RepoResult<Participant> {
    let assigned_to = match raw.assigned_to.as_deref() {
        Some(value) => Some(parse_uuid(value, "participants.assigned_to")?),
        None => None,
    };

    Ok(Participant {
        id: parse_uuid(&raw.uuid, "participants.uuid")?,
        event_id: parse_uuid(&raw.event_uuid, "participants.event_uuid")?,
        name: raw.name,
        email: raw.email,
        wishlist: raw.wishlist,
        assigned_to,
    })
}
