//! One-time draw of an event.
//!
//! # Responsibility
//! - Gate the draw on the event's `drawn` flag.
//! - Run the assignment engine over the event's participants.
//! - Persist every `giver -> receiver` pair.
//!
//! # Invariants
//! - Gate, computation and persistence share one `BEGIN IMMEDIATE`
//!   transaction, so concurrent draws of one event cannot both commit.
//! - A rejected draw leaves the event and its participants untouched.

use crate::model::event::EventId;
use crate::model::user::UserId;
use crate::repo::event_repo::{EventRepository, SqliteEventRepository};
use crate::repo::participant_repo::{ParticipantRepository, SqliteParticipantRepository};
use crate::repo::RepoError;
use crate::service::assignment::{compute_assignment, AssignmentError};
use log::{info, warn};
use rand::Rng;
use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

#[derive(Debug)]
pub enum DrawError {
    EventNotFound(EventId),
    AlreadyDrawn(EventId),
    InsufficientParticipants { actual: usize, required: usize },
    Assignment(AssignmentError),
    Repo(RepoError),
}

impl Display for DrawError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EventNotFound(id) => write!(f, "event not found: {id}"),
            Self::AlreadyDrawn(id) => write!(f, "event {id} has already been drawn"),
            Self::InsufficientParticipants { actual, required } => write!(
                f,
                "at least {required} participants are required, got {actual}"
            ),
            Self::Assignment(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DrawError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Assignment(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AssignmentError> for DrawError {
    fn from(value: AssignmentError) -> Self {
        match value {
            AssignmentError::InsufficientParticipants { actual, required } => {
                Self::InsufficientParticipants { actual, required }
            }
            other => Self::Assignment(other),
        }
    }
}

impl From<RepoError> for DrawError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::EventNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<rusqlite::Error> for DrawError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(value.into())
    }
}

/// Summary of a committed draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawOutcome {
    pub event_id: EventId,
    /// Number of persisted `giver -> receiver` pairs.
    pub assignments: usize,
}

/// Draws `event_id` on behalf of its organizer and persists the result.
///
/// # Errors
/// - `EventNotFound` when the event is missing or owned by someone else.
/// - `AlreadyDrawn` when a previous draw committed.
/// - `InsufficientParticipants` when fewer than three participants exist.
pub fn draw_event<R: Rng + ?Sized>(
    conn: &mut Connection,
    organizer_id: UserId,
    event_id: EventId,
    rng: &mut R,
) -> Result<DrawOutcome, DrawError> {
    let started_at = Instant::now();
    info!("event=draw module=draw status=start event_id={event_id}");

    let result = draw_in_transaction(conn, organizer_id, event_id, rng);
    match &result {
        Ok(outcome) => info!(
            "event=draw module=draw status=ok event_id={} assignments={} duration_ms={}",
            event_id,
            outcome.assignments,
            started_at.elapsed().as_millis()
        ),
        Err(err) => warn!(
            "event=draw module=draw status=error event_id={} duration_ms={} error={}",
            event_id,
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

fn draw_in_transaction<R: Rng + ?Sized>(
    conn: &mut Connection,
    organizer_id: UserId,
    event_id: EventId,
    rng: &mut R,
) -> Result<DrawOutcome, DrawError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let assignments = {
        let events = SqliteEventRepository::new(&tx);
        let participants = SqliteParticipantRepository::new(&tx);

        match events.get_event(event_id)? {
            Some(event) if event.organizer_id == organizer_id => {
                if event.drawn {
                    return Err(DrawError::AlreadyDrawn(event_id));
                }
            }
            _ => return Err(DrawError::EventNotFound(event_id)),
        }

        let ids: Vec<_> = participants
            .list_participants(event_id)?
            .into_iter()
            .map(|participant| participant.id)
            .collect();
        let assignment = compute_assignment(&ids, rng)?;

        if !events.mark_drawn(event_id)? {
            return Err(DrawError::AlreadyDrawn(event_id));
        }
        for (giver, receiver) in assignment.pairs() {
            participants.set_assignment(*giver, *receiver)?;
        }
        assignment.len()
    };

    tx.commit()?;
    Ok(DrawOutcome {
        event_id,
        assignments,
    })
}
