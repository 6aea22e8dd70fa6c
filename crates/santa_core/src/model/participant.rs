//! Exchange participant record.
//!
//! # Invariants
//! - `email`, when present, is normalized and unique within its event.
//! - `assigned_to` is only written by a draw and points into the same event.

use super::event::EventId;
use super::{normalize_email, normalize_name, ValidationError};
use serde::Serialize;
use uuid::Uuid;

/// Stable identifier for a participant within an event.
pub type ParticipantId = Uuid;

/// Persisted participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub event_id: EventId,
    pub name: String,
    pub email: Option<String>,
    pub wishlist: String,
    /// Receiver chosen by the draw.
    pub assigned_to: Option<ParticipantId>,
}

/// Validated input for adding a participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewParticipant {
    pub name: String,
    pub email: Option<String>,
    pub wishlist: String,
}

impl NewParticipant {
    /// Validates raw request fields. A blank email means "no email".
    pub fn parse(name: &str, email: &str, wishlist: &str) -> Result<Self, ValidationError> {
        let email = if email.trim().is_empty() {
            None
        } else {
            Some(normalize_email(email)?)
        };

        Ok(Self {
            name: normalize_name("participant name", name)?,
            email,
            wishlist: wishlist.trim().to_string(),
        })
    }
}
