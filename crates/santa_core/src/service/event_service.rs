//! Event and participant use-cases for organizers.
//!
//! # Responsibility
//! - Create and list an organizer's events.
//! - Add participants while the event is still open.
//! - Resolve a participant's drawn receiver by email.
//!
//! # Invariants
//! - Organizers only see and modify their own events; foreign events are
//!   reported as not found.
//! - Participants cannot be added once the event is drawn.

use crate::model::event::{Event, EventId, NewEvent};
use crate::model::participant::{NewParticipant, Participant};
use crate::model::user::UserId;
use crate::model::{normalize_email, ValidationError};
use crate::repo::event_repo::EventRepository;
use crate::repo::participant_repo::ParticipantRepository;
use crate::repo::RepoError;
use log::info;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum EventServiceError {
    Validation(ValidationError),
    EventNotFound(EventId),
    ParticipantNotFound,
    /// Event is closed for changes because the draw already happened.
    AlreadyDrawn(EventId),
    /// Assignment was requested before the draw.
    NotDrawnYet(EventId),
    DuplicateParticipantEmail,
    Repo(RepoError),
    InconsistentState(&'static str),
}

impl Display for EventServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::EventNotFound(id) => write!(f, "event not found: {id}"),
            Self::ParticipantNotFound => write!(f, "participant not found"),
            Self::AlreadyDrawn(id) => write!(f, "event {id} has already been drawn"),
            Self::NotDrawnYet(id) => write!(f, "event {id} has not been drawn yet"),
            Self::DuplicateParticipantEmail => {
                write!(f, "a participant with this email already exists in the event")
            }
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent event state: {details}"),
        }
    }
}

impl Error for EventServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for EventServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for EventServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::EventNotFound(id),
            RepoError::Duplicate(_) => Self::DuplicateParticipantEmail,
            other => Self::Repo(other),
        }
    }
}

/// Raw input for creating an event.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateEventRequest {
    pub name: String,
    pub description: String,
    /// Suggested budget in currency units.
    pub budget: f64,
    /// `YYYY-MM-DD`.
    pub exchange_date: String,
}

/// Raw input for adding a participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddParticipantRequest {
    pub name: String,
    /// Empty means the participant has no email.
    pub email: String,
    pub wishlist: String,
}

/// Event together with its participants in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventDetail {
    pub event: Event,
    pub participants: Vec<Participant>,
}

/// What a participant may learn about their draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentView {
    pub participant_name: String,
    pub receiver_name: String,
    pub receiver_wishlist: String,
}

/// Event service facade over event and participant repositories.
pub struct EventService<E: EventRepository, P: ParticipantRepository> {
    events: E,
    participants: P,
}

impl<E: EventRepository, P: ParticipantRepository> EventService<E, P> {
    pub fn new(events: E, participants: P) -> Self {
        Self {
            events,
            participants,
        }
    }

    /// Validates and stores a new event owned by `organizer_id`.
    pub fn create_event(
        &self,
        organizer_id: UserId,
        request: &CreateEventRequest,
    ) -> Result<Event, EventServiceError> {
        let new_event = NewEvent::parse(
            &request.name,
            &request.description,
            request.budget,
            &request.exchange_date,
        )?;
        let event = self.events.create_event(organizer_id, &new_event)?;
        info!(
            "event=event_create module=event status=ok event_id={} organizer_id={}",
            event.id, organizer_id
        );
        Ok(event)
    }

    /// Lists the organizer's events, newest first.
    pub fn list_events(&self, organizer_id: UserId) -> Result<Vec<Event>, EventServiceError> {
        Ok(self.events.list_events_for_organizer(organizer_id)?)
    }

    /// Loads one owned event with its participants.
    pub fn get_event(
        &self,
        organizer_id: UserId,
        event_id: EventId,
    ) -> Result<EventDetail, EventServiceError> {
        let event = self.owned_event(organizer_id, event_id)?;
        let participants = self.participants.list_participants(event_id)?;
        Ok(EventDetail {
            event,
            participants,
        })
    }

    /// Adds a participant to an owned, not yet drawn event.
    pub fn add_participant(
        &self,
        organizer_id: UserId,
        event_id: EventId,
        request: &AddParticipantRequest,
    ) -> Result<Participant, EventServiceError> {
        let new_participant =
            NewParticipant::parse(&request.name, &request.email, &request.wishlist)?;
        let event = self.owned_event(organizer_id, event_id)?;
        if event.drawn {
            return Err(EventServiceError::AlreadyDrawn(event_id));
        }

        let participant = self
            .participants
            .create_participant(event_id, &new_participant)?;
        info!(
            "event=participant_add module=event status=ok event_id={} participant_id={}",
            event_id, participant.id
        );
        Ok(participant)
    }

    /// Returns the receiver drawn for the participant registered with `email`.
    ///
    /// Needs no organizer: knowing the event id and the email is the credential.
    pub fn lookup_assignment(
        &self,
        event_id: EventId,
        email: &str,
    ) -> Result<AssignmentView, EventServiceError> {
        let Ok(email) = normalize_email(email) else {
            return Err(EventServiceError::ParticipantNotFound);
        };
        let participant = self
            .participants
            .find_participant_by_email(event_id, &email)?
            .ok_or(EventServiceError::ParticipantNotFound)?;

        let Some(receiver_id) = participant.assigned_to else {
            return Err(EventServiceError::NotDrawnYet(event_id));
        };
        let receiver = self
            .participants
            .get_participant(receiver_id)?
            .ok_or(EventServiceError::InconsistentState(
                "assigned receiver missing",
            ))?;

        Ok(AssignmentView {
            participant_name: participant.name,
            receiver_name: receiver.name,
            receiver_wishlist: receiver.wishlist,
        })
    }

    fn owned_event(
        &self,
        organizer_id: UserId,
        event_id: EventId,
    ) -> Result<Event, EventServiceError> {
        match self.events.get_event(event_id)? {
            Some(event) if event.organizer_id == organizer_id => Ok(event),
            _ => Err(EventServiceError::EventNotFound(event_id)),
        }
    }
}
