//! Core domain logic for the Secret Santa exchange backend.
//! This crate is the single source of truth for draw and ownership invariants.

pub mod auth;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use auth::password::{hash_password, verify_password};
pub use auth::token::{Claims, TokenError, TokenSigner};
pub use logging::{
    default_log_level, init_logging, logging_status, parse_level, LogSink, LoggingError,
};
pub use model::event::{Event, EventId, NewEvent};
pub use model::participant::{NewParticipant, Participant, ParticipantId};
pub use model::user::{User, UserId};
pub use model::ValidationError;
pub use repo::event_repo::{EventRepository, SqliteEventRepository};
pub use repo::participant_repo::{ParticipantRepository, SqliteParticipantRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::assignment::{compute_assignment, Assignment, AssignmentError, MIN_PARTICIPANTS};
pub use service::auth_service::{AuthError, AuthService, AuthSession};
pub use service::draw_service::{draw_event, DrawError, DrawOutcome};
pub use service::event_service::{
    AddParticipantRequest, AssignmentView, CreateEventRequest, EventDetail, EventService,
    EventServiceError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
