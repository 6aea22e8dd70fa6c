//! Request and response records plus their handlers.

use axum::{extract::State, http::StatusCode, Json};
use rand::{rngs::StdRng, SeedableRng};
use santa_core::{
    draw_event, AddParticipantRequest, AuthService, AuthSession, CreateEventRequest, Event,
    EventId, EventService, Participant, SqliteEventRepository, SqliteParticipantRepository,
    SqliteUserRepository, User,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::ApiError,
    extract::{ApiJson, ApiPath, ApiQuery},
    state::{with_db, SharedState},
};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct CreateEventBody {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub budget: f64,
    pub exchange_date: String,
}

#[derive(Deserialize)]
pub struct AddParticipantBody {
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub wishlist: String,
}

#[derive(Deserialize)]
pub struct MyAssignmentQuery {
    pub participant_email: String,
}

#[derive(Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
}

#[derive(Serialize, Deserialize)]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

#[derive(Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: UserView,
}

#[derive(Serialize, Deserialize)]
pub struct EventView {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub budget: f64,
    pub exchange_date: String,
    pub drawn: bool,
    pub created_at: i64,
}

/// Organizer-facing participant. Receivers stay secret; only whether one
/// was assigned is shown.
#[derive(Serialize, Deserialize)]
pub struct ParticipantView {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub wishlist: String,
    pub assigned: bool,
}

#[derive(Serialize, Deserialize)]
pub struct EventsResponse {
    pub events: Vec<EventView>,
}

#[derive(Serialize, Deserialize)]
pub struct EventResponse {
    pub event: EventView,
}

#[derive(Serialize, Deserialize)]
pub struct EventDetailResponse {
    pub event: EventView,
    pub participants: Vec<ParticipantView>,
}

#[derive(Serialize, Deserialize)]
pub struct ParticipantResponse {
    pub participant: ParticipantView,
}

#[derive(Serialize, Deserialize)]
pub struct DrawResponse {
    pub message: String,
    pub assignments: usize,
}

#[derive(Serialize, Deserialize)]
pub struct ReceiverView {
    pub name: String,
    pub wishlist: String,
}

#[derive(Serialize, Deserialize)]
pub struct MyAssignmentResponse {
    pub your_name: String,
    pub assigned_to: ReceiverView,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}

impl From<AuthSession> for TokenResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            access_token: session.access_token,
            token_type: "bearer".to_string(),
            user: session.user.into(),
        }
    }
}

impl From<Event> for EventView {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            name: event.name,
            description: event.description,
            budget: event.budget_cents as f64 / 100.0,
            exchange_date: event.exchange_date,
            drawn: event.drawn,
            created_at: event.created_at,
        }
    }
}

impl From<Participant> for ParticipantView {
    fn from(participant: Participant) -> Self {
        Self {
            id: participant.id,
            name: participant.name,
            email: participant.email,
            wishlist: participant.wishlist,
            assigned: participant.assigned_to.is_some(),
        }
    }
}

pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Secret Santa API".to_string(),
        version: santa_core::core_version().to_string(),
    })
}

pub async fn register_handler(
    State(state): State<SharedState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    let session = with_db(&state, move |conn, signer| {
        Ok(AuthService::new(SqliteUserRepository::new(conn), signer).register(
            &payload.email,
            &payload.password,
            &payload.name,
        )?)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(session.into())))
}

pub async fn login_handler(
    State(state): State<SharedState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let session = with_db(&state, move |conn, signer| {
        Ok(AuthService::new(SqliteUserRepository::new(conn), signer)
            .login(&payload.email, &payload.password)?)
    })
    .await?;

    Ok(Json(session.into()))
}

pub async fn list_events_handler(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
) -> Result<Json<EventsResponse>, ApiError> {
    let events = with_db(&state, move |conn, _| {
        Ok(event_service(conn).list_events(user.id)?)
    })
    .await?;

    Ok(Json(EventsResponse {
        events: events.into_iter().map(EventView::from).collect(),
    }))
}

pub async fn create_event_handler(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    ApiJson(payload): ApiJson<CreateEventBody>,
) -> Result<(StatusCode, Json<EventResponse>), ApiError> {
    let request = CreateEventRequest {
        name: payload.name,
        description: payload.description,
        budget: payload.budget,
        exchange_date: payload.exchange_date,
    };
    let event = with_db(&state, move |conn, _| {
        Ok(event_service(conn).create_event(user.id, &request)?)
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(EventResponse {
            event: event.into(),
        }),
    ))
}

pub async fn get_event_handler(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    ApiPath(event_id): ApiPath<EventId>,
) -> Result<Json<EventDetailResponse>, ApiError> {
    let detail = with_db(&state, move |conn, _| {
        Ok(event_service(conn).get_event(user.id, event_id)?)
    })
    .await?;

    Ok(Json(EventDetailResponse {
        event: detail.event.into(),
        participants: detail
            .participants
            .into_iter()
            .map(ParticipantView::from)
            .collect(),
    }))
}

pub async fn add_participant_handler(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    ApiPath(event_id): ApiPath<EventId>,
    ApiJson(payload): ApiJson<AddParticipantBody>,
) -> Result<(StatusCode, Json<ParticipantResponse>), ApiError> {
    let request = AddParticipantRequest {
        name: payload.name,
        email: payload.email,
        wishlist: payload.wishlist,
    };
    let participant = with_db(&state, move |conn, _| {
        Ok(event_service(conn).add_participant(user.id, event_id, &request)?)
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ParticipantResponse {
            participant: participant.into(),
        }),
    ))
}

pub async fn draw_handler(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    ApiPath(event_id): ApiPath<EventId>,
) -> Result<Json<DrawResponse>, ApiError> {
    let outcome = with_db(&state, move |conn, _| {
        let mut rng = StdRng::from_entropy();
        Ok(draw_event(conn, user.id, event_id, &mut rng)?)
    })
    .await?;

    Ok(Json(DrawResponse {
        message: "Draw completed".to_string(),
        assignments: outcome.assignments,
    }))
}

pub async fn my_assignment_handler(
    State(state): State<SharedState>,
    ApiPath(event_id): ApiPath<EventId>,
    ApiQuery(query): ApiQuery<MyAssignmentQuery>,
) -> Result<Json<MyAssignmentResponse>, ApiError> {
    let view = with_db(&state, move |conn, _| {
        Ok(event_service(conn).lookup_assignment(event_id, &query.participant_email)?)
    })
    .await?;

    Ok(Json(MyAssignmentResponse {
        your_name: view.participant_name,
        assigned_to: ReceiverView {
            name: view.receiver_name,
            wishlist: view.receiver_wishlist,
        },
    }))
}

fn event_service(
    conn: &rusqlite::Connection,
) -> EventService<SqliteEventRepository<'_>, SqliteParticipantRepository<'_>> {
    EventService::new(
        SqliteEventRepository::new(conn),
        SqliteParticipantRepository::new(conn),
    )
}
