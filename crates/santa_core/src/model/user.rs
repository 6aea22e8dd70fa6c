//! Organizer account record.

use serde::Serialize;
use uuid::Uuid;

/// Stable identifier for an organizer account.
pub type UserId = Uuid;

/// Registered organizer.
///
/// `password_hash` never leaves the crate boundary through serde.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    #[serde(skip)]
    pub password_hash: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}
