//! Gift exchange event record.
//!
//! # Invariants
//! - `exchange_date` is stored as a validated `YYYY-MM-DD` string.
//! - `budget_cents` is never negative.
//! - `drawn` flips from `false` to `true` exactly once.

use super::user::UserId;
use super::{normalize_name, ValidationError};
use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

/// Stable identifier for an exchange event.
pub type EventId = Uuid;

const EXCHANGE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Persisted exchange event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub description: String,
    pub budget_cents: i64,
    pub exchange_date: String,
    pub organizer_id: UserId,
    /// Set once the draw has been persisted.
    pub drawn: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Validated input for creating an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub name: String,
    pub description: String,
    pub budget_cents: i64,
    pub exchange_date: String,
}

impl NewEvent {
    /// Validates raw request fields into a storable event.
    ///
    /// `budget` is a currency amount and is rounded to whole cents.
    pub fn parse(
        name: &str,
        description: &str,
        budget: f64,
        exchange_date: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            name: normalize_name("event name", name)?,
            description: description.trim().to_string(),
            budget_cents: budget_to_cents(budget)?,
            exchange_date: parse_exchange_date(exchange_date)?,
        })
    }
}

/// Converts a currency amount into integer cents.
pub fn budget_to_cents(budget: f64) -> Result<i64, ValidationError> {
    if !budget.is_finite() || budget < 0.0 || budget > (i64::MAX / 100) as f64 {
        return Err(ValidationError::InvalidBudget);
    }
    Ok((budget * 100.0).round() as i64)
}

/// Parses and re-renders a calendar date in canonical `YYYY-MM-DD` form.
pub fn parse_exchange_date(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, EXCHANGE_DATE_FORMAT)
        .map(|date| date.format(EXCHANGE_DATE_FORMAT).to_string())
        .map_err(|_| ValidationError::InvalidExchangeDate(trimmed.to_string()))
}
