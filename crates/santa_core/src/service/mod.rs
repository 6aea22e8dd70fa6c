//! Use-case services layered over repositories.
//!
//! # Responsibility
//! - Orchestrate repository calls into request-level operations.
//! - Keep the HTTP layer decoupled from SQL and from the draw algorithm.

pub mod assignment;
pub mod auth_service;
pub mod draw_service;
pub mod event_service;
