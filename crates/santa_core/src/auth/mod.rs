//! Credential primitives: password digests and signed bearer tokens.
//!
//! # Invariants
//! - Secrets are compared in constant time.
//! - Nothing in this module logs secret material.

pub mod password;
pub mod token;
