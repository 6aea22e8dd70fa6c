//! Giver to receiver assignment engine.
//!
//! # Responsibility
//! - Turn an ordered participant list into a random derangement.
//!
//! # Invariants
//! - Every participant gives exactly once and receives exactly once.
//! - Nobody is assigned to themselves.
//! - Every derangement of the input is equally likely.
//! - Pure: no I/O, randomness comes from the injected `Rng`.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::hash::Hash;

/// Smallest group the engine accepts.
pub const MIN_PARTICIPANTS: usize = 3;

/// Precondition failures. The engine never fails after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentError {
    InsufficientParticipants { actual: usize, required: usize },
    /// The same identifier appears twice; carries its first repeated index.
    DuplicateParticipant { index: usize },
}

impl Display for AssignmentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InsufficientParticipants { actual, required } => write!(
                f,
                "at least {required} participants are required, got {actual}"
            ),
            Self::DuplicateParticipant { index } => {
                write!(f, "participant at position {index} is listed more than once")
            }
        }
    }
}

impl Error for AssignmentError {}

/// A complete derangement over the input participants.
///
/// Pairs keep the giver order of the input list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment<T> {
    pairs: Vec<(T, T)>,
}

impl<T: PartialEq> Assignment<T> {
    /// `(giver, receiver)` pairs in input order.
    pub fn pairs(&self) -> &[(T, T)] {
        &self.pairs
    }

    /// Receiver assigned to `giver`, if `giver` took part.
    pub fn receiver_of(&self, giver: &T) -> Option<&T> {
        self.pairs
            .iter()
            .find(|(candidate, _)| candidate == giver)
            .map(|(_, receiver)| receiver)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn into_pairs(self) -> Vec<(T, T)> {
        self.pairs
    }
}

/// Draws a uniformly random derangement of `participants`.
///
/// Receivers are shuffled with Fisher-Yates and the shuffle is retried until
/// no position maps to itself. For n >= 3 about 1/e of all permutations are
/// derangements, so the expected number of shuffles stays below three.
///
/// # Errors
/// - `InsufficientParticipants` when fewer than `MIN_PARTICIPANTS` are given.
/// - `DuplicateParticipant` when an identifier repeats.
pub fn compute_assignment<T, R>(
    participants: &[T],
    rng: &mut R,
) -> Result<Assignment<T>, AssignmentError>
where
    T: Clone + Eq + Hash,
    R: Rng + ?Sized,
{
    validate_participants(participants)?;

    let mut order: Vec<usize> = (0..participants.len()).collect();
    loop {
        order.shuffle(rng);
        if order.iter().enumerate().all(|(giver, receiver)| giver != *receiver) {
            break;
        }
    }

    let pairs = order
        .iter()
        .enumerate()
        .map(|(giver, &receiver)| {
            (
                participants[giver].clone(),
                participants[receiver].clone(),
            )
        })
        .collect();

    Ok(Assignment { pairs })
}

fn validate_participants<T: Eq + Hash>(participants: &[T]) -> Result<(), AssignmentError> {
    if participants.len() < MIN_PARTICIPANTS {
        return Err(AssignmentError::InsufficientParticipants {
            actual: participants.len(),
            required: MIN_PARTICIPANTS,
        });
    }

    let mut seen = HashSet::with_capacity(participants.len());
    for (index, participant) in participants.iter().enumerate() {
        if !seen.insert(participant) {
            return Err(AssignmentError::DuplicateParticipant { index });
        }
    }

    Ok(())
}
