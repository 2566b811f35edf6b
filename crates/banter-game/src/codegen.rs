//! Room code generation.
//!
//! Codes are short and human-readable — a word plus a small number,
//! e.g. `Walrus42` — so players can shout them across a living room.
//! Uniqueness is the caller's concern: the generator keeps drawing
//! until the supplied predicate accepts (and thereby claims) a
//! candidate.

use rand::Rng;

use banter_protocol::RoomCode;

use crate::GameError;

/// How many candidates to draw before giving up.
pub const CODE_ATTEMPTS: usize = 50;

/// The fixed word list codes are built from.
const WORDS: &[&str] = &[
    "Apple", "Badger", "Comet", "Donut", "Ember", "Falcon", "Gecko",
    "Hazel", "Igloo", "Jungle", "Koala", "Lemur", "Mango", "Nugget",
    "Otter", "Pickle", "Quartz", "Rocket", "Sprout", "Tulip", "Umber",
    "Velvet", "Walrus", "Yonder", "Zephyr",
];

/// Generates a `<Word><1-99>` room code accepted by `claim`.
///
/// Draws up to [`CODE_ATTEMPTS`] candidates and returns the first one
/// the predicate accepts. The predicate is the uniqueness gate: a caller
/// that needs codes unique under concurrency must atomically reserve
/// the candidate inside it, not merely test it, so that two generators
/// racing on the same draw cannot both accept.
///
/// # Errors
/// Returns [`GameError::GenerationExhausted`] after [`CODE_ATTEMPTS`]
/// rejected draws.
pub fn generate_unique_code<R: Rng + ?Sized>(
    rng: &mut R,
    claim: impl Fn(&RoomCode) -> bool,
) -> Result<RoomCode, GameError> {
    for _ in 0..CODE_ATTEMPTS {
        let word = WORDS[rng.random_range(0..WORDS.len())];
        let number: u8 = rng.random_range(1..=99);
        let candidate = RoomCode::new(format!("{word}{number}"));
        if claim(&candidate) {
            return Ok(candidate);
        }
        tracing::trace!(code = %candidate, "code collision, redrawing");
    }
    Err(GameError::GenerationExhausted)
}

// =========================================================================
// Tests
// =========================================================================
