//! Error types for the game layer.

use banter_protocol::{RoomCode, UserId};

/// Errors that can occur during room and round operations.
///
/// Intentional no-ops are NOT errors: a non-owner trying to advance a
/// phase, a duplicate vote, or a duplicate join all return `Ok(())`
/// without mutating or notifying.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// No live room has this code.
    #[error("room {0} not found")]
    RoomNotFound(RoomCode),

    /// The user is not a member of the room in question.
    #[error("player {0} not found")]
    PlayerNotFound(UserId),

    /// The room is in a state that doesn't allow this operation.
    /// For example, starting a game with an empty question pool.
    #[error("invalid room state for this operation: {0}")]
    InvalidState(String),

    /// The code generator burned through its whole attempt budget
    /// without producing an unused code.
    #[error("room code generation exhausted its attempt budget")]
    GenerationExhausted,
}
