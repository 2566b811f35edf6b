//! Unified error type for the Banter workspace.

use banter_game::GameError;
use banter_protocol::ProtocolError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `banter` meta-crate, you deal with this single error
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant auto-generates `From` impls, so the `?`
/// operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum BanterError {
    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A game-level error (unknown room, invalid state, exhausted
    /// code generation).
    #[error(transparent)]
    Game(#[from] GameError),
}
