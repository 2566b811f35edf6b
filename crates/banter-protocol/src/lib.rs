//! Message types and data model for Banter.
//!
//! This crate defines everything that crosses the coordinator's boundary:
//!
//! - **Identity types** ([`UserId`], [`ConnectionId`], [`RoomCode`], ...) —
//!   newtype keys used throughout the workspace.
//! - **Data model** ([`Room`], [`Player`], [`Question`], [`Answer`],
//!   [`RoomPhase`]) — the state that gets snapshotted into notifications.
//! - **Messages** ([`Command`], [`Notification`]) — inbound player
//!   commands and outbound events for the real-time transport.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how messages are
//!   converted to/from bytes at the transport edge.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while encoding
//!   or decoding.
//!
//! The transport itself is not part of this workspace; it consumes
//! [`Notification`] values from a channel and feeds [`Command`] values in,
//! tagged with the opaque [`ConnectionId`] they arrived on.

mod codec;
mod error;
mod message;
mod model;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use message::{Command, Notification};
pub use model::{Answer, Player, Question, Room, RoomPhase};
pub use types::{AnswerId, ConnectionId, QuestionId, RoomCode, UserId};
