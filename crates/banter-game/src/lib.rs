//! Room registry and game coordinators for Banter.
//!
//! This is the concurrency- and algorithm-sensitive core of the party
//! game: many rooms live at once, each receiving commands from several
//! player connections concurrently. The registry is a sharded
//! concurrent map; each room's state serializes on its own lock, held
//! for the duration of exactly one command. Outbound notifications go
//! through a fire-and-forget channel so state progression never stalls
//! on transport delivery.
//!
//! # Key types
//!
//! - [`RoomCoordinator`] — room lifecycle: create, edit, join, leave, start
//! - [`RoundCoordinator`] — round phases: answers, votes, next round
//! - [`RoomRegistry`] — concurrent code → room map + membership index
//! - [`Notifier`] — outbound notification sink
//! - [`GameError`] — the command error taxonomy
//!
//! Pure round algorithms (selection fairness, vote bookkeeping,
//! scoring) live in [`logic`]; room code generation in [`codegen`].

pub mod codegen;
pub mod logic;

mod error;
mod notify;
mod registry;
mod rooms;
mod rounds;

pub use error::GameError;
pub use notify::Notifier;
pub use registry::{RoomHandle, RoomRegistry};
pub use rooms::RoomCoordinator;
pub use rounds::RoundCoordinator;
