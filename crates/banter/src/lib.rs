//! # Banter
//!
//! In-memory coordinator for a real-time social party game: players
//! join a shared room by short code, answer prompts about a selected
//! player, vote on each other's answers, and score points across
//! rounds.
//!
//! The workspace splits into:
//! - `banter-protocol` — commands, notifications, and the data model;
//! - `banter-game` — the registry and the room/round coordinators;
//! - `banter` (this crate) — the [`GameService`] composition root and
//!   the unified [`BanterError`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use banter::prelude::*;
//!
//! # async fn run() -> Result<(), BanterError> {
//! let (service, mut notifications) = GameService::from_entropy();
//!
//! // The transport feeds commands in...
//! let conn = ConnectionId::from("conn-1");
//! let alice = Player::new(UserId(1), conn.clone(), "alice");
//! service.dispatch(&conn, Command::CreateRoom { player: alice }).await?;
//!
//! // ...and delivers notifications out.
//! while let Some(note) = notifications.recv().await {
//!     // hand `note` to the real-time transport
//!     # let _ = note; break;
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod service;

pub use error::BanterError;
pub use service::GameService;

/// The common imports for embedding the coordinator.
pub mod prelude {
    pub use banter_game::{
        GameError, Notifier, RoomCoordinator, RoomRegistry, RoundCoordinator,
    };
    pub use banter_protocol::{
        Answer, AnswerId, Command, ConnectionId, Notification, Player,
        Question, QuestionId, Room, RoomCode, RoomPhase, UserId,
    };

    pub use crate::{BanterError, GameService};
}
