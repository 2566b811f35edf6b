//! The composition root: routes inbound commands to the coordinators.
//!
//! A transport adapter (out of scope here) feeds each decoded
//! [`Command`] into [`GameService::dispatch`] together with the
//! [`ConnectionId`] it arrived on, and drains the [`Notifier`] receiver
//! on the other side. The service itself is `&self` throughout, so one
//! instance serves any number of concurrent connections.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use banter_game::{Notifier, RoomCoordinator, RoomRegistry};
use banter_protocol::{Command, ConnectionId, Notification};
use tokio::sync::mpsc;

use crate::BanterError;

/// Owns the coordinators and routes player commands to them.
pub struct GameService {
    rooms: RoomCoordinator,
}

impl GameService {
    /// Builds a service over a fresh registry with the given rng seed
    /// source. Returns the service and the notification receiver the
    /// transport drains.
    pub fn new(rng: StdRng) -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (notifier, rx) = Notifier::channel();
        let registry = Arc::new(RoomRegistry::new());
        let rooms = RoomCoordinator::new(registry, notifier, rng);
        (Self { rooms }, rx)
    }

    /// Builds a production service seeded from OS entropy.
    pub fn from_entropy() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        Self::new(StdRng::from_os_rng())
    }

    /// The room coordinator (direct access for composition and tests).
    pub fn rooms(&self) -> &RoomCoordinator {
        &self.rooms
    }

    /// Routes one command from one connection to the right coordinator.
    ///
    /// `connection` is the transport identity of the caller; it
    /// authorizes owner-only commands and addresses unicast
    /// notifications. For commands that carry a [`banter_protocol::Player`],
    /// the caller's connection overrides whatever the client claimed.
    ///
    /// # Errors
    /// Surfaces the coordinator's [`banter_game::GameError`] unchanged;
    /// intentional no-ops come back as `Ok(())`.
    pub async fn dispatch(
        &self,
        connection: &ConnectionId,
        command: Command,
    ) -> Result<(), BanterError> {
        tracing::trace!(%connection, ?command, "dispatching command");
        match command {
            Command::CreateRoom { mut player } => {
                player.connection_id = connection.clone();
                self.rooms.create_room(player).await?;
            }
            Command::EditRoom { room } => {
                self.rooms.edit_room(room).await?;
            }
            Command::SetReady {
                code,
                user_id,
                ready,
            } => {
                self.rooms.set_ready(&code, user_id, ready).await?;
            }
            Command::StartGame { code } => {
                self.rooms.start_game(&code, connection).await?;
            }
            Command::RefreshPublicRooms => {
                self.rooms.refresh_public_rooms().await;
            }
            Command::LeaveRoom { code, user_id } => {
                self.rooms.leave_room(&code, user_id).await?;
            }
            Command::AddQuestions {
                code,
                user_id,
                questions,
            } => {
                self.rooms.add_questions(&code, user_id, questions).await?;
            }
            Command::JoinRoom {
                mut player,
                code,
                password,
                owner_id,
            } => {
                player.connection_id = connection.clone();
                self.rooms
                    .join_room(player, code, password, owner_id)
                    .await?;
            }
            Command::NewRound { code } => {
                self.rooms.rounds().new_round(&code, connection).await?;
            }
            Command::MarkAllUnready { code } => {
                self.rooms
                    .rounds()
                    .mark_all_unready(&code, connection)
                    .await?;
            }
            Command::ChooseAnswer {
                code,
                voter,
                answer_owner,
            } => {
                self.rooms
                    .rounds()
                    .choose_answer(&code, voter, answer_owner)
                    .await?;
            }
            Command::AddAnswer { code, answer } => {
                self.rooms.rounds().add_answer(&code, answer).await?;
            }
        }
        Ok(())
    }
}
