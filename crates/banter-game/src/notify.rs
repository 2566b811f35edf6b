//! Fire-and-forget outbound notification channel.
//!
//! The coordinators enqueue [`Notification`] values and move on; the
//! real-time transport drains the receiving end and delivers at its own
//! pace. State progression never stalls on delivery, and a vanished
//! receiver (transport shut down) is silently tolerated.

use tokio::sync::mpsc;

use banter_protocol::{ConnectionId, Notification, Player, Room, RoomCode};

/// Cheap-to-clone sender handle for outbound notifications.
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
    /// Creates a notifier and the receiver the transport drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Enqueues a notification. Silently drops it if the receiver is gone.
    pub fn emit(&self, notification: Notification) {
        let _ = self.tx.send(notification);
    }

    /// Broadcast a room's new state to its group.
    pub fn room_refreshed(&self, room: &Room) {
        self.emit(Notification::RoomRefreshed { room: room.clone() });
    }

    /// Tell the transport to subscribe a connection to a room's group.
    pub fn join_room(&self, connection_id: &ConnectionId, code: &RoomCode) {
        self.emit(Notification::JoinRoom {
            connection_id: connection_id.clone(),
            code: code.clone(),
        });
    }

    /// Broadcast that a member left a room.
    pub fn player_left(&self, code: &RoomCode, player: Player) {
        self.emit(Notification::PlayerLeft {
            code: code.clone(),
            player,
        });
    }

    /// Broadcast a room's destruction to its remaining members.
    pub fn room_closed(&self, code: &RoomCode, players: Vec<Player>) {
        self.emit(Notification::RoomClosed {
            code: code.clone(),
            players,
        });
    }

    /// Broadcast the open-public-room list to the browse audience.
    pub fn public_rooms(&self, rooms: Vec<Room>) {
        self.emit(Notification::PublicRoomsRefreshed { rooms });
    }

    /// Unicast a field-scoped validation notice to one connection.
    pub fn validation_error(
        &self,
        connection_id: &ConnectionId,
        message: &str,
        field_id: &str,
    ) {
        self.emit(Notification::ValidationError {
            connection_id: connection_id.clone(),
            message: message.to_owned(),
            field_id: field_id.to_owned(),
        });
    }
}
