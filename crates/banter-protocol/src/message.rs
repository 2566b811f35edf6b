//! Inbound commands and outbound notifications.
//!
//! Both enums are internally tagged (`#[serde(tag = "type")]`) so the
//! JSON shape is `{ "type": "SetReady", "code": "Apple1", ... }` — flat
//! objects that are easy to produce and consume from a browser client.

use serde::{Deserialize, Serialize};

use crate::{Answer, ConnectionId, Player, Question, Room, RoomCode, UserId};

/// A player command, as delivered by the inbound transport.
///
/// Every command is dispatched together with the [`ConnectionId`] it
/// arrived on; the coordinator uses that identity to authorize
/// owner-only actions and to address unicast notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    /// Create a new room owned by this player.
    CreateRoom { player: Player },

    /// Replace a room's stored settings wholesale.
    EditRoom { room: Room },

    /// Toggle a member's ready flag.
    SetReady {
        code: RoomCode,
        user_id: UserId,
        ready: bool,
    },

    /// Start the game (owner's connection opens round 1).
    StartGame { code: RoomCode },

    /// Recompute and broadcast the public room list.
    RefreshPublicRooms,

    /// Remove a member from a room.
    LeaveRoom { code: RoomCode, user_id: UserId },

    /// Replace this member's contribution to the question pool.
    AddQuestions {
        code: RoomCode,
        user_id: UserId,
        questions: Vec<Question>,
    },

    /// Join a room by exact code, or by owner id + password.
    JoinRoom {
        player: Player,
        code: Option<RoomCode>,
        password: Option<String>,
        owner_id: Option<UserId>,
    },

    /// Open the next round (owner only; silent no-op otherwise).
    NewRound { code: RoomCode },

    /// Re-arm every ready flag, advancing answering → voting → reveal
    /// (owner only; silent no-op otherwise).
    MarkAllUnready { code: RoomCode },

    /// Vote for another member's current answer.
    ChooseAnswer {
        code: RoomCode,
        voter: UserId,
        answer_owner: UserId,
    },

    /// Submit (or overwrite) this round's answer.
    AddAnswer { code: RoomCode, answer: Answer },
}

/// An outbound event for the real-time transport to deliver.
///
/// Emission is fire-and-forget: the coordinators enqueue and move on,
/// never awaiting delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Notification {
    /// Broadcast the room's new state to its group.
    RoomRefreshed { room: Room },

    /// Instruct the transport to subscribe this connection to the
    /// room's broadcast group.
    JoinRoom {
        connection_id: ConnectionId,
        code: RoomCode,
    },

    /// Broadcast that a member left.
    PlayerLeft { code: RoomCode, player: Player },

    /// Broadcast that the room was destroyed, then unsubscribe each of
    /// the listed remaining players.
    RoomClosed {
        code: RoomCode,
        players: Vec<Player>,
    },

    /// Broadcast the open-public-room list to the browse audience.
    PublicRoomsRefreshed { rooms: Vec<Room> },

    /// Unicast a field-scoped validation notice to the originating
    /// connection (e.g. a wrong join password) so the client can keep
    /// its pending UI open.
    ValidationError {
        connection_id: ConnectionId,
        message: String,
        field_id: String,
    },
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The client speaks this JSON directly, so the tag layout is pinned
    //! here: a mismatch means the browser client silently drops events.

    use super::*;

    fn sample_player() -> Player {
        Player::new(UserId(1), ConnectionId::from("conn-1"), "alice")
    }

    #[test]
    fn test_command_set_ready_json_format() {
        let cmd = Command::SetReady {
            code: RoomCode::from("Apple1"),
            user_id: UserId(2),
            ready: true,
        };
        let json: serde_json::Value = serde_json::to_value(&cmd).unwrap();

        assert_eq!(json["type"], "SetReady");
        assert_eq!(json["code"], "Apple1");
        assert_eq!(json["user_id"], 2);
        assert_eq!(json["ready"], true);
    }

    #[test]
    fn test_command_refresh_public_rooms_is_tag_only() {
        let json = serde_json::to_string(&Command::RefreshPublicRooms).unwrap();
        assert_eq!(json, r#"{"type":"RefreshPublicRooms"}"#);
    }

    #[test]
    fn test_command_join_room_optional_fields_null() {
        let cmd = Command::JoinRoom {
            player: sample_player(),
            code: None,
            password: None,
            owner_id: Some(UserId(9)),
        };
        let json: serde_json::Value = serde_json::to_value(&cmd).unwrap();

        assert_eq!(json["type"], "JoinRoom");
        assert!(json["code"].is_null());
        assert!(json["password"].is_null());
        assert_eq!(json["owner_id"], 9);
    }

    #[test]
    fn test_command_add_answer_round_trip() {
        let cmd = Command::AddAnswer {
            code: RoomCode::from("Mango7"),
            answer: Answer::new(crate::AnswerId(4), UserId(2), "pineapple"),
        };
        let bytes = serde_json::to_vec(&cmd).unwrap();
        let decoded: Command = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(cmd, decoded);
    }

    #[test]
    fn test_notification_validation_error_json_format() {
        let note = Notification::ValidationError {
            connection_id: ConnectionId::from("conn-9"),
            message: "Wrong password".into(),
            field_id: "password".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&note).unwrap();

        assert_eq!(json["type"], "ValidationError");
        assert_eq!(json["connection_id"], "conn-9");
        assert_eq!(json["field_id"], "password");
    }

    #[test]
    fn test_notification_room_refreshed_round_trip() {
        let note = Notification::RoomRefreshed {
            room: Room::new(RoomCode::from("Apple1"), sample_player()),
        };
        let bytes = serde_json::to_vec(&note).unwrap();
        let decoded: Notification = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(note, decoded);
    }

    #[test]
    fn test_notification_room_closed_round_trip() {
        let note = Notification::RoomClosed {
            code: RoomCode::from("Apple1"),
            players: vec![sample_player()],
        };
        let bytes = serde_json::to_vec(&note).unwrap();
        let decoded: Notification = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(note, decoded);
    }

    #[test]
    fn test_decode_unknown_command_type_returns_error() {
        let unknown = r#"{"type": "TeleportRoom", "code": "Apple1"}"#;
        let result: Result<Command, _> = serde_json::from_str(unknown);
        assert!(result.is_err());
    }
}
