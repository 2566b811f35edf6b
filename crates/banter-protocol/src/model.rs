//! The room data model.
//!
//! These structures are plain data: the coordinators in `banter-game`
//! own all mutation rules, and whole [`Room`] values are snapshotted
//! into `Notification::RoomRefreshed` for the transport to broadcast.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{AnswerId, ConnectionId, QuestionId, RoomCode, UserId};

// ---------------------------------------------------------------------------
// RoomPhase
// ---------------------------------------------------------------------------

/// The phase a room is currently in.
///
/// One round cycles `Answering → Voting → Reveal`, then either loops back
/// to `Answering` (next round) or terminates in `Ended` when the question
/// pool runs dry:
///
/// ```text
/// Lobby → Answering → Voting → Reveal ─┬─→ Answering (next round)
///                                      └─→ Ended     (pool empty)
/// ```
///
/// - **Lobby**: room exists, players join and toggle ready; listed in the
///   public browser if the room is public.
/// - **Answering**: a question is current; players submit answers.
/// - **Voting**: answers are on display; players vote.
/// - **Reveal**: votes and scores are shown; the owner opens the next
///   round from here.
/// - **Ended**: no questions left. Terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomPhase {
    Lobby,
    Answering,
    Voting,
    Reveal,
    Ended,
}

impl RoomPhase {
    /// Returns `true` while the room accepts new players and shows up in
    /// the public room list.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Lobby)
    }

    /// Returns `true` if answers may be submitted.
    pub fn accepts_answers(&self) -> bool {
        matches!(self, Self::Answering)
    }

    /// Returns `true` if votes may be cast.
    pub fn accepts_votes(&self) -> bool {
        matches!(self, Self::Voting)
    }

    /// Returns `true` if a new round may be opened from this phase:
    /// round 1 from the lobby, later rounds from the reveal screen.
    pub fn can_open_round(&self) -> bool {
        matches!(self, Self::Lobby | Self::Reveal)
    }

    /// The phase after the owner re-arms everyone's ready flag.
    ///
    /// Only the two mid-round transitions move; every other phase is
    /// left unchanged (opening a round is handled separately).
    pub fn advanced(self) -> Self {
        match self {
            Self::Answering => Self::Voting,
            Self::Voting => Self::Reveal,
            other => other,
        }
    }
}

impl fmt::Display for RoomPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lobby => write!(f, "Lobby"),
            Self::Answering => write!(f, "Answering"),
            Self::Voting => write!(f, "Voting"),
            Self::Reveal => write!(f, "Reveal"),
            Self::Ended => write!(f, "Ended"),
        }
    }
}

// ---------------------------------------------------------------------------
// Answer
// ---------------------------------------------------------------------------

/// A free-text answer one player submitted for the current question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// The answer's unique ID.
    pub id: AnswerId,
    /// The player who wrote it.
    pub owner: UserId,
    /// The answer text.
    pub text: String,
    /// Votes received this round.
    pub votes: u32,
}

impl Answer {
    /// Creates a fresh answer with zero votes.
    pub fn new(id: AnswerId, owner: UserId, text: impl Into<String>) -> Self {
        Self {
            id,
            owner,
            text: text.into(),
            votes: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Question
// ---------------------------------------------------------------------------

/// A prompt from a room's question pool.
///
/// The text may embed the `****` token, which round selection replaces
/// with the selected player's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// The question's unique ID.
    pub id: QuestionId,
    /// The prompt text.
    pub text: String,
    /// The user who contributed the question.
    pub owner: UserId,
    /// Whether the question comes from the shared public catalog.
    pub is_public: bool,
    /// The member this round's prompt is about. Transient: set only
    /// while the question is the room's current question.
    pub selected_player: Option<UserId>,
}

impl Question {
    /// Creates a pool question with no player selected yet.
    pub fn new(
        id: QuestionId,
        text: impl Into<String>,
        owner: UserId,
        is_public: bool,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            owner,
            is_public,
            selected_player: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A room participant, with readiness, score, and voting bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Unique within the room.
    pub user_id: UserId,
    /// The transport connection this player commands arrive on.
    pub connection_id: ConnectionId,
    /// Display name, substituted into prompts when selected.
    pub name: String,
    /// Phase-gate flag: convergence of "everyone ready" closes a phase.
    pub ready: bool,
    /// Lifetime score within this room.
    pub points: u32,
    /// This round's answer, if submitted.
    pub answer: Option<Answer>,
    /// How many rounds this player has been the selected player.
    /// Monotonic; round selection always draws from the minimum.
    pub selection_count: u32,
    /// Who voted for this player's current answer. Reset every round.
    pub round_voters: HashSet<UserId>,
    /// Lifetime votes received, keyed by the voter. Only grows.
    pub votes_received: HashMap<UserId, u32>,
    /// Lifetime votes given, keyed by the answer owner. Only grows.
    pub votes_given: HashMap<UserId, u32>,
}

impl Player {
    /// Creates a not-ready player with empty bookkeeping.
    pub fn new(
        user_id: UserId,
        connection_id: ConnectionId,
        name: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            connection_id,
            name: name.into(),
            ready: false,
            points: 0,
            answer: None,
            selection_count: 0,
            round_voters: HashSet::new(),
            votes_received: HashMap::new(),
            votes_given: HashMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// One game session, keyed by its unique [`RoomCode`].
///
/// Invariants maintained by the coordinators:
/// - the owner is always present in `players` while the room exists;
/// - the current question was drawn from `questions` without replacement;
/// - `round_voters` on each player resets every round, while the lifetime
///   vote tallies only grow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Unique among live rooms once assigned.
    pub code: RoomCode,
    /// The creator; sole authority to advance phases and edit settings.
    pub owner: UserId,
    /// Members, in join order. The owner is always one of them.
    pub players: Vec<Player>,
    /// Whether the room appears in the public room browser.
    pub is_public: bool,
    /// Optional join password. `None` means anyone may join by owner id.
    pub password: Option<String>,
    /// The question pool, ordered and unique by question id.
    pub questions: Vec<Question>,
    /// The question of the round in progress.
    pub current_question: Option<Question>,
    /// Completed-or-running round count.
    pub round: u32,
    /// Current phase.
    pub phase: RoomPhase,
}

impl Room {
    /// Creates a private lobby with `owner` as its sole, not-ready member.
    pub fn new(code: RoomCode, owner: Player) -> Self {
        Self {
            code,
            owner: owner.user_id,
            players: vec![owner],
            is_public: false,
            password: None,
            questions: Vec::new(),
            current_question: None,
            round: 0,
            phase: RoomPhase::Lobby,
        }
    }

    /// Looks up a member by user id.
    pub fn player(&self, user_id: UserId) -> Option<&Player> {
        self.players.iter().find(|p| p.user_id == user_id)
    }

    /// Looks up a member by user id, mutably.
    pub fn player_mut(&mut self, user_id: UserId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.user_id == user_id)
    }

    /// Returns `true` if the user is a member.
    pub fn contains(&self, user_id: UserId) -> bool {
        self.player(user_id).is_some()
    }

    /// Returns `true` if the user owns this room.
    pub fn is_owner(&self, user_id: UserId) -> bool {
        self.owner == user_id
    }

    /// Returns `true` if the connection belongs to the room's owner.
    ///
    /// Owner-only commands are authorized by connection identity, not by
    /// a user id the client could fake.
    pub fn connection_is_owner(&self, connection_id: &ConnectionId) -> bool {
        self.player(self.owner)
            .is_some_and(|owner| &owner.connection_id == connection_id)
    }

    /// Returns `true` when every member except the owner is ready.
    /// The owner is exempt: they drive the phase transitions.
    pub fn all_guests_ready(&self) -> bool {
        self.players
            .iter()
            .filter(|p| p.user_id != self.owner)
            .all(|p| p.ready)
    }

    /// Returns `true` if the room belongs in the public room list:
    /// public, and still open in the lobby.
    pub fn is_listed(&self) -> bool {
        self.is_public && self.phase.is_open()
    }

    /// Removes and returns a member. The caller decides what happens to
    /// the room afterwards (destroy on owner/last-member departure).
    pub fn remove_player(&mut self, user_id: UserId) -> Option<Player> {
        let idx = self.players.iter().position(|p| p.user_id == user_id)?;
        Some(self.players.remove(idx))
    }
}

// =========================================================================
// Tests
// =========================================================================
