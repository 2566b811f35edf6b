//! The round coordinator: opens rounds, collects answers, counts votes.
//!
//! Phases move strictly through the [`RoomPhase`] machine. Two commands
//! are owner-only and tolerant: a non-owner connection invoking them is
//! a silent no-op (no error, no mutation, no notification), because
//! lobby clients fire them optimistically.
//!
//! Public methods lock the room by code. The `*_locked` cores take an
//! already-locked `&mut Room` so [`crate::RoomCoordinator`] can open
//! round 1 under its own lock without deadlocking.

use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use rand::rngs::StdRng;

use banter_protocol::{Answer, ConnectionId, RoomCode, Room, RoomPhase, UserId};

use crate::{GameError, Notifier, RoomRegistry, logic};

/// Drives the per-round phase state machine for every room.
pub struct RoundCoordinator {
    registry: Arc<RoomRegistry>,
    notifier: Notifier,
    /// Injected so tests can seed selection; locked only for a draw.
    rng: StdMutex<StdRng>,
}

impl RoundCoordinator {
    /// Creates a round coordinator over the shared registry.
    pub fn new(
        registry: Arc<RoomRegistry>,
        notifier: Notifier,
        rng: StdRng,
    ) -> Self {
        Self {
            registry,
            notifier,
            rng: StdMutex::new(rng),
        }
    }

    /// Opens the next round (owner's connection only).
    ///
    /// With the pool exhausted the room moves to `Ended` instead —
    /// that's the game-over path, not an error.
    ///
    /// # Errors
    /// `RoomNotFound` for an unknown code; `InvalidState` if a non-owner
    /// member is unready, the phase can't open a round, or selection
    /// finds nothing to draw.
    pub async fn new_round(
        &self,
        code: &RoomCode,
        connection: &ConnectionId,
    ) -> Result<(), GameError> {
        let handle = self.registry.get(code)?;
        let mut room = handle.lock().await;
        self.new_round_locked(&mut room, connection)
    }

    /// [`Self::new_round`] against an already-locked room.
    pub(crate) fn new_round_locked(
        &self,
        room: &mut Room,
        connection: &ConnectionId,
    ) -> Result<(), GameError> {
        if !room.connection_is_owner(connection) {
            tracing::debug!(
                code = %room.code,
                %connection,
                "non-owner tried to open a round, ignoring"
            );
            return Ok(());
        }
        if !room.all_guests_ready() {
            return Err(GameError::InvalidState(
                "cannot open a round while players are unready".into(),
            ));
        }
        if !room.phase.can_open_round() {
            return Err(GameError::InvalidState(format!(
                "cannot open a round from the {} phase",
                room.phase
            )));
        }

        if room.questions.is_empty() {
            room.phase = RoomPhase::Ended;
            tracing::info!(
                code = %room.code,
                rounds = room.round,
                "question pool exhausted, game over"
            );
            self.notifier.room_refreshed(room);
            return Ok(());
        }

        let question = {
            let mut rng = self.rng.lock().expect("rng lock poisoned");
            logic::select_question_and_player(room, &mut *rng)?
        };

        room.round += 1;
        for player in &mut room.players {
            player.round_voters.clear();
        }
        // Drawn without replacement: the current question leaves the pool.
        room.questions.retain(|q| q.id != question.id);
        room.current_question = Some(question);
        room.phase = RoomPhase::Answering;
        unready_all(room);

        tracing::info!(
            code = %room.code,
            round = room.round,
            remaining = room.questions.len(),
            "round opened"
        );
        self.notifier.room_refreshed(room);
        Ok(())
    }

    /// Re-arms every ready flag and opens the next phase (owner only).
    ///
    /// This is the universal phase opener: answering → voting once all
    /// answers are in, voting → reveal once all votes are in.
    ///
    /// # Errors
    /// `RoomNotFound` for an unknown code.
    pub async fn mark_all_unready(
        &self,
        code: &RoomCode,
        connection: &ConnectionId,
    ) -> Result<(), GameError> {
        let handle = self.registry.get(code)?;
        let mut room = handle.lock().await;
        self.mark_all_unready_locked(&mut room, connection);
        Ok(())
    }

    /// [`Self::mark_all_unready`] against an already-locked room.
    pub(crate) fn mark_all_unready_locked(
        &self,
        room: &mut Room,
        connection: &ConnectionId,
    ) {
        if !room.connection_is_owner(connection) {
            tracing::debug!(
                code = %room.code,
                %connection,
                "non-owner tried to advance the phase, ignoring"
            );
            return;
        }

        unready_all(room);
        let next = room.phase.advanced();
        if next != room.phase {
            tracing::debug!(
                code = %room.code,
                from = %room.phase,
                to = %next,
                "phase advanced"
            );
            room.phase = next;
        }
        self.notifier.room_refreshed(room);
    }

    /// Stores (or overwrites) a member's answer for the current round
    /// and marks them ready. All members ready ends the answering phase.
    ///
    /// # Errors
    /// `RoomNotFound` for an unknown code; `PlayerNotFound` if the
    /// answer's owner is not a member (nothing is emitted);
    /// `InvalidState` outside the answering phase.
    pub async fn add_answer(
        &self,
        code: &RoomCode,
        answer: Answer,
    ) -> Result<(), GameError> {
        let handle = self.registry.get(code)?;
        let mut room = handle.lock().await;

        if !room.contains(answer.owner) {
            return Err(GameError::PlayerNotFound(answer.owner));
        }
        if !room.phase.accepts_answers() {
            return Err(GameError::InvalidState(format!(
                "answers are not accepted in the {} phase",
                room.phase
            )));
        }

        let owner = answer.owner;
        let mut answer = answer;
        answer.votes = 0;
        if let Some(player) = room.player_mut(owner) {
            player.answer = Some(answer);
            player.ready = true;
        }

        tracing::debug!(code = %room.code, user_id = %owner, "answer stored");
        self.notifier.room_refreshed(&room);
        Ok(())
    }

    /// Casts a vote from `voter` for `answer_owner`'s current answer.
    ///
    /// A repeat vote by the same voter for the same target is a silent
    /// no-op. An accepted vote scores the flat per-vote points, updates
    /// the lifetime tallies, and marks the voter ready.
    ///
    /// # Errors
    /// `RoomNotFound` for an unknown code; `PlayerNotFound` for a
    /// missing voter or target; `InvalidState` outside the voting phase
    /// or when the target has no answer.
    pub async fn choose_answer(
        &self,
        code: &RoomCode,
        voter: UserId,
        answer_owner: UserId,
    ) -> Result<(), GameError> {
        let handle = self.registry.get(code)?;
        let mut room = handle.lock().await;

        if !room.contains(voter) {
            return Err(GameError::PlayerNotFound(voter));
        }
        if !room.contains(answer_owner) {
            return Err(GameError::PlayerNotFound(answer_owner));
        }
        if !room.phase.accepts_votes() {
            return Err(GameError::InvalidState(format!(
                "votes are not accepted in the {} phase",
                room.phase
            )));
        }

        if !logic::update_vote_pool(&mut room, voter, answer_owner)? {
            tracing::debug!(
                code = %room.code,
                %voter,
                target = %answer_owner,
                "duplicate vote, ignoring"
            );
            return Ok(());
        }

        if let Some(target) = room.player_mut(answer_owner) {
            logic::assign_points(target);
        }
        if let Some(player) = room.player_mut(voter) {
            player.ready = true;
        }

        tracing::debug!(
            code = %room.code,
            %voter,
            target = %answer_owner,
            "vote accepted"
        );
        self.notifier.room_refreshed(&room);
        Ok(())
    }
}

/// Clears every member's ready flag.
fn unready_all(room: &mut Room) {
    for player in &mut room.players {
        player.ready = false;
    }
}
