//! The room coordinator: create, edit, join, leave, start.
//!
//! Every command locks at most one room at a time; commands that touch
//! two rooms (eviction on create/join) finish with the first room and
//! release its lock before touching the target, so lock order can never
//! deadlock. Notification emission is fire-and-forget throughout.

use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use rand::SeedableRng;
use rand::rngs::StdRng;

use banter_protocol::{
    ConnectionId, Player, Question, Room, RoomCode, UserId,
};

use crate::{GameError, Notifier, RoomRegistry, RoundCoordinator, codegen};

/// How a join request resolved its target room.
enum JoinTarget {
    Found(RoomCode),
    WrongPassword,
    NotFound,
}

/// Coordinates room lifecycle for every live room.
pub struct RoomCoordinator {
    registry: Arc<RoomRegistry>,
    notifier: Notifier,
    rounds: RoundCoordinator,
    /// Injected so tests can seed code generation.
    rng: StdMutex<StdRng>,
}

impl RoomCoordinator {
    /// Creates a room coordinator (and its round coordinator) over a
    /// shared registry. `rng` seeds both code generation and round
    /// selection; production seeds it from OS entropy.
    pub fn new(
        registry: Arc<RoomRegistry>,
        notifier: Notifier,
        mut rng: StdRng,
    ) -> Self {
        let round_rng = StdRng::from_rng(&mut rng);
        let rounds = RoundCoordinator::new(
            Arc::clone(&registry),
            notifier.clone(),
            round_rng,
        );
        Self {
            registry,
            notifier,
            rounds,
            rng: StdMutex::new(rng),
        }
    }

    /// The round coordinator sharing this coordinator's registry.
    pub fn rounds(&self) -> &RoundCoordinator {
        &self.rounds
    }

    /// The shared registry (test and composition access).
    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    /// Creates a room with `owner` as its sole, not-ready member and
    /// returns the generated code.
    ///
    /// A creator still belonging to another room is an anomaly the
    /// command tolerates: they are evicted first (destroying that room
    /// if they owned it or were its last member).
    ///
    /// # Errors
    /// `GenerationExhausted` if no unused code could be drawn.
    pub async fn create_room(
        &self,
        mut owner: Player,
    ) -> Result<RoomCode, GameError> {
        self.evict(owner.user_id).await;

        let connection = owner.connection_id.clone();
        let user_id = owner.user_id;
        owner.ready = false;

        // The predicate claims the candidate in the registry itself, so
        // concurrent creates can never share a code: the loser of the
        // entry race just redraws.
        let code = {
            let mut rng = self.rng.lock().expect("rng lock poisoned");
            codegen::generate_unique_code(&mut *rng, |candidate| {
                let room = Room::new(candidate.clone(), owner.clone());
                self.registry.insert_if_absent(candidate.clone(), room)
            })?
        };
        self.registry.track(user_id, code.clone());

        let snapshot = Room::new(code.clone(), owner);

        tracing::info!(%code, owner = %user_id, "room created");
        self.notifier.join_room(&connection, &code);
        self.notifier.room_refreshed(&snapshot);
        Ok(code)
    }

    /// Replaces a room's stored state wholesale.
    ///
    /// # Errors
    /// `InvalidState` on a blank code or an empty member list;
    /// `RoomNotFound` if no live room has the code.
    pub async fn edit_room(&self, room: Room) -> Result<(), GameError> {
        if room.code.is_empty() {
            return Err(GameError::InvalidState(
                "cannot edit a room without a code".into(),
            ));
        }
        if room.players.is_empty() {
            return Err(GameError::InvalidState(
                "cannot edit a room with no players".into(),
            ));
        }

        let handle = self.registry.get(&room.code)?;
        let is_public = {
            let mut stored = handle.lock().await;
            let previous: Vec<UserId> =
                stored.players.iter().map(|p| p.user_id).collect();
            *stored = room;
            // The membership index follows the stored player list, both
            // ways: members the replacement dropped are untracked.
            for user_id in previous {
                if !stored.contains(user_id) {
                    self.registry.untrack(user_id);
                }
            }
            for player in &stored.players {
                self.registry.track(player.user_id, stored.code.clone());
            }
            tracing::debug!(code = %stored.code, "room edited");
            self.notifier.room_refreshed(&stored);
            stored.is_public
        };

        if is_public {
            self.refresh_public_rooms().await;
        }
        Ok(())
    }

    /// Sets a member's ready flag.
    ///
    /// # Errors
    /// `RoomNotFound` / `PlayerNotFound` if either is missing.
    pub async fn set_ready(
        &self,
        code: &RoomCode,
        user_id: UserId,
        ready: bool,
    ) -> Result<(), GameError> {
        let handle = self.registry.get(code)?;
        let mut room = handle.lock().await;
        let player = room
            .player_mut(user_id)
            .ok_or(GameError::PlayerNotFound(user_id))?;
        player.ready = ready;
        self.notifier.room_refreshed(&room);
        Ok(())
    }

    /// Starts the game: opens round 1 on the owner's behalf and removes
    /// the room from the public list. A non-owner connection leaves the
    /// room untouched in the lobby (silent no-op).
    ///
    /// # Errors
    /// `RoomNotFound` for an unknown code; `InvalidState` on an empty
    /// question pool or a room already past the lobby.
    pub async fn start_game(
        &self,
        code: &RoomCode,
        connection: &ConnectionId,
    ) -> Result<(), GameError> {
        let handle = self.registry.get(code)?;
        let started = {
            let mut room = handle.lock().await;
            if room.questions.is_empty() {
                return Err(GameError::InvalidState(
                    "cannot start a game with an empty question pool".into(),
                ));
            }
            if !room.phase.is_open() {
                return Err(GameError::InvalidState(
                    "the game has already started".into(),
                ));
            }
            self.rounds.new_round_locked(&mut room, connection)?;
            !room.phase.is_open()
        };

        if started {
            tracing::info!(%code, "game started");
            self.refresh_public_rooms().await;
        }
        Ok(())
    }

    /// Removes a member from a room.
    ///
    /// The room is destroyed when it empties or its owner leaves;
    /// `RoomClosed` goes out to the remaining members before the
    /// registry entry disappears. Otherwise the public list refreshes.
    ///
    /// # Errors
    /// `RoomNotFound` / `PlayerNotFound` if either is missing.
    pub async fn leave_room(
        &self,
        code: &RoomCode,
        user_id: UserId,
    ) -> Result<(), GameError> {
        let handle = self.registry.get(code)?;
        let mut room = handle.lock().await;
        let player = room
            .remove_player(user_id)
            .ok_or(GameError::PlayerNotFound(user_id))?;
        self.registry.untrack(user_id);

        tracing::info!(
            %code,
            %user_id,
            remaining = room.players.len(),
            "player left"
        );
        self.notifier.player_left(code, player);

        if room.players.is_empty() || room.is_owner(user_id) {
            let remaining = room.players.clone();
            self.notifier.room_closed(code, remaining);
            drop(room);
            self.registry.remove(code);
            tracing::info!(%code, "room destroyed");
        } else {
            drop(room);
            self.refresh_public_rooms().await;
        }
        Ok(())
    }

    /// Joins a room, resolved either by exact code or by the target
    /// owner's id plus a password check.
    ///
    /// Resolution failures are not errors: the originating connection
    /// gets a field-scoped validation notice (`"code"` or `"password"`)
    /// and nothing mutates. Joining a room the player is already in is
    /// a silent no-op.
    pub async fn join_room(
        &self,
        mut player: Player,
        code: Option<RoomCode>,
        password: Option<String>,
        owner_id: Option<UserId>,
    ) -> Result<(), GameError> {
        let connection = player.connection_id.clone();

        let target = match (code, owner_id) {
            (Some(code), _) if self.registry.contains(&code) => code,
            (Some(code), _) => {
                tracing::debug!(%code, "join rejected: unknown code");
                self.notifier
                    .validation_error(&connection, "Room not found", "code");
                return Ok(());
            }
            (None, Some(owner_id)) => {
                match self.resolve_by_owner(owner_id, password.as_deref()).await {
                    JoinTarget::Found(code) => code,
                    JoinTarget::WrongPassword => {
                        tracing::debug!(
                            owner = %owner_id,
                            "join rejected: wrong password"
                        );
                        self.notifier.validation_error(
                            &connection,
                            "Wrong password",
                            "password",
                        );
                        return Ok(());
                    }
                    JoinTarget::NotFound => {
                        tracing::debug!(
                            owner = %owner_id,
                            "join rejected: owner has no room"
                        );
                        self.notifier.validation_error(
                            &connection,
                            "Room not found",
                            "code",
                        );
                        return Ok(());
                    }
                }
            }
            (None, None) => {
                self.notifier
                    .validation_error(&connection, "Room not found", "code");
                return Ok(());
            }
        };

        // Duplicate join: already a member of the target, nothing to do.
        if self.registry.room_of(player.user_id) == Some(target.clone()) {
            tracing::debug!(
                code = %target,
                user_id = %player.user_id,
                "duplicate join, ignoring"
            );
            return Ok(());
        }

        self.evict(player.user_id).await;

        let handle = self.registry.get(&target)?;
        {
            let mut room = handle.lock().await;
            player.ready = false;
            let user_id = player.user_id;
            room.players.push(player);
            self.registry.track(user_id, target.clone());
            tracing::info!(
                code = %target,
                %user_id,
                players = room.players.len(),
                "player joined"
            );
            self.notifier.join_room(&connection, &target);
            self.notifier.room_refreshed(&room);
        }
        self.refresh_public_rooms().await;
        Ok(())
    }

    /// Replaces one member's contribution to the question pool.
    ///
    /// Per submitter this is remove-then-append, which makes it
    /// idempotent; other submitters' questions are untouched. The owner
    /// may carry public catalog questions in (purging the previous
    /// public set first); everyone else contributes only their own.
    ///
    /// # Errors
    /// `RoomNotFound` / `PlayerNotFound` if either is missing.
    pub async fn add_questions(
        &self,
        code: &RoomCode,
        user_id: UserId,
        questions: Vec<Question>,
    ) -> Result<(), GameError> {
        let handle = self.registry.get(code)?;
        let mut room = handle.lock().await;
        if !room.contains(user_id) {
            return Err(GameError::PlayerNotFound(user_id));
        }

        let is_owner = room.is_owner(user_id);
        let incoming: Vec<Question> = questions
            .into_iter()
            .filter(|q| q.owner == user_id || (is_owner && q.is_public))
            .collect();

        if is_owner {
            room.questions.retain(|q| !q.is_public);
        }
        room.questions.retain(|q| q.owner != user_id);
        for question in incoming {
            // Pool stays unique by question id.
            if !room.questions.iter().any(|q| q.id == question.id) {
                room.questions.push(question);
            }
        }

        tracing::debug!(
            %code,
            %user_id,
            pool = room.questions.len(),
            "question pool updated"
        );
        self.notifier.room_refreshed(&room);
        Ok(())
    }

    /// Recomputes and broadcasts the open-public-room list.
    pub async fn refresh_public_rooms(&self) {
        let rooms = self.registry.public_open().await;
        self.notifier.public_rooms(rooms);
    }

    /// Resolves a join-by-owner request through the membership index
    /// (the owner is always a member of their own room).
    async fn resolve_by_owner(
        &self,
        owner_id: UserId,
        password: Option<&str>,
    ) -> JoinTarget {
        let Some(code) = self.registry.room_of(owner_id) else {
            return JoinTarget::NotFound;
        };
        let Ok(handle) = self.registry.get(&code) else {
            return JoinTarget::NotFound;
        };
        let room = handle.lock().await;
        if !room.is_owner(owner_id) {
            // The owner id is just a guest somewhere else.
            return JoinTarget::NotFound;
        }
        match &room.password {
            None => JoinTarget::Found(code),
            Some(stored) if Some(stored.as_str()) == password => {
                JoinTarget::Found(code)
            }
            Some(_) => JoinTarget::WrongPassword,
        }
    }

    /// Removes a player from whatever room they are still in.
    ///
    /// Used by create/join to enforce "one room at a time". Being in a
    /// room at this point is anomalous but tolerated.
    async fn evict(&self, user_id: UserId) {
        let Some(code) = self.registry.room_of(user_id) else {
            return;
        };
        tracing::warn!(
            %user_id,
            %code,
            "user still belongs to a room, evicting"
        );
        if let Err(error) = self.leave_room(&code, user_id).await {
            // The stale entry is cleared either way.
            tracing::debug!(%user_id, %code, %error, "eviction cleanup failed");
            self.registry.untrack(user_id);
        }
    }
}
