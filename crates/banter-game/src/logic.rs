//! Pure round algorithms: selection, vote-pool bookkeeping, scoring.
//!
//! Nothing here performs I/O or emits notifications — the coordinators
//! call these against a room they have already locked. Randomness is
//! injected so tests can pin outcomes with a seeded generator.

use rand::Rng;

use banter_protocol::{Player, Question, Room, UserId};

use crate::GameError;

/// Points granted to an answer's owner per accepted vote.
pub const POINTS_PER_VOTE: u32 = 10;

/// The substitution token a question may embed; every occurrence is
/// replaced with the selected player's name.
pub const NAME_TOKEN: &str = "****";

/// Picks the next question and the player it will be about.
///
/// The question is drawn uniformly at random from the pool (it is NOT
/// removed here — the round coordinator installs it and takes it out of
/// the pool). The player is drawn uniformly among the members tied at
/// the room-wide minimum selection count, which rotates who gets
/// featured; the winner's count goes up by one.
///
/// # Errors
/// `InvalidState` if the room has no members, or no questions left.
/// An empty member list is checked first.
pub fn select_question_and_player<R: Rng + ?Sized>(
    room: &mut Room,
    rng: &mut R,
) -> Result<Question, GameError> {
    if room.players.is_empty() {
        return Err(GameError::InvalidState(
            "no players to select from".into(),
        ));
    }
    if room.questions.is_empty() {
        return Err(GameError::InvalidState("question pool is empty".into()));
    }

    let mut question =
        room.questions[rng.random_range(0..room.questions.len())].clone();

    let min = room
        .players
        .iter()
        .map(|p| p.selection_count)
        .min()
        .unwrap_or(0);
    let candidates: Vec<usize> = room
        .players
        .iter()
        .enumerate()
        .filter(|(_, p)| p.selection_count == min)
        .map(|(i, _)| i)
        .collect();
    let chosen = candidates[rng.random_range(0..candidates.len())];

    let player = &mut room.players[chosen];
    player.selection_count += 1;

    if question.text.contains(NAME_TOKEN) {
        question.text = question.text.replace(NAME_TOKEN, &player.name);
    }
    question.selected_player = Some(player.user_id);

    Ok(question)
}

/// Records one vote from `voter` for `target`'s current answer.
///
/// Idempotent per round: if the voter already voted for this target,
/// nothing changes and `Ok(false)` comes back. On the first application
/// the answer's vote count, the target's round voter set, and both
/// lifetime tallies (received and given) all move — the tallies persist
/// for the life of the room and only ever grow.
///
/// # Errors
/// `PlayerNotFound` if either id is not a member; `InvalidState` if the
/// target has no answer to vote for.
pub fn update_vote_pool(
    room: &mut Room,
    voter: UserId,
    target: UserId,
) -> Result<bool, GameError> {
    {
        let target_player = room
            .player(target)
            .ok_or(GameError::PlayerNotFound(target))?;
        if target_player.answer.is_none() {
            return Err(GameError::InvalidState(format!(
                "player {target} has no answer to vote for"
            )));
        }
        if target_player.round_voters.contains(&voter) {
            return Ok(false);
        }
    }
    if !room.contains(voter) {
        return Err(GameError::PlayerNotFound(voter));
    }

    // Borrow the two players one at a time; voter and target may even be
    // the same member.
    {
        let target_player = room
            .player_mut(target)
            .ok_or(GameError::PlayerNotFound(target))?;
        if let Some(answer) = target_player.answer.as_mut() {
            answer.votes += 1;
        }
        target_player.round_voters.insert(voter);
        *target_player.votes_received.entry(voter).or_insert(0) += 1;
    }
    {
        let voter_player = room
            .player_mut(voter)
            .ok_or(GameError::PlayerNotFound(voter))?;
        *voter_player.votes_given.entry(target).or_insert(0) += 1;
    }

    Ok(true)
}

/// Grants the flat per-vote score to an answer's owner.
///
/// Call exactly once per accepted, non-duplicate vote — the caller
/// gates on [`update_vote_pool`] returning `true`.
pub fn assign_points(target: &mut Player) {
    target.points += POINTS_PER_VOTE;
}

// =========================================================================
// Tests
// =========================================================================
