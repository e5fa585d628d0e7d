//! One room's game state machine.
//!
//! A `Room` owns everything about a single session and is only ever touched
//! by one caller at a time. It never measures time: the orchestrator decides
//! when each timed transition fires and stamps the displayed timer.

mod audit;
mod player;
mod round;
mod score;

pub use player::LeaveOutcome;

use crate::config::PhaseTimers;
use crate::error::{GameError, GameResult};
use crate::scoring::{MAX_ENTRIES_PER_SUBMISSION, MAX_ENTRY_CHARS};
use crate::types::*;
use std::collections::{BTreeSet, HashMap, VecDeque};

pub const MAX_PLAYERS: usize = 6;
pub const MIN_PLAYERS: usize = 2;

/// Refuse a submission whose items would make duplicate detection
/// expensive.
pub fn check_submission_size<S: AsRef<str>>(items: &[S]) -> GameResult<()> {
    if items.len() > MAX_ENTRIES_PER_SUBMISSION {
        return Err(GameError::TooManyEntries(MAX_ENTRIES_PER_SUBMISSION));
    }
    if items
        .iter()
        .any(|item| item.as_ref().chars().count() > MAX_ENTRY_CHARS)
    {
        return Err(GameError::EntryTooLong(MAX_ENTRY_CHARS));
    }
    Ok(())
}

/// What follows the audit or a finished vote
#[derive(Debug, Clone, PartialEq)]
pub enum AuditStep {
    /// Another challenged entry is now up for a vote
    Vote(Challenge),
    /// Nothing left to vote on; the round has been scored
    Score(RoundResults),
}

#[derive(Debug, Clone)]
pub struct Room {
    code: RoomCode,
    phase: GamePhase,
    players: HashMap<PlayerId, Player>,
    next_join_seq: u64,
    host_id: Option<PlayerId>,
    settings: Settings,
    timers: PhaseTimers,
    started: bool,
    total_rounds: u32,
    current_round: u32,
    categories: Vec<Category>,
    current_category: Option<Category>,
    scores: ScoreMap,
    answers: HashMap<PlayerId, String>,
    marked_answers: Vec<AnswerEntry>,
    reveal_index: usize,
    timer_value: u32,
    challenged: VecDeque<usize>,
    current_challenge: Option<Challenge>,
    votes: HashMap<PlayerId, Verdict>,
    rejected: BTreeSet<usize>,
}

/// Allowed phase changes. Scoring may be reached early when audit and
/// voting are skipped.
fn is_valid_phase_transition(from: GamePhase, to: GamePhase) -> bool {
    use GamePhase::*;

    match (from, to) {
        (Lobby, CategoryReveal) => true,
        (CategoryReveal, Countdown) => true,
        (Countdown, Typing) => true,
        (Typing, Locked) => true,
        (Locked, Reveal) => true,
        (Reveal, Audit) => true,
        (Audit, Voting) => true,
        (Voting, Voting) => true,

        (Locked | Reveal | Audit | Voting, Scoring) => true,
        (Scoring, CategoryReveal) => true,

        // hard stop from anywhere in a game, reset from anywhere
        (Lobby | GameOver, GameOver) => false,
        (_, GameOver) => true,
        (_, Lobby) => true,

        _ => false,
    }
}

impl Room {
    pub fn new(code: impl Into<RoomCode>) -> Self {
        Self::with_timers(code, PhaseTimers::default())
    }

    pub fn with_timers(code: impl Into<RoomCode>, timers: PhaseTimers) -> Self {
        Self {
            code: code.into(),
            phase: GamePhase::Lobby,
            players: HashMap::new(),
            next_join_seq: 0,
            host_id: None,
            settings: Settings::default(),
            timers,
            started: false,
            total_rounds: 0,
            current_round: 0,
            categories: Vec::new(),
            current_category: None,
            scores: ScoreMap::new(),
            answers: HashMap::new(),
            marked_answers: Vec::new(),
            reveal_index: 0,
            timer_value: 0,
            challenged: VecDeque::new(),
            current_challenge: None,
            votes: HashMap::new(),
            rejected: BTreeSet::new(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn host_id(&self) -> Option<&str> {
        self.host_id.as_deref()
    }

    pub fn is_host(&self, player_id: &str) -> bool {
        self.host_id.as_deref() == Some(player_id)
    }

    pub fn has_player(&self, player_id: &str) -> bool {
        self.players.contains_key(player_id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    pub fn current_category(&self) -> Option<&Category> {
        self.current_category.as_ref()
    }

    pub fn scores(&self) -> &ScoreMap {
        &self.scores
    }

    pub fn marked_answers(&self) -> &[AnswerEntry] {
        &self.marked_answers
    }

    pub fn current_challenge(&self) -> Option<&Challenge> {
        self.current_challenge.as_ref()
    }

    pub fn timer_value(&self) -> u32 {
        self.timer_value
    }

    pub fn set_timer(&mut self, value: u32) {
        self.timer_value = value;
    }

    /// Count the displayed timer down by one; returns the new value.
    pub fn tick(&mut self) -> u32 {
        self.timer_value = self.timer_value.saturating_sub(1);
        self.timer_value
    }

    fn require_phase(&self, phase: GamePhase) -> GameResult<()> {
        if self.phase != phase {
            return Err(GameError::WrongPhase(self.phase));
        }
        Ok(())
    }

    fn require_player(&self, player_id: &str) -> GameResult<&Player> {
        self.players.get(player_id).ok_or(GameError::UnknownPlayer)
    }

    fn transition(&mut self, to: GamePhase) -> GameResult<()> {
        if !is_valid_phase_transition(self.phase, to) {
            return Err(GameError::WrongPhase(self.phase));
        }
        tracing::debug!("Room {}: {} -> {}", self.code, self.phase, to);
        self.phase = to;
        Ok(())
    }

    fn players_in_join_order(&self) -> Vec<&Player> {
        let mut players: Vec<&Player> = self.players.values().collect();
        players.sort_by_key(|p| p.join_seq);
        players
    }

    /// Clear everything that only lives for one round.
    fn clear_round_state(&mut self) {
        self.answers.clear();
        self.marked_answers.clear();
        self.reveal_index = 0;
        self.challenged.clear();
        self.current_challenge = None;
        self.votes.clear();
        self.rejected.clear();
    }

    /// Players in join order with their current score.
    pub fn player_list(&self) -> Vec<PlayerInfo> {
        self.players_in_join_order()
            .into_iter()
            .map(|p| PlayerInfo {
                id: p.id.clone(),
                name: p.name.clone(),
                score: self.scores.get(&p.id).copied().unwrap_or(0),
                is_host: self.is_host(&p.id),
            })
            .collect()
    }

    pub fn player_info(&self, player_id: &str) -> Option<PlayerInfo> {
        self.player_list().into_iter().find(|p| p.id == player_id)
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            room_code: self.code.clone(),
            phase: self.phase,
            players: self.player_list(),
            host_id: self.host_id.clone(),
            current_round: self.current_round,
            total_rounds: self.total_rounds,
            current_category: self.current_category.clone(),
            timer_value: self.timer_value,
            scores: self.scores.clone(),
            settings: self.settings.clone(),
            submitted_count: self.answers.len(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_new_room_is_empty_lobby() {
        let room = Room::new("ABCD");
        assert_eq!(room.code(), "ABCD");
        assert_eq!(room.phase(), GamePhase::Lobby);
        assert!(room.host_id().is_none());
        assert!(room.player_list().is_empty());
        assert_eq!(room.settings(), &Settings::default());
    }

    #[test]
    fn test_phase_transition_table() {
        use GamePhase::*;
        assert!(is_valid_phase_transition(Lobby, CategoryReveal));
        assert!(is_valid_phase_transition(Scoring, CategoryReveal));
        assert!(is_valid_phase_transition(Locked, Scoring));
        assert!(is_valid_phase_transition(Typing, GameOver));
        assert!(is_valid_phase_transition(GameOver, Lobby));
        assert!(!is_valid_phase_transition(Lobby, Typing));
        assert!(!is_valid_phase_transition(Typing, Scoring));
        assert!(!is_valid_phase_transition(Lobby, GameOver));
        assert!(!is_valid_phase_transition(GameOver, GameOver));
    }

    #[test]
    fn test_snapshot_is_an_owned_copy() {
        let room = room_with(&["p1", "p2"]);
        let mut snapshot = room.snapshot();
        snapshot.players.clear();
        snapshot.scores.insert("p1".to_string(), 99);

        assert_eq!(room.player_list().len(), 2);
        assert_eq!(room.scores()["p1"], 0);
        assert_eq!(room.snapshot().players[0].id, "p1");
        assert!(room.snapshot().players[0].is_host);
    }

    #[test]
    fn test_timer_tick_saturates() {
        let mut room = Room::new("ABCD");
        room.set_timer(2);
        assert_eq!(room.tick(), 1);
        assert_eq!(room.tick(), 0);
        assert_eq!(room.tick(), 0);
    }
}
