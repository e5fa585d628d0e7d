use super::{check_submission_size, Room, MIN_PLAYERS};
use crate::categories::CategorySource;
use crate::error::{GameError, GameResult};
use crate::scoring::{self, Submission};
use crate::types::*;
use rand::seq::SliceRandom;
use rand::Rng;

impl Room {
    /// Begin a game from the lobby. Categories for every round are drawn
    /// up front and all scores restart at zero.
    pub fn start_game(
        &mut self,
        length: GameLength,
        source: &dyn CategorySource,
    ) -> GameResult<()> {
        if self.started || self.phase != GamePhase::Lobby {
            return Err(GameError::AlreadyStarted);
        }
        if self.players.len() < MIN_PLAYERS {
            return Err(GameError::NotEnoughPlayers(MIN_PLAYERS));
        }

        self.total_rounds = length.rounds();
        self.current_round = 0;
        self.categories = source.categories_for_game(self.total_rounds as usize);
        self.current_category = None;
        self.scores = self.players.keys().map(|id| (id.clone(), 0)).collect();
        self.clear_round_state();
        self.started = true;

        tracing::info!(
            "Room {}: game started with {} players, {} rounds",
            self.code,
            self.players.len(),
            self.total_rounds
        );
        Ok(())
    }

    /// Advance to the next round's category reveal; returns the new round
    /// number.
    pub fn start_round(&mut self) -> GameResult<u32> {
        if !self.started {
            return Err(GameError::NotStarted);
        }
        if !matches!(self.phase, GamePhase::Lobby | GamePhase::Scoring) {
            return Err(GameError::WrongPhase(self.phase));
        }
        if self.current_round >= self.total_rounds {
            return Err(GameError::NoRoundsRemaining);
        }

        self.transition(GamePhase::CategoryReveal)?;
        self.current_round += 1;
        self.current_category = self
            .categories
            .get(self.current_round as usize - 1)
            .cloned();
        self.clear_round_state();
        self.timer_value = 0;

        tracing::info!(
            "Room {}: round {}/{} - {}",
            self.code,
            self.current_round,
            self.total_rounds,
            self.current_category
                .as_ref()
                .map_or("(no category)", |c| c.text.as_str())
        );
        Ok(self.current_round)
    }

    pub fn start_countdown(&mut self) -> GameResult<()> {
        self.transition(GamePhase::Countdown)?;
        self.timer_value = self.timers.countdown_seconds;
        Ok(())
    }

    pub fn start_typing(&mut self) -> GameResult<()> {
        self.transition(GamePhase::Typing)?;
        self.timer_value = self.settings.typing_seconds;
        Ok(())
    }

    /// Record or replace a player's raw answer text.
    pub fn submit_answer(&mut self, player_id: &str, text: &str) -> GameResult<()> {
        self.require_phase(GamePhase::Typing)?;
        self.require_player(player_id)?;
        check_submission_size(&scoring::parse_multiple_entries(text))?;
        self.answers.insert(player_id.to_string(), text.to_string());
        Ok(())
    }

    pub fn has_submitted(&self, player_id: &str) -> bool {
        self.answers.contains_key(player_id)
    }

    /// Freeze submissions, judge them and shuffle the reveal order.
    pub fn lock_answers(&mut self) -> GameResult<usize> {
        self.lock_answers_with_rng(&mut rand::rng())
    }

    /// As [`Room::lock_answers`] with a caller-supplied random source.
    pub fn lock_answers_with_rng<R: Rng>(&mut self, rng: &mut R) -> GameResult<usize> {
        self.require_phase(GamePhase::Typing)?;

        let submissions: Vec<Submission> = self
            .players_in_join_order()
            .into_iter()
            .map(|p| {
                let text = self.answers.get(&p.id).map_or("", String::as_str);
                Submission::new(p.id.as_str(), p.name.as_str(), text)
            })
            .collect();

        let mut entries = scoring::find_duplicates(&submissions);
        entries.shuffle(rng);

        self.transition(GamePhase::Locked)?;
        self.marked_answers = entries;
        self.reveal_index = 0;
        self.timer_value = 0;

        tracing::info!(
            "Room {}: locked {} entries from {} submissions",
            self.code,
            self.marked_answers.len(),
            self.answers.len()
        );
        Ok(self.marked_answers.len())
    }

    /// Enter the reveal; returns how many entries will be shown.
    pub fn start_reveal(&mut self) -> GameResult<usize> {
        self.transition(GamePhase::Reveal)?;
        self.reveal_index = 0;
        Ok(self.marked_answers.len())
    }

    /// Next entry to show, or `None` once every entry has been revealed.
    pub fn reveal_next(&mut self) -> GameResult<Option<RevealedAnswer>> {
        self.require_phase(GamePhase::Reveal)?;

        let Some(entry) = self.marked_answers.get(self.reveal_index) else {
            return Ok(None);
        };
        let revealed = RevealedAnswer {
            index: self.reveal_index,
            total: self.marked_answers.len(),
            entry: entry.clone(),
        };
        self.reveal_index += 1;
        Ok(Some(revealed))
    }
}
