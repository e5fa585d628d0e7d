use super::Room;
use crate::error::{GameError, GameResult};
use crate::scoring;
use crate::types::*;
use std::collections::HashMap;

impl Room {
    /// Entries that still count: not rejected by vote and owned by a
    /// player who is still here.
    fn scoring_entries(&self) -> Vec<AnswerEntry> {
        self.marked_answers
            .iter()
            .enumerate()
            .filter(|(index, entry)| {
                !self.rejected.contains(index) && self.players.contains_key(&entry.player_id)
            })
            .map(|(_, entry)| entry.clone())
            .collect()
    }

    /// Score the round and move to SCORING.
    pub fn calculate_scores(&mut self) -> GameResult<RoundResults> {
        match self.phase {
            GamePhase::Locked | GamePhase::Reveal | GamePhase::Audit => {}
            GamePhase::Voting if self.current_challenge.is_none() => {}
            GamePhase::Voting => return Err(GameError::VoteInProgress),
            phase => return Err(GameError::WrongPhase(phase)),
        }

        let entries = self.scoring_entries();
        let detailed = scoring::detailed_results(&entries);
        let mut round_points = scoring::calculate_round_points(&entries);
        for id in self.players.keys() {
            round_points.entry(id.clone()).or_insert(0);
        }

        self.transition(GamePhase::Scoring)?;
        self.scores = scoring::update_scores(&self.scores, &round_points);
        self.challenged.clear();
        self.timer_value = 0;

        tracing::info!(
            "Room {}: round {} scored {:?}",
            self.code,
            self.current_round,
            round_points
        );

        Ok(RoundResults {
            round_points,
            scores: self.scores.clone(),
            marked_answers: self.marked_answers.clone(),
            rejected: self.rejected.iter().copied().collect(),
            detailed,
        })
    }

    /// Per-player breakdown of the entries that currently count.
    pub fn detailed_results(&self) -> HashMap<PlayerId, ScoreBreakdown> {
        scoring::detailed_results(&self.scoring_entries())
    }

    pub fn rejected_answers(&self) -> Vec<AnswerEntry> {
        self.rejected
            .iter()
            .filter_map(|&i| self.marked_answers.get(i).cloned())
            .collect()
    }

    pub fn is_game_over(&self) -> bool {
        self.started && self.current_round >= self.total_rounds
    }

    /// Finish the game and report the winners.
    pub fn end_game(&mut self) -> GameResult<GameOutcome> {
        self.transition(GamePhase::GameOver)?;
        self.timer_value = 0;

        let outcome = GameOutcome {
            winners: scoring::get_winners(&self.scores),
            final_scores: self.scores.clone(),
        };
        tracing::info!("Room {}: game over, winners {:?}", self.code, outcome.winners);
        Ok(outcome)
    }

    /// Back to the lobby with the same players and zeroed scores.
    pub fn reset(&mut self) {
        self.phase = GamePhase::Lobby;
        self.started = false;
        self.total_rounds = 0;
        self.current_round = 0;
        self.categories.clear();
        self.current_category = None;
        self.timer_value = 0;
        self.clear_round_state();
        self.scores = self.players.keys().map(|id| (id.clone(), 0)).collect();
        tracing::info!("Room {}: reset to lobby", self.code);
    }
}
