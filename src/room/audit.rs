use super::{AuditStep, Room};
use crate::error::{GameError, GameResult};
use crate::types::*;

impl Room {
    /// Open the audit window after the reveal.
    pub fn start_audit(&mut self) -> GameResult<()> {
        self.transition(GamePhase::Audit)?;
        self.challenged.clear();
        self.current_challenge = None;
        self.votes.clear();
        self.rejected.clear();
        self.timer_value = self.timers.audit_seconds;
        Ok(())
    }

    /// Toggle a challenge on one entry; returns the pending challenges in
    /// the order they will be voted on.
    pub fn challenge_answer(&mut self, index: usize) -> GameResult<Vec<usize>> {
        self.require_phase(GamePhase::Audit)?;
        if index >= self.marked_answers.len() {
            return Err(GameError::InvalidIndex);
        }

        if let Some(pos) = self.challenged.iter().position(|&i| i == index) {
            self.challenged.remove(pos);
        } else {
            self.challenged.push_back(index);
        }
        Ok(self.challenged.iter().copied().collect())
    }

    pub fn audit_answers(&self) -> Vec<AuditEntry> {
        self.marked_answers
            .iter()
            .enumerate()
            .map(|(index, entry)| AuditEntry {
                index,
                entry: entry.clone(),
                challenged: self.challenged.contains(&index),
            })
            .collect()
    }

    /// Close the audit: vote on the first challenge, or score right away.
    pub fn end_audit(&mut self) -> GameResult<AuditStep> {
        self.require_phase(GamePhase::Audit)?;
        self.next_audit_step()
    }

    fn next_audit_step(&mut self) -> GameResult<AuditStep> {
        match self.challenged.pop_front() {
            Some(index) => {
                self.transition(GamePhase::Voting)?;
                let challenge = Challenge {
                    index,
                    entry: self.marked_answers[index].clone(),
                };
                self.current_challenge = Some(challenge.clone());
                self.votes.clear();
                self.timer_value = self.timers.voting_seconds;
                Ok(AuditStep::Vote(challenge))
            }
            None => Ok(AuditStep::Score(self.calculate_scores()?)),
        }
    }

    /// Record or overwrite a vote on the active challenge.
    pub fn submit_vote(&mut self, voter_id: &str, verdict: Verdict) -> GameResult<VoteProgress> {
        self.require_phase(GamePhase::Voting)?;
        let challenge = self
            .current_challenge
            .as_ref()
            .ok_or(GameError::NoActiveChallenge)?;
        self.require_player(voter_id)?;
        if challenge.entry.player_id == voter_id {
            return Err(GameError::SelfVote);
        }

        self.votes.insert(voter_id.to_string(), verdict);
        Ok(self.vote_progress())
    }

    /// Votes cast against players allowed to vote (everyone but the owner).
    pub fn vote_progress(&self) -> VoteProgress {
        let eligible_voters = match &self.current_challenge {
            Some(challenge) => self
                .players
                .keys()
                .filter(|id| **id != challenge.entry.player_id)
                .count(),
            None => 0,
        };
        VoteProgress {
            votes_cast: self.votes.len(),
            eligible_voters,
        }
    }

    pub fn all_votes_in(&self) -> bool {
        self.current_challenge.is_some() && self.vote_progress().complete()
    }

    /// Close the active vote. Strictly more "invalid" than "valid" votes
    /// rejects the entry; a tie keeps it.
    pub fn tally_votes(&mut self) -> GameResult<VoteTally> {
        self.require_phase(GamePhase::Voting)?;
        let challenge = self
            .current_challenge
            .take()
            .ok_or(GameError::NoActiveChallenge)?;

        let invalid_votes = self
            .votes
            .values()
            .filter(|v| **v == Verdict::Invalid)
            .count();
        let valid_votes = self.votes.len() - invalid_votes;
        let rejected = invalid_votes > valid_votes;
        if rejected {
            self.rejected.insert(challenge.index);
        }
        self.votes.clear();
        self.timer_value = 0;

        tracing::info!(
            "Room {}: vote on #{} ({:?}) valid={} invalid={} rejected={}",
            self.code,
            challenge.index,
            challenge.entry.answer,
            valid_votes,
            invalid_votes,
            rejected
        );

        Ok(VoteTally {
            index: challenge.index,
            entry: challenge.entry,
            valid_votes,
            invalid_votes,
            rejected,
        })
    }

    /// After a tally: open the next pending vote, or score the round.
    pub fn advance_after_vote(&mut self) -> GameResult<AuditStep> {
        self.require_phase(GamePhase::Voting)?;
        if self.current_challenge.is_some() {
            return Err(GameError::VoteInProgress);
        }
        self.next_audit_step()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const PLAYERS: [&str; 5] = ["p1", "p2", "p3", "p4", "p5"];
    const ANSWERS: [&str; 5] = ["apple", "banana", "cherry", "grape", "melon"];

    /// `count` players with one distinct answer each, sitting in AUDIT.
    fn audit_room_of(count: usize) -> Room {
        let mut room = typing_room(&PLAYERS[..count]);
        for (player, answer) in PLAYERS.iter().zip(ANSWERS).take(count) {
            room.submit_answer(player, answer).unwrap();
        }
        room.lock_answers_with_rng(&mut StdRng::seed_from_u64(1))
            .unwrap();
        room.start_reveal().unwrap();
        room.start_audit().unwrap();
        room
    }

    fn audit_room() -> Room {
        audit_room_of(3)
    }

    /// Challenge p1's answer and open the vote on it.
    fn voting_on_p1(room: &mut Room) -> usize {
        let target = index_of(room, "p1");
        room.challenge_answer(target).unwrap();
        match room.end_audit().unwrap() {
            AuditStep::Vote(challenge) => assert_eq!(challenge.index, target),
            other => panic!("Expected vote, got {:?}", other),
        }
        target
    }

    fn index_of(room: &Room, player: &str) -> usize {
        room.marked_answers()
            .iter()
            .position(|e| e.player_id == player)
            .unwrap()
    }

    #[test]
    fn test_start_audit_sets_timer() {
        let room = audit_room();
        assert_eq!(room.phase(), GamePhase::Audit);
        assert_eq!(room.timer_value(), 15);
        assert!(room.audit_answers().iter().all(|a| !a.challenged));
    }

    #[test]
    fn test_challenge_toggles() {
        let mut room = audit_room();
        assert_eq!(room.challenge_answer(2).unwrap(), vec![2]);
        assert_eq!(room.challenge_answer(0).unwrap(), vec![2, 0]);
        assert_eq!(room.challenge_answer(2).unwrap(), vec![0]);
        assert!(room.audit_answers()[0].challenged);
        assert_eq!(room.challenge_answer(9).unwrap_err(), GameError::InvalidIndex);
    }

    #[test]
    fn test_end_audit_without_challenges_scores() {
        let mut room = audit_room();
        match room.end_audit().unwrap() {
            AuditStep::Score(results) => {
                assert_eq!(results.round_points["p1"], 1);
                assert!(results.rejected.is_empty());
            }
            other => panic!("Expected scoring, got {:?}", other),
        }
        assert_eq!(room.phase(), GamePhase::Scoring);
    }

    #[test]
    fn test_vote_majority_rejects() {
        let mut room = audit_room();
        let target = index_of(&room, "p1");
        room.challenge_answer(target).unwrap();

        let challenge = match room.end_audit().unwrap() {
            AuditStep::Vote(challenge) => challenge,
            other => panic!("Expected vote, got {:?}", other),
        };
        assert_eq!(challenge.index, target);
        assert_eq!(room.phase(), GamePhase::Voting);
        assert_eq!(room.timer_value(), 10);

        assert_eq!(
            room.submit_vote("p1", Verdict::Invalid).unwrap_err(),
            GameError::SelfVote
        );
        let progress = room.submit_vote("p2", Verdict::Invalid).unwrap();
        assert_eq!(progress.votes_cast, 1);
        assert_eq!(progress.eligible_voters, 2);
        assert!(!room.all_votes_in());
        room.submit_vote("p3", Verdict::Invalid).unwrap();
        assert!(room.all_votes_in());

        let tally = room.tally_votes().unwrap();
        assert!(tally.rejected);
        assert_eq!(tally.invalid_votes, 2);

        match room.advance_after_vote().unwrap() {
            AuditStep::Score(results) => {
                assert_eq!(results.rejected, vec![target]);
                assert_eq!(results.round_points["p1"], 0);
                assert_eq!(results.scores["p1"], 0);
                assert_eq!(results.scores["p2"], 1);
            }
            other => panic!("Expected scoring, got {:?}", other),
        }
    }

    #[test]
    fn test_vote_tie_keeps_entry() {
        let mut room = audit_room();
        let target = index_of(&room, "p1");
        room.challenge_answer(target).unwrap();
        room.end_audit().unwrap();

        room.submit_vote("p2", Verdict::Invalid).unwrap();
        room.submit_vote("p3", Verdict::Valid).unwrap();
        let tally = room.tally_votes().unwrap();
        assert!(!tally.rejected);
        assert!(room.rejected_answers().is_empty());
    }

    #[test]
    fn test_vote_two_to_one_rejects() {
        let mut room = audit_room_of(4);
        let target = voting_on_p1(&mut room);

        room.submit_vote("p2", Verdict::Invalid).unwrap();
        room.submit_vote("p3", Verdict::Invalid).unwrap();
        let progress = room.submit_vote("p4", Verdict::Valid).unwrap();
        assert_eq!(progress.eligible_voters, 3);
        assert!(progress.complete());

        let tally = room.tally_votes().unwrap();
        assert_eq!((tally.invalid_votes, tally.valid_votes), (2, 1));
        assert!(tally.rejected);
        let rejected = room.rejected_answers();
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].player_id, "p1");

        match room.advance_after_vote().unwrap() {
            AuditStep::Score(results) => {
                assert_eq!(results.rejected, vec![target]);
                assert_eq!(results.round_points["p1"], 0);
                assert_eq!(results.round_points["p2"], 1);
            }
            other => panic!("Expected scoring, got {:?}", other),
        }
    }

    #[test]
    fn test_vote_even_split_keeps_entry() {
        let mut room = audit_room_of(5);
        voting_on_p1(&mut room);

        room.submit_vote("p2", Verdict::Invalid).unwrap();
        room.submit_vote("p3", Verdict::Invalid).unwrap();
        room.submit_vote("p4", Verdict::Valid).unwrap();
        room.submit_vote("p5", Verdict::Valid).unwrap();

        let tally = room.tally_votes().unwrap();
        assert_eq!((tally.invalid_votes, tally.valid_votes), (2, 2));
        assert!(!tally.rejected);
        assert!(room.rejected_answers().is_empty());

        match room.advance_after_vote().unwrap() {
            AuditStep::Score(results) => assert_eq!(results.round_points["p1"], 1),
            other => panic!("Expected scoring, got {:?}", other),
        }
    }

    #[test]
    fn test_vote_overwrite_and_sequencing() {
        let mut room = audit_room();
        let first = index_of(&room, "p1");
        let second = index_of(&room, "p2");
        room.challenge_answer(first).unwrap();
        room.challenge_answer(second).unwrap();
        room.end_audit().unwrap();

        room.submit_vote("p2", Verdict::Invalid).unwrap();
        let progress = room.submit_vote("p2", Verdict::Valid).unwrap();
        assert_eq!(progress.votes_cast, 1);

        assert_eq!(
            room.advance_after_vote().unwrap_err(),
            GameError::VoteInProgress
        );
        room.tally_votes().unwrap();
        assert_eq!(
            room.tally_votes().unwrap_err(),
            GameError::NoActiveChallenge
        );
        assert_eq!(
            room.submit_vote("p3", Verdict::Valid).unwrap_err(),
            GameError::NoActiveChallenge
        );

        match room.advance_after_vote().unwrap() {
            AuditStep::Vote(challenge) => assert_eq!(challenge.index, second),
            other => panic!("Expected second vote, got {:?}", other),
        }
        assert_eq!(room.vote_progress().votes_cast, 0);
    }

    #[test]
    fn test_owner_leaving_makes_everyone_eligible() {
        let mut room = audit_room();
        room.challenge_answer(index_of(&room, "p1")).unwrap();
        room.end_audit().unwrap();
        room.leave("p1").unwrap();
        assert_eq!(room.vote_progress().eligible_voters, 2);
    }
}
