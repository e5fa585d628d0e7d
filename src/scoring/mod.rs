//! Duplicate detection and round scoring.
//!
//! Everything here is a pure function over one round's submissions. Answers
//! are split into entries, entries from different players that look like the
//! same idea are clustered, and points follow from cluster membership.

mod similarity;
mod text;
mod union_find;

pub use similarity::{has_same_stem, is_similar, levenshtein, stem, AnswerKey};
pub use text::{normalize_answer, parse_multiple_entries};
pub use union_find::UnionFind;

use crate::types::{AnswerEntry, DuplicateAnswer, PlayerId, ScoreBreakdown, ScoreMap};
use std::collections::HashMap;

/// Unique entries needed in one round to earn the volume bonus
pub const VOLUME_BONUS_THRESHOLD: u32 = 3;

/// Most entries one submission may carry
pub const MAX_ENTRIES_PER_SUBMISSION: usize = 20;
/// Longest single entry, in chars
pub const MAX_ENTRY_CHARS: usize = 40;

const UNIQUE_POINTS: i32 = 1;
const DUPLICATE_PENALTY: i32 = -1;
const VOLUME_BONUS: i32 = 1;

/// One player's raw submission for a round
#[derive(Debug, Clone)]
pub struct Submission {
    pub player_id: PlayerId,
    pub player_name: String,
    pub text: String,
}

impl Submission {
    pub fn new(
        player_id: impl Into<String>,
        player_name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            player_id: player_id.into(),
            player_name: player_name.into(),
            text: text.into(),
        }
    }
}

/// Drop a player's own near-repeats, keeping the first spelling of each.
///
/// "Spain, Span" is one answer, not two; the same similarity rule that
/// clusters players against each other decides what counts as a repeat.
pub fn dedupe_player_entries(items: Vec<String>) -> Vec<String> {
    keyed_player_entries(items)
        .into_iter()
        .map(|(item, _)| item)
        .collect()
}

fn keyed_player_entries(items: Vec<String>) -> Vec<(String, AnswerKey)> {
    let mut kept: Vec<(String, AnswerKey)> = Vec::with_capacity(items.len());
    for item in items {
        let key = AnswerKey::new(&item);
        if kept.iter().any(|(_, seen)| seen.matches(&key)) {
            continue;
        }
        kept.push((item, key));
    }
    kept
}

/// Split every submission into entries and mark which ones collide with
/// another player's entry.
///
/// A submission with no usable items yields a single blank entry so the
/// player still shows up in the reveal. Blank entries never cluster.
pub fn find_duplicates(submissions: &[Submission]) -> Vec<AnswerEntry> {
    let mut entries: Vec<AnswerEntry> = Vec::new();
    let mut keys: Vec<AnswerKey> = Vec::new();

    for submission in submissions {
        let items = keyed_player_entries(parse_multiple_entries(&submission.text));
        if items.is_empty() {
            entries.push(AnswerEntry {
                player_id: submission.player_id.clone(),
                player_name: submission.player_name.clone(),
                answer: String::new(),
                normalized: String::new(),
                unique: true,
                duplicate_with: Vec::new(),
            });
            keys.push(AnswerKey::new(""));
            continue;
        }
        for (item, key) in items {
            entries.push(AnswerEntry {
                player_id: submission.player_id.clone(),
                player_name: submission.player_name.clone(),
                normalized: key.normalized().to_string(),
                answer: item,
                unique: true,
                duplicate_with: Vec::new(),
            });
            keys.push(key);
        }
    }

    let mut clusters = UnionFind::new(entries.len());
    for i in 0..entries.len() {
        if keys[i].is_empty() {
            continue;
        }
        for j in (i + 1)..entries.len() {
            if entries[i].player_id == entries[j].player_id {
                continue;
            }
            if keys[i].matches(&keys[j]) {
                clusters.union(i, j);
            }
        }
    }

    for group in clusters.groups() {
        if group.len() < 2 {
            continue;
        }
        for &member in &group {
            let owner = entries[member].player_id.clone();
            let mut others: Vec<String> = Vec::new();
            for &other in &group {
                let entry = &entries[other];
                if entry.player_id != owner && !others.contains(&entry.player_name) {
                    others.push(entry.player_name.clone());
                }
            }
            entries[member].unique = others.is_empty();
            entries[member].duplicate_with = others;
        }
    }

    entries
}

/// Per-player explanation of the round's points.
///
/// Every player that owns an entry gets a breakdown, including players who
/// only have a blank placeholder.
pub fn detailed_results(entries: &[AnswerEntry]) -> HashMap<PlayerId, ScoreBreakdown> {
    let mut results: HashMap<PlayerId, ScoreBreakdown> = HashMap::new();

    for entry in entries {
        let breakdown = results.entry(entry.player_id.clone()).or_default();
        if entry.is_blank() {
            continue;
        }
        if entry.unique {
            breakdown.unique_count += 1;
            breakdown.unique_points += UNIQUE_POINTS;
            breakdown.unique_answers.push(entry.answer.clone());
        } else {
            breakdown.duplicate_count += 1;
            breakdown.duplicate_penalty += DUPLICATE_PENALTY;
            breakdown.duplicate_answers.push(DuplicateAnswer {
                answer: entry.answer.clone(),
                duplicate_with: entry.duplicate_with.clone(),
            });
        }
    }

    for breakdown in results.values_mut() {
        if breakdown.unique_count >= VOLUME_BONUS_THRESHOLD {
            breakdown.volume_bonus = VOLUME_BONUS;
        }
        breakdown.total =
            breakdown.unique_points + breakdown.duplicate_penalty + breakdown.volume_bonus;
    }

    results
}

/// Points earned this round by each player with an entry.
pub fn calculate_round_points(entries: &[AnswerEntry]) -> ScoreMap {
    detailed_results(entries)
        .into_iter()
        .map(|(player_id, breakdown)| (player_id, breakdown.total))
        .collect()
}

/// New cumulative totals; `current` is left untouched.
pub fn update_scores(current: &ScoreMap, round_points: &ScoreMap) -> ScoreMap {
    let mut updated = current.clone();
    for (player_id, points) in round_points {
        *updated.entry(player_id.clone()).or_insert(0) += points;
    }
    updated
}

/// Every player tied for the top score, sorted by id.
pub fn get_winners(scores: &ScoreMap) -> Vec<PlayerId> {
    let Some(best) = scores.values().max() else {
        return Vec::new();
    };

    let mut winners: Vec<PlayerId> = scores
        .iter()
        .filter(|(_, score)| *score == best)
        .map(|(player_id, _)| player_id.clone())
        .collect();
    winners.sort();
    winners
}
