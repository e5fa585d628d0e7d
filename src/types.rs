use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Opaque ID types for readability
pub type PlayerId = String;
pub type RoomCode = String;

/// Cumulative or per-round points keyed by player
pub type ScoreMap = HashMap<PlayerId, i32>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    Lobby,
    CategoryReveal,
    Countdown,
    Typing,
    Locked,
    Reveal,
    Audit,
    Voting,
    Scoring,
    GameOver,
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GamePhase::Lobby => "LOBBY",
            GamePhase::CategoryReveal => "CATEGORY_REVEAL",
            GamePhase::Countdown => "COUNTDOWN",
            GamePhase::Typing => "TYPING",
            GamePhase::Locked => "LOCKED",
            GamePhase::Reveal => "REVEAL",
            GamePhase::Audit => "AUDIT",
            GamePhase::Voting => "VOTING",
            GamePhase::Scoring => "SCORING",
            GamePhase::GameOver => "GAME_OVER",
        };
        f.write_str(name)
    }
}

/// Game length presets
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GameLength {
    Quick,
    #[default]
    Standard,
    Extended,
}

impl GameLength {
    pub fn rounds(self) -> u32 {
        match self {
            GameLength::Quick => 5,
            GameLength::Standard => 10,
            GameLength::Extended => 15,
        }
    }

    /// Parse a preset name; anything unrecognized plays a standard game.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "quick" => GameLength::Quick,
            "extended" => GameLength::Extended,
            _ => GameLength::Standard,
        }
    }
}

/// Typing durations a host may pick, in seconds
pub const TYPING_SECONDS_CHOICES: [u32; 3] = [5, 10, 15];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub typing_seconds: u32,
    pub music_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            typing_seconds: 10,
            music_enabled: true,
        }
    }
}

/// Partial settings change; absent or out-of-range fields are ignored
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub typing_seconds: Option<u32>,
    pub music_enabled: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Monotonic join order within the room, used for host hand-off
    pub join_seq: u64,
}

/// Public view of a player
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
    pub score: i32,
    pub is_host: bool,
}

/// One judged answer item from a player's submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerEntry {
    pub player_id: PlayerId,
    pub player_name: String,
    pub answer: String,
    pub normalized: String,
    pub unique: bool,
    /// Names of other players whose entries landed in the same cluster
    pub duplicate_with: Vec<String>,
}

impl AnswerEntry {
    /// Placeholder for a player who submitted nothing
    pub fn is_blank(&self) -> bool {
        self.answer.is_empty()
    }
}

/// Entry returned by a reveal step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RevealedAnswer {
    pub index: usize,
    pub total: usize,
    pub entry: AnswerEntry,
}

/// Entry as listed for the audit screen
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditEntry {
    pub index: usize,
    pub entry: AnswerEntry,
    pub challenged: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Valid,
    Invalid,
}

/// The entry currently being voted on
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Challenge {
    pub index: usize,
    pub entry: AnswerEntry,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoteTally {
    pub index: usize,
    pub entry: AnswerEntry,
    pub valid_votes: usize,
    pub invalid_votes: usize,
    pub rejected: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteProgress {
    pub votes_cast: usize,
    pub eligible_voters: usize,
}

impl VoteProgress {
    pub fn complete(&self) -> bool {
        self.votes_cast >= self.eligible_voters
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DuplicateAnswer {
    pub answer: String,
    pub duplicate_with: Vec<String>,
}

/// Why a player scored what they scored in one round
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScoreBreakdown {
    pub unique_count: u32,
    pub duplicate_count: u32,
    pub unique_points: i32,
    pub duplicate_penalty: i32,
    pub volume_bonus: i32,
    pub total: i32,
    pub unique_answers: Vec<String>,
    pub duplicate_answers: Vec<DuplicateAnswer>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundResults {
    pub round_points: ScoreMap,
    pub scores: ScoreMap,
    pub marked_answers: Vec<AnswerEntry>,
    pub rejected: Vec<usize>,
    pub detailed: HashMap<PlayerId, ScoreBreakdown>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameOutcome {
    pub winners: Vec<PlayerId>,
    pub final_scores: ScoreMap,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub text: String,
    pub difficulty: Difficulty,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Owned copy of a room's public state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomSnapshot {
    pub room_code: RoomCode,
    pub phase: GamePhase,
    pub players: Vec<PlayerInfo>,
    pub host_id: Option<PlayerId>,
    pub current_round: u32,
    pub total_rounds: u32,
    pub current_category: Option<Category>,
    pub timer_value: u32,
    pub scores: ScoreMap,
    pub settings: Settings,
    pub submitted_count: usize,
}

/// Connection role on the WebSocket
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Tv,
    Player,
}
