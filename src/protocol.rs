use crate::error::GameError;
use crate::room::Room;
use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Shared screen attaching to a room
    TvJoin {
        room_code: String,
    },
    Join {
        room_code: String,
        player_name: String,
    },
    StartGame {
        /// `quick`, `standard` or `extended`; anything else is standard
        #[serde(default)]
        game_length: Option<String>,
    },
    /// Either a free-text answer (comma/semicolon/newline separated) or
    /// pre-split entries
    SubmitAnswer {
        #[serde(default)]
        answer: Option<String>,
        #[serde(default)]
        entries: Option<Vec<String>>,
    },
    PlayAgain,
    ChallengeAnswer {
        answer_index: usize,
    },
    EndAudit,
    SubmitVote {
        vote: Verdict,
    },
    UpdateSettings {
        #[serde(default)]
        typing_seconds: Option<u32>,
        #[serde(default)]
        music_enabled: Option<bool>,
    },
    TransferHost {
        player_id: PlayerId,
    },
    ValidateWord {
        word: String,
    },
}

/// An answer item dropped by word validation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvalidEntry {
    pub entry: String,
    pub reason: Option<String>,
}

/// Phase change notice; optional fields depend on the phase
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhaseUpdate {
    pub phase: GamePhase,
    pub round: u32,
    pub total_rounds: u32,
    pub server_now: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_answers: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answers: Option<Vec<AuditEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge: Option<Challenge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<RoundResults>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<GameOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub players: Option<Vec<PlayerInfo>>,
}

impl PhaseUpdate {
    pub fn from_room(room: &Room) -> Self {
        Self {
            phase: room.phase(),
            round: room.current_round(),
            total_rounds: room.total_rounds(),
            server_now: chrono::Utc::now().to_rfc3339(),
            timer: None,
            category: None,
            total_answers: None,
            answers: None,
            challenge: None,
            results: None,
            outcome: None,
            players: None,
        }
    }

    pub fn with_timer(mut self, timer: u32) -> Self {
        self.timer = Some(timer);
        self
    }

    pub fn with_category(mut self, category: Option<&Category>) -> Self {
        self.category = category.cloned();
        self
    }

    pub fn with_total_answers(mut self, total: usize) -> Self {
        self.total_answers = Some(total);
        self
    }

    pub fn with_answers(mut self, answers: Vec<AuditEntry>) -> Self {
        self.answers = Some(answers);
        self
    }

    pub fn with_challenge(mut self, challenge: Challenge) -> Self {
        self.challenge = Some(challenge);
        self
    }

    pub fn with_results(mut self, results: RoundResults) -> Self {
        self.results = Some(results);
        self
    }

    pub fn with_outcome(mut self, outcome: GameOutcome, players: Vec<PlayerInfo>) -> Self {
        self.outcome = Some(outcome);
        self.players = Some(players);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    RoomState {
        room: RoomSnapshot,
    },
    Joined {
        player_id: PlayerId,
        room: RoomSnapshot,
    },
    PlayerJoined {
        player: PlayerInfo,
        players: Vec<PlayerInfo>,
    },
    PlayerLeft {
        player_id: PlayerId,
        players: Vec<PlayerInfo>,
        #[serde(skip_serializing_if = "Option::is_none")]
        new_host: Option<PlayerId>,
    },
    HostChanged {
        host_id: PlayerId,
        players: Vec<PlayerInfo>,
    },
    SettingsUpdated {
        settings: Settings,
    },
    GameStarted {
        total_rounds: u32,
    },
    Phase(PhaseUpdate),
    Timer {
        remaining: u32,
    },
    RevealAnswer {
        reveal: RevealedAnswer,
    },
    AnswerChallenged {
        challenged: Vec<usize>,
        answers: Vec<AuditEntry>,
    },
    VoteReceived {
        votes_cast: usize,
        eligible_voters: usize,
    },
    VoteResult {
        tally: VoteTally,
    },
    /// Sent only to the submitting player
    AnswerReceived {
        answer: String,
        invalid_entries: Vec<InvalidEntry>,
    },
    PlayerSubmitted {
        player_id: PlayerId,
        submitted_count: usize,
        player_count: usize,
    },
    GameReset {
        room: RoomSnapshot,
    },
    WordValidation {
        word: String,
        valid: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    Error {
        code: String,
        msg: String,
    },
}

impl From<GameError> for ServerMessage {
    fn from(err: GameError) -> Self {
        ServerMessage::Error {
            code: err.code().to_string(),
            msg: err.to_string(),
        }
    }
}
