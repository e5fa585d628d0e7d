use crate::types::GamePhase;

/// Every way a room operation can be refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Game already started")]
    AlreadyStarted,

    #[error("Room is full (max {0} players)")]
    RoomFull(usize),

    #[error("Need at least {0} players")]
    NotEnoughPlayers(usize),

    #[error("Player not found")]
    UnknownPlayer,

    #[error("Not allowed during {0}")]
    WrongPhase(GamePhase),

    #[error("Game has not started")]
    NotStarted,

    #[error("No rounds remaining")]
    NoRoundsRemaining,

    #[error("Invalid answer index")]
    InvalidIndex,

    #[error("No active challenge")]
    NoActiveChallenge,

    #[error("Cannot vote on your own answer")]
    SelfVote,

    #[error("A vote is still in progress")]
    VoteInProgress,

    #[error("Too many answers (max {0})")]
    TooManyEntries(usize),

    #[error("Answer too long (max {0} characters)")]
    EntryTooLong(usize),

    #[error("Room not found")]
    RoomNotFound,

    #[error("Not in a room")]
    NotInRoom,

    #[error("Only the host or TV can {0}")]
    Unauthorized(&'static str),
}

impl GameError {
    /// Stable machine-readable code sent alongside the message
    pub fn code(&self) -> &'static str {
        match self {
            GameError::AlreadyStarted => "ALREADY_STARTED",
            GameError::RoomFull(_) => "ROOM_FULL",
            GameError::NotEnoughPlayers(_) => "NOT_ENOUGH_PLAYERS",
            GameError::UnknownPlayer => "UNKNOWN_PLAYER",
            GameError::WrongPhase(_) => "WRONG_PHASE",
            GameError::NotStarted => "NOT_STARTED",
            GameError::NoRoundsRemaining => "NO_ROUNDS_REMAINING",
            GameError::InvalidIndex => "INVALID_INDEX",
            GameError::NoActiveChallenge => "NO_ACTIVE_CHALLENGE",
            GameError::SelfVote => "SELF_VOTE",
            GameError::VoteInProgress => "VOTE_IN_PROGRESS",
            GameError::TooManyEntries(_) => "TOO_MANY_ENTRIES",
            GameError::EntryTooLong(_) => "ENTRY_TOO_LONG",
            GameError::RoomNotFound => "ROOM_NOT_FOUND",
            GameError::NotInRoom => "NOT_IN_ROOM",
            GameError::Unauthorized(_) => "UNAUTHORIZED",
        }
    }
}

pub type GameResult<T> = Result<T, GameError>;
