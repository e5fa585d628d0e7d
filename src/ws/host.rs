//! Moderator message handlers
//!
//! Commands that run the game. Each one may come from a TV screen or from
//! the current host player.

use crate::error::{GameError, GameResult};
use crate::orchestrator::{self, Action, Step};
use crate::protocol::ServerMessage;
use crate::state::AppState;
use crate::types::{GameLength, GamePhase, PlayerId, SettingsUpdate};
use crate::ws::handlers::{reply, Connection};
use std::sync::Arc;

/// Refuse the command unless the connection may moderate this room
macro_rules! check_moderator {
    ($conn:expr, $room:expr, $action:expr) => {
        if !$conn.can_moderate($room) {
            return Err(GameError::Unauthorized($action));
        }
    };
}

pub async fn handle_start_game(
    state: &Arc<AppState>,
    conn: &mut Connection,
    game_length: Option<String>,
) -> Option<ServerMessage> {
    reply(start_game(state, conn, game_length.as_deref()).await)
}

async fn start_game(
    state: &Arc<AppState>,
    conn: &Connection,
    game_length: Option<&str>,
) -> GameResult<Option<ServerMessage>> {
    let handle = conn.room()?;
    let mut slot = handle.slot.lock().await;
    check_moderator!(conn, &slot.room, "start the game");

    let length = game_length.map(GameLength::from_name).unwrap_or_default();
    slot.room.start_game(length, state.categories.as_ref())?;
    slot.touch();

    handle.broadcast(ServerMessage::GameStarted {
        total_rounds: slot.room.total_rounds(),
    });
    orchestrator::restart(
        state,
        &handle,
        &mut slot,
        Step::Wait(state.timing.start_delay, Action::StartRound),
    );
    Ok(None)
}

pub async fn handle_play_again(conn: &mut Connection) -> Option<ServerMessage> {
    reply(play_again(conn).await)
}

async fn play_again(conn: &Connection) -> GameResult<Option<ServerMessage>> {
    let handle = conn.room()?;
    let mut slot = handle.slot.lock().await;
    check_moderator!(conn, &slot.room, "restart the game");

    slot.cancel_timers();
    slot.room.reset();
    slot.touch();

    handle.broadcast(ServerMessage::GameReset {
        room: slot.room.snapshot(),
    });
    Ok(None)
}

pub async fn handle_challenge_answer(
    conn: &mut Connection,
    answer_index: usize,
) -> Option<ServerMessage> {
    reply(challenge_answer(conn, answer_index).await)
}

async fn challenge_answer(
    conn: &Connection,
    answer_index: usize,
) -> GameResult<Option<ServerMessage>> {
    let handle = conn.room()?;
    let mut slot = handle.slot.lock().await;
    check_moderator!(conn, &slot.room, "challenge answers");

    let challenged = slot.room.challenge_answer(answer_index)?;
    slot.touch();

    handle.broadcast(ServerMessage::AnswerChallenged {
        challenged,
        answers: slot.room.audit_answers(),
    });
    Ok(None)
}

pub async fn handle_end_audit(
    state: &Arc<AppState>,
    conn: &mut Connection,
) -> Option<ServerMessage> {
    reply(end_audit(state, conn).await)
}

async fn end_audit(state: &Arc<AppState>, conn: &Connection) -> GameResult<Option<ServerMessage>> {
    let handle = conn.room()?;
    let mut slot = handle.slot.lock().await;
    check_moderator!(conn, &slot.room, "end the audit");

    let phase = slot.room.phase();
    if phase != GamePhase::Audit {
        return Err(GameError::WrongPhase(phase));
    }
    slot.touch();

    // cuts the audit countdown short
    orchestrator::restart(state, &handle, &mut slot, Step::Run(Action::EndAudit));
    Ok(None)
}

pub async fn handle_update_settings(
    conn: &mut Connection,
    typing_seconds: Option<u32>,
    music_enabled: Option<bool>,
) -> Option<ServerMessage> {
    let update = SettingsUpdate {
        typing_seconds,
        music_enabled,
    };
    reply(update_settings(conn, update).await)
}

async fn update_settings(
    conn: &Connection,
    update: SettingsUpdate,
) -> GameResult<Option<ServerMessage>> {
    let handle = conn.room()?;
    let mut slot = handle.slot.lock().await;
    check_moderator!(conn, &slot.room, "change settings");

    let settings = slot.room.update_settings(update);
    slot.touch();

    handle.broadcast(ServerMessage::SettingsUpdated { settings });
    Ok(None)
}

pub async fn handle_transfer_host(
    conn: &mut Connection,
    player_id: PlayerId,
) -> Option<ServerMessage> {
    reply(transfer_host(conn, player_id).await)
}

async fn transfer_host(
    conn: &Connection,
    player_id: PlayerId,
) -> GameResult<Option<ServerMessage>> {
    let handle = conn.room()?;
    let mut slot = handle.slot.lock().await;
    check_moderator!(conn, &slot.room, "transfer host");

    slot.room.transfer_host(&player_id)?;
    slot.touch();

    handle.broadcast(ServerMessage::HostChanged {
        host_id: player_id,
        players: slot.room.player_list(),
    });
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ClientMessage;
    use crate::ws::handlers::handle_message;

    async fn tv_for(state: &Arc<AppState>, code: &str) -> Connection {
        let mut conn = Connection::new();
        handle_message(
            ClientMessage::TvJoin {
                room_code: code.to_string(),
            },
            &mut conn,
            state,
        )
        .await;
        conn
    }

    async fn player_for(state: &Arc<AppState>, code: &str, name: &str) -> (Connection, PlayerId) {
        let mut conn = Connection::new();
        match handle_message(
            ClientMessage::Join {
                room_code: code.to_string(),
                player_name: name.to_string(),
            },
            &mut conn,
            state,
        )
        .await
        {
            Some(ServerMessage::Joined { player_id, .. }) => (conn, player_id),
            other => panic!("Expected Joined, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_tv_updates_settings() {
        let state = Arc::new(AppState::new());
        let handle = state.create_room().await;
        let mut tv = tv_for(&state, &handle.code).await;
        let mut rx = tv.take_subscription().unwrap();

        let reply = handle_update_settings(&mut tv, Some(15), Some(false)).await;
        assert!(reply.is_none());

        match rx.try_recv() {
            Ok(ServerMessage::SettingsUpdated { settings }) => {
                assert_eq!(settings.typing_seconds, 15);
                assert!(!settings.music_enabled);
            }
            other => panic!("Expected SettingsUpdated, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_host_transfers_host() {
        let state = Arc::new(AppState::new());
        let handle = state.create_room().await;
        let (mut alice, _) = player_for(&state, &handle.code, "Alice").await;
        let (mut bob, bob_id) = player_for(&state, &handle.code, "Bob").await;

        // Bob is not host yet
        match handle_transfer_host(&mut bob, bob_id.clone()).await {
            Some(ServerMessage::Error { code, msg }) => {
                assert_eq!(code, "UNAUTHORIZED");
                assert_eq!(msg, "Only the host or TV can transfer host");
            }
            other => panic!("Expected Error, got {:?}", other),
        }

        assert!(handle_transfer_host(&mut alice, bob_id.clone()).await.is_none());
        assert!(handle.slot.lock().await.room.is_host(&bob_id));
    }

    #[tokio::test]
    async fn test_end_audit_outside_audit() {
        let state = Arc::new(AppState::new());
        let handle = state.create_room().await;
        let mut tv = tv_for(&state, &handle.code).await;

        match handle_end_audit(&state, &mut tv).await {
            Some(ServerMessage::Error { code, .. }) => assert_eq!(code, "WRONG_PHASE"),
            other => panic!("Expected Error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_start_game_needs_two_players() {
        let state = Arc::new(AppState::new());
        let handle = state.create_room().await;
        let (mut alice, _) = player_for(&state, &handle.code, "Alice").await;

        match handle_start_game(&state, &mut alice, None).await {
            Some(ServerMessage::Error { code, msg }) => {
                assert_eq!(code, "NOT_ENOUGH_PLAYERS");
                assert_eq!(msg, "Need at least 2 players");
            }
            other => panic!("Expected Error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_play_again_returns_to_lobby() {
        let state = Arc::new(AppState::new());
        let handle = state.create_room().await;
        let (mut alice, _) = player_for(&state, &handle.code, "Alice").await;
        let (_bob, _) = player_for(&state, &handle.code, "Bob").await;

        assert!(handle_start_game(&state, &mut alice, Some("quick".to_string()))
            .await
            .is_none());
        assert_eq!(handle.slot.lock().await.room.total_rounds(), 5);

        let epoch = handle.slot.lock().await.timer_epoch;
        assert!(handle_play_again(&mut alice).await.is_none());

        let slot = handle.slot.lock().await;
        assert!(slot.timer_epoch > epoch);
        assert_eq!(slot.room.phase(), GamePhase::Lobby);
        assert!(!slot.room.is_started());
    }
}
