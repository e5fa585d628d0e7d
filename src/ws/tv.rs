//! Shared screen handlers

use crate::error::{GameError, GameResult};
use crate::protocol::ServerMessage;
use crate::state::AppState;
use crate::types::Role;
use crate::ws::handlers::{leave, reply, Connection};
use std::sync::Arc;

pub async fn handle_tv_join(
    state: &Arc<AppState>,
    conn: &mut Connection,
    room_code: String,
) -> Option<ServerMessage> {
    reply(tv_join(state, conn, &room_code).await)
}

async fn tv_join(
    state: &Arc<AppState>,
    conn: &mut Connection,
    room_code: &str,
) -> GameResult<Option<ServerMessage>> {
    let handle = state
        .get_room(room_code)
        .await
        .ok_or(GameError::RoomNotFound)?;

    let mut slot = handle.slot.lock().await;
    if slot.closed {
        return Err(GameError::RoomNotFound);
    }
    slot.tv_clients += 1;
    slot.touch();
    let previous = conn.attach(&handle, Role::Tv, None);
    tracing::info!("Room {}: TV attached ({} screens)", handle.code, slot.tv_clients);
    let room = slot.room.snapshot();
    drop(slot);

    if let Some(previous) = previous {
        leave(state, previous).await;
    }

    Ok(Some(ServerMessage::RoomState { room }))
}
