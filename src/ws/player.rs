//! Player message handlers
//!
//! Joining a room, submitting answers, voting on challenges and word checks.

use crate::error::{GameError, GameResult};
use crate::orchestrator::{self, Action, Step};
use crate::protocol::{InvalidEntry, ServerMessage};
use crate::room::check_submission_size;
use crate::scoring::parse_multiple_entries;
use crate::state::AppState;
use crate::types::{Role, Verdict};
use crate::ws::handlers::{leave, reply, Connection};
use std::sync::Arc;

const MAX_NAME_CHARS: usize = 20;
const DEFAULT_NAME: &str = "Player";

fn sanitize_name(name: &str) -> String {
    let name: String = name.trim().chars().take(MAX_NAME_CHARS).collect();
    let name = name.trim_end();
    if name.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        name.to_string()
    }
}

pub async fn handle_join(
    state: &Arc<AppState>,
    conn: &mut Connection,
    room_code: String,
    player_name: String,
) -> Option<ServerMessage> {
    reply(join(state, conn, &room_code, &player_name).await)
}

async fn join(
    state: &Arc<AppState>,
    conn: &mut Connection,
    room_code: &str,
    player_name: &str,
) -> GameResult<Option<ServerMessage>> {
    let handle = state
        .get_room(room_code)
        .await
        .ok_or(GameError::RoomNotFound)?;

    let player_id = ulid::Ulid::new().to_string();
    let name = sanitize_name(player_name);

    let mut slot = handle.slot.lock().await;
    if slot.closed {
        return Err(GameError::RoomNotFound);
    }
    // a refused join must leave any current seat untouched
    let player = slot.room.join(&player_id, &name)?;
    slot.touch();
    tracing::info!("Room {}: {} joined as {}", handle.code, name, player_id);

    let previous = conn.attach(&handle, Role::Player, Some(player_id.clone()));
    handle.broadcast(ServerMessage::PlayerJoined {
        player,
        players: slot.room.player_list(),
    });
    let room = slot.room.snapshot();
    drop(slot);

    if let Some(previous) = previous {
        leave(state, previous).await;
    }

    Ok(Some(ServerMessage::Joined { player_id, room }))
}

pub async fn handle_submit_answer(
    state: &Arc<AppState>,
    conn: &mut Connection,
    answer: Option<String>,
    entries: Option<Vec<String>>,
) -> Option<ServerMessage> {
    reply(submit_answer(state, conn, answer, entries).await)
}

async fn submit_answer(
    state: &Arc<AppState>,
    conn: &Connection,
    answer: Option<String>,
    entries: Option<Vec<String>>,
) -> GameResult<Option<ServerMessage>> {
    let (handle, player_id) = conn.player()?;

    let items: Vec<String> = match entries {
        Some(entries) => entries
            .iter()
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect(),
        None => parse_multiple_entries(answer.as_deref().unwrap_or_default()),
    };

    check_submission_size(&items)?;

    // Validate before taking the room lock
    let mut accepted = Vec::new();
    let mut invalid_entries = Vec::new();
    for item in items {
        let check = state.validator.validate(&item);
        if check.valid {
            accepted.push(item);
        } else {
            invalid_entries.push(InvalidEntry {
                entry: item,
                reason: check.reason,
            });
        }
    }
    let answer = accepted.join(", ");

    let mut slot = handle.slot.lock().await;
    slot.room.submit_answer(&player_id, &answer)?;
    slot.touch();

    let snapshot = slot.room.snapshot();
    tracing::info!(
        "Room {}: answer from {} ({}/{} submitted, {} rejected items)",
        handle.code,
        player_id,
        snapshot.submitted_count,
        snapshot.players.len(),
        invalid_entries.len()
    );
    handle.broadcast(ServerMessage::PlayerSubmitted {
        player_id,
        submitted_count: snapshot.submitted_count,
        player_count: snapshot.players.len(),
    });

    Ok(Some(ServerMessage::AnswerReceived {
        answer,
        invalid_entries,
    }))
}

pub async fn handle_submit_vote(
    state: &Arc<AppState>,
    conn: &mut Connection,
    vote: Verdict,
) -> Option<ServerMessage> {
    reply(submit_vote(state, conn, vote).await)
}

async fn submit_vote(
    state: &Arc<AppState>,
    conn: &Connection,
    vote: Verdict,
) -> GameResult<Option<ServerMessage>> {
    let (handle, player_id) = conn.player()?;

    let mut slot = handle.slot.lock().await;
    let progress = slot.room.submit_vote(&player_id, vote)?;
    slot.touch();

    handle.broadcast(ServerMessage::VoteReceived {
        votes_cast: progress.votes_cast,
        eligible_voters: progress.eligible_voters,
    });

    if progress.complete() {
        tracing::info!("Room {}: all votes in, closing vote early", handle.code);
        orchestrator::restart(state, &handle, &mut slot, Step::Run(Action::EndVote));
    }
    Ok(None)
}

pub fn handle_validate_word(state: &Arc<AppState>, word: String) -> Option<ServerMessage> {
    let check = state.validator.validate(&word);
    Some(ServerMessage::WordValidation {
        word,
        valid: check.valid,
        reason: check.reason,
    })
}
