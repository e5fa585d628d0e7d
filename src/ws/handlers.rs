//! WebSocket message dispatch
//!
//! Each socket carries a `Connection` describing which room it is attached
//! to and in what role. Messages are dispatched to the TV, player or host
//! handler modules, and any refusal comes back as an `error` message.

use crate::error::{GameError, GameResult};
use crate::orchestrator::{self, Action, Step};
use crate::protocol::{ClientMessage, ServerMessage};
use crate::room::Room;
use crate::state::{AppState, RoomHandle};
use crate::types::{GamePhase, PlayerId, Role};
use std::sync::Arc;
use tokio::sync::broadcast;

use super::{host, player, tv};

/// A room a connection was attached to, kept until it has been left
pub(crate) struct Attachment {
    handle: RoomHandle,
    role: Option<Role>,
    player_id: Option<PlayerId>,
}

/// Per-socket session state
#[derive(Default)]
pub struct Connection {
    pub role: Option<Role>,
    pub room: Option<RoomHandle>,
    pub player_id: Option<PlayerId>,
    subscription: Option<broadcast::Receiver<ServerMessage>>,
}

impl Connection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach to a room. The broadcast subscription is taken here, before
    /// anything is announced, so this connection sees its own join.
    ///
    /// Returns the room the connection was in before, which the caller must
    /// pass to [`leave`] once it no longer holds any room lock.
    #[must_use = "the previous room must be left"]
    pub(crate) fn attach(
        &mut self,
        handle: &RoomHandle,
        role: Role,
        player_id: Option<PlayerId>,
    ) -> Option<Attachment> {
        let previous = self.release();
        self.subscription = Some(handle.tx.subscribe());
        self.room = Some(handle.clone());
        self.role = Some(role);
        self.player_id = player_id;
        previous
    }

    fn release(&mut self) -> Option<Attachment> {
        self.subscription = None;
        let handle = self.room.take()?;
        Some(Attachment {
            handle,
            role: self.role.take(),
            player_id: self.player_id.take(),
        })
    }

    /// Hand over a subscription created since the last call
    pub fn take_subscription(&mut self) -> Option<broadcast::Receiver<ServerMessage>> {
        self.subscription.take()
    }

    pub(crate) fn room(&self) -> GameResult<RoomHandle> {
        self.room.clone().ok_or(GameError::NotInRoom)
    }

    pub(crate) fn player(&self) -> GameResult<(RoomHandle, PlayerId)> {
        let handle = self.room()?;
        let player_id = self.player_id.clone().ok_or(GameError::NotInRoom)?;
        Ok((handle, player_id))
    }

    /// TV screens and the host player may run the game
    pub fn can_moderate(&self, room: &Room) -> bool {
        match self.role {
            Some(Role::Tv) => true,
            Some(Role::Player) => self
                .player_id
                .as_deref()
                .is_some_and(|id| room.is_host(id)),
            None => false,
        }
    }
}

/// Turn a handler result into the reply for the caller
pub(crate) fn reply(result: GameResult<Option<ServerMessage>>) -> Option<ServerMessage> {
    match result {
        Ok(msg) => msg,
        Err(e) => {
            tracing::warn!("Request refused: {}", e);
            Some(e.into())
        }
    }
}

/// Handle client messages and return optional response
pub async fn handle_message(
    msg: ClientMessage,
    conn: &mut Connection,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::TvJoin { room_code } => tv::handle_tv_join(state, conn, room_code).await,

        ClientMessage::Join {
            room_code,
            player_name,
        } => player::handle_join(state, conn, room_code, player_name).await,

        ClientMessage::SubmitAnswer { answer, entries } => {
            player::handle_submit_answer(state, conn, answer, entries).await
        }

        ClientMessage::SubmitVote { vote } => player::handle_submit_vote(state, conn, vote).await,

        ClientMessage::ValidateWord { word } => player::handle_validate_word(state, word),

        // Moderator commands (TV or host player, checked by each handler)
        ClientMessage::StartGame { game_length } => {
            host::handle_start_game(state, conn, game_length).await
        }

        ClientMessage::PlayAgain => host::handle_play_again(conn).await,

        ClientMessage::ChallengeAnswer { answer_index } => {
            host::handle_challenge_answer(conn, answer_index).await
        }

        ClientMessage::EndAudit => host::handle_end_audit(state, conn).await,

        ClientMessage::UpdateSettings {
            typing_seconds,
            music_enabled,
        } => host::handle_update_settings(conn, typing_seconds, music_enabled).await,

        ClientMessage::TransferHost { player_id } => {
            host::handle_transfer_host(conn, player_id).await
        }
    }
}

/// Detach a connection from its room: TV screens are uncounted, players
/// leave the game. Rooms left with nobody in them are dropped.
pub async fn detach(conn: &mut Connection, state: &Arc<AppState>) {
    if let Some(attachment) = conn.release() {
        leave(state, attachment).await;
    }
}

pub(crate) async fn leave(state: &Arc<AppState>, attachment: Attachment) {
    let Attachment {
        handle,
        role,
        player_id,
    } = attachment;

    {
        let mut slot = handle.slot.lock().await;
        slot.touch();

        match (role, player_id) {
            (Some(Role::Tv), _) => {
                slot.tv_clients = slot.tv_clients.saturating_sub(1);
                tracing::info!("Room {}: TV detached", handle.code);
            }
            (Some(Role::Player), Some(player_id)) => match slot.room.leave(&player_id) {
                Ok(outcome) => {
                    handle.broadcast(ServerMessage::PlayerLeft {
                        player_id,
                        players: slot.room.player_list(),
                        new_host: outcome.new_host,
                    });

                    // the leaver may have been the last vote outstanding
                    if slot.room.phase() == GamePhase::Voting && slot.room.all_votes_in() {
                        let close_vote = Step::Run(Action::EndVote);
                        orchestrator::restart(state, &handle, &mut slot, close_vote);
                    }
                }
                Err(e) => tracing::warn!("Room {}: leave failed: {}", handle.code, e),
            },
            _ => {}
        }

        if slot.is_abandoned() {
            slot.cancel_timers();
        }
    }

    state.remove_if_abandoned(&handle.code).await;
}
