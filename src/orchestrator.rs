//! Timer driver that walks a room through its timed phases.
//!
//! Each driver is a spawned task owning one epoch value. Before touching the
//! room it re-checks, under the room lock, that the room's epoch still
//! matches; anything that cuts a phase short bumps the epoch and starts a
//! new driver, so older drivers quietly stop.

use crate::protocol::{PhaseUpdate, ServerMessage};
use crate::room::{AuditStep, Room};
use crate::state::{AppState, RoomHandle, RoomSlot};
use crate::types::GamePhase;
use std::sync::Arc;
use std::time::Duration;

/// One room transition performed by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    StartRound,
    Countdown,
    Typing,
    Lock,
    Reveal,
    RevealNext,
    Audit,
    EndAudit,
    EndVote,
    AfterVote,
    AfterScoring,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Run(Action),
    /// Sleep, then run the action
    Wait(Duration, Action),
    /// Count the room timer down once per tick while the room stays in the
    /// phase, then run the action
    Tick(GamePhase, Action),
}

/// Cancel pending timers and start a fresh driver at `step`.
///
/// Call with the room lock held so no stale driver can slip in between.
pub fn restart(state: &Arc<AppState>, handle: &RoomHandle, slot: &mut RoomSlot, step: Step) {
    let epoch = slot.cancel_timers();
    tracing::debug!("Room {}: driver epoch {} starting at {:?}", handle.code, epoch, step);
    tokio::spawn(drive(state.clone(), handle.clone(), epoch, step));
}

async fn drive(state: Arc<AppState>, handle: RoomHandle, epoch: u64, first: Step) {
    let mut step = first;
    loop {
        let next = match step {
            Step::Run(action) => run(&state, &handle, epoch, action).await,
            Step::Wait(delay, action) => {
                tokio::time::sleep(delay).await;
                Some(Step::Run(action))
            }
            Step::Tick(phase, action) => {
                if count_down(&state, &handle, epoch, phase).await {
                    Some(Step::Run(action))
                } else {
                    None
                }
            }
        };

        match next {
            Some(s) => step = s,
            None => break,
        }
    }
    tracing::debug!("Room {}: driver epoch {} finished", handle.code, epoch);
}

/// Returns true once the timer has reached zero; false if the driver has
/// been superseded or the room moved on.
async fn count_down(state: &AppState, handle: &RoomHandle, epoch: u64, phase: GamePhase) -> bool {
    loop {
        tokio::time::sleep(state.timing.tick).await;

        let mut slot = handle.slot.lock().await;
        if slot.timer_epoch != epoch || slot.room.phase() != phase {
            return false;
        }
        let remaining = slot.room.tick();
        handle.broadcast(ServerMessage::Timer { remaining });
        if remaining == 0 {
            return true;
        }
    }
}

async fn run(state: &AppState, handle: &RoomHandle, epoch: u64, action: Action) -> Option<Step> {
    let mut slot = handle.slot.lock().await;
    if slot.timer_epoch != epoch {
        tracing::debug!("Room {}: stale driver epoch {} dropped", handle.code, epoch);
        return None;
    }

    let timing = &state.timing;
    let room = &mut slot.room;
    let result = match action {
        Action::StartRound => room.start_round().map(|_| {
            handle.broadcast(ServerMessage::Phase(
                PhaseUpdate::from_room(room).with_category(room.current_category()),
            ));
            Some(Step::Wait(timing.category_reveal, Action::Countdown))
        }),
        Action::Countdown => room.start_countdown().map(|_| {
            handle.broadcast(phase_with_timer(room));
            Some(Step::Tick(GamePhase::Countdown, Action::Typing))
        }),
        Action::Typing => room.start_typing().map(|_| {
            handle.broadcast(phase_with_timer(room));
            Some(Step::Tick(GamePhase::Typing, Action::Lock))
        }),
        Action::Lock => room.lock_answers().map(|_| {
            handle.broadcast(ServerMessage::Phase(PhaseUpdate::from_room(room)));
            Some(Step::Wait(timing.lock_pause, Action::Reveal))
        }),
        Action::Reveal => room.start_reveal().map(|total| {
            handle.broadcast(ServerMessage::Phase(
                PhaseUpdate::from_room(room).with_total_answers(total),
            ));
            Some(Step::Run(Action::RevealNext))
        }),
        Action::RevealNext => room.reveal_next().map(|next| match next {
            Some(reveal) => {
                handle.broadcast(ServerMessage::RevealAnswer { reveal });
                Some(Step::Wait(timing.reveal_per_answer, Action::RevealNext))
            }
            None => Some(Step::Run(Action::Audit)),
        }),
        Action::Audit => room.start_audit().map(|_| {
            handle.broadcast(ServerMessage::Phase(
                PhaseUpdate::from_room(room)
                    .with_timer(room.timer_value())
                    .with_category(room.current_category())
                    .with_answers(room.audit_answers()),
            ));
            Some(Step::Tick(GamePhase::Audit, Action::EndAudit))
        }),
        Action::EndAudit => room
            .end_audit()
            .map(|next| Some(announce_audit_step(handle, room, next, timing.scoring))),
        Action::EndVote => room.tally_votes().map(|tally| {
            handle.broadcast(ServerMessage::VoteResult { tally });
            Some(Step::Wait(timing.vote_result_pause, Action::AfterVote))
        }),
        Action::AfterVote => room
            .advance_after_vote()
            .map(|next| Some(announce_audit_step(handle, room, next, timing.scoring))),
        Action::AfterScoring => Ok(Some(if room.is_game_over() {
            Step::Run(Action::GameOver)
        } else {
            Step::Run(Action::StartRound)
        })),
        Action::GameOver => room.end_game().map(|outcome| {
            handle.broadcast(ServerMessage::Phase(
                PhaseUpdate::from_room(room).with_outcome(outcome, room.player_list()),
            ));
            None
        }),
    };

    result.unwrap_or_else(|e| {
        tracing::warn!("Room {}: {:?} refused: {}", handle.code, action, e);
        None
    })
}

fn phase_with_timer(room: &Room) -> ServerMessage {
    ServerMessage::Phase(PhaseUpdate::from_room(room).with_timer(room.timer_value()))
}

fn announce_audit_step(
    handle: &RoomHandle,
    room: &Room,
    next: AuditStep,
    scoring_pause: Duration,
) -> Step {
    match next {
        AuditStep::Vote(challenge) => {
            handle.broadcast(ServerMessage::Phase(
                PhaseUpdate::from_room(room)
                    .with_timer(room.timer_value())
                    .with_category(room.current_category())
                    .with_challenge(challenge),
            ));
            Step::Tick(GamePhase::Voting, Action::EndVote)
        }
        AuditStep::Score(results) => {
            handle.broadcast(ServerMessage::Phase(
                PhaseUpdate::from_room(room).with_results(results),
            ));
            Step::Wait(scoring_pause, Action::AfterScoring)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::test_support::FixedCategories;
    use crate::types::GameLength;

    #[tokio::test]
    async fn test_cancelled_driver_does_nothing() {
        let state = Arc::new(AppState::new());
        let handle = state.create_room().await;
        {
            let mut slot = handle.slot.lock().await;
            slot.room.join("p1", "Alice").unwrap();
            slot.room.join("p2", "Bob").unwrap();
            slot.room.start_game(GameLength::Quick, &FixedCategories).unwrap();

            restart(
                &state,
                &handle,
                &mut slot,
                Step::Wait(Duration::from_millis(10), Action::StartRound),
            );
            slot.cancel_timers();
        }

        tokio::time::sleep(Duration::from_millis(50)).await;
        {
            let slot = handle.slot.lock().await;
            assert_eq!(slot.room.phase(), GamePhase::Lobby);
            assert_eq!(slot.room.current_round(), 0);
        }

        let mut rx = handle.tx.subscribe();
        {
            let mut slot = handle.slot.lock().await;
            restart(&state, &handle, &mut slot, Step::Run(Action::StartRound));
        }

        match tokio::time::timeout(Duration::from_secs(1), rx.recv()).await {
            Ok(Ok(ServerMessage::Phase(update))) => {
                assert_eq!(update.phase, GamePhase::CategoryReveal);
                assert_eq!(update.round, 1);
                assert_eq!(
                    update.category.map(|c| c.text),
                    Some("Category 1".to_string())
                );
            }
            other => panic!("Expected category reveal, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_refused_action_stops_driver() {
        let state = Arc::new(AppState::new());
        let handle = state.create_room().await;
        let mut rx = handle.tx.subscribe();

        // Not started, so the round cannot begin
        {
            let mut slot = handle.slot.lock().await;
            restart(&state, &handle, &mut slot, Step::Run(Action::StartRound));
        }

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(handle.slot.lock().await.room.phase(), GamePhase::Lobby);
    }
}
