mod rooms;

use crate::categories::{CategoryPool, CategorySource};
use crate::config::Timing;
use crate::protocol::ServerMessage;
use crate::room::Room;
use crate::types::*;
use crate::validation::{DictionaryValidator, WordValidator};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, Mutex, RwLock};

/// A room plus the bookkeeping the timer driver and transport need.
pub struct RoomSlot {
    pub room: Room,
    /// Bumped whenever pending timers must be ignored
    pub timer_epoch: u64,
    pub tv_clients: usize,
    pub last_activity: Instant,
    /// Set once the room has left the registry; nobody may attach after that
    pub closed: bool,
}

impl RoomSlot {
    fn new(room: Room) -> Self {
        Self {
            room,
            timer_epoch: 0,
            tv_clients: 0,
            last_activity: Instant::now(),
            closed: false,
        }
    }

    /// Invalidate every pending timer; returns the new epoch.
    pub fn cancel_timers(&mut self) -> u64 {
        self.timer_epoch += 1;
        self.timer_epoch
    }

    /// Mark the room gone and silence its timers
    pub fn close(&mut self) {
        self.closed = true;
        self.cancel_timers();
    }

    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// No players and no TV attached
    pub fn is_abandoned(&self) -> bool {
        self.room.player_count() == 0 && self.tv_clients == 0
    }
}

/// Shared handle to one live room
#[derive(Clone)]
pub struct RoomHandle {
    pub code: RoomCode,
    pub slot: Arc<Mutex<RoomSlot>>,
    /// Everything sent here reaches every connection attached to the room
    pub tx: broadcast::Sender<ServerMessage>,
}

impl RoomHandle {
    /// Send to every attached connection. Having nobody listening is fine.
    pub fn broadcast(&self, msg: ServerMessage) {
        let _ = self.tx.send(msg);
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub rooms: Arc<RwLock<HashMap<RoomCode, RoomHandle>>>,
    pub timing: Timing,
    pub categories: Arc<dyn CategorySource>,
    pub validator: Arc<dyn WordValidator>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_parts(
            Timing::default(),
            Arc::new(CategoryPool::builtin()),
            Arc::new(DictionaryValidator::structural()),
        )
    }

    pub fn with_parts(
        timing: Timing,
        categories: Arc<dyn CategorySource>,
        validator: Arc<dyn WordValidator>,
    ) -> Self {
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
            timing,
            categories,
            validator,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
