use super::{AppState, RoomHandle, RoomSlot};
use crate::room::Room;
use crate::types::RoomCode;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};

const CODE_CHARS: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const CODE_LENGTH: usize = 4;

/// Generate a random room code (4 characters, no 0/O/1/I)
fn generate_room_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
        .collect()
}

impl AppState {
    /// Create an empty room under a fresh code
    pub async fn create_room(&self) -> RoomHandle {
        let mut rooms = self.rooms.write().await;

        // Generate a unique code (check for collisions)
        let code = loop {
            let code = generate_room_code();
            if !rooms.contains_key(&code) {
                break code;
            }
        };

        let (tx, _rx) = broadcast::channel(100);
        let handle = RoomHandle {
            code: code.clone(),
            slot: Arc::new(Mutex::new(RoomSlot::new(Room::with_timers(
                code.clone(),
                self.timing.timers,
            )))),
            tx,
        };
        rooms.insert(code.clone(), handle.clone());

        tracing::info!("Room {} created ({} rooms live)", code, rooms.len());
        handle
    }

    /// Look up a room; codes are matched case-insensitively
    pub async fn get_room(&self, code: &str) -> Option<RoomHandle> {
        let code = code.trim().to_uppercase();
        self.rooms.read().await.get(&code).cloned()
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Drop a room and silence any timers still pending for it
    pub async fn remove_room(&self, code: &str) -> bool {
        self.remove_where(code, |_| true).await
    }

    /// Remove the room if nobody is left in it
    pub async fn remove_if_abandoned(&self, code: &RoomCode) -> bool {
        self.remove_where(code, RoomSlot::is_abandoned).await
    }

    /// Remove rooms that have been abandoned for at least `idle_timeout`;
    /// returns how many were dropped.
    pub async fn reap_idle_rooms(&self, idle_timeout: Duration) -> usize {
        let is_idle = |slot: &RoomSlot| {
            slot.is_abandoned() && slot.last_activity.elapsed() >= idle_timeout
        };

        let handles: Vec<RoomHandle> = self.rooms.read().await.values().cloned().collect();
        let mut idle = Vec::new();
        for handle in handles {
            if is_idle(&*handle.slot.lock().await) {
                idle.push(handle.code.clone());
            }
        }

        let mut removed = 0;
        for code in idle {
            // someone may have joined since the scan
            if self.remove_where(&code, is_idle).await {
                removed += 1;
            }
        }
        removed
    }

    /// Remove and close the room only if `should_remove` still holds with
    /// both the registry and the room locked, so no join can slip in between
    /// the check and the removal.
    async fn remove_where(&self, code: &str, should_remove: impl Fn(&RoomSlot) -> bool) -> bool {
        let mut rooms = self.rooms.write().await;
        let Some(handle) = rooms.get(code).cloned() else {
            return false;
        };

        let mut slot = handle.slot.lock().await;
        if !should_remove(&slot) {
            return false;
        }
        slot.close();
        rooms.remove(code);

        tracing::info!("Room {} removed ({} rooms live)", code, rooms.len());
        true
    }
}
