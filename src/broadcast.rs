use crate::state::AppState;
use std::sync::Arc;
use std::time::Duration;

/// Spawn a background task that drops rooms nobody has been attached to for
/// at least `idle_timeout`.
pub fn spawn_idle_room_reaper(state: Arc<AppState>, interval: Duration, idle_timeout: Duration) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;

            let removed = state.reap_idle_rooms(idle_timeout).await;
            if removed > 0 {
                tracing::info!(
                    "Reaped {} idle rooms ({} still live)",
                    removed,
                    state.room_count().await
                );
            }
        }
    });
}
