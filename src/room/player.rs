use super::{Room, MAX_PLAYERS};
use crate::error::{GameError, GameResult};
use crate::types::*;

/// Result of a player leaving
#[derive(Debug, Clone, PartialEq)]
pub struct LeaveOutcome {
    pub player: Player,
    /// Set when the host left and someone else took over
    pub new_host: Option<PlayerId>,
}

impl Room {
    /// Add a player to the lobby. The first player becomes host.
    pub fn join(&mut self, player_id: &str, name: &str) -> GameResult<PlayerInfo> {
        if self.started || self.phase != GamePhase::Lobby {
            return Err(GameError::AlreadyStarted);
        }

        if let Some(existing) = self.players.get_mut(player_id) {
            existing.name = name.to_string();
        } else {
            if self.players.len() >= MAX_PLAYERS {
                return Err(GameError::RoomFull(MAX_PLAYERS));
            }

            let player = Player {
                id: player_id.to_string(),
                name: name.to_string(),
                join_seq: self.next_join_seq,
            };
            self.next_join_seq += 1;
            self.players.insert(player.id.clone(), player);
            self.scores.insert(player_id.to_string(), 0);

            if self.host_id.is_none() {
                self.host_id = Some(player_id.to_string());
            }
        }

        tracing::info!("Room {}: {} joined as {}", self.code, player_id, name);
        self.player_info(player_id).ok_or(GameError::UnknownPlayer)
    }

    /// Remove a player in any phase, handing host to the longest-standing
    /// remaining player when needed.
    pub fn leave(&mut self, player_id: &str) -> GameResult<LeaveOutcome> {
        let player = self
            .players
            .remove(player_id)
            .ok_or(GameError::UnknownPlayer)?;
        self.scores.remove(player_id);
        self.answers.remove(player_id);
        self.votes.remove(player_id);

        let mut new_host = None;
        if self.is_host(player_id) {
            let successor = self.players_in_join_order().first().map(|p| p.id.clone());
            self.host_id = successor.clone();
            new_host = successor;
        }

        tracing::info!(
            "Room {}: {} left ({} remaining)",
            self.code,
            player_id,
            self.players.len()
        );
        Ok(LeaveOutcome { player, new_host })
    }

    pub fn transfer_host(&mut self, player_id: &str) -> GameResult<()> {
        self.require_player(player_id)?;
        self.host_id = Some(player_id.to_string());
        tracing::info!("Room {}: host is now {}", self.code, player_id);
        Ok(())
    }

    /// Apply a partial settings change. Typing durations outside the
    /// allowed choices are ignored.
    pub fn update_settings(&mut self, update: SettingsUpdate) -> Settings {
        if let Some(seconds) = update.typing_seconds {
            if TYPING_SECONDS_CHOICES.contains(&seconds) {
                self.settings.typing_seconds = seconds;
            } else {
                tracing::warn!("Room {}: ignoring typing time {}s", self.code, seconds);
            }
        }
        if let Some(enabled) = update.music_enabled {
            self.settings.music_enabled = enabled;
        }
        self.settings.clone()
    }
}
