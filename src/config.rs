//! Runtime configuration read from the environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_millis(key: &str, default_ms: u64) -> Duration {
    Duration::from_millis(env_or(key, default_ms))
}

/// Server-level settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub static_dir: PathBuf,
    pub dictionary_path: Option<PathBuf>,
    /// Rooms with nobody connected are dropped after this long
    pub room_idle_timeout: Duration,
    pub reaper_interval: Duration,
}

impl ServerConfig {
    /// Load from environment variables:
    /// - `PORT` (default 3000)
    /// - `STATIC_DIR` (default `public`)
    /// - `DICTIONARY_PATH` (optional newline-separated word list)
    /// - `ROOM_IDLE_TIMEOUT_SECS` (default 300)
    /// - `ROOM_REAPER_INTERVAL_SECS` (default 30)
    pub fn from_env() -> Self {
        let dictionary_path = std::env::var("DICTIONARY_PATH")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Self {
            port: env_or("PORT", 3000),
            static_dir: PathBuf::from(env_or("STATIC_DIR", "public".to_string())),
            dictionary_path,
            room_idle_timeout: Duration::from_secs(env_or("ROOM_IDLE_TIMEOUT_SECS", 300)),
            reaper_interval: Duration::from_secs(env_or("ROOM_REAPER_INTERVAL_SECS", 30)),
        }
    }
}

/// Countdown lengths the room itself stamps into `timer_value`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTimers {
    pub countdown_seconds: u32,
    pub audit_seconds: u32,
    pub voting_seconds: u32,
}

impl Default for PhaseTimers {
    fn default() -> Self {
        Self {
            countdown_seconds: 3,
            audit_seconds: 15,
            voting_seconds: 10,
        }
    }
}

/// Pacing of the timed phases
#[derive(Debug, Clone)]
pub struct Timing {
    /// Length of one displayed timer second
    pub tick: Duration,
    pub start_delay: Duration,
    pub category_reveal: Duration,
    pub lock_pause: Duration,
    pub reveal_per_answer: Duration,
    pub vote_result_pause: Duration,
    pub scoring: Duration,
    pub timers: PhaseTimers,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            start_delay: Duration::from_millis(1000),
            category_reveal: Duration::from_millis(3000),
            lock_pause: Duration::from_millis(1000),
            reveal_per_answer: Duration::from_millis(1500),
            vote_result_pause: Duration::from_millis(2000),
            scoring: Duration::from_millis(3000),
            timers: PhaseTimers::default(),
        }
    }
}

impl Timing {
    /// Load from environment variables, falling back to the defaults:
    /// - `TIMER_TICK_MS`, `START_DELAY_MS`, `CATEGORY_REVEAL_MS`, `LOCK_PAUSE_MS`
    /// - `REVEAL_PER_ANSWER_MS`, `VOTE_RESULT_PAUSE_MS`, `SCORING_MS`
    /// - `COUNTDOWN_SECONDS`, `AUDIT_SECONDS`, `VOTING_SECONDS`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let ms = |d: Duration| d.as_millis() as u64;

        Self {
            tick: env_millis("TIMER_TICK_MS", ms(defaults.tick)),
            start_delay: env_millis("START_DELAY_MS", ms(defaults.start_delay)),
            category_reveal: env_millis("CATEGORY_REVEAL_MS", ms(defaults.category_reveal)),
            lock_pause: env_millis("LOCK_PAUSE_MS", ms(defaults.lock_pause)),
            reveal_per_answer: env_millis("REVEAL_PER_ANSWER_MS", ms(defaults.reveal_per_answer)),
            vote_result_pause: env_millis("VOTE_RESULT_PAUSE_MS", ms(defaults.vote_result_pause)),
            scoring: env_millis("SCORING_MS", ms(defaults.scoring)),
            timers: PhaseTimers {
                countdown_seconds: env_or("COUNTDOWN_SECONDS", defaults.timers.countdown_seconds),
                audit_seconds: env_or("AUDIT_SECONDS", defaults.timers.audit_seconds),
                voting_seconds: env_or("VOTING_SECONDS", defaults.timers.voting_seconds),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const TIMING_VARS: &[&str] = &[
        "TIMER_TICK_MS",
        "START_DELAY_MS",
        "CATEGORY_REVEAL_MS",
        "LOCK_PAUSE_MS",
        "REVEAL_PER_ANSWER_MS",
        "VOTE_RESULT_PAUSE_MS",
        "SCORING_MS",
        "COUNTDOWN_SECONDS",
        "AUDIT_SECONDS",
        "VOTING_SECONDS",
    ];

    fn clear(vars: &[&str]) {
        for var in vars {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_timing_defaults() {
        clear(TIMING_VARS);
        let timing = Timing::from_env();
        assert_eq!(timing.tick, Duration::from_secs(1));
        assert_eq!(timing.reveal_per_answer, Duration::from_millis(1500));
        assert_eq!(timing.timers, PhaseTimers::default());
        assert_eq!(timing.timers.audit_seconds, 15);
        assert_eq!(timing.timers.voting_seconds, 10);
    }

    #[test]
    #[serial]
    fn test_timing_overrides() {
        clear(TIMING_VARS);
        std::env::set_var("TIMER_TICK_MS", "50");
        std::env::set_var("AUDIT_SECONDS", "30");
        std::env::set_var("VOTING_SECONDS", "not-a-number");

        let timing = Timing::from_env();
        assert_eq!(timing.tick, Duration::from_millis(50));
        assert_eq!(timing.timers.audit_seconds, 30);
        assert_eq!(timing.timers.voting_seconds, 10);

        clear(TIMING_VARS);
    }

    #[test]
    #[serial]
    fn test_server_config_from_env() {
        let vars = ["PORT", "STATIC_DIR", "DICTIONARY_PATH", "ROOM_IDLE_TIMEOUT_SECS"];
        clear(&vars);

        let config = ServerConfig::from_env();
        assert_eq!(config.port, 3000);
        assert_eq!(config.static_dir, PathBuf::from("public"));
        assert!(config.dictionary_path.is_none());

        std::env::set_var("PORT", "8080");
        std::env::set_var("DICTIONARY_PATH", "/usr/share/dict/words");
        std::env::set_var("ROOM_IDLE_TIMEOUT_SECS", "60");
        let config = ServerConfig::from_env();
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.dictionary_path,
            Some(PathBuf::from("/usr/share/dict/words"))
        );
        assert_eq!(config.room_idle_timeout, Duration::from_secs(60));

        clear(&vars);
    }
}
