// Public API for integration tests and potential library usage

pub mod api;
pub mod categories;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod protocol;
pub mod room;
pub mod scoring;
pub mod state;
pub mod types;
pub mod validation;
pub mod ws;

// Background room housekeeping
pub mod broadcast;
