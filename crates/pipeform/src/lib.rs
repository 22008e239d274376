//! Pipeform server
//!
//! HTTP surface and orchestration for the Slack pipeline-submission bot:
//! - `logic::routing`: the finalized slash-command/callback routing table,
//!   built once at startup from the forms directory
//! - `logic::submission`: parse -> validate -> submit orchestration for a
//!   submitted modal
//! - `logic::notify`: success/failure chat messages
//! - `router`: axum endpoints for slash commands, interactivity payloads and
//!   the Events API

pub mod logic;
pub mod router;
mod state;

pub use state::AppState;
