//! Pipeform router endpoints
//!
//! HTTP surface for the three Slack delivery paths: slash commands,
//! interactivity payloads and the Events API.

mod slack;

pub use slack::create_router;
