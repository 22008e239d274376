//! Slack Web API client and payload types.
//!
//! This crate provides:
//! - Typed payloads for the pieces of the Slack platform pipeform consumes:
//!   slash commands, interactivity payloads (modal submissions, button
//!   clicks) and the Events API envelope (`types` module)
//! - A thin `chat.postMessage` / `views.open` / `views.update` client over
//!   reqwest (`logic` module)
//!
//! Event delivery, modal rendering and retry semantics all live on Slack's
//! side; nothing here is stateful.

pub mod logic;
mod types;

pub use logic::{SlackClient, SlackClientError};
pub use types::{
    BlockValue, InteractionPayload, SelectedOption, SlackAppMentionEvent, SlackEvent,
    SlackEventEnvelope, SlackUser, SlashCommandPayload, ViewPayload, ViewState,
};
