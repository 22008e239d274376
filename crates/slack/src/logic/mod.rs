//! Logic module for the Slack integration
//!
//! Contains the SlackClient for making HTTP requests to the Slack Web API.

mod client;

pub use client::{SlackClient, SlackClientError};
