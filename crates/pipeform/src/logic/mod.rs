//! Logic module for the pipeform server
//!
//! Contains:
//! - routing: startup-built slash-command and callback routing table
//! - submission: modal submission orchestration
//! - notify: outcome reporting back to the chat channel

pub mod notify;
pub mod routing;
pub mod submission;
