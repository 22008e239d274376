//! Slack payload type definitions
//!
//! Covers the three delivery surfaces pipeform listens on: slash commands
//! (form-encoded), interactivity payloads (`payload={json}`) and the Events
//! API envelope.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Body of a slash command invocation, delivered form-encoded.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct SlashCommandPayload {
    /// The command including the leading slash, e.g. `/train`.
    pub command: String,
    /// Short-lived id required to open a modal.
    pub trigger_id: String,
    pub user_id: String,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub response_url: Option<String>,
}

/// Interactivity payload, the JSON carried in the `payload` form field.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionPayload {
    /// A modal was submitted.
    ViewSubmission { user: SlackUser, view: ViewPayload },
    /// A block element (e.g. the "View pipeline" button) was clicked.
    BlockActions {
        user: SlackUser,
        #[serde(default)]
        actions: Vec<Value>,
    },
    /// Anything pipeform does not act on.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlackUser {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl SlackUser {
    /// Display name for the submission summary, falling back to the user id.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or(&self.id)
    }
}

/// The modal view carried inside a `view_submission` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewPayload {
    pub id: String,
    pub hash: String,
    pub callback_id: String,
    pub state: ViewState,
    /// Additional properties
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Submitted modal state: `values[block_id][action_id]`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewState {
    #[serde(default)]
    pub values: HashMap<String, HashMap<String, BlockValue>>,
}

impl ViewState {
    pub fn block_value(&self, block_id: &str, action_id: &str) -> Option<&BlockValue> {
        self.values.get(block_id)?.get(action_id)
    }
}

/// A single submitted input element.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockValue {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Text input value; null when an optional input was left empty.
    #[serde(default)]
    pub value: Option<String>,
    /// Chosen option of a static select.
    #[serde(default)]
    pub selected_option: Option<SelectedOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectedOption {
    pub value: String,
}

/// Slack Events API outer envelope
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlackEventEnvelope {
    /// URL verification challenge from Slack
    UrlVerification { challenge: String, token: String },
    /// Event callback containing actual event data
    EventCallback {
        token: String,
        team_id: String,
        event: SlackEvent,
    },
    /// App rate limited notification
    AppRateLimited {
        token: String,
        team_id: String,
        minute_rate_limited: i64,
    },
}

/// Slack event types we care about
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlackEvent {
    /// App mention (@bot)
    AppMention(SlackAppMentionEvent),
    /// Catch-all for unknown events
    #[serde(other)]
    Unknown,
}

/// Slack app mention event
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct SlackAppMentionEvent {
    pub channel: String,
    pub user: String,
    pub text: String,
    pub ts: String,
    #[serde(default)]
    pub thread_ts: Option<String>,
    /// Additional properties
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request to send a message to Slack
#[derive(Debug, Clone, Serialize)]
pub struct PostMessageRequest {
    pub channel: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<Value>>,
}

/// Request to open a modal
#[derive(Debug, Clone, Serialize)]
pub struct ViewsOpenRequest {
    pub trigger_id: String,
    pub view: Value,
}

/// Request to replace an open modal's content
#[derive(Debug, Clone, Serialize)]
pub struct ViewsUpdateRequest {
    pub view_id: String,
    pub hash: String,
    pub view: Value,
}

#[cfg(test)]
mod tests {
    mod unit {
        use super::super::*;

        #[test]
        fn test_view_submission_deserialization() {
            let json = r#"{
                "type": "view_submission",
                "user": {"id": "U12345", "username": "jo", "name": "jo"},
                "view": {
                    "id": "V12345",
                    "hash": "1578712949.abcdef",
                    "callback_id": "train_callback",
                    "state": {
                        "values": {
                            "dataset-id": {
                                "dataset-id-action": {
                                    "type": "static_select",
                                    "selected_option": {"value": "2"}
                                }
                            },
                            "run_name": {
                                "run_name-action": {
                                    "type": "plain_text_input",
                                    "value": "nightly"
                                }
                            }
                        }
                    }
                }
            }"#;

            let payload: InteractionPayload = serde_json::from_str(json).unwrap();
            match payload {
                InteractionPayload::ViewSubmission { user, view } => {
                    assert_eq!(user.id, "U12345");
                    assert_eq!(view.callback_id, "train_callback");
                    let selected = view
                        .state
                        .block_value("dataset-id", "dataset-id-action")
                        .and_then(|b| b.selected_option.as_ref())
                        .map(|o| o.value.as_str());
                    assert_eq!(selected, Some("2"));
                    let text = view
                        .state
                        .block_value("run_name", "run_name-action")
                        .and_then(|b| b.value.as_deref());
                    assert_eq!(text, Some("nightly"));
                }
                _ => panic!("Expected ViewSubmission"),
            }
        }

        #[test]
        fn test_unknown_interaction_type() {
            let json = r#"{"type": "shortcut"}"#;
            let payload: InteractionPayload = serde_json::from_str(json).unwrap();
            assert!(matches!(payload, InteractionPayload::Unknown));
        }

        #[test]
        fn test_url_verification_envelope_deserialization() {
            let json = r#"{
                "type": "url_verification",
                "challenge": "test_challenge_123",
                "token": "verification_token"
            }"#;

            let envelope: SlackEventEnvelope = serde_json::from_str(json).unwrap();
            match envelope {
                SlackEventEnvelope::UrlVerification { challenge, .. } => {
                    assert_eq!(challenge, "test_challenge_123");
                }
                _ => panic!("Expected UrlVerification"),
            }
        }

        #[test]
        fn test_app_mention_event_deserialization() {
            let json = r#"{
                "type": "event_callback",
                "token": "token123",
                "team_id": "T12345",
                "event": {
                    "type": "app_mention",
                    "channel": "C12345",
                    "user": "U12345",
                    "text": "<@U_BOT> hello",
                    "ts": "1234567890.123456"
                }
            }"#;

            let envelope: SlackEventEnvelope = serde_json::from_str(json).unwrap();
            match envelope {
                SlackEventEnvelope::EventCallback { event, .. } => match event {
                    SlackEvent::AppMention(mention) => {
                        assert_eq!(mention.channel, "C12345");
                        assert!(mention.text.contains("hello"));
                    }
                    _ => panic!("Expected AppMention event"),
                },
                _ => panic!("Expected EventCallback"),
            }
        }

        #[test]
        fn test_display_name_fallback() {
            let user = SlackUser {
                id: "U1".to_string(),
                username: None,
                name: None,
            };
            assert_eq!(user.display_name(), "U1");
        }
    }
}
