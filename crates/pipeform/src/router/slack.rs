//! Slack webhook routes
//!
//! Slash commands open the form's modal; view submissions are validated
//! inline (field errors keep the modal open) and accepted submissions run on
//! a background task while the modal switches to the "Working on it" view.
//! Slack enforces a 3 second response deadline on all three endpoints, which
//! is why nothing here waits on the pipelines API.

use axum::response::{IntoResponse, Response};
use axum::{Form, Json, extract::State};
use http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{error, trace, warn};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use forms::ErrorMap;
use forms::logic::render::{build_modal_view, working_view};
use shared::error::CommonError;
use slack::{
    InteractionPayload, SlackClientError, SlackEvent, SlackEventEnvelope, SlashCommandPayload,
};

use crate::logic::submission::{self, Prepared};
use crate::state::AppState;

pub const SERVICE_ROUTE_KEY: &str = "slack";

/// Creates the webhook router for the Slack-facing endpoints
pub fn create_router() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(route_slash_command))
        .routes(routes!(route_interaction))
        .routes(routes!(route_slack_event))
}

/// POST /slack/commands - slash command endpoint
///
/// Looks the command up in the routing table and opens the form's modal for
/// the invoking user.
#[utoipa::path(
    post,
    path = "/slack/commands",
    tags = [SERVICE_ROUTE_KEY],
    responses(
        (status = 200, description = "Command acknowledged"),
        (status = 500, description = "Internal Server Error"),
    ),
    summary = "Slash command endpoint",
    description = "Receives slash command invocations and opens the corresponding form modal.",
    operation_id = "slack-commands",
)]
pub async fn route_slash_command(
    State(state): State<AppState>,
    Form(command): Form<SlashCommandPayload>,
) -> Result<Response, CommonError> {
    trace!(command = %command.command, user = %command.user_id, "Received slash command");

    let Some(route) = state.routes.form_for_command(&command.command) else {
        warn!(command = %command.command, "No form registered for command");
        return Ok((
            StatusCode::OK,
            format!("Unknown command {}", command.command),
        )
            .into_response());
    };

    let view = build_modal_view(&route.definition);
    state
        .slack
        .views_open(&command.trigger_id, view)
        .await
        .map_err(slack_error)?;

    Ok(StatusCode::OK.into_response())
}

/// Form wrapper for interactivity payloads: Slack posts `payload={json}`.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct InteractionForm {
    payload: String,
}

/// POST /slack/interactions - interactivity endpoint
///
/// Routes modal submissions by callback id. A rejected submission answers
/// with inline field errors and the modal stays open; an accepted one
/// switches the modal to the working view and submits in the background.
#[utoipa::path(
    post,
    path = "/slack/interactions",
    tags = [SERVICE_ROUTE_KEY],
    responses(
        (status = 200, description = "Interaction handled"),
        (status = 500, description = "Internal Server Error"),
    ),
    summary = "Interactivity endpoint",
    description = "Receives view submissions and block actions. View submissions are validated \
                   and, when clean, submitted as a pipeline run on a background task.",
    operation_id = "slack-interactions",
)]
pub async fn route_interaction(
    State(state): State<AppState>,
    Form(form): Form<InteractionForm>,
) -> Result<Response, CommonError> {
    let payload: InteractionPayload = serde_json::from_str(&form.payload)?;

    match payload {
        InteractionPayload::ViewSubmission { user, view } => {
            let Some(route) = state.routes.form_for_callback(&view.callback_id) else {
                warn!(callback_id = %view.callback_id, "No form registered for callback");
                return Ok(StatusCode::OK.into_response());
            };
            trace!(callback_id = %view.callback_id, user = %user.id, "View submitted");

            match submission::prepare(&route, &view.state)? {
                Prepared::Rejected(errors) => Ok(Json(errors_response(&errors)).into_response()),
                Prepared::Accepted(pending) => {
                    let channel = route
                        .definition
                        .channel
                        .clone()
                        .unwrap_or_else(|| user.id.clone());
                    let submitter_name = Some(user.display_name().to_string());

                    tokio::spawn(submission::run_submission(
                        state.submitter.clone(),
                        state.notifier.clone(),
                        channel,
                        submitter_name,
                        pending,
                    ));

                    Ok(Json(json!({
                        "response_action": "update",
                        "view": working_view(None),
                    }))
                    .into_response())
                }
            }
        }

        // e.g. the "View pipeline" button; nothing to do beyond the ack
        InteractionPayload::BlockActions { .. } => Ok(StatusCode::OK.into_response()),

        InteractionPayload::Unknown => Ok(StatusCode::OK.into_response()),
    }
}

/// POST /slack/events - Events API endpoint
///
/// Echoes the URL verification challenge and answers app mentions.
#[utoipa::path(
    post,
    path = "/slack/events",
    tags = [SERVICE_ROUTE_KEY],
    responses(
        (status = 200, description = "Event acknowledged"),
    ),
    summary = "Events API endpoint",
    description = "Receives Slack Events API webhooks: URL verification challenges and app mentions.",
    operation_id = "slack-events",
)]
pub async fn route_slack_event(
    State(state): State<AppState>,
    Json(envelope): Json<SlackEventEnvelope>,
) -> Response {
    match envelope {
        SlackEventEnvelope::UrlVerification { challenge, .. } => {
            trace!("Responding to Slack URL verification challenge");
            Json(json!({"challenge": challenge})).into_response()
        }

        SlackEventEnvelope::EventCallback { event, .. } => {
            if let SlackEvent::AppMention(mention) = event {
                trace!(channel = %mention.channel, user = %mention.user, "App mention");
                let slack = state.slack.clone();
                tokio::spawn(async move {
                    if let Err(e) = slack.post_message(&mention.channel, "What's up?").await {
                        error!(error = %e, "Failed to reply to mention");
                    }
                });
            }
            StatusCode::OK.into_response()
        }

        SlackEventEnvelope::AppRateLimited {
            minute_rate_limited,
            ..
        } => {
            warn!(
                rate_limited_until = minute_rate_limited,
                "Slack app rate limited"
            );
            StatusCode::OK.into_response()
        }
    }
}

/// The `response_action: errors` body keeping the modal open with inline
/// field errors.
fn errors_response(errors: &ErrorMap) -> Value {
    json!({
        "response_action": "errors",
        "errors": errors,
    })
}

fn slack_error(e: SlackClientError) -> CommonError {
    CommonError::Unknown(anyhow::Error::new(e))
}

#[cfg(test)]
mod tests {
    mod unit {
        use super::super::*;

        #[test]
        fn test_errors_response_shape() {
            let mut errors = ErrorMap::new();
            errors.insert(
                "dataset-id".to_string(),
                "The value must be 1,2, or 3".to_string(),
            );
            let body = errors_response(&errors);
            assert_eq!(body["response_action"], "errors");
            assert_eq!(body["errors"]["dataset-id"], "The value must be 1,2, or 3");
        }

        #[test]
        fn test_interaction_form_unwraps_payload() {
            let form: InteractionForm =
                serde_json::from_value(json!({"payload": "{\"type\":\"shortcut\"}"})).unwrap();
            let payload: InteractionPayload = serde_json::from_str(&form.payload).unwrap();
            assert!(matches!(payload, InteractionPayload::Unknown));
        }
    }
}
