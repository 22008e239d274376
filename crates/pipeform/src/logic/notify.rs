//! Outcome notification
//!
//! Posts the submission outcome back to the configured channel (or the
//! submitter's DM). Fire-and-forget: a failed post is logged, never retried.

use async_trait::async_trait;
use serde_json::{Value, json};
use shared::error::CommonError;
use slack::SlackClient;
use std::sync::Arc;
use tracing::error;

use forms::SubmissionValues;
use kfp::RunHandle;

/// Summary of a successful submission, rendered into the success message.
pub struct SubmissionSummary {
    pub run: RunHandle,
    pub experiment_name: String,
    pub pipeline_name: String,
    pub submitter: Option<String>,
    pub values: SubmissionValues,
}

#[async_trait]
pub trait Notify: Send + Sync {
    async fn submission_succeeded(&self, channel: &str, summary: &SubmissionSummary);
    async fn submission_failed(&self, channel: &str, error: &CommonError);
}

pub struct SlackNotifier {
    slack: Arc<SlackClient>,
    base_url: String,
}

impl SlackNotifier {
    pub fn new(slack: Arc<SlackClient>, base_url: String) -> Self {
        Self { slack, base_url }
    }

    fn run_url(&self, run_id: &str) -> String {
        format!(
            "{}/#/runs/details/{run_id}",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl Notify for SlackNotifier {
    async fn submission_succeeded(&self, channel: &str, summary: &SubmissionSummary) {
        let url = self.run_url(&summary.run.id);

        let mut info = vec![
            ("Run id".to_string(), format!("<{url}|{}>", summary.run.id)),
            ("Run name".to_string(), summary.run.name.clone()),
            ("Experiment".to_string(), summary.experiment_name.clone()),
            ("Pipeline name".to_string(), summary.pipeline_name.clone()),
        ];
        if let Some(submitter) = &summary.submitter {
            info.push(("Submitter".to_string(), submitter.clone()));
        }

        let message = "Your submission was successful";
        let blocks = vec![
            json!({
                "type": "section",
                "text": {"type": "mrkdwn", "text": message},
                "accessory": {
                    "type": "button",
                    "text": {"type": "plain_text", "text": "View pipeline", "emoji": true},
                    "value": "click_me",
                    "url": url,
                    "action_id": "button-action",
                },
            }),
            text_fields(info.iter().map(|(k, v)| (k.as_str(), v.as_str()))),
            json!({"type": "divider"}),
            text_fields(summary.values.iter()),
        ];

        if let Err(e) = self
            .slack
            .post_message_with_blocks(channel, message, blocks)
            .await
        {
            error!(channel = %channel, error = %e, "Failed to post success notification");
        }
    }

    async fn submission_failed(&self, channel: &str, error: &CommonError) {
        let message = format!("There was an error with your submission{}", error.detail());
        if let Err(e) = self.slack.post_message(channel, &message).await {
            error!(channel = %channel, error = %e, "Failed to post failure notification");
        }
    }
}

/// A section block with one `*label*: value` field per item.
fn text_fields<'a>(items: impl Iterator<Item = (&'a str, &'a str)>) -> Value {
    let fields: Vec<Value> = items
        .map(|(label, value)| {
            json!({
                "type": "mrkdwn",
                "text": format!("*{label}*: {value}"),
            })
        })
        .collect();
    json!({"type": "section", "fields": fields})
}

#[cfg(test)]
mod tests {
    mod unit {
        use super::super::*;

        #[test]
        fn test_run_url_joins_base_url() {
            let notifier = SlackNotifier::new(
                Arc::new(SlackClient::new("xoxb-test".to_string())),
                "https://kubeflow.example.com/".to_string(),
            );
            assert_eq!(
                notifier.run_url("abc-123"),
                "https://kubeflow.example.com/#/runs/details/abc-123"
            );
        }

        #[test]
        fn test_text_fields_labeling() {
            let block = text_fields([("Run name", "nightly")].into_iter());
            assert_eq!(block["type"], "section");
            assert_eq!(block["fields"][0]["text"], "*Run name*: nightly");
        }
    }
}
