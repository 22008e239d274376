//! Submission orchestration
//!
//! A submitted modal either validates fully (the arguments are forwarded to
//! the pipeline submitter and the outcome is posted to the channel) or fails
//! fully (field errors are returned inline and nothing is forwarded).

use std::sync::Arc;

use shared::error::CommonError;
use slack::ViewState;
use tracing::warn;

use forms::logic::parse::parse_submission;
use forms::{ArgumentMap, ErrorMap, PIPELINE_CHOICE_FIELD, PipelineName, SubmissionValues};
use kfp::{RunRequest, SubmitPipeline};

use crate::logic::notify::{Notify, SubmissionSummary};
use crate::logic::routing::FormRoute;

/// Validation outcome of a submitted modal.
pub enum Prepared {
    /// Field errors to show inline; the form stays open, nothing is sent.
    Rejected(ErrorMap),
    /// Clean arguments, ready for submission.
    Accepted(PendingRun),
}

pub struct PendingRun {
    pub pipeline_name: String,
    pub experiment_name: String,
    pub args: ArgumentMap,
    /// Raw values, kept for the success summary.
    pub values: SubmissionValues,
}

/// Parse and validate a submitted modal.
///
/// The synthetic pipeline chooser entry is consumed here: it selects the
/// pipeline and is not part of the validated arguments.
pub fn prepare(route: &FormRoute, state: &ViewState) -> Result<Prepared, CommonError> {
    let mut values = parse_submission(state, &route.definition)?;

    let pipeline_name = match &route.definition.kfp.pipeline_name {
        PipelineName::Fixed(name) => name.clone(),
        PipelineName::Choices(_) => {
            values
                .remove(PIPELINE_CHOICE_FIELD)
                .ok_or_else(|| CommonError::InvalidResponse {
                    msg: format!(
                        "form '{}': submission carries no pipeline choice",
                        route.definition.name
                    ),
                    source: None,
                })?
        }
    };

    let (args, errors) = route.validator.validate(&values);
    if !errors.is_empty() {
        return Ok(Prepared::Rejected(errors));
    }

    Ok(Prepared::Accepted(PendingRun {
        pipeline_name,
        experiment_name: route.definition.experiment_name().to_string(),
        args,
        values,
    }))
}

/// Submit a prepared run and report the outcome. Exactly one notification is
/// sent: success with the run link, or the single formatted failure.
pub async fn run_submission(
    submitter: Arc<dyn SubmitPipeline>,
    notifier: Arc<dyn Notify>,
    channel: String,
    submitter_name: Option<String>,
    pending: PendingRun,
) {
    let request = RunRequest {
        experiment_name: pending.experiment_name.clone(),
        pipeline_name: pending.pipeline_name.clone(),
        run_name: None,
        args: pending.args,
    };

    match submitter.submit_run(request).await {
        Ok(run) => {
            let summary = SubmissionSummary {
                run,
                experiment_name: pending.experiment_name,
                pipeline_name: pending.pipeline_name,
                submitter: submitter_name,
                values: pending.values,
            };
            notifier.submission_succeeded(&channel, &summary).await;
        }
        Err(e) => {
            warn!(channel = %channel, error = %e.detail(), "Pipeline submission failed");
            notifier.submission_failed(&channel, &e).await;
        }
    }
}

#[cfg(test)]
mod tests {
    mod unit {
        use super::super::*;
        use forms::{PassthroughValidator, TrainArgsValidator};
        use kfp::RunHandle;
        use serde_json::{Value, json};
        use std::sync::Mutex;

        fn route(yaml: &str, validator: Arc<dyn forms::ArgumentValidator>) -> FormRoute {
            FormRoute {
                definition: serde_yaml::from_str(yaml).unwrap(),
                validator,
            }
        }

        fn state(json: Value) -> ViewState {
            serde_json::from_value(json).unwrap()
        }

        #[derive(Default)]
        struct RecordingSubmitter {
            requests: Mutex<Vec<RunRequest>>,
            fail: bool,
        }

        #[async_trait::async_trait]
        impl SubmitPipeline for RecordingSubmitter {
            async fn submit_run(&self, request: RunRequest) -> Result<RunHandle, CommonError> {
                self.requests.lock().unwrap().push(request);
                if self.fail {
                    return Err(CommonError::InvalidResponse {
                        msg: "KFP API is down".to_string(),
                        source: None,
                    });
                }
                Ok(RunHandle {
                    id: "run-1".to_string(),
                    name: "Run of training/ver-9".to_string(),
                })
            }
        }

        #[derive(Default)]
        struct RecordingNotifier {
            successes: Mutex<Vec<String>>,
            failures: Mutex<Vec<String>>,
        }

        #[async_trait::async_trait]
        impl Notify for RecordingNotifier {
            async fn submission_succeeded(&self, channel: &str, _summary: &SubmissionSummary) {
                self.successes.lock().unwrap().push(channel.to_string());
            }

            async fn submission_failed(&self, channel: &str, _error: &CommonError) {
                self.failures.lock().unwrap().push(channel.to_string());
            }
        }

        const SINGLE_FIELD_FORM: &str = "
name: simple
title: Simple
slash_command: /simple
kfp:
  pipeline_name: training
blocks:
  - name: run_name
";

        fn single_field_state(value: &str) -> ViewState {
            state(json!({
                "values": {
                    "run_name": {"run_name-action": {"value": value}}
                }
            }))
        }

        #[tokio::test]
        async fn test_accepted_submission_reaches_submitter_exactly_once() {
            let route = route(SINGLE_FIELD_FORM, Arc::new(PassthroughValidator));
            let prepared = prepare(&route, &single_field_state("nightly")).unwrap();
            let pending = match prepared {
                Prepared::Accepted(pending) => pending,
                Prepared::Rejected(errors) => panic!("unexpected rejection: {errors:?}"),
            };

            let submitter = Arc::new(RecordingSubmitter::default());
            let notifier = Arc::new(RecordingNotifier::default());
            run_submission(
                submitter.clone(),
                notifier.clone(),
                "C123".to_string(),
                None,
                pending,
            )
            .await;

            let requests = submitter.requests.lock().unwrap();
            assert_eq!(requests.len(), 1);
            assert_eq!(requests[0].pipeline_name, "training");
            assert_eq!(requests[0].args.get("run_name"), Some(&json!("nightly")));
            assert_eq!(notifier.successes.lock().unwrap().len(), 1);
            assert!(notifier.failures.lock().unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_submitter_failure_sends_exactly_one_failure_notification() {
            let route = route(SINGLE_FIELD_FORM, Arc::new(PassthroughValidator));
            let Prepared::Accepted(pending) = prepare(&route, &single_field_state("x")).unwrap()
            else {
                panic!("expected acceptance");
            };

            let submitter = Arc::new(RecordingSubmitter {
                fail: true,
                ..Default::default()
            });
            let notifier = Arc::new(RecordingNotifier::default());
            run_submission(
                submitter.clone(),
                notifier.clone(),
                "C123".to_string(),
                None,
                pending,
            )
            .await;

            assert_eq!(notifier.failures.lock().unwrap().len(), 1);
            assert!(notifier.successes.lock().unwrap().is_empty());
        }

        #[test]
        fn test_rejected_submission_is_not_forwarded() {
            let form = "
name: train
title: Train
slash_command: /train
kfp:
  pipeline_name: training
blocks:
  - name: dataset-id
    choices: [1, 2, 3]
";
            let route = route(form, Arc::new(TrainArgsValidator));
            let state = state(json!({
                "values": {
                    "dataset-id": {"dataset-id-action": {"selected_option": {"value": "4"}}}
                }
            }));

            match prepare(&route, &state).unwrap() {
                Prepared::Rejected(errors) => {
                    assert_eq!(
                        errors.get("dataset-id").map(String::as_str),
                        Some("The value must be 1,2, or 3")
                    );
                }
                Prepared::Accepted(_) => panic!("expected rejection"),
            }
        }

        #[test]
        fn test_pipeline_choice_selects_pipeline_and_is_dropped_from_args() {
            let form = "
name: retrain
title: Retrain
slash_command: /retrain
kfp:
  pipeline_name: [training, finetune]
blocks:
  - name: run_name
";
            let route = route(form, Arc::new(PassthroughValidator));
            let state = state(json!({
                "values": {
                    "kfp_pipeline_name": {
                        "kfp_pipeline_name-action": {"selected_option": {"value": "finetune"}}
                    },
                    "run_name": {"run_name-action": {"value": "weekly"}}
                }
            }));

            let Prepared::Accepted(pending) = prepare(&route, &state).unwrap() else {
                panic!("expected acceptance");
            };
            assert_eq!(pending.pipeline_name, "finetune");
            assert!(!pending.args.contains_key("kfp_pipeline_name"));
            assert_eq!(pending.args.get("run_name"), Some(&json!("weekly")));
        }
    }
}
