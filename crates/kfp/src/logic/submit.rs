//! Run submission
//!
//! The `SubmitPipeline` capability ties the credential, lookup and run
//! creation steps together. Any step failing aborts the whole submission;
//! the caller reports the single error and nothing is retried.

use async_trait::async_trait;
use serde_json::{Map, Value};
use shared::error::CommonError;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::logic::auth::{cluster_bearer_token, ensure_kubeconfig};
use crate::logic::client::{KfpClient, to_parameters};

/// Everything the submitter needs to reach the pipelines deployment.
#[derive(Debug, Clone)]
pub struct KfpSettings {
    pub pipelines_endpoint: String,
    pub cluster_name: String,
    pub region: String,
    pub kubeconfig_path: PathBuf,
}

/// One submission request: a named pipeline, the experiment owning the run
/// and the validated argument mapping.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub experiment_name: String,
    pub pipeline_name: String,
    /// Defaults to `Run of {pipeline}/{version}` when absent.
    pub run_name: Option<String>,
    pub args: Map<String, Value>,
}

/// Identifier and final name of a submitted run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunHandle {
    pub id: String,
    pub name: String,
}

#[async_trait]
pub trait SubmitPipeline: Send + Sync {
    async fn submit_run(&self, request: RunRequest) -> Result<RunHandle, CommonError>;
}

/// Production submitter backed by the EKS-hosted KFP deployment.
pub struct KfpSubmitter {
    settings: KfpSettings,
}

impl KfpSubmitter {
    pub fn new(settings: KfpSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl SubmitPipeline for KfpSubmitter {
    async fn submit_run(&self, request: RunRequest) -> Result<RunHandle, CommonError> {
        ensure_kubeconfig(
            &self.settings.kubeconfig_path,
            &self.settings.cluster_name,
            &self.settings.region,
        )
        .await?;

        let token =
            cluster_bearer_token(&self.settings.cluster_name, &self.settings.region).await?;
        let client = KfpClient::new(self.settings.pipelines_endpoint.clone(), token);

        let pipeline_id = client.pipeline_id_for(&request.pipeline_name).await?;
        let version_id = client.default_version_id(&pipeline_id).await?;
        debug!(
            pipeline = %request.pipeline_name,
            pipeline_id = %pipeline_id,
            version_id = %version_id,
            "Resolved pipeline"
        );

        let experiment_id = client
            .create_or_get_experiment(&request.experiment_name)
            .await?;

        let run_name = request
            .run_name
            .unwrap_or_else(|| default_run_name(&request.pipeline_name, &version_id));
        let run_id = client
            .run_pipeline(
                &experiment_id,
                &version_id,
                &run_name,
                to_parameters(&request.args),
            )
            .await?;
        info!(run_id = %run_id, run_name = %run_name, "Submitted pipeline run");

        Ok(RunHandle {
            id: run_id,
            name: run_name,
        })
    }
}

fn default_run_name(pipeline_name: &str, version_id: &str) -> String {
    format!("Run of {pipeline_name}/{version_id}")
}
