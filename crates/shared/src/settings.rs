//! Runtime settings read from the environment.
//!
//! Every field except `forms_dir` is required; a missing variable is a
//! startup failure reported before the server begins listening.

use std::env;
use std::path::PathBuf;

use crate::error::CommonError;

const DEFAULT_FORMS_DIR: &str = "forms";

#[derive(Debug, Clone)]
pub struct Settings {
    /// Name of the EKS cluster hosting the pipelines deployment.
    pub cluster_name: String,
    /// AWS region of the cluster.
    pub region: String,
    /// Base URL used to construct run links in chat messages.
    pub base_url: String,
    /// Path at which the kubeconfig is materialized on first use.
    pub kubeconfig_path: PathBuf,
    /// Base URL of the Kubeflow Pipelines API.
    pub pipelines_endpoint: String,
    /// Slack bot token (xoxb-...).
    pub slack_bot_token: String,
    /// Directory holding the YAML form definitions.
    pub forms_dir: PathBuf,
}

impl Settings {
    pub fn from_env() -> Result<Self, CommonError> {
        Ok(Self {
            cluster_name: require("CLUSTER_NAME")?,
            region: require("REGION")?,
            base_url: require("BASE_URL")?,
            kubeconfig_path: PathBuf::from(require("KUBECONFIG")?),
            pipelines_endpoint: require("PIPELINES_ENDPOINT")?,
            slack_bot_token: require("SLACK_BOT_TOKEN")?,
            forms_dir: env::var("FORMS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_FORMS_DIR)),
        })
    }
}

fn require(name: &str) -> Result<String, CommonError> {
    env::var(name).map_err(|e| CommonError::InvalidRequest {
        msg: format!("required environment variable {name} is not set"),
        source: Some(e.into()),
    })
}
