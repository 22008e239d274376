//! Kubeflow Pipelines submission.
//!
//! This crate covers the whole path from "validated arguments" to "run id":
//! - `logic::auth`: materializes the kubeconfig on first use and mints the
//!   EKS bearer token the pipelines API expects
//! - `logic::client`: thin client over the KFP v1beta1 REST API (pipeline
//!   lookup, experiment create-or-reuse, run creation)
//! - `logic::submit`: the `SubmitPipeline` capability tying the steps
//!   together; any step failing aborts the whole submission
//!
//! Scheduling, retries and pipeline execution itself belong to the KFP
//! deployment; nothing here retains state between submissions apart from the
//! kubeconfig file.

pub mod logic;
mod types;

pub use logic::auth::{cluster_bearer_token, ensure_kubeconfig};
pub use logic::client::KfpClient;
pub use logic::submit::{KfpSettings, KfpSubmitter, RunHandle, RunRequest, SubmitPipeline};
