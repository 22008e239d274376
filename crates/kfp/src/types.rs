//! KFP v1beta1 API wire types
//!
//! Only the fields pipeform reads are modeled; everything else the API
//! returns is ignored during deserialization.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct Pipeline {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub default_version: Option<PipelineVersion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineVersion {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPipelinesResponse {
    #[serde(default)]
    pub pipelines: Vec<Pipeline>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Experiment {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListExperimentsResponse {
    #[serde(default)]
    pub experiments: Vec<Experiment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateExperimentRequest {
    pub name: String,
}

/// A single run parameter; KFP v1 parameters are name/value strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiParameter {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineSpec {
    pub parameters: Vec<ApiParameter>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceKey {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceReference {
    pub key: ResourceKey,
    pub relationship: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateRunRequest {
    pub name: String,
    pub pipeline_spec: PipelineSpec,
    pub resource_references: Vec<ResourceReference>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Run {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRunResponse {
    pub run: Run,
}
