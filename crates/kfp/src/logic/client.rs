//! KFP API client
//!
//! Thin client over the Kubeflow Pipelines v1beta1 REST API, authenticated
//! with the EKS bearer token.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use shared::error::CommonError;
use tracing::{debug, trace};

use crate::types::{
    ApiParameter, CreateExperimentRequest, CreateRunRequest, CreateRunResponse, Experiment,
    ListExperimentsResponse, ListPipelinesResponse, Pipeline, PipelineSpec, ResourceKey,
    ResourceReference,
};

const API_PREFIX: &str = "apis/v1beta1";

/// HTTP client for the KFP v1beta1 API
pub struct KfpClient {
    client: Client,
    base_url: String,
    bearer_token: String,
}

impl KfpClient {
    pub fn new(base_url: impl Into<String>, bearer_token: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer_token,
        }
    }

    /// Resolve a pipeline name to its id.
    pub async fn pipeline_id_for(&self, pipeline_name: &str) -> Result<String, CommonError> {
        let filter = name_filter(pipeline_name)?;
        let response: ListPipelinesResponse = self
            .get(&format!("{API_PREFIX}/pipelines"), &[("filter", filter.as_str())])
            .await?;

        response
            .pipelines
            .into_iter()
            .next()
            .map(|pipeline| pipeline.id)
            .ok_or_else(|| CommonError::NotFound {
                msg: format!("no pipeline named '{pipeline_name}'"),
                lookup_id: pipeline_name.to_string(),
                source: None,
            })
    }

    /// Current default version of a pipeline.
    pub async fn default_version_id(&self, pipeline_id: &str) -> Result<String, CommonError> {
        let pipeline: Pipeline = self
            .get(&format!("{API_PREFIX}/pipelines/{pipeline_id}"), &[])
            .await?;
        pipeline
            .default_version
            .map(|version| version.id)
            .ok_or_else(|| CommonError::InvalidResponse {
                msg: format!("pipeline '{pipeline_id}' has no default version"),
                source: None,
            })
    }

    /// Create an experiment by name, reusing an existing one.
    pub async fn create_or_get_experiment(&self, name: &str) -> Result<String, CommonError> {
        let filter = name_filter(name)?;
        let existing: ListExperimentsResponse = self
            .get(&format!("{API_PREFIX}/experiments"), &[("filter", filter.as_str())])
            .await?;
        if let Some(experiment) = existing.experiments.into_iter().next() {
            trace!(experiment = %name, id = %experiment.id, "Reusing experiment");
            return Ok(experiment.id);
        }

        let created: Experiment = self
            .post(
                &format!("{API_PREFIX}/experiments"),
                &CreateExperimentRequest {
                    name: name.to_string(),
                },
            )
            .await?;
        debug!(experiment = %name, id = %created.id, "Created experiment");
        Ok(created.id)
    }

    /// Submit a run bound to a pipeline version, owned by an experiment.
    pub async fn run_pipeline(
        &self,
        experiment_id: &str,
        version_id: &str,
        run_name: &str,
        parameters: Vec<ApiParameter>,
    ) -> Result<String, CommonError> {
        let request = run_request(experiment_id, version_id, run_name, parameters);
        let response: CreateRunResponse =
            self.post(&format!("{API_PREFIX}/runs"), &request).await?;
        Ok(response.run.id)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, CommonError> {
        trace!(path = %path, "KFP GET");
        let response = self
            .client
            .get(format!("{}/{path}", self.base_url))
            .query(query)
            .header("Authorization", format!("Bearer {}", self.bearer_token))
            .send()
            .await?;
        Self::decode(path, response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, CommonError> {
        trace!(path = %path, "KFP POST");
        let response = self
            .client
            .post(format!("{}/{path}", self.base_url))
            .header("Authorization", format!("Bearer {}", self.bearer_token))
            .json(body)
            .send()
            .await?;
        Self::decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, CommonError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(CommonError::InvalidResponse {
                msg: format!("KFP API {path} returned {status}: {body}"),
                source: None,
            });
        }
        serde_json::from_str(&body).map_err(|e| CommonError::InvalidResponse {
            msg: format!("KFP API {path} returned an unexpected body: {e}"),
            source: Some(e.into()),
        })
    }
}

/// v1beta1 name-equality filter, JSON-encoded into the query string.
fn name_filter(name: &str) -> Result<String, CommonError> {
    let filter = serde_json::json!({
        "predicates": [{
            "op": 1, // EQUALS
            "key": "name",
            "stringValue": name,
        }]
    });
    Ok(serde_json::to_string(&filter)?)
}

pub(crate) fn run_request(
    experiment_id: &str,
    version_id: &str,
    run_name: &str,
    parameters: Vec<ApiParameter>,
) -> CreateRunRequest {
    CreateRunRequest {
        name: run_name.to_string(),
        pipeline_spec: PipelineSpec { parameters },
        resource_references: vec![
            ResourceReference {
                key: ResourceKey {
                    id: experiment_id.to_string(),
                    kind: "EXPERIMENT".to_string(),
                },
                relationship: "OWNER".to_string(),
            },
            ResourceReference {
                key: ResourceKey {
                    id: version_id.to_string(),
                    kind: "PIPELINE_VERSION".to_string(),
                },
                relationship: "CREATOR".to_string(),
            },
        ],
    }
}

/// Stringify run parameters; v1beta1 parameter values are strings.
pub fn to_parameters(args: &serde_json::Map<String, Value>) -> Vec<ApiParameter> {
    args.iter()
        .map(|(name, value)| ApiParameter {
            name: name.clone(),
            value: match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    mod unit {
        use super::super::*;
        use serde_json::json;

        #[test]
        fn test_name_filter_shape() {
            let filter = name_filter("training").unwrap();
            let parsed: Value = serde_json::from_str(&filter).unwrap();
            assert_eq!(parsed["predicates"][0]["op"], 1);
            assert_eq!(parsed["predicates"][0]["key"], "name");
            assert_eq!(parsed["predicates"][0]["stringValue"], "training");
        }

        #[test]
        fn test_run_request_references_experiment_and_version() {
            let request = run_request("exp-1", "ver-9", "Run of training/ver-9", Vec::new());
            let body = serde_json::to_value(&request).unwrap();
            assert_eq!(body["name"], "Run of training/ver-9");
            assert_eq!(body["resource_references"][0]["key"]["type"], "EXPERIMENT");
            assert_eq!(body["resource_references"][0]["relationship"], "OWNER");
            assert_eq!(
                body["resource_references"][1]["key"]["type"],
                "PIPELINE_VERSION"
            );
            assert_eq!(body["resource_references"][1]["relationship"], "CREATOR");
        }

        #[test]
        fn test_parameters_are_stringified() {
            let mut args = serde_json::Map::new();
            args.insert("dataset-id".to_string(), json!(2));
            args.insert("run_name".to_string(), json!("nightly"));

            let parameters = to_parameters(&args);
            assert_eq!(
                parameters,
                vec![
                    ApiParameter {
                        name: "dataset-id".to_string(),
                        value: "2".to_string(),
                    },
                    ApiParameter {
                        name: "run_name".to_string(),
                        value: "nightly".to_string(),
                    },
                ]
            );
        }
    }
}
