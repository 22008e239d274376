//! Cluster credentials
//!
//! Two concerns: materializing a kubeconfig for the EKS cluster at a
//! configured path, and minting the bearer token the pipelines API accepts
//! (a presigned STS GetCallerIdentity request with the cluster name header,
//! base64url-encoded with the `k8s-aws-v1.` prefix).
//!
//! The kubeconfig is created lazily on first need and reused afterwards.
//! The existence check is deliberately not locked: concurrent cold starts
//! may recreate the file, which is idempotent.

use std::path::Path;
use std::time::Duration;

use aws_config::{BehaviorVersion, Region};
use aws_sdk_sts::presigning::PresigningConfig;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::json;
use shared::error::CommonError;
use tracing::{debug, info};

const TOKEN_PREFIX: &str = "k8s-aws-v1.";
const TOKEN_TTL: Duration = Duration::from_secs(60);
const CLUSTER_ID_HEADER: &str = "x-k8s-aws-id";

/// Write the kubeconfig for `cluster_name` to `path` unless it already
/// exists. Endpoint and certificate authority come from EKS DescribeCluster.
pub async fn ensure_kubeconfig(
    path: &Path,
    cluster_name: &str,
    region: &str,
) -> Result<(), CommonError> {
    if path.exists() {
        debug!(path = %path.display(), "Kubeconfig already present");
        return Ok(());
    }

    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await;
    let eks = aws_sdk_eks::Client::new(&config);

    let described = eks
        .describe_cluster()
        .name(cluster_name)
        .send()
        .await
        .map_err(aws_error)?;
    let cluster = described
        .cluster()
        .ok_or_else(|| missing_cluster_field(cluster_name, "cluster"))?;
    let endpoint = cluster
        .endpoint()
        .ok_or_else(|| missing_cluster_field(cluster_name, "endpoint"))?;
    let certificate = cluster
        .certificate_authority()
        .and_then(|ca| ca.data())
        .ok_or_else(|| missing_cluster_field(cluster_name, "certificateAuthority"))?;

    let rendered = render_kubeconfig(endpoint, certificate, cluster_name)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, rendered)?;
    info!(path = %path.display(), cluster = %cluster_name, "Wrote kubeconfig");
    Ok(())
}

/// Single-context kubeconfig pointing at the token-based auth plugin.
pub(crate) fn render_kubeconfig(
    endpoint: &str,
    certificate: &str,
    cluster_name: &str,
) -> Result<String, CommonError> {
    let content = json!({
        "apiVersion": "v1",
        "kind": "Config",
        "clusters": [{
            "cluster": {
                "server": endpoint,
                "certificate-authority-data": certificate,
            },
            "name": "kubernetes",
        }],
        "contexts": [{
            "context": {"cluster": "kubernetes", "user": "aws"},
            "name": "aws",
        }],
        "current-context": "aws",
        "users": [{
            "name": "aws",
            "user": {
                "exec": {
                    "apiVersion": "client.authentication.k8s.io/v1beta1",
                    "command": "aws",
                    "args": ["eks", "get-token", "--cluster-name", cluster_name],
                },
            },
        }],
    });
    Ok(serde_yaml::to_string(&content)?)
}

/// Mint a bearer token for the cluster: a presigned STS GetCallerIdentity
/// URL carrying the cluster name header, in the encoding EKS expects.
pub async fn cluster_bearer_token(
    cluster_name: &str,
    region: &str,
) -> Result<String, CommonError> {
    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await;
    let sts = aws_sdk_sts::Client::new(&config);

    let cluster_header = cluster_name.to_string();
    let presigned = sts
        .get_caller_identity()
        .customize()
        .mutate_request(move |request| {
            request
                .headers_mut()
                .insert(CLUSTER_ID_HEADER, cluster_header.clone());
        })
        .presigned(PresigningConfig::expires_in(TOKEN_TTL).map_err(aws_error)?)
        .await
        .map_err(aws_error)?;

    Ok(encode_bearer_token(presigned.uri()))
}

pub(crate) fn encode_bearer_token(presigned_url: &str) -> String {
    format!("{TOKEN_PREFIX}{}", URL_SAFE_NO_PAD.encode(presigned_url))
}

fn missing_cluster_field(cluster_name: &str, field: &str) -> CommonError {
    CommonError::InvalidResponse {
        msg: format!("DescribeCluster for '{cluster_name}' returned no {field}"),
        source: None,
    }
}

fn aws_error<E>(e: E) -> CommonError
where
    E: std::error::Error + Send + Sync + 'static,
{
    CommonError::Unknown(anyhow::Error::new(e))
}

#[cfg(test)]
mod tests {
    mod unit {
        use super::super::*;

        #[test]
        fn test_bearer_token_encoding() {
            let token = encode_bearer_token("https://sts.eu-west-1.amazonaws.com/?Action=GetCallerIdentity");
            assert!(token.starts_with("k8s-aws-v1."));
            // base64url without padding
            assert!(!token.contains('='));
            let decoded = URL_SAFE_NO_PAD
                .decode(token.trim_start_matches("k8s-aws-v1."))
                .unwrap();
            assert!(String::from_utf8(decoded).unwrap().contains("GetCallerIdentity"));
        }

        #[test]
        fn test_kubeconfig_layout() {
            let rendered =
                render_kubeconfig("https://example.eks.amazonaws.com", "Q0EtZGF0YQ==", "ml-cluster")
                    .unwrap();
            let parsed: serde_yaml::Value = serde_yaml::from_str(&rendered).unwrap();
            assert_eq!(parsed["kind"], serde_yaml::Value::from("Config"));
            assert_eq!(
                parsed["clusters"][0]["cluster"]["server"],
                serde_yaml::Value::from("https://example.eks.amazonaws.com")
            );
            assert_eq!(
                parsed["current-context"],
                serde_yaml::Value::from("aws")
            );
            let args = &parsed["users"][0]["user"]["exec"]["args"];
            assert_eq!(args[3], serde_yaml::Value::from("ml-cluster"));
        }

        #[tokio::test]
        async fn test_existing_kubeconfig_is_reused() {
            let file = tempfile::NamedTempFile::new().unwrap();
            std::fs::write(file.path(), "apiVersion: v1\n").unwrap();

            // Returns without touching AWS because the file exists.
            ensure_kubeconfig(file.path(), "ml-cluster", "eu-west-1")
                .await
                .unwrap();
            let content = std::fs::read_to_string(file.path()).unwrap();
            assert_eq!(content, "apiVersion: v1\n");
        }
    }
}
