//! Logic module for pipeline submission
//!
//! Contains:
//! - auth: kubeconfig materialization and EKS bearer token minting
//! - client: KFP v1beta1 REST client
//! - submit: the SubmitPipeline capability

pub mod auth;
pub mod client;
pub mod submit;
