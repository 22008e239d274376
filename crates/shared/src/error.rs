use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use serde::Serialize;
use thiserror::Error;

pub type DynError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug, Serialize)]
pub enum CommonError {
    #[error("could not find resource")]
    NotFound {
        msg: String,
        lookup_id: String,
        #[serde(skip)]
        #[source]
        source: Option<anyhow::Error>,
    },
    #[error("unknown error")]
    Unknown(
        #[serde(skip)]
        #[from]
        anyhow::Error,
    ),
    #[error("invalid request")]
    InvalidRequest {
        msg: String,
        #[serde(skip)]
        #[source]
        source: Option<anyhow::Error>,
    },
    #[error("invalid response")]
    InvalidResponse {
        msg: String,
        #[serde(skip)]
        #[source]
        source: Option<anyhow::Error>,
    },
    #[error("io error")]
    IoError {
        #[serde(skip)]
        #[from]
        #[source]
        source: std::io::Error,
    },
    #[error("serde json error")]
    SerdeSerializationError {
        #[serde(skip)]
        #[from]
        #[source]
        source: serde_json::Error,
    },
    #[error("serde yaml error")]
    SerdeYamlError {
        #[serde(skip)]
        #[from]
        #[source]
        source: serde_yaml::Error,
    },
    #[error("var error")]
    VarError {
        #[serde(skip)]
        #[from]
        #[source]
        source: std::env::VarError,
    },
    #[error("address parse error")]
    AddrParseError {
        #[serde(skip)]
        #[from]
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("reqwest error")]
    ReqwestError {
        #[serde(skip)]
        #[from]
        #[source]
        source: reqwest::Error,
    },
}

impl CommonError {
    /// The single-line rendering used when a failure is reported back to the
    /// user as a chat message.
    pub fn detail(&self) -> String {
        match self {
            CommonError::NotFound { msg, .. }
            | CommonError::InvalidRequest { msg, .. }
            | CommonError::InvalidResponse { msg, .. } => msg.clone(),
            CommonError::Unknown(source) => source.to_string(),
            CommonError::IoError { source } => source.to_string(),
            CommonError::SerdeSerializationError { source } => source.to_string(),
            CommonError::SerdeYamlError { source } => source.to_string(),
            CommonError::VarError { source } => source.to_string(),
            CommonError::AddrParseError { source } => source.to_string(),
            CommonError::ReqwestError { source } => source.to_string(),
        }
    }
}

impl IntoResponse for CommonError {
    fn into_response(self) -> Response {
        let status = match self {
            CommonError::NotFound { .. } => StatusCode::NOT_FOUND,
            CommonError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            CommonError::InvalidResponse { .. }
            | CommonError::Unknown(_)
            | CommonError::IoError { .. }
            | CommonError::SerdeSerializationError { .. }
            | CommonError::SerdeYamlError { .. }
            | CommonError::VarError { .. }
            | CommonError::AddrParseError { .. }
            | CommonError::ReqwestError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse {
            name: match self {
                CommonError::NotFound { .. } => "NotFound",
                CommonError::InvalidRequest { .. } => "InvalidRequest",
                CommonError::InvalidResponse { .. } => "InvalidResponse",
                _ => "InternalServerError",
            }
            .to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    name: String,
    message: String,
}
