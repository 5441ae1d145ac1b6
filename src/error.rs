// Error types for the contract client and HTTP handlers

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::units::UnitsError;

/// Failures of the contract client wrapper.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("No RPC provider configured")]
    NoProvider,
    #[error("No wallet available, please install a wallet provider")]
    NoWallet,
    #[error("Please, connect wallet, no accounts found")]
    NoAccount,
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("RPC error: {message} ({code})")]
    Rpc { code: i64, message: String },
    #[error("ABI error: {0}")]
    Abi(#[from] ethabi::Error),
    #[error("Unexpected response: {0}")]
    Decode(String),
    #[error(transparent)]
    Units(#[from] UnitsError),
    #[error("Lottery {0} not found")]
    NotFound(u64),
    #[error("Transaction {0} reverted")]
    Reverted(String),
    #[error("Transaction {0} was not mined in time")]
    Timeout(String),
}

impl ClientError {
    pub fn decode(msg: impl Into<String>) -> Self {
        ClientError::Decode(msg.into())
    }
}

/// Errors returned by the page and API routes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("{0}")]
    BadRequest(String),
    #[error("Writes are not available with the mock data source")]
    MockSource,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MockSource => StatusCode::NOT_IMPLEMENTED,
            ApiError::Client(e) => match e {
                ClientError::NoProvider | ClientError::NoWallet | ClientError::NoAccount => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                ClientError::Units(_) => StatusCode::BAD_REQUEST,
                ClientError::NotFound(_) => StatusCode::NOT_FOUND,
                ClientError::Reverted(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ClientError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                ClientError::Http(_)
                | ClientError::Rpc { .. }
                | ClientError::Abi(_)
                | ClientError::Decode(_) => StatusCode::BAD_GATEWAY,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string(),
        }));
        (self.status(), body).into_response()
    }
}
