//! API handlers: thin HTTP wrappers over the spin service and ledger

pub mod spin;
pub mod user;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::services::spin::SpinError;

// Error response type
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
            code: code.to_string(),
        }),
    )
}

/// Map every spin pipeline failure to a stable machine code so the UI can
/// distinguish "show error and stop" from "wait and retry" (TX_PENDING,
/// RPC_ERROR, DB_ERROR are the retryable codes).
pub fn spin_error_response(err: SpinError) -> ApiError {
    use crate::blockchain::events::DecodeError;

    let (status, code) = match &err {
        SpinError::InvalidWallet(_) => (StatusCode::BAD_REQUEST, "INVALID_WALLET"),
        SpinError::InsufficientTickets => (StatusCode::BAD_REQUEST, "INSUFFICIENT_TICKETS"),
        SpinError::UserNotFound => (StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
        SpinError::PendingConfirmation => (StatusCode::BAD_REQUEST, "TX_PENDING"),
        SpinError::Reverted => (StatusCode::BAD_REQUEST, "TX_REVERTED"),
        SpinError::Decode(decode) => match decode {
            DecodeError::WrongContract { .. } => (StatusCode::BAD_REQUEST, "WRONG_CONTRACT"),
            DecodeError::EventNotFound => (StatusCode::BAD_REQUEST, "EVENT_NOT_FOUND"),
            DecodeError::InvalidData => (StatusCode::BAD_REQUEST, "INVALID_EVENT_DATA"),
            DecodeError::UnknownResultCode(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_RESULT_CODE"),
            DecodeError::RewardOverflow(_) => (StatusCode::BAD_REQUEST, "REWARD_OVERFLOW"),
        },
        SpinError::Rpc(_) => (StatusCode::BAD_GATEWAY, "RPC_ERROR"),
        SpinError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DB_ERROR"),
        SpinError::Signer(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SIGNING_FAILED"),
    };

    api_error(status, code, err.to_string())
}
