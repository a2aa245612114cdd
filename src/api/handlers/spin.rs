//! Spin endpoints: prepare, verify, recent wins

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use ethers::types::H256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::AuthFid;
use crate::models::User;
use crate::services::spin::SpinService;
use crate::AppState;

use super::{api_error, spin_error_response, ApiError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareSpinRequest {
    pub user_wallet: String,
    pub nonce: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareSpinResponse {
    pub success: bool,
    pub signature: String,
    pub nonce: u64,
    /// Fee in wei as a decimal string
    pub spin_fee: String,
    pub contract_address: String,
}

/// Prepare an on-chain spin: advisory ticket check plus signed
/// authorization for the roulette contract.
/// POST /spin/prepare
pub async fn prepare_spin(
    State(state): State<Arc<AppState>>,
    Extension(AuthFid(fid)): Extension<AuthFid>,
    Json(req): Json<PrepareSpinRequest>,
) -> Result<Json<PrepareSpinResponse>, ApiError> {
    let service = spin_service(&state)?;
    let user = resolve_user(&state, fid).await?;

    let authorization = service
        .prepare(user.id, &req.user_wallet, req.nonce)
        .await
        .map_err(spin_error_response)?;

    Ok(Json(PrepareSpinResponse {
        success: true,
        signature: authorization.signature,
        nonce: authorization.nonce,
        spin_fee: authorization.fee_wei.to_string(),
        contract_address: format!("{:?}", authorization.contract_address),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifySpinRequest {
    pub tx_hash: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifySpinResponse {
    pub success: bool,
    pub result: String,
    pub payout: Decimal,
    pub new_balance: Decimal,
    pub new_tickets: i32,
    pub spin_id: i64,
    pub already_verified: bool,
}

/// Verify a submitted spin transaction and settle it. Idempotent on
/// tx_hash; retry on TX_PENDING.
/// POST /spin/verify
pub async fn verify_spin(
    State(state): State<Arc<AppState>>,
    Extension(AuthFid(fid)): Extension<AuthFid>,
    Json(req): Json<VerifySpinRequest>,
) -> Result<Json<VerifySpinResponse>, ApiError> {
    let service = spin_service(&state)?;
    let user = resolve_user(&state, fid).await?;

    let tx_hash = parse_tx_hash(&req.tx_hash)?;

    let settled = service
        .verify(user.id, tx_hash)
        .await
        .map_err(spin_error_response)?;

    Ok(Json(VerifySpinResponse {
        success: true,
        result: settled.outcome.to_string(),
        payout: settled.payout,
        new_balance: settled.balance,
        new_tickets: settled.tickets,
        spin_id: settled.spin_id,
        already_verified: settled.already_settled,
    }))
}

#[derive(Debug, Deserialize)]
pub struct RecentWinsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentWinEntry {
    pub id: i64,
    pub user: String,
    pub amount: Decimal,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

/// Latest winning spins for the ticker
/// GET /spin/recent-wins
pub async fn recent_wins(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecentWinsQuery>,
) -> Result<Json<Vec<RecentWinEntry>>, ApiError> {
    let limit = query.limit.unwrap_or(10).clamp(1, 100);

    let wins = state.ledger.recent_wins(limit).await.map_err(|e| {
        tracing::error!("Failed to fetch recent wins: {}", e);
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "DB_ERROR",
            "Failed to get recent wins",
        )
    })?;

    Ok(Json(
        wins.into_iter()
            .map(|win| RecentWinEntry {
                id: win.id,
                user: win.user_name,
                amount: win.payout,
                token: "ARB".to_string(),
                created_at: win.created_at,
            })
            .collect(),
    ))
}

fn spin_service(state: &AppState) -> Result<&Arc<SpinService>, ApiError> {
    state.spin_service.as_ref().ok_or_else(|| {
        api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "SPIN_DISABLED",
            "On-chain spins are not configured",
        )
    })
}

async fn resolve_user(state: &AppState, fid: i64) -> Result<User, ApiError> {
    state
        .ledger
        .find_by_fid(fid)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up user by fid {}: {}", fid, e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "DB_ERROR", "Database error")
        })?
        .ok_or_else(|| {
            api_error(
                StatusCode::NOT_FOUND,
                "USER_NOT_FOUND",
                "User not found in database. Sign in first.",
            )
        })
}

fn parse_tx_hash(raw: &str) -> Result<H256, ApiError> {
    let invalid = || {
        api_error(
            StatusCode::BAD_REQUEST,
            "INVALID_TX_HASH",
            "A valid transaction hash (txHash) is required",
        )
    };

    if !raw.starts_with("0x") || raw.len() != 66 {
        return Err(invalid());
    }
    raw.parse().map_err(|_| invalid())
}
