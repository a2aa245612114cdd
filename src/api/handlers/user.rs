//! User endpoints: login, ticket claim, profile

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::AuthFid;
use crate::services::ledger::LedgerError;
use crate::AppState;

use super::{api_error, ApiError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub fid: i64,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub pfp_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub id: String,
    pub fid: i64,
    pub name: String,
    pub image: Option<String>,
    pub tickets: i32,
    pub balance: Decimal,
}

/// Upsert the user by Farcaster FID: created with zero balance/tickets on
/// first login, name/pfp refreshed afterwards.
/// POST /users/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if req.fid <= 0 {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "INVALID_FID",
            "fid must be a positive number",
        ));
    }

    let name = req
        .display_name
        .or(req.username)
        .unwrap_or_else(|| format!("fc_user_{}", req.fid));

    let user = state
        .ledger
        .upsert_farcaster_user(req.fid, &name, req.pfp_url.as_deref())
        .await
        .map_err(|e| {
            tracing::error!("Login failed for fid {}: {}", req.fid, e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "DB_ERROR", "Login failed")
        })?;

    Ok(Json(LoginResponse {
        id: user.id.to_string(),
        fid: user.fid,
        name: user.name,
        image: user.image,
        tickets: user.free_spins,
        balance: user.balance,
    }))
}

#[derive(Debug, Serialize)]
pub struct ClaimTicketResponse {
    pub success: bool,
    pub tickets: i32,
}

/// Credit one ticket to the authenticated user (quest/referral interface)
/// POST /users/claim-ticket
pub async fn claim_ticket(
    State(state): State<Arc<AppState>>,
    Extension(AuthFid(fid)): Extension<AuthFid>,
) -> Result<Json<ClaimTicketResponse>, ApiError> {
    let user = state
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
        })?;

    let tickets = state
        .ledger
        .credit_tickets(user.id, 1)
        .await
        .map_err(|e| match e {
            LedgerError::UserNotFound => api_error(
                StatusCode::NOT_FOUND,
                "USER_NOT_FOUND",
                "User not found",
            ),
            LedgerError::Database(e) => {
                tracing::error!("Failed to credit ticket: {}", e);
                api_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DB_ERROR",
                    "Failed to claim ticket",
                )
            }
        })?;

    Ok(Json(ClaimTicketResponse {
        success: true,
        tickets,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    pub fid: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUser {
    pub name: String,
    pub image: Option<String>,
    pub fid: i64,
    pub wallet_address: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    pub total_wins: i32,
    pub total_losses: i32,
    pub total_spins: i32,
    pub win_rate: u32,
    pub balance: Decimal,
    pub tickets: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileHistoryEntry {
    pub id: i64,
    pub result: String,
    pub payout: Decimal,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: ProfileUser,
    pub stats: ProfileStats,
    pub history: Vec<ProfileHistoryEntry>,
}

/// User info, win/loss stats and recent spin history
/// GET /users/profile?fid=
pub async fn profile(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProfileQuery>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = state
        .ledger
        .find_by_fid(query.fid)
        .await
        .map_err(|e| {
            tracing::error!("Profile fetch failed for fid {}: {}", query.fid, e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "DB_ERROR", "Database error")
        })?
        .ok_or_else(|| {
            api_error(StatusCode::NOT_FOUND, "USER_NOT_FOUND", "User not found")
        })?;

    let history = state.ledger.spin_history(user.id, 20).await.map_err(|e| {
        tracing::error!("Spin history fetch failed for fid {}: {}", query.fid, e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "DB_ERROR", "Database error")
    })?;

    Ok(Json(ProfileResponse {
        user: ProfileUser {
            name: user.name.clone(),
            image: user.image.clone(),
            fid: user.fid,
            wallet_address: user.wallet_address.clone(),
        },
        stats: ProfileStats {
            total_wins: user.total_wins,
            total_losses: user.total_losses,
            total_spins: user.total_spins,
            win_rate: user.win_rate(),
            balance: user.balance,
            tickets: user.free_spins,
        },
        history: history
            .into_iter()
            .map(|spin| ProfileHistoryEntry {
                id: spin.id,
                result: spin.result,
                payout: spin.payout,
                created_at: spin.created_at,
            })
            .collect(),
    }))
}
