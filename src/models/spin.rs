use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One settled, chain-verified spin. Immutable once written; tx_hash is
/// unique and serves as the settlement idempotency key.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Spin {
    pub id: i64,
    pub user_id: Uuid,
    pub bet_amount: i32,
    pub multiplier: Decimal,
    pub result: String,
    pub payout: Decimal,
    pub tx_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Winning spin joined with the player's name, for the ticker
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RecentWin {
    pub id: i64,
    pub payout: Decimal,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
}
