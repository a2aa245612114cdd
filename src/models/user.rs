use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    /// Farcaster network identifier, unique per account
    pub fid: i64,
    pub name: String,
    pub image: Option<String>,
    pub wallet_address: Option<String>,
    /// Cumulative token balance credited by payouts
    pub balance: Decimal,
    pub level: i32,
    pub total_wins: i32,
    pub total_losses: i32,
    pub total_spins: i32,
    /// Ticket balance, consumed one per settled spin
    pub free_spins: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn win_rate(&self) -> u32 {
        if self.total_spins > 0 {
            ((self.total_wins as f64 / self.total_spins as f64) * 100.0).round() as u32
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(wins: i32, spins: i32) -> User {
        User {
            id: Uuid::new_v4(),
            fid: 1,
            name: "tester".to_string(),
            image: None,
            wallet_address: None,
            balance: Decimal::ZERO,
            level: 1,
            total_wins: wins,
            total_losses: spins - wins,
            total_spins: spins,
            free_spins: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_win_rate() {
        assert_eq!(user(0, 0).win_rate(), 0);
        assert_eq!(user(1, 2).win_rate(), 50);
        assert_eq!(user(1, 3).win_rate(), 33);
    }
}
