//! Ledger Store
//!
//! All financial mutation of user state goes through this module. The
//! central operation is `settle_spin`, which applies one chain-verified
//! spin exactly once: the unique constraint on `spins.tx_hash` is the
//! serialization point for concurrent settlement attempts on the same
//! transaction.

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::blockchain::types::SpinResult;
use crate::models::{RecentWin, Spin, User};

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("user not found")]
    UserNotFound,

    /// Storage-layer failure. Transient: callers may retry the whole
    /// verify flow, settlement is idempotent on tx_hash.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Post-settlement snapshot returned to the caller
#[derive(Debug, Clone)]
pub struct Settlement {
    pub spin_id: i64,
    pub outcome: SpinResult,
    pub payout: Decimal,
    pub tickets: i32,
    pub balance: Decimal,
    /// True when this tx_hash had already been settled and no balances
    /// were re-mutated
    pub already_settled: bool,
}

#[derive(Clone)]
pub struct Ledger {
    pool: PgPool,
}

impl Ledger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Settle one verified spin atomically: insert the spin record, debit
    /// a ticket, credit the payout, bump the counters. Calling again with
    /// the same tx_hash returns the recorded result without re-mutating
    /// anything.
    ///
    /// The ticket decrement is clamped at zero. A confirmed on-chain spin
    /// always settles even if the advisory prepare-time check was raced;
    /// the fee was paid and stranding the payout would be worse than an
    /// undercounted ticket.
    pub async fn settle_spin(
        &self,
        user_id: Uuid,
        tx_hash: &str,
        outcome: SpinResult,
        payout: Decimal,
    ) -> Result<Settlement, LedgerError> {
        let mut tx = self.pool.begin().await?;

        // Idempotency fast path
        if let Some(existing) = Self::find_spin_by_tx_hash(&mut tx, tx_hash).await? {
            let snapshot = Self::balances_for(&mut tx, existing.user_id).await?;
            tx.commit().await?;
            return Self::replay(existing, snapshot);
        }

        // The insert is the serialization point: under a race, exactly one
        // settlement sees its row inserted; the loser blocks on the unique
        // index until the winner commits, then falls through to replay.
        let inserted: Option<(i64,)> = sqlx::query_as(
            r#"
            INSERT INTO spins (user_id, bet_amount, multiplier, result, payout, tx_hash)
            VALUES ($1, 1, $2, $3, $4, $5)
            ON CONFLICT (tx_hash) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(outcome.multiplier())
        .bind(outcome.as_str())
        .bind(payout)
        .bind(tx_hash)
        .fetch_optional(&mut *tx)
        .await?;

        let spin_id = match inserted {
            Some((id,)) => id,
            None => {
                // Lost the race: a concurrent call settled this tx_hash.
                // The winner's row must be visible once our insert returned
                // zero rows; a miss here is a storage anomaly, reported as
                // such so callers classify it retryable.
                tx.rollback().await?;
                let mut tx = self.pool.begin().await?;
                let existing = Self::find_spin_by_tx_hash(&mut tx, tx_hash)
                    .await?
                    .ok_or(LedgerError::Database(sqlx::Error::RowNotFound))?;
                let snapshot = Self::balances_for(&mut tx, existing.user_id).await?;
                tx.commit().await?;
                return Self::replay(existing, snapshot);
            }
        };

        let updated: Option<(i32, Decimal)> = sqlx::query_as(
            r#"
            UPDATE users
            SET free_spins = GREATEST(free_spins - 1, 0),
                balance = balance + $2,
                total_spins = total_spins + 1,
                total_wins = total_wins + CASE WHEN $3 THEN 1 ELSE 0 END,
                total_losses = total_losses + CASE WHEN $3 THEN 0 ELSE 1 END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING free_spins, balance
            "#,
        )
        .bind(user_id)
        .bind(payout)
        .bind(outcome.is_win())
        .fetch_optional(&mut *tx)
        .await?;

        // Rolls back the spin insert too
        let (tickets, balance) = updated.ok_or(LedgerError::UserNotFound)?;

        tx.commit().await?;

        Ok(Settlement {
            spin_id,
            outcome,
            payout,
            tickets,
            balance,
            already_settled: false,
        })
    }

    /// Atomic ticket credit; the narrow interface shared with the
    /// quest/referral collaborators. Returns the new ticket balance.
    pub async fn credit_tickets(&self, user_id: Uuid, amount: i32) -> Result<i32, LedgerError> {
        let updated: Option<(i32,)> = sqlx::query_as(
            r#"
            UPDATE users
            SET free_spins = free_spins + $2, updated_at = NOW()
            WHERE id = $1
            RETURNING free_spins
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .fetch_optional(&self.pool)
        .await?;

        updated.map(|(t,)| t).ok_or(LedgerError::UserNotFound)
    }

    /// Create the user on first login, refresh name/pfp on later ones
    pub async fn upsert_farcaster_user(
        &self,
        fid: i64,
        name: &str,
        image: Option<&str>,
    ) -> Result<User, LedgerError> {
        let user: User = sqlx::query_as(
            r#"
            INSERT INTO users (fid, name, image)
            VALUES ($1, $2, $3)
            ON CONFLICT (fid) DO UPDATE
            SET name = $2,
                image = COALESCE($3, users.image),
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(fid)
        .bind(name)
        .bind(image)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_fid(&self, fid: i64) -> Result<Option<User>, LedgerError> {
        let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE fid = $1")
            .bind(fid)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Advisory read of the ticket counter (not a reservation)
    pub async fn ticket_balance(&self, user_id: Uuid) -> Result<i32, LedgerError> {
        let row: Option<(i32,)> = sqlx::query_as("SELECT free_spins FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|(t,)| t).ok_or(LedgerError::UserNotFound)
    }

    pub async fn spin_history(&self, user_id: Uuid, limit: i64) -> Result<Vec<Spin>, LedgerError> {
        let spins: Vec<Spin> = sqlx::query_as(
            r#"
            SELECT * FROM spins
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(spins)
    }

    pub async fn recent_wins(&self, limit: i64) -> Result<Vec<RecentWin>, LedgerError> {
        let wins: Vec<RecentWin> = sqlx::query_as(
            r#"
            SELECT s.id, s.payout, u.name AS user_name, s.created_at
            FROM spins s
            JOIN users u ON u.id = s.user_id
            WHERE s.result IN ('win', 'jackpot')
            ORDER BY s.created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(wins)
    }

    async fn find_spin_by_tx_hash(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        tx_hash: &str,
    ) -> Result<Option<Spin>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM spins WHERE tx_hash = $1")
            .bind(tx_hash)
            .fetch_optional(&mut **tx)
            .await
    }

    async fn balances_for(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: Uuid,
    ) -> Result<(i32, Decimal), sqlx::Error> {
        sqlx::query_as("SELECT free_spins, balance FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Rebuild a settlement from the recorded row. A result string the
    /// CHECK constraint should have rejected is surfaced as a decode
    /// failure, never silently coerced.
    fn replay(
        existing: Spin,
        (tickets, balance): (i32, Decimal),
    ) -> Result<Settlement, LedgerError> {
        let outcome: SpinResult = existing
            .result
            .parse()
            .map_err(|e: String| LedgerError::Database(sqlx::Error::Decode(e.into())))?;

        Ok(Settlement {
            spin_id: existing.id,
            outcome,
            payout: existing.payout,
            tickets,
            balance,
            already_settled: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn spin_row(result: &str) -> Spin {
        Spin {
            id: 7,
            user_id: Uuid::new_v4(),
            bet_amount: 1,
            multiplier: SpinResult::Win.multiplier(),
            result: result.to_string(),
            payout: Decimal::from(10),
            tx_hash: format!("0x{}", "ab".repeat(32)),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_replay_returns_recorded_result() {
        let settlement = Ledger::replay(spin_row("jackpot"), (3, Decimal::from(500))).unwrap();
        assert_eq!(settlement.spin_id, 7);
        assert_eq!(settlement.outcome, SpinResult::Jackpot);
        assert_eq!(settlement.payout, Decimal::from(10));
        assert_eq!(settlement.tickets, 3);
        assert_eq!(settlement.balance, Decimal::from(500));
        assert!(settlement.already_settled);
    }

    #[test]
    fn test_replay_rejects_corrupt_result() {
        let err = Ledger::replay(spin_row("draw"), (0, Decimal::ZERO)).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Database(sqlx::Error::Decode(_))
        ));
    }
}
