//! Spin service types and error taxonomy

use ethers::providers::ProviderError;
use ethers::signers::WalletError;
use ethers::types::{Address, U256};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::blockchain::events::DecodeError;
use crate::blockchain::signer::SignerError;
use crate::blockchain::types::SpinResult;
use crate::services::ledger::LedgerError;

/// Spin pipeline failures.
///
/// Callers use `is_retryable` to distinguish "wait and try verify again"
/// from terminal rejections; everything from the chain reader, decoder
/// and ledger propagates unmodified in kind.
#[derive(Debug, thiserror::Error)]
pub enum SpinError {
    #[error("valid wallet address is required: {0}")]
    InvalidWallet(String),

    #[error("insufficient tickets, complete quests to earn more")]
    InsufficientTickets,

    #[error("user not found")]
    UserNotFound,

    /// Transaction unmined or unknown. Not a failure: the caller polls
    /// verify again after a delay, with no side effects in between.
    #[error("transaction not found or not confirmed yet")]
    PendingConfirmation,

    #[error("transaction reverted on-chain")]
    Reverted,

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("rpc error: {0}")]
    Rpc(#[from] ProviderError),

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("failed to sign spin authorization: {0}")]
    Signer(#[from] WalletError),
}

impl From<SignerError> for SpinError {
    fn from(err: SignerError) -> Self {
        match err {
            SignerError::InvalidWallet(addr) => SpinError::InvalidWallet(addr),
            SignerError::Wallet(e) => SpinError::Signer(e),
        }
    }
}

impl From<LedgerError> for SpinError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::UserNotFound => SpinError::UserNotFound,
            LedgerError::Database(e) => SpinError::Database(e),
        }
    }
}

impl SpinError {
    /// Whether the caller should retry the same call later instead of
    /// treating the spin as rejected
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SpinError::PendingConfirmation | SpinError::Rpc(_) | SpinError::Database(_)
        )
    }
}

/// Signed authorization returned by prepare; submitted by the client
/// directly to the contract, never persisted server-side.
#[derive(Debug, Clone, Serialize)]
pub struct SpinAuthorization {
    pub signature: String,
    pub nonce: u64,
    pub fee_wei: U256,
    pub contract_address: Address,
}

/// Outcome of a settled (or replayed) verify call
#[derive(Debug, Clone)]
pub struct SettledSpin {
    pub spin_id: i64,
    pub outcome: SpinResult,
    pub payout: Decimal,
    pub tickets: i32,
    pub balance: Decimal,
    pub already_settled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(SpinError::PendingConfirmation.is_retryable());
        assert!(SpinError::Rpc(ProviderError::CustomError("boom".into())).is_retryable());
        assert!(SpinError::Database(sqlx::Error::PoolTimedOut).is_retryable());
        // Storage anomalies from the settlement race re-read surface as
        // Database and stay retryable
        assert!(SpinError::Database(sqlx::Error::RowNotFound).is_retryable());

        assert!(!SpinError::InvalidWallet("x".into()).is_retryable());
        assert!(!SpinError::InsufficientTickets.is_retryable());
        assert!(!SpinError::UserNotFound.is_retryable());
        assert!(!SpinError::Reverted.is_retryable());
        assert!(!SpinError::Decode(DecodeError::EventNotFound).is_retryable());
        assert!(!SpinError::Decode(DecodeError::WrongContract {
            expected: Address::zero(),
            actual: None,
        })
        .is_retryable());
        assert!(!SpinError::Decode(DecodeError::UnknownResultCode(U256::from(7u64))).is_retryable());
        assert!(!SpinError::Decode(DecodeError::InvalidData).is_retryable());
        assert!(
            !SpinError::Decode(DecodeError::RewardOverflow(ethers::types::U256::MAX))
                .is_retryable()
        );
    }

    #[test]
    fn test_ledger_error_mapping() {
        assert!(matches!(
            SpinError::from(LedgerError::UserNotFound),
            SpinError::UserNotFound
        ));
        assert!(matches!(
            SpinError::from(LedgerError::Database(sqlx::Error::RowNotFound)),
            SpinError::Database(_)
        ));
    }
}
