//! Spin settlement service
//!
//! Orchestrates the two-phase protocol:
//! 1. `prepare` — check tickets (advisory), sign the authorization the
//!    client submits on-chain.
//! 2. `verify` — read the receipt, decode the Spin event, settle the
//!    result exactly once through the ledger.
//!
//! No spin state lives in this process between the two phases; the
//! submitted transaction is external and unobservable until the client
//! reports its hash.

use std::sync::Arc;

use ethers::types::{Address, H256, U256};
use tracing::{info, warn};
use uuid::Uuid;

use crate::blockchain::events::decode_spin_event;
use crate::blockchain::types::{DecodedSpin, SpinReceipt};
use crate::blockchain::{ChainClient, SpinSigner};
use crate::config::AppConfig;
use crate::services::ledger::Ledger;

use super::types::{SettledSpin, SpinAuthorization, SpinError};

pub struct SpinService {
    signer: Arc<SpinSigner>,
    chain: Arc<ChainClient>,
    ledger: Ledger,
    contract_address: Address,
    chain_id: u64,
    spin_fee_wei: U256,
}

impl SpinService {
    pub fn new(
        signer: Arc<SpinSigner>,
        chain: Arc<ChainClient>,
        ledger: Ledger,
        contract_address: Address,
        chain_id: u64,
        spin_fee_wei: U256,
    ) -> Self {
        Self {
            signer,
            chain,
            ledger,
            contract_address,
            chain_id,
            spin_fee_wei,
        }
    }

    /// Build the full spin stack from configuration. Errors here mean the
    /// feature is misconfigured; the caller disables the spin endpoints.
    pub fn from_config(
        config: &AppConfig,
        ledger: Ledger,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let signer = SpinSigner::new(&config.signer_private_key)?;
        let chain = ChainClient::new(&config.rpc_url)?;
        let contract_address: Address = config.roulette_contract_address.parse()?;

        Ok(Self::new(
            Arc::new(signer),
            Arc::new(chain),
            ledger,
            contract_address,
            config.chain_id,
            config.spin_fee_wei(),
        ))
    }

    /// Address the contract must hold as its trusted signer
    pub fn signer_address(&self) -> Address {
        self.signer.address()
    }

    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    /// Authorize one spin for the user's wallet.
    ///
    /// The ticket check is advisory only, not a reservation: two
    /// concurrent prepares with one ticket both succeed, and the
    /// contract's own nonce/fee accounting decides which transaction
    /// lands. The counter is reconciled at settlement.
    pub async fn prepare(
        &self,
        user_id: Uuid,
        wallet_address: &str,
        nonce: u64,
    ) -> Result<SpinAuthorization, SpinError> {
        let tickets = self.ledger.ticket_balance(user_id).await?;
        if tickets <= 0 {
            return Err(SpinError::InsufficientTickets);
        }

        let signature = self
            .signer
            .authorize(
                wallet_address,
                nonce,
                self.spin_fee_wei,
                self.chain_id,
                self.contract_address,
            )
            .await?;

        info!(
            "Prepared spin authorization for user {} (nonce: {})",
            user_id, nonce
        );

        Ok(SpinAuthorization {
            signature: format!("0x{}", signature),
            nonce,
            fee_wei: self.spin_fee_wei,
            contract_address: self.contract_address,
        })
    }

    /// Verify a submitted spin transaction and settle its result.
    ///
    /// Safe to call repeatedly with the same hash: before confirmation it
    /// consistently returns PendingConfirmation with no side effects;
    /// after settlement it replays the recorded result.
    pub async fn verify(&self, user_id: Uuid, tx_hash: H256) -> Result<SettledSpin, SpinError> {
        let receipt = self
            .chain
            .spin_receipt(tx_hash)
            .await?
            .ok_or(SpinError::PendingConfirmation)?;

        let decoded = review_receipt(&receipt, self.contract_address).inspect_err(|err| {
            warn!("Spin verification rejected for tx {:?}: {}", tx_hash, err);
        })?;

        // The DB key is the normalized 0x-prefixed lowercase hash
        let tx_hash_key = format!("{:?}", tx_hash);
        let settlement = self
            .ledger
            .settle_spin(user_id, &tx_hash_key, decoded.outcome, decoded.payout)
            .await?;

        if settlement.already_settled {
            info!("Spin {} already settled, replaying result", tx_hash_key);
        } else {
            info!(
                "Spin settled: user={}, result={}, payout={}, tx={}",
                user_id, settlement.outcome, settlement.payout, tx_hash_key
            );
            metrics::counter!("spins_settled_total", "outcome" => settlement.outcome.as_str())
                .increment(1);
        }

        Ok(SettledSpin {
            spin_id: settlement.spin_id,
            outcome: settlement.outcome,
            payout: settlement.payout,
            tickets: settlement.tickets,
            balance: settlement.balance,
            already_settled: settlement.already_settled,
        })
    }
}

/// Pure receipt review: revert gate plus event decode. Split out from
/// `verify` so the rejection logic is testable without an RPC endpoint.
fn review_receipt(
    receipt: &SpinReceipt,
    contract_address: Address,
) -> Result<DecodedSpin, SpinError> {
    if !receipt.success {
        return Err(SpinError::Reverted);
    }
    Ok(decode_spin_event(receipt, contract_address)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::events::spin_event_topic;
    use crate::blockchain::types::{SpinLog, SpinResult};
    use ethers::abi::{self, Token};
    use rust_decimal::Decimal;

    fn contract() -> Address {
        "0x1111111111111111111111111111111111111111".parse().unwrap()
    }

    fn win_receipt(success: bool, to: Option<Address>) -> SpinReceipt {
        // fee = 1000 gwei, reward = 10 tokens, result = NORMAL_WIN
        let data = abi::encode(&[
            Token::Uint(U256::from(1_000_000_000_000u64)),
            Token::Uint(U256::from_dec_str("10000000000000000000").unwrap()),
            Token::Uint(U256::from(1u8)),
        ]);
        SpinReceipt {
            tx_hash: H256::from_low_u64_be(42),
            success,
            to,
            block_number: Some(1),
            logs: vec![SpinLog {
                address: contract(),
                topics: vec![spin_event_topic(), H256::from_low_u64_be(0xabcd)],
                data,
            }],
        }
    }

    #[test]
    fn test_review_confirmed_win() {
        let decoded = review_receipt(&win_receipt(true, Some(contract())), contract()).unwrap();
        assert_eq!(decoded.outcome, SpinResult::Win);
        assert_eq!(decoded.payout, Decimal::from(10));
        assert_eq!(decoded.fee_paid, U256::from(1_000_000_000_000u64));
    }

    #[test]
    fn test_review_reverted_is_terminal() {
        let err = review_receipt(&win_receipt(false, Some(contract())), contract()).unwrap_err();
        assert!(matches!(err, SpinError::Reverted));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_review_wrong_contract() {
        let other: Address = "0x2222222222222222222222222222222222222222".parse().unwrap();
        let err = review_receipt(&win_receipt(true, Some(other)), contract()).unwrap_err();
        assert!(matches!(
            err,
            SpinError::Decode(crate::blockchain::events::DecodeError::WrongContract { .. })
        ));
    }

    #[test]
    fn test_review_no_spin_event() {
        let mut receipt = win_receipt(true, Some(contract()));
        receipt.logs.clear();
        let err = review_receipt(&receipt, contract()).unwrap_err();
        assert!(matches!(
            err,
            SpinError::Decode(crate::blockchain::events::DecodeError::EventNotFound)
        ));
    }

    #[test]
    fn test_revert_checked_before_destination() {
        // A reverted transaction is reported as Reverted even when it was
        // also sent to the wrong address
        let other: Address = "0x2222222222222222222222222222222222222222".parse().unwrap();
        let err = review_receipt(&win_receipt(false, Some(other)), contract()).unwrap_err();
        assert!(matches!(err, SpinError::Reverted));
    }
}
