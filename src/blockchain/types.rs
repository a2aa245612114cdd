//! Boundary types for the chain integration
//!
//! Raw provider responses are converted into these structs at the RPC
//! boundary so the rest of the code never branches on loosely-typed
//! receipt shapes.

use ethers::types::{Address, TransactionReceipt, H256, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Spin result decoded from the on-chain event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpinResult {
    Loss,
    Win,
    Jackpot,
}

impl SpinResult {
    /// Map the contract's result code (0=LOSE, 1=NORMAL_WIN, 2=JACKPOT)
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(SpinResult::Loss),
            1 => Some(SpinResult::Win),
            2 => Some(SpinResult::Jackpot),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpinResult::Loss => "loss",
            SpinResult::Win => "win",
            SpinResult::Jackpot => "jackpot",
        }
    }

    pub fn is_win(&self) -> bool {
        !matches!(self, SpinResult::Loss)
    }

    /// Multiplier recorded on the spin row for this result
    pub fn multiplier(&self) -> Decimal {
        match self {
            SpinResult::Loss => Decimal::ZERO,
            SpinResult::Win => Decimal::from(10),
            SpinResult::Jackpot => Decimal::from(50),
        }
    }
}

impl std::str::FromStr for SpinResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "loss" => Ok(SpinResult::Loss),
            "win" => Ok(SpinResult::Win),
            "jackpot" => Ok(SpinResult::Jackpot),
            other => Err(format!("unknown spin result: {}", other)),
        }
    }
}

impl std::fmt::Display for SpinResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single emitted log entry
#[derive(Debug, Clone)]
pub struct SpinLog {
    pub address: Address,
    pub topics: Vec<H256>,
    pub data: Vec<u8>,
}

/// Confirmation state of a spin transaction
#[derive(Debug, Clone)]
pub struct SpinReceipt {
    pub tx_hash: H256,
    /// status == 1
    pub success: bool,
    /// None for contract-creation transactions
    pub to: Option<Address>,
    pub block_number: Option<u64>,
    pub logs: Vec<SpinLog>,
}

impl From<TransactionReceipt> for SpinReceipt {
    fn from(receipt: TransactionReceipt) -> Self {
        Self {
            tx_hash: receipt.transaction_hash,
            success: receipt.status == Some(1.into()),
            to: receipt.to,
            block_number: receipt.block_number.map(|b| b.as_u64()),
            logs: receipt
                .logs
                .into_iter()
                .map(|log| SpinLog {
                    address: log.address,
                    topics: log.topics,
                    data: log.data.to_vec(),
                })
                .collect(),
        }
    }
}

/// Game outcome extracted from a confirmed receipt
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSpin {
    pub outcome: SpinResult,
    /// Reward in whole tokens (converted from the 18-decimal event field)
    pub payout: Decimal,
    pub fee_paid: U256,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_code_mapping() {
        assert_eq!(SpinResult::from_code(0), Some(SpinResult::Loss));
        assert_eq!(SpinResult::from_code(1), Some(SpinResult::Win));
        assert_eq!(SpinResult::from_code(2), Some(SpinResult::Jackpot));
        assert_eq!(SpinResult::from_code(3), None);
    }

    #[test]
    fn test_result_roundtrip() {
        for result in [SpinResult::Loss, SpinResult::Win, SpinResult::Jackpot] {
            assert_eq!(result.as_str().parse::<SpinResult>(), Ok(result));
        }
        assert!("draw".parse::<SpinResult>().is_err());
    }

    #[test]
    fn test_multipliers() {
        assert_eq!(SpinResult::Loss.multiplier(), Decimal::ZERO);
        assert_eq!(SpinResult::Win.multiplier(), Decimal::from(10));
        assert_eq!(SpinResult::Jackpot.multiplier(), Decimal::from(50));
        assert!(!SpinResult::Loss.is_win());
        assert!(SpinResult::Jackpot.is_win());
    }
}
