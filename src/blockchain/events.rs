//! Spin event decoding
//!
//! Pure functions extracting the game result from a confirmed receipt.
//! The contract emits a single non-anonymous event:
//!
//! `event Spin(address indexed user, uint256 feePaid, uint256 rewardAmount, uint8 result)`
//!
//! Only the three non-indexed fields live in the log data; any change to
//! the contract's event layout requires a matching change here.

use ethers::abi::{self, ParamType};
use ethers::types::{Address, H256, U256};
use ethers::utils::keccak256;
use rust_decimal::Decimal;

use crate::blockchain::types::{DecodedSpin, SpinReceipt, SpinResult};

/// Reward amounts are emitted as 18-decimal fixed point
const REWARD_DECIMALS: u32 = 18;

/// Receipt decode failures. All terminal for the transaction in question:
/// re-reading the same receipt cannot change the result.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("transaction was not sent to the roulette contract (to: {actual:?}, expected: {expected:?})")]
    WrongContract {
        expected: Address,
        actual: Option<Address>,
    },

    #[error("no Spin event found in transaction logs")]
    EventNotFound,

    #[error("malformed Spin event data")]
    InvalidData,

    #[error("unknown result code: {0}")]
    UnknownResultCode(U256),

    #[error("reward amount too large to represent: {0}")]
    RewardOverflow(U256),
}

/// topic0 of the Spin event
pub fn spin_event_topic() -> H256 {
    H256::from(keccak256("Spin(address,uint256,uint256,uint8)".as_bytes()))
}

/// Decode the spin outcome from a confirmed receipt.
///
/// Verifies the destination contract first: a well-formed Spin event in a
/// transaction sent elsewhere must never be credited.
pub fn decode_spin_event(
    receipt: &SpinReceipt,
    expected_contract: Address,
) -> Result<DecodedSpin, DecodeError> {
    if receipt.to != Some(expected_contract) {
        return Err(DecodeError::WrongContract {
            expected: expected_contract,
            actual: receipt.to,
        });
    }

    let topic = spin_event_topic();
    let log = receipt
        .logs
        .iter()
        .find(|log| log.topics.first() == Some(&topic))
        .ok_or(DecodeError::EventNotFound)?;

    // Non-indexed fields: feePaid, rewardAmount, result
    let tokens = abi::decode(
        &[
            ParamType::Uint(256),
            ParamType::Uint(256),
            ParamType::Uint(8),
        ],
        &log.data,
    )
    .map_err(|_| DecodeError::InvalidData)?;

    let fee_paid = tokens[0].clone().into_uint().ok_or(DecodeError::InvalidData)?;
    let reward_amount = tokens[1].clone().into_uint().ok_or(DecodeError::InvalidData)?;
    let result_code = tokens[2].clone().into_uint().ok_or(DecodeError::InvalidData)?;

    let outcome = if result_code <= U256::from(u8::MAX) {
        SpinResult::from_code(result_code.as_u64() as u8)
    } else {
        None
    }
    .ok_or(DecodeError::UnknownResultCode(result_code))?;

    let payout = reward_to_decimal(reward_amount)?;

    Ok(DecodedSpin {
        outcome,
        payout,
        fee_paid,
    })
}

/// Convert an 18-decimal fixed-point reward to whole tokens
fn reward_to_decimal(amount: U256) -> Result<Decimal, DecodeError> {
    if amount > U256::from(i128::MAX as u128) {
        return Err(DecodeError::RewardOverflow(amount));
    }
    let raw = amount.as_u128() as i128;
    let value = Decimal::try_from_i128_with_scale(raw, REWARD_DECIMALS)
        .map_err(|_| DecodeError::RewardOverflow(amount))?;
    Ok(value.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::types::SpinLog;
    use ethers::abi::Token;
    use std::str::FromStr;

    fn contract() -> Address {
        "0x1111111111111111111111111111111111111111".parse().unwrap()
    }

    fn spin_log(fee: U256, reward: U256, code: u8) -> SpinLog {
        let data = abi::encode(&[
            Token::Uint(fee),
            Token::Uint(reward),
            Token::Uint(U256::from(code)),
        ]);
        SpinLog {
            address: contract(),
            topics: vec![
                spin_event_topic(),
                // indexed user address
                H256::from_low_u64_be(0xabcd),
            ],
            data,
        }
    }

    fn receipt_with(logs: Vec<SpinLog>, to: Option<Address>) -> SpinReceipt {
        SpinReceipt {
            tx_hash: H256::from_low_u64_be(1),
            success: true,
            to,
            block_number: Some(100),
            logs,
        }
    }

    #[test]
    fn test_decode_all_result_codes() {
        let fee = U256::from(1_000_000_000_000u64);
        let reward = U256::from_dec_str("10000000000000000000").unwrap(); // 10 tokens

        for (code, expected) in [
            (0u8, SpinResult::Loss),
            (1, SpinResult::Win),
            (2, SpinResult::Jackpot),
        ] {
            let receipt = receipt_with(vec![spin_log(fee, reward, code)], Some(contract()));
            let decoded = decode_spin_event(&receipt, contract()).unwrap();
            assert_eq!(decoded.outcome, expected);
            assert_eq!(decoded.payout, Decimal::from(10));
            assert_eq!(decoded.fee_paid, fee);
        }
    }

    #[test]
    fn test_fractional_payout_conversion() {
        // 2.5 tokens = 2.5e18 wei
        let reward = U256::from_dec_str("2500000000000000000").unwrap();
        let receipt = receipt_with(
            vec![spin_log(U256::zero(), reward, 1)],
            Some(contract()),
        );
        let decoded = decode_spin_event(&receipt, contract()).unwrap();
        assert_eq!(decoded.payout, Decimal::from_str("2.5").unwrap());
    }

    #[test]
    fn test_zero_reward() {
        let receipt = receipt_with(
            vec![spin_log(U256::zero(), U256::zero(), 0)],
            Some(contract()),
        );
        let decoded = decode_spin_event(&receipt, contract()).unwrap();
        assert_eq!(decoded.payout, Decimal::ZERO);
    }

    #[test]
    fn test_wrong_contract_rejected_despite_valid_event() {
        let other: Address = "0x2222222222222222222222222222222222222222".parse().unwrap();
        let receipt = receipt_with(
            vec![spin_log(U256::zero(), U256::from(1u64), 1)],
            Some(other),
        );
        let err = decode_spin_event(&receipt, contract()).unwrap_err();
        assert!(matches!(err, DecodeError::WrongContract { .. }));
    }

    #[test]
    fn test_missing_destination_rejected() {
        let receipt = receipt_with(vec![spin_log(U256::zero(), U256::zero(), 0)], None);
        let err = decode_spin_event(&receipt, contract()).unwrap_err();
        assert!(matches!(err, DecodeError::WrongContract { .. }));
    }

    #[test]
    fn test_event_not_found() {
        let mut log = spin_log(U256::zero(), U256::zero(), 0);
        log.topics[0] = H256::from(keccak256("Transfer(address,address,uint256)".as_bytes()));
        let receipt = receipt_with(vec![log], Some(contract()));
        let err = decode_spin_event(&receipt, contract()).unwrap_err();
        assert!(matches!(err, DecodeError::EventNotFound));
    }

    #[test]
    fn test_skips_unrelated_logs() {
        let mut unrelated = spin_log(U256::zero(), U256::zero(), 0);
        unrelated.topics[0] = H256::from_low_u64_be(7);
        let spin = spin_log(U256::zero(), U256::from(10u64).pow(U256::from(18u64)), 2);
        let receipt = receipt_with(vec![unrelated, spin], Some(contract()));
        let decoded = decode_spin_event(&receipt, contract()).unwrap();
        assert_eq!(decoded.outcome, SpinResult::Jackpot);
        assert_eq!(decoded.payout, Decimal::ONE);
    }

    #[test]
    fn test_unknown_result_code() {
        let receipt = receipt_with(
            vec![spin_log(U256::zero(), U256::zero(), 9)],
            Some(contract()),
        );
        let err = decode_spin_event(&receipt, contract()).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownResultCode(c) if c == U256::from(9u64)));
    }

    #[test]
    fn test_oversized_result_code_reported_verbatim() {
        // A code wider than u8 carries its actual value in the error
        let big = U256::from(0x1_0000u64);
        let data = abi::encode(&[
            Token::Uint(U256::zero()),
            Token::Uint(U256::zero()),
            Token::Uint(big),
        ]);
        let mut log = spin_log(U256::zero(), U256::zero(), 0);
        log.data = data;
        let receipt = receipt_with(vec![log], Some(contract()));
        let err = decode_spin_event(&receipt, contract()).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownResultCode(c) if c == big));
    }

    #[test]
    fn test_malformed_data() {
        let mut log = spin_log(U256::zero(), U256::zero(), 0);
        log.data.truncate(40);
        let receipt = receipt_with(vec![log], Some(contract()));
        let err = decode_spin_event(&receipt, contract()).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidData));
    }

    #[test]
    fn test_reward_overflow() {
        assert!(matches!(
            reward_to_decimal(U256::MAX),
            Err(DecodeError::RewardOverflow(_))
        ));
    }
}
