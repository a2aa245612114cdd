//! Spin Settlement Service
//!
//! Two-phase prepare/verify protocol for on-chain spins:
//! 1. Backend signs an authorization binding (wallet, nonce, fee,
//!    chainId, contract)
//! 2. Client submits the transaction to the roulette contract
//! 3. Backend verifies the receipt, decodes the Spin event and settles
//!    the result exactly once

mod service;
mod types;

pub use service::SpinService;
pub use types::{SettledSpin, SpinAuthorization, SpinError};
