//! Chain integration for the roulette contract
//!
//! This module provides:
//! - The spin authorization signer (server-side key)
//! - A read-only RPC client for transaction receipts
//! - Pure decoding of the contract's Spin event

pub mod client;
pub mod events;
pub mod signer;
pub mod types;

pub use client::ChainClient;
pub use signer::{SignerError, SpinSigner};
pub use types::{DecodedSpin, SpinReceipt, SpinResult};
