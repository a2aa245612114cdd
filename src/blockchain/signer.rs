//! Spin authorization signer
//!
//! Holds the backend's secret key and issues the ECDSA signature the
//! roulette contract checks before accepting a spin:
//!
//! ```solidity
//! bytes32 messageHash = keccak256(abi.encodePacked(
//!     msg.sender, currentNonce, spinFee, block.chainid, address(this)));
//! ```
//!
//! The signature uses EIP-191 personal-message semantics over the 32-byte
//! digest, so the contract recovers it with `toEthSignedMessageHash`.

use ethers::signers::{LocalWallet, Signer, WalletError};
use ethers::types::{Address, Signature, H256, U256};
use ethers::utils::keccak256;

#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    #[error("valid wallet address is required: {0}")]
    InvalidWallet(String),

    #[error("failed to sign spin authorization: {0}")]
    Wallet(#[from] WalletError),
}

/// Process-wide signer, constructed once at startup and injected into the
/// spin service. The key is never logged.
pub struct SpinSigner {
    wallet: LocalWallet,
}

impl SpinSigner {
    /// Missing or malformed keys surface here, at startup, so the spin
    /// feature can be disabled instead of failing per-request.
    pub fn new(private_key: &str) -> Result<Self, WalletError> {
        let wallet: LocalWallet = private_key.parse()?;
        Ok(Self { wallet })
    }

    /// Public address of the signing key (the contract's trusted signer)
    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    /// Packed keccak256 digest over (wallet, nonce, fee, chainId, contract),
    /// byte-compatible with the contract's abi.encodePacked layout:
    /// address(20) ++ uint256(32) ++ uint256(32) ++ uint256(32) ++ address(20).
    pub fn spin_message_hash(
        wallet: Address,
        nonce: U256,
        fee_wei: U256,
        chain_id: U256,
        contract: Address,
    ) -> H256 {
        let mut packed = Vec::with_capacity(136);
        packed.extend_from_slice(wallet.as_bytes());

        let mut word = [0u8; 32];
        nonce.to_big_endian(&mut word);
        packed.extend_from_slice(&word);
        fee_wei.to_big_endian(&mut word);
        packed.extend_from_slice(&word);
        chain_id.to_big_endian(&mut word);
        packed.extend_from_slice(&word);

        packed.extend_from_slice(contract.as_bytes());

        H256::from(keccak256(&packed))
    }

    /// Authorize one spin with the given parameters. The nonce is opaque
    /// passthrough; replay protection is the contract's nonce bookkeeping.
    pub async fn authorize(
        &self,
        wallet_address: &str,
        nonce: u64,
        fee_wei: U256,
        chain_id: u64,
        contract: Address,
    ) -> Result<Signature, SignerError> {
        let wallet: Address = wallet_address
            .parse()
            .map_err(|_| SignerError::InvalidWallet(wallet_address.to_string()))?;

        let digest = Self::spin_message_hash(
            wallet,
            U256::from(nonce),
            fee_wei,
            U256::from(chain_id),
            contract,
        );

        let signature = self.wallet.sign_message(digest.as_bytes()).await?;
        Ok(signature)
    }
}
