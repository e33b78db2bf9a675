//! Signing wallet - loading keys and signing EIP-712 digests

use alloy::primitives::{Address, B256};
use alloy::signers::SignerSync;
use alloy::signers::local::PrivateKeySigner;
use std::str::FromStr;
use tracing::{debug, info};

use crate::eip712::Eip712Message;
use crate::types::{Result, TradingError};

/// Holds the private key that authorizes orders
///
/// Signing is synchronous and never mutates the wallet, so one wallet can
/// be shared between threads.
#[derive(Clone)]
pub struct OrderWallet {
    signer: PrivateKeySigner,
    address: Address,
}

impl OrderWallet {
    /// Create a new wallet from a private key hex string
    pub fn from_private_key(private_key: &str) -> Result<Self> {
        let key = private_key.strip_prefix("0x").unwrap_or(private_key);

        let key_bytes = B256::from_str(key)
            .map_err(|e| TradingError::wallet(format!("Invalid private key format: {}", e)))?;

        let signer = PrivateKeySigner::from_bytes(&key_bytes)
            .map_err(|e| TradingError::wallet(format!("Failed to create signer: {}", e)))?;

        let address = signer.address();

        info!("Loaded signing wallet: {}", address);

        Ok(Self { signer, address })
    }

    /// Load wallet from environment variable ORDERBOOK_PRIVATE_KEY
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let private_key = std::env::var("ORDERBOOK_PRIVATE_KEY").map_err(|_| {
            TradingError::config("ORDERBOOK_PRIVATE_KEY environment variable not set")
        })?;

        Self::from_private_key(&private_key)
    }

    /// Generate a new random wallet
    pub fn generate() -> Self {
        let signer = PrivateKeySigner::random();
        let address = signer.address();

        info!("Generated new signing wallet: {}", address);

        Self { signer, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Get the wallet address as a checksummed string
    pub fn address_string(&self) -> String {
        self.address.to_checksum(None)
    }

    /// Sign a 32-byte digest, returning the 0x-prefixed 65-byte signature
    pub fn sign_hash(&self, hash: &B256) -> Result<String> {
        let signature = self
            .signer
            .sign_hash_sync(hash)
            .map_err(|e| TradingError::signing(format!("Failed to sign hash: {}", e)))?;

        Ok(format!("0x{}", hex::encode(signature.as_bytes())))
    }

    /// Sign the EIP-712 digest of `message`
    ///
    /// Deterministic: the same message always yields the same signature.
    pub fn sign_typed_data(&self, message: &Eip712Message) -> Result<String> {
        let signing_hash = message.signing_hash()?;
        debug!("EIP-712 signing hash: 0x{}", hex::encode(signing_hash));

        self.sign_hash(&signing_hash)
    }
}

impl std::fmt::Debug for OrderWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderWallet")
            .field("address", &self.address)
            .finish()
    }
}
