//! On-chain token metadata

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::serde_util;

/// A supported token: where it lives and how many decimals its base unit has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    /// ERC-20 contract address
    #[serde(with = "serde_util::address")]
    pub address: Address,
    /// Decimal places between the display amount and the base unit
    pub decimals: u8,
}

impl Token {
    pub fn new(address: Address, decimals: u8) -> Self {
        Self { address, decimals }
    }
}
