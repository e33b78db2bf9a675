//! Deployment and client configuration
//!
//! A deployment pins everything the signed message embeds that is not
//! derived from the order itself: the EIP-712 domain, the permit scheme and
//! the reactor/spender contracts. Two presets ship with the crate.

use std::time::Duration;

use alloy::primitives::{Address, address};
use orderbook_core::serde_util;
use serde::{Deserialize, Serialize};

use crate::types::{Result, TradingError};

/// Polygon PoS chain id
pub const POLYGON_CHAIN_ID: u64 = 137;

const DEFAULT_BASE_URL: &str = "http://localhost";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Which permit contract the order authorizes a transfer through
///
/// The two share the same field layout and differ only in the primary type
/// name, which feeds into the type hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermitScheme {
    Permit2,
    RePermit,
}

impl PermitScheme {
    /// EIP-712 primary type name
    pub fn primary_type(&self) -> &'static str {
        match self {
            PermitScheme::Permit2 => "PermitWitnessTransferFrom",
            PermitScheme::RePermit => "RePermitWitnessTransferFrom",
        }
    }

    pub fn from_primary_type(name: &str) -> Option<Self> {
        match name {
            "PermitWitnessTransferFrom" => Some(PermitScheme::Permit2),
            "RePermitWitnessTransferFrom" => Some(PermitScheme::RePermit),
            _ => None,
        }
    }
}

/// Contracts and defaults for one order book deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    pub scheme: PermitScheme,
    /// EIP-712 domain `name`
    pub domain_name: String,
    pub chain_id: u64,
    /// EIP-712 domain `verifyingContract` (the permit contract)
    #[serde(with = "serde_util::address")]
    pub verifying_contract: Address,
    #[serde(with = "serde_util::address")]
    pub spender: Address,
    #[serde(with = "serde_util::address")]
    pub reactor: Address,
    #[serde(with = "serde_util::address")]
    pub exclusive_filler: Address,
    #[serde(with = "serde_util::address")]
    pub additional_validation_contract: Address,
    /// Signature lifetime used when the caller gives no deadline
    #[serde(with = "duration_secs")]
    pub default_deadline: chrono::Duration,
}

impl DeploymentConfig {
    /// RePermit deployment on Polygon
    pub fn repermit() -> Self {
        Self {
            scheme: PermitScheme::RePermit,
            domain_name: "RePermit".to_string(),
            chain_id: POLYGON_CHAIN_ID,
            verifying_contract: address!("0x4d415B58EA43988FfF7f50A3475718b0858fE0f1"),
            spender: address!("0x0B94c1A3E11F8aaA25D27cAf8DD05818e6f2Ad97"),
            reactor: address!("0x0B94c1A3E11F8aaA25D27cAf8DD05818e6f2Ad97"),
            exclusive_filler: address!("0x1a08D64Fb4a7D0b6DA5606A1e4619c147C3fB95e"),
            additional_validation_contract: Address::ZERO,
            default_deadline: chrono::Duration::days(1),
        }
    }

    /// Uniswap Permit2 deployment on Polygon
    pub fn permit2() -> Self {
        Self {
            scheme: PermitScheme::Permit2,
            domain_name: "Permit2".to_string(),
            chain_id: POLYGON_CHAIN_ID,
            verifying_contract: address!("0x000000000022d473030f116ddee9f6b43ac78ba3"),
            spender: address!("0x21Da9737764527e75C17F1AB26Cb668b66dEE0a0"),
            reactor: address!("0x21Da9737764527e75C17F1AB26Cb668b66dEE0a0"),
            exclusive_filler: address!("0x1a08D64Fb4a7D0b6DA5606A1e4619c147C3fB95e"),
            additional_validation_contract: address!(
                "0x1a08D64Fb4a7D0b6DA5606A1e4619c147C3fB95e"
            ),
            default_deadline: chrono::Duration::days(90),
        }
    }

    /// Look up a preset by name (`repermit` or `permit2`)
    pub fn preset(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "repermit" => Ok(Self::repermit()),
            "permit2" => Ok(Self::permit2()),
            other => Err(TradingError::config(format!(
                "Unknown deployment '{}', expected 'repermit' or 'permit2'",
                other
            ))),
        }
    }

    pub fn with_default_deadline(mut self, deadline: chrono::Duration) -> Self {
        self.default_deadline = deadline;
        self
    }
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self::repermit()
    }
}

/// Settings for talking to the order book API and signing orders
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    /// Hex private key; only needed for signing
    pub private_key: Option<String>,
    pub deployment: DeploymentConfig,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            private_key: None,
            deployment: DeploymentConfig::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Load configuration from the environment (and `.env` if present)
    ///
    /// - `ORDERBOOK_API_KEY` (required)
    /// - `ORDERBOOK_BASE_URL` (default `http://localhost`)
    /// - `ORDERBOOK_PRIVATE_KEY`
    /// - `ORDERBOOK_DEPLOYMENT`: `repermit` (default) or `permit2`
    /// - `ORDERBOOK_DEADLINE_SECS`: overrides the preset's default deadline
    /// - `ORDERBOOK_TIMEOUT_SECS` (default 10)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = std::env::var("ORDERBOOK_API_KEY").map_err(|_| {
            TradingError::config("ORDERBOOK_API_KEY environment variable not set")
        })?;
        let base_url =
            std::env::var("ORDERBOOK_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let mut deployment = match std::env::var("ORDERBOOK_DEPLOYMENT") {
            Ok(name) => DeploymentConfig::preset(&name)?,
            Err(_) => DeploymentConfig::default(),
        };
        if let Some(secs) = env_u64("ORDERBOOK_DEADLINE_SECS")? {
            deployment.default_deadline = deadline_from_secs(secs)?;
        }

        let timeout = env_u64("ORDERBOOK_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            base_url,
            api_key,
            private_key: std::env::var("ORDERBOOK_PRIVATE_KEY").ok(),
            deployment,
            timeout: Duration::from_secs(timeout),
        })
    }

    pub fn with_private_key(mut self, private_key: impl Into<String>) -> Self {
        self.private_key = Some(private_key.into());
        self
    }

    pub fn with_deployment(mut self, deployment: DeploymentConfig) -> Self {
        self.deployment = deployment;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("has_private_key", &self.private_key.is_some())
            .field("deployment", &self.deployment)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn deadline_from_secs(secs: u64) -> Result<chrono::Duration> {
    i64::try_from(secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .ok_or_else(|| {
            TradingError::config(format!("ORDERBOOK_DEADLINE_SECS is too large: {}", secs))
        })
}

fn env_u64(name: &str) -> Result<Option<u64>> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|e| TradingError::config(format!("Invalid {}: {}", name, e))),
        Err(_) => Ok(None),
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &chrono::Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(value.num_seconds())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<chrono::Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = i64::deserialize(deserializer)?;
        chrono::Duration::try_seconds(secs).ok_or_else(|| {
            serde::de::Error::custom(format!("deadline of {} seconds is out of range", secs))
        })
    }
}
