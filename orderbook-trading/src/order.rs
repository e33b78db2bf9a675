//! Order message construction and signing
//!
//! Turns a [`TradeIntent`] into a signed permit-witness message:
//!
//! 1. split the symbol into base and quote
//! 2. pick in/out tokens by side and resolve them in the registry
//! 3. check price precision
//! 4. convert amounts to base units
//! 5. draw a nonce and fix the deadline
//! 6. assemble the typed message and sign its EIP-712 digest
//!
//! Steps 1-3 fail before any key material is touched.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes, U256};
use chrono::{DateTime, Utc};
use orderbook_core::{
    OrderError, OrderResult, Side, Token, TokenLeg, TokenRegistry, TradeIntent, parse_symbol,
};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::config::{ClientConfig, DeploymentConfig};
use crate::eip712::{
    Eip712Message, OrderInfo, PartialInput, PartialOrder, PartialOutput, PermitWitnessTransfer,
    TokenPermissions,
};
use crate::types::{Result, SignedOrder, TradingError};
use crate::units::{check_decimal_places, quote_to_base_units, to_base_units};
use crate::wallet::OrderWallet;

// ============================================================================
// Token Resolution
// ============================================================================

/// The token given up (`in`) and the token received (`out`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTokenPair {
    pub in_token: Token,
    pub out_token: Token,
}

/// Resolve the in/out tokens for `symbol` traded on `side`
///
/// Selling `BASE-QUOTE` gives base and receives quote; buying is the reverse.
pub fn resolve_token_pair(
    registry: &TokenRegistry,
    symbol: &str,
    side: Side,
) -> OrderResult<ResolvedTokenPair> {
    let (base, quote) = parse_symbol(symbol)?;
    let (in_symbol, out_symbol) = match side {
        Side::Sell => (base, quote),
        Side::Buy => (quote, base),
    };

    let in_token = registry
        .get(&in_symbol)
        .copied()
        .ok_or_else(|| OrderError::invalid_token(&in_symbol, TokenLeg::In))?;
    let out_token = registry
        .get(&out_symbol)
        .copied()
        .ok_or_else(|| OrderError::invalid_token(&out_symbol, TokenLeg::Out))?;

    Ok(ResolvedTokenPair {
        in_token,
        out_token,
    })
}

// ============================================================================
// Amounts
// ============================================================================

/// Base units of the token given up: `size * price` when buying, `size` when selling
pub fn calculate_in_amount(
    size: Decimal,
    price: Decimal,
    side: Side,
    decimals: u8,
) -> OrderResult<U256> {
    match side {
        Side::Buy => quote_to_base_units(size, price, decimals),
        Side::Sell => to_base_units(size, decimals),
    }
}

/// Base units of the token received: `size * price` when selling, `size` when buying
pub fn calculate_out_amount(
    size: Decimal,
    price: Decimal,
    side: Side,
    decimals: u8,
) -> OrderResult<U256> {
    match side {
        Side::Sell => quote_to_base_units(size, price, decimals),
        Side::Buy => to_base_units(size, decimals),
    }
}

// ============================================================================
// Nonce and Deadline
// ============================================================================

/// Draw a random permit nonce
///
/// Uniqueness is best effort; the verifier rejects reused nonces.
pub fn generate_nonce() -> u32 {
    rand::random()
}

fn default_deadline(lifetime: chrono::Duration) -> OrderResult<DateTime<Utc>> {
    Utc::now().checked_add_signed(lifetime).ok_or_else(|| {
        OrderError::InvalidDeadline(format!("now + {} is out of range", lifetime))
    })
}

fn epoch_seconds(deadline: DateTime<Utc>) -> OrderResult<U256> {
    let secs = deadline.timestamp();
    u64::try_from(secs)
        .map(U256::from)
        .map_err(|_| OrderError::InvalidDeadline(format!("{} is before the unix epoch", deadline)))
}

// ============================================================================
// Order Signer
// ============================================================================

/// Builds and signs order messages for one wallet and deployment
#[derive(Debug, Clone)]
pub struct OrderSigner {
    wallet: OrderWallet,
    registry: Arc<TokenRegistry>,
    deployment: DeploymentConfig,
    nonce_generator: fn() -> u32,
}

impl OrderSigner {
    pub fn new(
        wallet: OrderWallet,
        registry: Arc<TokenRegistry>,
        deployment: DeploymentConfig,
    ) -> Self {
        Self {
            wallet,
            registry,
            deployment,
            nonce_generator: generate_nonce,
        }
    }

    /// Create a signer from the private key and deployment in `config`
    pub fn from_config(config: &ClientConfig, registry: Arc<TokenRegistry>) -> Result<Self> {
        let private_key = config
            .private_key
            .as_deref()
            .ok_or_else(|| TradingError::config("A private key is required for signing"))?;
        let wallet = OrderWallet::from_private_key(private_key)?;

        Ok(Self::new(wallet, registry, config.deployment.clone()))
    }

    /// Replace the nonce source
    pub fn with_nonce_generator(mut self, nonce_generator: fn() -> u32) -> Self {
        self.nonce_generator = nonce_generator;
        self
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    pub fn wallet(&self) -> &OrderWallet {
        &self.wallet
    }

    pub fn registry(&self) -> &TokenRegistry {
        &self.registry
    }

    pub fn deployment(&self) -> &DeploymentConfig {
        &self.deployment
    }

    /// Build the unsigned message for `intent`
    ///
    /// The deadline is `deadline` if given, else `intent.deadline`, else now
    /// plus the deployment's default lifetime.
    pub fn build_message(
        &self,
        intent: &TradeIntent,
        deadline: Option<DateTime<Utc>>,
    ) -> Result<Eip712Message> {
        let tokens = resolve_token_pair(&self.registry, &intent.symbol, intent.side)?;
        check_decimal_places(intent.price)?;

        let in_amount = calculate_in_amount(
            intent.size,
            intent.price,
            intent.side,
            tokens.in_token.decimals,
        )?;
        let out_amount = calculate_out_amount(
            intent.size,
            intent.price,
            intent.side,
            tokens.out_token.decimals,
        )?;

        let nonce = U256::from((self.nonce_generator)());
        let deadline = match deadline.or(intent.deadline) {
            Some(deadline) => deadline,
            None => default_deadline(self.deployment.default_deadline)?,
        };
        let deadline = epoch_seconds(deadline)?;

        debug!(
            symbol = %intent.symbol,
            side = %intent.side,
            %in_amount,
            %out_amount,
            %nonce,
            %deadline,
            "Building order message"
        );

        let swapper = self.wallet.address();
        let message = PermitWitnessTransfer {
            permitted: TokenPermissions {
                token: tokens.in_token.address,
                amount: in_amount,
            },
            spender: self.deployment.spender,
            nonce,
            deadline,
            witness: PartialOrder {
                info: OrderInfo {
                    reactor: self.deployment.reactor,
                    swapper,
                    nonce,
                    deadline,
                    additional_validation_contract: self
                        .deployment
                        .additional_validation_contract,
                    additional_validation_data: Bytes::new(),
                },
                exclusive_filler: self.deployment.exclusive_filler,
                exclusivity_override_bps: U256::ZERO,
                input: PartialInput {
                    token: tokens.in_token.address,
                    amount: in_amount,
                },
                outputs: vec![PartialOutput {
                    token: tokens.out_token.address,
                    amount: out_amount,
                    recipient: swapper,
                }],
            },
        };

        Ok(Eip712Message::new(&self.deployment, message))
    }

    /// Build the message for `intent` and sign it
    ///
    /// Returns the signature together with the message; submit both.
    pub fn prepare_and_sign_order(
        &self,
        intent: &TradeIntent,
        deadline: Option<DateTime<Utc>>,
    ) -> Result<SignedOrder> {
        let message = self.build_message(intent, deadline)?;
        let signature = self.wallet.sign_typed_data(&message)?;

        info!(
            client_order_id = %intent.client_order_id,
            symbol = %intent.symbol,
            side = %intent.side,
            nonce = %message.message.nonce,
            "Signed order"
        );

        Ok(SignedOrder { signature, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use rust_decimal_macros::dec;

    fn registry() -> TokenRegistry {
        TokenRegistry::from_tokens([
            (
                "MATIC",
                Token::new(address!("0x0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270"), 18),
            ),
            (
                "USDC",
                Token::new(address!("0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174"), 6),
            ),
        ])
    }

    fn signer() -> OrderSigner {
        let wallet = OrderWallet::from_private_key(
            "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
        )
        .unwrap();
        OrderSigner::new(wallet, Arc::new(registry()), DeploymentConfig::repermit())
    }

    #[test]
    fn test_calculate_out_amount() {
        let cases = [
            (dec!(40), dec!(0.87), Side::Sell, 34_800_000u128),
            (dec!(543), dec!(0.09), Side::Sell, 48_870_000),
            (dec!(40), dec!(0.87), Side::Buy, 40_000_000),
            (dec!(543), dec!(0.09), Side::Buy, 543_000_000),
            (dec!(50), dec!(0.86440911), Side::Sell, 43_220_455),
        ];
        for (size, price, side, expected) in cases {
            assert_eq!(
                calculate_out_amount(size, price, side, 6).unwrap(),
                U256::from(expected),
                "{} @ {} {}",
                size,
                price,
                side
            );
        }
    }

    #[test]
    fn test_calculate_in_amount() {
        let cases = [
            (dec!(40), dec!(0.87), Side::Buy, 34_800_000u128),
            (dec!(543), dec!(0.09), Side::Buy, 48_870_000),
            (dec!(40), dec!(0.87), Side::Sell, 40_000_000),
            (dec!(543), dec!(0.09), Side::Sell, 543_000_000),
        ];
        for (size, price, side, expected) in cases {
            assert_eq!(
                calculate_in_amount(size, price, side, 6).unwrap(),
                U256::from(expected),
                "{} @ {} {}",
                size,
                price,
                side
            );
        }
    }

    #[test]
    fn test_large_size_amounts() {
        let expected = U256::from(123_734_734_873_497_834_000_000u128);
        for side in [Side::Buy, Side::Sell] {
            assert_eq!(
                calculate_in_amount(dec!(123734734873497834), dec!(1), side, 6).unwrap(),
                expected
            );
            assert_eq!(
                calculate_out_amount(dec!(123734734873497834), dec!(1), side, 6).unwrap(),
                expected
            );
        }
    }

    #[test]
    fn test_in_and_out_amounts_are_complementary() {
        let (size, price) = (dec!(12.5), dec!(3.25));
        for side in [Side::Buy, Side::Sell] {
            assert_eq!(
                calculate_in_amount(size, price, side, 6).unwrap(),
                calculate_out_amount(size, price, side.opposite(), 6).unwrap()
            );
        }
    }

    #[test]
    fn test_resolve_token_pair_by_side() {
        let registry = registry();
        let matic = registry.resolve("MATIC").unwrap();
        let usdc = registry.resolve("USDC").unwrap();

        let sell = resolve_token_pair(&registry, "MATIC-USDC", Side::Sell).unwrap();
        assert_eq!((sell.in_token, sell.out_token), (matic, usdc));

        let buy = resolve_token_pair(&registry, "matic-usdc", Side::Buy).unwrap();
        assert_eq!((buy.in_token, buy.out_token), (usdc, matic));
    }

    #[test]
    fn test_resolve_token_pair_invalid_symbol() {
        let registry = registry();
        for side in [Side::Buy, Side::Sell] {
            for symbol in ["MATICUSDC", "MATIC-USDC-WETH"] {
                assert_eq!(
                    resolve_token_pair(&registry, symbol, side).unwrap_err(),
                    OrderError::InvalidSymbolFormat(symbol.to_string())
                );
            }
        }
    }

    #[test]
    fn test_resolve_token_pair_unknown_token() {
        let registry = registry();

        assert_eq!(
            resolve_token_pair(&registry, "DOGE-USDC", Side::Sell).unwrap_err(),
            OrderError::invalid_token("DOGE", TokenLeg::In)
        );
        assert_eq!(
            resolve_token_pair(&registry, "DOGE-USDC", Side::Buy).unwrap_err(),
            OrderError::invalid_token("DOGE", TokenLeg::Out)
        );
        assert_eq!(
            resolve_token_pair(&registry, "MATIC-SHIB", Side::Buy).unwrap_err(),
            OrderError::invalid_token("SHIB", TokenLeg::In)
        );
    }

    #[test]
    fn test_excess_price_precision_rejected() {
        let intent = TradeIntent::new("MATIC-USDC", Side::Sell, dec!(40), dec!(0.123456789), "id");
        let err = signer().prepare_and_sign_order(&intent, None).unwrap_err();

        assert!(matches!(
            err,
            TradingError::Order(OrderError::ExcessDecimalPlaces { .. })
        ));
    }

    #[test]
    fn test_default_deadline_uses_deployment() {
        let signer = signer();
        let intent = TradeIntent::new("MATIC-USDC", Side::Sell, dec!(40), dec!(0.865), "id");

        let before = Utc::now().timestamp() as u64;
        let message = signer.build_message(&intent, None).unwrap();
        let after = Utc::now().timestamp() as u64;

        let deadline: u64 = message.message.deadline.to::<u64>();
        let one_day = 24 * 60 * 60;
        assert!(deadline >= before + one_day && deadline <= after + one_day);
    }

    #[test]
    fn test_explicit_deadline_wins() {
        let signer = signer();
        let from_intent = DateTime::from_timestamp(1_800_000_000, 0).unwrap();
        let explicit = DateTime::from_timestamp(1_900_000_000, 0).unwrap();
        let intent = TradeIntent::new("MATIC-USDC", Side::Sell, dec!(40), dec!(0.865), "id")
            .with_deadline(from_intent);

        let message = signer.build_message(&intent, None).unwrap();
        assert_eq!(message.message.deadline, U256::from(1_800_000_000u64));

        let message = signer.build_message(&intent, Some(explicit)).unwrap();
        assert_eq!(message.message.deadline, U256::from(1_900_000_000u64));
        assert_eq!(message.message.witness.info.deadline, message.message.deadline);
    }

    #[test]
    fn test_pre_epoch_deadline_rejected() {
        let intent = TradeIntent::new("MATIC-USDC", Side::Sell, dec!(40), dec!(0.865), "id");
        let deadline = DateTime::from_timestamp(-1, 0).unwrap();

        assert!(matches!(
            signer().build_message(&intent, Some(deadline)),
            Err(TradingError::Order(OrderError::InvalidDeadline(_)))
        ));
    }

    #[test]
    fn test_overflowing_default_deadline_rejected() {
        let signer = OrderSigner::new(
            signer().wallet().clone(),
            Arc::new(registry()),
            DeploymentConfig::repermit().with_default_deadline(chrono::Duration::MAX),
        );
        let intent = TradeIntent::new("MATIC-USDC", Side::Sell, dec!(40), dec!(0.865), "id");

        assert!(matches!(
            signer.prepare_and_sign_order(&intent, None),
            Err(TradingError::Order(OrderError::InvalidDeadline(_)))
        ));
    }

    #[test]
    fn test_fixed_nonce_generator() {
        let signer = signer().with_nonce_generator(|| 42);
        let intent = TradeIntent::new("MATIC-USDC", Side::Buy, dec!(40), dec!(0.865), "id");

        let message = signer.build_message(&intent, None).unwrap();
        assert_eq!(message.message.nonce, U256::from(42u8));
        assert_eq!(message.message.witness.info.nonce, U256::from(42u8));
    }

    #[test]
    fn test_from_config_requires_private_key() {
        let config = ClientConfig::new("http://localhost", "key");
        assert!(matches!(
            OrderSigner::from_config(&config, Arc::new(registry())),
            Err(TradingError::Config(_))
        ));
    }
}
