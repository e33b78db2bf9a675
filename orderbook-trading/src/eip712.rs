//! EIP-712 typed data for permit-witness orders
//!
//! An order is authorized by signing a `PermitWitnessTransferFrom` (Permit2) or
//! `RePermitWitnessTransferFrom` (RePermit) struct whose `witness` carries the
//! order terms. The message is built as typed Rust structs, serialized to the
//! JSON shape the API expects, and hashed through alloy's `sol!` definitions
//! of the same schema.

use std::borrow::Cow;
use std::collections::BTreeMap;

use alloy::primitives::{Address, B256, Bytes, Signature, U256};
use alloy::sol_types::{Eip712Domain, SolStruct};
use orderbook_core::serde_util;
use serde::{Deserialize, Serialize};

use crate::config::{DeploymentConfig, PermitScheme};
use crate::types::{Result, TradingError};

// ============================================================================
// EIP-712 Struct Definitions using sol! macro
// ============================================================================

mod abi {
    use alloy::sol;

    // Struct names are part of the type hash and must match the verifier's
    sol! {
        struct TokenPermissions {
            address token;
            uint256 amount;
        }

        struct OrderInfo {
            address reactor;
            address swapper;
            uint256 nonce;
            uint256 deadline;
            address additionalValidationContract;
            bytes additionalValidationData;
        }

        struct PartialInput {
            address token;
            uint256 amount;
        }

        struct PartialOutput {
            address token;
            uint256 amount;
            address recipient;
        }

        struct PartialOrder {
            OrderInfo info;
            address exclusiveFiller;
            uint256 exclusivityOverrideBps;
            PartialInput input;
            PartialOutput[] outputs;
        }

        struct PermitWitnessTransferFrom {
            TokenPermissions permitted;
            address spender;
            uint256 nonce;
            uint256 deadline;
            PartialOrder witness;
        }

        struct RePermitWitnessTransferFrom {
            TokenPermissions permitted;
            address spender;
            uint256 nonce;
            uint256 deadline;
            PartialOrder witness;
        }
    }
}

// ============================================================================
// Type Schema
// ============================================================================

/// Fields of the permit root struct; the root name depends on the scheme
const PERMIT_FIELDS: &[(&str, &str)] = &[
    ("permitted", "TokenPermissions"),
    ("spender", "address"),
    ("nonce", "uint256"),
    ("deadline", "uint256"),
    ("witness", "PartialOrder"),
];

const WITNESS_TYPES: &[(&str, &[(&str, &str)])] = &[
    ("TokenPermissions", &[("token", "address"), ("amount", "uint256")]),
    (
        "PartialOrder",
        &[
            ("info", "OrderInfo"),
            ("exclusiveFiller", "address"),
            ("exclusivityOverrideBps", "uint256"),
            ("input", "PartialInput"),
            ("outputs", "PartialOutput[]"),
        ],
    ),
    (
        "OrderInfo",
        &[
            ("reactor", "address"),
            ("swapper", "address"),
            ("nonce", "uint256"),
            ("deadline", "uint256"),
            ("additionalValidationContract", "address"),
            ("additionalValidationData", "bytes"),
        ],
    ),
    ("PartialInput", &[("token", "address"), ("amount", "uint256")]),
    (
        "PartialOutput",
        &[("token", "address"), ("amount", "uint256"), ("recipient", "address")],
    ),
];

/// One `{name, type}` member of a struct type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

/// Struct name → ordered members
pub type MessageTypes = BTreeMap<String, Vec<TypeField>>;

fn fields(members: &[(&str, &str)]) -> Vec<TypeField> {
    members
        .iter()
        .map(|(name, ty)| TypeField {
            name: name.to_string(),
            ty: ty.to_string(),
        })
        .collect()
}

/// The type table sent alongside a message for `scheme`
pub fn message_types(scheme: PermitScheme) -> MessageTypes {
    let mut types = MessageTypes::new();
    types.insert(scheme.primary_type().to_string(), fields(PERMIT_FIELDS));
    for (name, members) in WITNESS_TYPES {
        types.insert(name.to_string(), fields(members));
    }
    types
}

// ============================================================================
// Message Payload
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPermissions {
    #[serde(with = "serde_util::address")]
    pub token: Address,
    #[serde(with = "serde_util::u256_decimal")]
    pub amount: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInfo {
    #[serde(with = "serde_util::address")]
    pub reactor: Address,
    /// The order owner; always the signing address
    #[serde(with = "serde_util::address")]
    pub swapper: Address,
    #[serde(with = "serde_util::u256_decimal")]
    pub nonce: U256,
    #[serde(with = "serde_util::u256_decimal")]
    pub deadline: U256,
    #[serde(with = "serde_util::address")]
    pub additional_validation_contract: Address,
    #[serde(with = "serde_util::bytes_hex")]
    pub additional_validation_data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialInput {
    #[serde(with = "serde_util::address")]
    pub token: Address,
    #[serde(with = "serde_util::u256_decimal")]
    pub amount: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialOutput {
    #[serde(with = "serde_util::address")]
    pub token: Address,
    #[serde(with = "serde_util::u256_decimal")]
    pub amount: U256,
    #[serde(with = "serde_util::address")]
    pub recipient: Address,
}

/// Order terms carried as the permit witness
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialOrder {
    pub info: OrderInfo,
    #[serde(with = "serde_util::address")]
    pub exclusive_filler: Address,
    #[serde(with = "serde_util::u256_decimal")]
    pub exclusivity_override_bps: U256,
    pub input: PartialInput,
    pub outputs: Vec<PartialOutput>,
}

/// The signed permit: transfer `permitted` to `spender`, bound to `witness`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermitWitnessTransfer {
    pub permitted: TokenPermissions,
    #[serde(with = "serde_util::address")]
    pub spender: Address,
    #[serde(with = "serde_util::u256_decimal")]
    pub nonce: U256,
    #[serde(with = "serde_util::u256_decimal")]
    pub deadline: U256,
    pub witness: PartialOrder,
}

impl PermitWitnessTransfer {
    /// Nonce and deadline must be the same in the permit and the order info
    pub fn check_consistency(&self) -> Result<()> {
        if self.nonce != self.witness.info.nonce {
            return Err(TradingError::signing(format!(
                "permit nonce {} does not match order nonce {}",
                self.nonce, self.witness.info.nonce
            )));
        }
        if self.deadline != self.witness.info.deadline {
            return Err(TradingError::signing(format!(
                "permit deadline {} does not match order deadline {}",
                self.deadline, self.witness.info.deadline
            )));
        }
        Ok(())
    }
}

impl From<&TokenPermissions> for abi::TokenPermissions {
    fn from(value: &TokenPermissions) -> Self {
        abi::TokenPermissions {
            token: value.token,
            amount: value.amount,
        }
    }
}

impl From<&OrderInfo> for abi::OrderInfo {
    fn from(value: &OrderInfo) -> Self {
        abi::OrderInfo {
            reactor: value.reactor,
            swapper: value.swapper,
            nonce: value.nonce,
            deadline: value.deadline,
            additionalValidationContract: value.additional_validation_contract,
            additionalValidationData: value.additional_validation_data.clone(),
        }
    }
}

impl From<&PartialOrder> for abi::PartialOrder {
    fn from(value: &PartialOrder) -> Self {
        abi::PartialOrder {
            info: (&value.info).into(),
            exclusiveFiller: value.exclusive_filler,
            exclusivityOverrideBps: value.exclusivity_override_bps,
            input: abi::PartialInput {
                token: value.input.token,
                amount: value.input.amount,
            },
            outputs: value
                .outputs
                .iter()
                .map(|output| abi::PartialOutput {
                    token: output.token,
                    amount: output.amount,
                    recipient: output.recipient,
                })
                .collect(),
        }
    }
}

impl From<&PermitWitnessTransfer> for abi::PermitWitnessTransferFrom {
    fn from(value: &PermitWitnessTransfer) -> Self {
        abi::PermitWitnessTransferFrom {
            permitted: (&value.permitted).into(),
            spender: value.spender,
            nonce: value.nonce,
            deadline: value.deadline,
            witness: (&value.witness).into(),
        }
    }
}

impl From<&PermitWitnessTransfer> for abi::RePermitWitnessTransferFrom {
    fn from(value: &PermitWitnessTransfer) -> Self {
        abi::RePermitWitnessTransferFrom {
            permitted: (&value.permitted).into(),
            spender: value.spender,
            nonce: value.nonce,
            deadline: value.deadline,
            witness: (&value.witness).into(),
        }
    }
}

// ============================================================================
// EIP-712 Domain
// ============================================================================

/// Domain separator fields; this deployment uses no `version` or `salt`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainData {
    pub name: String,
    pub chain_id: u64,
    #[serde(with = "serde_util::address")]
    pub verifying_contract: Address,
}

impl DomainData {
    pub fn from_deployment(deployment: &DeploymentConfig) -> Self {
        Self {
            name: deployment.domain_name.clone(),
            chain_id: deployment.chain_id,
            verifying_contract: deployment.verifying_contract,
        }
    }

    pub fn to_eip712_domain(&self) -> Eip712Domain {
        Eip712Domain::new(
            Some(Cow::Owned(self.name.clone())),
            None,
            Some(U256::from(self.chain_id)),
            Some(self.verifying_contract),
            None,
        )
    }
}

// ============================================================================
// Full Message
// ============================================================================

/// Everything a verifier needs to rebuild the digest of a signed order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eip712Message {
    #[serde(rename = "domainSeparator")]
    pub domain: DomainData,
    #[serde(rename = "messageTypes")]
    pub types: MessageTypes,
    pub primary_type: String,
    #[serde(rename = "messageData")]
    pub message: PermitWitnessTransfer,
}

impl Eip712Message {
    pub fn new(deployment: &DeploymentConfig, message: PermitWitnessTransfer) -> Self {
        Self {
            domain: DomainData::from_deployment(deployment),
            types: message_types(deployment.scheme),
            primary_type: deployment.scheme.primary_type().to_string(),
            message,
        }
    }

    pub fn scheme(&self) -> Result<PermitScheme> {
        PermitScheme::from_primary_type(&self.primary_type).ok_or_else(|| {
            TradingError::signing(format!("Unsupported primary type: {}", self.primary_type))
        })
    }

    /// The EIP-712 digest: `keccak256(0x1901 || domainSeparator || hashStruct(message))`
    ///
    /// Fails if the embedded type table differs from the schema the digest is
    /// computed with, or if the permit and order info disagree on nonce or
    /// deadline.
    pub fn signing_hash(&self) -> Result<B256> {
        let scheme = self.scheme()?;
        if self.types != message_types(scheme) {
            return Err(TradingError::signing(
                "Message types do not match the permit witness schema",
            ));
        }
        self.message.check_consistency()?;

        let domain = self.domain.to_eip712_domain();
        let hash = match scheme {
            PermitScheme::Permit2 => abi::PermitWitnessTransferFrom::from(&self.message)
                .eip712_signing_hash(&domain),
            PermitScheme::RePermit => abi::RePermitWitnessTransferFrom::from(&self.message)
                .eip712_signing_hash(&domain),
        };
        Ok(hash)
    }
}

/// Recover the address that produced `signature` over `message`
pub fn recover_signer(message: &Eip712Message, signature: &str) -> Result<Address> {
    let bytes = hex::decode(signature.strip_prefix("0x").unwrap_or(signature))
        .map_err(|e| TradingError::signing(format!("Invalid signature hex: {}", e)))?;
    let signature = Signature::from_raw(&bytes)
        .map_err(|e| TradingError::signing(format!("Invalid signature: {}", e)))?;

    let hash = message.signing_hash()?;
    signature
        .recover_address_from_prehash(&hash)
        .map_err(|e| TradingError::signing(format!("Failed to recover signer: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use std::collections::BTreeSet;

    /// EIP-712 `encodeType` of `primary_type` as described by `types`
    ///
    /// The primary struct comes first, then every struct it references
    /// (transitively) in alphabetical order.
    fn encode_type(types: &MessageTypes, primary_type: &str) -> Option<String> {
        let mut deps = BTreeSet::new();
        collect_dependencies(types, primary_type, &mut deps);
        deps.remove(primary_type);

        let mut encoded = encode_struct(types, primary_type)?;
        for dep in deps {
            encoded.push_str(&encode_struct(types, &dep)?);
        }
        Some(encoded)
    }

    fn collect_dependencies(types: &MessageTypes, name: &str, deps: &mut BTreeSet<String>) {
        let Some(members) = types.get(name) else {
            return;
        };
        if !deps.insert(name.to_string()) {
            return;
        }
        for member in members {
            collect_dependencies(types, member.ty.trim_end_matches("[]"), deps);
        }
    }

    fn encode_struct(types: &MessageTypes, name: &str) -> Option<String> {
        let members = types.get(name)?;
        let members: Vec<String> = members
            .iter()
            .map(|m| format!("{} {}", m.ty, m.name))
            .collect();
        Some(format!("{}({})", name, members.join(",")))
    }

    fn sample_message(deployment: &DeploymentConfig) -> Eip712Message {
        let swapper = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        let matic = address!("0x0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270");
        let usdc = address!("0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174");
        let nonce = U256::from(3_141_592_653u64);
        let deadline = U256::from(1_735_689_600u64);
        let in_amount = U256::from(40u64) * U256::from(10u8).pow(U256::from(18u8));

        Eip712Message::new(
            deployment,
            PermitWitnessTransfer {
                permitted: TokenPermissions {
                    token: matic,
                    amount: in_amount,
                },
                spender: deployment.spender,
                nonce,
                deadline,
                witness: PartialOrder {
                    info: OrderInfo {
                        reactor: deployment.reactor,
                        swapper,
                        nonce,
                        deadline,
                        additional_validation_contract: deployment
                            .additional_validation_contract,
                        additional_validation_data: Bytes::new(),
                    },
                    exclusive_filler: deployment.exclusive_filler,
                    exclusivity_override_bps: U256::ZERO,
                    input: PartialInput {
                        token: matic,
                        amount: in_amount,
                    },
                    outputs: vec![PartialOutput {
                        token: usdc,
                        amount: U256::from(34_600_000u64),
                        recipient: swapper,
                    }],
                },
            },
        )
    }

    #[test]
    fn test_type_table_matches_sol_definitions() {
        let permit2 = message_types(PermitScheme::Permit2);
        assert_eq!(
            encode_type(&permit2, "PermitWitnessTransferFrom").unwrap(),
            abi::PermitWitnessTransferFrom::eip712_encode_type()
        );

        let repermit = message_types(PermitScheme::RePermit);
        assert_eq!(
            encode_type(&repermit, "RePermitWitnessTransferFrom").unwrap(),
            abi::RePermitWitnessTransferFrom::eip712_encode_type()
        );
    }

    #[test]
    fn test_encode_type_order() {
        let types = message_types(PermitScheme::Permit2);
        let encoded = encode_type(&types, "PermitWitnessTransferFrom").unwrap();

        assert!(encoded.starts_with(
            "PermitWitnessTransferFrom(TokenPermissions permitted,address spender,uint256 nonce,uint256 deadline,PartialOrder witness)OrderInfo("
        ));
        assert!(encoded.ends_with("TokenPermissions(address token,uint256 amount)"));
        assert!(encode_type(&types, "Missing").is_none());
    }

    #[test]
    fn test_signing_hash_depends_on_scheme() {
        let permit2 = sample_message(&DeploymentConfig::permit2());
        let mut renamed = permit2.clone();
        renamed.primary_type = PermitScheme::RePermit.primary_type().to_string();
        renamed.types = message_types(PermitScheme::RePermit);

        assert_ne!(permit2.signing_hash().unwrap(), renamed.signing_hash().unwrap());
    }

    #[test]
    fn test_signing_hash_is_deterministic() {
        let message = sample_message(&DeploymentConfig::repermit());
        assert_eq!(message.signing_hash().unwrap(), message.clone().signing_hash().unwrap());

        let mut changed = message.clone();
        changed.message.witness.outputs[0].amount += U256::from(1u8);
        assert_ne!(message.signing_hash().unwrap(), changed.signing_hash().unwrap());
    }

    #[test]
    fn test_signing_hash_rejects_tampered_types() {
        let mut message = sample_message(&DeploymentConfig::repermit());
        message
            .types
            .get_mut("PartialOutput")
            .unwrap()
            .retain(|f| f.name != "recipient");

        assert!(matches!(message.signing_hash(), Err(TradingError::Signing(_))));
    }

    #[test]
    fn test_signing_hash_rejects_mismatched_nonce() {
        let mut message = sample_message(&DeploymentConfig::repermit());
        message.message.witness.info.nonce = U256::from(7u8);

        assert!(matches!(message.signing_hash(), Err(TradingError::Signing(_))));
    }

    #[test]
    fn test_message_wire_format() {
        let message = sample_message(&DeploymentConfig::repermit());
        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(json["domainSeparator"]["name"], "RePermit");
        assert_eq!(json["domainSeparator"]["chainId"], 137);
        assert_eq!(json["primaryType"], "RePermitWitnessTransferFrom");
        assert_eq!(
            json["messageTypes"]["PartialOrder"][4],
            serde_json::json!({"name": "outputs", "type": "PartialOutput[]"})
        );

        let data = &json["messageData"];
        assert_eq!(data["nonce"], "3141592653");
        assert_eq!(data["witness"]["info"]["nonce"], data["nonce"]);
        assert_eq!(data["witness"]["info"]["additionalValidationData"], "0x");
        assert_eq!(data["witness"]["exclusivityOverrideBps"], "0");
        assert_eq!(data["witness"]["outputs"][0]["amount"], "34600000");

        let back: Eip712Message = serde_json::from_value(json).unwrap();
        assert_eq!(back, message);
    }
}
