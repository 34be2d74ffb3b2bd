//  Copyright 2024. The Warden Project. See LICENSE for terms.

use blake2::{Blake2s256, Digest};
use borsh::{BorshDeserialize, BorshSerialize};
use k256::ecdsa::{RecoveryId, Signature as K256Signature, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha3::Keccak256;

use super::primitives::{Address, Hash, Signature, Wei};

#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub enum TxVersion {
    V1,
}

/// The transaction kind. `Transfer`/`BipCreate`/`BipVote` are user-originated and always carry a
/// sender; the `System*` variants never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub enum TxType {
    Transfer,
    BipCreate,
    BipVote,
    SystemCoinbase,
    SystemRewardDistribution,
}

impl TxType {
    pub fn is_system(self) -> bool {
        matches!(self, TxType::SystemCoinbase | TxType::SystemRewardDistribution)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub enum VoteKind {
    Approve,
    Disapprove,
}

/// Tagged BIP-creation payload variants. Discriminant order below is the stable wire code table
/// from the data model (0..9) and MUST NOT be reordered across releases.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub enum TxPayload {
    /// code 0
    AddressAliasAdd { address: Address, alias: String },
    /// code 1
    AddressAliasRemove { alias: String },
    /// code 2
    AuthorityAdd { address: Address },
    /// code 3
    AuthorityRemove { address: Address },
    /// code 4
    NetworkParamsSet {
        block_reward: Option<Wei>,
        block_reward_pool_address: Option<Address>,
        target_mining_time_ms: Option<u64>,
        asert_half_life_blocks: Option<u64>,
        min_difficulty: Option<primitive_types::U256>,
        min_tx_base_fee: Option<Wei>,
        min_tx_byte_fee: Option<Wei>,
    },
    /// code 5
    TokenBurn { token_address: Address, sender: Address, amount: Wei },
    /// code 6
    TokenCreate {
        name: String,
        smallest_unit_name: String,
        decimals: u8,
        website_url: String,
        logo_url: String,
        max_supply: Option<Wei>,
        user_burnable: bool,
    },
    /// code 7
    TokenMint { token_address: Address, recipient: Address, amount: Wei },
    /// code 8
    TokenUpdate {
        token_address: Address,
        name: Option<String>,
        smallest_unit_name: Option<String>,
        website_url: Option<String>,
        logo_url: Option<String>,
    },
    /// code 9
    Vote { kind: VoteKind },
}

impl TxPayload {
    /// Stable integer discriminant, used as the governance-set/dedup key and kept independent of
    /// in-memory enum layout so it never implicitly changes if variants are reordered for
    /// readability.
    pub fn code(&self) -> u8 {
        match self {
            TxPayload::AddressAliasAdd { .. } => 0,
            TxPayload::AddressAliasRemove { .. } => 1,
            TxPayload::AuthorityAdd { .. } => 2,
            TxPayload::AuthorityRemove { .. } => 3,
            TxPayload::NetworkParamsSet { .. } => 4,
            TxPayload::TokenBurn { .. } => 5,
            TxPayload::TokenCreate { .. } => 6,
            TxPayload::TokenMint { .. } => 7,
            TxPayload::TokenUpdate { .. } => 8,
            TxPayload::Vote { .. } => 9,
        }
    }
}

/// The wire-encoded transaction body, i.e. every field that participates in the canonical
/// encoding. Field order here is the canonical pre-image order used for both the tx hash and the
/// signature pre-image (minus `signature` itself for the latter).
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct TxWire {
    pub version: TxVersion,
    pub timestamp: u64,
    pub tx_type: TxType,
    pub network: u8,
    pub nonce: Option<u64>,
    pub recipient: Option<Address>,
    pub token: Address,
    pub amount: Wei,
    pub fee: Wei,
    pub message: Option<Vec<u8>>,
    pub payload: Option<TxPayload>,
    pub reference_hash: Option<Hash>,
    pub signature: Signature,
}

/// An immutable, constructed transaction: the wire body plus its derived hash, encoded size, and
/// recovered sender (`None` for system transaction types).
#[derive(Debug, Clone)]
pub struct Tx {
    wire: TxWire,
    hash: Hash,
    size: usize,
    sender: Option<Address>,
}

#[derive(Debug, thiserror::Error)]
pub enum TxConstructError {
    #[error("failed to encode transaction: {0}")]
    Encode(String),
    #[error("signature does not recover to a valid public key: {0}")]
    BadSignature(String),
}

impl Tx {
    /// Constructs an immutable `Tx` from its wire body, computing the canonical hash, encoded
    /// size, and (for non-system types) the recovered sender. Structural invariants beyond
    /// "sender derivation succeeds" (e.g. `TRANSFER` requires a recipient) are the stateless
    /// validator's job, not the constructor's -- a transaction with a missing recipient is still
    /// a well-formed, hashable `Tx`, just one that will fail validation.
    pub fn from_wire(wire: TxWire) -> Result<Self, TxConstructError> {
        let encoded = borsh::to_vec(&wire).map_err(|e| TxConstructError::Encode(e.to_string()))?;
        let size = encoded.len();
        let hash = Hash(hash_bytes(&encoded));

        // A bad signature does not fail construction: it yields `sender = None`, which the
        // stateless validator then rejects via the "nonce present iff sender present" /
        // "non-system type requires a sender" invariants. This keeps "deserialize" and "validate"
        // separate concerns, matching the stateless validator's own checklist.
        let sender = if wire.tx_type.is_system() { None } else { recover_sender(&wire).ok() };

        Ok(Tx { wire, hash, size, sender })
    }

    pub fn wire(&self) -> &TxWire {
        &self.wire
    }

    pub fn hash(&self) -> Hash {
        self.hash
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn sender(&self) -> Option<Address> {
        self.sender
    }

    pub fn nonce(&self) -> Option<u64> {
        self.wire.nonce
    }

    pub fn fee(&self) -> Wei {
        self.wire.fee
    }

    pub fn amount(&self) -> Wei {
        self.wire.amount
    }

    pub fn token(&self) -> Address {
        self.wire.token
    }

    pub fn recipient(&self) -> Option<Address> {
        self.wire.recipient
    }

    pub fn tx_type(&self) -> TxType {
        self.wire.tx_type
    }

    pub fn payload(&self) -> Option<&TxPayload> {
        self.wire.payload.as_ref()
    }

    pub fn reference_hash(&self) -> Option<Hash> {
        self.wire.reference_hash
    }

    /// `feePerByte = fee / size`, the authoritative mempool sort key. Double precision is
    /// sufficient since it is used only for ordering, never for balance arithmetic.
    pub fn fee_per_byte(&self) -> f64 {
        self.wire.fee.as_f64() / self.size as f64
    }
}

pub(crate) fn hash_bytes(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2s256::new();
    hasher.update(bytes);
    let out = hasher.finalize();
    let mut buf = [0u8; 32];
    buf.copy_from_slice(&out);
    buf
}

/// The canonical signature pre-image: the wire encoding with `signature` zeroed out. Excluding
/// the signature field from its own pre-image (rather than truncating the encoded bytes) keeps
/// the pre-image stable regardless of where `signature` sits in field order.
fn signing_preimage(wire: &TxWire) -> Result<Vec<u8>, TxConstructError> {
    let mut unsigned = wire.clone();
    unsigned.signature = Signature { bytes: [0u8; 64], recovery_id: 0 };
    borsh::to_vec(&unsigned).map_err(|e| TxConstructError::Encode(e.to_string()))
}

fn recover_sender(wire: &TxWire) -> Result<Address, TxConstructError> {
    let preimage = signing_preimage(wire)?;
    let digest = hash_bytes(&preimage);

    let recovery_id = RecoveryId::from_byte(wire.signature.recovery_id)
        .ok_or_else(|| TxConstructError::BadSignature("invalid recovery id".to_string()))?;
    let sig = K256Signature::from_slice(&wire.signature.bytes)
        .map_err(|e| TxConstructError::BadSignature(e.to_string()))?;
    let verifying_key = VerifyingKey::recover_from_prehash(&digest, &sig, recovery_id)
        .map_err(|e| TxConstructError::BadSignature(e.to_string()))?;

    Ok(address_from_verifying_key(&verifying_key))
}

/// Returns `Ok(())` iff `signature` is a valid recoverable ECDSA signature over `wire`'s
/// pre-image AND it recovers to `expected`. Used by the stateless validator rather than the
/// constructor, so a signature mismatch surfaces as a validation error, not a panic/hard failure.
pub fn verify_signature_recovers_to(wire: &TxWire, expected: Address) -> bool {
    match recover_sender(wire) {
        Ok(addr) => addr == expected,
        Err(_) => false,
    }
}

fn address_from_verifying_key(key: &VerifyingKey) -> Address {
    let encoded = key.to_encoded_point(false);
    let mut hasher = Keccak256::new();
    hasher.update(&encoded.as_bytes()[1..]);
    let digest = hasher.finalize();
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&digest[12..]);
    Address(addr)
}
