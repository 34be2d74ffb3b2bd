//  Copyright 2024. The Warden Project. See LICENSE for terms.

//! Shared scaffolding for the integration tests: a deterministic signing-key/address helper, a
//! transaction builder that performs the same recoverable-ECDSA signing `Tx::from_wire` expects,
//! and a fixed clock for deterministic pruning/first-seen-time assertions.

#![allow(dead_code)]

pub mod headers;

use std::sync::atomic::{AtomicU64, Ordering};

use blake2::{Blake2s256, Digest};
use k256::ecdsa::{RecoveryId, Signature as K256Signature, SigningKey, VerifyingKey};
use sha3::Keccak256;
use warden_core::mempool::Clock;
use warden_core::model::{Address, Hash, Signature, Tx, TxPayload, TxType, TxVersion, TxWire, Wei};

/// A deterministic, distinct secp256k1 key per `seed`. Hashing the seed rather than counting up
/// from `[0,0,...,1]` keeps every generated scalar well clear of the curve order without having
/// to check for it.
pub fn signing_key(seed: u64) -> SigningKey {
    let mut hasher = Blake2s256::new();
    hasher.update(b"warden-mempool-test-key");
    hasher.update(seed.to_le_bytes());
    let digest = hasher.finalize();
    SigningKey::from_slice(&digest).expect("hashed seed is a valid secp256k1 scalar")
}

pub fn address_of(key: &SigningKey) -> Address {
    address_from_verifying_key(key.verifying_key())
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

fn hash_bytes(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2s256::new();
    hasher.update(bytes);
    let out = hasher.finalize();
    let mut buf = [0u8; 32];
    buf.copy_from_slice(&out);
    buf
}

/// Builds, signs, and constructs a `Tx`, mirroring `Tx::from_wire`'s own preimage/signature
/// convention (wire encoding with `signature` zeroed, Blake2s-256'd, signed recoverably).
#[allow(clippy::too_many_arguments)]
pub fn build_tx(
    key: &SigningKey,
    tx_type: TxType,
    nonce: Option<u64>,
    recipient: Option<Address>,
    token: Address,
    amount: Wei,
    fee: Wei,
    payload: Option<TxPayload>,
    reference_hash: Option<Hash>,
) -> Tx {
    let mut wire = TxWire {
        version: TxVersion::V1,
        timestamp: 0,
        tx_type,
        network: 0,
        nonce,
        recipient,
        token,
        amount,
        fee,
        message: None,
        payload,
        reference_hash,
        signature: Signature { bytes: [0u8; 64], recovery_id: 0 },
    };

    let preimage = borsh::to_vec(&wire).expect("unsigned wire encodes");
    let digest = hash_bytes(&preimage);
    let (sig, recid): (K256Signature, RecoveryId) =
        key.sign_prehash_recoverable(&digest).expect("prehash signing succeeds");

    let mut sig_bytes = [0u8; 64];
    sig_bytes.copy_from_slice(sig.to_bytes().as_slice());
    wire.signature = Signature { bytes: sig_bytes, recovery_id: recid.to_byte() };

    Tx::from_wire(wire).expect("well-formed signed wire constructs")
}

/// A recipient distinct from `Address::ZERO` (the burn sentinel, which triggers the
/// user-burnable-token check) and `Address::NATIVE_TOKEN`.
pub fn plain_recipient() -> Address {
    Address([0xAB; 20])
}

pub fn transfer(key: &SigningKey, nonce: u64, fee: u64, amount: u64, recipient: Address) -> Tx {
    build_tx(
        key,
        TxType::Transfer,
        Some(nonce),
        Some(recipient),
        Address::NATIVE_TOKEN,
        Wei::from_u64(amount),
        Wei::from_u64(fee),
        None,
        None,
    )
}

/// A `Clock` whose reading is set explicitly by the test, so `firstSeenTime`/pruning-cutoff
/// assertions don't depend on wall-clock timing.
pub struct FixedClock {
    now_ms: AtomicU64,
}

impl FixedClock {
    pub fn new(now_ms: u64) -> Self {
        Self { now_ms: AtomicU64::new(now_ms) }
    }

    pub fn set(&self, now_ms: u64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}
