//  Copyright 2024. The Warden Project. See LICENSE for terms.

#[cfg(not(all(feature = "benches", feature = "test-support")))]
mod benches {
    pub fn main() {
        println!("Enable the `benches` and `test-support` features to run benches");
    }
}

#[cfg(all(feature = "benches", feature = "test-support"))]
mod benches {
    use std::sync::Arc;

    use blake2::{Blake2s256, Digest};
    use criterion::{criterion_group, BatchSize, Criterion};
    use k256::ecdsa::{RecoveryId, Signature as K256Signature, SigningKey, VerifyingKey};
    use primitive_types::U256;
    use sha3::Keccak256;
    use warden_core::collab::mock::{sample_params, MockChainQuery, MockWorldState};
    use warden_core::collab::NullEventBus;
    use warden_core::mempool::{MempoolConfig, MempoolEngine};
    use warden_core::model::{Address, Signature, Tx, TxType, TxVersion, TxWire, Wei};

    fn signing_key(seed: u64) -> SigningKey {
        let mut hasher = Blake2s256::new();
        hasher.update(b"warden-mempool-bench-key");
        hasher.update(seed.to_le_bytes());
        let digest = hasher.finalize();
        SigningKey::from_slice(&digest).expect("hashed seed is a valid secp256k1 scalar")
    }

    fn address_of(key: &SigningKey) -> Address {
        let encoded = key.verifying_key().to_encoded_point(false);
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

    fn transfer(key: &SigningKey, nonce: u64, fee: u64) -> Tx {
        let mut wire = TxWire {
            version: TxVersion::V1,
            timestamp: 0,
            tx_type: TxType::Transfer,
            network: 0,
            nonce: Some(nonce),
            recipient: Some(Address([0xABu8; 20])),
            token: Address::NATIVE_TOKEN,
            amount: Wei::from_u64(0),
            fee: Wei::from_u64(fee),
            message: None,
            payload: None,
            reference_hash: None,
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

    type Engine = MempoolEngine<MockWorldState, MockChainQuery, NullEventBus>;

    fn new_engine(max_size: usize, senders: &[SigningKey]) -> Engine {
        let world = Arc::new(MockWorldState::new(sample_params()));
        for key in senders {
            world.set_balance(address_of(key), Address::NATIVE_TOKEN, U256::from(1_000_000_000_000u64));
        }
        let chain = Arc::new(MockChainQuery::default());
        let events = Arc::new(NullEventBus);
        MempoolEngine::new(MempoolConfig { max_size, ..MempoolConfig::default() }, world, chain, events)
    }

    /// Admission throughput across many distinct senders, each contributing an ever-advancing
    /// nonce -- the steady-state shape of real traffic, as opposed to one sender's nonce chain.
    pub fn mempool_admission(c: &mut Criterion) {
        const NUM_SENDERS: usize = 50;
        let senders: Vec<SigningKey> = (0..NUM_SENDERS as u64).map(signing_key).collect();

        c.bench_function("mempool admit (50 senders, round robin)", move |b| {
            let mut nonce = 1u64;
            b.iter_batched(
                || {
                    let mempool = new_engine(100_000, &senders);
                    let batch: Vec<Tx> = senders.iter().map(|k| transfer(k, nonce, 10_000)).collect();
                    nonce += 1;
                    (mempool, batch)
                },
                |(mempool, batch)| {
                    for tx in batch {
                        mempool.add(tx, None).unwrap();
                    }
                },
                BatchSize::SmallInput,
            );
        });
    }

    /// Eviction throughput once the pool is saturated: every admission after this point forces a
    /// fee-index scan for the global minimum.
    pub fn mempool_eviction_under_pressure(c: &mut Criterion) {
        let sender = signing_key(0);
        let world = Arc::new(MockWorldState::new(sample_params()));
        world.set_balance(address_of(&sender), Address::NATIVE_TOKEN, U256::from(1_000_000_000_000u64));
        let chain = Arc::new(MockChainQuery::default());
        let events = Arc::new(NullEventBus);
        let mempool = MempoolEngine::new(
            MempoolConfig { max_size: 1_000, ..MempoolConfig::default() },
            world,
            chain,
            events,
        );
        for nonce in 1..=1_000 {
            mempool.add(transfer(&sender, nonce, 10_000 + nonce), None).unwrap();
        }

        c.bench_function("mempool admit at capacity (forced eviction)", move |b| {
            let mut nonce = 1_001u64;
            b.iter(|| {
                // a strictly higher fee than everything resident guarantees this entry survives
                // and some other entry is evicted, exercising the fee-index scan every iteration.
                let tx = transfer(&sender, nonce, 1_000_000 + nonce);
                let _ = mempool.add(tx, None);
                nonce += 1;
            });
        });
    }

    criterion_group!(
        name = mempool_perf;
        config = Criterion::default().sample_size(10);
        targets = mempool_admission, mempool_eviction_under_pressure
    );

    pub fn main() {
        mempool_perf();
        criterion::Criterion::default().configure_from_args().final_summary();
    }
}

fn main() {
    benches::main();
}
