//  Copyright 2024. The Warden Project. See LICENSE for terms.

#[allow(dead_code)]
mod support;

use std::sync::Arc;

use primitive_types::U256;
use warden_core::collab::mock::{sample_params, MockChainQuery, MockWorldState};
use warden_core::collab::NullEventBus;
use warden_core::mempool::{MempoolConfig, MempoolEngine, MempoolError};
use warden_core::model::Address;

use support::{address_of, plain_recipient, signing_key, transfer, FixedClock};

fn engine(
    config: MempoolConfig,
    world: Arc<MockWorldState>,
    now_ms: u64,
) -> MempoolEngine<MockWorldState, MockChainQuery, NullEventBus> {
    let chain = Arc::new(MockChainQuery::default());
    let events = Arc::new(NullEventBus);
    MempoolEngine::with_clock(config, world, chain, events, Box::new(FixedClock::new(now_ms)))
}

fn fund(world: &MockWorldState, addr: Address) {
    world.set_balance(addr, Address::NATIVE_TOKEN, U256::from(1_000_000_000_000u64));
}

#[test]
fn admits_transfer_and_orders_executable_by_fee_per_byte() {
    let world = Arc::new(MockWorldState::new(sample_params()));
    let (alice, bob) = (signing_key(1), signing_key(2));
    let (alice_addr, bob_addr) = (address_of(&alice), address_of(&bob));
    fund(&world, alice_addr);
    fund(&world, bob_addr);

    let mempool = engine(MempoolConfig::default(), world, 1_000);

    // Same encoded shape per tx (no payload/message), so fee order and fee-per-byte order
    // coincide: insert out of order and expect descending-fee order back.
    mempool.add(transfer(&alice, 1, 10_000, 0, plain_recipient()), None).unwrap();
    mempool.add(transfer(&bob, 1, 1_000_000, 0, plain_recipient()), None).unwrap();
    mempool.add(transfer(&alice, 2, 100_000, 0, plain_recipient()), None).unwrap();

    let ordered: Vec<_> = mempool.get_executable_iterator().map(|e| e.tx().fee().0).collect();
    assert_eq!(ordered, vec![U256::from(1_000_000u64), U256::from(100_000u64), U256::from(10_000u64)]);
}

#[test]
fn out_of_order_nonce_is_held_future_until_the_gap_fills() {
    let world = Arc::new(MockWorldState::new(sample_params()));
    let alice = signing_key(1);
    let alice_addr = address_of(&alice);
    fund(&world, alice_addr);

    let mempool = engine(MempoolConfig::default(), world, 1_000);

    mempool.add(transfer(&alice, 2, 10_000, 0, plain_recipient()), None).unwrap();
    assert_eq!(mempool.get_executable_iterator().count(), 0, "nonce 2 cannot execute before nonce 1 is seen");
    assert_eq!(mempool.stats().tx_count, 1, "the future entry is still tracked in the pool");

    mempool.add(transfer(&alice, 1, 10_000, 0, plain_recipient()), None).unwrap();
    let nonces: Vec<_> = mempool.get_executable_iterator().map(|e| e.tx().nonce().unwrap()).collect();
    assert_eq!(nonces, vec![1, 2], "filling the gap promotes both nonces into the executable frontier");
}

#[test]
fn replace_by_fee_requires_at_least_a_110_percent_bump() {
    let world = Arc::new(MockWorldState::new(sample_params()));
    let alice = signing_key(1);
    let alice_addr = address_of(&alice);
    fund(&world, alice_addr);

    let mempool = engine(MempoolConfig::default(), world, 1_000);

    mempool.add(transfer(&alice, 1, 10_000, 0, plain_recipient()), None).unwrap();

    let insufficient_bump = transfer(&alice, 1, 10_999, 0, plain_recipient());
    match mempool.add(insufficient_bump, None) {
        Err(MempoolError::RejectedRbf) => {},
        other => panic!("expected RejectedRbf, got {other:?}"),
    }
    assert_eq!(mempool.stats().tx_count, 1, "the rejected replacement leaves the original entry untouched");

    let sufficient_bump = transfer(&alice, 1, 11_000, 0, plain_recipient());
    mempool.add(sufficient_bump, None).unwrap();
    assert_eq!(mempool.stats().tx_count, 1, "the accepted replacement still occupies a single nonce slot");
    let fee = mempool.get_executable_iterator().next().unwrap().tx().fee().0;
    assert_eq!(fee, U256::from(11_000u64));
}

#[test]
fn duplicate_hash_is_rejected() {
    let world = Arc::new(MockWorldState::new(sample_params()));
    let alice = signing_key(1);
    fund(&world, address_of(&alice));
    let mempool = engine(MempoolConfig::default(), world, 1_000);

    let tx = transfer(&alice, 1, 10_000, 0, plain_recipient());
    mempool.add(tx.clone(), None).unwrap();
    match mempool.add(tx, None) {
        Err(MempoolError::RejectedDuplicate) => {},
        other => panic!("expected RejectedDuplicate, got {other:?}"),
    }
}

#[test]
fn stale_nonce_is_rejected() {
    let world = Arc::new(MockWorldState::new(sample_params()));
    let alice = signing_key(1);
    let alice_addr = address_of(&alice);
    fund(&world, alice_addr);
    world.set_nonce(alice_addr, 5);
    let mempool = engine(MempoolConfig::default(), world, 1_000);

    match mempool.add(transfer(&alice, 5, 10_000, 0, plain_recipient()), None) {
        Err(MempoolError::Stale { chain_nonce: 5, tx_nonce: 5 }) => {},
        other => panic!("expected Stale, got {other:?}"),
    }
}

#[test]
fn nonce_gap_past_the_configured_limit_is_rejected() {
    let world = Arc::new(MockWorldState::new(sample_params()));
    let alice = signing_key(1);
    fund(&world, address_of(&alice));
    let config = MempoolConfig { max_nonce_gap: 4, ..MempoolConfig::default() };
    let mempool = engine(config, world, 1_000);

    match mempool.add(transfer(&alice, 6, 10_000, 0, plain_recipient()), None) {
        Err(MempoolError::RejectedNonceTooFarFuture { max_gap: 4, .. }) => {},
        other => panic!("expected RejectedNonceTooFarFuture, got {other:?}"),
    }
}

#[test]
fn fee_below_the_configured_minimum_is_rejected() {
    let world = Arc::new(MockWorldState::new(sample_params()));
    let alice = signing_key(1);
    fund(&world, address_of(&alice));
    let config = MempoolConfig { min_acceptable_fee_wei: warden_core::model::Wei::from_u64(50_000), ..MempoolConfig::default() };
    let mempool = engine(config, world, 1_000);

    match mempool.add(transfer(&alice, 1, 1_000, 0, plain_recipient()), None) {
        Err(MempoolError::Invalid { .. }) => {},
        other => panic!("expected Invalid (below network minimum), got {other:?}"),
    }
}

#[test]
fn mempool_full_evicts_the_globally_lowest_fee_entry() {
    let world = Arc::new(MockWorldState::new(sample_params()));
    let alice = signing_key(1);
    let bob = signing_key(2);
    fund(&world, address_of(&alice));
    fund(&world, address_of(&bob));
    let config = MempoolConfig { max_size: 2, ..MempoolConfig::default() };
    let mempool = engine(config, world, 1_000);

    mempool.add(transfer(&alice, 1, 10_000, 0, plain_recipient()), None).unwrap();
    mempool.add(transfer(&alice, 2, 100_000, 0, plain_recipient()), None).unwrap();
    assert_eq!(mempool.stats().tx_count, 2);

    // A third, higher-fee transaction evicts the lowest-fee entry rather than itself.
    mempool.add(transfer(&bob, 1, 1_000_000, 0, plain_recipient()), None).unwrap();
    assert_eq!(mempool.stats().tx_count, 2);
    let fees: Vec<_> = mempool.get_executable_iterator().map(|e| e.tx().fee().0).collect();
    assert_eq!(fees, vec![U256::from(1_000_000u64), U256::from(100_000u64)]);
}

#[test]
fn mempool_full_rejects_a_new_entry_that_is_itself_the_lowest_fee() {
    let world = Arc::new(MockWorldState::new(sample_params()));
    let alice = signing_key(1);
    let bob = signing_key(2);
    fund(&world, address_of(&alice));
    fund(&world, address_of(&bob));
    let config = MempoolConfig { max_size: 2, ..MempoolConfig::default() };
    let mempool = engine(config, world, 1_000);

    mempool.add(transfer(&alice, 1, 1_000_000, 0, plain_recipient()), None).unwrap();
    mempool.add(transfer(&alice, 2, 100_000, 0, plain_recipient()), None).unwrap();

    match mempool.add(transfer(&bob, 1, 10_000, 0, plain_recipient()), None) {
        Err(MempoolError::RejectedMempoolFull) => {},
        other => panic!("expected RejectedMempoolFull, got {other:?}"),
    }
    assert_eq!(mempool.stats().tx_count, 2, "the rejected low-fee entry must not linger in the pool");
}

#[test]
fn mined_transactions_are_removed_and_nonce_advances() {
    let world = Arc::new(MockWorldState::new(sample_params()));
    let alice = signing_key(1);
    let alice_addr = address_of(&alice);
    fund(&world, alice_addr);
    let mempool = engine(MempoolConfig::default(), world.clone(), 1_000);

    let tx1 = transfer(&alice, 1, 10_000, 0, plain_recipient());
    let tx2 = transfer(&alice, 2, 10_000, 0, plain_recipient());
    mempool.add(tx1.clone(), None).unwrap();
    mempool.add(tx2, None).unwrap();

    world.set_nonce(alice_addr, 1);
    mempool.process_new_block(&[tx1.hash()]);

    assert!(!mempool.contains(&tx1.hash()));
    let nonces: Vec<_> = mempool.get_executable_iterator().map(|e| e.tx().nonce().unwrap()).collect();
    assert_eq!(nonces, vec![2], "nonce 2 promotes to executable once the chain nonce catches up to it");
}

#[test]
fn reorg_re_admits_disconnected_transactions_with_their_original_first_seen_stamp() {
    let world = Arc::new(MockWorldState::new(sample_params()));
    let alice = signing_key(1);
    let alice_addr = address_of(&alice);
    fund(&world, alice_addr);
    let mempool = engine(MempoolConfig::default(), world.clone(), 50_000);

    // `add_back` is used after a reorg unwinds the block that contained `tx1`, so the chain
    // nonce has already been rolled back below it -- the world nonce stays at its default (0).
    let tx1 = transfer(&alice, 1, 10_000, 0, plain_recipient());
    mempool.add_back(vec![tx1.clone()], 12_345, 7);

    assert!(mempool.contains(&tx1.hash()));
    let entry = mempool.get_executable_iterator().find(|e| e.tx().hash() == tx1.hash());
    let entry = entry.expect("re-admitted transaction is executable");
    assert_eq!(entry.first_seen_time_ms(), 12_345);
    assert_eq!(entry.first_seen_height(), 7);
}

#[test]
fn pruning_evicts_only_entries_first_seen_before_the_cutoff() {
    let world = Arc::new(MockWorldState::new(sample_params()));
    let alice = signing_key(1);
    let bob = signing_key(2);
    fund(&world, address_of(&alice));
    fund(&world, address_of(&bob));
    let mempool = engine(MempoolConfig::default(), world, 10_000);

    mempool.add(transfer(&alice, 1, 10_000, 0, plain_recipient()), None).unwrap();

    // Every admission in this test stamps `firstSeenTime = 10_000` (the fixed clock never
    // advances); pruning below a cutoff of 5_000 must therefore evict nothing.
    mempool.prune(5_000);
    assert_eq!(mempool.stats().tx_count, 1, "nothing was seen before the cutoff yet");

    mempool.add(transfer(&bob, 1, 10_000, 0, plain_recipient()), None).unwrap();
    mempool.prune(10_001);
    assert_eq!(mempool.stats().tx_count, 0, "both entries were first seen before the new cutoff");
}

#[test]
fn removing_a_transaction_frees_its_nonce_slot() {
    let world = Arc::new(MockWorldState::new(sample_params()));
    let alice = signing_key(1);
    fund(&world, address_of(&alice));
    let mempool = engine(MempoolConfig::default(), world, 1_000);

    let tx = transfer(&alice, 1, 10_000, 0, plain_recipient());
    let hash = tx.hash();
    mempool.add(tx, None).unwrap();
    assert!(mempool.contains(&hash));

    mempool.remove_transaction(&hash).expect("entry was present");
    assert!(!mempool.contains(&hash));
    assert_eq!(mempool.stats().tx_count, 0);

    // The nonce slot is free again: the same nonce can be re-admitted.
    mempool.add(transfer(&alice, 1, 10_000, 0, plain_recipient()), None).unwrap();
    assert_eq!(mempool.stats().tx_count, 1);
}
