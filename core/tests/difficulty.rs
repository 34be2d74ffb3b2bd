//  Copyright 2024. The Warden Project. See LICENSE for terms.

mod support;

use primitive_types::U256;
use warden_core::collab::mock::{sample_params, MockChainQuery};
use warden_core::difficulty::DifficultyEngine;
use warden_core::model::Hash;

use support::headers::header;

#[test]
fn genesis_block_uses_the_configured_minimum_difficulty() {
    let chain = MockChainQuery::default();
    let params = sample_params();
    let engine = DifficultyEngine::new(&chain);

    // `parent` is the genesis header itself: the new block at height 1 always starts at the
    // network floor, with no anchor lookup involved.
    let genesis = header(0, 0, Hash::ZERO, Hash::ZERO, U256::from(999_999u64));
    assert_eq!(engine.next_difficulty(&genesis, &params), params.min_difficulty);
}

#[test]
fn on_pace_block_arrival_holds_difficulty_steady() {
    let chain = MockChainQuery::default();
    let mut params = sample_params();
    params.min_difficulty = U256::from(1000u64);

    let anchor = header(0, 2_000_000, Hash::ZERO, Hash::ZERO, U256::from(50_000u64));
    chain.insert(anchor.clone());

    // ten blocks after the anchor, arriving exactly on the target pace.
    let parent = header(10, 2_000_000 + 15_000 * 11, Hash::ZERO, Hash::ZERO, U256::from(50_000u64));

    let engine = DifficultyEngine::new(&chain);
    assert_eq!(engine.next_difficulty(&parent, &params), U256::from(50_000u64));
}

#[test]
fn one_half_life_of_extra_elapsed_time_doubles_difficulty() {
    let chain = MockChainQuery::default();
    let params = sample_params();

    let anchor = header(0, 2_000_000, Hash::ZERO, Hash::ZERO, U256::from(50_000u64));
    chain.insert(anchor.clone());

    // on-pace timestamp plus one full half-life (120 blocks * 15s) of extra elapsed time.
    let on_pace_ts = 2_000_000 + 15_000 * 11;
    let parent = header(10, on_pace_ts + 120 * 15_000, Hash::ZERO, Hash::ZERO, U256::from(50_000u64));

    let engine = DifficultyEngine::new(&chain);
    assert_eq!(engine.next_difficulty(&parent, &params), U256::from(100_000u64));
}

#[test]
fn one_half_life_of_missing_elapsed_time_halves_difficulty() {
    let chain = MockChainQuery::default();
    let params = sample_params();

    let anchor = header(0, 2_000_000, Hash::ZERO, Hash::ZERO, U256::from(50_000u64));
    chain.insert(anchor.clone());

    let on_pace_ts = 2_000_000 + 15_000 * 11;
    let parent = header(10, on_pace_ts - 120 * 15_000, Hash::ZERO, Hash::ZERO, U256::from(50_000u64));

    let engine = DifficultyEngine::new(&chain);
    assert_eq!(engine.next_difficulty(&parent, &params), U256::from(25_000u64));
}

#[test]
fn result_never_drops_below_the_configured_minimum() {
    let chain = MockChainQuery::default();
    let mut params = sample_params();
    params.min_difficulty = U256::from(1000u64);

    let anchor = header(0, 40_000_000, Hash::ZERO, Hash::ZERO, U256::from(100_000u64));
    chain.insert(anchor.clone());

    // twenty half-lives short of on-pace arrival: the raw ASERT result underflows to zero and
    // must be floored at `min_difficulty` rather than returned as-is.
    let on_pace_ts = 40_000_000 + 15_000 * 11;
    let parent = header(10, on_pace_ts - 20 * 120 * 15_000, Hash::ZERO, Hash::ZERO, U256::from(100_000u64));

    let engine = DifficultyEngine::new(&chain);
    assert_eq!(engine.next_difficulty(&parent, &params), params.min_difficulty);
}

#[test]
fn missing_anchor_falls_back_to_the_parent_difficulty() {
    let chain = MockChainQuery::default();
    let mut params = sample_params();
    params.asert_anchor_height = 5;
    // no header at height 5 is ever inserted.

    let parent = header(10, 2_500_000, Hash::ZERO, Hash::ZERO, U256::from(77_000u64));
    let engine = DifficultyEngine::new(&chain);
    assert_eq!(engine.next_difficulty(&parent, &params), U256::from(77_000u64));
}
