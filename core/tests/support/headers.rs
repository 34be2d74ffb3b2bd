//  Copyright 2024. The Warden Project. See LICENSE for terms.

use primitive_types::U256;
use warden_core::model::{Address, BlockHeader, BlockHeaderWire, Hash, Signature, U256Borsh};

#[allow(clippy::too_many_arguments)]
pub fn header(height: u64, timestamp: u64, previous_hash: Hash, tx_root_hash: Hash, difficulty: U256) -> BlockHeader {
    let wire = BlockHeaderWire {
        version: 1,
        height,
        timestamp,
        previous_hash,
        tx_root_hash,
        state_root_hash: Hash::ZERO,
        difficulty: U256Borsh(difficulty),
        coinbase: Address::ZERO,
        nonce: 0,
        signature: Signature { bytes: [0u8; 64], recovery_id: 0 },
    };
    BlockHeader::from_wire(wire).expect("well-formed header wire constructs")
}
