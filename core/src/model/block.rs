use borsh::{BorshDeserialize, BorshSerialize};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

use super::{
    primitives::{Address, Hash, Signature},
    tx::{hash_bytes, Tx, TxWire},
};

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct BlockHeaderWire {
    pub version: u16,
    pub height: u64,
    pub timestamp: u64,
    pub previous_hash: Hash,
    pub tx_root_hash: Hash,
    pub state_root_hash: Hash,
    pub difficulty: U256Borsh,
    pub coinbase: Address,
    pub nonce: u64,
    pub signature: Signature,
}

/// `primitive_types::U256` doesn't implement borsh traits upstream; this thin wrapper gives it a
/// canonical (little-endian, fixed 32-byte) encoding, mirroring `Wei`'s approach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct U256Borsh(pub U256);

impl BorshSerialize for U256Borsh {
    fn serialize<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.0.to_little_endian())
    }
}

impl BorshDeserialize for U256Borsh {
    fn deserialize_reader<R: std::io::Read>(reader: &mut R) -> std::io::Result<Self> {
        let mut buf = [0u8; 32];
        reader.read_exact(&mut buf)?;
        Ok(U256Borsh(U256::from_little_endian(&buf)))
    }
}

#[derive(Debug, Clone)]
pub struct BlockHeader {
    wire: BlockHeaderWire,
    hash: Hash,
    size: usize,
}

impl BlockHeader {
    pub fn from_wire(wire: BlockHeaderWire) -> Result<Self, std::io::Error> {
        let encoded = borsh::to_vec(&wire)?;
        let size = encoded.len();
        let hash = Hash(hash_bytes(&encoded));
        Ok(Self { wire, hash, size })
    }

    pub fn wire(&self) -> &BlockHeaderWire {
        &self.wire
    }

    pub fn hash(&self) -> Hash {
        self.hash
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn height(&self) -> u64 {
        self.wire.height
    }

    pub fn timestamp(&self) -> u64 {
        self.wire.timestamp
    }

    pub fn previous_hash(&self) -> Hash {
        self.wire.previous_hash
    }

    pub fn difficulty(&self) -> U256 {
        self.wire.difficulty.0
    }

    /// The canonical PoW pre-image: the header encoding minus the `signature` field. The mining
    /// `nonce` field IS included (it's what mining search iterates over).
    pub fn pow_input(&self) -> Result<Vec<u8>, std::io::Error> {
        let mut unsigned = self.wire.clone();
        unsigned.signature = Signature { bytes: [0u8; 64], recovery_id: 0 };
        borsh::to_vec(&unsigned)
    }
}

#[derive(Debug, Clone)]
pub struct Block {
    pub header: BlockHeader,
    pub txs: Vec<Tx>,
}

impl Block {
    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    pub fn height(&self) -> u64 {
        self.header.height()
    }

    /// Total encoded size: header plus every transaction's wire encoding.
    pub fn size(&self) -> Result<usize, std::io::Error> {
        let mut total = self.header.size();
        for tx in &self.txs {
            total += borsh::to_vec(tx.wire())?.len();
        }
        Ok(total)
    }

    pub fn tx_wires(&self) -> Vec<&TxWire> {
        self.txs.iter().map(Tx::wire).collect()
    }
}
