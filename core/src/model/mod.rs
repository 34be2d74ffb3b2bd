pub mod block;
pub mod merkle;
pub mod params;
pub mod primitives;
pub mod tx;

pub use block::{Block, BlockHeader, BlockHeaderWire, U256Borsh};
pub use params::NetworkParamsState;
pub use primitives::{Address, Hash, Signature, Wei};
pub use tx::{Tx, TxConstructError, TxPayload, TxType, TxVersion, TxWire, VoteKind};
