//! Thread-safe lifecycle management for an epoch-keyed, RandomX-family memory-hard hash.
//!
//! [`EpochKeyedHasher`] owns the active cache/dataset generation and an LRU of light caches for
//! older epochs still being verified during sync, and hands out reference-counted [`VmHandle`]s
//! whose lifetime keeps the generation they were built from alive.

mod cache_dataset;
mod epoch_hasher;
mod error;
mod flags;
mod outstanding;
mod seed;
mod vm;

pub use epoch_hasher::EpochKeyedHasher;
pub use error::HasherError;
pub use seed::{genesis_seed_from_key, NoopSeedProvider, PreferringSeedProvider, SeedProvider};
pub use vm::{VmHandle, VmKind};

/// Number of blocks sharing a single PoW seed.
pub const DEFAULT_EPOCH_LENGTH: u64 = 2048;
