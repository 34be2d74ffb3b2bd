//! The nonce-ordered, fee-prioritized, governance-aware pending-transaction store: per-sender
//! executable/future queues (`sender_pool`), global fee-ordered indexes (`fee_index`), governance
//! dedup tracking (`governance`), and the `MempoolEngine` facade tying them together.

pub mod clock;
pub mod config;
pub mod engine;
pub mod entry;
pub mod error;
pub mod events;
pub mod fee_index;
pub mod governance;
pub mod sender_pool;

pub use clock::{Clock, SystemClock};
pub use config::MempoolConfig;
pub use engine::{MempoolEngine, MempoolStats};
pub use entry::MempoolEntry;
pub use error::MempoolError;
pub use events::{AddReason, MempoolEvent, MempoolTxAddEvent, MempoolTxRemoveEvent, RemoveReason};
pub use governance::{GovernanceKey, GovernanceSets};
pub use sender_pool::SenderPool;
