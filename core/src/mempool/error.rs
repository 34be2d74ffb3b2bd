use thiserror::Error;

/// The outcome of a mempool admission attempt. Every variant is a normal, expected control-flow
/// result -- none of these are logged as errors by callers, only reported to whoever submitted
/// the transaction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MempoolError {
    #[error("transaction nonce {tx_nonce} is not greater than the chain nonce {chain_nonce}")]
    Stale { chain_nonce: u64, tx_nonce: u64 },

    #[error("transaction is invalid: {reason}")]
    Invalid { reason: String },

    #[error("a transaction with this hash is already pending")]
    RejectedDuplicate,

    #[error("replace-by-fee rejected: new fee must be at least 110% of the existing entry's fee")]
    RejectedRbf,

    #[error("mempool is full")]
    RejectedMempoolFull,

    #[error("nonce {tx_nonce} is too far ahead of chain nonce {chain_nonce} (max gap {max_gap})")]
    RejectedNonceTooFarFuture { chain_nonce: u64, tx_nonce: u64, max_gap: u64 },

    #[error("fee {offered} below required floor {required}")]
    RejectedFee { offered: String, required: String },

    #[error("rejected by current chain/governance state: {reason}")]
    RejectedState { reason: String },
}

impl MempoolError {
    /// Short, stable tag for metrics/log correlation, independent of the human-readable message.
    pub fn kind(&self) -> &'static str {
        match self {
            MempoolError::Stale { .. } => "stale",
            MempoolError::Invalid { .. } => "invalid",
            MempoolError::RejectedDuplicate => "rejected_duplicate",
            MempoolError::RejectedRbf => "rejected_rbf",
            MempoolError::RejectedMempoolFull => "rejected_mempool_full",
            MempoolError::RejectedNonceTooFarFuture { .. } => "rejected_nonce_too_far_future",
            MempoolError::RejectedFee { .. } => "rejected_fee",
            MempoolError::RejectedState { .. } => "rejected_state",
        }
    }
}
