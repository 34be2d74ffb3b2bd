use crate::model::{Address, Tx};

/// A transaction's mempool residency record: the transaction itself plus the bookkeeping fields
/// `MempoolEngine` stamps on admission and never mutates afterward except to relocate the entry
/// between indexes.
#[derive(Debug, Clone)]
pub struct MempoolEntry {
    tx: Tx,
    first_seen_time_ms: u64,
    first_seen_height: u64,
    received_from: Option<Address>,
}

impl MempoolEntry {
    pub fn new(tx: Tx, first_seen_time_ms: u64, first_seen_height: u64, received_from: Option<Address>) -> Self {
        Self { tx, first_seen_time_ms, first_seen_height, received_from }
    }

    pub fn tx(&self) -> &Tx {
        &self.tx
    }

    pub fn first_seen_time_ms(&self) -> u64 {
        self.first_seen_time_ms
    }

    pub fn first_seen_height(&self) -> u64 {
        self.first_seen_height
    }

    pub fn received_from(&self) -> Option<Address> {
        self.received_from
    }

    pub fn fee_per_byte(&self) -> f64 {
        self.tx.fee_per_byte()
    }
}

/// The authoritative `(feePerByte desc, nonce asc, hash asc)` ordering used by both fee indexes.
/// A free function rather than an `Ord` impl on `MempoolEntry` itself: entries don't have a
/// single natural order outside this specific index use, and `f64` isn't `Ord`.
pub fn fee_order_key(entry: &MempoolEntry) -> (std::cmp::Reverse<ordered_float::OrderedFloat<f64>>, u64, crate::model::Hash) {
    let nonce = entry.tx.nonce().unwrap_or(0);
    (std::cmp::Reverse(ordered_float::OrderedFloat(entry.fee_per_byte())), nonce, entry.tx.hash())
}
