use std::collections::{HashMap, HashSet};

use crate::model::{Address, Hash, Tx, TxPayload, TxType};

/// The dedup key a pending `BIP_CREATE`/`BIP_VOTE` transaction occupies. Two pending
/// transactions with the same key are rejected as duplicates by the mempool validator, and the
/// same key is what on-chain state is checked against for the non-duplicate half of the
/// governance check (`MempoolValidator` does that chain-state half; this module only tracks the
/// mempool-local half).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GovernanceKey {
    AliasAdd(String),
    AliasRemove(String),
    AuthorityAdd(Address),
    AuthorityRemove(Address),
    ParamChange(Address),
    TokenBurn(Address),
    TokenCreate(String),
    TokenMint(Address),
    TokenUpdate(Address),
}

/// Tracks the projection of currently-pending governance transactions, maintained incrementally
/// on every mempool add/remove so `MempoolValidator` can reject duplicates without scanning the
/// whole pool. Guarded by the same lock that guards `by_hash` in `MempoolEngine` (see
/// SPEC_FULL.md) -- there is no separate lock here.
#[derive(Default)]
pub struct GovernanceSets {
    keys: HashSet<GovernanceKey>,
    pending_bip_votes: HashMap<Hash, HashSet<Address>>,
}

impl GovernanceSets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &GovernanceKey) -> bool {
        self.keys.contains(key)
    }

    pub fn has_pending_vote(&self, reference: &Hash, sender: &Address) -> bool {
        self.pending_bip_votes.get(reference).is_some_and(|voters| voters.contains(sender))
    }

    /// Called when `tx` is admitted to the mempool.
    pub fn on_add(&mut self, tx: &Tx) {
        match (tx.tx_type(), tx.payload(), tx.sender()) {
            (TxType::BipCreate, Some(payload), _) => {
                if let Some(key) = governance_key(payload, tx) {
                    self.keys.insert(key);
                }
            },
            (TxType::BipVote, _, Some(sender)) => {
                if let Some(reference) = tx.reference_hash() {
                    self.pending_bip_votes.entry(reference).or_default().insert(sender);
                }
            },
            _ => {},
        }
    }

    /// Called when `tx` leaves the mempool for any reason (mined, evicted, expired, RBF'd...).
    pub fn on_remove(&mut self, tx: &Tx) {
        match (tx.tx_type(), tx.payload(), tx.sender()) {
            (TxType::BipCreate, Some(payload), _) => {
                if let Some(key) = governance_key(payload, tx) {
                    self.keys.remove(&key);
                }
            },
            (TxType::BipVote, _, Some(sender)) => {
                if let Some(reference) = tx.reference_hash() {
                    if let Some(voters) = self.pending_bip_votes.get_mut(&reference) {
                        voters.remove(&sender);
                        if voters.is_empty() {
                            self.pending_bip_votes.remove(&reference);
                        }
                    }
                }
            },
            _ => {},
        }
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }
}

fn governance_key(payload: &TxPayload, tx: &Tx) -> Option<GovernanceKey> {
    Some(match payload {
        TxPayload::AddressAliasAdd { alias, .. } => GovernanceKey::AliasAdd(alias.clone()),
        TxPayload::AddressAliasRemove { alias } => GovernanceKey::AliasRemove(alias.clone()),
        TxPayload::AuthorityAdd { address } => GovernanceKey::AuthorityAdd(*address),
        TxPayload::AuthorityRemove { address } => GovernanceKey::AuthorityRemove(*address),
        TxPayload::NetworkParamsSet { .. } => GovernanceKey::ParamChange(tx.sender()?),
        TxPayload::TokenBurn { token_address, .. } => GovernanceKey::TokenBurn(*token_address),
        TxPayload::TokenCreate { name, .. } => GovernanceKey::TokenCreate(name.clone()),
        TxPayload::TokenMint { token_address, .. } => GovernanceKey::TokenMint(*token_address),
        TxPayload::TokenUpdate { token_address, .. } => GovernanceKey::TokenUpdate(*token_address),
        TxPayload::Vote { .. } => return None,
    })
}

/// The governance-check half `MempoolValidator` runs before admission: does a *new* candidate
/// transaction collide with something already pending? Takes the sender directly (rather than a
/// constructed `Tx`) since the validator computes this before it necessarily has one for the
/// `NETWORK_PARAMS_SET` case, which is keyed by the submitting authority's address.
pub fn duplicate_key_for(payload: &TxPayload, sender: Address) -> Option<GovernanceKey> {
    Some(match payload {
        TxPayload::AddressAliasAdd { alias, .. } => GovernanceKey::AliasAdd(alias.clone()),
        TxPayload::AddressAliasRemove { alias } => GovernanceKey::AliasRemove(alias.clone()),
        TxPayload::AuthorityAdd { address } => GovernanceKey::AuthorityAdd(*address),
        TxPayload::AuthorityRemove { address } => GovernanceKey::AuthorityRemove(*address),
        TxPayload::NetworkParamsSet { .. } => GovernanceKey::ParamChange(sender),
        TxPayload::TokenBurn { token_address, .. } => GovernanceKey::TokenBurn(*token_address),
        TxPayload::TokenCreate { name, .. } => GovernanceKey::TokenCreate(name.clone()),
        TxPayload::TokenMint { token_address, .. } => GovernanceKey::TokenMint(*token_address),
        TxPayload::TokenUpdate { token_address, .. } => GovernanceKey::TokenUpdate(*token_address),
        TxPayload::Vote { .. } => None?,
    })
}
