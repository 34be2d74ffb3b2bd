use crate::collab::{BipStatus, WorldState};
use crate::mempool::{governance::duplicate_key_for, GovernanceSets, MempoolConfig, MempoolError};
use crate::model::{Address, Tx, TxPayload, TxType};

use super::tx::TxValidator;

/// Stateful admission check run by `MempoolEngine` before a transaction enters the pool:
/// consults `WorldState` for chain-tip-consistent balances/nonces/authority status and the
/// mempool's own governance sets for pending-duplicate detection.
pub struct MempoolValidator<'a, W> {
    config: &'a MempoolConfig,
    world: &'a W,
    governance: &'a GovernanceSets,
}

impl<'a, W: WorldState> MempoolValidator<'a, W> {
    pub fn new(config: &'a MempoolConfig, world: &'a W, governance: &'a GovernanceSets) -> Self {
        Self { config, world, governance }
    }

    pub fn validate(&self, tx: &Tx, skip_stateless: bool) -> Result<(), MempoolError> {
        if tx.fee().0 < self.config.min_acceptable_fee_wei.0 {
            return Err(MempoolError::Invalid { reason: "fee below the network-wide minimum acceptable fee".into() });
        }

        if !skip_stateless {
            TxValidator::validate_stateless(tx).map_err(|e| MempoolError::Invalid { reason: e.to_string() })?;
        }

        let Some(sender) = tx.sender() else {
            return Err(MempoolError::Invalid { reason: "system transactions are not accepted over this path".into() });
        };

        let chain_nonce = self.world.nonce(&sender);
        let tx_nonce = tx.nonce().expect("non-system tx carries a nonce");
        if tx_nonce < chain_nonce + 1 {
            return Err(MempoolError::Stale { chain_nonce, tx_nonce });
        }

        let params = self.world.params();
        let required = params
            .min_tx_fee(tx.size())
            .ok_or_else(|| MempoolError::Invalid { reason: "fee floor computation overflowed".into() })?;
        if tx.fee().0 < required.0 {
            return Err(MempoolError::RejectedFee { offered: tx.fee().0.to_string(), required: required.0.to_string() });
        }

        match tx.tx_type() {
            TxType::Transfer => self.check_transfer(tx, sender)?,
            TxType::BipCreate | TxType::BipVote => self.check_governance(tx, sender)?,
            _ => return Err(MempoolError::Invalid { reason: "unsupported transaction type for mempool admission".into() }),
        }

        Ok(())
    }

    fn check_transfer(&self, tx: &Tx, sender: Address) -> Result<(), MempoolError> {
        let token = tx.token();
        let native = Address::NATIVE_TOKEN;

        if token != native {
            let info = self
                .world
                .token(&token)
                .ok_or_else(|| MempoolError::RejectedState { reason: "transfer references a non-existent token".into() })?;
            if !info.exists {
                return Err(MempoolError::RejectedState { reason: "transfer references a non-existent token".into() });
            }
            let balance = self.world.balance(&sender, &token);
            if balance < tx.amount().0 {
                return Err(MempoolError::RejectedState { reason: "insufficient token balance".into() });
            }
        }

        let mut required_native = tx.fee().0;
        if token == native {
            required_native = required_native.saturating_add(tx.amount().0);
        }
        let native_balance = self.world.balance(&sender, &native);
        if native_balance < required_native {
            return Err(MempoolError::RejectedState { reason: "insufficient native balance to cover fee (and amount)".into() });
        }

        if let Some(recipient) = tx.recipient() {
            if recipient.is_zero() {
                let info = self
                    .world
                    .token(&token)
                    .ok_or_else(|| MempoolError::RejectedState { reason: "burn references a non-existent token".into() })?;
                if !info.user_burnable {
                    return Err(MempoolError::RejectedState { reason: "token is not user-burnable".into() });
                }
            }
        }

        Ok(())
    }

    fn check_governance(&self, tx: &Tx, sender: Address) -> Result<(), MempoolError> {
        if !self.world.authority(&sender) {
            return Err(MempoolError::RejectedState { reason: "sender is not a registered authority".into() });
        }

        match tx.tx_type() {
            TxType::BipCreate => {
                let payload = tx
                    .payload()
                    .ok_or_else(|| MempoolError::Invalid { reason: "BIP_CREATE requires a payload".into() })?;
                self.check_bip_create_duplicate(payload, sender)
            },
            TxType::BipVote => {
                let reference = tx
                    .reference_hash()
                    .ok_or_else(|| MempoolError::Invalid { reason: "BIP_VOTE requires a referenceHash".into() })?;
                let bip = self
                    .world
                    .bip(&reference)
                    .ok_or_else(|| MempoolError::RejectedState { reason: "referenced BIP does not exist".into() })?;
                if bip.status != BipStatus::Pending {
                    return Err(MempoolError::RejectedState { reason: "referenced BIP is not pending".into() });
                }
                if bip.voters.contains(&sender) {
                    return Err(MempoolError::RejectedState { reason: "sender already voted on-chain".into() });
                }
                if self.governance.has_pending_vote(&reference, &sender) {
                    return Err(MempoolError::RejectedState { reason: "sender's vote is already pending in the mempool".into() });
                }
                Ok(())
            },
            _ => unreachable!("check_governance only called for BIP_CREATE/BIP_VOTE"),
        }
    }

    fn check_bip_create_duplicate(&self, payload: &TxPayload, sender: Address) -> Result<(), MempoolError> {
        if self.on_chain_target_conflicts(payload) {
            return Err(MempoolError::RejectedState { reason: "governance operation's target already matches on-chain state".into() });
        }
        if let Some(key) = duplicate_key_for(payload, sender) {
            if self.governance.contains(&key) {
                return Err(MempoolError::RejectedState { reason: "an identical governance operation is already pending".into() });
            }
        }
        Ok(())
    }

    fn on_chain_target_conflicts(&self, payload: &TxPayload) -> bool {
        match payload {
            TxPayload::AddressAliasAdd { alias, .. } => self.world.address_alias(alias).is_some(),
            TxPayload::AddressAliasRemove { alias } => self.world.address_alias(alias).is_none(),
            TxPayload::AuthorityAdd { address } => self.world.authority(address),
            TxPayload::AuthorityRemove { address } => !self.world.authority(address),
            TxPayload::NetworkParamsSet { .. } => false,
            TxPayload::TokenBurn { token_address, amount, .. } => self
                .world
                .token(token_address)
                .map(|t| !t.exists || t.current_supply < amount.0)
                .unwrap_or(true),
            TxPayload::TokenCreate { .. } => false,
            TxPayload::TokenMint { token_address, amount, .. } => self
                .world
                .token(token_address)
                .map(|t| {
                    !t.exists
                        || t.max_supply.map(|max| t.current_supply.saturating_add(amount.0) > max).unwrap_or(false)
                })
                .unwrap_or(true),
            TxPayload::TokenUpdate { token_address, .. } => self.world.token(token_address).map(|t| !t.exists).unwrap_or(true),
            TxPayload::Vote { .. } => false,
        }
    }
}
