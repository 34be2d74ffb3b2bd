use super::error::{ValidationError, ValidationErrorKind as Kind};
use crate::model::{Address, Tx, TxPayload, TxType};

/// Encoded transaction size ceiling. Chosen generously relative to the largest payload variant
/// (`TOKEN_CREATE`'s four strings) plus a message field.
pub const MAX_TX_SIZE: usize = 16 * 1024;

/// Stateless, per-transaction checks: everything that can be decided from the transaction alone,
/// with no chain-state or mempool lookups. Order matches the data model's check list; the first
/// failing check short-circuits the rest.
pub struct TxValidator;

impl TxValidator {
    pub fn validate_stateless(tx: &Tx) -> Result<(), ValidationError> {
        if tx.size() > MAX_TX_SIZE {
            return Err(ValidationError::new(
                Kind::TxStateless,
                format!("encoded size {} exceeds MAX_TX_SIZE {}", tx.size(), MAX_TX_SIZE),
            ));
        }

        Self::check_type_payload_consistency(tx)?;

        // `nonce.is_some() <=> sender.is_some()`.
        if tx.nonce().is_some() != tx.sender().is_some() {
            return Err(ValidationError::new(Kind::TxStateless, "nonce present iff sender present"));
        }

        // Non-system types must have recovered a sender: a missing sender here means either the
        // signature didn't verify, or it wasn't present/well-formed.
        if !tx.tx_type().is_system() && tx.sender().is_none() {
            return Err(ValidationError::new(Kind::TxStateless, "signature does not recover to a sender"));
        }

        match tx.tx_type() {
            TxType::Transfer => {
                if tx.recipient().is_none() {
                    return Err(ValidationError::new(Kind::TxStateless, "TRANSFER requires a recipient"));
                }
            },
            TxType::BipVote => {
                if tx.reference_hash().is_none() {
                    return Err(ValidationError::new(Kind::TxStateless, "BIP_VOTE requires a referenceHash"));
                }
            },
            _ => {},
        }

        Ok(())
    }

    fn check_type_payload_consistency(tx: &Tx) -> Result<(), ValidationError> {
        match (tx.tx_type(), tx.payload()) {
            (TxType::Transfer, None) => Ok(()),
            (TxType::Transfer, Some(_)) => {
                Err(ValidationError::new(Kind::TxStateless, "TRANSFER must not carry a payload"))
            },
            (TxType::BipCreate, Some(p)) if !matches!(p, TxPayload::Vote { .. }) => Ok(()),
            (TxType::BipCreate, _) => {
                Err(ValidationError::new(Kind::TxStateless, "BIP_CREATE requires exactly one non-VOTE payload variant"))
            },
            (TxType::BipVote, Some(TxPayload::Vote { .. })) => Ok(()),
            (TxType::BipVote, _) => Err(ValidationError::new(Kind::TxStateless, "BIP_VOTE requires a VOTE payload")),
            (t, _) if t.is_system() => Ok(()),
            _ => Err(ValidationError::new(Kind::TxStateless, "unreachable type/payload combination")),
        }
    }
}

/// `None` for system transactions, matching the "sender.is_none() => system tx" convention used
/// throughout the data model.
pub fn sender_or_none(tx: &Tx) -> Option<Address> {
    tx.sender()
}
