use super::{primitives::Hash, tx::hash_bytes};

/// Computes the deterministic binary merkle root over an ordered list of transaction hashes.
///
/// Pairing rule on an odd-sized level: duplicate the last hash (the open question in the design
/// notes around "exact merkle pairing rule on odd counts" is resolved this way here; see
/// DESIGN.md). This rule MUST stay identical between ingestion (`validate_full_block`) and
/// whatever builds `txRootHash` when assembling a block, or validation will permanently reject
/// otherwise-valid blocks.
pub fn merkle_root(tx_hashes: &[Hash]) -> Hash {
    if tx_hashes.is_empty() {
        return Hash::ZERO;
    }
    let mut level: Vec<Hash> = tx_hashes.to_vec();
    while level.len() > 1 {
        if level.len() % 2 == 1 {
            level.push(*level.last().unwrap());
        }
        level = level
            .chunks_exact(2)
            .map(|pair| {
                let mut buf = Vec::with_capacity(64);
                buf.extend_from_slice(&pair[0].0);
                buf.extend_from_slice(&pair[1].0);
                Hash(hash_bytes(&buf))
            })
            .collect();
    }
    level[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(b: u8) -> Hash {
        Hash([b; 32])
    }

    #[test]
    fn empty_root_is_zero() {
        assert_eq!(merkle_root(&[]), Hash::ZERO);
    }

    #[test]
    fn single_leaf_is_its_own_root() {
        assert_eq!(merkle_root(&[h(1)]), h(1));
    }

    #[test]
    fn odd_count_duplicates_last() {
        let with_dup = merkle_root(&[h(1), h(2), h(3), h(3)]);
        let odd = merkle_root(&[h(1), h(2), h(3)]);
        assert_eq!(with_dup, odd);
    }

    #[test]
    fn order_sensitive() {
        assert_ne!(merkle_root(&[h(1), h(2)]), merkle_root(&[h(2), h(1)]));
    }
}
