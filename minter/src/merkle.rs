use cosmwasm_std::{Binary, CanonicalAddr};
use sha2::{Digest, Sha256};

use crate::rand::sha_256;

/// Returns [u8; 32] leaf hash of an allowlist entry
///
/// The encoding is the packed concatenation of the entry's index as 4 big endian
/// bytes and the raw canonical address bytes.  The offline tree builder must hash
/// leaves identically, with each index equal to the claimant's position in the
/// exact address list the tree was built from
///
/// # Arguments
///
/// * `index` - the entry's position in the address list
/// * `address` - the claimant's canonical address
pub fn leaf_hash(index: u32, address: &CanonicalAddr) -> [u8; 32] {
    let mut packed = Vec::with_capacity(4 + address.as_slice().len());
    packed.extend_from_slice(&index.to_be_bytes());
    packed.extend_from_slice(address.as_slice());
    sha_256(&packed)
}

/// Returns [u8; 32] parent hash of a sorted pair of nodes
///
/// # Arguments
///
/// * `a` - one child hash
/// * `b` - the other child hash
pub fn hash_pair(a: &[u8], b: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    if a <= b {
        hasher.update(a);
        hasher.update(b);
    } else {
        hasher.update(b);
        hasher.update(a);
    }
    let hash = hasher.finalize();

    let mut result = [0u8; 32];
    result.copy_from_slice(hash.as_slice());
    result
}

/// Returns bool which is true if the proof links the leaf to the root
///
/// Pairs are hashed in sorted byte order at every level, so the proof does not
/// need to encode left/right positions
///
/// # Arguments
///
/// * `root` - the fixed root the allowlist was committed to
/// * `leaf` - the leaf hash of the claim being verified
/// * `proof` - sibling hashes from the leaf to the root
pub fn verify_proof(root: &[u8; 32], leaf: [u8; 32], proof: &[Binary]) -> bool {
    let mut node = leaf;
    for sibling in proof.iter() {
        node = hash_pair(&node, sibling.as_slice());
    }
    node == *root
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::Binary;

    fn canon(bytes: &[u8]) -> CanonicalAddr {
        CanonicalAddr(Binary(bytes.to_vec()))
    }

    /// builds the root of a 4 entry tree and returns it with each entry's proof
    fn four_leaf_tree(addrs: &[CanonicalAddr]) -> ([u8; 32], Vec<Vec<Binary>>) {
        let leaves: Vec<[u8; 32]> = addrs
            .iter()
            .enumerate()
            .map(|(i, a)| leaf_hash(i as u32, a))
            .collect();
        let left = hash_pair(&leaves[0], &leaves[1]);
        let right = hash_pair(&leaves[2], &leaves[3]);
        let root = hash_pair(&left, &right);
        let proofs = vec![
            vec![Binary(leaves[1].to_vec()), Binary(right.to_vec())],
            vec![Binary(leaves[0].to_vec()), Binary(right.to_vec())],
            vec![Binary(leaves[3].to_vec()), Binary(left.to_vec())],
            vec![Binary(leaves[2].to_vec()), Binary(left.to_vec())],
        ];
        (root, proofs)
    }

    #[test]
    fn test_verify_four_leaves() {
        let addrs: Vec<CanonicalAddr> = (0u8..4)
            .map(|i| canon(&[i + 1; 20]))
            .collect();
        let (root, proofs) = four_leaf_tree(&addrs);
        for (i, addr) in addrs.iter().enumerate() {
            let leaf = leaf_hash(i as u32, addr);
            assert!(verify_proof(&root, leaf, &proofs[i]));
        }
    }

    #[test]
    fn test_wrong_index_fails() {
        let addrs: Vec<CanonicalAddr> = (0u8..4)
            .map(|i| canon(&[i + 1; 20]))
            .collect();
        let (root, proofs) = four_leaf_tree(&addrs);
        // right proof, wrong index
        let leaf = leaf_hash(2, &addrs[0]);
        assert!(!verify_proof(&root, leaf, &proofs[0]));
        // right index, someone else's proof
        let leaf = leaf_hash(0, &addrs[0]);
        assert!(!verify_proof(&root, leaf, &proofs[1]));
    }

    #[test]
    fn test_reordering_invalidates_proofs() {
        // the leaf encoding deliberately pins each address to its position, so
        // rebuilding the tree from a reordered list breaks every outstanding proof
        let addrs: Vec<CanonicalAddr> = (0u8..4)
            .map(|i| canon(&[i + 1; 20]))
            .collect();
        let (_, proofs) = four_leaf_tree(&addrs);
        let mut shuffled = addrs.clone();
        shuffled.swap(0, 3);
        let (new_root, _) = four_leaf_tree(&shuffled);
        for (i, addr) in addrs.iter().enumerate() {
            let leaf = leaf_hash(i as u32, addr);
            assert!(!verify_proof(&new_root, leaf, &proofs[i]));
        }
    }

    #[test]
    fn test_pair_order_independence() {
        let a = [7u8; 32];
        let b = [9u8; 32];
        assert_eq!(hash_pair(&a, &b), hash_pair(&b, &a));
    }
}
