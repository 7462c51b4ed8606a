use solana_program::keccak;

use super::models::{LeafContext, ProofPath};

/// Bubblegum leaf schema version tag for V1 leaves.
pub const LEAF_SCHEMA_V1: u8 = 1;

/// Canonical leaf hash for a compressed asset:
/// keccak256(version || asset_id || owner || delegate || nonce || data_hash || creator_hash)
pub fn compute_leaf_hash(leaf: &LeafContext) -> [u8; 32] {
    keccak::hashv(&[
        &[LEAF_SCHEMA_V1],
        leaf.asset_id.as_ref(),
        leaf.owner.as_ref(),
        leaf.delegate.as_ref(),
        &leaf.nonce.to_le_bytes(),
        &leaf.data_hash,
        &leaf.creator_hash,
    ])
    .to_bytes()
}

/// Folds `leaf` up the tree. Bit `i` of `index` set means the node at level `i` is a right child.
pub fn recompute_root(leaf: [u8; 32], path: &ProofPath, index: u32) -> [u8; 32] {
    let mut node = leaf;
    for (level, sibling) in path.nodes().iter().enumerate() {
        node = if (index >> level) & 1 == 0 {
            keccak::hashv(&[&node, sibling]).to_bytes()
        } else {
            keccak::hashv(&[sibling, &node]).to_bytes()
        };
    }
    node
}

pub fn verify_proof(leaf: [u8; 32], path: &ProofPath, index: u32, claimed_root: &[u8; 32]) -> bool {
    // An index outside the tree would silently alias another leaf.
    if (index as u64) >> path.depth() != 0 {
        return false;
    }
    recompute_root(leaf, path, index) == *claimed_root
}

/// Hash of an empty subtree of the given height.
pub fn empty_node(level: usize) -> [u8; 32] {
    let mut node = [0u8; 32];
    for _ in 0..level {
        node = keccak::hashv(&[&node, &node]).to_bytes();
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::prelude::*;
    use crate::instructions::constant::MAX_TREE_DEPTH;

    fn leaf(seed: u8) -> LeafContext {
        LeafContext {
            asset_id: Pubkey::new_from_array([seed; 32]),
            owner: Pubkey::new_from_array([seed.wrapping_add(1); 32]),
            delegate: Pubkey::new_from_array([seed.wrapping_add(2); 32]),
            nonce: seed as u64,
            index: seed as u32,
            data_hash: [seed.wrapping_add(3); 32],
            creator_hash: [seed.wrapping_add(4); 32],
        }
    }

    fn hash_pair(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
        keccak::hashv(&[left, right]).to_bytes()
    }

    // Four-leaf tree: returns (root, proof for `target`).
    fn small_tree(leaves: [[u8; 32]; 4], target: usize) -> ([u8; 32], ProofPath) {
        let l01 = hash_pair(&leaves[0], &leaves[1]);
        let l23 = hash_pair(&leaves[2], &leaves[3]);
        let root = hash_pair(&l01, &l23);
        let sibling = leaves[target ^ 1];
        let uncle = if target < 2 { l23 } else { l01 };
        (root, ProofPath::new(vec![sibling, uncle], 2).unwrap())
    }

    #[test]
    fn leaf_hash_is_order_sensitive() {
        let base = leaf(7);
        let mut swapped = base;
        swapped.owner = base.delegate;
        swapped.delegate = base.owner;
        assert_ne!(compute_leaf_hash(&base), compute_leaf_hash(&swapped));

        let mut other_nonce = base;
        other_nonce.nonce += 1;
        assert_ne!(compute_leaf_hash(&base), compute_leaf_hash(&other_nonce));
    }

    #[test]
    fn leaf_hash_ignores_index() {
        let base = leaf(7);
        let mut moved = base;
        moved.index = 99;
        assert_eq!(compute_leaf_hash(&base), compute_leaf_hash(&moved));
    }

    #[test]
    fn verifies_every_position_of_small_tree() {
        let leaves = [[1u8; 32], [2u8; 32], [3u8; 32], [4u8; 32]];
        for target in 0..4 {
            let (root, path) = small_tree(leaves, target);
            assert!(verify_proof(leaves[target], &path, target as u32, &root));
            // Wrong position must not verify.
            let wrong = (target ^ 1) as u32;
            assert!(!verify_proof(leaves[target], &path, wrong, &root));
        }
    }

    #[test]
    fn any_bit_flip_breaks_the_proof() {
        let leaves = [[9u8; 32], [8u8; 32], [7u8; 32], [6u8; 32]];
        let (root, path) = small_tree(leaves, 2);
        assert!(verify_proof(leaves[2], &path, 2, &root));

        for node in 0..path.depth() {
            for bit in [0usize, 77, 255] {
                let mut nodes = path.nodes().to_vec();
                nodes[node][bit / 8] ^= 1 << (bit % 8);
                let tampered = ProofPath::new(nodes, 2).unwrap();
                assert!(!verify_proof(leaves[2], &tampered, 2, &root));
            }
        }

        let mut bad_leaf = leaves[2];
        bad_leaf[31] ^= 0x80;
        assert!(!verify_proof(bad_leaf, &path, 2, &root));

        let mut bad_root = root;
        bad_root[0] ^= 1;
        assert!(!verify_proof(leaves[2], &path, 2, &bad_root));
    }

    #[test]
    fn index_outside_tree_is_rejected() {
        let leaves = [[1u8; 32], [2u8; 32], [3u8; 32], [4u8; 32]];
        let (root, path) = small_tree(leaves, 1);
        // 5 == 0b101 has the same low bits as 1.
        assert_eq!(recompute_root(leaves[1], &path, 5), root);
        assert!(!verify_proof(leaves[1], &path, 5, &root));
    }

    #[test]
    fn proof_length_must_match_depth() {
        assert!(ProofPath::new(vec![[0u8; 32]; 13], 14).is_err());
        assert!(ProofPath::new(vec![[0u8; 32]; 15], 14).is_err());
        assert!(ProofPath::new(vec![], 0).is_err());
        assert!(ProofPath::new(vec![[0u8; 32]; MAX_TREE_DEPTH + 1], MAX_TREE_DEPTH + 1).is_err());
        assert_eq!(ProofPath::new(vec![[0u8; 32]; 14], 14).unwrap().depth(), 14);
    }

    #[test]
    fn zero_filled_proof_is_not_an_empty_tree() {
        let path = ProofPath::new(vec![[0u8; 32]; 14], 14).unwrap();
        // Zeroed root is never the fold of a zero leaf.
        assert!(!verify_proof([0u8; 32], &path, 0, &[0u8; 32]));
        // Zero siblings above the first level are not empty subtrees either.
        assert!(!verify_proof([0u8; 32], &path, 0, &empty_node(14)));
    }

    #[test]
    fn empty_tree_proof_uses_empty_subtrees() {
        let nodes: Vec<[u8; 32]> = (0..14).map(empty_node).collect();
        let path = ProofPath::new(nodes, 14).unwrap();
        assert!(verify_proof([0u8; 32], &path, 12_345, &empty_node(14)));
    }
}
