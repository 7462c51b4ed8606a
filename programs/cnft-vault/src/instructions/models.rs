use anchor_lang::prelude::*;

use super::constant::*;
use super::errors::ErrorCode;

/// Program-derived identity that holds locked leaves and controls fraction mints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgramAuthority {
    pub key: Pubkey,
    pub bump: u8,
}

impl ProgramAuthority {
    pub fn derive() -> Self {
        let (key, bump) = Pubkey::find_program_address(&[AUTHORITY_SEED], &crate::ID);
        Self { key, bump }
    }

    pub fn from_bump(bump: u8) -> Result<Self> {
        let key = Pubkey::create_program_address(&[AUTHORITY_SEED, &[bump]], &crate::ID)
            .map_err(|_| error!(ErrorCode::MintAuthorityMismatch))?;
        Ok(Self { key, bump })
    }

    pub fn seeds(&self) -> [&[u8]; 2] {
        [AUTHORITY_SEED, std::slice::from_ref(&self.bump)]
    }
}

/// Fields committed to by a compressed asset's leaf.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LeafContext {
    pub asset_id: Pubkey,
    pub owner: Pubkey,
    pub delegate: Pubkey,
    pub nonce: u64,
    pub index: u32,
    pub data_hash: [u8; 32],
    pub creator_hash: [u8; 32],
}

impl LeafContext {
    /// Leaf as written after a transfer: owner and delegate both become `new_owner`.
    pub fn transferred_to(&self, new_owner: &Pubkey) -> Self {
        Self {
            owner: *new_owner,
            delegate: *new_owner,
            ..*self
        }
    }
}

/// Sibling hashes from leaf to root, checked against the tree depth on construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofPath(Vec<[u8; 32]>);

impl ProofPath {
    pub fn new(nodes: Vec<[u8; 32]>, depth: usize) -> Result<Self> {
        require!(
            depth > 0 && depth <= MAX_TREE_DEPTH,
            ErrorCode::MalformedProof
        );
        require!(nodes.len() == depth, ErrorCode::MalformedProof);
        Ok(Self(nodes))
    }

    pub fn nodes(&self) -> &[[u8; 32]] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

pub struct LockRequest {
    pub requester: Pubkey,
    /// Token account receiving the fractions.
    pub fraction_account: Pubkey,
    pub asset_id: Pubkey,
    pub leaf_owner: Pubkey,
    pub leaf_delegate: Pubkey,
    pub root: [u8; 32],
    pub data_hash: [u8; 32],
    pub creator_hash: [u8; 32],
    pub nonce: u64,
    pub index: u32,
    /// Leaf-side proof nodes; levels cached by the tree may be left out.
    pub proof_path: Vec<[u8; 32]>,
    /// Borsh-encoded `MetadataArgs` checked against `data_hash` and `creator_hash`.
    pub metadata: Option<Vec<u8>>,
    pub now: i64,
}

pub struct UnlockRequest {
    pub requester: Pubkey,
    /// Token account holding the fractions to burn.
    pub fraction_account: Pubkey,
    pub vault: Pubkey,
    pub proof_path: Vec<[u8; 32]>,
}
