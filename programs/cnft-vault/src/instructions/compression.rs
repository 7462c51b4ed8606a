use std::mem::size_of;

use anchor_lang::prelude::*;
use mpl_bubblegum::instructions::{TransferCpi, TransferCpiAccounts, TransferInstructionArgs};
use spl_account_compression::canopy::fill_in_proof_from_canopy;
use spl_account_compression::state::{
    ConcurrentMerkleTreeHeader, CONCURRENT_MERKLE_TREE_HEADER_SIZE_V1,
};
use spl_account_compression::ConcurrentMerkleTree;

use super::errors::ErrorCode;
use super::merkle::{compute_leaf_hash, recompute_root};
use super::models::{LeafContext, ProofPath};

/// The compression service as seen by the vault.
pub trait CompressionTree {
    fn tree_key(&self) -> Pubkey;

    fn max_depth(&self) -> Result<usize>;

    fn current_root(&self) -> Result<[u8; 32]>;

    /// Full leaf-to-root proof for `index` built from the caller's leaf-side nodes.
    /// Trees that cache their upper levels complete a shortened proof here.
    fn proof_path(&self, nodes: Vec<[u8; 32]>, _index: u32) -> Result<ProofPath> {
        ProofPath::new(nodes, self.max_depth()?)
    }

    /// Rewrites `leaf` so that `new_owner` owns it. `root` is the root the proof was built
    /// against. Fails `StaleProof` if the tree moved underneath the proof.
    fn transfer_leaf(
        &mut self,
        leaf: &LeafContext,
        proof: &ProofPath,
        root: &[u8; 32],
        new_owner: &Pubkey,
    ) -> Result<[u8; 32]>;
}

/// Decoded view of an SPL concurrent merkle tree account: header, active root and canopy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeState<'d> {
    pub max_depth: u32,
    pub max_buffer_size: u32,
    pub root: [u8; 32],
    pub canopy: &'d [u8],
}

fn read_root<const D: usize, const B: usize>(body: &[u8]) -> Result<([u8; 32], usize)> {
    let size = size_of::<ConcurrentMerkleTree<D, B>>();
    let bytes = body.get(..size).ok_or(ErrorCode::InvalidTreeState)?;
    let tree: &ConcurrentMerkleTree<D, B> =
        bytemuck::try_from_bytes(bytes).map_err(|_| error!(ErrorCode::InvalidTreeState))?;
    require!(tree.is_initialized(), ErrorCode::InvalidTreeState);
    require!(
        (tree.active_index as usize) < B,
        ErrorCode::InvalidTreeState
    );
    Ok((tree.get_root(), size))
}

macro_rules! dispatch_tree {
    ($body:expr, $depth:expr, $buffer:expr, [$(($d:literal, $b:literal)),* $(,)?]) => {
        match ($depth, $buffer) {
            $(($d, $b) => read_root::<$d, $b>($body),)*
            _ => err!(ErrorCode::InvalidTreeState),
        }
    };
}

impl<'d> TreeState<'d> {
    pub fn parse(data: &'d [u8]) -> Result<Self> {
        require!(
            data.len() >= CONCURRENT_MERKLE_TREE_HEADER_SIZE_V1,
            ErrorCode::InvalidTreeState
        );
        let (header_bytes, body) = data.split_at(CONCURRENT_MERKLE_TREE_HEADER_SIZE_V1);
        let header = ConcurrentMerkleTreeHeader::try_from_slice(header_bytes)
            .map_err(|_| error!(ErrorCode::InvalidTreeState))?;
        header
            .assert_valid()
            .map_err(|_| error!(ErrorCode::InvalidTreeState))?;

        let max_depth = header.get_max_depth();
        let max_buffer_size = header.get_max_buffer_size();
        let (root, tree_size) = dispatch_tree!(
            body,
            max_depth,
            max_buffer_size,
            [
                (3, 8),
                (5, 8),
                (6, 16),
                (7, 16),
                (8, 16),
                (9, 16),
                (10, 32),
                (11, 32),
                (12, 32),
                (13, 32),
                (14, 64),
                (14, 256),
                (14, 1024),
                (14, 2048),
                (15, 64),
                (16, 64),
                (17, 64),
                (18, 64),
                (19, 64),
                (20, 64),
                (20, 256),
                (20, 1024),
                (20, 2048),
                (24, 64),
                (24, 256),
                (24, 512),
                (24, 1024),
                (24, 2048),
                (26, 512),
                (26, 1024),
                (26, 2048),
                (30, 512),
                (30, 1024),
                (30, 2048),
            ]
        )?;

        Ok(Self {
            max_depth,
            max_buffer_size,
            root,
            canopy: &body[tree_size..],
        })
    }

    /// Appends the upper proof levels cached in the canopy to `nodes`.
    pub fn complete_proof(
        &self,
        mut nodes: Vec<[u8; 32]>,
        index: u32,
    ) -> Result<Vec<[u8; 32]>> {
        // Out-of-range indexes and full proofs are left for verification to reject.
        if nodes.len() >= self.max_depth as usize || (index as u64) >> self.max_depth != 0 {
            return Ok(nodes);
        }
        fill_in_proof_from_canopy(self.canopy, self.max_depth, index, &mut nodes)
            .map_err(|_| error!(ErrorCode::InvalidCanopyState))?;
        Ok(nodes)
    }
}

/// Bubblegum-managed tree backed by an SPL account-compression account.
pub struct BubblegumTree<'a, 'info> {
    pub tree_authority: &'a AccountInfo<'info>,
    pub merkle_tree: &'a AccountInfo<'info>,
    pub leaf_owner: &'a AccountInfo<'info>,
    pub leaf_delegate: &'a AccountInfo<'info>,
    pub new_leaf_owner: &'a AccountInfo<'info>,
    pub log_wrapper: &'a AccountInfo<'info>,
    pub compression_program: &'a AccountInfo<'info>,
    pub bubblegum_program: &'a AccountInfo<'info>,
    pub system_program: &'a AccountInfo<'info>,
    /// Leaf-side proof nodes as accounts, possibly shortened by the canopy.
    pub proof_accounts: &'a [AccountInfo<'info>],
    /// Present when the current leaf owner is a PDA of this program.
    pub owner_seeds: Option<&'a [&'a [u8]]>,
}

impl<'a, 'info> BubblegumTree<'a, 'info> {
    fn with_state<R>(&self, f: impl FnOnce(&TreeState) -> Result<R>) -> Result<R> {
        require_keys_eq!(
            *self.merkle_tree.owner,
            spl_account_compression::ID,
            ErrorCode::InvalidTreeOwner
        );
        let data = self.merkle_tree.try_borrow_data()?;
        let state = TreeState::parse(&data)?;
        f(&state)
    }

    /// Proof nodes carried by the remaining accounts, leaf side first.
    pub fn proof_nodes(&self) -> Vec<[u8; 32]> {
        self.proof_accounts
            .iter()
            .map(|account| account.key().to_bytes())
            .collect()
    }
}

impl<'a, 'info> CompressionTree for BubblegumTree<'a, 'info> {
    fn tree_key(&self) -> Pubkey {
        self.merkle_tree.key()
    }

    fn max_depth(&self) -> Result<usize> {
        self.with_state(|state| Ok(state.max_depth as usize))
    }

    fn current_root(&self) -> Result<[u8; 32]> {
        self.with_state(|state| Ok(state.root))
    }

    fn proof_path(&self, nodes: Vec<[u8; 32]>, index: u32) -> Result<ProofPath> {
        self.with_state(|state| {
            let nodes = state.complete_proof(nodes, index)?;
            ProofPath::new(nodes, state.max_depth as usize)
        })
    }

    fn transfer_leaf(
        &mut self,
        leaf: &LeafContext,
        proof: &ProofPath,
        root: &[u8; 32],
        new_owner: &Pubkey,
    ) -> Result<[u8; 32]> {
        require_keys_eq!(self.leaf_owner.key(), leaf.owner, ErrorCode::NotAssetOwner);
        require_keys_eq!(self.new_leaf_owner.key(), *new_owner, ErrorCode::InvalidVault);
        // Bubblegum rebuilds the proof from these accounts and the canopy.
        require!(
            self.proof_accounts.len() <= proof.depth(),
            ErrorCode::MalformedProof
        );
        for (account, node) in self.proof_accounts.iter().zip(proof.nodes()) {
            require!(account.key().to_bytes() == *node, ErrorCode::MalformedProof);
        }

        let signed = self.owner_seeds.is_some();
        let remaining: Vec<(&AccountInfo<'info>, bool, bool)> = self
            .proof_accounts
            .iter()
            .map(|account| (account, false, false))
            .collect();

        let cpi = TransferCpi::new(
            self.bubblegum_program,
            TransferCpiAccounts {
                tree_config: self.tree_authority,
                leaf_owner: (self.leaf_owner, signed || self.leaf_owner.is_signer),
                leaf_delegate: (self.leaf_delegate, self.leaf_delegate.is_signer),
                new_leaf_owner: self.new_leaf_owner,
                merkle_tree: self.merkle_tree,
                log_wrapper: self.log_wrapper,
                compression_program: self.compression_program,
                system_program: self.system_program,
            },
            TransferInstructionArgs {
                root: *root,
                data_hash: leaf.data_hash,
                creator_hash: leaf.creator_hash,
                nonce: leaf.nonce,
                index: leaf.index,
            },
        );
        match self.owner_seeds {
            Some(seeds) => cpi.invoke_signed_with_remaining_accounts(&[seeds], &remaining)?,
            None => cpi.invoke_with_remaining_accounts(&remaining)?,
        }

        // The tree must now commit to the rewritten leaf along the same path.
        let new_leaf = compute_leaf_hash(&leaf.transferred_to(new_owner));
        let expected = recompute_root(new_leaf, proof, leaf.index);
        let new_root = self.current_root()?;
        require!(new_root == expected, ErrorCode::StaleProof);

        msg!(
            "Leaf transfer: tree={}, index={}, new_owner={}",
            self.merkle_tree.key(),
            leaf.index,
            new_owner
        );

        Ok(new_root)
    }
}
