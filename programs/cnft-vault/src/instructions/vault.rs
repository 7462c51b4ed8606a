use anchor_lang::prelude::*;

use super::accounts::VaultRecord;
use super::compression::CompressionTree;
use super::constant::*;
use super::errors::ErrorCode;
use super::issuance::{burn_full_supply, mint_fixed_supply, FractionLedger};
use super::merkle::{compute_leaf_hash, verify_proof};
use super::metadata::{check_metadata, decode_metadata};
use super::models::*;
use super::store::VaultStore;
use super::util::get_asset_id;

/// Accepts a proof that folds to `current_root`. A proof that only folds to an older
/// `claimed_root` is stale rather than wrong.
pub fn check_proof(
    leaf: &LeafContext,
    proof: &ProofPath,
    claimed_root: &[u8; 32],
    current_root: &[u8; 32],
) -> Result<()> {
    let leaf_hash = compute_leaf_hash(leaf);
    if verify_proof(leaf_hash, proof, leaf.index, current_root) {
        return Ok(());
    }
    if claimed_root != current_root && verify_proof(leaf_hash, proof, leaf.index, claimed_root) {
        return err!(ErrorCode::StaleProof);
    }
    err!(ErrorCode::ProofMismatch)
}

/// Takes custody of a compressed asset and issues its fractions to the requester.
pub fn lock<T, L, S>(
    authority: &ProgramAuthority,
    tree: &mut T,
    ledger: &mut L,
    store: &mut S,
    request: LockRequest,
) -> Result<VaultRecord>
where
    T: CompressionTree,
    L: FractionLedger,
    S: VaultStore,
{
    let tree_key = tree.tree_key();
    require_keys_eq!(
        get_asset_id(&tree_key, request.nonce),
        request.asset_id,
        ErrorCode::InvalidAssetId
    );
    if let Some(bytes) = request.metadata.as_deref() {
        let metadata = decode_metadata(bytes)?;
        check_metadata(&metadata, &request.data_hash, &request.creator_hash)?;
    }
    let proof = tree.proof_path(request.proof_path, request.index)?;

    let current_root = tree.current_root()?;
    let leaf = LeafContext {
        asset_id: request.asset_id,
        owner: request.leaf_owner,
        delegate: request.leaf_delegate,
        nonce: request.nonce,
        index: request.index,
        data_hash: request.data_hash,
        creator_hash: request.creator_hash,
    };
    check_proof(&leaf, &proof, &request.root, &current_root)?;
    require_keys_eq!(leaf.owner, request.requester, ErrorCode::NotAssetOwner);

    let (vault_key, bump) = VaultRecord::address(&request.asset_id);
    let record = VaultRecord {
        owner: request.requester,
        asset_id: request.asset_id,
        merkle_tree: tree_key,
        fraction_mint: ledger.mint_key(),
        fraction_supply: FRACTION_SUPPLY,
        locked_at: request.now,
        data_hash: request.data_hash,
        creator_hash: request.creator_hash,
        nonce: request.nonce,
        leaf_index: request.index,
        bump,
    };
    store.create(&vault_key, &record)?;

    tree.transfer_leaf(&leaf, &proof, &current_root, &authority.key)?;
    mint_fixed_supply(ledger, authority, &request.fraction_account)?;

    msg!(
        "cNFT locked: vault={}, asset_id={}, owner={}, tree={}, index={}, fractions={}",
        vault_key,
        record.asset_id,
        record.owner,
        record.merkle_tree,
        record.leaf_index,
        record.fraction_supply
    );

    Ok(record)
}

/// Burns the full fraction supply and returns the asset to the requester.
pub fn unlock<T, L, S>(
    authority: &ProgramAuthority,
    tree: &mut T,
    ledger: &mut L,
    store: &mut S,
    request: UnlockRequest,
) -> Result<VaultRecord>
where
    T: CompressionTree,
    L: FractionLedger,
    S: VaultStore,
{
    let record = store.load(&request.vault)?;
    require_keys_eq!(
        VaultRecord::address(&record.asset_id).0,
        request.vault,
        ErrorCode::InvalidVault
    );
    require_keys_eq!(record.merkle_tree, tree.tree_key(), ErrorCode::InvalidTree);
    require_keys_eq!(
        record.fraction_mint,
        ledger.mint_key(),
        ErrorCode::InvalidFractionMint
    );
    let proof = tree.proof_path(request.proof_path, record.leaf_index)?;

    // Whoever holds every fraction may unlock, not only the original locker.
    let burned = burn_full_supply(ledger, &request.fraction_account)?;

    let current_root = tree.current_root()?;
    let leaf = LeafContext {
        asset_id: record.asset_id,
        owner: authority.key,
        delegate: authority.key,
        nonce: record.nonce,
        index: record.leaf_index,
        data_hash: record.data_hash,
        creator_hash: record.creator_hash,
    };
    check_proof(&leaf, &proof, &current_root, &current_root)?;
    tree.transfer_leaf(&leaf, &proof, &current_root, &request.requester)?;

    store.destroy(&request.vault, &request.requester)?;

    msg!(
        "cNFT unlocked: vault={}, asset_id={}, recipient={}, burned={}",
        request.vault,
        record.asset_id,
        request.requester,
        burned
    );

    Ok(record)
}
