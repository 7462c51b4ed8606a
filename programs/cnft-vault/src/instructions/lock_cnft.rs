use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token::{Mint, Token, TokenAccount};
use spl_noop::ID as SPL_NOOP_ID;

use super::accounts::*;
use super::compression::BubblegumTree;
use super::constant::*;
use super::errors::ErrorCode;
use super::issuance::SplFractionLedger;
use super::models::*;
use super::store::AccountVaultStore;
use super::util::get_asset_id;
use super::vault;

#[allow(clippy::too_many_arguments)]
pub fn lock_cnft<'info>(
    ctx: Context<'_, '_, 'info, 'info, LockCnft<'info>>,
    root: [u8; 32],
    data_hash: [u8; 32],
    creator_hash: [u8; 32],
    nonce: u64,
    index: u32,
    metadata: Option<Vec<u8>>,
) -> Result<()> {
    let authority = ProgramAuthority::from_bump(ctx.accounts.config.authority_bump)?;
    require_keys_eq!(
        authority.key,
        ctx.accounts.authority.key(),
        ErrorCode::MintAuthorityMismatch
    );

    let accounts = &mut *ctx.accounts;
    let owner = accounts.owner.to_account_info();
    let authority_info = accounts.authority.to_account_info();
    let vault_info = accounts.vault.to_account_info();
    let leaf_owner = accounts.leaf_owner.to_account_info();
    let leaf_delegate = accounts.leaf_delegate.to_account_info();
    let tree_authority = accounts.tree_authority.to_account_info();
    let merkle_tree = accounts.merkle_tree.to_account_info();
    let log_wrapper = accounts.log_wrapper.to_account_info();
    let compression_program = accounts.compression_program.to_account_info();
    let bubblegum_program = accounts.bubblegum_program.to_account_info();
    let token_program = accounts.token_program.to_account_info();
    let system_program = accounts.system_program.to_account_info();

    let mut tree = BubblegumTree {
        tree_authority: &tree_authority,
        merkle_tree: &merkle_tree,
        leaf_owner: &leaf_owner,
        leaf_delegate: &leaf_delegate,
        new_leaf_owner: &authority_info,
        log_wrapper: &log_wrapper,
        compression_program: &compression_program,
        bubblegum_program: &bubblegum_program,
        system_program: &system_program,
        proof_accounts: ctx.remaining_accounts,
        owner_seeds: None,
    };

    let request = LockRequest {
        requester: owner.key(),
        fraction_account: accounts.owner_fraction_account.key(),
        asset_id: get_asset_id(&merkle_tree.key(), nonce),
        leaf_owner: leaf_owner.key(),
        leaf_delegate: leaf_delegate.key(),
        root,
        data_hash,
        creator_hash,
        nonce,
        index,
        proof_path: tree.proof_nodes(),
        metadata,
        now: Clock::get()?.unix_timestamp,
    };

    let mut ledger = SplFractionLedger {
        mint: &mut accounts.fraction_mint,
        holder: &mut accounts.owner_fraction_account,
        holder_authority: owner.clone(),
        mint_authority: authority_info.clone(),
        token_program,
    };
    let mut store = AccountVaultStore {
        vault: &vault_info,
        payer: &owner,
        system_program: &system_program,
        program_id: ctx.program_id,
    };

    vault::lock(&authority, &mut tree, &mut ledger, &mut store, request)?;

    Ok(())
}

#[derive(Accounts)]
pub struct LockCnft<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump
    )]
    pub config: Account<'info, VaultConfig>,

    #[account(
        seeds = [AUTHORITY_SEED],
        bump = config.authority_bump
    )]
    /// CHECK: Program authority PDA verified by seeds
    pub authority: UncheckedAccount<'info>,

    #[account(mut)]
    /// CHECK: Vault record PDA for the asset at (merkle_tree, nonce); the record store checks the
    /// address and fails AlreadyLocked if a record exists
    pub vault: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = owner,
        seeds = [FRACTION_MINT_SEED, vault.key().as_ref()],
        bump,
        mint::decimals = FRACTION_DECIMALS,
        mint::authority = authority,
        mint::freeze_authority = authority,
    )]
    pub fraction_mint: Account<'info, Mint>,

    #[account(
        init_if_needed,
        payer = owner,
        associated_token::mint = fraction_mint,
        associated_token::authority = owner,
    )]
    pub owner_fraction_account: Account<'info, TokenAccount>,

    /// CHECK: Leaf owner committed to by the proof; must be `owner`
    pub leaf_owner: UncheckedAccount<'info>,

    /// CHECK: Leaf delegate committed to by the proof
    pub leaf_delegate: UncheckedAccount<'info>,

    #[account(
        seeds = [merkle_tree.key().as_ref()],
        seeds::program = mpl_bubblegum::ID,
        bump
    )]
    /// CHECK: Bubblegum tree config verified by seeds
    pub tree_authority: UncheckedAccount<'info>,

    #[account(mut)]
    /// CHECK: Owner and layout verified when the root is read
    pub merkle_tree: UncheckedAccount<'info>,

    #[account(address = SPL_NOOP_ID)]
    /// CHECK: SPL noop program verified by address
    pub log_wrapper: UncheckedAccount<'info>,

    #[account(address = spl_account_compression::ID)]
    /// CHECK: SPL account compression program verified by address
    pub compression_program: UncheckedAccount<'info>,

    #[account(address = mpl_bubblegum::ID)]
    /// CHECK: Bubblegum program verified by address
    pub bubblegum_program: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}
