use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};
use spl_noop::ID as SPL_NOOP_ID;

use super::accounts::*;
use super::compression::BubblegumTree;
use super::constant::*;
use super::errors::ErrorCode;
use super::issuance::SplFractionLedger;
use super::models::*;
use super::store::AccountVaultStore;
use super::vault;

pub fn unlock_cnft<'info>(ctx: Context<'_, '_, 'info, 'info, UnlockCnft<'info>>) -> Result<()> {
    let authority = ProgramAuthority::from_bump(ctx.accounts.config.authority_bump)?;
    require_keys_eq!(
        authority.key,
        ctx.accounts.authority.key(),
        ErrorCode::MintAuthorityMismatch
    );

    let accounts = &mut *ctx.accounts;
    let requester = accounts.requester.to_account_info();
    let authority_info = accounts.authority.to_account_info();
    let vault_info = accounts.vault.to_account_info();
    let tree_authority = accounts.tree_authority.to_account_info();
    let merkle_tree = accounts.merkle_tree.to_account_info();
    let log_wrapper = accounts.log_wrapper.to_account_info();
    let compression_program = accounts.compression_program.to_account_info();
    let bubblegum_program = accounts.bubblegum_program.to_account_info();
    let token_program = accounts.token_program.to_account_info();
    let system_program = accounts.system_program.to_account_info();

    // The vault authority owns and delegates the leaf while it is locked.
    let seeds = authority.seeds();
    let mut tree = BubblegumTree {
        tree_authority: &tree_authority,
        merkle_tree: &merkle_tree,
        leaf_owner: &authority_info,
        leaf_delegate: &authority_info,
        new_leaf_owner: &requester,
        log_wrapper: &log_wrapper,
        compression_program: &compression_program,
        bubblegum_program: &bubblegum_program,
        system_program: &system_program,
        proof_accounts: ctx.remaining_accounts,
        owner_seeds: Some(&seeds[..]),
    };

    let request = UnlockRequest {
        requester: requester.key(),
        fraction_account: accounts.requester_fraction_account.key(),
        vault: vault_info.key(),
        proof_path: tree.proof_nodes(),
    };

    let mut ledger = SplFractionLedger {
        mint: &mut accounts.fraction_mint,
        holder: &mut accounts.requester_fraction_account,
        holder_authority: requester.clone(),
        mint_authority: authority_info.clone(),
        token_program,
    };
    let mut store = AccountVaultStore {
        vault: &vault_info,
        payer: &requester,
        system_program: &system_program,
        program_id: ctx.program_id,
    };

    vault::unlock(&authority, &mut tree, &mut ledger, &mut store, request)?;

    Ok(())
}

#[derive(Accounts)]
pub struct UnlockCnft<'info> {
    #[account(mut)]
    pub requester: Signer<'info>,

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
    /// CHECK: Vault record loaded by the record store; address checked against its asset id
    pub vault: UncheckedAccount<'info>,

    #[account(
        mut,
        seeds = [FRACTION_MINT_SEED, vault.key().as_ref()],
        bump
    )]
    pub fraction_mint: Account<'info, Mint>,

    #[account(
        mut,
        associated_token::mint = fraction_mint,
        associated_token::authority = requester,
    )]
    pub requester_fraction_account: Account<'info, TokenAccount>,

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
    pub system_program: Program<'info, System>,
}
