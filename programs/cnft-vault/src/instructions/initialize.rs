use anchor_lang::prelude::*;

use super::accounts::*;
use super::constant::*;
use super::errors::ErrorCode;
use super::util::create_pda_account;

pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
    let config_info = ctx.accounts.config.to_account_info();
    let config_bump = ctx.bumps.config;

    create_pda_account(
        &config_info,
        &ctx.accounts.payer.to_account_info(),
        &ctx.accounts.system_program.to_account_info(),
        ctx.program_id,
        8 + VaultConfig::INIT_SPACE,
        &[CONFIG_SEED, &[config_bump]],
        ErrorCode::AlreadyInitialized,
    )?;

    let config = VaultConfig {
        version: CURRENT_VERSION,
        authority_bump: ctx.bumps.authority,
        bump: config_bump,
        reserve: [0u8; 64],
    };

    let mut data = config_info.try_borrow_mut_data()?;
    let mut writer: &mut [u8] = &mut data;
    config.try_serialize(&mut writer)?;

    msg!(
        "Vault program initialized: config={}, authority={}, version={}",
        config_info.key(),
        ctx.accounts.authority.key(),
        config.version
    );

    Ok(())
}

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump
    )]
    /// CHECK: Created in the handler; a second initialize fails with AlreadyInitialized
    pub config: UncheckedAccount<'info>,

    #[account(
        seeds = [AUTHORITY_SEED],
        bump
    )]
    /// CHECK: Program authority PDA; holds locked leaves and mints fractions
    pub authority: UncheckedAccount<'info>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
}
