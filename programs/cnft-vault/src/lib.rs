use anchor_lang::prelude::*;

pub mod instructions;

declare_id!("91CLwQaCxutnTf8XafP3e6EmGBA3eUkMaw86Hgghax2L");

#[program]
pub mod cnft_vault {
    use super::*;
    pub use instructions::*;

    pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
        instructions::initialize(ctx)
    }

    pub fn lock_cnft<'info>(
        ctx: Context<'_, '_, 'info, 'info, LockCnft<'info>>,
        root: [u8; 32],
        data_hash: [u8; 32],
        creator_hash: [u8; 32],
        nonce: u64,
        index: u32,
        metadata: Option<Vec<u8>>,
    ) -> Result<()> {
        instructions::lock_cnft(ctx, root, data_hash, creator_hash, nonce, index, metadata)
    }

    pub fn unlock_cnft<'info>(
        ctx: Context<'_, '_, 'info, 'info, UnlockCnft<'info>>,
    ) -> Result<()> {
        instructions::unlock_cnft(ctx)
    }
}
