use anchor_lang::prelude::*;

use super::constant::*;

#[account]
#[derive(InitSpace)]
pub struct VaultConfig {
    pub version: u8,
    pub authority_bump: u8, // 1 - fraction authority PDA bump
    pub bump: u8,           // 1 - config PDA bump
    pub reserve: [u8; 64], // reserve 64 bytes for this version. Update the limit according to your need.
}

/// One record per locked asset. Never mutated after creation.
#[account]
#[derive(InitSpace, PartialEq, Eq, Debug)]
pub struct VaultRecord {
    pub owner: Pubkey,
    pub asset_id: Pubkey,
    pub merkle_tree: Pubkey,
    pub fraction_mint: Pubkey,
    pub fraction_supply: u64,
    pub locked_at: i64,
    // Leaf fields needed to prove the asset again on unlock.
    pub data_hash: [u8; 32],
    pub creator_hash: [u8; 32],
    pub nonce: u64,
    pub leaf_index: u32,
    pub bump: u8,
}

impl VaultRecord {
    pub const LEN: usize = 8 + VaultRecord::INIT_SPACE;

    /// Deterministic record address for an asset.
    pub fn address(asset_id: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[VAULT_SEED, asset_id.as_ref()], &crate::ID)
    }
}
