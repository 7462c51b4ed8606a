use anchor_lang::prelude::*;
use borsh0_10::BorshDeserialize;
use mpl_bubblegum::hash::{hash_creators, hash_metadata};
use mpl_bubblegum::types::MetadataArgs;

use super::errors::ErrorCode;

/// Decodes Borsh-encoded Bubblegum `MetadataArgs`.
pub fn decode_metadata(bytes: &[u8]) -> Result<MetadataArgs> {
    MetadataArgs::try_from_slice(bytes).map_err(|_| error!(ErrorCode::DataHashMismatch))
}

/// The leaf commits to `data_hash` and `creator_hash`; `metadata` must reproduce both.
pub fn check_metadata(
    metadata: &MetadataArgs,
    data_hash: &[u8; 32],
    creator_hash: &[u8; 32],
) -> Result<()> {
    let computed = hash_metadata(metadata).map_err(|_| error!(ErrorCode::DataHashMismatch))?;
    require!(computed == *data_hash, ErrorCode::DataHashMismatch);
    require!(
        hash_creators(&metadata.creators) == *creator_hash,
        ErrorCode::DataHashMismatch
    );
    Ok(())
}
