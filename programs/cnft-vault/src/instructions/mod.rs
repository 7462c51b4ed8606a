pub mod accounts;
pub mod compression;
pub mod initialize;
pub mod issuance;
pub mod lock_cnft;
pub mod merkle;
pub mod metadata;
pub mod store;
pub mod unlock_cnft;
pub mod vault;

pub mod models;
pub mod util;

pub use accounts::*;
pub use initialize::*;
pub use lock_cnft::*;
pub use models::*;
pub use unlock_cnft::*;

pub mod constant {
    pub const CURRENT_VERSION: u8 = 1;

    pub const FRACTION_SUPPLY: u64 = 1_000;
    pub const FRACTION_DECIMALS: u8 = 0;

    // Deepest tree supported by SPL account compression.
    pub const MAX_TREE_DEPTH: usize = 30;

    pub const CONFIG_SEED: &[u8] = b"config";
    pub const AUTHORITY_SEED: &[u8] = b"authority";
    pub const VAULT_SEED: &[u8] = b"vault";
    pub const FRACTION_MINT_SEED: &[u8] = b"fraction";
}

pub mod errors {
    use anchor_lang::prelude::*;

    #[error_code]
    pub enum ErrorCode {
        #[msg("Merkle proof does not match the tree root")]
        ProofMismatch,
        #[msg("Proof path length does not match the tree depth")]
        MalformedProof,
        #[msg("Tree root changed since the proof was generated")]
        StaleProof,
        #[msg("Asset is already locked in a vault")]
        AlreadyLocked,
        #[msg("No vault exists for this asset")]
        NotFound,
        #[msg("Requester does not own the asset")]
        NotAssetOwner,
        #[msg("Requester must hold the entire fraction supply")]
        IncompleteFractionOwnership,
        #[msg("Mint authority is not the program authority")]
        MintAuthorityMismatch,
        #[msg("Fraction supply has already been issued")]
        SupplyAlreadyIssued,
        #[msg("Program is already initialized")]
        AlreadyInitialized,
        #[msg("Asset id does not match the tree and nonce")]
        InvalidAssetId,
        #[msg("Merkle tree must be owned by the compression program")]
        InvalidTreeOwner,
        #[msg("Invalid merkle tree account data")]
        InvalidTreeState,
        #[msg("Vault address does not match the asset")]
        InvalidVault,
        #[msg("Merkle tree does not match the vault")]
        InvalidTree,
        #[msg("Fraction mint does not belong to this vault")]
        InvalidFractionMint,
        #[msg("Token account not found")]
        TokenAccountNotFound,
        #[msg("Arithmetic overflow")]
        Overflow,
        #[msg("Metadata does not hash to the leaf's data or creator hash")]
        DataHashMismatch,
        #[msg("Merkle tree canopy is malformed")]
        InvalidCanopyState,
    }
}
