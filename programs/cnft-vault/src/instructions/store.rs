use anchor_lang::prelude::*;
use anchor_lang::Discriminator;

use super::accounts::VaultRecord;
use super::constant::*;
use super::errors::ErrorCode;
use super::util::{close_account, create_pda_account, is_initialized};

/// Vault records keyed by their derived address.
pub trait VaultStore {
    /// Fails `AlreadyLocked` if a record already lives at `key`.
    fn create(&mut self, key: &Pubkey, record: &VaultRecord) -> Result<()>;

    /// Fails `NotFound` if no record lives at `key`.
    fn load(&self, key: &Pubkey) -> Result<VaultRecord>;

    /// Removes the record and refunds its deposit to `recipient`.
    fn destroy(&mut self, key: &Pubkey, recipient: &Pubkey) -> Result<()>;
}

/// Record store over a single PDA account supplied to the instruction.
pub struct AccountVaultStore<'a, 'info> {
    pub vault: &'a AccountInfo<'info>,
    pub payer: &'a AccountInfo<'info>,
    pub system_program: &'a AccountInfo<'info>,
    pub program_id: &'a Pubkey,
}

impl<'a, 'info> AccountVaultStore<'a, 'info> {
    fn check_key(&self, key: &Pubkey) -> Result<()> {
        require_keys_eq!(self.vault.key(), *key, ErrorCode::InvalidVault);
        Ok(())
    }
}

impl<'a, 'info> VaultStore for AccountVaultStore<'a, 'info> {
    fn create(&mut self, key: &Pubkey, record: &VaultRecord) -> Result<()> {
        self.check_key(key)?;

        let seeds: &[&[u8]] = &[VAULT_SEED, record.asset_id.as_ref(), &[record.bump]];
        create_pda_account(
            self.vault,
            self.payer,
            self.system_program,
            self.program_id,
            VaultRecord::LEN,
            seeds,
            ErrorCode::AlreadyLocked,
        )?;

        let mut data = self.vault.try_borrow_mut_data()?;
        let mut writer: &mut [u8] = &mut data;
        record.try_serialize(&mut writer)?;

        Ok(())
    }

    fn load(&self, key: &Pubkey) -> Result<VaultRecord> {
        self.check_key(key)?;
        require!(
            is_initialized(self.vault, self.program_id),
            ErrorCode::NotFound
        );

        let data = self.vault.try_borrow_data()?;
        require!(
            data.starts_with(VaultRecord::DISCRIMINATOR),
            ErrorCode::NotFound
        );
        VaultRecord::try_deserialize(&mut &data[..])
    }

    fn destroy(&mut self, key: &Pubkey, recipient: &Pubkey) -> Result<()> {
        self.load(key)?;
        require_keys_eq!(self.payer.key(), *recipient, ErrorCode::InvalidVault);

        let refunded = close_account(self.vault, self.payer)?;
        msg!("Vault closed: vault={}, refunded={}", key, refunded);

        Ok(())
    }
}
