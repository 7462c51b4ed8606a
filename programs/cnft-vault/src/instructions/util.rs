use anchor_lang::prelude::*;
use anchor_lang::system_program::{self, Allocate, Assign, CreateAccount, Transfer};

use super::errors::ErrorCode;

pub use mpl_bubblegum::utils::get_asset_id;

/// True once `account` has been created and handed to `program_id`.
pub fn is_initialized(account: &AccountInfo, program_id: &Pubkey) -> bool {
    account.owner == program_id && !account.data_is_empty()
}

/// Creates a program-owned PDA, funding rent from `payer`.
/// Fails with `exists` if the address already holds program data.
pub fn create_pda_account<'info>(
    account: &AccountInfo<'info>,
    payer: &AccountInfo<'info>,
    system: &AccountInfo<'info>,
    program_id: &Pubkey,
    space: usize,
    signer_seeds: &[&[u8]],
    exists: ErrorCode,
) -> Result<()> {
    if is_initialized(account, program_id) {
        return Err(exists.into());
    }

    let rent = Rent::get()?.minimum_balance(space);
    let current = account.lamports();

    if current == 0 {
        system_program::create_account(
            CpiContext::new_with_signer(
                system.clone(),
                CreateAccount {
                    from: payer.clone(),
                    to: account.clone(),
                },
                &[signer_seeds],
            ),
            rent,
            space as u64,
            program_id,
        )?;
        return Ok(());
    }

    // Someone pre-funded the address; top up and claim it instead.
    let shortfall = rent.saturating_sub(current);
    if shortfall > 0 {
        system_program::transfer(
            CpiContext::new(
                system.clone(),
                Transfer {
                    from: payer.clone(),
                    to: account.clone(),
                },
            ),
            shortfall,
        )?;
    }
    system_program::allocate(
        CpiContext::new_with_signer(
            system.clone(),
            Allocate {
                account_to_allocate: account.clone(),
            },
            &[signer_seeds],
        ),
        space as u64,
    )?;
    system_program::assign(
        CpiContext::new_with_signer(
            system.clone(),
            Assign {
                account_to_assign: account.clone(),
            },
            &[signer_seeds],
        ),
        program_id,
    )?;

    Ok(())
}

/// Drains `account` into `recipient` and hands it back to the system program.
pub fn close_account<'info>(
    account: &AccountInfo<'info>,
    recipient: &AccountInfo<'info>,
) -> Result<u64> {
    let lamports = account.lamports();
    let refunded = recipient
        .lamports()
        .checked_add(lamports)
        .ok_or(ErrorCode::Overflow)?;

    **recipient.try_borrow_mut_lamports()? = refunded;
    **account.try_borrow_mut_lamports()? = 0;

    account.assign(&system_program::ID);
    account.resize(0)?;

    Ok(lamports)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_id_depends_on_tree_and_nonce() {
        let tree = Pubkey::new_from_array([3u8; 32]);
        let other = Pubkey::new_from_array([4u8; 32]);
        assert_eq!(get_asset_id(&tree, 1), get_asset_id(&tree, 1));
        assert_ne!(get_asset_id(&tree, 1), get_asset_id(&tree, 2));
        assert_ne!(get_asset_id(&tree, 1), get_asset_id(&other, 1));

        let (expected, _) = Pubkey::find_program_address(
            &[b"asset", tree.as_ref(), &7u64.to_le_bytes()],
            &mpl_bubblegum::ID,
        );
        assert_eq!(get_asset_id(&tree, 7), expected);
    }

    #[test]
    fn uninitialized_account_is_not_program_owned() {
        let key = Pubkey::new_unique();
        let mut lamports = 0u64;
        let mut data = vec![];
        let system_owner = system_program::ID;
        let info = AccountInfo::new(
            &key,
            false,
            true,
            &mut lamports,
            &mut data,
            &system_owner,
            false,
            0,
        );
        assert!(!is_initialized(&info, &crate::ID));

        let mut lamports = 1u64;
        let mut data = vec![0u8; 8];
        let program_owner = crate::ID;
        let info = AccountInfo::new(
            &key,
            false,
            true,
            &mut lamports,
            &mut data,
            &program_owner,
            false,
            0,
        );
        assert!(is_initialized(&info, &crate::ID));
    }
}
