use anchor_lang::prelude::*;
use anchor_lang::solana_program::program_option::COption;
use anchor_spl::token::{self, Burn, Mint, MintTo, TokenAccount};

use super::constant::*;
use super::errors::ErrorCode;
use super::models::ProgramAuthority;

/// Fungible-token ledger for one fraction mint.
pub trait FractionLedger {
    fn mint_key(&self) -> Pubkey;

    fn mint_authority(&self) -> Option<Pubkey>;

    fn decimals(&self) -> u8;

    fn supply(&self) -> u64;

    fn balance_of(&self, account: &Pubkey) -> Result<u64>;

    fn mint_to(&mut self, account: &Pubkey, amount: u64, authority: &ProgramAuthority)
        -> Result<()>;

    fn burn(&mut self, account: &Pubkey, amount: u64) -> Result<()>;
}

/// Mints the whole fraction supply to `to`. The mint must be controlled by `authority`
/// and have nothing outstanding.
pub fn mint_fixed_supply<L: FractionLedger>(
    ledger: &mut L,
    authority: &ProgramAuthority,
    to: &Pubkey,
) -> Result<()> {
    require!(
        ledger.mint_authority() == Some(authority.key),
        ErrorCode::MintAuthorityMismatch
    );
    require!(ledger.supply() == 0, ErrorCode::SupplyAlreadyIssued);

    ledger.mint_to(to, FRACTION_SUPPLY, authority)?;

    msg!(
        "Fractions minted: mint={}, to={}, amount={}",
        ledger.mint_key(),
        to,
        FRACTION_SUPPLY
    );
    Ok(())
}

/// Burns every outstanding fraction, all of which must sit in `from`.
pub fn burn_full_supply<L: FractionLedger>(ledger: &mut L, from: &Pubkey) -> Result<u64> {
    let supply = ledger.supply();
    let balance = ledger.balance_of(from)?;
    require!(
        supply > 0 && balance == supply,
        ErrorCode::IncompleteFractionOwnership
    );

    ledger.burn(from, supply)?;

    msg!(
        "Fractions burned: mint={}, from={}, amount={}",
        ledger.mint_key(),
        from,
        supply
    );
    Ok(supply)
}

/// SPL token mint plus the one holder account an instruction works with.
pub struct SplFractionLedger<'a, 'info> {
    pub mint: &'a mut Account<'info, Mint>,
    pub holder: &'a mut Account<'info, TokenAccount>,
    /// Owner of `holder`; signs burns.
    pub holder_authority: AccountInfo<'info>,
    /// Program authority PDA; signs mints.
    pub mint_authority: AccountInfo<'info>,
    pub token_program: AccountInfo<'info>,
}

impl<'a, 'info> SplFractionLedger<'a, 'info> {
    fn check_holder(&self, account: &Pubkey) -> Result<()> {
        require_keys_eq!(
            self.holder.key(),
            *account,
            ErrorCode::TokenAccountNotFound
        );
        require_keys_eq!(
            self.holder.mint,
            self.mint.key(),
            ErrorCode::InvalidFractionMint
        );
        Ok(())
    }
}

impl<'a, 'info> FractionLedger for SplFractionLedger<'a, 'info> {
    fn mint_key(&self) -> Pubkey {
        self.mint.key()
    }

    fn mint_authority(&self) -> Option<Pubkey> {
        match self.mint.mint_authority {
            COption::Some(key) => Some(key),
            COption::None => None,
        }
    }

    fn decimals(&self) -> u8 {
        self.mint.decimals
    }

    fn supply(&self) -> u64 {
        self.mint.supply
    }

    fn balance_of(&self, account: &Pubkey) -> Result<u64> {
        self.check_holder(account)?;
        Ok(self.holder.amount)
    }

    fn mint_to(
        &mut self,
        account: &Pubkey,
        amount: u64,
        authority: &ProgramAuthority,
    ) -> Result<()> {
        self.check_holder(account)?;
        require_keys_eq!(
            self.mint_authority.key(),
            authority.key,
            ErrorCode::MintAuthorityMismatch
        );

        let seeds = authority.seeds();
        let signer_seeds = &[&seeds[..]];

        let cpi_accounts = MintTo {
            mint: self.mint.to_account_info(),
            to: self.holder.to_account_info(),
            authority: self.mint_authority.clone(),
        };
        let cpi_ctx =
            CpiContext::new_with_signer(self.token_program.clone(), cpi_accounts, signer_seeds);
        token::mint_to(cpi_ctx, amount)?;

        self.mint.reload()?;
        self.holder.reload()?;
        Ok(())
    }

    fn burn(&mut self, account: &Pubkey, amount: u64) -> Result<()> {
        self.check_holder(account)?;

        let cpi_accounts = Burn {
            mint: self.mint.to_account_info(),
            from: self.holder.to_account_info(),
            authority: self.holder_authority.clone(),
        };
        let cpi_ctx = CpiContext::new(self.token_program.clone(), cpi_accounts);
        token::burn(cpi_ctx, amount)?;

        self.mint.reload()?;
        self.holder.reload()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MemoryLedger {
        mint: Pubkey,
        authority: Option<Pubkey>,
        supply: u64,
        balances: HashMap<Pubkey, u64>,
    }

    impl MemoryLedger {
        fn new(authority: Pubkey) -> Self {
            Self {
                mint: Pubkey::new_unique(),
                authority: Some(authority),
                supply: 0,
                balances: HashMap::new(),
            }
        }
    }

    impl FractionLedger for MemoryLedger {
        fn mint_key(&self) -> Pubkey {
            self.mint
        }
        fn mint_authority(&self) -> Option<Pubkey> {
            self.authority
        }
        fn decimals(&self) -> u8 {
            FRACTION_DECIMALS
        }
        fn supply(&self) -> u64 {
            self.supply
        }
        fn balance_of(&self, account: &Pubkey) -> Result<u64> {
            Ok(*self.balances.get(account).unwrap_or(&0))
        }
        fn mint_to(&mut self, account: &Pubkey, amount: u64, _: &ProgramAuthority) -> Result<()> {
            *self.balances.entry(*account).or_insert(0) += amount;
            self.supply += amount;
            Ok(())
        }
        fn burn(&mut self, account: &Pubkey, amount: u64) -> Result<()> {
            *self.balances.entry(*account).or_insert(0) -= amount;
            self.supply -= amount;
            Ok(())
        }
    }

    fn code_of<T: std::fmt::Debug>(result: Result<T>) -> u32 {
        match result.unwrap_err() {
            anchor_lang::error::Error::AnchorError(e) => e.error_code_number,
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn mints_exactly_the_fixed_supply() {
        let authority = ProgramAuthority::derive();
        let mut ledger = MemoryLedger::new(authority.key);
        let holder = Pubkey::new_unique();

        mint_fixed_supply(&mut ledger, &authority, &holder).unwrap();

        assert_eq!(ledger.supply(), FRACTION_SUPPLY);
        assert_eq!(ledger.balance_of(&holder).unwrap(), 1_000);
        assert_eq!(ledger.decimals(), 0);
    }

    #[test]
    fn refuses_foreign_mint_authority() {
        let authority = ProgramAuthority::derive();
        let mut ledger = MemoryLedger::new(Pubkey::new_unique());
        let result = mint_fixed_supply(&mut ledger, &authority, &Pubkey::new_unique());
        assert_eq!(code_of(result), u32::from(ErrorCode::MintAuthorityMismatch));

        ledger.authority = None;
        let result = mint_fixed_supply(&mut ledger, &authority, &Pubkey::new_unique());
        assert_eq!(code_of(result), u32::from(ErrorCode::MintAuthorityMismatch));
        assert_eq!(ledger.supply(), 0);
    }

    #[test]
    fn refuses_to_issue_twice() {
        let authority = ProgramAuthority::derive();
        let mut ledger = MemoryLedger::new(authority.key);
        let holder = Pubkey::new_unique();
        mint_fixed_supply(&mut ledger, &authority, &holder).unwrap();

        let result = mint_fixed_supply(&mut ledger, &authority, &holder);
        assert_eq!(code_of(result), u32::from(ErrorCode::SupplyAlreadyIssued));
        assert_eq!(ledger.supply(), FRACTION_SUPPLY);
    }

    #[test]
    fn burn_requires_the_whole_supply() {
        let authority = ProgramAuthority::derive();
        let mut ledger = MemoryLedger::new(authority.key);
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();
        mint_fixed_supply(&mut ledger, &authority, &alice).unwrap();

        // Alice sells one fraction.
        ledger.burn(&alice, 1).unwrap();
        ledger.mint_to(&bob, 1, &authority).unwrap();

        let result = burn_full_supply(&mut ledger, &alice);
        assert_eq!(
            code_of(result),
            u32::from(ErrorCode::IncompleteFractionOwnership)
        );
        let result = burn_full_supply(&mut ledger, &bob);
        assert_eq!(
            code_of(result),
            u32::from(ErrorCode::IncompleteFractionOwnership)
        );

        // Bob sells it back.
        ledger.burn(&bob, 1).unwrap();
        ledger.mint_to(&alice, 1, &authority).unwrap();

        assert_eq!(burn_full_supply(&mut ledger, &alice).unwrap(), FRACTION_SUPPLY);
        assert_eq!(ledger.supply(), 0);
        assert_eq!(ledger.balance_of(&alice).unwrap(), 0);
    }

    #[test]
    fn nothing_to_burn_on_empty_mint() {
        let authority = ProgramAuthority::derive();
        let mut ledger = MemoryLedger::new(authority.key);
        let result = burn_full_supply(&mut ledger, &Pubkey::new_unique());
        assert_eq!(
            code_of(result),
            u32::from(ErrorCode::IncompleteFractionOwnership)
        );
    }
}
