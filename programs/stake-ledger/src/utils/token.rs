use crate::error::ErrorCode;
use anchor_lang::{prelude::*, solana_program::program_option::COption};
use anchor_spl::token_2022::{
    self,
    spl_token_2022::{
        self,
        extension::{non_transferable::NonTransferable, BaseStateWithExtensions, StateWithExtensions},
    },
};

/// Moves `amount` from a user-owned token account into a program vault.
#[allow(clippy::too_many_arguments)]
pub fn transfer_from_user_to_pool_vault<'a>(
    authority: AccountInfo<'a>,
    from: AccountInfo<'a>,
    to_vault: AccountInfo<'a>,
    mint: AccountInfo<'a>,
    token_program: AccountInfo<'a>,
    amount: u64,
    mint_decimals: u8,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    token_2022::transfer_checked(
        CpiContext::new(
            token_program,
            token_2022::TransferChecked {
                from,
                to: to_vault,
                authority,
                mint,
            },
        ),
        amount,
        mint_decimals,
    )
}

/// Moves `amount` out of a program vault; the vault authority PDA signs.
#[allow(clippy::too_many_arguments)]
pub fn transfer_from_pool_vault_to_user<'a>(
    authority: AccountInfo<'a>,
    from_vault: AccountInfo<'a>,
    to: AccountInfo<'a>,
    mint: AccountInfo<'a>,
    token_program: AccountInfo<'a>,
    amount: u64,
    mint_decimals: u8,
    signer_seeds: &[&[&[u8]]],
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    token_2022::transfer_checked(
        CpiContext::new_with_signer(
            token_program,
            token_2022::TransferChecked {
                from: from_vault,
                to,
                authority,
                mint,
            },
            signer_seeds,
        ),
        amount,
        mint_decimals,
    )
}

/// Issues receipt tokens; the ledger authority PDA is the mint authority.
pub fn token_mint_to<'a>(
    authority: AccountInfo<'a>,
    token_program: AccountInfo<'a>,
    mint: AccountInfo<'a>,
    destination: AccountInfo<'a>,
    amount: u64,
    signer_seeds: &[&[&[u8]]],
) -> Result<()> {
    token_2022::mint_to(
        CpiContext::new_with_signer(
            token_program,
            token_2022::MintTo {
                to: destination,
                authority,
                mint,
            },
            signer_seeds,
        ),
        amount,
    )
}

/// Retires receipt tokens held by `from`; the holder signs.
pub fn token_burn<'a>(
    authority: AccountInfo<'a>,
    token_program: AccountInfo<'a>,
    mint: AccountInfo<'a>,
    from: AccountInfo<'a>,
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }
    token_2022::burn(
        CpiContext::new(
            token_program,
            token_2022::Burn {
                from,
                authority,
                mint,
            },
        ),
        amount,
    )
}

/// Checks that `mint_info` can serve as the staking receipt.
///
/// It must be a Token-2022 mint with the `NonTransferable` extension, be
/// controlled by the ledger authority, have no supply yet and use the same
/// decimals as the base asset.
pub fn validate_receipt_mint(
    mint_info: &AccountInfo,
    authority: &Pubkey,
    base_decimals: u8,
) -> Result<()> {
    require_keys_eq!(
        *mint_info.owner,
        spl_token_2022::id(),
        ErrorCode::InvalidReceiptMint
    );
    let data = mint_info.try_borrow_data()?;
    let mint = StateWithExtensions::<spl_token_2022::state::Mint>::unpack(&data)
        .map_err(|_| error!(ErrorCode::InvalidReceiptMint))?;
    mint.get_extension::<NonTransferable>()
        .map_err(|_| error!(ErrorCode::InvalidReceiptMint))?;

    require!(
        mint.base.mint_authority == COption::Some(*authority),
        ErrorCode::InvalidReceiptMint
    );
    require!(mint.base.freeze_authority.is_none(), ErrorCode::InvalidReceiptMint);
    require_eq!(mint.base.supply, 0, ErrorCode::ReceiptSupplyMismatch);
    require_eq!(mint.base.decimals, base_decimals, ErrorCode::InvalidReceiptMint);
    Ok(())
}
