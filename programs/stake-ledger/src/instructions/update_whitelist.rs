use crate::error::ErrorCode;
use crate::states::*;
use anchor_lang::prelude::*;
use anchor_spl::token_interface::Mint;

/// Adds or removes a reward mint from the whitelist.
///
/// Whitelisted mints do not count against `max_reward_tokens`. The flag is
/// mirrored onto the mint's stream right away when it is already registered.
#[derive(Accounts)]
pub struct UpdateWhitelist<'info> {
    #[account(
        constraint = (owner.key() == global_config.admin || owner.key() == crate::admin::id()) @ ErrorCode::InvalidOwner
    )]
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump,
    )]
    pub global_config: Box<Account<'info, GlobalConfig>>,

    #[account(
        mut,
        address = global_config.stake_pool,
    )]
    pub stake_pool: Box<Account<'info, StakePool>>,

    /// Mint being listed or delisted.
    pub mint: Box<InterfaceAccount<'info, Mint>>,
}

pub fn update_whitelist(ctx: Context<UpdateWhitelist>, add: bool) -> Result<()> {
    let global_config = &mut ctx.accounts.global_config;
    let mint = ctx.accounts.mint.key();

    if add {
        global_config.add_to_whitelist(mint)?;
    } else {
        global_config.remove_from_whitelist(mint)?;
    }
    ctx.accounts.stake_pool.set_whitelisted(&mint, add);
    msg!("Whitelist {}: {}", if add { "add" } else { "remove" }, mint);

    emit!(WhitelistUpdated {
        mint,
        whitelisted: add,
        whitelist_len: global_config.whitelist_len,
    });
    Ok(())
}
