use super::credit_rewards::apply_credit;
use crate::error::ErrorCode;
use crate::states::*;
use crate::utils::current_timestamp;
use crate::REWARD_VAULT_SEED;
use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

/// Credit whatever sits in a reward vault beyond what its stream already accounts for.
///
/// Permissionless: covers rewards pushed straight into the vault by an
/// external collaborator. The vault must already exist, so only mints that
/// were credited through `credit_rewards` at least once can be synced.
///
/// Every sync reopens a full window over the unvested remainder, so callers
/// other than the treasury or admin must wait for the current window to end.
#[derive(Accounts)]
pub struct SyncRewards<'info> {
    pub caller: Signer<'info>,

    #[account(
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump,
    )]
    pub global_config: Box<Account<'info, GlobalConfig>>,

    #[account(
        mut,
        address = global_config.stake_pool,
    )]
    pub stake_pool: Box<Account<'info, StakePool>>,

    #[account(mint::token_program = token_program)]
    pub reward_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        seeds = [
            REWARD_VAULT_SEED.as_bytes(),
            reward_mint.key().as_ref()
        ],
        bump,
        token::mint = reward_mint,
        token::token_program = token_program,
    )]
    pub reward_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

pub fn sync_rewards(ctx: Context<SyncRewards>) -> Result<()> {
    let now = current_timestamp()?;
    let stake_pool = &mut ctx.accounts.stake_pool;
    stake_pool.settle_all(now)?;

    let mint = ctx.accounts.reward_mint.key();
    let caller = ctx.accounts.caller.key();
    let privileged =
        ctx.accounts.global_config.is_authorized_funder(&caller) || caller == crate::admin::id();
    stake_pool.check_sync_allowed(&mint, now, privileged)?;

    let vault_balance = ctx.accounts.reward_vault.amount;
    let unaccounted = stake_pool.unaccounted(&mint, vault_balance)?;
    require_gt!(unaccounted, 0, ErrorCode::NothingToCredit);

    apply_credit(
        &ctx.accounts.global_config,
        stake_pool,
        mint,
        ctx.accounts.reward_vault.key(),
        vault_balance,
        unaccounted,
        caller,
        now,
    )
}
