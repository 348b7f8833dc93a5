use crate::error::ErrorCode;
use crate::states::*;
use crate::utils::current_timestamp;
use anchor_lang::prelude::*;

/// Frees the registry slot of a finished reward stream.
///
/// Allowed once the window has elapsed, everything has vested and at most
/// `removal_dust` is left unclaimed. Whatever dust remains stays in the vault
/// and can be credited again with `sync_rewards` after re-registration.
#[derive(Accounts)]
pub struct RemoveRewardStream<'info> {
    #[account(
        constraint = (owner.key() == global_config.admin || owner.key() == crate::admin::id()) @ ErrorCode::InvalidOwner
    )]
    pub owner: Signer<'info>,

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

    /// CHECK: only the key is used to look up the stream.
    pub reward_mint: UncheckedAccount<'info>,
}

pub fn remove_reward_stream(ctx: Context<RemoveRewardStream>) -> Result<()> {
    let now = current_timestamp()?;
    let mint = ctx.accounts.reward_mint.key();
    let stake_pool = &mut ctx.accounts.stake_pool;
    let slot = stake_pool
        .find_stream(&mint)
        .ok_or(ErrorCode::StreamNotRegistered)?;

    let removed = stake_pool.remove_stream(&mint, now, ctx.accounts.global_config.removal_dust)?;
    msg!("Removed reward stream {} from slot {}", removed.stream_id, slot);

    emit!(RewardStreamRemoved {
        mint,
        stream_id: removed.stream_id,
        slot: slot as u8,
        total_claimed: removed.total_claimed,
        dust: removed.available_pool,
    });
    Ok(())
}
