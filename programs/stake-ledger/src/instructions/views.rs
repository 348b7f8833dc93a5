use crate::states::*;
use crate::utils::current_timestamp;
use anchor_lang::prelude::*;

//
// ──────────────────────────────────────────────────────────────────────────────
// Read-only views (results are returned through return data)
// ──────────────────────────────────────────────────────────────────────────────
//

#[derive(Accounts)]
pub struct VotingPower<'info> {
    #[account(
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump,
    )]
    pub global_config: Box<Account<'info, GlobalConfig>>,

    pub stake_position: Box<Account<'info, StakePosition>>,
}

/// `balance * seconds_held / voting_power_divisor` of the given position.
pub fn voting_power(ctx: Context<VotingPower>) -> Result<u128> {
    let now = current_timestamp()?;
    Ok(ctx
        .accounts
        .stake_position
        .voting_power(now, ctx.accounts.global_config.voting_power_divisor))
}

#[derive(Accounts)]
pub struct ClaimableRewards<'info> {
    #[account(
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump,
    )]
    pub global_config: Box<Account<'info, GlobalConfig>>,

    #[account(address = global_config.stake_pool)]
    pub stake_pool: Box<Account<'info, StakePool>>,

    pub stake_position: Box<Account<'info, StakePosition>>,

    /// CHECK: only the key is used to look up the stream.
    pub reward_mint: UncheckedAccount<'info>,
}

/// What `claim_rewards` would pay the position for `reward_mint` right now,
/// assuming the vested pool covers it. Unregistered mints report zero.
pub fn claimable_rewards(ctx: Context<ClaimableRewards>) -> Result<u64> {
    let now = current_timestamp()?;
    let stake_pool = &ctx.accounts.stake_pool;
    let Some(index) = stake_pool.find_stream(&ctx.accounts.reward_mint.key()) else {
        return Ok(0);
    };

    // settle a copy; the view never writes
    let mut stream = stake_pool.reward_streams[index];
    stream.settle(now, stake_pool.total_staked)?;
    ctx.accounts.stake_position.claimable(index, &stream)
}
