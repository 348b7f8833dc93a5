use anchor_lang::prelude::*;

#[cfg(not(feature = "no-entrypoint"))]
solana_security_txt::security_txt! {
    name: "stake-ledger",
    project_url: "https://github.com/stake-ledger/stake-ledger",
    contacts: "email:security@stake-ledger.dev",
    policy: "https://github.com/stake-ledger/stake-ledger/blob/main/SECURITY.md",
    source_code: "https://github.com/stake-ledger/stake-ledger"
}

declare_id!("32FwNeehTjiEa2dUnAyBudRhPwAYXnmq7cw5kULBH2pT");

pub mod admin {
    use anchor_lang::prelude::declare_id;
    declare_id!("7ZzuDHm7QNtqXuud5LcFJTut9QVChxvw2F6BUVNHMXaT");
}

pub const AUTH_SEED: &str = "ledger_authority";
pub const ESCROW_VAULT_SEED: &str = "escrow_vault";
pub const REWARD_VAULT_SEED: &str = "reward_vault";

/// Fixed-point scale of every reward accumulator (10^27).
pub const SCALE: u128 = 1_000_000_000_000_000_000_000_000_000;

/// Capacity of the reward-stream arena. Every settle sweep is bounded by it.
pub const MAX_REWARD_STREAMS: usize = 16;
/// Capacity of the admin whitelist (base mint included).
pub const MAX_WHITELIST: usize = 8;
/// Largest unclaimed remainder, in raw token units, a stream may be removed with.
pub const MAX_REMOVAL_DUST: u64 = 100;

pub mod error;
pub mod instructions;
pub mod math;
pub mod states;
pub mod utils;

use instructions::*;

#[program]
pub mod stake_ledger {

    use super::*;

    pub fn initialise_ledger(
        ctx: Context<InitialiseLedger>,
        admin: Pubkey,
        treasury: Pubkey,
        window_duration: u64,
        max_reward_tokens: u64,
        voting_power_divisor: u64,
    ) -> Result<()> {
        instructions::initialise_ledger(
            ctx,
            admin,
            treasury,
            window_duration,
            max_reward_tokens,
            voting_power_divisor,
        )
    }

    pub fn update_config(ctx: Context<UpdateConfig>, param: u8, value: u64) -> Result<()> {
        instructions::update_config(ctx, param, value)
    }

    pub fn update_whitelist(ctx: Context<UpdateWhitelist>, add: bool) -> Result<()> {
        instructions::update_whitelist(ctx, add)
    }

    pub fn stake(ctx: Context<Stake>, amount: u64) -> Result<()> {
        instructions::stake(ctx, amount)
    }

    pub fn unstake(ctx: Context<Unstake>, amount: u64) -> Result<()> {
        instructions::unstake(ctx, amount)
    }

    pub fn credit_rewards(ctx: Context<CreditRewards>, amount: u64) -> Result<()> {
        instructions::credit_rewards(ctx, amount)
    }

    pub fn sync_rewards(ctx: Context<SyncRewards>) -> Result<()> {
        instructions::sync_rewards(ctx)
    }

    pub fn claim_rewards<'info>(
        ctx: Context<'_, '_, 'info, 'info, ClaimRewards<'info>>,
    ) -> Result<()> {
        instructions::claim_rewards(ctx)
    }

    pub fn remove_reward_stream(ctx: Context<RemoveRewardStream>) -> Result<()> {
        instructions::remove_reward_stream(ctx)
    }

    pub fn voting_power(ctx: Context<VotingPower>) -> Result<u128> {
        instructions::voting_power(ctx)
    }

    pub fn claimable_rewards(ctx: Context<ClaimableRewards>) -> Result<u64> {
        instructions::claimable_rewards(ctx)
    }
}
