use anchor_lang::prelude::*;

//
// ──────────────────────────────────────────────────────────────────────────────
// Events: emitted for off-chain indexers to reconcile ledger state
// ──────────────────────────────────────────────────────────────────────────────
//

/// Emitted once when the ledger is initialized.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct LedgerInitialized {
    pub admin: Pubkey,
    pub treasury: Pubkey,
    /// Staked asset.
    pub base_mint: Pubkey,
    /// Non-transferable receipt mint.
    pub receipt_mint: Pubkey,
    pub escrow_vault: Pubkey,
    pub stake_pool: Pubkey,
    pub window_duration: u64,
    pub max_reward_tokens: u64,
    pub voting_power_divisor: u64,
}

/// Emitted whenever `update_config` changes a parameter.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct ConfigUpdated {
    /// Selector that was applied.
    pub param: u8,
    pub admin: Pubkey,
    pub treasury: Pubkey,
    pub window_duration: u64,
    pub max_reward_tokens: u64,
    pub voting_power_divisor: u64,
    pub removal_dust: u64,
}

/// Emitted when a mint enters or leaves the whitelist.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct WhitelistUpdated {
    pub mint: Pubkey,
    pub whitelisted: bool,
    /// Whitelist size after the change.
    pub whitelist_len: u8,
}

/// Emitted after a deposit of base tokens into escrow.
///
/// Amounts are the measured escrow delta; balances and start times are
/// reported before and after so indexers can replay voting power.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct Staked {
    pub owner: Pubkey,
    pub amount: u64,
    pub balance_before: u64,
    pub balance_after: u64,
    pub stake_start_before: u64,
    pub stake_start_after: u64,
    pub total_staked: u64,
}

/// Emitted after a withdrawal of base tokens from escrow.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct Unstaked {
    pub owner: Pubkey,
    pub destination: Pubkey,
    pub amount: u64,
    pub balance_before: u64,
    pub balance_after: u64,
    pub stake_start_before: u64,
    pub stake_start_after: u64,
    pub total_staked: u64,
}

/// Emitted the first time a reward mint is credited (or after it was removed and comes back).
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct RewardStreamRegistered {
    pub mint: Pubkey,
    pub vault: Pubkey,
    pub stream_id: u64,
    pub slot: u8,
    pub whitelisted: bool,
}

/// Emitted on every credit. Carries the replaced window and the new one.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct RewardsCredited {
    pub mint: Pubkey,
    pub stream_id: u64,
    /// Funder (treasury or admin), or the caller of `sync_rewards`.
    pub funder: Pubkey,
    /// Amount newly added to the stream.
    pub amount: u64,
    pub previous_start: u64,
    pub previous_end: u64,
    pub previous_original: u64,
    /// Unvested part of the previous window folded into the new one.
    pub carried_remainder: u64,
    pub new_start: u64,
    pub new_end: u64,
    pub new_original: u64,
    /// Vested but unclaimed rewards after the credit.
    pub available_pool: u64,
}

/// Emitted for every reward asset paid out by `claim_rewards`.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct RewardsClaimed {
    pub owner: Pubkey,
    pub mint: Pubkey,
    pub destination: Pubkey,
    pub owed: u64,
    pub paid: u64,
    /// Vested pool left after the payout.
    pub available_pool: u64,
}

/// Emitted when the vested pool could not cover what an account was owed.
///
/// The unpaid part stays with the account as `pending_carry`.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct RewardShortfall {
    pub owner: Pubkey,
    pub mint: Pubkey,
    pub owed: u64,
    pub paid: u64,
    pub carried: u64,
}

/// Emitted when a drained stream leaves the registry.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct RewardStreamRemoved {
    pub mint: Pubkey,
    pub stream_id: u64,
    pub slot: u8,
    pub total_claimed: u64,
    /// Unclaimed remainder abandoned with the stream (at most the configured dust).
    pub dust: u64,
}
