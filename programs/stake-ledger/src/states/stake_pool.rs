use super::reward_stream::{RewardStream, WindowReset};
use crate::error::ErrorCode;
use crate::{MAX_REMOVAL_DUST, MAX_REWARD_STREAMS};
use anchor_lang::prelude::*;

//
// ──────────────────────────────────────────────────────────────────────────────
// StakePool Account: totals and the reward-stream registry
// ──────────────────────────────────────────────────────────────────────────────
//

/// PDA seed string used to derive the pool account.
pub const STAKE_POOL_SEED: &str = "stake_pool";

/// Ledger-wide totals plus a fixed arena of reward streams.
///
/// A reward mint maps to the slot it was registered in. Slots are freed by
/// `remove_stream` and may be reused; every registration receives a fresh
/// `stream_id` so position entries recorded against an older occupant of the
/// slot are recognised as stale.
#[account]
#[derive(Default, Debug)]
pub struct StakePool {
    /// PDA bump for this account.
    pub bump: u8,

    /// Sum of all position balances.
    pub total_staked: u64,

    /// Principal the escrow vault must hold. Always equal to `total_staked`.
    pub escrow_balance: u64,

    /// Id handed to the next registered stream. Starts at 1.
    pub next_stream_id: u64,

    /// Timestamp of the last ledger-mutating instruction.
    pub last_update_timestamp: u64,

    /// Reward stream slots.
    pub reward_streams: [RewardStream; MAX_REWARD_STREAMS],
}

/// What `StakePool::credit` did to the registry and the stream window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CreditOutcome {
    pub index: usize,
    pub newly_registered: bool,
    pub reset: WindowReset,
}

impl StakePool {
    /// Fixed serialized size of the account (for allocation at initialization).
    ///
    /// Breakdown:
    /// - 8: account discriminator
    /// - 1: bump
    /// - 8 * 4: total_staked, escrow_balance, next_stream_id, last_update_timestamp
    /// - RewardStream::LEN * MAX_REWARD_STREAMS: reward_streams
    pub const LEN: usize = 8 + 1 + 8 * 4 + RewardStream::LEN * MAX_REWARD_STREAMS;

    /// Brings every registered stream current. Bounded by the arena size.
    pub fn settle_all(&mut self, now: u64) -> Result<()> {
        let total_staked = self.total_staked;
        for stream in self.reward_streams.iter_mut().filter(|s| s.registered) {
            stream.settle(now, total_staked)?;
        }
        self.last_update_timestamp = self.last_update_timestamp.max(now);
        Ok(())
    }

    /// Shifts every unfinished window past the interval in which nobody was staked.
    ///
    /// Only meaningful while `total_staked == 0`, right before the first new stake.
    pub fn resume_streams(&mut self, now: u64) -> Result<()> {
        if self.total_staked > 0 {
            return Ok(());
        }
        for stream in self.reward_streams.iter_mut().filter(|s| s.registered) {
            stream.resume(now)?;
        }
        Ok(())
    }

    pub fn find_stream(&self, mint: &Pubkey) -> Option<usize> {
        self.reward_streams
            .iter()
            .position(|s| s.registered && s.mint == *mint)
    }

    pub fn registered_streams(&self) -> impl Iterator<Item = (usize, &RewardStream)> {
        self.reward_streams
            .iter()
            .enumerate()
            .filter(|(_, s)| s.registered)
    }

    pub fn non_whitelisted_count(&self) -> u64 {
        self.reward_streams
            .iter()
            .filter(|s| s.registered && !s.whitelisted)
            .count() as u64
    }

    /// Places a new stream for `mint` in the first free slot.
    pub fn register_stream(
        &mut self,
        mint: Pubkey,
        vault: Pubkey,
        whitelisted: bool,
        max_non_whitelisted: u64,
        now: u64,
    ) -> Result<usize> {
        require!(self.find_stream(&mint).is_none(), ErrorCode::InvalidRewardMint);
        if !whitelisted {
            require!(
                self.non_whitelisted_count() < max_non_whitelisted,
                ErrorCode::RegistryFull
            );
        }
        let index = self
            .reward_streams
            .iter()
            .position(|s| !s.registered)
            .ok_or(ErrorCode::RegistryFull)?;

        let stream_id = self.next_stream_id.max(1);
        self.next_stream_id = stream_id.checked_add(1).ok_or(ErrorCode::MathOverflow)?;
        self.reward_streams[index] = RewardStream::new(stream_id, mint, vault, whitelisted, now);
        Ok(index)
    }

    /// Vault balance of `mint` not yet committed to its stream.
    pub fn unaccounted(&self, mint: &Pubkey, vault_balance: u64) -> Result<u64> {
        let accounted = match self.find_stream(mint) {
            Some(index) => self.reward_streams[index].accounted()?,
            None => 0,
        };
        Ok(vault_balance.saturating_sub(accounted))
    }

    /// Unprivileged syncs may only restart a window that has ended.
    pub fn check_sync_allowed(&self, mint: &Pubkey, now: u64, privileged: bool) -> Result<()> {
        if privileged {
            return Ok(());
        }
        if let Some(index) = self.find_stream(mint) {
            require_gte!(
                now,
                self.reward_streams[index].stream_end,
                ErrorCode::WindowStillOpen
            );
        }
        Ok(())
    }

    /// Folds `amount` of `mint` into a fresh vesting window starting at `now`.
    ///
    /// `vault_balance` is the vault balance after the funds arrived; `amount`
    /// must be covered by the part of it not already owed to the stream.
    #[allow(clippy::too_many_arguments)]
    pub fn credit(
        &mut self,
        mint: Pubkey,
        vault: Pubkey,
        amount: u64,
        vault_balance: u64,
        whitelisted: bool,
        max_non_whitelisted: u64,
        window_duration: u64,
        now: u64,
    ) -> Result<CreditOutcome> {
        require_gt!(amount, 0, ErrorCode::ZeroAmount);
        require_gte!(
            self.unaccounted(&mint, vault_balance)?,
            amount,
            ErrorCode::InsufficientRewardBalance
        );

        let (index, newly_registered) = match self.find_stream(&mint) {
            Some(index) => (index, false),
            None => (
                self.register_stream(mint, vault, whitelisted, max_non_whitelisted, now)?,
                true,
            ),
        };

        let total_staked = self.total_staked;
        let stream = &mut self.reward_streams[index];
        require_keys_eq!(stream.vault, vault, ErrorCode::InvalidVault);
        stream.whitelisted = whitelisted;
        stream.settle(now, total_staked)?;
        let reset = stream.reseed(now, amount, window_duration)?;
        self.last_update_timestamp = self.last_update_timestamp.max(now);

        Ok(CreditOutcome {
            index,
            newly_registered,
            reset,
        })
    }

    pub fn record_stake(&mut self, amount: u64) -> Result<()> {
        self.total_staked = self
            .total_staked
            .checked_add(amount)
            .ok_or(ErrorCode::MathOverflow)?;
        self.escrow_balance = self
            .escrow_balance
            .checked_add(amount)
            .ok_or(ErrorCode::MathOverflow)?;
        Ok(())
    }

    pub fn record_unstake(&mut self, amount: u64) -> Result<()> {
        require_gte!(self.escrow_balance, amount, ErrorCode::InsufficientEscrow);
        require_gte!(self.total_staked, amount, ErrorCode::InsufficientBalance);
        self.total_staked -= amount;
        self.escrow_balance -= amount;
        Ok(())
    }

    /// Escrow bookkeeping must match the stake, the vault must cover it and
    /// receipts can never outnumber it.
    ///
    /// Holders may burn their own receipts, so the supply is only bounded from above.
    pub fn check_conservation(&self, receipt_supply: u64, escrow_vault_amount: u64) -> Result<()> {
        require_eq!(self.escrow_balance, self.total_staked, ErrorCode::InsufficientEscrow);
        require_gte!(self.total_staked, receipt_supply, ErrorCode::ReceiptSupplyMismatch);
        require_gte!(escrow_vault_amount, self.escrow_balance, ErrorCode::InsufficientEscrow);
        Ok(())
    }

    /// Mirrors a whitelist change onto the registered stream of `mint`, if any.
    pub fn set_whitelisted(&mut self, mint: &Pubkey, whitelisted: bool) {
        if let Some(index) = self.find_stream(mint) {
            self.reward_streams[index].whitelisted = whitelisted;
        }
    }

    /// Frees the slot of a fully vested, drained stream and returns its final state.
    ///
    /// Claim entries of the removed stream go stale, so `dust` is clamped to
    /// `MAX_REMOVAL_DUST` whatever the configuration says.
    pub fn remove_stream(&mut self, mint: &Pubkey, now: u64, dust: u64) -> Result<RewardStream> {
        let dust = dust.min(MAX_REMOVAL_DUST);
        let index = self
            .find_stream(mint)
            .ok_or(ErrorCode::StreamNotRegistered)?;
        let total_staked = self.total_staked;
        let stream = &mut self.reward_streams[index];
        stream.settle(now, total_staked)?;
        require!(stream.is_removable(now, dust), ErrorCode::StreamStillActive);

        let removed = *stream;
        *stream = RewardStream::default();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::assert_error_code;

    const T0: u64 = 1_700_000_000;
    const WINDOW: u64 = 10;

    fn pool() -> StakePool {
        StakePool {
            next_stream_id: 1,
            ..Default::default()
        }
    }

    fn credit(pool: &mut StakePool, mint: Pubkey, amount: u64, balance: u64, now: u64) -> Result<CreditOutcome> {
        pool.credit(mint, Pubkey::new_unique(), amount, balance, false, 4, WINDOW, now)
    }

    #[test]
    fn first_credit_registers_and_opens_window() {
        let mut pool = pool();
        let mint = Pubkey::new_unique();
        let vault = Pubkey::new_unique();
        let outcome = pool
            .credit(mint, vault, 1000, 1000, false, 4, WINDOW, T0)
            .unwrap();
        assert!(outcome.newly_registered);
        assert_eq!(outcome.reset.carried_remainder, 0);
        assert_eq!(outcome.reset.new_original, 1000);

        let stream = &pool.reward_streams[outcome.index];
        assert_eq!(stream.stream_id, 1);
        assert_eq!(stream.vault, vault);
        assert_eq!((stream.stream_start, stream.stream_end), (T0, T0 + WINDOW));
        assert_eq!(pool.next_stream_id, 2);
    }

    #[test]
    fn credit_needs_unaccounted_vault_balance() {
        let mut pool = pool();
        let mint = Pubkey::new_unique();
        let vault = Pubkey::new_unique();
        assert_error_code(
            pool.credit(mint, vault, 0, 10, false, 4, WINDOW, T0).unwrap_err(),
            ErrorCode::ZeroAmount,
        );
        assert_error_code(
            pool.credit(mint, vault, 11, 10, false, 4, WINDOW, T0).unwrap_err(),
            ErrorCode::InsufficientRewardBalance,
        );
        assert!(pool.find_stream(&mint).is_none());

        pool.credit(mint, vault, 10, 10, false, 4, WINDOW, T0).unwrap();
        // the same 10 tokens cannot be credited twice
        assert_error_code(
            pool.credit(mint, vault, 10, 10, false, 4, WINDOW, T0 + 1).unwrap_err(),
            ErrorCode::InsufficientRewardBalance,
        );
        assert_eq!(pool.unaccounted(&mint, 25).unwrap(), 15);
    }

    #[test]
    fn credit_rejects_foreign_vault() {
        let mut pool = pool();
        let mint = Pubkey::new_unique();
        pool.credit(mint, Pubkey::new_unique(), 10, 10, false, 4, WINDOW, T0)
            .unwrap();
        assert_error_code(
            pool.credit(mint, Pubkey::new_unique(), 10, 20, false, 4, WINDOW, T0)
                .unwrap_err(),
            ErrorCode::InvalidVault,
        );
    }

    #[test]
    fn registry_caps_non_whitelisted_streams() {
        let mut pool = pool();
        pool.credit(Pubkey::new_unique(), Pubkey::new_unique(), 1, 1, false, 1, WINDOW, T0)
            .unwrap();
        assert_error_code(
            pool.credit(Pubkey::new_unique(), Pubkey::new_unique(), 1, 1, false, 1, WINDOW, T0)
                .unwrap_err(),
            ErrorCode::RegistryFull,
        );
        // whitelisted mints are exempt from the cap
        pool.credit(Pubkey::new_unique(), Pubkey::new_unique(), 1, 1, true, 1, WINDOW, T0)
            .unwrap();
        assert_eq!(pool.non_whitelisted_count(), 1);
        assert_eq!(pool.registered_streams().count(), 2);
    }

    #[test]
    fn arena_capacity_is_hard_limit() {
        let mut pool = pool();
        for _ in 0..MAX_REWARD_STREAMS {
            pool.credit(Pubkey::new_unique(), Pubkey::new_unique(), 1, 1, true, 0, WINDOW, T0)
                .unwrap();
        }
        assert_error_code(
            pool.credit(Pubkey::new_unique(), Pubkey::new_unique(), 1, 1, true, 0, WINDOW, T0)
                .unwrap_err(),
            ErrorCode::RegistryFull,
        );
    }

    #[test]
    fn crediting_one_mint_leaves_other_windows_alone() {
        let mut pool = pool();
        pool.record_stake(100).unwrap();
        let first = Pubkey::new_unique();
        let second = Pubkey::new_unique();
        let a = credit(&mut pool, first, 1000, 1000, T0).unwrap().index;
        let before = pool.reward_streams[a];

        credit(&mut pool, second, 500, 500, T0 + 4).unwrap();
        assert_eq!(pool.reward_streams[a].stream_start, before.stream_start);
        assert_eq!(pool.reward_streams[a].stream_end, before.stream_end);
        assert_eq!(pool.reward_streams[a].original_amount, 1000);

        pool.settle_all(T0 + 10).unwrap();
        assert_eq!(pool.reward_streams[a].total_vested, 1000);
    }

    #[test]
    fn mid_window_credit_folds_remainder() {
        let mut pool = pool();
        pool.record_stake(1000).unwrap();
        let mint = Pubkey::new_unique();
        let vault = Pubkey::new_unique();
        pool.credit(mint, vault, 1000, 1000, false, 4, WINDOW, T0).unwrap();
        let outcome = pool
            .credit(mint, vault, 500, 1500, false, 4, WINDOW, T0 + 3)
            .unwrap();
        assert!(!outcome.newly_registered);
        assert_eq!(outcome.reset.carried_remainder, 700);
        assert_eq!(outcome.reset.new_original, 1200);
        assert_eq!(outcome.reset.new_start, T0 + 3);
        assert_eq!(pool.reward_streams[outcome.index].available_pool, 300);
    }

    #[test]
    fn idle_pool_does_not_vest_until_stake_returns() {
        let mut pool = pool();
        let mint = Pubkey::new_unique();
        let index = credit(&mut pool, mint, 1000, 1000, T0).unwrap().index;

        pool.settle_all(T0 + 100).unwrap();
        assert_eq!(pool.reward_streams[index].total_vested, 0);

        pool.resume_streams(T0 + 100).unwrap();
        pool.record_stake(10).unwrap();
        assert_eq!(pool.reward_streams[index].stream_start, T0 + 100);

        pool.settle_all(T0 + 105).unwrap();
        assert_eq!(pool.reward_streams[index].total_vested, 500);
    }

    #[test]
    fn unstake_cannot_exceed_escrow() {
        let mut pool = pool();
        pool.record_stake(50).unwrap();
        assert_error_code(pool.record_unstake(51).unwrap_err(), ErrorCode::InsufficientEscrow);
        pool.record_unstake(50).unwrap();
        assert_eq!((pool.total_staked, pool.escrow_balance), (0, 0));
    }

    #[test]
    fn conservation_check() {
        let mut pool = pool();
        pool.record_stake(70).unwrap();
        pool.check_conservation(70, 70).unwrap();
        pool.check_conservation(70, 90).unwrap();
        // receipts burned by their holder
        pool.check_conservation(69, 70).unwrap();
        assert_error_code(
            pool.check_conservation(71, 70).unwrap_err(),
            ErrorCode::ReceiptSupplyMismatch,
        );
        assert_error_code(
            pool.check_conservation(70, 69).unwrap_err(),
            ErrorCode::InsufficientEscrow,
        );
    }

    #[test]
    fn removed_slot_is_reused_with_new_id() {
        let mut pool = pool();
        pool.record_stake(1).unwrap();
        let mint = Pubkey::new_unique();
        let index = credit(&mut pool, mint, 10, 10, T0).unwrap().index;

        assert_error_code(
            pool.remove_stream(&mint, T0 + 5, 0).unwrap_err(),
            ErrorCode::StreamStillActive,
        );
        pool.settle_all(T0 + WINDOW).unwrap();
        pool.reward_streams[index].record_claim(10).unwrap();

        let removed = pool.remove_stream(&mint, T0 + WINDOW, 0).unwrap();
        assert_eq!(removed.total_claimed, 10);
        assert!(pool.find_stream(&mint).is_none());
        assert_error_code(
            pool.remove_stream(&mint, T0 + WINDOW, 0).unwrap_err(),
            ErrorCode::StreamNotRegistered,
        );

        let again = credit(&mut pool, mint, 5, 5, T0 + 20).unwrap();
        assert_eq!(again.index, index);
        assert_eq!(pool.reward_streams[index].stream_id, 2);
        assert_eq!(pool.reward_streams[index].accumulator_per_share, 0);
    }

    #[test]
    fn removal_never_drops_more_than_capped_dust() {
        let mut pool = pool();
        pool.record_stake(1).unwrap();
        let mint = Pubkey::new_unique();
        let index = credit(&mut pool, mint, 1_000, 1_000, T0).unwrap().index;
        pool.settle_all(T0 + WINDOW).unwrap();
        pool.reward_streams[index].record_claim(1_000 - MAX_REMOVAL_DUST - 1).unwrap();

        // an oversized tolerance does not let unclaimed rewards be erased
        assert_error_code(
            pool.remove_stream(&mint, T0 + WINDOW, u64::MAX).unwrap_err(),
            ErrorCode::StreamStillActive,
        );
        pool.reward_streams[index].record_claim(1).unwrap();
        let removed = pool.remove_stream(&mint, T0 + WINDOW, u64::MAX).unwrap();
        assert_eq!(removed.available_pool, MAX_REMOVAL_DUST);
    }

    #[test]
    fn open_window_only_restarts_for_privileged_sync() {
        let mut pool = pool();
        pool.record_stake(10).unwrap();
        let mint = Pubkey::new_unique();
        credit(&mut pool, mint, 1_000, 1_000, T0).unwrap();

        assert_error_code(
            pool.check_sync_allowed(&mint, T0 + WINDOW - 1, false).unwrap_err(),
            ErrorCode::WindowStillOpen,
        );
        pool.check_sync_allowed(&mint, T0 + WINDOW - 1, true).unwrap();
        pool.check_sync_allowed(&mint, T0 + WINDOW, false).unwrap();
        // never-registered mints have no window to protect
        pool.check_sync_allowed(&Pubkey::new_unique(), T0, false).unwrap();
    }

    #[test]
    fn whitelist_flag_follows_config() {
        let mut pool = pool();
        let mint = Pubkey::new_unique();
        let index = credit(&mut pool, mint, 1, 1, T0).unwrap().index;
        pool.set_whitelisted(&mint, true);
        assert!(pool.reward_streams[index].whitelisted);
        assert_eq!(pool.non_whitelisted_count(), 0);
    }
}
