use crate::error::ErrorCode;
use crate::math::{accumulator_increment, mul_div_floor, to_u64};
use anchor_lang::prelude::*;

//
// ──────────────────────────────────────────────────────────────────────────────
// RewardStream: one linear vesting window per reward mint
// ──────────────────────────────────────────────────────────────────────────────
//

/// Vesting state of a single reward asset.
///
/// Each credit opens a fresh window `[stream_start, stream_end)` seeded with
/// `original_amount`. Settlement always recomputes the vested total from
/// `original_amount` and the elapsed time, so the result does not depend on
/// how often the stream is settled.
///
/// Streams live in a fixed slot of `StakePool::reward_streams` and never share
/// window fields with one another.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RewardStream {
    /// Unique id of this registration. Claim entries are tagged with it.
    pub stream_id: u64,

    /// Reward mint.
    pub mint: Pubkey,

    /// Program-owned vault holding this mint's reward liquidity.
    pub vault: Pubkey,

    /// Start of the current window (unix seconds).
    pub stream_start: u64,

    /// End of the current window (unix seconds).
    pub stream_end: u64,

    /// Amount the current window was seeded with. Fixed until the next credit.
    pub original_amount: u64,

    /// Portion of `original_amount` vested so far. Never exceeds it.
    pub total_vested: u64,

    /// Cumulative reward per staked unit, scaled by `SCALE`.
    pub accumulator_per_share: u128,

    /// Timestamp the stream was last brought current.
    pub last_settled: u64,

    /// Vested rewards not yet paid out.
    pub available_pool: u64,

    /// Lifetime amount paid to claimants.
    pub total_claimed: u64,

    /// Exempt from the non-whitelisted registry cap.
    pub whitelisted: bool,

    /// Slot is occupied.
    pub registered: bool,
}

/// Window bounds before and after a credit, reported in `RewardsCredited`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowReset {
    pub previous_start: u64,
    pub previous_end: u64,
    pub previous_original: u64,
    pub carried_remainder: u64,
    pub new_start: u64,
    pub new_end: u64,
    pub new_original: u64,
}

impl RewardStream {
    /// Breakdown:
    /// - 8: stream_id
    /// - 32 * 2: mint, vault
    /// - 8 * 4: stream_start, stream_end, original_amount, total_vested
    /// - 16: accumulator_per_share
    /// - 8 * 3: last_settled, available_pool, total_claimed
    /// - 1 * 2: whitelisted, registered
    pub const LEN: usize = 8 + 32 * 2 + 8 * 4 + 16 + 8 * 3 + 1 * 2;

    pub fn new(stream_id: u64, mint: Pubkey, vault: Pubkey, whitelisted: bool, now: u64) -> Self {
        Self {
            stream_id,
            mint,
            vault,
            stream_start: now,
            stream_end: now,
            last_settled: now,
            whitelisted,
            registered: true,
            ..Default::default()
        }
    }

    /// Part of the current window that has not vested yet.
    pub fn unvested(&self) -> Result<u64> {
        self.original_amount
            .checked_sub(self.total_vested)
            .ok_or_else(|| error!(ErrorCode::MathOverflow))
    }

    /// Vault balance already committed to this stream (vested pool plus unvested remainder).
    pub fn accounted(&self) -> Result<u64> {
        self.available_pool
            .checked_add(self.unvested()?)
            .ok_or_else(|| error!(ErrorCode::MathOverflow))
    }

    /// Total of `original_amount` that should have vested by `now`.
    ///
    /// `floor(original_amount * elapsed / duration)` with `elapsed` clamped to the window.
    pub fn vested_at(&self, now: u64) -> Result<u64> {
        if self.original_amount == 0 {
            return Ok(0);
        }
        let duration = self.stream_end.saturating_sub(self.stream_start);
        require!(duration > 0, ErrorCode::StreamNotSettleable);
        let elapsed = now.min(self.stream_end).saturating_sub(self.stream_start);
        let vested = mul_div_floor(
            u128::from(self.original_amount),
            u128::from(elapsed),
            u128::from(duration),
        )
        .and_then(to_u64)
        .ok_or(ErrorCode::MathOverflow)?;
        Ok(vested)
    }

    /// Brings the stream current and returns the amount newly vested.
    ///
    /// Does nothing while `total_staked == 0`: neither `total_vested` nor
    /// `last_settled` move, so the idle interval can be skipped on resume.
    pub fn settle(&mut self, now: u64, total_staked: u64) -> Result<u64> {
        if total_staked == 0 {
            return Ok(0);
        }
        let vested_by_now = self.vested_at(now)?;
        let newly_vested = vested_by_now.saturating_sub(self.total_vested);
        if newly_vested > 0 {
            let increment = accumulator_increment(newly_vested, total_staked)
                .ok_or(ErrorCode::MathOverflow)?;
            self.accumulator_per_share = self
                .accumulator_per_share
                .checked_add(increment)
                .ok_or(ErrorCode::MathOverflow)?;
            self.total_vested = vested_by_now;
            self.available_pool = self
                .available_pool
                .checked_add(newly_vested)
                .ok_or(ErrorCode::MathOverflow)?;
        }
        self.last_settled = self.last_settled.max(now);
        Ok(newly_vested)
    }

    /// Shifts an unfinished window forward by the time nobody was staked.
    ///
    /// Called when stake returns to a pool whose total was zero. The vested
    /// fraction is unchanged because start, end and `last_settled` all move
    /// by the same offset.
    pub fn resume(&mut self, now: u64) -> Result<()> {
        if !self.registered || now <= self.last_settled {
            return Ok(());
        }
        if self.last_settled < self.stream_end {
            let paused = now - self.last_settled;
            self.stream_start = self
                .stream_start
                .checked_add(paused)
                .ok_or(ErrorCode::MathOverflow)?;
            self.stream_end = self
                .stream_end
                .checked_add(paused)
                .ok_or(ErrorCode::MathOverflow)?;
        }
        self.last_settled = now;
        Ok(())
    }

    /// Opens a new window at `now` seeded with the unvested remainder plus `amount`.
    ///
    /// The stream must already be settled to `now`.
    pub fn reseed(&mut self, now: u64, amount: u64, window_duration: u64) -> Result<WindowReset> {
        require_gt!(amount, 0, ErrorCode::ZeroAmount);
        require_gt!(window_duration, 0, ErrorCode::StreamNotSettleable);

        let carried_remainder = self.unvested()?;
        let new_original = carried_remainder
            .checked_add(amount)
            .ok_or(ErrorCode::MathOverflow)?;
        let new_end = now
            .checked_add(window_duration)
            .ok_or(ErrorCode::MathOverflow)?;

        let reset = WindowReset {
            previous_start: self.stream_start,
            previous_end: self.stream_end,
            previous_original: self.original_amount,
            carried_remainder,
            new_start: now,
            new_end,
            new_original,
        };

        self.stream_start = now;
        self.stream_end = new_end;
        self.original_amount = new_original;
        self.total_vested = 0;
        self.last_settled = now;
        Ok(reset)
    }

    /// Removes a payout from the vested pool.
    pub fn record_claim(&mut self, paid: u64) -> Result<()> {
        self.available_pool = self
            .available_pool
            .checked_sub(paid)
            .ok_or(ErrorCode::MathOverflow)?;
        self.total_claimed = self
            .total_claimed
            .checked_add(paid)
            .ok_or(ErrorCode::MathOverflow)?;
        Ok(())
    }

    /// Window elapsed, everything vested and at most `dust` left unclaimed.
    pub fn is_removable(&self, now: u64, dust: u64) -> bool {
        self.registered
            && now >= self.stream_end
            && self.total_vested == self.original_amount
            && self.available_pool <= dust
    }
}
