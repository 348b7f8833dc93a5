use super::claim_state::{ClaimOutcome, ClaimState};
use super::reward_stream::RewardStream;
use super::voting_clock::{self, InstantDeposit};
use crate::error::ErrorCode;
use crate::MAX_REWARD_STREAMS;
use anchor_lang::prelude::*;

//
// ──────────────────────────────────────────────────────────────────────────────
// StakePosition Account
// ──────────────────────────────────────────────────────────────────────────────
//

/// PDA seed string used to derive each owner's position account.
pub const STAKE_POSITION_SEED: &str = "stake_position";

/// Staked balance, voting clock and reward claims of a single owner.
///
/// Derived from `STAKE_POSITION_SEED + owner`. Created on the first stake and
/// never closed; an exited position keeps `staked_balance == 0` and
/// `stake_start_time == 0` but may still hold `pending_carry` to claim.
///
/// `claims[i]` belongs to `StakePool::reward_streams[i]` while its
/// `stream_id` matches the stream in that slot.
#[account]
#[derive(Default, Debug)]
pub struct StakePosition {
    /// PDA bump for this account.
    pub bump: u8,

    /// Owner (staker) to whom this record belongs.
    pub owner: Pubkey,

    /// Base tokens currently staked.
    pub staked_balance: u64,

    /// Weighted-average stake start (unix seconds); zero iff nothing is staked.
    pub stake_start_time: u64,

    /// Deposits made in the current second, reversible by a same-second unstake.
    pub instant_deposit: InstantDeposit,

    /// Reward bookkeeping, one entry per stream slot.
    pub claims: [ClaimState; MAX_REWARD_STREAMS],
}

impl StakePosition {
    /// Fixed serialized size of the account (for allocation at initialization).
    ///
    /// Breakdown:
    /// - 8: account discriminator
    /// - 1: bump
    /// - 32: owner pubkey
    /// - 8 * 2: staked_balance, stake_start_time
    /// - InstantDeposit::LEN: instant_deposit
    /// - ClaimState::LEN * MAX_REWARD_STREAMS: claims
    pub const LEN: usize =
        8 + 1 + 32 + 8 * 2 + InstantDeposit::LEN + ClaimState::LEN * MAX_REWARD_STREAMS;

    pub fn voting_power(&self, now: u64, divisor: u64) -> u128 {
        voting_clock::voting_power(self.staked_balance, self.stake_start_time, now, divisor)
    }

    /// Records a deposit. Streams must already be settled to `now`.
    pub fn apply_stake(
        &mut self,
        streams: &[RewardStream; MAX_REWARD_STREAMS],
        amount: u64,
        now: u64,
    ) -> Result<()> {
        require_gt!(amount, 0, ErrorCode::ZeroAmount);
        let new_start =
            voting_clock::stake_start_after_deposit(self.stake_start_time, self.staked_balance, amount, now)?;
        self.instant_deposit
            .record(now, self.staked_balance, self.stake_start_time, amount)?;

        for (claim, stream) in self.claims.iter_mut().zip(streams.iter()) {
            if !stream.registered {
                continue;
            }
            *claim = claim.for_stream(stream.stream_id);
            claim.add_debt(amount, stream.accumulator_per_share)?;
        }

        self.staked_balance = self
            .staked_balance
            .checked_add(amount)
            .ok_or(ErrorCode::MathOverflow)?;
        self.stake_start_time = new_start;
        Ok(())
    }

    /// Records a withdrawal. Streams must already be settled to `now`.
    ///
    /// Earnings of the pre-withdrawal balance move into `pending_carry`; nothing is paid.
    pub fn apply_unstake(
        &mut self,
        streams: &[RewardStream; MAX_REWARD_STREAMS],
        amount: u64,
        now: u64,
    ) -> Result<()> {
        require_gt!(amount, 0, ErrorCode::ZeroAmount);
        require_gte!(self.staked_balance, amount, ErrorCode::InsufficientBalance);
        let remaining = self.staked_balance - amount;
        let new_start = match self.instant_deposit.reverse(now, amount)? {
            Some(_) if remaining == 0 => 0,
            Some(start) => start,
            None => voting_clock::stake_start_after_withdrawal(
                self.stake_start_time,
                self.staked_balance,
                amount,
                now,
            )?,
        };

        for (claim, stream) in self.claims.iter_mut().zip(streams.iter()) {
            if !stream.registered {
                continue;
            }
            *claim = claim.for_stream(stream.stream_id);
            claim.carry_and_rebase(self.staked_balance, remaining, stream.accumulator_per_share)?;
        }

        self.staked_balance = remaining;
        self.stake_start_time = new_start;
        Ok(())
    }

    /// What `claim` would pay from `stream` (slot `index`) given enough reserve.
    pub fn claimable(&self, index: usize, stream: &RewardStream) -> Result<u64> {
        let claim = self.claims[index].for_stream(stream.stream_id);
        claim.owed(self.staked_balance, stream.accumulator_per_share)
    }

    /// Settles the claim entry of slot `index` against `stream`'s vested pool.
    pub fn claim(&mut self, index: usize, stream: &mut RewardStream) -> Result<ClaimOutcome> {
        require!(stream.registered, ErrorCode::StreamNotRegistered);
        let mut claim = self.claims[index].for_stream(stream.stream_id);
        let outcome = claim.settle(
            self.staked_balance,
            stream.accumulator_per_share,
            stream.available_pool,
        )?;
        stream.record_claim(outcome.paid)?;
        self.claims[index] = claim;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::assert_error_code;

    const T0: u64 = 1_700_000_000;

    fn streams_with(slot: usize, stream: RewardStream) -> [RewardStream; MAX_REWARD_STREAMS] {
        let mut streams = [RewardStream::default(); MAX_REWARD_STREAMS];
        streams[slot] = stream;
        streams
    }

    fn live_stream(id: u64, acc: u128, pool: u64) -> RewardStream {
        RewardStream {
            accumulator_per_share: acc,
            available_pool: pool,
            ..RewardStream::new(id, Pubkey::new_unique(), Pubkey::new_unique(), false, T0)
        }
    }

    #[test]
    fn start_time_is_zero_iff_balance_is_zero() {
        let streams = [RewardStream::default(); MAX_REWARD_STREAMS];
        let mut position = StakePosition::default();
        position.apply_stake(&streams, 100, T0).unwrap();
        assert_eq!(position.stake_start_time, T0);
        position.apply_unstake(&streams, 40, T0 + 10).unwrap();
        assert!(position.stake_start_time > 0);
        position.apply_unstake(&streams, 60, T0 + 20).unwrap();
        assert_eq!(position.staked_balance, 0);
        assert_eq!(position.stake_start_time, 0);
    }

    #[test]
    fn same_second_stake_and_unstake_leave_voting_power_unchanged() {
        let streams = [RewardStream::default(); MAX_REWARD_STREAMS];
        let mut position = StakePosition::default();
        position.apply_stake(&streams, 1000, T0).unwrap();

        let now = T0 + 1000;
        let before = position.voting_power(now, 1);
        assert_eq!(before, 1_000_000);
        position.apply_stake(&streams, 1000, now).unwrap();
        position.apply_unstake(&streams, 1000, now).unwrap();
        assert_eq!(position.stake_start_time, T0);
        assert_eq!(position.voting_power(now, 1), before);

        // withdrawing more than this second's deposits scales held time instead
        position.apply_unstake(&streams, 500, now).unwrap();
        assert_eq!(position.voting_power(now, 1), 500 * 500);
    }

    #[test]
    fn unstake_rejects_zero_and_excess() {
        let streams = [RewardStream::default(); MAX_REWARD_STREAMS];
        let mut position = StakePosition::default();
        position.apply_stake(&streams, 100, T0).unwrap();
        assert_error_code(
            position.apply_unstake(&streams, 0, T0).unwrap_err(),
            ErrorCode::ZeroAmount,
        );
        assert_error_code(
            position.apply_unstake(&streams, 101, T0).unwrap_err(),
            ErrorCode::InsufficientBalance,
        );
        assert_eq!(position.staked_balance, 100);
    }

    #[test]
    fn exited_position_still_claims_carry() {
        let mut streams = streams_with(2, live_stream(7, 0, 0));
        let mut position = StakePosition::default();
        position.apply_stake(&streams, 1000, T0).unwrap();

        // 500 vested to a single staker
        streams[2].accumulator_per_share = crate::SCALE / 2;
        streams[2].available_pool = 500;

        position.apply_unstake(&streams, 1000, T0 + 5).unwrap();
        assert_eq!(position.claims[2].pending_carry, 500);
        assert_eq!(position.claimable(2, &streams[2]).unwrap(), 500);

        let outcome = position.claim(2, &mut streams[2]).unwrap();
        assert_eq!(outcome.paid, 500);
        assert_eq!(streams[2].available_pool, 0);
        assert_eq!(position.claimable(2, &streams[2]).unwrap(), 0);
    }

    #[test]
    fn reused_slot_does_not_inherit_old_debt() {
        let streams = streams_with(0, live_stream(1, 10 * crate::SCALE, 0));
        let mut position = StakePosition::default();
        position.apply_stake(&streams, 50, T0).unwrap();
        assert_eq!(position.claims[0].debt, 500);

        // slot 0 re-registered as a new stream whose accumulator restarted
        let replacement = live_stream(2, crate::SCALE, 50);
        assert_eq!(position.claimable(0, &replacement).unwrap(), 50);
    }

    #[test]
    fn claiming_unregistered_slot_fails() {
        let mut position = StakePosition::default();
        let mut empty = RewardStream::default();
        assert_error_code(
            position.claim(0, &mut empty).unwrap_err(),
            ErrorCode::StreamNotRegistered,
        );
    }
}
