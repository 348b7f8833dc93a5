//! Time-weighted voting power.
//!
//! Voting power is `balance * (now - stake_start_time) / divisor`. The start
//! time is never reset on a balance change; it is moved so that a deposit
//! dilutes the time held and a withdrawal scales it down with the balance
//! that remains.

use crate::error::ErrorCode;
use crate::math::{mul_div_floor, to_u64};
use anchor_lang::prelude::*;

/// Start time after depositing `amount` on top of `balance`.
///
/// `now - balance * (now - old_start) / (balance + amount)`: balance-seconds
/// accumulated so far are preserved, the held time is averaged over the new
/// balance.
pub fn stake_start_after_deposit(old_start: u64, balance: u64, amount: u64, now: u64) -> Result<u64> {
    if balance == 0 {
        return Ok(now);
    }
    let held = now.saturating_sub(old_start);
    let new_balance = balance.checked_add(amount).ok_or(ErrorCode::MathOverflow)?;
    let kept = mul_div_floor(u128::from(balance), u128::from(held), u128::from(new_balance))
        .and_then(to_u64)
        .ok_or(ErrorCode::MathOverflow)?;
    Ok(now - kept)
}

/// Start time after withdrawing `amount` out of `balance`.
///
/// `now - (now - old_start) * remaining / balance`. A non-zero remainder that
/// has been held for any time keeps at least one second, so a large
/// withdrawal never truncates the retained voting power to zero.
pub fn stake_start_after_withdrawal(
    old_start: u64,
    balance: u64,
    amount: u64,
    now: u64,
) -> Result<u64> {
    let remaining = balance
        .checked_sub(amount)
        .ok_or(ErrorCode::InsufficientBalance)?;
    if remaining == 0 {
        return Ok(0);
    }
    let held = now.saturating_sub(old_start);
    let mut kept = mul_div_floor(u128::from(held), u128::from(remaining), u128::from(balance))
        .and_then(to_u64)
        .ok_or(ErrorCode::MathOverflow)?;
    if kept == 0 && held > 0 {
        kept = 1;
    }
    Ok(now - kept)
}

/// Deposits made at a single timestamp, kept so that a withdrawal in the
/// same second can be reversed exactly.
///
/// Chaining the deposit and withdrawal rules loses held time quadratically
/// (`B^2 * h / (B + d)^2`); reversing against the pre-deposit start makes a
/// same-instant stake/unstake leave voting power where it was.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InstantDeposit {
    /// Timestamp of the tracked deposits; zero when nothing is tracked.
    pub at: u64,

    /// Balance before the first deposit at `at`.
    pub base_balance: u64,

    /// Stake start before the first deposit at `at`.
    pub base_start: u64,

    /// Sum of deposits at `at` not yet withdrawn.
    pub amount: u64,
}

impl InstantDeposit {
    /// Breakdown:
    /// - 8 * 4: at, base_balance, base_start, amount
    pub const LEN: usize = 8 * 4;

    /// Tracks `amount` deposited at `now` on top of `balance` started at `start`.
    pub fn record(&mut self, now: u64, balance: u64, start: u64, amount: u64) -> Result<()> {
        if self.at != now {
            *self = InstantDeposit {
                at: now,
                base_balance: balance,
                base_start: start,
                amount: 0,
            };
        }
        self.amount = self
            .amount
            .checked_add(amount)
            .ok_or(ErrorCode::MathOverflow)?;
        Ok(())
    }

    /// Start time after withdrawing `amount` at `now`, if it only takes back
    /// deposits made at `now`. Returns `None` (and stops tracking) otherwise.
    pub fn reverse(&mut self, now: u64, amount: u64) -> Result<Option<u64>> {
        if self.at == 0 || self.at != now || amount > self.amount {
            *self = InstantDeposit::default();
            return Ok(None);
        }
        self.amount -= amount;
        let start = if self.amount == 0 {
            self.base_start
        } else {
            stake_start_after_deposit(self.base_start, self.base_balance, self.amount, now)?
        };
        Ok(Some(start))
    }
}

pub fn voting_power(balance: u64, stake_start_time: u64, now: u64, divisor: u64) -> u128 {
    if balance == 0 || divisor == 0 {
        return 0;
    }
    let held = now.saturating_sub(stake_start_time);
    u128::from(balance) * u128::from(held) / u128::from(divisor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const T0: u64 = 1_700_000_000;
    const YEAR: u64 = 365 * 86_400;

    #[test]
    fn first_deposit_starts_clock_now() {
        assert_eq!(stake_start_after_deposit(0, 0, 500, T0).unwrap(), T0);
    }

    #[test]
    fn deposit_preserves_balance_seconds() {
        // 100 held for 1000s, then 300 more: 400 units held for 250s.
        let start = stake_start_after_deposit(T0, 100, 300, T0 + 1000).unwrap();
        assert_eq!(start, T0 + 750);
        assert_eq!(
            voting_power(400, start, T0 + 1000, 1),
            voting_power(100, T0, T0 + 1000, 1)
        );
    }

    #[test]
    fn withdrawal_scales_held_time_with_remaining_balance() {
        let start = stake_start_after_withdrawal(T0, 1000, 250, T0 + 1000).unwrap();
        assert_eq!(start, T0 + 250);
        assert_eq!(voting_power(750, start, T0 + 1000, 1), 750 * 750);
    }

    #[test]
    fn full_withdrawal_clears_start() {
        assert_eq!(stake_start_after_withdrawal(T0, 10, 10, T0 + 5).unwrap(), 0);
    }

    #[test]
    fn withdrawing_more_than_balance_fails() {
        crate::error::assert_error_code(
            stake_start_after_withdrawal(T0, 10, 11, T0 + 5).unwrap_err(),
            ErrorCode::InsufficientBalance,
        );
    }

    #[test]
    fn removing_almost_everything_keeps_proportional_power() {
        let now = T0 + YEAR;
        let start = stake_start_after_withdrawal(T0, 1_000_000, 999_000, now).unwrap();
        assert_eq!(now - start, YEAR / 1000);
        assert!(voting_power(1000, start, now, 1) > 0);
    }

    #[test]
    fn truncated_remainder_floors_at_one_second() {
        let start = stake_start_after_withdrawal(T0, 1000, 999, T0 + 100).unwrap();
        assert_eq!(start, T0 + 99);
        assert_eq!(voting_power(1, start, T0 + 100, 1), 1);
    }

    #[test]
    fn fresh_stake_and_unstake_returns_to_zero() {
        let start = stake_start_after_deposit(0, 0, 1000, T0).unwrap();
        let start = stake_start_after_withdrawal(start, 1000, 1000, T0).unwrap();
        assert_eq!(start, 0);
        assert_eq!(voting_power(0, start, T0, 1), 0);
    }

    #[test]
    fn chained_rules_lose_held_time_quadratically() {
        // without the instant record: 1000 held 1000s, +1000 then -1000 keeps a quarter
        let now = T0 + 1000;
        let start = stake_start_after_deposit(T0, 1000, 1000, now).unwrap();
        let start = stake_start_after_withdrawal(start, 2000, 1000, now).unwrap();
        assert_eq!(voting_power(1000, start, now, 1), 250_000);
    }

    #[test]
    fn same_instant_withdrawal_reverses_deposit() {
        let now = T0 + 1000;
        let mut instant = InstantDeposit::default();
        instant.record(now, 1000, T0, 1000).unwrap();
        let start = instant.reverse(now, 1000).unwrap().unwrap();
        assert_eq!(start, T0);
        assert_eq!(voting_power(1000, start, now, 1), 1_000_000);
    }

    #[test]
    fn partial_same_instant_withdrawal_keeps_rest_of_deposit() {
        let now = T0 + 1000;
        let mut instant = InstantDeposit::default();
        instant.record(now, 100, T0, 200).unwrap();
        instant.record(now, 300, T0 + 666, 100).unwrap();
        // both deposits of this second taken back in two steps
        let start = instant.reverse(now, 200).unwrap().unwrap();
        assert_eq!(start, stake_start_after_deposit(T0, 100, 100, now).unwrap());
        assert_eq!(start, T0 + 500);
        assert_eq!(instant.reverse(now, 100).unwrap(), Some(T0));
    }

    #[test]
    fn withdrawal_beyond_instant_deposit_is_not_reversed() {
        let now = T0 + 1000;
        let mut instant = InstantDeposit::default();
        instant.record(now, 1000, T0, 10).unwrap();
        assert_eq!(instant.reverse(now, 11).unwrap(), None);
        assert_eq!(instant, InstantDeposit::default());

        instant.record(now, 1000, T0, 10).unwrap();
        assert_eq!(instant.reverse(now + 1, 10).unwrap(), None);
    }

    #[test]
    fn divisor_normalizes_power() {
        assert_eq!(voting_power(10, T0, T0 + 86_400, 86_400), 10);
        assert_eq!(voting_power(10, T0, T0 + 86_400, 0), 0);
    }

    proptest! {
        #[test]
        fn same_instant_round_trip_restores_voting_power(
            balance in 1u64..1_000_000_000_000,
            flash in 1u64..1_000_000_000_000,
            held in 0u64..(10 * YEAR),
        ) {
            let now = T0 + held;
            let before = voting_power(balance, T0, now, 1);

            let mut instant = InstantDeposit::default();
            instant.record(now, balance, T0, flash).unwrap();
            let start = stake_start_after_deposit(T0, balance, flash, now).unwrap();
            let during = voting_power(balance + flash, start, now, 1);
            prop_assert!(during <= before);

            let start = instant.reverse(now, flash).unwrap().unwrap();
            prop_assert_eq!(start, T0);
            prop_assert_eq!(voting_power(balance, start, now, 1), before);
        }

        #[test]
        fn partial_withdrawal_never_zeroes_held_position(
            balance in 2u64..1_000_000_000_000,
            fraction in 1u64..1000,
            held in 1u64..(10 * YEAR),
        ) {
            let withdrawn = (u128::from(balance) * u128::from(fraction) / 1000) as u64;
            prop_assume!(withdrawn < balance);
            let now = T0 + held;
            let start = stake_start_after_withdrawal(T0, balance, withdrawn, now).unwrap();
            prop_assert!(voting_power(balance - withdrawn, start, now, 1) > 0);
            prop_assert!(start >= T0);
        }
    }
}
