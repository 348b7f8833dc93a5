use crate::error::ErrorCode;
use crate::math::{accrued_ceil, accrued_floor, to_u64};
use anchor_lang::prelude::*;

/// Per-account, per-stream reward bookkeeping.
///
/// `debt` is the part of `balance * accumulator / SCALE` the account is not
/// entitled to; it is rounded up while accrued amounts are rounded down, so a
/// payout never exceeds the exact entitlement. `pending_carry` holds rewards
/// detached from the live balance (earned before an unstake, or left unpaid
/// by a short reserve).
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClaimState {
    /// `RewardStream::stream_id` this entry was recorded against.
    pub stream_id: u64,

    /// Reward baseline in reward-token units.
    pub debt: u128,

    /// Earned but unpaid rewards detached from the live balance.
    pub pending_carry: u64,

    /// Lifetime amount claimed from this stream.
    pub total_claimed: u64,
}

/// Result of settling one claim entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClaimOutcome {
    pub owed: u64,
    pub paid: u64,
    pub shortfall: u64,
}

impl ClaimState {
    /// Breakdown:
    /// - 8: stream_id
    /// - 16: debt
    /// - 8 * 2: pending_carry, total_claimed
    pub const LEN: usize = 8 + 16 + 8 * 2;

    /// Entry bound to `stream_id`, resetting it if it belonged to an earlier registration.
    pub fn for_stream(&self, stream_id: u64) -> ClaimState {
        if self.stream_id == stream_id {
            *self
        } else {
            ClaimState {
                stream_id,
                ..Default::default()
            }
        }
    }

    /// Rewards currently owed for `balance` at accumulator `acc`.
    pub fn owed(&self, balance: u64, acc: u128) -> Result<u64> {
        let accrued = accrued_floor(balance, acc).ok_or(ErrorCode::MathOverflow)?;
        let earned = accrued.saturating_sub(self.debt);
        let owed = earned
            .checked_add(u128::from(self.pending_carry))
            .and_then(to_u64)
            .ok_or(ErrorCode::MathOverflow)?;
        Ok(owed)
    }

    /// Newly staked `amount` starts earning from the current accumulator.
    pub fn add_debt(&mut self, amount: u64, acc: u128) -> Result<()> {
        let baseline = accrued_ceil(amount, acc).ok_or(ErrorCode::MathOverflow)?;
        self.debt = self
            .debt
            .checked_add(baseline)
            .ok_or(ErrorCode::MathOverflow)?;
        Ok(())
    }

    /// Moves rewards earned by `old_balance` into `pending_carry` and rebases
    /// the debt on `new_balance`.
    pub fn carry_and_rebase(&mut self, old_balance: u64, new_balance: u64, acc: u128) -> Result<()> {
        let accrued = accrued_floor(old_balance, acc).ok_or(ErrorCode::MathOverflow)?;
        let earned = to_u64(accrued.saturating_sub(self.debt)).ok_or(ErrorCode::MathOverflow)?;
        self.pending_carry = self
            .pending_carry
            .checked_add(earned)
            .ok_or(ErrorCode::MathOverflow)?;
        self.debt = accrued_ceil(new_balance, acc).ok_or(ErrorCode::MathOverflow)?;
        Ok(())
    }

    /// Pays what `available` allows and carries the rest forward.
    pub fn settle(&mut self, balance: u64, acc: u128, available: u64) -> Result<ClaimOutcome> {
        let owed = self.owed(balance, acc)?;
        let paid = owed.min(available);
        let shortfall = owed - paid;

        self.debt = accrued_ceil(balance, acc).ok_or(ErrorCode::MathOverflow)?;
        self.pending_carry = shortfall;
        self.total_claimed = self
            .total_claimed
            .checked_add(paid)
            .ok_or(ErrorCode::MathOverflow)?;

        Ok(ClaimOutcome {
            owed,
            paid,
            shortfall,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SCALE;

    #[test]
    fn stale_entry_is_reset_for_new_registration() {
        let entry = ClaimState {
            stream_id: 3,
            debt: 77,
            pending_carry: 5,
            total_claimed: 9,
        };
        assert_eq!(entry.for_stream(3), entry);
        assert_eq!(
            entry.for_stream(4),
            ClaimState {
                stream_id: 4,
                ..Default::default()
            }
        );
    }

    #[test]
    fn joining_late_earns_only_future_rewards() {
        let mut entry = ClaimState::default();
        let acc = 5 * SCALE;
        entry.add_debt(100, acc).unwrap();
        assert_eq!(entry.owed(100, acc).unwrap(), 0);
        assert_eq!(entry.owed(100, acc + SCALE).unwrap(), 100);
    }

    #[test]
    fn second_claim_pays_nothing() {
        let mut entry = ClaimState::default();
        let acc = SCALE / 3;
        let first = entry.settle(1000, acc, u64::MAX).unwrap();
        assert_eq!(first.paid, 333);
        let second = entry.settle(1000, acc, u64::MAX).unwrap();
        assert_eq!(second, ClaimOutcome::default());
    }

    #[test]
    fn short_reserve_pays_partially_and_carries_rest() {
        let mut entry = ClaimState::default();
        let outcome = entry.settle(10, 50 * SCALE, 200).unwrap();
        assert_eq!(
            outcome,
            ClaimOutcome {
                owed: 500,
                paid: 200,
                shortfall: 300
            }
        );
        assert_eq!(entry.pending_carry, 300);
        assert_eq!(entry.owed(10, 50 * SCALE).unwrap(), 300);

        let rest = entry.settle(10, 50 * SCALE, 1_000).unwrap();
        assert_eq!(rest.paid, 300);
        assert_eq!(entry.total_claimed, 500);
    }

    #[test]
    fn full_withdrawal_moves_earnings_to_carry() {
        let mut entry = ClaimState::default();
        entry.add_debt(1000, 0).unwrap();
        entry.carry_and_rebase(1000, 0, SCALE / 2).unwrap();
        assert_eq!(entry.pending_carry, 500);
        assert_eq!(entry.debt, 0);
        // accumulator growth after leaving earns nothing more
        assert_eq!(entry.owed(0, 10 * SCALE).unwrap(), 500);
    }
}
