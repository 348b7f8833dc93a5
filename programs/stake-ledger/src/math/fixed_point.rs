//! Fixed-point helpers shared by the reward and voting-power components.
//!
//! Products are widened to 256 bits before dividing, so `a * b / c` never
//! loses precision to an intermediate overflow. Callers pick the rounding
//! direction explicitly: amounts owed to accounts round down, baselines
//! subtracted from them round up.

use crate::SCALE;

uint::construct_uint! {
    pub struct U256(4);
}

fn narrow(value: U256) -> Option<u128> {
    if value > U256::from(u128::MAX) {
        None
    } else {
        Some(value.as_u128())
    }
}

/// `floor(a * b / denominator)`
pub fn mul_div_floor(a: u128, b: u128, denominator: u128) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    let product = U256::from(a).checked_mul(U256::from(b))?;
    narrow(product / U256::from(denominator))
}

/// `ceil(a * b / denominator)`
pub fn mul_div_ceil(a: u128, b: u128, denominator: u128) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    let product = U256::from(a).checked_mul(U256::from(b))?;
    let denominator = U256::from(denominator);
    let mut quotient = product / denominator;
    if !(product % denominator).is_zero() {
        quotient = quotient.checked_add(U256::one())?;
    }
    narrow(quotient)
}

/// Accumulator increase produced by spreading `vested` over `total_staked` shares.
pub fn accumulator_increment(vested: u64, total_staked: u64) -> Option<u128> {
    mul_div_floor(u128::from(vested), SCALE, u128::from(total_staked))
}

/// Rewards accrued by `balance` shares at accumulator `acc`, rounded down.
pub fn accrued_floor(balance: u64, acc: u128) -> Option<u128> {
    mul_div_floor(u128::from(balance), acc, SCALE)
}

/// Rewards accrued by `balance` shares at accumulator `acc`, rounded up.
pub fn accrued_ceil(balance: u64, acc: u128) -> Option<u128> {
    mul_div_ceil(u128::from(balance), acc, SCALE)
}

pub fn to_u64(value: u128) -> Option<u64> {
    u64::try_from(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use quickcheck::quickcheck;

    #[test]
    fn mul_div_survives_wide_intermediates() {
        // u64::MAX * 10^27 does not fit in u128 but the quotient does.
        let vested = u64::MAX;
        let inc = accumulator_increment(vested, u64::MAX).unwrap();
        assert_eq!(inc, SCALE);
        assert_eq!(accrued_floor(u64::MAX, inc).unwrap(), u128::from(u64::MAX));
    }

    #[test]
    fn zero_denominator_is_rejected() {
        assert_eq!(mul_div_floor(1, 1, 0), None);
        assert_eq!(mul_div_ceil(1, 1, 0), None);
        assert_eq!(accumulator_increment(100, 0), None);
    }

    #[test]
    fn quotient_too_large_is_rejected() {
        assert_eq!(mul_div_floor(u128::MAX, u128::MAX, 1), None);
        assert_eq!(mul_div_ceil(u128::MAX, 2, 1), None);
    }

    #[test]
    fn accrual_rounding_brackets_exact_value() {
        // 1000 shares, one third of a token per share.
        let acc = SCALE / 3;
        assert_eq!(accrued_floor(1000, acc).unwrap(), 333);
        assert_eq!(accrued_ceil(1000, acc).unwrap(), 334);
        assert_eq!(accrued_floor(3, SCALE).unwrap(), 3);
        assert_eq!(accrued_ceil(3, SCALE).unwrap(), 3);
    }

    quickcheck! {
        fn ceil_is_floor_or_floor_plus_one(a: u64, b: u64, d: u64) -> bool {
            if d == 0 {
                return true;
            }
            let floor = mul_div_floor(a.into(), b.into(), d.into()).unwrap();
            let ceil = mul_div_ceil(a.into(), b.into(), d.into()).unwrap();
            ceil == floor || ceil == floor + 1
        }
    }

    proptest! {
        #[test]
        fn matches_native_arithmetic_when_it_fits(a in 0u64..u64::MAX, b in 0u64..u64::MAX, d in 1u64..u64::MAX) {
            let native = u128::from(a) * u128::from(b) / u128::from(d);
            prop_assert_eq!(mul_div_floor(a.into(), b.into(), d.into()), Some(native));
        }

        #[test]
        fn distributing_never_exceeds_the_vested_amount(
            vested in 0u64..1_000_000_000_000,
            shares in prop::collection::vec(1u64..1_000_000_000, 1..8),
        ) {
            let total: u64 = shares.iter().sum();
            let inc = accumulator_increment(vested, total).unwrap();
            let paid: u128 = shares.iter().map(|s| accrued_floor(*s, inc).unwrap()).sum();
            prop_assert!(paid <= u128::from(vested));
        }
    }
}
