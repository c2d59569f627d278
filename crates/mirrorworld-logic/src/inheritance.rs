//! Rebirth settlement: what one generation hands to the next.
//!
//! At end of life the player chooses how much cash to pour into the next
//! generation's physique and qi. Reinvestment is deliberately expensive and
//! capped (see [`stat_points`]); whatever is not reinvested is taxed, and
//! heirlooms pass through under their own (normally zero) tax.
//!
//! ```
//! use mirrorworld_logic::inheritance::{settle_inheritance, Investment};
//! use mirrorworld_logic::rules::RuleTable;
//!
//! let rules = RuleTable::default();
//! let result = settle_inheritance(&rules, 10_000, &[], Investment::default()).unwrap();
//! assert_eq!(result.starting_cash, 5_000);
//! assert_eq!(result.report.tax_paid, 5_000);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::awakening::stat_points;
use crate::rules::RuleTable;
use crate::state::Heirloom;

/// Cash the player wants converted into each starting attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Investment {
    pub physique: u64,
    pub qi: u64,
}

impl Investment {
    pub fn new(physique: u64, qi: u64) -> Self {
        Self { physique, qi }
    }

    /// Exact total; cannot overflow.
    pub fn total(&self) -> u128 {
        u128::from(self.physique) + u128::from(self.qi)
    }
}

/// Starting-stat points granted to the next generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatBonus {
    pub physique: u32,
    pub qi: u32,
}

/// Accounting for one settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InheritanceReport {
    /// Cash withheld from the un-reinvested remainder.
    pub tax_paid: u64,
    /// Cash spent on reinvestment, whether or not it bought points.
    pub total_reinvested: u64,
    /// Reinvested cash that bought no points (remainders and amounts past the cap).
    pub unconverted_investment: u64,
    /// Heirlooms lost to the heirloom tax.
    pub heirlooms_forfeited: usize,
    pub note: String,
}

/// Everything the next generation starts from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InheritanceResult {
    pub starting_cash: u64,
    pub stat_bonus: StatBonus,
    pub heirlooms: Vec<Heirloom>,
    pub report: InheritanceReport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InheritanceError {
    /// Requested reinvestment exceeds the cash on hand.
    InvalidInvestment { requested: u128, available: u64 },
}

impl fmt::Display for InheritanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InheritanceError::InvalidInvestment {
                requested,
                available,
            } => write!(
                f,
                "Investment of {} exceeds available cash {}",
                requested, available
            ),
        }
    }
}

impl std::error::Error for InheritanceError {}

/// Settle a generation's estate.
///
/// Fails with [`InheritanceError::InvalidInvestment`] before computing
/// anything when `investment` exceeds `cash`.
///
/// - Points per attribute: [`stat_points`] of that attribute's amount.
/// - `remaining = cash - reinvested`
/// - `starting_cash = floor(remaining × (1 - cash_tax))`
/// - `tax_paid = remaining - starting_cash` (so the two always sum to `remaining`)
/// - Heirlooms: the first `floor(n × (1 - heirloom_tax))` carry over in
///   order, unchanged. With a zero heirloom tax that is all of them.
pub fn settle_inheritance(
    rules: &RuleTable,
    cash: u64,
    heirlooms: &[Heirloom],
    investment: Investment,
) -> Result<InheritanceResult, InheritanceError> {
    let requested = investment.total();
    if requested > u128::from(cash) {
        return Err(InheritanceError::InvalidInvestment {
            requested,
            available: cash,
        });
    }
    let total_reinvested = requested as u64;

    let stat_bonus = StatBonus {
        physique: stat_points(rules, investment.physique),
        qi: stat_points(rules, investment.qi),
    };
    let points_bought = u64::from(stat_bonus.physique) + u64::from(stat_bonus.qi);
    let unconverted_investment =
        total_reinvested - points_bought * rules.awakening.cash_per_point;

    let remaining = cash - total_reinvested;
    let starting_cash = floor_scaled(remaining, 1.0 - rules.inheritance.cash_tax);
    let tax_paid = remaining - starting_cash;

    let carry_count = heirloom_carry_count(heirlooms.len(), rules.inheritance.heirloom_tax);
    let carried: Vec<Heirloom> = heirlooms[..carry_count].to_vec();

    Ok(InheritanceResult {
        starting_cash,
        stat_bonus,
        heirlooms: carried,
        report: InheritanceReport {
            tax_paid,
            total_reinvested,
            unconverted_investment,
            heirlooms_forfeited: heirlooms.len() - carry_count,
            note: rules.inheritance.note.clone(),
        },
    })
}

/// `floor(amount × factor)` for `factor` in `[0, 1]`, exact for every `u64`.
///
/// The factor is split into its binary mantissa and exponent so the product
/// is taken in `u128` instead of rounding `amount` through `f64`.
fn floor_scaled(amount: u64, factor: f64) -> u64 {
    if !(factor > 0.0) {
        return 0;
    }
    if factor >= 1.0 {
        return amount;
    }

    let bits = factor.to_bits();
    let exponent_bits = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1u64 << 52) - 1);
    let (mantissa, exponent) = if exponent_bits == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), exponent_bits - 1075)
    };

    // factor < 1 keeps the exponent at or below -53
    let shift = exponent.unsigned_abs();
    if shift >= 128 {
        return 0;
    }
    let scaled = (u128::from(amount) * u128::from(mantissa)) >> shift;
    (scaled as u64).min(amount)
}

fn heirloom_carry_count(count: usize, tax: f64) -> usize {
    if tax <= 0.0 {
        return count;
    }
    ((count as f64 * (1.0 - tax)).floor() as usize).min(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heirlooms() -> Vec<Heirloom> {
        vec![
            Heirloom::new(1, "青銅古鏡"),
            Heirloom::new(2, "祖傳玉佩"),
            Heirloom::new(3, "殘破劍譜"),
            Heirloom::new(4, "扁擔"),
        ]
    }

    #[test]
    fn test_full_reinvestment_buys_one_point() {
        let rules = RuleTable::default();
        let r = settle_inheritance(&rules, 3000, &[], Investment::new(3000, 0)).unwrap();
        assert_eq!(r.starting_cash, 0);
        assert_eq!(r.stat_bonus, StatBonus { physique: 1, qi: 0 });
        assert_eq!(r.report.tax_paid, 0);
        assert_eq!(r.report.total_reinvested, 3000);
        assert_eq!(r.report.unconverted_investment, 0);
    }

    #[test]
    fn test_half_tax_on_untouched_estate() {
        let rules = RuleTable::default();
        let r = settle_inheritance(&rules, 10_000, &[], Investment::default()).unwrap();
        assert_eq!(r.starting_cash, 5000);
        assert_eq!(r.report.tax_paid, 5000);
        assert_eq!(r.starting_cash + r.report.tax_paid, 10_000);
        assert_eq!(r.stat_bonus, StatBonus::default());
    }

    #[test]
    fn test_odd_remainder_splits_exactly() {
        let rules = RuleTable::default();
        let r = settle_inheritance(&rules, 10_001, &[], Investment::default()).unwrap();
        assert_eq!(r.starting_cash, 5000);
        assert_eq!(r.report.tax_paid, 5001);
    }

    #[test]
    fn test_overspend_rejected() {
        let rules = RuleTable::default();
        let err = settle_inheritance(&rules, 100, &[], Investment::new(200, 0)).unwrap_err();
        assert_eq!(
            err,
            InheritanceError::InvalidInvestment {
                requested: 200,
                available: 100
            }
        );
    }

    #[test]
    fn test_split_overspend_rejected() {
        let rules = RuleTable::default();
        let result = settle_inheritance(&rules, 5000, &heirlooms(), Investment::new(3000, 2001));
        assert!(matches!(
            result,
            Err(InheritanceError::InvalidInvestment { requested: 5001, .. })
        ));
    }

    #[test]
    fn test_overflowing_request_rejected() {
        let rules = RuleTable::default();
        let result = settle_inheritance(&rules, u64::MAX, &[], Investment::new(u64::MAX, 1));
        assert!(result.is_err());
    }

    #[test]
    fn test_excess_past_cap_is_forfeited() {
        let rules = RuleTable::default();
        let r = settle_inheritance(&rules, 400_000, &[], Investment::new(200_000, 4_500)).unwrap();
        assert_eq!(r.stat_bonus, StatBonus { physique: 50, qi: 1 });
        assert_eq!(r.report.total_reinvested, 204_500);
        assert_eq!(r.report.unconverted_investment, 50_000 + 1_500);
        assert_eq!(r.starting_cash, 97_750);
        assert_eq!(r.report.tax_paid, 97_750);
    }

    #[test]
    fn test_heirlooms_pass_through_untaxed() {
        let rules = RuleTable::default();
        let input = heirlooms();
        let r = settle_inheritance(&rules, 0, &input, Investment::default()).unwrap();
        assert_eq!(r.heirlooms, input);
        assert_eq!(r.report.heirlooms_forfeited, 0);
    }

    #[test]
    fn test_heirloom_tax_keeps_leading_items() {
        let mut rules = RuleTable::default();
        rules.inheritance.heirloom_tax = 0.5;
        let input = heirlooms();
        let r = settle_inheritance(&rules, 0, &input, Investment::default()).unwrap();
        assert_eq!(r.heirlooms, input[..2].to_vec());
        assert_eq!(r.report.heirlooms_forfeited, 2);
    }

    #[test]
    fn test_zero_cash_tax_keeps_everything() {
        let mut rules = RuleTable::default();
        rules.inheritance.cash_tax = 0.0;
        let r = settle_inheritance(&rules, 12_345, &[], Investment::new(345, 0)).unwrap();
        assert_eq!(r.starting_cash, 12_000);
        assert_eq!(r.report.tax_paid, 0);
    }

    #[test]
    fn test_zero_tax_exact_above_f64_precision() {
        let mut rules = RuleTable::default();
        rules.inheritance.cash_tax = 0.0;
        let cash = (1u64 << 53) + 1;
        let r = settle_inheritance(&rules, cash, &[], Investment::default()).unwrap();
        assert_eq!(r.starting_cash, 9_007_199_254_740_993);
        assert_eq!(r.report.tax_paid, 0);
    }

    #[test]
    fn test_half_tax_exact_above_f64_precision() {
        let rules = RuleTable::default();
        let cash = (1u64 << 54) + 3;
        let r = settle_inheritance(&rules, cash, &[], Investment::default()).unwrap();
        assert_eq!(r.starting_cash, 9_007_199_254_740_993);
        assert_eq!(r.starting_cash + r.report.tax_paid, cash);
    }

    #[test]
    fn test_max_cash_settles_exactly() {
        let rules = RuleTable::default();
        let r = settle_inheritance(&rules, u64::MAX, &[], Investment::default()).unwrap();
        assert_eq!(r.starting_cash, u64::MAX / 2);
        assert_eq!(r.report.tax_paid, u64::MAX / 2 + 1);
    }

    #[test]
    fn test_floor_scaled_matches_small_amounts() {
        for (amount, factor, expected) in [
            (10_001, 0.5, 5_000),
            (100, 0.25, 25),
            (7, 0.1, 0),
            (10, 0.1, 1),
            (12_345, 1.0, 12_345),
            (12_345, 0.0, 0),
        ] {
            assert_eq!(floor_scaled(amount, factor), expected, "{} × {}", amount, factor);
        }
    }

    #[test]
    fn test_report_carries_note() {
        let rules = RuleTable::default();
        let r = settle_inheritance(&rules, 1, &[], Investment::default()).unwrap();
        assert_eq!(r.report.note, rules.inheritance.note);
    }

    #[test]
    fn test_error_message() {
        let err = InheritanceError::InvalidInvestment {
            requested: 200,
            available: 100,
        };
        assert_eq!(err.to_string(), "Investment of 200 exceeds available cash 100");
    }
}
