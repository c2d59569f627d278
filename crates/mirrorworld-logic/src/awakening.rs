//! Awakening thresholds and the cash → starting-stat exchange.

use crate::rules::RuleTable;

/// Starting-stat points bought by reinvesting `amount` cash into one
/// attribute: `min(floor(amount / cash_per_point), stat_cap)`.
///
/// Cash beyond the cap, and any remainder smaller than one point, is spent
/// without buying anything.
///
/// ```
/// use mirrorworld_logic::awakening::stat_points;
/// use mirrorworld_logic::rules::RuleTable;
///
/// let rules = RuleTable::default();
/// assert_eq!(stat_points(&rules, 2999), 0);
/// assert_eq!(stat_points(&rules, 3000), 1);
/// assert_eq!(stat_points(&rules, 10_000_000), 50);
/// ```
///
/// # Panics
///
/// Panics when `cash_per_point` is zero; `RuleTable::validate` rejects that.
pub fn stat_points(rules: &RuleTable, amount: u64) -> u32 {
    let raw = amount / rules.awakening.cash_per_point;
    raw.min(u64::from(rules.awakening.stat_cap)) as u32
}

/// Whether physique and qi are both high enough to sense a spirit root.
pub fn can_sense_spirit_root(rules: &RuleTable, physique: f64, qi: f64) -> bool {
    let threshold = rules.awakening.stat_threshold;
    physique >= threshold && qi >= threshold
}

/// Points the whole purse would buy if poured into a single attribute.
pub fn legacy_preview(rules: &RuleTable, cash: u64) -> u32 {
    stat_points(rules, cash)
}

/// `(physique, qi)` a new generation starts with, given reinvestment points.
pub fn starting_stats(rules: &RuleTable, physique_points: u32, qi_points: u32) -> (f64, f64) {
    (
        rules.awakening.base_physique + f64::from(physique_points),
        rules.awakening.base_qi + f64::from(qi_points),
    )
}
