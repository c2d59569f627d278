//! Pure time and stamina logic.
//!
//! Converts elapsed in-game days into age and age into a stamina recovery
//! multiplier. Nothing here holds state; the owner of a
//! [`ProgressionState`](crate::state::ProgressionState) calls these once
//! per tick.

use crate::rules::RuleTable;

/// Age after `days_elapsed` in-game days.
///
/// `start_age + days_elapsed * years_per_day`, clamped to
/// `[start_age, max_age]`. Monotonic non-decreasing in `days_elapsed`.
///
/// ```
/// use mirrorworld_logic::rules::RuleTable;
/// use mirrorworld_logic::time_clock::age_from_days;
///
/// let rules = RuleTable::default();
/// assert_eq!(age_from_days(&rules, 0.0), 16.0);
/// assert_eq!(age_from_days(&rules, 12.0), 40.0);
/// assert_eq!(age_from_days(&rules, 999.0), 76.0);
/// ```
pub fn age_from_days(rules: &RuleTable, days_elapsed: f64) -> f64 {
    let time = &rules.time;
    let age = time.start_age + days_elapsed * time.years_per_day;
    age.min(time.max_age).max(time.start_age)
}

/// Stamina recovery multiplier for `age`.
///
/// Returns the rate of the first bracket whose upper bound is at least
/// `age`, or the configured default past the last bracket.
pub fn recovery_rate_from_age(rules: &RuleTable, age: f64) -> f64 {
    rules
        .stamina
        .tiers
        .iter()
        .find(|tier| age <= tier.max_age)
        .map(|tier| tier.rate)
        .unwrap_or(rules.stamina.default_rate)
}

/// Stamina restored by one slice of recovery at `age`.
pub fn stamina_gain(rules: &RuleTable, age: f64, base_recovery: f64) -> f64 {
    base_recovery * recovery_rate_from_age(rules, age)
}

/// In-game days from birth to the lifespan ceiling.
pub fn lifespan_days(rules: &RuleTable) -> f64 {
    (rules.time.max_age - rules.time.start_age) / rules.time.years_per_day
}

/// Days left before the lifespan ceiling, never negative.
pub fn days_remaining(rules: &RuleTable, days_elapsed: f64) -> f64 {
    (lifespan_days(rules) - days_elapsed).max(0.0)
}

/// Whether `age` has reached the lifespan ceiling.
pub fn is_end_of_life(rules: &RuleTable, age: f64) -> bool {
    age >= rules.time.max_age
}
