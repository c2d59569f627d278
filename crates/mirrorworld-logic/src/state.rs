//! Per-generation character state and the tick contract.
//!
//! [`ProgressionState`] is the only mutable data in the model. Whoever owns
//! it calls [`ProgressionState::tick`] once per wall-clock interval, and
//! [`ProgressionState::successor`] when a generation ends.

use serde::{Deserialize, Serialize};

use crate::awakening::starting_stats;
use crate::elements::Affinities;
use crate::inheritance::{InheritanceResult, StatBonus};
use crate::rules::RuleTable;
use crate::time_clock::{
    age_from_days, days_remaining, is_end_of_life, recovery_rate_from_age, stamina_gain,
};

/// An item carried from one generation to the next. The engine never looks
/// inside it; it only carries or forfeits whole entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heirloom {
    pub id: u64,
    pub name: String,
}

impl Heirloom {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Result of applying one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Time advanced and stamina recovered.
    Alive { age: f64, stamina: f64 },
    /// This tick reached the lifespan ceiling. Stamina was not recovered.
    EndOfLife { age: f64 },
    /// The generation had already ended; nothing changed.
    Expired,
}

/// One character's state within a single generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionState {
    /// 1 for the founder, +1 per rebirth.
    pub generation: u32,
    /// In-game days since this generation began (fractional).
    pub days_elapsed: f64,
    /// Derived from `days_elapsed`, clamped to `[start_age, max_age]`.
    pub age: f64,
    /// 0–`stamina.max`.
    pub stamina: f64,
    pub physique: f64,
    pub qi: f64,
    pub affinities: Affinities,
    pub cash: u64,
    pub heirlooms: Vec<Heirloom>,
}

/// Cash the founding generation starts with.
const FOUNDER_CASH: u64 = 100;

/// Stamina the founding generation starts with.
const FOUNDER_STAMINA: f64 = 80.0;

impl ProgressionState {
    /// A fresh generation at the starting age.
    pub fn new_generation(
        rules: &RuleTable,
        generation: u32,
        cash: u64,
        bonus: StatBonus,
        affinities: Affinities,
        heirlooms: Vec<Heirloom>,
    ) -> Self {
        let (physique, qi) = starting_stats(rules, bonus.physique, bonus.qi);
        Self {
            generation,
            days_elapsed: 0.0,
            age: rules.time.start_age,
            stamina: clamp_stamina(rules, rules.stamina.rebirth_stamina),
            physique,
            qi,
            affinities,
            cash,
            heirlooms,
        }
    }

    /// The founding generation: a little pocket money, a gold-leaning
    /// affinity profile, not yet fully rested.
    pub fn first(rules: &RuleTable) -> Self {
        let mut state = Self::new_generation(
            rules,
            1,
            FOUNDER_CASH,
            StatBonus::default(),
            Affinities::new(20.0, 10.0, 10.0, 10.0, 10.0),
            Vec::new(),
        );
        state.stamina = FOUNDER_STAMINA.min(rules.stamina.max);
        state
    }

    /// The next generation, built from a settled inheritance. Affinities
    /// carry over unchanged.
    pub fn successor(&self, rules: &RuleTable, inheritance: InheritanceResult) -> Self {
        Self::new_generation(
            rules,
            self.generation + 1,
            inheritance.starting_cash,
            inheritance.stat_bonus,
            self.affinities,
            inheritance.heirlooms,
        )
    }

    pub fn is_end_of_life(&self, rules: &RuleTable) -> bool {
        is_end_of_life(rules, self.age)
    }

    pub fn recovery_rate(&self, rules: &RuleTable) -> f64 {
        recovery_rate_from_age(rules, self.age)
    }

    pub fn days_remaining(&self, rules: &RuleTable) -> f64 {
        days_remaining(rules, self.days_elapsed)
    }

    /// Apply one tick: advance `1 / ticks_per_day` days, recompute age, and
    /// either recover stamina or report end of life.
    pub fn tick(&mut self, rules: &RuleTable) -> TickOutcome {
        if self.is_end_of_life(rules) {
            return TickOutcome::Expired;
        }

        self.days_elapsed += rules.tick.days_per_tick();
        self.age = age_from_days(rules, self.days_elapsed);
        if self.is_end_of_life(rules) {
            return TickOutcome::EndOfLife { age: self.age };
        }

        let gain = stamina_gain(rules, self.age, rules.tick.base_recovery_per_tick);
        self.stamina = clamp_stamina(rules, self.stamina + gain);
        TickOutcome::Alive {
            age: self.age,
            stamina: self.stamina,
        }
    }
}

/// Clamp to `[0, stamina.max]`.
pub fn clamp_stamina(rules: &RuleTable, stamina: f64) -> f64 {
    stamina.min(rules.stamina.max).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inheritance::{settle_inheritance, Investment};

    /// One tick per in-game day keeps arithmetic exact.
    fn daily_rules() -> RuleTable {
        let mut rules = RuleTable::default();
        rules.tick.ticks_per_day = 1.0;
        rules.tick.base_recovery_per_tick = 10.0;
        rules
    }

    #[test]
    fn test_first_generation() {
        let rules = RuleTable::default();
        let s = ProgressionState::first(&rules);
        assert_eq!(s.generation, 1);
        assert_eq!(s.age, 16.0);
        assert_eq!(s.days_elapsed, 0.0);
        assert_eq!(s.stamina, 80.0);
        assert_eq!(s.physique, 15.0);
        assert_eq!(s.cash, 100);
        assert!(s.heirlooms.is_empty());
    }

    #[test]
    fn test_single_real_time_tick() {
        let rules = RuleTable::default();
        let mut s = ProgressionState::first(&rules);
        let outcome = s.tick(&rules);
        match outcome {
            TickOutcome::Alive { age, stamina } => {
                assert!(age > 16.0 && age < 16.001);
                assert!((stamina - 80.05).abs() < 1e-9);
            }
            other => panic!("expected Alive, got {:?}", other),
        }
    }

    #[test]
    fn test_stamina_clamped_to_max() {
        let rules = daily_rules();
        let mut s = ProgressionState::first(&rules);
        s.tick(&rules);
        s.tick(&rules);
        s.tick(&rules);
        assert_eq!(s.stamina, 100.0);
    }

    #[test]
    fn test_recovery_slows_with_age() {
        let rules = daily_rules();
        let mut s = ProgressionState::first(&rules);
        for _ in 0..20 {
            s.tick(&rules);
        }
        // day 20 → age 56
        assert_eq!(s.age, 56.0);
        s.stamina = 0.0;
        s.tick(&rules);
        // day 21 → age 58, 0.8 multiplier
        assert!((s.stamina - 8.0).abs() < 1e-12);
        s.stamina = 0.0;
        for _ in 0..2 {
            s.tick(&rules);
        }
        // day 23 → age 62, 0.5 multiplier
        assert!((s.stamina - 13.0).abs() < 1e-12);
    }

    #[test]
    fn test_end_of_life_signalled_once() {
        let rules = daily_rules();
        let mut s = ProgressionState::first(&rules);
        let mut end_ticks = 0;
        let mut alive_ticks = 0;
        for _ in 0..40 {
            match s.tick(&rules) {
                TickOutcome::Alive { .. } => alive_ticks += 1,
                TickOutcome::EndOfLife { age } => {
                    assert_eq!(age, 76.0);
                    end_ticks += 1;
                }
                TickOutcome::Expired => {}
            }
        }
        assert_eq!(alive_ticks, 29);
        assert_eq!(end_ticks, 1);
        assert_eq!(s.age, 76.0);
        assert_eq!(s.days_elapsed, 30.0);
        assert_eq!(s.days_remaining(&rules), 0.0);
    }

    #[test]
    fn test_no_stamina_gain_on_final_tick() {
        let rules = daily_rules();
        let mut s = ProgressionState::first(&rules);
        for _ in 0..29 {
            s.tick(&rules);
        }
        s.stamina = 0.0;
        assert!(matches!(s.tick(&rules), TickOutcome::EndOfLife { .. }));
        assert_eq!(s.stamina, 0.0);
        assert!(matches!(s.tick(&rules), TickOutcome::Expired));
    }

    #[test]
    fn test_rebirth_stamina_clamped_to_cap() {
        let mut rules = RuleTable::default();
        rules.stamina.rebirth_stamina = 150.0;
        let s = ProgressionState::new_generation(
            &rules,
            2,
            0,
            StatBonus::default(),
            Affinities::default(),
            Vec::new(),
        );
        assert_eq!(s.stamina, 100.0);
    }

    #[test]
    fn test_negative_recovery_floors_at_zero() {
        let mut rules = daily_rules();
        rules.tick.base_recovery_per_tick = -50.0;
        let mut s = ProgressionState::first(&rules);
        s.tick(&rules);
        assert_eq!(s.stamina, 30.0);
        s.tick(&rules);
        assert_eq!(s.stamina, 0.0);
    }

    #[test]
    fn test_successor_resets_clock_and_applies_bonus() {
        let rules = daily_rules();
        let mut s = ProgressionState::first(&rules);
        s.cash = 20_000;
        s.heirlooms.push(Heirloom::new(7, "祖傳玉佩"));
        while !s.is_end_of_life(&rules) {
            s.tick(&rules);
        }
        let settled =
            settle_inheritance(&rules, s.cash, &s.heirlooms, Investment::new(6000, 3000)).unwrap();
        let next = s.successor(&rules, settled);
        assert_eq!(next.generation, 2);
        assert_eq!(next.age, 16.0);
        assert_eq!(next.days_elapsed, 0.0);
        assert_eq!(next.stamina, 100.0);
        assert_eq!(next.physique, 17.0);
        assert_eq!(next.qi, 1.0);
        assert_eq!(next.cash, 5500);
        assert_eq!(next.heirlooms, s.heirlooms);
        assert_eq!(next.affinities, s.affinities);
    }
}
