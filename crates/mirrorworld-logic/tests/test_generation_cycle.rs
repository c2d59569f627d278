//! Integration tests for a full life cycle.
//!
//! Exercises: ProgressionState → ticks → errands → end of life
//! → settle_inheritance → successor → grading across generations.
//!
//! All tests are pure logic with no engine or clock.

use mirrorworld_logic::awakening::can_sense_spirit_root;
use mirrorworld_logic::elements::{Affinities, Element};
use mirrorworld_logic::errands::{perform_errand, ErrandError};
use mirrorworld_logic::inheritance::{settle_inheritance, InheritanceError, Investment};
use mirrorworld_logic::rules::RuleTable;
use mirrorworld_logic::spirit_root::grade_spirit_root;
use mirrorworld_logic::state::{Heirloom, ProgressionState, TickOutcome};
use mirrorworld_logic::time_clock::{age_from_days, recovery_rate_from_age};

// ── Helpers ────────────────────────────────────────────────────────────

/// Four ticks per in-game day so a lifetime is 120 ticks.
fn quick_rules() -> RuleTable {
    let mut rules = RuleTable::default();
    rules.tick.ticks_per_day = 4.0;
    rules.tick.base_recovery_per_tick = 2.0;
    rules
}

/// Tick until end of life, running one errand per in-game day.
fn live_out(rules: &RuleTable, state: &mut ProgressionState) -> u32 {
    let mut ticks = 0;
    loop {
        ticks += 1;
        match state.tick(rules) {
            TickOutcome::Alive { .. } => {
                if ticks % 4 == 0 {
                    match perform_errand(rules, state, "blacksmith", 2.0) {
                        Ok(_) | Err(ErrandError::NotEnoughStamina { .. }) => {}
                        Err(e) => panic!("errand failed mid-life: {}", e),
                    }
                }
            }
            TickOutcome::EndOfLife { .. } => return ticks,
            TickOutcome::Expired => panic!("ticked past end of life"),
        }
    }
}

// ── Lifetime tests ─────────────────────────────────────────────────────

#[test]
fn lifetime_lasts_configured_days() {
    let rules = quick_rules();
    let mut state = ProgressionState::first(&rules);
    let ticks = live_out(&rules, &mut state);
    assert_eq!(ticks, 120);
    assert_eq!(state.age, rules.time.max_age);
}

#[test]
fn invariants_hold_every_tick() {
    let rules = quick_rules();
    let mut state = ProgressionState::first(&rules);
    let mut last_age = state.age;
    while !state.is_end_of_life(&rules) {
        state.tick(&rules);
        assert!(state.age >= last_age);
        assert!(state.age >= rules.time.start_age && state.age <= rules.time.max_age);
        assert!(state.stamina >= 0.0 && state.stamina <= rules.stamina.max);
        last_age = state.age;
    }
}

#[test]
fn errands_fund_the_estate() {
    let rules = quick_rules();
    let mut state = ProgressionState::first(&rules);
    live_out(&rules, &mut state);
    assert!(state.cash > 100, "no errand income: {}", state.cash);
}

#[test]
fn age_and_rate_agree_along_the_way() {
    let rules = RuleTable::default();
    assert_eq!(recovery_rate_from_age(&rules, age_from_days(&rules, 0.0)), 1.0);
    assert_eq!(recovery_rate_from_age(&rules, age_from_days(&rules, 15.0)), 0.8);
    assert_eq!(recovery_rate_from_age(&rules, age_from_days(&rules, 30.0)), 0.5);
}

// ── Rebirth tests ──────────────────────────────────────────────────────

#[test]
fn rebirth_chain_preserves_heirlooms_and_accounts_cash() {
    let rules = quick_rules();
    let mut state = ProgressionState::first(&rules);
    state.heirlooms = vec![Heirloom::new(1, "青銅古鏡"), Heirloom::new(2, "祖傳玉佩")];
    let founding_heirlooms = state.heirlooms.clone();

    for generation in 1..=4 {
        assert_eq!(state.generation, generation);
        live_out(&rules, &mut state);

        let investment = Investment::new(state.cash / 4, state.cash / 4);
        let result = settle_inheritance(&rules, state.cash, &state.heirlooms, investment)
            .expect("investment within cash");
        let remaining = state.cash - result.report.total_reinvested;
        assert_eq!(result.starting_cash + result.report.tax_paid, remaining);
        assert_eq!(result.heirlooms, founding_heirlooms);

        state = state.successor(&rules, result);
        assert_eq!(state.age, rules.time.start_age);
        assert_eq!(state.days_elapsed, 0.0);
    }
    assert_eq!(state.generation, 5);
}

#[test]
fn rejected_rebirth_changes_nothing() {
    let rules = quick_rules();
    let mut state = ProgressionState::first(&rules);
    live_out(&rules, &mut state);
    let before = state.clone();

    let err = settle_inheritance(
        &rules,
        state.cash,
        &state.heirlooms,
        Investment::new(state.cash, 1),
    )
    .unwrap_err();
    assert!(matches!(err, InheritanceError::InvalidInvestment { .. }));
    assert_eq!(state, before);
}

#[test]
fn reinvestment_can_reach_awakening_over_generations() {
    let mut rules = quick_rules();
    rules.inheritance.cash_tax = 0.0;
    let mut state = ProgressionState::first(&rules);
    state.cash = 1_000_000;
    live_out(&rules, &mut state);

    let settled = settle_inheritance(
        &rules,
        state.cash,
        &state.heirlooms,
        Investment::new(300_000, 300_000),
    )
    .unwrap();
    assert_eq!(settled.stat_bonus.physique, 50);
    assert_eq!(settled.stat_bonus.qi, 50);
    let next = state.successor(&rules, settled);
    assert_eq!(next.physique, 65.0);
    assert_eq!(next.qi, 50.0);
    assert!(!can_sense_spirit_root(&rules, next.physique, next.qi));
}

// ── Grading tests ──────────────────────────────────────────────────────

#[test]
fn grading_survives_rebirth_unchanged() {
    let rules = quick_rules();
    let mut state = ProgressionState::first(&rules);
    let before = grade_spirit_root(&rules, &state.affinities);
    live_out(&rules, &mut state);
    let settled =
        settle_inheritance(&rules, state.cash, &state.heirlooms, Investment::default()).unwrap();
    let next = state.successor(&rules, settled);
    assert_eq!(grade_spirit_root(&rules, &next.affinities), before);
}

#[test]
fn literal_starting_profile_grade() {
    let rules = RuleTable::default();
    let r = grade_spirit_root(&rules, &Affinities::new(20.0, 10.0, 10.0, 10.0, 10.0));
    assert_eq!(r.dominant, Some(Element::Gold));
    assert_eq!(r.purity, 33.33);
    assert_eq!(r.grade, rules.spirit_root.grades[0]);
}
