//! Mirror World Headless Simulation Harness
//!
//! Validates the rule data and the pure progression logic, then lives out
//! a seeded lineage through the engine. Runs entirely in-process: no clock,
//! no rendering, no storage.
//!
//! Usage:
//!   cargo run -p mirrorworld-simtest
//!   cargo run -p mirrorworld-simtest -- --verbose
//!   cargo run -p mirrorworld-simtest -- --generations 10 --seed 42

use mirrorworld_core::engine::{EngineError, LifeEngine};
use mirrorworld_core::rules_file::{parse_rule_table, BUNDLED_RULES};
use mirrorworld_logic::awakening::{can_sense_spirit_root, legacy_preview, stat_points};
use mirrorworld_logic::elements::{Affinities, Element};
use mirrorworld_logic::errands::ErrandError;
use mirrorworld_logic::inheritance::{settle_inheritance, InheritanceError, Investment};
use mirrorworld_logic::rules::RuleTable;
use mirrorworld_logic::spirit_root::grade_spirit_root;
use mirrorworld_logic::state::{Heirloom, TickOutcome};
use mirrorworld_logic::time_clock::{age_from_days, lifespan_days, recovery_rate_from_age};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Options {
    verbose: bool,
    generations: u32,
    seed: u64,
}

impl Options {
    fn from_args() -> Result<Self, String> {
        let mut options = Options {
            verbose: false,
            generations: 5,
            seed: 0x4d49_5252,
        };
        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--verbose" => options.verbose = true,
                "--generations" => {
                    let value = args.next().ok_or("--generations needs a value")?;
                    options.generations = value
                        .parse()
                        .map_err(|_| format!("invalid generation count '{}'", value))?;
                }
                "--seed" => {
                    let value = args.next().ok_or("--seed needs a value")?;
                    options.seed = value
                        .parse()
                        .map_err(|_| format!("invalid seed '{}'", value))?;
                }
                other => return Err(format!("unknown argument '{}'", other)),
            }
        }
        Ok(options)
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let options = match Options::from_args() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("usage: mirrorworld-simtest [--verbose] [--generations N] [--seed S]");
            std::process::exit(2);
        }
    };
    let verbose = options.verbose;
    println!("=== Mirror World Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Rule data validation
    let rules = match validate_rule_data(&mut results) {
        Some(rules) => rules,
        None => {
            report(&results, verbose);
            std::process::exit(1);
        }
    };

    // 2. Time & stamina sweep
    results.extend(validate_time_clock(&rules, verbose));

    // 3. Spirit-root grading table
    results.extend(validate_spirit_root(&rules, verbose));

    // 4. Inheritance arithmetic
    results.extend(validate_inheritance(&rules, verbose));

    // 5. Engine lifecycle
    results.extend(validate_engine_lifecycle(&rules, verbose));

    // 6. Seeded lineage
    results.extend(run_lineage(&rules, &options));

    if !report(&results, verbose) {
        std::process::exit(1);
    }
}

/// Print the summary. Returns true when every check passed.
fn report(results: &[TestResult], verbose: bool) -> bool {
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );
    failed == 0
}

// ── 1. Rule Data ────────────────────────────────────────────────────────

fn validate_rule_data(results: &mut Vec<TestResult>) -> Option<RuleTable> {
    println!("--- Rule Data ---");

    let rules = match parse_rule_table(BUNDLED_RULES) {
        Ok(r) => r,
        Err(e) => {
            results.push(TestResult {
                name: "rules_parse".into(),
                passed: false,
                detail: e.to_string(),
            });
            return None;
        }
    };
    results.push(TestResult {
        name: "rules_parse".into(),
        passed: true,
        detail: "data/rules.json parsed and validated".into(),
    });

    results.push(TestResult {
        name: "rules_match_defaults".into(),
        passed: rules == RuleTable::default(),
        detail: "shipped table equals the built-in defaults".into(),
    });

    let mut missing = Vec::new();
    for element in Element::ALL {
        if !rules.spirit_root.elements.iter().any(|e| e.element == element) {
            missing.push(element.key());
        }
    }
    results.push(TestResult {
        name: "rules_all_elements".into(),
        passed: missing.is_empty(),
        detail: if missing.is_empty() {
            "all five elements have a name and colour".into()
        } else {
            format!("missing: {}", missing.join(", "))
        },
    });

    let ids: Vec<&str> = rules
        .spirit_root
        .grades
        .iter()
        .map(|g| g.id.as_str())
        .collect();
    results.push(TestResult {
        name: "rules_grade_ladder".into(),
        passed: ids == ["G1", "G2", "G3", "G4", "G5"],
        detail: format!("grades: {}", ids.join(" < ")),
    });

    results.push(TestResult {
        name: "rules_errands".into(),
        passed: !rules.errands.is_empty()
            && rules
                .errands
                .iter()
                .all(|e| e.cash_per_hour > 0.0 && e.stamina_per_hour > 0.0),
        detail: format!("{} errands with positive pay and cost", rules.errands.len()),
    });

    Some(rules)
}

// ── 2. Time & Stamina ───────────────────────────────────────────────────

fn validate_time_clock(rules: &RuleTable, verbose: bool) -> Vec<TestResult> {
    println!("--- Time & Stamina ---");
    let mut results = Vec::new();

    results.push(TestResult {
        name: "time_lifespan_days".into(),
        passed: lifespan_days(rules) == 30.0,
        detail: format!("lifespan {} in-game days", lifespan_days(rules)),
    });

    // Quarter-day sweep well past the ceiling
    let mut monotonic = true;
    let mut bounded = true;
    let mut last = age_from_days(rules, 0.0);
    for step in 0..=200 {
        let days = f64::from(step) * 0.25;
        let age = age_from_days(rules, days);
        monotonic &= age >= last;
        bounded &= age >= rules.time.start_age && age <= rules.time.max_age;
        last = age;
    }
    results.push(TestResult {
        name: "time_age_monotonic".into(),
        passed: monotonic,
        detail: "age never decreases over 50 days".into(),
    });
    results.push(TestResult {
        name: "time_age_bounded".into(),
        passed: bounded,
        detail: format!(
            "age stays within [{}, {}]",
            rules.time.start_age, rules.time.max_age
        ),
    });
    results.push(TestResult {
        name: "time_day_zero".into(),
        passed: age_from_days(rules, 0.0) == rules.time.start_age,
        detail: "day 0 is the starting age".into(),
    });

    let allowed: Vec<f64> = rules
        .stamina
        .tiers
        .iter()
        .map(|t| t.rate)
        .chain(std::iter::once(rules.stamina.default_rate))
        .collect();
    let mut stray = Vec::new();
    for age in rules.time.start_age as u32..=rules.time.max_age as u32 + 10 {
        let rate = recovery_rate_from_age(rules, f64::from(age));
        if !allowed.contains(&rate) {
            stray.push(age);
        }
        if verbose && age % 10 == 0 {
            println!("    age {:>3} → recovery ×{}", age, rate);
        }
    }
    results.push(TestResult {
        name: "time_rates_from_tiers".into(),
        passed: stray.is_empty(),
        detail: if stray.is_empty() {
            "every age maps to a tier rate or the default".into()
        } else {
            format!("ages with stray rates: {:?}", stray)
        },
    });

    let samples = [(16.0, 1.0), (40.0, 1.0), (41.0, 0.8), (60.0, 0.8), (61.0, 0.5)];
    let wrong: Vec<_> = samples
        .iter()
        .filter(|(age, rate)| recovery_rate_from_age(rules, *age) != *rate)
        .collect();
    results.push(TestResult {
        name: "time_tier_boundaries".into(),
        passed: wrong.is_empty(),
        detail: format!("{} tier boundaries checked", samples.len()),
    });

    results
}

// ── 3. Spirit Root ──────────────────────────────────────────────────────

fn validate_spirit_root(rules: &RuleTable, verbose: bool) -> Vec<TestResult> {
    println!("--- Spirit Root Grading ---");
    let mut results = Vec::new();

    let table: [(&str, Affinities, Option<Element>, f64, &str); 8] = [
        (
            "starting_profile",
            Affinities::new(20.0, 10.0, 10.0, 10.0, 10.0),
            Some(Element::Gold),
            33.33,
            "G1",
        ),
        ("no_affinity", Affinities::default(), None, 0.0, "G1"),
        (
            "tie_goes_first",
            Affinities::new(10.0, 10.0, 0.0, 0.0, 0.0),
            Some(Element::Gold),
            50.0,
            "G2",
        ),
        (
            "water_exact_g2",
            Affinities::new(0.0, 0.0, 40.0, 30.0, 30.0),
            Some(Element::Water),
            40.0,
            "G2",
        ),
        (
            "rounded_into_g2",
            Affinities::new(39.996, 20.002, 20.001, 20.001, 0.0),
            Some(Element::Gold),
            40.0,
            "G2",
        ),
        (
            "wood_g3",
            Affinities::new(0.0, 60.0, 40.0, 0.0, 0.0),
            Some(Element::Wood),
            60.0,
            "G3",
        ),
        (
            "fire_g4",
            Affinities::new(0.0, 0.0, 0.0, 85.0, 15.0),
            Some(Element::Fire),
            85.0,
            "G4",
        ),
        (
            "earth_g5",
            Affinities::new(5.0, 0.0, 0.0, 0.0, 95.0),
            Some(Element::Earth),
            95.0,
            "G5",
        ),
    ];

    for (label, affinities, dominant, purity, grade) in table {
        let r = grade_spirit_root(rules, &affinities);
        if verbose {
            println!(
                "    {:<18} → {} ({:.2}%, ×{})",
                label, r.description, r.purity, r.bonus
            );
        }
        let again = grade_spirit_root(rules, &affinities);
        results.push(TestResult {
            name: format!("root_{}", label),
            passed: r.dominant == dominant
                && r.purity == purity
                && r.grade.id == grade
                && r == again,
            detail: format!("{} purity {:.2} grade {}", r.description, r.purity, r.grade.id),
        });
    }

    let sentinel = grade_spirit_root(rules, &Affinities::default());
    results.push(TestResult {
        name: "root_sentinel_label".into(),
        passed: sentinel.description == rules.spirit_root.none_label,
        detail: sentinel.description,
    });

    results
}

// ── 4. Inheritance ──────────────────────────────────────────────────────

fn validate_inheritance(rules: &RuleTable, _verbose: bool) -> Vec<TestResult> {
    println!("--- Inheritance ---");
    let mut results = Vec::new();

    match settle_inheritance(rules, 3000, &[], Investment::new(3000, 0)) {
        Ok(r) => results.push(TestResult {
            name: "inherit_all_reinvested".into(),
            passed: r.starting_cash == 0
                && r.report.tax_paid == 0
                && r.stat_bonus.physique == 1
                && r.stat_bonus.qi == 0,
            detail: format!(
                "cash {} tax {} bonus +{}/+{}",
                r.starting_cash, r.report.tax_paid, r.stat_bonus.physique, r.stat_bonus.qi
            ),
        }),
        Err(e) => results.push(failure("inherit_all_reinvested", e)),
    }

    match settle_inheritance(rules, 10_000, &[], Investment::default()) {
        Ok(r) => results.push(TestResult {
            name: "inherit_half_taxed".into(),
            passed: r.starting_cash == 5000 && r.report.tax_paid == 5000,
            detail: format!("inherited {} tax {}", r.starting_cash, r.report.tax_paid),
        }),
        Err(e) => results.push(failure("inherit_half_taxed", e)),
    }

    let overspend = settle_inheritance(rules, 100, &[], Investment::new(200, 0));
    results.push(TestResult {
        name: "inherit_overspend_rejected".into(),
        passed: matches!(
            overspend,
            Err(InheritanceError::InvalidInvestment {
                requested: 200,
                available: 100
            })
        ),
        detail: match &overspend {
            Err(e) => e.to_string(),
            Ok(_) => "accepted an investment larger than the purse".into(),
        },
    });

    let overflow = settle_inheritance(rules, u64::MAX, &[], Investment::new(u64::MAX, 1));
    results.push(TestResult {
        name: "inherit_sum_overflow_rejected".into(),
        passed: overflow.is_err(),
        detail: "u64::MAX + 1 reinvested is rejected, not wrapped".into(),
    });

    let heirlooms = vec![Heirloom::new(1, "青銅古鏡"), Heirloom::new(2, "祖傳玉佩")];
    match settle_inheritance(rules, 500, &heirlooms, Investment::default()) {
        Ok(r) => results.push(TestResult {
            name: "inherit_heirlooms_untaxed".into(),
            passed: r.heirlooms == heirlooms && r.report.heirlooms_forfeited == 0,
            detail: format!("{} heirlooms carried", r.heirlooms.len()),
        }),
        Err(e) => results.push(failure("inherit_heirlooms_untaxed", e)),
    }

    match settle_inheritance(rules, 1_000_000, &[], Investment::new(200_000, 4_500)) {
        Ok(r) => results.push(TestResult {
            name: "inherit_cap_forfeits_excess".into(),
            passed: r.stat_bonus.physique == rules.awakening.stat_cap
                && r.stat_bonus.qi == 1
                && r.report.unconverted_investment == 50_000 + 1_500,
            detail: format!(
                "bonus +{}/+{}, unconverted {}",
                r.stat_bonus.physique, r.stat_bonus.qi, r.report.unconverted_investment
            ),
        }),
        Err(e) => results.push(failure("inherit_cap_forfeits_excess", e)),
    }

    let points_ok = stat_points(rules, 2999) == 0
        && stat_points(rules, 3000) == 1
        && stat_points(rules, u64::MAX) == rules.awakening.stat_cap;
    results.push(TestResult {
        name: "inherit_stat_points".into(),
        passed: points_ok,
        detail: "floor per point, capped".into(),
    });

    results.push(TestResult {
        name: "awakening_threshold".into(),
        passed: can_sense_spirit_root(rules, 100.0, 100.0)
            && !can_sense_spirit_root(rules, 100.0, 99.0)
            && legacy_preview(rules, 9000) == 3,
        detail: "both stats must reach the threshold".into(),
    });

    results
}

fn failure(name: &str, error: impl std::fmt::Display) -> TestResult {
    TestResult {
        name: name.into(),
        passed: false,
        detail: error.to_string(),
    }
}

// ── 5. Engine Lifecycle ─────────────────────────────────────────────────

fn validate_engine_lifecycle(rules: &RuleTable, _verbose: bool) -> Vec<TestResult> {
    println!("--- Engine Lifecycle ---");
    let mut results = Vec::new();

    // Daily ticks keep the sweep short
    let mut daily = rules.clone();
    daily.tick.ticks_per_day = 1.0;

    let mut engine = match LifeEngine::new(daily) {
        Ok(e) => e,
        Err(e) => {
            results.push(failure("engine_new", e));
            return results;
        }
    };

    let early = engine.rebirth(Investment::default());
    results.push(TestResult {
        name: "engine_no_early_rebirth".into(),
        passed: matches!(early, Err(EngineError::StillAlive { .. })),
        detail: "rebirth refused before the ceiling".into(),
    });

    let mut end_signals = 0;
    let mut ticks = 0;
    for _ in 0..40 {
        match engine.tick() {
            TickOutcome::Alive { .. } => ticks += 1,
            TickOutcome::EndOfLife { .. } => {
                ticks += 1;
                end_signals += 1;
            }
            TickOutcome::Expired => {}
        }
    }
    results.push(TestResult {
        name: "engine_end_of_life_once".into(),
        passed: end_signals == 1 && ticks == 30,
        detail: format!("{} ticks, {} end-of-life signal(s)", ticks, end_signals),
    });

    let errand = engine.perform_errand("dock_porter", 1.0);
    results.push(TestResult {
        name: "engine_no_errands_after_death".into(),
        passed: matches!(
            errand,
            Err(EngineError::Errand(ErrandError::LifespanExhausted))
        ),
        detail: "errands refused at the ceiling".into(),
    });

    match engine.rebirth(Investment::new(0, 0)) {
        Ok(_) => {
            let snap = engine.snapshot();
            results.push(TestResult {
                name: "engine_rebirth_resets_clock".into(),
                passed: snap.generation == 2
                    && snap.age == rules.time.start_age
                    && snap.days_elapsed == 0.0
                    && snap.stamina == rules.stamina.rebirth_stamina,
                detail: format!(
                    "generation {} at age {} with {} stamina",
                    snap.generation, snap.age, snap.stamina
                ),
            });
        }
        Err(e) => results.push(failure("engine_rebirth_resets_clock", e)),
    }

    let mut bad = rules.clone();
    bad.time.max_age = bad.time.start_age;
    results.push(TestResult {
        name: "engine_rejects_bad_rules".into(),
        passed: matches!(LifeEngine::new(bad), Err(EngineError::InvalidRules(_))),
        detail: "zero-length lifespan refused".into(),
    });

    results
}

// ── 6. Seeded Lineage ───────────────────────────────────────────────────

fn run_lineage(rules: &RuleTable, options: &Options) -> Vec<TestResult> {
    println!(
        "--- Lineage ({} generations, seed {}) ---",
        options.generations, options.seed
    );
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(options.seed);

    let mut engine = match LifeEngine::new(rules.clone()) {
        Ok(e) => e,
        Err(e) => {
            results.push(failure("lineage_start", e));
            return results;
        }
    };
    let founding_heirlooms = vec![Heirloom::new(1, "青銅古鏡"), Heirloom::new(2, "祖傳玉佩")];
    engine.state.heirlooms = founding_heirlooms.clone();

    let seconds_per_day = rules.tick.ticks_per_day * rules.tick.seconds_per_tick;
    let mut violations = Vec::new();
    let mut accounting_errors = Vec::new();
    let mut errands_run = 0u32;
    let mut errands_refused = 0u32;

    for _ in 0..options.generations {
        let generation = engine.state.generation;
        let mut last_age = engine.state.age;

        while !engine.is_end_of_life() {
            if let Some(errand) = rules.errands.choose(&mut rng) {
                let hours = f64::from(rng.gen_range(1u32..=8));
                match engine.perform_errand(&errand.id, hours) {
                    Ok(_) => errands_run += 1,
                    Err(EngineError::Errand(ErrandError::NotEnoughStamina { .. })) => {
                        errands_refused += 1
                    }
                    Err(e) => violations.push(format!("gen {}: {}", generation, e)),
                }
            }
            engine.update(seconds_per_day);

            let s = &engine.state;
            if s.age < last_age || s.age > rules.time.max_age {
                violations.push(format!("gen {}: age {} after {}", generation, s.age, last_age));
            }
            if !(0.0..=rules.stamina.max).contains(&s.stamina) {
                violations.push(format!("gen {}: stamina {}", generation, s.stamina));
            }
            last_age = s.age;
        }

        let cash = engine.state.cash;
        let budget = rng.gen_range(0..=cash);
        let physique = rng.gen_range(0..=budget);
        let investment = Investment::new(physique, budget - physique);

        log::debug!(
            "Generation {} ends with {} cash; reinvesting {}/{}",
            generation,
            cash,
            investment.physique,
            investment.qi
        );
        match engine.rebirth(investment) {
            Ok(report) => {
                let remaining = cash - report.total_reinvested;
                if engine.state.cash + report.tax_paid != remaining {
                    accounting_errors.push(format!(
                        "gen {}: {} + {} != {}",
                        generation, engine.state.cash, report.tax_paid, remaining
                    ));
                }
            }
            Err(e) => violations.push(format!("gen {} rebirth: {}", generation, e)),
        }
    }

    results.push(TestResult {
        name: "lineage_invariants".into(),
        passed: violations.is_empty(),
        detail: if violations.is_empty() {
            format!(
                "{} errands run, {} refused for stamina",
                errands_run, errands_refused
            )
        } else {
            violations.join("; ")
        },
    });
    results.push(TestResult {
        name: "lineage_cash_accounting".into(),
        passed: accounting_errors.is_empty(),
        detail: if accounting_errors.is_empty() {
            "inherited + tax == remaining every generation".into()
        } else {
            accounting_errors.join("; ")
        },
    });
    results.push(TestResult {
        name: "lineage_generation_count".into(),
        passed: engine.lineage.len() == options.generations as usize
            && engine.state.generation == options.generations + 1,
        detail: format!(
            "{} generations settled, now generation {}",
            engine.lineage.len(),
            engine.state.generation
        ),
    });
    results.push(TestResult {
        name: "lineage_heirlooms_preserved".into(),
        passed: engine.state.heirlooms == founding_heirlooms,
        detail: format!("{} heirlooms in hand", engine.state.heirlooms.len()),
    });

    if options.verbose {
        match serde_json::to_string_pretty(&engine.lineage) {
            Ok(json) => println!("{}", json),
            Err(e) => println!("    could not serialise lineage: {}", e),
        }
    }

    results
}
