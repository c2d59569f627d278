//! Life engine - owns one character's progression and drives it forward
//!
//! The engine is the single writer of a [`ProgressionState`]. A host calls
//! [`LifeEngine::update`] from its frame or timer loop, polls
//! [`LifeEngine::snapshot`] to render, and calls [`LifeEngine::rebirth`] once
//! the lifespan ceiling is reached.

use serde::{Deserialize, Serialize};

use mirrorworld_logic::awakening::{can_sense_spirit_root, legacy_preview};
use mirrorworld_logic::errands::{perform_errand, ErrandError, ErrandOutcome};
use mirrorworld_logic::inheritance::{
    settle_inheritance, InheritanceError, InheritanceReport, Investment, StatBonus,
};
use mirrorworld_logic::rules::{RuleError, RuleTable};
use mirrorworld_logic::spirit_root::{grade_spirit_root, SpiritRootResult};
use mirrorworld_logic::state::{clamp_stamina, ProgressionState, TickOutcome};
use mirrorworld_logic::time_clock::age_from_days;

/// Record of a finished generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub generation: u32,
    /// Cash held at end of life, before settlement
    pub final_cash: u64,
    pub final_physique: f64,
    pub final_qi: f64,
    /// Grade id of the spirit root at end of life
    pub spirit_root_grade: String,
    pub stat_bonus: StatBonus,
    pub heirlooms_carried: usize,
    pub report: InheritanceReport,
}

/// Everything a presentation layer polls once per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub generation: u32,
    pub age: f64,
    pub days_elapsed: f64,
    pub days_remaining: f64,
    pub stamina: f64,
    pub recovery_rate: f64,
    pub physique: f64,
    pub qi: f64,
    pub cash: u64,
    pub heirloom_count: usize,
    pub awakened: bool,
    pub spirit_root: SpiritRootResult,
    /// Starting-stat points the whole purse would buy on one attribute
    pub legacy_preview: u32,
    pub end_of_life: bool,
}

/// Errors surfaced by the engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The rule table broke one or more invariants.
    InvalidRules(Vec<RuleError>),
    /// Rebirth requested before the lifespan ceiling.
    StillAlive { age: f64, max_age: f64 },
    Inheritance(InheritanceError),
    Errand(ErrandError),
}

impl From<InheritanceError> for EngineError {
    fn from(e: InheritanceError) -> Self {
        EngineError::Inheritance(e)
    }
}

impl From<ErrandError> for EngineError {
    fn from(e: ErrandError) -> Self {
        EngineError::Errand(e)
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidRules(errors) => {
                write!(f, "Invalid rule table ({} violations)", errors.len())
            }
            EngineError::StillAlive { age, max_age } => write!(
                f,
                "Cannot rebirth at age {:.2}; lifespan ends at {}",
                age, max_age
            ),
            EngineError::Inheritance(e) => write!(f, "{}", e),
            EngineError::Errand(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Inheritance(e) => Some(e),
            EngineError::Errand(e) => Some(e),
            _ => None,
        }
    }
}

/// Main life engine
pub struct LifeEngine {
    rules: RuleTable,
    /// Current generation's state
    pub state: ProgressionState,
    /// Finished generations, oldest first
    pub lineage: Vec<GenerationSummary>,
    /// Wall-clock seconds not yet turned into a tick
    pending_seconds: f64,
}

impl LifeEngine {
    /// Start a founding generation. Fails if the rule table is invalid.
    ///
    /// ```
    /// use mirrorworld_core::engine::LifeEngine;
    /// use mirrorworld_logic::rules::RuleTable;
    ///
    /// let engine = LifeEngine::new(RuleTable::default()).unwrap();
    /// assert_eq!(engine.snapshot().age, 16.0);
    /// ```
    pub fn new(rules: RuleTable) -> Result<Self, EngineError> {
        let state = ProgressionState::first(&rules);
        Self::with_state(rules, state)
    }

    /// Resume from a state the host stored earlier.
    ///
    /// Age is rederived from `days_elapsed` and stamina is clamped to the
    /// cap, so a stale or hand-edited state cannot break either bound.
    pub fn with_state(rules: RuleTable, mut state: ProgressionState) -> Result<Self, EngineError> {
        let errors = rules.validate();
        if !errors.is_empty() {
            for e in &errors {
                log::warn!("Rule table violation: {}", e);
            }
            return Err(EngineError::InvalidRules(errors));
        }

        let age = age_from_days(&rules, state.days_elapsed.max(0.0));
        let stamina = clamp_stamina(&rules, state.stamina);
        if age != state.age || stamina != state.stamina {
            log::warn!(
                "Stored state corrected: age {} -> {}, stamina {} -> {}",
                state.age,
                age,
                state.stamina,
                stamina
            );
        }
        state.days_elapsed = state.days_elapsed.max(0.0);
        state.age = age;
        state.stamina = stamina;

        log::info!(
            "Generation {} begins at age {:.1} with {} cash",
            state.generation,
            state.age,
            state.cash
        );
        Ok(Self {
            rules,
            state,
            lineage: Vec::new(),
            pending_seconds: 0.0,
        })
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Apply exactly one tick.
    pub fn tick(&mut self) -> TickOutcome {
        let outcome = self.state.tick(&self.rules);
        if let TickOutcome::EndOfLife { age } = outcome {
            self.pending_seconds = 0.0;
            log::info!(
                "Generation {} reached end of life at age {:.1} holding {} cash",
                self.state.generation,
                age,
                self.state.cash
            );
        }
        outcome
    }

    /// Advance by `delta_seconds` of wall-clock time.
    ///
    /// Whole ticks are applied at the rule table's `seconds_per_tick`
    /// cadence; leftovers carry into the next call. Stops at end of life.
    /// Returns the number of ticks applied.
    pub fn update(&mut self, delta_seconds: f64) -> usize {
        if self.is_end_of_life() {
            return 0;
        }
        self.pending_seconds += delta_seconds.max(0.0);

        let interval = self.rules.tick.seconds_per_tick;
        let mut applied = 0;
        while self.pending_seconds >= interval {
            self.pending_seconds -= interval;
            applied += 1;
            if !matches!(self.tick(), TickOutcome::Alive { .. }) {
                break;
            }
        }
        applied
    }

    pub fn is_end_of_life(&self) -> bool {
        self.state.is_end_of_life(&self.rules)
    }

    pub fn recovery_rate(&self) -> f64 {
        self.state.recovery_rate(&self.rules)
    }

    pub fn days_remaining(&self) -> f64 {
        self.state.days_remaining(&self.rules)
    }

    pub fn spirit_root(&self) -> SpiritRootResult {
        grade_spirit_root(&self.rules, &self.state.affinities)
    }

    /// Whether physique and qi are high enough to sense the spirit root.
    pub fn is_awakened(&self) -> bool {
        can_sense_spirit_root(&self.rules, self.state.physique, self.state.qi)
    }

    pub fn legacy_preview(&self) -> u32 {
        legacy_preview(&self.rules, self.state.cash)
    }

    /// Run a paid errand for `hours`.
    pub fn perform_errand(
        &mut self,
        errand_id: &str,
        hours: f64,
    ) -> Result<ErrandOutcome, EngineError> {
        let outcome = perform_errand(&self.rules, &mut self.state, errand_id, hours)?;
        log::debug!(
            "Errand {} for {:.1}h: +{} cash, -{:.1} stamina",
            outcome.errand_id,
            outcome.hours,
            outcome.cash_earned,
            outcome.stamina_spent
        );
        Ok(outcome)
    }

    /// Settle the estate and start the next generation.
    ///
    /// Only allowed at end of life. On any error the current state is left
    /// as it was.
    pub fn rebirth(&mut self, investment: Investment) -> Result<InheritanceReport, EngineError> {
        if !self.is_end_of_life() {
            return Err(EngineError::StillAlive {
                age: self.state.age,
                max_age: self.rules.time.max_age,
            });
        }

        let settled = match settle_inheritance(
            &self.rules,
            self.state.cash,
            &self.state.heirlooms,
            investment,
        ) {
            Ok(settled) => settled,
            Err(e) => {
                log::warn!("Rebirth rejected: {}", e);
                return Err(e.into());
            }
        };

        let report = settled.report.clone();
        let summary = GenerationSummary {
            generation: self.state.generation,
            final_cash: self.state.cash,
            final_physique: self.state.physique,
            final_qi: self.state.qi,
            spirit_root_grade: self.spirit_root().grade.id,
            stat_bonus: settled.stat_bonus,
            heirlooms_carried: settled.heirlooms.len(),
            report: report.clone(),
        };

        self.state = self.state.successor(&self.rules, settled);
        self.pending_seconds = 0.0;
        log::info!(
            "Rebirth: generation {} settled (reinvested {}, tax {}); generation {} starts with {} cash",
            summary.generation,
            report.total_reinvested,
            report.tax_paid,
            self.state.generation,
            self.state.cash
        );
        self.lineage.push(summary);
        Ok(report)
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            generation: self.state.generation,
            age: self.state.age,
            days_elapsed: self.state.days_elapsed,
            days_remaining: self.days_remaining(),
            stamina: self.state.stamina,
            recovery_rate: self.recovery_rate(),
            physique: self.state.physique,
            qi: self.state.qi,
            cash: self.state.cash,
            heirloom_count: self.state.heirlooms.len(),
            awakened: self.is_awakened(),
            spirit_root: self.spirit_root(),
            legacy_preview: self.legacy_preview(),
            end_of_life: self.is_end_of_life(),
        }
    }
}
