//! Mirror World Core - Life Engine
//!
//! Owns one character's [`ProgressionState`](mirrorworld_logic::state::ProgressionState)
//! and drives it from wall-clock time: ticks at a fixed cadence, paid
//! errands, end of life, and rebirth into the next generation.
//!
//! # Architecture
//!
//! - **Rules**: an immutable [`RuleTable`](mirrorworld_logic::rules::RuleTable),
//!   loaded from `data/rules.json` by [`rules_file`] and validated up front
//! - **Engine**: [`engine::LifeEngine`] is the single writer of the state
//! - **Logic**: every formula lives in `mirrorworld-logic`; this crate only
//!   sequences calls and keeps the lineage
//!
//! # Example
//!
//! ```rust,no_run
//! use mirrorworld_core::prelude::*;
//!
//! let rules = bundled_rule_table().unwrap();
//! let mut engine = LifeEngine::new(rules).unwrap();
//!
//! loop {
//!     engine.update(1.0 / 60.0); // 60 FPS
//!     if engine.is_end_of_life() {
//!         engine.rebirth(Investment::default()).unwrap();
//!     }
//! }
//! ```

pub mod engine;
pub mod rules_file;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::engine::{EngineError, EngineSnapshot, GenerationSummary, LifeEngine};
    pub use crate::rules_file::{bundled_rule_table, load_rule_table, RulesFileError};
    pub use mirrorworld_logic::inheritance::{InheritanceReport, Investment};
    pub use mirrorworld_logic::rules::RuleTable;
    pub use mirrorworld_logic::state::{Heirloom, ProgressionState, TickOutcome};
}
