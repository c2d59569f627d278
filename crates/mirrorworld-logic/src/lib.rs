//! Pure progression logic for Mirror World.
//!
//! This crate holds every rule of a character's life cycle that does not
//! depend on a clock, a screen, or storage. Functions take a borrowed
//! [`RuleTable`](rules::RuleTable) plus plain data and return results, so
//! the same logic serves the engine, the headless harness, and tests.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`awakening`] | Spirit-root sensing threshold, cash → starting-stat points |
//! | [`elements`] | The five elements and affinity profiles |
//! | [`errands`] | Paid errands trading stamina for cash |
//! | [`inheritance`] | Rebirth settlement: reinvestment, cash tax, heirlooms |
//! | [`rules`] | The immutable rule table and its integrity checks |
//! | [`spirit_root`] | Dominant element, purity, and grade |
//! | [`state`] | Per-generation character state and the tick contract |
//! | [`time_clock`] | Days → age, age → stamina recovery multiplier |

pub mod awakening;
pub mod elements;
pub mod errands;
pub mod inheritance;
pub mod rules;
pub mod spirit_root;
pub mod state;
pub mod time_clock;
