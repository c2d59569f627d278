//! Paid errands, the character's way of earning cash during a lifetime.
//!
//! Each errand in the rule table pays a fixed amount of cash per in-game
//! hour and costs stamina per hour. An errand either runs in full or not at
//! all; a failed attempt leaves the state untouched.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rules::RuleTable;
use crate::state::ProgressionState;

/// What a completed errand paid and cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrandOutcome {
    pub errand_id: String,
    pub hours: f64,
    pub cash_earned: u64,
    pub stamina_spent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrandError {
    /// No errand with this id in the rule table.
    UnknownErrand(String),
    /// Hours must be positive.
    InvalidHours(f64),
    /// The errand costs more stamina than the character has.
    NotEnoughStamina { required: f64, available: f64 },
    /// The generation has reached its lifespan ceiling.
    LifespanExhausted,
}

impl fmt::Display for ErrandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrandError::UnknownErrand(id) => write!(f, "Unknown errand '{}'", id),
            ErrandError::InvalidHours(h) => write!(f, "Errand hours must be positive, got {}", h),
            ErrandError::NotEnoughStamina {
                required,
                available,
            } => write!(
                f,
                "Errand needs {:.1} stamina, only {:.1} available",
                required, available
            ),
            ErrandError::LifespanExhausted => write!(f, "Lifespan exhausted; awaiting rebirth"),
        }
    }
}

impl std::error::Error for ErrandError {}

/// Run errand `errand_id` for `hours`.
///
/// Deducts `hours × stamina_per_hour` stamina and adds
/// `floor(hours × cash_per_hour)` cash.
pub fn perform_errand(
    rules: &RuleTable,
    state: &mut ProgressionState,
    errand_id: &str,
    hours: f64,
) -> Result<ErrandOutcome, ErrandError> {
    let errand = rules
        .errand(errand_id)
        .ok_or_else(|| ErrandError::UnknownErrand(errand_id.to_string()))?;
    if !(hours > 0.0) {
        return Err(ErrandError::InvalidHours(hours));
    }
    if state.is_end_of_life(rules) {
        return Err(ErrandError::LifespanExhausted);
    }

    let stamina_spent = hours * errand.stamina_per_hour;
    if stamina_spent > state.stamina {
        return Err(ErrandError::NotEnoughStamina {
            required: stamina_spent,
            available: state.stamina,
        });
    }

    let cash_earned = (hours * errand.cash_per_hour).floor() as u64;
    state.stamina -= stamina_spent;
    state.cash = state.cash.saturating_add(cash_earned);

    Ok(ErrandOutcome {
        errand_id: errand.id.clone(),
        hours,
        cash_earned,
        stamina_spent,
    })
}
