//! Spirit-root grading.
//!
//! A character's five elemental affinities are reduced to a dominant
//! element, a purity percentage (the dominant element's share of the total)
//! and a grade from the rule table's ladder.
//!
//! # Grading
//!
//! 1. Sum all affinities. A zero total yields the "no affinity" result:
//!    no dominant element, purity 0, lowest grade.
//! 2. The dominant element is the strictly greatest magnitude, scanning in
//!    [`Element::ALL`] order. The first element seen wins ties.
//! 3. `purity = 100 × dominant / total`, rounded to two decimals.
//! 4. The grade is the highest rung whose requirement is ≤ the rounded purity.
//!    Matching on the rounded value is intentional: 39.996% displays as
//!    40.00% and grades as G2, never G1.
//!
//! ```
//! use mirrorworld_logic::elements::{Affinities, Element};
//! use mirrorworld_logic::rules::RuleTable;
//! use mirrorworld_logic::spirit_root::grade_spirit_root;
//!
//! let rules = RuleTable::default();
//! let result = grade_spirit_root(&rules, &Affinities::new(20.0, 10.0, 10.0, 10.0, 10.0));
//! assert_eq!(result.dominant, Some(Element::Gold));
//! assert_eq!(result.purity, 33.33);
//! assert_eq!(result.grade.id, "G1");
//! ```

use serde::{Deserialize, Serialize};

use crate::elements::{Affinities, Element};
use crate::rules::{GradeTier, RuleTable};

/// Graded spirit root. Derived data; recompute rather than store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpiritRootResult {
    /// `None` when the character has no affinity at all.
    pub dominant: Option<Element>,
    /// Dominant share of total affinity, 0–100, two decimals.
    pub purity: f64,
    pub grade: GradeTier,
    pub description: String,
    pub bonus: f64,
}

impl SpiritRootResult {
    /// Whether this is the zero-affinity result.
    pub fn is_unaffiliated(&self) -> bool {
        self.dominant.is_none()
    }
}

/// Strongest element and its magnitude. Ties go to the earliest element in
/// [`Element::ALL`].
pub fn dominant_element(affinities: &Affinities) -> (Element, f64) {
    let mut dominant = Element::ALL[0];
    let mut max = affinities.get(dominant);
    for &element in &Element::ALL[1..] {
        let value = affinities.get(element);
        if value > max {
            dominant = element;
            max = value;
        }
    }
    (dominant, max)
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Highest grade whose requirement `purity` meets.
///
/// # Panics
///
/// Panics if no grade matches, which only happens with a ladder whose
/// lowest rung requires more than 0 (rejected by `RuleTable::validate`).
pub fn grade_for_purity(rules: &RuleTable, purity: f64) -> &GradeTier {
    let found = rules
        .spirit_root
        .grades
        .iter()
        .rev()
        .find(|grade| grade.requirement <= purity);
    match found {
        Some(grade) => grade,
        None => panic!("no spirit-root grade accepts purity {purity}"),
    }
}

/// Grade an affinity profile.
pub fn grade_spirit_root(rules: &RuleTable, affinities: &Affinities) -> SpiritRootResult {
    let total = affinities.total();
    if total == 0.0 {
        let grade = rules.spirit_root.lowest_grade().clone();
        return SpiritRootResult {
            dominant: None,
            purity: 0.0,
            bonus: grade.bonus,
            description: rules.spirit_root.none_label.clone(),
            grade,
        };
    }

    let (dominant, magnitude) = dominant_element(affinities);
    let purity = round_to_hundredths(100.0 * magnitude / total);
    let grade = grade_for_purity(rules, purity).clone();
    let element = rules.spirit_root.element(dominant);

    SpiritRootResult {
        dominant: Some(dominant),
        purity,
        bonus: grade.bonus,
        description: format!("{}系 - {}", element.name, grade.name),
        grade,
    }
}
