//! Rule table: every game constant the progression engine reads.
//!
//! The table is plain data. Each sub-table has a `Default` carrying the
//! canonical Mirror World numbers, and the whole table derives `serde` so a
//! host can ship it as `data/rules.json`. Calculators only ever borrow it.
//!
//! | Sub-table | Governs |
//! |-----------|---------|
//! | [`TimeRules`] | starting age, years per in-game day, lifespan ceiling |
//! | [`TickRules`] | tick cadence and base stamina recovery per tick |
//! | [`StaminaRules`] | stamina cap and age-tiered recovery multipliers |
//! | [`AwakeningRules`] | spirit-root sensing threshold, reinvestment exchange rate |
//! | [`InheritanceRules`] | cash and heirloom tax on rebirth |
//! | [`SpiritRootRules`] | element names and the purity grade ladder |
//! | [`ErrandRule`] | paid errands a character can run for cash |
//!
//! ```
//! use mirrorworld_logic::rules::RuleTable;
//!
//! let rules = RuleTable::default();
//! assert!(rules.validate().is_empty());
//! assert_eq!(rules.time.max_age, 76.0);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::elements::Element;

/// The complete, immutable rule set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTable {
    pub time: TimeRules,
    pub tick: TickRules,
    pub stamina: StaminaRules,
    pub awakening: AwakeningRules,
    pub inheritance: InheritanceRules,
    pub spirit_root: SpiritRootRules,
    pub errands: Vec<ErrandRule>,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self {
            time: TimeRules::default(),
            tick: TickRules::default(),
            stamina: StaminaRules::default(),
            awakening: AwakeningRules::default(),
            inheritance: InheritanceRules::default(),
            spirit_root: SpiritRootRules::default(),
            errands: default_errands(),
        }
    }
}

/// Age progression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRules {
    /// Age every generation starts at.
    pub start_age: f64,
    /// Years of age gained per elapsed in-game day.
    pub years_per_day: f64,
    /// Lifespan ceiling; reaching it ends the generation.
    pub max_age: f64,
}

impl Default for TimeRules {
    fn default() -> Self {
        Self {
            start_age: 16.0,
            years_per_day: 2.0,
            max_age: 76.0,
        }
    }
}

/// How the owner's wall-clock tick maps onto in-game time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickRules {
    /// Ticks that make up one in-game day.
    pub ticks_per_day: f64,
    /// Wall-clock seconds between ticks.
    pub seconds_per_tick: f64,
    /// Stamina restored per tick before the age multiplier.
    pub base_recovery_per_tick: f64,
}

impl TickRules {
    /// Fraction of an in-game day each tick advances.
    pub fn days_per_tick(&self) -> f64 {
        1.0 / self.ticks_per_day
    }
}

impl Default for TickRules {
    fn default() -> Self {
        Self {
            ticks_per_day: 86_400.0,
            seconds_per_tick: 1.0,
            base_recovery_per_tick: 0.05,
        }
    }
}

/// One age bracket of stamina recovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaminaTier {
    /// Inclusive upper age bound of the bracket.
    pub max_age: f64,
    /// Recovery multiplier applied inside the bracket.
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaminaRules {
    /// Stamina cap.
    pub max: f64,
    /// Stamina a freshly reborn character starts with.
    pub rebirth_stamina: f64,
    /// Brackets ordered by `max_age` ascending.
    pub tiers: Vec<StaminaTier>,
    /// Multiplier for ages past the last bracket.
    pub default_rate: f64,
}

impl Default for StaminaRules {
    fn default() -> Self {
        Self {
            max: 100.0,
            rebirth_stamina: 100.0,
            tiers: vec![
                StaminaTier {
                    max_age: 40.0,
                    rate: 1.0,
                },
                StaminaTier {
                    max_age: 60.0,
                    rate: 0.8,
                },
                StaminaTier {
                    max_age: 76.0,
                    rate: 0.5,
                },
            ],
            default_rate: 0.5,
        }
    }
}

/// Spirit-root sensing and the cash → starting-stat exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwakeningRules {
    /// Physique and qi must both reach this to sense a spirit root.
    pub stat_threshold: f64,
    /// Cash spent per starting-stat point at rebirth.
    pub cash_per_point: u64,
    /// Most points one attribute can receive from reinvestment.
    pub stat_cap: u32,
    /// Physique every generation starts with before bonuses.
    pub base_physique: f64,
    /// Qi every generation starts with before bonuses.
    pub base_qi: f64,
}

impl Default for AwakeningRules {
    fn default() -> Self {
        Self {
            stat_threshold: 100.0,
            cash_per_point: 3000,
            stat_cap: 50,
            base_physique: 15.0,
            base_qi: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InheritanceRules {
    /// Fraction of un-reinvested cash withheld at rebirth.
    pub cash_tax: f64,
    /// Fraction of heirlooms withheld at rebirth (0.0 = all pass through).
    pub heirloom_tax: f64,
    /// Informational note attached to every inheritance report.
    pub note: String,
}

impl Default for InheritanceRules {
    fn default() -> Self {
        Self {
            cash_tax: 0.5,
            heirloom_tax: 0.0,
            note: "高代價傳承已生效".to_string(),
        }
    }
}

/// Display data for one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRule {
    pub element: Element,
    pub name: String,
    pub color: String,
}

/// One rung of the spirit-root grade ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeTier {
    pub id: String,
    pub name: String,
    /// Minimum purity percentage for this grade.
    pub requirement: f64,
    /// Cultivation bonus multiplier granted by this grade.
    pub bonus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpiritRootRules {
    /// Exactly one entry per [`Element`].
    pub elements: Vec<ElementRule>,
    /// Grades ordered by `requirement` ascending; the first must require 0.
    pub grades: Vec<GradeTier>,
    /// Description used when a character has no affinity at all.
    pub none_label: String,
}

impl SpiritRootRules {
    /// Display data for an element.
    ///
    /// # Panics
    ///
    /// Panics when the table has no entry for `element`; [`RuleTable::validate`]
    /// reports such tables as [`RuleError::MissingElement`].
    pub fn element(&self, element: Element) -> &ElementRule {
        match self.elements.iter().find(|r| r.element == element) {
            Some(rule) => rule,
            None => panic!("rule table has no display entry for element {element}"),
        }
    }

    /// The grade with the lowest requirement.
    ///
    /// # Panics
    ///
    /// Panics on an empty grade ladder.
    pub fn lowest_grade(&self) -> &GradeTier {
        match self.grades.first() {
            Some(grade) => grade,
            None => panic!("rule table has an empty spirit-root grade ladder"),
        }
    }
}

impl Default for SpiritRootRules {
    fn default() -> Self {
        let element = |element, name: &str, color: &str| ElementRule {
            element,
            name: name.to_string(),
            color: color.to_string(),
        };
        let grade = |id: &str, name: &str, requirement, bonus| GradeTier {
            id: id.to_string(),
            name: name.to_string(),
            requirement,
            bonus,
        };
        Self {
            elements: vec![
                element(Element::Gold, "金", "#FFD700"),
                element(Element::Wood, "木", "#228B22"),
                element(Element::Water, "水", "#1E90FF"),
                element(Element::Fire, "火", "#FF4500"),
                element(Element::Earth, "土", "#8B4513"),
            ],
            grades: vec![
                grade("G1", "雜靈根", 0.0, 1.1),
                grade("G2", "真靈根", 40.0, 1.3),
                grade("G3", "地靈根", 60.0, 1.6),
                grade("G4", "天靈根", 85.0, 2.0),
                grade("G5", "仙靈根", 95.0, 3.0),
            ],
            none_label: "凡根 (無屬性)".to_string(),
        }
    }
}

/// A paid errand: cash earned and stamina spent per in-game hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrandRule {
    pub id: String,
    pub name: String,
    pub cash_per_hour: f64,
    pub stamina_per_hour: f64,
}

fn default_errands() -> Vec<ErrandRule> {
    let errand = |id: &str, name: &str, cash_per_hour| ErrandRule {
        id: id.to_string(),
        name: name.to_string(),
        cash_per_hour,
        stamina_per_hour: 5.0,
    };
    vec![
        errand("dock_porter", "碼頭挑夫", 20.0),
        errand("apothecary", "藥鋪搗藥", 15.0),
        errand("blacksmith", "鐵匠幫忙", 25.0),
    ]
}

/// A rule-table integrity violation.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleError {
    /// A rate or quantity that must be strictly positive is not.
    NotPositive { field: &'static str, value: f64 },
    /// Lifespan ceiling is not above the starting age.
    InvalidLifespan { start_age: f64, max_age: f64 },
    /// No stamina brackets at all.
    EmptyStaminaTiers,
    /// Stamina bracket at `index` does not raise the age bound.
    StaminaTiersOutOfOrder { index: usize },
    /// Last stamina bracket stops short of the lifespan ceiling.
    StaminaTiersNotExhaustive { last_bound: f64, max_age: f64 },
    /// A recovery rate or multiplier below zero.
    Negative { field: &'static str, value: f64 },
    /// Stamina bracket at `index` has a negative multiplier.
    NegativeTierRate { index: usize, rate: f64 },
    /// Stamina granted on rebirth exceeds the stamina cap.
    RebirthStaminaAboveMax { rebirth_stamina: f64, max: f64 },
    /// A tax rate outside `[0, 1]`.
    TaxRateOutOfRange { field: &'static str, value: f64 },
    /// An element has no display entry.
    MissingElement(Element),
    /// An element has more than one display entry.
    DuplicateElement(Element),
    /// No spirit-root grades at all.
    EmptyGradeTable,
    /// Grade at `index` does not raise the requirement.
    GradesOutOfOrder { index: usize },
    /// Lowest grade requires more than 0 purity, so some profiles match nothing.
    LowestGradeNotZero(f64),
    /// Two errands share an id.
    DuplicateErrand(String),
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleError::NotPositive { field, value } => {
                write!(f, "{} must be positive, got {}", field, value)
            }
            RuleError::InvalidLifespan { start_age, max_age } => write!(
                f,
                "max_age {} must be greater than start_age {}",
                max_age, start_age
            ),
            RuleError::EmptyStaminaTiers => write!(f, "stamina tier list is empty"),
            RuleError::StaminaTiersOutOfOrder { index } => {
                write!(f, "stamina tier {} is not above the previous bound", index)
            }
            RuleError::StaminaTiersNotExhaustive {
                last_bound,
                max_age,
            } => write!(
                f,
                "stamina tiers end at age {} but lifespan runs to {}",
                last_bound, max_age
            ),
            RuleError::Negative { field, value } => {
                write!(f, "{} must not be negative, got {}", field, value)
            }
            RuleError::NegativeTierRate { index, rate } => {
                write!(f, "stamina tier {} has negative rate {}", index, rate)
            }
            RuleError::RebirthStaminaAboveMax {
                rebirth_stamina,
                max,
            } => write!(
                f,
                "rebirth_stamina {} exceeds stamina.max {}",
                rebirth_stamina, max
            ),
            RuleError::TaxRateOutOfRange { field, value } => {
                write!(f, "{} must be within [0, 1], got {}", field, value)
            }
            RuleError::MissingElement(e) => write!(f, "element {} has no display entry", e),
            RuleError::DuplicateElement(e) => write!(f, "element {} is listed twice", e),
            RuleError::EmptyGradeTable => write!(f, "spirit-root grade ladder is empty"),
            RuleError::GradesOutOfOrder { index } => {
                write!(f, "grade {} does not raise the purity requirement", index)
            }
            RuleError::LowestGradeNotZero(req) => {
                write!(f, "lowest grade must require 0 purity, requires {}", req)
            }
            RuleError::DuplicateErrand(id) => write!(f, "errand id '{}' is defined twice", id),
        }
    }
}

impl std::error::Error for RuleError {}

impl RuleTable {
    /// Look up an errand by id.
    pub fn errand(&self, id: &str) -> Option<&ErrandRule> {
        self.errands.iter().find(|e| e.id == id)
    }

    /// Check every table invariant, returning all violations found.
    pub fn validate(&self) -> Vec<RuleError> {
        let mut errors = Vec::new();

        let positives = [
            ("time.years_per_day", self.time.years_per_day),
            ("tick.ticks_per_day", self.tick.ticks_per_day),
            ("tick.seconds_per_tick", self.tick.seconds_per_tick),
            ("stamina.max", self.stamina.max),
        ];
        for (field, value) in positives {
            if !(value > 0.0) {
                errors.push(RuleError::NotPositive { field, value });
            }
        }
        if self.awakening.cash_per_point == 0 {
            errors.push(RuleError::NotPositive {
                field: "awakening.cash_per_point",
                value: 0.0,
            });
        }
        if !(self.time.max_age > self.time.start_age) {
            errors.push(RuleError::InvalidLifespan {
                start_age: self.time.start_age,
                max_age: self.time.max_age,
            });
        }

        for (field, value) in [
            ("tick.base_recovery_per_tick", self.tick.base_recovery_per_tick),
            ("stamina.default_rate", self.stamina.default_rate),
            ("stamina.rebirth_stamina", self.stamina.rebirth_stamina),
        ] {
            if !(value >= 0.0) {
                errors.push(RuleError::Negative { field, value });
            }
        }
        if self.stamina.rebirth_stamina > self.stamina.max {
            errors.push(RuleError::RebirthStaminaAboveMax {
                rebirth_stamina: self.stamina.rebirth_stamina,
                max: self.stamina.max,
            });
        }
        for (index, tier) in self.stamina.tiers.iter().enumerate() {
            if !(tier.rate >= 0.0) {
                errors.push(RuleError::NegativeTierRate {
                    index,
                    rate: tier.rate,
                });
            }
        }

        match self.stamina.tiers.last() {
            None => errors.push(RuleError::EmptyStaminaTiers),
            Some(last) => {
                for (index, pair) in self.stamina.tiers.windows(2).enumerate() {
                    if !(pair[1].max_age > pair[0].max_age) {
                        errors.push(RuleError::StaminaTiersOutOfOrder { index: index + 1 });
                    }
                }
                if last.max_age < self.time.max_age {
                    errors.push(RuleError::StaminaTiersNotExhaustive {
                        last_bound: last.max_age,
                        max_age: self.time.max_age,
                    });
                }
            }
        }

        for (field, value) in [
            ("inheritance.cash_tax", self.inheritance.cash_tax),
            ("inheritance.heirloom_tax", self.inheritance.heirloom_tax),
        ] {
            if !(0.0..=1.0).contains(&value) {
                errors.push(RuleError::TaxRateOutOfRange { field, value });
            }
        }

        for element in Element::ALL {
            let count = self
                .spirit_root
                .elements
                .iter()
                .filter(|r| r.element == element)
                .count();
            match count {
                0 => errors.push(RuleError::MissingElement(element)),
                1 => {}
                _ => errors.push(RuleError::DuplicateElement(element)),
            }
        }

        match self.spirit_root.grades.first() {
            None => errors.push(RuleError::EmptyGradeTable),
            Some(lowest) => {
                if lowest.requirement != 0.0 {
                    errors.push(RuleError::LowestGradeNotZero(lowest.requirement));
                }
                for (index, pair) in self.spirit_root.grades.windows(2).enumerate() {
                    if !(pair[1].requirement > pair[0].requirement) {
                        errors.push(RuleError::GradesOutOfOrder { index: index + 1 });
                    }
                }
            }
        }

        let mut seen: Vec<&str> = Vec::new();
        for errand in &self.errands {
            if seen.contains(&errand.id.as_str()) {
                errors.push(RuleError::DuplicateErrand(errand.id.clone()));
            } else {
                seen.push(&errand.id);
            }
        }

        errors
    }
}
