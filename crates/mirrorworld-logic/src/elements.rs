//! The five elements and per-character affinity profiles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the five elements a spirit root can lean towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Element {
    Gold,
    Wood,
    Water,
    Fire,
    Earth,
}

impl Element {
    /// Declared iteration order. Every scan over elements walks this array,
    /// so ties on the dominant element resolve to the earliest entry here.
    pub const ALL: [Element; 5] = [
        Element::Gold,
        Element::Wood,
        Element::Water,
        Element::Fire,
        Element::Earth,
    ];

    /// Stable upper-case key used in rule files and affinity maps.
    pub fn key(self) -> &'static str {
        match self {
            Element::Gold => "GOLD",
            Element::Wood => "WOOD",
            Element::Water => "WATER",
            Element::Fire => "FIRE",
            Element::Earth => "EARTH",
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Elemental affinity magnitudes for one character.
///
/// Values are non-negative relative weights; they need not sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Affinities {
    pub gold: f64,
    pub wood: f64,
    pub water: f64,
    pub fire: f64,
    pub earth: f64,
}

impl Affinities {
    pub fn new(gold: f64, wood: f64, water: f64, fire: f64, earth: f64) -> Self {
        Self {
            gold,
            wood,
            water,
            fire,
            earth,
        }
    }

    /// Get the magnitude for an element.
    pub fn get(&self, element: Element) -> f64 {
        match element {
            Element::Gold => self.gold,
            Element::Wood => self.wood,
            Element::Water => self.water,
            Element::Fire => self.fire,
            Element::Earth => self.earth,
        }
    }

    /// Set the magnitude for an element.
    pub fn set(&mut self, element: Element, value: f64) {
        match element {
            Element::Gold => self.gold = value,
            Element::Wood => self.wood = value,
            Element::Water => self.water = value,
            Element::Fire => self.fire = value,
            Element::Earth => self.earth = value,
        }
    }

    /// `(element, magnitude)` pairs in [`Element::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Element, f64)> + '_ {
        Element::ALL.iter().map(move |&e| (e, self.get(e)))
    }

    /// Sum of all five magnitudes.
    pub fn total(&self) -> f64 {
        self.iter().map(|(_, v)| v).sum()
    }
}
