//! Loading the rule table from JSON.
//!
//! The shipped table lives in `data/rules.json` and is embedded at compile
//! time; hosts may also load an override from disk. Either way the table is
//! validated before it is handed out, so a table that parses but breaks an
//! invariant never reaches the engine.

use std::path::Path;

use mirrorworld_logic::rules::{RuleError, RuleTable};

/// The shipped rule table.
pub const BUNDLED_RULES: &str = include_str!("../../../data/rules.json");

/// Errors that can occur while loading a rule table
#[derive(Debug)]
pub enum RulesFileError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Invalid(Vec<RuleError>),
}

impl From<std::io::Error> for RulesFileError {
    fn from(e: std::io::Error) -> Self {
        RulesFileError::Io(e)
    }
}

impl From<serde_json::Error> for RulesFileError {
    fn from(e: serde_json::Error) -> Self {
        RulesFileError::Json(e)
    }
}

impl std::fmt::Display for RulesFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RulesFileError::Io(e) => write!(f, "IO error: {}", e),
            RulesFileError::Json(e) => write!(f, "Rule file parse error: {}", e),
            RulesFileError::Invalid(errors) => {
                write!(f, "Rule table failed validation: ")?;
                let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                write!(f, "{}", messages.join("; "))
            }
        }
    }
}

impl std::error::Error for RulesFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RulesFileError::Io(e) => Some(e),
            RulesFileError::Json(e) => Some(e),
            RulesFileError::Invalid(_) => None,
        }
    }
}

/// Parse and validate a rule table from JSON text.
pub fn parse_rule_table(text: &str) -> Result<RuleTable, RulesFileError> {
    let rules: RuleTable = serde_json::from_str(text)?;
    let errors = rules.validate();
    if !errors.is_empty() {
        log::warn!("Rule table rejected with {} violation(s)", errors.len());
        return Err(RulesFileError::Invalid(errors));
    }
    Ok(rules)
}

/// Read, parse and validate a rule table file.
pub fn load_rule_table(path: impl AsRef<Path>) -> Result<RuleTable, RulesFileError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let rules = parse_rule_table(&text)?;
    log::info!("Loaded rule table from {}", path.display());
    Ok(rules)
}

/// The embedded `data/rules.json`, parsed and validated.
pub fn bundled_rule_table() -> Result<RuleTable, RulesFileError> {
    parse_rule_table(BUNDLED_RULES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_matches_default() {
        let bundled = bundled_rule_table().expect("bundled rules must load");
        assert_eq!(bundled, RuleTable::default());
    }

    #[test]
    fn test_default_serializes_and_reloads() {
        let json = serde_json::to_string_pretty(&RuleTable::default()).unwrap();
        let reloaded = parse_rule_table(&json).unwrap();
        assert_eq!(reloaded, RuleTable::default());
    }

    #[test]
    fn test_malformed_json() {
        let err = parse_rule_table("{ \"time\": ").unwrap_err();
        assert!(matches!(err, RulesFileError::Json(_)));
    }

    #[test]
    fn test_missing_section() {
        let err = parse_rule_table("{}").unwrap_err();
        assert!(matches!(err, RulesFileError::Json(_)));
    }

    #[test]
    fn test_invariant_violation_rejected() {
        let mut rules = RuleTable::default();
        rules.stamina.tiers.truncate(1);
        rules.spirit_root.grades.reverse();
        let json = serde_json::to_string(&rules).unwrap();
        match parse_rule_table(&json) {
            Err(RulesFileError::Invalid(errors)) => {
                assert!(errors.len() >= 2, "expected several violations: {:?}", errors);
            }
            other => panic!("expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = load_rule_table("/nonexistent/mirrorworld/rules.json").unwrap_err();
        assert!(matches!(err, RulesFileError::Io(_)));
        assert!(err.to_string().starts_with("IO error"));
    }

    #[test]
    fn test_invalid_message_lists_violations() {
        let err = RulesFileError::Invalid(vec![
            RuleError::EmptyGradeTable,
            RuleError::EmptyStaminaTiers,
        ]);
        assert_eq!(
            err.to_string(),
            "Rule table failed validation: spirit-root grade ladder is empty; stamina tier list is empty"
        );
    }
}
