//! Folder exclusion rules.
//!
//! Machine-made photo folders are named with digits and symbols. A folder
//! whose name contains a letter has been renamed by a person, so it and
//! everything beneath it is treated as curated and left alone.

use crate::error::InvocationError;
use regex::Regex;

/// Any Latin or Cyrillic letter, in either case.
pub const DEFAULT_EXCLUSION_PATTERN: &str = "[a-zA-Zа-яА-ЯёЁ]";

/// Predicate over a directory's leaf name.
///
/// A matching name excludes the directory and its whole subtree.
#[derive(Debug, Clone)]
pub struct ExclusionRule {
    pattern: Regex,
}

impl ExclusionRule {
    /// Compiles a custom exclusion pattern.
    ///
    /// # Errors
    ///
    /// Returns [`InvocationError::InvalidExclusionPattern`] if `pattern`
    /// is not a valid regular expression.
    pub fn new(pattern: &str) -> Result<Self, InvocationError> {
        let pattern = Regex::new(pattern).map_err(|e| InvocationError::InvalidExclusionPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { pattern })
    }

    /// Whether a directory with this leaf name may be traversed.
    pub fn allows(&self, dir_name: &str) -> bool {
        !self.pattern.is_match(dir_name)
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Default for ExclusionRule {
    fn default() -> Self {
        Self {
            pattern: Regex::new(DEFAULT_EXCLUSION_PATTERN)
                .unwrap_or_else(|e| unreachable!("default exclusion pattern: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_folders_allowed() {
        let rule = ExclusionRule::default();
        assert!(rule.allows("2018"));
        assert!(rule.allows("2018-12-09"));
        assert!(rule.allows("100_0001"));
        assert!(rule.allows("2019.07 (2)"));
    }

    #[test]
    fn test_latin_names_excluded() {
        let rule = ExclusionRule::default();
        assert!(!rule.allows("Anna's trip"));
        assert!(!rule.allows("100CANON"));
        assert!(!rule.allows("x"));
    }

    #[test]
    fn test_cyrillic_names_excluded() {
        let rule = ExclusionRule::default();
        assert!(!rule.allows("Фото"));
        assert!(!rule.allows("2017 отпуск"));
        assert!(!rule.allows("ёлка"));
    }

    #[test]
    fn test_other_scripts_allowed() {
        // Only Latin and Cyrillic letters mark a curated folder.
        let rule = ExclusionRule::default();
        assert!(rule.allows("写真"));
    }

    #[test]
    fn test_custom_pattern() {
        let rule = ExclusionRule::new(r"^_").unwrap();
        assert!(!rule.allows("_keep"));
        assert!(rule.allows("holiday"));
        assert_eq!(rule.as_str(), "^_");
    }

    #[test]
    fn test_invalid_pattern_returns_error() {
        let result = ExclusionRule::new("[unclosed");
        assert!(matches!(
            result,
            Err(InvocationError::InvalidExclusionPattern { .. })
        ));
    }
}
