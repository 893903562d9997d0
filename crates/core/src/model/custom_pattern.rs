use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::BreathingPattern;

pub const MAX_CUSTOM_NAME_LEN: usize = 64;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CustomPatternError {
    #[error("custom pattern name cannot be empty")]
    EmptyName,
    #[error("custom pattern name is too long ({len} > {max})")]
    NameTooLong { len: usize, max: usize },
}

/// A user-defined breathing rhythm saved under a unique name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomPattern {
    name: String,
    pattern: BreathingPattern,
    created_at: DateTime<Utc>,
}

impl CustomPattern {
    /// Create a custom pattern, trimming the name.
    ///
    /// # Errors
    ///
    /// Returns `CustomPatternError` if the trimmed name is empty or too long.
    pub fn new(
        name: impl Into<String>,
        pattern: BreathingPattern,
        created_at: DateTime<Utc>,
    ) -> Result<Self, CustomPatternError> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(CustomPatternError::EmptyName);
        }
        let len = name.chars().count();
        if len > MAX_CUSTOM_NAME_LEN {
            return Err(CustomPatternError::NameTooLong {
                len,
                max: MAX_CUSTOM_NAME_LEN,
            });
        }
        Ok(Self {
            name,
            pattern,
            created_at,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn pattern(&self) -> &BreathingPattern {
        &self.pattern
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PatternDraft;
    use crate::time::fixed_now;

    fn pattern() -> BreathingPattern {
        PatternDraft::new(4.0, 4.0, 4.0, 4.0, 5).validate().unwrap()
    }

    #[test]
    fn trims_name() {
        let custom = CustomPattern::new("  Evening  ", pattern(), fixed_now()).unwrap();
        assert_eq!(custom.name(), "Evening");
    }

    #[test]
    fn rejects_blank_and_long_names() {
        assert_eq!(
            CustomPattern::new("   ", pattern(), fixed_now()),
            Err(CustomPatternError::EmptyName)
        );
        let long = "x".repeat(MAX_CUSTOM_NAME_LEN + 1);
        assert!(matches!(
            CustomPattern::new(long, pattern(), fixed_now()),
            Err(CustomPatternError::NameTooLong { .. })
        ));
    }
}
