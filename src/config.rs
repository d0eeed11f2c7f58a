//! Configuration for conformance checking.

use crate::document::MAX_RESOLVE_DEPTH;

/// Environment variable that switches on full-check mode.
pub const FULL_CHECK_ENV: &str = "PDFA_FULL_CHECK";

/// Checker configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckerConfig {
    /// Re-walk content streams that were flushed (checked) by an earlier pass.
    pub full_check: bool,

    /// Maximum nesting of form XObjects, patterns and Type 3 glyphs followed
    /// from one content stream.
    pub max_resolve_depth: u32,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckerConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            full_check: false,
            max_resolve_depth: MAX_RESOLVE_DEPTH,
        }
    }

    /// Enable full-check mode.
    pub fn with_full_check(mut self, enable: bool) -> Self {
        self.full_check = enable;
        self
    }

    /// Set the nesting limit.
    pub fn with_max_resolve_depth(mut self, depth: u32) -> Self {
        self.max_resolve_depth = depth;
        self
    }

    /// Defaults, with `full_check` taken from `PDFA_FULL_CHECK`
    /// (`1`, `true`, `yes` or `on`).
    pub fn from_env() -> Self {
        let full_check = std::env::var(FULL_CHECK_ENV)
            .map(|v| parse_flag(&v))
            .unwrap_or(false);
        Self::new().with_full_check(full_check)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CheckerConfig::default();
        assert!(!config.full_check);
        assert_eq!(config.max_resolve_depth, MAX_RESOLVE_DEPTH);
    }

    #[test]
    fn test_builder() {
        let config = CheckerConfig::new().with_full_check(true).with_max_resolve_depth(4);
        assert!(config.full_check);
        assert_eq!(config.max_resolve_depth, 4);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1"));
        assert!(parse_flag(" TRUE "));
        assert!(parse_flag("on"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }
}
