//! Database name matching logic.
//!
//! # Responsibilities
//! - Match a requested database name exactly
//! - Match a database name prefix (`app_*`)
//! - Match any database (`*`)
//!
//! # Design Decisions
//! - Matching is byte-wise and case-sensitive (database names are opaque bytes)
//! - `*` is only allowed as the final character
//! - No regex to guarantee O(n) matching

/// Trait for matching a requested database name against a route pattern.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the database name matches this pattern.
    fn matches(&self, database: &[u8]) -> bool;
}

/// Matches one database name exactly.
#[derive(Debug, Clone)]
pub struct ExactMatcher {
    name: Vec<u8>,
}

impl ExactMatcher {
    pub fn new(name: impl Into<Vec<u8>>) -> Self {
        Self { name: name.into() }
    }
}

impl Matcher for ExactMatcher {
    fn matches(&self, database: &[u8]) -> bool {
        database == self.name.as_slice()
    }
}

/// Matches every database name starting with a prefix.
#[derive(Debug, Clone)]
pub struct PrefixMatcher {
    prefix: Vec<u8>,
}

impl PrefixMatcher {
    pub fn new(prefix: impl Into<Vec<u8>>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PrefixMatcher {
    fn matches(&self, database: &[u8]) -> bool {
        database.starts_with(&self.prefix)
    }
}

/// Matches any database name.
#[derive(Debug, Clone, Default)]
pub struct AnyMatcher;

impl Matcher for AnyMatcher {
    fn matches(&self, _database: &[u8]) -> bool {
        true
    }
}

/// Compile a configured pattern into a matcher.
pub fn parse_pattern(pattern: &str) -> Result<Box<dyn Matcher>, String> {
    if pattern.is_empty() {
        return Err("pattern must not be empty".to_string());
    }
    if pattern == "*" {
        return Ok(Box::new(AnyMatcher));
    }
    match pattern.find('*') {
        None => Ok(Box::new(ExactMatcher::new(pattern.as_bytes()))),
        Some(pos) if pos == pattern.len() - 1 => {
            Ok(Box::new(PrefixMatcher::new(&pattern.as_bytes()[..pos])))
        }
        Some(_) => Err(format!("'{}': '*' is only allowed at the end", pattern)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_matcher() {
        let matcher = ExactMatcher::new("app_db");
        assert!(matcher.matches(b"app_db"));
        assert!(!matcher.matches(b"APP_DB")); // Case sensitive
        assert!(!matcher.matches(b"app_db2"));
    }

    #[test]
    fn test_prefix_matcher() {
        let matcher = parse_pattern("tenant_*").unwrap();
        assert!(matcher.matches(b"tenant_1"));
        assert!(matcher.matches(b"tenant_"));
        assert!(!matcher.matches(b"tenan"));
    }

    #[test]
    fn test_any_matcher() {
        let matcher = parse_pattern("*").unwrap();
        assert!(matcher.matches(b"whatever"));
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(parse_pattern("").is_err());
        assert!(parse_pattern("a*b").is_err());
        assert!(parse_pattern("**").is_err());
    }
}
