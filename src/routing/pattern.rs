//! Route pattern module
//!
//! Method and path predicates evaluated by the matcher.

use crate::error::RouteError;
use hyper::Method;
use regex::Regex;
use std::fmt;

/// Method condition of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodPattern {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    /// Wildcard, matches every method
    Any,
}

impl MethodPattern {
    /// Exact, case-sensitive comparison against the request method
    pub fn matches(self, method: &Method) -> bool {
        match self {
            Self::Any => true,
            Self::Get => *method == Method::GET,
            Self::Post => *method == Method::POST,
            Self::Put => *method == Method::PUT,
            Self::Patch => *method == Method::PATCH,
            Self::Delete => *method == Method::DELETE,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Any => "ANY",
        }
    }
}

impl fmt::Display for MethodPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Path condition of a route
#[derive(Debug, Clone)]
pub enum PathPattern {
    /// Exact string equality
    Literal(String),
    /// Regular expression anchored at both ends
    Regex { source: String, compiled: Regex },
}

impl PathPattern {
    pub fn literal(path: impl Into<String>) -> Self {
        Self::Literal(path.into())
    }

    /// Compile a regex pattern that must match the whole path
    ///
    /// `"/status/\d+"` matches `/status/200` but not `/status/200/x`.
    pub fn regex(pattern: &str) -> Result<Self, RouteError> {
        let compiled =
            Regex::new(&format!("^(?:{pattern})$")).map_err(|source| RouteError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(Self::Regex {
            source: pattern.to_string(),
            compiled,
        })
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Literal(literal) => literal == path,
            Self::Regex { compiled, .. } => compiled.is_match(path),
        }
    }

    /// Pattern as registered, without anchors
    pub fn as_str(&self) -> &str {
        match self {
            Self::Literal(literal) => literal,
            Self::Regex { source, .. } => source,
        }
    }
}

impl From<&str> for PathPattern {
    fn from(path: &str) -> Self {
        Self::literal(path)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_exact() {
        assert!(MethodPattern::Get.matches(&Method::GET));
        assert!(!MethodPattern::Get.matches(&Method::POST));
        assert!(MethodPattern::Delete.matches(&Method::DELETE));
        assert!(!MethodPattern::Put.matches(&Method::PATCH));
    }

    #[test]
    fn test_method_case_sensitive() {
        let lowercase = Method::from_bytes(b"get").unwrap();
        assert!(!MethodPattern::Get.matches(&lowercase));
        assert!(MethodPattern::Any.matches(&lowercase));
    }

    #[test]
    fn test_literal_path() {
        let pattern = PathPattern::literal("/get");
        assert!(pattern.matches("/get"));
        assert!(!pattern.matches("/get/"));
        assert!(!pattern.matches("/getter"));
    }

    #[test]
    fn test_regex_is_anchored() {
        let pattern = PathPattern::regex(r"/status/\d+").unwrap();
        assert!(pattern.matches("/status/418"));
        assert!(!pattern.matches("/status/418/extra"));
        assert!(!pattern.matches("/v1/status/418"));
    }

    #[test]
    fn test_regex_alternation_stays_anchored() {
        // Without the non-capturing group `^a|b$` would match "xb"
        let pattern = PathPattern::regex("/a|/b").unwrap();
        assert!(pattern.matches("/a"));
        assert!(pattern.matches("/b"));
        assert!(!pattern.matches("/a/b"));
        assert!(!pattern.matches("x/b"));
    }

    #[test]
    fn test_regex_optional_trailing_slash() {
        let pattern = PathPattern::regex("/docs/?").unwrap();
        assert!(pattern.matches("/docs"));
        assert!(pattern.matches("/docs/"));
    }

    #[test]
    fn test_invalid_regex_fails_fast() {
        let err = PathPattern::regex("/broken(").unwrap_err();
        assert!(matches!(err, RouteError::InvalidPattern { ref pattern, .. } if pattern == "/broken("));
    }

    #[test]
    fn test_as_str_keeps_source() {
        assert_eq!(PathPattern::regex("(.*)").unwrap().as_str(), "(.*)");
        assert_eq!(PathPattern::from("/ip").to_string(), "/ip");
    }
}
