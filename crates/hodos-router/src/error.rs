//! Pattern compilation errors.

use thiserror::Error;

/// Errors raised while compiling a route pattern.
///
/// A malformed pattern is a programming error in route registration, so these
/// are reported synchronously by [`compile`](crate::compile) and never at
/// request time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// A `{}` parameter without a name, e.g. `/users/{}` or `/users/{:[0-9]+}`.
    #[error("empty parameter name in segment `{segment}` of pattern `{pattern}`")]
    EmptyParamName {
        /// The full pattern being compiled.
        pattern: String,
        /// The offending segment.
        segment: String,
    },

    /// A segment with a stray or unbalanced brace, e.g. `/users/{id` or `/a}b`.
    #[error("unbalanced brace in segment `{segment}` of pattern `{pattern}`")]
    UnbalancedBrace {
        /// The full pattern being compiled.
        pattern: String,
        /// The offending segment.
        segment: String,
    },

    /// A parameter name containing characters outside `[A-Za-z0-9_-]`.
    #[error("invalid parameter name `{name}` in pattern `{pattern}`")]
    InvalidParamName {
        /// The full pattern being compiled.
        pattern: String,
        /// The rejected name.
        name: String,
    },

    /// The same parameter name appears twice in one pattern.
    #[error("duplicate parameter `{name}` in pattern `{pattern}`")]
    DuplicateParam {
        /// The full pattern being compiled.
        pattern: String,
        /// The repeated name.
        name: String,
    },

    /// The regex constraint of a parameter failed to compile.
    #[error("invalid regex `{regex}` for parameter `{name}` in pattern `{pattern}`: {reason}")]
    InvalidRegex {
        /// The full pattern being compiled.
        pattern: String,
        /// The parameter carrying the constraint.
        name: String,
        /// The constraint source as written.
        regex: String,
        /// Message from the regex engine.
        reason: String,
    },
}

impl PatternError {
    /// Returns the pattern that failed to compile.
    #[must_use]
    pub fn pattern(&self) -> &str {
        match self {
            Self::EmptyParamName { pattern, .. }
            | Self::UnbalancedBrace { pattern, .. }
            | Self::InvalidParamName { pattern, .. }
            | Self::DuplicateParam { pattern, .. }
            | Self::InvalidRegex { pattern, .. } => pattern,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PatternError::DuplicateParam {
            pattern: "/a/{id}/{id}".to_string(),
            name: "id".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "duplicate parameter `id` in pattern `/a/{id}/{id}`"
        );
    }

    #[test]
    fn test_error_pattern_accessor() {
        let err = PatternError::UnbalancedBrace {
            pattern: "/users/{id".to_string(),
            segment: "{id".to_string(),
        };
        assert_eq!(err.pattern(), "/users/{id");
    }
}
