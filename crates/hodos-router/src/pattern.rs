//! Route pattern compilation.
//!
//! A pattern such as `/users/{id:[0-9]+}/posts` is compiled once, at
//! registration time, into an ordered list of [`Segment`]s. Parameter
//! constraints are anchored and compiled here so that a bad regex fails the
//! registration call instead of a request.

use std::fmt;
use std::str::FromStr;

use regex::Regex;

use crate::error::PatternError;
use crate::matcher;
use crate::params::Params;

/// One `/`-separated piece of a compiled pattern.
#[derive(Debug, Clone)]
pub enum Segment {
    /// Must equal the path token exactly.
    Literal(String),
    /// Captures the path token under `name`.
    Param {
        /// Parameter name, unique within its pattern.
        name: String,
        /// Anchored constraint the token must satisfy, if any.
        constraint: Option<Regex>,
    },
}

impl Segment {
    /// Returns the parameter name, or `None` for literals.
    #[must_use]
    pub fn param_name(&self) -> Option<&str> {
        match self {
            Self::Literal(_) => None,
            Self::Param { name, .. } => Some(name),
        }
    }

    /// Returns true for literal segments.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    /// Returns true if this segment may absorb the rest of a path.
    ///
    /// Only constrained parameters qualify; the matcher additionally requires
    /// the segment to be the last one of its pattern.
    #[must_use]
    pub fn can_span(&self) -> bool {
        matches!(
            self,
            Self::Param {
                constraint: Some(_),
                ..
            }
        )
    }
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Literal(a), Self::Literal(b)) => a == b,
            (
                Self::Param {
                    name: a,
                    constraint: ca,
                },
                Self::Param {
                    name: b,
                    constraint: cb,
                },
            ) => a == b && ca.as_ref().map(Regex::as_str) == cb.as_ref().map(Regex::as_str),
            _ => false,
        }
    }
}

impl Eq for Segment {}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(literal) => f.write_str(literal),
            Self::Param {
                name,
                constraint: None,
            } => write!(f, "{{{name}}}"),
            Self::Param {
                name,
                constraint: Some(regex),
            } => {
                let source = regex.as_str();
                let inner = source
                    .strip_prefix("^(?:")
                    .and_then(|s| s.strip_suffix(")$"))
                    .unwrap_or(source);
                write!(f, "{{{name}:{inner}}}")
            }
        }
    }
}

/// A compiled route pattern.
///
/// # Example
///
/// ```rust
/// use hodos_router::Pattern;
///
/// let pattern = Pattern::compile("/foo/{id:[0-9]+}").unwrap();
/// assert_eq!(pattern.len(), 2);
///
/// let params = pattern.matches("/foo/123").unwrap();
/// assert_eq!(params.get("id"), Some("123"));
/// assert!(pattern.matches("/foo/abc").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    /// The pattern as written at registration.
    source: String,
    /// Compiled segments, in source order.
    segments: Vec<Segment>,
}

impl Pattern {
    /// Compiles a pattern string.
    ///
    /// Leading and trailing slashes are ignored; the empty pattern compiles to
    /// zero segments and matches only the root path.
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        let trimmed = pattern.trim_matches('/');
        let mut segments: Vec<Segment> = Vec::new();

        if !trimmed.is_empty() {
            for part in trimmed.split('/') {
                let segment = parse_segment(pattern, part)?;
                if let Some(name) = segment.param_name() {
                    if segments.iter().any(|s| s.param_name() == Some(name)) {
                        return Err(PatternError::DuplicateParam {
                            pattern: pattern.to_string(),
                            name: name.to_string(),
                        });
                    }
                }
                segments.push(segment);
            }
        }

        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    /// Returns the pattern source as it was registered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns the compiled segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true for the root pattern.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the parameter names in source order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(Segment::param_name)
    }

    /// Matches a concrete request path, returning the captured parameters.
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<Params> {
        matcher::match_path(path, &self.segments)
    }
}

impl FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            segment.fmt(f)?;
        }
        Ok(())
    }
}

/// Compiles `pattern` into its segment sequence.
///
/// Shorthand for [`Pattern::compile`] that discards the source string.
pub fn compile(pattern: &str) -> Result<Vec<Segment>, PatternError> {
    Pattern::compile(pattern).map(|p| p.segments)
}

/// Joins a base path and a pattern with exactly one `/` between them.
///
/// ```rust
/// use hodos_router::join_paths;
///
/// assert_eq!(join_paths("/api/", "/ping"), "/api/ping");
/// assert_eq!(join_paths("", "users"), "/users");
/// assert_eq!(join_paths("/api", ""), "/api");
/// assert_eq!(join_paths("", ""), "/");
/// ```
#[must_use]
pub fn join_paths(base: &str, pattern: &str) -> String {
    let base = base.trim_matches('/');
    let pattern = pattern.trim_matches('/');
    match (base.is_empty(), pattern.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{pattern}"),
        (false, true) => format!("/{base}"),
        (false, false) => format!("/{base}/{pattern}"),
    }
}

fn parse_segment(pattern: &str, part: &str) -> Result<Segment, PatternError> {
    let inner = part
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'));

    let Some(inner) = inner else {
        if part.contains(['{', '}']) {
            return Err(PatternError::UnbalancedBrace {
                pattern: pattern.to_string(),
                segment: part.to_string(),
            });
        }
        return Ok(Segment::Literal(part.to_string()));
    };

    // Braces are legal inside the constraint (`{id:[0-9]{3}}`), never in the name.
    let (name, regex) = match inner.split_once(':') {
        Some((name, regex)) => (name, Some(regex)),
        None => (inner, None),
    };

    if name.is_empty() {
        return Err(PatternError::EmptyParamName {
            pattern: pattern.to_string(),
            segment: part.to_string(),
        });
    }

    if name.contains(['{', '}']) {
        return Err(PatternError::UnbalancedBrace {
            pattern: pattern.to_string(),
            segment: part.to_string(),
        });
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(PatternError::InvalidParamName {
            pattern: pattern.to_string(),
            name: name.to_string(),
        });
    }

    let constraint = match regex {
        None | Some("") => None,
        Some(source) => Some(Regex::new(&format!("^(?:{source})$")).map_err(|e| {
            PatternError::InvalidRegex {
                pattern: pattern.to_string(),
                name: name.to_string(),
                regex: source.to_string(),
                reason: e.to_string(),
            }
        })?),
    };

    Ok(Segment::Param {
        name: name.to_string(),
        constraint,
    })
}
