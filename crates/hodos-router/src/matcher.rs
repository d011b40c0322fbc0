//! Segment matching against concrete request paths.
//!
//! Matching is linear and fixed-arity: the path is split on `/` and must
//! produce exactly one token per segment. The single exception is a trailing
//! constrained parameter, which receives the remainder of the path (inner
//! slashes included) when its regex accepts it. This is how a catch-all such
//! as `{filepath:.*}` spans `css/site.css`.
//!
//! Tokens are percent-decoded after splitting, so literals and constraints
//! see `hello world` for `hello%20world` while an encoded `%2F` never
//! introduces a segment boundary.

use percent_encoding::percent_decode_str;
use smallvec::SmallVec;

use crate::params::Params;
use crate::pattern::Segment;

/// Tokens stored inline before spilling to the heap.
const INLINE_TOKENS: usize = 8;

/// Matches `path` against `segments`.
///
/// Returns the captured parameters on a match and `None` otherwise; a failed
/// match never exposes partial captures.
///
/// # Example
///
/// ```rust
/// use hodos_router::{compile, match_path};
///
/// let segments = compile("/foo/{id:[0-9]+}").unwrap();
///
/// let params = match_path("/foo/123", &segments).unwrap();
/// assert_eq!(params.get("id"), Some("123"));
///
/// assert!(match_path("/foo/abc", &segments).is_none());
/// assert!(match_path("/foo/1/2", &segments).is_none());
/// ```
#[must_use]
pub fn match_path(path: &str, segments: &[Segment]) -> Option<Params> {
    let trimmed = path.trim_matches('/');

    let tokens: SmallVec<[&str; INLINE_TOKENS]> = if trimmed.is_empty() {
        SmallVec::new()
    } else if segments.last().is_some_and(Segment::can_span) {
        trimmed.splitn(segments.len(), '/').collect()
    } else {
        trimmed.split('/').collect()
    };

    if tokens.len() != segments.len() {
        return None;
    }

    let mut params = Params::with_capacity(segments.len());
    for (segment, raw) in segments.iter().zip(tokens) {
        let decoded = percent_decode_str(raw).decode_utf8_lossy();
        let token: &str = &decoded;
        match segment {
            Segment::Literal(literal) => {
                if literal != token {
                    return None;
                }
            }
            Segment::Param { name, constraint } => {
                if let Some(regex) = constraint {
                    if !regex.is_match(token) {
                        return None;
                    }
                }
                params.insert(name.as_str(), token);
            }
        }
    }

    Some(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::compile;

    fn matches(pattern: &str, path: &str) -> Option<Params> {
        match_path(path, &compile(pattern).unwrap())
    }

    #[test]
    fn test_root_matches_only_root() {
        assert!(matches("", "/").is_some());
        assert!(matches("", "").is_some());
        assert!(matches("/", "/").is_some());
        assert!(matches("", "/users").is_none());
    }

    #[test]
    fn test_literal_match() {
        assert!(matches("/users", "/users").is_some());
        assert!(matches("/users", "/users/").is_some());
        assert!(matches("/users", "/Users").is_none());
        assert!(matches("/users", "/posts").is_none());
    }

    #[test]
    fn test_arity_mismatch() {
        assert!(matches("/users/{id}", "/users").is_none());
        assert!(matches("/users/{id}", "/users/1/2").is_none());
        assert!(matches("/users", "/users/1").is_none());
    }

    #[test]
    fn test_param_capture() {
        let params = matches("/orgs/{org}/users/{user}", "/orgs/acme/users/42").unwrap();
        assert_eq!(params.get("org"), Some("acme"));
        assert_eq!(params.get("user"), Some("42"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_constrained_param() {
        let params = matches("/foo/{id:[0-9]+}", "/foo/123").unwrap();
        assert_eq!(params.get("id"), Some("123"));
        assert!(matches("/foo/{id:[0-9]+}", "/foo/abc").is_none());
        assert!(matches("/foo/{id:[0-9]+}", "/foo/12a").is_none());
    }

    #[test]
    fn test_catch_all_spans_remaining_segments() {
        let params = matches("/static/{filepath:.*}", "/static/css/site.css").unwrap();
        assert_eq!(params.get("filepath"), Some("css/site.css"));

        let params = matches("/static/{filepath:.*}", "/static/logo.png").unwrap();
        assert_eq!(params.get("filepath"), Some("logo.png"));
    }

    #[test]
    fn test_catch_all_requires_a_token() {
        assert!(matches("/static/{filepath:.*}", "/static").is_none());
        assert!(matches("/static/{filepath:.*}", "/static/").is_none());
    }

    #[test]
    fn test_trailing_constraint_rejecting_slash_does_not_span() {
        assert!(matches("/files/{name:[a-z.]+}", "/files/a/b").is_none());
        assert!(matches("/files/{name}", "/files/a/b").is_none());
    }

    #[test]
    fn test_literal_mismatch_after_capture_discards_params() {
        assert!(matches("/users/{id}/posts", "/users/1/comments").is_none());
    }

    #[test]
    fn test_tokens_are_percent_decoded() {
        let params = matches("/files/{name}", "/files/hello%20world").unwrap();
        assert_eq!(params.get("name"), Some("hello world"));

        assert!(matches("/hello world", "/hello%20world").is_some());
        assert!(matches("/caf\u{e9}", "/caf%C3%A9").is_some());
    }

    #[test]
    fn test_encoded_slash_stays_inside_token() {
        let params = matches("/files/{name}", "/files/a%2Fb").unwrap();
        assert_eq!(params.get("name"), Some("a/b"));
        assert!(matches("/files/{id:[0-9]+}", "/files/1%2F2").is_none());
    }

    #[test]
    fn test_inner_empty_token() {
        assert!(matches("/a/b", "/a//b").is_none());
        let params = matches("/a/{x}/b", "/a//b").unwrap();
        assert_eq!(params.get("x"), Some(""));
    }
}
