//! Property tests for pattern compilation and matching.

use hodos_router::{compile, match_path, Pattern};
use proptest::prelude::*;

fn literal() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,7}"
}

fn segment() -> impl Strategy<Value = String> {
    prop_oneof![
        literal(),
        literal().prop_map(|name| format!("{{{name}}}")),
        literal().prop_map(|name| format!("{{{name}:[0-9]+}}")),
    ]
}

/// Patterns with unique parameter names, so every one of them compiles.
fn pattern() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 0..6).prop_map(|parts| {
        let parts: Vec<String> = parts
            .into_iter()
            .enumerate()
            .map(|(i, part)| {
                if part.starts_with('{') {
                    part.replacen('{', &format!("{{p{i}_"), 1)
                } else {
                    part
                }
            })
            .collect();
        format!("/{}", parts.join("/"))
    })
}

proptest! {
    #[test]
    fn compile_is_deterministic(p in pattern()) {
        let first = Pattern::compile(&p).unwrap();
        let second = Pattern::compile(&p).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn arity_mismatch_never_matches(
        p in pattern(),
        tokens in prop::collection::vec("[a-z0-9]{1,6}", 0..8),
    ) {
        let segments = compile(&p).unwrap();
        prop_assume!(tokens.len() != segments.len());
        // Constrained tails reject '/', so fixed arity holds for every generated pattern.
        let path = format!("/{}", tokens.join("/"));
        prop_assert!(match_path(&path, &segments).is_none());
    }

    #[test]
    fn literal_patterns_match_themselves(parts in prop::collection::vec(literal(), 0..6)) {
        let path = format!("/{}", parts.join("/"));
        let pattern = Pattern::compile(&path).unwrap();
        let params = pattern.matches(&path);
        prop_assert!(params.is_some());
        prop_assert!(params.unwrap().is_empty());
    }
}
