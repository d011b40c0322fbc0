//! Pattern compiler and segment matcher for Hodos.
//!
//! This crate is the pure, allocation-light half of the router: it turns
//! pattern strings into [`Segment`] sequences and decides whether a concrete
//! path matches one, capturing [`Params`] along the way. It knows nothing
//! about methods, handlers or middleware; those live in `hodos-server`.
//!
//! # Pattern syntax
//!
//! | Segment          | Meaning                                              |
//! |------------------|------------------------------------------------------|
//! | `users`          | literal, must match exactly                          |
//! | `{id}`           | parameter, captures any single token                 |
//! | `{id:[0-9]+}`    | parameter constrained by an anchored regex           |
//! | `{path:.*}`      | trailing constrained parameter, may span `/`         |
//!
//! Matching is a linear, ordered scan with fixed arity. There is no radix
//! tree and no segment reordering; the first registered route that matches
//! wins.
//!
//! # Example
//!
//! ```rust
//! use hodos_router::Pattern;
//!
//! let pattern = Pattern::compile("/orgs/{org}/files/{path:.*}").unwrap();
//!
//! let params = pattern.matches("/orgs/acme/files/docs/readme.md").unwrap();
//! assert_eq!(params.get("org"), Some("acme"));
//! assert_eq!(params.get("path"), Some("docs/readme.md"));
//!
//! assert!(Pattern::compile("/users/{id").is_err());
//! ```

mod error;
mod matcher;
mod params;
mod pattern;

pub use error::PatternError;
pub use matcher::match_path;
pub use params::Params;
pub use pattern::{compile, join_paths, Pattern, Segment};
