//! Request-scoped path parameters.
//!
//! When a route matches, the router stores its captured [`Params`] in the
//! request's extensions, inside a [`ParamStore`] keyed by the router tree's
//! [`ParamsKey`]. Keys are process-unique, so two independently built router
//! trees that see the same request (one forwarding to the other) never
//! overwrite each other's parameters. Subrouters share their root's key.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use hodos_router::Params;

static NEXT_KEY: AtomicU64 = AtomicU64::new(1);

/// Process-unique token identifying one router tree.
///
/// # Example
///
/// ```
/// use hodos_core::ParamsKey;
///
/// let a = ParamsKey::unique();
/// let b = ParamsKey::unique();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamsKey(u64);

impl ParamsKey {
    /// Mints a key never returned before in this process.
    #[must_use]
    pub fn unique() -> Self {
        Self(NEXT_KEY.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw key value.
    #[must_use]
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Per-request storage for captured parameters, one entry per router tree.
#[derive(Debug, Clone, Default)]
pub struct ParamStore {
    entries: HashMap<ParamsKey, Params>,
}

impl ParamStore {
    /// Returns the parameters stored under `key`.
    #[must_use]
    pub fn get(&self, key: ParamsKey) -> Option<&Params> {
        self.entries.get(&key)
    }

    /// Stores `params` under `key`, replacing any previous entry.
    pub fn insert(&mut self, key: ParamsKey, params: Params) {
        self.entries.insert(key, params);
    }

    /// Returns true if no router has stored parameters yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parameter access on requests.
///
/// ```
/// use hodos_core::{ParamsKey, RequestExt};
/// use hodos_router::Params;
///
/// let key = ParamsKey::unique();
/// let mut request = http::Request::new(());
/// request.set_params(key, [("id", "42")].into_iter().collect::<Params>());
///
/// assert_eq!(request.param(key, "id"), Some("42"));
/// assert_eq!(request.param(ParamsKey::unique(), "id"), None);
/// ```
pub trait RequestExt {
    /// Returns the parameters captured by the router tree owning `key`.
    fn params(&self, key: ParamsKey) -> Option<&Params>;

    /// Returns a single parameter captured by the router tree owning `key`.
    fn param(&self, key: ParamsKey, name: &str) -> Option<&str> {
        self.params(key).and_then(|params| params.get(name))
    }

    /// Stores parameters for the router tree owning `key`.
    fn set_params(&mut self, key: ParamsKey, params: Params);
}

impl<B> RequestExt for http::Request<B> {
    fn params(&self, key: ParamsKey) -> Option<&Params> {
        self.extensions()
            .get::<ParamStore>()
            .and_then(|store| store.get(key))
    }

    fn set_params(&mut self, key: ParamsKey, params: Params) {
        let extensions = self.extensions_mut();
        if let Some(store) = extensions.get_mut::<ParamStore>() {
            store.insert(key, params);
        } else {
            let mut store = ParamStore::default();
            store.insert(key, params);
            extensions.insert(store);
        }
    }
}
