//! Live route table shared by the HTTP dispatcher and the plugin registry.
//!
//! The table is an immutable `HashMap` behind an [`ArcSwap`]. Readers load
//! a snapshot without locking. Writers build a complete new map from the
//! current one and swap the pointer, so a request always sees either the
//! map before a mount/unmount or the map after it, never a mix.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::http::Method;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info};

use crate::route::{Route, RouteHandler, RouteKey};

/// Route publication failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MountError {
    /// The key is already served by another plugin.
    #[error("{key} is already served by plugin '{owner}'")]
    Collision {
        /// Conflicting key.
        key: RouteKey,
        /// Plugin currently serving it.
        owner: String,
    },
    /// The plugin listed the same key twice.
    #[error("{key} is listed more than once")]
    Duplicate {
        /// Repeated key.
        key: RouteKey,
    },
    /// Paths must be absolute.
    #[error("route path '{path}' must start with '/'")]
    InvalidPath {
        /// Offending path.
        path: String,
    },
    /// The path belongs to the host.
    #[error("route path '{path}' is reserved by the host")]
    Reserved {
        /// Offending path.
        path: String,
    },
    /// The route would shadow a parameterised host route.
    #[error("{key} shadows host route '{pattern}'")]
    Shadowed {
        /// Offending key.
        key: RouteKey,
        /// Host pattern it matches.
        pattern: String,
    },
}

/// A host route pattern. `*` matches exactly one non-empty path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ReservedPattern {
    method: Method,
    pattern: String,
}

impl ReservedPattern {
    fn matches(&self, key: &RouteKey) -> bool {
        if key.method != self.method {
            return false;
        }
        let mut want = self.pattern.split('/');
        let mut have = key.path.split('/');
        loop {
            match (want.next(), have.next()) {
                (None, None) => return true,
                (Some("*"), Some(segment)) if !segment.is_empty() => {}
                (Some(w), Some(h)) if w == h => {}
                _ => return false,
            }
        }
    }
}

/// Host-side mountable dispatch surface.
///
/// The registry only ever touches routes through this trait.
pub trait RouteMount: Send + Sync + std::fmt::Debug + 'static {
    /// Publishes `routes` for `owner` in one step. Either every route is
    /// published or none is.
    fn mount(&self, owner: &str, routes: Vec<Route>) -> Result<Vec<RouteKey>, MountError>;

    /// Removes every route owned by `owner`, returning the removed keys.
    fn unmount(&self, owner: &str) -> Vec<RouteKey>;

    /// Whether routes can change while the server is running. When `false`
    /// the registry persists toggles but does not mutate anything.
    fn supports_live_mount(&self) -> bool {
        true
    }
}

#[derive(Clone)]
struct MountedRoute {
    owner: Arc<str>,
    handler: RouteHandler,
    auth_required: bool,
}

type RouteMap = HashMap<RouteKey, MountedRoute>;

/// Result of a dispatcher lookup.
#[derive(Clone)]
pub struct MatchedRoute {
    /// Plugin that owns the route.
    pub owner: Arc<str>,
    /// Handler to invoke.
    pub handler: RouteHandler,
    /// Whether the caller must be authenticated.
    pub auth_required: bool,
}

impl std::fmt::Debug for MatchedRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchedRoute")
            .field("owner", &self.owner)
            .field("auth_required", &self.auth_required)
            .finish()
    }
}

/// Copy-on-write `(method, path) → handler` map.
pub struct RouteTable {
    /// Current published map.
    routes: ArcSwap<RouteMap>,
    /// Serialises writers; held only while building and swapping a map.
    write_lock: Mutex<()>,
    /// Whether mount/unmount is allowed after boot.
    live_mount: bool,
    /// Paths served by the host that plugins may not claim.
    reserved: HashSet<String>,
    /// Parameterised host routes that plugins may not shadow.
    patterns: Vec<ReservedPattern>,
}

impl RouteTable {
    /// Creates an empty table.
    pub fn new(live_mount: bool) -> Self {
        Self {
            routes: ArcSwap::from_pointee(HashMap::new()),
            write_lock: Mutex::new(()),
            live_mount,
            reserved: HashSet::new(),
            patterns: Vec::new(),
        }
    }

    /// Reserves `paths` (any method) for the host.
    pub fn with_reserved_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Reserves host route patterns such as `POST /api/plugins/*/toggle`,
    /// where `*` stands for one path segment.
    pub fn with_reserved_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = (Method, S)>,
        S: Into<String>,
    {
        self.patterns.extend(
            patterns
                .into_iter()
                .map(|(method, pattern)| ReservedPattern {
                    method,
                    pattern: pattern.into(),
                }),
        );
        self
    }

    /// Finds the handler for an exact method and path.
    pub fn lookup(&self, method: &Method, path: &str) -> Option<MatchedRoute> {
        let routes = self.routes.load();
        routes
            .get(&RouteKey::new(method.clone(), path))
            .map(|mounted| MatchedRoute {
                owner: Arc::clone(&mounted.owner),
                handler: Arc::clone(&mounted.handler),
                auth_required: mounted.auth_required,
            })
    }

    /// Number of published routes.
    pub fn len(&self) -> usize {
        self.routes.load().len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.routes.load().is_empty()
    }

    /// All published keys, sorted by path then method.
    pub fn keys(&self) -> Vec<RouteKey> {
        let mut keys: Vec<RouteKey> = self.routes.load().keys().cloned().collect();
        keys.sort_by(|a, b| {
            a.path
                .cmp(&b.path)
                .then_with(|| a.method.as_str().cmp(b.method.as_str()))
        });
        keys
    }

    /// Keys currently published by `owner`.
    #[cfg(test)]
    pub(crate) fn keys_for(&self, owner: &str) -> Vec<RouteKey> {
        self.routes
            .load()
            .iter()
            .filter(|(_, mounted)| &*mounted.owner == owner)
            .map(|(key, _)| key.clone())
            .collect()
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new(true)
    }
}

impl std::fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteTable")
            .field("route_count", &self.len())
            .field("live_mount", &self.live_mount)
            .finish()
    }
}

impl RouteMount for RouteTable {
    fn mount(&self, owner: &str, routes: Vec<Route>) -> Result<Vec<RouteKey>, MountError> {
        let _guard = self.write_lock.lock();
        let current = self.routes.load_full();

        let owner: Arc<str> = Arc::from(owner);
        let mut added: Vec<RouteKey> = Vec::with_capacity(routes.len());
        let mut next: RouteMap = (*current).clone();
        next.retain(|_, mounted| mounted.owner != owner);

        for route in routes {
            if !route.path.starts_with('/') {
                return Err(MountError::InvalidPath { path: route.path });
            }
            if self.reserved.contains(&route.path) {
                return Err(MountError::Reserved { path: route.path });
            }
            let key = route.key();
            if let Some(reserved) = self.patterns.iter().find(|p| p.matches(&key)) {
                return Err(MountError::Shadowed {
                    pattern: format!("{} {}", reserved.method, reserved.pattern),
                    key,
                });
            }
            if added.contains(&key) {
                return Err(MountError::Duplicate { key });
            }
            if let Some(existing) = next.get(&key) {
                return Err(MountError::Collision {
                    key,
                    owner: existing.owner.to_string(),
                });
            }
            next.insert(
                key.clone(),
                MountedRoute {
                    owner: Arc::clone(&owner),
                    handler: route.handler,
                    auth_required: route.auth_required,
                },
            );
            added.push(key);
        }

        self.routes.store(Arc::new(next));
        info!(plugin = %owner, routes = added.len(), "Plugin routes mounted");
        Ok(added)
    }

    fn unmount(&self, owner: &str) -> Vec<RouteKey> {
        let _guard = self.write_lock.lock();
        let current = self.routes.load_full();

        let removed: Vec<RouteKey> = current
            .iter()
            .filter(|(_, mounted)| &*mounted.owner == owner)
            .map(|(key, _)| key.clone())
            .collect();

        if removed.is_empty() {
            debug!(plugin = %owner, "No routes to unmount");
            return removed;
        }

        let mut next: RouteMap = (*current).clone();
        next.retain(|_, mounted| &*mounted.owner != owner);
        self.routes.store(Arc::new(next));

        info!(plugin = %owner, routes = removed.len(), "Plugin routes unmounted");
        removed
    }

    fn supports_live_mount(&self) -> bool {
        self.live_mount
    }
}
