//! Authentication seam for routes that require it.

use http::HeaderMap;

/// Decides whether a request carries valid credentials.
pub trait Authenticator: Send + Sync + std::fmt::Debug + 'static {
    /// Returns the authenticated principal, or `None` to reject.
    fn authenticate(&self, headers: &HeaderMap) -> Option<String>;
}
