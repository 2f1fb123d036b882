//! HTTP routes contributed by plugins.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::extract::Request;
use axum::http::Method;
use axum::response::{IntoResponse, Response};
use futures::future::BoxFuture;

/// Type-erased request handler stored in the route table.
pub type RouteHandler = Arc<dyn Fn(Request) -> BoxFuture<'static, Response> + Send + Sync>;

/// Identity of a route: its method and exact path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    /// HTTP method.
    pub method: Method,
    /// Absolute request path, matched exactly.
    pub path: String,
}

impl RouteKey {
    /// Creates a new route key.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// A single HTTP route exposed by a plugin.
///
/// Routes require authentication unless built with [`Route::public`].
#[derive(Clone)]
pub struct Route {
    /// HTTP method.
    pub method: Method,
    /// Path, recommended under `/api/plugins/{plugin-name}/`.
    pub path: String,
    /// Request handler.
    pub handler: RouteHandler,
    /// Whether the dispatcher must authenticate the caller first.
    pub auth_required: bool,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("handler", &"<handler>")
            .field("auth_required", &self.auth_required)
            .finish()
    }
}

impl Route {
    /// Creates an authenticated route from an async closure.
    pub fn new<F, Fut, R>(method: Method, path: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        Self {
            method,
            path: path.into(),
            handler: Arc::new(move |request| {
                let fut = handler(request);
                Box::pin(async move { fut.await.into_response() })
            }),
            auth_required: true,
        }
    }

    /// Shorthand for a `GET` route.
    pub fn get<F, Fut, R>(path: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        Self::new(Method::GET, path, handler)
    }

    /// Shorthand for a `POST` route.
    pub fn post<F, Fut, R>(path: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        Self::new(Method::POST, path, handler)
    }

    /// Marks the route as reachable without authentication.
    pub fn public(mut self) -> Self {
        self.auth_required = false;
        self
    }

    /// The route's table key.
    pub fn key(&self) -> RouteKey {
        RouteKey::new(self.method.clone(), self.path.clone())
    }
}
