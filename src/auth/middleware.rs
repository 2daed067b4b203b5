//! Authentication middleware for HTTP transport.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::http::{header, HeaderValue, Request, Response, StatusCode};
use futures::future::BoxFuture;
use http_body::Body as HttpBody;
use tower::{Layer, Service};

use super::Authenticator;

/// Paths reachable without a session.
const PUBLIC_PATHS: &[&str] = &["/health", "/api/v1/health", "/api/v1/login"];

/// Auth middleware layer.
#[derive(Clone)]
pub struct AuthLayer {
    authenticator: Arc<Authenticator>,
}

impl AuthLayer {
    /// Create a new auth layer.
    pub fn new(authenticator: Arc<Authenticator>) -> Self {
        Self { authenticator }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            authenticator: self.authenticator.clone(),
        }
    }
}

/// Auth middleware service.
///
/// Verifies the bearer token and stores the resulting [`Session`](super::Session)
/// in request extensions. Requests without a valid token get 401, except
/// for public paths.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    authenticator: Arc<Authenticator>,
}

fn unauthorized<B: Default>() -> Response<B> {
    let mut response = Response::new(B::default());
    *response.status_mut() = StatusCode::UNAUTHORIZED;
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    response
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for AuthMiddleware<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    ReqBody: Send + 'static,
    ResBody: HttpBody + Default + Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let auth_header = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        match self.authenticator.authenticate(auth_header) {
            Ok(session) => {
                req.extensions_mut().insert(session);
            }
            Err(e) => {
                let path = req.uri().path();
                if !PUBLIC_PATHS.contains(&path) {
                    tracing::debug!(path, error = %e, "rejecting unauthenticated request");
                    return Box::pin(async move { Ok(unauthorized()) });
                }
            }
        }

        let inner = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, inner);

        Box::pin(async move { inner.call(req).await })
    }
}
