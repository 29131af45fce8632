use async_trait::async_trait;
use axum::extract::{FromRequestParts, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use kiln_client::{auth_info_from_header, AuthInfo};

use crate::error::ApiError;

/// Resolve the caller from the `Authorization` header and attach it to the
/// request.
///
/// A missing or empty header, or a scheme Kiln does not accept, is rejected
/// here with 401. Some routes are served through the privileged factory,
/// which never looks at the caller's credential.
pub async fn resolve_caller(mut request: Request, next: Next) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match auth_info_from_header(header) {
        Ok(AuthInfo::Unsupported { scheme }) => {
            tracing::debug!(%scheme, "rejecting unsupported authorization scheme");
            ApiError::not_authenticated().into_response()
        }
        Ok(auth) => {
            tracing::debug!(scheme = auth.scheme(), "resolved caller");
            request.extensions_mut().insert(auth);
            next.run(request).await
        }
        Err(err) => {
            tracing::debug!(error = %err, "rejecting unauthenticated request");
            ApiError::from(err).into_response()
        }
    }
}

/// The caller's [`AuthInfo`], as resolved by [`resolve_caller`].
#[derive(Clone, Debug)]
pub struct Caller(pub AuthInfo);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthInfo>()
            .cloned()
            .map(Caller)
            .ok_or_else(ApiError::not_authenticated)
    }
}
