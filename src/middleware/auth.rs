use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};
use uuid::Uuid;

use crate::auth::{self, Claims};
use crate::error::ApiError;

/// Authenticated caller context extracted from the bearer token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
        }
    }
}

/// Gate on every /api route: requests without a valid bearer token are
/// rejected before any lookup runs. The response body stays a bare
/// "Unauthorized" regardless of what failed.
pub async fn require_auth(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(&headers).ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

    let claims = auth::validate_token(&token).map_err(|e| {
        tracing::debug!("bearer token rejected: {}", e);
        ApiError::unauthorized("Unauthorized")
    })?;

    request.extensions_mut().insert(AuthUser::from(claims));

    Ok(next.run(request).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get("authorization")?.to_str().ok()?;
    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Some(token.to_string()),
        _ => None,
    }
}
