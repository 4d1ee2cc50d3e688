//! Authentication middleware

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use super::cookies::ACCESS_TOKEN_COOKIE;
use crate::accounts::PublicAccount;
use crate::api::SharedState;
use crate::error::Error;

/// The authenticated account, attached to the request by `require_auth`
#[derive(Debug, Clone)]
pub struct CurrentAccount(pub PublicAccount);

/// Pull the access token from the `accessToken` cookie, falling back to a bearer header
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(ACCESS_TOKEN_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Middleware for requiring authentication
pub async fn require_auth(
    State(state): State<SharedState>,
    mut req: Request,
    next: Next,
) -> std::result::Result<Response, Error> {
    let token = extract_token(req.headers());
    let account = state.sessions.resolve_identity(token.as_deref()).await?;
    req.extensions_mut().insert(CurrentAccount(account));
    Ok(next.run(req).await)
}
