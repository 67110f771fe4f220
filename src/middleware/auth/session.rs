//! Session token → `AuthCtx` (unverified).
//!
//! Token sources, in order:
//! 1. cookie `stytch_session_jwt` (non-empty)
//! 2. `Authorization: Bearer <jwt>` (scheme is case-insensitive, value is trimmed)
//!
//! The `sub` claim is read without signature/expiry checks (demo only).
//! Every failure becomes the same `401 {"error":"Unauthorized"}`.

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::session_jwt;

pub const SESSION_COOKIE: &str = "stytch_session_jwt";

const BEARER_SCHEME: &str = "bearer ";

/// Put the session middleware in front of every route of `router`.
///
/// Uses `route_layer` so unmatched paths still fall through to 404 instead of 401.
pub fn apply<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(middleware::from_fn(session_middleware))
}

async fn session_middleware(mut req: Request<Body>, next: Next) -> Result<Response, AppError> {
    let Some(token) = session_token(req.headers()) else {
        tracing::debug!("no session token");
        return Err(AppError::Unauthorized);
    };

    let user_id = session_jwt::decode_subject(&token).map_err(|err| {
        tracing::debug!(error = %err, "unusable session token");
        AppError::Unauthorized
    })?;

    // middleware → extractor への受け渡し (一度だけ)
    if !AuthCtx::new(user_id).attach(req.extensions_mut()) {
        tracing::warn!("session identity already attached; keeping the first one");
    }

    Ok(next.run(req).await)
}

/// Locate the session token: cookie first, then bearer header.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    cookie_token(headers).or_else(|| bearer_token(headers))
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    // first *valid* cookie with the right name wins, even if it is empty
    let value = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .filter(|(name, _)| name.trim() == SESSION_COOKIE)
        .find_map(|(_, value)| cookie_value(value.trim()))?;

    (!value.is_empty()).then(|| value.to_string())
}

// RFC 6265 cookie-octets (space and comma tolerated), optionally double-quoted.
fn cookie_value(raw: &str) -> Option<&str> {
    let value = unquote(raw);
    value
        .bytes()
        .all(|b| (0x20..0x7f).contains(&b) && b != b'"' && b != b';' && b != b'\\')
        .then_some(value)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())?;

    let scheme = auth.get(..BEARER_SCHEME.len())?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }

    let token = auth[BEARER_SCHEME.len()..].trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn unquote(value: &str) -> &str {
    if value.len() < 2 {
        return value;
    }
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
