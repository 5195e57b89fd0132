//! Per-request access control: session cookie → principal → route class → decision.

use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::PrivateCookieJar;
use platform_api::{ApiError, internal_error};
use platform_authz::{Decision, Principal};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::http::{AppState, SESSION_COOKIE};

/// Id of the session that authenticated the request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionHandle(pub Uuid);

/// `302 Found` to a local path.
pub fn found(target: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, target.to_string())]).into_response()
}

pub async fn access_gate(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let session = match load_principal(&state, &jar).await {
        Ok(session) => session,
        Err(err) => return err.into_response(),
    };
    let access = state
        .routes
        .classify(request.method().as_str(), request.uri().path());
    let decision = state
        .policy
        .decide(session.as_ref().map(|(_, principal)| principal), access);
    match decision {
        Decision::Allow => {
            if let Some((handle, principal)) = session {
                request.extensions_mut().insert(handle);
                request.extensions_mut().insert(principal);
            }
            next.run(request).await
        }
        Decision::Deny(target) => {
            debug!(
                path = %request.uri().path(),
                ?access,
                %target,
                "access denied"
            );
            found(&target)
        }
    }
}

/// Unreadable or stale cookies count as anonymous; only store failures are errors.
async fn load_principal(
    state: &AppState,
    jar: &PrivateCookieJar,
) -> Result<Option<(SessionHandle, Principal)>, ApiError> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(None);
    };
    let Ok(session_id) = Uuid::parse_str(cookie.value()) else {
        warn!("session cookie holds an invalid id");
        return Ok(None);
    };
    let resolved = platform_db::resolve_session(&state.pool, session_id)
        .await
        .map_err(internal_error)?;
    Ok(resolved.map(|(session, user)| {
        (SessionHandle(session.id), platform_db::principal_for(&user))
    }))
}
