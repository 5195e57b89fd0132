use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use axum::{
    Extension, Form, Json, Router,
    extract::{FromRef, Query, State},
    http::{self, HeaderMap, HeaderName, HeaderValue, Method},
    middleware,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use platform_api::{ApiError, ApiResult, internal_error};
use platform_authn::Credentials;
use platform_authz::{AccessPolicy, Principal, RouteTable};
use platform_db::{DbPool, DirectoryError};
use sea_orm::{ConnectionTrait, Statement};
use serde::{Deserialize, Serialize};
use time::Duration as TimeDuration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, instrument, warn};

use crate::{
    config::AppConfig,
    gate::{self, SessionHandle, found},
    pages, users,
};

pub const SESSION_COOKIE: &str = "rh_session";
const LOGIN_FAILED: &str = "/login?error=credentials";

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<AppConfig>,
    pub policy: Arc<AccessPolicy>,
    pub routes: Arc<RouteTable>,
}

impl AppState {
    pub fn new(pool: DbPool, config: AppConfig) -> Self {
        let policy = config.access_policy();
        Self {
            pool,
            config: Arc::new(config),
            policy: Arc::new(policy),
            routes: Arc::new(RouteTable::default()),
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.config.cookie_key.clone()
    }
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(%config.addr, "rh server listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let layer = CorsLayer::new()
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_methods([Method::POST, Method::GET]);
    if allowed.is_empty() {
        // credentials cannot be combined with a wildcard origin
        layer.allow_origin(AllowOrigin::any())
    } else {
        layer
            .allow_credentials(true)
            .allow_origin(AllowOrigin::list(allowed))
    }
}

pub fn build_router(state: AppState) -> Router {
    let request_id = MakeRequestUuid;
    let header_name = HeaderName::from_static("x-request-id");
    Router::new()
        .route("/", get(home_handler))
        .route("/home", get(home_handler))
        .route("/login", get(login_page).post(login_handler))
        .route("/forgot-password", get(forgot_password_page))
        .route("/logout", post(logout_handler))
        .route("/rh-users", get(users::rh_users_index))
        .route("/rh-users/create-colaborator", post(users::create_by_admin))
        .route("/rh-users/management/home", get(users::management_home))
        .route(
            "/rh-users/management/create-colaborator",
            post(users::create_by_rh),
        )
        .route("/departments", get(users::departments_index))
        .route("/departments/create", post(users::create_department))
        .route("/health", get(health_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            gate::access_gate,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), request_id))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_allowed_origins)),
        )
        .with_state(state)
}

#[derive(Deserialize)]
struct LoginQuery {
    error: Option<String>,
}

async fn login_page(Query(query): Query<LoginQuery>) -> Html<String> {
    pages::login(query.error.is_some())
}

async fn forgot_password_page() -> Html<String> {
    pages::forgot_password()
}

#[instrument(name = "http.login", skip_all)]
async fn login_handler(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    headers: HeaderMap,
    Form(credentials): Form<Credentials>,
) -> ApiResult<(PrivateCookieJar, Response)> {
    let user = match credentials.email() {
        Some(email) => platform_db::find_user_by_email(&state.pool, &email)
            .await
            .map_err(directory_error)?,
        None => None,
    };
    let password = credentials.password.clone();
    let Some(user) = user else {
        tokio::task::spawn_blocking(move || platform_authn::verify_decoy(&password))
            .await
            .map_err(internal_error)?;
        warn!("login attempt for unknown account");
        return Ok((jar, found(LOGIN_FAILED)));
    };
    let stored = user.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || {
        platform_authn::verify_password(&password, &stored)
    })
    .await
    .map_err(internal_error)?
    .map_err(internal_error)?;
    if !verified {
        warn!(user_id = user.id, "login rejected");
        return Ok((jar, found(LOGIN_FAILED)));
    }

    let user_agent = headers
        .get(http::header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let session = platform_db::open_session(
        &state.pool,
        user.id,
        state.config.session_ttl,
        None,
        user_agent,
    )
    .await
    .map_err(directory_error)?;

    let cookie = Cookie::build((SESSION_COOKIE, session.id.to_string()))
        .path("/")
        .http_only(true)
        .secure(state.config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::seconds(state.config.session_ttl.num_seconds()))
        .build();
    info!(user_id = user.id, "login succeeded");
    Ok((jar.add(cookie), found(&state.policy.home_route)))
}

async fn logout_handler(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Extension(SessionHandle(session_id)): Extension<SessionHandle>,
) -> ApiResult<(PrivateCookieJar, Response)> {
    platform_db::close_session(&state.pool, session_id)
        .await
        .map_err(directory_error)?;
    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/").build());
    Ok((jar, found(&state.policy.login_route)))
}

async fn home_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Html<String>> {
    let user = platform_db::find_user(&state.pool, principal.user_id)
        .await
        .map_err(directory_error)?
        .ok_or(ApiError::Unauthenticated)?;
    Ok(pages::home(&user, principal.role))
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let backend = state.pool.get_database_backend();
    let db_ok = state
        .pool
        .execute(Statement::from_string(backend, "SELECT 1".to_string()))
        .await
        .is_ok();
    Json(HealthResponse {
        ok: db_ok,
        db_ok,
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    db_ok: bool,
    version: &'static str,
}

pub(crate) fn directory_error(err: DirectoryError) -> ApiError {
    match err {
        DirectoryError::Db(err) => internal_error(err),
        other => ApiError::invalid(other.to_string()),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for CTRL+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
