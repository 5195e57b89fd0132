use anyhow::{Context, Result, anyhow};
use axum_extra::extract::cookie::Key;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use platform_authz::{AccessPolicy, RouteAccess, RouteTable};
use tracing::warn;

/// Cookie keys need 64 bytes of material (signing + encryption halves).
const COOKIE_KEY_LEN: usize = 64;
const DEFAULT_SESSION_TTL_HOURS: i64 = 12;

#[derive(Clone)]
pub struct AppConfig {
    pub cookie_key: Key,
    pub secure_cookies: bool,
    pub cors_allowed_origins: Vec<String>,
    pub session_ttl: chrono::Duration,
    /// Redirect for collaborators reaching rh-or-admin pages.
    pub forbidden_redirect: String,
}

impl AppConfig {
    pub fn new(cookie_key: Key) -> Self {
        Self {
            cookie_key,
            secure_cookies: true,
            cors_allowed_origins: Vec::new(),
            session_ttl: chrono::Duration::hours(DEFAULT_SESSION_TTL_HOURS),
            forbidden_redirect: AccessPolicy::default().forbidden_redirect,
        }
    }

    pub fn load() -> Result<Self> {
        let cookie_secret =
            std::env::var("COOKIE_SECRET_BASE64").context("COOKIE_SECRET_BASE64 missing")?;
        let secret_bytes = STANDARD
            .decode(cookie_secret.trim())
            .context("invalid COOKIE_SECRET_BASE64")?;
        if secret_bytes.len() < COOKIE_KEY_LEN {
            return Err(anyhow!(
                "COOKIE_SECRET_BASE64 must decode to at least {COOKIE_KEY_LEN} bytes"
            ));
        }
        let mut config = Self::new(Key::from(&secret_bytes[..COOKIE_KEY_LEN]));

        config.secure_cookies = env_bool("COOKIE_SECURE", true);
        config.cors_allowed_origins = parse_origins(
            &std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );
        if let Ok(raw) = std::env::var("SESSION_TTL_HOURS") {
            let hours = raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|h| *h > 0)
                .ok_or_else(|| anyhow!("SESSION_TTL_HOURS must be a positive integer"))?;
            config.session_ttl = chrono::Duration::hours(hours);
        }
        if let Ok(target) = std::env::var("FORBIDDEN_REDIRECT") {
            config.forbidden_redirect = parse_redirect(&target)?;
        }
        Ok(config)
    }

    /// A gated forbidden target falls back to the default so the gate cannot loop.
    pub fn access_policy(&self) -> AccessPolicy {
        let policy = AccessPolicy::default();
        match parse_redirect(&self.forbidden_redirect) {
            Ok(target) => policy.with_forbidden_redirect(target),
            Err(err) => {
                warn!(error = %err, "ignoring forbidden redirect");
                policy
            }
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}

/// Local paths only, and never one a collaborator is itself denied.
fn parse_redirect(raw: &str) -> Result<String> {
    let target = raw.trim();
    if !target.starts_with('/') || target.starts_with("//") {
        return Err(anyhow!("FORBIDDEN_REDIRECT must be a local path, got {target:?}"));
    }
    let path = target.split(['?', '#']).next().unwrap_or(target);
    match RouteTable::default().classify("GET", path) {
        RouteAccess::AdminOnly | RouteAccess::RhOrAdmin | RouteAccess::GuestOnly => Err(anyhow!(
            "FORBIDDEN_REDIRECT {target:?} is itself gated and would loop"
        )),
        RouteAccess::Public | RouteAccess::Authenticated => Ok(target.to_string()),
    }
}

fn env_bool(var: &str, default: bool) -> bool {
    std::env::var(var)
        .ok()
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_split_and_trimmed() {
        assert_eq!(
            parse_origins(" http://a.test , ,http://b.test"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn forbidden_redirect_must_stay_local() {
        assert_eq!(parse_redirect(" /home ").unwrap(), "/home");
        assert!(parse_redirect("https://evil.test").is_err());
        assert!(parse_redirect("//evil.test").is_err());
    }

    #[test]
    fn forbidden_redirect_must_not_be_gated_itself() {
        for gated in [
            "/rh-users/management/home",
            "/rh-users/management/home?x=1",
            "/rh-users",
            "/departments/",
            "/login",
            "/forgot-password",
        ] {
            assert!(parse_redirect(gated).is_err(), "{gated}");
        }
        assert_eq!(parse_redirect("/").unwrap(), "/");
        assert_eq!(parse_redirect("/home?negado=1").unwrap(), "/home?negado=1");

        let mut config = AppConfig::new(Key::generate());
        config.forbidden_redirect = "/rh-users/management/home".into();
        assert_eq!(config.access_policy().forbidden_redirect, "/home");
        config.forbidden_redirect = "/".into();
        assert_eq!(config.access_policy().forbidden_redirect, "/");
    }

    #[test]
    fn defaults_feed_the_access_policy() {
        let config = AppConfig::new(Key::generate());
        assert_eq!(config.session_ttl, chrono::Duration::hours(12));
        let policy = config.access_policy();
        assert_eq!(policy.forbidden_redirect, "/home");
        assert_eq!(policy.login_route, "/login");
    }
}
