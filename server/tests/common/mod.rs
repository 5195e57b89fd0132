#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use axum_extra::extract::cookie::Key;
use chrono::NaiveDate;
use entity::{departments, users};
use http_body_util::BodyExt;
use migration::{Migrator, MigratorTrait};
use platform_authz::{PermissionSet, Role};
use platform_db::{DbPool, NewUser};
use rh_server::{
    config::AppConfig,
    http::{AppState, build_router},
};
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, Statement};
use tower::ServiceExt;

pub const PASSWORD: &str = "senha-forte-123";

pub struct TestApp {
    pub pool: DbPool,
    pub router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(AppConfig::new(Key::generate())).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let pool = Database::connect("sqlite::memory:").await.unwrap();
        pool.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            "PRAGMA foreign_keys = ON;",
        ))
        .await
        .unwrap();
        Migrator::up(&pool, None).await.unwrap();
        let state = AppState::new(pool.clone(), config);
        Self {
            router: build_router(state),
            pool,
        }
    }

    pub async fn add_department(&self, name: &str) -> departments::Model {
        platform_db::create_department(&self.pool, name)
            .await
            .unwrap()
    }

    pub async fn add_user(&self, role: Role, email: &str) -> users::Model {
        let department = match platform_db::list_departments(&self.pool)
            .await
            .unwrap()
            .into_iter()
            .next()
        {
            Some(department) => department,
            None => self.add_department("Geral").await,
        };
        platform_db::create_user(
            &self.pool,
            NewUser {
                department_id: department.id,
                name: format!("{role} user"),
                email: email.to_string(),
                password_hash: platform_authn::hash_password(PASSWORD).unwrap(),
                role,
                permissions: PermissionSet::new(),
                salary_cents: 450_000,
                admission_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                address: None,
                zip_code: None,
                city: None,
                phone: None,
            },
        )
        .await
        .unwrap()
    }

    pub async fn add_admin_user(&self) -> users::Model {
        self.add_user(Role::Admin, "admin@rh.test").await
    }

    pub async fn add_rh_user(&self) -> users::Model {
        self.add_user(Role::Rh, "rh@rh.test").await
    }

    pub async fn add_colaborator_user(&self) -> users::Model {
        self.add_user(Role::Colaborator, "colaborator@rh.test")
            .await
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(
        &self,
        path: &str,
        fields: &[(&str, &str)],
        cookie: Option<&str>,
    ) -> Response<Body> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body)).unwrap()).await
    }

    /// Logs in and returns the `name=value` pair to send back as a cookie.
    pub async fn login(&self, email: &str) -> String {
        let response = self
            .post_form("/login", &[("email", email), ("password", PASSWORD)], None)
            .await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), Some("/home"));
        session_cookie(&response).expect("login sets a session cookie")
    }
}

pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

/// `name=value` pair of a cookie set by the response.
pub fn cookie_pair(response: &Response<Body>, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter(|value| value.starts_with(&prefix))
        .filter_map(|value| value.split(';').next())
        .map(str::to_string)
        .next()
}

pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    cookie_pair(response, "rh_session")
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
