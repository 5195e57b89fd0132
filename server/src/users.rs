//! Account and department screens behind the admin and rh gates.

use axum::{
    Extension, Form,
    extract::State,
    response::{Html, Response},
};
use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use chrono::NaiveDate;
use platform_api::{ApiError, ApiResult, internal_error};
use platform_authz::{PermissionSet, Principal, Role};
use platform_db::NewUser;
use products_hr::Employee;
use serde::Deserialize;
use time::Duration as TimeDuration;
use tracing::{debug, info, instrument, warn};

use crate::{
    gate::found,
    http::{AppState, directory_error},
    pages,
};

/// One-shot message carried across the post-create redirect.
pub const NOTICE_COOKIE: &str = "rh_notice";
const NOTICE_TTL_SECS: i64 = 300;

/// Fields posted by both create-user forms.
#[derive(Clone, Deserialize)]
pub struct CreateUserForm {
    pub name: String,
    pub email: String,
    pub select_department: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub salary: String,
    pub admission_date: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub permissions: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// A create form that passed field validation; the password is still plaintext.
struct ValidatedUser {
    record: NewUser,
    password: String,
    generated: bool,
}

impl CreateUserForm {
    fn validate(self, default_role: Role) -> ApiResult<ValidatedUser> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ApiError::invalid("name is required"));
        }
        let email = platform_authn::normalize_email(&self.email)
            .map_err(|err| ApiError::invalid(err.to_string()))?;
        let department_id = self
            .select_department
            .trim()
            .parse::<i32>()
            .map_err(|_| ApiError::invalid("select_department must be a department id"))?;
        let salary_cents = products_hr::parse_salary_cents(&self.salary)
            .map_err(|err| ApiError::invalid(err.to_string()))?;
        let admission_date = NaiveDate::parse_from_str(self.admission_date.trim(), "%Y-%m-%d")
            .map_err(|_| ApiError::invalid("admission_date must be YYYY-MM-DD"))?;
        let role = match non_blank(self.role) {
            Some(raw) => Role::parse(&raw).map_err(|err| ApiError::invalid(err.to_string()))?,
            None => default_role,
        };
        let permissions = match non_blank(self.permissions) {
            Some(raw) => {
                PermissionSet::from_json(&raw).map_err(|err| ApiError::invalid(err.to_string()))?
            }
            None => PermissionSet::new(),
        };
        let (password, generated) = match non_blank(self.password) {
            Some(password) => {
                platform_authn::validate_password(&password)
                    .map_err(|err| ApiError::invalid(err.to_string()))?;
                (password, false)
            }
            None => (platform_authn::generate_password(), true),
        };

        Ok(ValidatedUser {
            record: NewUser {
                department_id,
                name,
                email,
                password_hash: String::new(),
                role,
                permissions,
                salary_cents,
                admission_date,
                address: non_blank(self.address),
                zip_code: non_blank(self.zip_code),
                city: non_blank(self.city),
                phone: non_blank(self.phone),
            },
            password,
            generated,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Deserialize)]
pub struct DepartmentForm {
    pub name: String,
}

pub async fn rh_users_index(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> ApiResult<(PrivateCookieJar, Html<String>)> {
    let rh_users = platform_db::users_with_role(&state.pool, Role::Rh)
        .await
        .map_err(directory_error)?;
    let departments = platform_db::list_departments(&state.pool)
        .await
        .map_err(directory_error)?;
    let (jar, notice) = take_notice(jar);
    Ok((
        jar,
        pages::rh_users(&rh_users, &departments, notice.as_deref()),
    ))
}

pub async fn create_by_admin(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    jar: PrivateCookieJar,
    Form(form): Form<CreateUserForm>,
) -> ApiResult<(PrivateCookieJar, Response)> {
    let created = create_account(&state, &principal, form, Role::Rh).await?;
    Ok((created.leave_notice(&state, jar), found("/rh-users")))
}

pub async fn management_home(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> ApiResult<(PrivateCookieJar, Html<String>)> {
    let colaborators = platform_db::users_with_role(&state.pool, Role::Colaborator)
        .await
        .map_err(directory_error)?;
    let employees: Vec<Employee> = colaborators
        .into_iter()
        .map(|user| Employee {
            id: user.id,
            full_name: user.name,
            salary_cents: user.salary_cents,
        })
        .collect();
    let departments = platform_db::list_departments(&state.pool)
        .await
        .map_err(directory_error)?;
    let (jar, notice) = take_notice(jar);
    Ok((
        jar,
        pages::management(&employees, &departments, notice.as_deref()),
    ))
}

pub async fn create_by_rh(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    jar: PrivateCookieJar,
    Form(form): Form<CreateUserForm>,
) -> ApiResult<(PrivateCookieJar, Response)> {
    let created = create_account(&state, &principal, form, Role::Colaborator).await?;
    Ok((
        created.leave_notice(&state, jar),
        found("/rh-users/management/home"),
    ))
}

/// Result of a successful creation; holds the initial password only when it was generated.
struct CreatedAccount {
    email: String,
    initial_password: Option<String>,
}

impl CreatedAccount {
    fn leave_notice(self, state: &AppState, jar: PrivateCookieJar) -> PrivateCookieJar {
        let Some(password) = self.initial_password else {
            return jar;
        };
        let cookie = Cookie::build((
            NOTICE_COOKIE,
            format!("Senha inicial de {}: {password}", self.email),
        ))
        .path("/")
        .http_only(true)
        .secure(state.config.secure_cookies)
        .same_site(SameSite::Strict)
        .max_age(TimeDuration::seconds(NOTICE_TTL_SECS))
        .build();
        jar.add(cookie)
    }
}

/// Reads the pending notice and clears it so it renders once.
fn take_notice(jar: PrivateCookieJar) -> (PrivateCookieJar, Option<String>) {
    match jar.get(NOTICE_COOKIE) {
        Some(cookie) => {
            let notice = cookie.value().to_string();
            let jar = jar.remove(Cookie::build((NOTICE_COOKIE, "")).path("/").build());
            (jar, Some(notice))
        }
        None => (jar, None),
    }
}

#[instrument(skip(state, principal, form), fields(actor = principal.user_id, actor_role = %principal.role))]
async fn create_account(
    state: &AppState,
    principal: &Principal,
    form: CreateUserForm,
    default_role: Role,
) -> ApiResult<CreatedAccount> {
    let ValidatedUser {
        mut record,
        password,
        generated,
    } = form.validate(default_role)?;
    if !principal.may_create(record.role) {
        warn!(target_role = %record.role, "account creation refused");
        return Err(ApiError::Forbidden);
    }

    let initial_password = generated.then(|| password.clone());
    record.password_hash =
        tokio::task::spawn_blocking(move || platform_authn::hash_password(&password))
            .await
            .map_err(internal_error)?
            .map_err(internal_error)?;
    if generated {
        debug!("initial password generated");
    }

    let user = platform_db::create_user(&state.pool, record)
        .await
        .map_err(directory_error)?;
    info!(user_id = user.id, role = %principal.role, "account created");
    Ok(CreatedAccount {
        email: user.email,
        initial_password,
    })
}

pub async fn departments_index(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let departments = platform_db::list_departments(&state.pool)
        .await
        .map_err(directory_error)?;
    Ok(pages::departments(&departments))
}

pub async fn create_department(
    State(state): State<AppState>,
    Form(form): Form<DepartmentForm>,
) -> ApiResult<Response> {
    platform_db::create_department(&state.pool, &form.name)
        .await
        .map_err(directory_error)?;
    Ok(found("/departments"))
}
