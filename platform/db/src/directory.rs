use chrono::{NaiveDate, Utc};
use entity::{departments, users};
use platform_authz::{PermissionSet, Principal, Role};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, SqlErr,
};
use tracing::{info, instrument, warn};

use crate::{DirectoryError, DirectoryResult};

/// Validated input for a new account. Hashing and field validation happen upstream.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub department_id: i32,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub permissions: PermissionSet,
    pub salary_cents: i64,
    pub admission_date: NaiveDate,
    pub address: Option<String>,
    pub zip_code: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
}

#[instrument(skip(db))]
pub async fn create_department<C>(db: &C, name: &str) -> DirectoryResult<departments::Model>
where
    C: ConnectionTrait,
{
    let name = name.trim();
    if name.is_empty() {
        return Err(DirectoryError::InvalidRecord("department name is required".into()));
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let model = departments::ActiveModel {
        name: Set(name.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(department_id = model.id, "department created");
    Ok(model)
}

pub async fn list_departments<C>(db: &C) -> DirectoryResult<Vec<departments::Model>>
where
    C: ConnectionTrait,
{
    Ok(departments::Entity::find()
        .order_by_asc(departments::Column::Id)
        .all(db)
        .await?)
}

pub async fn find_department<C>(db: &C, id: i32) -> DirectoryResult<Option<departments::Model>>
where
    C: ConnectionTrait,
{
    Ok(departments::Entity::find_by_id(id).one(db).await?)
}

#[instrument(skip(db, input), fields(email = %input.email, role = %input.role))]
pub async fn create_user<C>(db: &C, input: NewUser) -> DirectoryResult<users::Model>
where
    C: ConnectionTrait,
{
    let email = input.email.trim().to_lowercase();
    if find_department(db, input.department_id).await?.is_none() {
        return Err(DirectoryError::UnknownDepartment(input.department_id));
    }
    if find_user_by_email(db, &email).await?.is_some() {
        return Err(DirectoryError::DuplicateEmail(email));
    }
    let permissions = if input.permissions.is_empty() {
        PermissionSet::from_permissions([input.role.default_permission()])
    } else {
        input.permissions
    };
    let now: DateTimeWithTimeZone = Utc::now().into();
    let model = users::ActiveModel {
        department_id: Set(input.department_id),
        name: Set(input.name),
        email: Set(email.clone()),
        password_hash: Set(input.password_hash),
        role: Set(input.role.into()),
        permissions: Set(permissions.to_json()),
        salary_cents: Set(input.salary_cents),
        admission_date: Set(input.admission_date),
        address: Set(input.address),
        zip_code: Set(input.zip_code),
        city: Set(input.city),
        phone: Set(input.phone),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|err| duplicate_or_db(err, &email))?;
    info!(user_id = model.id, "user created");
    Ok(model)
}

fn duplicate_or_db(err: DbErr, email: &str) -> DirectoryError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => DirectoryError::DuplicateEmail(email.into()),
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            DirectoryError::InvalidRecord("department reference rejected".into())
        }
        _ => DirectoryError::Db(err),
    }
}

pub async fn find_user<C>(db: &C, id: i32) -> DirectoryResult<Option<users::Model>>
where
    C: ConnectionTrait,
{
    Ok(users::Entity::find_by_id(id).one(db).await?)
}

pub async fn find_user_by_email<C>(db: &C, email: &str) -> DirectoryResult<Option<users::Model>>
where
    C: ConnectionTrait,
{
    let normalized = email.trim().to_lowercase();
    Ok(users::Entity::find()
        .filter(users::Column::Email.eq(normalized))
        .one(db)
        .await?)
}

pub async fn users_with_role<C>(db: &C, role: Role) -> DirectoryResult<Vec<users::Model>>
where
    C: ConnectionTrait,
{
    Ok(users::Entity::find()
        .filter(users::Column::Role.eq(users::Role::from(role)))
        .order_by_asc(users::Column::Name)
        .all(db)
        .await?)
}

pub async fn user_count<C>(db: &C) -> DirectoryResult<u64>
where
    C: ConnectionTrait,
{
    Ok(users::Entity::find().count(db).await?)
}

/// Builds the gate principal for a stored user.
///
/// Permission tags are advisory, so a malformed stored value degrades to the
/// role's default tag instead of failing the request.
pub fn principal_for(user: &users::Model) -> Principal {
    let role: Role = user.role.into();
    let permissions = PermissionSet::from_json(&user.permissions).unwrap_or_else(|err| {
        warn!(user_id = user.id, error = %err, "stored permissions unreadable");
        PermissionSet::from_permissions([role.default_permission()])
    });
    Principal::new(user.id, role, permissions)
}
