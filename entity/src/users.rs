use platform_authz::Role as AccessRole;
use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(indexed)]
    pub department_id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    /// JSON array of capability tags, e.g. `["rh"]`.
    pub permissions: String,
    pub salary_cents: i64,
    pub admission_date: Date,
    pub address: Option<String>,
    pub zip_code: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::departments::Entity",
        from = "Column::DepartmentId",
        to = "super::departments::Column::Id",
        on_delete = "Restrict"
    )]
    Department,
    #[sea_orm(has_many = "super::sessions::Entity")]
    Session,
}

impl Related<super::departments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl Related<super::sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq, Serialize)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "rh")]
    Rh,
    #[sea_orm(string_value = "colaborator")]
    Colaborator,
}

impl From<Role> for AccessRole {
    fn from(value: Role) -> Self {
        match value {
            Role::Admin => AccessRole::Admin,
            Role::Rh => AccessRole::Rh,
            Role::Colaborator => AccessRole::Colaborator,
        }
    }
}

impl From<AccessRole> for Role {
    fn from(value: AccessRole) -> Self {
        match value {
            AccessRole::Admin => Role::Admin,
            AccessRole::Rh => Role::Rh,
            AccessRole::Colaborator => Role::Colaborator,
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
