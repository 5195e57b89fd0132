use chrono::{Duration, Utc};
use entity::{sessions, users};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::DirectoryResult;

#[instrument(skip(db, user_agent))]
pub async fn open_session<C>(
    db: &C,
    user_id: i32,
    ttl: Duration,
    ip: Option<String>,
    user_agent: Option<String>,
) -> DirectoryResult<sessions::Model>
where
    C: ConnectionTrait,
{
    let now = Utc::now();
    let model = sessions::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        created_at: Set(now.into()),
        expires_at: Set((now + ttl).into()),
        ip: Set(ip),
        user_agent: Set(user_agent),
    }
    .insert(db)
    .await?;
    Ok(model)
}

/// Resolves a live session to its user. Expired sessions are deleted and read as absent.
pub async fn resolve_session<C>(
    db: &C,
    session_id: Uuid,
) -> DirectoryResult<Option<(sessions::Model, users::Model)>>
where
    C: ConnectionTrait,
{
    let Some(session) = sessions::Entity::find_by_id(session_id).one(db).await? else {
        return Ok(None);
    };
    if session.expires_at.with_timezone(&Utc) <= Utc::now() {
        debug!(%session_id, "session expired");
        sessions::Entity::delete_by_id(session_id).exec(db).await?;
        return Ok(None);
    }
    let user = users::Entity::find_by_id(session.user_id).one(db).await?;
    Ok(user.map(|user| (session, user)))
}

/// Returns `true` when a row was removed.
pub async fn close_session<C>(db: &C, session_id: Uuid) -> DirectoryResult<bool>
where
    C: ConnectionTrait,
{
    let result = sessions::Entity::delete_by_id(session_id).exec(db).await?;
    Ok(result.rows_affected > 0)
}

pub async fn purge_expired_sessions<C>(db: &C) -> DirectoryResult<u64>
where
    C: ConnectionTrait,
{
    let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
    let result = sessions::Entity::delete_many()
        .filter(sessions::Column::ExpiresAt.lte(now))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::memory_pool;
    use crate::{NewUser, create_department, create_user};
    use chrono::NaiveDate;
    use platform_authz::{PermissionSet, Role};

    async fn seeded_user(db: &crate::DbPool) -> users::Model {
        let dept = create_department(db, "Administração").await.unwrap();
        create_user(
            db,
            NewUser {
                department_id: dept.id,
                name: "Admin".into(),
                email: "admin@rhmangnt.com".into(),
                password_hash: "hash".into(),
                role: Role::Admin,
                permissions: PermissionSet::new(),
                salary_cents: 0,
                admission_date: NaiveDate::from_ymd_opt(2020, 5, 4).unwrap(),
                address: None,
                zip_code: None,
                city: None,
                phone: None,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn live_session_resolves_to_user() {
        let db = memory_pool().await;
        let user = seeded_user(&db).await;
        let session = open_session(&db, user.id, Duration::hours(1), None, None)
            .await
            .unwrap();
        let (found, owner) = resolve_session(&db, session.id).await.unwrap().unwrap();
        assert_eq!(found.id, session.id);
        assert_eq!(owner.id, user.id);

        assert!(close_session(&db, session.id).await.unwrap());
        assert!(resolve_session(&db, session.id).await.unwrap().is_none());
        assert!(!close_session(&db, session.id).await.unwrap());
    }

    #[tokio::test]
    async fn expired_session_is_dropped() {
        let db = memory_pool().await;
        let user = seeded_user(&db).await;
        let stale = open_session(&db, user.id, Duration::seconds(-5), None, None)
            .await
            .unwrap();
        assert!(resolve_session(&db, stale.id).await.unwrap().is_none());
        assert!(sessions::Entity::find_by_id(stale.id).one(&db).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn purge_removes_only_expired_rows() {
        let db = memory_pool().await;
        let user = seeded_user(&db).await;
        open_session(&db, user.id, Duration::seconds(-5), None, None)
            .await
            .unwrap();
        let live = open_session(&db, user.id, Duration::hours(2), None, None)
            .await
            .unwrap();
        assert_eq!(purge_expired_sessions(&db).await.unwrap(), 1);
        assert!(resolve_session(&db, live.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn unknown_session_is_absent() {
        let db = memory_pool().await;
        assert!(resolve_session(&db, Uuid::new_v4()).await.unwrap().is_none());
    }
}
