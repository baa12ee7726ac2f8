use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::users::Role;

/// Copy of the user fields taken at session start. Not re-read from the
/// users table on each request, so a role change lands at next login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub user_role: Role,
    pub expires_at: OffsetDateTime,
}

impl Session {
    pub fn snapshot(&self) -> UserSnapshot {
        UserSnapshot {
            name: self.user_name.clone(),
            email: self.user_email.clone(),
            role: self.user_role,
        }
    }

    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }

    /// Insert a new session with a random id, expiring `ttl_secs` from now.
    pub async fn start(
        db: &PgPool,
        snapshot: &UserSnapshot,
        ttl_secs: i64,
    ) -> anyhow::Result<Session> {
        let session = Session {
            id: Uuid::new_v4(),
            user_name: snapshot.name.clone(),
            user_email: snapshot.email.clone(),
            user_role: snapshot.role,
            expires_at: OffsetDateTime::now_utc() + Duration::seconds(ttl_secs),
        };
        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_name, user_email, user_role, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(session.id)
        .bind(&session.user_name)
        .bind(&session.user_email)
        .bind(session.user_role)
        .bind(session.expires_at)
        .execute(db)
        .await?;
        debug!(session_id = %session.id, "session started");
        Ok(session)
    }

    /// Look up a session id. Absent and expired both resolve to `None`;
    /// an expired row is swept on lookup.
    pub async fn resolve(db: &PgPool, id: Uuid) -> anyhow::Result<Option<UserSnapshot>> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_name, user_email, user_role, expires_at
            FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;

        match session {
            Some(s) if s.is_expired(OffsetDateTime::now_utc()) => {
                Session::destroy(db, id).await?;
                debug!(session_id = %id, "expired session swept");
                Ok(None)
            }
            Some(s) => Ok(Some(s.snapshot())),
            None => Ok(None),
        }
    }

    /// Delete a session. Deleting one that does not exist is a no-op.
    pub async fn destroy(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}
