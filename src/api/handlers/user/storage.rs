//! Identity store: users and their session-key records.
//!
//! Both write paths are single-statement upserts keyed on the unique columns
//! (`users.open_id`, `session_keys.user_id`), so two concurrent logins for
//! the same identity cannot create duplicate rows and record ids stay stable
//! for the lifetime of a user.

use crate::wechat::WxProfile;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::Instrument;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub open_id: String,
    pub nick_name: String,
    pub avatar_url: String,
    pub gender: i16,
    pub language: String,
    pub city: String,
    pub province: String,
    pub country: String,
}

/// The single durable copy of a user's current session key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionKeyRecord {
    pub id: i64,
    pub user_id: i64,
    pub session_key: String,
}

#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Look up by external identity, creating the user on first login. When
    /// `update_on_login` is set the stored profile fields are refreshed,
    /// otherwise the first-login snapshot is kept.
    async fn find_or_create_user(&self, profile: &WxProfile, update_on_login: bool)
        -> Result<User>;

    /// Store the latest session key for a user, creating the record on first
    /// login and overwriting the key in place afterwards.
    async fn upsert_session_key(&self, user_id: i64, session_key: &str)
        -> Result<SessionKeyRecord>;

    async fn session_key_record(&self, record_id: i64) -> Result<Option<SessionKeyRecord>>;
}

pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn find_or_create_user(
        &self,
        profile: &WxProfile,
        update_on_login: bool,
    ) -> Result<User> {
        // The no-op conflict arm keeps the statement atomic while still
        // returning the existing row.
        let query = if update_on_login {
            r"
            INSERT INTO users
                (open_id, nick_name, avatar_url, gender, language, city, province, country)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (open_id) DO UPDATE SET
                nick_name = EXCLUDED.nick_name,
                avatar_url = EXCLUDED.avatar_url,
                gender = EXCLUDED.gender,
                language = EXCLUDED.language,
                city = EXCLUDED.city,
                province = EXCLUDED.province,
                country = EXCLUDED.country,
                updated_at = NOW()
            RETURNING id, open_id, nick_name, avatar_url, gender, language, city, province, country
            "
        } else {
            r"
            INSERT INTO users
                (open_id, nick_name, avatar_url, gender, language, city, province, country)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (open_id) DO UPDATE SET
                open_id = EXCLUDED.open_id
            RETURNING id, open_id, nick_name, avatar_url, gender, language, city, province, country
            "
        };
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(&profile.open_id)
            .bind(&profile.nick_name)
            .bind(&profile.avatar_url)
            .bind(profile.gender)
            .bind(&profile.language)
            .bind(&profile.city)
            .bind(&profile.province)
            .bind(&profile.country)
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .context("failed to upsert user")?;

        Ok(User {
            id: row.get("id"),
            open_id: row.get("open_id"),
            nick_name: row.get("nick_name"),
            avatar_url: row.get("avatar_url"),
            gender: row.get("gender"),
            language: row.get("language"),
            city: row.get("city"),
            province: row.get("province"),
            country: row.get("country"),
        })
    }

    async fn upsert_session_key(
        &self,
        user_id: i64,
        session_key: &str,
    ) -> Result<SessionKeyRecord> {
        let query = r"
            INSERT INTO session_keys (user_id, session_key)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET
                session_key = EXCLUDED.session_key,
                updated_at = NOW()
            RETURNING id, user_id, session_key
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(user_id)
            .bind(session_key)
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .context("failed to upsert session key")?;

        Ok(SessionKeyRecord {
            id: row.get("id"),
            user_id: row.get("user_id"),
            session_key: row.get("session_key"),
        })
    }

    async fn session_key_record(&self, record_id: i64) -> Result<Option<SessionKeyRecord>> {
        let query = "SELECT id, user_id, session_key FROM session_keys WHERE id = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(record_id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup session key record")?;

        Ok(row.map(|row| SessionKeyRecord {
            id: row.get("id"),
            user_id: row.get("user_id"),
            session_key: row.get("session_key"),
        }))
    }
}
