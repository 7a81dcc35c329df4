//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{ApiKeyId, UserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{
    api_key::{ApiKey, ApiKeyStatus},
    auth::Auth,
    auth_session::AuthSession,
    user::User,
};
use crate::domain::repository::{
    ApiKeyRepository, AuthRepository, AuthSessionRepository, UserRepository,
};
use crate::domain::value_object::{
    api_key_secret::KeyEnvironment, email::Email, public_id::PublicId,
    user_password::UserPassword, user_role::UserRole, user_status::UserStatus,
};
use crate::error::{AuthError, AuthResult};

const USER_COLUMNS: &str = r#"
    user_id,
    public_id,
    email,
    name,
    user_role,
    user_status,
    credits,
    monthly_credit_limit,
    plan_id,
    last_login_at,
    created_at,
    updated_at
"#;

const SESSION_COLUMNS: &str = r#"
    session_id,
    user_id,
    public_id,
    user_role,
    expires_at_ms,
    remember_me,
    client_fingerprint_hash,
    client_ip,
    user_agent,
    created_at,
    last_activity_at
"#;

const API_KEY_COLUMNS: &str = r#"
    id,
    owner_id,
    name,
    key_prefix,
    key_last_four,
    key_hash,
    status,
    created_at,
    last_used_at
"#;

#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now_ms = Utc::now().timestamp_millis();

        let deleted = sqlx::query("DELETE FROM auth_sessions WHERE expires_at_ms < $1")
            .bind(now_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired auth sessions");

        Ok(deleted)
    }

    async fn fetch_user<T>(&self, column: &str, value: T) -> AuthResult<Option<User>>
    where
        T: for<'q> sqlx::Encode<'q, sqlx::Postgres> + sqlx::Type<sqlx::Postgres> + Send + 'static,
    {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                public_id,
                email,
                name,
                user_role,
                user_status,
                credits,
                monthly_credit_limit,
                plan_id,
                last_login_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.public_id.as_str())
        .bind(user.email.as_str())
        .bind(&user.name)
        .bind(user.user_role.id())
        .bind(user.user_status.id())
        .bind(user.credits)
        .bind(user.monthly_credit_limit)
        .bind(&user.plan_id)
        .bind(user.last_login_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AuthError::EmailTaken,
            _ => AuthError::Database(e),
        })?;

        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        self.fetch_user("user_id", *user_id.as_uuid()).await
    }

    async fn find_by_public_id(&self, public_id: &PublicId) -> AuthResult<Option<User>> {
        self.fetch_user("public_id", public_id.as_str().to_string())
            .await
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        self.fetch_user("email", email.as_str().to_string())
            .await
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn list(&self) -> AuthResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                name = $2,
                user_role = $3,
                user_status = $4,
                monthly_credit_limit = $5,
                plan_id = $6,
                last_login_at = $7,
                updated_at = $8
            WHERE user_id = $1
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(&user.name)
        .bind(user.user_role.id())
        .bind(user.user_status.id())
        .bind(user.monthly_credit_limit)
        .bind(&user.plan_id)
        .bind(user.last_login_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }

    async fn set_credits(&self, user_id: &UserId, credits: i64) -> AuthResult<()> {
        let result = sqlx::query(
            "UPDATE users SET credits = $2, updated_at = NOW() WHERE user_id = $1",
        )
        .bind(user_id.as_uuid())
        .bind(credits)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }

    async fn adjust_credits(&self, user_id: &UserId, delta: i64) -> AuthResult<Option<i64>> {
        // Conditional update: the row lock makes check-and-debit atomic
        let balance = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE users
            SET credits = credits + $2, updated_at = NOW()
            WHERE user_id = $1 AND credits + $2 >= 0
            RETURNING credits
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(delta)
        .fetch_optional(&self.pool)
        .await?;

        if balance.is_some() {
            return Ok(balance);
        }

        // Distinguish "insufficient" from "no such user"
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE user_id = $1)")
                .bind(user_id.as_uuid())
                .fetch_one(&self.pool)
                .await?;

        if exists {
            Ok(None)
        } else {
            Err(AuthError::UserNotFound)
        }
    }
}

// ============================================================================
// Auth Repository Implementation
// ============================================================================

impl AuthRepository for PgAuthRepository {
    async fn create(&self, auth: &Auth) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO auth_credentials (
                user_id,
                password_hash,
                login_failed_count,
                last_failed_at,
                locked_until,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(auth.user_id.as_uuid())
        .bind(auth.password_hash.as_phc_string())
        .bind(auth.login_failed_count as i16)
        .bind(auth.last_failed_at)
        .bind(auth.locked_until)
        .bind(auth.created_at)
        .bind(auth.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Option<Auth>> {
        let row = sqlx::query_as::<_, AuthRow>(
            r#"
            SELECT
                user_id,
                password_hash,
                login_failed_count,
                last_failed_at,
                locked_until,
                created_at,
                updated_at
            FROM auth_credentials
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(AuthRow::into_auth).transpose()
    }

    async fn update(&self, auth: &Auth) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE auth_credentials SET
                password_hash = $2,
                login_failed_count = $3,
                last_failed_at = $4,
                locked_until = $5,
                updated_at = $6
            WHERE user_id = $1
            "#,
        )
        .bind(auth.user_id.as_uuid())
        .bind(auth.password_hash.as_phc_string())
        .bind(auth.login_failed_count as i16)
        .bind(auth.last_failed_at)
        .bind(auth.locked_until)
        .bind(auth.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Auth Session Repository Implementation
// ============================================================================

impl AuthSessionRepository for PgAuthRepository {
    async fn create(&self, session: &AuthSession) -> AuthResult<()> {
        let sql = format!(
            "INSERT INTO auth_sessions ({SESSION_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"
        );
        sqlx::query(&sql)
            .bind(session.session_id)
            .bind(session.user_id.as_uuid())
            .bind(session.public_id.as_str())
            .bind(session.user_role.id())
            .bind(session.expires_at_ms)
            .bind(session.remember_me)
            .bind(&session.client_fingerprint_hash)
            .bind(&session.client_ip)
            .bind(&session.user_agent)
            .bind(session.created_at)
            .bind(session.last_activity_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_by_id(
        &self,
        session_id: Uuid,
        fingerprint_hash: &[u8],
    ) -> AuthResult<Option<AuthSession>> {
        let now_ms = Utc::now().timestamp_millis();

        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM auth_sessions \
             WHERE session_id = $1 AND expires_at_ms > $2"
        );
        let row = sqlx::query_as::<_, AuthSessionRow>(&sql)
            .bind(session_id)
            .bind(now_ms)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) => {
                if r.client_fingerprint_hash != fingerprint_hash {
                    tracing::warn!(
                        session_id = %session_id,
                        "Auth session fingerprint mismatch"
                    );
                    return Err(AuthError::SessionFingerprintMismatch);
                }
                Ok(Some(r.into_session()?))
            }
            None => Ok(None),
        }
    }

    async fn update(&self, session: &AuthSession) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE auth_sessions SET
                expires_at_ms = $2,
                last_activity_at = $3
            WHERE session_id = $1
            "#,
        )
        .bind(session.session_id)
        .bind(session.expires_at_ms)
        .bind(session.last_activity_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, session_id: Uuid) -> AuthResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_all_for_user(&self, user_id: &UserId) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM auth_sessions WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        self.cleanup_expired().await
    }
}

// ============================================================================
// API Key Repository Implementation
// ============================================================================

impl ApiKeyRepository for PgAuthRepository {
    async fn create(&self, key: &ApiKey) -> AuthResult<()> {
        let sql = format!(
            "INSERT INTO api_keys ({API_KEY_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        );
        sqlx::query(&sql)
            .bind(key.id.as_uuid())
            .bind(key.owner.as_uuid())
            .bind(&key.name)
            .bind(key.key_prefix())
            .bind(&key.key_last_four)
            .bind(&key.key_hash)
            .bind(key.status.id())
            .bind(key.created_at)
            .bind(key.last_used_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: &ApiKeyId) -> AuthResult<Option<ApiKey>> {
        let sql = format!("SELECT {API_KEY_COLUMNS} FROM api_keys WHERE id = $1");
        let row = sqlx::query_as::<_, ApiKeyRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(ApiKeyRow::into_api_key).transpose()
    }

    async fn find_by_hash(&self, key_hash: &str) -> AuthResult<Option<ApiKey>> {
        let sql = format!("SELECT {API_KEY_COLUMNS} FROM api_keys WHERE key_hash = $1");
        let row = sqlx::query_as::<_, ApiKeyRow>(&sql)
            .bind(key_hash)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ApiKeyRow::into_api_key).transpose()
    }

    async fn list(&self) -> AuthResult<Vec<ApiKey>> {
        let sql = format!("SELECT {API_KEY_COLUMNS} FROM api_keys ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, ApiKeyRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ApiKeyRow::into_api_key).collect()
    }

    async fn update(&self, key: &ApiKey) -> AuthResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE api_keys SET
                name = $2,
                key_last_four = $3,
                key_hash = $4,
                status = $5
            WHERE id = $1
            "#,
        )
        .bind(key.id.as_uuid())
        .bind(&key.name)
        .bind(&key.key_last_four)
        .bind(&key.key_hash)
        .bind(key.status.id())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::ApiKeyNotFound);
        }
        Ok(())
    }

    async fn record_usage(&self, id: &ApiKeyId) -> AuthResult<()> {
        sqlx::query("UPDATE api_keys SET last_used_at = NOW() WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

fn parse_public_id(raw: &str) -> AuthResult<PublicId> {
    PublicId::parse_str(raw).map_err(|e| AuthError::Internal(format!("Invalid public_id: {}", e)))
}

fn parse_role(id: i16) -> AuthResult<UserRole> {
    UserRole::from_id(id).ok_or_else(|| AuthError::Internal(format!("Invalid user_role: {}", id)))
}

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    public_id: String,
    email: String,
    name: String,
    user_role: i16,
    user_status: i16,
    credits: i64,
    monthly_credit_limit: i64,
    plan_id: Option<String>,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            public_id: parse_public_id(&self.public_id)?,
            email: Email::from_db(self.email),
            name: self.name,
            user_role: parse_role(self.user_role)?,
            user_status: UserStatus::from_id(self.user_status).ok_or_else(|| {
                AuthError::Internal(format!("Invalid user_status: {}", self.user_status))
            })?,
            credits: self.credits,
            monthly_credit_limit: self.monthly_credit_limit,
            plan_id: self.plan_id,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AuthRow {
    user_id: Uuid,
    password_hash: String,
    login_failed_count: i16,
    last_failed_at: Option<DateTime<Utc>>,
    locked_until: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AuthRow {
    fn into_auth(self) -> AuthResult<Auth> {
        Ok(Auth {
            user_id: UserId::from_uuid(self.user_id),
            password_hash: UserPassword::from_phc_string(self.password_hash)
                .map_err(|e| AuthError::Internal(e.to_string()))?,
            login_failed_count: self.login_failed_count.max(0) as u16,
            last_failed_at: self.last_failed_at,
            locked_until: self.locked_until,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AuthSessionRow {
    session_id: Uuid,
    user_id: Uuid,
    public_id: String,
    user_role: i16,
    expires_at_ms: i64,
    remember_me: bool,
    client_fingerprint_hash: Vec<u8>,
    client_ip: Option<String>,
    user_agent: Option<String>,
    created_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
}

impl AuthSessionRow {
    fn into_session(self) -> AuthResult<AuthSession> {
        Ok(AuthSession {
            session_id: self.session_id,
            user_id: UserId::from_uuid(self.user_id),
            public_id: parse_public_id(&self.public_id)?,
            user_role: parse_role(self.user_role)?,
            expires_at_ms: self.expires_at_ms,
            remember_me: self.remember_me,
            client_fingerprint_hash: self.client_fingerprint_hash,
            client_ip: self.client_ip,
            user_agent: self.user_agent,
            created_at: self.created_at,
            last_activity_at: self.last_activity_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ApiKeyRow {
    id: Uuid,
    owner_id: Uuid,
    name: String,
    key_prefix: String,
    key_last_four: String,
    key_hash: String,
    status: i16,
    created_at: DateTime<Utc>,
    last_used_at: Option<DateTime<Utc>>,
}

impl ApiKeyRow {
    fn into_api_key(self) -> AuthResult<ApiKey> {
        Ok(ApiKey {
            id: ApiKeyId::from_uuid(self.id),
            owner: UserId::from_uuid(self.owner_id),
            name: self.name,
            environment: KeyEnvironment::from_prefix(&self.key_prefix).ok_or_else(|| {
                AuthError::Internal(format!("Invalid key_prefix: {}", self.key_prefix))
            })?,
            key_last_four: self.key_last_four,
            key_hash: self.key_hash,
            status: ApiKeyStatus::from_id(self.status)
                .ok_or_else(|| AuthError::Internal(format!("Invalid key status: {}", self.status)))?,
            created_at: self.created_at,
            last_used_at: self.last_used_at,
        })
    }
}
