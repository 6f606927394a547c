//! # Token Repository
//!
//! Bearer-token lookup backing the pass/fail auth contract. Deliberately
//! minimal: the back office only needs "does this token exist, is it live,
//! and what role does it carry".

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::StoreResult;

/// A live token row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TokenRecord {
    pub access_token: String,
    /// Caller role: "admin", "agent", or "member".
    pub role: String,
    pub is_active: bool,
    pub expires_at: DateTime<Utc>,
}

/// Repository for auth-token lookup.
#[derive(Debug, Clone)]
pub struct TokenRepository {
    pool: SqlitePool,
}

impl TokenRepository {
    /// Creates a new TokenRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TokenRepository { pool }
    }

    /// Looks up a token, returning it only if active and unexpired.
    pub async fn lookup(&self, access_token: &str) -> StoreResult<Option<TokenRecord>> {
        let now = Utc::now();

        let record: Option<TokenRecord> = sqlx::query_as(
            r#"
            SELECT access_token, role, is_active, expires_at
            FROM tokens
            WHERE access_token = ?1 AND is_active = 1 AND expires_at > ?2
            "#,
        )
        .bind(access_token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Inserts a token (test fixtures and provisioning tooling).
    pub async fn insert(&self, record: &TokenRecord) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO tokens (access_token, role, is_active, expires_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&record.access_token)
        .bind(&record.role)
        .bind(record.is_active)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
