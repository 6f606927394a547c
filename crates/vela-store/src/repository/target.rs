//! # Notification Target Repository
//!
//! One repository type serving two tables: `webhooks` and `signals`. They
//! have identical shapes and identical dispatch semantics; the kind picks
//! the table and the id prefix.
//!
//! The `auth_config` column is a JSON blob in the original wire format
//! (`{"type": "bearer", "token": "…"}`); an empty or malformed blob degrades
//! to no authentication rather than poisoning dispatch for every target.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use vela_core::{NotificationTarget, TargetAuth, TargetKind};

#[derive(sqlx::FromRow)]
struct TargetRow {
    id: String,
    name: String,
    url: String,
    is_active: bool,
    auth_config: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TargetRow {
    fn into_target(self, kind: TargetKind) -> NotificationTarget {
        let auth = parse_auth_config(&self.auth_config, &self.id);

        NotificationTarget {
            id: self.id,
            kind,
            name: self.name,
            url: self.url,
            is_active: self.is_active,
            auth,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Parses an auth_config blob, degrading to `None` on empty/corrupt input.
fn parse_auth_config(raw: &str, target_id: &str) -> TargetAuth {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "{}" {
        return TargetAuth::None;
    }

    match serde_json::from_str(trimmed) {
        Ok(auth) => auth,
        Err(err) => {
            warn!(target_id = %target_id, error = %err, "Unreadable auth_config, dispatching unauthenticated");
            TargetAuth::None
        }
    }
}

const SELECT_COLUMNS: &str = "id, name, url, is_active, auth_config, created_at, updated_at";

/// Repository for webhook/signal registries.
#[derive(Debug, Clone)]
pub struct TargetRepository {
    pool: SqlitePool,
    kind: TargetKind,
}

impl TargetRepository {
    /// Creates a repository over the table selected by `kind`.
    pub fn new(pool: SqlitePool, kind: TargetKind) -> Self {
        TargetRepository { pool, kind }
    }

    /// The table backing this repository.
    fn table(&self) -> &'static str {
        match self.kind {
            TargetKind::Webhook => "webhooks",
            TargetKind::Signal => "signals",
        }
    }

    /// The id prefix for new rows (`webhook_…` / `signal_…`).
    pub fn id_prefix(&self) -> &'static str {
        match self.kind {
            TargetKind::Webhook => "webhook",
            TargetKind::Signal => "signal",
        }
    }

    /// Gets a target by ID.
    pub async fn get(&self, id: &str) -> StoreResult<Option<NotificationTarget>> {
        let row: Option<TargetRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM {} WHERE id = ?1",
            self.table()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_target(self.kind)))
    }

    /// Inserts a new target.
    pub async fn insert(&self, target: &NotificationTarget) -> StoreResult<()> {
        debug!(id = %target.id, url = %target.url, "Registering notification target");

        sqlx::query(&format!(
            r#"
            INSERT INTO {} (id, name, url, is_active, auth_config, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            self.table()
        ))
        .bind(&target.id)
        .bind(&target.name)
        .bind(&target.url)
        .bind(target.is_active)
        .bind(serde_json::to_string(&target.auth)?)
        .bind(target.created_at)
        .bind(target.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates a target's name, url, active flag, and auth config.
    pub async fn update(
        &self,
        id: &str,
        name: &str,
        url: &str,
        is_active: bool,
        auth: &TargetAuth,
    ) -> StoreResult<()> {
        let now = Utc::now();

        let result = sqlx::query(&format!(
            r#"
            UPDATE {} SET name = ?2, url = ?3, is_active = ?4, auth_config = ?5, updated_at = ?6
            WHERE id = ?1
            "#,
            self.table()
        ))
        .bind(id)
        .bind(name)
        .bind(url)
        .bind(is_active)
        .bind(serde_json::to_string(auth)?)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(self.kind.label(), id));
        }

        Ok(())
    }

    /// Hard-deletes a target (matches the original system's behavior;
    /// targets carry no history worth keeping).
    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?1", self.table()))
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(self.kind.label(), id));
        }

        Ok(())
    }

    /// Lists all targets, newest first.
    pub async fn list(&self) -> StoreResult<Vec<NotificationTarget>> {
        let rows: Vec<TargetRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM {} ORDER BY created_at DESC",
            self.table()
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_target(self.kind)).collect())
    }

    /// Lists only active targets - the set the dispatcher loads.
    pub async fn list_active(&self) -> StoreResult<Vec<NotificationTarget>> {
        let rows: Vec<TargetRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM {} WHERE is_active = 1 ORDER BY created_at",
            self.table()
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_target(self.kind)).collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{DbConfig, Store};

    fn target(id: &str, kind: TargetKind, auth: TargetAuth) -> NotificationTarget {
        let now = Utc::now();
        NotificationTarget {
            id: id.to_string(),
            kind,
            name: "Inventory bridge".to_string(),
            url: "https://example.com/hooks/sales".to_string(),
            is_active: true,
            auth,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_empty_auth_config_is_none() {
        assert_eq!(parse_auth_config("", "webhook_x"), TargetAuth::None);
        assert_eq!(parse_auth_config("{}", "webhook_x"), TargetAuth::None);
        assert_eq!(parse_auth_config("  ", "webhook_x"), TargetAuth::None);
    }

    #[test]
    fn test_corrupt_auth_config_degrades_to_none() {
        assert_eq!(parse_auth_config("{not json", "webhook_x"), TargetAuth::None);
        assert_eq!(
            parse_auth_config(r#"{"type": "carrier_pigeon"}"#, "webhook_x"),
            TargetAuth::None
        );
    }

    #[tokio::test]
    async fn test_auth_round_trips_through_blob() {
        let store = Store::new(DbConfig::in_memory()).await.unwrap();
        let repo = store.webhooks();

        repo.insert(&target(
            "webhook_0000000001",
            TargetKind::Webhook,
            TargetAuth::Bearer {
                token: "secret".to_string(),
            },
        ))
        .await
        .unwrap();

        let found = repo.get("webhook_0000000001").await.unwrap().unwrap();
        assert_eq!(
            found.auth,
            TargetAuth::Bearer {
                token: "secret".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_registries_are_independent() {
        let store = Store::new(DbConfig::in_memory()).await.unwrap();

        store
            .webhooks()
            .insert(&target(
                "webhook_0000000001",
                TargetKind::Webhook,
                TargetAuth::None,
            ))
            .await
            .unwrap();
        store
            .signals()
            .insert(&target(
                "signal_0000000001",
                TargetKind::Signal,
                TargetAuth::None,
            ))
            .await
            .unwrap();

        assert!(store.signals().get("webhook_0000000001").await.unwrap().is_none());
        assert_eq!(store.webhooks().list().await.unwrap().len(), 1);
        assert_eq!(store.signals().list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_active_excludes_disabled() {
        let store = Store::new(DbConfig::in_memory()).await.unwrap();
        let repo = store.webhooks();

        repo.insert(&target(
            "webhook_0000000001",
            TargetKind::Webhook,
            TargetAuth::None,
        ))
        .await
        .unwrap();

        let mut disabled = target("webhook_0000000002", TargetKind::Webhook, TargetAuth::None);
        disabled.is_active = false;
        repo.insert(&disabled).await.unwrap();

        let active = repo.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "webhook_0000000001");
    }

    #[tokio::test]
    async fn test_delete_is_hard() {
        let store = Store::new(DbConfig::in_memory()).await.unwrap();
        let repo = store.signals();

        repo.insert(&target(
            "signal_0000000001",
            TargetKind::Signal,
            TargetAuth::None,
        ))
        .await
        .unwrap();

        repo.delete("signal_0000000001").await.unwrap();
        assert!(repo.get("signal_0000000001").await.unwrap().is_none());

        let err = repo.delete("signal_0000000001").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
