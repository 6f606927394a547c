//! # Notification Target Service
//!
//! Management surface for the webhook and signal registries, plus the
//! operator "test this target" probe that POSTs a synthetic sale payload.

use chrono::Utc;
use tracing::info;

use crate::auth::{require_admin_or_agent, AuthContext};
use crate::dispatcher::{NotificationDispatcher, TargetTestOutcome};
use crate::error::{ServiceError, ServiceResult};
use std::sync::Arc;
use vela_core::validation::{validate_name, validate_target_url};
use vela_core::{NotificationTarget, TargetAuth, TargetKind};
use vela_store::{generate_id, Store};

/// Webhook/signal registry CRUD and the test probe.
#[derive(Debug, Clone)]
pub struct TargetService {
    store: Store,
    dispatcher: Arc<NotificationDispatcher>,
}

impl TargetService {
    /// Creates a new TargetService.
    pub fn new(store: Store, dispatcher: Arc<NotificationDispatcher>) -> Self {
        TargetService { store, dispatcher }
    }

    /// Registers a notification target in the registry picked by `kind`.
    pub async fn create(
        &self,
        ctx: &AuthContext,
        kind: TargetKind,
        name: &str,
        url: &str,
        auth: TargetAuth,
    ) -> ServiceResult<NotificationTarget> {
        require_admin_or_agent(ctx)?;
        validate_name(name)?;
        validate_target_url(url)?;

        let repo = self.store.targets(kind);
        let now = Utc::now();
        let target = NotificationTarget {
            id: generate_id(repo.id_prefix()),
            kind,
            name: name.to_string(),
            url: url.to_string(),
            is_active: true,
            auth,
            created_at: now,
            updated_at: now,
        };

        repo.insert(&target).await?;
        info!(kind = kind.label(), id = %target.id, url = %target.url, "Target registered");

        Ok(target)
    }

    /// Fetches a target by id.
    pub async fn get(
        &self,
        ctx: &AuthContext,
        kind: TargetKind,
        id: &str,
    ) -> ServiceResult<NotificationTarget> {
        require_admin_or_agent(ctx)?;

        self.store
            .targets(kind)
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(kind.label(), id))
    }

    /// Updates name, url, active flag, and auth config.
    pub async fn update(
        &self,
        ctx: &AuthContext,
        kind: TargetKind,
        id: &str,
        name: &str,
        url: &str,
        is_active: bool,
        auth: TargetAuth,
    ) -> ServiceResult<NotificationTarget> {
        require_admin_or_agent(ctx)?;
        validate_name(name)?;
        validate_target_url(url)?;

        self.store
            .targets(kind)
            .update(id, name, url, is_active, &auth)
            .await?;
        self.get(ctx, kind, id).await
    }

    /// Removes a target for good (hard delete; targets carry no history).
    pub async fn delete(
        &self,
        ctx: &AuthContext,
        kind: TargetKind,
        id: &str,
    ) -> ServiceResult<()> {
        require_admin_or_agent(ctx)?;
        self.store.targets(kind).delete(id).await?;
        info!(kind = kind.label(), id = %id, "Target deleted");
        Ok(())
    }

    /// Lists all targets of one kind.
    pub async fn list(
        &self,
        ctx: &AuthContext,
        kind: TargetKind,
    ) -> ServiceResult<Vec<NotificationTarget>> {
        require_admin_or_agent(ctx)?;
        Ok(self.store.targets(kind).list().await?)
    }

    /// Operator probe: POSTs a synthetic sale payload at the target and
    /// reports status/body/error back instead of logging.
    pub async fn test(
        &self,
        ctx: &AuthContext,
        kind: TargetKind,
        id: &str,
    ) -> ServiceResult<TargetTestOutcome> {
        require_admin_or_agent(ctx)?;

        let target = self
            .store
            .targets(kind)
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(kind.label(), id))?;

        Ok(self.dispatcher.test_target(&target).await)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
