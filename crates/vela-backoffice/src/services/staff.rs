//! # Staff Service
//!
//! Staff management. The schedule is an opaque JSON blob; this layer only
//! validates the name and passes the blob through.

use chrono::Utc;
use tracing::info;

use crate::auth::{require_admin_or_agent, AuthContext};
use crate::error::{ServiceError, ServiceResult};
use vela_core::validation::validate_name;
use vela_core::Staff;
use vela_store::{generate_id, Store};

/// Staff CRUD.
#[derive(Debug, Clone)]
pub struct StaffService {
    store: Store,
}

impl StaffService {
    /// Creates a new StaffService.
    pub fn new(store: Store) -> Self {
        StaffService { store }
    }

    /// Registers a staff member.
    pub async fn create(
        &self,
        ctx: &AuthContext,
        name: &str,
        schedule: serde_json::Value,
    ) -> ServiceResult<Staff> {
        require_admin_or_agent(ctx)?;
        validate_name(name)?;

        let now = Utc::now();
        let staff = Staff {
            id: generate_id("staff"),
            name: name.to_string(),
            schedule,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        self.store.staff().insert(&staff).await?;
        info!(staff_id = %staff.id, name = %staff.name, "Staff created");

        Ok(staff)
    }

    /// Fetches a staff member by id.
    pub async fn get(&self, ctx: &AuthContext, id: &str) -> ServiceResult<Staff> {
        require_admin_or_agent(ctx)?;

        self.store
            .staff()
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Staff", id))
    }

    /// Updates name and schedule.
    pub async fn update(
        &self,
        ctx: &AuthContext,
        id: &str,
        name: &str,
        schedule: serde_json::Value,
    ) -> ServiceResult<Staff> {
        require_admin_or_agent(ctx)?;
        validate_name(name)?;

        self.store.staff().update(id, name, &schedule).await?;
        self.get(ctx, id).await
    }

    /// Lists staff members, optionally active-only.
    pub async fn list(&self, ctx: &AuthContext, active_only: bool) -> ServiceResult<Vec<Staff>> {
        require_admin_or_agent(ctx)?;
        Ok(self.store.staff().list(active_only).await?)
    }

    /// Soft-deletes a staff member. New sales can no longer reference them;
    /// existing sales keep their snapshot.
    pub async fn deactivate(&self, ctx: &AuthContext, id: &str) -> ServiceResult<()> {
        require_admin_or_agent(ctx)?;
        self.store.staff().deactivate(id).await?;
        info!(staff_id = %id, "Staff deactivated");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
