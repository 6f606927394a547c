//! # Staff Repository
//!
//! Database operations for staff members. The schedule column is an opaque
//! JSON blob - parsed at this boundary, never interpreted.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use vela_core::Staff;

#[derive(sqlx::FromRow)]
struct StaffRow {
    id: String,
    name: String,
    schedule: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StaffRow {
    fn into_staff(self) -> StoreResult<Staff> {
        // Legacy rows may hold an empty string; treat it as an empty object.
        let schedule = if self.schedule.trim().is_empty() {
            serde_json::json!({})
        } else {
            serde_json::from_str(&self.schedule)?
        };

        Ok(Staff {
            id: self.id,
            name: self.name,
            schedule,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_COLUMNS: &str = "id, name, schedule, is_active, created_at, updated_at";

/// Repository for staff database operations.
#[derive(Debug, Clone)]
pub struct StaffRepository {
    pool: SqlitePool,
}

impl StaffRepository {
    /// Creates a new StaffRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StaffRepository { pool }
    }

    /// Gets a staff member by ID.
    pub async fn get(&self, id: &str) -> StoreResult<Option<Staff>> {
        let row: Option<StaffRow> =
            sqlx::query_as(&format!("SELECT {SELECT_COLUMNS} FROM staff WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(StaffRow::into_staff).transpose()
    }

    /// Inserts a new staff member.
    pub async fn insert(&self, staff: &Staff) -> StoreResult<()> {
        debug!(id = %staff.id, name = %staff.name, "Inserting staff");

        sqlx::query(
            r#"
            INSERT INTO staff (id, name, schedule, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&staff.id)
        .bind(&staff.name)
        .bind(serde_json::to_string(&staff.schedule)?)
        .bind(staff.is_active)
        .bind(staff.created_at)
        .bind(staff.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates a staff member's name and schedule.
    pub async fn update(
        &self,
        id: &str,
        name: &str,
        schedule: &serde_json::Value,
    ) -> StoreResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE staff SET name = ?2, schedule = ?3, updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(serde_json::to_string(schedule)?)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Staff", id));
        }

        Ok(())
    }

    /// Lists staff members, optionally restricted to active ones.
    pub async fn list(&self, active_only: bool) -> StoreResult<Vec<Staff>> {
        let rows: Vec<StaffRow> = if active_only {
            sqlx::query_as(&format!(
                "SELECT {SELECT_COLUMNS} FROM staff WHERE is_active = 1 ORDER BY name"
            ))
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as(&format!(
                "SELECT {SELECT_COLUMNS} FROM staff ORDER BY name"
            ))
            .fetch_all(&self.pool)
            .await?
        };

        rows.into_iter().map(StaffRow::into_staff).collect()
    }

    /// Soft-deletes a staff member.
    ///
    /// Inactive staff can no longer be referenced by new sales; historical
    /// sales keep their reference.
    pub async fn deactivate(&self, id: &str) -> StoreResult<()> {
        let now = Utc::now();

        let result = sqlx::query("UPDATE staff SET is_active = 0, updated_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(now)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Staff", id));
        }

        Ok(())
    }
}
