//! # Customer Service
//!
//! Customer management. Creation is idempotent on phone: registering a
//! phone that already exists returns the existing customer instead of
//! failing, which is what the counter flow needs when a regular walks in.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;

use crate::auth::{require_admin_or_agent, AuthContext};
use crate::dto::{page_bounds, Page};
use crate::error::{ServiceError, ServiceResult};
use vela_core::validation::{validate_name, validate_phone};
use vela_core::Customer;
use vela_store::{generate_id, Store};

/// Customer CRUD and search.
#[derive(Debug, Clone)]
pub struct CustomerService {
    store: Store,
}

impl CustomerService {
    /// Creates a new CustomerService.
    pub fn new(store: Store) -> Self {
        CustomerService { store }
    }

    /// Creates a customer, or returns the existing one for that phone.
    pub async fn create(
        &self,
        ctx: &AuthContext,
        phone: &str,
        name: Option<&str>,
    ) -> ServiceResult<Customer> {
        require_admin_or_agent(ctx)?;
        validate_phone(phone)?;
        if let Some(name) = name {
            validate_name(name)?;
        }

        if let Some(existing) = self.store.customers().get_by_phone(phone).await? {
            info!(customer_id = %existing.id, "Phone already registered, returning existing customer");
            return Ok(existing);
        }

        let now = Utc::now();
        let customer = Customer {
            id: generate_id("customer"),
            phone: phone.to_string(),
            name: name.map(str::to_string),
            loyalty_points: Decimal::ZERO,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        self.store.customers().insert(&customer).await?;
        info!(customer_id = %customer.id, "Customer created");

        Ok(customer)
    }

    /// Fetches a customer by id.
    pub async fn get(&self, ctx: &AuthContext, id: &str) -> ServiceResult<Customer> {
        require_admin_or_agent(ctx)?;

        self.store
            .customers()
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Customer", id))
    }

    /// Updates profile fields (phone, name).
    pub async fn update(
        &self,
        ctx: &AuthContext,
        id: &str,
        phone: &str,
        name: Option<&str>,
    ) -> ServiceResult<Customer> {
        require_admin_or_agent(ctx)?;
        validate_phone(phone)?;
        if let Some(name) = name {
            validate_name(name)?;
        }

        self.store.customers().update_profile(id, phone, name).await?;
        self.get(ctx, id).await
    }

    /// Overwrites the loyalty balance (operator wallet adjustment).
    ///
    /// The sale path never calls this; points from sales accrue inside the
    /// sale transaction.
    pub async fn set_wallet(
        &self,
        ctx: &AuthContext,
        id: &str,
        points: Decimal,
    ) -> ServiceResult<Customer> {
        require_admin_or_agent(ctx)?;

        if points < Decimal::ZERO {
            return Err(ServiceError::Validation(
                vela_core::ValidationError::MustBePositive {
                    field: "loyalty_points".to_string(),
                },
            ));
        }

        self.store.customers().set_loyalty_points(id, points).await?;
        info!(customer_id = %id, points = %points, "Wallet adjusted");
        self.get(ctx, id).await
    }

    /// Searches active customers by phone substring.
    pub async fn search_by_phone(
        &self,
        ctx: &AuthContext,
        fragment: &str,
        limit: i64,
    ) -> ServiceResult<Vec<Customer>> {
        require_admin_or_agent(ctx)?;
        Ok(self
            .store
            .customers()
            .search_by_phone(fragment, limit.clamp(1, 100))
            .await?)
    }

    /// Lists active customers, newest first.
    pub async fn list(
        &self,
        ctx: &AuthContext,
        page: i64,
        page_size: i64,
    ) -> ServiceResult<Page<Customer>> {
        require_admin_or_agent(ctx)?;

        let (page, page_size) = page_bounds(page, page_size);
        let offset = (page - 1) * page_size;

        let items = self.store.customers().list(page_size, offset).await?;
        let total = self.store.customers().count().await?;

        Ok(Page {
            items,
            total,
            page,
            page_size,
        })
    }

    /// Soft-deletes a customer.
    pub async fn deactivate(&self, ctx: &AuthContext, id: &str) -> ServiceResult<()> {
        require_admin_or_agent(ctx)?;
        self.store.customers().deactivate(id).await?;
        info!(customer_id = %id, "Customer deactivated");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CallerRole;
    use rust_decimal_macros::dec;
    use vela_store::DbConfig;

    async fn service() -> CustomerService {
        CustomerService::new(Store::new(DbConfig::in_memory()).await.unwrap())
    }

    fn admin() -> AuthContext {
        AuthContext::with_role(CallerRole::Admin)
    }

    #[tokio::test]
    async fn test_create_is_idempotent_on_phone() {
        let svc = service().await;

        let first = svc
            .create(&admin(), "5551234567", Some("Ana"))
            .await
            .unwrap();
        let second = svc
            .create(&admin(), "5551234567", Some("Ana Maria"))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        // The existing record wins; the second name is ignored.
        assert_eq!(second.name.as_deref(), Some("Ana"));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_phone() {
        let svc = service().await;
        let err = svc.create(&admin(), "  ", None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_wallet_adjustment() {
        let svc = service().await;
        let customer = svc.create(&admin(), "5551234567", None).await.unwrap();

        let updated = svc
            .set_wallet(&admin(), &customer.id, dec!(125.50))
            .await
            .unwrap();
        assert_eq!(updated.loyalty_points, dec!(125.50));

        let err = svc
            .set_wallet(&admin(), &customer.id, dec!(-1.00))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_list_skips_deactivated() {
        let svc = service().await;
        let keep = svc.create(&admin(), "5551111111", None).await.unwrap();
        let drop = svc.create(&admin(), "5552222222", None).await.unwrap();
        svc.deactivate(&admin(), &drop.id).await.unwrap();

        let page = svc.list(&admin(), 1, 10).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, keep.id);
    }

    #[tokio::test]
    async fn test_member_cannot_create() {
        let svc = service().await;
        let member = AuthContext::with_role(CallerRole::Member);
        let err = svc.create(&member, "5551234567", None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden));
    }
}
