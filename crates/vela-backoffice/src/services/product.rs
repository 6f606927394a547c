//! # Product Service
//!
//! Catalog management. Search is a plain text LIKE over name/description;
//! the original system reserved room for semantic search there and this
//! crate keeps it a deliberate stub.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;

use crate::auth::{require_admin_or_agent, AuthContext};
use crate::dto::{page_bounds, Page};
use crate::error::{ServiceError, ServiceResult};
use vela_core::validation::validate_name;
use vela_core::{Product, ValidationError};
use vela_store::{generate_id, Store};

/// Product CRUD, search, and listing.
#[derive(Debug, Clone)]
pub struct ProductService {
    store: Store,
}

impl ProductService {
    /// Creates a new ProductService.
    pub fn new(store: Store) -> Self {
        ProductService { store }
    }

    /// Adds a product to the catalog.
    pub async fn create(
        &self,
        ctx: &AuthContext,
        name: &str,
        description: Option<&str>,
        price: Decimal,
    ) -> ServiceResult<Product> {
        require_admin_or_agent(ctx)?;
        validate_name(name)?;
        validate_price(price)?;

        let now = Utc::now();
        let product = Product {
            id: generate_id("product"),
            name: name.to_string(),
            description: description.map(str::to_string),
            price,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        self.store.products().insert(&product).await?;
        info!(product_id = %product.id, name = %product.name, "Product created");

        Ok(product)
    }

    /// Fetches a product by id.
    pub async fn get(&self, ctx: &AuthContext, id: &str) -> ServiceResult<Product> {
        require_admin_or_agent(ctx)?;

        self.store
            .products()
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product", id))
    }

    /// Updates name, description, and price.
    ///
    /// Historical sales keep their snapshots; only future sales see the new
    /// values.
    pub async fn update(
        &self,
        ctx: &AuthContext,
        id: &str,
        name: &str,
        description: Option<&str>,
        price: Decimal,
    ) -> ServiceResult<Product> {
        require_admin_or_agent(ctx)?;
        validate_name(name)?;
        validate_price(price)?;

        self.store
            .products()
            .update(id, name, description, price)
            .await?;
        self.get(ctx, id).await
    }

    /// Text search over active products (name/description LIKE).
    pub async fn search(
        &self,
        ctx: &AuthContext,
        query: &str,
        limit: i64,
    ) -> ServiceResult<Vec<Product>> {
        require_admin_or_agent(ctx)?;
        Ok(self
            .store
            .products()
            .search(query, limit.clamp(1, 100))
            .await?)
    }

    /// Lists active products, newest first.
    pub async fn list(
        &self,
        ctx: &AuthContext,
        page: i64,
        page_size: i64,
    ) -> ServiceResult<Page<Product>> {
        require_admin_or_agent(ctx)?;

        let (page, page_size) = page_bounds(page, page_size);
        let offset = (page - 1) * page_size;

        let items = self.store.products().list(page_size, offset).await?;
        let total = self.store.products().count().await?;

        Ok(Page {
            items,
            total,
            page,
            page_size,
        })
    }

    /// Soft-deletes a product.
    pub async fn deactivate(&self, ctx: &AuthContext, id: &str) -> ServiceResult<()> {
        require_admin_or_agent(ctx)?;
        self.store.products().deactivate(id).await?;
        info!(product_id = %id, "Product deactivated");
        Ok(())
    }
}

fn validate_price(price: Decimal) -> Result<(), ValidationError> {
    if price <= Decimal::ZERO {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
