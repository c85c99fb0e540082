//! Local persistence contract.
//!
//! The ERP is an external collaborator: the engine depends on this CRUD
//! surface only, never on a specific storage backend. Implementations must
//! provide search-by-field-equality, create/update, an atomic
//! check-and-set sync lock per store, and a last-sync stamp.
//!
//! [`MemoryStore`] is the reference implementation, used by the test suites
//! and by dry runs.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use woosync_core::{
    Country, CountryId, CountryState, Currency, NewOrder, NewPartner, NewProduct, Order, OrderId,
    OrderRef, Partner, PartnerId, Product, ProductId,
};

/// Local persistence failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A referenced record does not exist.
    #[error("{entity} not found: {key}")]
    NotFound {
        entity: &'static str,
        key: String,
    },

    /// A uniqueness constraint was violated.
    #[error("constraint violation on {entity}: {key}")]
    Conflict {
        entity: &'static str,
        key: String,
    },

    /// The storage backend itself failed (connection loss, poisoned state).
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// CRUD surface over the ERP records the engine reconciles.
///
/// All lookups are exact-equality searches on the given key. `create_order`
/// persists the order and its lines in one local transaction: either
/// everything lands or nothing does.
#[async_trait]
pub trait LocalStore: Send + Sync {
    // -------------------------------------------------------------------------
    // Partners
    // -------------------------------------------------------------------------

    /// Find a partner by normalized (lower-cased, trimmed) email.
    async fn find_partner_by_email(&self, email: &str) -> Result<Option<Partner>, StoreError>;

    async fn create_partner(&self, partner: NewPartner) -> Result<PartnerId, StoreError>;

    async fn update_partner(&self, id: PartnerId, partner: NewPartner) -> Result<(), StoreError>;

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    /// Find a product by exact SKU.
    async fn find_product_by_sku(&self, sku: &str) -> Result<Option<Product>, StoreError>;

    /// Find a product by exact name. Only used as the SKU-less fallback.
    async fn find_product_by_name(&self, name: &str) -> Result<Option<Product>, StoreError>;

    async fn create_product(&self, product: NewProduct) -> Result<ProductId, StoreError>;

    async fn update_product(&self, id: ProductId, product: NewProduct) -> Result<(), StoreError>;

    // -------------------------------------------------------------------------
    // Orders
    // -------------------------------------------------------------------------

    /// Find an order by its synthesized natural key.
    async fn find_order_by_reference(
        &self,
        reference: &OrderRef,
    ) -> Result<Option<OrderId>, StoreError>;

    /// Persist an order with its lines atomically.
    async fn create_order(&self, order: NewOrder) -> Result<OrderId, StoreError>;

    /// Read an order back (test and inspection surface).
    async fn get_order(&self, id: OrderId) -> Result<Order, StoreError>;

    // -------------------------------------------------------------------------
    // Reference data (read-only to the engine)
    // -------------------------------------------------------------------------

    /// Find a country by ISO code; the caller passes the code upper-cased.
    async fn find_country_by_code(&self, code: &str) -> Result<Option<Country>, StoreError>;

    /// Find a state by (code, country) pair.
    async fn find_state(
        &self,
        country_id: CountryId,
        code: &str,
    ) -> Result<Option<CountryState>, StoreError>;

    /// Find a currency by ISO 4217 code.
    async fn find_currency_by_code(&self, code: &str) -> Result<Option<Currency>, StoreError>;

    // -------------------------------------------------------------------------
    // Pass coordination
    // -------------------------------------------------------------------------

    /// Atomically acquire the per-store sync lock. Returns `false` when a
    /// pass already holds it.
    async fn try_acquire_sync_lock(&self, store_id: &str) -> Result<bool, StoreError>;

    /// Release the per-store sync lock. Releasing an unheld lock is a no-op.
    async fn release_sync_lock(&self, store_id: &str) -> Result<(), StoreError>;

    /// Record the completion time of the last successful pass.
    async fn record_last_sync(
        &self,
        store_id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Completion time of the last successful pass, if any.
    async fn last_sync(&self, store_id: &str) -> Result<Option<DateTime<Utc>>, StoreError>;
}
