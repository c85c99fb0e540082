//! Integration test harness for woosync.
//!
//! The engine's two seams — the remote catalog and the local store — get
//! controllable in-process stand-ins here:
//!
//! - [`ScriptedCatalog`] serves fixed JSON pages per collection and can be
//!   told to fail a given page, for exercising pass-level aborts.
//! - [`FailingStore`] wraps the in-memory store and rejects the creation of
//!   one chosen order reference, for exercising per-item isolation.
//!
//! Tests drive a real [`woosync_engine::SyncOrchestrator`] end to end; no
//! network or database is involved.
//!
//! Run with: `cargo test -p woosync-integration-tests`

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde_json::Value;
use url::Url;

use woosync_core::{
    Country, CountryId, CountryState, Currency, NewOrder, NewPartner, NewProduct, Order, OrderId,
    OrderRef, Parsed, Partner, PartnerId, Product, ProductId, RemoteCustomer, RemoteOrder,
    RemoteProduct, parse_record,
};
use woosync_engine::config::SyncConfig;
use woosync_engine::error::SyncError;
use woosync_engine::store::{LocalStore, MemoryStore, StoreError};
use woosync_engine::woo::{PageRequest, RemoteCatalog, Resource};

/// Engine configuration pointed at nothing; the scripted catalog never
/// dials out.
#[must_use]
pub fn test_config(page_size: u32) -> SyncConfig {
    SyncConfig {
        store_url: Url::parse("https://shop.example.com").expect("static url"),
        store_id: "shop".to_string(),
        consumer_key: "ck_test".to_string(),
        consumer_secret: SecretString::from("cs_test"),
        api_version: "wc/v3".to_string(),
        page_size,
        request_timeout: Duration::from_secs(5),
        pass_timeout: Duration::from_secs(60),
        max_records: None,
        sync_orders: true,
        sync_customers: true,
        sync_products: true,
    }
}

// ============================================================================
// Scripted remote catalog
// ============================================================================

/// Remote catalog that serves pre-scripted JSON pages.
#[derive(Default)]
pub struct ScriptedCatalog {
    orders: Vec<Vec<Value>>,
    customers: Vec<Vec<Value>>,
    products: Vec<Vec<Value>>,
    fail_orders_on_page: Option<u32>,
}

impl ScriptedCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve these orders as a single page.
    #[must_use]
    pub fn with_orders(mut self, records: Vec<Value>) -> Self {
        self.orders = vec![records];
        self
    }

    /// Serve these order pages in sequence.
    #[must_use]
    pub fn with_order_pages(mut self, pages: Vec<Vec<Value>>) -> Self {
        self.orders = pages;
        self
    }

    #[must_use]
    pub fn with_customers(mut self, records: Vec<Value>) -> Self {
        self.customers = vec![records];
        self
    }

    #[must_use]
    pub fn with_products(mut self, records: Vec<Value>) -> Self {
        self.products = vec![records];
        self
    }

    /// Fail order fetches for the given 1-based page with a remote 500.
    #[must_use]
    pub const fn failing_orders_on_page(mut self, page: u32) -> Self {
        self.fail_orders_on_page = Some(page);
        self
    }

    fn page_for<T: serde::de::DeserializeOwned>(
        pages: &[Vec<Value>],
        resource: Resource,
        page: &PageRequest,
    ) -> Vec<Parsed<T>> {
        pages
            .get((page.page - 1) as usize)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|value| parse_record(resource.path(), value))
            .collect()
    }
}

#[async_trait]
impl RemoteCatalog for ScriptedCatalog {
    async fn fetch_orders(
        &self,
        page: &PageRequest,
    ) -> Result<Vec<Parsed<RemoteOrder>>, SyncError> {
        if self.fail_orders_on_page == Some(page.page) {
            return Err(SyncError::RemoteApi {
                status_code: 500,
                body: "injected remote failure".to_string(),
            });
        }
        Ok(Self::page_for(&self.orders, Resource::Orders, page))
    }

    async fn fetch_customers(
        &self,
        page: &PageRequest,
    ) -> Result<Vec<Parsed<RemoteCustomer>>, SyncError> {
        Ok(Self::page_for(&self.customers, Resource::Customers, page))
    }

    async fn fetch_products(
        &self,
        page: &PageRequest,
    ) -> Result<Vec<Parsed<RemoteProduct>>, SyncError> {
        Ok(Self::page_for(&self.products, Resource::Products, page))
    }
}

// ============================================================================
// Failure-injecting local store
// ============================================================================

/// Local store that rejects the creation of one chosen order reference and
/// delegates everything else to an in-memory store.
pub struct FailingStore {
    inner: MemoryStore,
    fail_reference: String,
}

impl FailingStore {
    #[must_use]
    pub fn rejecting_order(fail_reference: &str) -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_reference: fail_reference.to_string(),
        }
    }

    /// The wrapped store, for seeding and inspection.
    #[must_use]
    pub const fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

#[async_trait]
impl LocalStore for FailingStore {
    async fn find_partner_by_email(&self, email: &str) -> Result<Option<Partner>, StoreError> {
        self.inner.find_partner_by_email(email).await
    }

    async fn create_partner(&self, partner: NewPartner) -> Result<PartnerId, StoreError> {
        self.inner.create_partner(partner).await
    }

    async fn update_partner(&self, id: PartnerId, partner: NewPartner) -> Result<(), StoreError> {
        self.inner.update_partner(id, partner).await
    }

    async fn find_product_by_sku(&self, sku: &str) -> Result<Option<Product>, StoreError> {
        self.inner.find_product_by_sku(sku).await
    }

    async fn find_product_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
        self.inner.find_product_by_name(name).await
    }

    async fn create_product(&self, product: NewProduct) -> Result<ProductId, StoreError> {
        self.inner.create_product(product).await
    }

    async fn update_product(&self, id: ProductId, product: NewProduct) -> Result<(), StoreError> {
        self.inner.update_product(id, product).await
    }

    async fn find_order_by_reference(
        &self,
        reference: &OrderRef,
    ) -> Result<Option<OrderId>, StoreError> {
        self.inner.find_order_by_reference(reference).await
    }

    async fn create_order(&self, order: NewOrder) -> Result<OrderId, StoreError> {
        if order.reference.as_str() == self.fail_reference {
            return Err(StoreError::Backend("injected storage failure".to_string()));
        }
        self.inner.create_order(order).await
    }

    async fn get_order(&self, id: OrderId) -> Result<Order, StoreError> {
        self.inner.get_order(id).await
    }

    async fn find_country_by_code(&self, code: &str) -> Result<Option<Country>, StoreError> {
        self.inner.find_country_by_code(code).await
    }

    async fn find_state(
        &self,
        country_id: CountryId,
        code: &str,
    ) -> Result<Option<CountryState>, StoreError> {
        self.inner.find_state(country_id, code).await
    }

    async fn find_currency_by_code(&self, code: &str) -> Result<Option<Currency>, StoreError> {
        self.inner.find_currency_by_code(code).await
    }

    async fn try_acquire_sync_lock(&self, store_id: &str) -> Result<bool, StoreError> {
        self.inner.try_acquire_sync_lock(store_id).await
    }

    async fn release_sync_lock(&self, store_id: &str) -> Result<(), StoreError> {
        self.inner.release_sync_lock(store_id).await
    }

    async fn record_last_sync(
        &self,
        store_id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.inner.record_last_sync(store_id, at).await
    }

    async fn last_sync(&self, store_id: &str) -> Result<Option<DateTime<Utc>>, StoreError> {
        self.inner.last_sync(store_id).await
    }
}
