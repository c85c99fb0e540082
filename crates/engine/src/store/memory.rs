//! In-memory reference implementation of [`LocalStore`].

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use woosync_core::{
    Country, CountryId, CountryState, Currency, CurrencyId, NewOrder, NewPartner, NewProduct,
    Order, OrderId, OrderLine, OrderRef, Partner, PartnerId, Product, ProductId, StateId,
};

use super::{LocalStore, StoreError};

#[derive(Default)]
struct Inner {
    partners: HashMap<i64, Partner>,
    products: HashMap<i64, Product>,
    orders: HashMap<String, Order>,
    countries: Vec<Country>,
    states: Vec<CountryState>,
    currencies: Vec<Currency>,
    locks: HashSet<String>,
    last_sync: HashMap<String, DateTime<Utc>>,
    next_id: i64,
}

impl Inner {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory [`LocalStore`].
///
/// Backs the test suites and dry runs. Reference data (countries, states,
/// currencies) is seeded through the builder methods since the engine never
/// creates it.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a country and return its id.
    pub fn seed_country(&self, code: &str) -> CountryId {
        let mut inner = self.lock_unpoisoned();
        let id = CountryId::new(inner.allocate_id());
        inner.countries.push(Country {
            id,
            code: code.to_uppercase(),
        });
        id
    }

    /// Seed a state under a country and return its id.
    pub fn seed_state(&self, country_id: CountryId, code: &str) -> StateId {
        let mut inner = self.lock_unpoisoned();
        let id = StateId::new(inner.allocate_id());
        inner.states.push(CountryState {
            id,
            country_id,
            code: code.to_uppercase(),
        });
        id
    }

    /// Seed a currency and return its id.
    pub fn seed_currency(&self, code: &str) -> CurrencyId {
        let mut inner = self.lock_unpoisoned();
        let id = CurrencyId::new(inner.allocate_id());
        inner.currencies.push(Currency {
            id,
            code: code.to_uppercase(),
        });
        id
    }

    /// Snapshot of all persisted orders (inspection surface for tests).
    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        let inner = self.lock_unpoisoned();
        inner.orders.values().cloned().collect()
    }

    /// Snapshot of all persisted partners.
    #[must_use]
    pub fn partners(&self) -> Vec<Partner> {
        let inner = self.lock_unpoisoned();
        inner.partners.values().cloned().collect()
    }

    /// Snapshot of all persisted products.
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        let inner = self.lock_unpoisoned();
        inner.products.values().cloned().collect()
    }

    /// Whether the sync lock is currently held for a store.
    #[must_use]
    pub fn is_locked(&self, store_id: &str) -> bool {
        self.lock_unpoisoned().locks.contains(store_id)
    }

    fn lock_unpoisoned(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl LocalStore for MemoryStore {
    async fn find_partner_by_email(&self, email: &str) -> Result<Option<Partner>, StoreError> {
        let inner = self.lock_unpoisoned();
        Ok(inner
            .partners
            .values()
            .find(|p| p.email.as_deref() == Some(email))
            .cloned())
    }

    async fn create_partner(&self, partner: NewPartner) -> Result<PartnerId, StoreError> {
        let mut inner = self.lock_unpoisoned();
        let id = PartnerId::new(inner.allocate_id());
        inner.partners.insert(
            id.as_i64(),
            Partner {
                id,
                name: partner.name,
                email: partner.email.map(|e| e.trim().to_lowercase()),
                phone: partner.phone,
                street: partner.street,
                street2: partner.street2,
                city: partner.city,
                zip: partner.zip,
                country_id: partner.country_id,
                state_id: partner.state_id,
                kind: partner.kind,
                parent_id: partner.parent_id,
                customer_rank: partner.customer_rank,
                is_company: partner.is_company,
            },
        );
        Ok(id)
    }

    async fn update_partner(&self, id: PartnerId, partner: NewPartner) -> Result<(), StoreError> {
        let mut inner = self.lock_unpoisoned();
        let existing = inner.partners.get_mut(&id.as_i64()).ok_or_else(|| {
            StoreError::NotFound {
                entity: "partner",
                key: id.to_string(),
            }
        })?;
        existing.name = partner.name;
        existing.email = partner.email.map(|e| e.trim().to_lowercase());
        existing.phone = partner.phone;
        existing.street = partner.street;
        existing.street2 = partner.street2;
        existing.city = partner.city;
        existing.zip = partner.zip;
        existing.country_id = partner.country_id;
        existing.state_id = partner.state_id;
        existing.kind = partner.kind;
        existing.parent_id = partner.parent_id;
        existing.customer_rank = partner.customer_rank;
        existing.is_company = partner.is_company;
        Ok(())
    }

    async fn find_product_by_sku(&self, sku: &str) -> Result<Option<Product>, StoreError> {
        let inner = self.lock_unpoisoned();
        Ok(inner
            .products
            .values()
            .find(|p| p.sku.as_deref() == Some(sku))
            .cloned())
    }

    async fn find_product_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
        let inner = self.lock_unpoisoned();
        Ok(inner.products.values().find(|p| p.name == name).cloned())
    }

    async fn create_product(&self, product: NewProduct) -> Result<ProductId, StoreError> {
        let mut inner = self.lock_unpoisoned();
        let id = ProductId::new(inner.allocate_id());
        inner.products.insert(
            id.as_i64(),
            Product {
                id,
                name: product.name,
                sku: product.sku,
                kind: product.kind,
                list_price: product.list_price,
                description: product.description,
                sale_ok: product.sale_ok,
                purchase_ok: product.purchase_ok,
            },
        );
        Ok(id)
    }

    async fn update_product(&self, id: ProductId, product: NewProduct) -> Result<(), StoreError> {
        let mut inner = self.lock_unpoisoned();
        let existing = inner.products.get_mut(&id.as_i64()).ok_or_else(|| {
            StoreError::NotFound {
                entity: "product",
                key: id.to_string(),
            }
        })?;
        existing.name = product.name;
        existing.sku = product.sku;
        existing.kind = product.kind;
        existing.list_price = product.list_price;
        existing.description = product.description;
        existing.sale_ok = product.sale_ok;
        existing.purchase_ok = product.purchase_ok;
        Ok(())
    }

    async fn find_order_by_reference(
        &self,
        reference: &OrderRef,
    ) -> Result<Option<OrderId>, StoreError> {
        let inner = self.lock_unpoisoned();
        Ok(inner.orders.get(reference.as_str()).map(|o| o.id))
    }

    async fn create_order(&self, order: NewOrder) -> Result<OrderId, StoreError> {
        let mut inner = self.lock_unpoisoned();
        if inner.orders.contains_key(order.reference.as_str()) {
            return Err(StoreError::Conflict {
                entity: "order",
                key: order.reference.to_string(),
            });
        }
        let id = OrderId::new(inner.allocate_id());
        let lines = order
            .lines
            .into_iter()
            .map(|line| OrderLine {
                product_id: line.product_id,
                name: line.name,
                quantity: line.quantity,
                price_unit: line.price_unit,
            })
            .collect();
        inner.orders.insert(
            order.reference.as_str().to_string(),
            Order {
                id,
                reference: order.reference,
                partner_id: order.partner_id,
                partner_shipping_id: order.partner_shipping_id,
                currency_id: order.currency_id,
                state: order.state,
                amount_total: order.amount_total,
                note: order.note,
                date_order: order.date_order,
                lines,
            },
        );
        Ok(id)
    }

    async fn get_order(&self, id: OrderId) -> Result<Order, StoreError> {
        let inner = self.lock_unpoisoned();
        inner
            .orders
            .values()
            .find(|o| o.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "order",
                key: id.to_string(),
            })
    }

    async fn find_country_by_code(&self, code: &str) -> Result<Option<Country>, StoreError> {
        let inner = self.lock_unpoisoned();
        Ok(inner.countries.iter().find(|c| c.code == code).cloned())
    }

    async fn find_state(
        &self,
        country_id: CountryId,
        code: &str,
    ) -> Result<Option<CountryState>, StoreError> {
        let inner = self.lock_unpoisoned();
        Ok(inner
            .states
            .iter()
            .find(|s| s.country_id == country_id && s.code == code)
            .cloned())
    }

    async fn find_currency_by_code(&self, code: &str) -> Result<Option<Currency>, StoreError> {
        let inner = self.lock_unpoisoned();
        Ok(inner.currencies.iter().find(|c| c.code == code).cloned())
    }

    async fn try_acquire_sync_lock(&self, store_id: &str) -> Result<bool, StoreError> {
        let mut inner = self.lock_unpoisoned();
        Ok(inner.locks.insert(store_id.to_string()))
    }

    async fn release_sync_lock(&self, store_id: &str) -> Result<(), StoreError> {
        let mut inner = self.lock_unpoisoned();
        inner.locks.remove(store_id);
        Ok(())
    }

    async fn record_last_sync(
        &self,
        store_id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock_unpoisoned();
        inner.last_sync.insert(store_id.to_string(), at);
        Ok(())
    }

    async fn last_sync(&self, store_id: &str) -> Result<Option<DateTime<Utc>>, StoreError> {
        let inner = self.lock_unpoisoned();
        Ok(inner.last_sync.get(store_id).copied())
    }
}
