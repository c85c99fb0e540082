//! Natural-key resolution: match-or-create against the local store.
//!
//! Every operation follows the same shape — look the entity up by its
//! natural key, create it when absent, hand back the local id either way.
//! Hits are cached in the pass's [`SyncSession`]; reference-data misses
//! (country, state, currency) degrade to `None` instead of failing the
//! record.

use tracing::{debug, info};

use woosync_core::{
    Address, CountryId, CurrencyId, NewPartner, NewProduct, OrderId, OrderRef, PartnerId,
    PartnerKind, ProductId, ProductKind, RemoteCustomer, RemoteId, RemoteLineItem, RemoteProduct,
    StateId,
};

use crate::error::SyncError;
use crate::mapper::display_name;
use crate::session::SyncSession;
use crate::store::LocalStore;

/// Fallback display name for products without one.
const UNNAMED_PRODUCT: &str = "Unnamed Product";

/// Where a product creation originates; decides the `purchase_ok` policy.
///
/// Order-line-originated products exist only so the order line has
/// something to reference, so they are not flagged for purchasing; catalog
/// imports mirror the remote catalog and are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductOrigin {
    OrderLine,
    CatalogImport,
}

impl ProductOrigin {
    const fn purchase_ok(self) -> bool {
        matches!(self, Self::CatalogImport)
    }
}

/// Match-or-create resolution over a [`LocalStore`], scoped to one pass.
pub struct Resolver<'a, S: LocalStore + ?Sized> {
    store: &'a S,
    session: &'a mut SyncSession,
}

impl<'a, S: LocalStore + ?Sized> Resolver<'a, S> {
    pub fn new(store: &'a S, session: &'a mut SyncSession) -> Self {
        Self { store, session }
    }

    // -------------------------------------------------------------------------
    // Reference data (degrade, don't fail)
    // -------------------------------------------------------------------------

    /// Resolve a country by ISO code, case-insensitively. A miss is not an
    /// error: the record proceeds with no country.
    pub async fn resolve_country(
        &mut self,
        code: Option<&str>,
    ) -> Result<Option<CountryId>, SyncError> {
        let Some(code) = normalize_code(code) else {
            return Ok(None);
        };
        if let Some(&id) = self.session.countries_by_code.get(&code) {
            return Ok(Some(id));
        }
        match self.store.find_country_by_code(&code).await? {
            Some(country) => {
                self.session.countries_by_code.insert(code, country.id);
                Ok(Some(country.id))
            }
            None => {
                debug!(code, "country not found, leaving unset");
                Ok(None)
            }
        }
    }

    /// Resolve a state by (code, country) pair. Requires a resolved
    /// country; a miss on either side leaves the state unset.
    pub async fn resolve_state(
        &mut self,
        code: Option<&str>,
        country_id: Option<CountryId>,
    ) -> Result<Option<StateId>, SyncError> {
        let (Some(code), Some(country_id)) = (normalize_code(code), country_id) else {
            return Ok(None);
        };
        let key = (country_id, code.clone());
        if let Some(&id) = self.session.states_by_key.get(&key) {
            return Ok(Some(id));
        }
        match self.store.find_state(country_id, &code).await? {
            Some(state) => {
                self.session.states_by_key.insert(key, state.id);
                Ok(Some(state.id))
            }
            None => {
                debug!(code, %country_id, "state not found, leaving unset");
                Ok(None)
            }
        }
    }

    /// Resolve a currency by ISO 4217 code. A miss leaves the order without
    /// a currency.
    pub async fn resolve_currency(
        &mut self,
        code: Option<&str>,
    ) -> Result<Option<CurrencyId>, SyncError> {
        let Some(code) = normalize_code(code) else {
            return Ok(None);
        };
        if let Some(&id) = self.session.currencies_by_code.get(&code) {
            return Ok(Some(id));
        }
        match self.store.find_currency_by_code(&code).await? {
            Some(currency) => {
                self.session.currencies_by_code.insert(code, currency.id);
                Ok(Some(currency.id))
            }
            None => {
                debug!(code, "currency not found, leaving unset");
                Ok(None)
            }
        }
    }

    // -------------------------------------------------------------------------
    // Partners
    // -------------------------------------------------------------------------

    /// Match a partner by lower-cased email or create one from the address
    /// block. An existing partner is returned unmodified — order-triggered
    /// resolution never updates.
    ///
    /// # Errors
    ///
    /// `SyncError::MissingNaturalKey` when the block has no email.
    pub async fn resolve_customer(&mut self, address: &Address) -> Result<PartnerId, SyncError> {
        let email = address
            .normalized_email()
            .ok_or(SyncError::MissingNaturalKey { entity: "partner" })?;

        if let Some(&id) = self.session.partners_by_email.get(&email) {
            return Ok(id);
        }
        if let Some(partner) = self.store.find_partner_by_email(&email).await? {
            self.session.partners_by_email.insert(email, partner.id);
            return Ok(partner.id);
        }

        let partner = new_partner_from_address(address, Some(email.clone()));
        let partner = self.fill_geography(partner, address).await?;
        let id = self.store.create_partner(partner).await?;
        info!(%id, email, "created partner");
        self.session.partners_by_email.insert(email, id);
        Ok(id)
    }

    /// Create a delivery-only partner from a shipping block that differs
    /// from billing, linked to the billing partner it belongs to. Always
    /// creates: shipping destinations are not matched by email (the block
    /// usually has none of its own).
    pub async fn create_shipping_partner(
        &mut self,
        shipping: &Address,
        billing_partner_id: PartnerId,
    ) -> Result<PartnerId, SyncError> {
        let partner = NewPartner {
            kind: PartnerKind::Delivery,
            parent_id: Some(billing_partner_id),
            ..new_partner_from_address(shipping, shipping.normalized_email())
        };
        let partner = self.fill_geography(partner, shipping).await?;
        let id = self.store.create_partner(partner).await?;
        info!(%id, parent = %billing_partner_id, "created delivery partner");
        Ok(id)
    }

    /// Upsert a partner from a standalone customer record (customer pass
    /// semantics: update-on-match).
    ///
    /// Returns the id and whether the partner was created (vs updated).
    pub async fn upsert_customer(
        &mut self,
        customer: &RemoteCustomer,
    ) -> Result<(PartnerId, bool), SyncError> {
        let email = customer
            .normalized_email()
            .ok_or(SyncError::MissingNaturalKey { entity: "partner" })?;

        let mut partner = NewPartner {
            name: display_name(customer.first_name.as_deref(), customer.last_name.as_deref()),
            ..new_partner_from_address(&customer.billing, Some(email.clone()))
        };
        // A blank customer name falls back to the billing block's.
        if partner.name == "Unknown" {
            partner.name = display_name(
                customer.billing.first_name.as_deref(),
                customer.billing.last_name.as_deref(),
            );
        }
        let partner = self.fill_geography(partner, &customer.billing).await?;

        if let Some(existing) = self.store.find_partner_by_email(&email).await? {
            self.store.update_partner(existing.id, partner).await?;
            debug!(id = %existing.id, email, "updated partner");
            self.session.partners_by_email.insert(email, existing.id);
            Ok((existing.id, false))
        } else {
            let id = self.store.create_partner(partner).await?;
            info!(%id, email, "created partner");
            self.session.partners_by_email.insert(email, id);
            Ok((id, true))
        }
    }

    async fn fill_geography(
        &mut self,
        mut partner: NewPartner,
        address: &Address,
    ) -> Result<NewPartner, SyncError> {
        partner.country_id = self.resolve_country(address.country.as_deref()).await?;
        partner.state_id = self
            .resolve_state(address.state.as_deref(), partner.country_id)
            .await?;
        Ok(partner)
    }

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    /// Match a product for an order line by SKU (name fallback when the
    /// line has no SKU) or create it.
    ///
    /// # Errors
    ///
    /// `SyncError::MissingNaturalKey` when the line has neither SKU,
    /// product id nor name to match or create by.
    pub async fn resolve_line_product(
        &mut self,
        line: &RemoteLineItem,
    ) -> Result<ProductId, SyncError> {
        if let Some(id) = self
            .find_product(line.sku_trimmed(), line.name.as_deref())
            .await?
        {
            return Ok(id);
        }

        let sku = line.sku_or_synthesized();
        if sku.is_none() && line.name.is_none() {
            return Err(SyncError::MissingNaturalKey { entity: "product" });
        }

        // Order-line records carry no type tag; a line item is assumed to be
        // a physical good.
        let product = NewProduct {
            name: line
                .name
                .clone()
                .unwrap_or_else(|| UNNAMED_PRODUCT.to_string()),
            sku,
            kind: ProductKind::Consu,
            list_price: line.price,
            description: None,
            sale_ok: true,
            purchase_ok: ProductOrigin::OrderLine.purchase_ok(),
        };
        self.create_product(product).await
    }

    /// Upsert a product from a standalone catalog record (product pass
    /// semantics: update-on-match).
    ///
    /// Returns the id and whether the product was created (vs updated).
    pub async fn upsert_catalog_product(
        &mut self,
        remote: &RemoteProduct,
    ) -> Result<(ProductId, bool), SyncError> {
        let product = NewProduct {
            name: remote
                .name
                .clone()
                .unwrap_or_else(|| UNNAMED_PRODUCT.to_string()),
            sku: Some(remote.sku_or_synthesized()),
            kind: ProductKind::from_remote_tag(remote.type_tag.as_deref()),
            list_price: remote.price,
            description: remote.description.clone(),
            sale_ok: true,
            purchase_ok: ProductOrigin::CatalogImport.purchase_ok(),
        };

        if let Some(id) = self
            .find_product(remote.sku_trimmed(), remote.name.as_deref())
            .await?
        {
            self.store.update_product(id, product).await?;
            debug!(%id, "updated product");
            Ok((id, false))
        } else {
            let id = self.create_product(product).await?;
            Ok((id, true))
        }
    }

    /// Resolve the `SHIPPING` service product used for shipping-cost lines,
    /// creating it on first use.
    pub async fn resolve_shipping_product(&mut self) -> Result<ProductId, SyncError> {
        if let Some(id) = self.find_product(Some("SHIPPING"), None).await? {
            return Ok(id);
        }
        let product = NewProduct {
            name: "Shipping".to_string(),
            sku: Some("SHIPPING".to_string()),
            kind: ProductKind::Service,
            list_price: rust_decimal::Decimal::ZERO,
            description: None,
            sale_ok: true,
            purchase_ok: false,
        };
        self.create_product(product).await
    }

    /// SKU lookup with name fallback.
    ///
    /// The name fallback is only consulted when no SKU is given; it is a
    /// known weak point (duplicate names collide on whichever record the
    /// store returns first) carried over unchanged.
    async fn find_product(
        &mut self,
        sku: Option<&str>,
        name: Option<&str>,
    ) -> Result<Option<ProductId>, SyncError> {
        if let Some(sku) = sku {
            let key = format!("sku:{sku}");
            if let Some(&id) = self.session.products_by_key.get(&key) {
                return Ok(Some(id));
            }
            if let Some(product) = self.store.find_product_by_sku(sku).await? {
                self.session.products_by_key.insert(key, product.id);
                return Ok(Some(product.id));
            }
            return Ok(None);
        }

        if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
            let key = format!("name:{name}");
            if let Some(&id) = self.session.products_by_key.get(&key) {
                return Ok(Some(id));
            }
            if let Some(product) = self.store.find_product_by_name(name).await? {
                self.session.products_by_key.insert(key, product.id);
                return Ok(Some(product.id));
            }
        }
        Ok(None)
    }

    async fn create_product(&mut self, product: NewProduct) -> Result<ProductId, SyncError> {
        let cache_key = product.sku.as_ref().map(|sku| format!("sku:{sku}"));
        let name = product.name.clone();
        let id = self.store.create_product(product).await?;
        info!(%id, name, "created product");
        if let Some(key) = cache_key {
            self.session.products_by_key.insert(key, id);
        }
        Ok(id)
    }

    // -------------------------------------------------------------------------
    // Orders
    // -------------------------------------------------------------------------

    /// Synthesize the order natural key and look up an existing import.
    ///
    /// Deterministic: the key depends only on the store id and remote order
    /// id, never on cache state.
    pub async fn resolve_order_identity(
        &self,
        remote_order_id: RemoteId,
        store_id: &str,
    ) -> Result<(OrderRef, Option<OrderId>), SyncError> {
        let reference = OrderRef::synthesize(store_id, remote_order_id);
        let existing = self.store.find_order_by_reference(&reference).await?;
        Ok((reference, existing))
    }
}

fn new_partner_from_address(address: &Address, email: Option<String>) -> NewPartner {
    NewPartner {
        name: display_name(address.first_name.as_deref(), address.last_name.as_deref()),
        email,
        phone: address.phone.clone(),
        street: address.address_1.clone(),
        street2: address.address_2.clone(),
        city: address.city.clone(),
        zip: address.postcode.clone(),
        country_id: None,
        state_id: None,
        kind: PartnerKind::Contact,
        parent_id: None,
        customer_rank: 1,
        is_company: false,
    }
}

fn normalize_code(code: Option<&str>) -> Option<String> {
    code.map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_uppercase)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::store::MemoryStore;

    use super::*;

    fn billing_address() -> Address {
        serde_json::from_value(serde_json::json!({
            "email": "A@X.com",
            "first_name": "A",
            "last_name": "B",
            "address_1": "1 St",
            "city": "Town",
            "postcode": "000",
            "country": "us",
            "state": "ca",
            "phone": "123"
        }))
        .expect("valid address")
    }

    #[tokio::test]
    async fn test_resolve_customer_creates_once() {
        let store = MemoryStore::new();
        let mut session = SyncSession::new();
        let mut resolver = Resolver::new(&store, &mut session);

        let first = resolver.resolve_customer(&billing_address()).await.expect("resolve");
        let second = resolver.resolve_customer(&billing_address()).await.expect("resolve again");
        assert_eq!(first, second);
        assert_eq!(store.partners().len(), 1);

        let partner = store.partners().pop().expect("partner");
        assert_eq!(partner.name, "A B");
        assert_eq!(partner.email.as_deref(), Some("a@x.com"));
        assert_eq!(partner.kind, PartnerKind::Contact);
        assert!(partner.parent_id.is_none());
        assert_eq!(partner.customer_rank, 1);
        assert!(!partner.is_company);
    }

    #[tokio::test]
    async fn test_shipping_partner_is_delivery_child_of_billing() {
        let store = MemoryStore::new();
        let mut session = SyncSession::new();
        let mut resolver = Resolver::new(&store, &mut session);

        let billing_id = resolver.resolve_customer(&billing_address()).await.expect("billing");

        let shipping: Address = serde_json::from_value(serde_json::json!({
            "first_name": "A", "last_name": "B", "address_1": "2 Oak Ave", "city": "Elsewhere"
        }))
        .expect("valid address");
        let shipping_id = resolver
            .create_shipping_partner(&shipping, billing_id)
            .await
            .expect("delivery partner");
        assert_ne!(shipping_id, billing_id);

        let partners = store.partners();
        let delivery = partners.iter().find(|p| p.id == shipping_id).expect("present");
        assert_eq!(delivery.kind, PartnerKind::Delivery);
        assert_eq!(delivery.parent_id, Some(billing_id));
        assert_eq!(delivery.city.as_deref(), Some("Elsewhere"));
    }

    #[tokio::test]
    async fn test_resolve_customer_matches_across_sessions() {
        let store = MemoryStore::new();
        let mut session = SyncSession::new();
        let first = Resolver::new(&store, &mut session)
            .resolve_customer(&billing_address())
            .await
            .expect("resolve");

        // Fresh session, same store: must match, not create.
        let mut session = SyncSession::new();
        let second = Resolver::new(&store, &mut session)
            .resolve_customer(&billing_address())
            .await
            .expect("resolve");
        assert_eq!(first, second);
        assert_eq!(store.partners().len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_customer_without_email_fails() {
        let store = MemoryStore::new();
        let mut session = SyncSession::new();
        let mut resolver = Resolver::new(&store, &mut session);
        let err = resolver
            .resolve_customer(&Address::default())
            .await
            .expect_err("no email");
        assert!(matches!(err, SyncError::MissingNaturalKey { entity: "partner" }));
    }

    #[tokio::test]
    async fn test_resolve_customer_existing_is_not_updated() {
        let store = MemoryStore::new();
        let mut session = SyncSession::new();
        Resolver::new(&store, &mut session)
            .resolve_customer(&billing_address())
            .await
            .expect("create");

        let mut changed = billing_address();
        changed.city = Some("Elsewhere".to_string());
        let mut session = SyncSession::new();
        Resolver::new(&store, &mut session)
            .resolve_customer(&changed)
            .await
            .expect("match");

        let partner = store.partners().pop().expect("partner");
        assert_eq!(partner.city.as_deref(), Some("Town"));
    }

    #[tokio::test]
    async fn test_geography_degrades_on_miss() {
        let store = MemoryStore::new();
        let mut session = SyncSession::new();
        Resolver::new(&store, &mut session)
            .resolve_customer(&billing_address())
            .await
            .expect("create despite unknown country");

        let partner = store.partners().pop().expect("partner");
        assert!(partner.country_id.is_none());
        assert!(partner.state_id.is_none());
    }

    #[tokio::test]
    async fn test_geography_resolves_case_insensitively() {
        let store = MemoryStore::new();
        let us = store.seed_country("US");
        store.seed_state(us, "CA");

        let mut session = SyncSession::new();
        Resolver::new(&store, &mut session)
            .resolve_customer(&billing_address())
            .await
            .expect("create");

        let partner = store.partners().pop().expect("partner");
        assert_eq!(partner.country_id, Some(us));
        assert!(partner.state_id.is_some());
    }

    #[tokio::test]
    async fn test_resolve_line_product_by_sku_then_create() {
        let store = MemoryStore::new();
        let mut session = SyncSession::new();
        let mut resolver = Resolver::new(&store, &mut session);

        let line: RemoteLineItem = serde_json::from_value(serde_json::json!({
            "sku": "SKU1", "name": "Widget", "quantity": 2, "price": "9.99"
        }))
        .expect("line");

        let first = resolver.resolve_line_product(&line).await.expect("create");
        let second = resolver.resolve_line_product(&line).await.expect("match");
        assert_eq!(first, second);

        let product = store.products().pop().expect("product");
        assert_eq!(product.sku.as_deref(), Some("SKU1"));
        assert_eq!(product.kind, ProductKind::Consu);
        assert!(product.sale_ok);
        assert!(!product.purchase_ok);
        assert_eq!(product.list_price.to_string(), "9.99");
    }

    #[tokio::test]
    async fn test_resolve_line_product_synthesizes_sku() {
        let store = MemoryStore::new();
        let mut session = SyncSession::new();
        let mut resolver = Resolver::new(&store, &mut session);

        let line: RemoteLineItem = serde_json::from_value(serde_json::json!({
            "product_id": 33, "name": "Widget", "quantity": 1, "price": "5.00"
        }))
        .expect("line");
        resolver.resolve_line_product(&line).await.expect("create");

        let product = store.products().pop().expect("product");
        assert_eq!(product.sku.as_deref(), Some("REMOTE_33"));
    }

    #[tokio::test]
    async fn test_resolve_line_product_falls_back_to_name() {
        let store = MemoryStore::new();
        store
            .create_product(NewProduct {
                name: "Widget".to_string(),
                sku: None,
                kind: ProductKind::Consu,
                list_price: Decimal::ZERO,
                description: None,
                sale_ok: true,
                purchase_ok: false,
            })
            .await
            .expect("seed product");

        let mut session = SyncSession::new();
        let mut resolver = Resolver::new(&store, &mut session);
        let line: RemoteLineItem = serde_json::from_value(serde_json::json!({
            "name": "Widget", "quantity": 1, "price": "5.00"
        }))
        .expect("line");
        resolver.resolve_line_product(&line).await.expect("match by name");
        assert_eq!(store.products().len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_customer_updates_on_match() {
        let store = MemoryStore::new();
        let mut session = SyncSession::new();

        let customer: RemoteCustomer = serde_json::from_value(serde_json::json!({
            "id": 9, "email": "a@x.com", "first_name": "A", "last_name": "B",
            "billing": {"city": "Town"}
        }))
        .expect("customer");
        let (id, created) = Resolver::new(&store, &mut session)
            .upsert_customer(&customer)
            .await
            .expect("create");
        assert!(created);

        let moved: RemoteCustomer = serde_json::from_value(serde_json::json!({
            "id": 9, "email": "a@x.com", "first_name": "A", "last_name": "B",
            "billing": {"city": "Elsewhere"}
        }))
        .expect("customer");
        let (same_id, created) = Resolver::new(&store, &mut SyncSession::new())
            .upsert_customer(&moved)
            .await
            .expect("update");
        assert_eq!(id, same_id);
        assert!(!created);

        let partner = store.partners().pop().expect("partner");
        assert_eq!(partner.city.as_deref(), Some("Elsewhere"));
    }

    #[tokio::test]
    async fn test_upsert_catalog_product_purchase_ok_policy() {
        let store = MemoryStore::new();
        let mut session = SyncSession::new();

        let remote: RemoteProduct = serde_json::from_value(serde_json::json!({
            "id": 12, "sku": "SKU1", "name": "Widget", "price": "9.99", "type": "simple"
        }))
        .expect("product");
        let (_, created) = Resolver::new(&store, &mut session)
            .upsert_catalog_product(&remote)
            .await
            .expect("create");
        assert!(created);

        let product = store.products().pop().expect("product");
        assert_eq!(product.kind, ProductKind::Consu);
        assert!(product.purchase_ok);
    }

    #[tokio::test]
    async fn test_resolve_order_identity() {
        let store = MemoryStore::new();
        let mut session = SyncSession::new();
        let resolver = Resolver::new(&store, &mut session);

        let (reference, existing) = resolver
            .resolve_order_identity(RemoteId::new(42), "store1")
            .await
            .expect("identity");
        assert_eq!(reference.as_str(), "WOO-store1-42");
        assert!(existing.is_none());
    }

    #[tokio::test]
    async fn test_shipping_product_created_once() {
        let store = MemoryStore::new();
        let mut session = SyncSession::new();
        let mut resolver = Resolver::new(&store, &mut session);

        let first = resolver.resolve_shipping_product().await.expect("create");
        let second = resolver.resolve_shipping_product().await.expect("match");
        assert_eq!(first, second);
        assert_eq!(store.products().len(), 1);
        let product = store.products().pop().expect("product");
        assert_eq!(product.kind, ProductKind::Service);
    }
}
