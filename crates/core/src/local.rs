//! ERP-side records and their creation payloads.
//!
//! The engine only ever creates or updates these through the local
//! persistence contract; it never deletes. `New*` types are the payloads a
//! create takes, the id-carrying types are what reads return.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{
    CountryId, CurrencyId, OrderId, OrderRef, OrderState, PartnerId, PartnerKind, ProductId,
    ProductKind, StateId,
};

/// Contact record on the ERP side, matched by lower-cased email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partner {
    pub id: PartnerId,
    pub name: String,
    /// Stored lower-cased; this is the matching key.
    pub email: Option<String>,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub street2: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub country_id: Option<CountryId>,
    pub state_id: Option<StateId>,
    /// `Contact` for billing customers, `Delivery` for shipping-only
    /// addresses.
    pub kind: PartnerKind,
    /// Billing contact a delivery-only partner belongs to.
    pub parent_id: Option<PartnerId>,
    pub customer_rank: i32,
    pub is_company: bool,
}

/// Payload for creating a [`Partner`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPartner {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub street2: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub country_id: Option<CountryId>,
    pub state_id: Option<StateId>,
    pub kind: PartnerKind,
    pub parent_id: Option<PartnerId>,
    pub customer_rank: i32,
    pub is_company: bool,
}

/// Sellable item on the ERP side, matched by exact SKU.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Matching key; synthesized (`REMOTE_<id>`) when the remote record had none.
    pub sku: Option<String>,
    pub kind: ProductKind,
    pub list_price: Decimal,
    pub description: Option<String>,
    pub sale_ok: bool,
    pub purchase_ok: bool,
}

/// Payload for creating a [`Product`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub sku: Option<String>,
    pub kind: ProductKind,
    pub list_price: Decimal,
    pub description: Option<String>,
    pub sale_ok: bool,
    pub purchase_ok: bool,
}

/// Sale order on the ERP side, keyed by its synthesized [`OrderRef`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Natural/idempotency key (`WOO-<store>-<remote-id>`).
    pub reference: OrderRef,
    /// Billing partner.
    pub partner_id: PartnerId,
    /// Distinct shipping partner, only when the addresses differed.
    pub partner_shipping_id: Option<PartnerId>,
    /// Unset when the currency code could not be resolved.
    pub currency_id: Option<CurrencyId>,
    pub state: OrderState,
    /// The remote-reported total, taken as authoritative.
    pub amount_total: Decimal,
    pub note: Option<String>,
    pub date_order: Option<NaiveDateTime>,
    pub lines: Vec<OrderLine>,
}

/// One line of a persisted [`Order`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: Decimal,
    pub price_unit: Decimal,
}

/// Payload for creating an [`Order`] together with its lines in one local
/// transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub reference: OrderRef,
    pub partner_id: PartnerId,
    pub partner_shipping_id: Option<PartnerId>,
    pub currency_id: Option<CurrencyId>,
    pub state: OrderState,
    pub amount_total: Decimal,
    pub note: Option<String>,
    pub date_order: Option<NaiveDateTime>,
    pub lines: Vec<NewOrderLine>,
}

/// One line of a [`NewOrder`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: Decimal,
    pub price_unit: Decimal,
}

/// Country reference record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Country {
    pub id: CountryId,
    /// ISO 3166-1 alpha-2 code, stored upper-case.
    pub code: String,
}

/// State/province reference record, scoped to a country.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryState {
    pub id: StateId,
    pub country_id: CountryId,
    /// Code as used by the remote store (e.g., "CA"), stored upper-case.
    pub code: String,
}

/// Currency reference record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Currency {
    pub id: CurrencyId,
    /// ISO 4217 code.
    pub code: String,
}
