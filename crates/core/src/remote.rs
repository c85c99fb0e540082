//! WooCommerce wire records.
//!
//! These types mirror what the WooCommerce REST API (`wc/v3`) returns for
//! the `orders`, `customers` and `products` collections. Decoding happens at
//! the catalog-client boundary: each JSON array element is parsed into its
//! typed record immediately, and an element that fails to decode is carried
//! as a [`MalformedRecord`] instead of leaking missing-key lookups into the
//! mapper.
//!
//! Records are immutable once fetched within a sync pass; nothing here
//! performs I/O.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::types::{Address, RemoteId};

/// A record that failed boundary validation.
///
/// Carries enough context (resource, remote id when extractable) for the
/// orchestrator to tally the item as `failed` and move on.
#[derive(Debug, Clone, thiserror::Error)]
#[error("malformed {resource} record (remote id {})", remote_id.map_or_else(|| "unknown".to_string(), |id| id.to_string()))]
pub struct MalformedRecord {
    /// Remote resource the record came from (`orders`, `customers`, `products`).
    pub resource: &'static str,
    /// Remote identifier, when the raw payload carried one.
    pub remote_id: Option<i64>,
    /// Decode/validation failure description.
    pub reason: String,
}

/// A boundary-validated record: either the typed record or the reason it
/// could not be one.
pub type Parsed<T> = Result<T, MalformedRecord>;

/// Decode one raw JSON element into a typed remote record.
///
/// The remote id is extracted from the raw value before decoding so a
/// malformed record can still be attributed.
pub fn parse_record<T: DeserializeOwned>(
    resource: &'static str,
    value: serde_json::Value,
) -> Parsed<T> {
    let remote_id = value.get("id").and_then(serde_json::Value::as_i64);
    serde_json::from_value(value).map_err(|e| MalformedRecord {
        resource,
        remote_id,
        reason: e.to_string(),
    })
}

/// An order as fetched from the remote store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteOrder {
    /// Remote order identifier.
    pub id: RemoteId,
    /// Raw remote status string; the vocabulary is open (plugins add to it),
    /// so mapping to a local state happens in the mapper, not here.
    #[serde(default)]
    pub status: Option<String>,
    /// ISO 4217 currency code.
    #[serde(default)]
    pub currency: Option<String>,
    /// Billing contact block.
    #[serde(default)]
    pub billing: Address,
    /// Shipping contact block; WooCommerce sends an all-empty block for
    /// orders shipped to the billing address.
    #[serde(default)]
    pub shipping: Option<Address>,
    /// Ordered line items.
    #[serde(default)]
    pub line_items: Vec<RemoteLineItem>,
    /// Remote-reported order total. Authoritative: the engine never
    /// recomputes totals from line items.
    #[serde(default)]
    pub total: Decimal,
    /// Remote-reported shipping cost.
    #[serde(default)]
    pub shipping_total: Decimal,
    /// Free-text note left by the customer at checkout.
    #[serde(default)]
    pub customer_note: Option<String>,
    /// Creation timestamp in the store's local time, no offset.
    #[serde(default, with = "lenient_datetime")]
    pub date_created: Option<NaiveDateTime>,
}

/// One ordered line of a [`RemoteOrder`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteLineItem {
    /// Remote product identifier, when the line references a product.
    pub product_id: Option<RemoteId>,
    /// Product SKU; may be blank or absent.
    pub sku: Option<String>,
    /// Display name of the product at order time.
    pub name: Option<String>,
    /// Ordered quantity.
    pub quantity: Decimal,
    /// Unit price.
    pub price: Decimal,
}

impl Default for RemoteLineItem {
    fn default() -> Self {
        Self {
            product_id: None,
            sku: None,
            name: None,
            quantity: Decimal::ONE,
            price: Decimal::ZERO,
        }
    }
}

impl RemoteLineItem {
    /// The SKU if non-blank, trimmed.
    #[must_use]
    pub fn sku_trimmed(&self) -> Option<&str> {
        self.sku.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// The SKU to create a missing product with: the remote SKU when
    /// present, otherwise `REMOTE_<product-id>`.
    #[must_use]
    pub fn sku_or_synthesized(&self) -> Option<String> {
        self.sku_trimmed().map_or_else(
            || self.product_id.map(|id| format!("REMOTE_{id}")),
            |sku| Some(sku.to_string()),
        )
    }
}

/// A customer as fetched from the remote store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteCustomer {
    /// Remote customer identifier.
    pub id: RemoteId,
    /// Primary natural key. May be blank for malformed accounts; such
    /// records cannot be reconciled and fail at item granularity.
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// The customer's one address block (WooCommerce keeps phone inside it).
    #[serde(default)]
    pub billing: Address,
}

impl RemoteCustomer {
    /// Email used for matching: the account email when set, otherwise the
    /// billing block's, normalized to trimmed lowercase.
    #[must_use]
    pub fn normalized_email(&self) -> Option<String> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_lowercase)
            .or_else(|| self.billing.normalized_email())
    }
}

/// A product as fetched from the remote store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteProduct {
    /// Remote product identifier.
    pub id: RemoteId,
    /// Natural key when present.
    #[serde(default)]
    pub sku: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Listed price.
    #[serde(default)]
    pub price: Decimal,
    /// Sales description.
    #[serde(default)]
    pub description: Option<String>,
    /// Remote type tag: `simple` is a physical good, anything else a service.
    #[serde(default, rename = "type")]
    pub type_tag: Option<String>,
}

impl RemoteProduct {
    /// The SKU if non-blank, trimmed.
    #[must_use]
    pub fn sku_trimmed(&self) -> Option<&str> {
        self.sku.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// The SKU to store: the remote SKU when present, otherwise
    /// `REMOTE_<id>`.
    #[must_use]
    pub fn sku_or_synthesized(&self) -> String {
        self.sku_trimmed()
            .map_or_else(|| format!("REMOTE_{}", self.id), str::to_string)
    }
}

/// Lenient (de)serialization for WooCommerce timestamps.
///
/// The API reports `date_created` in the store's local time without an
/// offset (`2024-01-05T09:30:00`); some deployments append a `Z`. Unparsable
/// values degrade to `None` rather than failing the record.
mod lenient_datetime {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_str(&ts.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse))
    }

    fn parse(raw: &str) -> Option<NaiveDateTime> {
        let trimmed = raw.trim().trim_end_matches('Z');
        NaiveDateTime::parse_from_str(trimmed, FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S"))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_order_minimal() {
        let value = serde_json::json!({"id": 501});
        let order: RemoteOrder = parse_record("orders", value).expect("parse");
        assert_eq!(order.id, RemoteId::new(501));
        assert!(order.status.is_none());
        assert!(order.line_items.is_empty());
        assert_eq!(order.total, Decimal::ZERO);
    }

    #[test]
    fn test_parse_order_full() {
        let value = serde_json::json!({
            "id": 501,
            "status": "processing",
            "currency": "USD",
            "billing": {"email": "a@x.com", "first_name": "A"},
            "shipping": {"first_name": "A"},
            "line_items": [{"sku": "SKU1", "quantity": 2, "price": "9.99", "name": "Widget"}],
            "total": "19.98",
            "shipping_total": "0.00",
            "customer_note": "ring twice",
            "date_created": "2024-01-05T09:30:00"
        });
        let order: RemoteOrder = parse_record("orders", value).expect("parse");
        assert_eq!(order.status.as_deref(), Some("processing"));
        assert_eq!(order.total.to_string(), "19.98");
        assert_eq!(order.line_items.len(), 1);
        let line = order.line_items.first().expect("line");
        assert_eq!(line.quantity, Decimal::TWO);
        assert_eq!(line.price.to_string(), "9.99");
        assert!(order.date_created.is_some());
    }

    #[test]
    fn test_parse_order_missing_id_is_malformed() {
        let value = serde_json::json!({"status": "processing"});
        let err = parse_record::<RemoteOrder>("orders", value).expect_err("must fail");
        assert_eq!(err.resource, "orders");
        assert!(err.remote_id.is_none());
    }

    #[test]
    fn test_parse_order_bad_total_keeps_remote_id() {
        let value = serde_json::json!({"id": 7, "total": {"nested": true}});
        let err = parse_record::<RemoteOrder>("orders", value).expect_err("must fail");
        assert_eq!(err.remote_id, Some(7));
    }

    #[test]
    fn test_line_item_sku_synthesis() {
        let with_sku = RemoteLineItem {
            sku: Some(" SKU1 ".to_string()),
            ..RemoteLineItem::default()
        };
        assert_eq!(with_sku.sku_or_synthesized().as_deref(), Some("SKU1"));

        let without_sku = RemoteLineItem {
            product_id: Some(RemoteId::new(33)),
            sku: Some(String::new()),
            ..RemoteLineItem::default()
        };
        assert_eq!(without_sku.sku_or_synthesized().as_deref(), Some("REMOTE_33"));

        assert_eq!(RemoteLineItem::default().sku_or_synthesized(), None);
    }

    #[test]
    fn test_product_sku_synthesis() {
        let value = serde_json::json!({"id": 12, "name": "Widget"});
        let product: RemoteProduct = parse_record("products", value).expect("parse");
        assert_eq!(product.sku_or_synthesized(), "REMOTE_12");
    }

    #[test]
    fn test_product_missing_id_is_malformed() {
        let value = serde_json::json!({"sku": "SKU1"});
        assert!(parse_record::<RemoteProduct>("products", value).is_err());
    }

    #[test]
    fn test_customer_email_prefers_account_email() {
        let value = serde_json::json!({
            "id": 9,
            "email": "Account@X.com",
            "billing": {"email": "billing@x.com"}
        });
        let customer: RemoteCustomer = parse_record("customers", value).expect("parse");
        assert_eq!(customer.normalized_email(), Some("account@x.com".to_string()));

        let value = serde_json::json!({"id": 9, "billing": {"email": "billing@x.com"}});
        let fallback: RemoteCustomer = parse_record("customers", value).expect("parse");
        assert_eq!(fallback.normalized_email(), Some("billing@x.com".to_string()));
    }

    #[test]
    fn test_lenient_datetime_accepts_trailing_z() {
        let value = serde_json::json!({"id": 1, "date_created": "2024-01-05T09:30:00Z"});
        let order: RemoteOrder = parse_record("orders", value).expect("parse");
        assert!(order.date_created.is_some());
    }

    #[test]
    fn test_lenient_datetime_degrades_to_none() {
        let value = serde_json::json!({"id": 1, "date_created": "not-a-date"});
        let order: RemoteOrder = parse_record("orders", value).expect("parse");
        assert!(order.date_created.is_none());
    }
}
