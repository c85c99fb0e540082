//! Status vocabularies for local records.
//!
//! Remote order statuses stay raw strings (the remote vocabulary is open —
//! plugins add their own); the engine's mapper folds them into [`OrderState`].

use serde::{Deserialize, Serialize};

/// Local sale-order state.
///
/// The deliberately small target vocabulary of the order status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    /// Quotation; not yet confirmed.
    #[default]
    Draft,
    /// Confirmed sale.
    Sale,
    /// Cancelled, refunded or failed.
    Cancel,
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Sale => write!(f, "sale"),
            Self::Cancel => write!(f, "cancel"),
        }
    }
}

/// Role of a partner record.
///
/// Billing contacts are regular `contact` partners; a shipping destination
/// that differs from billing is stored as a `delivery` child of the billing
/// partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PartnerKind {
    #[default]
    Contact,
    Delivery,
}

impl std::fmt::Display for PartnerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Contact => write!(f, "contact"),
            Self::Delivery => write!(f, "delivery"),
        }
    }
}

/// Local product kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    /// Physical good (maps from the remote `simple` type tag).
    #[default]
    Consu,
    /// Anything that is not a physical good on the remote side.
    Service,
}

impl ProductKind {
    /// Classify a remote product type tag.
    ///
    /// `simple` is a physical good; every other tag (including a missing
    /// one) is treated as a service.
    #[must_use]
    pub fn from_remote_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("simple") => Self::Consu,
            _ => Self::Service,
        }
    }
}

impl std::fmt::Display for ProductKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Consu => write!(f, "consu"),
            Self::Service => write!(f, "service"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_state_display() {
        assert_eq!(OrderState::Draft.to_string(), "draft");
        assert_eq!(OrderState::Sale.to_string(), "sale");
        assert_eq!(OrderState::Cancel.to_string(), "cancel");
    }

    #[test]
    fn test_product_kind_from_remote_tag() {
        assert_eq!(ProductKind::from_remote_tag(Some("simple")), ProductKind::Consu);
        assert_eq!(ProductKind::from_remote_tag(Some("variable")), ProductKind::Service);
        assert_eq!(ProductKind::from_remote_tag(Some("subscription")), ProductKind::Service);
        assert_eq!(ProductKind::from_remote_tag(None), ProductKind::Service);
    }

    #[test]
    fn test_partner_kind_serde_and_display() {
        assert_eq!(
            serde_json::to_string(&PartnerKind::Delivery).expect("serialize"),
            "\"delivery\""
        );
        assert_eq!(PartnerKind::Contact.to_string(), "contact");
        assert_eq!(PartnerKind::default(), PartnerKind::Contact);
    }

    #[test]
    fn test_order_state_serde() {
        assert_eq!(
            serde_json::to_string(&OrderState::Sale).expect("serialize"),
            "\"sale\""
        );
        let state: OrderState = serde_json::from_str("\"cancel\"").expect("deserialize");
        assert_eq!(state, OrderState::Cancel);
    }
}
