//! Contact/address block as WooCommerce delivers it.

use serde::{Deserialize, Serialize};

/// A billing or shipping contact block.
///
/// Every field is optional on the wire; WooCommerce sends empty strings for
/// unset fields and omits blocks entirely for guest checkouts. Consumers
/// that compare or copy fields treat a missing field and an empty string as
/// the same value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub address_1: Option<String>,
    pub address_2: Option<String>,
    pub city: Option<String>,
    /// State/province code (e.g., "CA"), not a display name.
    pub state: Option<String>,
    pub postcode: Option<String>,
    /// ISO 3166-1 alpha-2 country code.
    pub country: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Address {
    /// The email, trimmed and lower-cased, or `None` when blank.
    ///
    /// This is the normalization applied everywhere an email acts as a
    /// natural key, so `"A@X.com "` and `"a@x.com"` match the same partner.
    #[must_use]
    pub fn normalized_email(&self) -> Option<String> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_lowercase)
    }

    /// True when every field is absent or blank.
    ///
    /// WooCommerce represents "ships to billing address" as an all-empty
    /// shipping block, which callers treat the same as a missing one.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        [
            &self.first_name,
            &self.last_name,
            &self.company,
            &self.address_1,
            &self.address_2,
            &self.city,
            &self.state,
            &self.postcode,
            &self.country,
            &self.email,
            &self.phone,
        ]
        .into_iter()
        .all(|field| field.as_deref().is_none_or(|v| v.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_email_lowercases_and_trims() {
        let addr = Address {
            email: Some("  A@X.Com ".to_string()),
            ..Address::default()
        };
        assert_eq!(addr.normalized_email(), Some("a@x.com".to_string()));
    }

    #[test]
    fn test_normalized_email_blank_is_none() {
        let addr = Address {
            email: Some("   ".to_string()),
            ..Address::default()
        };
        assert_eq!(addr.normalized_email(), None);
        assert_eq!(Address::default().normalized_email(), None);
    }

    #[test]
    fn test_is_empty() {
        assert!(Address::default().is_empty());
        let blank = Address {
            first_name: Some(String::new()),
            city: Some("  ".to_string()),
            ..Address::default()
        };
        assert!(blank.is_empty());
        let populated = Address {
            city: Some("Town".to_string()),
            ..Address::default()
        };
        assert!(!populated.is_empty());
    }

    #[test]
    fn test_deserialize_partial_block() {
        let addr: Address =
            serde_json::from_str(r#"{"first_name":"A","country":"US"}"#).expect("deserialize");
        assert_eq!(addr.first_name.as_deref(), Some("A"));
        assert_eq!(addr.country.as_deref(), Some("US"));
        assert!(addr.phone.is_none());
    }
}
