//! Synthesized natural key for imported orders.

use serde::{Deserialize, Serialize};

use super::RemoteId;

/// The natural key of an imported order: `WOO-<store-id>-<remote-order-id>`.
///
/// This string doubles as the idempotency key: an order pass looks up an
/// existing local order by this exact value before creating one, so the key
/// must be deterministic for a given (store, remote order) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderRef(String);

impl OrderRef {
    /// Synthesize the natural key for a remote order of a given store.
    #[must_use]
    pub fn synthesize(store_id: &str, remote_order_id: RemoteId) -> Self {
        Self(format!("WOO-{store_id}-{remote_order_id}"))
    }

    /// The key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
