//! Shared primitive types: IDs, addresses, statuses, natural keys.

mod address;
mod id;
mod order_ref;
mod status;

pub use address::Address;
pub use id::*;
pub use order_ref::OrderRef;
pub use status::{OrderState, PartnerKind, ProductKind};
