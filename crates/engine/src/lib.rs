//! Reconciliation engine between a WooCommerce store and a local ERP.
//!
//! The engine pulls orders, customers and products over the WooCommerce
//! REST API and reconciles them into local records by natural key: orders
//! by a synthesized reference, partners by email, products by SKU. Orders
//! are create-only; customers and products upsert.
//!
//! The moving parts:
//!
//! - [`woo`] — the remote catalog seam ([`woo::RemoteCatalog`]) and its
//!   HTTP implementation ([`woo::WooClient`])
//! - [`store`] — the local persistence contract ([`store::LocalStore`])
//! - [`resolver`] — natural-key match-or-create
//! - [`mapper`] — pure field mapping between the two vocabularies
//! - [`orchestrator`] — lock-guarded passes with per-item isolation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod mapper;
pub mod orchestrator;
pub mod resolver;
pub mod session;
pub mod store;
pub mod woo;

pub use config::SyncConfig;
pub use error::SyncError;
pub use orchestrator::{SyncOrchestrator, TriggerResult};
pub use session::{ItemOutcome, PassReport, PassState, SyncSession};
