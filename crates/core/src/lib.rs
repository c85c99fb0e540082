//! Woosync Core - Shared types library.
//!
//! This crate provides the record types shared by all woosync components:
//! - `engine` - The reconciliation engine (catalog client, resolver, mapper, orchestrator)
//! - `cli` - Command-line trigger surface
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. Remote records mirror what the WooCommerce REST API returns and
//! are validated at the boundary; local records mirror the ERP side of the
//! reconciliation.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, address blocks, status vocabularies, natural keys
//! - [`remote`] - WooCommerce wire records (`RemoteOrder`, `RemoteCustomer`, `RemoteProduct`)
//! - [`local`] - ERP records (`Partner`, `Product`, `Order`) and creation payloads

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod local;
pub mod remote;
pub mod types;

pub use local::*;
pub use remote::*;
pub use types::*;
