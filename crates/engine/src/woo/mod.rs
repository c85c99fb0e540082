//! Remote catalog access: the WooCommerce REST surface.
//!
//! The [`RemoteCatalog`] trait is the seam the orchestrator programs
//! against; [`WooClient`] is the HTTP implementation. Tests substitute a
//! scripted catalog.

mod client;

pub use client::WooClient;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use woosync_core::{Parsed, RemoteCustomer, RemoteOrder, RemoteProduct};

use crate::error::SyncError;

/// Remote collections the engine consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Orders,
    Customers,
    Products,
}

impl Resource {
    /// URL path segment of the collection.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Orders => "orders",
            Self::Customers => "customers",
            Self::Products => "products",
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// One page request against a remote collection.
///
/// Fetches are finite and not restartable mid-page; a caller that wants to
/// resume re-requests with an `after` filter.
#[derive(Debug, Clone)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    /// Records per page.
    pub per_page: u32,
    /// Only records created after this timestamp (ISO-8601 on the wire).
    pub after: Option<NaiveDateTime>,
    /// Remote status filter (orders only).
    pub status: Option<String>,
}

impl PageRequest {
    /// First page of a paging run.
    #[must_use]
    pub const fn first(per_page: u32) -> Self {
        Self {
            page: 1,
            per_page,
            after: None,
            status: None,
        }
    }

    /// The request for the page after this one, same filters.
    #[must_use]
    pub fn next(&self) -> Self {
        Self {
            page: self.page + 1,
            ..self.clone()
        }
    }
}

/// Paginated read access to the remote store.
///
/// Each element of a fetched page is boundary-validated into its typed
/// record ([`Parsed`]); a malformed element never fails the page. Errors at
/// this level (non-2xx, transport, non-array payload) are page-level and
/// abort the pass. No retries here — retry policy belongs to the caller.
#[async_trait]
pub trait RemoteCatalog: Send + Sync {
    async fn fetch_orders(
        &self,
        page: &PageRequest,
    ) -> Result<Vec<Parsed<RemoteOrder>>, SyncError>;

    async fn fetch_customers(
        &self,
        page: &PageRequest,
    ) -> Result<Vec<Parsed<RemoteCustomer>>, SyncError>;

    async fn fetch_products(
        &self,
        page: &PageRequest,
    ) -> Result<Vec<Parsed<RemoteProduct>>, SyncError>;
}
