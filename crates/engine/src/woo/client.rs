//! WooCommerce REST API client.
//!
//! Speaks `GET <store-url>/wp-json/<api-version>/<resource>` with the
//! consumer key/secret pair as basic auth. The client decodes payloads into
//! typed records at the boundary and surfaces non-2xx responses as
//! [`SyncError::RemoteApi`]; it attaches no retry or paging policy of its
//! own.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use tracing::instrument;

use woosync_core::{Parsed, RemoteCustomer, RemoteOrder, RemoteProduct, parse_record};

use super::{PageRequest, RemoteCatalog, Resource};
use crate::config::SyncConfig;
use crate::error::SyncError;

/// Wire format for the `after` query parameter.
const AFTER_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// WooCommerce REST API client.
#[derive(Debug, Clone)]
pub struct WooClient {
    client: reqwest::Client,
    base_url: String,
    consumer_key: String,
    consumer_secret: secrecy::SecretString,
}

impl WooClient {
    /// Create a client from the engine configuration.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Network` if the HTTP client cannot be built.
    pub fn new(config: &SyncConfig) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let base_url = format!(
            "{}/wp-json/{}",
            config.store_url.as_str().trim_end_matches('/'),
            config.api_version.trim_matches('/')
        );

        Ok(Self {
            client,
            base_url,
            consumer_key: config.consumer_key.clone(),
            consumer_secret: config.consumer_secret.clone(),
        })
    }

    /// Fetch one page of a collection as raw JSON values.
    #[instrument(skip(self), fields(page = page.page, per_page = page.per_page))]
    async fn fetch_page(
        &self,
        resource: Resource,
        page: &PageRequest,
        status: Option<&str>,
    ) -> Result<Vec<serde_json::Value>, SyncError> {
        let url = format!("{}/{}", self.base_url, resource.path());

        let mut request = self
            .client
            .get(&url)
            .basic_auth(&self.consumer_key, Some(self.consumer_secret.expose_secret()))
            .query(&[
                ("per_page", page.per_page.to_string()),
                ("page", page.page.to_string()),
            ]);
        if let Some(after) = page.after {
            request = request.query(&[("after", after.format(AFTER_FORMAT).to_string())]);
        }
        if let Some(status) = status {
            request = request.query(&[("status", status)]);
        }

        let response = request.send().await?;
        let status_code = response.status();
        if !status_code.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::RemoteApi {
                status_code: status_code.as_u16(),
                body,
            });
        }

        let payload: serde_json::Value = response.json().await?;
        match payload {
            serde_json::Value::Array(records) => {
                tracing::debug!(
                    resource = %resource,
                    count = records.len(),
                    "fetched remote page"
                );
                Ok(records)
            }
            _ => Err(SyncError::UnexpectedPayload {
                resource: resource.path(),
            }),
        }
    }
}

#[async_trait]
impl RemoteCatalog for WooClient {
    async fn fetch_orders(
        &self,
        page: &PageRequest,
    ) -> Result<Vec<Parsed<RemoteOrder>>, SyncError> {
        // Orders default to status=any; the API's own default hides
        // trashed/draft statuses inconsistently across store versions.
        let status = page.status.as_deref().unwrap_or("any");
        let records = self
            .fetch_page(Resource::Orders, page, Some(status))
            .await?;
        Ok(records
            .into_iter()
            .map(|value| parse_record(Resource::Orders.path(), value))
            .collect())
    }

    async fn fetch_customers(
        &self,
        page: &PageRequest,
    ) -> Result<Vec<Parsed<RemoteCustomer>>, SyncError> {
        let records = self.fetch_page(Resource::Customers, page, None).await?;
        Ok(records
            .into_iter()
            .map(|value| parse_record(Resource::Customers.path(), value))
            .collect())
    }

    async fn fetch_products(
        &self,
        page: &PageRequest,
    ) -> Result<Vec<Parsed<RemoteProduct>>, SyncError> {
        let records = self.fetch_page(Resource::Products, page, None).await?;
        Ok(records
            .into_iter()
            .map(|value| parse_record(Resource::Products.path(), value))
            .collect())
    }
}
