//! Pass orchestration: paging, per-item isolation, locking, tallies.
//!
//! One orchestrator instance serves one store. Each pass acquires the
//! store's sync lock, pages through the remote collection, reconciles every
//! record in isolation, and releases the lock on every exit path. Item-level
//! failures become `failed` tally entries; pass-level failures abort the
//! pass with the lock released and the session in `Error`.

use std::time::Instant;

use chrono::{NaiveDateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use woosync_core::{NewOrderLine, RemoteCustomer, RemoteOrder, RemoteProduct};

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::mapper::{addresses_differ, build_order_payload, has_shipping_charge};
use crate::resolver::Resolver;
use crate::session::{ItemOutcome, PassReport, PassState, SyncSession};
use crate::store::{LocalStore, StoreError};
use crate::woo::{PageRequest, RemoteCatalog, Resource};

/// Outcome of a manually triggered pass.
///
/// The trigger surface never errors: contention, timeouts and remote
/// failures all come back as an unsuccessful result with a human-readable
/// message.
#[derive(Debug, Clone)]
pub struct TriggerResult {
    pub success: bool,
    pub message: String,
    /// Records successfully reconciled.
    pub count: usize,
}

/// Drives sync passes for one configured store.
pub struct SyncOrchestrator<C, S> {
    catalog: C,
    store: S,
    config: SyncConfig,
}

impl<C: RemoteCatalog, S: LocalStore> SyncOrchestrator<C, S> {
    pub fn new(catalog: C, store: S, config: SyncConfig) -> Self {
        Self {
            catalog,
            store,
            config,
        }
    }

    /// The local store behind this orchestrator.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Take the local store back, dropping the orchestrator.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Run one pass over a remote collection.
    ///
    /// The `after` filter is used verbatim; [`Self::trigger`] and
    /// [`Self::sync_all`] default it to the last successful pass. Returns
    /// the tally on completion. Lock contention surfaces as
    /// [`SyncError::PassRunning`]; use [`Self::trigger`] for the
    /// never-fails manual surface.
    #[instrument(skip(self), fields(store_id = %self.config.store_id))]
    pub async fn sync(
        &self,
        resource: Resource,
        after: Option<NaiveDateTime>,
    ) -> Result<PassReport, SyncError> {
        if !self.store.try_acquire_sync_lock(&self.config.store_id).await? {
            warn!("pass already running, skipping");
            return Err(SyncError::PassRunning);
        }

        let mut session = SyncSession::new();
        info!(
            pass_id = %session.pass_id,
            %resource,
            state = %PassState::Running,
            "pass started"
        );

        let result = self.run_pass(resource, after, &mut session).await;

        // The lock is released on every path; a failure to release is
        // secondary to the pass outcome.
        if let Err(release_err) = self.store.release_sync_lock(&self.config.store_id).await {
            warn!(error = %release_err, "failed to release sync lock");
        }

        match result {
            Ok(report) => {
                self.store
                    .record_last_sync(&self.config.store_id, Utc::now())
                    .await?;
                info!(
                    pass_id = %session.pass_id,
                    %resource,
                    state = %PassState::Done,
                    %report,
                    "pass finished"
                );
                Ok(report)
            }
            Err(err) => {
                warn!(
                    pass_id = %session.pass_id,
                    %resource,
                    state = %PassState::Error,
                    error = %err,
                    "pass aborted"
                );
                Err(err)
            }
        }
    }

    /// Manual trigger: run a pass and fold every outcome into a
    /// [`TriggerResult`] instead of an error. Without an explicit `after`
    /// the pass is incremental from the last successful one.
    pub async fn trigger(
        &self,
        resource: Resource,
        after: Option<NaiveDateTime>,
    ) -> TriggerResult {
        let after = match after {
            Some(explicit) => Some(explicit),
            None => self.incremental_after().await,
        };
        match self.sync(resource, after).await {
            Ok(report) => TriggerResult {
                success: report.failed == 0,
                message: format!("{resource} sync finished: {report}"),
                count: report.success,
            },
            Err(SyncError::PassRunning) => TriggerResult {
                success: false,
                message: "a sync pass is already running for this store".to_string(),
                count: 0,
            },
            Err(err) => TriggerResult {
                success: false,
                message: format!("{resource} sync failed: {err}"),
                count: 0,
            },
        }
    }

    /// Run one pass per enabled collection: products first, then
    /// customers, then orders, so order lines match freshly imported SKUs
    /// and partners.
    ///
    /// The `after` filter is captured once before the first sub-pass, so a
    /// sub-pass finishing does not hide records from the next one.
    pub async fn sync_all(&self) -> Result<Vec<(Resource, PassReport)>, SyncError> {
        let after = self.incremental_after().await;
        let mut reports = Vec::new();
        if self.config.sync_products {
            reports.push((Resource::Products, self.sync(Resource::Products, after).await?));
        }
        if self.config.sync_customers {
            reports.push((
                Resource::Customers,
                self.sync(Resource::Customers, after).await?,
            ));
        }
        if self.config.sync_orders {
            reports.push((Resource::Orders, self.sync(Resource::Orders, after).await?));
        }
        Ok(reports)
    }

    async fn incremental_after(&self) -> Option<NaiveDateTime> {
        self.store
            .last_sync(&self.config.store_id)
            .await
            .ok()
            .flatten()
            .map(|at| at.naive_utc())
    }

    /// Force-release the store's sync lock.
    ///
    /// Recovery surface for a lock stranded by a crashed pass.
    pub async fn reset_lock(&self) -> Result<(), SyncError> {
        self.store.release_sync_lock(&self.config.store_id).await?;
        info!(store_id = %self.config.store_id, "sync lock reset");
        Ok(())
    }

    /// Completion time of the last successful pass, if any.
    pub async fn last_sync(&self) -> Result<Option<chrono::DateTime<Utc>>, SyncError> {
        Ok(self.store.last_sync(&self.config.store_id).await?)
    }

    async fn run_pass(
        &self,
        resource: Resource,
        after: Option<NaiveDateTime>,
        session: &mut SyncSession,
    ) -> Result<PassReport, SyncError> {
        let started = Instant::now();
        let mut report = PassReport::default();
        let mut page = PageRequest {
            after,
            ..PageRequest::first(self.config.page_size)
        };

        loop {
            if started.elapsed() >= self.config.pass_timeout {
                return Err(SyncError::PassTimeout {
                    elapsed_secs: started.elapsed().as_secs(),
                });
            }

            let fetched = match resource {
                Resource::Orders => {
                    let records = self.catalog.fetch_orders(&page).await?;
                    let count = records.len();
                    for record in records {
                        if self.at_record_cap(&report) {
                            return Ok(report);
                        }
                        let outcome = match record {
                            Ok(order) => self.reconcile_order(&order, session).await?,
                            Err(malformed) => {
                                warn!(error = %malformed, "malformed record");
                                ItemOutcome::Failed
                            }
                        };
                        report.record(outcome);
                    }
                    count
                }
                Resource::Customers => {
                    let records = self.catalog.fetch_customers(&page).await?;
                    let count = records.len();
                    for record in records {
                        if self.at_record_cap(&report) {
                            return Ok(report);
                        }
                        let outcome = match record {
                            Ok(customer) => self.reconcile_customer(&customer, session).await?,
                            Err(malformed) => {
                                warn!(error = %malformed, "malformed record");
                                ItemOutcome::Failed
                            }
                        };
                        report.record(outcome);
                    }
                    count
                }
                Resource::Products => {
                    let records = self.catalog.fetch_products(&page).await?;
                    let count = records.len();
                    for record in records {
                        if self.at_record_cap(&report) {
                            return Ok(report);
                        }
                        let outcome = match record {
                            Ok(product) => self.reconcile_product(&product, session).await?,
                            Err(malformed) => {
                                warn!(error = %malformed, "malformed record");
                                ItemOutcome::Failed
                            }
                        };
                        report.record(outcome);
                    }
                    count
                }
            };

            if fetched < self.config.page_size as usize || self.at_record_cap(&report) {
                return Ok(report);
            }
            page = page.next();
        }
    }

    fn at_record_cap(&self, report: &PassReport) -> bool {
        self.config
            .max_records
            .is_some_and(|cap| report.total >= cap)
    }

    /// Reconcile one remote order. Create-only: an already-imported
    /// reference is a skip, never an update.
    ///
    /// Item-level failures come back as `ItemOutcome::Failed`; only
    /// pass-level errors propagate.
    async fn reconcile_order(
        &self,
        order: &RemoteOrder,
        session: &mut SyncSession,
    ) -> Result<ItemOutcome, SyncError> {
        match self.import_order(order, session).await {
            Ok(outcome) => Ok(outcome),
            Err(err) if err.is_item_level() => {
                warn!(remote_id = %order.id, error = %err, "order failed");
                Ok(ItemOutcome::Failed)
            }
            Err(err) => Err(err),
        }
    }

    async fn import_order(
        &self,
        order: &RemoteOrder,
        session: &mut SyncSession,
    ) -> Result<ItemOutcome, SyncError> {
        let mut resolver = Resolver::new(&self.store, session);

        let (reference, existing) = resolver
            .resolve_order_identity(order.id, &self.config.store_id)
            .await?;
        if existing.is_some() {
            return Ok(ItemOutcome::Skipped);
        }

        // The billing partner resolves first so an order without a usable
        // natural key fails before anything is written for it.
        let partner_id = resolver.resolve_customer(&order.billing).await?;

        let shipping_partner_id =
            if addresses_differ(&order.billing, order.shipping.as_ref()) {
                // Unwrap is safe only because addresses_differ returned true.
                let shipping = order.shipping.as_ref().ok_or(SyncError::MissingNaturalKey {
                    entity: "shipping address",
                })?;
                Some(resolver.create_shipping_partner(shipping, partner_id).await?)
            } else {
                None
            };

        let currency_id = resolver.resolve_currency(order.currency.as_deref()).await?;

        let mut lines = Vec::with_capacity(order.line_items.len() + 1);
        for item in &order.line_items {
            let product_id = resolver.resolve_line_product(item).await?;
            lines.push(NewOrderLine {
                product_id,
                name: item
                    .name
                    .clone()
                    .unwrap_or_else(|| "Unnamed Product".to_string()),
                quantity: item.quantity,
                price_unit: item.price,
            });
        }

        if has_shipping_charge(order) {
            let shipping_product_id = resolver.resolve_shipping_product().await?;
            lines.push(NewOrderLine {
                product_id: shipping_product_id,
                name: "Shipping".to_string(),
                quantity: Decimal::ONE,
                price_unit: order.shipping_total,
            });
        }

        let payload = build_order_payload(
            order,
            reference.clone(),
            partner_id,
            shipping_partner_id,
            currency_id,
            lines,
        );

        match self.store.create_order(payload).await {
            Ok(order_id) => {
                info!(%order_id, reference = %reference, "order imported");
                Ok(ItemOutcome::Success)
            }
            // Lost a race with a concurrent import of the same reference.
            Err(StoreError::Conflict { .. }) => Ok(ItemOutcome::Skipped),
            Err(err) => Err(err.into()),
        }
    }

    async fn reconcile_customer(
        &self,
        customer: &RemoteCustomer,
        session: &mut SyncSession,
    ) -> Result<ItemOutcome, SyncError> {
        let mut resolver = Resolver::new(&self.store, session);
        match resolver.upsert_customer(customer).await {
            Ok(_) => Ok(ItemOutcome::Success),
            Err(err) if err.is_item_level() => {
                warn!(remote_id = %customer.id, error = %err, "customer failed");
                Ok(ItemOutcome::Failed)
            }
            Err(err) => Err(err),
        }
    }

    async fn reconcile_product(
        &self,
        product: &RemoteProduct,
        session: &mut SyncSession,
    ) -> Result<ItemOutcome, SyncError> {
        let mut resolver = Resolver::new(&self.store, session);
        match resolver.upsert_catalog_product(product).await {
            Ok(_) => Ok(ItemOutcome::Success),
            Err(err) if err.is_item_level() => {
                warn!(remote_id = %product.id, error = %err, "product failed");
                Ok(ItemOutcome::Failed)
            }
            Err(err) => Err(err),
        }
    }
}
