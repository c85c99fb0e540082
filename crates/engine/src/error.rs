//! Error taxonomy for the reconciliation engine.
//!
//! Two granularities exist and are never mixed up:
//!
//! - **Item-level** failures (a malformed record, a persistence failure for
//!   one order) are swallowed by the orchestrator and converted into a
//!   `failed` tally entry; the rest of the batch still runs.
//! - **Pass-level** failures (auth rejected, a page fetch that cannot be
//!   decoded, the wall-clock timeout) propagate as [`SyncError`], set the
//!   pass to `Error` and release the running lock.
//!
//! Reference-data misses (country, state, currency) are not errors at all:
//! the policy is degrade-don't-fail, so those resolvers return `Ok(None)`.

use thiserror::Error;

use woosync_core::MalformedRecord;

use crate::store::StoreError;

/// Errors surfaced by the reconciliation engine.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote API answered with a non-2xx status.
    #[error("remote API error: status {status_code}: {body}")]
    RemoteApi {
        /// HTTP status code of the response.
        status_code: u16,
        /// Response body, verbatim (WooCommerce returns JSON error objects).
        body: String,
    },

    /// Transport-level failure talking to the remote API.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A page of a remote collection was not a JSON array.
    #[error("unexpected remote payload for {resource}: expected a JSON array")]
    UnexpectedPayload {
        /// The resource whose page failed to decode.
        resource: &'static str,
    },

    /// A single remote record failed boundary validation.
    #[error(transparent)]
    Malformed(#[from] MalformedRecord),

    /// A record carries no usable natural key (e.g., an order whose billing
    /// block has no email), so it cannot be reconciled.
    #[error("{entity} record has no usable natural key")]
    MissingNaturalKey {
        /// Entity the key was needed for.
        entity: &'static str,
    },

    /// Local persistence failure.
    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),

    /// A pass was triggered while another was running for the same store.
    /// Not surfaced to manual-trigger callers; the trigger is a logged skip.
    #[error("a sync pass is already running for this store")]
    PassRunning,

    /// The pass exceeded its wall-clock budget.
    #[error("sync pass timed out after {elapsed_secs}s")]
    PassTimeout {
        /// Seconds the pass had been running when it was abandoned.
        elapsed_secs: u64,
    },
}

impl SyncError {
    /// Whether this error is isolated to a single record.
    ///
    /// Item-level errors become `failed` tally entries; everything else
    /// aborts the pass.
    #[must_use]
    pub const fn is_item_level(&self) -> bool {
        matches!(
            self,
            Self::Malformed(_) | Self::MissingNaturalKey { .. } | Self::Persistence(_)
        )
    }
}
