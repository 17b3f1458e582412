//! Workspace facade: the typed configuration a caller constructs this core
//! with, re-exports of the public surface each downstream crate needs, and a
//! thin wrapper tying `BorrowerRegistry` to its startup sequence.
//!
//! Nothing in this crate talks to a chain, a socket, or a file: config
//! *loading* is explicitly out of scope (section 1) and logging subscriber
//! setup belongs to the binary embedding this core, not the core itself.

use std::sync::Arc;

use common_errors::CoreError;
use common_structs::{Address, LiquidationCandidate, MarketId};
use liquidator_chain::{ChainReader, MarketRegistry, PriceLedger};
use liquidator_registry::BorrowerRegistry;

pub mod prelude {
    pub use common_errors::{ApplyWarning, CoreError};
    pub use common_fixed_point::FixedPoint;
    pub use common_structs::{
        Address, AttestationRequest, BorrowerState, EventStatus, LiquidationCandidate, MarketEvent,
        MarketEventKind, MarketId, PostableAttestations, PriceBound,
    };
    pub use liquidator_chain::{AccountSnapshot, ChainReader, EventSource, MarketRegistry, PriceLedger};
    pub use liquidator_evaluator::{evaluate, ScanContext};
    pub use liquidator_registry::BorrowerRegistry;

    pub use crate::{Config, LiquidationCore};
}

/// What markets this core watches and which accounts `bootstrap` should
/// register immediately (section 9's ambient config addition). Analogous to
/// the parameters a comptroller-style contract takes at `#[init]` time, but
/// plain data rather than anything parsed from a file or environment.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub markets: Vec<MarketId>,
    pub starting_addresses: Vec<Address>,
}

/// Ties a [`BorrowerRegistry`] to its startup sequence: populate the index
/// table from the chain, then hydrate the configured starting addresses.
/// Everything past construction is just `BorrowerRegistry`'s own API —
/// ingestion and `scan` are intentionally not wrapped further here so a
/// caller keeps direct control over its own event loop and scan cadence.
pub struct LiquidationCore {
    pub registry: BorrowerRegistry,
}

impl LiquidationCore {
    pub fn new(chain: Arc<dyn ChainReader>, config: Config) -> Self {
        LiquidationCore { registry: BorrowerRegistry::new(chain, config.markets) }
    }

    /// Runs `init` then `register` for `config.starting_addresses`, in that
    /// order (section 4.6: the index table must exist before any borrower
    /// is hydrated against it). Returns the head block `init` observed.
    #[tracing::instrument(skip(self, config))]
    pub async fn bootstrap(&self, config: &Config) -> Result<u64, CoreError> {
        let head = self.registry.init().await?;
        self.registry.register(&config.starting_addresses).await?;
        tracing::info!(head, watched = config.starting_addresses.len(), "bootstrap complete");
        Ok(head)
    }

    pub async fn scan(
        &self,
        market_registry: &dyn MarketRegistry,
        price_ledger: &dyn PriceLedger,
    ) -> Result<Vec<LiquidationCandidate>, CoreError> {
        self.registry.scan(market_registry, price_ledger).await
    }
}
