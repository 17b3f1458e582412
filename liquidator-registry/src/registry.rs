use std::collections::HashMap;
use std::sync::Arc;

use common_errors::{ApplyWarning, CoreError};
use common_fixed_point::FixedPoint;
use common_structs::{Address, BorrowerState, EventStatus, LiquidationCandidate, MarketEvent, MarketEventKind, MarketId};
use futures::future::try_join_all;
use liquidator_chain::{ChainReader, MarketRegistry, PriceLedger};
use liquidator_evaluator::{evaluate, ScanContext};
use tokio::sync::RwLock;

use crate::applier::EventApplier;
use crate::index_table::BorrowIndexTable;

/// Owns the watched borrower map and the shared [`BorrowIndexTable`] (section
/// 4.6). A `tokio::sync::RwLock` per piece of shared state realizes the
/// reader-writer discipline option from section 5: event ingestion takes
/// write guards, `scan` takes read guards only long enough to clone what it
/// needs before doing any I/O-bound evaluation.
pub struct BorrowerRegistry {
    chain: Arc<dyn ChainReader>,
    markets: Vec<MarketId>,
    borrowers: RwLock<HashMap<Address, BorrowerState>>,
    index_table: RwLock<BorrowIndexTable>,
    last_applied: RwLock<HashMap<MarketId, (u64, u64)>>,
    applier: EventApplier,
}

impl BorrowerRegistry {
    pub fn new(chain: Arc<dyn ChainReader>, markets: Vec<MarketId>) -> Self {
        BorrowerRegistry {
            chain,
            markets,
            borrowers: RwLock::new(HashMap::new()),
            index_table: RwLock::new(BorrowIndexTable::new()),
            last_applied: RwLock::new(HashMap::new()),
            applier: EventApplier::new(),
        }
    }

    /// Populates the index table for every watched market at the current
    /// head block; returns that block so a caller can start subscribing an
    /// `EventSource` from it (section 4.6).
    #[tracing::instrument(skip(self))]
    pub async fn init(&self) -> Result<u64, CoreError> {
        let head = self.chain.get_block_number().await?;
        let indices = try_join_all(self.markets.iter().map(|&market| async move {
            self.chain.get_borrow_index(market, head).await.map(|index| (market, index))
        }))
        .await?;
        let mut table = self.index_table.write().await;
        for (market, index) in indices {
            table.set(market, index);
        }
        Ok(head)
    }

    /// For each address not already watched: hydrate from a full
    /// `ChainReader` snapshot across every watched market and insert.
    /// Existing entries are left untouched (section 4.6).
    pub async fn register(&self, addresses: &[Address]) -> Result<(), CoreError> {
        let at_block = self.chain.get_block_number().await?;
        for &address in addresses {
            let already_watched = self.borrowers.read().await.contains_key(&address);
            if already_watched {
                continue;
            }
            self.rehydrate_address(address, at_block).await?;
        }
        Ok(())
    }

    pub async fn unregister(&self, address: Address) {
        self.borrowers.write().await.remove(&address);
    }

    pub async fn is_watched(&self, address: Address) -> bool {
        self.borrowers.read().await.contains_key(&address)
    }

    /// The single event-ingestion entry point (section 9): a caller pumping
    /// an `EventSource`'s stream calls this once per delivered event. Ordered
    /// application and reorg recovery both live here.
    pub async fn ingest(&self, event: MarketEvent) -> Result<Vec<ApplyWarning>, CoreError> {
        match event.status {
            EventStatus::Reverted => {
                tracing::info!(market = %event.market, block = event.block_number, "reorg: recovering by refetch");
                let at_block = self.chain.get_block_number().await?;

                // The invalidated event's ordering watermark no longer
                // corresponds to anything confirmed on the new fork; clear
                // it so the next confirmed event for this market is accepted
                // unconditionally instead of being permanently rejected as
                // out-of-order against a stale value (section 4.4).
                self.last_applied.write().await.remove(&event.market);

                match &event.kind {
                    MarketEventKind::AccrueInterest { .. } => {
                        let fresh_index =
                            self.chain.get_borrow_index(event.market, at_block).await.map_err(|source| {
                                CoreError::ChainRead(format!(
                                    "reorg recovery for {} borrow index: {source}",
                                    event.market
                                ))
                            })?;
                        self.index_table.write().await.set(event.market, fresh_index);
                    }
                    _ => {
                        for address in addresses_touched(&event.kind) {
                            if self.is_watched(address).await {
                                self.rehydrate_address(address, at_block).await.map_err(|source| {
                                    CoreError::ReorgRecoveryFailed { address, reason: source.to_string() }
                                })?;
                            }
                        }
                    }
                }
                Ok(Vec::new())
            }
            EventStatus::Confirmed => {
                let key = event.ordering_key();
                let market = event.market;
                {
                    let mut last_applied = self.last_applied.write().await;
                    if let Some(&previous) = last_applied.get(&market) {
                        if key <= previous {
                            return Ok(vec![ApplyWarning::OutOfOrderEvent {
                                market,
                                last_applied: previous,
                                received: key,
                            }]);
                        }
                    }
                    last_applied.insert(market, key);
                }
                let mut index_table = self.index_table.write().await;
                let mut borrowers = self.borrowers.write().await;
                let warnings = self.applier.apply(&event, &mut index_table, &mut borrowers);
                for warning in &warnings {
                    tracing::warn!(%warning, "recovered apply-time state drift");
                }
                Ok(warnings)
            }
        }
    }

    /// Snapshots exchange rates and the index table atomically with respect
    /// to event application, then evaluates each watched borrower against
    /// that snapshot (section 4.6, section 5). Cloning each `BorrowerState`
    /// up front means the read guards are released before any suspending
    /// `PriceLedger` call.
    #[tracing::instrument(skip(self, market_registry, price_ledger))]
    pub async fn scan(
        &self,
        market_registry: &dyn MarketRegistry,
        price_ledger: &dyn PriceLedger,
    ) -> Result<Vec<LiquidationCandidate>, CoreError> {
        let head = self.chain.get_block_number().await?;
        let exchange_rate: HashMap<MarketId, FixedPoint> = try_join_all(self.markets.iter().map(|&market| async move {
            self.chain.get_exchange_rate_stored(market, head).await.map(|rate| (market, rate))
        }))
        .await?
        .into_iter()
        .collect();

        let (index_snapshot, borrower_snapshot) = {
            let index_guard = self.index_table.read().await;
            let borrowers_guard = self.borrowers.read().await;
            let index_snapshot = index_guard.snapshot();
            let borrower_snapshot: Vec<(Address, BorrowerState)> =
                borrowers_guard.iter().map(|(address, state)| (*address, state.clone())).collect();
            (index_snapshot, borrower_snapshot)
        };

        let ctx = ScanContext {
            current_borrow_index: &index_snapshot,
            exchange_rate: &exchange_rate,
            market_registry,
            price_ledger,
        };

        let mut candidates = Vec::new();
        for (address, state) in &borrower_snapshot {
            if let Some(candidate) = evaluate(*address, state, &ctx).await? {
                candidates.push(candidate);
            }
        }
        Ok(candidates)
    }

    /// Optional sampled-consistency hook (section 9's `randomCheck` follow-up,
    /// never called internally). Refetches `address` and compares against the
    /// in-memory replica within a relative tolerance of `1e-12` (section 8,
    /// property 3).
    pub async fn verify(&self, address: Address) -> Result<bool, CoreError> {
        let at_block = self.chain.get_block_number().await?;
        let state = self.borrowers.read().await.get(&address).cloned().unwrap_or_default();

        for &market in &self.markets {
            let snapshot = self.chain.get_account_snapshot(market, address, at_block).await?;
            if !approx_eq(&state.supplied(market), &snapshot.supplied_ctokens) {
                return Ok(false);
            }
            let owed = if state.borrow_principal(market).is_zero() {
                FixedPoint::zero()
            } else {
                state
                    .borrow_principal(market)
                    .mul(&snapshot.borrow_index)
                    .checked_div(&state.borrow_index_at_principal(market))
                    .map_err(|e| CoreError::InvariantViolation(e.to_string()))?
            };
            if !approx_eq(&owed, &snapshot.borrow_balance) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    async fn rehydrate_address(&self, address: Address, at_block: u64) -> Result<(), CoreError> {
        let mut state = BorrowerState::new();
        for &market in &self.markets {
            let snapshot = self.chain.get_account_snapshot(market, address, at_block).await?;
            state.set_supplied(market, snapshot.supplied_ctokens);
            state.set_borrow(market, snapshot.borrow_balance, snapshot.borrow_index);
        }
        state.bump_last_updated_block(at_block);
        self.borrowers.write().await.insert(address, state);
        Ok(())
    }
}

/// The account-carrying addresses a given event kind can affect, used to
/// target reorg recovery (section 5) without re-deriving the dispatch match
/// in `EventApplier`.
fn addresses_touched(kind: &MarketEventKind) -> Vec<Address> {
    match kind {
        MarketEventKind::AccrueInterest { .. } => Vec::new(),
        MarketEventKind::Mint { minter, .. } => vec![*minter],
        MarketEventKind::Redeem { redeemer, .. } => vec![*redeemer],
        MarketEventKind::Borrow { borrower, .. } => vec![*borrower],
        MarketEventKind::RepayBorrow { borrower, .. } => vec![*borrower],
        MarketEventKind::LiquidateBorrow { borrower, .. } => vec![*borrower],
        MarketEventKind::Transfer { from, to, .. } => vec![*from, *to],
    }
}

fn approx_eq(a: &FixedPoint, b: &FixedPoint) -> bool {
    let (larger, smaller) = if a >= b { (a, b) } else { (b, a) };
    let diff = larger.checked_sub(smaller).unwrap_or_else(FixedPoint::zero);
    if larger.is_zero() {
        return diff.is_zero();
    }
    let tolerance = FixedPoint::from_decimal_str("0.000000000001").expect("valid literal");
    match diff.checked_div(larger) {
        Ok(relative) => relative <= tolerance,
        Err(_) => false,
    }
}
