//! Collaborator traits (section 6). Everything here is deliberately out of
//! this core's implementation scope per section 1 — chain connectivity,
//! oracle wire formats, and comptroller parameter sourcing are someone
//! else's crate. What lives here is the *shape* `liquidator-registry` and
//! `liquidator-evaluator` need that shape to have, kept object-safe
//! (`dyn ChainReader + Send + Sync`, etc.) so a production binary can hand
//! in an RPC-backed implementation without this workspace ever depending on
//! an RPC crate.

use async_trait::async_trait;
use common_errors::CoreError;
use common_fixed_point::FixedPoint;
use common_structs::{Address, AttestationRequest, MarketEvent, MarketId, PostableAttestations};
use futures::stream::BoxStream;

/// A full on-chain position snapshot for one account in one market, used
/// during hydration (section 6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSnapshot {
    pub supplied_ctokens: FixedPoint,
    pub borrow_balance: FixedPoint,
    pub borrow_index: FixedPoint,
}

/// On-demand storage reads (section 6). Implementations own retry policy —
/// section 7 treats a returned `CoreError::ChainRead` as already having
/// exhausted bounded exponential backoff.
#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn get_block_number(&self) -> Result<u64, CoreError>;

    async fn get_borrow_index(&self, market: MarketId, at_block: u64) -> Result<FixedPoint, CoreError>;

    async fn get_exchange_rate_stored(&self, market: MarketId, at_block: u64) -> Result<FixedPoint, CoreError>;

    async fn get_account_snapshot(
        &self,
        market: MarketId,
        address: Address,
        at_block: u64,
    ) -> Result<AccountSnapshot, CoreError>;
}

/// Delivers the decoded market log stream from `from_block` onward (section
/// 6). `subscribe` itself never suspends; polling the returned stream is
/// where I/O happens, which is where `BorrowerRegistry`'s ingestion loop
/// lives (section 5). A single entry point rather than a handler per
/// `(market, kind)` pair — see design notes section 9 on subscription
/// fan-out living in the `EventSource`, not here.
pub trait EventSource: Send + Sync {
    fn subscribe(&self, from_block: u64) -> BoxStream<'static, MarketEvent>;
}

/// Cached comptroller-wide and per-market parameters (section 6). Reading
/// these is assumed cheap and non-suspending — refreshing the cache, if the
/// implementation needs to, is that implementation's concern.
pub trait MarketRegistry: Send + Sync {
    fn collateral_factor(&self, market: MarketId) -> FixedPoint;
    fn close_factor(&self) -> FixedPoint;
    fn liquidation_incentive(&self) -> FixedPoint;
    fn is_collateral(&self, address: &Address, market: MarketId) -> bool;
    /// The oracle-facing symbol for this market's underlying asset, needed to
    /// build the `AttestationRequest` a liquidation candidate must carry
    /// (section 4.5 step 7). Market membership and naming both come from the
    /// comptroller-parameter collaborator, so this lives here rather than on
    /// `PriceLedger`.
    fn symbol(&self, market: MarketId) -> String;
}

/// Per-asset prices and postable attestations (section 6). `price` is
/// assumed cached/non-suspending; `get_postable_format` talks to the oracle
/// message set and may suspend.
#[async_trait]
pub trait PriceLedger: Send + Sync {
    fn price(&self, market: MarketId) -> Option<FixedPoint>;

    /// Returns `None` when the oracle message set can't currently produce a
    /// postable form for the requested symbols (section 4.5 step 7,
    /// `StaleAttestation`) — the caller drops the candidate rather than
    /// treating this as an error.
    async fn get_postable_format(&self, request: &AttestationRequest) -> Option<PostableAttestations>;
}
