//! Error taxonomy for the liquidation core (section 7).
//!
//! Two enums, matching the policy split the spec draws: [`CoreError`] is
//! fatal or boundary-level — surfaced to the caller and, for a scan, aborts
//! the whole request. [`ApplyWarning`] is the locally-recovered,
//! logged-not-propagated case — `EventApplier` returns these alongside a
//! successful apply rather than failing the ingestion pipeline over them.

use common_fixed_point::FixedPoint;
use common_structs::{Address, MarketId};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("borrow index for {0} was read before being populated")]
    UninitializedIndex(MarketId),

    #[error("market {0} is not part of the watched configuration")]
    UnknownMarket(MarketId),

    #[error("reorg recovery for {address} failed: {reason}")]
    ReorgRecoveryFailed { address: Address, reason: String },

    #[error("chain read failed after exhausting retries: {0}")]
    ChainRead(String),

    /// A §3 state-shape invariant that is supposed to be impossible to
    /// violate (e.g. `borrowIndexAtPrincipal == 0` while `borrowPrincipal >
    /// 0`) was observed anyway — per section 7 this signals a stale-event
    /// bug upstream, not a recoverable condition.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

/// A state-shape invariant was about to be violated and was recovered
/// locally (section 7). Callers should log these, not treat them as
/// failures — `BorrowerRegistry` surfaces them as the return value of
/// `register`/`ingest` rather than via `Result::Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyWarning {
    /// A `Redeem`, `Transfer`, or seize would have driven `supplied` (or, in
    /// principle, `borrow_principal`) negative; the value was saturated to
    /// zero instead.
    StateDrift {
        address: Address,
        market: MarketId,
        action: &'static str,
    },
    /// An `AccrueInterest` event reported a borrow index lower than the one
    /// already on file; the event was rejected rather than applied.
    NonMonotonicIndex {
        market: MarketId,
        previous: FixedPoint,
        attempted: FixedPoint,
    },
    /// An event arrived out of `(blockNumber, logIndex)` order relative to
    /// the last one applied for this market.
    OutOfOrderEvent {
        market: MarketId,
        last_applied: (u64, u64),
        received: (u64, u64),
    },
}

impl std::fmt::Display for ApplyWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplyWarning::StateDrift { address, market, action } => {
                write!(f, "{action} on {market} for {address} saturated at zero")
            }
            ApplyWarning::NonMonotonicIndex { market, previous, attempted } => {
                write!(
                    f,
                    "rejected non-monotonic borrow index for {market}: {attempted} < {previous}"
                )
            }
            ApplyWarning::OutOfOrderEvent { market, last_applied, received } => {
                write!(
                    f,
                    "out-of-order event for {market}: received {received:?} after {last_applied:?}"
                )
            }
        }
    }
}
