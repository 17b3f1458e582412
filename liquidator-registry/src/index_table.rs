use std::collections::HashMap;

use common_errors::CoreError;
use common_fixed_point::FixedPoint;
use common_structs::MarketId;

/// Latest observed accrual index per market (section 4.2). Monotonicity
/// within a contiguous event stream is the caller's responsibility — see
/// `EventApplier::apply_accrue_interest`, which rejects a regression instead
/// of calling [`BorrowIndexTable::set`] with one.
#[derive(Debug, Clone, Default)]
pub struct BorrowIndexTable {
    indices: HashMap<MarketId, FixedPoint>,
}

impl BorrowIndexTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, market: MarketId) -> Result<FixedPoint, CoreError> {
        self.indices.get(&market).cloned().ok_or(CoreError::UninitializedIndex(market))
    }

    /// `None` if the market has never been populated — distinct from `get`'s
    /// error, since `EventApplier` needs to tell "never seen" apart from
    /// "regression" without treating the former as fatal.
    pub fn get_opt(&self, market: MarketId) -> Option<FixedPoint> {
        self.indices.get(&market).cloned()
    }

    /// Unconditional write (section 4.2). Monotonicity is enforced by the
    /// caller, not here.
    pub fn set(&mut self, market: MarketId, index: FixedPoint) {
        self.indices.insert(market, index);
    }

    pub fn snapshot(&self) -> HashMap<MarketId, FixedPoint> {
        self.indices.clone()
    }
}
