use std::collections::HashMap;

use common_fixed_point::FixedPoint;

use crate::market::MarketId;

/// One watched account's replica of its borrow/supply position across every
/// market it has touched (section 3). Created by `register`, hydrated once
/// from `ChainReader`, and from then on mutated exclusively by the
/// `EventApplier` — nothing in this type talks to the chain itself.
#[derive(Debug, Clone, Default)]
pub struct BorrowerState {
    /// cToken balance held per market (8-decimal convention upstream).
    supplied: HashMap<MarketId, FixedPoint>,
    /// Borrowed underlying, normalized by the index snapshot at the time it
    /// was last written (section 3).
    borrow_principal: HashMap<MarketId, FixedPoint>,
    /// The market's borrow index at the moment `borrow_principal` was last
    /// written for that market.
    borrow_index_at_principal: HashMap<MarketId, FixedPoint>,
    /// Highest block whose events have been applied to this account.
    last_updated_block: u64,
}

impl BorrowerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn supplied(&self, market: MarketId) -> FixedPoint {
        self.supplied.get(&market).cloned().unwrap_or_else(FixedPoint::zero)
    }

    pub fn borrow_principal(&self, market: MarketId) -> FixedPoint {
        self.borrow_principal.get(&market).cloned().unwrap_or_else(FixedPoint::zero)
    }

    pub fn borrow_index_at_principal(&self, market: MarketId) -> FixedPoint {
        self.borrow_index_at_principal
            .get(&market)
            .cloned()
            .unwrap_or_else(FixedPoint::zero)
    }

    pub fn last_updated_block(&self) -> u64 {
        self.last_updated_block
    }

    /// Every market this account currently has a nonzero supply or debt
    /// position in — the set `HealthEvaluator` needs to iterate.
    pub fn active_markets(&self) -> impl Iterator<Item = MarketId> + '_ {
        self.supplied
            .keys()
            .chain(self.borrow_principal.keys())
            .copied()
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
    }

    /// Only `EventApplier` (or a hydration routine rebuilding this state
    /// wholesale) should call this — everything else should treat
    /// `BorrowerState` as read-only.
    pub fn set_supplied(&mut self, market: MarketId, value: FixedPoint) {
        if value.is_zero() {
            self.supplied.remove(&market);
        } else {
            self.supplied.insert(market, value);
        }
    }

    pub fn set_borrow(&mut self, market: MarketId, principal: FixedPoint, index_at_principal: FixedPoint) {
        // Invariant (section 3): either both zero or both strictly positive.
        if principal.is_zero() {
            self.borrow_principal.remove(&market);
            self.borrow_index_at_principal.remove(&market);
        } else {
            self.borrow_principal.insert(market, principal);
            self.borrow_index_at_principal.insert(market, index_at_principal);
        }
    }

    pub fn bump_last_updated_block(&mut self, block: u64) {
        if block > self.last_updated_block {
            self.last_updated_block = block;
        }
    }
}
