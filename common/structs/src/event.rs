use common_fixed_point::FixedPoint;

use crate::market::MarketId;
use crate::Address;

/// Whether a delivered event is still part of the canonical chain or has
/// been invalidated by a reorg (section 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Confirmed,
    Reverted,
}

/// The decoded payload of one market log, tagged by kind (section 4.3). A
/// tagged enum plus a single dispatching match in `EventApplier` stands in
/// for the reference workspace's per-event storage mappers — see design
/// notes section 9 on avoiding per-event-kind handler objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketEventKind {
    AccrueInterest {
        borrow_index: FixedPoint,
    },
    Mint {
        minter: Address,
        mint_tokens: FixedPoint,
    },
    Redeem {
        redeemer: Address,
        redeem_tokens: FixedPoint,
    },
    Borrow {
        borrower: Address,
        borrow_amount: FixedPoint,
        account_borrows_new: FixedPoint,
        borrow_index_now: FixedPoint,
    },
    RepayBorrow {
        borrower: Address,
        repay_amount: FixedPoint,
        account_borrows_new: FixedPoint,
        borrow_index_now: FixedPoint,
    },
    LiquidateBorrow {
        borrower: Address,
        seize_tokens: FixedPoint,
        seize_market: MarketId,
    },
    Transfer {
        from: Address,
        to: Address,
        amount: FixedPoint,
    },
}

/// One decoded log delivered by an `EventSource`, keyed by the market that
/// emitted it and ordered by `(block_number, log_index)` (section 6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketEvent {
    pub market: MarketId,
    pub kind: MarketEventKind,
    pub block_number: u64,
    pub log_index: u64,
    pub status: EventStatus,
}

impl MarketEvent {
    pub fn ordering_key(&self) -> (u64, u64) {
        (self.block_number, self.log_index)
    }
}
