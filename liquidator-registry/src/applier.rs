use std::collections::HashMap;

use common_errors::ApplyWarning;
use common_structs::{Address, BorrowerState, MarketEvent, MarketEventKind};

use crate::index_table::BorrowIndexTable;

/// Translates one already-ordered, confirmed [`MarketEvent`] into mutations
/// on `BorrowerState`/`BorrowIndexTable` (section 4.4). Stateless by design —
/// ordering, reorg recovery, and watched-set membership live in
/// `BorrowerRegistry`; this is the single dispatching routine section 9 asks
/// for in place of per-event-kind handler objects.
#[derive(Debug, Default, Clone, Copy)]
pub struct EventApplier;

impl EventApplier {
    pub fn new() -> Self {
        EventApplier
    }

    /// `borrowers` is the full watched map; an address absent from it is, by
    /// construction, unwatched, which is exactly the O(1) drop-before-mutation
    /// test section 4.4 requires.
    pub fn apply(
        &self,
        event: &MarketEvent,
        index_table: &mut BorrowIndexTable,
        borrowers: &mut HashMap<Address, BorrowerState>,
    ) -> Vec<ApplyWarning> {
        let mut warnings = Vec::new();
        let market = event.market;
        let block = event.block_number;

        match &event.kind {
            MarketEventKind::AccrueInterest { borrow_index } => {
                if let Some(warning) = apply_accrue_interest(index_table, market, borrow_index.clone()) {
                    warnings.push(warning);
                }
            }
            MarketEventKind::Mint { minter, mint_tokens } => {
                if let Some(state) = borrowers.get_mut(minter) {
                    let new_value = state.supplied(market).checked_add(mint_tokens);
                    state.set_supplied(market, new_value);
                    state.bump_last_updated_block(block);
                }
            }
            MarketEventKind::Redeem { redeemer, redeem_tokens } => {
                if let Some(state) = borrowers.get_mut(redeemer) {
                    let (new_value, drifted) = state.supplied(market).saturating_sub(redeem_tokens);
                    state.set_supplied(market, new_value);
                    if drifted {
                        warnings.push(ApplyWarning::StateDrift { address: *redeemer, market, action: "redeem" });
                    }
                    state.bump_last_updated_block(block);
                }
            }
            MarketEventKind::Borrow { borrower, account_borrows_new, borrow_index_now, .. } => {
                if let Some(state) = borrowers.get_mut(borrower) {
                    state.set_borrow(market, account_borrows_new.clone(), borrow_index_now.clone());
                    state.bump_last_updated_block(block);
                }
            }
            MarketEventKind::RepayBorrow { borrower, account_borrows_new, borrow_index_now, .. } => {
                if let Some(state) = borrowers.get_mut(borrower) {
                    state.set_borrow(market, account_borrows_new.clone(), borrow_index_now.clone());
                    state.bump_last_updated_block(block);
                }
            }
            MarketEventKind::LiquidateBorrow { borrower, seize_tokens, seize_market } => {
                if let Some(state) = borrowers.get_mut(borrower) {
                    let (new_value, drifted) = state.supplied(*seize_market).saturating_sub(seize_tokens);
                    state.set_supplied(*seize_market, new_value);
                    if drifted {
                        warnings.push(ApplyWarning::StateDrift {
                            address: *borrower,
                            market: *seize_market,
                            action: "liquidate_seize",
                        });
                    }
                    state.bump_last_updated_block(block);
                }
            }
            MarketEventKind::Transfer { from, to, amount } => {
                // Mint is `0x0 -> minter`, redeem is `redeemer -> 0x0`; the
                // paired Transfer each emits must be ignored so a single
                // protocol action doesn't double-count (section 4.4).
                if *from == Address::ZERO || *to == Address::ZERO {
                    return warnings;
                }
                if let Some(state) = borrowers.get_mut(from) {
                    let (new_value, drifted) = state.supplied(market).saturating_sub(amount);
                    state.set_supplied(market, new_value);
                    if drifted {
                        warnings.push(ApplyWarning::StateDrift { address: *from, market, action: "transfer_out" });
                    }
                    state.bump_last_updated_block(block);
                }
                if let Some(state) = borrowers.get_mut(to) {
                    let new_value = state.supplied(market).checked_add(amount);
                    state.set_supplied(market, new_value);
                    state.bump_last_updated_block(block);
                }
            }
        }

        warnings
    }
}

/// `AccrueInterest` handling (section 4.4): rejects a regression rather than
/// writing it, returning a warning instead of mutating.
pub fn apply_accrue_interest(
    index_table: &mut BorrowIndexTable,
    market: common_structs::MarketId,
    borrow_index: common_fixed_point::FixedPoint,
) -> Option<ApplyWarning> {
    match index_table.get_opt(market) {
        Some(previous) if borrow_index < previous => Some(ApplyWarning::NonMonotonicIndex {
            market,
            previous,
            attempted: borrow_index,
        }),
        _ => {
            index_table.set(market, borrow_index);
            None
        }
    }
}
