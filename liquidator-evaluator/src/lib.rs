//! `HealthEvaluator` (section 4.5): a pure function of a borrower's state
//! plus a scan snapshot, producing at most one liquidation candidate. No
//! field here is mutated — every invocation with identical inputs is
//! required to produce identical output (section 8, "Health determinism"),
//! so this crate holds no state of its own at all.

use std::collections::HashMap;

use common_errors::CoreError;
use common_fixed_point::FixedPoint;
use common_structs::{Address, AttestationRequest, BorrowerState, LiquidationCandidate, MarketId, PriceBound};
use liquidator_chain::{MarketRegistry, PriceLedger};

/// Everything `evaluate` needs beyond the borrower's own state: a consistent
/// snapshot of accrual indices and exchange rates (section 5 — these two
/// must be read atomically with respect to event application), plus the two
/// read-mostly collaborators.
pub struct ScanContext<'a> {
    pub current_borrow_index: &'a HashMap<MarketId, FixedPoint>,
    pub exchange_rate: &'a HashMap<MarketId, FixedPoint>,
    pub market_registry: &'a dyn MarketRegistry,
    pub price_ledger: &'a dyn PriceLedger,
}

struct MarketValuation {
    market: MarketId,
    supply_eth: FixedPoint,
    borrow_eth: FixedPoint,
    is_collateral: bool,
}

/// Steps 1-7 of section 4.5. Returns `Ok(None)` for a healthy account, one
/// whose collateral markets don't cover any debt, or one whose attestation
/// came back stale (`StaleAttestation` is not an error for the scan as a
/// whole, section 7) — only a genuinely fatal read (an uninitialized index,
/// section 4.2) is `Err`.
pub async fn evaluate(
    address: Address,
    state: &BorrowerState,
    ctx: &ScanContext<'_>,
) -> Result<Option<LiquidationCandidate>, CoreError> {
    let mut valuations = Vec::new();
    let mut total_collateral_eth = FixedPoint::zero();
    let mut total_borrow_eth = FixedPoint::zero();

    for market in state.active_markets() {
        let current_index = ctx
            .current_borrow_index
            .get(&market)
            .cloned()
            .ok_or(CoreError::UninitializedIndex(market))?;
        let exchange_rate = ctx.exchange_rate.get(&market).cloned().unwrap_or_else(FixedPoint::zero);

        let Some(price) = ctx.price_ledger.price(market) else {
            // No price at all for a market this account holds a position
            // in: we can't trust any total computed without it, so the
            // whole account is dropped for this scan rather than risking an
            // understated health factor.
            return Ok(None);
        };

        let supply_underlying = state.supplied(market).mul(&exchange_rate);

        let borrow_principal = state.borrow_principal(market);
        let borrow_underlying = if borrow_principal.is_zero() {
            FixedPoint::zero()
        } else {
            let index_at_principal = state.borrow_index_at_principal(market);
            if index_at_principal.is_zero() {
                return Err(CoreError::InvariantViolation(format!(
                    "{address}: borrowPrincipal > 0 but borrowIndexAtPrincipal == 0 for {market}"
                )));
            }
            borrow_principal
                .mul(&current_index)
                .checked_div(&index_at_principal)
                .map_err(|e| CoreError::InvariantViolation(e.to_string()))?
        };

        let supply_eth = supply_underlying.mul(&price);
        let borrow_eth = borrow_underlying.mul(&price);
        let collateral_factor = ctx.market_registry.collateral_factor(market);
        let collateral_eth = supply_eth.mul(&collateral_factor);

        total_collateral_eth = total_collateral_eth.checked_add(&collateral_eth);
        total_borrow_eth = total_borrow_eth.checked_add(&borrow_eth);

        valuations.push(MarketValuation {
            market,
            supply_eth,
            borrow_eth,
            is_collateral: ctx.market_registry.is_collateral(&address, market),
        });
    }

    if total_borrow_eth.is_zero() {
        return Ok(None); // health is +infinity
    }
    let health = total_collateral_eth
        .checked_div(&total_borrow_eth)
        .map_err(|e| CoreError::InvariantViolation(e.to_string()))?;
    if health >= FixedPoint::one() {
        return Ok(None);
    }

    let repay = valuations
        .iter()
        .max_by(|a, b| a.borrow_eth.cmp(&b.borrow_eth).then(b.market.cmp(&a.market)))
        .ok_or_else(|| CoreError::InvariantViolation(format!("{address}: total_borrow_eth > 0 with no valuations")))?;

    let Some(seize) = valuations
        .iter()
        .filter(|v| v.is_collateral)
        .max_by(|a, b| a.supply_eth.cmp(&b.supply_eth).then(b.market.cmp(&a.market)))
    else {
        return Ok(None); // no collateral entered to seize against
    };

    let close_factor = ctx.market_registry.close_factor();
    let liquidation_incentive = ctx.market_registry.liquidation_incentive();

    let max_repay_eth = repay.borrow_eth.mul(&close_factor);
    let max_seize_eth = FixedPoint::min(max_repay_eth.mul(&liquidation_incentive), seize.supply_eth.clone());
    let rebate = max_seize_eth
        .checked_div(&liquidation_incentive)
        .map_err(|e| CoreError::InvariantViolation(e.to_string()))?;
    let Some(expected_revenue_eth) = max_seize_eth.checked_sub(&rebate) else {
        return Ok(None);
    };
    if expected_revenue_eth.is_zero() {
        return Ok(None); // soundness (section 8): every candidate has positive revenue
    }

    let mut symbols = vec![ctx.market_registry.symbol(repay.market)];
    let repay_price = ctx.price_ledger.price(repay.market).unwrap_or_else(FixedPoint::zero);
    let mut edges = vec![PriceBound { lower: repay_price.clone(), upper: repay_price }];
    if seize.market != repay.market {
        symbols.push(ctx.market_registry.symbol(seize.market));
        let seize_price = ctx.price_ledger.price(seize.market).unwrap_or_else(FixedPoint::zero);
        edges.push(PriceBound { lower: seize_price.clone(), upper: seize_price });
    }
    let request = AttestationRequest { symbols, edges };

    let Some(prices_to_report) = ctx.price_ledger.get_postable_format(&request).await else {
        return Ok(None); // StaleAttestation: dropped, not an error (section 7)
    };

    Ok(Some(LiquidationCandidate {
        address,
        repay_market: repay.market,
        seize_market: seize.market,
        prices_to_report,
        expected_revenue_eth,
    }))
}
