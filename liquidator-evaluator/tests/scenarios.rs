//! Concrete health-evaluation scenarios (section 8).

use std::collections::HashMap;

use async_trait::async_trait;
use common_fixed_point::FixedPoint;
use common_structs::{Address, AttestationRequest, BorrowerState, MarketId, PostableAttestations};
use liquidator_chain::{MarketRegistry, PriceLedger};
use liquidator_evaluator::{evaluate, ScanContext};

struct FixedParameters {
    collateral_factor: FixedPoint,
    close_factor: FixedPoint,
    liquidation_incentive: FixedPoint,
    collateral_markets: Vec<MarketId>,
}

impl MarketRegistry for FixedParameters {
    fn collateral_factor(&self, _market: MarketId) -> FixedPoint {
        self.collateral_factor.clone()
    }
    fn close_factor(&self) -> FixedPoint {
        self.close_factor.clone()
    }
    fn liquidation_incentive(&self) -> FixedPoint {
        self.liquidation_incentive.clone()
    }
    fn is_collateral(&self, _address: &Address, market: MarketId) -> bool {
        self.collateral_markets.contains(&market)
    }
    fn symbol(&self, market: MarketId) -> String {
        format!("SYM{}", market.0)
    }
}

struct FixedLedger {
    prices: HashMap<MarketId, FixedPoint>,
}

#[async_trait]
impl PriceLedger for FixedLedger {
    fn price(&self, market: MarketId) -> Option<FixedPoint> {
        self.prices.get(&market).cloned()
    }
    async fn get_postable_format(&self, _request: &AttestationRequest) -> Option<PostableAttestations> {
        Some(PostableAttestations(vec![0xAA]))
    }
}

fn fp(s: &str) -> FixedPoint {
    FixedPoint::from_decimal_str(s).unwrap()
}

fn watched_address() -> Address {
    Address::from([0x42u8; 20])
}

#[tokio::test]
async fn s1_healthy_borrower_is_not_a_candidate() {
    let m = MarketId(1);
    let mut state = BorrowerState::new();
    state.set_supplied(m, fp("100"));
    state.set_borrow(m, fp("1"), fp("1"));

    let index_table = HashMap::from([(m, fp("1"))]);
    let exchange_rate = HashMap::from([(m, fp("0.02"))]);
    let registry = FixedParameters {
        collateral_factor: fp("0.75"),
        close_factor: fp("0.5"),
        liquidation_incentive: fp("1.08"),
        collateral_markets: vec![m],
    };
    let ledger = FixedLedger { prices: HashMap::from([(m, fp("1"))]) };
    let ctx = ScanContext {
        current_borrow_index: &index_table,
        exchange_rate: &exchange_rate,
        market_registry: &registry,
        price_ledger: &ledger,
    };

    // supplyEth = 2.0, collateralEth = 1.5, borrowEth = 1.0, health = 1.5.
    let result = evaluate(watched_address(), &state, &ctx).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn s2_underwater_borrower_yields_a_single_market_candidate() {
    let m = MarketId(1);
    let mut state = BorrowerState::new();
    state.set_supplied(m, fp("100"));
    state.set_borrow(m, fp("2"), fp("1"));

    let index_table = HashMap::from([(m, fp("1"))]);
    let exchange_rate = HashMap::from([(m, fp("0.02"))]);
    let registry = FixedParameters {
        collateral_factor: fp("0.75"),
        close_factor: fp("0.5"),
        liquidation_incentive: fp("1.08"),
        collateral_markets: vec![m],
    };
    let ledger = FixedLedger { prices: HashMap::from([(m, fp("1"))]) };
    let ctx = ScanContext {
        current_borrow_index: &index_table,
        exchange_rate: &exchange_rate,
        market_registry: &registry,
        price_ledger: &ledger,
    };

    // borrowEth = 2.0, health = 0.75 -> candidate with repay == seize == m.
    let candidate = evaluate(watched_address(), &state, &ctx).await.unwrap().unwrap();
    assert_eq!(candidate.repay_market, m);
    assert_eq!(candidate.seize_market, m);
    assert!(candidate.expected_revenue_eth > FixedPoint::zero());
}

#[tokio::test]
async fn s3_accrual_alone_can_produce_a_candidate() {
    let m = MarketId(1);
    let mut state = BorrowerState::new();
    state.set_supplied(m, fp("100"));
    // Same principal as S1, written against index 1; only the current index
    // moves, with no new Borrow event involved.
    state.set_borrow(m, fp("1"), fp("1"));

    let index_table = HashMap::from([(m, fp("2"))]);
    let exchange_rate = HashMap::from([(m, fp("0.02"))]);
    let registry = FixedParameters {
        collateral_factor: fp("0.75"),
        close_factor: fp("0.5"),
        liquidation_incentive: fp("1.08"),
        collateral_markets: vec![m],
    };
    let ledger = FixedLedger { prices: HashMap::from([(m, fp("1"))]) };
    let ctx = ScanContext {
        current_borrow_index: &index_table,
        exchange_rate: &exchange_rate,
        market_registry: &registry,
        price_ledger: &ledger,
    };

    let candidate = evaluate(watched_address(), &state, &ctx).await.unwrap();
    assert!(candidate.is_some());
}

#[tokio::test]
async fn s5_seize_market_follows_eth_value_not_ctoken_balance() {
    let m1 = MarketId(1);
    let m2 = MarketId(2);
    let mut state = BorrowerState::new();
    // m1 holds a huge cToken balance but a tiny exchange rate and price.
    state.set_supplied(m1, fp("1000000"));
    // m2 holds far fewer cTokens but is worth much more per unit.
    state.set_supplied(m2, fp("10"));
    state.set_borrow(m1, fp("100"), fp("1"));

    let index_table = HashMap::from([(m1, fp("1")), (m2, fp("1"))]);
    let exchange_rate = HashMap::from([(m1, fp("0.0000001")), (m2, fp("1"))]);
    let registry = FixedParameters {
        collateral_factor: fp("0.75"),
        close_factor: fp("0.5"),
        liquidation_incentive: fp("1.08"),
        collateral_markets: vec![m1, m2],
    };
    let ledger = FixedLedger { prices: HashMap::from([(m1, fp("1")), (m2, fp("100"))]) };
    let ctx = ScanContext {
        current_borrow_index: &index_table,
        exchange_rate: &exchange_rate,
        market_registry: &registry,
        price_ledger: &ledger,
    };

    let candidate = evaluate(watched_address(), &state, &ctx).await.unwrap().unwrap();
    assert_eq!(candidate.seize_market, m2);
}
