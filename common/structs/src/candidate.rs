use common_fixed_point::FixedPoint;

use crate::market::MarketId;
use crate::Address;

/// Acceptable on-chain posting range for one symbol's price (section 3's
/// `PostableAttestations` is left opaque by the spec; this is the minimal
/// shape `HealthEvaluator` needs to ask `PriceLedger::get_postable_format`
/// for a posting — see `SPEC_FULL.md` section 3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceBound {
    pub lower: FixedPoint,
    pub upper: FixedPoint,
}

/// The symbols and acceptable bounds a scan needs attested on-chain before a
/// liquidation call for one account can be submitted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttestationRequest {
    pub symbols: Vec<String>,
    pub edges: Vec<PriceBound>,
}

/// Opaque signed oracle payload returned by `PriceLedger::get_postable_format`.
/// Nothing in this core inspects the bytes; they are carried through to the
/// executor untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostableAttestations(pub Vec<u8>);

/// One actionable liquidation opportunity produced by a scan (section 3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidationCandidate {
    pub address: Address,
    pub repay_market: MarketId,
    pub seize_market: MarketId,
    pub prices_to_report: PostableAttestations,
    pub expected_revenue_eth: FixedPoint,
}
