//! Scale constants shared by the fixed-point type and the market math that
//! consumes it. Kept as a leaf crate so nothing else in the workspace needs
//! to depend on `common-fixed-point` just to know, say, how many fractional
//! digits a `FixedPoint` carries.

/// Number of base-10 fractional digits `FixedPoint` preserves internally.
/// Section 4.1 of the spec requires at least 40; we don't trim beyond that
/// since the whole point is exactness through `borrowIndex / indexAtPrincipal`
/// ratios where both operands can already exceed 1e18.
pub const FIXED_POINT_PRECISION: u32 = 40;

/// Conventional decimals for an underlying ERC-20 asset (e.g. wrapped ETH,
/// USDC uses 6 and is handled by passing the market's actual decimals, this
/// is only the fallback assumed by test fixtures).
pub const DEFAULT_UNDERLYING_DECIMALS: u32 = 18;

/// Conventional decimals for a cToken balance.
pub const CTOKEN_DECIMALS: u32 = 8;
