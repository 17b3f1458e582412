//! Domain types shared by every crate in the liquidation core: account and
//! market identifiers, the event payloads the applier consumes, the
//! borrower's in-memory position, and the candidate a scan produces.

mod candidate;
mod event;
mod market;
mod position;

pub use candidate::{AttestationRequest, LiquidationCandidate, PostableAttestations, PriceBound};
pub use event::{EventStatus, MarketEvent, MarketEventKind};
pub use market::MarketId;
pub use position::BorrowerState;

/// 20-byte EVM account/contract identifier. `alloy_primitives::Address`
/// compares and hashes over its raw bytes, so two addresses that differ only
/// in the checksum-casing of their hex representation are already equal —
/// the canonicalization spec.md section 3 asks for falls out of using a byte
/// representation instead of a string one.
pub type Address = alloy_primitives::Address;
