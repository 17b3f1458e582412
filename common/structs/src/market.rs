use std::fmt;

/// Opaque identifier for one of the watched set's cToken markets. The spec
/// treats this as an index into a fixed, compile/config-time enumeration
/// (section 3) rather than anything derived on the fly, so a thin `u32`
/// newtype is all the indirection this layer needs — the mapping from
/// `MarketId` to a real cToken contract address lives with the
/// `MarketRegistry` collaborator, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarketId(pub u32);

impl fmt::Display for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "market#{}", self.0)
    }
}

impl From<u32> for MarketId {
    fn from(value: u32) -> Self {
        MarketId(value)
    }
}
