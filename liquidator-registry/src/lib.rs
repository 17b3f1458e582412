//! The stateful half of the core (section 2): `BorrowIndexTable`,
//! `EventApplier`, and `BorrowerRegistry`. Pure evaluation lives one crate
//! over, in `liquidator-evaluator` — this crate owns the mutable replica and
//! the concurrency discipline around it (section 5).

mod applier;
mod index_table;
mod registry;

pub use applier::{apply_accrue_interest, EventApplier};
pub use index_table::BorrowIndexTable;
pub use registry::BorrowerRegistry;
