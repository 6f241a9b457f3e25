//! Sales/adjustment state engine.
//!
//! The crate exposes:
//! - [`SalesEngine`]: high-level API validating product types and
//!   orchestrating ledger mutations.
//! - [`CategoryLedger`]: per-product-type in-memory store shared by sales
//!   and adjustments.
//! - [`SalesReport`] / [`AdjustmentReport`]: deterministic read-only
//!   summaries handed to a reporting sink.

pub mod engine;
pub mod error;
pub mod ledger;
pub mod report;

pub use engine::{IdAllocator, SalesEngine};
pub use error::{EngineError, Result};
pub use ledger::CategoryLedger;
pub use report::{AdjustmentReport, AdjustmentReportLine, SalesReport, SalesReportLine};
