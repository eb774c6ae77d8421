//! I/O for simulation results.
//!
//! Every completed run adds one row to a CSV ledger. The ledger is created
//! with its header on first use and only ever appended to afterwards.

/// Append-only CSV ledger of run results.
///
/// Provides the result row type, the create-or-append writer and a parser
/// that reads the rows back for summaries and tests.
pub mod ledger;

pub use ledger::{Ledger, ResultRow, needs_header};
