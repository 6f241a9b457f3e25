// Copyright (c) James Kassemi, SC, US. All rights reserved.

use sales_engine::{AdjustmentReport, SalesReport};

/// Receives the engine's textual summaries. Formatting and delivery are the
/// implementor's concern; the consumption loop only decides when to emit.
pub trait ReportSink: Send + Sync {
    fn sale_report(&self, report: &SalesReport);
    fn adjustment_report(&self, report: &AdjustmentReport);
}

/// Advisory stop signal to the upstream transport. Called at most once per
/// controller lifetime; in-flight deliveries may still arrive afterwards.
pub trait IntakeHalt: Send + Sync {
    fn halt_intake(&self);
}
