use std::sync::Arc;

use log::{debug, info, warn};
use metrics::Metrics;
use rust_decimal::Decimal;

use core_types::config::IngestConfig;
use core_types::types::{AdjustmentOperation, SaleNotification};
use sales_engine::SalesEngine;

use crate::sink::{IntakeHalt, ReportSink};

/// Observable admission state. The transition to `Saturated` happens exactly
/// once, on the step that drives the processed count to the ceiling, and is
/// terminal for the life of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakePhase {
    Accepting,
    Saturated,
}

/// Admission-controlled consumption loop. Processes one notification to
/// completion at a time; the processed count moves only here, never exceeds
/// the ceiling, and is never reset.
pub struct IngestionController {
    engine: Arc<SalesEngine>,
    report_interval: u32,
    message_ceiling: u32,
    sink: Arc<dyn ReportSink>,
    halt: Arc<dyn IntakeHalt>,
    metrics: Arc<Metrics>,
    processed: u32,
    phase: IntakePhase,
}

impl IngestionController {
    pub fn new(
        engine: Arc<SalesEngine>,
        config: &IngestConfig,
        sink: Arc<dyn ReportSink>,
        halt: Arc<dyn IntakeHalt>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            engine,
            report_interval: config.report_interval.max(1),
            message_ceiling: config.message_ceiling.max(1),
            sink,
            halt,
            metrics,
            processed: 0,
            phase: IntakePhase::Accepting,
        }
    }

    pub fn phase(&self) -> IntakePhase {
        self.phase
    }

    pub fn processed(&self) -> u32 {
        self.processed
    }

    pub fn message_ceiling(&self) -> u32 {
        self.message_ceiling
    }

    /// Consumes one inbound notification. While saturated this is a complete
    /// no-op, safe under repeated delivery. Engine failures are contained
    /// here: a bad notification degrades to a partial or empty effect but
    /// still counts against the ceiling.
    pub fn process(&mut self, notification: &SaleNotification) {
        if self.phase == IntakePhase::Saturated {
            debug!("intake saturated; ignoring {notification:?}");
            return;
        }
        info!("received sale notification {notification:?}");

        self.record_sales(notification);
        self.record_adjustment(notification);

        self.processed += 1;
        self.metrics.inc_messages(1);
        debug!("consumed notification {}/{}", self.processed, self.message_ceiling);

        if self.processed % self.report_interval == 0 {
            self.sink.sale_report(&self.engine.sales_report());
            self.metrics.inc_reports(1);
        }

        if self.processed >= self.message_ceiling {
            info!("message ceiling reached; halting intake");
            self.sink.adjustment_report(&self.engine.adjustment_report());
            self.metrics.inc_reports(1);
            self.halt.halt_intake();
            self.phase = IntakePhase::Saturated;
        }
    }

    fn record_sales(&self, notification: &SaleNotification) {
        if notification.occurrences < 1 || notification.product_type.trim().is_empty() {
            warn!("skipping sale recording for {notification:?}: invalid details");
            return;
        }
        let value = match notification.sale_value.parse::<Decimal>() {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    "skipping sale recording for {notification:?}: bad sale value: {err}"
                );
                return;
            }
        };
        let mut recorded = 0u64;
        for _ in 0..notification.occurrences {
            match self.engine.record_sale(&notification.product_type, value) {
                Ok(_) => recorded += 1,
                Err(err) => {
                    warn!("failed to record sale for {notification:?}: {err}");
                    break;
                }
            }
        }
        self.metrics.inc_sales(recorded);
    }

    fn record_adjustment(&self, notification: &SaleNotification) {
        let Some(op_name) = notification.adjustment_operation.as_deref() else {
            return;
        };
        if op_name.trim().is_empty() {
            return;
        }
        let operation = match op_name.parse::<AdjustmentOperation>() {
            Ok(operation) => operation,
            Err(err) => {
                warn!("ignoring adjustment on {notification:?}: {err}");
                return;
            }
        };
        let Some(raw_magnitude) = notification.adjustment_value.as_deref() else {
            warn!("ignoring {operation} adjustment on {notification:?}: no magnitude");
            return;
        };
        let magnitude = match raw_magnitude.parse::<Decimal>() {
            Ok(magnitude) => magnitude,
            Err(err) => {
                warn!("ignoring {operation} adjustment on {notification:?}: bad magnitude: {err}");
                return;
            }
        };
        match self
            .engine
            .record_adjustment(&notification.product_type, operation, magnitude)
        {
            Ok(_) => self.metrics.inc_adjustments(1),
            Err(err) => warn!("failed to record adjustment for {notification:?}: {err}"),
        }
    }
}
