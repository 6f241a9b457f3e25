// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! Admission-controlled consumption of sale notifications.
//!
//! [`IngestionController`] is the synchronous state machine; this crate's
//! service wrapper owns it, drains an intake channel one notification at a
//! time, and exposes health through a [`ServiceStatusHandle`].

use std::sync::Arc;

use log::info;
use metrics::Metrics;
use tokio::sync::mpsc;

use core_types::config::IngestConfig;
use core_types::status::{OverallStatus, ServiceStatusHandle};
use core_types::types::SaleNotification;
use sales_engine::SalesEngine;

pub mod controller;
pub mod sink;

pub use controller::{IngestionController, IntakePhase};
pub use sink::{IntakeHalt, ReportSink};

pub struct SaleIngestionService {
    controller: IngestionController,
    status: ServiceStatusHandle,
}

impl SaleIngestionService {
    pub fn new(
        engine: Arc<SalesEngine>,
        config: &IngestConfig,
        sink: Arc<dyn ReportSink>,
        halt: Arc<dyn IntakeHalt>,
        metrics: Arc<Metrics>,
    ) -> Self {
        let status = ServiceStatusHandle::new("sale_ingestion");
        status.set_overall(OverallStatus::Warn);
        status.push_warning("sale intake not started");
        Self {
            controller: IngestionController::new(engine, config, sink, halt, metrics),
            status,
        }
    }

    pub fn status_handle(&self) -> ServiceStatusHandle {
        self.status.clone()
    }

    pub fn start(self, rx: mpsc::Receiver<SaleNotification>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move { self.run(rx).await })
    }

    async fn run(mut self, mut rx: mpsc::Receiver<SaleNotification>) {
        self.status.clear_warnings_matching(|_| true);
        self.status.set_overall(OverallStatus::Ok);
        self.status
            .set_progress(0, self.controller.message_ceiling() as u64);

        while let Some(notification) = rx.recv().await {
            let was_accepting = self.controller.phase() == IntakePhase::Accepting;
            self.controller.process(&notification);
            self.status.set_progress(
                self.controller.processed() as u64,
                self.controller.message_ceiling() as u64,
            );
            if was_accepting && self.controller.phase() == IntakePhase::Saturated {
                self.status.set_overall(OverallStatus::Warn);
                self.status
                    .push_warning("message ceiling reached; intake halted");
            }
        }
        info!("sale intake channel closed; ingestion loop exiting");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sales_engine::{AdjustmentReport, SalesReport};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NullSink;

    impl ReportSink for NullSink {
        fn sale_report(&self, _report: &SalesReport) {}
        fn adjustment_report(&self, _report: &AdjustmentReport) {}
    }

    #[derive(Default)]
    struct CountingHalt {
        halts: AtomicUsize,
    }

    impl IntakeHalt for CountingHalt {
        fn halt_intake(&self) {
            self.halts.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn service_drains_the_channel_and_reports_progress() {
        let engine = Arc::new(SalesEngine::new());
        let halt = Arc::new(CountingHalt::default());
        let config = IngestConfig {
            report_interval: 10,
            message_ceiling: 50,
        };
        let service = SaleIngestionService::new(
            engine.clone(),
            &config,
            Arc::new(NullSink),
            halt.clone(),
            Arc::new(Metrics::new()),
        );
        let status = service.status_handle();

        let (tx, rx) = mpsc::channel(8);
        let handle = service.start(rx);
        for _ in 0..3 {
            tx.send(SaleNotification::sale("Apple", "0.20", 2))
                .await
                .unwrap();
        }
        drop(tx);
        handle.await.unwrap();

        assert_eq!(engine.fetch_sales_for("Apple").len(), 6);
        let snapshot = status.snapshot();
        assert_eq!(snapshot.overall, OverallStatus::Ok);
        assert_eq!(snapshot.progress.unwrap().processed, 3);
        assert_eq!(halt.halts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn saturation_flips_the_service_status_to_warn() {
        let engine = Arc::new(SalesEngine::new());
        let halt = Arc::new(CountingHalt::default());
        let config = IngestConfig {
            report_interval: 2,
            message_ceiling: 2,
        };
        let service = SaleIngestionService::new(
            engine.clone(),
            &config,
            Arc::new(NullSink),
            halt.clone(),
            Arc::new(Metrics::new()),
        );
        let status = service.status_handle();

        let (tx, rx) = mpsc::channel(8);
        let handle = service.start(rx);
        for _ in 0..4 {
            tx.send(SaleNotification::sale("Apple", "0.20", 1))
                .await
                .unwrap();
        }
        drop(tx);
        handle.await.unwrap();

        assert_eq!(engine.fetch_sales_for("Apple").len(), 2);
        let snapshot = status.snapshot();
        assert_eq!(snapshot.overall, OverallStatus::Warn);
        assert!(snapshot
            .warnings
            .iter()
            .any(|w| w.contains("ceiling reached")));
        assert_eq!(halt.halts.load(Ordering::SeqCst), 1);
    }
}
