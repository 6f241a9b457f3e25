// Copyright (c) James Kassemi, SC, US. All rights reserved.
//! Prometheus metrics. hyper v1.+

use std::error::Error;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use core_types::status::{OverallStatus, ServiceStatusHandle, ServiceStatusSnapshot};
use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper::Response;
use hyper_util::rt::TokioIo;
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use tokio::net::TcpListener;

/// Intake counters plus per-service status gauges, exposed on `/metrics`.
/// Counters are plain atomics; gauges are refreshed from them at scrape time
/// so the registry never lags the consumption path.
pub struct Metrics {
    registry: Registry,
    ingested_messages: AtomicU64,
    recorded_sales: AtomicU64,
    recorded_adjustments: AtomicU64,
    emitted_reports: AtomicU64,
    intake_gauges: GaugeVec,
    service_gauges: GaugeVec,
    service_statuses: Mutex<Vec<ServiceStatusHandle>>,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let intake_gauges = GaugeVec::new(
            Opts::new("intake_gauge", "Counters from the sale intake path"),
            &["metric"],
        )
        .unwrap();
        let service_gauges = GaugeVec::new(
            Opts::new(
                "service_gauge",
                "Status gauges exposed by orchestrator-managed components",
            ),
            &["service", "metric"],
        )
        .unwrap();
        registry.register(Box::new(intake_gauges.clone())).unwrap();
        registry.register(Box::new(service_gauges.clone())).unwrap();
        Self {
            registry,
            ingested_messages: AtomicU64::new(0),
            recorded_sales: AtomicU64::new(0),
            recorded_adjustments: AtomicU64::new(0),
            emitted_reports: AtomicU64::new(0),
            intake_gauges,
            service_gauges,
            service_statuses: Mutex::new(Vec::new()),
        }
    }

    pub fn inc_messages(&self, n: u64) {
        self.ingested_messages.fetch_add(n, Ordering::Relaxed);
    }
    pub fn inc_sales(&self, n: u64) {
        self.recorded_sales.fetch_add(n, Ordering::Relaxed);
    }
    pub fn inc_adjustments(&self, n: u64) {
        self.recorded_adjustments.fetch_add(n, Ordering::Relaxed);
    }
    pub fn inc_reports(&self, n: u64) {
        self.emitted_reports.fetch_add(n, Ordering::Relaxed);
    }

    pub fn ingested_messages(&self) -> u64 {
        self.ingested_messages.load(Ordering::Relaxed)
    }
    pub fn recorded_sales(&self) -> u64 {
        self.recorded_sales.load(Ordering::Relaxed)
    }
    pub fn recorded_adjustments(&self) -> u64 {
        self.recorded_adjustments.load(Ordering::Relaxed)
    }
    pub fn emitted_reports(&self) -> u64 {
        self.emitted_reports.load(Ordering::Relaxed)
    }

    pub fn register_service_status(&self, handle: ServiceStatusHandle) {
        self.service_statuses.lock().unwrap().push(handle);
    }

    pub fn service_status_snapshots(&self) -> Vec<ServiceStatusSnapshot> {
        self.service_statuses
            .lock()
            .unwrap()
            .iter()
            .map(|handle| handle.snapshot())
            .collect()
    }

    fn refresh_gauges(&self) {
        self.intake_gauges
            .with_label_values(&["ingested_messages"])
            .set(self.ingested_messages() as f64);
        self.intake_gauges
            .with_label_values(&["recorded_sales"])
            .set(self.recorded_sales() as f64);
        self.intake_gauges
            .with_label_values(&["recorded_adjustments"])
            .set(self.recorded_adjustments() as f64);
        self.intake_gauges
            .with_label_values(&["emitted_reports"])
            .set(self.emitted_reports() as f64);

        for snapshot in self.service_status_snapshots() {
            let level = match snapshot.overall {
                OverallStatus::Ok => 0.0,
                OverallStatus::Warn => 1.0,
                OverallStatus::Crit => 2.0,
            };
            self.service_gauges
                .with_label_values(&[snapshot.name.as_str(), "overall"])
                .set(level);
            if let Some(progress) = snapshot.progress {
                self.service_gauges
                    .with_label_values(&[snapshot.name.as_str(), "processed"])
                    .set(progress.processed as f64);
                self.service_gauges
                    .with_label_values(&[snapshot.name.as_str(), "ceiling"])
                    .set(progress.ceiling as f64);
            }
        }
    }

    pub fn render(&self) -> Vec<u8> {
        self.refresh_gauges();
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap();
        buffer
    }

    async fn handle_metrics(
        &self,
        _req: Request<Incoming>,
    ) -> Result<Response<Full<Bytes>>, std::convert::Infallible> {
        Ok(Response::new(Full::new(Bytes::from(self.render()))))
    }

    pub async fn serve(
        self: &std::sync::Arc<Self>,
        listener: TcpListener,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        loop {
            let (socket, _) = listener.accept().await?;
            let io = TokioIo::new(socket);
            let metrics = self.clone();
            let service = service_fn(move |req| {
                let metrics = metrics.clone();
                async move { metrics.handle_metrics(req).await }
            });
            tokio::spawn(async move {
                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    eprintln!("Error serving connection: {:?}", err);
                }
            });
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
