//! Main runtime with Tokio: wires the intake channel, the ingestion
//! service, the metrics listener, and the demo notification feed.

mod feed;

use std::process;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use config::ConfigError;
use log::error;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use core_types::AppConfig;
use feed::{FeedHalt, NotificationFeed};
use metrics::Metrics;
use sale_ingestion_service::{ReportSink, SaleIngestionService};
use sales_engine::{AdjustmentReport, SalesEngine, SalesReport};

const INTAKE_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Error)]
enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ingestion task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Prints report summaries to stdout, standing in for a real delivery sink.
struct ConsoleReportSink;

impl ReportSink for ConsoleReportSink {
    fn sale_report(&self, report: &SalesReport) {
        print!("{report}");
    }

    fn adjustment_report(&self, report: &AdjustmentReport) {
        print!("{report}");
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    if let Err(err) = run().await {
        eprintln!("sales-processor failed: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let engine = Arc::new(SalesEngine::new());
    let metrics = Arc::new(Metrics::new());
    let halted = Arc::new(AtomicBool::new(false));

    let service = SaleIngestionService::new(
        engine.clone(),
        &config.ingest,
        Arc::new(ConsoleReportSink),
        Arc::new(FeedHalt::new(halted.clone())),
        metrics.clone(),
    );
    metrics.register_service_status(service.status_handle());

    let listener = TcpListener::bind(&config.metrics.listen_addr).await?;
    println!(
        "sales-processor booted; ceiling={}, report_interval={}, metrics on {}",
        config.ingest.message_ceiling, config.ingest.report_interval, config.metrics.listen_addr
    );
    {
        let metrics = metrics.clone();
        tokio::spawn(async move {
            if let Err(err) = metrics.serve(listener).await {
                error!("metrics server error: {err}");
            }
        });
    }

    let (tx, rx) = mpsc::channel(INTAKE_CHANNEL_CAPACITY);
    let service_handle = service.start(rx);

    let feed = NotificationFeed::new(tx, halted, config.feed.extra_messages);
    feed.run().await;

    service_handle.await?;
    println!(
        "intake finished: {} messages consumed, {} sales and {} adjustments recorded",
        metrics.ingested_messages(),
        metrics.recorded_sales(),
        metrics.recorded_adjustments()
    );
    Ok(())
}
