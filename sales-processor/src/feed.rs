use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::info;
use tokio::sync::mpsc;

use core_types::types::SaleNotification;
use sale_ingestion_service::IntakeHalt;

/// Shared stop flag between the consumption side and the feed. The halt is
/// advisory: the feed checks it between sends, so a few in-flight
/// notifications may still be delivered after it is raised.
pub struct FeedHalt {
    halted: Arc<AtomicBool>,
}

impl FeedHalt {
    pub fn new(halted: Arc<AtomicBool>) -> Self {
        Self { halted }
    }
}

impl IntakeHalt for FeedHalt {
    fn halt_intake(&self) {
        info!("halt requested; notification feed will stop publishing");
        self.halted.store(true, Ordering::SeqCst);
    }
}

/// Demo publisher standing in for the external broker: a handful of mixed
/// notifications followed by a burst of single-sale repeats, enough to drive
/// the controller past its ceiling.
pub struct NotificationFeed {
    tx: mpsc::Sender<SaleNotification>,
    halted: Arc<AtomicBool>,
    extra_messages: u32,
}

impl NotificationFeed {
    pub fn new(
        tx: mpsc::Sender<SaleNotification>,
        halted: Arc<AtomicBool>,
        extra_messages: u32,
    ) -> Self {
        Self {
            tx,
            halted,
            extra_messages,
        }
    }

    pub async fn run(self) {
        let mut notifications = demo_notifications();
        notifications.extend(
            std::iter::repeat_with(|| SaleNotification::sale("Apple", "0.20", 1))
                .take(self.extra_messages as usize),
        );

        let mut published = 0u32;
        for notification in notifications {
            if self.halted.load(Ordering::SeqCst) {
                info!("feed stopping after {published} notifications: intake halted");
                return;
            }
            if self.tx.send(notification).await.is_err() {
                info!("feed stopping after {published} notifications: intake channel closed");
                return;
            }
            published += 1;
        }
        info!("feed exhausted after {published} notifications");
    }
}

fn demo_notifications() -> Vec<SaleNotification> {
    vec![
        SaleNotification::sale("Apple", "0.20", 1),
        SaleNotification::sale("Banana", "0.20", 5),
        SaleNotification::with_adjustment("Apple", "0.20", 1, "ADD", "0.10"),
        SaleNotification::with_adjustment("Banana", "0.20", 2, "SUBTRACT", "0.10"),
        SaleNotification::with_adjustment("Apple", "0.20", 3, "MULTIPLY", "0.10"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn feed_stops_once_the_halt_flag_is_raised() {
        let halted = Arc::new(AtomicBool::new(false));
        let (tx, mut rx) = mpsc::channel(64);
        let feed = NotificationFeed::new(tx, halted.clone(), 50);

        halted.store(true, Ordering::SeqCst);
        feed.run().await;

        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn feed_publishes_the_demo_set_and_the_burst() {
        let halted = Arc::new(AtomicBool::new(false));
        let (tx, mut rx) = mpsc::channel(64);
        let feed = NotificationFeed::new(tx, halted, 3);

        feed.run().await;

        let mut received = Vec::new();
        while let Some(notification) = rx.recv().await {
            received.push(notification);
        }
        assert_eq!(received.len(), 8);
        assert_eq!(received[1].product_type, "Banana");
        assert_eq!(received[1].occurrences, 5);
        assert_eq!(received[2].adjustment_operation.as_deref(), Some("ADD"));
    }
}
