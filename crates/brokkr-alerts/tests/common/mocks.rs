//! Mock channel senders for testing without side effects

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use brokkr_alerts::{Alert, AlertKind, Channel, ChannelSender, DeliveryError};

/// Record of a delivery attempt made against a mock sender
#[derive(Clone, Debug)]
pub struct MockDelivery {
    pub destination: String,
    pub kind: AlertKind,
}

/// Mock channel sender with scripted failures
///
/// Records every delivery attempt. By default all sends succeed; failures
/// can be scripted for the next N sends or permanently.
pub struct MockSender {
    channel: Channel,
    deliveries: Mutex<Vec<MockDelivery>>,
    fail_next: AtomicU32,
    fail_always: AtomicBool,
}

impl MockSender {
    pub fn new(channel: Channel) -> Arc<Self> {
        Arc::new(Self {
            channel,
            deliveries: Mutex::new(Vec::new()),
            fail_next: AtomicU32::new(0),
            fail_always: AtomicBool::new(false),
        })
    }

    /// Fail the next `n` sends, then succeed again
    pub fn fail_times(&self, n: u32) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    /// Fail every send from now on
    pub fn fail_always(&self) {
        self.fail_always.store(true, Ordering::SeqCst);
    }

    /// Succeed from now on
    pub fn recover(&self) {
        self.fail_always.store(false, Ordering::SeqCst);
        self.fail_next.store(0, Ordering::SeqCst);
    }

    /// Number of delivery attempts seen so far
    pub fn calls(&self) -> usize {
        self.deliveries.lock().unwrap().len()
    }

    /// Copy of the recorded delivery attempts
    pub fn deliveries(&self) -> Vec<MockDelivery> {
        self.deliveries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChannelSender for MockSender {
    async fn send(&self, destination: &str, alert: &Alert) -> Result<(), DeliveryError> {
        self.deliveries.lock().unwrap().push(MockDelivery {
            destination: destination.to_string(),
            kind: alert.kind,
        });

        if self.fail_always.load(Ordering::SeqCst) {
            return Err(DeliveryError::Rejected {
                channel: self.channel,
                reason: "mock transport down".to_string(),
            });
        }

        let remaining = self.fail_next.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_next.store(remaining - 1, Ordering::SeqCst);
            return Err(DeliveryError::Rejected {
                channel: self.channel,
                reason: "mock transport flapping".to_string(),
            });
        }

        Ok(())
    }
}
