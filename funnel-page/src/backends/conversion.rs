//! Generic conversion-tracking backend
//!
//! Exposes the same `track(eventName, properties)` shape as the pixel but
//! with no whitelist restriction: every semantic event is forwarded.

use crate::dispatch::AnalyticsBackend;
use funnel_common::events::AnalyticsEvent;
use funnel_common::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;

/// Adapter for the generic conversion tracker.
pub struct ConversionBackend {
    ready: AtomicBool,
    sink: mpsc::UnboundedSender<AnalyticsEvent>,
}

impl ConversionBackend {
    pub fn new(sink: mpsc::UnboundedSender<AnalyticsEvent>) -> Self {
        Self {
            ready: AtomicBool::new(false),
            sink,
        }
    }

    pub fn mark_initialized(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }
}

impl AnalyticsBackend for ConversionBackend {
    fn name(&self) -> &str {
        "conversion"
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    // Default accepts(): no whitelist

    fn send(&self, event: &AnalyticsEvent) -> Result<()> {
        self.sink.send(event.clone()).map_err(|_| Error::Backend {
            backend: "conversion".to_string(),
            reason: "conversion client gone".to_string(),
        })
    }
}
