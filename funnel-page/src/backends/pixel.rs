//! Pixel-style advertising backend
//!
//! Gated by an initialization flag and a fixed standard-event whitelist.
//! Non-standard names are dropped for this backend and logged as blocked
//! by the dispatcher; they are never forwarded as freeform events.

use crate::dispatch::AnalyticsBackend;
use funnel_common::events::AnalyticsEvent;
use funnel_common::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tracing::info;

/// Standard event names the pixel platform accepts
pub const PIXEL_STANDARD_EVENTS: &[&str] = &[
    "Purchase",
    "Lead",
    "CompleteRegistration",
    "AddToCart",
    "InitiateCheckout",
    "ViewContent",
];

/// Adapter for the pixel script's `track(eventName, properties)` call.
pub struct PixelBackend {
    ready: AtomicBool,
    sink: mpsc::UnboundedSender<AnalyticsEvent>,
}

impl PixelBackend {
    /// Create an uninitialized pixel adapter writing to `sink`
    pub fn new(sink: mpsc::UnboundedSender<AnalyticsEvent>) -> Self {
        Self {
            ready: AtomicBool::new(false),
            sink,
        }
    }

    /// Mark the pixel script as loaded and initialized
    pub fn mark_initialized(&self) {
        if !self.ready.swap(true, Ordering::SeqCst) {
            info!("Pixel backend initialized");
        }
    }
}

impl AnalyticsBackend for PixelBackend {
    fn name(&self) -> &str {
        "pixel"
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn accepts(&self, event_name: &str) -> bool {
        PIXEL_STANDARD_EVENTS.contains(&event_name)
    }

    fn send(&self, event: &AnalyticsEvent) -> Result<()> {
        self.sink.send(event.clone()).map_err(|_| Error::Backend {
            backend: "pixel".to_string(),
            reason: "pixel client gone".to_string(),
        })
    }
}
