//! Heatmap / session-recording backend
//!
//! Fire-and-forget: the script is injected once per page lifetime and has
//! no return contract. Events handed to it are acknowledged and dropped;
//! the recorder observes the session on its own.

use crate::dispatch::AnalyticsBackend;
use funnel_common::events::AnalyticsEvent;
use funnel_common::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

pub struct HeatmapBackend {
    loaded: AtomicBool,
}

impl HeatmapBackend {
    pub fn new() -> Self {
        Self {
            loaded: AtomicBool::new(false),
        }
    }

    /// Inject the recorder script. Load-once: repeated calls are no-ops.
    /// Returns true if this call performed the load.
    pub fn ensure_loaded(&self) -> bool {
        let first = !self.loaded.swap(true, Ordering::SeqCst);
        if first {
            info!("Heatmap recorder loaded");
        }
        first
    }
}

impl Default for HeatmapBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyticsBackend for HeatmapBackend {
    fn name(&self) -> &str {
        "heatmap"
    }

    fn is_ready(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    fn send(&self, event: &AnalyticsEvent) -> Result<()> {
        // No return contract; the recorder captures the session passively
        debug!("Heatmap observed '{}'", event.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_once() {
        let backend = HeatmapBackend::new();
        assert!(!backend.is_ready());
        assert!(backend.ensure_loaded());
        assert!(!backend.ensure_loaded());
        assert!(backend.is_ready());
    }

    #[test]
    fn test_send_is_fire_and_forget() {
        let backend = HeatmapBackend::new();
        backend.ensure_loaded();
        assert!(backend.send(&AnalyticsEvent::new("ViewContent")).is_ok());
    }
}
