//! Analytics event dispatcher
//!
//! Fans a semantic event out to every registered backend without letting
//! any one backend's behavior (unavailability, send failure, whitelist
//! rejection) affect the others. No event is retried; a dropped or failed
//! dispatch is terminal for that event/backend pair.

use funnel_common::events::{AnalyticsEvent, EventBus, FunnelEvent};
use funnel_common::{time, Result};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// An analytics destination (pixel, conversion tracker, heatmap, ...).
///
/// Implementations adapt whatever script/client object the real backend
/// exposes. `send` must not block.
pub trait AnalyticsBackend: Send + Sync {
    /// Stable backend name, used in logs and observational events
    fn name(&self) -> &str;

    /// Whether the backend's client object exists and is initialized.
    /// Unready backends are skipped without error.
    fn is_ready(&self) -> bool;

    /// Event-name whitelist check. Default: accept everything.
    fn accepts(&self, event_name: &str) -> bool {
        let _ = event_name;
        true
    }

    /// Hand the event to the backend
    fn send(&self, event: &AnalyticsEvent) -> Result<()>;
}

/// Fans semantic events out to registered backends.
pub struct EventDispatcher {
    backends: Vec<Arc<dyn AnalyticsBackend>>,
    /// Names already fired through `track_once` this page lifetime
    fired_once: Mutex<HashSet<String>>,
    bus: Arc<EventBus>,
}

impl EventDispatcher {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            backends: Vec::new(),
            fired_once: Mutex::new(HashSet::new()),
            bus,
        }
    }

    /// Register a backend. Dispatch order follows registration order.
    pub fn register(&mut self, backend: Arc<dyn AnalyticsBackend>) {
        self.backends.push(backend);
    }

    /// Dispatch `name` to every ready backend whose whitelist accepts it.
    ///
    /// `value`/`currency` are attached only when provided.
    pub fn track(&self, name: &str, value: Option<f64>, currency: Option<&str>) {
        let event = AnalyticsEvent {
            name: name.to_string(),
            value,
            currency: currency.map(str::to_string),
        };
        self.dispatch(&event);
    }

    /// Dispatch `name` at most once per page lifetime.
    ///
    /// The latch is checked and set under a single lock with no await
    /// point, so concurrently scheduled trigger pathways (timer polling,
    /// player events, click fallbacks) cannot both pass the check.
    /// Returns true if this call performed the dispatch.
    pub fn track_once(&self, name: &str, value: Option<f64>, currency: Option<&str>) -> bool {
        {
            let mut fired = self.fired_once.lock().unwrap();
            if !fired.insert(name.to_string()) {
                debug!("Event '{}' already fired this page lifetime", name);
                return false;
            }
        }
        self.track(name, value, currency);
        true
    }

    fn dispatch(&self, event: &AnalyticsEvent) {
        for backend in &self.backends {
            if !backend.is_ready() {
                debug!("Backend '{}' not ready, skipping '{}'", backend.name(), event.name);
                continue;
            }
            if !backend.accepts(&event.name) {
                warn!(
                    "Backend '{}' blocked non-standard event '{}'",
                    backend.name(),
                    event.name
                );
                self.bus.emit(FunnelEvent::AnalyticsBlocked {
                    backend: backend.name().to_string(),
                    event_name: event.name.clone(),
                    timestamp: time::now(),
                });
                continue;
            }
            // Each backend is isolated: a failure here never stops the next
            match backend.send(event) {
                Ok(()) => {
                    self.bus.emit(FunnelEvent::AnalyticsDispatched {
                        backend: backend.name().to_string(),
                        event: event.clone(),
                        timestamp: time::now(),
                    });
                }
                Err(e) => {
                    warn!("Backend '{}' dispatch failed: {}", backend.name(), e);
                    self.bus.emit(FunnelEvent::AnalyticsFailed {
                        backend: backend.name().to_string(),
                        event_name: event.name.clone(),
                        reason: e.to_string(),
                        timestamp: time::now(),
                    });
                }
            }
        }
    }
}
