//! Event types for the funnel event system
//!
//! Provides shared event definitions and the `EventBus` used to observe
//! everything the pipeline does: analytics dispatches, blocked events,
//! reveal transitions, video loader outcomes. The bus is observational
//! only; no component changes behavior based on who is subscribed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Standard semantic event names.
pub mod names {
    pub const PURCHASE: &str = "Purchase";
    pub const LEAD: &str = "Lead";
    pub const COMPLETE_REGISTRATION: &str = "CompleteRegistration";
    pub const ADD_TO_CART: &str = "AddToCart";
    pub const INITIATE_CHECKOUT: &str = "InitiateCheckout";
    pub const VIEW_CONTENT: &str = "ViewContent";
    /// Video started playing; fired at most once per page lifetime
    pub const VIDEO_PLAY: &str = "VideoPlay";
}

/// A semantic conversion/engagement event bound for analytics backends.
///
/// `value`/`currency` are attached only when the caller provides them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl AnalyticsEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            currency: None,
        }
    }

    pub fn with_value(name: impl Into<String>, value: f64, currency: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
            currency: Some(currency.into()),
        }
    }
}

/// Why gated content was revealed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealReason {
    /// Fixed wall-clock delay since page mount elapsed
    Timer,
    /// Unexpired administrative session requested reveal
    AdminOverride,
    /// Page is running on a recognized development host
    EnvBypass,
    /// Explicit user-initiated call to action
    CallToAction,
}

/// Declarative scroll-and-highlight command for the view layer.
///
/// The view tries the selectors in order and applies the highlight to the
/// first match; no match is a logged no-op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollCommand {
    /// Candidate selectors for the primary purchase element, in priority order
    pub selectors: Vec<String>,
    /// How long the highlight effect should run
    pub highlight_ms: u64,
}

/// Funnel event types
///
/// Events are broadcast via `EventBus` so the driver binary and tests can
/// observe pipeline activity without reaching into component internals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FunnelEvent {
    /// An analytics event was handed to a backend
    AnalyticsDispatched {
        /// Backend that received the event
        backend: String,
        /// The dispatched event
        event: AnalyticsEvent,
        /// When dispatch happened
        timestamp: DateTime<Utc>,
    },

    /// A backend's whitelist rejected an event name.
    ///
    /// The event is dropped for that backend only; it is never forwarded
    /// as a freeform/custom event.
    AnalyticsBlocked {
        /// Backend whose whitelist rejected the name
        backend: String,
        /// Rejected event name
        event_name: String,
        /// When the event was blocked
        timestamp: DateTime<Utc>,
    },

    /// A backend dispatch failed; terminal for that event/backend pair
    AnalyticsFailed {
        /// Backend that failed
        backend: String,
        /// Event name that failed to dispatch
        event_name: String,
        /// Failure description
        reason: String,
        /// When the failure occurred
        timestamp: DateTime<Utc>,
    },

    /// Gated content became visible
    ContentRevealed {
        /// Which trigger won
        reason: RevealReason,
        /// Scroll/highlight side effect for the view layer
        scroll: ScrollCommand,
        /// When the transition fired
        timestamp: DateTime<Utc>,
    },

    /// External video player signalled readiness
    VideoPlayerReady {
        /// Poll attempts consumed before readiness
        attempts: u32,
        /// When readiness was detected
        timestamp: DateTime<Utc>,
    },

    /// Video player never became ready within the attempt cap.
    ///
    /// Terminal until the user invokes the manual retry affordance.
    VideoLoadFailed {
        /// Poll attempts consumed
        attempts: u32,
        /// When the loader gave up
        timestamp: DateTime<Utc>,
    },
}

/// Broadcast bus for funnel events.
pub struct EventBus {
    tx: broadcast::Sender<FunnelEvent>,
}

impl EventBus {
    /// Creates a new EventBus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<FunnelEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers.
    ///
    /// No subscribers is fine; the send error is ignored.
    pub fn emit(&self, event: FunnelEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
