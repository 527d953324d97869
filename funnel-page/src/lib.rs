//! # Funnel Page Runtime
//!
//! Page-controller runtime for the funnel:
//! - Analytics backend adapters and the fan-out event dispatcher
//! - Content reveal gate (timer / admin override / env bypass / CTA)
//! - Administrative session flag with fixed TTL
//! - Bounded readiness polling and the external video player loader
//! - The page controller composing all of the above for one page lifetime

pub mod backends;
pub mod controller;
pub mod dispatch;
pub mod poll;
pub mod reveal;
pub mod session;
pub mod video;

pub use controller::PageController;
pub use dispatch::{AnalyticsBackend, EventDispatcher};
