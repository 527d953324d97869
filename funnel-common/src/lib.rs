//! # Funnel Common Library
//!
//! Shared code for the funnel tracking workspace including:
//! - Tracking parameter model and recognized-key filtering
//! - Per-session parameter persistence and merging
//! - Outbound checkout URL construction
//! - Analytics event types and the observational EventBus
//! - Configuration loading
//! - Utility functions

pub mod config;
pub mod error;
pub mod events;
pub mod outbound;
pub mod params;
pub mod store;
pub mod time;

pub use error::{Error, Result};
pub use params::TrackingParams;
