//! Analytics backend adapters
//!
//! One adapter per third-party destination. The pixel backend enforces
//! the platform's fixed standard-event whitelist; the conversion backend
//! forwards anything; the heatmap backend is load-once fire-and-forget.
//! The whitelist asymmetry is deliberate platform policy, not an
//! oversight.

mod conversion;
mod heatmap;
mod pixel;

pub use conversion::ConversionBackend;
pub use heatmap::HeatmapBackend;
pub use pixel::{PixelBackend, PIXEL_STANDARD_EVENTS};
