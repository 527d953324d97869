//! Page controller
//!
//! Top-level composition for one page lifetime. Every shared piece
//! (session store, dispatcher, event bus, player adapter) is injected by
//! reference and scoped to this controller: there are no ambient globals.
//! `mount` persists attribution synchronously before anything can
//! navigate; `teardown` cancels every timer the controller registered.

use crate::dispatch::EventDispatcher;
use crate::reveal::{RevealGate, RevealState};
use crate::session::admin_session_active;
use crate::video::{PlayerAdapter, VideoLoadState, VideoLoader};
use funnel_common::config::{FunnelConfig, Package};
use funnel_common::events::{names, EventBus, RevealReason};
use funnel_common::outbound::OutboundBuilder;
use funnel_common::params::{ParamMerger, TrackingParams};
use funnel_common::store::{ParameterStore, SessionStore};
use funnel_common::{time, Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use url::Url;

pub struct PageController {
    config: FunnelConfig,
    outbound: OutboundBuilder,
    dispatcher: Arc<EventDispatcher>,
    gate: Arc<RevealGate>,
    video: Arc<VideoLoader>,
}

impl PageController {
    /// Mount the controller for one page view.
    ///
    /// Merges and persists inbound tracking parameters before returning,
    /// fires the page-view event, arms the reveal gate triggers, and
    /// starts the video readiness poll.
    pub fn mount(
        config: FunnelConfig,
        page_url: &str,
        session: Arc<dyn SessionStore>,
        dispatcher: Arc<EventDispatcher>,
        player: Arc<dyn PlayerAdapter>,
        bus: Arc<EventBus>,
    ) -> Result<Self> {
        let page_url = Url::parse(page_url)
            .map_err(|e| Error::InvalidInput(format!("Invalid page URL '{}': {}", page_url, e)))?;

        // Attribution is persisted synchronously, before any outbound
        // navigation can be built on this page.
        let merger = ParamMerger::new(ParameterStore::new(session.clone()), page_url.clone());
        let merged = merger.merge();
        info!("Mounted with {} tracking parameters", merged.len());
        let outbound = OutboundBuilder::new(merger);

        dispatcher.track(names::VIEW_CONTENT, None, None);

        let gate = RevealGate::new(&config.reveal, bus.clone());

        // Environment bypass: development hosts reveal immediately
        if let Some(host) = page_url.host_str() {
            if config.environment.is_dev_host(host) {
                gate.reveal(RevealReason::EnvBypass);
            }
        }

        // Admin override, honoring the TTL from login time
        let ttl = chrono::Duration::hours(config.admin.session_ttl_hours);
        if admin_session_active(session.as_ref(), time::now(), ttl) {
            gate.reveal(RevealReason::AdminOverride);
        }

        // Elapsed-time trigger; a no-op if something already revealed
        gate.start_timer(Duration::from_secs(config.reveal.delay_secs));

        let video = VideoLoader::new(player, dispatcher.clone(), bus, config.video.clone());
        video.start();

        Ok(Self {
            config,
            outbound,
            dispatcher,
            gate,
            video,
        })
    }

    pub fn reveal_state(&self) -> RevealState {
        self.gate.state()
    }

    pub fn video_state(&self) -> VideoLoadState {
        self.video.state()
    }

    pub fn gate(&self) -> &Arc<RevealGate> {
        &self.gate
    }

    pub fn video(&self) -> &Arc<VideoLoader> {
        &self.video
    }

    /// External call-to-action trigger: reveal gated content now
    pub fn reveal_now(&self) -> bool {
        self.gate.reveal(RevealReason::CallToAction)
    }

    /// Build the outbound checkout URL for `package`.
    ///
    /// Re-merges synchronously so the freshest parameters ride along, and
    /// fires the checkout-intent event. The returned URL is what the view
    /// navigates to; there is no async gap between merge and return.
    pub fn begin_checkout(&self, package: Package) -> Result<String> {
        let mut extra = TrackingParams::new();
        extra.insert("package", package.tag());
        let url = self
            .outbound
            .build(self.config.checkout.url_for(package), Some(&extra))?;
        self.dispatcher.track(names::INITIATE_CHECKOUT, None, None);
        Ok(url)
    }

    /// Cancel every timer/interval this controller registered
    pub fn teardown(&self) {
        self.gate.teardown();
        self.video.teardown();
    }
}

impl Drop for PageController {
    fn drop(&mut self) {
        self.teardown();
    }
}
