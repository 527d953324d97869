//! Content reveal gate
//!
//! One-directional state machine deciding when gated page sections become
//! visible: `Hidden` until the first trigger fires, `Revealed` forever
//! after. Triggers are the elapsed-time timer, an unexpired admin
//! override, a recognized development host, or an explicit call to
//! action. First trigger wins; later triggers are no-ops.

use funnel_common::config::RevealConfig;
use funnel_common::events::{EventBus, FunnelEvent, RevealReason, ScrollCommand};
use funnel_common::time;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Whether gated content is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    Hidden,
    Revealed(RevealReason),
}

impl RevealState {
    pub fn is_revealed(&self) -> bool {
        matches!(self, RevealState::Revealed(_))
    }
}

/// The gate itself. Shared by reference between the page controller and
/// whatever trigger pathways it wires up.
pub struct RevealGate {
    state: Mutex<RevealState>,
    scroll: ScrollCommand,
    bus: Arc<EventBus>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl RevealGate {
    pub fn new(config: &RevealConfig, bus: Arc<EventBus>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(RevealState::Hidden),
            scroll: ScrollCommand {
                selectors: config.scroll_selectors.clone(),
                highlight_ms: config.highlight_ms,
            },
            bus,
            timer: Mutex::new(None),
        })
    }

    /// Current gate state
    pub fn state(&self) -> RevealState {
        *self.state.lock().unwrap()
    }

    pub fn is_revealed(&self) -> bool {
        self.state().is_revealed()
    }

    /// Fire a trigger. The first caller performs the transition and gets
    /// `true`; everyone after that is a no-op. The transition never
    /// reverts.
    pub fn reveal(&self, reason: RevealReason) -> bool {
        {
            let mut state = self.state.lock().unwrap();
            if state.is_revealed() {
                debug!("Reveal trigger {:?} after transition, ignoring", reason);
                return false;
            }
            *state = RevealState::Revealed(reason);
        }
        info!("Content revealed via {:?}", reason);
        self.bus.emit(FunnelEvent::ContentRevealed {
            reason,
            scroll: self.scroll.clone(),
            timestamp: time::now(),
        });
        true
    }

    /// Arm the elapsed-time trigger. Replaces any previously armed timer.
    pub fn start_timer(self: &Arc<Self>, delay: Duration) {
        let gate = Arc::clone(self);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            gate.reveal(RevealReason::Timer);
        });
        if let Some(old) = self.timer.lock().unwrap().replace(handle) {
            old.abort();
        }
    }

    /// Cancel the elapsed-time timer. Called on navigation away.
    pub fn teardown(&self) {
        if let Some(handle) = self.timer.lock().unwrap().take() {
            handle.abort();
        }
    }
}

/// Resolve the scroll target for a fired `ScrollCommand`.
///
/// Tries selectors in order against the view's `exists` lookup and
/// returns the first match. No match is a logged no-op, never fatal.
pub fn resolve_scroll_target<'a, F>(command: &'a ScrollCommand, mut exists: F) -> Option<&'a str>
where
    F: FnMut(&str) -> bool,
{
    for selector in &command.selectors {
        if exists(selector) {
            return Some(selector);
        }
    }
    warn!("No scroll target matched any of {:?}", command.selectors);
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> Arc<RevealGate> {
        RevealGate::new(&RevealConfig::default(), Arc::new(EventBus::new(64)))
    }

    #[test]
    fn test_starts_hidden() {
        assert_eq!(gate().state(), RevealState::Hidden);
    }

    #[test]
    fn test_first_trigger_wins() {
        let gate = gate();
        assert!(gate.reveal(RevealReason::CallToAction));
        assert!(!gate.reveal(RevealReason::Timer));
        assert!(!gate.reveal(RevealReason::AdminOverride));
        assert_eq!(
            gate.state(),
            RevealState::Revealed(RevealReason::CallToAction)
        );
    }

    #[test]
    fn test_transition_is_terminal() {
        let gate = gate();
        gate.reveal(RevealReason::EnvBypass);
        // No sequence of further triggers returns the gate to Hidden
        for _ in 0..5 {
            gate.reveal(RevealReason::Timer);
            gate.reveal(RevealReason::CallToAction);
            assert!(gate.is_revealed());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_trigger_fires_after_delay() {
        let gate = gate();
        gate.start_timer(Duration::from_secs(10));

        tokio::time::sleep(Duration::from_secs(9)).await;
        tokio::task::yield_now().await;
        assert_eq!(gate.state(), RevealState::Hidden);

        tokio::time::sleep(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;
        assert_eq!(gate.state(), RevealState::Revealed(RevealReason::Timer));
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_cancels_timer() {
        let gate = gate();
        gate.start_timer(Duration::from_secs(10));
        gate.teardown();

        tokio::time::sleep(Duration::from_secs(60)).await;
        tokio::task::yield_now().await;
        assert_eq!(gate.state(), RevealState::Hidden);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_after_manual_reveal_is_noop() {
        let gate = gate();
        gate.start_timer(Duration::from_secs(10));
        gate.reveal(RevealReason::CallToAction);

        tokio::time::sleep(Duration::from_secs(20)).await;
        tokio::task::yield_now().await;
        assert_eq!(
            gate.state(),
            RevealState::Revealed(RevealReason::CallToAction)
        );
    }

    #[test]
    fn test_reveal_emits_scroll_command() {
        let bus = Arc::new(EventBus::new(64));
        let mut rx = bus.subscribe();
        let gate = RevealGate::new(&RevealConfig::default(), bus);
        gate.reveal(RevealReason::Timer);

        match rx.try_recv().unwrap() {
            FunnelEvent::ContentRevealed { reason, scroll, .. } => {
                assert_eq!(reason, RevealReason::Timer);
                assert!(!scroll.selectors.is_empty());
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_scroll_target_first_match() {
        let command = ScrollCommand {
            selectors: vec!["#a".into(), "#b".into(), "#c".into()],
            highlight_ms: 2000,
        };
        assert_eq!(
            resolve_scroll_target(&command, |s| s == "#b" || s == "#c"),
            Some("#b")
        );
    }

    #[test]
    fn test_scroll_target_no_match_is_none() {
        let command = ScrollCommand {
            selectors: vec!["#a".into()],
            highlight_ms: 2000,
        };
        assert_eq!(resolve_scroll_target(&command, |_| false), None);
    }
}
