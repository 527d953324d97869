//! External video player loading and play detection
//!
//! The player is injected by a third-party script and signals readiness
//! on its own schedule. `VideoLoader` drives a bounded poll against the
//! adapter's readiness probe; exhausting the attempt cap is a terminal
//! failure surfaced to the user with a manual retry affordance.
//!
//! Play detection feeds the dispatcher through `track_once`, so however
//! many pathways observe the same playback start (player callback,
//! readiness poll, click fallback), exactly one event goes out.

use crate::dispatch::EventDispatcher;
use crate::poll::poll_until;
use funnel_common::config::VideoConfig;
use funnel_common::events::{names, EventBus, FunnelEvent};
use funnel_common::time;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Seam for the third-party player script.
///
/// Implementations wrap script-tag mechanics (global readiness flag or a
/// DOM query for rendered player markup, plus instance play callbacks);
/// the loader depends only on this interface.
pub trait PlayerAdapter: Send + Sync {
    /// Whether the player has rendered and is ready to play
    fn is_ready(&self) -> bool;

    /// Stream of play signals from the embedded player
    fn play_signals(&self) -> broadcast::Receiver<()>;
}

/// Loader lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoLoadState {
    /// Polling the readiness probe
    Loading,
    /// Player rendered; play detection active
    Ready,
    /// Attempt cap exhausted; waiting on the manual retry affordance
    Failed { attempts: u32 },
}

pub struct VideoLoader {
    adapter: Arc<dyn PlayerAdapter>,
    dispatcher: Arc<EventDispatcher>,
    bus: Arc<EventBus>,
    config: VideoConfig,
    state: Mutex<VideoLoadState>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl VideoLoader {
    pub fn new(
        adapter: Arc<dyn PlayerAdapter>,
        dispatcher: Arc<EventDispatcher>,
        bus: Arc<EventBus>,
        config: VideoConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            adapter,
            dispatcher,
            bus,
            config,
            state: Mutex::new(VideoLoadState::Loading),
            tasks: Mutex::new(Vec::new()),
        })
    }

    pub fn state(&self) -> VideoLoadState {
        *self.state.lock().unwrap()
    }

    /// Begin (or resume) the bounded readiness poll
    pub fn start(self: &Arc<Self>) {
        let loader = Arc::clone(self);
        let handle = tokio::spawn(async move {
            loader.load_cycle().await;
        });
        self.tasks.lock().unwrap().push(handle);
    }

    /// Manual retry affordance, valid only after terminal failure.
    /// Returns true if a new load cycle was started.
    pub fn retry(self: &Arc<Self>) -> bool {
        {
            let mut state = self.state.lock().unwrap();
            match *state {
                VideoLoadState::Failed { .. } => *state = VideoLoadState::Loading,
                _ => return false,
            }
        }
        info!("Video load retry requested");
        self.start();
        true
    }

    /// Fallback play-detection pathway (e.g. a click on the player
    /// chrome). Deduplicated with every other pathway.
    pub fn notify_play(&self) {
        self.dispatcher.track_once(names::VIDEO_PLAY, None, None);
    }

    /// Cancel the readiness poll and play watcher
    pub fn teardown(&self) {
        for handle in self.tasks.lock().unwrap().drain(..) {
            handle.abort();
        }
    }

    async fn load_cycle(self: Arc<Self>) {
        let interval = Duration::from_millis(self.config.poll_interval_ms);
        let adapter = Arc::clone(&self.adapter);
        match poll_until(interval, self.config.max_poll_attempts, || {
            adapter.is_ready()
        })
        .await
        {
            Ok(attempts) => {
                *self.state.lock().unwrap() = VideoLoadState::Ready;
                info!("Video player ready after {} poll attempts", attempts);
                self.bus.emit(FunnelEvent::VideoPlayerReady {
                    attempts,
                    timestamp: time::now(),
                });
                self.watch_play();
            }
            Err(e) => {
                *self.state.lock().unwrap() = VideoLoadState::Failed {
                    attempts: e.attempts,
                };
                warn!("Video player never became ready: {}", e);
                self.bus.emit(FunnelEvent::VideoLoadFailed {
                    attempts: e.attempts,
                    timestamp: time::now(),
                });
            }
        }
    }

    fn watch_play(self: &Arc<Self>) {
        let loader = Arc::clone(self);
        let mut rx = self.adapter.play_signals();
        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(()) => loader.notify_play(),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        self.tasks.lock().unwrap().push(handle);
    }
}

/// Scriptable player adapter for the driver binary and tests.
pub struct SimulatedPlayer {
    ready: AtomicBool,
    play_tx: broadcast::Sender<()>,
}

impl SimulatedPlayer {
    pub fn new() -> Arc<Self> {
        let (play_tx, _) = broadcast::channel(16);
        Arc::new(Self {
            ready: AtomicBool::new(false),
            play_tx,
        })
    }

    /// Flip the readiness flag, as the real script would on render
    pub fn make_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }

    /// Emit a play signal from the embedded player
    pub fn emit_play(&self) {
        let _ = self.play_tx.send(());
    }
}

impl PlayerAdapter for SimulatedPlayer {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn play_signals(&self) -> broadcast::Receiver<()> {
        self.play_tx.subscribe()
    }
}
