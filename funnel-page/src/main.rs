//! Funnel page driver - main entry point
//!
//! Headless simulation of one funnel page session: mounts the page
//! controller with in-memory session storage and simulated third-party
//! collaborators, plays through the funnel (player load, video play,
//! reveal, checkout click), and prints the outbound checkout URL.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use funnel_common::config::{FunnelConfig, Package};
use funnel_common::events::EventBus;
use funnel_common::store::MemoryStore;
use funnel_page::backends::{ConversionBackend, HeatmapBackend, PixelBackend};
use funnel_page::video::SimulatedPlayer;
use funnel_page::{EventDispatcher, PageController};

/// Command-line arguments for funnel-page
#[derive(Parser, Debug)]
#[command(name = "funnel-page")]
#[command(about = "Headless driver simulating one funnel page session")]
#[command(version)]
struct Args {
    /// Inbound page URL, query string included
    #[arg(
        long,
        default_value = "https://site.example.com/?utm_source=fb&fbclid=123"
    )]
    page_url: String,

    /// Package to check out at the end of the session
    #[arg(long, default_value = "3-bottle")]
    package: Package,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "funnel_page=debug,funnel_common=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = FunnelConfig::resolve(args.config.as_deref())
        .context("Failed to resolve configuration")?;

    let session = Arc::new(MemoryStore::new());
    let bus = Arc::new(EventBus::new(256));

    // Observe everything the pipeline does
    let mut events = bus.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!("funnel event: {:?}", event);
        }
    });

    // Third-party collaborators
    let (pixel_tx, mut pixel_rx) = tokio::sync::mpsc::unbounded_channel();
    let (conv_tx, mut conv_rx) = tokio::sync::mpsc::unbounded_channel();
    let pixel = Arc::new(PixelBackend::new(pixel_tx));
    let conversion = Arc::new(ConversionBackend::new(conv_tx));
    let heatmap = Arc::new(HeatmapBackend::new());
    pixel.mark_initialized();
    conversion.mark_initialized();
    heatmap.ensure_loaded();

    let mut dispatcher = EventDispatcher::new(bus.clone());
    dispatcher.register(pixel);
    dispatcher.register(conversion);
    dispatcher.register(heatmap);
    let dispatcher = Arc::new(dispatcher);

    let player = SimulatedPlayer::new();

    let controller = PageController::mount(
        config,
        &args.page_url,
        session,
        dispatcher,
        player.clone(),
        bus,
    )
    .context("Failed to mount page controller")?;
    info!("Page controller mounted");

    // The player script renders, then the visitor presses play
    tokio::time::sleep(Duration::from_millis(300)).await;
    player.make_ready();
    tokio::time::sleep(Duration::from_millis(700)).await;
    player.emit_play();
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Visitor clicks through the call to action and buys
    controller.reveal_now();
    let checkout_url = controller
        .begin_checkout(args.package)
        .context("Failed to build checkout URL")?;
    info!("Checkout URL: {}", checkout_url);
    println!("{}", checkout_url);

    tokio::time::sleep(Duration::from_millis(100)).await;
    controller.teardown();

    while let Ok(event) = pixel_rx.try_recv() {
        info!("pixel received: {:?}", event);
    }
    while let Ok(event) = conv_rx.try_recv() {
        info!("conversion received: {:?}", event);
    }

    Ok(())
}
