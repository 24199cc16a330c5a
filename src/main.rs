//! Harness GW - OSC gateway binary
//!
//! Loads the configuration, pre-allocates the client pool, wires the local
//! session model and optional MIDI proxy into the hub, then serves OSC until
//! Ctrl+C.

use anyhow::{bail, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use harness_gw::clients::{ClientRegistry, ConnectionPool};
use harness_gw::config::AppConfig;
use harness_gw::hub::{HubActor, HubCore, HubHandle};
use harness_gw::midi::{self, MidiProxy};
use harness_gw::server::OscServer;
use harness_gw::session::LocalSession;

/// Harness GW - mirror session state to OSC clients
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (defaults are used when it does not exist)
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// List available MIDI ports
    #[arg(long)]
    list_ports: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    init_logging(&args.log_level, args.log_json)?;

    if args.list_ports {
        print!("{}", midi::list_ports_formatted()?);
        return Ok(());
    }

    info!("Starting Harness GW v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", args.config);

    let config = AppConfig::load_or_default(&args.config).await?;
    run_app(config, shutdown_signal()).await?;

    info!("Harness GW shutdown complete");
    Ok(())
}

async fn run_app(
    config: AppConfig,
    shutdown: impl std::future::Future<Output = ()>,
) -> Result<()> {
    let pool = ConnectionPool::preallocate(&config.clients.host, config.clients.slot_range()).await;
    if pool.is_empty() {
        bail!(
            "No client connections could be established for {}:{}-{}",
            config.clients.host,
            config.clients.port_start,
            config.clients.port_end
        );
    }

    let (hub, commands) = HubHandle::channel();

    let mut session = LocalSession::new(&config.session, config.view, hub.event_sink());
    info!(
        "Local session '{}' with {} tracks",
        config.session.project_name,
        session.track_count()
    );
    let core = HubCore::new(ClientRegistry::new(pool), &config.view, &mut session);

    let midi = match &config.midi {
        Some(midi_config) => {
            let feed = hub.clone();
            match MidiProxy::connect(midi_config, move |event| feed.midi_event(event)) {
                Ok(proxy) => {
                    info!(
                        "MIDI proxy active (in: {}, out: {})",
                        proxy.input_name(),
                        proxy.output_name()
                    );
                    Some(proxy)
                }
                Err(e) => {
                    warn!("MIDI proxy disabled: {:#}", e);
                    None
                }
            }
        }
        None => None,
    };

    let server = OscServer::bind(&config.server.host, config.server.port, hub.clone()).await?;
    let actor = HubActor::new(commands, core, Box::new(session), midi, config.view).spawn();
    let mut server_task = tokio::spawn(server.run());

    info!("Harness GW ready");

    tokio::pin!(shutdown);
    tokio::select! {
        _ = &mut shutdown => {}
        result = &mut server_task => {
            match result {
                Ok(Ok(())) => warn!("OSC server exited"),
                Ok(Err(e)) => warn!("OSC server failed: {:#}", e),
                Err(e) => warn!("OSC server task panicked: {}", e),
            }
        }
    }

    hub.shutdown();
    server_task.abort();
    let _ = actor.await;

    Ok(())
}

fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(false))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false),
            )
            .init();
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
