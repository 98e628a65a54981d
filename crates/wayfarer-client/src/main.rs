mod client;
mod config;
mod supervisor;

use std::sync::Arc;

use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use client::ClientEvent;
use config::Config;
use supervisor::Supervisor;

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "wayfarer.toml".into());
    let config = Arc::new(match Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            std::process::exit(1);
        }
    });

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(
        "wayfarer v{} connecting to {}:{} (protocol {})",
        env!("CARGO_PKG_VERSION"),
        config.server.host,
        config.server.port,
        config.server.protocol_version
    );
    if config.bots.is_empty() {
        error!("no [[bots]] configured in {config_path}");
        std::process::exit(1);
    }
    info!(
        "bots: {}",
        config
            .bots
            .iter()
            .map(|b| b.username.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let (events_tx, mut events_rx) = mpsc::channel::<ClientEvent>(256);
    let (supervisor, mut clients) = Supervisor::spawn(config.clone(), events_tx);

    // Console REPL: one line per operator command.
    let (console_tx, mut console_rx) = mpsc::channel::<String>(32);
    tokio::spawn(async move {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim().to_string();
            if !line.is_empty() && console_tx.send(line).await.is_err() {
                break;
            }
        }
    });

    let mut failed = false;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, shutting down");
                std::process::exit(130);
            }
            Some(line) = console_rx.recv() => {
                supervisor.dispatch(&line).await;
            }
            Some(event) = events_rx.recv() => {
                log_event(&event);
            }
            result = clients.join_next() => {
                match result {
                    Some(Ok(Ok(()))) => {}
                    Some(Ok(Err(e))) => {
                        error!("client gave up: {e}");
                        failed = true;
                    }
                    Some(Err(e)) => {
                        error!("client task failed: {e}");
                        failed = true;
                    }
                    None => break,
                }
            }
        }
    }

    std::process::exit(if failed { 1 } else { 0 });
}

fn log_event(event: &ClientEvent) {
    match event {
        ClientEvent::Login { bot, uuid } => info!(%bot, %uuid, "event: login"),
        ClientEvent::Spawn { bot, entity_id } => info!(%bot, entity_id, "event: spawn"),
        ClientEvent::Position { bot, position } => info!(%bot, %position, "event: position"),
        ClientEvent::Health { bot, health, food } => info!(%bot, health, food, "event: health"),
        ClientEvent::Chat { bot, message } => info!(%bot, %message, "event: chat"),
        ClientEvent::Arrived { bot } => info!(%bot, "event: arrived"),
        ClientEvent::Disconnected { bot, reason } => warn!(%bot, %reason, "event: disconnected"),
        ClientEvent::Error { bot, message } => warn!(%bot, %message, "event: error"),
    }
}
