//! Multi-client supervision: staggered startup, reconnect policy, and
//! operator command routing.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::client::{Client, ClientError, ClientEvent, Command};
use crate::config::{BotSection, Config};

/// Gap between consecutive client launches, plus a little jitter so a fleet
/// does not hammer the server in lockstep.
const STAGGER_BASE: Duration = Duration::from_millis(500);

pub struct Supervisor {
    commands: HashMap<String, mpsc::Sender<Command>>,
}

impl Supervisor {
    /// Launch one task per configured bot. Each task owns its reconnect
    /// loop; clients share nothing with each other.
    pub fn spawn(
        config: Arc<Config>,
        events: mpsc::Sender<ClientEvent>,
    ) -> (Self, JoinSet<Result<(), ClientError>>) {
        let mut commands = HashMap::new();
        let mut tasks = JoinSet::new();
        for (index, bot) in config.bots.iter().cloned().enumerate() {
            let (command_tx, command_rx) = mpsc::channel(16);
            commands.insert(bot.username.clone(), command_tx);
            tasks.spawn(run_client(config.clone(), bot, index, events.clone(), command_rx));
        }
        (Self { commands }, tasks)
    }

    /// Route one operator console line to the named client.
    pub async fn dispatch(&self, line: &str) {
        let Some((bot, command)) = parse_command(line) else {
            warn!(%line, "unrecognized command (expected: come <bot> <x> <y> <z> | stop <bot> | pos <bot>)");
            return;
        };
        match self.commands.get(&bot) {
            Some(tx) => {
                if tx.send(command).await.is_err() {
                    warn!(%bot, "client is gone");
                }
            }
            None => warn!(%bot, "no such bot"),
        }
    }
}

/// Parse an operator line into its target bot and command.
fn parse_command(line: &str) -> Option<(String, Command)> {
    let mut parts = line.split_whitespace();
    let verb = parts.next()?;
    let bot = parts.next()?.to_string();
    let command = match verb {
        "come" => Command::Goto {
            x: parts.next()?.parse().ok()?,
            y: parts.next()?.parse().ok()?,
            z: parts.next()?.parse().ok()?,
        },
        "stop" => Command::Stop,
        "pos" => Command::ReportPosition,
        _ => return None,
    };
    Some((bot, command))
}

async fn run_client(
    config: Arc<Config>,
    bot: BotSection,
    index: usize,
    events: mpsc::Sender<ClientEvent>,
    mut command_rx: mpsc::Receiver<Command>,
) -> Result<(), ClientError> {
    let jitter = rand::thread_rng().gen_range(0..250);
    tokio::time::sleep(STAGGER_BASE * index as u32 + Duration::from_millis(jitter)).await;

    let reconnect_delay = Duration::from_millis(config.supervisor.reconnect_delay_ms);
    let mut attempts = 0u32;
    let mut last_error = None;
    loop {
        match Client::connect(&config.server, &config.supervisor, &bot, events.clone()).await {
            Ok((client, reader)) => {
                attempts = 0;
                match client.run(reader, &mut command_rx).await {
                    Ok(()) => {
                        info!(bot = %bot.username, "client stopped");
                        return Ok(());
                    }
                    Err(e) => {
                        warn!(bot = %bot.username, "connection lost: {e}");
                        last_error = Some(e);
                    }
                }
            }
            Err(e) => {
                warn!(bot = %bot.username, "connect failed: {e}");
                last_error = Some(e);
            }
        }

        attempts += 1;
        if attempts >= config.supervisor.max_reconnect_attempts {
            return Err(last_error.unwrap_or(ClientError::ConnectionClosed));
        }
        info!(
            bot = %bot.username,
            attempt = attempts,
            delay_ms = reconnect_delay.as_millis() as u64,
            "reconnecting"
        );
        tokio::time::sleep(reconnect_delay).await;
    }
}
