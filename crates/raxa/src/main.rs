//! Raxa - Nexa self-learning lights through TellStick Net
//!
//! Command-line front end and composition root: loads the configuration,
//! installs logging, builds the single [`TellstickNet`] handle and hands it
//! to whatever the chosen command needs.

#![warn(missing_docs)]

mod cli;
mod logging_setup;

use anyhow::{Context, Result};
use clap::Parser;
use raxa_control::{BridgeEvent, NexaLight, RaxaConfig, TellstickNet};
use raxa_core::{frame, Action, DeviceCommand};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use cli::{Cli, Command};

/// How often the event printer checks for shutdown
const EVENT_POLL: Duration = Duration::from_millis(250);

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = RaxaConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config {:?}", cli.config))?;
    let _log_guard = logging_setup::init(&config.logging)?;

    match cli.command {
        Command::Listen { json } => listen(&config, json).await,
        Command::On { light, settle } => {
            switch(&config, &light, settle, |l| l.turn_on(None)).await
        }
        Command::Off { light, settle } => switch(&config, &light, settle, |l| l.turn_off()).await,
        Command::Dim {
            light,
            brightness,
            settle,
        } => switch(&config, &light, settle, |l| l.turn_on(Some(brightness))).await,
        Command::Encode {
            device_code,
            group_code,
            action,
            level,
            group_mode,
            repeats,
            pause,
        } => encode(device_code, group_mode, group_code, action, level, repeats, pause),
        Command::Lights => {
            list_lights(&config);
            Ok(())
        }
    }
}

/// Run the bridge and print events until Ctrl-C
async fn listen(config: &RaxaConfig, json: bool) -> Result<()> {
    let bridge = Arc::new(TellstickNet::new(config.bridge.clone()));
    let addr = bridge
        .start()
        .context("Failed to start TellStick Net listener")?;
    info!("Listening on {} (Ctrl-C to stop)", addr);

    let done = Arc::new(AtomicBool::new(false));
    let printer = {
        let events = bridge.events();
        let done = Arc::clone(&done);
        tokio::task::spawn_blocking(move || {
            while !done.load(Ordering::SeqCst) {
                if let Ok(event) = events.recv_timeout(EVENT_POLL) {
                    print_event(&event, json);
                }
            }
        })
    };

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    info!("Shutting down");

    bridge.stop();
    done.store(true, Ordering::SeqCst);
    printer.await?;
    Ok(())
}

fn print_event(event: &BridgeEvent, json: bool) {
    if json {
        match serde_json::to_string(event) {
            Ok(line) => println!("{}", line),
            Err(e) => warn!("Failed to serialize event: {}", e),
        }
        return;
    }

    match event {
        BridgeEvent::TellstickDetected {
            mac,
            activation_code,
            version,
            source,
        } => println!(
            "tellstick_detected {} mac={} activation_code={} version={}",
            source, mac, activation_code, version
        ),
        BridgeEvent::MessageReceived { data, source } => {
            println!("message_received {} data={}", source, data)
        }
    }
}

/// Start the bridge, wait for discovery, apply `op` to the named light
async fn switch<F>(config: &RaxaConfig, name: &str, settle: u64, op: F) -> Result<()>
where
    F: FnOnce(&NexaLight) -> raxa_control::Result<usize>,
{
    let light_config = config.light(name)?.clone();
    let bridge = Arc::new(TellstickNet::new(config.bridge.clone()));
    bridge
        .start()
        .context("Failed to start TellStick Net listener")?;

    wait_for_bridge(&bridge, Duration::from_secs(settle)).await?;

    let light = NexaLight::new(light_config, Arc::clone(&bridge));
    let sent = op(&light)?;
    bridge.stop();

    if sent == 0 {
        warn!("No TellStick Net found, command for '{}' was not sent", name);
    } else {
        println!("'{}' ({}): sent to {} bridge(s)", light.name(), light.unique_id(), sent);
    }
    Ok(())
}

/// Return as soon as a bridge is known, or after `settle`
async fn wait_for_bridge(bridge: &Arc<TellstickNet>, settle: Duration) -> Result<()> {
    let registry = Arc::clone(bridge.registry());
    if !registry.is_empty() {
        return Ok(());
    }

    let events = bridge.events();
    let found = tokio::task::spawn_blocking(move || {
        let deadline = Instant::now() + settle;
        // Any datagram registers its sender, not only announcements
        while registry.is_empty() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            let _ = events.recv_timeout(remaining.min(EVENT_POLL));
        }
        registry.snapshot()
    })
    .await?;

    if found.is_empty() {
        info!("No bridge answered within {:?}", settle);
    } else {
        info!("Bridges found: {:?}", found);
    }
    Ok(())
}

/// Print the pulse train and envelope for a command without sending it
fn encode(
    device_code: u32,
    group_mode: bool,
    group_code: u8,
    action: Action,
    level: Option<u8>,
    repeats: u8,
    pause: u8,
) -> Result<()> {
    let command = DeviceCommand::new(device_code, group_mode, group_code, action, level)?;
    let train = command.encode();
    let envelope = frame(&train, repeats, pause);

    println!("command:  {:?}", command);
    println!("pulses:   {} bytes", train.len());
    println!("          {}", hex::encode_upper(train.as_bytes()));
    println!("envelope: {} bytes", envelope.len());
    println!("          {}", hex::encode_upper(envelope.as_bytes()));
    println!("          {}", envelope.as_bytes().escape_ascii());
    Ok(())
}

fn list_lights(config: &RaxaConfig) {
    if config.lights.is_empty() {
        println!("No lights configured");
        return;
    }
    for light in &config.lights {
        println!(
            "{:<20} {:>14}  {}",
            light.name,
            light.unique_id(),
            if light.dimmable { "dimmable" } else { "on/off" }
        );
    }
}
