//! # Garage Door Opener Binary
//!
//! Runs one simulated garage door accessory, driven by line commands on
//! stdin. Characteristic changes are printed to stdout as they happen.
//!
//! # Usage
//!
//! ```bash
//! # Defaults, simulated GPIO
//! garage_door
//!
//! # Config file, real pins through sysfs
//! garage_door --config config/garage.toml --driver sysfs
//!
//! # Verbose logging, JSON output
//! garage_door -c config/garage.toml -v --json
//!
//! # Available GPIO backends
//! garage_door --list-drivers
//! ```
//!
//! Commands: `open`, `close`, `target [open|closed]`, `current`, `status`,
//! `info`, `quit`.

use clap::Parser;
use garage_common::config::ConfigLoader;
use garage_common::door::config::{DoorConfig, RawDoorConfig};
use garage_common::gpio::driver::GpioBackend;
use garage_door::characteristics::{CharacteristicChange, DoorCharacteristics};
use garage_door::command::DoorCommand;
use garage_door::{CharacteristicStore, CommandOutcome, GarageDoorAccessory, GpioActuator, GpioRegistry};
use serde_json::json;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Upper bound on one wait, so Ctrl-C is noticed promptly.
const MAX_WAIT: Duration = Duration::from_millis(250);

/// Simulated garage door opener
#[derive(Parser, Debug)]
#[command(name = "garage_door")]
#[command(version)]
#[command(about = "Simulated garage door opener with GPIO pulse actuator")]
#[command(long_about = None)]
struct Args {
    /// Door configuration file (TOML). Built-in defaults when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// GPIO backend
    #[arg(short, long, default_value = "simulation")]
    driver: String,

    /// Print the available GPIO backends and exit
    #[arg(long)]
    list_drivers: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs and characteristic changes as JSON
    #[arg(long)]
    json: bool,
}

/// Message from the stdin reader thread.
enum Input {
    Command(DoorCommand),
    Invalid(String),
    Eof,
}

type Accessory = GarageDoorAccessory<GpioActuator<Box<dyn GpioBackend>>, CharacteristicStore>;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = run() {
        error!("Garage door startup failed: {}", e);
        eprintln!("garage_door: {e}");
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let registry = GpioRegistry::with_builtin();
    if args.list_drivers {
        for info in registry.backends() {
            println!("{:<12} {}", info.name, info.summary);
        }
        return Ok(());
    }

    let raw = match &args.config {
        Some(path) => RawDoorConfig::load(path)?,
        None => RawDoorConfig::default(),
    };
    setup_tracing(&args, &raw);

    info!("Garage door v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &args.config {
        info!("Configuration loaded from {}", path.display());
    }
    let config = DoorConfig::from_raw(raw)?;

    debug!("Available GPIO backends: {:?}", registry.names());
    let backend = registry.create(&args.driver)?;
    info!("Using '{}' GPIO backend", backend.name());

    let mut actuator = GpioActuator::from_config(backend, &config);
    actuator.init()?;

    let mut store = CharacteristicStore::new();
    let changes = store.subscribe();
    let mut accessory = GarageDoorAccessory::new(config, actuator, store);
    // Initial Closed/Closed writes are not news.
    changes.try_iter().for_each(drop);

    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        flag.store(false, Ordering::SeqCst);
    })?;

    let commands = spawn_stdin_reader();
    info!("'{}' ready", accessory.information().name);

    event_loop(&mut accessory, &commands, &changes, &running, args.json);

    accessory.engine_mut().actuator_mut().shutdown()?;
    info!("Garage door shutdown complete");
    Ok(())
}

fn spawn_stdin_reader() -> Receiver<Input> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            let input = match line.parse() {
                Ok(cmd) => Input::Command(cmd),
                Err(e) => Input::Invalid(format!("{e}")),
            };
            if tx.send(input).is_err() {
                return;
            }
        }
        let _ = tx.send(Input::Eof);
    });
    rx
}

fn event_loop(
    accessory: &mut Accessory,
    commands: &Receiver<Input>,
    changes: &Receiver<CharacteristicChange>,
    running: &AtomicBool,
    json: bool,
) {
    let mut stdin_open = true;

    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        let wait = accessory
            .next_deadline()
            .map_or(MAX_WAIT, |d| d.saturating_duration_since(now).min(MAX_WAIT));

        if stdin_open {
            match commands.recv_timeout(wait) {
                Ok(Input::Command(DoorCommand::Quit)) => break,
                Ok(Input::Command(cmd)) => {
                    if let Err(e) = accessory.poll(Instant::now()) {
                        error!("Timer handling failed: {e}");
                    }
                    handle_command(accessory, cmd, json);
                }
                Ok(Input::Invalid(msg)) => warn!("{msg}"),
                Ok(Input::Eof) | Err(RecvTimeoutError::Disconnected) => {
                    debug!("stdin closed, running until pending timers drain");
                    stdin_open = false;
                }
                Err(RecvTimeoutError::Timeout) => {}
            }
        } else if accessory.next_deadline().is_none() {
            break;
        } else {
            std::thread::sleep(wait);
        }

        if let Err(e) = accessory.poll(Instant::now()) {
            error!("Timer handling failed: {e}");
        }
        for change in changes.try_iter() {
            print_change(change, json);
        }
    }
}

fn handle_command(accessory: &mut Accessory, cmd: DoorCommand, json: bool) {
    let now = Instant::now();
    match cmd {
        DoorCommand::SetTarget(target) => match accessory.set_target_state(target, now) {
            Ok(CommandOutcome::Started {
                state,
                duration,
                forced,
            }) => {
                debug!(%state, ?duration, forced, "motion started");
            }
            Ok(CommandOutcome::Ignored) => {}
            Err(e) => error!("Command failed: {e}"),
        },
        DoorCommand::GetTarget => {
            let target = accessory.get_target_state(now);
            print_value(json, json!({ "target": target }), &format!("target: {target}"));
        }
        DoorCommand::GetCurrent => {
            let current = accessory.get_current_state();
            print_value(json, json!({ "current": current }), &format!("current: {current}"));
        }
        DoorCommand::Status => {
            let engine = accessory.engine();
            let current = engine.current_state();
            let target = engine.target_state(now);
            let stored = engine.store().target();
            let pulses = engine.actuator().pulse_count();
            let timers = engine.timers().len();
            let until_next = engine
                .next_deadline()
                .map(|d| d.saturating_duration_since(now).as_secs_f64());
            print_value(
                json,
                json!({
                    "current": current,
                    "target": target,
                    "stored_target": stored,
                    "pulses": pulses,
                    "pending_timers": timers,
                    "next_deadline_secs": until_next,
                }),
                &format!(
                    "current: {current}, target: {target} (stored {stored}), pulses: {pulses}, pending timers: {timers}{}",
                    until_next.map_or(String::new(), |s| format!(", next in {s:.1}s"))
                ),
            );
        }
        DoorCommand::Info => {
            let info = accessory.information();
            match serde_json::to_value(info) {
                Ok(value) if json => println!("{value}"),
                _ => println!(
                    "{} ({} {}, serial {})",
                    info.name, info.manufacturer, info.model, info.serial_number
                ),
            }
        }
        DoorCommand::Quit => {}
    }
}

fn print_value(json: bool, value: serde_json::Value, text: &str) {
    if json {
        println!("{value}");
    } else {
        println!("{text}");
    }
}

fn print_change(change: CharacteristicChange, json: bool) {
    if json {
        match serde_json::to_string(&change) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!("Could not encode {change:?}: {e}"),
        }
        return;
    }
    match change {
        CharacteristicChange::Target(t) => println!("target -> {t}"),
        CharacteristicChange::Current(c) => println!("current -> {c}"),
    }
}

/// Setup tracing subscriber from CLI arguments and the raw configuration.
fn setup_tracing(args: &Args, raw: &RawDoorConfig) {
    let level = if args.verbose || raw.verbose.unwrap_or(false) {
        Level::DEBUG
    } else {
        raw.log_level.unwrap_or_default().into()
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
