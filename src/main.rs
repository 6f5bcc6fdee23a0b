mod bridge;
mod cli;
mod commands;
mod device_registry;
mod devices;
mod discovery;
mod dispatcher;
mod driver;
mod error;
mod input_mode;
mod logger;
mod mapping;
mod protocol;
mod resolver;
mod slots;
mod translator;

#[cfg(test)]
mod test_support;

use anyhow::Context;
use bridge::Bridge;
use clap::Parser;
use cli::Cli;
use commands::Shell;
use devices::create_sinks;
use discovery::{WIIMOTE_DRIVER_DIR, run_hotplug};
use driver::hid_wiimote::HidConnector;
use logger::Verbosity;
use std::io::{self, BufRead};
use std::path::PathBuf;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// SIGINT, SIGTERM and SIGHUP all request a clean shutdown.
fn spawn_signal_handler(stop: CancellationToken) -> io::Result<()> {
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut hangup = signal(SignalKind::hangup())?;
    tokio::spawn(async move {
        tokio::select! {
            _ = stop.cancelled() => return,
            _ = interrupt.recv() => info!("SIGINT received"),
            _ = terminate.recv() => info!("SIGTERM received"),
            _ = hangup.recv() => info!("SIGHUP received"),
        }
        stop.cancel();
    });
    Ok(())
}

/// Blocking stdin reads stay off the runtime so exit never waits on them.
fn spawn_stdin_reader(tx: UnboundedSender<String>) {
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init(Verbosity::from_count(cli.verbose));
    info!("starting wii-bridge");

    let stop = CancellationToken::new();
    spawn_signal_handler(stop.clone()).context("cannot install signal handlers")?;

    if let Some(dir) = &cli.dir {
        std::env::set_current_dir(dir)
            .with_context(|| format!("cannot change directory to {}", dir.display()))?;
    }

    let (keyboard_mouse, gamepads) = create_sinks(usize::from(cli.num_pads))
        .context("cannot create uinput devices (is /dev/uinput writable?)")?;
    info!("virtual keyboard/mouse and {} gamepads created", cli.num_pads);

    let mut bridge = Bridge::new(
        keyboard_mouse,
        gamepads,
        cli.device_options(),
        cli.calibration(),
        Box::new(HidConnector),
    );
    let mut shell = Shell::new(stop.clone());
    if let Some(file) = &cli.load_file {
        shell.load_file(&mut bridge, file);
    }

    let (hotplug_tx, hotplug_rx) = mpsc::unbounded_channel();
    tokio::spawn(run_hotplug(
        PathBuf::from(WIIMOTE_DRIVER_DIR),
        cli.scan_options(),
        hotplug_tx,
        stop.clone(),
    ));
    let (lines_tx, lines_rx) = mpsc::unbounded_channel();
    spawn_stdin_reader(lines_tx);

    dispatcher::run(&mut bridge, &mut shell, hotplug_rx, lines_rx, stop).await;

    info!("shutting down");
    bridge.shutdown();
    Ok(())
}
