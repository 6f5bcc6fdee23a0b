//! The event loop. One task owns the bridge and reacts to hotplug
//! notifications, stdin lines and controller readiness in turn.

use crate::bridge::Bridge;
use crate::commands::Shell;
use crate::device_registry::DeviceId;
use crate::discovery::Hotplug;
use futures::FutureExt;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::{HashMap, HashSet};
use std::io;
use std::os::fd::{BorrowedFd, OwnedFd, RawFd};
use tokio::io::Interest;
use tokio::io::unix::AsyncFd;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// A device is watched per connection; a reconnect bumps the epoch.
type WatchKey = (DeviceId, u64);

enum Wake {
    Stop,
    Hotplug(Option<Hotplug>),
    Line(Option<String>),
    Ready(Result<WatchKey, (WatchKey, io::Error)>),
}

/// Registers a duplicate of the device descriptor, so the registration
/// stays valid after the device closes its own copy.
fn watch(fd: RawFd) -> io::Result<AsyncFd<OwnedFd>> {
    // SAFETY: `fd` comes from an open device handle and is only borrowed
    // long enough to duplicate it.
    let borrowed = unsafe { BorrowedFd::borrow_raw(fd) };
    AsyncFd::with_interest(borrowed.try_clone_to_owned()?, Interest::READABLE)
}

struct Watchers {
    fds: HashMap<WatchKey, AsyncFd<OwnedFd>>,
    failed: HashSet<WatchKey>,
}

impl Watchers {
    fn new() -> Self {
        Self {
            fds: HashMap::new(),
            failed: HashSet::new(),
        }
    }

    /// Drops watchers of closed or reconnected devices, then adds the new ones.
    fn reconcile(&mut self, bridge: &Bridge) {
        let open: HashMap<WatchKey, RawFd> = bridge
            .devices()
            .open_fds()
            .into_iter()
            .map(|(id, epoch, fd)| ((id, epoch), fd))
            .collect();

        self.fds.retain(|key, _| open.contains_key(key));
        self.failed.retain(|key| open.contains_key(key));

        for (key, fd) in open {
            if self.fds.contains_key(&key) || self.failed.contains(&key) {
                continue;
            }
            match watch(fd) {
                Ok(watched) => {
                    debug!("watching device {:?} (epoch {})", key.0, key.1);
                    self.fds.insert(key, watched);
                }
                Err(e) => {
                    warn!("cannot watch device {:?}: {}", key.0, e);
                    self.failed.insert(key);
                }
            }
        }
    }

    fn forget(&mut self, key: WatchKey) {
        self.fds.remove(&key);
        self.failed.insert(key);
    }
}

/// Runs until `stop` is cancelled. Each turn waits for any source, then
/// handles every source already pending; handlers run to completion.
pub async fn run(
    bridge: &mut Bridge,
    shell: &mut Shell,
    mut hotplug_rx: UnboundedReceiver<Hotplug>,
    mut lines_rx: UnboundedReceiver<String>,
    stop: CancellationToken,
) {
    let mut watchers = Watchers::new();
    let mut hotplug_open = true;
    let mut lines_open = true;

    loop {
        if stop.is_cancelled() {
            break;
        }
        watchers.reconcile(bridge);

        let wakes = {
            let mut ready: FuturesUnordered<_> = watchers
                .fds
                .iter()
                .map(|(&key, fd)| async move {
                    match fd.readable().await {
                        Ok(mut guard) => {
                            guard.clear_ready();
                            Ok(key)
                        }
                        Err(e) => Err((key, e)),
                    }
                })
                .collect();

            let first = tokio::select! {
                _ = stop.cancelled() => Wake::Stop,
                note = hotplug_rx.recv(), if hotplug_open => Wake::Hotplug(note),
                Some(result) = ready.next(), if !ready.is_empty() => Wake::Ready(result),
                line = lines_rx.recv(), if lines_open => Wake::Line(line),
            };

            // Everything else already pending is handled in the same turn.
            let mut wakes = vec![first];
            while let Some(Some(result)) = ready.next().now_or_never() {
                wakes.push(Wake::Ready(result));
            }
            while let Ok(note) = hotplug_rx.try_recv() {
                wakes.push(Wake::Hotplug(Some(note)));
            }
            while let Ok(line) = lines_rx.try_recv() {
                wakes.push(Wake::Line(Some(line)));
            }
            wakes
        };

        for wake in wakes {
            if stop.is_cancelled() {
                break;
            }
            match wake {
                Wake::Stop => break,
                Wake::Hotplug(Some(note)) => bridge.hotplug(&note),
                Wake::Hotplug(None) => {
                    debug!("hotplug source finished");
                    hotplug_open = false;
                }
                Wake::Line(Some(line)) => shell.interactive(bridge, &line),
                Wake::Line(None) => {
                    info!("stdin closed; still serving controllers");
                    lines_open = false;
                }
                Wake::Ready(Ok((id, epoch))) => {
                    let current = bridge
                        .devices()
                        .get(id)
                        .is_some_and(|d| d.is_open() && d.epoch() == epoch);
                    if current {
                        bridge.service_device(id);
                    }
                }
                Wake::Ready(Err((key, e))) => {
                    warn!("readiness error on device {:?}: {}", key.0, e);
                    watchers.forget(key);
                }
            }
        }
    }
    info!("dispatcher stopped");
}
