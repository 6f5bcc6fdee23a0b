//! Hotplug source: polls the hid-wiimote driver directory in sysfs.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{Duration, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const WIIMOTE_DRIVER_DIR: &str = "/sys/bus/hid/drivers/wiimote";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotplugKind {
    Present,
    Gone,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hotplug {
    pub kind: HotplugKind,
    /// Bluetooth address, stable across reconnects.
    pub address: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    pub enumerate: bool,
    pub monitor: bool,
    pub interval: Duration,
}

struct Seen {
    address: String,
    /// Input children; changes when an extension is plugged or pulled.
    inputs: BTreeSet<String>,
}

pub struct Scanner {
    root: PathBuf,
    known: HashMap<PathBuf, Seen>,
}

impl Scanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            known: HashMap::new(),
        }
    }

    /// First pass. Already connected controllers are reported only when
    /// `report` is set; otherwise they are remembered and stay ignored.
    pub fn prime(&mut self, report: bool) -> Vec<Hotplug> {
        let notes = self.scan();
        if report { notes } else { Vec::new() }
    }

    pub fn scan(&mut self) -> Vec<Hotplug> {
        let mut notes = Vec::new();
        let current = match list_devices(&self.root) {
            Ok(current) => current,
            Err(e) => {
                debug!("cannot read {}: {}", self.root.display(), e);
                Vec::new()
            }
        };

        let mut seen_now = Vec::new();
        for path in current {
            if let Some(seen) = probe(&path) {
                seen_now.push((path, seen));
            }
        }
        let present: BTreeSet<&PathBuf> = seen_now.iter().map(|(path, _)| path).collect();

        // Removals first: a fast reconnect shows up as a new path with the
        // same address, and its Present must be handled last.
        let vanished: Vec<PathBuf> = self
            .known
            .keys()
            .filter(|path| !present.contains(path))
            .cloned()
            .collect();
        for path in vanished {
            if let Some(seen) = self.known.remove(&path) {
                notes.push(Hotplug {
                    kind: HotplugKind::Gone,
                    address: seen.address,
                    path,
                });
            }
        }

        for (path, seen) in seen_now {
            let changed = match self.known.get(&path) {
                Some(old) => old.inputs != seen.inputs,
                None => true,
            };
            if changed {
                notes.push(Hotplug {
                    kind: HotplugKind::Present,
                    address: seen.address.clone(),
                    path: path.clone(),
                });
                self.known.insert(path, seen);
            }
        }
        notes
    }
}

/// HID device entries are the `bus:vendor:product.n` links.
fn list_devices(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(root)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().contains(':'))
        .map(|entry| entry.path())
        .collect();
    paths.sort();
    Ok(paths)
}

fn probe(path: &Path) -> Option<Seen> {
    let address = match read_uniq(path) {
        Ok(Some(address)) => address,
        Ok(None) => {
            debug!("{} has no HID_UNIQ, skipped", path.display());
            return None;
        }
        Err(e) => {
            debug!("{}: {}", path.display(), e);
            return None;
        }
    };
    let inputs = fs::read_dir(path.join("input"))
        .map(|dir| {
            dir.filter_map(|entry| entry.ok())
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    Some(Seen { address, inputs })
}

fn read_uniq(path: &Path) -> io::Result<Option<String>> {
    let uevent = fs::read_to_string(path.join("uevent"))?;
    Ok(uevent
        .lines()
        .find_map(|line| line.strip_prefix("HID_UNIQ="))
        .map(|value| value.trim().to_lowercase())
        .filter(|value| !value.is_empty()))
}

/// Producer task: sends notifications until stopped or the receiver is gone.
pub async fn run_hotplug(
    root: PathBuf,
    options: ScanOptions,
    tx: UnboundedSender<Hotplug>,
    stop: CancellationToken,
) {
    let mut scanner = Scanner::new(root);
    if options.enumerate {
        info!("looking for already connected devices");
    } else {
        info!("any currently connected controllers will be ignored");
    }
    for note in scanner.prime(options.enumerate) {
        if tx.send(note).is_err() {
            return;
        }
    }

    if !options.monitor {
        info!("no monitor started; no new devices will be found");
        return;
    }
    info!("waiting for Wii controllers");

    loop {
        tokio::select! {
            _ = stop.cancelled() => break,
            _ = sleep(options.interval) => {}
        }
        for note in scanner.scan() {
            if tx.send(note).is_err() {
                warn!("hotplug receiver closed");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn add_device(root: &Path, name: &str, uniq: &str, inputs: &[&str]) -> PathBuf {
        let dir = root.join(name);
        fs::create_dir_all(dir.join("input")).unwrap();
        fs::write(
            dir.join("uevent"),
            format!("DRIVER=wiimote\nHID_ID=0005:0000057E:00000306\nHID_UNIQ={}\n", uniq),
        )
        .unwrap();
        for input in inputs {
            fs::create_dir_all(dir.join("input").join(input)).unwrap();
        }
        dir
    }

    #[test]
    fn reports_arrivals_changes_and_removals() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("uevent"), "DRIVER=wiimote\n").unwrap();
        let mut scanner = Scanner::new(root.path());
        assert!(scanner.prime(true).is_empty());

        let dev = add_device(root.path(), "0005:057E:0306.0001", "00:19:1D:AA:BB:CC", &["input7"]);
        let notes = scanner.scan();
        assert_eq!(
            notes,
            vec![Hotplug {
                kind: HotplugKind::Present,
                address: "00:19:1d:aa:bb:cc".into(),
                path: dev.clone(),
            }]
        );
        assert!(scanner.scan().is_empty());

        fs::create_dir_all(dev.join("input").join("input8")).unwrap();
        let notes = scanner.scan();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, HotplugKind::Present);

        fs::remove_dir_all(&dev).unwrap();
        let notes = scanner.scan();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, HotplugKind::Gone);
        assert_eq!(notes[0].address, "00:19:1d:aa:bb:cc");
    }

    #[test]
    fn removal_is_reported_before_a_fast_reconnect() {
        let root = TempDir::new().unwrap();
        let mut scanner = Scanner::new(root.path());
        let old = add_device(root.path(), "0005:057E:0306.0001", "00:19:1d:00:00:09", &["input3"]);
        assert_eq!(scanner.prime(true).len(), 1);

        fs::remove_dir_all(&old).unwrap();
        let new = add_device(root.path(), "0005:057E:0306.0002", "00:19:1d:00:00:09", &["input4"]);
        let notes: Vec<(HotplugKind, PathBuf)> =
            scanner.scan().into_iter().map(|n| (n.kind, n.path)).collect();
        assert_eq!(
            notes,
            vec![(HotplugKind::Gone, old), (HotplugKind::Present, new)]
        );
    }

    #[test]
    fn prime_without_enumeration_stays_quiet() {
        let root = TempDir::new().unwrap();
        add_device(root.path(), "0005:057E:0306.0002", "00:19:1d:00:00:01", &["input1"]);
        let mut scanner = Scanner::new(root.path());
        assert!(scanner.prime(false).is_empty());
        assert!(scanner.scan().is_empty());
    }

    #[test]
    fn skips_devices_without_address() {
        let root = TempDir::new().unwrap();
        add_device(root.path(), "0005:057E:0306.0003", "", &["input1"]);
        let mut scanner = Scanner::new(root.path());
        assert!(scanner.prime(true).is_empty());
    }

    #[tokio::test]
    async fn producer_sends_enumerated_devices() {
        let root = TempDir::new().unwrap();
        add_device(root.path(), "0005:057E:0306.0004", "00:19:1d:00:00:02", &["input1"]);
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let options = ScanOptions {
            enumerate: true,
            monitor: false,
            interval: Duration::from_millis(10),
        };
        run_hotplug(root.path().to_path_buf(), options, tx, CancellationToken::new()).await;
        let note = rx.recv().await.unwrap();
        assert_eq!(note.address, "00:19:1d:00:00:02");
        assert!(rx.recv().await.is_none());
    }
}
