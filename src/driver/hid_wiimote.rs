//! Kernel hid-wiimote backend. The driver splits one controller into several
//! evdev nodes (core, accelerometer, IR, one per extension); they are opened
//! on demand and multiplexed through a private epoll descriptor.

use super::{Abs, Connector, Interfaces, Report, WiiDevice};
use crate::protocol::{IR_MISSING, WiiKey};
use evdev::{AbsoluteAxisType, Device, EventType, InputEvent, Key, Synchronization};
use std::collections::VecDeque;
use std::fs;
use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const NODE_PREFIX: &str = "Nintendo Wii Remote";
const ABS_SLOTS: usize = 0x40;

/// Interface served by an input node, from the name the kernel gives it.
fn iface_from_name(name: &str) -> Option<Interfaces> {
    let suffix = name.strip_prefix(NODE_PREFIX)?;
    let iface = match suffix.trim() {
        "" => Interfaces::CORE,
        "Accelerometer" => Interfaces::ACCEL,
        "IR" => Interfaces::IR,
        "Motion Plus" => Interfaces::MOTION_PLUS,
        "Nunchuk" => Interfaces::NUNCHUK,
        "Classic Controller" => Interfaces::CLASSIC,
        "Balance Board" => Interfaces::BALANCE,
        "Pro Controller" => Interfaces::PRO,
        _ => return None,
    };
    Some(iface)
}

// Key codes per node, as emitted by hid-wiimote.
const CORE_KEYS: [(Key, WiiKey); 11] = [
    (Key::KEY_LEFT, WiiKey::Left),
    (Key::KEY_RIGHT, WiiKey::Right),
    (Key::KEY_UP, WiiKey::Up),
    (Key::KEY_DOWN, WiiKey::Down),
    (Key::KEY_NEXT, WiiKey::Plus),
    (Key::KEY_PREVIOUS, WiiKey::Minus),
    (Key::BTN_1, WiiKey::One),
    (Key::BTN_2, WiiKey::Two),
    (Key::BTN_SOUTH, WiiKey::A),
    (Key::BTN_EAST, WiiKey::B),
    (Key::BTN_MODE, WiiKey::Home),
];

const NUNCHUK_KEYS: [(Key, WiiKey); 2] = [(Key::BTN_C, WiiKey::C), (Key::BTN_Z, WiiKey::Z)];

const CLASSIC_KEYS: [(Key, WiiKey); 15] = [
    (Key::BTN_SOUTH, WiiKey::A),
    (Key::BTN_EAST, WiiKey::B),
    (Key::BTN_NORTH, WiiKey::X),
    (Key::BTN_WEST, WiiKey::Y),
    (Key::BTN_TL2, WiiKey::ZL),
    (Key::BTN_TR2, WiiKey::ZR),
    (Key::KEY_NEXT, WiiKey::Plus),
    (Key::KEY_PREVIOUS, WiiKey::Minus),
    (Key::BTN_MODE, WiiKey::Home),
    (Key::KEY_LEFT, WiiKey::Left),
    (Key::KEY_RIGHT, WiiKey::Right),
    (Key::KEY_UP, WiiKey::Up),
    (Key::KEY_DOWN, WiiKey::Down),
    (Key::BTN_TL, WiiKey::TL),
    (Key::BTN_TR, WiiKey::TR),
];

const PRO_KEYS: [(Key, WiiKey); 17] = [
    (Key::BTN_EAST, WiiKey::A),
    (Key::BTN_SOUTH, WiiKey::B),
    (Key::BTN_NORTH, WiiKey::X),
    (Key::BTN_WEST, WiiKey::Y),
    (Key::BTN_TL, WiiKey::TL),
    (Key::BTN_TR, WiiKey::TR),
    (Key::BTN_TL2, WiiKey::ZL),
    (Key::BTN_TR2, WiiKey::ZR),
    (Key::BTN_START, WiiKey::Plus),
    (Key::BTN_SELECT, WiiKey::Minus),
    (Key::BTN_MODE, WiiKey::Home),
    (Key::BTN_THUMBL, WiiKey::ThumbL),
    (Key::BTN_THUMBR, WiiKey::ThumbR),
    (Key::BTN_DPAD_LEFT, WiiKey::Left),
    (Key::BTN_DPAD_RIGHT, WiiKey::Right),
    (Key::BTN_DPAD_UP, WiiKey::Up),
    (Key::BTN_DPAD_DOWN, WiiKey::Down),
];

fn wii_key(iface: Interfaces, code: u16) -> Option<WiiKey> {
    let table: &[(Key, WiiKey)] = match iface {
        Interfaces::CORE => &CORE_KEYS,
        Interfaces::NUNCHUK => &NUNCHUK_KEYS,
        Interfaces::CLASSIC => &CLASSIC_KEYS,
        Interfaces::PRO => &PRO_KEYS,
        _ => return None,
    };
    table.iter().find(|(key, _)| key.0 == code).map(|&(_, wii)| wii)
}

fn set_nonblocking(fd: RawFd) -> io::Result<()> {
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }
    if unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// One opened evdev node plus the latest absolute values it reported.
struct Node {
    iface: Interfaces,
    device: Device,
    abs: [i32; ABS_SLOTS],
    moved: bool,
}

impl Node {
    fn new(iface: Interfaces, device: Device) -> Self {
        let start = if iface == Interfaces::IR { IR_MISSING } else { 0 };
        Self {
            iface,
            device,
            abs: [start; ABS_SLOTS],
            moved: false,
        }
    }

    fn get(&self, axis: AbsoluteAxisType) -> i32 {
        self.abs[axis.0 as usize]
    }

    fn xy(&self, x: AbsoluteAxisType, y: AbsoluteAxisType) -> Abs {
        Abs::xy(self.get(x), self.get(y))
    }

    fn xyz(&self, x: AbsoluteAxisType, y: AbsoluteAxisType, z: AbsoluteAxisType) -> Abs {
        Abs::xyz(self.get(x), self.get(y), self.get(z))
    }

    /// Folds one kernel event in; axis frames are reported on SYN_REPORT.
    fn feed(&mut self, event: InputEvent, out: &mut VecDeque<Report>) {
        match event.event_type() {
            EventType::KEY => {
                if let Some(key) = wii_key(self.iface, event.code()) {
                    out.push_back(Report::Key {
                        key,
                        state: event.value(),
                    });
                }
            }
            EventType::ABSOLUTE => {
                if let Some(slot) = self.abs.get_mut(event.code() as usize) {
                    *slot = event.value();
                    self.moved = true;
                }
            }
            EventType::SYNCHRONIZATION if event.code() == Synchronization::SYN_REPORT.0 => {
                if std::mem::take(&mut self.moved) {
                    if let Some(report) = self.frame() {
                        out.push_back(report);
                    }
                }
            }
            _ => {}
        }
    }

    fn frame(&self) -> Option<Report> {
        use AbsoluteAxisType as A;
        let report = match self.iface {
            Interfaces::ACCEL => Report::Accel(self.xyz(A::ABS_RX, A::ABS_RY, A::ABS_RZ)),
            Interfaces::IR => Report::Ir([
                self.xy(A::ABS_HAT0X, A::ABS_HAT0Y),
                self.xy(A::ABS_HAT1X, A::ABS_HAT1Y),
                self.xy(A::ABS_HAT2X, A::ABS_HAT2Y),
                self.xy(A::ABS_HAT3X, A::ABS_HAT3Y),
            ]),
            Interfaces::NUNCHUK => Report::NunchukMove {
                stick: self.xy(A::ABS_HAT0X, A::ABS_HAT0Y),
                accel: self.xyz(A::ABS_RX, A::ABS_RY, A::ABS_RZ),
            },
            Interfaces::CLASSIC => Report::ClassicMove {
                left: self.xy(A::ABS_HAT1X, A::ABS_HAT1Y),
                right: self.xy(A::ABS_HAT2X, A::ABS_HAT2Y),
                triggers: self.xy(A::ABS_HAT3X, A::ABS_HAT3Y),
            },
            // hid-wiimote reports front-right, back-right, front-left, back-left.
            Interfaces::BALANCE => Report::Balance([
                self.get(A::ABS_HAT0X),
                self.get(A::ABS_HAT0Y),
                self.get(A::ABS_HAT1X),
                self.get(A::ABS_HAT1Y),
            ]),
            Interfaces::PRO => Report::ProMove {
                left: self.xy(A::ABS_X, A::ABS_Y),
                right: self.xy(A::ABS_RX, A::ABS_RY),
            },
            _ => return None,
        };
        Some(report)
    }
}

/// One controller bound to hid-wiimote, addressed by its sysfs HID directory.
pub struct HidWiimote {
    path: PathBuf,
    epoll: OwnedFd,
    nodes: Vec<Node>,
    pending: VecDeque<Report>,
}

impl HidWiimote {
    pub fn new(path: &Path) -> io::Result<Self> {
        if !path.join("input").is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} has no input nodes", path.display()),
            ));
        }
        let fd = unsafe { libc::epoll_create1(libc::EPOLL_CLOEXEC) };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(Self {
            path: path.to_path_buf(),
            epoll: unsafe { OwnedFd::from_raw_fd(fd) },
            nodes: Vec::new(),
            pending: VecDeque::new(),
        })
    }

    /// Event nodes currently exported for this controller.
    fn scan_nodes(&self) -> Vec<(Interfaces, PathBuf)> {
        let Ok(inputs) = fs::read_dir(self.path.join("input")) else {
            return Vec::new();
        };
        let mut found = Vec::new();
        for input in inputs.filter_map(|entry| entry.ok()) {
            let dir = input.path();
            let Ok(name) = fs::read_to_string(dir.join("name")) else {
                continue;
            };
            let Some(iface) = iface_from_name(name.trim()) else {
                continue;
            };
            let event = fs::read_dir(&dir).ok().and_then(|entries| {
                entries
                    .filter_map(|entry| entry.ok())
                    .map(|entry| entry.file_name().to_string_lossy().into_owned())
                    .find(|name| name.starts_with("event"))
            });
            if let Some(event) = event {
                found.push((iface, Path::new("/dev/input").join(event)));
            }
        }
        found
    }

    fn watch(&self, node: &Node) -> io::Result<()> {
        let mut event = libc::epoll_event {
            events: (libc::EPOLLIN | libc::EPOLLERR | libc::EPOLLHUP) as u32,
            u64: node.iface.bits() as u64,
        };
        let ret = unsafe {
            libc::epoll_ctl(
                self.epoll.as_raw_fd(),
                libc::EPOLL_CTL_ADD,
                node.device.as_raw_fd(),
                &mut event,
            )
        };
        if ret < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn unwatch(&self, node: &Node) {
        unsafe {
            libc::epoll_ctl(
                self.epoll.as_raw_fd(),
                libc::EPOLL_CTL_DEL,
                node.device.as_raw_fd(),
                std::ptr::null_mut(),
            );
        }
    }

    fn drop_node(&mut self, iface: Interfaces) {
        if let Some(index) = self.nodes.iter().position(|n| n.iface == iface) {
            let node = self.nodes.swap_remove(index);
            self.unwatch(&node);
            debug!("{}: closed {:?}", self.path.display(), iface);
        }
    }

    /// Reads what one node has buffered. A vanished node becomes a Watch report.
    fn read_node(&mut self, iface: Interfaces) {
        let Some(node) = self.nodes.iter_mut().find(|n| n.iface == iface) else {
            return;
        };
        let fetched = node
            .device
            .fetch_events()
            .map(|events| events.collect::<Vec<InputEvent>>());
        let events = match fetched {
            Ok(events) => events,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return,
            Err(e) => {
                if e.raw_os_error() != Some(libc::ENODEV) {
                    warn!("{}: read failed: {}", self.path.display(), e);
                }
                self.drop_node(iface);
                self.pending.push_back(Report::Watch);
                return;
            }
        };
        for event in events {
            node.feed(event, &mut self.pending);
        }
    }

    fn sysfs_led(&self, n: usize) -> io::Result<PathBuf> {
        let suffix = format!(":blue:p{}", n);
        fs::read_dir(self.path.join("leds"))?
            .filter_map(|entry| entry.ok())
            .find(|entry| entry.file_name().to_string_lossy().ends_with(&suffix))
            .map(|entry| entry.path().join("brightness"))
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no LED {}", n)))
    }
}

impl WiiDevice for HidWiimote {
    fn open(&mut self, ifaces: Interfaces) -> io::Result<()> {
        let mut failure = None;
        for (iface, node_path) in self.scan_nodes() {
            if !ifaces.contains(iface) || self.opened().contains(iface) {
                continue;
            }
            let opened = Device::open(&node_path).and_then(|device| {
                set_nonblocking(device.as_raw_fd())?;
                let node = Node::new(iface, device);
                self.watch(&node)?;
                Ok(node)
            });
            match opened {
                Ok(node) => {
                    debug!("{}: opened {:?} at {}", self.path.display(), iface, node_path.display());
                    self.nodes.push(node);
                }
                Err(e) => {
                    debug!("{}: cannot open {}: {}", self.path.display(), node_path.display(), e);
                    failure = Some(e);
                }
            }
        }
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn close(&mut self, ifaces: Interfaces) {
        for iface in ifaces.each() {
            self.drop_node(iface);
        }
    }

    fn opened(&self) -> Interfaces {
        self.nodes
            .iter()
            .fold(Interfaces::NONE, |mask, node| mask | node.iface)
    }

    fn available(&mut self) -> Interfaces {
        self.scan_nodes()
            .into_iter()
            .fold(Interfaces::NONE, |mask, (iface, _)| mask | iface)
    }

    fn dispatch(&mut self) -> io::Result<Report> {
        loop {
            if let Some(report) = self.pending.pop_front() {
                return Ok(report);
            }

            let mut ready = [libc::epoll_event { events: 0, u64: 0 }; 8];
            let n = unsafe {
                libc::epoll_wait(
                    self.epoll.as_raw_fd(),
                    ready.as_mut_ptr(),
                    ready.len() as i32,
                    0,
                )
            };
            if n < 0 {
                let e = io::Error::last_os_error();
                if e.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(e);
            }
            if n == 0 {
                return Err(io::Error::from(io::ErrorKind::WouldBlock));
            }
            for event in &ready[..n as usize] {
                let iface = Interfaces::from_bits(event.u64 as u32);
                self.read_node(iface);
            }
        }
    }

    fn fd(&self) -> RawFd {
        self.epoll.as_raw_fd()
    }

    fn led(&self, n: usize) -> io::Result<bool> {
        let value = fs::read_to_string(self.sysfs_led(n)?)?;
        Ok(value.trim().parse::<u32>().unwrap_or(0) > 0)
    }

    fn set_led(&mut self, n: usize, on: bool) -> io::Result<()> {
        fs::write(self.sysfs_led(n)?, if on { "1" } else { "0" })
    }
}

/// Opens controllers found by the sysfs hotplug source.
#[derive(Debug, Default)]
pub struct HidConnector;

impl Connector for HidConnector {
    fn connect(&mut self, path: &Path) -> io::Result<Box<dyn WiiDevice>> {
        Ok(Box::new(HidWiimote::new(path)?))
    }
}
