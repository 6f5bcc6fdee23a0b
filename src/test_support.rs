//! Test doubles for the driver layer and the output sinks.

use crate::devices::OutputSink;
use crate::driver::{Connector, Interfaces, Report, WiiDevice};
use crate::slots::LedPattern;
use evdev::InputEvent;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Captures everything written to it; clones share the same buffer.
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Rc<RefCell<Vec<InputEvent>>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<InputEvent> {
        self.events.borrow().clone()
    }

    pub fn take(&self) -> Vec<InputEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

impl OutputSink for RecordingSink {
    fn emit(&mut self, events: &[InputEvent]) -> io::Result<()> {
        self.events.borrow_mut().extend_from_slice(events);
        Ok(())
    }
}

fn socketpair() -> (OwnedFd, OwnedFd) {
    let mut fds = [0; 2];
    let ret = unsafe {
        libc::socketpair(
            libc::AF_UNIX,
            libc::SOCK_STREAM | libc::SOCK_NONBLOCK | libc::SOCK_CLOEXEC,
            0,
            fds.as_mut_ptr(),
        )
    };
    assert_eq!(ret, 0, "socketpair: {}", io::Error::last_os_error());
    unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) }
}

/// Test-side handle for feeding a boxed MockWiimote.
#[derive(Clone)]
pub struct MockFeed {
    queue: Rc<RefCell<VecDeque<io::Result<Report>>>>,
    available: Rc<Cell<Interfaces>>,
    writer: Rc<OwnedFd>,
}

impl MockFeed {
    pub fn push(&self, report: Report) {
        self.queue.borrow_mut().push_back(Ok(report));
        self.wake();
    }

    /// Queues a read error, e.g. ENODEV from a vanished node.
    pub fn fail(&self, kind: io::ErrorKind) {
        self.queue
            .borrow_mut()
            .push_back(Err(io::Error::new(kind, "mock read failure")));
        self.wake();
    }

    /// Simulates an extension being plugged or pulled.
    pub fn set_available(&self, ifaces: Interfaces) {
        self.available.set(ifaces);
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    fn wake(&self) {
        let byte = [1u8];
        unsafe {
            libc::write(self.writer.as_raw_fd(), byte.as_ptr().cast(), 1);
        }
    }
}

pub struct MockWiimote {
    opened: Interfaces,
    refused: Interfaces,
    leds: Rc<RefCell<LedPattern>>,
    feed: MockFeed,
    reader: OwnedFd,
}

impl MockWiimote {
    pub fn with_ifaces(available: Interfaces) -> Self {
        let (reader, writer) = socketpair();
        Self {
            opened: Interfaces::NONE,
            refused: Interfaces::NONE,
            leds: Rc::new(RefCell::new([false; 4])),
            feed: MockFeed {
                queue: Rc::new(RefCell::new(VecDeque::new())),
                available: Rc::new(Cell::new(available)),
                writer: Rc::new(writer),
            },
            reader,
        }
    }

    pub fn remote() -> Self {
        Self::with_ifaces(Interfaces::CORE | Interfaces::ACCEL | Interfaces::IR)
    }

    pub fn pro() -> Self {
        Self::with_ifaces(Interfaces::PRO)
    }

    pub fn balance() -> Self {
        Self::with_ifaces(Interfaces::BALANCE)
    }

    pub fn with_leds(self, pattern: LedPattern) -> Self {
        *self.leds.borrow_mut() = pattern;
        self
    }

    /// Opening any of these fails with PermissionDenied.
    pub fn refusing(mut self, ifaces: Interfaces) -> Self {
        self.refused = ifaces;
        self
    }

    pub fn leds(&self) -> Rc<RefCell<LedPattern>> {
        Rc::clone(&self.leds)
    }

    pub fn feed(&self) -> MockFeed {
        self.feed.clone()
    }

    fn drain_wakeups(&self) {
        let mut buf = [0u8; 64];
        loop {
            let n = unsafe {
                libc::read(self.reader.as_raw_fd(), buf.as_mut_ptr().cast(), buf.len())
            };
            if n <= 0 {
                break;
            }
        }
    }
}

impl WiiDevice for MockWiimote {
    fn open(&mut self, ifaces: Interfaces) -> io::Result<()> {
        let available = self.feed.available.get();
        let refused = ifaces & self.refused & available;
        self.opened |= (ifaces - self.refused) & available;
        if refused.is_empty() {
            Ok(())
        } else {
            Err(io::Error::from(io::ErrorKind::PermissionDenied))
        }
    }

    fn close(&mut self, ifaces: Interfaces) {
        self.opened = self.opened - ifaces;
    }

    fn opened(&self) -> Interfaces {
        self.opened & self.feed.available.get()
    }

    fn available(&mut self) -> Interfaces {
        self.feed.available.get()
    }

    fn dispatch(&mut self) -> io::Result<Report> {
        let next = self.feed.queue.borrow_mut().pop_front();
        match next {
            Some(report) => report,
            None => {
                self.drain_wakeups();
                Err(io::Error::from(io::ErrorKind::WouldBlock))
            }
        }
    }

    fn fd(&self) -> RawFd {
        self.reader.as_raw_fd()
    }

    fn led(&self, n: usize) -> io::Result<bool> {
        self.leds
            .borrow()
            .get(n)
            .copied()
            .ok_or_else(|| io::Error::from(io::ErrorKind::InvalidInput))
    }

    fn set_led(&mut self, n: usize, on: bool) -> io::Result<()> {
        match self.leds.borrow_mut().get_mut(n) {
            Some(led) => {
                *led = on;
                Ok(())
            }
            None => Err(io::Error::from(io::ErrorKind::InvalidInput)),
        }
    }
}

#[derive(Default)]
struct ConnectorState {
    prepared: HashMap<PathBuf, VecDeque<MockWiimote>>,
    restored: HashMap<PathBuf, Rc<RefCell<LedPattern>>>,
}

/// Hands out prepared mocks per path. Unprepared connects are the LED
/// restore on forget, and are recorded for `restored`.
#[derive(Clone, Default)]
pub struct MockConnector {
    state: Rc<RefCell<ConnectorState>>,
}

impl MockConnector {
    pub fn prepare(&self, path: &Path, remote: MockWiimote) {
        self.state
            .borrow_mut()
            .prepared
            .entry(path.to_path_buf())
            .or_default()
            .push_back(remote);
    }

    pub fn restored(&self, path: &Path) -> Option<LedPattern> {
        self.state
            .borrow()
            .restored
            .get(path)
            .map(|leds| *leds.borrow())
    }
}

impl Connector for MockConnector {
    fn connect(&mut self, path: &Path) -> io::Result<Box<dyn WiiDevice>> {
        let mut state = self.state.borrow_mut();
        if let Some(remote) = state.prepared.get_mut(path).and_then(VecDeque::pop_front) {
            return Ok(Box::new(remote));
        }
        let remote = MockWiimote::remote();
        state.restored.insert(path.to_path_buf(), remote.leds());
        Ok(Box::new(remote))
    }
}
