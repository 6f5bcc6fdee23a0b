//! Driver-layer boundary: the core talks to controllers only through these traits.

pub mod hid_wiimote;

use crate::protocol::WiiKey;
use std::io;
use std::ops::{BitAnd, BitOr, BitOrAssign, Sub};
use std::os::fd::RawFd;
use std::path::Path;

/// Interface bitmask of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Interfaces(u32);

impl Interfaces {
    pub const NONE: Self = Self(0);
    pub const CORE: Self = Self(0x0001);
    pub const ACCEL: Self = Self(0x0002);
    pub const IR: Self = Self(0x0004);
    pub const MOTION_PLUS: Self = Self(0x0100);
    pub const NUNCHUK: Self = Self(0x0200);
    pub const CLASSIC: Self = Self(0x0400);
    pub const BALANCE: Self = Self(0x0800);
    pub const PRO: Self = Self(0x1000);
    pub const ALL: Self = Self(0x1f07);
    pub const WRITABLE: Self = Self(0x10000);

    /// Interfaces that identify a usable controller.
    pub const RECOGNIZED: Self = Self(0x0001 | 0x0800 | 0x1000);
    /// Extension buses reopened on a watch report.
    pub const EXTENSIONS: Self = Self(0x0200 | 0x0400 | 0x0800 | 0x1000);

    pub fn bits(self) -> u32 {
        self.0
    }

    /// Unknown bits are dropped.
    pub fn from_bits(bits: u32) -> Self {
        Self(bits & (Self::ALL.0 | Self::WRITABLE.0))
    }

    /// Every single-interface flag contained in `self`.
    pub fn each(self) -> impl Iterator<Item = Interfaces> {
        (0..u32::BITS)
            .map(|bit| Self(1 << bit))
            .filter(move |flag| self.contains(*flag) && !Self::WRITABLE.contains(*flag))
    }

    pub fn is_empty(self) -> bool {
        self.0 & Self::ALL.0 == 0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for Interfaces {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Interfaces {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Interfaces {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Sub for Interfaces {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 & !rhs.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Abs {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Abs {
    pub const fn xy(x: i32, y: i32) -> Self {
        Self { x, y, z: 0 }
    }

    pub const fn xyz(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// One typed report decoded by the driver layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Key { key: WiiKey, state: i32 },
    /// Stick position and nunchuk accelerometer.
    NunchukMove { stick: Abs, accel: Abs },
    /// Left stick, right stick, analog triggers.
    ClassicMove { left: Abs, right: Abs, triggers: Abs },
    ProMove { left: Abs, right: Abs },
    Accel(Abs),
    /// Four IR slots; x == 1023 means nothing tracked.
    Ir([Abs; 4]),
    /// Sensors in order front-right, back-right, front-left, back-left.
    Balance([i32; 4]),
    /// Extension plugged or unplugged, or the controller went away.
    Watch,
}

/// One opened controller.
pub trait WiiDevice {
    fn open(&mut self, ifaces: Interfaces) -> io::Result<()>;
    fn close(&mut self, ifaces: Interfaces);
    fn opened(&self) -> Interfaces;
    fn available(&mut self) -> Interfaces;
    /// Next buffered report; `ErrorKind::WouldBlock` once drained.
    fn dispatch(&mut self) -> io::Result<Report>;
    /// Pollable descriptor, readable while reports are pending.
    fn fd(&self) -> RawFd;
    fn led(&self, n: usize) -> io::Result<bool>;
    fn set_led(&mut self, n: usize, on: bool) -> io::Result<()>;
}

/// Creates device handles from hotplug paths.
pub trait Connector {
    fn connect(&mut self, path: &Path) -> io::Result<Box<dyn WiiDevice>>;
}
