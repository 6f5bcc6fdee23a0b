use crate::driver::Interfaces;
use std::fmt;

/// What kind of virtual device a slot writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotType {
    KeyboardMouse,
    Gamepad,
}

impl SlotType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "keyboardmouse" => Some(SlotType::KeyboardMouse),
            "gamepad" => Some(SlotType::Gamepad),
            _ => None,
        }
    }
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotType::KeyboardMouse => write!(f, "keyboard/mouse"),
            SlotType::Gamepad => write!(f, "gamepad"),
        }
    }
}

/// Which accessory is attached; picks the EventMap used by a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtMode {
    NoExt = 0,
    Nunchuk = 1,
    Classic = 2,
}

impl ExtMode {
    pub const ALL: [ExtMode; 3] = [ExtMode::NoExt, ExtMode::Nunchuk, ExtMode::Classic];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Nunchuk wins over classic; pro controllers use the classic table.
    pub fn from_interfaces(ifaces: Interfaces) -> Self {
        if ifaces.contains(Interfaces::NUNCHUK) {
            ExtMode::Nunchuk
        } else if ifaces.intersects(Interfaces::CLASSIC | Interfaces::PRO) {
            ExtMode::Classic
        } else {
            ExtMode::NoExt
        }
    }
}

/// Mode keyword used by the control surface. `all` targets the three modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeSelector {
    One(ExtMode),
    All,
}

impl ModeSelector {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "wiimote" => Some(ModeSelector::One(ExtMode::NoExt)),
            "nunchuk" => Some(ModeSelector::One(ExtMode::Nunchuk)),
            "classic" => Some(ModeSelector::One(ExtMode::Classic)),
            "all" => Some(ModeSelector::All),
            _ => None,
        }
    }

    pub fn modes(self) -> Vec<ExtMode> {
        match self {
            ModeSelector::One(mode) => vec![mode],
            ModeSelector::All => ExtMode::ALL.to_vec(),
        }
    }
}

/// Physical controller family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Remote,
    Pro,
    Balance,
}

impl Category {
    pub fn from_interfaces(ifaces: Interfaces) -> Self {
        if ifaces.contains(Interfaces::PRO) {
            Category::Pro
        } else if ifaces.contains(Interfaces::BALANCE) {
            Category::Balance
        } else {
            Category::Remote
        }
    }

    /// Remotes and Pro controllers share one occupancy counter per slot.
    pub fn is_board(self) -> bool {
        self == Category::Balance
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Remote => write!(f, "Wii Remote"),
            Category::Pro => write!(f, "Wii U Pro Controller"),
            Category::Balance => write!(f, "Balance Board"),
        }
    }
}
