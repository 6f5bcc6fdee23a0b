// Hardware-side constants: Wii button ids, axis slots and calibration values.

/// Output code sentinel meaning "do not produce this output".
pub const NO_MAP: i32 = -1;

/// Virtual axes report ±ABS_LIMIT.
pub const ABS_LIMIT: i32 = 32767;

pub const TILT_LIMIT: i32 = 80;
pub const TILT_SCALE: i32 = ABS_LIMIT / TILT_LIMIT;
pub const NUNCHUK_LIMIT: i32 = 90;
pub const NUNCHUK_SCALE: i32 = ABS_LIMIT / NUNCHUK_LIMIT;
pub const CLASSIC_LIMIT: i32 = 22;
pub const CLASSIC_SCALE: i32 = ABS_LIMIT / CLASSIC_LIMIT;

pub const IR_X_DIVISOR: i32 = 400;
pub const IR_Y_DIVISOR: i32 = 300;
pub const IR_X_SCALE: i32 = ABS_LIMIT / IR_X_DIVISOR;
pub const IR_Y_SCALE: i32 = ABS_LIMIT / IR_Y_DIVISOR;
pub const BALANCE_CORNER_SCALE: i32 = ABS_LIMIT / 600;

/// IR x value reported for a point the camera does not see.
pub const IR_MISSING: i32 = 1023;

/// Max length for device names and mapping names.
pub const MAX_NAME_LEN: usize = 32;

/// Buttons as reported by the driver layer, across every extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WiiKey {
    Left = 0,
    Right,
    Up,
    Down,
    A,
    B,
    Plus,
    Minus,
    Home,
    One,
    Two,
    X,
    Y,
    TL,
    TR,
    ZL,
    ZR,
    ThumbL,
    ThumbR,
    C,
    Z,
}

impl WiiKey {
    pub const COUNT: usize = 21;

    pub const ALL: [WiiKey; Self::COUNT] = [
        WiiKey::Left,
        WiiKey::Right,
        WiiKey::Up,
        WiiKey::Down,
        WiiKey::A,
        WiiKey::B,
        WiiKey::Plus,
        WiiKey::Minus,
        WiiKey::Home,
        WiiKey::One,
        WiiKey::Two,
        WiiKey::X,
        WiiKey::Y,
        WiiKey::TL,
        WiiKey::TR,
        WiiKey::ZL,
        WiiKey::ZR,
        WiiKey::ThumbL,
        WiiKey::ThumbR,
        WiiKey::C,
        WiiKey::Z,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "left" => Some(WiiKey::Left),
            "right" => Some(WiiKey::Right),
            "up" => Some(WiiKey::Up),
            "down" => Some(WiiKey::Down),
            "a" => Some(WiiKey::A),
            "b" => Some(WiiKey::B),
            "plus" => Some(WiiKey::Plus),
            "minus" => Some(WiiKey::Minus),
            "home" => Some(WiiKey::Home),
            "1" => Some(WiiKey::One),
            "2" => Some(WiiKey::Two),
            "x" => Some(WiiKey::X),
            "y" => Some(WiiKey::Y),
            "l" => Some(WiiKey::TL),
            "r" => Some(WiiKey::TR),
            "zl" => Some(WiiKey::ZL),
            "zr" => Some(WiiKey::ZR),
            "thumbl" => Some(WiiKey::ThumbL),
            "thumbr" => Some(WiiKey::ThumbR),
            "c" => Some(WiiKey::C),
            "z" => Some(WiiKey::Z),
            _ => None,
        }
    }
}

// Axis slots inside the EventMap tables.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccelAxis {
    X = 0,
    Y,
    Z,
    NunchukX,
    NunchukY,
    NunchukZ,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StickAxis {
    LeftX = 0,
    LeftY,
    RightX,
    RightY,
    NunchukX,
    NunchukY,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceAxis {
    FrontLeft = 0,
    FrontRight,
    BackLeft,
    BackRight,
    X,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrAxis {
    X = 0,
    Y,
}

/// Any remappable hardware axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAxis {
    Accel(AccelAxis),
    Stick(StickAxis),
    Balance(BalanceAxis),
    Ir(IrAxis),
}

impl InputAxis {
    pub fn from_name(name: &str) -> Option<Self> {
        let axis = match name {
            "accel_x" => InputAxis::Accel(AccelAxis::X),
            "accel_y" => InputAxis::Accel(AccelAxis::Y),
            "accel_z" => InputAxis::Accel(AccelAxis::Z),
            "n_accel_x" => InputAxis::Accel(AccelAxis::NunchukX),
            "n_accel_y" => InputAxis::Accel(AccelAxis::NunchukY),
            "n_accel_z" => InputAxis::Accel(AccelAxis::NunchukZ),
            "ir_x" => InputAxis::Ir(IrAxis::X),
            "ir_y" => InputAxis::Ir(IrAxis::Y),
            "n_x" => InputAxis::Stick(StickAxis::NunchukX),
            "n_y" => InputAxis::Stick(StickAxis::NunchukY),
            "left_x" => InputAxis::Stick(StickAxis::LeftX),
            "left_y" => InputAxis::Stick(StickAxis::LeftY),
            "right_x" => InputAxis::Stick(StickAxis::RightX),
            "right_y" => InputAxis::Stick(StickAxis::RightY),
            "bal_x" => InputAxis::Balance(BalanceAxis::X),
            "bal_y" => InputAxis::Balance(BalanceAxis::Y),
            _ => return None,
        };
        Some(axis)
    }
}

/// Empirically tuned constants for the IR, balance board and Pro translations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub ir_center_x: f32,
    pub ir_center_y: f32,
    pub balance_deadzone: i32,
    pub balance_weight: f32,
    pub pro_stick_scale: i32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            ir_center_x: 512.0,
            ir_center_y: 380.0,
            balance_deadzone: 125,
            balance_weight: 0.7,
            pro_stick_scale: 32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_indices_follow_declaration_order() {
        for (i, key) in WiiKey::ALL.iter().enumerate() {
            assert_eq!(key.index(), i);
        }
    }

    #[test]
    fn parses_axis_keywords() {
        assert_eq!(
            InputAxis::from_name("n_x"),
            Some(InputAxis::Stick(StickAxis::NunchukX))
        );
        assert_eq!(
            InputAxis::from_name("bal_y"),
            Some(InputAxis::Balance(BalanceAxis::Y))
        );
        assert_eq!(InputAxis::from_name("bal_z"), None);
    }
}
