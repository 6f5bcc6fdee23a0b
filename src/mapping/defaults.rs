//! Seeded tables for the built-in mappings and for freshly created ones.

use super::event_map::{AxisMap, EventMap, OutCode};
use crate::protocol::{
    ABS_LIMIT, BALANCE_CORNER_SCALE, CLASSIC_SCALE, IR_X_SCALE, IR_Y_SCALE, NUNCHUK_SCALE,
    TILT_SCALE, WiiKey,
};
use evdev::{AbsoluteAxisType as Abs, Key};

fn abs(axis: Abs, scale: i32) -> AxisMap {
    AxisMap::new(OutCode::abs(axis), scale)
}

fn none(scale: i32) -> AxisMap {
    AxisMap::unmapped(scale)
}

fn buttons(pairs: &[(WiiKey, Key)]) -> [OutCode; WiiKey::COUNT] {
    let mut table = [OutCode::NONE; WiiKey::COUNT];
    for &(wii, key) in pairs {
        table[wii.index()] = OutCode::key(key);
    }
    table
}

fn accel_no_ext() -> [AxisMap; 6] {
    [
        abs(Abs::ABS_Y, -TILT_SCALE),
        abs(Abs::ABS_X, -TILT_SCALE),
        none(TILT_SCALE),
        none(TILT_SCALE),
        none(TILT_SCALE),
        none(TILT_SCALE),
    ]
}

fn accel_nunchuk() -> [AxisMap; 6] {
    [
        abs(Abs::ABS_RX, TILT_SCALE),
        abs(Abs::ABS_RY, TILT_SCALE),
        none(TILT_SCALE),
        none(TILT_SCALE),
        none(TILT_SCALE),
        none(TILT_SCALE),
    ]
}

fn accel_classic() -> [AxisMap; 6] {
    [
        abs(Abs::ABS_RX, TILT_SCALE),
        abs(Abs::ABS_RY, TILT_SCALE),
        none(TILT_SCALE),
        abs(Abs::ABS_X, TILT_SCALE),
        abs(Abs::ABS_Y, TILT_SCALE),
        none(TILT_SCALE),
    ]
}

fn stick_unmapped() -> [AxisMap; 6] {
    [
        none(CLASSIC_SCALE),
        none(-CLASSIC_SCALE),
        none(CLASSIC_SCALE),
        none(-CLASSIC_SCALE),
        none(NUNCHUK_SCALE),
        none(-NUNCHUK_SCALE),
    ]
}

fn stick_nunchuk() -> [AxisMap; 6] {
    let mut stick = stick_unmapped();
    stick[4] = abs(Abs::ABS_X, NUNCHUK_SCALE);
    stick[5] = abs(Abs::ABS_Y, -NUNCHUK_SCALE);
    stick
}

fn stick_classic() -> [AxisMap; 6] {
    let mut stick = stick_unmapped();
    stick[0] = abs(Abs::ABS_X, CLASSIC_SCALE);
    stick[1] = abs(Abs::ABS_Y, -CLASSIC_SCALE);
    stick[2] = abs(Abs::ABS_RX, CLASSIC_SCALE);
    stick[3] = abs(Abs::ABS_RY, -CLASSIC_SCALE);
    stick
}

fn balance() -> [AxisMap; 6] {
    [
        none(BALANCE_CORNER_SCALE),
        none(BALANCE_CORNER_SCALE),
        none(BALANCE_CORNER_SCALE),
        none(BALANCE_CORNER_SCALE),
        abs(Abs::ABS_X, ABS_LIMIT),
        abs(Abs::ABS_Y, ABS_LIMIT),
    ]
}

fn ir(x: Abs, y: Abs) -> [AxisMap; 2] {
    [abs(x, IR_X_SCALE), abs(y, IR_Y_SCALE)]
}

fn event_map(
    buttons: [OutCode; WiiKey::COUNT],
    accel: [AxisMap; 6],
    stick: [AxisMap; 6],
    ir: [AxisMap; 2],
) -> EventMap {
    EventMap {
        buttons,
        accel,
        stick,
        balance: balance(),
        ir,
        accel_active: false,
        ir_count: 0,
    }
}

/// Wii Remote held sideways, nunchuk layout, and the Linux gamepad layout
/// for classic and pro controllers.
pub fn gamepad() -> [EventMap; 3] {
    use WiiKey::*;

    let no_ext = buttons(&[
        (Left, Key::BTN_DPAD_DOWN),
        (Right, Key::BTN_DPAD_UP),
        (Up, Key::BTN_DPAD_LEFT),
        (Down, Key::BTN_DPAD_RIGHT),
        (A, Key::BTN_NORTH),
        (B, Key::BTN_WEST),
        (Plus, Key::BTN_START),
        (Minus, Key::BTN_SELECT),
        (Home, Key::BTN_MODE),
        (One, Key::BTN_SOUTH),
        (Two, Key::BTN_EAST),
    ]);

    let nunchuk = buttons(&[
        (Left, Key::BTN_DPAD_LEFT),
        (Right, Key::BTN_DPAD_RIGHT),
        (Up, Key::BTN_DPAD_UP),
        (Down, Key::BTN_DPAD_DOWN),
        (A, Key::BTN_SOUTH),
        (B, Key::BTN_TR2),
        (Plus, Key::BTN_START),
        (Minus, Key::BTN_SELECT),
        (Home, Key::BTN_MODE),
        (One, Key::BTN_EAST),
        (Two, Key::BTN_TR),
        (C, Key::BTN_TL),
        (Z, Key::BTN_TL2),
    ]);

    let classic = buttons(&[
        (Left, Key::BTN_DPAD_LEFT),
        (Right, Key::BTN_DPAD_RIGHT),
        (Up, Key::BTN_DPAD_UP),
        (Down, Key::BTN_DPAD_DOWN),
        (A, Key::BTN_EAST),
        (B, Key::BTN_SOUTH),
        (Plus, Key::BTN_START),
        (Minus, Key::BTN_SELECT),
        (Home, Key::BTN_MODE),
        (X, Key::BTN_NORTH),
        (Y, Key::BTN_WEST),
        (TL, Key::BTN_TL),
        (TR, Key::BTN_TR),
        (ZL, Key::BTN_TL2),
        (ZR, Key::BTN_TR2),
        (ThumbL, Key::BTN_THUMBL),
        (ThumbR, Key::BTN_THUMBR),
    ]);

    [
        event_map(no_ext, accel_no_ext(), stick_unmapped(), ir(Abs::ABS_RX, Abs::ABS_RY)),
        event_map(nunchuk, accel_nunchuk(), stick_nunchuk(), ir(Abs::ABS_RX, Abs::ABS_RY)),
        event_map(classic, accel_classic(), stick_classic(), ir(Abs::ABS_RX, Abs::ABS_RY)),
    ]
}

/// Media keys and mouse clicks; IR drives the absolute pointer.
pub fn keyboard_mouse() -> [EventMap; 3] {
    use WiiKey::*;

    let base = [
        (Left, Key::KEY_LEFT),
        (Right, Key::KEY_RIGHT),
        (Up, Key::KEY_UP),
        (Down, Key::KEY_DOWN),
        (A, Key::BTN_LEFT),
        (B, Key::BTN_RIGHT),
        (Plus, Key::KEY_VOLUMEUP),
        (Minus, Key::KEY_VOLUMEDOWN),
        (Home, Key::KEY_ESC),
        (One, Key::BTN_MIDDLE),
        (Two, Key::KEY_MUTE),
    ];

    let no_ext = buttons(&base);

    let mut nunchuk = buttons(&base);
    nunchuk[C.index()] = OutCode::key(Key::BTN_TL);
    nunchuk[Z.index()] = OutCode::key(Key::BTN_TL2);

    let mut classic = buttons(&base);
    for (wii, key) in [
        (X, Key::BTN_NORTH),
        (Y, Key::BTN_WEST),
        (TL, Key::BTN_TL),
        (TR, Key::BTN_TR),
        (ZL, Key::BTN_TL2),
        (ZR, Key::BTN_TR2),
        (ThumbL, Key::BTN_THUMBL),
        (ThumbR, Key::BTN_THUMBR),
    ] {
        classic[wii.index()] = OutCode::key(key);
    }

    [
        event_map(no_ext, accel_no_ext(), stick_unmapped(), ir(Abs::ABS_X, Abs::ABS_Y)),
        event_map(nunchuk, accel_nunchuk(), stick_nunchuk(), ir(Abs::ABS_X, Abs::ABS_Y)),
        event_map(classic, accel_classic(), stick_classic(), ir(Abs::ABS_X, Abs::ABS_Y)),
    ]
}

/// Every entry NO_MAP; the starting point for user-created mappings.
pub fn blank() -> [EventMap; 3] {
    let mut balance = balance();
    balance[4] = none(ABS_LIMIT);
    balance[5] = none(ABS_LIMIT);

    let map = EventMap {
        buttons: [OutCode::NONE; WiiKey::COUNT],
        accel: [
            none(-TILT_SCALE),
            none(-TILT_SCALE),
            none(TILT_SCALE),
            none(TILT_SCALE),
            none(TILT_SCALE),
            none(TILT_SCALE),
        ],
        stick: stick_unmapped(),
        balance,
        ir: [none(IR_X_SCALE), none(IR_Y_SCALE)],
        accel_active: false,
        ir_count: 0,
    };
    [map.clone(), map.clone(), map]
}
