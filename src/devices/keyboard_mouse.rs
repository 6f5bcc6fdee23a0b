use super::layout::{GamepadLayout, KeyboardMouseLayout};
use evdev::{
    AbsInfo, AbsoluteAxisType, AttributeSet, Key, UinputAbsSetup,
    uinput::{VirtualDevice, VirtualDeviceBuilder},
};
use std::io;

pub fn create_virtual_keyboard_mouse() -> io::Result<VirtualDevice> {
    let mut keys = AttributeSet::<Key>::new();

    for code in KeyboardMouseLayout::KEYS_LOW.chain(KeyboardMouseLayout::KEYS_HIGH) {
        keys.insert(Key::new(code));
    }
    for &code in KeyboardMouseLayout::MOUSE_BUTTONS.iter() {
        keys.insert(Key::new(code));
    }

    let mut builder = VirtualDeviceBuilder::new()?
        .name("Wii Bridge Virtual Keyboard and Mouse")
        .with_keys(&keys)?;

    // Puntero absoluto (IR), mismo rango que los sticks del gamepad.
    for &code in KeyboardMouseLayout::AXIS_CODES.iter() {
        let info = AbsInfo::new(
            0,
            GamepadLayout::STICK_MIN,
            GamepadLayout::STICK_MAX,
            0,
            GamepadLayout::STICK_FLAT,
            0,
        );
        let setup = UinputAbsSetup::new(AbsoluteAxisType(code), info);
        builder = builder.with_absolute_axis(&setup)?;
    }

    builder.build()
}
