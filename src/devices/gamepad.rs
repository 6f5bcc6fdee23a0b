use super::layout::GamepadLayout;
use evdev::{
    AbsInfo, AbsoluteAxisType, AttributeSet, Key, UinputAbsSetup,
    uinput::{VirtualDevice, VirtualDeviceBuilder},
};
use std::io;

pub fn create_virtual_gamepad() -> io::Result<VirtualDevice> {
    let mut keys = AttributeSet::<Key>::new();
    for &code in GamepadLayout::BUTTON_CODES.iter() {
        keys.insert(Key::new(code));
    }

    let mut builder = VirtualDeviceBuilder::new()?
        .name("Wii Bridge Virtual Gamepad")
        .with_keys(&keys)?;

    for &code in GamepadLayout::AXIS_CODES.iter() {
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
