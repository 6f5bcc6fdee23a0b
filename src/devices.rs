pub mod gamepad;
pub mod keyboard_mouse;
pub mod layout;

use evdev::{InputEvent, uinput::VirtualDevice};
use std::io;

pub use gamepad::create_virtual_gamepad;
pub use keyboard_mouse::create_virtual_keyboard_mouse;

/// Destination for translated events. Callers end every batch with SYN_REPORT.
pub trait OutputSink {
    fn emit(&mut self, events: &[InputEvent]) -> io::Result<()>;
}

impl OutputSink for VirtualDevice {
    fn emit(&mut self, events: &[InputEvent]) -> io::Result<()> {
        VirtualDevice::emit(self, events)
    }
}

/// Creates the shared keyboard/mouse plus `num_pads` gamepads.
pub fn create_sinks(
    num_pads: usize,
) -> io::Result<(Box<dyn OutputSink>, Vec<Box<dyn OutputSink>>)> {
    let keyboard_mouse: Box<dyn OutputSink> = Box::new(create_virtual_keyboard_mouse()?);
    let mut gamepads: Vec<Box<dyn OutputSink>> = Vec::with_capacity(num_pads);
    for _ in 0..num_pads {
        gamepads.push(Box::new(create_virtual_gamepad()?));
    }
    Ok((keyboard_mouse, gamepads))
}
