//! Output keyword tables for the `map` command.

use super::event_map::OutCode;
use evdev::{AbsoluteAxisType, Key};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Gamepad and mouse button names.
static BUTTON_NAMES: LazyLock<HashMap<&'static str, Key>> = LazyLock::new(|| {
    let mut m = HashMap::new();

    // D-pad and face buttons
    m.insert("up", Key::BTN_DPAD_UP);
    m.insert("down", Key::BTN_DPAD_DOWN);
    m.insert("left", Key::BTN_DPAD_LEFT);
    m.insert("right", Key::BTN_DPAD_RIGHT);
    m.insert("north", Key::BTN_NORTH);
    m.insert("south", Key::BTN_SOUTH);
    m.insert("east", Key::BTN_EAST);
    m.insert("west", Key::BTN_WEST);

    m.insert("start", Key::BTN_START);
    m.insert("select", Key::BTN_SELECT);
    m.insert("mode", Key::BTN_MODE);
    m.insert("tl", Key::BTN_TL);
    m.insert("tr", Key::BTN_TR);
    m.insert("tl2", Key::BTN_TL2);
    m.insert("tr2", Key::BTN_TR2);
    m.insert("thumbl", Key::BTN_THUMBL);
    m.insert("thumbr", Key::BTN_THUMBR);

    // Mouse
    m.insert("left_click", Key::BTN_LEFT);
    m.insert("right_click", Key::BTN_RIGHT);
    m.insert("middle_click", Key::BTN_MIDDLE);

    m
});

/// Keyboard keys, addressed as `key_<name>`.
static KEY_NAMES: LazyLock<HashMap<&'static str, Key>> = LazyLock::new(|| {
    let mut m = HashMap::new();

    // Letters
    m.insert("a", Key::KEY_A);
    m.insert("b", Key::KEY_B);
    m.insert("c", Key::KEY_C);
    m.insert("d", Key::KEY_D);
    m.insert("e", Key::KEY_E);
    m.insert("f", Key::KEY_F);
    m.insert("g", Key::KEY_G);
    m.insert("h", Key::KEY_H);
    m.insert("i", Key::KEY_I);
    m.insert("j", Key::KEY_J);
    m.insert("k", Key::KEY_K);
    m.insert("l", Key::KEY_L);
    m.insert("m", Key::KEY_M);
    m.insert("n", Key::KEY_N);
    m.insert("o", Key::KEY_O);
    m.insert("p", Key::KEY_P);
    m.insert("q", Key::KEY_Q);
    m.insert("r", Key::KEY_R);
    m.insert("s", Key::KEY_S);
    m.insert("t", Key::KEY_T);
    m.insert("u", Key::KEY_U);
    m.insert("v", Key::KEY_V);
    m.insert("w", Key::KEY_W);
    m.insert("x", Key::KEY_X);
    m.insert("y", Key::KEY_Y);
    m.insert("z", Key::KEY_Z);

    // Numbers
    m.insert("0", Key::KEY_0);
    m.insert("1", Key::KEY_1);
    m.insert("2", Key::KEY_2);
    m.insert("3", Key::KEY_3);
    m.insert("4", Key::KEY_4);
    m.insert("5", Key::KEY_5);
    m.insert("6", Key::KEY_6);
    m.insert("7", Key::KEY_7);
    m.insert("8", Key::KEY_8);
    m.insert("9", Key::KEY_9);

    // Function keys
    m.insert("f1", Key::KEY_F1);
    m.insert("f2", Key::KEY_F2);
    m.insert("f3", Key::KEY_F3);
    m.insert("f4", Key::KEY_F4);
    m.insert("f5", Key::KEY_F5);
    m.insert("f6", Key::KEY_F6);
    m.insert("f7", Key::KEY_F7);
    m.insert("f8", Key::KEY_F8);
    m.insert("f9", Key::KEY_F9);
    m.insert("f10", Key::KEY_F10);
    m.insert("f11", Key::KEY_F11);
    m.insert("f12", Key::KEY_F12);

    // Editing and navigation
    m.insert("esc", Key::KEY_ESC);
    m.insert("enter", Key::KEY_ENTER);
    m.insert("space", Key::KEY_SPACE);
    m.insert("tab", Key::KEY_TAB);
    m.insert("backspace", Key::KEY_BACKSPACE);
    m.insert("delete", Key::KEY_DELETE);
    m.insert("insert", Key::KEY_INSERT);
    m.insert("home", Key::KEY_HOME);
    m.insert("end", Key::KEY_END);
    m.insert("pageup", Key::KEY_PAGEUP);
    m.insert("pagedown", Key::KEY_PAGEDOWN);
    m.insert("up", Key::KEY_UP);
    m.insert("down", Key::KEY_DOWN);
    m.insert("left", Key::KEY_LEFT);
    m.insert("right", Key::KEY_RIGHT);
    m.insert("minus", Key::KEY_MINUS);
    m.insert("equal", Key::KEY_EQUAL);
    m.insert("comma", Key::KEY_COMMA);
    m.insert("dot", Key::KEY_DOT);
    m.insert("slash", Key::KEY_SLASH);
    m.insert("semicolon", Key::KEY_SEMICOLON);
    m.insert("apostrophe", Key::KEY_APOSTROPHE);
    m.insert("grave", Key::KEY_GRAVE);
    m.insert("leftbrace", Key::KEY_LEFTBRACE);
    m.insert("rightbrace", Key::KEY_RIGHTBRACE);
    m.insert("backslash", Key::KEY_BACKSLASH);

    // Modifiers
    m.insert("leftshift", Key::KEY_LEFTSHIFT);
    m.insert("rightshift", Key::KEY_RIGHTSHIFT);
    m.insert("leftctrl", Key::KEY_LEFTCTRL);
    m.insert("rightctrl", Key::KEY_RIGHTCTRL);
    m.insert("leftalt", Key::KEY_LEFTALT);
    m.insert("rightalt", Key::KEY_RIGHTALT);
    m.insert("leftmeta", Key::KEY_LEFTMETA);
    m.insert("rightmeta", Key::KEY_RIGHTMETA);
    m.insert("capslock", Key::KEY_CAPSLOCK);

    // Media
    m.insert("mute", Key::KEY_MUTE);
    m.insert("volumeup", Key::KEY_VOLUMEUP);
    m.insert("volumedown", Key::KEY_VOLUMEDOWN);
    m.insert("playpause", Key::KEY_PLAYPAUSE);
    m.insert("nextsong", Key::KEY_NEXTSONG);
    m.insert("previoussong", Key::KEY_PREVIOUSSONG);
    m.insert("stopcd", Key::KEY_STOPCD);

    m
});

/// Resolves an output button keyword. `none` yields NO_MAP.
pub fn output_button(name: &str) -> Option<OutCode> {
    if name == "none" {
        return Some(OutCode::NONE);
    }
    if let Some(key) = name.strip_prefix("key_") {
        return KEY_NAMES.get(key).map(|&k| OutCode::key(k));
    }
    BUTTON_NAMES.get(name).map(|&k| OutCode::key(k))
}

/// Resolves an output axis keyword. `mouse_x`/`mouse_y` alias the left stick.
pub fn output_axis(name: &str) -> Option<OutCode> {
    let axis = match name {
        "left_x" | "mouse_x" => AbsoluteAxisType::ABS_X,
        "left_y" | "mouse_y" => AbsoluteAxisType::ABS_Y,
        "right_x" => AbsoluteAxisType::ABS_RX,
        "right_y" => AbsoluteAxisType::ABS_RY,
        "none" => return Some(OutCode::NONE),
        _ => return None,
    };
    Some(OutCode::abs(axis))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buttons_and_keys() {
        assert_eq!(output_button("east"), Some(OutCode::key(Key::BTN_EAST)));
        assert_eq!(output_button("left_click"), Some(OutCode::key(Key::BTN_LEFT)));
        assert_eq!(output_button("key_leftshift"), Some(OutCode::key(Key::KEY_LEFTSHIFT)));
        assert_eq!(output_button("none"), Some(OutCode::NONE));
        assert_eq!(output_button("key_nosuchkey"), None);
        assert_eq!(output_button("banana"), None);
    }

    #[test]
    fn axes() {
        assert_eq!(output_axis("mouse_x"), output_axis("left_x"));
        assert_eq!(output_axis("right_y"), Some(OutCode::abs(AbsoluteAxisType::ABS_RY)));
        assert_eq!(output_axis("south"), None);
    }
}
