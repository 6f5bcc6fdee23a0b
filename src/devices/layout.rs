/// Layout del gamepad virtual, siguiendo la API de gamepads de Linux
/// (Documentation/input/gamepad.rst).
///
/// No se pueden cambiar los tipos de evento después de crear el device,
/// así que el gamepad se crea con todos, aunque no estén mapeados.
pub struct GamepadLayout;

impl GamepadLayout {
    pub const BUTTON_COUNT: usize = 17;

    pub const BUTTON_CODES: [u16; Self::BUTTON_COUNT] = [
        0x130, // BTN_SOUTH
        0x131, // BTN_EAST
        0x133, // BTN_NORTH
        0x134, // BTN_WEST
        0x13a, // BTN_SELECT
        0x13c, // BTN_MODE
        0x13b, // BTN_START
        0x136, // BTN_TL
        0x138, // BTN_TL2
        0x137, // BTN_TR
        0x139, // BTN_TR2
        0x13d, // BTN_THUMBL
        0x13e, // BTN_THUMBR
        0x220, // BTN_DPAD_UP
        0x221, // BTN_DPAD_DOWN
        0x222, // BTN_DPAD_LEFT
        0x223, // BTN_DPAD_RIGHT
    ];

    // ----- AXES -----
    //   ABS_X   left stick X  (también nunchuk / inclinación)
    //   ABS_Y   left stick Y
    //   ABS_RX  right stick X (también puntero IR)
    //   ABS_RY  right stick Y
    pub const AXIS_COUNT: usize = 4;

    pub const AXIS_CODES: [u16; Self::AXIS_COUNT] = [
        0x00, // ABS_X
        0x01, // ABS_Y
        0x03, // ABS_RX
        0x04, // ABS_RY
    ];

    pub const STICK_MIN: i32 = -32768;
    pub const STICK_MAX: i32 = 32767;
    pub const STICK_FLAT: i32 = 4096;
}

/// Layout del teclado/ratón virtual compartido (slot 0 y slots en modo teclado).
pub struct KeyboardMouseLayout;

impl KeyboardMouseLayout {
    /// Todas las teclas antes de BTN_MISC.
    pub const KEYS_LOW: std::ops::Range<u16> = 1..0x100;
    /// KEY_OK hasta KEY_MAX.
    pub const KEYS_HIGH: std::ops::Range<u16> = 0x160..0x2ff;

    pub const MOUSE_BUTTONS: [u16; 5] = [
        0x110, // BTN_LEFT
        0x112, // BTN_MIDDLE
        0x111, // BTN_RIGHT
        0x14a, // BTN_TOUCH
        0x140, // BTN_TOOL_PEN: le indica a evdev que las posiciones son absolutas
    ];

    pub const AXIS_CODES: [u16; 2] = [
        0x00, // ABS_X
        0x01, // ABS_Y
    ];
}
