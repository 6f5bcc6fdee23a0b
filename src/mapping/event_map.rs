use crate::input_mode::ExtMode;
use crate::protocol::{InputAxis, NO_MAP, WiiKey};
use evdev::{AbsoluteAxisType, Key};

/// Output event code written to a sink, or NO_MAP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutCode(i32);

impl OutCode {
    pub const NONE: Self = Self(NO_MAP);

    pub const fn key(key: Key) -> Self {
        Self(key.0 as i32)
    }

    pub const fn abs(axis: AbsoluteAxisType) -> Self {
        Self(axis.0 as i32)
    }

    pub fn is_mapped(self) -> bool {
        self.0 != NO_MAP
    }

    /// Code as written to the sink. NO_MAP goes out as its wrapped u16 value.
    pub fn raw(self) -> u16 {
        self.0 as u16
    }
}

/// Flips the sign of an axis scale.
pub fn invert(scale: i32) -> i32 {
    scale.wrapping_neg()
}

/// One axis slot: output code plus signed multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisMap {
    pub code: OutCode,
    pub scale: i32,
}

impl AxisMap {
    pub const fn new(code: OutCode, scale: i32) -> Self {
        Self { code, scale }
    }

    pub const fn unmapped(scale: i32) -> Self {
        Self { code: OutCode::NONE, scale }
    }

    /// Remaps the axis keeping the magnitude of the scale.
    pub fn remap(&mut self, code: OutCode, inverted: bool) {
        self.code = code;
        let magnitude = self.scale.wrapping_abs();
        self.scale = if inverted { invert(magnitude) } else { magnitude };
    }
}

/// Translation table for one extension mode.
#[derive(Debug, Clone, PartialEq)]
pub struct EventMap {
    pub buttons: [OutCode; WiiKey::COUNT],
    pub accel: [AxisMap; 6],
    pub stick: [AxisMap; 6],
    pub balance: [AxisMap; 6],
    pub ir: [AxisMap; 2],
    pub accel_active: bool,
    /// 0 disables IR, 1 or 2 enables it.
    pub ir_count: u8,
}

impl EventMap {
    pub fn button(&self, key: WiiKey) -> OutCode {
        self.buttons[key.index()]
    }

    pub fn set_button(&mut self, key: WiiKey, code: OutCode) {
        self.buttons[key.index()] = code;
    }

    pub fn axis(&self, axis: InputAxis) -> AxisMap {
        match axis {
            InputAxis::Accel(a) => self.accel[a as usize],
            InputAxis::Stick(s) => self.stick[s as usize],
            InputAxis::Balance(b) => self.balance[b as usize],
            InputAxis::Ir(i) => self.ir[i as usize],
        }
    }

    pub fn axis_mut(&mut self, axis: InputAxis) -> &mut AxisMap {
        match axis {
            InputAxis::Accel(a) => &mut self.accel[a as usize],
            InputAxis::Stick(s) => &mut self.stick[s as usize],
            InputAxis::Balance(b) => &mut self.balance[b as usize],
            InputAxis::Ir(i) => &mut self.ir[i as usize],
        }
    }
}

/// A named bundle of three EventMaps, indexed by ExtMode.
#[derive(Debug, Clone, PartialEq)]
pub struct Mapping {
    name: String,
    modes: [EventMap; 3],
}

impl Mapping {
    pub fn new(name: impl Into<String>, modes: [EventMap; 3]) -> Self {
        Self {
            name: name.into(),
            modes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn map(&self, mode: ExtMode) -> &EventMap {
        &self.modes[mode.index()]
    }

    pub fn map_mut(&mut self, mode: ExtMode) -> &mut EventMap {
        &mut self.modes[mode.index()]
    }

    /// Overwrites all three tables with `other`'s, keeping this mapping's name.
    pub fn copy_tables_from(&mut self, other: &Mapping) {
        self.modes = other.modes.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::defaults;
    use crate::protocol::StickAxis;

    #[test]
    fn invert_is_involutive() {
        for scale in [1, -1, 409, -1489, 32767, i32::MIN, i32::MAX] {
            assert_eq!(invert(invert(scale)), scale);
        }
    }

    #[test]
    fn remap_keeps_magnitude() {
        let mut axis = AxisMap::new(OutCode::NONE, -364);
        axis.remap(OutCode::abs(AbsoluteAxisType::ABS_RX), false);
        assert_eq!(axis.scale, 364);
        axis.remap(OutCode::abs(AbsoluteAxisType::ABS_RX), true);
        assert_eq!(axis.scale, -364);
        assert_eq!(axis.code.raw(), AbsoluteAxisType::ABS_RX.0);
    }

    #[test]
    fn no_map_is_written_raw() {
        assert!(!OutCode::NONE.is_mapped());
        assert_eq!(OutCode::NONE.raw(), u16::MAX);
    }

    #[test]
    fn copy_keeps_name() {
        let mut dest = Mapping::new("couch", defaults::blank());
        let src = Mapping::new("gamepad", defaults::gamepad());
        dest.copy_tables_from(&src);
        assert_eq!(dest.name(), "couch");
        assert_eq!(dest.map(ExtMode::Classic), src.map(ExtMode::Classic));
        assert_eq!(
            dest.map(ExtMode::Nunchuk)
                .axis(InputAxis::Stick(StickAxis::NunchukX))
                .code,
            OutCode::abs(AbsoluteAxisType::ABS_X)
        );
    }
}
