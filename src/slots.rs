//! Virtual output slots. Slot 0 is the shared keyboard/mouse, 1..=N are gamepads.

use crate::device_registry::DeviceId;
use crate::devices::OutputSink;
use crate::error::{BridgeError, Result};
use crate::input_mode::{Category, SlotType};
use crate::mapping::{MappingId, MappingStore};
use std::collections::BTreeSet;
use tracing::{info, warn};

pub type LedPattern = [bool; 4];

const SLOT_LEDS: [LedPattern; 10] = [
    [false, true, true, false], // keyboard/mouse
    [true, false, false, false],
    [false, true, false, false],
    [false, false, true, false],
    [false, false, false, true],
    [true, false, false, true],
    [false, true, false, true],
    [false, false, true, true],
    [true, false, true, true],
    [false, true, true, true],
];
const NO_SLOT_LEDS: LedPattern = [true, false, true, false];
const OVERFLOW_LEDS: LedPattern = [true, true, true, true];

pub const KEYBOARD_MOUSE_SLOT: usize = 0;

/// LEDs shown by a device in `slot`, or by an idle device.
pub fn led_pattern_for(slot: Option<usize>) -> LedPattern {
    match slot {
        None => NO_SLOT_LEDS,
        Some(n) => SLOT_LEDS.get(n).copied().unwrap_or(OVERFLOW_LEDS),
    }
}

pub struct Slot {
    number: usize,
    name: String,
    slot_type: SlotType,
    remotes: usize,
    boards: usize,
    mapping: Option<MappingId>,
    members: BTreeSet<DeviceId>,
    /// Own gamepad sink; slot 0 has none.
    gamepad: Option<Box<dyn OutputSink>>,
}

impl Slot {
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slot_type(&self) -> SlotType {
        self.slot_type
    }

    pub fn mapping(&self) -> Option<MappingId> {
        self.mapping
    }

    pub fn members(&self) -> &BTreeSet<DeviceId> {
        &self.members
    }

    pub fn count(&self, category: Category) -> usize {
        if category.is_board() {
            self.boards
        } else {
            self.remotes
        }
    }

    fn count_mut(&mut self, category: Category) -> &mut usize {
        if category.is_board() {
            &mut self.boards
        } else {
            &mut self.remotes
        }
    }
}

pub struct SlotRegistry {
    slots: Vec<Slot>,
    keyboard_mouse: Box<dyn OutputSink>,
}

impl SlotRegistry {
    /// Slot 0 takes the keyboard/mouse sink and, permanently, the
    /// keyboardmouse mapping; one gamepad slot per entry in `gamepads`.
    pub fn new(
        keyboard_mouse: Box<dyn OutputSink>,
        gamepads: Vec<Box<dyn OutputSink>>,
        store: &mut MappingStore,
    ) -> Self {
        let mut slots = vec![Slot {
            number: KEYBOARD_MOUSE_SLOT,
            name: "keyboardmouse".to_string(),
            slot_type: SlotType::KeyboardMouse,
            remotes: 0,
            boards: 0,
            mapping: None,
            members: BTreeSet::new(),
            gamepad: None,
        }];
        for (i, sink) in gamepads.into_iter().enumerate() {
            slots.push(Slot {
                number: i + 1,
                name: (i + 1).to_string(),
                slot_type: SlotType::Gamepad,
                remotes: 0,
                boards: 0,
                mapping: None,
                members: BTreeSet::new(),
                gamepad: Some(sink),
            });
        }

        let mut registry = Self {
            slots,
            keyboard_mouse,
        };
        let km = store.keyboard_mouse();
        if let Err(e) = registry.set_specific_mapping(KEYBOARD_MOUSE_SLOT, Some(km), store) {
            warn!("keyboardmouse slot left without its mapping: {}", e);
        }
        registry
    }

    pub fn gamepad_count(&self) -> usize {
        self.slots.len() - 1
    }

    pub fn get(&self, number: usize) -> Option<&Slot> {
        self.slots.get(number)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter()
    }

    /// Slot by name: `keyboardmouse` or a gamepad number.
    pub fn lookup(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.name == name)
    }

    /// First gamepad slot with no device of this category.
    pub fn find_open(&self, category: Category) -> Option<usize> {
        self.slots
            .iter()
            .skip(1)
            .find(|s| s.count(category) == 0)
            .map(|s| s.number)
    }

    pub fn attach(&mut self, number: usize, device: DeviceId, category: Category) -> Result<()> {
        let slot = self
            .slots
            .get_mut(number)
            .ok_or_else(|| BridgeError::InvalidReference(number.to_string(), "slot"))?;
        if slot.count(category) > 0 {
            warn!(
                "slot {} already has a {}; safety not guaranteed",
                slot.name,
                if category.is_board() { "balance board" } else { "controller" }
            );
        }
        *slot.count_mut(category) += 1;
        slot.members.insert(device);
        Ok(())
    }

    pub fn detach(&mut self, number: usize, device: DeviceId, category: Category) {
        if let Some(slot) = self.slots.get_mut(number) {
            if slot.members.remove(&device) {
                let count = slot.count_mut(category);
                *count = count.saturating_sub(1);
            }
        }
    }

    /// Moves one occupancy count when a member's category changes.
    pub fn recategorize(&mut self, number: usize, from: Category, to: Category) {
        if from.is_board() == to.is_board() {
            return;
        }
        if let Some(slot) = self.slots.get_mut(number) {
            let count = slot.count_mut(from);
            *count = count.saturating_sub(1);
            *slot.count_mut(to) += 1;
        }
    }

    /// Retypes a gamepad slot. The caller re-resolves every member.
    pub fn set_type(
        &mut self,
        number: usize,
        slot_type: SlotType,
        store: &mut MappingStore,
    ) -> Result<()> {
        if number == KEYBOARD_MOUSE_SLOT {
            return Err(BridgeError::ProtectedResource(
                "keyboardmouse".into(),
                "slot 0 is always the keyboard/mouse",
            ));
        }
        let km = store.keyboard_mouse();
        let slot = self
            .slots
            .get_mut(number)
            .ok_or_else(|| BridgeError::InvalidReference(number.to_string(), "slot"))?;
        slot.slot_type = slot_type;

        match slot_type {
            SlotType::Gamepad => {
                if slot.mapping == Some(km) {
                    info!("slot {} switched to the gamepad mapping", slot.name);
                    slot.mapping = None;
                    store.release(km);
                }
            }
            SlotType::KeyboardMouse => {
                if slot.mapping.is_none() {
                    info!("slot {} switched to the keyboardmouse mapping", slot.name);
                    slot.mapping = Some(km);
                    store.retain(km);
                }
            }
        }
        Ok(())
    }

    /// Replaces the slot's override. Slot 0's is set once and then frozen.
    pub fn set_specific_mapping(
        &mut self,
        number: usize,
        mapping: Option<MappingId>,
        store: &mut MappingStore,
    ) -> Result<()> {
        let slot = self
            .slots
            .get_mut(number)
            .ok_or_else(|| BridgeError::InvalidReference(number.to_string(), "slot"))?;
        if number == KEYBOARD_MOUSE_SLOT && slot.mapping.is_some() {
            return Err(BridgeError::ProtectedResource(
                "keyboardmouse".into(),
                "the keyboard/mouse slot mapping cannot be changed",
            ));
        }
        if let Some(id) = mapping {
            store.retain(id);
        }
        if let Some(old) = std::mem::replace(&mut slot.mapping, mapping) {
            store.release(old);
        }
        Ok(())
    }

    /// Sink for the slot's current type.
    pub fn sink_mut(&mut self, number: usize) -> Option<&mut dyn OutputSink> {
        let slot = self.slots.get_mut(number)?;
        match slot.slot_type {
            SlotType::KeyboardMouse => Some(self.keyboard_mouse.as_mut()),
            SlotType::Gamepad => match &mut slot.gamepad {
                Some(sink) => Some(sink.as_mut()),
                None => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingSink;

    fn registry(pads: usize, store: &mut MappingStore) -> SlotRegistry {
        let gamepads = (0..pads)
            .map(|_| Box::new(RecordingSink::default()) as Box<dyn OutputSink>)
            .collect();
        SlotRegistry::new(Box::new(RecordingSink::default()), gamepads, store)
    }

    #[test]
    fn slot_zero_is_keyboard_mouse() {
        let mut store = MappingStore::new();
        let km = store.keyboard_mouse();
        let mut slots = registry(2, &mut store);
        assert_eq!(slots.get(0).unwrap().slot_type(), SlotType::KeyboardMouse);
        assert_eq!(slots.get(0).unwrap().mapping(), Some(km));
        assert_eq!(store.refcount(km), Some(2));

        assert!(slots.set_type(0, SlotType::Gamepad, &mut store).is_err());
        assert!(slots.set_specific_mapping(0, None, &mut store).is_err());
        assert_eq!(store.refcount(km), Some(2));
        assert_eq!(slots.lookup("keyboardmouse"), Some(0));
        assert_eq!(slots.lookup("2"), Some(2));
        assert_eq!(slots.lookup("3"), None);
    }

    #[test]
    fn slot_zero_mapping_is_set_without_gamepads() {
        let mut store = MappingStore::new();
        let km = store.keyboard_mouse();
        let slots = registry(0, &mut store);
        assert_eq!(slots.gamepad_count(), 0);
        assert_eq!(slots.get(0).unwrap().mapping(), Some(km));
        assert_eq!(store.refcount(km), Some(2));
    }

    #[test]
    fn find_open_tracks_categories_separately() {
        let mut store = MappingStore::new();
        let mut slots = registry(2, &mut store);
        let (a, b, c) = (DeviceId::new(0), DeviceId::new(1), DeviceId::new(2));

        assert_eq!(slots.find_open(Category::Remote), Some(1));
        slots.attach(1, a, Category::Remote).unwrap();
        assert_eq!(slots.find_open(Category::Remote), Some(2));
        assert_eq!(slots.find_open(Category::Pro), Some(2));
        assert_eq!(slots.find_open(Category::Balance), Some(1));

        slots.attach(1, b, Category::Balance).unwrap();
        slots.attach(2, c, Category::Pro).unwrap();
        assert_eq!(slots.find_open(Category::Remote), None);
        assert_eq!(slots.find_open(Category::Balance), Some(2));

        slots.detach(1, a, Category::Remote);
        assert_eq!(slots.find_open(Category::Remote), Some(1));
        assert!(!slots.get(1).unwrap().members().contains(&a));
    }

    #[test]
    fn retyping_swaps_the_keyboard_mouse_override() {
        let mut store = MappingStore::new();
        let km = store.keyboard_mouse();
        let mut slots = registry(1, &mut store);

        slots.set_type(1, SlotType::KeyboardMouse, &mut store).unwrap();
        assert_eq!(slots.get(1).unwrap().mapping(), Some(km));
        assert_eq!(store.refcount(km), Some(3));

        slots.set_type(1, SlotType::Gamepad, &mut store).unwrap();
        assert_eq!(slots.get(1).unwrap().mapping(), None);
        assert_eq!(store.refcount(km), Some(2));
    }

    #[test]
    fn retyping_keeps_a_custom_override() {
        let mut store = MappingStore::new();
        let mut slots = registry(1, &mut store);
        let couch = store.create("couch").unwrap();
        slots.set_specific_mapping(1, Some(couch), &mut store).unwrap();

        slots.set_type(1, SlotType::KeyboardMouse, &mut store).unwrap();
        slots.set_type(1, SlotType::Gamepad, &mut store).unwrap();
        assert_eq!(slots.get(1).unwrap().mapping(), Some(couch));
        assert_eq!(store.refcount(couch), Some(2));
    }

    #[test]
    fn led_patterns() {
        assert_eq!(led_pattern_for(Some(0)), [false, true, true, false]);
        assert_eq!(led_pattern_for(Some(1)), [true, false, false, false]);
        assert_eq!(led_pattern_for(Some(2)), [false, true, false, false]);
        assert_eq!(led_pattern_for(Some(9)), [false, true, true, true]);
        assert_eq!(led_pattern_for(Some(12)), [true; 4]);
        assert_eq!(led_pattern_for(None), [true, false, true, false]);
    }

    #[test]
    fn sink_follows_slot_type() {
        let mut store = MappingStore::new();
        let mut slots = registry(1, &mut store);
        assert!(slots.sink_mut(1).is_some());
        slots.set_type(1, SlotType::KeyboardMouse, &mut store).unwrap();
        assert!(slots.sink_mut(1).is_some());
        assert!(slots.sink_mut(5).is_none());
    }
}
