//! Owns the registries and ties hotplug, reports and commands together.
//! Every mutation runs on the dispatcher task.

use crate::device_registry::{DeviceId, DeviceOptions, DeviceRegistry};
use crate::devices::OutputSink;
use crate::discovery::{Hotplug, HotplugKind};
use crate::driver::{Connector, Interfaces, Report};
use crate::error::{BridgeError, Result};
use crate::input_mode::{ModeSelector, SlotType};
use crate::mapping::keywords::{output_axis, output_button};
use crate::mapping::{MappingId, MappingStore};
use crate::protocol::{Calibration, InputAxis, WiiKey};
use crate::resolver;
use crate::slots::SlotRegistry;
use crate::translator::translate;
use std::io;
use tracing::{debug, info, warn};

/// Optional driver features a mapping can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Accel,
    Ir,
}

impl Feature {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "accel" => Some(Feature::Accel),
            "ir" => Some(Feature::Ir),
            _ => None,
        }
    }
}

pub struct Bridge {
    mappings: MappingStore,
    slots: SlotRegistry,
    devices: DeviceRegistry,
    calibration: Calibration,
    connector: Box<dyn Connector>,
}

impl Bridge {
    pub fn new(
        keyboard_mouse: Box<dyn OutputSink>,
        gamepads: Vec<Box<dyn OutputSink>>,
        options: DeviceOptions,
        calibration: Calibration,
        connector: Box<dyn Connector>,
    ) -> Self {
        let mut mappings = MappingStore::new();
        let slots = SlotRegistry::new(keyboard_mouse, gamepads, &mut mappings);
        Self {
            mappings,
            slots,
            devices: DeviceRegistry::new(options),
            calibration,
            connector,
        }
    }

    pub fn mappings(&self) -> &MappingStore {
        &self.mappings
    }

    pub fn slots(&self) -> &SlotRegistry {
        &self.slots
    }

    pub fn devices(&self) -> &DeviceRegistry {
        &self.devices
    }

    pub fn hotplug(&mut self, note: &Hotplug) {
        match note.kind {
            HotplugKind::Present => self.attach(note),
            HotplugKind::Gone => {
                // A Gone for an older path must not close a newer connection.
                let current = self
                    .devices
                    .lookup(&note.address)
                    .filter(|&id| {
                        self.devices
                            .get(id)
                            .is_some_and(|d| d.path() == Some(note.path.as_path()))
                    });
                match current {
                    Some(id) => self.devices.close(id, &mut self.slots),
                    None => debug!("{}: stale removal of {}", note.address, note.path.display()),
                }
            }
        }
    }

    fn attach(&mut self, note: &Hotplug) {
        let moved = self
            .devices
            .lookup(&note.address)
            .and_then(|id| self.devices.get(id))
            .is_some_and(|d| d.is_open() && d.path() != Some(note.path.as_path()));
        let id = self.devices.find_or_create(&note.address, Some(&note.path));
        if moved {
            info!("{} reconnected at {}", note.address, note.path.display());
            self.devices.close(id, &mut self.slots);
        } else if self.devices.get(id).is_some_and(|d| d.is_open()) {
            // Input children changed under an open controller.
            self.handle_watch(id);
            return;
        }

        let handle = match self.connector.connect(&note.path) {
            Ok(handle) => handle,
            Err(e) => {
                warn!("{}: {}", note.address, BridgeError::HardwareIo(e));
                return;
            }
        };
        match self.devices.open(id, handle) {
            Ok(()) => {}
            Err(BridgeError::Ignored(name)) => {
                info!("Wii U Pro Controller {} ignored", name);
                return;
            }
            Err(e) => {
                warn!("{}: {}", note.address, e);
                return;
            }
        }
        if let Err(e) = self.devices.auto_assign(id, &mut self.slots) {
            warn!("{}: {}", note.address, e);
        }
        self.refresh(id);
    }

    /// Drains one device's buffered reports into its slot's sink. A read
    /// error other than WouldBlock closes the device; the record stays.
    pub fn service_device(&mut self, id: DeviceId) {
        loop {
            let Some(device) = self.devices.get_mut(id) else {
                return;
            };
            let Some(handle) = device.handle_mut() else {
                return;
            };
            let report = match handle.dispatch() {
                Ok(report) => report,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return,
                Err(e) => {
                    warn!("{}: {}", device.name(), BridgeError::HardwareIo(e));
                    self.devices.close(id, &mut self.slots);
                    return;
                }
            };

            if report == Report::Watch {
                self.handle_watch(id);
                continue;
            }
            // Unassigned devices are read and discarded.
            let Some(slot) = device.slot() else {
                continue;
            };
            let Some(map) = resolver::cached(device, &self.mappings) else {
                continue;
            };
            let events = translate(&report, map, &self.calibration);
            if let Some(sink) = self.slots.sink_mut(slot) {
                if let Err(e) = sink.emit(&events) {
                    debug!("slot {}: write failed: {}", slot, e);
                }
            }
        }
    }

    /// Extension plugged or pulled: reopen extension buses, re-derive the
    /// category and map, and close the device if nothing is left.
    fn handle_watch(&mut self, id: DeviceId) {
        let Some(handle) = self.devices.get_mut(id).and_then(|d| d.handle_mut()) else {
            return;
        };
        if let Err(e) = handle.open(Interfaces::EXTENSIONS) {
            debug!("extension reopen: {}", e);
        }
        let gone = handle.available().is_empty();

        self.devices.recategorize(id, &mut self.slots);
        let empty = self.devices.get(id).is_none_or(|d| d.ifaces().is_empty());
        if gone || empty {
            self.devices.close(id, &mut self.slots);
            return;
        }
        self.refresh(id);
    }

    /// Re-resolves one open device's map and feature interfaces.
    pub fn refresh(&mut self, id: DeviceId) {
        if let Some(device) = self.devices.get_mut(id) {
            if device.is_open() {
                resolver::apply(device, &self.slots, &self.mappings);
            }
        }
    }

    pub fn refresh_all(&mut self) {
        for id in self.devices.ids() {
            self.refresh(id);
        }
    }

    fn refresh_slot(&mut self, number: usize) {
        let members: Vec<DeviceId> = self
            .slots
            .get(number)
            .map(|slot| slot.members().iter().copied().collect())
            .unwrap_or_default();
        for id in members {
            self.refresh(id);
        }
    }

    fn device_id(&self, reference: &str) -> Result<DeviceId> {
        self.devices
            .lookup(reference)
            .ok_or_else(|| BridgeError::InvalidReference(reference.to_string(), "device id or address"))
    }

    fn slot_number(&self, reference: &str) -> Result<usize> {
        self.slots
            .lookup(reference)
            .ok_or_else(|| BridgeError::InvalidReference(reference.to_string(), "slot"))
    }

    fn mapping_id(&self, name: &str) -> Result<MappingId> {
        self.mappings
            .lookup(name)
            .ok_or_else(|| BridgeError::InvalidReference(name.to_string(), "mapping"))
    }

    /// `slot` is a slot name, `keyboardmouse`, or `none`.
    pub fn assign(&mut self, device: &str, slot: &str) -> Result<()> {
        let id = self.device_id(device)?;
        let target = match slot {
            "none" => None,
            name => Some(self.slot_number(name)?),
        };
        self.devices.assign(id, target, &mut self.slots)?;
        self.refresh(id);
        Ok(())
    }

    pub fn create_mapping(&mut self, name: &str) -> Result<MappingId> {
        let id = self.mappings.create(name)?;
        info!("created mapping \"{}\"", name);
        Ok(id)
    }

    pub fn delete_mapping(&mut self, name: &str) -> Result<()> {
        let id = self.mapping_id(name)?;
        self.mappings.forget(id)?;
        self.refresh_all();
        Ok(())
    }

    pub fn copy_mapping(&mut self, dest: &str, src: &str) -> Result<()> {
        let dest = self.mapping_id(dest)?;
        let src = self.mapping_id(src)?;
        self.mappings.copy_from(dest, src)?;
        self.refresh_all();
        Ok(())
    }

    /// `target` is a device reference first, then a slot name.
    pub fn set_mapping(&mut self, target: &str, name: &str) -> Result<()> {
        let mapping = match name {
            "none" => None,
            name => Some(self.mapping_id(name)?),
        };
        if let Some(id) = self.devices.lookup(target) {
            self.devices
                .set_specific_mapping(id, mapping, &mut self.mappings)?;
            self.refresh(id);
            return Ok(());
        }
        let number = self
            .slots
            .lookup(target)
            .ok_or_else(|| BridgeError::InvalidReference(target.to_string(), "device or slot"))?;
        self.slots
            .set_specific_mapping(number, mapping, &mut self.mappings)?;
        self.refresh_slot(number);
        Ok(())
    }

    pub fn set_slot_type(&mut self, slot: &str, slot_type: SlotType) -> Result<()> {
        let number = self.slot_number(slot)?;
        self.slots.set_type(number, slot_type, &mut self.mappings)?;
        info!("slot {} is now a virtual {}", number, slot_type);
        self.refresh_slot(number);
        Ok(())
    }

    pub fn rename_device(&mut self, reference: &str, new_name: &str) -> Result<()> {
        self.devices.rename(reference, new_name, &self.slots)?;
        Ok(())
    }

    /// `multiple` asks for two IR points; one and two are handled alike.
    pub fn toggle_feature(
        &mut self,
        mapping: &str,
        modes: ModeSelector,
        feature: Feature,
        on: bool,
        multiple: bool,
    ) -> Result<()> {
        let id = self.mapping_id(mapping)?;
        let entry = self
            .mappings
            .get_mut(id)
            .ok_or_else(|| BridgeError::InvalidReference(mapping.to_string(), "mapping"))?;
        for mode in modes.modes() {
            let map = entry.map_mut(mode);
            match feature {
                Feature::Accel => map.accel_active = on,
                Feature::Ir => {
                    map.ir_count = match (on, multiple) {
                        (false, _) => 0,
                        (true, false) => 1,
                        (true, true) => 2,
                    }
                }
            }
        }
        self.refresh_all();
        Ok(())
    }

    /// Sets one button or axis entry. Axes keep their scale magnitude;
    /// `invert` makes it negative.
    pub fn map_input(
        &mut self,
        mapping: &str,
        modes: ModeSelector,
        input: &str,
        output: &str,
        invert: bool,
    ) -> Result<()> {
        let id = self.mapping_id(mapping)?;
        let entry = self
            .mappings
            .get_mut(id)
            .ok_or_else(|| BridgeError::InvalidReference(mapping.to_string(), "mapping"))?;

        if let Some(key) = WiiKey::from_name(input) {
            let code = output_button(output).ok_or_else(|| {
                BridgeError::InvalidReference(output.to_string(), "output button")
            })?;
            for mode in modes.modes() {
                entry.map_mut(mode).set_button(key, code);
            }
            return Ok(());
        }

        if let Some(axis) = InputAxis::from_name(input) {
            let code = output_axis(output)
                .ok_or_else(|| BridgeError::InvalidReference(output.to_string(), "output axis"))?;
            for mode in modes.modes() {
                entry.map_mut(mode).axis_mut(axis).remap(code, invert);
            }
            return Ok(());
        }

        Err(BridgeError::InvalidReference(input.to_string(), "input event"))
    }

    /// Drops slot overrides, then closes and forgets every device so LEDs
    /// are restored and only the store's own references remain.
    pub fn shutdown(&mut self) {
        for number in 1..=self.slots.gamepad_count() {
            if let Err(e) = self.slots.set_type(number, SlotType::Gamepad, &mut self.mappings) {
                debug!("slot {}: {}", number, e);
            }
            if let Err(e) = self
                .slots
                .set_specific_mapping(number, None, &mut self.mappings)
            {
                debug!("slot {}: {}", number, e);
            }
        }
        for id in self.devices.ids() {
            self.devices.close(id, &mut self.slots);
            if let Err(e) = self
                .devices
                .forget(id, self.connector.as_mut(), &mut self.mappings)
            {
                warn!("{}", e);
            }
        }
    }
}
