//! Known controllers, keyed by hardware address so they survive reconnects.
//!
//! States: registered and closed, open and unassigned, open and assigned,
//! closed again (record retained), and finally forgotten. Only `forget`
//! removes a record.

use crate::driver::{Connector, Interfaces, WiiDevice};
use crate::error::{BridgeError, Result};
use crate::input_mode::{Category, ExtMode};
use crate::mapping::{MappingId, MappingStore};
use crate::protocol::MAX_NAME_LEN;
use crate::slots::{LedPattern, SlotRegistry, led_pattern_for};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::os::fd::RawFd;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(usize);

impl DeviceId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DeviceOptions {
    pub set_leds: bool,
    pub restore_leds: bool,
    pub ignore_pro: bool,
}

impl Default for DeviceOptions {
    fn default() -> Self {
        Self {
            set_leds: true,
            restore_leds: true,
            ignore_pro: false,
        }
    }
}

pub struct Device {
    id: DeviceId,
    name: String,
    address: String,
    path: Option<PathBuf>,
    ifaces: Interfaces,
    category: Category,
    slot: Option<usize>,
    mapping: Option<MappingId>,
    resolved: Option<(MappingId, ExtMode)>,
    handle: Option<Box<dyn WiiDevice>>,
    original_leds: Option<LedPattern>,
    /// Bumped on every open, so readiness watchers can tell handles apart.
    epoch: u64,
    idle_reported: bool,
}

impl Device {
    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// sysfs path of the latest sighting.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn ifaces(&self) -> Interfaces {
        self.ifaces
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn slot(&self) -> Option<usize> {
        self.slot
    }

    pub fn mapping(&self) -> Option<MappingId> {
        self.mapping
    }

    pub fn resolved(&self) -> Option<(MappingId, ExtMode)> {
        self.resolved
    }

    pub fn set_resolved(&mut self, mapping: MappingId, mode: ExtMode) {
        self.resolved = Some((mapping, mode));
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn original_leds(&self) -> Option<LedPattern> {
        self.original_leds
    }

    pub fn handle_mut(&mut self) -> Option<&mut (dyn WiiDevice + 'static)> {
        self.handle.as_deref_mut()
    }

    /// Re-reads the opened interfaces from the driver.
    pub fn sync_ifaces(&mut self) {
        if let Some(handle) = self.handle.as_deref() {
            self.ifaces = handle.opened();
        }
    }

    fn show_leds(&mut self, pattern: LedPattern) {
        let Some(handle) = self.handle.as_deref_mut() else {
            return;
        };
        if let Err(e) = write_leds(handle, pattern) {
            warn!(
                "{}: {}",
                self.name,
                BridgeError::Permission(e)
            );
        }
    }
}

fn write_leds(handle: &mut dyn WiiDevice, pattern: LedPattern) -> io::Result<()> {
    let mut result = Ok(());
    for (n, &on) in pattern.iter().enumerate() {
        if let Err(e) = handle.set_led(n, on) {
            result = Err(e);
        }
    }
    result
}

fn read_leds(handle: &dyn WiiDevice) -> io::Result<LedPattern> {
    let mut pattern = [false; 4];
    for (n, led) in pattern.iter_mut().enumerate() {
        *led = handle.led(n)?;
    }
    Ok(pattern)
}

pub struct DeviceRegistry {
    devices: Vec<Option<Device>>,
    by_address: HashMap<String, DeviceId>,
    next_number: usize,
    options: DeviceOptions,
}

impl DeviceRegistry {
    pub fn new(options: DeviceOptions) -> Self {
        Self {
            devices: Vec::new(),
            by_address: HashMap::new(),
            next_number: 0,
            options,
        }
    }

    pub fn get(&self, id: DeviceId) -> Option<&Device> {
        self.devices.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: DeviceId) -> Option<&mut Device> {
        self.devices.get_mut(id.0).and_then(Option::as_mut)
    }

    fn require_mut(&mut self, id: DeviceId) -> Result<&mut Device> {
        self.get_mut(id)
            .ok_or_else(|| BridgeError::InvalidReference(id.to_string(), "device"))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter().flatten()
    }

    pub fn ids(&self) -> Vec<DeviceId> {
        self.iter().map(Device::id).collect()
    }

    /// Open devices with their pollable descriptors.
    pub fn open_fds(&self) -> Vec<(DeviceId, u64, RawFd)> {
        self.devices
            .iter()
            .flatten()
            .filter_map(|d| d.handle.as_ref().map(|h| (d.id, d.epoch, h.fd())))
            .collect()
    }

    /// Matches a device name or a hardware address.
    pub fn lookup(&self, reference: &str) -> Option<DeviceId> {
        if let Some(&id) = self.by_address.get(reference) {
            return Some(id);
        }
        self.iter().find(|d| d.name == reference).map(Device::id)
    }

    fn name_taken(&self, name: &str) -> bool {
        self.iter().any(|d| d.name == name || d.address == name)
    }

    fn default_name(&mut self) -> String {
        loop {
            self.next_number += 1;
            let name = format!("dev{}", self.next_number);
            if !self.name_taken(&name) {
                return name;
            }
        }
    }

    /// Identity lookup by address; a record is created only for unseen addresses.
    pub fn find_or_create(&mut self, address: &str, path: Option<&Path>) -> DeviceId {
        if let Some(&id) = self.by_address.get(address) {
            if let (Some(path), Some(device)) = (path, self.get_mut(id)) {
                device.path = Some(path.to_path_buf());
            }
            return id;
        }

        let name = self.default_name();
        let id = DeviceId(self.devices.len());
        debug!("registered {} as {} ({})", address, name, id);
        self.devices.push(Some(Device {
            id,
            name,
            address: address.to_string(),
            path: path.map(Path::to_path_buf),
            ifaces: Interfaces::NONE,
            category: Category::Remote,
            slot: None,
            mapping: None,
            resolved: None,
            handle: None,
            original_leds: None,
            epoch: 0,
            idle_reported: false,
        }));
        self.by_address.insert(address.to_string(), id);
        id
    }

    /// Takes ownership of a driver handle. Opening an open device is a no-op.
    pub fn open(&mut self, id: DeviceId, mut handle: Box<dyn WiiDevice>) -> Result<()> {
        let ignore_pro = self.options.ignore_pro;
        let device = self.require_mut(id)?;
        if device.is_open() {
            return Ok(());
        }

        let wanted = Interfaces::WRITABLE
            | (Interfaces::ALL - Interfaces::ACCEL - Interfaces::IR - Interfaces::MOTION_PLUS);
        if let Err(e) = handle.open(wanted) {
            debug!("{}: partial interface open: {}", device.name, e);
        }

        if !handle.available().intersects(Interfaces::RECOGNIZED) {
            warn!(
                "{} is not a usable Wii device, or the event nodes are not accessible (udev rule?)",
                device.address
            );
            return Err(BridgeError::HardwareIo(io::Error::new(
                io::ErrorKind::Unsupported,
                "no core, pro or balance board interface",
            )));
        }

        let opened = handle.opened();
        if ignore_pro && opened.contains(Interfaces::PRO) {
            return Err(BridgeError::Ignored(device.name.clone()));
        }

        if device.original_leds.is_none() {
            match read_leds(handle.as_ref()) {
                Ok(leds) => device.original_leds = Some(leds),
                Err(e) => debug!("{}: could not read LEDs: {}", device.name, e),
            }
        }

        device.ifaces = opened;
        device.category = Category::from_interfaces(opened);
        device.handle = Some(handle);
        device.epoch += 1;
        device.idle_reported = false;
        info!(
            "{} {} ({}) opened",
            device.category, device.name, device.address
        );
        Ok(())
    }

    /// Routes a freshly opened device to a slot, or leaves it idle.
    pub fn auto_assign(&mut self, id: DeviceId, slots: &mut SlotRegistry) -> Result<Option<usize>> {
        let device = self
            .get(id)
            .ok_or_else(|| BridgeError::InvalidReference(id.to_string(), "device"))?;
        let target = if slots.gamepad_count() == 0 {
            Some(crate::slots::KEYBOARD_MOUSE_SLOT)
        } else {
            slots.find_open(device.category)
        };

        match target {
            Some(number) => {
                self.assign(id, Some(number), slots)?;
                Ok(Some(number))
            }
            None => {
                let set_leds = self.options.set_leds;
                let device = self.require_mut(id)?;
                if !device.idle_reported {
                    device.idle_reported = true;
                    warn!(
                        "{}; {} stays open and listening",
                        BridgeError::ResourceExhausted(device.category.to_string()),
                        device.name
                    );
                }
                if set_leds {
                    device.show_leds(led_pattern_for(None));
                }
                Ok(None)
            }
        }
    }

    /// Moves an open device into `slot`, or out of any slot with `None`.
    pub fn assign(
        &mut self,
        id: DeviceId,
        slot: Option<usize>,
        slots: &mut SlotRegistry,
    ) -> Result<()> {
        if let Some(number) = slot {
            if slots.get(number).is_none() {
                return Err(BridgeError::InvalidReference(number.to_string(), "slot"));
            }
        }
        let set_leds = self.options.set_leds;
        let device = self.require_mut(id)?;
        if !device.is_open() {
            return Err(BridgeError::InvalidReference(
                device.name.clone(),
                "connected device",
            ));
        }

        if device.slot != slot {
            if let Some(old) = device.slot.take() {
                slots.detach(old, id, device.category);
            }
            if let Some(number) = slot {
                slots.attach(number, id, device.category)?;
                device.slot = Some(number);
                device.idle_reported = false;
                info!("{} {} added to slot {}", device.category, device.name, number);
            }
        }

        if set_leds {
            device.show_leds(led_pattern_for(device.slot));
        }
        Ok(())
    }

    /// Releases the driver handle and the slot. The record stays.
    pub fn close(&mut self, id: DeviceId, slots: &mut SlotRegistry) {
        let Some(device) = self.get_mut(id) else {
            return;
        };
        let Some(mut handle) = device.handle.take() else {
            return;
        };
        handle.close(Interfaces::ALL);
        drop(handle);

        info!("controller {} ({}) has been removed", device.name, device.address);
        if let Some(number) = device.slot.take() {
            info!("(it was assigned to slot {})", number);
            slots.detach(number, id, device.category);
        }
        device.ifaces = Interfaces::NONE;
        device.resolved = None;
    }

    /// Destroys a closed device's record, restoring its original LEDs first.
    pub fn forget(
        &mut self,
        id: DeviceId,
        connector: &mut dyn Connector,
        store: &mut MappingStore,
    ) -> Result<()> {
        let restore = self.options.restore_leds && self.options.set_leds;
        let device = self.require_mut(id)?;
        if device.is_open() {
            return Err(BridgeError::ProtectedResource(
                device.name.clone(),
                "close the device before forgetting it",
            ));
        }

        if let (true, Some(leds), Some(path)) = (restore, device.original_leds, &device.path) {
            match connector.connect(path) {
                Ok(mut handle) => {
                    if let Err(e) = write_leds(handle.as_mut(), leds) {
                        warn!("{}: {}", device.name, BridgeError::Permission(e));
                    }
                }
                Err(e) => debug!("{}: LEDs not restored: {}", device.name, e),
            }
        }

        if let Some(device) = self.devices.get_mut(id.0).and_then(Option::take) {
            self.by_address.remove(&device.address);
            if let Some(mapping) = device.mapping {
                store.release(mapping);
            }
            debug!("forgot {} ({})", device.name, device.address);
        }
        Ok(())
    }

    /// Renames a device by name or address. An unknown address gets a
    /// placeholder record that holds the name until the device shows up.
    pub fn rename(
        &mut self,
        reference: &str,
        new_name: &str,
        slots: &SlotRegistry,
    ) -> Result<DeviceId> {
        validate_device_name(new_name)?;
        if self.name_taken(new_name) || slots.lookup(new_name).is_some() || new_name == "none" {
            return Err(BridgeError::ProtectedResource(
                new_name.to_string(),
                "name already in use",
            ));
        }

        let id = match self.lookup(reference) {
            Some(id) => id,
            None if reference.contains(':') => self.find_or_create(reference, None),
            None => {
                return Err(BridgeError::InvalidReference(
                    reference.to_string(),
                    "device name or address",
                ));
            }
        };

        let device = self.require_mut(id)?;
        info!("renamed {} to {}", device.name, new_name);
        device.name = new_name.to_string();
        Ok(id)
    }

    pub fn set_specific_mapping(
        &mut self,
        id: DeviceId,
        mapping: Option<MappingId>,
        store: &mut MappingStore,
    ) -> Result<()> {
        let device = self.require_mut(id)?;
        if let Some(new) = mapping {
            store.retain(new);
        }
        if let Some(old) = std::mem::replace(&mut device.mapping, mapping) {
            store.release(old);
        }
        Ok(())
    }

    /// Re-derives the category from the opened interfaces, keeping slot
    /// occupancy counts consistent.
    pub fn recategorize(&mut self, id: DeviceId, slots: &mut SlotRegistry) {
        let Some(device) = self.get_mut(id) else {
            return;
        };
        device.sync_ifaces();
        let category = Category::from_interfaces(device.ifaces);
        if category != device.category {
            if let Some(number) = device.slot {
                slots.recategorize(number, device.category, category);
            }
            debug!("{} is now a {}", device.name, category);
            device.category = category;
        }
    }
}

fn validate_device_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return Err(BridgeError::InvalidName(
            name.to_string(),
            "must be 1 to 32 characters",
        ));
    }
    if name.contains(':') || name.chars().any(char::is_whitespace) {
        return Err(BridgeError::InvalidName(
            name.to_string(),
            "may not contain ':' or spaces",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::OutputSink;
    use crate::test_support::{MockConnector, MockWiimote, RecordingSink};

    fn slots(pads: usize, store: &mut MappingStore) -> SlotRegistry {
        let gamepads = (0..pads)
            .map(|_| Box::new(RecordingSink::default()) as Box<dyn OutputSink>)
            .collect();
        SlotRegistry::new(Box::new(RecordingSink::default()), gamepads, store)
    }

    /// Every device's slot back-reference agrees with slot membership.
    fn assert_membership(devices: &DeviceRegistry, slots: &SlotRegistry) {
        for device in devices.iter() {
            let containing: Vec<usize> = slots
                .iter()
                .filter(|s| s.members().contains(&device.id()))
                .map(|s| s.number())
                .collect();
            match device.slot() {
                None => assert!(containing.is_empty()),
                Some(n) => assert_eq!(containing, vec![n]),
            }
        }
    }

    #[test]
    fn identity_survives_reconnect() {
        let mut store = MappingStore::new();
        let mut slots = slots(2, &mut store);
        let mut devices = DeviceRegistry::new(DeviceOptions::default());

        let id = devices.find_or_create("00:11:22:33:44:55", None);
        devices.open(id, Box::new(MockWiimote::remote())).unwrap();
        devices.auto_assign(id, &mut slots).unwrap();
        devices.close(id, &mut slots);
        assert!(!devices.get(id).unwrap().is_open());
        assert_eq!(devices.get(id).unwrap().slot(), None);

        let again = devices.find_or_create("00:11:22:33:44:55", None);
        assert_eq!(again, id);
        assert_eq!(devices.iter().count(), 1);
        devices.open(id, Box::new(MockWiimote::remote())).unwrap();
        assert_eq!(devices.get(id).unwrap().epoch(), 2);
        assert_membership(&devices, &slots);
    }

    #[test]
    fn open_rejects_unrecognized_devices() {
        let mut devices = DeviceRegistry::new(DeviceOptions::default());
        let id = devices.find_or_create("aa:bb", None);
        let result = devices.open(id, Box::new(MockWiimote::with_ifaces(Interfaces::NUNCHUK)));
        assert!(matches!(result, Err(BridgeError::HardwareIo(_))));
        assert!(!devices.get(id).unwrap().is_open());
        assert!(devices.get(id).is_some());
    }

    #[test]
    fn ignore_pro_policy() {
        let mut devices = DeviceRegistry::new(DeviceOptions {
            ignore_pro: true,
            ..DeviceOptions::default()
        });
        let id = devices.find_or_create("aa:bb", None);
        let result = devices.open(id, Box::new(MockWiimote::pro()));
        assert!(matches!(result, Err(BridgeError::Ignored(_))));
    }

    #[test]
    fn original_leds_captured_once() {
        let mut store = MappingStore::new();
        let mut slots = slots(2, &mut store);
        let mut devices = DeviceRegistry::new(DeviceOptions::default());
        let id = devices.find_or_create("aa:bb", None);

        let first = MockWiimote::remote().with_leds([true, true, false, false]);
        devices.open(id, Box::new(first)).unwrap();
        devices.auto_assign(id, &mut slots).unwrap();
        devices.close(id, &mut slots);

        let second = MockWiimote::remote().with_leds([false, false, false, true]);
        devices.open(id, Box::new(second)).unwrap();
        assert_eq!(
            devices.get(id).unwrap().original_leds(),
            Some([true, true, false, false])
        );
    }

    #[test]
    fn assignment_keeps_membership_consistent() {
        let mut store = MappingStore::new();
        let mut slots = slots(2, &mut store);
        let mut devices = DeviceRegistry::new(DeviceOptions::default());

        let mut ids = Vec::new();
        for addr in ["a:1", "a:2", "a:3"] {
            let id = devices.find_or_create(addr, None);
            devices.open(id, Box::new(MockWiimote::remote())).unwrap();
            devices.auto_assign(id, &mut slots).unwrap();
            ids.push(id);
        }
        assert_eq!(devices.get(ids[0]).unwrap().slot(), Some(1));
        assert_eq!(devices.get(ids[1]).unwrap().slot(), Some(2));
        assert_eq!(devices.get(ids[2]).unwrap().slot(), None);
        assert_membership(&devices, &slots);

        devices.assign(ids[2], Some(0), &mut slots).unwrap();
        devices.assign(ids[0], Some(2), &mut slots).unwrap();
        devices.assign(ids[1], None, &mut slots).unwrap();
        assert_membership(&devices, &slots);
        assert_eq!(slots.find_open(Category::Remote), Some(1));

        assert!(devices.assign(ids[1], Some(7), &mut slots).is_err());
        assert_eq!(devices.get(ids[1]).unwrap().slot(), None);

        devices.close(ids[0], &mut slots);
        assert_membership(&devices, &slots);
        assert_eq!(slots.get(2).unwrap().count(Category::Remote), 0);
    }

    #[test]
    fn zero_pads_routes_to_keyboard_mouse() {
        let mut store = MappingStore::new();
        let mut slots = slots(0, &mut store);
        let mut devices = DeviceRegistry::new(DeviceOptions::default());
        for addr in ["a:1", "a:2"] {
            let id = devices.find_or_create(addr, None);
            devices.open(id, Box::new(MockWiimote::remote())).unwrap();
            assert_eq!(devices.auto_assign(id, &mut slots).unwrap(), Some(0));
        }
        assert_eq!(slots.get(0).unwrap().members().len(), 2);
    }

    #[test]
    fn slot_leds_follow_assignment() {
        let mut store = MappingStore::new();
        let mut slots = slots(2, &mut store);
        let mut devices = DeviceRegistry::new(DeviceOptions::default());
        let remote = MockWiimote::remote();
        let leds = remote.leds();
        let id = devices.find_or_create("a:1", None);
        devices.open(id, Box::new(remote)).unwrap();

        devices.assign(id, Some(2), &mut slots).unwrap();
        let in_slot_two = *leds.borrow();
        assert_eq!(in_slot_two, led_pattern_for(Some(2)));
        assert_ne!(in_slot_two, led_pattern_for(Some(1)));

        devices.assign(id, None, &mut slots).unwrap();
        assert_eq!(*leds.borrow(), led_pattern_for(None));
        assert_ne!(in_slot_two, led_pattern_for(None));
    }

    #[test]
    fn forget_requires_close_and_restores_leds() {
        let mut store = MappingStore::new();
        let mut slots = slots(1, &mut store);
        let mut devices = DeviceRegistry::new(DeviceOptions::default());
        let mut connector = MockConnector::default();
        let path = Path::new("/sys/bus/hid/devices/0005:057E:0306.0001");

        let id = devices.find_or_create("a:1", Some(path));
        let remote = MockWiimote::remote().with_leds([true, false, false, true]);
        devices.open(id, Box::new(remote)).unwrap();
        devices.auto_assign(id, &mut slots).unwrap();

        assert!(devices.forget(id, &mut connector, &mut store).is_err());
        devices.close(id, &mut slots);
        devices.forget(id, &mut connector, &mut store).unwrap();

        assert!(devices.get(id).is_none());
        assert!(devices.lookup("a:1").is_none());
        assert_eq!(connector.restored(path), Some([true, false, false, true]));
    }

    #[test]
    fn forget_releases_device_mapping() {
        let mut store = MappingStore::new();
        let mut devices = DeviceRegistry::new(DeviceOptions::default());
        let mut connector = MockConnector::default();
        let couch = store.create("couch").unwrap();
        let id = devices.find_or_create("a:1", None);
        devices.set_specific_mapping(id, Some(couch), &mut store).unwrap();
        store.forget(couch).unwrap();
        assert!(store.is_live(couch));

        devices.forget(id, &mut connector, &mut store).unwrap();
        assert!(!store.is_live(couch));
        assert_eq!(store.freed(), 1);
    }

    #[test]
    fn rename_rules() {
        let mut store = MappingStore::new();
        let slots = slots(2, &mut store);
        let mut devices = DeviceRegistry::new(DeviceOptions::default());
        let a = devices.find_or_create("a:1", None);
        let b = devices.find_or_create("b:2", None);
        assert_eq!(devices.get(a).unwrap().name(), "dev1");

        assert_eq!(devices.rename("dev1", "lefty", &slots).unwrap(), a);
        assert_eq!(devices.lookup("lefty"), Some(a));
        assert!(matches!(
            devices.rename("b:2", "lefty", &slots),
            Err(BridgeError::ProtectedResource(..))
        ));
        assert!(matches!(
            devices.rename("b:2", "has space", &slots),
            Err(BridgeError::InvalidName(..))
        ));
        assert!(devices.rename("b:2", "a:b", &slots).is_err());
        assert!(devices.rename("b:2", "2", &slots).is_err());
        assert!(devices.rename("b:2", &"x".repeat(33), &slots).is_err());
        assert!(matches!(
            devices.rename("ghost", "x", &slots),
            Err(BridgeError::InvalidReference(..))
        ));
        assert_eq!(devices.get(b).unwrap().name(), "dev2");

        // Unknown address: placeholder reserves the name.
        let placeholder = devices.rename("cc:dd:ee", "guest", &slots).unwrap();
        assert_eq!(devices.find_or_create("cc:dd:ee", None), placeholder);
        assert_eq!(devices.get(placeholder).unwrap().name(), "guest");
        assert!(!devices.get(placeholder).unwrap().is_open());
    }

    #[test]
    fn device_mapping_refcounts() {
        let mut store = MappingStore::new();
        let mut devices = DeviceRegistry::new(DeviceOptions::default());
        let couch = store.create("couch").unwrap();
        let id = devices.find_or_create("a:1", None);

        devices.set_specific_mapping(id, Some(couch), &mut store).unwrap();
        assert_eq!(store.refcount(couch), Some(2));
        devices.set_specific_mapping(id, Some(couch), &mut store).unwrap();
        assert_eq!(store.refcount(couch), Some(2));
        devices.set_specific_mapping(id, None, &mut store).unwrap();
        assert_eq!(store.refcount(couch), Some(1));
    }
}
