//! Picks the EventMap a device translates with, and keeps the driver's
//! accelerometer and IR interfaces in line with it.

use crate::device_registry::Device;
use crate::driver::{Interfaces, WiiDevice};
use crate::error::BridgeError;
use crate::input_mode::ExtMode;
use crate::mapping::{EventMap, MappingId, MappingStore};
use crate::slots::SlotRegistry;
use tracing::{debug, warn};

/// Device override, then slot override, then the global gamepad mapping.
pub fn select(device: &Device, slots: &SlotRegistry, store: &MappingStore) -> MappingId {
    device
        .mapping()
        .filter(|&id| store.is_live(id))
        .or_else(|| {
            device
                .slot()
                .and_then(|n| slots.get(n))
                .and_then(|slot| slot.mapping())
                .filter(|&id| store.is_live(id))
        })
        .unwrap_or_else(|| store.gamepad())
}

pub fn resolve<'a>(
    device: &Device,
    slots: &SlotRegistry,
    store: &'a MappingStore,
) -> Option<&'a EventMap> {
    let mode = ExtMode::from_interfaces(device.ifaces());
    store
        .get(select(device, slots, store))
        .map(|mapping| mapping.map(mode))
}

/// Cached map for translation; falls back to the gamepad mapping if the
/// cached one is gone.
pub fn cached<'a>(device: &Device, store: &'a MappingStore) -> Option<&'a EventMap> {
    let (id, mode) = device.resolved()?;
    store
        .get(id)
        .or_else(|| store.get(store.gamepad()))
        .map(|mapping| mapping.map(mode))
}

/// Resolves, caches the result on the device and toggles accel/IR.
pub fn apply(device: &mut Device, slots: &SlotRegistry, store: &MappingStore) {
    let id = select(device, slots, store);
    let mode = ExtMode::from_interfaces(device.ifaces());
    let Some(map) = store.get(id).map(|mapping| mapping.map(mode)) else {
        return;
    };
    let (accel, ir) = (map.accel_active, map.ir_count > 0);
    device.set_resolved(id, mode);
    debug!(
        "{} uses mapping \"{}\" in {:?} mode",
        device.name(),
        store.get(id).map(|m| m.name()).unwrap_or_default(),
        mode
    );

    let name = device.name().to_string();
    if let Some(handle) = device.handle_mut() {
        toggle(handle, Interfaces::ACCEL, accel, &name);
        toggle(handle, Interfaces::IR, ir, &name);
    }
    device.sync_ifaces();
}

fn toggle(handle: &mut dyn WiiDevice, iface: Interfaces, on: bool, name: &str) {
    let opened = handle.opened().contains(iface);
    if on && !opened {
        if !handle.available().contains(iface) {
            return;
        }
        if let Err(e) = handle.open(iface) {
            warn!("{}: {}", name, BridgeError::Permission(e));
        }
    } else if !on && opened {
        handle.close(iface);
    }
}
