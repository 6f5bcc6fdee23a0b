//! Arena of reference-counted mappings.
//!
//! Every listed mapping carries one reference held by the store. Devices and
//! slots that point at a mapping hold one more each. An entry is freed the
//! moment its count reaches zero, and its id goes stale (the generation moves
//! on), so a released id can never alias a later mapping.

use super::defaults;
use super::event_map::Mapping;
use crate::error::{BridgeError, Result};
use crate::protocol::MAX_NAME_LEN;
use tracing::{debug, info};

pub const GAMEPAD: &str = "gamepad";
pub const KEYBOARD_MOUSE: &str = "keyboardmouse";

/// Words a mapping name may not take, since commands parse them positionally.
const RESERVED: [&str; 5] = ["wiimote", "nunchuk", "classic", "all", "none"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MappingId {
    index: u32,
    generation: u32,
}

struct Entry {
    mapping: Mapping,
    refs: usize,
    listed: bool,
}

#[derive(Default)]
struct Node {
    generation: u32,
    entry: Option<Entry>,
}

pub struct MappingStore {
    nodes: Vec<Node>,
    free: Vec<u32>,
    gamepad: MappingId,
    keyboard_mouse: MappingId,
    freed: usize,
}

impl MappingStore {
    /// Seeds the two built-ins.
    pub fn new() -> Self {
        let mut store = Self {
            nodes: Vec::new(),
            free: Vec::new(),
            gamepad: MappingId { index: 0, generation: 0 },
            keyboard_mouse: MappingId { index: 0, generation: 0 },
            freed: 0,
        };
        store.gamepad = store.insert(Mapping::new(GAMEPAD, defaults::gamepad()));
        store.keyboard_mouse =
            store.insert(Mapping::new(KEYBOARD_MOUSE, defaults::keyboard_mouse()));
        store
    }

    pub fn gamepad(&self) -> MappingId {
        self.gamepad
    }

    pub fn keyboard_mouse(&self) -> MappingId {
        self.keyboard_mouse
    }

    pub fn is_builtin(&self, id: MappingId) -> bool {
        id == self.gamepad || id == self.keyboard_mouse
    }

    fn insert(&mut self, mapping: Mapping) -> MappingId {
        let entry = Entry {
            mapping,
            refs: 1,
            listed: true,
        };
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.nodes.push(Node::default());
                (self.nodes.len() - 1) as u32
            }
        };
        let node = &mut self.nodes[index as usize];
        node.entry = Some(entry);
        MappingId {
            index,
            generation: node.generation,
        }
    }

    fn entry(&self, id: MappingId) -> Option<&Entry> {
        self.nodes
            .get(id.index as usize)
            .filter(|node| node.generation == id.generation)
            .and_then(|node| node.entry.as_ref())
    }

    fn entry_mut(&mut self, id: MappingId) -> Option<&mut Entry> {
        self.nodes
            .get_mut(id.index as usize)
            .filter(|node| node.generation == id.generation)
            .and_then(|node| node.entry.as_mut())
    }

    /// Creates a blank mapping, listed under `name`.
    pub fn create(&mut self, name: &str) -> Result<MappingId> {
        validate_name(name)?;
        if self.lookup(name).is_some() {
            return Err(BridgeError::ProtectedResource(
                name.to_string(),
                "a mapping with that name already exists",
            ));
        }
        let id = self.insert(Mapping::new(name, defaults::blank()));
        info!("created mapping \"{}\"", name);
        Ok(id)
    }

    /// Finds a listed mapping. Forgotten mappings are not browsable.
    pub fn lookup(&self, name: &str) -> Option<MappingId> {
        self.nodes.iter().enumerate().find_map(|(index, node)| {
            let entry = node.entry.as_ref()?;
            (entry.listed && entry.mapping.name() == name).then_some(MappingId {
                index: index as u32,
                generation: node.generation,
            })
        })
    }

    pub fn get(&self, id: MappingId) -> Option<&Mapping> {
        self.entry(id).map(|e| &e.mapping)
    }

    pub fn get_mut(&mut self, id: MappingId) -> Option<&mut Mapping> {
        self.entry_mut(id).map(|e| &mut e.mapping)
    }

    /// Overwrites `dest`'s three tables with `src`'s.
    pub fn copy_from(&mut self, dest: MappingId, src: MappingId) -> Result<()> {
        let source = self
            .get(src)
            .cloned()
            .ok_or_else(|| BridgeError::InvalidReference("source".into(), "mapping"))?;
        let target = self
            .get_mut(dest)
            .ok_or_else(|| BridgeError::InvalidReference("destination".into(), "mapping"))?;
        target.copy_tables_from(&source);
        Ok(())
    }

    /// Unlists a mapping and drops the store's reference. Holders keep it alive.
    pub fn forget(&mut self, id: MappingId) -> Result<()> {
        let builtin = self.is_builtin(id);
        let entry = self
            .entry_mut(id)
            .filter(|e| e.listed)
            .ok_or_else(|| BridgeError::InvalidReference("mapping".into(), "listed mapping"))?;
        if builtin {
            return Err(BridgeError::ProtectedResource(
                entry.mapping.name().to_string(),
                "default mappings cannot be deleted",
            ));
        }
        entry.listed = false;
        debug!("mapping \"{}\" unlisted", entry.mapping.name());
        self.release(id);
        Ok(())
    }

    pub fn retain(&mut self, id: MappingId) {
        if let Some(entry) = self.entry_mut(id) {
            entry.refs += 1;
        }
    }

    /// Drops one reference, freeing the mapping when none remain.
    pub fn release(&mut self, id: MappingId) {
        let Some(node) = self
            .nodes
            .get_mut(id.index as usize)
            .filter(|node| node.generation == id.generation)
        else {
            return;
        };
        let Some(entry) = node.entry.as_mut() else {
            return;
        };
        entry.refs -= 1;
        if entry.refs > 0 {
            return;
        }
        if let Some(entry) = node.entry.take() {
            info!("mapping \"{}\" is unreferenced and deleted", entry.mapping.name());
        }
        node.generation = node.generation.wrapping_add(1);
        self.free.push(id.index);
        self.freed += 1;
    }

    pub fn refcount(&self, id: MappingId) -> Option<usize> {
        self.entry(id).map(|e| e.refs)
    }

    pub fn is_live(&self, id: MappingId) -> bool {
        self.entry(id).is_some()
    }

    /// Number of mappings deallocated so far.
    pub fn freed(&self) -> usize {
        self.freed
    }

    /// Listed mapping names with their reference counts.
    pub fn listed(&self) -> Vec<(String, usize)> {
        self.nodes
            .iter()
            .filter_map(|node| node.entry.as_ref())
            .filter(|e| e.listed)
            .map(|e| (e.mapping.name().to_string(), e.refs))
            .collect()
    }
}

impl Default for MappingStore {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return Err(BridgeError::InvalidName(
            name.to_string(),
            "must be 1 to 32 characters",
        ));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(BridgeError::InvalidName(name.to_string(), "contains whitespace"));
    }
    if RESERVED.contains(&name) {
        return Err(BridgeError::InvalidName(name.to_string(), "is a reserved keyword"));
    }
    if name.starts_with("dev") {
        return Err(BridgeError::InvalidName(
            name.to_string(),
            "the \"dev\" prefix is used by device names",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input_mode::ExtMode;
    use crate::protocol::WiiKey;

    #[test]
    fn builtins_are_seeded() {
        let store = MappingStore::new();
        assert_eq!(store.lookup(GAMEPAD), Some(store.gamepad()));
        assert_eq!(store.lookup(KEYBOARD_MOUSE), Some(store.keyboard_mouse()));
        assert_eq!(store.refcount(store.gamepad()), Some(1));
        assert_eq!(store.listed().len(), 2);
    }

    #[test]
    fn builtins_cannot_be_forgotten() {
        let mut store = MappingStore::new();
        let before = store.listed();
        for id in [store.gamepad(), store.keyboard_mouse()] {
            assert!(matches!(
                store.forget(id),
                Err(BridgeError::ProtectedResource(..))
            ));
        }
        assert_eq!(store.listed(), before);
        assert_eq!(store.refcount(store.gamepad()), Some(1));
        assert_eq!(store.freed(), 0);
    }

    #[test]
    fn create_rejects_bad_names() {
        let mut store = MappingStore::new();
        for bad in ["all", "nunchuk", "none", "dev1", "", "two words", GAMEPAD] {
            assert!(store.create(bad).is_err(), "{bad} should be rejected");
        }
        assert!(store.create(&"x".repeat(33)).is_err());
        assert!(store.create("couch").is_ok());
        assert!(store.create("couch").is_err());
    }

    #[test]
    fn refcount_frees_exactly_once() {
        let mut store = MappingStore::new();
        let id = store.create("couch").unwrap();
        store.retain(id);
        store.retain(id);
        assert_eq!(store.refcount(id), Some(3));

        store.forget(id).unwrap();
        assert!(store.lookup("couch").is_none());
        assert!(store.is_live(id));
        assert_eq!(store.refcount(id), Some(2));
        assert!(store.forget(id).is_err());

        store.release(id);
        assert!(store.is_live(id));
        store.release(id);
        assert!(!store.is_live(id));
        assert_eq!(store.freed(), 1);

        // A stale id is inert.
        store.release(id);
        assert_eq!(store.freed(), 1);
    }

    #[test]
    fn freed_index_is_not_aliased() {
        let mut store = MappingStore::new();
        let old = store.create("first").unwrap();
        store.forget(old).unwrap();
        let new = store.create("second").unwrap();
        assert_ne!(old, new);
        assert!(store.get(old).is_none());
        assert_eq!(store.get(new).map(|m| m.name()), Some("second"));
    }

    #[test]
    fn copy_is_visible_to_holders() {
        let mut store = MappingStore::new();
        let id = store.create("couch").unwrap();
        store.copy_from(id, store.gamepad()).unwrap();
        let mapping = store.get(id).unwrap();
        assert_eq!(mapping.name(), "couch");
        assert_eq!(
            mapping.map(ExtMode::NoExt).button(WiiKey::A),
            store.get(store.gamepad()).unwrap().map(ExtMode::NoExt).button(WiiKey::A)
        );
    }
}
