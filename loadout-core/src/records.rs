//! TODO / wish-list / build record managers.
//!
//! Each manager owns one ordered list serialized as a single JSON array under
//! one store key. Every mutation is a whole-document read-modify-write;
//! operations on a missing id are silent no-ops.

use serde::{Deserialize, Serialize};

use crate::keys::{KeySpace, StoreKey};
use crate::store::{self, KeyValueStore, StoreError};

fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn load_list<T: serde::de::DeserializeOwned>(store: &dyn KeyValueStore, key: &StoreKey) -> Vec<T> {
    store::get_json(store, key, Vec::new())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoEntry {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub checked: bool,
}

pub struct TodoList {
    key: StoreKey,
}

impl TodoList {
    pub fn new(keys: &KeySpace) -> Self {
        Self {
            key: keys.todo_list(),
        }
    }

    pub fn all(&self, store: &dyn KeyValueStore) -> Vec<TodoEntry> {
        load_list(store, &self.key)
    }

    pub fn add(&self, store: &mut dyn KeyValueStore, text: &str) -> Result<String, StoreError> {
        let id = new_record_id();
        let mut list = self.all(store);
        list.push(TodoEntry {
            id: id.clone(),
            text: text.trim().to_string(),
            checked: false,
        });
        store::set_json(store, &self.key, &list)?;
        Ok(id)
    }

    pub fn update(
        &self,
        store: &mut dyn KeyValueStore,
        id: &str,
        mutate: impl FnOnce(&mut TodoEntry),
    ) -> Result<(), StoreError> {
        let mut list = self.all(store);
        let Some(entry) = list.iter_mut().find(|t| t.id == id) else {
            return Ok(());
        };
        mutate(entry);
        store::set_json(store, &self.key, &list)
    }

    pub fn toggle(&self, store: &mut dyn KeyValueStore, id: &str) -> Result<(), StoreError> {
        self.update(store, id, |t| t.checked = !t.checked)
    }

    pub fn remove(&self, store: &mut dyn KeyValueStore, id: &str) -> Result<(), StoreError> {
        let mut list = self.all(store);
        list.retain(|t| t.id != id);
        store::set_json(store, &self.key, &list)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishEntry {
    pub id: String,
    pub item: String,
    #[serde(default)]
    pub qty: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub checked: bool,
}

pub struct WishList {
    key: StoreKey,
}

impl WishList {
    pub fn new(keys: &KeySpace) -> Self {
        Self {
            key: keys.wish_list(),
        }
    }

    pub fn all(&self, store: &dyn KeyValueStore) -> Vec<WishEntry> {
        load_list(store, &self.key)
    }

    pub fn add(
        &self,
        store: &mut dyn KeyValueStore,
        item: &str,
        qty: &str,
        note: &str,
    ) -> Result<String, StoreError> {
        let id = new_record_id();
        let mut list = self.all(store);
        list.push(WishEntry {
            id: id.clone(),
            item: item.trim().to_string(),
            qty: qty.trim().to_string(),
            note: note.trim().to_string(),
            checked: false,
        });
        store::set_json(store, &self.key, &list)?;
        Ok(id)
    }

    pub fn update(
        &self,
        store: &mut dyn KeyValueStore,
        id: &str,
        mutate: impl FnOnce(&mut WishEntry),
    ) -> Result<(), StoreError> {
        let mut list = self.all(store);
        let Some(entry) = list.iter_mut().find(|w| w.id == id) else {
            return Ok(());
        };
        mutate(entry);
        store::set_json(store, &self.key, &list)
    }

    pub fn toggle(&self, store: &mut dyn KeyValueStore, id: &str) -> Result<(), StoreError> {
        self.update(store, id, |w| w.checked = !w.checked)
    }

    pub fn remove(&self, store: &mut dyn KeyValueStore, id: &str) -> Result<(), StoreError> {
        let mut list = self.all(store);
        list.retain(|w| w.id != id);
        store::set_json(store, &self.key, &list)
    }
}

// --- Builds ---

pub const MOD_SLOTS: usize = 8;

/// Build category choices offered by the editor.
pub const BUILD_KINDS: [&str; 4] = ["Warframe", "プライマリ", "セカンダリ", "近接"];

/// Slot layout for one build category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotConfig {
    pub arcanes: usize,
    pub aura: bool,
    /// Stance shares the aura storage field.
    pub stance: bool,
    pub exilus: bool,
}

/// Slot layout by category. Warframes get an aura, melee ("近接") trades the
/// arcanes for a stance, everything else is two arcanes plus exilus.
pub fn slot_config(kind: &str) -> SlotConfig {
    match kind {
        "Warframe" => SlotConfig {
            arcanes: 2,
            aura: true,
            stance: false,
            exilus: true,
        },
        "近接" => SlotConfig {
            arcanes: 0,
            aura: false,
            stance: true,
            exilus: true,
        },
        _ => SlotConfig {
            arcanes: 2,
            aura: false,
            stance: false,
            exilus: true,
        },
    }
}

fn default_build_kind() -> String {
    "Warframe".to_string()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRecord {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default = "default_build_kind")]
    pub kind: String,
    #[serde(default)]
    pub item: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub arcanes: Vec<String>,
    /// Aura slot; stores the stance for melee builds.
    #[serde(default)]
    pub aura: String,
    #[serde(default)]
    pub exilus: String,
    #[serde(default)]
    pub mods: Vec<String>,
    #[serde(default)]
    pub note: String,
}

impl BuildRecord {
    fn new(id: String) -> Self {
        let mut build = Self {
            id,
            kind: default_build_kind(),
            item: String::new(),
            name: String::new(),
            arcanes: Vec::new(),
            aura: String::new(),
            exilus: String::new(),
            mods: Vec::new(),
            note: String::new(),
        };
        build.normalize();
        build
    }

    pub fn slots(&self) -> SlotConfig {
        slot_config(&self.kind)
    }

    /// Resize the slot arrays to the category's layout. Applied after load
    /// (partial stored records merge with defaults) and after every edit
    /// (the category may have changed).
    pub fn normalize(&mut self) {
        self.arcanes.resize(self.slots().arcanes, String::new());
        self.mods.resize(MOD_SLOTS, String::new());
    }

    /// Header line for list display.
    pub fn heading(&self) -> String {
        let item = if self.item.is_empty() {
            "(no item)"
        } else {
            &self.item
        };
        let name = if self.name.is_empty() {
            "Unnamed"
        } else {
            &self.name
        };
        format!("{} – {} / {}", self.kind, item, name)
    }
}

pub struct BuildList {
    key: StoreKey,
}

impl BuildList {
    pub fn new(keys: &KeySpace) -> Self {
        Self {
            key: keys.build_list(),
        }
    }

    /// All builds, merged with defaults and with slot arrays normalized.
    pub fn all(&self, store: &dyn KeyValueStore) -> Vec<BuildRecord> {
        let mut list: Vec<BuildRecord> = load_list(store, &self.key);
        for build in &mut list {
            if build.id.is_empty() {
                build.id = new_record_id();
            }
            build.normalize();
        }
        list
    }

    /// Fill in missing ids on stored builds and persist the repaired list.
    /// Without this, every read would hand out fresh ids for id-less entries
    /// and an edit addressed by one read's id would miss on the next. Run
    /// before edits are accepted; a no-op when every id is present.
    pub fn repair(&self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        let mut list: Vec<BuildRecord> = load_list(store, &self.key);
        if list.iter().all(|b| !b.id.is_empty()) {
            return Ok(());
        }
        for build in &mut list {
            if build.id.is_empty() {
                build.id = new_record_id();
            }
            build.normalize();
        }
        store::set_json(store, &self.key, &list)
    }

    /// Append a fresh Warframe-typed build with empty slots.
    pub fn add(&self, store: &mut dyn KeyValueStore) -> Result<BuildRecord, StoreError> {
        let build = BuildRecord::new(new_record_id());
        let mut list = self.all(store);
        list.push(build.clone());
        store::set_json(store, &self.key, &list)?;
        Ok(build)
    }

    pub fn update(
        &self,
        store: &mut dyn KeyValueStore,
        id: &str,
        mutate: impl FnOnce(&mut BuildRecord),
    ) -> Result<(), StoreError> {
        let mut list = self.all(store);
        let Some(build) = list.iter_mut().find(|b| b.id == id) else {
            return Ok(());
        };
        mutate(build);
        build.normalize();
        store::set_json(store, &self.key, &list)
    }

    pub fn remove(&self, store: &mut dyn KeyValueStore, id: &str) -> Result<(), StoreError> {
        let mut list = self.all(store);
        list.retain(|b| b.id != id);
        store::set_json(store, &self.key, &list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_slot_config_warframe() {
        let cfg = slot_config("Warframe");
        assert_eq!(cfg.arcanes, 2);
        assert!(cfg.aura);
        assert!(!cfg.stance);
        assert!(cfg.exilus);
    }

    #[test]
    fn test_slot_config_melee() {
        let cfg = slot_config("近接");
        assert_eq!(cfg.arcanes, 0);
        assert!(!cfg.aura);
        assert!(cfg.stance);
        assert!(cfg.exilus);
    }

    #[test]
    fn test_slot_config_default() {
        for kind in ["プライマリ", "セカンダリ", "Archwing", ""] {
            let cfg = slot_config(kind);
            assert_eq!(cfg.arcanes, 2);
            assert!(!cfg.aura);
            assert!(!cfg.stance);
            assert!(cfg.exilus);
        }
    }

    #[test]
    fn test_todo_add_toggle_remove() {
        let keys = KeySpace::default();
        let todos = TodoList::new(&keys);
        let mut store = MemoryStore::new();

        let id = todos.add(&mut store, "Buy X").unwrap();
        let list = todos.all(&store);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].text, "Buy X");
        assert!(!list[0].checked);
        assert_eq!(list[0].id, id);

        todos.toggle(&mut store, &id).unwrap();
        assert!(todos.all(&store)[0].checked);

        todos.remove(&mut store, &id).unwrap();
        assert!(todos.all(&store).is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        let keys = KeySpace::default();
        let todos = TodoList::new(&keys);
        let mut store = MemoryStore::new();
        let a = todos.add(&mut store, "a").unwrap();
        let b = todos.add(&mut store, "b").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_update_missing_id_is_noop() {
        let keys = KeySpace::default();
        let todos = TodoList::new(&keys);
        let mut store = MemoryStore::new();
        todos.add(&mut store, "keep").unwrap();

        todos
            .update(&mut store, "no-such-id", |t| t.text = "clobbered".into())
            .unwrap();
        todos.remove(&mut store, "no-such-id").unwrap();
        let list = todos.all(&store);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].text, "keep");
    }

    #[test]
    fn test_wish_fields_roundtrip() {
        let keys = KeySpace::default();
        let wishes = WishList::new(&keys);
        let mut store = MemoryStore::new();

        let id = wishes.add(&mut store, " Forma ", "3", "for builds").unwrap();
        let list = wishes.all(&store);
        assert_eq!(list[0].item, "Forma");
        assert_eq!(list[0].qty, "3");
        assert_eq!(list[0].note, "for builds");

        wishes
            .update(&mut store, &id, |w| w.qty = "5".into())
            .unwrap();
        assert_eq!(wishes.all(&store)[0].qty, "5");
    }

    #[test]
    fn test_build_add_defaults() {
        let keys = KeySpace::default();
        let builds = BuildList::new(&keys);
        let mut store = MemoryStore::new();

        let build = builds.add(&mut store).unwrap();
        assert_eq!(build.kind, "Warframe");
        assert_eq!(build.arcanes, vec!["", ""]);
        assert_eq!(build.mods.len(), MOD_SLOTS);
        assert_eq!(builds.all(&store).len(), 1);
    }

    #[test]
    fn test_partial_stored_build_merges_defaults() {
        let keys = KeySpace::default();
        let builds = BuildList::new(&keys);
        let mut store = MemoryStore::new();
        store
            .set(
                keys.build_list().as_str(),
                r#"[{"type": "近接", "item": "Nikana", "mods": ["Pressure Point"]}]"#.into(),
            )
            .unwrap();

        let list = builds.all(&store);
        assert_eq!(list.len(), 1);
        let build = &list[0];
        assert!(!build.id.is_empty());
        assert_eq!(build.kind, "近接");
        assert!(build.arcanes.is_empty());
        assert_eq!(build.mods.len(), MOD_SLOTS);
        assert_eq!(build.mods[0], "Pressure Point");
    }

    #[test]
    fn test_repair_makes_missing_ids_stable() {
        let keys = KeySpace::default();
        let builds = BuildList::new(&keys);
        let mut store = MemoryStore::new();
        store
            .set(keys.build_list().as_str(), r#"[{"type": "Warframe"}]"#.into())
            .unwrap();

        builds.repair(&mut store).unwrap();
        let first = builds.all(&store);
        let second = builds.all(&store);
        assert!(!first[0].id.is_empty());
        assert_eq!(first[0].id, second[0].id);

        // An edit addressed by a repaired id sticks.
        builds
            .update(&mut store, &first[0].id, |b| b.name = "Main".into())
            .unwrap();
        assert_eq!(builds.all(&store)[0].name, "Main");
    }

    #[test]
    fn test_kind_change_resizes_slots() {
        let keys = KeySpace::default();
        let builds = BuildList::new(&keys);
        let mut store = MemoryStore::new();
        let build = builds.add(&mut store).unwrap();

        builds
            .update(&mut store, &build.id, |b| b.kind = "近接".into())
            .unwrap();
        let list = builds.all(&store);
        assert!(list[0].arcanes.is_empty());
        assert!(list[0].slots().stance);
    }
}
