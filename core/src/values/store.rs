//! The flat variable store.
//!
//! One mapping `Name -> Value` per program run. Composite data is emulated by
//! derived names; membership queries scan every slot derived from a base, in
//! the order the slots were first created.

use hashbrown::HashMap;

use crate::values::{IndexKey, Interner, Name, Symbol, Value};

struct Slot {
    value: Value,
    order: u64,
}

#[derive(Default)]
pub struct Store {
    interner: Interner,
    slots: HashMap<Name, Slot>,
    next_order: u64,
    next_dynamic: u64,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, s: &str) -> Symbol {
        self.interner.intern(s)
    }

    /// Plain name for `s`, interning it.
    pub fn name(&mut self, s: &str) -> Name {
        Name::plain(self.intern(s))
    }

    /// Name for a dotted path: `file.read` becomes `file#S#read`.
    pub fn dotted_name(&mut self, path: &str) -> Name {
        let mut segments = path.split('.');
        let head = segments.next().unwrap_or_default();
        let mut name = self.name(head);
        for segment in segments {
            name = name.index(IndexKey::String(segment.into()));
        }
        name
    }

    /// Read a dotted path (`x`, `file.read`) without interning it.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let head = segments.next().unwrap_or_default();
        let mut name = Name::plain(Symbol::detached(head));
        for segment in segments {
            name = name.index(IndexKey::String(segment.into()));
        }
        self.get(&name)
    }

    pub fn get(&self, name: &Name) -> Option<&Value> {
        self.slots.get(name).map(|slot| &slot.value)
    }

    pub fn contains(&self, name: &Name) -> bool {
        self.slots.contains_key(name)
    }

    /// Store `value` under `name`, keeping the slot's original creation order.
    pub fn set(&mut self, name: Name, value: Value) {
        if let Some(slot) = self.slots.get_mut(&name) {
            slot.value = value;
            return;
        }
        let order = self.next_order;
        self.next_order += 1;
        self.slots.insert(name, Slot { value, order });
    }

    pub fn remove(&mut self, name: &Name) -> Option<Value> {
        self.slots.remove(name).map(|slot| slot.value)
    }

    /// Remove `name` and every slot derived from it. Returns the number of
    /// slots removed.
    pub fn remove_tree(&mut self, name: &Name) -> usize {
        let before = self.slots.len();
        self.slots
            .retain(|candidate, _| candidate != name && !candidate.is_within(name));
        before - self.slots.len()
    }

    /// Slots derived from `base` (at any depth), in creation order.
    pub fn descendants<'a>(&'a self, base: &Name) -> Vec<(&'a Name, &'a Value)> {
        let mut found: Vec<(&Name, &Slot)> = self
            .slots
            .iter()
            .filter(|(name, _)| name.is_within(base))
            .collect();
        found.sort_by_key(|(_, slot)| slot.order);
        found
            .into_iter()
            .map(|(name, slot)| (name, &slot.value))
            .collect()
    }

    /// First slot under `base` whose value equals `needle`.
    pub fn find_value(&self, base: &Name, needle: &Value) -> Option<Name> {
        self.descendants(base)
            .into_iter()
            .find(|(_, value)| value.loosely_equals(needle))
            .map(|(name, _)| name.clone())
    }

    /// True if element `key` of `base` exists, directly or through a slot
    /// derived from it.
    pub fn has_index(&self, base: &Name, key: IndexKey) -> bool {
        let element = base.index(key);
        self.contains(&element) || self.slots.keys().any(|name| name.is_within(&element))
    }

    /// Number of slots derived directly from `base`.
    pub fn child_count(&self, base: &Name) -> usize {
        self.slots
            .keys()
            .filter(|name| name.parent() == Some(base))
            .count()
    }

    /// Fresh, never-used plain name for a dynamic slot.
    pub fn allocate(&mut self) -> Name {
        loop {
            let candidate = format!("<dyn{}>", self.next_dynamic);
            self.next_dynamic += 1;
            let name = self.name(&candidate);
            if !self.contains(&name) && self.child_count(&name) == 0 {
                return name;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// All slots in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (&Name, &Value)> {
        let mut all: Vec<(&Name, &Slot)> = self.slots.iter().collect();
        all.sort_by_key(|(_, slot)| slot.order);
        all.into_iter().map(|(name, slot)| (name, &slot.value))
    }
}

impl core::fmt::Debug for Store {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
