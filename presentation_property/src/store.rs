// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-object sparse property storage.
//!
//! [`PropertyStore`] maps property ids to [`ValueSlot`]s. Slots are created
//! lazily on first mutation, so an object that never touches a property pays
//! nothing for it.
//!
//! # Implementation
//!
//! A sorted `SmallVec` searched with binary search, rather than a hash map:
//! contiguous memory, no bucket overhead, and the first few slots live
//! inline. Objects rarely carry more than a handful of non-default values.

use smallvec::SmallVec;

use crate::id::{Property, PropertyId};
use crate::slot::ValueSlot;
use crate::value::{ErasedValue, PropertyValue};

/// Number of slots stored inline before spilling to the heap.
const INLINE_CAPACITY: usize = 8;

/// Sparse slot storage for one object.
///
/// ```rust
/// use presentation_property::{
///     ErasedValue, PropertyMetadata, PropertyRegistry, PropertyStore, TypeKey,
/// };
///
/// let mut registry = PropertyRegistry::new();
/// let width = registry
///     .register(TypeKey::OBJECT, "Width", PropertyMetadata::new(0.0_f64))
///     .unwrap();
///
/// let mut store = PropertyStore::new(1_u32);
/// assert!(store.get_local(width).is_none());
///
/// store
///     .slot_or_insert_with(width.id(), || ErasedValue::new(0.0_f64))
///     .set_local(ErasedValue::new(100.0_f64));
/// assert_eq!(store.get_local(width), Some(&100.0));
/// assert_eq!(store.dirty_properties().count(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct PropertyStore<K> {
    /// Slots sorted by [`PropertyId`].
    entries: SmallVec<[(PropertyId, ValueSlot); INLINE_CAPACITY]>,
    owner: K,
}

impl<K: Copy + Eq> PropertyStore<K> {
    /// Creates an empty store for the given owner key.
    #[must_use]
    pub fn new(owner: K) -> Self {
        Self {
            entries: SmallVec::new(),
            owner,
        }
    }

    /// Returns the owner key of this store.
    #[must_use]
    #[inline]
    pub fn owner(&self) -> K {
        self.owner
    }

    /// Returns `true` if no slot has been created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates the ids of properties that have a slot, in id order.
    pub fn property_ids(&self) -> impl Iterator<Item = PropertyId> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    /// Iterates the ids of properties whose slot is dirty.
    pub fn dirty_properties(&self) -> impl Iterator<Item = PropertyId> + '_ {
        self.entries
            .iter()
            .filter(|(_, slot)| slot.is_dirty())
            .map(|(id, _)| *id)
    }

    #[inline]
    fn find(&self, id: PropertyId) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&id, |(pid, _)| *pid)
    }

    /// Returns the slot for `id`, if one exists.
    #[must_use]
    pub fn slot(&self, id: PropertyId) -> Option<&ValueSlot> {
        self.find(id).ok().map(|idx| &self.entries[idx].1)
    }

    /// Returns the slot for `id` mutably, if one exists.
    pub fn slot_mut(&mut self, id: PropertyId) -> Option<&mut ValueSlot> {
        self.find(id).ok().map(|idx| &mut self.entries[idx].1)
    }

    /// Returns the slot for `id`, creating it if needed.
    ///
    /// `seed` is only called on creation and must produce the effective
    /// value the object currently has for the property.
    pub fn slot_or_insert_with(
        &mut self,
        id: PropertyId,
        seed: impl FnOnce() -> ErasedValue,
    ) -> &mut ValueSlot {
        let idx = match self.find(id) {
            Ok(idx) => idx,
            Err(idx) => {
                self.entries.insert(idx, (id, ValueSlot::new(seed())));
                idx
            }
        };
        &mut self.entries[idx].1
    }

    /// Removes the slot for `id`, returning it.
    pub fn remove_slot(&mut self, id: PropertyId) -> Option<ValueSlot> {
        self.find(id).ok().map(|idx| self.entries.remove(idx).1)
    }

    /// Iterates every slot mutably.
    pub fn slots_mut(&mut self) -> impl Iterator<Item = (PropertyId, &mut ValueSlot)> {
        self.entries.iter_mut().map(|(id, slot)| (*id, slot))
    }

    /// Returns the object's own erased value for `id` (local > animated > styled).
    #[must_use]
    pub fn own_value(&self, id: PropertyId) -> Option<&ErasedValue> {
        self.slot(id).and_then(ValueSlot::own_value)
    }

    /// Returns the local value, if set.
    #[must_use]
    pub fn get_local<T: PropertyValue>(&self, property: Property<T>) -> Option<&T> {
        self.slot(property.id())
            .and_then(ValueSlot::local)
            .and_then(ErasedValue::downcast_ref)
    }

    /// Returns the animated value, if set.
    #[must_use]
    pub fn get_animated<T: PropertyValue>(&self, property: Property<T>) -> Option<&T> {
        self.slot(property.id())
            .and_then(ValueSlot::animated)
            .and_then(ErasedValue::downcast_ref)
    }

    /// Returns the styled value, if set.
    #[must_use]
    pub fn get_styled<T: PropertyValue>(&self, property: Property<T>) -> Option<&T> {
        self.slot(property.id())
            .and_then(ValueSlot::styled)
            .and_then(ErasedValue::downcast_ref)
    }

    /// Returns the object's own typed value, if any source is set.
    #[must_use]
    pub fn get_own<T: PropertyValue>(&self, property: Property<T>) -> Option<&T> {
        self.own_value(property.id())
            .and_then(ErasedValue::downcast_ref)
    }

    /// Returns `true` if the property has a local value.
    #[must_use]
    pub fn has_local(&self, id: PropertyId) -> bool {
        self.slot(id).is_some_and(ValueSlot::has_local)
    }
}
