// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property access on tree-hosted elements.
//!
//! Reads resolve through the tree's logical links. Writes go to the element's
//! slot and schedule it; nothing is reported until [`Tree::digest`].

use presentation_property::{
    DependencyObjectExt, ErasedValue, Property, PropertyError, PropertyId, PropertyKey,
    PropertyRegistry, PropertyValue, TypeKey, ValueSlot, resolve_effective, resolve_observed,
};

use crate::error::Result;
use crate::tree::{Tree, TreeLookup};
use crate::types::ElementId;

impl Tree {
    /// Returns the effective value of `property` on `id`.
    pub fn get_value<T: PropertyValue>(
        &self,
        registry: &PropertyRegistry,
        id: ElementId,
        property: Property<T>,
    ) -> Result<T> {
        let element = self.element(id)?;
        Ok(element.get_value(property, registry, &TreeLookup(self))?)
    }

    /// Returns the effective value of an untyped property as a `T`.
    pub fn get_value_by_id<T: PropertyValue>(
        &self,
        registry: &PropertyRegistry,
        id: ElementId,
        property: PropertyId,
    ) -> Result<T> {
        let element = self.element(id)?;
        Ok(element.get_value_by_id(property, registry, &TreeLookup(self))?)
    }

    /// Returns the effective value of an untyped property.
    pub fn get_erased(
        &self,
        registry: &PropertyRegistry,
        id: ElementId,
        property: PropertyId,
    ) -> Result<ErasedValue> {
        let element = self.element(id)?;
        registry.check_host(property, element.ty)?;
        let value = resolve_effective(
            &element.store,
            element.ty,
            element.parent,
            property,
            registry,
            &TreeLookup(self),
        )
        .ok_or_else(|| unregistered(registry, property, element.ty))?;
        Ok(value)
    }

    /// Sets the local value of `property` on `id`.
    pub fn set_value<T: PropertyValue>(
        &mut self,
        registry: &PropertyRegistry,
        id: ElementId,
        property: Property<T>,
        value: T,
    ) -> Result<()> {
        registry.check_writable(property.id())?;
        self.store_local(registry, id, property.id(), ErasedValue::new(value))
    }

    /// Sets the local value of an untyped property on `id`.
    pub fn set_value_erased(
        &mut self,
        registry: &PropertyRegistry,
        id: ElementId,
        property: PropertyId,
        value: ErasedValue,
    ) -> Result<()> {
        registry.check_writable(property)?;
        self.store_local(registry, id, property, value)
    }

    pub(crate) fn set_read_only_value<T: PropertyValue>(
        &mut self,
        registry: &PropertyRegistry,
        id: ElementId,
        key: PropertyKey<T>,
        value: T,
    ) -> Result<()> {
        self.store_local(registry, id, key.property().id(), ErasedValue::new(value))
    }

    /// Clears the local value of `property` on `id`.
    ///
    /// Returns `true` if there was one. The next source (animated, styled,
    /// inherited, default) takes over immediately for reads.
    pub fn clear_local_value(
        &mut self,
        registry: &PropertyRegistry,
        id: ElementId,
        property: PropertyId,
    ) -> Result<bool> {
        registry.check_writable(property)?;
        self.clear_local_unchecked(registry, id, property)
    }

    pub(crate) fn clear_local_unchecked(
        &mut self,
        registry: &PropertyRegistry,
        id: ElementId,
        property: PropertyId,
    ) -> Result<bool> {
        registry.check_host(property, self.element(id)?.ty)?;
        let cleared = self
            .element_mut(id)?
            .store
            .slot_mut(property)
            .is_some_and(ValueSlot::clear_local);
        if cleared {
            self.schedule(id);
        }
        Ok(cleared)
    }

    /// Stores a value pushed by the styling engine.
    pub fn apply_styled_value<T: PropertyValue>(
        &mut self,
        registry: &PropertyRegistry,
        id: ElementId,
        property: Property<T>,
        value: T,
    ) -> Result<()> {
        registry.check_writable(property.id())?;
        let slot = self.prepare_slot(registry, id, property.id())?;
        slot.apply_styled_value(ErasedValue::new(value));
        Ok(())
    }

    /// Stores a value pushed by the animation feed.
    pub fn apply_animated_value<T: PropertyValue>(
        &mut self,
        registry: &PropertyRegistry,
        id: ElementId,
        property: Property<T>,
        value: T,
    ) -> Result<()> {
        registry.check_writable(property.id())?;
        let slot = self.prepare_slot(registry, id, property.id())?;
        slot.apply_animated_value(ErasedValue::new(value));
        Ok(())
    }

    /// Drops the styled value of `property` on `id`.
    pub fn revert_styled_value(
        &mut self,
        registry: &PropertyRegistry,
        id: ElementId,
        property: PropertyId,
    ) -> Result<bool> {
        registry.check_host(property, self.element(id)?.ty)?;
        let reverted = self
            .element_mut(id)?
            .store
            .slot_mut(property)
            .is_some_and(ValueSlot::revert_styled_value);
        if reverted {
            self.schedule(id);
        }
        Ok(reverted)
    }

    /// Drops the animated value of `property` on `id`.
    pub fn revert_animated_value(
        &mut self,
        registry: &PropertyRegistry,
        id: ElementId,
        property: PropertyId,
    ) -> Result<bool> {
        registry.check_host(property, self.element(id)?.ty)?;
        let reverted = self
            .element_mut(id)?
            .store
            .slot_mut(property)
            .is_some_and(ValueSlot::revert_animated_value);
        if reverted {
            self.schedule(id);
        }
        Ok(reverted)
    }

    /// Drops every styled value on `root` and its logical descendants.
    ///
    /// Returns the number of values dropped.
    pub fn clear_styled_values_recursive(&mut self, root: ElementId) -> Result<usize> {
        self.element(root)?;
        let mut dropped = 0;
        self.visit_subtree(root, |tree, id| {
            dropped += tree.revert_all(id, ValueSlot::revert_styled_value);
        });
        Ok(dropped)
    }

    /// Drops every animated value on `root` and its logical descendants.
    ///
    /// Returns the number of values dropped.
    pub fn clear_animated_values_recursive(&mut self, root: ElementId) -> Result<usize> {
        self.element(root)?;
        let mut dropped = 0;
        self.visit_subtree(root, |tree, id| {
            dropped += tree.revert_all(id, ValueSlot::revert_animated_value);
        });
        Ok(dropped)
    }

    fn revert_all(&mut self, id: ElementId, revert: fn(&mut ValueSlot) -> bool) -> usize {
        let Ok(element) = self.element_mut(id) else {
            return 0;
        };
        let dropped = element
            .store
            .slots_mut()
            .map(|(_, slot)| revert(slot))
            .filter(|&reverted| reverted)
            .count();
        if dropped > 0 {
            self.schedule(id);
        }
        dropped
    }

    fn store_local(
        &mut self,
        registry: &PropertyRegistry,
        id: ElementId,
        property: PropertyId,
        value: ErasedValue,
    ) -> Result<()> {
        registry.check_value(property, &value)?;
        let value = registry.coerce_erased(property, value);
        let slot = self.prepare_slot(registry, id, property)?;
        slot.set_local(value);
        Ok(())
    }

    /// Checks that `id` may host `property`, schedules it and returns its
    /// slot, seeding a new slot with the value observers last saw.
    fn prepare_slot(
        &mut self,
        registry: &PropertyRegistry,
        id: ElementId,
        property: PropertyId,
    ) -> Result<&mut ValueSlot> {
        let element = self.element(id)?;
        registry.check_host(property, element.ty)?;
        if element.store.slot(property).is_none() {
            let seed = resolve_observed(
                &element.store,
                element.ty,
                element.parent,
                property,
                registry,
                &TreeLookup(self),
            )
            .ok_or_else(|| unregistered(registry, property, element.ty))?;
            self.element_mut(id)?
                .store
                .slot_or_insert_with(property, || seed);
        }
        self.schedule(id);
        let element = self.element_mut(id)?;
        let ty = element.ty;
        element
            .store
            .slot_mut(property)
            .ok_or_else(|| unregistered(registry, property, ty).into())
    }
}

fn unregistered(
    registry: &PropertyRegistry,
    property: PropertyId,
    ty: TypeKey,
) -> PropertyError {
    PropertyError::UnregisteredProperty {
        property,
        host: registry.types().name(ty),
    }
}
