// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dependency object traits.
//!
//! [`DependencyObject`] gives access to an object's store, identity, type and
//! logical parent. [`DependencyObjectExt`] builds the checked accessors and
//! the digest on top of that, resolving inherited values through a
//! [`ParentLookup`]. The element tree uses the same pieces over its arena.

use alloc::vec::Vec;
use presentation_dirty::ChannelSet;

use crate::error::{PropertyError, Result};
use crate::id::{ObjectId, Property, PropertyId, PropertyKey};
use crate::registry::PropertyRegistry;
use crate::slot::ValueSlot;
use crate::store::PropertyStore;
use crate::types::TypeKey;
use crate::value::{ErasedValue, PropertyValue};

/// Resolves an object id to its store and logical parent.
///
/// Used to walk the ancestor chain for inherited values.
pub trait ParentLookup<'a> {
    /// Looks up the store and parent of `key`.
    fn lookup(&self, key: ObjectId) -> Option<(&'a PropertyStore<ObjectId>, Option<ObjectId>)>;
}

impl<'a, F> ParentLookup<'a> for F
where
    F: Fn(ObjectId) -> Option<(&'a PropertyStore<ObjectId>, Option<ObjectId>)>,
{
    #[inline]
    fn lookup(&self, key: ObjectId) -> Option<(&'a PropertyStore<ObjectId>, Option<ObjectId>)> {
        self(key)
    }
}

/// A [`ParentLookup`] for objects that have no ancestors.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoParent;

impl<'a> ParentLookup<'a> for NoParent {
    fn lookup(&self, _key: ObjectId) -> Option<(&'a PropertyStore<ObjectId>, Option<ObjectId>)> {
        None
    }
}

/// Walks the ancestor chain starting at `current` and returns the first own
/// value (local, animated or styled) found for `id`.
///
/// Returns `None` if no ancestor has a value of its own; the caller then
/// falls back to the default for the requesting object's type.
pub fn walk_inherited<'a, F>(
    mut current: Option<ObjectId>,
    id: PropertyId,
    lookup: &F,
) -> Option<&'a ErasedValue>
where
    F: ParentLookup<'a> + ?Sized,
{
    while let Some(key) = current {
        let (store, parent) = lookup.lookup(key)?;
        if let Some(value) = store.own_value(id) {
            return Some(value);
        }
        current = parent;
    }
    None
}

/// Resolves the effective value of `id` for an object.
///
/// Own value, then (for inheriting properties) the nearest ancestor's own
/// value, then the default registered for `ty`.
pub fn resolve_effective<'a, F>(
    store: &PropertyStore<ObjectId>,
    ty: TypeKey,
    parent: Option<ObjectId>,
    id: PropertyId,
    registry: &PropertyRegistry,
    lookup: &F,
) -> Option<ErasedValue>
where
    F: ParentLookup<'a> + ?Sized,
{
    if let Some(value) = store.own_value(id) {
        return Some(value.clone());
    }
    if registry.inherits(id)
        && let Some(value) = walk_inherited(parent, id, lookup)
    {
        return Some(value.clone());
    }
    registry.default_erased(id, ty)
}

/// Walks the ancestor chain starting at `current` and returns the first
/// digested value found for `id`.
///
/// This is what observers last saw, as opposed to [`walk_inherited`] which
/// reflects writes that have not been digested yet.
pub fn walk_observed<'a, F>(
    mut current: Option<ObjectId>,
    id: PropertyId,
    lookup: &F,
) -> Option<&'a ErasedValue>
where
    F: ParentLookup<'a> + ?Sized,
{
    while let Some(key) = current {
        let (store, parent) = lookup.lookup(key)?;
        if let Some(slot) = store.slot(id) {
            return Some(slot.previous());
        }
        current = parent;
    }
    None
}

/// Resolves the value observers last saw for `id` on an object.
///
/// The slot's digested value if the object has a slot, then (for inheriting
/// properties) the nearest ancestor's digested value, then the default for
/// `ty`. New slots are seeded with this so the first digest compares against
/// what was actually reported.
pub fn resolve_observed<'a, F>(
    store: &PropertyStore<ObjectId>,
    ty: TypeKey,
    parent: Option<ObjectId>,
    id: PropertyId,
    registry: &PropertyRegistry,
    lookup: &F,
) -> Option<ErasedValue>
where
    F: ParentLookup<'a> + ?Sized,
{
    if let Some(slot) = store.slot(id) {
        return Some(slot.previous().clone());
    }
    if registry.inherits(id)
        && let Some(value) = walk_observed(parent, id, lookup)
    {
        return Some(value.clone());
    }
    registry.default_erased(id, ty)
}

/// One effective-value change found by a digest.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PropertyChange {
    /// The object whose value changed.
    pub object: ObjectId,
    /// The property that changed.
    pub property: PropertyId,
    /// The invalidation channels the property affects.
    pub affects: ChannelSet,
}

/// An object that carries dependency properties.
///
/// ```rust
/// use presentation_property::{DependencyObject, ObjectId, PropertyStore, TypeKey};
///
/// struct Brush {
///     store: PropertyStore<ObjectId>,
/// }
///
/// impl DependencyObject for Brush {
///     fn property_store(&self) -> &PropertyStore<ObjectId> {
///         &self.store
///     }
///
///     fn property_store_mut(&mut self) -> &mut PropertyStore<ObjectId> {
///         &mut self.store
///     }
///
///     fn type_key(&self) -> TypeKey {
///         TypeKey::OBJECT
///     }
///
///     fn parent_key(&self) -> Option<ObjectId> {
///         None
///     }
/// }
/// ```
pub trait DependencyObject {
    /// Returns the object's property store.
    fn property_store(&self) -> &PropertyStore<ObjectId>;

    /// Returns the object's property store mutably.
    fn property_store_mut(&mut self) -> &mut PropertyStore<ObjectId>;

    /// Returns the object's type.
    fn type_key(&self) -> TypeKey;

    /// Returns the logical parent used for inherited values.
    fn parent_key(&self) -> Option<ObjectId>;

    /// Returns the object's id. Defaults to the store's owner.
    fn key(&self) -> ObjectId {
        self.property_store().owner()
    }
}

/// Checked property access and digest for any [`DependencyObject`].
///
/// Mutations only touch slots; nothing is observable until
/// [`digest`](Self::digest) compares effective values and fires callbacks.
///
/// ```rust
/// use presentation_property::{
///     DependencyObject, DependencyObjectExt, NoParent, ObjectId, PropertyMetadataBuilder,
///     PropertyRegistry, PropertyStore, TypeKey,
/// };
/// use presentation_dirty::Channel;
///
/// struct Brush {
///     store: PropertyStore<ObjectId>,
/// }
///
/// impl DependencyObject for Brush {
///     fn property_store(&self) -> &PropertyStore<ObjectId> { &self.store }
///     fn property_store_mut(&mut self) -> &mut PropertyStore<ObjectId> { &mut self.store }
///     fn type_key(&self) -> TypeKey { TypeKey::OBJECT }
///     fn parent_key(&self) -> Option<ObjectId> { None }
/// }
///
/// let mut registry = PropertyRegistry::new();
/// let opacity = registry
///     .register(
///         TypeKey::OBJECT,
///         "Opacity",
///         PropertyMetadataBuilder::new(1.0_f64)
///             .affects(Channel::RENDER.into_set())
///             .build(),
///     )
///     .unwrap();
///
/// let mut brush = Brush { store: PropertyStore::new(ObjectId::new(0, 0)) };
/// brush.set_value(opacity, 0.5, &registry, &NoParent).unwrap();
/// assert_eq!(brush.get_value(opacity, &registry, &NoParent).unwrap(), 0.5);
///
/// let changes = brush.digest(&registry, &NoParent);
/// assert_eq!(changes.len(), 1);
/// assert!(changes[0].affects.contains(Channel::RENDER));
///
/// // Digest is idempotent.
/// assert!(brush.digest(&registry, &NoParent).is_empty());
/// ```
pub trait DependencyObjectExt: DependencyObject {
    /// Resolves the effective value of an untyped property.
    fn effective_erased<'a, F>(
        &self,
        id: PropertyId,
        registry: &PropertyRegistry,
        lookup: &F,
    ) -> Option<ErasedValue>
    where
        F: ParentLookup<'a> + ?Sized,
    {
        resolve_effective(
            self.property_store(),
            self.type_key(),
            self.parent_key(),
            id,
            registry,
            lookup,
        )
    }

    /// Resolves the last digested value of an untyped property.
    fn observed_erased<'a, F>(
        &self,
        id: PropertyId,
        registry: &PropertyRegistry,
        lookup: &F,
    ) -> Option<ErasedValue>
    where
        F: ParentLookup<'a> + ?Sized,
    {
        resolve_observed(
            self.property_store(),
            self.type_key(),
            self.parent_key(),
            id,
            registry,
            lookup,
        )
    }

    /// Returns the effective value of `property`.
    ///
    /// Fails only if this object's type may not carry the property.
    fn get_value<'a, T, F>(
        &self,
        property: Property<T>,
        registry: &PropertyRegistry,
        lookup: &F,
    ) -> Result<T>
    where
        T: PropertyValue,
        F: ParentLookup<'a> + ?Sized,
    {
        registry.check_host(property.id(), self.type_key())?;
        if let Some(value) = self.property_store().get_own(property) {
            return Ok(value.clone());
        }
        let erased = self.effective_erased(property.id(), registry, lookup);
        match erased.as_ref().and_then(ErasedValue::downcast_ref::<T>) {
            Some(value) => Ok(value.clone()),
            // Only reachable with a handle from another registry.
            None => registry.typed::<T>(property.id()).and(Err(
                PropertyError::UnregisteredProperty {
                    property: property.id(),
                    host: registry.types().name(self.type_key()),
                },
            )),
        }
    }

    /// Returns the effective value of an untyped property as a `T`.
    ///
    /// Fails with [`PropertyError::TypeMismatch`](crate::PropertyError::TypeMismatch)
    /// if the property does not hold `T`.
    fn get_value_by_id<'a, T, F>(
        &self,
        id: PropertyId,
        registry: &PropertyRegistry,
        lookup: &F,
    ) -> Result<T>
    where
        T: PropertyValue,
        F: ParentLookup<'a> + ?Sized,
    {
        let property = registry.typed::<T>(id)?;
        self.get_value(property, registry, lookup)
    }

    /// Sets the local value of `property`.
    ///
    /// Fails with [`PropertyError::AccessDenied`](crate::PropertyError::AccessDenied)
    /// for read-only properties.
    fn set_value<'a, T, F>(
        &mut self,
        property: Property<T>,
        value: T,
        registry: &PropertyRegistry,
        lookup: &F,
    ) -> Result<()>
    where
        T: PropertyValue,
        F: ParentLookup<'a> + ?Sized,
    {
        registry.check_writable(property.id())?;
        self.set_value_erased(property.id(), ErasedValue::new(value), registry, lookup)
    }

    /// Sets a read-only property through its key.
    fn set_read_only_value<'a, T, F>(
        &mut self,
        key: PropertyKey<T>,
        value: T,
        registry: &PropertyRegistry,
        lookup: &F,
    ) -> Result<()>
    where
        T: PropertyValue,
        F: ParentLookup<'a> + ?Sized,
    {
        store_local(self, key.property().id(), ErasedValue::new(value), registry, lookup)
    }

    /// Sets the local value of an untyped property.
    ///
    /// Fails with [`PropertyError::TypeMismatch`](crate::PropertyError::TypeMismatch)
    /// if `value` is not of the property's type.
    fn set_value_erased<'a, F>(
        &mut self,
        id: PropertyId,
        value: ErasedValue,
        registry: &PropertyRegistry,
        lookup: &F,
    ) -> Result<()>
    where
        F: ParentLookup<'a> + ?Sized,
    {
        registry.check_writable(id)?;
        store_local(self, id, value, registry, lookup)
    }

    /// Clears the local value, returning `true` if there was one.
    ///
    /// The effective value reverts to the next source at the next digest.
    fn clear_local_value(&mut self, id: PropertyId, registry: &PropertyRegistry) -> Result<bool> {
        registry.check_host(id, self.type_key())?;
        registry.check_writable(id)?;
        Ok(self
            .property_store_mut()
            .slot_mut(id)
            .is_some_and(ValueSlot::clear_local))
    }

    /// Compares every dirty slot against its effective value, runs change
    /// callbacks and reports what changed.
    fn digest<'a, F>(&mut self, registry: &PropertyRegistry, lookup: &F) -> Vec<PropertyChange>
    where
        F: ParentLookup<'a> + ?Sized,
    {
        let pending: Vec<(PropertyId, ErasedValue)> = self
            .property_store()
            .dirty_properties()
            .filter_map(|id| {
                self.effective_erased(id, registry, lookup)
                    .map(|value| (id, value))
            })
            .collect();

        let object = self.key();
        let mut changes = Vec::new();
        for (id, effective) in pending {
            let Some(slot) = self.property_store_mut().slot_mut(id) else {
                continue;
            };
            if let Some(old) = slot.digest(effective.clone()) {
                tracing::trace!(?object, property = registry.name(id), "value changed");
                registry.notify_changed(id, object, &old, &effective);
                changes.push(PropertyChange {
                    object,
                    property: id,
                    affects: registry.affects(id),
                });
            }
        }
        changes
    }
}

impl<D: DependencyObject + ?Sized> DependencyObjectExt for D {}

fn store_local<'a, D, F>(
    object: &mut D,
    id: PropertyId,
    value: ErasedValue,
    registry: &PropertyRegistry,
    lookup: &F,
) -> Result<()>
where
    D: DependencyObjectExt + ?Sized,
    F: ParentLookup<'a> + ?Sized,
{
    registry.check_host(id, object.type_key())?;
    registry.check_value(id, &value)?;
    let value = registry.coerce_erased(id, value);
    let current = object.property_store().slot(id).is_none().then(|| {
        object
            .observed_erased(id, registry, lookup)
            .unwrap_or_else(|| value.clone())
    });
    object
        .property_store_mut()
        .slot_or_insert_with(id, || current.unwrap_or_else(|| value.clone()))
        .set_local(value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{PropertyMetadata, PropertyMetadataBuilder};
    use alloc::sync::Arc;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use presentation_dirty::Channel;

    struct TestObject {
        ty: TypeKey,
        parent: Option<ObjectId>,
        store: PropertyStore<ObjectId>,
    }

    impl TestObject {
        fn new(index: u32, ty: TypeKey, parent: Option<ObjectId>) -> Self {
            Self {
                ty,
                parent,
                store: PropertyStore::new(ObjectId::new(index, 0)),
            }
        }
    }

    impl DependencyObject for TestObject {
        fn property_store(&self) -> &PropertyStore<ObjectId> {
            &self.store
        }

        fn property_store_mut(&mut self) -> &mut PropertyStore<ObjectId> {
            &mut self.store
        }

        fn type_key(&self) -> TypeKey {
            self.ty
        }

        fn parent_key(&self) -> Option<ObjectId> {
            self.parent
        }
    }

    struct Fixture {
        registry: PropertyRegistry,
        element: TypeKey,
        font_size: Property<f64>,
        width: Property<f64>,
    }

    fn fixture() -> Fixture {
        let mut registry = PropertyRegistry::new();
        let element = registry.register_type("UIElement", TypeKey::OBJECT);
        let font_size = registry
            .register(
                element,
                "FontSize",
                PropertyMetadataBuilder::new(12.0_f64).inherits(true).build(),
            )
            .unwrap();
        let width = registry
            .register(
                element,
                "Width",
                PropertyMetadataBuilder::new(0.0_f64)
                    .affects(Channel::MEASURE.into_set())
                    .coerce(|v| v.max(0.0))
                    .build(),
            )
            .unwrap();
        Fixture {
            registry,
            element,
            font_size,
            width,
        }
    }

    fn lookup_one<'p>(
        parent: &'p TestObject,
    ) -> impl Fn(ObjectId) -> Option<(&'p PropertyStore<ObjectId>, Option<ObjectId>)> + 'p {
        move |key| (key == parent.key()).then(|| (parent.property_store(), parent.parent_key()))
    }

    #[test]
    fn inherited_value_comes_from_ancestor() {
        let f = fixture();
        let mut parent = TestObject::new(0, f.element, None);
        let child = TestObject::new(1, f.element, Some(parent.key()));

        assert_eq!(
            child.get_value(f.font_size, &f.registry, &lookup_one(&parent)),
            Ok(12.0)
        );
        parent
            .set_value(f.font_size, 16.0, &f.registry, &NoParent)
            .unwrap();
        assert_eq!(
            child.get_value(f.font_size, &f.registry, &lookup_one(&parent)),
            Ok(16.0)
        );
    }

    #[test]
    fn non_inherited_uses_default() {
        let f = fixture();
        let mut parent = TestObject::new(0, f.element, None);
        let child = TestObject::new(1, f.element, Some(parent.key()));
        parent.set_value(f.width, 200.0, &f.registry, &NoParent).unwrap();
        assert_eq!(
            child.get_value(f.width, &f.registry, &lookup_one(&parent)),
            Ok(0.0)
        );
    }

    #[test]
    fn clear_then_get_falls_back() {
        let f = fixture();
        let mut parent = TestObject::new(0, f.element, None);
        let mut child = TestObject::new(1, f.element, Some(parent.key()));
        parent.set_value(f.font_size, 16.0, &f.registry, &NoParent).unwrap();

        child
            .set_value(f.font_size, 20.0, &f.registry, &lookup_one(&parent))
            .unwrap();
        assert_eq!(
            child.get_value(f.font_size, &f.registry, &lookup_one(&parent)),
            Ok(20.0)
        );
        assert_eq!(child.clear_local_value(f.font_size.id(), &f.registry), Ok(true));
        assert_eq!(
            child.get_value(f.font_size, &f.registry, &lookup_one(&parent)),
            Ok(16.0)
        );
        assert_eq!(child.clear_local_value(f.font_size.id(), &f.registry), Ok(false));
    }

    #[test]
    fn coerce_applies_before_storage() {
        let f = fixture();
        let mut object = TestObject::new(0, f.element, None);
        object.set_value(f.width, -5.0, &f.registry, &NoParent).unwrap();
        assert_eq!(object.property_store().get_local(f.width), Some(&0.0));
    }

    #[test]
    fn read_only_requires_key() {
        let mut f = fixture();
        let (key, is_busy) = f
            .registry
            .register_read_only(f.element, "IsBusy", PropertyMetadata::new(false))
            .unwrap();
        let mut object = TestObject::new(0, f.element, None);

        assert_eq!(
            object.set_value(is_busy, true, &f.registry, &NoParent),
            Err(PropertyError::AccessDenied { name: "IsBusy" })
        );
        assert_eq!(
            object.clear_local_value(is_busy.id(), &f.registry),
            Err(PropertyError::AccessDenied { name: "IsBusy" })
        );
        object
            .set_read_only_value(key, true, &f.registry, &NoParent)
            .unwrap();
        assert_eq!(object.get_value(is_busy, &f.registry, &NoParent), Ok(true));
    }

    #[test]
    fn untyped_access_checks_type() {
        let f = fixture();
        let mut object = TestObject::new(0, f.element, None);
        assert!(matches!(
            object.set_value_erased(
                f.width.id(),
                ErasedValue::new(3_i32),
                &f.registry,
                &NoParent
            ),
            Err(PropertyError::TypeMismatch { name: "Width", .. })
        ));
        assert!(matches!(
            object.get_value_by_id::<bool, _>(f.width.id(), &f.registry, &NoParent),
            Err(PropertyError::TypeMismatch { .. })
        ));
        assert_eq!(
            object.get_value_by_id::<f64, _>(f.width.id(), &f.registry, &NoParent),
            Ok(0.0)
        );
    }

    #[test]
    fn non_owner_type_is_rejected() {
        let mut f = fixture();
        let brush = f.registry.register_type("Brush", TypeKey::OBJECT);
        let mut object = TestObject::new(0, brush, None);
        assert!(matches!(
            object.set_value(f.width, 1.0, &f.registry, &NoParent),
            Err(PropertyError::UnregisteredProperty { host: "Brush", .. })
        ));
    }

    #[test]
    fn digest_fires_callback_once_per_change() {
        let mut f = fixture();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let height = f
            .registry
            .register(
                f.element,
                "Height",
                PropertyMetadataBuilder::new(0.0_f64)
                    .on_changed(move |_, _, _| {
                        counter.fetch_add(1, Ordering::SeqCst);
                    })
                    .build(),
            )
            .unwrap();
        let mut object = TestObject::new(0, f.element, None);

        // Two writes before a digest collapse into one notification.
        object.set_value(height, 5.0, &f.registry, &NoParent).unwrap();
        object.set_value(height, 6.0, &f.registry, &NoParent).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let changes = object.digest(&f.registry, &NoParent);
        assert_eq!(changes.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert!(object.digest(&f.registry, &NoParent).is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn setting_the_current_value_is_not_a_change() {
        let f = fixture();
        let mut object = TestObject::new(0, f.element, None);
        object.set_value(f.width, 0.0, &f.registry, &NoParent).unwrap();
        assert!(object.digest(&f.registry, &NoParent).is_empty());
    }

    #[test]
    fn new_slot_is_seeded_with_observed_value() {
        let f = fixture();
        let mut parent = TestObject::new(0, f.element, None);
        let mut child = TestObject::new(1, f.element, Some(parent.key()));

        // Undigested parent write: the child never observed 16.
        parent.set_value(f.font_size, 16.0, &f.registry, &NoParent).unwrap();
        child
            .set_value(f.font_size, 16.0, &f.registry, &lookup_one(&parent))
            .unwrap();
        let changes = child.digest(&f.registry, &lookup_one(&parent));
        assert_eq!(changes.len(), 1);
        let observed = child.observed_erased(f.font_size.id(), &f.registry, &lookup_one(&parent));
        assert_eq!(observed.and_then(|v| v.downcast_ref::<f64>().copied()), Some(16.0));
    }

    #[test]
    fn digest_reports_affects() {
        let f = fixture();
        let mut object = TestObject::new(0, f.element, None);
        object.set_value(f.width, 10.0, &f.registry, &NoParent).unwrap();
        let changes = object.digest(&f.registry, &NoParent);
        assert_eq!(
            changes,
            [PropertyChange {
                object: object.key(),
                property: f.width.id(),
                affects: Channel::MEASURE.into_set(),
            }]
        );
    }
}
