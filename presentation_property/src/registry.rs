// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property registry.
//!
//! [`PropertyRegistry`] is the append-only table of property descriptors plus
//! the [`TypeRegistry`] that owner types live in. It is built once at startup
//! and passed by reference to everything that resolves values.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use hashbrown::HashMap;
use presentation_dirty::ChannelSet;
use smallvec::SmallVec;

use crate::error::{PropertyError, Result};
use crate::id::{ObjectId, Property, PropertyId, PropertyKey};
use crate::metadata::PropertyMetadata;
use crate::types::{TypeKey, TypeRegistry};
use crate::value::{ErasedValue, PropertyValue};

/// A registered property descriptor.
pub struct PropertyRegistration {
    name: &'static str,
    type_id: TypeId,
    type_name: &'static str,
    owner: TypeKey,
    /// Owners added through `add_owner`, each with an optional default override.
    added_owners: SmallVec<[(TypeKey, Option<ErasedValue>); 2]>,
    read_only: bool,
    attached: bool,
    metadata: Box<dyn ErasedMetadata>,
}

impl PropertyRegistration {
    /// Returns the property name.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the [`TypeId`] of the value type.
    #[must_use]
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the name of the value type.
    #[must_use]
    #[inline]
    pub fn value_type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the type the property was first registered on.
    #[must_use]
    #[inline]
    pub fn owner(&self) -> TypeKey {
        self.owner
    }

    /// Iterates the registering owner followed by every added owner.
    pub fn owners(&self) -> impl Iterator<Item = TypeKey> + '_ {
        core::iter::once(self.owner).chain(self.added_owners.iter().map(|(ty, _)| *ty))
    }

    /// Returns `true` if the property was registered read-only.
    #[must_use]
    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Returns `true` if any object may host the property.
    #[must_use]
    #[inline]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Returns the channels a change marks dirty.
    #[must_use]
    #[inline]
    pub fn affects(&self) -> ChannelSet {
        self.metadata.affects()
    }

    /// Returns whether the property inherits.
    #[must_use]
    #[inline]
    pub fn inherits(&self) -> bool {
        self.metadata.inherits()
    }
}

impl core::fmt::Debug for PropertyRegistration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PropertyRegistration")
            .field("name", &self.name)
            .field("type", &self.type_name)
            .field("owner", &self.owner)
            .field("read_only", &self.read_only)
            .field("attached", &self.attached)
            .field("inherits", &self.inherits())
            .field("affects", &self.affects())
            .finish_non_exhaustive()
    }
}

#[derive(Copy, Clone)]
enum Kind {
    Normal,
    ReadOnly,
    Attached,
}

/// The process-wide table of dependency properties and object types.
///
/// ```rust
/// use presentation_property::{PropertyMetadataBuilder, PropertyRegistry, TypeKey};
/// use presentation_dirty::ChannelSet;
///
/// let mut registry = PropertyRegistry::new();
/// let element = registry.register_type("UIElement", TypeKey::OBJECT);
/// let button = registry.register_type("Button", element);
///
/// let width = registry
///     .register(
///         element,
///         "Width",
///         PropertyMetadataBuilder::new(0.0_f64).affects(ChannelSet::LAYOUT).build(),
///     )
///     .unwrap();
///
/// // Lookup walks the ancestor chain.
/// assert_eq!(registry.find(button, "Width"), Some(width.id()));
///
/// // A derived type may not silently shadow the name.
/// assert!(registry
///     .register(button, "Width", PropertyMetadataBuilder::new(1.0_f64).build())
///     .is_err());
/// ```
#[derive(Default)]
pub struct PropertyRegistry {
    properties: Vec<PropertyRegistration>,
    by_name: HashMap<&'static str, SmallVec<[PropertyId; 2]>>,
    inherited: Vec<PropertyId>,
    types: TypeRegistry,
}

impl PropertyRegistry {
    /// Creates a registry with an empty property table and the root type.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the type hierarchy.
    #[must_use]
    #[inline]
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Registers an object type deriving from `base`.
    ///
    /// See [`TypeRegistry::register_type`].
    pub fn register_type(&mut self, name: &'static str, base: TypeKey) -> TypeKey {
        self.types.register_type(name, base)
    }

    /// Registers a property owned by `owner`.
    ///
    /// Fails with [`PropertyError::DuplicateRegistration`] if `owner`, one of
    /// its bases or one of its derived types already owns a property called
    /// `name`.
    ///
    /// # Panics
    ///
    /// Panics if more than 65,535 properties are registered.
    pub fn register<T: PropertyValue>(
        &mut self,
        owner: TypeKey,
        name: &'static str,
        metadata: PropertyMetadata<T>,
    ) -> Result<Property<T>> {
        self.register_impl(owner, name, metadata, Kind::Normal)
    }

    /// Registers a read-only property.
    ///
    /// Only holders of the returned [`PropertyKey`] can write it.
    ///
    /// # Panics
    ///
    /// Panics if more than 65,535 properties are registered.
    pub fn register_read_only<T: PropertyValue>(
        &mut self,
        owner: TypeKey,
        name: &'static str,
        metadata: PropertyMetadata<T>,
    ) -> Result<(PropertyKey<T>, Property<T>)> {
        let property = self.register_impl(owner, name, metadata, Kind::ReadOnly)?;
        Ok((PropertyKey::new(property), property))
    }

    /// Registers an attached property, which objects of any type may host.
    ///
    /// # Panics
    ///
    /// Panics if more than 65,535 properties are registered.
    pub fn register_attached<T: PropertyValue>(
        &mut self,
        owner: TypeKey,
        name: &'static str,
        metadata: PropertyMetadata<T>,
    ) -> Result<Property<T>> {
        self.register_impl(owner, name, metadata, Kind::Attached)
    }

    fn register_impl<T: PropertyValue>(
        &mut self,
        owner: TypeKey,
        name: &'static str,
        metadata: PropertyMetadata<T>,
        kind: Kind,
    ) -> Result<Property<T>> {
        self.check_unique(owner, name, None)?;
        assert!(
            self.properties.len() < u16::MAX as usize,
            "Too many properties registered (max {})",
            u16::MAX
        );

        #[expect(clippy::cast_possible_truncation, reason = "checked above")]
        let id = PropertyId::new(self.properties.len() as u16);
        let inherits = metadata.inherits();

        self.properties.push(PropertyRegistration {
            name,
            type_id: TypeId::of::<T>(),
            type_name: core::any::type_name::<T>(),
            owner,
            added_owners: SmallVec::new(),
            read_only: matches!(kind, Kind::ReadOnly),
            attached: matches!(kind, Kind::Attached),
            metadata: Box::new(metadata),
        });
        self.by_name.entry(name).or_default().push(id);
        if inherits {
            self.inherited.push(id);
        }

        tracing::debug!(
            name,
            owner = self.types.name(owner),
            id = id.index(),
            inherits,
            "registered property"
        );
        Ok(Property::from_id(id))
    }

    /// Makes `owner` an additional owner of `property`.
    ///
    /// The new owner shares the descriptor; `default` overrides the default
    /// value for objects of `owner` and its derived types.
    pub fn add_owner<T: PropertyValue>(
        &mut self,
        property: Property<T>,
        owner: TypeKey,
        default: Option<T>,
    ) -> Result<Property<T>> {
        let id = property.id();
        let Some(registration) = self.properties.get(id.index() as usize) else {
            return Err(PropertyError::UnregisteredProperty {
                property: id,
                host: self.types.name(owner),
            });
        };
        let name = registration.name;
        if registration.owners().any(|o| o == owner) {
            return Err(PropertyError::DuplicateRegistration {
                name,
                owner: self.types.name(owner),
            });
        }
        self.check_unique(owner, name, Some(id))?;

        if let Some(registration) = self.properties.get_mut(id.index() as usize) {
            registration
                .added_owners
                .push((owner, default.map(ErasedValue::new)));
        }
        tracing::debug!(name, owner = self.types.name(owner), "added property owner");
        Ok(property)
    }

    /// Rejects `name` on `owner` if another property of that name lives in
    /// the same lineage. `except` is the property being extended by
    /// `add_owner`.
    fn check_unique(
        &self,
        owner: TypeKey,
        name: &'static str,
        except: Option<PropertyId>,
    ) -> Result<()> {
        let Some(ids) = self.by_name.get(name) else {
            return Ok(());
        };
        for &id in ids {
            if Some(id) == except {
                continue;
            }
            let registration = &self.properties[id.index() as usize];
            if registration
                .owners()
                .any(|o| self.types.same_lineage(o, owner))
            {
                return Err(PropertyError::DuplicateRegistration {
                    name,
                    owner: self.types.name(owner),
                });
            }
        }
        Ok(())
    }

    /// Finds the property called `name` visible from `owner`.
    ///
    /// Walks `owner` and its bases, most derived first.
    #[must_use]
    pub fn find(&self, owner: TypeKey, name: &str) -> Option<PropertyId> {
        let ids = self.by_name.get(name)?;
        self.types.ancestors(owner).find_map(|ty| {
            ids.iter()
                .copied()
                .find(|id| self.properties[id.index() as usize].owners().any(|o| o == ty))
        })
    }

    /// Returns the number of registered properties.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns `true` if no properties are registered.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Returns the registration for a property.
    #[must_use]
    pub fn get(&self, id: PropertyId) -> Option<&PropertyRegistration> {
        self.properties.get(id.index() as usize)
    }

    /// Returns the name of a property.
    #[must_use]
    pub fn name(&self, id: PropertyId) -> Option<&'static str> {
        self.get(id).map(|r| r.name)
    }

    /// Returns the channels a property affects.
    #[must_use]
    pub fn affects(&self, id: PropertyId) -> ChannelSet {
        self.get(id).map(|r| r.affects()).unwrap_or_default()
    }

    /// Returns whether a property inherits.
    #[must_use]
    pub fn inherits(&self, id: PropertyId) -> bool {
        self.get(id).is_some_and(|r| r.inherits())
    }

    /// Returns the ids of every inheriting property, in registration order.
    #[must_use]
    pub fn inherited_properties(&self) -> &[PropertyId] {
        &self.inherited
    }

    /// Returns the typed metadata of a property.
    #[must_use]
    pub fn get_metadata<T: PropertyValue>(
        &self,
        property: Property<T>,
    ) -> Option<&PropertyMetadata<T>> {
        self.get(property.id())
            .and_then(|r| r.metadata.as_any().downcast_ref())
    }

    /// Returns the default value of `property` for objects of type `ty`,
    /// honouring `add_owner` overrides.
    #[must_use]
    pub fn default_value<T: PropertyValue>(
        &self,
        property: Property<T>,
        ty: TypeKey,
    ) -> Option<&T> {
        if let Some(value) = self.override_for(property.id(), ty) {
            return value.downcast_ref();
        }
        self.get_metadata(property).map(PropertyMetadata::default_value)
    }

    /// Erased form of [`default_value`](Self::default_value).
    #[must_use]
    pub fn default_erased(&self, id: PropertyId, ty: TypeKey) -> Option<ErasedValue> {
        if let Some(value) = self.override_for(id, ty) {
            return Some(value.clone());
        }
        self.get(id).map(|r| r.metadata.default_erased())
    }

    fn override_for(&self, id: PropertyId, ty: TypeKey) -> Option<&ErasedValue> {
        let registration = self.get(id)?;
        if registration.added_owners.is_empty() {
            return None;
        }
        self.types.ancestors(ty).find_map(|ancestor| {
            registration
                .added_owners
                .iter()
                .find(|(owner, _)| *owner == ancestor)
                .and_then(|(_, value)| value.as_ref())
        })
    }

    /// Checks that an object of type `host` may carry property `id`.
    pub fn check_host(&self, id: PropertyId, host: TypeKey) -> Result<&PropertyRegistration> {
        let unregistered = || PropertyError::UnregisteredProperty {
            property: id,
            host: self.types.name(host),
        };
        let registration = self.get(id).ok_or_else(unregistered)?;
        if registration.attached
            || registration
                .owners()
                .any(|o| self.types.derives_from(host, o))
        {
            Ok(registration)
        } else {
            Err(unregistered())
        }
    }

    /// Checks that the public setter may write `id`.
    pub fn check_writable(&self, id: PropertyId) -> Result<()> {
        match self.get(id) {
            Some(r) if r.read_only => Err(PropertyError::AccessDenied { name: r.name }),
            _ => Ok(()),
        }
    }

    /// Recovers the typed handle for an untyped id.
    ///
    /// Fails with [`PropertyError::TypeMismatch`] if the property does not
    /// hold `T`.
    pub fn typed<T: PropertyValue>(&self, id: PropertyId) -> Result<Property<T>> {
        let registration = self.get(id).ok_or(PropertyError::UnregisteredProperty {
            property: id,
            host: "<any>",
        })?;
        if registration.type_id == TypeId::of::<T>() {
            Ok(Property::from_id(id))
        } else {
            Err(PropertyError::TypeMismatch {
                name: registration.name,
                expected: registration.type_name,
                found: core::any::type_name::<T>(),
            })
        }
    }

    /// Checks an erased value against the property's value type.
    pub fn check_value(&self, id: PropertyId, value: &ErasedValue) -> Result<()> {
        match self.get(id) {
            Some(r) if r.type_id != value.type_id() => Err(PropertyError::TypeMismatch {
                name: r.name,
                expected: r.type_name,
                found: value.type_name(),
            }),
            Some(_) => Ok(()),
            None => Err(PropertyError::UnregisteredProperty {
                property: id,
                host: "<any>",
            }),
        }
    }

    /// Runs the coerce callback on an erased value.
    #[must_use]
    pub fn coerce_erased(&self, id: PropertyId, value: ErasedValue) -> ErasedValue {
        match self.get(id) {
            Some(r) => r.metadata.coerce_erased(value),
            None => value,
        }
    }

    /// Runs the changed callback of `id`.
    pub fn notify_changed(
        &self,
        id: PropertyId,
        owner: ObjectId,
        old: &ErasedValue,
        new: &ErasedValue,
    ) {
        if let Some(r) = self.get(id) {
            r.metadata.notify_changed(owner, old, new);
        }
    }

    /// Iterates all registered properties.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyId, &PropertyRegistration)> {
        self.properties.iter().enumerate().map(|(i, r)| {
            #[expect(clippy::cast_possible_truncation, reason = "index < len < u16::MAX")]
            (PropertyId::new(i as u16), r)
        })
    }
}

impl core::fmt::Debug for PropertyRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PropertyRegistry")
            .field("count", &self.properties.len())
            .field("properties", &self.by_name.keys().collect::<Vec<_>>())
            .field("types", &self.types.len())
            .finish_non_exhaustive()
    }
}

/// Type-erased metadata for heterogeneous storage.
trait ErasedMetadata: Any {
    fn as_any(&self) -> &dyn Any;
    fn affects(&self) -> ChannelSet;
    fn inherits(&self) -> bool;
    fn default_erased(&self) -> ErasedValue;
    fn coerce_erased(&self, value: ErasedValue) -> ErasedValue;
    fn notify_changed(&self, owner: ObjectId, old: &ErasedValue, new: &ErasedValue);
}

impl<T: PropertyValue> ErasedMetadata for PropertyMetadata<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn affects(&self) -> ChannelSet {
        Self::affects(self)
    }

    fn inherits(&self) -> bool {
        Self::inherits(self)
    }

    fn default_erased(&self) -> ErasedValue {
        ErasedValue::new(self.default_value().clone())
    }

    fn coerce_erased(&self, value: ErasedValue) -> ErasedValue {
        if !self.has_coerce_callback() {
            return value;
        }
        match value.downcast_ref::<T>() {
            Some(v) => ErasedValue::new(self.coerce(v.clone())),
            None => value,
        }
    }

    fn notify_changed(&self, owner: ObjectId, old: &ErasedValue, new: &ErasedValue) {
        if !self.has_changed_callback() {
            return;
        }
        if let (Some(old), Some(new)) = (old.downcast_ref::<T>(), new.downcast_ref::<T>()) {
            self.on_changed(owner, old, new);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::PropertyMetadataBuilder;
    use alloc::format;
    use alloc::string::String;
    use alloc::vec;

    struct Types {
        element: TypeKey,
        control: TypeKey,
        button: TypeKey,
        panel: TypeKey,
    }

    fn setup() -> (PropertyRegistry, Types) {
        let mut registry = PropertyRegistry::new();
        let element = registry.register_type("UIElement", TypeKey::OBJECT);
        let control = registry.register_type("Control", element);
        let button = registry.register_type("Button", control);
        let panel = registry.register_type("Panel", element);
        (
            registry,
            Types {
                element,
                control,
                button,
                panel,
            },
        )
    }

    #[test]
    fn register_assigns_sequential_ids() {
        let (mut registry, t) = setup();
        let width = registry
            .register(t.element, "Width", PropertyMetadata::new(0.0_f64))
            .unwrap();
        let height = registry
            .register(t.element, "Height", PropertyMetadata::new(0.0_f64))
            .unwrap();
        assert_eq!(width.id().index(), 0);
        assert_eq!(height.id().index(), 1);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.name(height.id()), Some("Height"));
    }

    #[test]
    fn duplicate_on_same_type() {
        let (mut registry, t) = setup();
        registry
            .register(t.control, "Padding", PropertyMetadata::new(0.0_f64))
            .unwrap();
        let err = registry
            .register(t.control, "Padding", PropertyMetadata::new(0.0_f64))
            .unwrap_err();
        assert_eq!(
            err,
            PropertyError::DuplicateRegistration {
                name: "Padding",
                owner: "Control",
            }
        );
    }

    #[test]
    fn duplicate_across_lineage_both_directions() {
        let (mut registry, t) = setup();
        registry
            .register(t.control, "Padding", PropertyMetadata::new(0.0_f64))
            .unwrap();

        // Derived type shadowing a base property.
        assert!(matches!(
            registry.register(t.button, "Padding", PropertyMetadata::new(1.0_f64)),
            Err(PropertyError::DuplicateRegistration { .. })
        ));
        // Base type claiming a name a derived type owns.
        assert!(matches!(
            registry.register(t.element, "Padding", PropertyMetadata::new(1.0_f64)),
            Err(PropertyError::DuplicateRegistration { .. })
        ));
    }

    #[test]
    fn unrelated_types_may_reuse_a_name() {
        let (mut registry, t) = setup();
        let a = registry
            .register(t.control, "Padding", PropertyMetadata::new(0.0_f64))
            .unwrap();
        let b = registry
            .register(t.panel, "Padding", PropertyMetadata::new(0_u32))
            .unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(registry.find(t.button, "Padding"), Some(a.id()));
        assert_eq!(registry.find(t.panel, "Padding"), Some(b.id()));
        assert_eq!(registry.find(t.element, "Padding"), None);
    }

    #[test]
    fn add_owner_shares_descriptor_with_override() {
        let (mut registry, t) = setup();
        let font_size = registry
            .register(
                t.panel,
                "FontSize",
                PropertyMetadataBuilder::new(12.0_f64).inherits(true).build(),
            )
            .unwrap();

        let shared = registry.add_owner(font_size, t.control, Some(14.0)).unwrap();
        assert_eq!(shared, font_size);
        assert_eq!(registry.find(t.button, "FontSize"), Some(font_size.id()));

        assert_eq!(registry.default_value(font_size, t.panel), Some(&12.0));
        assert_eq!(registry.default_value(font_size, t.button), Some(&14.0));
        assert!(registry.check_host(font_size.id(), t.button).is_ok());

        // Adding the same owner twice is a duplicate.
        assert!(matches!(
            registry.add_owner(font_size, t.control, None),
            Err(PropertyError::DuplicateRegistration { .. })
        ));
    }

    #[test]
    fn add_owner_cannot_collide_with_other_property() {
        let (mut registry, t) = setup();
        let a = registry
            .register(t.panel, "Tag", PropertyMetadata::new(0_u32))
            .unwrap();
        registry
            .register(t.control, "Tag", PropertyMetadata::new(0_u32))
            .unwrap();
        assert!(matches!(
            registry.add_owner(a, t.button, None),
            Err(PropertyError::DuplicateRegistration { .. })
        ));
    }

    #[test]
    fn read_only_and_attached_flags() {
        let (mut registry, t) = setup();
        let (key, has_items) = registry
            .register_read_only(t.control, "HasItems", PropertyMetadata::new(false))
            .unwrap();
        assert_eq!(key.property(), has_items);
        assert_eq!(
            registry.check_writable(has_items.id()),
            Err(PropertyError::AccessDenied { name: "HasItems" })
        );

        let row = registry
            .register_attached(t.panel, "Row", PropertyMetadata::new(0_u32))
            .unwrap();
        assert!(registry.get(row.id()).unwrap().is_attached());
        assert!(registry.check_writable(row.id()).is_ok());
        // Attached properties are hostable anywhere.
        assert!(registry.check_host(row.id(), t.button).is_ok());
    }

    #[test]
    fn check_host_rejects_non_owner() {
        let (mut registry, t) = setup();
        let padding = registry
            .register(t.control, "Padding", PropertyMetadata::new(0.0_f64))
            .unwrap();
        assert!(registry.check_host(padding.id(), t.button).is_ok());
        assert_eq!(
            registry.check_host(padding.id(), t.panel).unwrap_err(),
            PropertyError::UnregisteredProperty {
                property: padding.id(),
                host: "Panel",
            }
        );
        assert!(matches!(
            registry.check_host(PropertyId::new(99), t.panel),
            Err(PropertyError::UnregisteredProperty { .. })
        ));
    }

    #[test]
    fn typed_checks_value_type() {
        let (mut registry, t) = setup();
        let width = registry
            .register(t.element, "Width", PropertyMetadata::new(0.0_f64))
            .unwrap();
        assert_eq!(registry.typed::<f64>(width.id()), Ok(width));
        assert_eq!(
            registry.typed::<String>(width.id()).unwrap_err(),
            PropertyError::TypeMismatch {
                name: "Width",
                expected: "f64",
                found: core::any::type_name::<String>(),
            }
        );
        assert!(registry
            .check_value(width.id(), &ErasedValue::new(1_i32))
            .is_err());
    }

    #[test]
    fn inherited_properties_are_tracked() {
        let (mut registry, t) = setup();
        let font_size = registry
            .register(
                t.element,
                "FontSize",
                PropertyMetadataBuilder::new(12.0_f64).inherits(true).build(),
            )
            .unwrap();
        registry
            .register(t.element, "Width", PropertyMetadata::new(0.0_f64))
            .unwrap();
        assert_eq!(registry.inherited_properties(), &[font_size.id()]);
    }

    #[test]
    fn erased_callbacks_reach_typed_metadata() {
        use core::sync::atomic::{AtomicU32, Ordering};
        static LAST: AtomicU32 = AtomicU32::new(0);

        let (mut registry, t) = setup();
        let count = registry
            .register(
                t.element,
                "Count",
                PropertyMetadataBuilder::new(0_u32)
                    .coerce(|v| v.min(10))
                    .on_changed(|_, _, new| LAST.store(*new, Ordering::SeqCst))
                    .build(),
            )
            .unwrap();

        let coerced = registry.coerce_erased(count.id(), ErasedValue::new(50_u32));
        assert_eq!(coerced.downcast_ref::<u32>(), Some(&10));

        registry.notify_changed(
            count.id(),
            ObjectId::new(0, 0),
            &ErasedValue::new(0_u32),
            &coerced,
        );
        assert_eq!(LAST.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn iter_and_debug() {
        let (mut registry, t) = setup();
        registry
            .register(t.element, "Width", PropertyMetadata::new(0.0_f64))
            .unwrap();
        registry
            .register(t.element, "Height", PropertyMetadata::new(0.0_f64))
            .unwrap();
        let names: Vec<_> = registry.iter().map(|(_, r)| r.name()).collect();
        assert_eq!(names, vec!["Width", "Height"]);

        let debug = format!("{registry:?}");
        assert!(debug.contains("PropertyRegistry"));
        assert!(debug.contains("Width"));
    }
}
