// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Identification types.
//!
//! [`PropertyId`] identifies a property at runtime, [`Property<T>`] adds the
//! value type at compile time, and [`PropertyKey<T>`] is the write capability
//! for read-only properties. [`ObjectId`] names a dependency object.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

/// A runtime property identifier.
///
/// A `u16` index into the [`PropertyRegistry`](crate::PropertyRegistry).
///
/// ```rust
/// use presentation_property::PropertyId;
///
/// let id = PropertyId::new(42);
/// assert_eq!(id.index(), 42);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyId(u16);

impl PropertyId {
    /// Creates a property ID from a registry index.
    #[must_use]
    #[inline]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Returns the underlying index.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PropertyId").field(&self.0).finish()
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyId({})", self.0)
    }
}

/// A property handle carrying its value type.
///
/// Handles are only minted by the registry, so holding a `Property<T>` means
/// the property was registered with value type `T`. Code that only has a
/// [`PropertyId`] goes through the checked accessors and may get a
/// [`PropertyError::TypeMismatch`](crate::PropertyError::TypeMismatch).
pub struct Property<T> {
    id: PropertyId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Property<T> {
    #[inline]
    pub(crate) const fn from_id(id: PropertyId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// Returns the underlying property ID.
    #[must_use]
    #[inline]
    pub const fn id(self) -> PropertyId {
        self.id
    }
}

impl<T> Copy for Property<T> {}

impl<T> Clone for Property<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for Property<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Property<T> {}

impl<T> Hash for Property<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("id", &self.id)
            .field("type", &core::any::type_name::<T>())
            .finish()
    }
}

/// Write access to a read-only property.
///
/// Returned once by
/// [`PropertyRegistry::register_read_only`](crate::PropertyRegistry::register_read_only).
/// The owning module keeps it private and hands out the plain [`Property<T>`]
/// for reading.
pub struct PropertyKey<T> {
    property: Property<T>,
}

impl<T> PropertyKey<T> {
    #[inline]
    pub(crate) const fn new(property: Property<T>) -> Self {
        Self { property }
    }

    /// Returns the readable handle for this key.
    #[must_use]
    #[inline]
    pub const fn property(&self) -> Property<T> {
        self.property
    }
}

impl<T> Copy for PropertyKey<T> {}

impl<T> Clone for PropertyKey<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> fmt::Debug for PropertyKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PropertyKey").field(&self.property).finish()
    }
}

/// Identifier of a dependency object.
///
/// Slot index plus generation, so a stale id never aliases a newer object
/// that reused the slot.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(u32, u32);

impl ObjectId {
    /// Creates an id from a slot index and generation.
    #[must_use]
    #[inline]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(index, generation)
    }

    /// Returns the slot index.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the generation.
    #[must_use]
    #[inline]
    pub const fn generation(self) -> u32 {
        self.1
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({}v{})", self.0, self.1)
    }
}
