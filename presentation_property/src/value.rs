// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property value types.
//!
//! [`PropertyValue`] decides what "changed" means for a value type,
//! [`Shared`] wraps resource handles that compare by identity, and
//! [`ErasedValue`] stores values of any property type side by side.

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::{Any, TypeId};
use core::fmt;
use core::ops::Deref;

/// A type that can be stored in a dependency property.
///
/// `same_value` is the change test used by the digest. Every `PartialEq`
/// type gets value equality for free; [`Shared`] uses reference identity.
pub trait PropertyValue: Clone + 'static {
    /// Returns `true` if `self` and `other` count as the same value.
    fn same_value(&self, other: &Self) -> bool;
}

impl<T: PartialEq + Clone + 'static> PropertyValue for T {
    #[inline]
    fn same_value(&self, other: &Self) -> bool {
        self == other
    }
}

/// A shared, identity-compared handle.
///
/// Used for resource-backed values (textures, fonts, brushes backed by GPU
/// objects) where two structurally equal handles may still point at
/// different resources. Cloning shares the resource; two handles are the
/// same value only if they point at the same allocation.
///
/// ```rust
/// use presentation_property::{PropertyValue, Shared};
///
/// let a = Shared::new(String::from("atlas"));
/// let b = a.clone();
/// let c = Shared::new(String::from("atlas"));
///
/// assert!(a.same_value(&b));
/// assert!(!a.same_value(&c));
/// assert_eq!(*a, *c);
/// ```
pub struct Shared<T: ?Sized>(Arc<T>);

impl<T> Shared<T> {
    /// Wraps a value in a new shared allocation.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self(Arc::new(value))
    }
}

impl<T: ?Sized> Shared<T> {
    /// Wraps an existing `Arc`.
    #[must_use]
    pub fn from_arc(inner: Arc<T>) -> Self {
        Self(inner)
    }

    /// Returns `true` if both handles point at the same allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: ?Sized> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: ?Sized> Deref for Shared<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Shared").field(&&*self.0).finish()
    }
}

impl<T: ?Sized + 'static> PropertyValue for Shared<T> {
    #[inline]
    fn same_value(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

/// A type-erased property value.
///
/// Carries the value's [`TypeId`] and type name for checked downcasts and
/// error messages, and keeps the value's [`PropertyValue::same_value`] so
/// the digest can compare erased values.
///
/// ```rust
/// use presentation_property::ErasedValue;
///
/// let value = ErasedValue::new(42_i32);
/// assert!(value.is::<i32>());
/// assert_eq!(value.downcast_ref::<i32>(), Some(&42));
/// assert!(value.same_value(&ErasedValue::new(42_i32)));
/// assert!(!value.same_value(&ErasedValue::new(42_i64)));
/// ```
pub struct ErasedValue {
    inner: Box<dyn ErasedValueTrait>,
    type_id: TypeId,
}

impl ErasedValue {
    /// Erases a concrete value.
    #[must_use]
    pub fn new<T: PropertyValue>(value: T) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            inner: Box::new(value),
        }
    }

    /// Returns the [`TypeId`] of the contained value.
    #[must_use]
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the type name of the contained value.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.inner.type_name()
    }

    /// Returns `true` if the contained value is a `T`.
    #[must_use]
    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Borrows the value as a `T`, if it is one.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        if self.is::<T>() {
            self.inner.as_any().downcast_ref()
        } else {
            None
        }
    }

    /// Compares two erased values. Values of different types never match.
    #[must_use]
    pub fn same_value(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.inner.same_value(other.inner.as_any())
    }
}

impl Clone for ErasedValue {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone_boxed(),
            type_id: self.type_id,
        }
    }
}

impl fmt::Debug for ErasedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedValue")
            .field("type", &self.type_name())
            .finish_non_exhaustive()
    }
}

trait ErasedValueTrait: Any {
    fn as_any(&self) -> &dyn Any;
    fn clone_boxed(&self) -> Box<dyn ErasedValueTrait>;
    fn same_value(&self, other: &dyn Any) -> bool;
    fn type_name(&self) -> &'static str;
}

impl<T: PropertyValue> ErasedValueTrait for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_boxed(&self) -> Box<dyn ErasedValueTrait> {
        Box::new(self.clone())
    }

    fn same_value(&self, other: &dyn Any) -> bool {
        other
            .downcast_ref::<T>()
            .is_some_and(|other| PropertyValue::same_value(self, other))
    }

    fn type_name(&self) -> &'static str {
        core::any::type_name::<T>()
    }
}
