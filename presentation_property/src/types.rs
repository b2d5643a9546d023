// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Object type hierarchy.
//!
//! Property ownership, `AddOwner` and class handlers all reason about "this
//! type or a type derived from it". Element variants are plain data, so the
//! hierarchy is modelled explicitly as a table of [`TypeKey`]s with single
//! inheritance rooted at [`TypeKey::OBJECT`].

use alloc::vec::Vec;
use core::fmt;

/// Identifies a registered object type.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeKey(u16);

impl TypeKey {
    /// The root of the hierarchy; every type derives from it.
    pub const OBJECT: Self = Self(0);

    /// Returns the underlying index.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeKey").field(&self.0).finish()
    }
}

#[derive(Debug)]
struct TypeInfo {
    name: &'static str,
    base: Option<TypeKey>,
}

/// Single-inheritance table of object types.
///
/// ```rust
/// use presentation_property::{TypeKey, TypeRegistry};
///
/// let mut types = TypeRegistry::new();
/// let element = types.register_type("UIElement", TypeKey::OBJECT);
/// let button = types.register_type("Button", element);
///
/// assert!(types.derives_from(button, element));
/// assert!(!types.derives_from(element, button));
/// let chain: Vec<_> = types.ancestors(button).map(|t| types.name(t)).collect();
/// assert_eq!(chain, ["Button", "UIElement", "DependencyObject"]);
/// ```
#[derive(Debug)]
pub struct TypeRegistry {
    types: Vec<TypeInfo>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Creates a table holding only the root type.
    #[must_use]
    pub fn new() -> Self {
        Self {
            types: alloc::vec![TypeInfo {
                name: "DependencyObject",
                base: None,
            }],
        }
    }

    /// Registers a type deriving from `base`.
    ///
    /// Names are for diagnostics; two types may share one.
    ///
    /// # Panics
    ///
    /// Panics if `base` is not registered, or if more than 65,535 types are
    /// registered.
    pub fn register_type(&mut self, name: &'static str, base: TypeKey) -> TypeKey {
        assert!(
            (base.0 as usize) < self.types.len(),
            "base type {base:?} is not registered"
        );
        assert!(
            self.types.len() < u16::MAX as usize,
            "Too many types registered (max {})",
            u16::MAX
        );
        #[expect(clippy::cast_possible_truncation, reason = "checked above")]
        let key = TypeKey(self.types.len() as u16);
        self.types.push(TypeInfo {
            name,
            base: Some(base),
        });
        tracing::debug!(name, ?key, ?base, "registered type");
        key
    }

    /// Returns the number of registered types, including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Always `false`: the root type is always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Returns the diagnostic name of a type.
    #[must_use]
    pub fn name(&self, ty: TypeKey) -> &'static str {
        self.types.get(ty.0 as usize).map_or("<unknown>", |t| t.name)
    }

    /// Returns the direct base of a type.
    #[must_use]
    pub fn base(&self, ty: TypeKey) -> Option<TypeKey> {
        self.types.get(ty.0 as usize).and_then(|t| t.base)
    }

    /// Looks up a type by name. The most recently registered match wins.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<TypeKey> {
        self.types.iter().rposition(|t| t.name == name).map(|i| {
            #[expect(clippy::cast_possible_truncation, reason = "index < len < u16::MAX")]
            TypeKey(i as u16)
        })
    }

    /// Returns `true` if `ty` is `base` or derives from it.
    #[must_use]
    pub fn derives_from(&self, ty: TypeKey, base: TypeKey) -> bool {
        self.ancestors(ty).any(|t| t == base)
    }

    /// Returns `true` if one of the two types derives from the other.
    #[must_use]
    pub fn same_lineage(&self, a: TypeKey, b: TypeKey) -> bool {
        self.derives_from(a, b) || self.derives_from(b, a)
    }

    /// Iterates `ty` and its bases, most derived first.
    pub fn ancestors(&self, ty: TypeKey) -> Ancestors<'_> {
        let start = ((ty.0 as usize) < self.types.len()).then_some(ty);
        Ancestors {
            types: self,
            next: start,
        }
    }
}

/// Iterator returned by [`TypeRegistry::ancestors`].
#[derive(Debug)]
pub struct Ancestors<'a> {
    types: &'a TypeRegistry,
    next: Option<TypeKey>,
}

impl Iterator for Ancestors<'_> {
    type Item = TypeKey;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.types.base(current);
        Some(current)
    }
}
