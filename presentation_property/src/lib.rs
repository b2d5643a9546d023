// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Presentation Property: dependency properties with layered values and a
//! batched digest.
//!
//! ## Core Concepts
//!
//! ### Registry
//!
//! [`PropertyRegistry`] is the append-only table of property descriptors.
//! Each descriptor has a name, a value type, an owner type from the embedded
//! [`TypeRegistry`], and [`PropertyMetadata`]: default value, inheritance,
//! the invalidation channels it affects, and optional coerce and change
//! callbacks. Names are unique per type lineage; sharing a property with
//! another type goes through [`PropertyRegistry::add_owner`].
//!
//! ### Value slots
//!
//! Every object keeps a sparse [`PropertyStore`] of [`ValueSlot`]s, one per
//! property it has touched. The effective value resolves as:
//!
//! 1. local value
//! 2. animated value
//! 3. styled value
//! 4. nearest ancestor's own value (inheriting properties only)
//! 5. default for the object's type
//!
//! ### Digest
//!
//! Mutations only mark slots dirty. A digest compares each dirty slot's
//! effective value with the value from the previous digest, using
//! [`PropertyValue::same_value`], and runs the change callback once per real
//! change. Digesting twice in a row reports nothing the second time.
//!
//! ## Quick Start
//!
//! ```rust
//! use presentation_property::{
//!     DependencyObject, DependencyObjectExt, NoParent, ObjectId, PropertyMetadataBuilder,
//!     PropertyRegistry, PropertyStore, TypeKey,
//! };
//! use presentation_dirty::ChannelSet;
//!
//! struct Label {
//!     store: PropertyStore<ObjectId>,
//! }
//!
//! impl DependencyObject for Label {
//!     fn property_store(&self) -> &PropertyStore<ObjectId> { &self.store }
//!     fn property_store_mut(&mut self) -> &mut PropertyStore<ObjectId> { &mut self.store }
//!     fn type_key(&self) -> TypeKey { TypeKey::OBJECT }
//!     fn parent_key(&self) -> Option<ObjectId> { None }
//! }
//!
//! let mut registry = PropertyRegistry::new();
//! let width = registry
//!     .register(
//!         TypeKey::OBJECT,
//!         "Width",
//!         PropertyMetadataBuilder::new(0.0_f64)
//!             .affects(ChannelSet::LAYOUT)
//!             .build(),
//!     )
//!     .unwrap();
//!
//! let mut label = Label { store: PropertyStore::new(ObjectId::new(0, 0)) };
//! label.set_value(width, 120.0, &registry, &NoParent).unwrap();
//!
//! let changes = label.digest(&registry, &NoParent);
//! assert_eq!(changes[0].affects, ChannelSet::LAYOUT);
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod error;
mod id;
mod metadata;
mod object;
mod registry;
mod slot;
mod store;
mod types;
mod value;

pub use error::{PropertyError, Result};
pub use id::{ObjectId, Property, PropertyId, PropertyKey};
pub use metadata::{
    CoerceValueCallback, PropertyChangedCallback, PropertyMetadata, PropertyMetadataBuilder,
};
pub use object::{
    DependencyObject, DependencyObjectExt, NoParent, ParentLookup, PropertyChange,
    resolve_effective, resolve_observed, walk_inherited, walk_observed,
};
pub use registry::{PropertyRegistration, PropertyRegistry};
pub use slot::{ValueSlot, ValueSource};
pub use store::PropertyStore;
pub use types::{Ancestors, TypeKey, TypeRegistry};
pub use value::{ErasedValue, PropertyValue, Shared};
