// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One node of the element tree.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use presentation_property::{DependencyObject, ObjectId, PropertyStore, TypeKey};
use smallvec::SmallVec;

use crate::items::ItemsHost;
use crate::types::{Capabilities, ElementId, Item};

pub(crate) type Children = SmallVec<[ElementId; 4]>;

/// An element: a dependency object with logical and visual links.
///
/// Elements live in a [`Tree`](crate::Tree) arena and are only reachable
/// through it. Links are ids, never owning pointers.
pub struct Element {
    pub(crate) ty: TypeKey,
    pub(crate) caps: Capabilities,
    pub(crate) parent: Option<ElementId>,
    pub(crate) children: Children,
    pub(crate) visual_parent: Option<ElementId>,
    pub(crate) visual_children: Children,
    /// Logical depth; roots are `0`.
    pub(crate) depth: u32,
    pub(crate) store: PropertyStore<ElementId>,
    pub(crate) items_host: Option<Box<dyn ItemsHost>>,
    pub(crate) items: Vec<(ElementId, Item)>,
    /// The items host that generated or adopted this element as a container.
    pub(crate) container_of: Option<ElementId>,
}

impl Element {
    pub(crate) fn new(id: ElementId, ty: TypeKey, caps: Capabilities) -> Self {
        Self {
            ty,
            caps,
            parent: None,
            children: SmallVec::new(),
            visual_parent: None,
            visual_children: SmallVec::new(),
            depth: 0,
            store: PropertyStore::new(id),
            items_host: None,
            items: Vec::new(),
            container_of: None,
        }
    }

    /// Returns the element's id.
    #[must_use]
    pub fn id(&self) -> ElementId {
        self.store.owner()
    }

    /// Returns the element's type.
    #[must_use]
    pub fn element_type(&self) -> TypeKey {
        self.ty
    }

    /// Returns the element's capabilities.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    /// Returns the element's property store.
    #[must_use]
    pub fn store(&self) -> &PropertyStore<ElementId> {
        &self.store
    }

    /// The parent input and focus routes go through: visual if set,
    /// otherwise logical.
    pub(crate) fn route_parent(&self) -> Option<ElementId> {
        self.visual_parent.or(self.parent)
    }
}

impl DependencyObject for Element {
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

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.id())
            .field("ty", &self.ty)
            .field("caps", &self.caps)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("visual_parent", &self.visual_parent)
            .field("visual_children", &self.visual_children)
            .field("depth", &self.depth)
            .field("slots", &self.store.len())
            .field("items_host", &self.items_host.is_some())
            .field("items", &self.items)
            .field("container_of", &self.container_of)
            .finish()
    }
}
