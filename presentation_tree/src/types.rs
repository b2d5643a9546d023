// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the element tree: ids, capabilities, items and reports.

use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use presentation_dirty::ChannelSet;
use presentation_property::{ObjectId, PropertyChange, PropertyId, Shared};

/// Identifier for an element in the tree.
///
/// Elements are dependency objects, so this is the same generational handle
/// the property system uses. A fresh slot starts at generation `1`; reusing a
/// freed slot bumps the generation, so a stale id never aliases a live
/// element.
pub type ElementId = ObjectId;

bitflags::bitflags! {
    /// What an element participates in beyond holding properties.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// Can receive keyboard focus, mouse capture and input events.
        const INPUT      = 0b0000_0001;
        /// Takes part in measure and arrange.
        const LAYOUT     = 0b0000_0010;
        /// Receives values from the styling engine.
        const STYLE      = 0b0000_0100;
        /// Generates item containers through an [`ItemsHost`](crate::ItemsHost).
        const ITEMS_HOST = 0b0000_1000;
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::INPUT | Self::LAYOUT | Self::STYLE
    }
}

/// An entry in an items host's item list.
///
/// Either an element that serves as its own container, or arbitrary data
/// that gets a generated container. Data items compare by identity.
#[derive(Clone)]
pub enum Item {
    /// An element that is placed directly into the items panel.
    Element(ElementId),
    /// Opaque data presented through a generated container.
    Data(Shared<dyn Any + Send + Sync>),
}

impl Item {
    /// Wraps a data value.
    pub fn data<T: Any + Send + Sync>(value: T) -> Self {
        Self::Data(Shared::from_arc(alloc::sync::Arc::new(value)))
    }

    /// Returns the element if this item is one.
    #[must_use]
    pub fn as_element(&self) -> Option<ElementId> {
        match self {
            Self::Element(id) => Some(*id),
            Self::Data(_) => None,
        }
    }

    /// Downcasts a data item.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Element(_) => None,
            Self::Data(data) => (**data).downcast_ref(),
        }
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Element(a), Self::Element(b)) => a == b,
            (Self::Data(a), Self::Data(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(id) => f.debug_tuple("Element").field(id).finish(),
            Self::Data(_) => f.write_str("Data(..)"),
        }
    }
}

/// What a detach left behind for the caller to report.
///
/// Focus and capture flags are already cleared when this is returned; the
/// caller raises the matching lost-focus and lost-capture events.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Detached {
    /// The root of the detached subtree.
    pub element: ElementId,
    /// The element that had keyboard focus inside the subtree, if any.
    pub lost_focus: Option<ElementId>,
    /// The element that had mouse capture inside the subtree, if any.
    pub lost_capture: Option<ElementId>,
}

/// A keyboard focus or mouse capture transfer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FocusChange {
    /// The previous holder.
    pub old: Option<ElementId>,
    /// The new holder.
    pub new: Option<ElementId>,
}

/// Everything one digest pass changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DigestReport {
    changes: Vec<PropertyChange>,
    invalidated: ChannelSet,
}

impl DigestReport {
    pub(crate) fn push(&mut self, change: PropertyChange) {
        self.invalidated |= change.affects;
        self.changes.push(change);
    }

    /// Returns the changes in the order they were found, parents first.
    #[must_use]
    pub fn changes(&self) -> &[PropertyChange] {
        &self.changes
    }

    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Returns the number of changes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Returns `true` if `property` changed on `element`.
    #[must_use]
    pub fn changed(&self, element: ElementId, property: PropertyId) -> bool {
        self.changes
            .iter()
            .any(|c| c.object == element && c.property == property)
    }

    /// Returns the union of every change's channels.
    #[must_use]
    pub fn invalidated(&self) -> ChannelSet {
        self.invalidated
    }
}
