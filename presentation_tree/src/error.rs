// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree errors.

use presentation_property::PropertyError;

use crate::types::ElementId;

/// Errors reported by structural, value and focus operations on a [`Tree`](crate::Tree).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The id refers to a destroyed element.
    #[error("{0:?} is not a live element")]
    StaleElement(ElementId),
    /// Inserting `child` under `parent` would make `child` its own ancestor.
    #[error("inserting {child:?} under {parent:?} would create a cycle")]
    CyclicInsertion {
        /// The requested parent.
        parent: ElementId,
        /// The element that was being inserted.
        child: ElementId,
    },
    /// The element already has a parent.
    #[error("{child:?} already has parent {parent:?}")]
    AlreadyParented {
        /// The element that was being inserted.
        child: ElementId,
        /// Its current logical or visual parent.
        parent: ElementId,
    },
    /// The element is not a logical child of the given parent.
    #[error("{child:?} is not a child of {parent:?}")]
    NotAChild {
        /// The parent that was named.
        parent: ElementId,
        /// The element that was named as its child.
        child: ElementId,
    },
    /// An insertion index past the end of a child or item list.
    #[error("index {index} is out of range for length {len}")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The current length.
        len: usize,
    },
    /// The element cannot take keyboard focus.
    #[error("{0:?} is not focusable")]
    NotFocusable(ElementId),
    /// The element does not have the input capability.
    #[error("{0:?} does not accept input")]
    NoInput(ElementId),
    /// The element has no items host behavior.
    #[error("{0:?} is not an items host")]
    NotAnItemsHost(ElementId),
    /// A property operation failed.
    #[error(transparent)]
    Property(#[from] PropertyError),
}

/// Result alias for tree operations.
pub type Result<T, E = TreeError> = core::result::Result<T, E>;
