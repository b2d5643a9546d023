// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Presentation Tree: the logical and visual element tree.
//!
//! Elements are dependency objects stored in an arena and addressed by
//! generational [`ElementId`]s. The tree keeps three things consistent under
//! structural change:
//!
//! - inherited property values, which follow logical parents,
//! - keyboard focus and mouse capture, with their read-only flags,
//! - the item containers generated by items hosts.
//!
//! ## Digest
//!
//! Writes never notify synchronously. They schedule the element, and
//! [`Tree::digest`] visits the scheduled elements parent-first, compares each
//! dirty slot with what was last reported, runs change callbacks and marks
//! the affected invalidation channels. An inherited change reaches the
//! non-overriding part of the subtree in the same pass.
//!
//! ## Quick Start
//!
//! ```rust
//! use presentation_property::{PropertyMetadataBuilder, PropertyRegistry};
//! use presentation_tree::{Capabilities, CoreProperties, Tree};
//!
//! let mut registry = PropertyRegistry::new();
//! let core = CoreProperties::register(&mut registry).unwrap();
//! let font_size = registry
//!     .register(
//!         core.ui_element,
//!         "FontSize",
//!         PropertyMetadataBuilder::new(12.0_f64).inherits(true).build(),
//!     )
//!     .unwrap();
//!
//! let mut tree = Tree::new(core);
//! let window = tree.create(core.ui_element, Capabilities::default());
//! let label = tree.create(core.ui_element, Capabilities::default());
//! tree.append_child(&registry, window, label).unwrap();
//! let _ = tree.digest(&registry);
//!
//! tree.set_value(&registry, window, font_size, 16.0).unwrap();
//! let report = tree.digest(&registry);
//! assert!(report.changed(window, font_size.id()));
//! assert!(report.changed(label, font_size.id()));
//! assert_eq!(tree.get_value(&registry, label, font_size), Ok(16.0));
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod core_props;
mod digest;
mod element;
mod error;
mod focus;
mod input;
mod items;
mod tree;
mod types;
mod values;

pub use core_props::CoreProperties;
pub use element::Element;
pub use error::{Result, TreeError};
pub use focus::{FocusPath, FocusTransition};
pub use items::{ContentItemsHost, ItemsHost};
pub use tree::{Tree, TreeLookup};
pub use types::{Capabilities, Detached, DigestReport, ElementId, FocusChange, Item};
