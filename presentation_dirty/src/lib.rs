// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Presentation Dirty: invalidation channels and dirty sets.
//!
//! The property digest and the layout/render collaborators talk to each other
//! through this crate. A property declares which [`Channel`]s it affects; when
//! its effective value changes during a digest, the owning element is marked
//! dirty in those channels. Layout and rendering later drain the channels they
//! care about.
//!
//! - **Channels** ([`Channel`], [`ChannelSet`]): named invalidation domains.
//!   The well-known ones are [`Channel::MEASURE`], [`Channel::ARRANGE`] and
//!   [`Channel::RENDER`]; [`Channel::DIGEST`] schedules objects for the next
//!   digest pass.
//! - **Dirty sets** ([`DirtySet`]): accumulated dirty keys per channel with a
//!   generation counter.
//! - **Ordered drain** ([`drain_ordered`]): yields dirty keys sorted by a
//!   caller-provided rank (tree depth), so parents are processed before their
//!   children.
//!
//! ## Quick Start
//!
//! ```rust
//! use presentation_dirty::{drain_ordered, Channel, DirtySet};
//!
//! let mut dirty = DirtySet::<u32>::new();
//!
//! // Key 3 lives two levels down, key 1 is the root.
//! dirty.mark(3, Channel::DIGEST);
//! dirty.mark(1, Channel::DIGEST);
//! dirty.mark(1, Channel::RENDER);
//!
//! let depth = |key: u32| Some(key - 1);
//! let order: Vec<u32> = drain_ordered(&mut dirty, Channel::DIGEST, depth).collect();
//! assert_eq!(order, vec![1, 3]);
//!
//! // Other channels are untouched.
//! assert!(dirty.is_dirty(1, Channel::RENDER));
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod channel;
mod drain;
mod set;

pub use channel::{Channel, ChannelSet, ChannelSetIter};
pub use drain::{DrainOrdered, drain_ordered};
pub use set::DirtySet;
