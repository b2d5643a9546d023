// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Presentation Events: routed events over the element tree.
//!
//! ## Overview
//!
//! A routed event is registered once with a [`RoutingStrategy`] and a payload
//! type, which yields a typed [`RoutedEvent<E>`] handle. Raising it on an
//! element walks the route captured from that element to its root:
//!
//! - [`RoutingStrategy::Tunnel`] visits root to source,
//! - [`RoutingStrategy::Bubble`] visits source to root,
//! - [`RoutingStrategy::Direct`] visits the source only.
//!
//! ## Handler precedence
//!
//! At each node, class handlers registered for the node's type and its base
//! types run first, most derived first. They always run. Instance handlers
//! follow and are skipped as soon as the shared [`RoutedEventData`] is
//! marked handled. `handled` is the only way to interrupt a dispatch and it
//! cannot be unset.
//!
//! ## Example
//!
//! ```rust
//! use presentation_events::{EventManager, RoutingStrategy, Scene};
//! use presentation_tree::Capabilities;
//!
//! let mut scene = Scene::bootstrap().unwrap();
//! let ui_element = scene.tree.core().ui_element;
//! let root = scene.tree.create(ui_element, Capabilities::default());
//! let button = scene.tree.create(ui_element, Capabilities::default());
//! scene.tree.append_child(&scene.registry, root, button).unwrap();
//!
//! let mut events: EventManager<Scene> = EventManager::new();
//! let click = events
//!     .register_routed_event::<u32>("Click", RoutingStrategy::Bubble, ui_element)
//!     .unwrap();
//! events
//!     .add_handler(root, click, |_, data, clicks| {
//!         *clicks += 1;
//!         data.set_handled();
//!     })
//!     .unwrap();
//!
//! let mut clicks = 0;
//! let data = events.raise(&mut scene, button, click, &mut clicks).unwrap();
//! assert!(data.is_handled());
//! assert_eq!(clicks, 1);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod data;
mod error;
mod event;
mod manager;
mod route;

pub use data::{DispatchState, RoutedEventData};
pub use error::{EventError, Result};
pub use event::{RoutedEvent, RoutedEventId, RoutedEventInfo, RoutingStrategy};
pub use manager::{EventManager, HandlerToken};
pub use route::{RouteSource, Scene};
