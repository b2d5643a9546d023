// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Presentation: the integration layer of the Presentation Foundation core.
//!
//! ## Overview
//!
//! [`Presentation`] owns one property registry, one element tree, the routed
//! event manager with the built-in input events, and the thread hand-off:
//! a [`UiDispatcher`](presentation_dispatch::UiDispatcher) for background
//! results and a [`WorkQueue`](presentation_dispatch::WorkQueue) for graphics
//! work. It is created once on the UI thread and passed by reference; there
//! is no global state.
//!
//! Input arrives through the `raise_*` methods. Keyboard and game pad input
//! goes to the focused element, mouse input to the capturing element or the
//! hit target, touch input to the hit target. Each raises a tunnelling
//! preview event and then the bubbling event, sharing one `handled` flag.
//! Mouse moves also track hover and raise `MouseLeave` and `MouseEnter`.
//!
//! [`Presentation::frame`] runs pending UI continuations, the property
//! digest and the queued graphics work, in that order.
//!
//! ## Example
//!
//! ```rust
//! use presentation::{Capabilities, InputDevice, Key, KeyArgs, ModifierKeys, Presentation};
//!
//! let mut ui = Presentation::new(Default::default()).unwrap();
//! let ui_element = ui.tree().core().ui_element;
//! let focusable = ui.tree().core().focusable;
//! let window = ui.create(ui_element, Capabilities::default());
//! let input = ui.create(ui_element, Capabilities::default());
//! ui.append_child(window, input).unwrap();
//! ui.set_value(input, focusable, true).unwrap();
//! ui.focus(input).unwrap();
//!
//! let key_down = ui.input_events().key_down.main;
//! ui.events_mut()
//!     .add_handler(window, key_down, |_, data, args| {
//!         if args.key == Key(13) {
//!             data.set_handled();
//!         }
//!     })
//!     .unwrap();
//!
//! let args = KeyArgs {
//!     device: InputDevice::keyboard(0),
//!     key: Key(13),
//!     modifiers: ModifierKeys::empty(),
//!     repeat: false,
//! };
//! let data = ui.raise_key_down(args).unwrap().unwrap();
//! assert!(data.is_handled());
//!
//! let report = ui.frame();
//! assert!(report.digest.changed(input, focusable.id()));
//! ```

mod config;
mod context;
mod diagnostics;
mod error;
mod events;
mod input;

pub use config::{PresentationConfig, PresentationConfigBuilder};
pub use context::{FrameReport, Presentation};
pub use diagnostics::{DiagnosticsProperties, Rgba};
pub use error::{PresentationError, Result};
pub use events::{InputEvents, Paired};
pub use input::{
    DeviceKind, FocusChangedArgs, GamePadButton, GamePadButtonArgs, InputDevice, Key, KeyArgs,
    ModifierKeys, MouseButton, MouseButtonArgs, MouseMoveArgs, MouseWheelArgs, TextInputArgs,
    TouchArgs, TouchPhase,
};

pub use presentation_dispatch::{DispatchError, Task};
pub use presentation_events::{RoutedEventData, Scene};
pub use presentation_tree::{
    Capabilities, ContentItemsHost, Detached, ElementId, FocusTransition, Item, ItemsHost,
};
