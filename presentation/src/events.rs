// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The built-in routed events.

use presentation_events::{EventManager, Result, RoutedEvent, RoutingStrategy, Scene};
use presentation_property::TypeKey;

use crate::input::{
    FocusChangedArgs, GamePadButtonArgs, KeyArgs, MouseButtonArgs, MouseMoveArgs, MouseWheelArgs,
    TextInputArgs, TouchArgs,
};

/// A tunnelling preview event and the bubbling event raised after it.
pub struct Paired<E> {
    /// Raised first, root to target.
    pub preview: RoutedEvent<E>,
    /// Raised second, target to root, with the preview's `handled` flag.
    pub main: RoutedEvent<E>,
}

impl<E> Copy for Paired<E> {}

impl<E> Clone for Paired<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> core::fmt::Debug for Paired<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Paired")
            .field("preview", &self.preview)
            .field("main", &self.main)
            .finish()
    }
}

impl<E: 'static> Paired<E> {
    fn register(
        events: &mut EventManager<Scene>,
        owner: TypeKey,
        preview: &'static str,
        main: &'static str,
    ) -> Result<Self> {
        Ok(Self {
            preview: events.register_routed_event(preview, RoutingStrategy::Tunnel, owner)?,
            main: events.register_routed_event(main, RoutingStrategy::Bubble, owner)?,
        })
    }
}

/// Handles for the input and focus events every element understands.
///
/// Registered on `UIElement`, so class handlers for it see all of them.
#[derive(Copy, Clone, Debug)]
pub struct InputEvents {
    /// `PreviewKeyDown` / `KeyDown`, routed to the focused element.
    pub key_down: Paired<KeyArgs>,
    /// `PreviewKeyUp` / `KeyUp`, routed to the focused element.
    pub key_up: Paired<KeyArgs>,
    /// `PreviewTextInput` / `TextInput`, routed to the focused element.
    pub text_input: Paired<TextInputArgs>,
    /// `PreviewMouseMove` / `MouseMove`.
    pub mouse_move: Paired<MouseMoveArgs>,
    /// `PreviewMouseDown` / `MouseDown`.
    pub mouse_down: Paired<MouseButtonArgs>,
    /// `PreviewMouseUp` / `MouseUp`.
    pub mouse_up: Paired<MouseButtonArgs>,
    /// `PreviewMouseWheel` / `MouseWheel`.
    pub mouse_wheel: Paired<MouseWheelArgs>,
    /// `PreviewTouchDown` / `TouchDown`.
    pub touch_down: Paired<TouchArgs>,
    /// `PreviewTouchMove` / `TouchMove`.
    pub touch_move: Paired<TouchArgs>,
    /// `PreviewTouchUp` / `TouchUp`.
    pub touch_up: Paired<TouchArgs>,
    /// `PreviewGamePadButtonDown` / `GamePadButtonDown`, routed to the
    /// focused element.
    pub game_pad_button_down: Paired<GamePadButtonArgs>,
    /// `PreviewGamePadButtonUp` / `GamePadButtonUp`.
    pub game_pad_button_up: Paired<GamePadButtonArgs>,
    /// Bubbles from the element that gained keyboard focus.
    pub got_keyboard_focus: RoutedEvent<FocusChangedArgs>,
    /// Bubbles from the element that lost keyboard focus.
    pub lost_keyboard_focus: RoutedEvent<FocusChangedArgs>,
    /// Bubbles from the element that captured the mouse.
    pub got_mouse_capture: RoutedEvent<FocusChangedArgs>,
    /// Bubbles from the element that lost mouse capture.
    pub lost_mouse_capture: RoutedEvent<FocusChangedArgs>,
    /// Raised directly on each element the mouse moves onto, outermost
    /// first.
    pub mouse_enter: RoutedEvent<MouseMoveArgs>,
    /// Raised directly on each element the mouse leaves, innermost first.
    pub mouse_leave: RoutedEvent<MouseMoveArgs>,
}

impl InputEvents {
    /// Registers the built-in events on `owner`, normally `UIElement`.
    ///
    /// Fails with a duplicate event error if called twice on one manager.
    pub fn register(events: &mut EventManager<Scene>, owner: TypeKey) -> Result<Self> {
        let bubble = RoutingStrategy::Bubble;
        let direct = RoutingStrategy::Direct;
        let registered = Self {
            key_down: Paired::register(events, owner, "PreviewKeyDown", "KeyDown")?,
            key_up: Paired::register(events, owner, "PreviewKeyUp", "KeyUp")?,
            text_input: Paired::register(events, owner, "PreviewTextInput", "TextInput")?,
            mouse_move: Paired::register(events, owner, "PreviewMouseMove", "MouseMove")?,
            mouse_down: Paired::register(events, owner, "PreviewMouseDown", "MouseDown")?,
            mouse_up: Paired::register(events, owner, "PreviewMouseUp", "MouseUp")?,
            mouse_wheel: Paired::register(events, owner, "PreviewMouseWheel", "MouseWheel")?,
            touch_down: Paired::register(events, owner, "PreviewTouchDown", "TouchDown")?,
            touch_move: Paired::register(events, owner, "PreviewTouchMove", "TouchMove")?,
            touch_up: Paired::register(events, owner, "PreviewTouchUp", "TouchUp")?,
            game_pad_button_down: Paired::register(
                events,
                owner,
                "PreviewGamePadButtonDown",
                "GamePadButtonDown",
            )?,
            game_pad_button_up: Paired::register(
                events,
                owner,
                "PreviewGamePadButtonUp",
                "GamePadButtonUp",
            )?,
            got_keyboard_focus: events.register_routed_event("GotKeyboardFocus", bubble, owner)?,
            lost_keyboard_focus: events.register_routed_event("LostKeyboardFocus", bubble, owner)?,
            got_mouse_capture: events.register_routed_event("GotMouseCapture", bubble, owner)?,
            lost_mouse_capture: events.register_routed_event("LostMouseCapture", bubble, owner)?,
            mouse_enter: events.register_routed_event("MouseEnter", direct, owner)?,
            mouse_leave: events.register_routed_event("MouseLeave", direct, owner)?,
        };
        tracing::debug!(count = events.len(), "registered built-in input events");
        Ok(registered)
    }
}
