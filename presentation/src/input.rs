// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input devices and the payloads of the built-in input events.
//!
//! Platform layers translate their native events into these and hand them to
//! the `raise_*` methods of [`Presentation`](crate::Presentation).

use presentation_tree::ElementId;

/// The kind of device an input came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    /// A keyboard.
    Keyboard,
    /// A mouse or other pointer.
    Mouse,
    /// A touch surface.
    Touch,
    /// A game controller.
    GamePad,
}

/// Identifies one physical input device.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct InputDevice {
    /// What kind of device this is.
    pub kind: DeviceKind,
    /// The platform's index for the device among those of its kind.
    pub index: u32,
}

impl InputDevice {
    /// The keyboard with platform index `index`.
    #[must_use]
    pub const fn keyboard(index: u32) -> Self {
        Self {
            kind: DeviceKind::Keyboard,
            index,
        }
    }

    /// The mouse with platform index `index`.
    #[must_use]
    pub const fn mouse(index: u32) -> Self {
        Self {
            kind: DeviceKind::Mouse,
            index,
        }
    }

    /// The touch surface with platform index `index`.
    #[must_use]
    pub const fn touch(index: u32) -> Self {
        Self {
            kind: DeviceKind::Touch,
            index,
        }
    }

    /// The game controller with platform index `index`.
    #[must_use]
    pub const fn game_pad(index: u32) -> Self {
        Self {
            kind: DeviceKind::GamePad,
            index,
        }
    }
}

/// A platform key code.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Key(pub u32);

bitflags::bitflags! {
    /// Modifier keys held while a key went down.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ModifierKeys: u8 {
        /// Either shift key.
        const SHIFT   = 0b0000_0001;
        /// Either control key.
        const CONTROL = 0b0000_0010;
        /// Either alt key.
        const ALT     = 0b0000_0100;
        /// The platform's logo key.
        const GUI     = 0b0000_1000;
    }
}

/// A mouse button.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// The primary button.
    Left,
    /// The wheel button.
    Middle,
    /// The secondary button.
    Right,
    /// The first extra button.
    X1,
    /// The second extra button.
    X2,
}

/// A game controller button.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GamePadButton {
    /// Bottom face button.
    A,
    /// Right face button.
    B,
    /// Left face button.
    X,
    /// Top face button.
    Y,
    /// The back or select button.
    Back,
    /// The start button.
    Start,
    /// The left shoulder button.
    LeftShoulder,
    /// The right shoulder button.
    RightShoulder,
    /// D-pad up.
    DPadUp,
    /// D-pad down.
    DPadDown,
    /// D-pad left.
    DPadLeft,
    /// D-pad right.
    DPadRight,
}

/// Where a touch is in its lifetime.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TouchPhase {
    /// The finger went down.
    Down,
    /// The finger moved.
    Move,
    /// The finger lifted.
    Up,
}

/// Payload of `KeyDown`, `KeyUp` and their previews.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyArgs {
    /// The keyboard.
    pub device: InputDevice,
    /// The key.
    pub key: Key,
    /// Modifiers held at the time.
    pub modifiers: ModifierKeys,
    /// `true` for auto-repeat presses.
    pub repeat: bool,
}

/// Payload of `TextInput` and its preview.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextInputArgs {
    /// The keyboard.
    pub device: InputDevice,
    /// The composed text.
    pub text: String,
}

/// Payload of `MouseMove` and its preview.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MouseMoveArgs {
    /// The mouse.
    pub device: InputDevice,
    /// Position in window coordinates.
    pub x: f64,
    /// Position in window coordinates.
    pub y: f64,
    /// Horizontal movement since the last event.
    pub dx: f64,
    /// Vertical movement since the last event.
    pub dy: f64,
}

/// Payload of `MouseDown`, `MouseUp` and their previews.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MouseButtonArgs {
    /// The mouse.
    pub device: InputDevice,
    /// The button.
    pub button: MouseButton,
    /// `true` when the button went down.
    pub pressed: bool,
    /// Position in window coordinates.
    pub x: f64,
    /// Position in window coordinates.
    pub y: f64,
}

/// Payload of `MouseWheel` and its preview.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MouseWheelArgs {
    /// The mouse.
    pub device: InputDevice,
    /// Horizontal scroll amount.
    pub dx: f64,
    /// Vertical scroll amount.
    pub dy: f64,
}

/// Payload of `TouchDown`, `TouchMove`, `TouchUp` and their previews.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TouchArgs {
    /// The touch surface.
    pub device: InputDevice,
    /// Identifies the finger for the duration of the touch.
    pub touch_id: i64,
    /// What happened.
    pub phase: TouchPhase,
    /// Position in window coordinates.
    pub x: f64,
    /// Position in window coordinates.
    pub y: f64,
    /// Normalized pressure.
    pub pressure: f32,
}

/// Payload of `GamePadButtonDown`, `GamePadButtonUp` and their previews.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GamePadButtonArgs {
    /// The controller.
    pub device: InputDevice,
    /// The button.
    pub button: GamePadButton,
    /// `true` when the button went down.
    pub pressed: bool,
    /// `true` for auto-repeat presses.
    pub repeat: bool,
}

/// Payload of the keyboard focus and mouse capture events.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FocusChangedArgs {
    /// The element that held focus or capture before.
    pub old: Option<ElementId>,
    /// The element that holds it now.
    pub new: Option<ElementId>,
}
