// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element types and properties the tree itself maintains.

use presentation_property::{
    Property, PropertyKey, PropertyMetadata, PropertyRegistry, Result, TypeKey,
};

use crate::types::Item;

/// Handles to the built-in element types and properties.
///
/// Registered once per registry with [`CoreProperties::register`] and handed
/// to [`Tree::new`](crate::Tree::new). The focus and capture flags are
/// read-only: only the tree holds their keys.
#[derive(Copy, Clone, Debug)]
pub struct CoreProperties {
    /// Base type of every element that takes input.
    pub ui_element: TypeKey,
    /// Element type that presents a single [`Item`].
    pub content_control: TypeKey,
    /// Element type that hosts an item list.
    pub items_control: TypeKey,
    /// Whether the element can take keyboard focus. Defaults to `false`.
    pub focusable: Property<bool>,
    /// `true` on the element with keyboard focus.
    pub is_keyboard_focused: Property<bool>,
    /// `true` on the focused element and all of its ancestors.
    pub is_keyboard_focus_within: Property<bool>,
    /// `true` on the element that captured the mouse.
    pub is_mouse_captured: Property<bool>,
    /// `true` on the capturing element and all of its ancestors.
    pub is_mouse_capture_within: Property<bool>,
    /// `true` on the element directly under the mouse.
    pub is_mouse_directly_over: Property<bool>,
    /// `true` on the element under the mouse and all of its ancestors.
    pub is_mouse_over: Property<bool>,
    /// `true` on an items host with at least one item.
    pub has_items: Property<bool>,
    /// What a content control presents.
    pub content: Property<Option<Item>>,
    pub(crate) keys: CoreKeys,
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct CoreKeys {
    pub(crate) is_keyboard_focused: PropertyKey<bool>,
    pub(crate) is_keyboard_focus_within: PropertyKey<bool>,
    pub(crate) is_mouse_captured: PropertyKey<bool>,
    pub(crate) is_mouse_capture_within: PropertyKey<bool>,
    pub(crate) is_mouse_directly_over: PropertyKey<bool>,
    pub(crate) is_mouse_over: PropertyKey<bool>,
    pub(crate) has_items: PropertyKey<bool>,
}

impl CoreProperties {
    /// Registers the built-in types and properties.
    ///
    /// Fails with a duplicate registration if called twice on one registry.
    pub fn register(registry: &mut PropertyRegistry) -> Result<Self> {
        let ui_element = registry.register_type("UIElement", TypeKey::OBJECT);
        let content_control = registry.register_type("ContentControl", ui_element);
        let items_control = registry.register_type("ItemsControl", ui_element);

        let focusable = registry.register(ui_element, "Focusable", PropertyMetadata::new(false))?;
        let (kf_key, is_keyboard_focused) = registry.register_read_only(
            ui_element,
            "IsKeyboardFocused",
            PropertyMetadata::new(false),
        )?;
        let (kfw_key, is_keyboard_focus_within) = registry.register_read_only(
            ui_element,
            "IsKeyboardFocusWithin",
            PropertyMetadata::new(false),
        )?;
        let (mc_key, is_mouse_captured) = registry.register_read_only(
            ui_element,
            "IsMouseCaptured",
            PropertyMetadata::new(false),
        )?;
        let (mcw_key, is_mouse_capture_within) = registry.register_read_only(
            ui_element,
            "IsMouseCaptureWithin",
            PropertyMetadata::new(false),
        )?;
        let (mdo_key, is_mouse_directly_over) = registry.register_read_only(
            ui_element,
            "IsMouseDirectlyOver",
            PropertyMetadata::new(false),
        )?;
        let (mo_key, is_mouse_over) =
            registry.register_read_only(ui_element, "IsMouseOver", PropertyMetadata::new(false))?;
        let (hi_key, has_items) =
            registry.register_read_only(items_control, "HasItems", PropertyMetadata::new(false))?;
        let content = registry.register(
            content_control,
            "Content",
            PropertyMetadata::new(None::<Item>),
        )?;

        Ok(Self {
            ui_element,
            content_control,
            items_control,
            focusable,
            is_keyboard_focused,
            is_keyboard_focus_within,
            is_mouse_captured,
            is_mouse_capture_within,
            is_mouse_directly_over,
            is_mouse_over,
            has_items,
            content,
            keys: CoreKeys {
                is_keyboard_focused: kf_key,
                is_keyboard_focus_within: kfw_key,
                is_mouse_captured: mc_key,
                is_mouse_capture_within: mcw_key,
                is_mouse_directly_over: mdo_key,
                is_mouse_over: mo_key,
                has_items: hi_key,
            },
        })
    }
}
