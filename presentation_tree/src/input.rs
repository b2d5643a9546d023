// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyboard focus, mouse capture and mouse hover.
//!
//! The tree owns one [`FocusPath`] per kind. Moving the holder computes the
//! enter/leave transitions and writes the read-only flags right away, so
//! reads never observe a half-moved focus. Events are left to the caller.

use alloc::vec::Vec;

use presentation_property::{PropertyKey, PropertyRegistry};

use crate::error::{Result, TreeError};
use crate::focus::{FocusPath, FocusTransition};
use crate::tree::Tree;
use crate::types::{Capabilities, ElementId, FocusChange};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum PathKind {
    Keyboard,
    Mouse,
    Hover,
}

impl Tree {
    /// Returns the element with keyboard focus.
    #[must_use]
    pub fn focused(&self) -> Option<ElementId> {
        self.keyboard.holder()
    }

    /// Returns the element that captured the mouse.
    #[must_use]
    pub fn mouse_captured(&self) -> Option<ElementId> {
        self.mouse.holder()
    }

    /// Moves keyboard focus to `id`.
    ///
    /// The element needs [`Capabilities::INPUT`] and an effective
    /// `Focusable` of `true`. Returns `None` if it already had focus.
    pub fn focus(
        &mut self,
        registry: &PropertyRegistry,
        id: ElementId,
    ) -> Result<Option<FocusChange>> {
        self.require_input(id)?;
        if !self.get_value(registry, id, self.core.focusable)? {
            return Err(TreeError::NotFocusable(id));
        }
        if self.keyboard.holder() == Some(id) {
            return Ok(None);
        }
        let (old, _) = self.move_path(registry, PathKind::Keyboard, Some(id));
        tracing::debug!(?old, new = ?id, "keyboard focus moved");
        Ok(Some(FocusChange { old, new: Some(id) }))
    }

    /// Clears keyboard focus.
    pub fn clear_focus(&mut self, registry: &PropertyRegistry) -> Option<FocusChange> {
        let old = self.move_path(registry, PathKind::Keyboard, None).0?;
        tracing::debug!(?old, "keyboard focus cleared");
        Some(FocusChange { old: Some(old), new: None })
    }

    /// Captures the mouse to `id`. Returns `None` if it already had capture.
    pub fn capture_mouse(
        &mut self,
        registry: &PropertyRegistry,
        id: ElementId,
    ) -> Result<Option<FocusChange>> {
        self.require_input(id)?;
        if self.mouse.holder() == Some(id) {
            return Ok(None);
        }
        let (old, _) = self.move_path(registry, PathKind::Mouse, Some(id));
        tracing::debug!(?old, new = ?id, "mouse captured");
        Ok(Some(FocusChange { old, new: Some(id) }))
    }

    /// Releases mouse capture.
    pub fn release_mouse_capture(&mut self, registry: &PropertyRegistry) -> Option<FocusChange> {
        let old = self.move_path(registry, PathKind::Mouse, None).0?;
        tracing::debug!(?old, "mouse capture released");
        Some(FocusChange { old: Some(old), new: None })
    }

    /// Returns the element directly under the mouse.
    #[must_use]
    pub fn mouse_over(&self) -> Option<ElementId> {
        self.hover.holder()
    }

    /// Moves the mouse hover to `target`, the element under the pointer.
    ///
    /// Sets `IsMouseDirectlyOver` on `target` and `IsMouseOver` along its
    /// route to the root. A dead `target` counts as none. Returns the
    /// elements whose `IsMouseOver` flipped, leaves first.
    pub fn set_mouse_over(
        &mut self,
        registry: &PropertyRegistry,
        target: Option<ElementId>,
    ) -> Vec<FocusTransition<ElementId>> {
        let target = target.filter(|t| self.is_alive(*t));
        let route = target.map(|t| self.path_from_root(t)).unwrap_or_default();
        if route.as_slice() == self.hover.current() {
            return Vec::new();
        }
        self.move_path(registry, PathKind::Hover, target).1
    }

    /// Re-derives the hover path after a structural change.
    ///
    /// Structural edits leave hover alone so the caller can report the
    /// transitions; call this afterwards. A destroyed holder loses hover.
    pub fn refresh_mouse_over(
        &mut self,
        registry: &PropertyRegistry,
    ) -> Vec<FocusTransition<ElementId>> {
        let holder = self.hover.holder();
        self.set_mouse_over(registry, holder)
    }

    fn require_input(&self, id: ElementId) -> Result<()> {
        if self.element(id)?.caps.contains(Capabilities::INPUT) {
            Ok(())
        } else {
            Err(TreeError::NoInput(id))
        }
    }

    fn path(&mut self, kind: PathKind) -> &mut FocusPath<ElementId> {
        match kind {
            PathKind::Keyboard => &mut self.keyboard,
            PathKind::Mouse => &mut self.mouse,
            PathKind::Hover => &mut self.hover,
        }
    }

    fn flag_keys(&self, kind: PathKind) -> (PropertyKey<bool>, PropertyKey<bool>) {
        let keys = &self.core.keys;
        match kind {
            PathKind::Keyboard => (keys.is_keyboard_focused, keys.is_keyboard_focus_within),
            PathKind::Mouse => (keys.is_mouse_captured, keys.is_mouse_capture_within),
            PathKind::Hover => (keys.is_mouse_directly_over, keys.is_mouse_over),
        }
    }

    /// Moves the holder of `kind` and rewrites the flags. Returns the old
    /// holder and the path transitions.
    fn move_path(
        &mut self,
        registry: &PropertyRegistry,
        kind: PathKind,
        holder: Option<ElementId>,
    ) -> (Option<ElementId>, Vec<FocusTransition<ElementId>>) {
        let old = self.path(kind).holder();
        let route = holder.map(|h| self.path_from_root(h)).unwrap_or_default();
        let transitions = self.path(kind).update(&route);
        let (is_holder, is_within) = self.flag_keys(kind);

        if old != holder {
            if let Some(old) = old {
                self.set_flag(registry, old, is_holder, false);
            }
            if let Some(new) = holder {
                self.set_flag(registry, new, is_holder, true);
            }
        }
        for &transition in &transitions {
            match transition {
                FocusTransition::Enter(id) => self.set_flag(registry, id, is_within, true),
                FocusTransition::Leave(id) => self.set_flag(registry, id, is_within, false),
            }
        }
        (old, transitions)
    }

    /// Releases `kind` if its holder is `root` or inside the subtree of
    /// `root`, returning the old holder.
    pub(crate) fn release_within(
        &mut self,
        registry: &PropertyRegistry,
        kind: PathKind,
        root: ElementId,
    ) -> Option<ElementId> {
        let holder = self.path(kind).holder()?;
        if !self.path(kind).contains(root) && !self.reaches(holder, root) {
            return None;
        }
        self.move_path(registry, kind, None).0
    }

    /// Re-derives the focus and capture paths after a structural change.
    pub(crate) fn refresh_paths(&mut self, registry: &PropertyRegistry) {
        for kind in [PathKind::Keyboard, PathKind::Mouse] {
            let Some(holder) = self.path(kind).holder() else {
                continue;
            };
            let route: Vec<ElementId> = self.path_from_root(holder);
            if route.as_slice() != self.path(kind).current() {
                self.move_path(registry, kind, Some(holder));
            }
        }
    }

    /// Writes a read-only flag. Elements that cannot host it are skipped.
    fn set_flag(
        &mut self,
        registry: &PropertyRegistry,
        id: ElementId,
        key: PropertyKey<bool>,
        on: bool,
    ) {
        let property = key.property().id();
        let Ok(element) = self.element(id) else {
            return;
        };
        if registry.check_host(property, element.ty).is_err() {
            return;
        }
        let result = if on {
            self.set_read_only_value(registry, id, key, true)
        } else {
            self.clear_local_unchecked(registry, id, property).map(drop)
        };
        if let Err(err) = result {
            tracing::warn!(?id, %err, "failed to update focus flag");
        }
    }

    pub(crate) fn set_has_items(&mut self, registry: &PropertyRegistry, host: ElementId, on: bool) {
        let key = self.core.keys.has_items;
        self.set_flag(registry, host, key, on);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_props::CoreProperties;

    fn setup() -> (PropertyRegistry, Tree) {
        let mut registry = PropertyRegistry::new();
        let core = CoreProperties::register(&mut registry).unwrap();
        (registry, Tree::new(core))
    }

    fn focusable(registry: &PropertyRegistry, tree: &mut Tree) -> ElementId {
        let ty = tree.core().ui_element;
        let id = tree.create(ty, Capabilities::default());
        let prop = tree.core().focusable;
        tree.set_value(registry, id, prop, true).unwrap();
        id
    }

    #[test]
    fn focus_sets_flags_along_the_path() {
        let (registry, mut tree) = setup();
        let root = focusable(&registry, &mut tree);
        let leaf = focusable(&registry, &mut tree);
        tree.append_child(&registry, root, leaf).unwrap();
        let core = *tree.core();

        let change = tree.focus(&registry, leaf).unwrap();
        assert_eq!(
            change,
            Some(FocusChange {
                old: None,
                new: Some(leaf)
            })
        );
        assert_eq!(tree.get_value(&registry, leaf, core.is_keyboard_focused), Ok(true));
        assert_eq!(tree.get_value(&registry, root, core.is_keyboard_focused), Ok(false));
        assert_eq!(tree.get_value(&registry, root, core.is_keyboard_focus_within), Ok(true));

        // Moving focus up leaves the leaf but keeps the root within.
        tree.focus(&registry, root).unwrap();
        assert_eq!(tree.get_value(&registry, leaf, core.is_keyboard_focus_within), Ok(false));
        assert_eq!(tree.get_value(&registry, root, core.is_keyboard_focused), Ok(true));
        assert_eq!(tree.get_value(&registry, root, core.is_keyboard_focus_within), Ok(true));
        assert_eq!(tree.focus(&registry, root), Ok(None));
    }

    #[test]
    fn focus_requires_focusable_and_input() {
        let (registry, mut tree) = setup();
        let ty = tree.core().ui_element;
        let plain = tree.create(ty, Capabilities::default());
        assert_eq!(tree.focus(&registry, plain), Err(TreeError::NotFocusable(plain)));

        let inert = tree.create(ty, Capabilities::LAYOUT);
        assert_eq!(tree.focus(&registry, inert), Err(TreeError::NoInput(inert)));
        assert_eq!(tree.capture_mouse(&registry, inert), Err(TreeError::NoInput(inert)));
    }

    #[test]
    fn capture_and_release() {
        let (registry, mut tree) = setup();
        let root = focusable(&registry, &mut tree);
        let leaf = focusable(&registry, &mut tree);
        tree.append_child(&registry, root, leaf).unwrap();
        let core = *tree.core();

        tree.capture_mouse(&registry, leaf).unwrap();
        assert_eq!(tree.mouse_captured(), Some(leaf));
        assert_eq!(tree.get_value(&registry, root, core.is_mouse_capture_within), Ok(true));

        let change = tree.release_mouse_capture(&registry);
        assert_eq!(
            change,
            Some(FocusChange {
                old: Some(leaf),
                new: None
            })
        );
        assert_eq!(tree.get_value(&registry, leaf, core.is_mouse_captured), Ok(false));
        assert_eq!(tree.get_value(&registry, root, core.is_mouse_capture_within), Ok(false));
        assert!(tree.release_mouse_capture(&registry).is_none());
    }

    #[test]
    fn hover_sets_directly_over_and_over_along_the_route() {
        let (registry, mut tree) = setup();
        let ty = tree.core().ui_element;
        let root = tree.create(ty, Capabilities::default());
        let left = tree.create(ty, Capabilities::default());
        let right = tree.create(ty, Capabilities::default());
        tree.append_child(&registry, root, left).unwrap();
        tree.append_child(&registry, root, right).unwrap();
        let core = *tree.core();

        assert_eq!(
            tree.set_mouse_over(&registry, Some(left)),
            [FocusTransition::Enter(root), FocusTransition::Enter(left)]
        );
        assert_eq!(tree.mouse_over(), Some(left));
        assert_eq!(tree.get_value(&registry, left, core.is_mouse_directly_over), Ok(true));
        assert_eq!(tree.get_value(&registry, root, core.is_mouse_over), Ok(true));
        assert_eq!(tree.get_value(&registry, root, core.is_mouse_directly_over), Ok(false));
        assert!(tree.set_mouse_over(&registry, Some(left)).is_empty());

        assert_eq!(
            tree.set_mouse_over(&registry, Some(right)),
            [FocusTransition::Leave(left), FocusTransition::Enter(right)]
        );
        assert_eq!(tree.get_value(&registry, left, core.is_mouse_over), Ok(false));
        assert_eq!(tree.get_value(&registry, left, core.is_mouse_directly_over), Ok(false));
        assert_eq!(tree.get_value(&registry, root, core.is_mouse_over), Ok(true));
    }

    #[test]
    fn hover_survives_structure_until_refreshed() {
        let (registry, mut tree) = setup();
        let ty = tree.core().ui_element;
        let root = tree.create(ty, Capabilities::default());
        let leaf = tree.create(ty, Capabilities::default());
        tree.append_child(&registry, root, leaf).unwrap();
        tree.set_mouse_over(&registry, Some(leaf));
        let core = *tree.core();

        tree.remove_child(&registry, root, leaf).unwrap();
        assert_eq!(tree.get_value(&registry, root, core.is_mouse_over), Ok(true));
        assert_eq!(
            tree.refresh_mouse_over(&registry),
            [FocusTransition::Leave(leaf), FocusTransition::Leave(root), FocusTransition::Enter(leaf)]
        );
        assert_eq!(tree.get_value(&registry, root, core.is_mouse_over), Ok(false));
        assert_eq!(tree.get_value(&registry, leaf, core.is_mouse_over), Ok(true));

        tree.destroy(&registry, leaf).unwrap();
        assert_eq!(tree.refresh_mouse_over(&registry), [FocusTransition::Leave(leaf)]);
        assert_eq!(tree.mouse_over(), None);
    }

    #[test]
    fn inserting_a_focused_subtree_extends_the_path() {
        let (registry, mut tree) = setup();
        let root = focusable(&registry, &mut tree);
        let orphan = focusable(&registry, &mut tree);
        tree.focus(&registry, orphan).unwrap();
        let core = *tree.core();

        tree.append_child(&registry, root, orphan).unwrap();
        assert_eq!(tree.get_value(&registry, root, core.is_keyboard_focus_within), Ok(true));
        assert_eq!(tree.focused(), Some(orphan));
    }
}
