// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The element arena and its structural operations.

use alloc::vec::Vec;

use presentation_dirty::{Channel, DirtySet, drain_ordered};
use presentation_property::{
    ErasedValue, ObjectId, ParentLookup, PropertyId, PropertyRegistry, PropertyStore, TypeKey,
    resolve_observed,
};

use crate::core_props::CoreProperties;
use crate::element::Element;
use crate::error::{Result, TreeError};
use crate::focus::FocusPath;
use crate::input::PathKind;
use crate::types::{Capabilities, Detached, ElementId};

#[derive(Debug)]
struct Slot {
    generation: u32,
    element: Option<Element>,
}

/// Arena of elements linked into logical and visual trees.
///
/// Every mutation that can change an effective value schedules the affected
/// elements; [`Tree::digest`] later resolves them parent-first in one pass.
///
/// ```rust
/// use presentation_property::PropertyRegistry;
/// use presentation_tree::{Capabilities, CoreProperties, Tree};
///
/// let mut registry = PropertyRegistry::new();
/// let core = CoreProperties::register(&mut registry).unwrap();
/// let mut tree = Tree::new(core);
///
/// let root = tree.create(core.ui_element, Capabilities::default());
/// let child = tree.create(core.ui_element, Capabilities::default());
/// tree.append_child(&registry, root, child).unwrap();
///
/// assert_eq!(tree.parent(child), Some(root));
/// assert_eq!(tree.depth(child), Some(1));
///
/// let detached = tree.remove_child(&registry, root, child).unwrap();
/// assert_eq!(detached.element, child);
/// assert_eq!(tree.parent(child), None);
/// ```
#[derive(Debug)]
pub struct Tree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    pub(crate) scheduled: DirtySet<ElementId>,
    pub(crate) invalidated: DirtySet<ElementId>,
    pub(crate) keyboard: FocusPath<ElementId>,
    pub(crate) mouse: FocusPath<ElementId>,
    pub(crate) hover: FocusPath<ElementId>,
    pub(crate) core: CoreProperties,
}

/// [`ParentLookup`] over the logical links of a [`Tree`].
#[derive(Copy, Clone, Debug)]
pub struct TreeLookup<'t>(pub &'t Tree);

impl<'t> ParentLookup<'t> for TreeLookup<'t> {
    fn lookup(&self, key: ObjectId) -> Option<(&'t PropertyStore<ObjectId>, Option<ObjectId>)> {
        let element = self.0.element(key).ok()?;
        Some((&element.store, element.parent))
    }
}

impl Tree {
    /// Creates an empty tree using the given built-in properties.
    #[must_use]
    pub fn new(core: CoreProperties) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            scheduled: DirtySet::new(),
            invalidated: DirtySet::new(),
            keyboard: FocusPath::new(),
            mouse: FocusPath::new(),
            hover: FocusPath::new(),
            core,
        }
    }

    /// Returns the built-in types and properties.
    #[must_use]
    pub fn core(&self) -> &CoreProperties {
        &self.core
    }

    /// Returns the number of live elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns `true` if there are no live elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Creates a detached element.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX` slots are allocated.
    pub fn create(&mut self, ty: TypeKey, caps: Capabilities) -> ElementId {
        let id = if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.generation = slot.generation.saturating_add(1);
            let id = ElementId::new(idx, slot.generation);
            slot.element = Some(Element::new(id, ty, caps));
            id
        } else {
            assert!(
                self.slots.len() < u32::MAX as usize,
                "Too many elements allocated (max {})",
                u32::MAX
            );
            #[expect(clippy::cast_possible_truncation, reason = "checked above")]
            let idx = self.slots.len() as u32;
            let id = ElementId::new(idx, 1);
            self.slots.push(Slot {
                generation: 1,
                element: Some(Element::new(id, ty, caps)),
            });
            id
        };
        self.live += 1;
        tracing::debug!(?id, ?ty, ?caps, "created element");
        id
    }

    /// Returns `true` if `id` refers to a live element.
    #[must_use]
    pub fn is_alive(&self, id: ElementId) -> bool {
        self.element(id).is_ok()
    }

    /// Returns the element for `id`.
    pub fn element(&self, id: ElementId) -> Result<&Element> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.element.as_ref())
            .ok_or(TreeError::StaleElement(id))
    }

    pub(crate) fn element_mut(&mut self, id: ElementId) -> Result<&mut Element> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.element.as_mut())
            .ok_or(TreeError::StaleElement(id))
    }

    /// Returns the logical parent.
    #[must_use]
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.element(id).ok().and_then(|e| e.parent)
    }

    /// Returns the logical children, or an empty slice for a dead id.
    #[must_use]
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.element(id)
            .map(|e| e.children.as_slice())
            .unwrap_or_default()
    }

    /// Returns the visual parent.
    #[must_use]
    pub fn visual_parent(&self, id: ElementId) -> Option<ElementId> {
        self.element(id).ok().and_then(|e| e.visual_parent)
    }

    /// Returns the visual children, or an empty slice for a dead id.
    #[must_use]
    pub fn visual_children(&self, id: ElementId) -> &[ElementId] {
        self.element(id)
            .map(|e| e.visual_children.as_slice())
            .unwrap_or_default()
    }

    /// Returns the parent input routes go through: the visual parent if
    /// there is one, otherwise the logical parent.
    #[must_use]
    pub fn route_parent(&self, id: ElementId) -> Option<ElementId> {
        self.element(id).ok().and_then(Element::route_parent)
    }

    /// Returns the logical depth; roots are at depth `0`.
    #[must_use]
    pub fn depth(&self, id: ElementId) -> Option<u32> {
        self.element(id).ok().map(|e| e.depth)
    }

    /// Iterates the logical ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        core::iter::successors(self.parent(id), |&a| self.parent(a))
    }

    /// Returns the route from `id` to its root, `id` first.
    ///
    /// Follows the visual parent where there is one and the logical parent
    /// otherwise, which is the path input events bubble along.
    #[must_use]
    pub fn route_to_root(&self, id: ElementId) -> Vec<ElementId> {
        let mut route = Vec::new();
        let mut current = self.is_alive(id).then_some(id);
        while let Some(node) = current {
            route.push(node);
            current = self.route_parent(node);
        }
        route
    }

    pub(crate) fn path_from_root(&self, id: ElementId) -> Vec<ElementId> {
        let mut path = self.route_to_root(id);
        path.reverse();
        path
    }

    /// Returns the logical subtree of `root` in pre-order, `root` first.
    #[must_use]
    pub fn subtree(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = Vec::new();
        if self.is_alive(root) {
            stack.push(root);
        }
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Runs `action` on `root` and its logical descendants, pre-order.
    ///
    /// Each child list is snapshotted when its parent is visited, so the
    /// action may restructure the tree. Elements destroyed before their turn
    /// are skipped.
    pub fn visit_subtree<F>(&mut self, root: ElementId, mut action: F)
    where
        F: FnMut(&mut Self, ElementId),
    {
        let mut stack = Vec::new();
        stack.push(root);
        while let Some(id) = stack.pop() {
            if !self.is_alive(id) {
                continue;
            }
            action(self, id);
            stack.extend(self.children(id).iter().rev().copied());
        }
    }

    /// Returns `true` if `ancestor` is `of` or reachable from it through
    /// logical or visual parents.
    pub(crate) fn reaches(&self, of: ElementId, ancestor: ElementId) -> bool {
        let mut stack = Vec::new();
        stack.push(of);
        while let Some(id) = stack.pop() {
            if id == ancestor {
                return true;
            }
            if let Ok(element) = self.element(id) {
                stack.extend(element.parent);
                if element.visual_parent != element.parent {
                    stack.extend(element.visual_parent);
                }
            }
        }
        false
    }

    /// Appends `child` to the logical and visual children of `parent`.
    pub fn append_child(
        &mut self,
        registry: &PropertyRegistry,
        parent: ElementId,
        child: ElementId,
    ) -> Result<()> {
        let index = self.element(parent)?.children.len();
        self.insert_child(registry, parent, index, child)
    }

    /// Inserts `child` at `index` among the children of `parent`.
    ///
    /// The child becomes both a logical and a visual child. Fails with
    /// [`TreeError::CyclicInsertion`] if `child` is `parent` or one of its
    /// ancestors, and with [`TreeError::AlreadyParented`] if `child` has a
    /// different parent; neither tree is modified in those cases. Inserting
    /// an existing child again moves it to `index`.
    pub fn insert_child(
        &mut self,
        registry: &PropertyRegistry,
        parent: ElementId,
        index: usize,
        child: ElementId,
    ) -> Result<()> {
        let parent_el = self.element(parent)?;
        let child_el = self.element(child)?;

        if child_el.parent == Some(parent) {
            return self.move_child(parent, index, child);
        }
        let len = parent_el.children.len();
        if index > len {
            return Err(TreeError::IndexOutOfRange { index, len });
        }
        let visual_index = match parent_el.children.get(index) {
            Some(next) => parent_el
                .visual_children
                .iter()
                .position(|v| v == next)
                .unwrap_or(parent_el.visual_children.len()),
            None => parent_el.visual_children.len(),
        };
        self.link(registry, parent, index, parent, visual_index, child)
    }

    fn move_child(&mut self, parent: ElementId, index: usize, child: ElementId) -> Result<()> {
        let element = self.element_mut(parent)?;
        let len = element.children.len();
        if index >= len {
            return Err(TreeError::IndexOutOfRange {
                index,
                len: len - 1,
            });
        }
        element.children.retain(|c| *c != child);
        element.children.insert(index, child);
        if let Some(pos) = element.visual_children.iter().position(|v| *v == child) {
            element.visual_children.remove(pos);
            let visual_index = index.min(element.visual_children.len());
            element.visual_children.insert(visual_index, child);
        }
        Ok(())
    }

    /// Links a detached `child` under a logical and a visual parent.
    pub(crate) fn link(
        &mut self,
        registry: &PropertyRegistry,
        logical: ElementId,
        logical_index: usize,
        visual: ElementId,
        visual_index: usize,
        child: ElementId,
    ) -> Result<()> {
        let child_el = self.element(child)?;
        if let Some(existing) = child_el.parent.or(child_el.visual_parent) {
            return Err(TreeError::AlreadyParented {
                child,
                parent: existing,
            });
        }
        for parent in [logical, visual] {
            self.element(parent)?;
            if self.reaches(parent, child) {
                return Err(TreeError::CyclicInsertion { parent, child });
            }
        }

        // Seed from the old chain before the new one becomes visible.
        self.reseed_inherited(registry, child);

        let depth = self.element(logical)?.depth + 1;
        {
            let element = self.element_mut(logical)?;
            let index = logical_index.min(element.children.len());
            element.children.insert(index, child);
        }
        {
            let element = self.element_mut(visual)?;
            let index = visual_index.min(element.visual_children.len());
            element.visual_children.insert(index, child);
        }
        {
            let element = self.element_mut(child)?;
            element.parent = Some(logical);
            element.visual_parent = Some(visual);
        }
        self.set_depths(child, depth);
        self.refresh_paths(registry);
        tracing::debug!(?child, parent = ?logical, visual_parent = ?visual, "linked element");
        Ok(())
    }

    /// Removes `child` from the children of `parent`.
    ///
    /// Keyboard focus and mouse capture inside the removed subtree are
    /// released, and the focus flags on the old ancestors cleared, before
    /// this returns. Inherited values in the subtree are rescheduled so the
    /// next digest reports what changed under the new (empty) chain.
    pub fn remove_child(
        &mut self,
        registry: &PropertyRegistry,
        parent: ElementId,
        child: ElementId,
    ) -> Result<Detached> {
        self.element(parent)?;
        if self.element(child)?.parent != Some(parent) {
            return Err(TreeError::NotAChild { parent, child });
        }
        self.unlink(registry, child)
    }

    /// Detaches `child` from both of its parents.
    pub(crate) fn unlink(&mut self, registry: &PropertyRegistry, child: ElementId) -> Result<Detached> {
        let lost_focus = self.release_within(registry, PathKind::Keyboard, child);
        let lost_capture = self.release_within(registry, PathKind::Mouse, child);

        let (parent, visual_parent, container_of) = {
            let element = self.element(child)?;
            (element.parent, element.visual_parent, element.container_of)
        };
        if parent.is_some() || visual_parent.is_some() {
            self.reseed_inherited(registry, child);
        }
        if let Some(host) = container_of {
            self.forget_container(registry, host, child);
        }
        if let Some(parent) = parent
            && let Ok(element) = self.element_mut(parent)
        {
            element.children.retain(|c| *c != child);
        }
        if let Some(visual) = visual_parent
            && let Ok(element) = self.element_mut(visual)
        {
            element.visual_children.retain(|c| *c != child);
        }
        {
            let element = self.element_mut(child)?;
            element.parent = None;
            element.visual_parent = None;
        }
        self.set_depths(child, 0);
        tracing::debug!(?child, ?parent, ?lost_focus, ?lost_capture, "unlinked element");
        Ok(Detached {
            element: child,
            lost_focus,
            lost_capture,
        })
    }

    /// Detaches and destroys `id` and its logical subtree.
    ///
    /// Ids of destroyed elements become stale; pending digests and
    /// invalidations for them are dropped.
    pub fn destroy(&mut self, registry: &PropertyRegistry, id: ElementId) -> Result<Detached> {
        let detached = self.unlink(registry, id)?;
        let dying = self.subtree(id);
        for &node in &dying {
            let Ok(element) = self.element(node) else {
                continue;
            };
            let visual_children = element.visual_children.clone();
            let container_of = element.container_of;
            let visual_parent = element.visual_parent;
            // A container can sit in a panel that already left the host.
            if let Some(outer) = visual_parent
                && !dying.contains(&outer)
                && let Ok(outer) = self.element_mut(outer)
            {
                outer.visual_children.retain(|c| *c != node);
            }
            for visual in visual_children {
                if !dying.contains(&visual)
                    && let Ok(orphan) = self.element_mut(visual)
                {
                    orphan.visual_parent = None;
                }
            }
            if let Some(host) = container_of
                && !dying.contains(&host)
            {
                self.forget_container(registry, host, node);
            }
        }
        for &node in &dying {
            self.scheduled.remove_key(node);
            self.invalidated.remove_key(node);
            if let Some(slot) = self.slots.get_mut(node.index())
                && slot.element.take().is_some()
            {
                #[expect(clippy::cast_possible_truncation, reason = "slot indices fit in u32")]
                self.free.push(node.index() as u32);
                self.live -= 1;
            }
        }
        self.refresh_paths(registry);
        tracing::debug!(?id, count = dying.len(), "destroyed subtree");
        Ok(detached)
    }

    /// Drains the elements invalidated on `channel`, parents first.
    ///
    /// This is how the layout and render collaborators pick up the work a
    /// digest produced.
    pub fn take_invalidated(&mut self, channel: Channel) -> Vec<ElementId> {
        let slots = &self.slots;
        drain_ordered(&mut self.invalidated, channel, |id| depth_in(slots, id)).collect()
    }

    /// Marks `id` for the next digest.
    pub(crate) fn schedule(&mut self, id: ElementId) {
        self.scheduled.mark(id, Channel::DIGEST);
    }

    /// Seeds every inherited slot in the subtree of `root` that has no own
    /// value with the value observers last saw, and schedules it.
    ///
    /// Called before a structural change so the digest afterwards compares
    /// the new chain against the old one.
    fn reseed_inherited(&mut self, registry: &PropertyRegistry, root: ElementId) {
        let inherited = registry.inherited_properties();
        if inherited.is_empty() {
            return;
        }
        let mut seeds: Vec<(ElementId, PropertyId, ErasedValue)> = Vec::new();
        let lookup = TreeLookup(self);
        for id in self.subtree(root) {
            let Ok(element) = self.element(id) else {
                continue;
            };
            for &property in inherited {
                if element.store.own_value(property).is_some()
                    || registry.check_host(property, element.ty).is_err()
                {
                    continue;
                }
                if let Some(value) = resolve_observed(
                    &element.store,
                    element.ty,
                    element.parent,
                    property,
                    registry,
                    &lookup,
                ) {
                    seeds.push((id, property, value));
                }
            }
        }
        for (id, property, value) in seeds {
            if let Ok(element) = self.element_mut(id) {
                element
                    .store
                    .slot_or_insert_with(property, || value)
                    .mark_dirty();
                self.schedule(id);
            }
        }
    }

    fn set_depths(&mut self, root: ElementId, depth: u32) {
        let mut stack = Vec::new();
        stack.push((root, depth));
        while let Some((id, depth)) = stack.pop() {
            let Ok(element) = self.element_mut(id) else {
                continue;
            };
            element.depth = depth;
            stack.extend(element.children.iter().map(|&c| (c, depth + 1)));
        }
    }
}

fn depth_in(slots: &[Slot], id: ElementId) -> Option<u32> {
    slots
        .get(id.index())
        .filter(|slot| slot.generation == id.generation())
        .and_then(|slot| slot.element.as_ref())
        .map(|element| element.depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn setup() -> (PropertyRegistry, Tree) {
        let mut registry = PropertyRegistry::new();
        let core = CoreProperties::register(&mut registry).unwrap();
        (registry, Tree::new(core))
    }

    fn node(tree: &mut Tree) -> ElementId {
        let ty = tree.core().ui_element;
        tree.create(ty, Capabilities::default())
    }

    #[test]
    fn stale_ids_do_not_alias_reused_slots() {
        let (registry, mut tree) = setup();
        let a = node(&mut tree);
        tree.destroy(&registry, a).unwrap();
        let b = node(&mut tree);
        assert_eq!(a.index(), b.index());
        assert_ne!(a, b);
        assert!(!tree.is_alive(a));
        assert!(tree.is_alive(b));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn insert_orders_children_and_sets_depth() {
        let (registry, mut tree) = setup();
        let root = node(&mut tree);
        let a = node(&mut tree);
        let b = node(&mut tree);
        let c = node(&mut tree);
        tree.append_child(&registry, root, a).unwrap();
        tree.append_child(&registry, root, c).unwrap();
        tree.insert_child(&registry, root, 1, b).unwrap();
        assert_eq!(tree.children(root), &[a, b, c]);
        assert_eq!(tree.visual_children(root), &[a, b, c]);

        let d = node(&mut tree);
        tree.append_child(&registry, b, d).unwrap();
        assert_eq!(tree.depth(d), Some(2));
        assert_eq!(tree.ancestors(d).collect::<Vec<_>>(), vec![b, root]);
        assert_eq!(tree.route_to_root(d), vec![d, b, root]);
    }

    #[test]
    fn reinserting_moves_within_parent() {
        let (registry, mut tree) = setup();
        let root = node(&mut tree);
        let a = node(&mut tree);
        let b = node(&mut tree);
        tree.append_child(&registry, root, a).unwrap();
        tree.append_child(&registry, root, b).unwrap();
        tree.insert_child(&registry, root, 0, b).unwrap();
        assert_eq!(tree.children(root), &[b, a]);
        assert_eq!(tree.visual_children(root), &[b, a]);
    }

    #[test]
    fn index_past_end_is_rejected() {
        let (registry, mut tree) = setup();
        let root = node(&mut tree);
        let a = node(&mut tree);
        assert_eq!(
            tree.insert_child(&registry, root, 1, a),
            Err(TreeError::IndexOutOfRange { index: 1, len: 0 })
        );
        assert_eq!(tree.parent(a), None);
    }

    #[test]
    fn self_insertion_is_cyclic() {
        let (registry, mut tree) = setup();
        let a = node(&mut tree);
        assert_eq!(
            tree.append_child(&registry, a, a),
            Err(TreeError::CyclicInsertion {
                parent: a,
                child: a
            })
        );
    }

    #[test]
    fn already_parented_is_rejected() {
        let (registry, mut tree) = setup();
        let p1 = node(&mut tree);
        let p2 = node(&mut tree);
        let c = node(&mut tree);
        tree.append_child(&registry, p1, c).unwrap();
        assert_eq!(
            tree.append_child(&registry, p2, c),
            Err(TreeError::AlreadyParented {
                child: c,
                parent: p1
            })
        );
        assert!(tree.children(p2).is_empty());
    }

    #[test]
    fn remove_requires_parent_match() {
        let (registry, mut tree) = setup();
        let p = node(&mut tree);
        let c = node(&mut tree);
        assert_eq!(
            tree.remove_child(&registry, p, c),
            Err(TreeError::NotAChild {
                parent: p,
                child: c
            })
        );
    }

    #[test]
    fn destroy_takes_the_subtree() {
        let (registry, mut tree) = setup();
        let root = node(&mut tree);
        let mid = node(&mut tree);
        let leaf = node(&mut tree);
        tree.append_child(&registry, root, mid).unwrap();
        tree.append_child(&registry, mid, leaf).unwrap();

        tree.destroy(&registry, mid).unwrap();
        assert!(!tree.is_alive(mid));
        assert!(!tree.is_alive(leaf));
        assert!(tree.children(root).is_empty());
        assert_eq!(tree.len(), 1);
        assert!(matches!(
            tree.destroy(&registry, mid),
            Err(TreeError::StaleElement(_))
        ));
    }

    #[test]
    fn visit_snapshots_and_skips_destroyed() {
        let (registry, mut tree) = setup();
        let root = node(&mut tree);
        let a = node(&mut tree);
        let b = node(&mut tree);
        tree.append_child(&registry, root, a).unwrap();
        tree.append_child(&registry, root, b).unwrap();

        let mut seen = Vec::new();
        tree.visit_subtree(root, |tree, id| {
            seen.push(id);
            // Destroying a later sibling mid-walk must not break the walk.
            if id == a {
                tree.destroy(&registry, b).unwrap();
            }
        });
        assert_eq!(seen, vec![root, a]);
    }

    #[test]
    fn subtree_is_pre_order() {
        let (registry, mut tree) = setup();
        let root = node(&mut tree);
        let a = node(&mut tree);
        let a1 = node(&mut tree);
        let b = node(&mut tree);
        tree.append_child(&registry, root, a).unwrap();
        tree.append_child(&registry, a, a1).unwrap();
        tree.append_child(&registry, root, b).unwrap();
        assert_eq!(tree.subtree(root), vec![root, a, a1, b]);
    }
}
