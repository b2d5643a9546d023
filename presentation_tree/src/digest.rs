// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-frame digest pass.
//!
//! Only scheduled elements are visited, ordered by depth so parents settle
//! before their children. When an inherited value changes, the children that
//! do not override it are scheduled into the same pass, seeded with the
//! value they observed before, so the whole subtree settles in one call.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use presentation_dirty::Channel;
use presentation_property::{
    ErasedValue, PropertyChange, PropertyId, PropertyRegistry, resolve_effective,
};

use crate::element::Children;
use crate::tree::{Tree, TreeLookup};
use crate::types::{Capabilities, DigestReport, ElementId};

impl Tree {
    /// Returns `true` if a digest has work to do.
    #[must_use]
    pub fn needs_digest(&self) -> bool {
        self.scheduled.has_dirty(Channel::DIGEST)
    }

    /// Resolves every scheduled slot, runs change callbacks and reports what
    /// changed.
    ///
    /// Each property that changed on an element is reported exactly once,
    /// with the channels it affects. Those channels are also marked in the
    /// tree's invalidation set (measure and arrange only for elements with
    /// [`Capabilities::LAYOUT`]). Digesting again without mutations in
    /// between reports nothing.
    pub fn digest(&mut self, registry: &PropertyRegistry) -> DigestReport {
        let mut worklist: BTreeSet<(u32, ElementId)> = BTreeSet::new();
        for id in self.scheduled.drain(Channel::DIGEST) {
            if let Some(depth) = self.depth(id) {
                worklist.insert((depth, id));
            }
        }

        let mut report = DigestReport::default();
        while let Some((_, id)) = worklist.pop_first() {
            let Ok(element) = self.element(id) else {
                continue;
            };
            let lookup = TreeLookup(self);
            let pending: Vec<(PropertyId, ErasedValue)> = element
                .store
                .dirty_properties()
                .filter_map(|property| {
                    resolve_effective(
                        &element.store,
                        element.ty,
                        element.parent,
                        property,
                        registry,
                        &lookup,
                    )
                    .map(|value| (property, value))
                })
                .collect();
            if pending.is_empty() {
                continue;
            }
            let children: Children = element.children.clone();
            let caps = element.caps;

            for (property, effective) in pending {
                let old = self
                    .element_mut(id)
                    .ok()
                    .and_then(|e| e.store.slot_mut(property))
                    .and_then(|slot| slot.digest(effective.clone()));
                let Some(old) = old else {
                    continue;
                };
                tracing::trace!(element = ?id, property = registry.name(property), "value changed");
                registry.notify_changed(property, id, &old, &effective);

                let affects = registry.affects(property);
                let mut invalidate = affects;
                if !caps.contains(Capabilities::LAYOUT) {
                    invalidate.remove(Channel::MEASURE);
                    invalidate.remove(Channel::ARRANGE);
                }
                if !invalidate.is_empty() {
                    self.invalidated.mark_all(id, invalidate);
                }
                report.push(PropertyChange {
                    object: id,
                    property,
                    affects,
                });

                if registry.inherits(property) {
                    let mut pending_children: Vec<ElementId> = children.iter().copied().collect();
                    while let Some(child) = pending_children.pop() {
                        let Ok(child_el) = self.element_mut(child) else {
                            continue;
                        };
                        // Elements that cannot host the property pass it through.
                        if registry.check_host(property, child_el.ty).is_err() {
                            pending_children.extend(child_el.children.iter().copied());
                            continue;
                        }
                        if child_el.store.own_value(property).is_some() {
                            continue;
                        }
                        child_el
                            .store
                            .slot_or_insert_with(property, || old.clone())
                            .mark_dirty();
                        worklist.insert((child_el.depth, child));
                    }
                }
            }
        }
        if !report.is_empty() {
            tracing::debug!(changes = report.len(), "digest complete");
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_props::CoreProperties;
    use presentation_dirty::ChannelSet;
    use presentation_property::{Property, PropertyMetadataBuilder};

    struct Fixture {
        registry: PropertyRegistry,
        tree: Tree,
        font_size: Property<f64>,
        width: Property<f64>,
    }

    fn fixture() -> Fixture {
        let mut registry = PropertyRegistry::new();
        let core = CoreProperties::register(&mut registry).unwrap();
        let font_size = registry
            .register(
                core.ui_element,
                "FontSize",
                PropertyMetadataBuilder::new(12.0_f64)
                    .inherits(true)
                    .affects(ChannelSet::LAYOUT)
                    .build(),
            )
            .unwrap();
        let width = registry
            .register(
                core.ui_element,
                "Width",
                PropertyMetadataBuilder::new(0.0_f64)
                    .affects(Channel::MEASURE.into_set())
                    .build(),
            )
            .unwrap();
        Fixture {
            registry,
            tree: Tree::new(core),
            font_size,
            width,
        }
    }

    fn node(f: &mut Fixture, caps: Capabilities) -> ElementId {
        let ty = f.tree.core().ui_element;
        f.tree.create(ty, caps)
    }

    #[test]
    fn digest_is_idempotent() {
        let mut f = fixture();
        let e = node(&mut f, Capabilities::default());
        f.tree.set_value(&f.registry, e, f.width, 10.0).unwrap();
        assert!(f.tree.needs_digest());

        let report = f.tree.digest(&f.registry);
        assert_eq!(report.len(), 1);
        assert!(report.changed(e, f.width.id()));
        assert!(!f.tree.needs_digest());
        assert!(f.tree.digest(&f.registry).is_empty());
    }

    #[test]
    fn invalidation_is_collected_parents_first() {
        let mut f = fixture();
        let root = node(&mut f, Capabilities::default());
        let leaf = node(&mut f, Capabilities::default());
        f.tree.append_child(&f.registry, root, leaf).unwrap();
        let _ = f.tree.digest(&f.registry);

        f.tree.set_value(&f.registry, leaf, f.width, 1.0).unwrap();
        f.tree.set_value(&f.registry, root, f.width, 1.0).unwrap();
        let report = f.tree.digest(&f.registry);
        assert!(report.invalidated().contains(Channel::MEASURE));
        assert_eq!(f.tree.take_invalidated(Channel::MEASURE), [root, leaf]);
        assert!(f.tree.take_invalidated(Channel::MEASURE).is_empty());
    }

    #[test]
    fn layout_channels_skip_non_layout_elements() {
        let mut f = fixture();
        let e = node(&mut f, Capabilities::INPUT);
        f.tree.set_value(&f.registry, e, f.width, 1.0).unwrap();
        let report = f.tree.digest(&f.registry);
        assert_eq!(report.len(), 1);
        assert!(f.tree.take_invalidated(Channel::MEASURE).is_empty());
    }

    #[test]
    fn overriding_child_stops_propagation() {
        let mut f = fixture();
        let root = node(&mut f, Capabilities::default());
        let mid = node(&mut f, Capabilities::default());
        let leaf = node(&mut f, Capabilities::default());
        f.tree.append_child(&f.registry, root, mid).unwrap();
        f.tree.append_child(&f.registry, mid, leaf).unwrap();
        f.tree.set_value(&f.registry, mid, f.font_size, 30.0).unwrap();
        let _ = f.tree.digest(&f.registry);

        f.tree.set_value(&f.registry, root, f.font_size, 16.0).unwrap();
        let report = f.tree.digest(&f.registry);
        assert!(report.changed(root, f.font_size.id()));
        assert!(!report.changed(mid, f.font_size.id()));
        assert!(!report.changed(leaf, f.font_size.id()));
        assert_eq!(f.tree.get_value(&f.registry, leaf, f.font_size), Ok(30.0));
    }

    #[test]
    fn inherited_values_pass_through_elements_that_cannot_host_them() {
        let mut f = fixture();
        let core = *f.tree.core();
        let item_font = f
            .registry
            .register(
                core.items_control,
                "ItemFont",
                PropertyMetadataBuilder::new(1.0_f64).inherits(true).build(),
            )
            .unwrap();
        let list = f.tree.create(core.items_control, Capabilities::default());
        let border = node(&mut f, Capabilities::default());
        let nested = f.tree.create(core.items_control, Capabilities::default());
        f.tree.append_child(&f.registry, list, border).unwrap();
        f.tree.append_child(&f.registry, border, nested).unwrap();
        let _ = f.tree.digest(&f.registry);

        f.tree.set_value(&f.registry, list, item_font, 2.0).unwrap();
        let report = f.tree.digest(&f.registry);
        assert!(report.changed(list, item_font.id()));
        assert!(!report.changed(border, item_font.id()));
        assert!(report.changed(nested, item_font.id()));
        assert!(f.tree.get_value(&f.registry, border, item_font).is_err());
        assert_eq!(f.tree.get_value(&f.registry, nested, item_font), Ok(2.0));
    }

    #[test]
    fn setting_then_restoring_reports_nothing() {
        let mut f = fixture();
        let e = node(&mut f, Capabilities::default());
        f.tree.set_value(&f.registry, e, f.width, 5.0).unwrap();
        f.tree.set_value(&f.registry, e, f.width, 0.0).unwrap();
        assert!(f.tree.digest(&f.registry).is_empty());
    }
}
