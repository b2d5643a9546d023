// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Item containers.
//!
//! An items host keeps an ordered item list. Each item is presented by a
//! container element: the item itself when it is an element the host accepts
//! as its own container, otherwise a generated element. Containers are
//! logical children of the host and visual children of the items panel.

use alloc::boxed::Box;

use presentation_property::{PropertyRegistry, TypeKey};

use crate::core_props::CoreProperties;
use crate::error::{Result, TreeError};
use crate::tree::Tree;
use crate::types::{Capabilities, Detached, ElementId, Item};

/// Per-variant behavior of an element that hosts items.
///
/// The tree calls back into the host while generating and recycling
/// containers; the host is detached from its element for the duration of
/// the call, so it may freely mutate the tree.
pub trait ItemsHost {
    /// Returns `true` if `item` can be placed into the panel as is.
    fn is_item_its_own_container(&self, item: &Item) -> bool {
        matches!(item, Item::Element(_))
    }

    /// Type and capabilities of generated containers.
    fn container_type(&self, core: &CoreProperties) -> (TypeKey, Capabilities) {
        (core.content_control, Capabilities::default())
    }

    /// Prepares `container` to present `item`.
    ///
    /// The default sets the container's `Content` to the item.
    fn prepare_container(
        &mut self,
        tree: &mut Tree,
        registry: &PropertyRegistry,
        container: ElementId,
        item: &Item,
    ) -> Result<()> {
        if item.as_element() == Some(container) {
            return Ok(());
        }
        let content = tree.core().content;
        tree.set_value(registry, container, content, Some(item.clone()))
    }

    /// Undoes [`prepare_container`](Self::prepare_container).
    fn clear_container(
        &mut self,
        tree: &mut Tree,
        registry: &PropertyRegistry,
        container: ElementId,
        item: &Item,
    ) -> Result<()> {
        if item.as_element() == Some(container) {
            return Ok(());
        }
        let content = tree.core().content.id();
        tree.clear_local_value(registry, container, content).map(drop)
    }
}

/// An [`ItemsHost`] with the default behavior: elements are their own
/// containers, data gets a content control.
#[derive(Copy, Clone, Debug, Default)]
pub struct ContentItemsHost;

impl ItemsHost for ContentItemsHost {}

impl Tree {
    /// Installs the items host behavior of `id`.
    ///
    /// The element needs [`Capabilities::ITEMS_HOST`].
    pub fn set_items_host(&mut self, id: ElementId, host: Box<dyn ItemsHost>) -> Result<()> {
        let element = self.element_mut(id)?;
        if !element.caps.contains(Capabilities::ITEMS_HOST) {
            return Err(TreeError::NotAnItemsHost(id));
        }
        element.items_host = Some(host);
        Ok(())
    }

    /// Returns the number of items of `host`.
    #[must_use]
    pub fn item_count(&self, host: ElementId) -> usize {
        self.element(host).map_or(0, |e| e.items.len())
    }

    /// Returns the item at `index`.
    #[must_use]
    pub fn item_at(&self, host: ElementId, index: usize) -> Option<&Item> {
        self.element(host)
            .ok()
            .and_then(|e| e.items.get(index))
            .map(|(_, item)| item)
    }

    /// Iterates the containers of `host` in item order.
    pub fn item_containers(&self, host: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        self.element(host)
            .ok()
            .into_iter()
            .flat_map(|e| e.items.iter().map(|(container, _)| *container))
    }

    /// Returns the container presenting `item` in `host`.
    #[must_use]
    pub fn container_for_item(&self, host: ElementId, item: &Item) -> Option<ElementId> {
        self.element(host)
            .ok()?
            .items
            .iter()
            .find(|(_, candidate)| candidate == item)
            .map(|(container, _)| *container)
    }

    /// Returns the items host that owns `container`.
    #[must_use]
    pub fn items_host_from_container(&self, container: ElementId) -> Option<ElementId> {
        self.element(container).ok().and_then(|e| e.container_of)
    }

    /// Appends an item to `host`, placing its container into `panel`.
    pub fn add_item(
        &mut self,
        registry: &PropertyRegistry,
        host: ElementId,
        panel: ElementId,
        item: Item,
    ) -> Result<ElementId> {
        let index = self.item_count(host);
        self.insert_item(registry, host, panel, index, item)
    }

    /// Inserts an item at `index` and returns its container.
    ///
    /// The container becomes a logical child of `host` and a visual child of
    /// `panel`, placed before the container of the item that followed it.
    pub fn insert_item(
        &mut self,
        registry: &PropertyRegistry,
        host: ElementId,
        panel: ElementId,
        index: usize,
        item: Item,
    ) -> Result<ElementId> {
        let len = self.element(host)?.items.len();
        if index > len {
            return Err(TreeError::IndexOutOfRange { index, len });
        }
        self.element(panel)?;
        let mut behavior = self
            .element_mut(host)?
            .items_host
            .take()
            .ok_or(TreeError::NotAnItemsHost(host))?;
        let result = self.insert_item_with(&mut *behavior, registry, host, panel, index, item);
        if let Ok(element) = self.element_mut(host) {
            element.items_host = Some(behavior);
        }
        result
    }

    fn insert_item_with(
        &mut self,
        behavior: &mut dyn ItemsHost,
        registry: &PropertyRegistry,
        host: ElementId,
        panel: ElementId,
        index: usize,
        item: Item,
    ) -> Result<ElementId> {
        let own = match item.as_element() {
            Some(element) if behavior.is_item_its_own_container(&item) => Some(element),
            _ => None,
        };
        let container = match own {
            Some(element) => element,
            None => {
                let (ty, caps) = behavior.container_type(&self.core);
                self.create(ty, caps)
            }
        };

        let host_el = self.element(host)?;
        let logical_index = host_el.children.len();
        let next = host_el.items.get(index).map(|(c, _)| *c);
        let panel_el = self.element(panel)?;
        let visual_index = next
            .and_then(|n| panel_el.visual_children.iter().position(|v| *v == n))
            .unwrap_or(panel_el.visual_children.len());

        if let Err(err) = self.link(registry, host, logical_index, panel, visual_index, container) {
            if own.is_none() {
                self.destroy(registry, container)?;
            }
            return Err(err);
        }
        self.element_mut(container)?.container_of = Some(host);
        let was_empty = {
            let element = self.element_mut(host)?;
            element.items.insert(index, (container, item.clone()));
            element.items.len() == 1
        };
        if was_empty {
            self.set_has_items(registry, host, true);
        }
        behavior.prepare_container(self, registry, container, &item)?;
        tracing::debug!(?host, ?container, index, "inserted item");
        Ok(container)
    }

    /// Removes the item at `index` from `host`.
    ///
    /// Generated containers are destroyed; elements that were their own
    /// container are only detached.
    pub fn remove_item(
        &mut self,
        registry: &PropertyRegistry,
        host: ElementId,
        index: usize,
    ) -> Result<(Item, Detached)> {
        let element = self.element(host)?;
        if element.items_host.is_none() {
            return Err(TreeError::NotAnItemsHost(host));
        }
        let len = element.items.len();
        if index >= len {
            return Err(TreeError::IndexOutOfRange { index, len });
        }
        let (container, item) = self.element_mut(host)?.items.remove(index);
        self.after_item_removed(registry, host, container, &item);

        let detached = if item.as_element() == Some(container) {
            self.unlink(registry, container)?
        } else {
            self.destroy(registry, container)?
        };
        Ok((item, detached))
    }

    /// Drops the item entry for `container` if `host` still lists it.
    ///
    /// Used when a container leaves its host by another path than
    /// [`remove_item`](Self::remove_item).
    pub(crate) fn forget_container(
        &mut self,
        registry: &PropertyRegistry,
        host: ElementId,
        container: ElementId,
    ) {
        let Ok(element) = self.element_mut(host) else {
            return;
        };
        let Some(pos) = element.items.iter().position(|(c, _)| *c == container) else {
            return;
        };
        let (_, item) = element.items.remove(pos);
        self.after_item_removed(registry, host, container, &item);
    }

    fn after_item_removed(
        &mut self,
        registry: &PropertyRegistry,
        host: ElementId,
        container: ElementId,
        item: &Item,
    ) {
        if let Ok(element) = self.element_mut(container) {
            element.container_of = None;
        }
        let behavior = self.element_mut(host).ok().and_then(|e| e.items_host.take());
        if let Some(mut behavior) = behavior {
            if let Err(err) = behavior.clear_container(self, registry, container, item) {
                tracing::warn!(?host, ?container, %err, "failed to clear item container");
            }
            if let Ok(element) = self.element_mut(host) {
                element.items_host = Some(behavior);
            }
        }
        if self.item_count(host) == 0 {
            self.set_has_items(registry, host, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    struct Fixture {
        registry: PropertyRegistry,
        tree: Tree,
        host: ElementId,
        panel: ElementId,
    }

    fn fixture() -> Fixture {
        let mut registry = PropertyRegistry::new();
        let core = CoreProperties::register(&mut registry).unwrap();
        let mut tree = Tree::new(core);
        let host = tree.create(
            core.items_control,
            Capabilities::default() | Capabilities::ITEMS_HOST,
        );
        tree.set_items_host(host, Box::new(ContentItemsHost)).unwrap();
        let panel = tree.create(core.ui_element, Capabilities::default());
        tree.append_child(&registry, host, panel).unwrap();
        Fixture {
            registry,
            tree,
            host,
            panel,
        }
    }

    #[test]
    fn data_items_get_generated_containers() {
        let mut f = fixture();
        let core = *f.tree.core();
        let item = Item::data("first");
        let container = f
            .tree
            .add_item(&f.registry, f.host, f.panel, item.clone())
            .unwrap();

        assert_eq!(f.tree.items_host_from_container(container), Some(f.host));
        assert_eq!(f.tree.parent(container), Some(f.host));
        assert_eq!(f.tree.visual_parent(container), Some(f.panel));
        assert_eq!(
            f.tree.get_value(&f.registry, container, core.content),
            Ok(Some(item.clone()))
        );
        assert_eq!(f.tree.get_value(&f.registry, f.host, core.has_items), Ok(true));
        assert_eq!(f.tree.container_for_item(f.host, &item), Some(container));
        assert_eq!(
            f.tree.item_at(f.host, 0).and_then(|i| i.downcast_ref::<&str>()),
            Some(&"first")
        );
    }

    #[test]
    fn element_items_are_their_own_container() {
        let mut f = fixture();
        let ty = f.tree.core().ui_element;
        let button = f.tree.create(ty, Capabilities::default());
        let container = f
            .tree
            .add_item(&f.registry, f.host, f.panel, Item::Element(button))
            .unwrap();
        assert_eq!(container, button);

        let (item, detached) = f.tree.remove_item(&f.registry, f.host, 0).unwrap();
        assert_eq!(item, Item::Element(button));
        assert_eq!(detached.element, button);
        assert!(f.tree.is_alive(button));
        assert_eq!(f.tree.parent(button), None);
        let core = *f.tree.core();
        assert_eq!(f.tree.get_value(&f.registry, f.host, core.has_items), Ok(false));
    }

    #[test]
    fn containers_follow_item_order_in_the_panel() {
        let mut f = fixture();
        let a = f.tree.add_item(&f.registry, f.host, f.panel, Item::data(1_u8)).unwrap();
        let c = f.tree.add_item(&f.registry, f.host, f.panel, Item::data(3_u8)).unwrap();
        let b = f
            .tree
            .insert_item(&f.registry, f.host, f.panel, 1, Item::data(2_u8))
            .unwrap();
        assert_eq!(f.tree.visual_children(f.panel), &[a, b, c]);
        assert_eq!(f.tree.item_containers(f.host).collect::<Vec<_>>(), [a, b, c]);

        let (_, detached) = f.tree.remove_item(&f.registry, f.host, 1).unwrap();
        assert_eq!(detached.element, b);
        assert!(!f.tree.is_alive(b));
        assert_eq!(f.tree.visual_children(f.panel), &[a, c]);
    }

    #[test]
    fn destroying_the_host_unlists_containers_from_a_detached_panel() {
        let mut f = fixture();
        let container = f
            .tree
            .add_item(&f.registry, f.host, f.panel, Item::data(1_u8))
            .unwrap();
        f.tree.remove_child(&f.registry, f.host, f.panel).unwrap();
        assert_eq!(f.tree.visual_children(f.panel), &[container]);

        f.tree.destroy(&f.registry, f.host).unwrap();
        assert!(!f.tree.is_alive(container));
        assert!(f.tree.is_alive(f.panel));
        assert!(f.tree.visual_children(f.panel).is_empty());
    }

    #[test]
    fn removing_a_container_directly_drops_its_item() {
        let mut f = fixture();
        let ty = f.tree.core().ui_element;
        let button = f.tree.create(ty, Capabilities::default());
        f.tree
            .add_item(&f.registry, f.host, f.panel, Item::Element(button))
            .unwrap();
        f.tree.remove_child(&f.registry, f.host, button).unwrap();
        assert_eq!(f.tree.item_count(f.host), 0);
        assert_eq!(f.tree.items_host_from_container(button), None);
    }

    #[test]
    fn plain_elements_are_not_items_hosts() {
        let mut f = fixture();
        let ty = f.tree.core().ui_element;
        let plain = f.tree.create(ty, Capabilities::default());
        assert_eq!(
            f.tree.set_items_host(plain, Box::new(ContentItemsHost)),
            Err(TreeError::NotAnItemsHost(plain))
        );
        assert_eq!(
            f.tree.add_item(&f.registry, plain, f.panel, Item::data(0_u8)),
            Err(TreeError::NotAnItemsHost(plain))
        );
    }
}
