// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Route sources and route snapshots.

use presentation_property::{PropertyRegistry, TypeKey, TypeRegistry};
use presentation_tree::{CoreProperties, ElementId, Tree};
use smallvec::SmallVec;

use crate::event::RoutingStrategy;

/// What the dispatcher needs to know about the element structure.
///
/// Handlers receive the source mutably, so they may restructure it while an
/// event is in flight; the dispatcher rechecks the snapshot after each step.
pub trait RouteSource {
    /// Returns `true` if `node` exists.
    fn is_alive(&self, node: ElementId) -> bool;

    /// Returns the next node towards the root.
    fn route_parent(&self, node: ElementId) -> Option<ElementId>;

    /// Returns the type of `node`, used to find class handlers.
    fn element_type(&self, node: ElementId) -> Option<TypeKey>;

    /// Returns the type hierarchy class handlers are looked up in.
    fn types(&self) -> &TypeRegistry;
}

/// A property registry and the element tree built on it.
///
/// The two always travel together: tree operations take the registry, and
/// handlers need both to change values or structure.
///
/// ```rust
/// use presentation_events::{RouteSource, Scene};
/// use presentation_tree::Capabilities;
///
/// let mut scene = Scene::bootstrap().unwrap();
/// let ui_element = scene.tree.core().ui_element;
/// let root = scene.tree.create(ui_element, Capabilities::default());
/// let leaf = scene.tree.create(ui_element, Capabilities::default());
/// scene.tree.append_child(&scene.registry, root, leaf).unwrap();
/// assert_eq!(scene.route_parent(leaf), Some(root));
/// ```
#[derive(Debug)]
pub struct Scene {
    /// The property registry.
    pub registry: PropertyRegistry,
    /// The element tree.
    pub tree: Tree,
}

impl Scene {
    /// Pairs an existing registry and tree.
    #[must_use]
    pub fn new(registry: PropertyRegistry, tree: Tree) -> Self {
        Self { registry, tree }
    }

    /// Creates a fresh registry with the core properties and an empty tree.
    pub fn bootstrap() -> presentation_property::Result<Self> {
        let mut registry = PropertyRegistry::new();
        let core = CoreProperties::register(&mut registry)?;
        Ok(Self::new(registry, Tree::new(core)))
    }
}

impl RouteSource for Scene {
    fn is_alive(&self, node: ElementId) -> bool {
        self.tree.is_alive(node)
    }

    fn route_parent(&self, node: ElementId) -> Option<ElementId> {
        self.tree.route_parent(node)
    }

    fn element_type(&self, node: ElementId) -> Option<TypeKey> {
        self.tree.element(node).ok().map(|e| e.element_type())
    }

    fn types(&self) -> &TypeRegistry {
        self.registry.types()
    }
}

/// The nodes an event visits, captured when the dispatch starts.
///
/// Stored source first.
#[derive(Clone, Debug)]
pub(crate) struct Route {
    nodes: SmallVec<[ElementId; 16]>,
}

impl Route {
    pub(crate) fn capture<S: RouteSource>(source: &S, origin: ElementId) -> Self {
        let mut nodes = SmallVec::new();
        let mut current = source.is_alive(origin).then_some(origin);
        while let Some(node) = current {
            nodes.push(node);
            current = source.route_parent(node);
        }
        Self { nodes }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn node(&self, index: usize) -> ElementId {
        self.nodes[index]
    }

    /// Indices into the route in visiting order.
    pub(crate) fn steps(&self, strategy: RoutingStrategy) -> SmallVec<[usize; 16]> {
        let n = self.nodes.len();
        match strategy {
            RoutingStrategy::Tunnel => (0..n).rev().collect(),
            RoutingStrategy::Bubble => (0..n).collect(),
            RoutingStrategy::Direct => (0..n.min(1)).collect(),
        }
    }

    /// Returns how many nodes, counted from the source, are no longer
    /// connected to the rest of the snapshot.
    ///
    /// A node is cut off when it, or a link above it, was destroyed or
    /// rewired since the snapshot was taken.
    pub(crate) fn detached_prefix<S: RouteSource>(&self, source: &S) -> usize {
        let n = self.nodes.len();
        for i in (0..n).rev() {
            let node = self.nodes[i];
            let linked = match self.nodes.get(i + 1) {
                Some(&above) => source.route_parent(node) == Some(above),
                None => true,
            };
            if !source.is_alive(node) || !linked {
                return i + 1;
            }
        }
        0
    }
}
