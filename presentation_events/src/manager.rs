// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The routed event registry and dispatcher.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

use hashbrown::HashMap;
use presentation_property::TypeKey;
use presentation_tree::ElementId;
use smallvec::SmallVec;

use crate::data::{DispatchState, RoutedEventData};
use crate::error::{EventError, Result};
use crate::event::{RoutedEvent, RoutedEventId, RoutedEventInfo, RoutingStrategy};
use crate::route::{Route, RouteSource};

type ErasedHandler<S> = Box<dyn FnMut(&mut S, &mut RoutedEventData, &mut dyn Any)>;

/// Identifies an instance handler for removal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct HandlerToken(u64);

struct InstanceHandler<S> {
    token: HandlerToken,
    handler: ErasedHandler<S>,
}

/// Registered routed events plus their class and instance handlers.
///
/// `S` is the [`RouteSource`] handlers receive mutably, usually a
/// [`Scene`](crate::Scene).
///
/// At every node on the route, class handlers run first, most derived type
/// first, and they run even once the event is handled. Instance handlers
/// follow in registration order and are skipped once any handler set
/// `handled`.
pub struct EventManager<S> {
    events: Vec<RoutedEventInfo>,
    by_name: HashMap<&'static str, SmallVec<[(TypeKey, RoutedEventId); 2]>>,
    class_handlers: HashMap<(TypeKey, RoutedEventId), Vec<ErasedHandler<S>>>,
    instance_handlers: HashMap<(ElementId, RoutedEventId), Vec<InstanceHandler<S>>>,
    tokens: HashMap<HandlerToken, (ElementId, RoutedEventId)>,
    next_token: u64,
}

impl<S: RouteSource + 'static> Default for EventManager<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: RouteSource + 'static> EventManager<S> {
    /// Creates a manager with no events.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            by_name: HashMap::new(),
            class_handlers: HashMap::new(),
            instance_handlers: HashMap::new(),
            tokens: HashMap::new(),
            next_token: 0,
        }
    }

    /// Registers an event named `name` on `owner`, carrying payloads of type
    /// `E`.
    ///
    /// # Panics
    ///
    /// Panics if more than 65,535 events are registered.
    pub fn register_routed_event<E: 'static>(
        &mut self,
        name: &'static str,
        strategy: RoutingStrategy,
        owner: TypeKey,
    ) -> Result<RoutedEvent<E>> {
        if self.find(owner, name).is_some() {
            return Err(EventError::DuplicateEvent { name });
        }
        assert!(
            self.events.len() < u16::MAX as usize,
            "Too many routed events registered (max {})",
            u16::MAX
        );
        #[expect(clippy::cast_possible_truncation, reason = "checked above")]
        let id = RoutedEventId::new(self.events.len() as u16);
        self.events.push(RoutedEventInfo {
            name,
            strategy,
            owner,
            payload: TypeId::of::<E>(),
            payload_name: core::any::type_name::<E>(),
        });
        self.by_name.entry(name).or_default().push((owner, id));
        tracing::debug!(name, ?strategy, id = id.index(), "registered routed event");
        Ok(RoutedEvent::from_id(id))
    }

    /// Finds the event `name` registered directly on `owner`.
    #[must_use]
    pub fn find(&self, owner: TypeKey, name: &str) -> Option<RoutedEventId> {
        self.by_name
            .get(name)?
            .iter()
            .find(|(o, _)| *o == owner)
            .map(|&(_, id)| id)
    }

    /// Returns what is known about `event`.
    #[must_use]
    pub fn info(&self, event: RoutedEventId) -> Option<&RoutedEventInfo> {
        self.events.get(event.index() as usize)
    }

    /// Returns the number of registered events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if no event is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Adds a class handler for every element of type `ty` or a type derived
    /// from it.
    pub fn register_class_handler<E, F>(
        &mut self,
        ty: TypeKey,
        event: RoutedEvent<E>,
        handler: F,
    ) -> Result<()>
    where
        E: 'static,
        F: FnMut(&mut S, &mut RoutedEventData, &mut E) + 'static,
    {
        self.check::<E>(event.id())?;
        self.class_handlers
            .entry((ty, event.id()))
            .or_default()
            .push(erase(handler));
        Ok(())
    }

    /// Adds an instance handler to `element`.
    pub fn add_handler<E, F>(
        &mut self,
        element: ElementId,
        event: RoutedEvent<E>,
        handler: F,
    ) -> Result<HandlerToken>
    where
        E: 'static,
        F: FnMut(&mut S, &mut RoutedEventData, &mut E) + 'static,
    {
        self.check::<E>(event.id())?;
        let token = HandlerToken(self.next_token);
        self.next_token += 1;
        self.instance_handlers
            .entry((element, event.id()))
            .or_default()
            .push(InstanceHandler {
                token,
                handler: erase(handler),
            });
        self.tokens.insert(token, (element, event.id()));
        Ok(token)
    }

    /// Removes an instance handler. Returns `false` if it was already gone.
    pub fn remove_handler(&mut self, token: HandlerToken) -> bool {
        let Some(key) = self.tokens.remove(&token) else {
            return false;
        };
        if let Some(handlers) = self.instance_handlers.get_mut(&key) {
            handlers.retain(|h| h.token != token);
            if handlers.is_empty() {
                self.instance_handlers.remove(&key);
            }
        }
        true
    }

    /// Removes every instance handler on `element`, returning how many there
    /// were. Call this when the element is destroyed.
    pub fn remove_handlers_for(&mut self, element: ElementId) -> usize {
        let mut removed = 0;
        let tokens = &mut self.tokens;
        self.instance_handlers.retain(|(owner, _), handlers| {
            if *owner != element {
                return true;
            }
            for handler in handlers.iter() {
                tokens.remove(&handler.token);
            }
            removed += handlers.len();
            false
        });
        removed
    }

    /// Raises `event` on `source`.
    ///
    /// The route is captured when the dispatch starts. Nodes that handlers
    /// destroy or unlink before their turn are skipped. Returns the final
    /// event data; the payload is left with whatever handlers wrote to it.
    pub fn raise<E: 'static>(
        &mut self,
        scene: &mut S,
        source: ElementId,
        event: RoutedEvent<E>,
        payload: &mut E,
    ) -> Result<RoutedEventData> {
        let strategy = self.check::<E>(event.id())?;
        let mut data = RoutedEventData::new(event.id(), source);
        self.route(scene, event.id(), strategy, &mut data, payload);
        data.complete();
        Ok(data)
    }

    /// Raises a preview event and then its main event with one shared
    /// `handled` flag, as for `PreviewKeyDown` and `KeyDown`.
    ///
    /// If a preview handler marks the event handled, instance handlers of
    /// the main event do not run; its class handlers still do.
    pub fn raise_paired<E: 'static>(
        &mut self,
        scene: &mut S,
        source: ElementId,
        preview: RoutedEvent<E>,
        main: RoutedEvent<E>,
        payload: &mut E,
    ) -> Result<RoutedEventData> {
        let preview_strategy = self.check::<E>(preview.id())?;
        let main_strategy = self.check::<E>(main.id())?;
        let mut data = RoutedEventData::new(preview.id(), source);
        self.route(scene, preview.id(), preview_strategy, &mut data, payload);
        self.route(scene, main.id(), main_strategy, &mut data, payload);
        data.complete();
        Ok(data)
    }

    /// Returns the strategy of `event` after checking it carries `E`.
    fn check<E: 'static>(&self, event: RoutedEventId) -> Result<RoutingStrategy> {
        let info = self
            .info(event)
            .ok_or(EventError::UnregisteredEvent(event))?;
        if info.payload != TypeId::of::<E>() {
            return Err(EventError::PayloadMismatch {
                name: info.name,
                expected: info.payload_name,
                found: core::any::type_name::<E>(),
            });
        }
        Ok(info.strategy)
    }

    fn route(
        &mut self,
        scene: &mut S,
        event: RoutedEventId,
        strategy: RoutingStrategy,
        data: &mut RoutedEventData,
        payload: &mut dyn Any,
    ) {
        let state = match strategy {
            RoutingStrategy::Tunnel => DispatchState::Tunneling,
            RoutingStrategy::Bubble | RoutingStrategy::Direct => DispatchState::Bubbling,
        };
        data.enter(event, state);

        let route = Route::capture(scene, data.source());
        if route.len() == 0 {
            tracing::warn!(source = ?data.source(), ?event, "routed event raised on a dead element");
            return;
        }
        let mut cut = 0;
        for index in route.steps(strategy) {
            let node = route.node(index);
            if index < cut {
                tracing::trace!(?node, ?event, "skipping node removed during dispatch");
                continue;
            }
            data.visit(node);
            tracing::trace!(?node, ?event, ?state, handled = data.is_handled(), "dispatch step");
            self.invoke(scene, node, data, payload);
            cut = route.detached_prefix(scene);
        }
    }

    fn invoke(
        &mut self,
        scene: &mut S,
        node: ElementId,
        data: &mut RoutedEventData,
        payload: &mut dyn Any,
    ) {
        let event = data.event();
        if let Some(ty) = scene.element_type(node) {
            let lineage: SmallVec<[TypeKey; 8]> = scene.types().ancestors(ty).collect();
            for ty in lineage {
                if let Some(handlers) = self.class_handlers.get_mut(&(ty, event)) {
                    for handler in handlers.iter_mut() {
                        handler(scene, data, payload);
                    }
                }
            }
        }
        if let Some(handlers) = self.instance_handlers.get_mut(&(node, event)) {
            for entry in handlers.iter_mut() {
                if data.is_handled() {
                    break;
                }
                (entry.handler)(scene, data, payload);
            }
        }
    }
}

impl<S> fmt::Debug for EventManager<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventManager")
            .field("events", &self.events)
            .field("class_handlers", &self.class_handlers.len())
            .field("instance_handlers", &self.tokens.len())
            .finish_non_exhaustive()
    }
}

fn erase<S, E, F>(mut handler: F) -> ErasedHandler<S>
where
    S: 'static,
    E: 'static,
    F: FnMut(&mut S, &mut RoutedEventData, &mut E) + 'static,
{
    Box::new(
        move |scene: &mut S, data: &mut RoutedEventData, payload: &mut dyn Any| {
            if let Some(payload) = payload.downcast_mut::<E>() {
                handler(scene, data, payload);
            }
        },
    )
}
