// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Routed event identities.

use core::any::TypeId;
use core::fmt;
use core::marker::PhantomData;

use presentation_property::TypeKey;

/// How an event travels along its route.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RoutingStrategy {
    /// Root to source. Used by `Preview*` events.
    Tunnel,
    /// Source to root.
    Bubble,
    /// Only the source is invoked.
    Direct,
}

/// A runtime routed event identifier.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoutedEventId(u16);

impl RoutedEventId {
    #[inline]
    pub(crate) const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Returns the underlying index.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for RoutedEventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RoutedEventId").field(&self.0).finish()
    }
}

/// A routed event handle carrying its payload type.
///
/// Minted by
/// [`EventManager::register_routed_event`](crate::EventManager::register_routed_event).
pub struct RoutedEvent<E> {
    id: RoutedEventId,
    _marker: PhantomData<fn(&mut E)>,
}

impl<E> RoutedEvent<E> {
    #[inline]
    pub(crate) const fn from_id(id: RoutedEventId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// Returns the underlying event ID.
    #[must_use]
    #[inline]
    pub const fn id(self) -> RoutedEventId {
        self.id
    }
}

impl<E> Copy for RoutedEvent<E> {}

impl<E> Clone for RoutedEvent<E> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> PartialEq for RoutedEvent<E> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<E> Eq for RoutedEvent<E> {}

impl<E> fmt::Debug for RoutedEvent<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutedEvent")
            .field("id", &self.id)
            .field("payload", &core::any::type_name::<E>())
            .finish()
    }
}

/// What a manager knows about a registered event.
#[derive(Clone, Debug)]
pub struct RoutedEventInfo {
    pub(crate) name: &'static str,
    pub(crate) strategy: RoutingStrategy,
    pub(crate) owner: TypeKey,
    pub(crate) payload: TypeId,
    pub(crate) payload_name: &'static str,
}

impl RoutedEventInfo {
    /// Returns the event name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the routing strategy.
    #[must_use]
    pub fn strategy(&self) -> RoutingStrategy {
        self.strategy
    }

    /// Returns the type that registered the event.
    #[must_use]
    pub fn owner(&self) -> TypeKey {
        self.owner
    }

    /// Returns the payload type name.
    #[must_use]
    pub fn payload_name(&self) -> &'static str {
        self.payload_name
    }
}
