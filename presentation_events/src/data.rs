// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-dispatch bookkeeping handed to every handler.

use presentation_tree::ElementId;

use crate::event::RoutedEventId;

/// Where a dispatch is in its lifecycle.
///
/// Moves forward only: `NotStarted`, then `Tunneling` and/or `Bubbling`,
/// then `Complete`. Direct events run their single step as `Bubbling`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DispatchState {
    /// Created but not yet routed.
    NotStarted,
    /// Visiting nodes from the root towards the source.
    Tunneling,
    /// Visiting nodes from the source towards the root.
    Bubbling,
    /// Every step has run.
    Complete,
}

/// The shared state of one dispatch.
///
/// `handled` only ever goes from `false` to `true`. Once set, instance
/// handlers at later steps are skipped; class handlers keep running.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RoutedEventData {
    event: RoutedEventId,
    source: ElementId,
    current: ElementId,
    state: DispatchState,
    handled: bool,
}

impl RoutedEventData {
    pub(crate) fn new(event: RoutedEventId, source: ElementId) -> Self {
        Self {
            event,
            source,
            current: source,
            state: DispatchState::NotStarted,
            handled: false,
        }
    }

    /// Returns the event being dispatched.
    #[must_use]
    pub fn event(&self) -> RoutedEventId {
        self.event
    }

    /// Returns the element the event was raised on.
    #[must_use]
    pub fn source(&self) -> ElementId {
        self.source
    }

    /// Returns the element whose handlers are running.
    #[must_use]
    pub fn current(&self) -> ElementId {
        self.current
    }

    /// Returns the dispatch state.
    #[must_use]
    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// Returns `true` once a handler marked the event handled.
    #[must_use]
    pub fn is_handled(&self) -> bool {
        self.handled
    }

    /// Marks the event handled. There is no way to unset it.
    pub fn set_handled(&mut self) {
        self.handled = true;
    }

    pub(crate) fn enter(&mut self, event: RoutedEventId, state: DispatchState) {
        self.event = event;
        self.state = self.state.max(state);
    }

    pub(crate) fn visit(&mut self, node: ElementId) {
        self.current = node;
    }

    pub(crate) fn complete(&mut self) {
        self.current = self.source;
        self.state = DispatchState::Complete;
    }
}
