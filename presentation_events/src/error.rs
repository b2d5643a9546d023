// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Routed event errors.

use crate::event::RoutedEventId;

/// Errors reported by the [`EventManager`](crate::EventManager).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    /// An event with this name is already registered on the owner type.
    #[error("routed event `{name}` is already registered on its owner")]
    DuplicateEvent {
        /// The conflicting event name.
        name: &'static str,
    },
    /// The event was not registered with this manager.
    #[error("{0:?} is not registered")]
    UnregisteredEvent(RoutedEventId),
    /// The payload type does not match the one the event was registered with.
    #[error("event `{name}` carries `{expected}`, not `{found}`")]
    PayloadMismatch {
        /// The event name.
        name: &'static str,
        /// The registered payload type.
        expected: &'static str,
        /// The payload type that was supplied.
        found: &'static str,
    },
}

/// Result alias for event operations.
pub type Result<T, E = EventError> = core::result::Result<T, E>;
