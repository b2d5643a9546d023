// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use presentation_dispatch::DispatchError;
use presentation_events::EventError;
use presentation_property::PropertyError;
use presentation_tree::TreeError;

/// Errors surfaced by [`Presentation`](crate::Presentation).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PresentationError {
    /// A property registration or access failed.
    #[error(transparent)]
    Property(#[from] PropertyError),
    /// A tree mutation or lookup failed.
    #[error(transparent)]
    Tree(#[from] TreeError),
    /// A routed event registration or dispatch failed.
    #[error(transparent)]
    Event(#[from] EventError),
    /// A hand-off to another thread failed.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Result alias for the facade.
pub type Result<T, E = PresentationError> = core::result::Result<T, E>;
