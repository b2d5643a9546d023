// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispatch errors.

/// Errors reported when handing work between threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// The receiving side is gone, so the work will never run.
    #[error("the receiving queue has been dropped")]
    Disconnected,
    /// The result was not ready in time. The task is still running and can
    /// be waited on again.
    #[error("timed out waiting for the result")]
    Timeout,
    /// The work item panicked.
    #[error("the work item panicked")]
    Panicked,
    /// The result was already taken by an earlier wait.
    #[error("the result has already been taken")]
    Consumed,
}

/// Result alias for dispatch operations.
pub type Result<T, E = DispatchError> = core::result::Result<T, E>;
