// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Presentation Dispatch: thread hand-off for the UI core.
//!
//! ## Overview
//!
//! Three threads meet here:
//!
//! - The UI thread owns the element tree and runs continuations posted to its
//!   [`UiDispatcher`].
//! - Background workers run work started with
//!   [`UiDispatcher::spawn_background`] and deliver the result through a
//!   [`Task`].
//! - The graphics thread owns a [`WorkQueue`]. Resource wrappers on any
//!   thread queue [`WorkItem`]s through a [`WorkQueueHandle`], optionally
//!   waiting for completion.
//!
//! Panics inside work items and background work are caught and reported as
//! [`DispatchError::Panicked`].
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use presentation_dispatch::{GraphicsResourceOwner, UiDispatcher, WorkQueue};
//!
//! let ui: UiDispatcher<Vec<String>> = UiDispatcher::new();
//! let graphics = WorkQueue::new();
//! let device = graphics.handle();
//!
//! let task = ui.spawn_background(move || {
//!     // Upload from a worker, then hand the result back to the UI thread.
//!     device.queue_work_item(Box::new(|| {})).map(|()| "uploaded".to_string())
//! });
//! task.then_on_ui(&ui, |log: &mut Vec<String>, result| {
//!     if let Ok(Ok(message)) = result {
//!         log.push(message);
//!     }
//! });
//!
//! let mut log = Vec::new();
//! while ui.run_pending(&mut log) == 0 {
//!     std::thread::sleep(Duration::from_millis(1));
//! }
//! assert_eq!(graphics.process(), 1);
//! assert_eq!(log, ["uploaded"]);
//! ```

mod error;
mod task;
mod ui;
mod work_queue;

pub use error::{DispatchError, Result};
pub use task::Task;
pub use ui::{Continuation, UiDispatcher, UiHandle};
pub use work_queue::{GraphicsResourceOwner, WorkItem, WorkQueue, WorkQueueHandle};
