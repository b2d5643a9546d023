// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Marshalling work back onto the UI thread.
//!
//! The UI core is single-threaded. Background work runs on worker threads
//! and hands its result to a continuation that the UI thread runs later,
//! with mutable access to its context `C`, when it calls
//! [`UiDispatcher::run_pending`].

use std::marker::PhantomData;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;
use std::sync::Arc;
use std::thread;

use crossbeam::channel::{self, Receiver, Sender};

use crate::error::{DispatchError, Result};
use crate::task::{Task, TaskShared};

/// A continuation for the UI thread.
pub type Continuation<C> = Box<dyn FnOnce(&mut C) + Send + 'static>;

/// The UI thread's continuation queue.
///
/// Not `Send`: continuations only ever run on the thread that created it.
pub struct UiDispatcher<C> {
    sender: Sender<Continuation<C>>,
    receiver: Receiver<Continuation<C>>,
    _not_send: PhantomData<Rc<()>>,
}

impl<C: 'static> Default for UiDispatcher<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: 'static> UiDispatcher<C> {
    /// Creates a dispatcher for the calling thread.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = channel::unbounded();
        Self {
            sender,
            receiver,
            _not_send: PhantomData,
        }
    }

    /// Returns a handle other threads can post continuations through.
    #[must_use]
    pub fn handle(&self) -> UiHandle<C> {
        UiHandle {
            sender: self.sender.clone(),
        }
    }

    /// Returns the number of continuations waiting to run.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Runs `work` on a new worker thread.
    ///
    /// Use [`Task::then_on_ui`] to get the result back onto this thread, or
    /// [`Task::wait_timeout`] to block for it.
    pub fn spawn_background<T, F>(&self, work: F) -> Task<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let shared = Arc::new(TaskShared::new());
        let worker = shared.clone();
        thread::spawn(move || {
            let result = catch_unwind(AssertUnwindSafe(work)).map_err(|_| DispatchError::Panicked);
            if result.is_err() {
                tracing::warn!("background task panicked");
            }
            worker.complete(result);
        });
        Task::new(shared)
    }

    /// Runs every pending continuation against `context`.
    ///
    /// Returns the number run.
    pub fn run_pending(&self, context: &mut C) -> usize {
        self.run_pending_limited(context, usize::MAX)
    }

    /// Runs at most `max` pending continuations, oldest first.
    pub fn run_pending_limited(&self, context: &mut C, max: usize) -> usize {
        let mut ran = 0;
        while ran < max {
            let Ok(continuation) = self.receiver.try_recv() else {
                break;
            };
            continuation(context);
            ran += 1;
        }
        if ran > 0 {
            tracing::trace!(ran, "ran UI continuations");
        }
        ran
    }

    pub(crate) fn sender(&self) -> Sender<Continuation<C>> {
        self.sender.clone()
    }
}

impl<C> std::fmt::Debug for UiDispatcher<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiDispatcher")
            .field("pending", &self.receiver.len())
            .finish()
    }
}

/// A cloneable, `Send` handle for posting continuations to a
/// [`UiDispatcher`].
pub struct UiHandle<C> {
    sender: Sender<Continuation<C>>,
}

impl<C> Clone for UiHandle<C> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<C: 'static> UiHandle<C> {
    /// Queues `continuation` for the UI thread.
    pub fn post<F>(&self, continuation: F) -> Result<()>
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        self.sender
            .send(Box::new(continuation))
            .map_err(|_| DispatchError::Disconnected)
    }
}

impl<C> std::fmt::Debug for UiHandle<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiHandle").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Default)]
    struct Ui {
        log: Vec<&'static str>,
        thread: Option<thread::ThreadId>,
    }

    #[test]
    fn posted_continuations_run_in_order() {
        let dispatcher: UiDispatcher<Ui> = UiDispatcher::new();
        let handle = dispatcher.handle();
        handle.post(|ui| ui.log.push("a")).unwrap();
        thread::spawn(move || handle.post(|ui| ui.log.push("b")).unwrap())
            .join()
            .unwrap();

        let mut ui = Ui::default();
        assert_eq!(dispatcher.pending(), 2);
        assert_eq!(dispatcher.run_pending_limited(&mut ui, 1), 1);
        assert_eq!(ui.log, ["a"]);
        assert_eq!(dispatcher.run_pending(&mut ui), 1);
        assert_eq!(ui.log, ["a", "b"]);
    }

    #[test]
    fn continuation_runs_on_the_ui_thread() {
        let dispatcher: UiDispatcher<Ui> = UiDispatcher::new();
        let task = dispatcher.spawn_background(|| {
            thread::sleep(Duration::from_millis(5));
            thread::current().id()
        });
        task.then_on_ui(&dispatcher, |ui: &mut Ui, worker| {
            assert_ne!(worker, Ok(thread::current().id()));
            ui.thread = Some(thread::current().id());
        });

        let mut ui = Ui::default();
        while dispatcher.run_pending(&mut ui) == 0 {
            thread::yield_now();
        }
        assert_eq!(ui.thread, Some(thread::current().id()));
    }

    #[test]
    fn dropped_dispatcher_disconnects_handles() {
        let dispatcher: UiDispatcher<Ui> = UiDispatcher::new();
        let handle = dispatcher.handle();
        drop(dispatcher);
        assert_eq!(handle.post(|_| {}), Err(DispatchError::Disconnected));
    }
}
