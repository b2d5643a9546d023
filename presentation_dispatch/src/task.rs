// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handles to background work.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::error::{DispatchError, Result};
use crate::ui::UiDispatcher;

type Forward<T> = Box<dyn FnOnce(Result<T>) + Send + 'static>;

enum State<T> {
    Running,
    /// A continuation is waiting for the result.
    Subscribed(Forward<T>),
    Ready(Result<T>),
    Taken,
}

pub(crate) struct TaskShared<T> {
    state: Mutex<State<T>>,
    ready: Condvar,
}

impl<T> TaskShared<T> {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(State::Running),
            ready: Condvar::new(),
        }
    }

    /// Stores the worker's result, or forwards it to the subscriber.
    pub(crate) fn complete(&self, result: Result<T>) {
        let mut state = self.state.lock();
        match std::mem::replace(&mut *state, State::Taken) {
            State::Subscribed(forward) => {
                drop(state);
                forward(result);
            }
            State::Running => {
                *state = State::Ready(result);
                drop(state);
                self.ready.notify_all();
            }
            // Completed twice; keep the first result.
            previous @ (State::Ready(_) | State::Taken) => *state = previous,
        }
    }
}

/// The result of work started with [`UiDispatcher::spawn_background`].
pub struct Task<T> {
    shared: Arc<TaskShared<T>>,
}

impl<T: Send + 'static> Task<T> {
    pub(crate) fn new(shared: Arc<TaskShared<T>>) -> Self {
        Self { shared }
    }

    /// Returns `true` once the worker has finished and the result was not
    /// taken yet.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(*self.shared.state.lock(), State::Ready(_))
    }

    /// Schedules `continuation` to run on the UI thread of `dispatcher` with
    /// the task's result.
    ///
    /// The continuation never runs on the worker thread. If the result is
    /// already there it is queued right away; if it was already taken, the
    /// continuation receives [`DispatchError::Consumed`].
    pub fn then_on_ui<C, F>(self, dispatcher: &UiDispatcher<C>, continuation: F)
    where
        C: 'static,
        F: FnOnce(&mut C, Result<T>) + Send + 'static,
    {
        let sender = dispatcher.sender();
        let forward: Forward<T> = Box::new(move |result| {
            let posted = sender.send(Box::new(move |context: &mut C| {
                continuation(context, result);
            }));
            if posted.is_err() {
                tracing::warn!("UI dispatcher dropped before a task continuation could run");
            }
        });

        let mut state = self.shared.state.lock();
        match std::mem::replace(&mut *state, State::Taken) {
            State::Running => *state = State::Subscribed(forward),
            State::Ready(result) => {
                drop(state);
                forward(result);
            }
            State::Taken | State::Subscribed(_) => {
                drop(state);
                forward(Err(DispatchError::Consumed));
            }
        }
    }

    /// Blocks until the result is ready or `timeout` elapses.
    ///
    /// On [`DispatchError::Timeout`] the task keeps running and can be
    /// waited on, or subscribed to, again.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<T> {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.state.lock();
        loop {
            match std::mem::replace(&mut *state, State::Taken) {
                State::Ready(result) => return result,
                State::Taken => return Err(DispatchError::Consumed),
                State::Running => {
                    *state = State::Running;
                    if self.shared.ready.wait_until(&mut state, deadline).timed_out()
                        && matches!(*state, State::Running)
                    {
                        tracing::warn!(?timeout, "background task timed out");
                        return Err(DispatchError::Timeout);
                    }
                }
                previous @ State::Subscribed(_) => {
                    *state = previous;
                    return Err(DispatchError::Consumed);
                }
            }
        }
    }
}

impl<T> std::fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match *self.shared.state.lock() {
            State::Running => "running",
            State::Subscribed(_) => "subscribed",
            State::Ready(_) => "ready",
            State::Taken => "taken",
        };
        f.debug_struct("Task").field("state", &state).finish()
    }
}
