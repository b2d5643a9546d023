// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Work items for the thread that owns the graphics context.
//!
//! Resources such as textures and buffers may only be touched on the thread
//! that created the graphics context. Any thread can hold a
//! [`WorkQueueHandle`] and queue closures; the owning thread runs them in
//! submission order when it calls [`WorkQueue::process`].

use std::marker::PhantomData;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;
use std::thread::{self, ThreadId};

use crossbeam::channel::{self, Receiver, Sender, TryRecvError};

use crate::error::{DispatchError, Result};

/// A closure to run on the owning thread.
pub type WorkItem = Box<dyn FnOnce() + Send + 'static>;

struct Envelope {
    work: WorkItem,
    done: Option<Sender<Result<()>>>,
}

/// Something that owns thread-affine graphics resources.
///
/// Implemented by [`WorkQueueHandle`]. Resource wrappers hold one so they can
/// release or update their backing objects from any thread.
pub trait GraphicsResourceOwner {
    /// Queues `work` to run on the owning thread and returns immediately.
    fn queue_work_item(&self, work: WorkItem) -> Result<()>;

    /// Runs `work` on the owning thread and blocks until it has finished.
    ///
    /// When called on the owning thread the work runs inline.
    fn queue_work_item_and_wait(&self, work: WorkItem) -> Result<()>;
}

/// The receiving end, kept by the owning thread.
///
/// Not `Send`: the thread that creates the queue is the owner.
pub struct WorkQueue {
    owner: ThreadId,
    sender: Sender<Envelope>,
    receiver: Receiver<Envelope>,
    _not_send: PhantomData<Rc<()>>,
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkQueue {
    /// Creates a queue owned by the calling thread.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = channel::unbounded();
        Self {
            owner: thread::current().id(),
            sender,
            receiver,
            _not_send: PhantomData,
        }
    }

    /// Returns a handle other threads can queue work through.
    #[must_use]
    pub fn handle(&self) -> WorkQueueHandle {
        WorkQueueHandle {
            owner: self.owner,
            sender: self.sender.clone(),
        }
    }

    /// Returns the number of queued items.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Runs every queued item, including items queued while processing.
    ///
    /// Returns the number of items run.
    pub fn process(&self) -> usize {
        self.process_limited(usize::MAX)
    }

    /// Runs at most `max` queued items, oldest first.
    pub fn process_limited(&self, max: usize) -> usize {
        let mut ran = 0;
        while ran < max {
            match self.receiver.try_recv() {
                Ok(envelope) => {
                    run(envelope);
                    ran += 1;
                }
                // The queue keeps a sender, so it never disconnects.
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        if ran > 0 {
            tracing::trace!(ran, "processed graphics work items");
        }
        ran
    }
}

impl std::fmt::Debug for WorkQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkQueue")
            .field("owner", &self.owner)
            .field("pending", &self.receiver.len())
            .finish()
    }
}

fn run(envelope: Envelope) {
    let outcome =
        catch_unwind(AssertUnwindSafe(envelope.work)).map_err(|_| DispatchError::Panicked);
    match envelope.done {
        Some(done) => {
            // The waiter may have given up; nothing to report to then.
            let _ = done.send(outcome);
        }
        None => {
            if outcome.is_err() {
                tracing::warn!("graphics work item panicked");
            }
        }
    }
}

/// A cloneable, `Send` handle to a [`WorkQueue`].
#[derive(Clone)]
pub struct WorkQueueHandle {
    owner: ThreadId,
    sender: Sender<Envelope>,
}

impl WorkQueueHandle {
    /// Returns `true` when called on the thread that owns the queue.
    #[must_use]
    pub fn is_owner_thread(&self) -> bool {
        thread::current().id() == self.owner
    }

    /// Runs `work` on the owning thread and returns its result.
    ///
    /// Like [`queue_work_item_and_wait`](GraphicsResourceOwner::queue_work_item_and_wait),
    /// but carries a value back.
    pub fn run_and_wait<T, F>(&self, work: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        if self.is_owner_thread() {
            return catch_unwind(AssertUnwindSafe(work)).map_err(|_| DispatchError::Panicked);
        }
        let (result_tx, result_rx) = channel::bounded(1);
        self.queue_work_item_and_wait(Box::new(move || {
            let _ = result_tx.send(work());
        }))?;
        result_rx.try_recv().map_err(|_| DispatchError::Disconnected)
    }

    fn send(&self, envelope: Envelope) -> Result<()> {
        self.sender
            .send(envelope)
            .map_err(|_| DispatchError::Disconnected)
    }
}

impl GraphicsResourceOwner for WorkQueueHandle {
    fn queue_work_item(&self, work: WorkItem) -> Result<()> {
        self.send(Envelope { work, done: None })
    }

    fn queue_work_item_and_wait(&self, work: WorkItem) -> Result<()> {
        if self.is_owner_thread() {
            return catch_unwind(AssertUnwindSafe(work)).map_err(|_| DispatchError::Panicked);
        }
        let (done_tx, done_rx) = channel::bounded(1);
        self.send(Envelope {
            work,
            done: Some(done_tx),
        })?;
        // A dropped queue discards its items, which drops `done_tx`.
        done_rx.recv().map_err(|_| DispatchError::Disconnected)?
    }
}

impl std::fmt::Debug for WorkQueueHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkQueueHandle")
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn items_run_in_submission_order_on_process() {
        let queue = WorkQueue::new();
        let handle = queue.handle();
        let log = Arc::new(parking_lot::Mutex::new(Vec::new()));
        for i in 0..3 {
            let log = log.clone();
            handle
                .queue_work_item(Box::new(move || log.lock().push(i)))
                .unwrap();
        }
        assert!(log.lock().is_empty());
        assert_eq!(queue.pending(), 3);
        assert_eq!(queue.process(), 3);
        assert_eq!(*log.lock(), [0, 1, 2]);
    }

    #[test]
    fn wait_on_owner_thread_runs_inline() {
        let queue = WorkQueue::new();
        let handle = queue.handle();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        handle
            .queue_work_item_and_wait(Box::new(move || {
                h.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(queue.pending(), 0);
        assert_eq!(handle.run_and_wait(|| 7), Ok(7));
    }

    #[test]
    fn wait_from_another_thread_blocks_until_processed() {
        let queue = WorkQueue::new();
        let handle = queue.handle();
        let worker = thread::spawn(move || handle.run_and_wait(|| thread::current().id()));

        let mut ran = 0;
        while ran == 0 {
            ran = queue.process();
            thread::yield_now();
        }
        assert_eq!(worker.join().unwrap(), Ok(thread::current().id()));
    }

    #[test]
    fn panics_are_reported_to_the_waiter() {
        let queue = WorkQueue::new();
        let handle = queue.handle();
        let worker = thread::spawn(move || {
            handle.queue_work_item_and_wait(Box::new(|| panic!("lost device")))
        });
        while queue.process() == 0 {
            thread::yield_now();
        }
        assert_eq!(worker.join().unwrap(), Err(DispatchError::Panicked));
    }

    #[test]
    fn dropped_queue_disconnects_handles() {
        let queue = WorkQueue::new();
        let handle = queue.handle();
        drop(queue);
        assert_eq!(
            handle.queue_work_item(Box::new(|| {})),
            Err(DispatchError::Disconnected)
        );
        let waiter = thread::spawn(move || handle.queue_work_item_and_wait(Box::new(|| {})));
        assert_eq!(waiter.join().unwrap(), Err(DispatchError::Disconnected));
    }

    #[test]
    fn process_limited_leaves_the_rest() {
        let queue = WorkQueue::new();
        let handle = queue.handle();
        for _ in 0..5 {
            handle.queue_work_item(Box::new(|| {})).unwrap();
        }
        assert_eq!(queue.process_limited(2), 2);
        assert_eq!(queue.pending(), 3);
    }
}
