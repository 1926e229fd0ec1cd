//! UI-thread executor
//!
//! Native toolkits only accept calls from the thread that created their
//! event loop. [`UiExecutor`] is the single way in: any thread submits jobs,
//! the toolkit thread runs them in submission order with a [`UiContext`].
//!
//! ```text
//!  caller threads                     toolkit thread
//!  ──────────────                     ──────────────
//!  submit(job) ──┐
//!  submit(job) ──┼──▶ job channel ──▶ EventLoop::run ─▶ job(&mut UiContext)
//!  submit_blocking(job) ─┘      ▲                             │
//!        │ take()               └──── LoopWaker::wake         │ put(result)
//!        ◀────────────────────── Handoff ◀────────────────────┘
//! ```
//!
//! Calling [`UiExecutor::submit_blocking`] from inside a job deadlocks: the
//! toolkit thread would wait on itself. Jobs must only use `submit`.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{PlatformError, Result};
use crate::handoff::Handoff;
use crate::toolkit::{LoopWaker, UiContext};

/// A unit of work for the toolkit thread
pub struct Job {
    work: Box<dyn FnOnce(&mut dyn UiContext) + Send>,
}

impl Job {
    pub fn new<F>(work: F) -> Self
    where
        F: FnOnce(&mut dyn UiContext) + Send + 'static,
    {
        Self {
            work: Box::new(work),
        }
    }

    /// Run the job; only ever called on the toolkit thread
    pub fn run(self, ctx: &mut dyn UiContext) {
        (self.work)(ctx)
    }
}

/// Sending half of the job channel, consumed by [`UiExecutor::new`]
pub struct JobSender(mpsc::Sender<Job>);

/// Receiving half of the job channel, owned by the toolkit thread
pub struct JobQueue {
    receiver: mpsc::Receiver<Job>,
}

/// Create a job channel
///
/// The queue goes to the toolkit thread; the sender is wrapped into a
/// [`UiExecutor`] once the toolkit's waker is known. Jobs sent before the
/// loop starts are kept and run as soon as it does.
pub fn job_channel() -> (JobSender, JobQueue) {
    let (tx, rx) = mpsc::channel();
    (JobSender(tx), JobQueue { receiver: rx })
}

impl JobQueue {
    /// Run every job currently queued, returning how many ran
    ///
    /// For loops that are woken by a native pump.
    pub fn drain(&self, ctx: &mut dyn UiContext) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.receiver.try_recv() {
            job.run(ctx);
            ran += 1;
        }
        ran
    }

    /// Block until the next job arrives
    ///
    /// Returns `None` once every executor has been dropped.
    pub fn recv(&self) -> Option<Job> {
        self.receiver.recv().ok()
    }

    /// Block for at most `timeout` waiting for the next job
    ///
    /// `Ok(None)` means the wait timed out; `Err` means every executor is gone.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<Job>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(job) => Ok(Some(job)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(PlatformError::Disconnected),
        }
    }
}

/// Submits work to the toolkit thread
///
/// Cheap to clone; every clone feeds the same FIFO queue.
#[derive(Clone)]
pub struct UiExecutor {
    sender: mpsc::Sender<Job>,
    waker: Arc<dyn LoopWaker>,
}

impl UiExecutor {
    pub fn new(sender: JobSender, waker: Arc<dyn LoopWaker>) -> Self {
        Self {
            sender: sender.0,
            waker,
        }
    }

    /// Queue `work` and return immediately
    ///
    /// Jobs from one thread run in the order that thread submitted them.
    /// If the toolkit thread has exited the job is dropped and logged.
    pub fn submit<F>(&self, work: F)
    where
        F: FnOnce(&mut dyn UiContext) + Send + 'static,
    {
        if self.enqueue(Job::new(work)).is_err() {
            tracing::warn!("toolkit thread has exited, dropping submitted job");
        }
    }

    /// Queue `work` and block until the toolkit thread has run it
    ///
    /// Fails with [`PlatformError::Disconnected`] when the toolkit thread is
    /// gone or drops the job without running it.
    pub fn submit_blocking<F, R>(&self, work: F) -> Result<R>
    where
        F: FnOnce(&mut dyn UiContext) -> R + Send + 'static,
        R: Send + 'static,
    {
        let slot = self.enqueue_with_reply(work)?;
        slot.take().ok_or(PlatformError::Disconnected)
    }

    /// [`submit_blocking`](Self::submit_blocking) with an upper bound on the wait
    ///
    /// On timeout the job stays queued; its result is discarded when it runs.
    pub fn submit_blocking_timeout<F, R>(&self, work: F, timeout: Duration) -> Result<R>
    where
        F: FnOnce(&mut dyn UiContext) -> R + Send + 'static,
        R: Send + 'static,
    {
        let slot = self.enqueue_with_reply(work)?;
        match slot.take_timeout(timeout) {
            Some(Some(value)) => Ok(value),
            Some(None) => Err(PlatformError::Disconnected),
            None => Err(PlatformError::Timeout(timeout)),
        }
    }

    fn enqueue_with_reply<F, R>(&self, work: F) -> Result<Arc<Handoff<Option<R>>>>
    where
        F: FnOnce(&mut dyn UiContext) -> R + Send + 'static,
        R: Send + 'static,
    {
        let slot = Arc::new(Handoff::new());
        let reply = Reply {
            slot: Arc::clone(&slot),
            sent: false,
        };
        self.enqueue(Job::new(move |ctx| reply.send(work(ctx))))?;
        Ok(slot)
    }

    fn enqueue(&self, job: Job) -> Result<()> {
        self.sender
            .send(job)
            .map_err(|_| PlatformError::Disconnected)?;
        self.waker.wake();
        Ok(())
    }
}

impl std::fmt::Debug for UiExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiExecutor").finish_non_exhaustive()
    }
}

/// Result slot of a blocking job
///
/// Reports `None` if dropped unsent, so a job that never runs still
/// releases its waiter.
struct Reply<R> {
    slot: Arc<Handoff<Option<R>>>,
    sent: bool,
}

impl<R> Reply<R> {
    fn send(mut self, value: R) {
        self.sent = true;
        self.slot.put(Some(value));
    }
}

impl<R> Drop for Reply<R> {
    fn drop(&mut self) {
        if !self.sent {
            self.slot.put(None);
        }
    }
}
