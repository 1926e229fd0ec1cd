//! Toolkit trait and abstraction
//!
//! A toolkit backend owns one dedicated thread. On that thread it builds
//! its native application object ([`Toolkit::create_event_loop`]) and then
//! runs the event loop ([`EventLoop::run`]), which also services the job
//! queue fed by [`UiExecutor`](crate::UiExecutor). Jobs receive a
//! [`UiContext`], the only route to native objects.

use std::sync::Arc;

use crate::display::DisplayInfo;
use crate::error::Result;
use crate::executor::JobQueue;
use crate::options::ApplicationOptions;
use crate::window::{NativeWindow, WindowId, WindowOptions};

/// Toolkit backend
///
/// Implemented by each backend crate (desktop, headless). The value is
/// moved onto the toolkit thread before anything native is touched.
pub trait Toolkit: Send + 'static {
    /// The event loop type for this toolkit
    type EventLoop: EventLoop;

    /// Get the toolkit name, e.g. "desktop" or "headless"
    fn name(&self) -> &'static str;

    /// Construct the native application object and its event loop
    ///
    /// Runs on the toolkit thread. Backends that allow a single native
    /// application per process fail here on a second attempt.
    fn create_event_loop(self, options: &ApplicationOptions) -> Result<Self::EventLoop>;
}

/// Event loop abstraction
pub trait EventLoop {
    /// A handle that wakes this loop from any thread
    fn waker(&self) -> Arc<dyn LoopWaker>;

    /// Run the event loop
    ///
    /// Blocks until [`UiContext::quit`] is called. Jobs arriving on `jobs`
    /// must be run in order, on this thread.
    fn run(self, jobs: JobQueue) -> Result<()>;
}

/// Wakes a sleeping event loop so it drains its job queue
pub trait LoopWaker: Send + Sync {
    fn wake(&self);
}

/// A waker for loops that block on the job queue directly
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopWaker;

impl LoopWaker for NoopWaker {
    fn wake(&self) {}
}

/// Toolkit-thread context handed to every job
pub trait UiContext {
    /// Name of the running toolkit
    fn toolkit_name(&self) -> &'static str;

    /// Realize a window: create the native window, its layout and web view,
    /// load the configured URL, apply the start state and show it.
    fn create_window(&mut self, id: WindowId, options: &WindowOptions) -> Result<()>;

    /// Look up a live native window
    fn window(&mut self, id: WindowId) -> Option<&mut dyn NativeWindow>;

    /// Destroy a native window, returning whether it existed
    fn close_window(&mut self, id: WindowId) -> bool;

    /// Ids of all live native windows
    fn window_ids(&self) -> Vec<WindowId>;

    /// Describe the attached displays as they are right now
    fn displays(&self) -> Vec<DisplayInfo>;

    /// Ask the event loop to stop once the current job returns
    fn quit(&mut self);
}
