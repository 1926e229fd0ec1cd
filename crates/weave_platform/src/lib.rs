//! Weave Platform Abstraction Layer
//!
//! This crate provides the toolkit-neutral pieces of a Weave application:
//! thread-affine dispatch onto the toolkit's UI thread, and the contracts a
//! toolkit backend implements.
//!
//! # Architecture
//!
//! - [`Handoff`] - single-slot blocking handoff between two threads
//! - [`UiExecutor`] / [`JobQueue`] - FIFO job dispatch onto the toolkit thread
//! - [`Toolkit`] / [`EventLoop`] - backend entry points, run on the toolkit thread
//! - [`UiContext`] - what a job sees while it runs on the toolkit thread
//! - [`NativeWindow`] - capability contract of a native window + web view
//!
//! # Toolkit Implementations
//!
//! - `weave_platform_desktop` - winit windows hosting a wry web view
//! - `weave_platform_headless` - in-memory toolkit for tests and CI
//!
//! # Example
//!
//! ```ignore
//! use weave_platform::*;
//!
//! let (sender, queue) = job_channel();
//! std::thread::spawn(move || {
//!     let event_loop = toolkit.create_event_loop(&options)?;
//!     startup.put(event_loop.waker());
//!     event_loop.run(queue)
//! });
//! let executor = UiExecutor::new(sender, startup.take());
//! let displays = executor.submit_blocking(|ctx| ctx.displays())?;
//! ```

mod display;
mod error;
mod executor;
mod handoff;
mod options;
mod toolkit;
mod window;

// Re-export all public types
pub use display::DisplayInfo;
pub use error::{PlatformError, Result};
pub use executor::{job_channel, Job, JobQueue, JobSender, UiExecutor};
pub use handoff::Handoff;
pub use options::{
    ActivationPolicy, ApplicationOptions, LinuxOptions, MacOptions, WindowsOptions,
    WndProcInterceptor,
};
pub use toolkit::{EventLoop, LoopWaker, NoopWaker, Toolkit, UiContext};
pub use window::{
    NativeWindow, Rgba, ScriptCallback, Size, StartState, WindowId, WindowOptions,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::display::DisplayInfo;
    pub use crate::error::{PlatformError, Result};
    pub use crate::executor::UiExecutor;
    pub use crate::options::ApplicationOptions;
    pub use crate::toolkit::{EventLoop, Toolkit, UiContext};
    pub use crate::window::{NativeWindow, Rgba, Size, StartState, WindowId, WindowOptions};
}
