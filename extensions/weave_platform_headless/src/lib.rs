//! Weave Headless Platform
//!
//! A toolkit without a display. Its event loop runs on the toolkit thread
//! like any other backend, but only services the job queue; native windows
//! are in-memory records and every call made on them is written to a
//! [`Journal`] that tests can inspect.
//!
//! # Example
//!
//! ```ignore
//! use weave_platform_headless::HeadlessToolkit;
//!
//! let toolkit = HeadlessToolkit::new();
//! let journal = toolkit.journal();
//! let app = Application::create(toolkit, ApplicationOptions::new("test"))?;
//! ```

pub mod event_loop;
pub mod journal;
pub mod window;

pub use event_loop::{HeadlessContext, HeadlessEventLoop};
pub use journal::{Journal, JournalEntry, NativeCall};
pub use window::HeadlessWindow;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use weave_platform::{
    ApplicationOptions, DisplayInfo, PlatformError, Result, Size, Toolkit,
};

/// Produces the serialized result of a script evaluated in a headless page
pub type ScriptHandler = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Headless toolkit implementation
#[derive(Clone)]
pub struct HeadlessToolkit {
    displays: Vec<DisplayInfo>,
    journal: Journal,
    script_handler: Option<ScriptHandler>,
    failing_creations: usize,
    instance_lock: Option<Arc<AtomicBool>>,
    startup_delay: Option<Duration>,
}

impl Default for HeadlessToolkit {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessToolkit {
    /// Create a headless toolkit with a single 1920x1080 display
    pub fn new() -> Self {
        let mut display =
            DisplayInfo::from_physical(Some("headless-0".to_string()), Size::new(1920, 1080), 1.0);
        display.is_primary = true;
        display.is_current = true;

        Self {
            displays: vec![display],
            journal: Journal::default(),
            script_handler: None,
            failing_creations: 0,
            instance_lock: None,
            startup_delay: None,
        }
    }

    /// Replace the reported displays
    pub fn with_displays(mut self, displays: Vec<DisplayInfo>) -> Self {
        self.displays = displays;
        self
    }

    /// Answer script evaluations with `handler` instead of `"null"`
    pub fn with_script_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.script_handler = Some(Arc::new(handler));
        self
    }

    /// Make the next `count` window creations fail as if the web engine
    /// were unavailable
    pub fn fail_window_creations(mut self, count: usize) -> Self {
        self.failing_creations = count;
        self
    }

    /// Share a "native application exists" flag between toolkits
    ///
    /// Only one event loop holding the same lock can exist at a time, the
    /// way a native toolkit allows one application object per process.
    pub fn with_instance_lock(mut self, lock: Arc<AtomicBool>) -> Self {
        self.instance_lock = Some(lock);
        self
    }

    /// Sleep this long on the toolkit thread before the loop is created
    pub fn with_startup_delay(mut self, delay: Duration) -> Self {
        self.startup_delay = Some(delay);
        self
    }

    /// Journal every native call made through this toolkit is written to
    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }
}

impl Toolkit for HeadlessToolkit {
    type EventLoop = HeadlessEventLoop;

    fn name(&self) -> &'static str {
        "headless"
    }

    fn create_event_loop(self, options: &ApplicationOptions) -> Result<Self::EventLoop> {
        if let Some(delay) = self.startup_delay {
            std::thread::sleep(delay);
        }

        if let Some(lock) = &self.instance_lock {
            if lock
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                return Err(PlatformError::InitFailed(
                    "a headless application already owns this instance lock".to_string(),
                ));
            }
        }

        tracing::debug!(app = %options.name, "headless toolkit initialised");
        Ok(HeadlessEventLoop::new(self, options))
    }
}
