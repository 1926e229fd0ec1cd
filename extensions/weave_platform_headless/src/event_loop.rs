//! Headless event loop
//!
//! The loop blocks on the job queue itself, so its waker does nothing.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use weave_platform::{
    ApplicationOptions, DisplayInfo, EventLoop, JobQueue, LoopWaker, NativeWindow, NoopWaker,
    PlatformError, Result, UiContext, WindowId, WindowOptions,
};

use crate::journal::{Journal, NativeCall};
use crate::window::HeadlessWindow;
use crate::{HeadlessToolkit, ScriptHandler};

/// Headless event loop
pub struct HeadlessEventLoop {
    context: HeadlessContext,
    instance_lock: Option<Arc<AtomicBool>>,
}

impl HeadlessEventLoop {
    pub(crate) fn new(toolkit: HeadlessToolkit, options: &ApplicationOptions) -> Self {
        Self {
            context: HeadlessContext {
                windows: BTreeMap::new(),
                displays: toolkit.displays,
                journal: toolkit.journal,
                script_handler: toolkit.script_handler,
                failing_creations: toolkit.failing_creations,
                quit_on_last_window_closed: options.quit_on_last_window_closed(),
                quit_requested: false,
            },
            instance_lock: toolkit.instance_lock,
        }
    }
}

impl EventLoop for HeadlessEventLoop {
    fn waker(&self) -> Arc<dyn LoopWaker> {
        Arc::new(NoopWaker)
    }

    fn run(self, jobs: JobQueue) -> Result<()> {
        let HeadlessEventLoop {
            mut context,
            instance_lock,
        } = self;

        tracing::debug!("headless event loop running");
        while let Some(job) = jobs.recv() {
            job.run(&mut context);
            if context.quit_requested {
                break;
            }
        }

        let ids = context.window_ids();
        for id in ids {
            context.close_window(id);
        }
        if let Some(lock) = instance_lock {
            lock.store(false, Ordering::SeqCst);
        }
        tracing::debug!("headless event loop finished");
        Ok(())
    }
}

/// Toolkit-thread state of the headless toolkit
pub struct HeadlessContext {
    windows: BTreeMap<WindowId, HeadlessWindow>,
    displays: Vec<DisplayInfo>,
    journal: Journal,
    script_handler: Option<ScriptHandler>,
    failing_creations: usize,
    quit_on_last_window_closed: bool,
    quit_requested: bool,
}

impl UiContext for HeadlessContext {
    fn toolkit_name(&self) -> &'static str {
        "headless"
    }

    fn create_window(&mut self, id: WindowId, options: &WindowOptions) -> Result<()> {
        if self.failing_creations > 0 {
            self.failing_creations -= 1;
            return Err(PlatformError::WebView(
                "rendering engine unavailable".to_string(),
            ));
        }
        if self.windows.contains_key(&id) {
            return Err(PlatformError::WindowCreation(format!(
                "{id} already has a native window"
            )));
        }

        self.journal.record(NativeCall::Created {
            window: id,
            options: options.clone(),
        });
        let window = HeadlessWindow::new(
            id,
            options,
            self.script_handler.clone(),
            self.journal.clone(),
        );
        self.windows.insert(id, window);
        tracing::debug!(%id, title = %options.title, "headless window created");
        Ok(())
    }

    fn window(&mut self, id: WindowId) -> Option<&mut dyn NativeWindow> {
        self.windows
            .get_mut(&id)
            .map(|window| window as &mut dyn NativeWindow)
    }

    fn close_window(&mut self, id: WindowId) -> bool {
        let Some(window) = self.windows.remove(&id) else {
            return false;
        };
        self.journal.record(NativeCall::Closed {
            window: id,
            last_state: window.snapshot(),
        });
        tracing::debug!(%id, "headless window closed");

        if self.windows.is_empty() && self.quit_on_last_window_closed && !self.quit_requested {
            tracing::debug!("last window closed, quitting");
            self.quit_requested = true;
        }
        true
    }

    fn window_ids(&self) -> Vec<WindowId> {
        self.windows.keys().copied().collect()
    }

    fn displays(&self) -> Vec<DisplayInfo> {
        self.displays.clone()
    }

    fn quit(&mut self) {
        self.quit_requested = true;
    }
}
