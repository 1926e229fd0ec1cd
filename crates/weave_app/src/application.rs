//! Application lifecycle
//!
//! An [`Application`] owns the toolkit thread. Creating one spawns the
//! thread, waits until its event loop is live, and hands back a cheap
//! clonable handle; every component that talks to the toolkit receives
//! that handle explicitly.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use weave_platform::{
    job_channel, ApplicationOptions, DisplayInfo, EventLoop, Handoff, LoopWaker, PlatformError,
    Toolkit, UiContext, UiExecutor, WindowId, WindowOptions,
};

use crate::error::{AppError, Result};
use crate::window::Window;

/// How often startup checks whether the toolkit thread died
const STARTUP_POLL: Duration = Duration::from_millis(50);

type Startup = Handoff<weave_platform::Result<Arc<dyn LoopWaker>>>;

struct Inner {
    name: String,
    toolkit_name: &'static str,
    executor: UiExecutor,
    toolkit_thread: ThreadId,
    handle: Mutex<Option<JoinHandle<weave_platform::Result<()>>>>,
    next_window_id: AtomicU64,
}

/// Handle to a running application
///
/// Cloning is cheap; all clones drive the same toolkit thread.
#[derive(Clone)]
pub struct Application {
    inner: Arc<Inner>,
}

impl Application {
    /// Start the toolkit thread and wait for its event loop
    ///
    /// Returns once the loop has run a job, so anything dispatched
    /// afterwards is serviced. Fails with the toolkit's own error when the
    /// loop cannot be created, and with [`AppError::StartupTimeout`] when
    /// `options.startup_timeout` elapses first.
    ///
    /// Most native toolkits allow one application per process; a second
    /// concurrent `create` surfaces the toolkit's refusal as an error.
    pub fn create<T: Toolkit>(toolkit: T, options: ApplicationOptions) -> Result<Self> {
        let toolkit_name = toolkit.name();
        let timeout = options.startup_timeout;
        let startup: Arc<Startup> = Arc::new(Handoff::new());
        let (sender, queue) = job_channel();

        tracing::info!(app = %options.name, toolkit = toolkit_name, "starting toolkit thread");

        let handle = thread::Builder::new()
            .name(format!("{}-toolkit", options.name))
            .spawn({
                let startup = Arc::clone(&startup);
                let options = options.clone();
                move || {
                    let event_loop = match toolkit.create_event_loop(&options) {
                        Ok(event_loop) => event_loop,
                        Err(err) => {
                            tracing::error!(%err, "failed to create event loop");
                            startup.put(Err(err.clone()));
                            return Err(err);
                        }
                    };
                    startup.put(Ok(event_loop.waker()));
                    let result = event_loop.run(queue);
                    tracing::debug!(?result, "toolkit event loop exited");
                    result
                }
            })
            .map_err(|e| PlatformError::InitFailed(format!("failed to spawn toolkit thread: {e}")))?;

        let started = Instant::now();
        let waker = await_startup(&startup, &handle, timeout)?;
        let executor = UiExecutor::new(sender, waker);

        // The loop is live once it has serviced a job
        match timeout {
            Some(timeout) => {
                let remaining = timeout.saturating_sub(started.elapsed());
                executor
                    .submit_blocking_timeout(|_| (), remaining)
                    .map_err(|err| match err {
                        PlatformError::Timeout(_) => AppError::StartupTimeout(timeout),
                        other => other.into(),
                    })?
            }
            None => executor.submit_blocking(|_| ())?,
        }

        tracing::info!(
            app = %options.name,
            elapsed = ?started.elapsed(),
            "toolkit ready"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                name: options.name,
                toolkit_thread: handle.thread().id(),
                handle: Mutex::new(Some(handle)),
                toolkit_name,
                executor,
                next_window_id: AtomicU64::new(1),
            }),
        })
    }

    /// Application name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Name of the toolkit driving this application
    pub fn toolkit_name(&self) -> &'static str {
        self.inner.toolkit_name
    }

    /// Id of the toolkit thread
    pub fn toolkit_thread_id(&self) -> ThreadId {
        self.inner.toolkit_thread
    }

    /// Executor onto the toolkit thread
    pub fn executor(&self) -> &UiExecutor {
        &self.inner.executor
    }

    /// Whether two handles refer to the same application
    pub fn ptr_eq(&self, other: &Application) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Run `work` on the toolkit thread without waiting
    pub fn dispatch<F>(&self, work: F)
    where
        F: FnOnce(&mut dyn UiContext) + Send + 'static,
    {
        self.inner.executor.submit(work);
    }

    /// Run `work` on the toolkit thread and wait for its result
    ///
    /// Must not be called from the toolkit thread.
    pub fn dispatch_blocking<F, R>(&self, work: F) -> Result<R>
    where
        F: FnOnce(&mut dyn UiContext) -> R + Send + 'static,
        R: Send + 'static,
    {
        Ok(self.inner.executor.submit_blocking(work)?)
    }

    /// Describe an unrealized window
    ///
    /// Nothing native is created until [`Window::run`].
    pub fn new_window(&self, options: WindowOptions) -> Window {
        let id = WindowId(self.inner.next_window_id.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%id, title = %options.title, "window described");
        Window::new(self.clone(), id, options)
    }

    /// Displays attached to the machine
    pub fn list_displays(&self) -> Result<Vec<DisplayInfo>> {
        self.dispatch_blocking(|ctx| ctx.displays())
    }

    /// Ask the event loop to stop
    ///
    /// Returns immediately; use [`Application::join`] to wait for the
    /// toolkit thread.
    pub fn quit(&self) {
        tracing::info!(app = %self.inner.name, "quit requested");
        self.inner.executor.submit(|ctx| ctx.quit());
    }

    /// Wait for the toolkit thread to finish
    ///
    /// Returns the event loop's result. Later calls, from any clone,
    /// return `Ok(())` immediately.
    pub fn join(&self) -> Result<()> {
        let handle = self.inner.handle.lock().take();
        let Some(handle) = handle else {
            return Ok(());
        };
        match handle.join() {
            Ok(result) => Ok(result?),
            Err(_) => Err(AppError::ToolkitPanicked),
        }
    }

    /// Whether the toolkit thread is still running
    pub fn is_running(&self) -> bool {
        self.inner
            .handle
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("name", &self.inner.name)
            .field("toolkit", &self.inner.toolkit_name)
            .finish()
    }
}

fn await_startup(
    startup: &Startup,
    handle: &JoinHandle<weave_platform::Result<()>>,
    timeout: Option<Duration>,
) -> Result<Arc<dyn LoopWaker>> {
    let started = Instant::now();
    loop {
        if let Some(result) = startup.take_timeout(STARTUP_POLL) {
            return Ok(result?);
        }
        if handle.is_finished() {
            return match startup.try_take() {
                Some(result) => Ok(result?),
                None => Err(PlatformError::InitFailed(
                    "toolkit thread exited during startup".to_string(),
                )
                .into()),
            };
        }
        if let Some(timeout) = timeout {
            if started.elapsed() >= timeout {
                tracing::error!(?timeout, "toolkit did not start in time");
                return Err(AppError::StartupTimeout(timeout));
            }
        }
    }
}
