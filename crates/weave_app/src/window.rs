//! Deferred-configuration windows
//!
//! A [`Window`] starts as a plain description. Every mutator only edits
//! that description until [`Window::run`] realizes it; from then on the
//! same mutators are forwarded to the native window on the toolkit thread.

use std::sync::Arc;
use std::time::Duration;

use weave_platform::{
    Handoff, NativeWindow, PlatformError, Rgba, Size, StartState, UiExecutor, WindowId,
    WindowOptions,
};

use crate::application::Application;
use crate::error::{AppError, Result};

enum Lifecycle {
    Unrealized(WindowOptions),
    Realized(WindowProxy),
}

/// A web view window
///
/// Obtained from [`Application::new_window`]. Configure it freely, then
/// call [`Window::run`] to create the native window.
pub struct Window {
    id: WindowId,
    app: Application,
    lifecycle: Lifecycle,
}

impl Window {
    pub(crate) fn new(app: Application, id: WindowId, options: WindowOptions) -> Self {
        Self {
            id,
            app,
            lifecycle: Lifecycle::Unrealized(options),
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    /// Application this window belongs to
    pub fn application(&self) -> &Application {
        &self.app
    }

    pub fn is_realized(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Realized(_))
    }

    /// Pending options, while the window is unrealized
    pub fn options(&self) -> Option<&WindowOptions> {
        match &self.lifecycle {
            Lifecycle::Unrealized(options) => Some(options),
            Lifecycle::Realized(_) => None,
        }
    }

    /// Create the native window from the accumulated options
    ///
    /// Blocks until the toolkit thread has built the window. On failure the
    /// window stays unrealized with its options intact, so `run` may be
    /// retried.
    pub fn run(&mut self) -> Result<()> {
        let options = match &self.lifecycle {
            Lifecycle::Unrealized(options) => options.clone(),
            Lifecycle::Realized(_) => return Err(AppError::AlreadyRealized(self.id)),
        };

        let id = self.id;
        let created = self
            .app
            .dispatch_blocking(move |ctx| ctx.create_window(id, &options));
        if let Err(err) = created.and_then(|result| result.map_err(AppError::from)) {
            tracing::error!(%id, %err, "failed to realize window");
            return Err(err);
        }

        tracing::info!(%id, "window realized");
        self.lifecycle = Lifecycle::Realized(WindowProxy {
            id,
            executor: self.app.executor().clone(),
        });
        Ok(())
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        match &mut self.lifecycle {
            Lifecycle::Unrealized(options) => options.title = title,
            Lifecycle::Realized(proxy) => {
                proxy.command("set_title", move |window| window.set_title(&title))
            }
        }
    }

    /// Resize; the size is kept within the min/max bounds
    pub fn set_size(&mut self, width: u32, height: u32) {
        let size = Size::new(width, height);
        match &mut self.lifecycle {
            Lifecycle::Unrealized(options) => {
                let size = size.clamp(options.min_size, options.max_size);
                options.width = size.width;
                options.height = size.height;
            }
            Lifecycle::Realized(proxy) => {
                proxy.command("set_size", move |window| window.set_size(size))
            }
        }
    }

    /// Set the minimum size
    ///
    /// A minimum above the current maximum raises the maximum, and the
    /// current size grows to fit.
    pub fn set_min_size(&mut self, width: u32, height: u32) {
        let min = Size::new(width, height);
        match &mut self.lifecycle {
            Lifecycle::Unrealized(options) => options.apply_min_size(min),
            Lifecycle::Realized(proxy) => proxy.command("set_min_size", move |window| {
                // the native side clamps against its current bounds, so the
                // maximum moves before the size and the size before the minimum
                let max = window.max_size().map(|max| max.grow_to(min));
                if let Some(max) = max.filter(|max| Some(*max) != window.max_size()) {
                    window.set_max_size(max);
                }
                window.set_size(window.size().clamp(Some(min), max));
                window.set_min_size(min);
            }),
        }
    }

    /// Set the maximum size
    ///
    /// A maximum below the current minimum lowers the minimum, and the
    /// current size shrinks to fit.
    pub fn set_max_size(&mut self, width: u32, height: u32) {
        let max = Size::new(width, height);
        match &mut self.lifecycle {
            Lifecycle::Unrealized(options) => options.apply_max_size(max),
            Lifecycle::Realized(proxy) => proxy.command("set_max_size", move |window| {
                let min = window.min_size().map(|min| min.shrink_to(max));
                if let Some(min) = min.filter(|min| Some(*min) != window.min_size()) {
                    window.set_min_size(min);
                }
                window.set_size(window.size().clamp(min, Some(max)));
                window.set_max_size(max);
            }),
        }
    }

    pub fn set_always_on_top(&mut self, always_on_top: bool) {
        match &mut self.lifecycle {
            Lifecycle::Unrealized(options) => options.always_on_top = always_on_top,
            Lifecycle::Realized(proxy) => proxy.command("set_always_on_top", move |window| {
                window.set_always_on_top(always_on_top)
            }),
        }
    }

    pub fn set_resizable(&mut self, resizable: bool) {
        match &mut self.lifecycle {
            Lifecycle::Unrealized(options) => options.resizable = resizable,
            Lifecycle::Realized(proxy) => {
                proxy.command("set_resizable", move |window| window.set_resizable(resizable))
            }
        }
    }

    /// Load `url` in the web view
    pub fn navigate_to_url(&mut self, url: impl Into<String>) {
        let url = url.into();
        match &mut self.lifecycle {
            Lifecycle::Unrealized(options) => options.url = url,
            Lifecycle::Realized(proxy) => proxy.fallible("navigate", move |window| window.navigate(&url)),
        }
    }

    /// Enable developer tools; opens them if the window is already live
    pub fn enable_dev_tools(&mut self) {
        match &mut self.lifecycle {
            Lifecycle::Unrealized(options) => options.dev_tools = true,
            Lifecycle::Realized(proxy) => {
                proxy.command("open_dev_tools", |window| window.open_dev_tools())
            }
        }
    }

    pub fn set_background_color(&mut self, color: Rgba) {
        match &mut self.lifecycle {
            Lifecycle::Unrealized(options) => options.background_color = Some(color),
            Lifecycle::Realized(proxy) => proxy.command("set_background_color", move |window| {
                window.set_background_color(color)
            }),
        }
    }

    pub fn set_maximised(&mut self) {
        self.set_state(StartState::Maximised);
    }

    pub fn set_minimised(&mut self) {
        self.set_state(StartState::Minimised);
    }

    pub fn set_fullscreen(&mut self) {
        self.set_state(StartState::Fullscreen);
    }

    /// Leave the maximised, minimised or fullscreen state
    pub fn restore(&mut self) {
        self.set_state(StartState::Normal);
    }

    fn set_state(&mut self, state: StartState) {
        match &mut self.lifecycle {
            Lifecycle::Unrealized(options) => options.start_state = state,
            Lifecycle::Realized(proxy) => proxy.command("set_state", move |window| match state {
                StartState::Normal => window.restore(),
                StartState::Maximised => window.set_maximised(),
                StartState::Minimised => window.set_minimised(),
                StartState::Fullscreen => window.set_fullscreen(),
            }),
        }
    }

    /// Run a script in the page, discarding its result
    ///
    /// Does nothing before the window is realized.
    pub fn exec_js(&self, script: impl Into<String>) {
        let script = script.into();
        match &self.lifecycle {
            Lifecycle::Unrealized(_) => {
                tracing::debug!(id = %self.id, "exec_js on unrealized window ignored")
            }
            Lifecycle::Realized(proxy) => {
                proxy.fallible("exec_js", move |window| window.exec_js(&script))
            }
        }
    }

    /// Evaluate a script in the page and wait for its serialized result
    pub fn eval_js(&self, script: impl Into<String>, timeout: Duration) -> Result<String> {
        match &self.lifecycle {
            Lifecycle::Unrealized(_) => Err(AppError::NotRealized(self.id)),
            Lifecycle::Realized(proxy) => proxy.eval_js(script.into(), timeout),
        }
    }

    pub fn show(&self) {
        if let Lifecycle::Realized(proxy) = &self.lifecycle {
            proxy.command("show", |window| window.show());
        }
    }

    pub fn hide(&self) {
        if let Lifecycle::Realized(proxy) = &self.lifecycle {
            proxy.command("hide", |window| window.hide());
        }
    }

    pub fn reload(&self) {
        if let Lifecycle::Realized(proxy) = &self.lifecycle {
            proxy.fallible("reload", |window| window.reload());
        }
    }

    /// Destroy the native window
    ///
    /// Later commands are ignored and queries report a closed window.
    pub fn close(&self) {
        if let Lifecycle::Realized(proxy) = &self.lifecycle {
            let id = self.id;
            proxy.executor.submit(move |ctx| {
                if !ctx.close_window(id) {
                    tracing::debug!(%id, "window already closed");
                }
            });
        }
    }

    pub fn is_maximised(&self) -> Result<bool> {
        self.query_flag(|window| window.is_maximised())
    }

    pub fn is_minimised(&self) -> Result<bool> {
        self.query_flag(|window| window.is_minimised())
    }

    pub fn is_fullscreen(&self) -> Result<bool> {
        self.query_flag(|window| window.is_fullscreen())
    }

    /// Current title
    pub fn title(&self) -> Result<String> {
        match &self.lifecycle {
            Lifecycle::Unrealized(options) => Ok(options.title.clone()),
            Lifecycle::Realized(proxy) => proxy
                .query(|window| window.title())?
                .ok_or(AppError::WindowClosed(self.id)),
        }
    }

    /// Current size
    pub fn size(&self) -> Result<Size> {
        match &self.lifecycle {
            Lifecycle::Unrealized(options) => Ok(options.current_size()),
            Lifecycle::Realized(proxy) => proxy
                .query(|window| window.size())?
                .ok_or(AppError::WindowClosed(self.id)),
        }
    }

    fn query_flag<F>(&self, f: F) -> Result<bool>
    where
        F: FnOnce(&mut dyn NativeWindow) -> bool + Send + 'static,
    {
        match &self.lifecycle {
            Lifecycle::Unrealized(_) => Ok(false),
            Lifecycle::Realized(proxy) => Ok(proxy.query(f)?.unwrap_or(false)),
        }
    }
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("id", &self.id)
            .field("realized", &self.is_realized())
            .finish()
    }
}

/// Forwards commands to a realized window on the toolkit thread
struct WindowProxy {
    id: WindowId,
    executor: UiExecutor,
}

impl WindowProxy {
    fn command<F>(&self, name: &'static str, f: F)
    where
        F: FnOnce(&mut dyn NativeWindow) + Send + 'static,
    {
        let id = self.id;
        self.executor.submit(move |ctx| match ctx.window(id) {
            Some(window) => f(window),
            None => tracing::debug!(%id, command = name, "window closed, command ignored"),
        });
    }

    fn fallible<F>(&self, name: &'static str, f: F)
    where
        F: FnOnce(&mut dyn NativeWindow) -> weave_platform::Result<()> + Send + 'static,
    {
        let id = self.id;
        self.command(name, move |window| {
            if let Err(err) = f(window) {
                tracing::error!(%id, command = name, %err, "window command failed");
            }
        });
    }

    /// `None` when the native window is gone
    fn query<F, R>(&self, f: F) -> Result<Option<R>>
    where
        F: FnOnce(&mut dyn NativeWindow) -> R + Send + 'static,
        R: Send + 'static,
    {
        let id = self.id;
        Ok(self
            .executor
            .submit_blocking(move |ctx| ctx.window(id).map(f))?)
    }

    fn eval_js(&self, script: String, timeout: Duration) -> Result<String> {
        let reply: Arc<Handoff<String>> = Arc::new(Handoff::new());
        let slot = Arc::clone(&reply);
        let started = self.query(move |window| {
            window.eval_js(&script, Box::new(move |result| slot.put(result)))
        })?;

        match started {
            None => Err(AppError::WindowClosed(self.id)),
            Some(Err(err)) => Err(err.into()),
            Some(Ok(())) => reply
                .take_timeout(timeout)
                .ok_or(AppError::Platform(PlatformError::Timeout(timeout))),
        }
    }
}
