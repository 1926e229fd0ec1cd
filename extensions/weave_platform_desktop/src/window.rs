//! Desktop window: a winit window with a wry web view as its child

use parking_lot::Mutex;
use weave_platform::{
    NativeWindow, PlatformError, Result, Rgba, ScriptCallback, Size, StartState, WindowId,
    WindowOptions,
};
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event_loop::ActiveEventLoop;
use winit::window::{Fullscreen, Window as WinitWindow, WindowAttributes, WindowLevel};
use wry::{Rect, WebContext, WebView, WebViewBuilder};

/// Desktop window hosting a web view
///
/// The web view is dropped before the window that parents it.
pub struct DesktopWindow {
    webview: WebView,
    window: WinitWindow,
    id: WindowId,
    // winit has no getters for the size constraints
    min_size: Option<Size>,
    max_size: Option<Size>,
}

impl DesktopWindow {
    /// Create the window and its web view from `options`
    pub(crate) fn new(
        event_loop: &ActiveEventLoop,
        web_context: &mut WebContext,
        id: WindowId,
        options: &WindowOptions,
    ) -> Result<Self> {
        let size = options
            .current_size()
            .clamp(options.min_size, options.max_size);

        let mut attrs = WindowAttributes::default()
            .with_title(options.title.clone())
            .with_inner_size(LogicalSize::new(size.width, size.height))
            .with_resizable(options.resizable)
            .with_visible(false);

        if let Some(min) = options.min_size {
            attrs = attrs.with_min_inner_size(LogicalSize::new(min.width, min.height));
        }
        if let Some(max) = options.max_size {
            attrs = attrs.with_max_inner_size(LogicalSize::new(max.width, max.height));
        }
        if options.always_on_top {
            attrs = attrs.with_window_level(WindowLevel::AlwaysOnTop);
        }
        match options.start_state {
            StartState::Maximised => attrs = attrs.with_maximized(true),
            StartState::Fullscreen => {
                attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)))
            }
            StartState::Normal | StartState::Minimised => {}
        }

        let window = event_loop
            .create_window(attrs)
            .map_err(|e| PlatformError::WindowCreation(e.to_string()))?;

        let mut builder = WebViewBuilder::with_web_context(web_context)
            .with_url(options.url.as_str())
            .with_devtools(options.dev_tools)
            .with_bounds(webview_bounds(window.inner_size(), window.scale_factor()));
        if let Some(color) = options.background_color {
            builder = builder.with_background_color(color.to_tuple());
        }
        let webview = builder
            .build_as_child(&window)
            .map_err(|e| PlatformError::WebView(e.to_string()))?;

        if options.start_state == StartState::Minimised {
            window.set_minimized(true);
        }
        window.set_visible(true);

        tracing::debug!(%id, native = ?window.id(), "desktop window created");
        Ok(Self {
            webview,
            window,
            id,
            min_size: options.min_size,
            max_size: options.max_size,
        })
    }

    /// Get the underlying winit window
    pub fn winit_window(&self) -> &WinitWindow {
        &self.window
    }

    /// Get the hosted web view
    pub fn webview(&self) -> &WebView {
        &self.webview
    }

    /// Stretch the web view over the client area after a resize
    pub(crate) fn sync_bounds(&self) {
        let bounds = webview_bounds(self.window.inner_size(), self.window.scale_factor());
        if let Err(e) = self.webview.set_bounds(bounds) {
            tracing::warn!(id = %self.id, "failed to resize web view: {}", e);
        }
    }

    fn logical_size(&self) -> Size {
        let size: LogicalSize<u32> = self
            .window
            .inner_size()
            .to_logical(self.window.scale_factor());
        Size::new(size.width, size.height)
    }
}

/// Bounds covering the whole client area, in logical pixels
fn webview_bounds(inner: PhysicalSize<u32>, scale_factor: f64) -> Rect {
    let size: LogicalSize<f64> = inner.to_logical(scale_factor);
    Rect {
        position: wry::dpi::LogicalPosition::new(0.0, 0.0).into(),
        size: wry::dpi::LogicalSize::new(size.width, size.height).into(),
    }
}

fn webview_error(e: wry::Error) -> PlatformError {
    PlatformError::WebView(e.to_string())
}

impl NativeWindow for DesktopWindow {
    fn show(&mut self) {
        self.window.set_visible(true);
    }

    fn hide(&mut self) {
        self.window.set_visible(false);
    }

    fn title(&self) -> String {
        self.window.title()
    }

    fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }

    fn size(&self) -> Size {
        self.logical_size()
    }

    fn set_size(&mut self, size: Size) {
        if self
            .window
            .request_inner_size(LogicalSize::new(size.width, size.height))
            .is_some()
        {
            self.sync_bounds();
        }
    }

    fn min_size(&self) -> Option<Size> {
        self.min_size
    }

    fn max_size(&self) -> Option<Size> {
        self.max_size
    }

    fn set_min_size(&mut self, size: Size) {
        self.min_size = Some(size);
        self.window
            .set_min_inner_size(Some(LogicalSize::new(size.width, size.height)));
    }

    fn set_max_size(&mut self, size: Size) {
        self.max_size = Some(size);
        self.window
            .set_max_inner_size(Some(LogicalSize::new(size.width, size.height)));
    }

    fn set_always_on_top(&mut self, always_on_top: bool) {
        self.window.set_window_level(if always_on_top {
            WindowLevel::AlwaysOnTop
        } else {
            WindowLevel::Normal
        });
    }

    fn set_resizable(&mut self, resizable: bool) {
        self.window.set_resizable(resizable);
    }

    fn navigate(&mut self, url: &str) -> Result<()> {
        self.webview.load_url(url).map_err(webview_error)
    }

    fn reload(&mut self) -> Result<()> {
        self.webview.reload().map_err(webview_error)
    }

    fn open_dev_tools(&mut self) {
        self.webview.open_devtools();
    }

    fn exec_js(&mut self, script: &str) -> Result<()> {
        self.webview.evaluate_script(script).map_err(webview_error)
    }

    fn eval_js(&mut self, script: &str, callback: ScriptCallback) -> Result<()> {
        // wry wants a reusable callback; the result arrives once
        let callback = Mutex::new(Some(callback));
        self.webview
            .evaluate_script_with_callback(script, move |result| {
                if let Some(callback) = callback.lock().take() {
                    callback(result);
                }
            })
            .map_err(webview_error)
    }

    fn set_maximised(&mut self) {
        self.window.set_fullscreen(None);
        self.window.set_maximized(true);
    }

    fn set_minimised(&mut self) {
        self.window.set_minimized(true);
    }

    fn set_fullscreen(&mut self) {
        self.window
            .set_fullscreen(Some(Fullscreen::Borderless(None)));
    }

    fn restore(&mut self) {
        self.window.set_fullscreen(None);
        self.window.set_minimized(false);
        self.window.set_maximized(false);
    }

    fn is_maximised(&self) -> bool {
        self.window.is_maximized()
    }

    fn is_minimised(&self) -> bool {
        self.window.is_minimized().unwrap_or(false)
    }

    fn is_fullscreen(&self) -> bool {
        self.window.fullscreen().is_some()
    }

    fn set_background_color(&mut self, color: Rgba) {
        if let Err(e) = self.webview.set_background_color(color.to_tuple()) {
            tracing::warn!(id = %self.id, "failed to set background colour: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webview_bounds_are_logical() {
        let bounds = webview_bounds(PhysicalSize::new(1600, 1200), 2.0);
        let size: wry::dpi::LogicalSize<f64> = bounds.size.to_logical(2.0);
        assert_eq!(size, wry::dpi::LogicalSize::new(800.0, 600.0));
        let position: wry::dpi::LogicalPosition<f64> = bounds.position.to_logical(2.0);
        assert_eq!(position, wry::dpi::LogicalPosition::new(0.0, 0.0));
    }
}
