//! Weave Desktop Platform
//!
//! Native windows for Windows and Linux using winit, each hosting a wry
//! web view as a child that tracks the window's client area.
//!
//! This crate implements the `weave_platform` toolkit contract. The event
//! loop is created and run on the application's toolkit thread, which is
//! never the process main thread; on Linux that means an X11 event loop
//! with GTK pumped alongside it for WebKitGTK.
//!
//! macOS only allows AppKit on the main thread, so creating the event loop
//! there fails with [`weave_platform::PlatformError::Unsupported`].
//!
//! # Example
//!
//! ```ignore
//! use weave_app::prelude::*;
//! use weave_platform_desktop::DesktopToolkit;
//!
//! let app = Application::create(DesktopToolkit::new(), ApplicationOptions::new("notes"))?;
//! let mut window = app.new_window(WindowOptions::new("Notes").url("https://example.com"));
//! window.run()?;
//! app.join()?;
//! ```

pub mod event_loop;
pub mod window;

pub use event_loop::{DesktopContext, DesktopEventLoop};
pub use window::DesktopWindow;

#[cfg(any(target_os = "linux", target_os = "macos"))]
use weave_platform::PlatformError;
use weave_platform::{ApplicationOptions, Result, Toolkit};

/// Desktop toolkit implementation
///
/// winit allows one event loop per process; creating a second application
/// while the first is alive fails during startup.
#[derive(Clone, Copy, Debug, Default)]
pub struct DesktopToolkit;

impl DesktopToolkit {
    pub fn new() -> Self {
        Self
    }
}

impl Toolkit for DesktopToolkit {
    type EventLoop = DesktopEventLoop;

    fn name(&self) -> &'static str {
        "desktop"
    }

    fn create_event_loop(self, options: &ApplicationOptions) -> Result<Self::EventLoop> {
        #[cfg(target_os = "macos")]
        if objc2::MainThreadMarker::new().is_none() {
            return Err(PlatformError::Unsupported(
                "AppKit can only be driven from the main thread".to_string(),
            ));
        }

        #[cfg(target_os = "linux")]
        gtk::init().map_err(|e| PlatformError::InitFailed(format!("GTK: {e}")))?;

        #[cfg(target_os = "windows")]
        if let Some(path) = &options.windows.webview_browser_path {
            std::env::set_var("WEBVIEW2_BROWSER_EXECUTABLE_FOLDER", path);
        }

        let event_loop = DesktopEventLoop::new(options)?;
        tracing::info!(app = %options.name, "desktop toolkit initialised");
        Ok(event_loop)
    }
}

