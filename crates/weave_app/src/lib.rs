//! Weave Application Framework
//!
//! Drives a native toolkit from an ordinary program: the toolkit's event
//! loop lives on its own thread, windows are configured before they exist,
//! and every native call is marshalled onto that thread.
//!
//! # Example
//!
//! ```ignore
//! use weave_app::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let app = Application::create(DesktopToolkit::new(), ApplicationOptions::new("notes"))?;
//!
//!     let mut window = app.new_window(WindowOptions::new("Notes"));
//!     window.set_min_size(400, 300);
//!     window.navigate_to_url("http://localhost:34115");
//!     window.run()?;
//!
//!     window.set_maximised();
//!     app.join()
//! }
//! ```

mod application;
mod config;
mod error;
mod window;

#[cfg(test)]
mod tests;

pub use application::Application;
pub use config::AppConfig;
pub use error::{AppError, Result};
pub use window::Window;

// Re-export platform types used in the public API
pub use weave_platform::{
    ActivationPolicy, ApplicationOptions, DisplayInfo, LinuxOptions, MacOptions, PlatformError,
    Rgba, Size, StartState, Toolkit, UiContext, UiExecutor, WindowId, WindowOptions,
    WindowsOptions, WndProcInterceptor,
};

#[cfg(feature = "headless")]
pub use weave_platform_headless::HeadlessToolkit;

#[cfg(all(
    feature = "desktop",
    not(any(target_os = "android", target_os = "ios"))
))]
pub use weave_platform_desktop::DesktopToolkit;

/// Prelude module - import everything commonly needed
pub mod prelude {
    pub use crate::application::Application;
    pub use crate::config::AppConfig;
    pub use crate::error::{AppError, Result};
    pub use crate::window::Window;

    pub use weave_platform::{
        ApplicationOptions, DisplayInfo, Rgba, Size, StartState, WindowOptions,
    };

    #[cfg(feature = "headless")]
    pub use weave_platform_headless::HeadlessToolkit;

    #[cfg(all(
        feature = "desktop",
        not(any(target_os = "android", target_os = "ios"))
    ))]
    pub use weave_platform_desktop::DesktopToolkit;
}
