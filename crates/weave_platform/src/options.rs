//! Application options and per-OS configuration blocks
//!
//! These are read once, when the toolkit creates its event loop, and handed
//! to the backend as-is. Nothing here is validated by the core.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Hook called for every message of the Windows message loop
///
/// Receives `(hwnd, msg, wparam, lparam)`. Returning `Some(code)` swallows
/// the message; `None` lets the loop process it normally.
pub type WndProcInterceptor = Arc<dyn Fn(usize, u32, usize, isize) -> Option<isize> + Send + Sync>;

/// Top-level application options
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationOptions {
    /// Application name, also used to name the toolkit thread
    pub name: String,
    /// Short description shown in about boxes
    pub description: String,
    /// Upper bound on toolkit startup; unbounded when `None`
    #[serde(with = "millis", rename = "startup_timeout_ms")]
    pub startup_timeout: Option<Duration>,
    /// macOS specific options
    pub mac: MacOptions,
    /// Windows specific options
    pub windows: WindowsOptions,
    /// Linux specific options
    pub linux: LinuxOptions,
}

impl Default for ApplicationOptions {
    fn default() -> Self {
        Self {
            name: "weave".to_string(),
            description: String::new(),
            startup_timeout: Some(Duration::from_secs(10)),
            mac: MacOptions::default(),
            windows: WindowsOptions::default(),
            linux: LinuxOptions::default(),
        }
    }
}

impl ApplicationOptions {
    /// Create options with an application name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the startup timeout (`None` waits forever)
    pub fn startup_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.startup_timeout = timeout;
        self
    }

    /// Whether closing the last window should quit, for the current target
    pub fn quit_on_last_window_closed(&self) -> bool {
        if cfg!(target_os = "macos") {
            self.mac.terminate_after_last_window_closed
        } else if cfg!(target_os = "windows") {
            !self.windows.disable_quit_on_last_window_closed
        } else {
            !self.linux.disable_quit_on_last_window_closed
        }
    }
}

/// macOS activation policy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationPolicy {
    /// Ordinary application with a user interface
    #[default]
    Regular,
    /// No main window, e.g. tray or background applications
    Accessory,
    /// Never activates
    Prohibited,
}

/// macOS options
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MacOptions {
    pub activation_policy: ActivationPolicy,
    /// Terminate once the last window has been closed
    pub terminate_after_last_window_closed: bool,
}

/// Windows options
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowsOptions {
    /// Keep running after the last window has been closed
    pub disable_quit_on_last_window_closed: bool,
    /// Where the web view stores user data
    pub webview_user_data_path: Option<PathBuf>,
    /// Directory holding the web view runtime executables
    pub webview_browser_path: Option<PathBuf>,
    /// Message loop hook
    #[serde(skip)]
    pub wnd_proc_interceptor: Option<WndProcInterceptor>,
}

impl fmt::Debug for WindowsOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowsOptions")
            .field(
                "disable_quit_on_last_window_closed",
                &self.disable_quit_on_last_window_closed,
            )
            .field("webview_user_data_path", &self.webview_user_data_path)
            .field("webview_browser_path", &self.webview_browser_path)
            .field(
                "wnd_proc_interceptor",
                &self.wnd_proc_interceptor.as_ref().map(|_| "<fn>"),
            )
            .finish()
    }
}

/// Linux options
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinuxOptions {
    /// Keep running after the last window has been closed
    pub disable_quit_on_last_window_closed: bool,
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&(d.as_millis() as u64)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_platform_blocks() {
        let options: ApplicationOptions = toml::from_str(
            r#"
            name = "demo"
            startup_timeout_ms = 2500

            [mac]
            activation_policy = "accessory"

            [windows]
            webview_user_data_path = "C:/data/demo"

            [linux]
            disable_quit_on_last_window_closed = true
            "#,
        )
        .unwrap();

        assert_eq!(options.name, "demo");
        assert_eq!(options.startup_timeout, Some(Duration::from_millis(2500)));
        assert_eq!(options.mac.activation_policy, ActivationPolicy::Accessory);
        assert_eq!(
            options.windows.webview_user_data_path,
            Some(PathBuf::from("C:/data/demo"))
        );
        assert!(options.linux.disable_quit_on_last_window_closed);
        assert!(options.windows.wnd_proc_interceptor.is_none());
    }

    #[test]
    fn test_defaults_quit_on_last_window_closed_off_macos() {
        let options = ApplicationOptions::default();
        assert_eq!(
            options.quit_on_last_window_closed(),
            !cfg!(target_os = "macos")
        );
    }
}
