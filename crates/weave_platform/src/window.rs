//! Window abstraction and configuration

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a window for the lifetime of an application
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

/// A width/height pair in logical pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Clamp both dimensions into `[min, max]`, bounds being optional
    pub fn clamp(self, min: Option<Size>, max: Option<Size>) -> Self {
        let mut out = self;
        if let Some(max) = max {
            out.width = out.width.min(max.width);
            out.height = out.height.min(max.height);
        }
        if let Some(min) = min {
            out.width = out.width.max(min.width);
            out.height = out.height.max(min.height);
        }
        out
    }

    /// Each dimension raised to at least `floor`
    pub fn grow_to(self, floor: Size) -> Self {
        Size::new(self.width.max(floor.width), self.height.max(floor.height))
    }

    /// Each dimension lowered to at most `ceiling`
    pub fn shrink_to(self, ceiling: Size) -> Self {
        Size::new(self.width.min(ceiling.width), self.height.min(ceiling.height))
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// 8-bit RGBA colour
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    255
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub fn to_tuple(self) -> (u8, u8, u8, u8) {
        (self.r, self.g, self.b, self.a)
    }
}

/// State a window is shown in when it is realized
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartState {
    #[default]
    Normal,
    Maximised,
    Minimised,
    Fullscreen,
}

/// Window configuration
///
/// Owned by a window until it is realized; afterwards only a snapshot of
/// what the native window was created from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowOptions {
    /// Window title
    pub title: String,
    /// Initial width in logical pixels
    pub width: u32,
    /// Initial height in logical pixels
    pub height: u32,
    /// Smallest size the user may resize to
    pub min_size: Option<Size>,
    /// Largest size the user may resize to
    pub max_size: Option<Size>,
    /// Whether the window can be resized
    pub resizable: bool,
    /// Whether the window stays above other windows
    pub always_on_top: bool,
    /// State the window is shown in
    pub start_state: StartState,
    /// Web view background colour
    pub background_color: Option<Rgba>,
    /// Whether the web view's developer tools are available
    pub dev_tools: bool,
    /// URL the web view loads first
    pub url: String,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            title: "Weave".to_string(),
            width: 800,
            height: 600,
            min_size: None,
            max_size: None,
            resizable: true,
            always_on_top: false,
            start_state: StartState::Normal,
            background_color: None,
            dev_tools: false,
            url: "about:blank".to_string(),
        }
    }
}

impl WindowOptions {
    /// Create window options with a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set the window title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the window size
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the URL loaded on realization
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set whether the window is resizable
    pub fn resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    /// Set whether the window is always on top
    pub fn always_on_top(mut self, always_on_top: bool) -> Self {
        self.always_on_top = always_on_top;
        self
    }

    /// Set the state the window starts in
    pub fn start_state(mut self, state: StartState) -> Self {
        self.start_state = state;
        self
    }

    /// Set the web view background colour
    pub fn background_color(mut self, color: Rgba) -> Self {
        self.background_color = Some(color);
        self
    }

    /// Enable developer tools
    pub fn dev_tools(mut self, enabled: bool) -> Self {
        self.dev_tools = enabled;
        self
    }

    /// Current size as a [`Size`]
    pub fn current_size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Apply a minimum size and clamp the current size into range
    ///
    /// A minimum larger than the current maximum raises the maximum with it.
    pub fn apply_min_size(&mut self, min: Size) {
        self.min_size = Some(min);
        self.max_size = self.max_size.map(|max| max.grow_to(min));
        self.clamp_size();
    }

    /// Apply a maximum size and clamp the current size into range
    ///
    /// A maximum smaller than the current minimum lowers the minimum with it.
    pub fn apply_max_size(&mut self, max: Size) {
        self.max_size = Some(max);
        self.min_size = self.min_size.map(|min| min.shrink_to(max));
        self.clamp_size();
    }

    fn clamp_size(&mut self) {
        let size = self.current_size().clamp(self.min_size, self.max_size);
        self.width = size.width;
        self.height = size.height;
    }
}

/// Callback receiving the serialized result of a script evaluation
pub type ScriptCallback = Box<dyn FnOnce(String) + Send>;

/// Native window capability contract
///
/// Implemented by each toolkit backend for its window + web view pair.
/// Instances live on the toolkit thread and are only reachable through
/// [`UiContext::window`](crate::UiContext::window), so implementations never
/// need to be `Send`.
pub trait NativeWindow {
    /// Make the window visible
    fn show(&mut self);

    /// Hide the window
    fn hide(&mut self);

    /// Current title
    fn title(&self) -> String;

    /// Set the window title
    fn set_title(&mut self, title: &str);

    /// Current inner size in logical pixels
    fn size(&self) -> Size;

    /// Resize the window
    fn set_size(&mut self, size: Size);

    /// Current minimum inner size, if any
    fn min_size(&self) -> Option<Size>;

    /// Current maximum inner size, if any
    fn max_size(&self) -> Option<Size>;

    /// Set the minimum inner size
    fn set_min_size(&mut self, size: Size);

    /// Set the maximum inner size
    fn set_max_size(&mut self, size: Size);

    /// Keep the window above others
    fn set_always_on_top(&mut self, always_on_top: bool);

    /// Allow or forbid user resizing
    fn set_resizable(&mut self, resizable: bool);

    /// Load a URL in the web view
    fn navigate(&mut self, url: &str) -> Result<()>;

    /// Reload the current page
    fn reload(&mut self) -> Result<()>;

    /// Open the web view's developer tools
    fn open_dev_tools(&mut self);

    /// Run a script in the page without waiting for its result
    fn exec_js(&mut self, script: &str) -> Result<()>;

    /// Run a script and hand its serialized result to `callback`
    ///
    /// The callback may run later on the toolkit thread, after this method
    /// has returned.
    fn eval_js(&mut self, script: &str, callback: ScriptCallback) -> Result<()>;

    /// Maximise the window
    fn set_maximised(&mut self);

    /// Minimise the window
    fn set_minimised(&mut self);

    /// Make the window fullscreen
    fn set_fullscreen(&mut self);

    /// Return the window to its normal state
    fn restore(&mut self);

    fn is_maximised(&self) -> bool;

    fn is_minimised(&self) -> bool;

    fn is_fullscreen(&self) -> bool;

    /// Set the web view background colour
    fn set_background_color(&mut self, color: Rgba);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_size_grows_current_size() {
        let mut options = WindowOptions::default().size(100, 100);
        options.apply_min_size(Size::new(300, 50));
        assert_eq!(options.current_size(), Size::new(300, 100));
        assert_eq!(options.min_size, Some(Size::new(300, 50)));
    }

    #[test]
    fn test_max_size_below_min_keeps_range_valid() {
        let mut options = WindowOptions::default().size(500, 500);
        options.apply_min_size(Size::new(400, 400));
        options.apply_max_size(Size::new(200, 600));

        let min = options.min_size.unwrap();
        let max = options.max_size.unwrap();
        assert!(min.width <= options.width && options.width <= max.width);
        assert!(min.height <= options.height && options.height <= max.height);
        assert_eq!(options.width, 200);
        assert_eq!(options.height, 500);
    }

    #[test]
    fn test_min_size_above_max_raises_max() {
        let mut options = WindowOptions::default().size(100, 100);
        options.apply_max_size(Size::new(150, 150));
        options.apply_min_size(Size::new(400, 120));

        assert_eq!(options.max_size, Some(Size::new(400, 150)));
        assert_eq!(options.current_size(), Size::new(400, 120));
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: WindowOptions = toml::from_str(
            r#"
            title = "Main"
            width = 1024
            start_state = "maximised"
            background_color = { r = 10, g = 20, b = 30 }
            "#,
        )
        .unwrap();

        assert_eq!(options.title, "Main");
        assert_eq!(options.width, 1024);
        assert_eq!(options.height, 600);
        assert_eq!(options.start_state, StartState::Maximised);
        assert_eq!(options.background_color, Some(Rgba::rgb(10, 20, 30)));
        assert!(options.resizable);
    }
}
