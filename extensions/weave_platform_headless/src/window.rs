//! In-memory native window

use crate::journal::{Journal, NativeCall};
use crate::ScriptHandler;
use weave_platform::{
    NativeWindow, PlatformError, Result, Rgba, ScriptCallback, Size, StartState, WindowId,
    WindowOptions,
};

/// Headless window + page
///
/// Behaves like a well-mannered window manager: sizes are clamped into the
/// min/max bounds and the maximised/minimised/fullscreen states are
/// mutually exclusive.
pub struct HeadlessWindow {
    id: WindowId,
    title: String,
    size: Size,
    min_size: Option<Size>,
    max_size: Option<Size>,
    resizable: bool,
    always_on_top: bool,
    state: StartState,
    visible: bool,
    background_color: Option<Rgba>,
    dev_tools_enabled: bool,
    history: Vec<String>,
    scripts: Vec<String>,
    script_handler: Option<ScriptHandler>,
    journal: Journal,
}

impl HeadlessWindow {
    pub(crate) fn new(
        id: WindowId,
        options: &WindowOptions,
        script_handler: Option<ScriptHandler>,
        journal: Journal,
    ) -> Self {
        Self {
            id,
            title: options.title.clone(),
            size: options
                .current_size()
                .clamp(options.min_size, options.max_size),
            min_size: options.min_size,
            max_size: options.max_size,
            resizable: options.resizable,
            always_on_top: options.always_on_top,
            state: options.start_state,
            visible: true,
            background_color: options.background_color,
            dev_tools_enabled: options.dev_tools,
            history: vec![options.url.clone()],
            scripts: Vec::new(),
            script_handler,
            journal,
        }
    }

    fn record(&self, call: String) {
        self.journal.record(NativeCall::Command {
            window: self.id,
            call,
        });
    }

    /// URL currently loaded
    pub fn url(&self) -> &str {
        self.history.last().map(String::as_str).unwrap_or("")
    }

    /// Every URL loaded, oldest first
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Scripts run in the page, oldest first
    pub fn scripts(&self) -> &[String] {
        &self.scripts
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Current state expressed as the options it would be recreated from
    pub fn snapshot(&self) -> WindowOptions {
        WindowOptions {
            title: self.title.clone(),
            width: self.size.width,
            height: self.size.height,
            min_size: self.min_size,
            max_size: self.max_size,
            resizable: self.resizable,
            always_on_top: self.always_on_top,
            start_state: self.state,
            background_color: self.background_color,
            dev_tools: self.dev_tools_enabled,
            url: self.url().to_string(),
        }
    }
}

impl NativeWindow for HeadlessWindow {
    fn show(&mut self) {
        self.record("show".into());
        self.visible = true;
    }

    fn hide(&mut self) {
        self.record("hide".into());
        self.visible = false;
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn set_title(&mut self, title: &str) {
        self.record(format!("set_title {title}"));
        self.title = title.to_string();
    }

    fn size(&self) -> Size {
        self.size
    }

    fn set_size(&mut self, size: Size) {
        self.record(format!("set_size {size}"));
        self.size = size.clamp(self.min_size, self.max_size);
    }

    fn min_size(&self) -> Option<Size> {
        self.min_size
    }

    fn max_size(&self) -> Option<Size> {
        self.max_size
    }

    fn set_min_size(&mut self, size: Size) {
        self.record(format!("set_min_size {size}"));
        self.min_size = Some(size);
        self.size = self.size.clamp(self.min_size, self.max_size);
    }

    fn set_max_size(&mut self, size: Size) {
        self.record(format!("set_max_size {size}"));
        self.max_size = Some(size);
        self.size = self.size.clamp(self.min_size, self.max_size);
    }

    fn set_always_on_top(&mut self, always_on_top: bool) {
        self.record(format!("set_always_on_top {always_on_top}"));
        self.always_on_top = always_on_top;
    }

    fn set_resizable(&mut self, resizable: bool) {
        self.record(format!("set_resizable {resizable}"));
        self.resizable = resizable;
    }

    fn navigate(&mut self, url: &str) -> Result<()> {
        self.record(format!("navigate {url}"));
        if url.trim().is_empty() {
            return Err(PlatformError::WebView("cannot navigate to an empty URL".into()));
        }
        self.history.push(url.to_string());
        Ok(())
    }

    fn reload(&mut self) -> Result<()> {
        self.record("reload".into());
        Ok(())
    }

    fn open_dev_tools(&mut self) {
        self.record("open_dev_tools".into());
        self.dev_tools_enabled = true;
    }

    fn exec_js(&mut self, script: &str) -> Result<()> {
        self.record(format!("exec_js {script}"));
        self.scripts.push(script.to_string());
        Ok(())
    }

    fn eval_js(&mut self, script: &str, callback: ScriptCallback) -> Result<()> {
        self.record(format!("eval_js {script}"));
        self.scripts.push(script.to_string());
        let result = match &self.script_handler {
            Some(handler) => handler(script),
            None => "null".to_string(),
        };
        callback(result);
        Ok(())
    }

    fn set_maximised(&mut self) {
        self.record("set_maximised".into());
        self.state = StartState::Maximised;
    }

    fn set_minimised(&mut self) {
        self.record("set_minimised".into());
        self.state = StartState::Minimised;
    }

    fn set_fullscreen(&mut self) {
        self.record("set_fullscreen".into());
        self.state = StartState::Fullscreen;
    }

    fn restore(&mut self) {
        self.record("restore".into());
        self.state = StartState::Normal;
    }

    fn is_maximised(&self) -> bool {
        self.state == StartState::Maximised
    }

    fn is_minimised(&self) -> bool {
        self.state == StartState::Minimised
    }

    fn is_fullscreen(&self) -> bool {
        self.state == StartState::Fullscreen
    }

    fn set_background_color(&mut self, color: Rgba) {
        self.record(format!(
            "set_background_color {},{},{},{}",
            color.r, color.g, color.b, color.a
        ));
        self.background_color = Some(color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(options: WindowOptions) -> HeadlessWindow {
        HeadlessWindow::new(WindowId(1), &options, None, Journal::default())
    }

    #[test]
    fn test_size_respects_bounds() {
        let mut window = window(WindowOptions::default().size(400, 300));
        window.set_max_size(Size::new(350, 350));
        assert_eq!(window.size(), Size::new(350, 300));

        window.set_size(Size::new(10, 10));
        window.set_min_size(Size::new(100, 50));
        assert_eq!(window.size(), Size::new(100, 50));
    }

    #[test]
    fn test_bounds_are_reported() {
        let mut options = WindowOptions::default();
        options.apply_min_size(Size::new(200, 100));
        let mut window = window(options);
        assert_eq!(window.min_size(), Some(Size::new(200, 100)));
        assert_eq!(window.max_size(), None);

        window.set_max_size(Size::new(900, 700));
        assert_eq!(window.max_size(), Some(Size::new(900, 700)));
    }

    #[test]
    fn test_states_are_exclusive() {
        let mut window = window(WindowOptions::default());
        window.set_maximised();
        window.set_fullscreen();
        assert!(window.is_fullscreen());
        assert!(!window.is_maximised());

        window.restore();
        assert!(!window.is_fullscreen());
        assert!(!window.is_minimised());
    }

    #[test]
    fn test_eval_without_handler_yields_null() {
        let mut window = window(WindowOptions::default());
        let (tx, rx) = std::sync::mpsc::channel();
        window
            .eval_js("1 + 1", Box::new(move |result| tx.send(result).unwrap()))
            .unwrap();
        assert_eq!(rx.recv().unwrap(), "null");
        assert_eq!(window.scripts(), ["1 + 1".to_string()]);
    }

    #[test]
    fn test_snapshot_reflects_live_state() {
        let mut window = window(WindowOptions::new("A").dev_tools(false));
        window.set_title("B");
        window.set_size(Size::new(640, 480));
        window.set_maximised();
        window.open_dev_tools();
        window.hide();

        let snapshot = window.snapshot();
        assert_eq!(snapshot.title, "B");
        assert_eq!(snapshot.current_size(), Size::new(640, 480));
        assert_eq!(snapshot.start_state, StartState::Maximised);
        assert!(snapshot.dev_tools);
        assert!(!window.is_visible());
    }

    #[test]
    fn test_navigate_rejects_empty_url() {
        let mut window = window(WindowOptions::default().url("http://localhost:34115"));
        assert!(window.navigate("  ").is_err());
        window.navigate("http://localhost:34115/about").unwrap();
        assert_eq!(window.url(), "http://localhost:34115/about");
        assert_eq!(window.history().len(), 2);
    }
}
