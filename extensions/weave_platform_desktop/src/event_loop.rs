//! Desktop event loop implementation using winit

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
#[cfg(target_os = "linux")]
use std::time::{Duration, Instant};

use weave_platform::{
    ApplicationOptions, DisplayInfo, EventLoop, JobQueue, LoopWaker, NativeWindow, PlatformError,
    Result, Size, UiContext, WindowId, WindowOptions,
};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent as WinitWindowEvent;
#[cfg(target_os = "linux")]
use winit::event_loop::ControlFlow;
use winit::event_loop::{ActiveEventLoop, EventLoop as WinitEventLoop, EventLoopProxy};
use wry::WebContext;

use crate::window::DesktopWindow;

/// How often GTK gets serviced while winit is idle
#[cfg(target_os = "linux")]
const GTK_PUMP_INTERVAL: Duration = Duration::from_millis(16);

/// Events posted to the winit loop from other threads
#[derive(Debug, Clone, Copy)]
pub enum UserEvent {
    /// Jobs are waiting in the queue
    Wake,
}

/// Desktop event loop wrapping winit's event loop
pub struct DesktopEventLoop {
    event_loop: WinitEventLoop<UserEvent>,
    web_context: WebContext,
    quit_on_last_window_closed: bool,
}

impl DesktopEventLoop {
    /// Create the winit event loop on the calling thread
    pub(crate) fn new(options: &ApplicationOptions) -> Result<Self> {
        let mut builder = WinitEventLoop::<UserEvent>::with_user_event();

        #[cfg(target_os = "linux")]
        {
            // wry can only parent a web view into an X11 window
            use winit::platform::x11::EventLoopBuilderExtX11;
            builder.with_x11();
            builder.with_any_thread(true);
        }

        #[cfg(target_os = "windows")]
        {
            use winit::platform::windows::EventLoopBuilderExtWindows;
            builder.with_any_thread(true);
            if let Some(interceptor) = options.windows.wnd_proc_interceptor.clone() {
                builder.with_msg_hook(move |msg| {
                    // SAFETY: winit hands the hook a pointer to the MSG being dispatched
                    let msg = unsafe { &*(msg as *const windows::Win32::UI::WindowsAndMessaging::MSG) };
                    interceptor(msg.hwnd.0 as usize, msg.message, msg.wParam.0, msg.lParam.0)
                        .is_some()
                });
            }
        }

        #[cfg(target_os = "macos")]
        {
            use weave_platform::ActivationPolicy;
            use winit::platform::macos::{ActivationPolicy as MacPolicy, EventLoopBuilderExtMacOS};
            builder.with_activation_policy(match options.mac.activation_policy {
                ActivationPolicy::Regular => MacPolicy::Regular,
                ActivationPolicy::Accessory => MacPolicy::Accessory,
                ActivationPolicy::Prohibited => MacPolicy::Prohibited,
            });
        }

        let event_loop = builder
            .build()
            .map_err(|e| PlatformError::EventLoop(e.to_string()))?;

        let web_context = WebContext::new(options.windows.webview_user_data_path.clone());

        Ok(Self {
            event_loop,
            web_context,
            quit_on_last_window_closed: options.quit_on_last_window_closed(),
        })
    }
}

impl EventLoop for DesktopEventLoop {
    fn waker(&self) -> Arc<dyn LoopWaker> {
        Arc::new(DesktopWaker {
            proxy: self.event_loop.create_proxy(),
        })
    }

    fn run(self, jobs: JobQueue) -> Result<()> {
        let mut app = DesktopApp {
            jobs,
            state: DesktopState {
                windows: BTreeMap::new(),
                native_ids: HashMap::new(),
                web_context: self.web_context,
                quit_on_last_window_closed: self.quit_on_last_window_closed,
            },
        };
        let result = self
            .event_loop
            .run_app(&mut app)
            .map_err(|e| PlatformError::EventLoop(e.to_string()));

        let open = app.state.windows.len();
        app.state.windows.clear();
        tracing::debug!(open, "desktop event loop finished");
        result
    }
}

/// Wakes the winit loop by posting a user event
struct DesktopWaker {
    proxy: EventLoopProxy<UserEvent>,
}

impl LoopWaker for DesktopWaker {
    fn wake(&self) {
        if self.proxy.send_event(UserEvent::Wake).is_err() {
            tracing::trace!("wake after event loop closed");
        }
    }
}

/// Toolkit-thread state that outlives individual callbacks
struct DesktopState {
    windows: BTreeMap<WindowId, DesktopWindow>,
    native_ids: HashMap<winit::window::WindowId, WindowId>,
    web_context: WebContext,
    quit_on_last_window_closed: bool,
}

impl DesktopState {
    fn close(&mut self, event_loop: &ActiveEventLoop, id: WindowId) -> bool {
        let Some(window) = self.windows.remove(&id) else {
            return false;
        };
        self.native_ids.remove(&window.winit_window().id());
        drop(window);
        tracing::debug!(%id, "desktop window closed");

        if self.windows.is_empty() && self.quit_on_last_window_closed {
            tracing::info!("last window closed, exiting");
            event_loop.exit();
        }
        true
    }
}

/// What a job sees while it runs inside a winit callback
pub struct DesktopContext<'a> {
    event_loop: &'a ActiveEventLoop,
    state: &'a mut DesktopState,
}

impl DesktopContext<'_> {
    /// The active winit loop, for native calls the contract does not cover
    pub fn active_event_loop(&self) -> &ActiveEventLoop {
        self.event_loop
    }
}

impl UiContext for DesktopContext<'_> {
    fn toolkit_name(&self) -> &'static str {
        "desktop"
    }

    fn create_window(&mut self, id: WindowId, options: &WindowOptions) -> Result<()> {
        if self.state.windows.contains_key(&id) {
            return Err(PlatformError::WindowCreation(format!(
                "{id} already has a native window"
            )));
        }
        let window =
            DesktopWindow::new(self.event_loop, &mut self.state.web_context, id, options)?;
        self.state
            .native_ids
            .insert(window.winit_window().id(), id);
        self.state.windows.insert(id, window);
        Ok(())
    }

    fn window(&mut self, id: WindowId) -> Option<&mut dyn NativeWindow> {
        self.state
            .windows
            .get_mut(&id)
            .map(|window| window as &mut dyn NativeWindow)
    }

    fn close_window(&mut self, id: WindowId) -> bool {
        self.state.close(self.event_loop, id)
    }

    fn window_ids(&self) -> Vec<WindowId> {
        self.state.windows.keys().copied().collect()
    }

    fn displays(&self) -> Vec<DisplayInfo> {
        let primary = self.event_loop.primary_monitor();
        let current = self
            .state
            .windows
            .values()
            .find(|window| window.winit_window().has_focus())
            .and_then(|window| window.winit_window().current_monitor());

        self.event_loop
            .available_monitors()
            .map(|monitor| {
                let size = monitor.size();
                let mut info = DisplayInfo::from_physical(
                    monitor.name(),
                    Size::new(size.width, size.height),
                    monitor.scale_factor(),
                );
                info.is_primary = primary.as_ref() == Some(&monitor);
                info.is_current = current.as_ref() == Some(&monitor);
                info
            })
            .collect()
    }

    fn quit(&mut self) {
        self.event_loop.exit();
    }
}

/// Internal winit application handler
struct DesktopApp {
    jobs: JobQueue,
    state: DesktopState,
}

impl DesktopApp {
    fn run_jobs(&mut self, event_loop: &ActiveEventLoop) {
        let mut ctx = DesktopContext {
            event_loop,
            state: &mut self.state,
        };
        let ran = self.jobs.drain(&mut ctx);
        if ran > 0 {
            tracing::trace!(ran, "ran toolkit jobs");
        }
    }
}

impl ApplicationHandler<UserEvent> for DesktopApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.run_jobs(event_loop);
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: UserEvent) {
        match event {
            UserEvent::Wake => self.run_jobs(event_loop),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WinitWindowEvent,
    ) {
        let Some(&id) = self.state.native_ids.get(&window_id) else {
            return;
        };

        match event {
            WinitWindowEvent::CloseRequested => {
                self.state.close(event_loop, id);
            }

            WinitWindowEvent::Resized(_) | WinitWindowEvent::ScaleFactorChanged { .. } => {
                if let Some(window) = self.state.windows.get(&id) {
                    window.sync_bounds();
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.run_jobs(event_loop);

        #[cfg(target_os = "linux")]
        {
            while gtk::events_pending() {
                gtk::main_iteration_do(false);
            }
            event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + GTK_PUMP_INTERVAL));
        }
    }
}
