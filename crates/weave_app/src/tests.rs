//! Application and window scenarios against the headless toolkit

use crate::prelude::*;
use parking_lot::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use weave_platform::{Handoff, PlatformError, WindowId};
use weave_platform_headless::{HeadlessToolkit, Journal};

fn init_logging() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Options that keep the loop alive when windows close
fn options() -> ApplicationOptions {
    let mut options = ApplicationOptions::new("weave-test");
    options.mac.terminate_after_last_window_closed = false;
    options.windows.disable_quit_on_last_window_closed = true;
    options.linux.disable_quit_on_last_window_closed = true;
    options
}

fn create_test_app(toolkit: HeadlessToolkit) -> (Application, Journal) {
    init_logging();
    let journal = toolkit.journal();
    let app = Application::create(toolkit, options()).expect("Failed to create test app");
    (app, journal)
}

fn shutdown(app: Application) {
    app.quit();
    app.join().expect("toolkit loop failed");
}

#[test]
fn test_title_set_before_run_is_used_at_creation() {
    let (app, journal) = create_test_app(HeadlessToolkit::new());

    let mut window = app.new_window(WindowOptions::new("A"));
    window.set_title("B");
    window.run().unwrap();

    let creations = journal.creations();
    assert_eq!(creations.len(), 1);
    assert_eq!(creations[0].1.title, "B");
    assert_eq!(window.title().unwrap(), "B");
    assert!(journal.commands(window.id()).is_empty());

    shutdown(app);
}

#[test]
fn test_maximise_after_run_is_observed() {
    let (app, _journal) = create_test_app(HeadlessToolkit::new());

    let mut window = app.new_window(WindowOptions::new("Main"));
    assert!(!window.is_maximised().unwrap());
    window.run().unwrap();
    assert!(!window.is_maximised().unwrap());

    window.set_maximised();
    assert!(window.is_maximised().unwrap());

    window.set_fullscreen();
    assert!(window.is_fullscreen().unwrap());
    assert!(!window.is_maximised().unwrap());

    window.restore();
    assert!(!window.is_fullscreen().unwrap());

    shutdown(app);
}

#[test]
fn test_dispatch_right_after_create_runs() {
    let (app, _journal) = create_test_app(HeadlessToolkit::new());

    let ran = Arc::new(Handoff::new());
    let signal = Arc::clone(&ran);
    app.dispatch(move |ctx| signal.put(ctx.toolkit_name()));
    assert_eq!(ran.take_timeout(Duration::from_secs(5)), Some("headless"));

    assert_eq!(app.dispatch_blocking(|ctx| ctx.window_ids()).unwrap(), vec![]);

    shutdown(app);
}

#[test]
fn test_concurrent_creation_yields_one_application() {
    init_logging();
    let lock = Arc::new(AtomicBool::new(false));
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let lock = Arc::clone(&lock);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                Application::create(HeadlessToolkit::new().with_instance_lock(lock), options())
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let (created, refused): (Vec<_>, Vec<_>) = results.into_iter().partition(|r| r.is_ok());
    assert_eq!(created.len(), 1);
    assert_eq!(refused.len(), 1);
    assert!(matches!(
        refused[0],
        Err(AppError::Platform(PlatformError::InitFailed(_)))
    ));

    for app in created.into_iter().flatten() {
        // the survivor is fully usable
        assert_eq!(app.list_displays().unwrap().len(), 1);
        assert_eq!(
            app.dispatch_blocking(|ctx| ctx.toolkit_name()).unwrap(),
            "headless"
        );
        shutdown(app);
    }
}

#[test]
fn test_startup_error_is_reported() {
    init_logging();
    let lock = Arc::new(AtomicBool::new(true));
    let result = Application::create(HeadlessToolkit::new().with_instance_lock(lock), options());
    assert!(matches!(
        result,
        Err(AppError::Platform(PlatformError::InitFailed(_)))
    ));
}

#[test]
fn test_startup_timeout() {
    init_logging();
    let toolkit = HeadlessToolkit::new().with_startup_delay(Duration::from_millis(500));
    let options = options().startup_timeout(Some(Duration::from_millis(50)));
    let result = Application::create(toolkit, options);
    assert!(matches!(result, Err(AppError::StartupTimeout(_))));
}

#[test]
fn test_failed_realization_can_be_retried() {
    let (app, journal) = create_test_app(HeadlessToolkit::new().fail_window_creations(1));

    let mut window = app.new_window(WindowOptions::new("Retry").url("http://localhost:34115"));
    let err = window.run().unwrap_err();
    assert!(matches!(err, AppError::Platform(PlatformError::WebView(_))));
    assert!(!window.is_realized());
    assert_eq!(window.options().unwrap().title, "Retry");

    window.run().unwrap();
    assert!(window.is_realized());
    assert!(window.options().is_none());
    assert_eq!(journal.creations().len(), 1);

    assert!(matches!(
        window.run(),
        Err(AppError::AlreadyRealized(id)) if id == window.id()
    ));

    shutdown(app);
}

#[test]
fn test_scripts_before_run() {
    let (app, journal) = create_test_app(HeadlessToolkit::new());

    let window = app.new_window(WindowOptions::new("Idle"));
    window.exec_js("document.title = 'x'");
    assert!(matches!(
        window.eval_js("1 + 1", Duration::from_secs(1)),
        Err(AppError::NotRealized(_))
    ));

    // Flush the queue before checking nothing reached the toolkit
    app.dispatch_blocking(|_| ()).unwrap();
    assert!(journal.entries().is_empty());

    shutdown(app);
}

#[test]
fn test_eval_js_returns_page_result() {
    let toolkit = HeadlessToolkit::new().with_script_handler(|script| match script {
        "document.title" => "\"Notes\"".to_string(),
        _ => "null".to_string(),
    });
    let (app, journal) = create_test_app(toolkit);

    let mut window = app.new_window(WindowOptions::new("Notes"));
    window.run().unwrap();
    window.exec_js("console.log('ready')");

    let title = window
        .eval_js("document.title", Duration::from_secs(5))
        .unwrap();
    assert_eq!(title, "\"Notes\"");
    assert_eq!(
        journal.commands(window.id()),
        vec![
            "exec_js console.log('ready')".to_string(),
            "eval_js document.title".to_string(),
        ]
    );

    shutdown(app);
}

#[test]
fn test_bounds_accumulate_before_run() {
    let (app, journal) = create_test_app(HeadlessToolkit::new());

    let mut window = app.new_window(WindowOptions::new("Bounds"));
    window.set_size(1000, 800);
    window.set_max_size(640, 480);
    assert_eq!(window.size().unwrap(), Size::new(640, 480));

    // A minimum above the maximum drags the maximum up with it
    window.set_min_size(800, 600);
    let options = window.options().unwrap().clone();
    assert_eq!(options.min_size, Some(Size::new(800, 600)));
    assert_eq!(options.max_size, Some(Size::new(800, 600)));
    assert_eq!(options.current_size(), Size::new(800, 600));

    window.set_always_on_top(true);
    window.set_resizable(false);
    window.set_background_color(Rgba::rgb(12, 34, 56));
    window.navigate_to_url("http://localhost:34115/index.html");
    window.enable_dev_tools();
    window.set_minimised();
    window.run().unwrap();

    let (_, created) = journal.creations().remove(0);
    assert_eq!(created.current_size(), Size::new(800, 600));
    assert!(created.always_on_top);
    assert!(!created.resizable);
    assert_eq!(created.background_color, Some(Rgba::rgb(12, 34, 56)));
    assert_eq!(created.url, "http://localhost:34115/index.html");
    assert!(created.dev_tools);
    assert_eq!(created.start_state, StartState::Minimised);
    assert!(window.is_minimised().unwrap());

    shutdown(app);
}

#[test]
fn test_bounds_after_run_resize_first() {
    let (app, journal) = create_test_app(HeadlessToolkit::new());

    let mut window = app.new_window(WindowOptions::new("Live").size(800, 600));
    window.run().unwrap();

    window.set_min_size(1024, 768);
    assert_eq!(window.size().unwrap(), Size::new(1024, 768));

    window.set_max_size(640, 480);
    assert_eq!(window.size().unwrap(), Size::new(640, 480));

    assert_eq!(
        journal.commands(window.id()),
        vec![
            "set_size 1024x768".to_string(),
            "set_min_size 1024x768".to_string(),
            "set_min_size 640x480".to_string(),
            "set_size 640x480".to_string(),
            "set_max_size 640x480".to_string(),
        ]
    );

    shutdown(app);
}

/// Size, minimum and maximum as the native window sees them
fn live_bounds(app: &Application, id: WindowId) -> (Size, Option<Size>, Option<Size>) {
    app.dispatch_blocking(move |ctx| {
        let window = ctx.window(id).expect("window is open");
        (window.size(), window.min_size(), window.max_size())
    })
    .unwrap()
}

fn assert_within(size: Size, min: Option<Size>, max: Option<Size>) {
    if let Some(min) = min {
        assert!(size.width >= min.width && size.height >= min.height, "{size} below {min}");
    }
    if let (Some(min), Some(max)) = (min, max) {
        assert!(min.width <= max.width && min.height <= max.height, "{min} above {max}");
    }
    if let Some(max) = max {
        assert!(size.width <= max.width && size.height <= max.height, "{size} above {max}");
    }
}

#[test]
fn test_smaller_max_after_run_lowers_min() {
    let (app, _journal) = create_test_app(HeadlessToolkit::new());

    let mut window = app.new_window(WindowOptions::new("Shrink").size(800, 600));
    window.run().unwrap();

    window.set_min_size(1024, 768);
    window.set_max_size(500, 900);

    let (size, min, max) = live_bounds(&app, window.id());
    assert_within(size, min, max);
    assert_eq!(min, Some(Size::new(500, 768)));
    assert_eq!(max, Some(Size::new(500, 900)));
    assert_eq!(size, Size::new(500, 768));

    shutdown(app);
}

#[test]
fn test_larger_min_after_run_raises_max() {
    let (app, journal) = create_test_app(HeadlessToolkit::new());

    let mut window = app.new_window(WindowOptions::new("Grow").size(800, 600));
    window.run().unwrap();

    window.set_max_size(640, 480);
    assert_eq!(window.size().unwrap(), Size::new(640, 480));

    window.set_min_size(1024, 768);
    let (size, min, max) = live_bounds(&app, window.id());
    assert_within(size, min, max);
    assert_eq!(min, Some(Size::new(1024, 768)));
    assert_eq!(max, Some(Size::new(1024, 768)));
    assert_eq!(size, Size::new(1024, 768));

    assert_eq!(
        journal.commands(window.id()),
        vec![
            "set_size 640x480".to_string(),
            "set_max_size 640x480".to_string(),
            "set_max_size 1024x768".to_string(),
            "set_size 1024x768".to_string(),
            "set_min_size 1024x768".to_string(),
        ]
    );

    shutdown(app);
}

#[test]
fn test_native_calls_stay_on_toolkit_thread() {
    let (app, journal) = create_test_app(HeadlessToolkit::new());

    let windows: Vec<_> = (0..4)
        .map(|i| {
            let app = app.clone();
            thread::spawn(move || {
                let mut window = app.new_window(WindowOptions::new(format!("w{i}")));
                window.run().unwrap();
                for n in 0..25 {
                    window.set_title(format!("w{i}-{n}"));
                    window.set_size(400 + n, 300 + n);
                }
                window.set_maximised();
                window.is_maximised().unwrap();
                window
            })
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect();

    assert_eq!(windows.len(), 4);
    assert_eq!(journal.threads(), vec![app.toolkit_thread_id()]);
    assert_ne!(app.toolkit_thread_id(), thread::current().id());

    // Commands from one thread keep their order
    for (i, window) in windows.iter().enumerate() {
        assert_eq!(window.title().unwrap(), format!("w{i}-24"));
        assert_eq!(window.size().unwrap(), Size::new(424, 324));
    }

    shutdown(app);
}

#[test]
fn test_list_displays() {
    let (app, _journal) = create_test_app(HeadlessToolkit::new());

    let displays = app.list_displays().unwrap();
    assert_eq!(displays.len(), 1);
    assert!(displays[0].is_primary);
    assert_eq!(displays[0].physical_size, Size::new(1920, 1080));

    shutdown(app);
}

#[test]
fn test_closed_window_ignores_commands() {
    let (app, journal) = create_test_app(HeadlessToolkit::new());

    let mut window = app.new_window(WindowOptions::new("Short-lived"));
    window.run().unwrap();
    window.set_maximised();
    window.close();

    window.set_title("ignored");
    assert!(!window.is_maximised().unwrap());
    assert!(matches!(
        window.title(),
        Err(AppError::WindowClosed(id)) if id == window.id()
    ));
    assert!(matches!(
        window.eval_js("1", Duration::from_secs(1)),
        Err(AppError::WindowClosed(_))
    ));

    let closures = journal.closures();
    assert_eq!(closures.len(), 1);
    assert_eq!(closures[0].1.start_state, StartState::Maximised);
    assert!(app.is_running());

    shutdown(app);
}

#[test]
fn test_closing_last_window_stops_loop() {
    init_logging();
    let app = Application::create(HeadlessToolkit::new(), ApplicationOptions::new("closing"))
        .unwrap();

    let mut window = app.new_window(WindowOptions::new("Only"));
    window.run().unwrap();
    window.close();

    app.join().unwrap();
    assert!(!app.is_running());
    assert!(matches!(
        app.dispatch_blocking(|ctx| ctx.window_ids()),
        Err(AppError::Platform(PlatformError::Disconnected))
    ));
}

#[test]
fn test_quit_and_join() {
    let (app, journal) = create_test_app(HeadlessToolkit::new());
    let other = app.clone();
    assert!(app.ptr_eq(&other));
    assert_eq!(app.name(), "weave-test");
    assert_eq!(app.toolkit_name(), "headless");

    let mut window = app.new_window(WindowOptions::new("Open"));
    window.run().unwrap();

    app.quit();
    other.join().unwrap();
    app.join().unwrap();

    // Windows still open at exit are destroyed by the loop
    assert_eq!(journal.closures().len(), 1);

    // Commands after shutdown are dropped rather than delivered
    window.set_title("late");
    assert!(matches!(
        window.is_maximised(),
        Err(AppError::Platform(PlatformError::Disconnected))
    ));
}

#[test]
fn test_windows_from_config() {
    let config = AppConfig::from_toml_str(
        r#"
        [application]
        name = "configured"

        [[window]]
        title = "First"
        width = 300
        height = 200

        [[window]]
        title = "Second"
        always_on_top = true
        "#,
    )
    .unwrap();

    init_logging();
    let toolkit = HeadlessToolkit::new();
    let journal = toolkit.journal();
    let app = Application::create(toolkit, config.application.clone()).unwrap();

    let ids: Vec<_> = config
        .windows
        .iter()
        .map(|options| {
            let mut window = app.new_window(options.clone());
            window.run().unwrap();
            window.id()
        })
        .collect();

    let created = journal.creations();
    assert_eq!(created.len(), 2);
    assert_eq!(created[0].0, ids[0]);
    assert_eq!(created[0].1.current_size(), Size::new(300, 200));
    assert!(created[1].1.always_on_top);
    assert_ne!(ids[0], ids[1]);

    shutdown(app);
}

#[test]
fn test_dispatch_preserves_order_across_threads() {
    let (app, _journal) = create_test_app(HeadlessToolkit::new());
    let seen = Arc::new(Mutex::new(Vec::new()));

    let producers: Vec<_> = (0..4)
        .map(|producer| {
            let app = app.clone();
            let seen = Arc::clone(&seen);
            thread::spawn(move || {
                for n in 0..100 {
                    let seen = Arc::clone(&seen);
                    app.dispatch(move |_| seen.lock().push((producer, n)));
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }
    app.dispatch_blocking(|_| ()).unwrap();

    let seen = seen.lock();
    assert_eq!(seen.len(), 400);
    for producer in 0..4 {
        let order: Vec<_> = seen
            .iter()
            .filter(|(p, _)| *p == producer)
            .map(|(_, n)| *n)
            .collect();
        assert_eq!(order, (0..100).collect::<Vec<_>>());
    }
    drop(seen);

    shutdown(app);
}
