//! Weave CLI
//!
//! Launch web view windows from a configuration file, inspect displays,
//! and validate configurations.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use weave_app::{AppConfig, Application, DisplayInfo, HeadlessToolkit, Toolkit, WindowOptions};

#[derive(Parser)]
#[command(name = "weave")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Weave web view application launcher", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the windows described by a configuration file
    Run {
        /// Configuration file (weave.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// URL for the first window
        #[arg(short, long)]
        url: Option<String>,

        /// Title for the first window
        #[arg(short, long)]
        title: Option<String>,

        /// Evaluate a script in the first window and print the result
        #[arg(long)]
        eval: Option<String>,

        /// Use the headless toolkit; exits once the windows are open
        #[arg(long)]
        headless: bool,
    },

    /// List attached displays
    Displays {
        /// Print as JSON
        #[arg(long)]
        json: bool,

        /// Use the headless toolkit
        #[arg(long)]
        headless: bool,
    },

    /// Validate a configuration file
    Check {
        /// Configuration file
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Run {
            config,
            url,
            title,
            eval,
            headless,
        } => {
            let config = load_config(config.as_deref(), url, title)?;
            if headless {
                cmd_run(HeadlessToolkit::new(), config, eval.as_deref(), false)
            } else {
                cmd_run(desktop_toolkit()?, config, eval.as_deref(), true)
            }
        }

        Commands::Displays { json, headless } => {
            let displays = if headless {
                list_displays(HeadlessToolkit::new())?
            } else {
                list_displays(desktop_toolkit()?)?
            };
            print_displays(&displays, json)
        }

        Commands::Check { config } => cmd_check(&config),
    }
}

#[cfg(feature = "desktop")]
fn desktop_toolkit() -> Result<weave_app::DesktopToolkit> {
    Ok(weave_app::DesktopToolkit::new())
}

#[cfg(not(feature = "desktop"))]
fn desktop_toolkit() -> Result<HeadlessToolkit> {
    anyhow::bail!("weave was built without desktop support; rebuild with `--features desktop` or pass --headless")
}

fn load_config(path: Option<&Path>, url: Option<String>, title: Option<String>) -> Result<AppConfig> {
    let mut config = match path {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    if config.windows.is_empty() {
        config.windows.push(WindowOptions::default());
    }
    let first = &mut config.windows[0];
    if let Some(url) = url {
        first.url = url;
    }
    if let Some(title) = title {
        first.title = title;
    }
    Ok(config)
}

fn cmd_run<T: Toolkit>(toolkit: T, config: AppConfig, eval: Option<&str>, wait: bool) -> Result<()> {
    let app = Application::create(toolkit, config.application)
        .context("Failed to start the toolkit")?;
    info!("Started {} on the {} toolkit", app.name(), app.toolkit_name());

    let mut windows = Vec::with_capacity(config.windows.len());
    for options in config.windows {
        let title = options.title.clone();
        let mut window = app.new_window(options);
        window
            .run()
            .with_context(|| format!("Failed to open window '{title}'"))?;
        info!("Opened {} '{}'", window.id(), title);
        windows.push(window);
    }

    if let (Some(script), Some(window)) = (eval, windows.first()) {
        let result = window
            .eval_js(script, Duration::from_secs(10))
            .context("Script evaluation failed")?;
        println!("{result}");
    }

    if !wait {
        app.quit();
    }
    app.join().context("Toolkit loop failed")?;
    info!("Goodbye");
    Ok(())
}

fn list_displays<T: Toolkit>(toolkit: T) -> Result<Vec<DisplayInfo>> {
    let app = Application::create(toolkit, Default::default())
        .context("Failed to start the toolkit")?;
    let displays = app.list_displays();
    app.quit();
    if let Err(e) = app.join() {
        warn!("Toolkit loop ended with an error: {}", e);
    }
    Ok(displays?)
}

fn print_displays(displays: &[DisplayInfo], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(displays)?);
        return Ok(());
    }

    if displays.is_empty() {
        warn!("No displays found");
        return Ok(());
    }

    for (index, display) in displays.iter().enumerate() {
        let mut flags = Vec::new();
        if display.is_primary {
            flags.push("primary");
        }
        if display.is_current {
            flags.push("current");
        }
        println!(
            "{index}: {:<20} {} ({} physical) @{}x {}",
            display.name.as_deref().unwrap_or("<unnamed>"),
            display.size,
            display.physical_size,
            display.scale_factor,
            flags.join(", ")
        );
    }
    Ok(())
}

fn cmd_check(path: &Path) -> Result<()> {
    let config = AppConfig::load(path)?;
    info!(
        "{} is valid: application '{}' with {} window(s)",
        path.display(),
        config.application.name,
        config.windows.len()
    );
    for window in &config.windows {
        info!(
            "  {} - {} at {}",
            window.title,
            window.current_size(),
            window.url
        );
    }
    Ok(())
}
