//! multicam: tethered capture for several USB cameras from one prompt.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use multicam::capture::CaptureMode;
use multicam::config::{self, Config};
use multicam::devices::{DeviceRegistry, DiscoveryError};
use multicam::naming::NamingTemplate;
use multicam::session::Session;
use multicam::shell::Shell;
use multicam::tool::GphotoTool;

/// Interactive tethering shell for multiple USB cameras
#[derive(Parser)]
#[command(name = "multicam")]
#[command(version, about = "Tethered capture shell for multiple USB cameras")]
#[command(long_about = "Discover cameras connected over USB, name each one by \
    what it photographs, and trigger capture-and-download on all of them from \
    a single prompt, one at a time or fanned out concurrently.")]
#[command(after_help = "EXAMPLES:
    # Start the interactive shell in the current directory
    multicam

    # Save pictures somewhere else and fan captures out concurrently
    multicam --dir ~/shoots/today --concurrent

    # One-off device listing
    multicam list-cameras")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Directory to save pictures into (default: current directory)
    #[arg(long, short)]
    dir: Option<PathBuf>,

    /// Start in concurrent capture mode
    #[arg(long)]
    concurrent: bool,

    /// Filename format, {0} is the shot name and {1} the camera name
    #[arg(long, short)]
    template: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List connected cameras and exit
    ListCameras,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::ListCameras) => list_cameras(&config),
        Some(Commands::Config { action }) => handle_config_action(action, &config),
        None => run_shell(cli, config),
    }
}

fn run_shell(cli: Cli, config: Config) {
    if let Some(dir) = &cli.dir {
        if let Err(e) = std::env::set_current_dir(dir) {
            eprintln!("Error: cannot change to {}: {}", dir.display(), e);
            std::process::exit(1);
        }
    }

    if let Err(e) = ctrlc::set_handler(|| {
        println!("\nUse the q command to quit.");
    }) {
        log::warn!("could not install Ctrl+C handler: {}", e);
    }

    let tool = GphotoTool::new(config.viewer.command.clone());
    let mut session = Session::from_config(tool, &config);
    if cli.concurrent {
        session.set_mode(CaptureMode::Concurrent);
    }
    if let Some(template) = cli.template {
        session.set_template(NamingTemplate::new(template));
    }

    if let Err(e) = Shell::new(session).run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn list_cameras(config: &Config) {
    let tool = GphotoTool::new(config.viewer.command.clone());
    let mut registry = DeviceRegistry::new();
    match registry.discover(&tool) {
        Ok(count) => {
            println!("{} cameras found:", count);
            println!();
            print!("{}", registry.table());
        }
        Err(DiscoveryError::NoneFound) => {
            println!("No cameras found.");
            println!();
            println!("Make sure cameras are connected by USB and powered on.");
            println!("If a camera mounts as an external drive, eject it first.");
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn handle_config_action(action: ConfigAction, config: &Config) {
    match action {
        ConfigAction::Show => {
            println!("Current configuration:");
            println!("  Capture mode: {}", config.capture.mode);
            println!("  Concurrent wait: {}s", config.capture.timeout_secs);
            println!("  Keep on camera: {}", config.capture.keep_on_camera);
            println!("  Filename format: \"{}\"", config.naming.template);
            println!(
                "  Viewer: {}",
                config.viewer.command.as_deref().unwrap_or("(platform default)")
            );
            println!();

            let config_path = config::default_path();
            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
        }
        ConfigAction::Init => {
            let config_path = config::default_path();

            if config_path.exists() {
                eprintln!("Config file already exists: {}", config_path.display());
                eprintln!("Use 'multicam config show' to view current settings.");
                std::process::exit(1);
            }

            if let Some(parent) = config_path.parent() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    eprintln!("Error creating config directory: {}", e);
                    std::process::exit(1);
                }
            }

            let default_config = r#"# multicam configuration

[capture]
# How a shot drives the cameras: "sequential" or "concurrent"
mode = "sequential"
# Upper bound in seconds on one concurrent-mode wait
timeout_secs = 10
# Leave the image on the camera card as well (not consulted yet)
keep_on_camera = false

[naming]
# {0} is the shot name, {1} the camera name
template = "{0} - {1}.jpg"

[viewer]
# Command used to open captured images (default: xdg-open / open)
# command = "feh"
"#;

            if let Err(e) = std::fs::write(&config_path, default_config) {
                eprintln!("Error writing config file: {}", e);
                std::process::exit(1);
            }

            println!("Created config file: {}", config_path.display());
        }
    }
}
