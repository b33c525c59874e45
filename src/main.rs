//! Entry point for the **metadesk** daemon.
//!
//! Binds the command socket, roots the desktop tree at the desktop bspwm
//! currently has focused, launches the optional config script (which
//! usually builds the initial tree by calling `mdc`), then serves requests
//! on the main thread until killed.

use log::{error, info, warn};
use metadesk::bspwm::wm::BspwmWm;
use metadesk::config::Config;
use metadesk::daemon::Daemon;
use metadesk::ipc::default_socket_path;
use metadesk::ipc::server::SocketServer;
use metadesk::tree::DesktopTree;
use std::path::PathBuf;

const USAGE: &str = "usage: metadesk [-c|--config-script <PATH>] [-s|--socket <PATH>]";

/// Command-line arguments.
#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    /// Executable run once the daemon is listening.
    config_script: Option<PathBuf>,
    socket: Option<PathBuf>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-c" | "--config-script" => {
                let path = args.next().ok_or("--config-script requires a path")?;
                parsed.config_script = Some(PathBuf::from(path));
            }
            "-s" | "--socket" => {
                let path = args.next().ok_or("--socket requires a path")?;
                parsed.socket = Some(PathBuf::from(path));
            }
            other => return Err(format!("unknown argument: {}", other)),
        }
    }
    Ok(parsed)
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/metadesk`).
fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("metadesk")
}

/// Try to load the config from `$XDG_CONFIG_HOME/metadesk/config.json`,
/// falling back to compiled-in defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

/// Launch the config script and reap it in the background.
fn run_config_script(path: &PathBuf) -> std::io::Result<()> {
    let mut child = std::process::Command::new(path).spawn()?;
    info!("started config script {}", path.display());
    std::thread::spawn(move || match child.wait() {
        Ok(status) if !status.success() => warn!("config script exited with {}", status),
        Ok(_) => {}
        Err(e) => warn!("failed to wait for config script: {}", e),
    });
    Ok(())
}

fn main() {
    env_logger::init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{}\n{}", msg, USAGE);
            std::process::exit(1);
        }
    };
    let config = load_config();

    let socket_path = args
        .socket
        .or_else(|| config.socket_path.clone())
        .unwrap_or_else(default_socket_path);
    let server = match SocketServer::bind(&socket_path) {
        Ok(server) => server.with_io_timeout(config.io_timeout()),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let tree = match DesktopTree::new(BspwmWm::new(&config.bspwm)) {
        Ok(tree) => tree,
        Err(e) => {
            error!("failed to query the focused desktop: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(script) = &args.config_script {
        if let Err(e) = run_config_script(script) {
            error!("failed to execute '{}': {}", script.display(), e);
            std::process::exit(1);
        }
    }

    let mut daemon = Daemon::new(tree, config.format);
    daemon.run(&server);
}
