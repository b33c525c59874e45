//! Daemon configuration.
//!
//! The configuration is loaded from `$XDG_CONFIG_HOME/metadesk/config.json`.
//! Every section is optional and unknown keys are ignored, so the file can
//! grow new sections without breaking older daemons.
//!
//! # Example
//!
//! ```json
//! {
//!   "socket_path": "/run/user/1000/metadesk.sock",
//!   "io_timeout_ms": 2000,
//!   "bspwm": { "bspc": "/usr/bin/bspc", "desktop_prefix": "md" },
//!   "format": {
//!     "lemonbar": { "focus_color": "#005577", "padding": "  " },
//!     "tree": { "indent": "  " }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration.
///
/// A minimal `{}` file is valid; all sections fall back to their
/// compiled-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Socket to listen on instead of [`default_socket_path`](crate::ipc::default_socket_path).
    pub socket_path: Option<PathBuf>,

    /// Read/write timeout for client connections (ms).  Without one, a
    /// client that stops reading or writing stalls the daemon.
    pub io_timeout_ms: Option<u64>,

    /// How to reach bspwm.
    pub bspwm: BspwmConfig,

    /// Formatter settings.
    pub format: FormatConfig,
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }

    pub fn io_timeout(&self) -> Option<Duration> {
        self.io_timeout_ms
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis)
    }
}

/// Settings for the bspwm backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BspwmConfig {
    /// The `bspc` executable.
    pub bspc: String,
    /// Prefix for the names of desktops created by metadesk.
    pub desktop_prefix: String,
}

impl Default for BspwmConfig {
    fn default() -> Self {
        Self {
            bspc: "bspc".into(),
            desktop_prefix: "metadesk-desktop".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    pub lemonbar: LemonbarConfig,
    pub tree: TreeConfig,
}

/// Settings for the `lemonbar` formatter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LemonbarConfig {
    /// Background color of the focused child's segment.
    pub focus_color: String,
    /// Padding on both sides of every segment.
    pub padding: String,
}

impl Default for LemonbarConfig {
    fn default() -> Self {
        Self {
            focus_color: "#525252".into(),
            padding: "    ".into(),
        }
    }
}

/// Settings for the `tree` formatter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// One level of indentation.
    pub indent: String,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            indent: "\t".into(),
        }
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_full_config() {
        let json = r##"{
            "socket_path": "/tmp/md.sock",
            "io_timeout_ms": 1500,
            "bspwm": { "bspc": "/opt/bspc", "desktop_prefix": "md" },
            "format": {
                "lemonbar": { "focus_color": "#ff0000", "padding": " " },
                "tree": { "indent": "  " }
            }
        }"##;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.socket_path, Some(PathBuf::from("/tmp/md.sock")));
        assert_eq!(cfg.io_timeout(), Some(Duration::from_millis(1500)));
        assert_eq!(cfg.bspwm.bspc, "/opt/bspc");
        assert_eq!(cfg.bspwm.desktop_prefix, "md");
        assert_eq!(cfg.format.lemonbar.focus_color, "#ff0000");
        assert_eq!(cfg.format.lemonbar.padding, " ");
        assert_eq!(cfg.format.tree.indent, "  ");
    }

    #[test]
    fn deserialize_empty_uses_defaults() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        assert!(cfg.socket_path.is_none());
        assert!(cfg.io_timeout().is_none());
        assert_eq!(cfg.bspwm.bspc, "bspc");
        assert_eq!(cfg.bspwm.desktop_prefix, "metadesk-desktop");
        assert_eq!(cfg.format.lemonbar.focus_color, "#525252");
        assert_eq!(cfg.format.lemonbar.padding, "    ");
        assert_eq!(cfg.format.tree.indent, "\t");
    }

    #[test]
    fn deserialize_partial_section() {
        let json = r#"{ "bspwm": { "desktop_prefix": "scratch" } }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.bspwm.desktop_prefix, "scratch");
        assert_eq!(cfg.bspwm.bspc, "bspc");
    }

    #[test]
    fn zero_timeout_means_none() {
        let cfg: Config = serde_json::from_str(r#"{ "io_timeout_ms": 0 }"#).unwrap();
        assert!(cfg.io_timeout().is_none());
    }

    #[test]
    fn unknown_top_level_keys_ignored() {
        let json = r#"{ "bspwm": {}, "future_section": { "key": 42 } }"#;
        let _cfg: Config = serde_json::from_str(json).unwrap();
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Config::load(Path::new("/nonexistent/metadesk/config.json")).unwrap_err();
        assert!(err.to_string().starts_with("config error: failed to read"));
    }
}
