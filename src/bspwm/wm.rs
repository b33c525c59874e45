//! [`WindowManager`] implementation backed by `bspc`.
//!
//! Every call runs one `bspc` command.  Desktops created by metadesk are
//! named `<prefix><n>`; names of removed desktops are kept in a pool and
//! reused before new ones are minted.

use crate::config::BspwmConfig;
use crate::traits::WindowManager;
use log::debug;
use std::process::Command;

/// Errors that can occur when talking to bspwm.
#[derive(Debug, thiserror::Error)]
pub enum BspwmError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("bspc {args} failed: {stderr}")]
    Failed {
        args: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("bspc reported no focused desktop")]
    NoFocusedDesktop,
}

/// Hands out desktop names, most recently released first.
#[derive(Debug, Clone)]
pub struct DesktopIdPool {
    prefix: String,
    next: u32,
    released: Vec<String>,
}

impl DesktopIdPool {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
            released: Vec::new(),
        }
    }

    pub fn acquire(&mut self) -> String {
        self.released.pop().unwrap_or_else(|| {
            let id = format!("{}{}", self.prefix, self.next);
            self.next += 1;
            id
        })
    }

    /// Return `id` to the pool.  Ids not minted by this pool (such as the
    /// desktop the root was bound to) are never reused.
    pub fn release(&mut self, id: &str) {
        if id.starts_with(&self.prefix) {
            self.released.push(id.to_string());
        }
    }
}

/// bspwm-backed window manager.
pub struct BspwmWm {
    bspc: String,
    ids: DesktopIdPool,
}

impl BspwmWm {
    pub fn new(config: &BspwmConfig) -> Self {
        Self {
            bspc: config.bspc.clone(),
            ids: DesktopIdPool::new(config.desktop_prefix.clone()),
        }
    }

    /// Run `bspc` with `args` and return its standard output.
    fn exec(&self, args: &[&str]) -> Result<String, BspwmError> {
        debug!("{} {}", self.bspc, args.join(" "));
        let output = Command::new(&self.bspc)
            .args(args)
            .output()
            .map_err(|source| BspwmError::Spawn {
                program: self.bspc.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(BspwmError::Failed {
                args: args.join(" "),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl WindowManager for BspwmWm {
    type Error = BspwmError;

    fn focused_desktop(&self) -> Result<String, BspwmError> {
        let names = self.exec(&["query", "--desktops", "--desktop", "focused", "--names"])?;
        names
            .lines()
            .next()
            .map(str::to_string)
            .ok_or(BspwmError::NoFocusedDesktop)
    }

    fn create_desktop(&mut self) -> Result<String, BspwmError> {
        let id = self.ids.acquire();
        if let Err(e) = self.exec(&["monitor", "--add-desktops", &id]) {
            self.ids.release(&id);
            return Err(e);
        }
        Ok(id)
    }

    fn destroy_desktop(&mut self, id: &str) -> Result<(), BspwmError> {
        self.exec(&["desktop", id, "--remove"])?;
        self.ids.release(id);
        Ok(())
    }

    fn focus_desktop(&self, id: &str) -> Result<(), BspwmError> {
        self.exec(&["desktop", id, "--focus"]).map(|_| ())
    }

    fn is_occupied(&self, id: &str) -> Result<bool, BspwmError> {
        // A query that matches nothing exits 1 without a message; anything
        // else (no socket, unknown desktop) is a real failure.
        match self.exec(&["query", "--nodes", "--desktop", id, "--node", ".window"]) {
            Ok(nodes) => Ok(!nodes.trim().is_empty()),
            Err(BspwmError::Failed {
                code: Some(1),
                ref stderr,
                ..
            }) if stderr.is_empty() => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn claim_focused_window(&self, id: &str) -> Result<(), BspwmError> {
        self.exec(&["node", "focused", "--to-desktop", id]).map(|_| ())
    }
}

//  Tests
