//! The daemon's listening socket.
//!
//! Binds a Unix stream socket and hands out accepted connections one at a
//! time; the [`Daemon`](crate::daemon::Daemon) services each connection
//! completely before asking for the next.

use log::{info, warn};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Errors produced while setting up the listener.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {}: {source}", path.display())]
    Bind {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A bound Unix socket.  The socket file is removed again on drop.
pub struct SocketServer {
    listener: UnixListener,
    path: PathBuf,
    io_timeout: Option<Duration>,
}

impl SocketServer {
    /// Bind `path`, replacing a stale socket file left by an earlier run.
    pub fn bind(path: impl AsRef<Path>) -> Result<Self, ServerError> {
        let path = path.as_ref().to_path_buf();
        let _ = std::fs::remove_file(&path);

        let listener = UnixListener::bind(&path).map_err(|source| ServerError::Bind {
            path: path.clone(),
            source,
        })?;
        info!("listening on {}", path.display());
        Ok(Self {
            listener,
            path,
            io_timeout: None,
        })
    }

    /// Apply a read and write timeout to every accepted connection.
    pub fn with_io_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.io_timeout = timeout;
        self
    }

    /// The filesystem path of the socket.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Block until the next client connects.
    pub fn accept(&self) -> std::io::Result<UnixStream> {
        let (stream, _) = self.listener.accept()?;
        if let Some(timeout) = self.io_timeout {
            if let Err(e) = stream
                .set_read_timeout(Some(timeout))
                .and_then(|()| stream.set_write_timeout(Some(timeout)))
            {
                warn!("failed to set connection timeout: {}", e);
            }
        }
        Ok(stream)
    }
}

impl Drop for SocketServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

//  Tests
