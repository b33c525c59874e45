//! Client/daemon IPC over a Unix socket.
//!
//! External tools (`mdc`, status bars, key-bind helpers) connect to the
//! socket, send one framed request and read the framed response; see
//! [`protocol`] for the wire format.

pub mod protocol;
pub mod server;
pub mod subscription;

use std::path::PathBuf;

/// Default socket path shared by the daemon and the client.
///
/// `$METADESK_SOCKET` if set, otherwise `metadesk.sock` in
/// `$XDG_RUNTIME_DIR` (or `/tmp`).
pub fn default_socket_path() -> PathBuf {
    if let Ok(path) = std::env::var("METADESK_SOCKET") {
        return PathBuf::from(path);
    }
    let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(runtime).join("metadesk.sock")
}
