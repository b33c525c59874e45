//! Long-lived subscriptions.
//!
//! A client that sends `--subscribe <formatter>` keeps its connection
//! open.  The [`SubscriptionHub`] remembers the connection together with
//! the selected desktop and formatter, and on every [`tick`](SubscriptionHub::tick)
//! writes one fresh rendering to it.  The first tick also writes the `0`
//! status line the client is waiting for.
//!
//! There is no unsubscribe request: a subscriber goes away only when
//! writing to it fails (the client hung up).  A subscriber whose desktop has
//! been removed from the tree keeps receiving the last rendering it got.

use crate::ipc::protocol::{self, Status};
use crate::traits::{Formatter, WindowManager};
use crate::tree::{DesktopTree, NodeId};
use log::debug;
use std::io::{self, BufWriter, Write};
use std::os::unix::net::UnixStream;

/// Why a subscriber was dropped.
#[derive(Debug, thiserror::Error)]
pub enum SubscriptionError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// One subscribed connection.
struct Subscriber<S: Write> {
    writer: BufWriter<S>,
    node: NodeId,
    formatter: Box<dyn Formatter>,
    status_sent: bool,
    /// Most recent rendering, repeated once the desktop is gone.
    last: String,
}

impl<S: Write> Subscriber<S> {
    fn push<W: WindowManager>(&mut self, tree: &DesktopTree<W>) -> Result<(), SubscriptionError> {
        if let Some(desktop) = tree.desktop(self.node) {
            self.last = self.formatter.format(desktop);
        }

        if !self.status_sent {
            protocol::write_status(&mut self.writer, Status::Success)?;
            self.status_sent = true;
        }
        writeln!(self.writer, "{}", self.last)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// All live subscriptions.
///
/// Generic over the connection type so tests can subscribe in-memory
/// writers; the daemon uses [`UnixStream`].
pub struct SubscriptionHub<S: Write = UnixStream> {
    subscribers: Vec<Subscriber<S>>,
}

impl<S: Write> Default for SubscriptionHub<S> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }
}

impl<S: Write> SubscriptionHub<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `connection` to receive `node` rendered by `formatter`
    /// from the next tick on.
    pub fn subscribe(&mut self, connection: S, node: NodeId, formatter: Box<dyn Formatter>) {
        self.subscribers.push(Subscriber {
            writer: BufWriter::new(connection),
            node,
            formatter,
            status_sent: false,
            last: String::new(),
        });
        debug!("subscriber added ({} active)", self.subscribers.len());
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Push one rendering to every subscriber, dropping the ones that fail.
    pub fn tick<W: WindowManager>(&mut self, tree: &DesktopTree<W>) {
        self.subscribers.retain_mut(|sub| match sub.push(tree) {
            Ok(()) => true,
            Err(e) => {
                debug!("dropping subscriber: {}", e);
                false
            }
        });
    }
}

//  Tests
