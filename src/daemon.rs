//! The orchestrator that ties the tree, the subscription hub and the socket
//! together.
//!
//! [`Daemon`] owns the [`DesktopTree`] and the [`SubscriptionHub`] and runs
//! the serialized loop: accept a connection, read one request, apply it,
//! reply (or keep the connection as a subscriber), then push one tick of
//! renderings to every subscriber.

use crate::command::{Command, CommandError, Request, SwapTarget};
use crate::config::FormatConfig;
use crate::format::formatter_by_name;
use crate::ipc::protocol::{self, Response};
use crate::ipc::server::SocketServer;
use crate::ipc::subscription::SubscriptionHub;
use crate::traits::{Formatter, WindowManager};
use crate::tree::{DesktopTree, NodeId, TreeError};
use log::{debug, info, warn};
use std::io::BufReader;
use std::os::unix::net::UnixStream;

/// What to do with the connection a request arrived on.
pub enum Outcome {
    /// Write the response and close the connection.
    Reply(Response),
    /// Keep the connection open and hand it to the subscription hub.
    Subscribe {
        node: NodeId,
        formatter: Box<dyn Formatter>,
    },
}

/// All daemon state, owned in one place.
pub struct Daemon<W: WindowManager> {
    tree: DesktopTree<W>,
    hub: SubscriptionHub,
    format: FormatConfig,
}

impl<W: WindowManager> Daemon<W> {
    pub fn new(tree: DesktopTree<W>, format: FormatConfig) -> Self {
        Self {
            tree,
            hub: SubscriptionHub::new(),
            format,
        }
    }

    pub fn tree(&self) -> &DesktopTree<W> {
        &self.tree
    }

    /// Number of live subscriptions.
    pub fn subscribers(&self) -> usize {
        self.hub.len()
    }

    /// Serve clients forever.
    pub fn run(&mut self, server: &SocketServer) {
        info!("metadesk running");
        loop {
            match server.accept() {
                Ok(stream) => self.handle_connection(stream),
                Err(e) => warn!("accept error: {}", e),
            }
            self.tick();
        }
    }

    /// Service one connection: read the request, apply it, reply.
    ///
    /// A malformed request is logged and the connection closed without a
    /// response.
    pub fn handle_connection(&mut self, stream: UnixStream) {
        let args = match protocol::read_request(&mut BufReader::new(&stream)) {
            Ok(args) => args,
            Err(e) => {
                warn!("dropping connection: {}", e);
                return;
            }
        };
        debug!("request {:?}", args);

        match self.execute(&args) {
            Outcome::Reply(response) => {
                if let Err(e) = protocol::write_response(&mut &stream, &response) {
                    warn!("failed to write response: {}", e);
                }
            }
            Outcome::Subscribe { node, formatter } => {
                self.hub.subscribe(stream, node, formatter);
            }
        }
    }

    /// Push the current state to every subscriber.
    pub fn tick(&mut self) {
        self.hub.tick(&self.tree);
    }

    /// Apply one request to the tree.
    pub fn execute(&mut self, args: &[String]) -> Outcome {
        match self.apply(args) {
            Ok(outcome) => outcome,
            Err(e) => {
                debug!("request failed: {}", e);
                Outcome::Reply(Response::error(e.to_string()))
            }
        }
    }

    fn apply(&mut self, args: &[String]) -> Result<Outcome, CommandError> {
        let request = Request::parse(args)?;
        let node = request.target.resolve(&self.tree)?;

        let message = match request.command {
            Command::Focus => {
                self.tree.focus(node);
                String::new()
            }
            Command::FocusNext => {
                self.tree.focus_next(node)?;
                String::new()
            }
            Command::FocusPrev => {
                self.tree.focus_prev(node)?;
                String::new()
            }
            Command::AddChild => {
                self.tree.add_child(node)?;
                String::new()
            }
            Command::Remove => {
                self.tree.remove(node)?;
                String::new()
            }
            Command::GetAttr(name) => self
                .tree
                .attr(node, &name)
                .unwrap_or_default()
                .to_string(),
            Command::SetAttr(name, value) => {
                self.tree.set_attr(node, name, value);
                String::new()
            }
            Command::UnsetAttr(name) => {
                self.tree.unset_attr(node, &name);
                String::new()
            }
            Command::MoveWindow => {
                self.tree.claim_focused_window(node)?;
                String::new()
            }
            Command::Swap(sibling) => {
                if self.tree.parent(node).is_none() {
                    return Err(TreeError::SwapRoot.into());
                }
                let sibling = sibling.ok_or(CommandError::MissingSibling)?;
                match SwapTarget::parse(&sibling)? {
                    SwapTarget::Next => self.tree.swap_next(node)?,
                    SwapTarget::Prev => self.tree.swap_prev(node)?,
                    SwapTarget::Index(index) => {
                        let index = usize::try_from(index).map_err(|_| TreeError::InvalidSibling)?;
                        self.tree.swap_with(node, index)?
                    }
                }
                String::new()
            }
            Command::FocusedChild => self.tree.focused_child(node).to_string(),
            Command::ChildCount => self.tree.num_children(node).to_string(),
            Command::Print(name) => {
                let formatter = self.formatter(&name)?;
                self.tree
                    .desktop(node)
                    .map(|d| formatter.format(d))
                    .unwrap_or_default()
            }
            Command::Subscribe(name) => {
                let formatter = self.formatter(&name)?;
                if !request.extra.is_empty() {
                    warn!("subscribe: ignoring extra arguments {:?}", request.extra);
                }
                return Ok(Outcome::Subscribe { node, formatter });
            }
        };

        if !request.extra.is_empty() {
            return Err(CommandError::ExtraArguments(request.extra.join(" ")));
        }
        Ok(Outcome::Reply(Response::success(message)))
    }

    fn formatter(&self, name: &str) -> Result<Box<dyn Formatter>, CommandError> {
        formatter_by_name(name, &self.format).ok_or(CommandError::UnknownFormatter)
    }
}

//  Tests
