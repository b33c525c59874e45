//! **metadesk** — a hierarchical desktop tree on top of bspwm.
//!
//! Desktops form a tree: every leaf is one physical bspwm desktop, every
//! interior node a group of desktops that is navigated as a unit.  A
//! long-lived daemon owns the tree and serves short-lived clients (`mdc`)
//! over a Unix socket, one request per connection.  Status bars can
//! subscribe to a desktop and receive a fresh rendering after every request.
//!
//! # Architecture
//!
//! The crate is organised around two core traits:
//!
//! * [`traits::WindowManager`] — abstracts creating, focusing and querying
//!   physical desktops so the tree logic is not coupled to bspwm.
//! * [`traits::Formatter`] — abstracts rendering a desktop to text so the
//!   protocol is not coupled to any particular status bar.
//!
//! The tree lives in [`tree`] (structure) and [`focus`] (focus path and
//! idle-desktop reclamation).  [`daemon`] applies [`command`]s to it and
//! drives the [`ipc`] socket and subscriptions.  Concrete implementations
//! live in [`bspwm`] and [`format`].

pub mod bspwm;
pub mod command;
pub mod config;
pub mod daemon;
pub mod focus;
pub mod format;
pub mod ipc;
pub mod traits;
pub mod tree;

#[cfg(test)]
mod testing;
