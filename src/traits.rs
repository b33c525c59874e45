//! Core traits that decouple metadesk from any specific window manager or
//! output format.
//!
//! Every concrete backend (bspwm, a test recorder, …) implements
//! [`WindowManager`], and every renderer (tree dump, lemonbar, JSON, …)
//! implements [`Formatter`].  The [`DesktopTree`](crate::tree::DesktopTree)
//! and the [`Daemon`](crate::daemon::Daemon) only depend on these
//! abstractions.

use crate::tree::Desktop;

/// Abstraction over a window manager that owns the physical desktops.
///
/// Desktop ids are opaque strings meaningful only to the implementation.
/// An implementation might shell out to `bspc`, or it might be an
/// in-memory recorder used in tests.
pub trait WindowManager {
    /// The error type produced by this window manager.
    type Error: std::error::Error + Send + 'static;

    /// Return the id of the desktop that currently has focus.
    ///
    /// Called once at startup to bind the root of the tree.
    fn focused_desktop(&self) -> Result<String, Self::Error>;

    /// Create a new physical desktop and return its id.
    ///
    /// Implementations may recycle ids of previously destroyed desktops,
    /// but must never hand out an id that is still in use.
    fn create_desktop(&mut self) -> Result<String, Self::Error>;

    /// Destroy the physical desktop `id`.
    fn destroy_desktop(&mut self, id: &str) -> Result<(), Self::Error>;

    /// Give focus to the physical desktop `id`.
    fn focus_desktop(&self, id: &str) -> Result<(), Self::Error>;

    /// Whether the physical desktop `id` holds at least one window.
    fn is_occupied(&self, id: &str) -> Result<bool, Self::Error>;

    /// Move the currently focused window onto desktop `id`.
    fn claim_focused_window(&self, id: &str) -> Result<(), Self::Error>;
}

/// Renders a desktop (and whatever part of its subtree it cares about) into
/// a single chunk of text.
///
/// Formatters are used both for one-shot `--print` requests and for
/// subscriptions, which re-render on every tick.
pub trait Formatter {
    fn format(&self, desktop: Desktop<'_>) -> String;
}
