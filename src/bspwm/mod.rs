//! bspwm-specific implementations.
//!
//! This module provides the concrete backend for the
//! [`WindowManager`](crate::traits::WindowManager) trait, driven through
//! `bspc`.
//!
//! Nothing outside this module should reference bspwm directly.

pub mod wm;
