//! bspwm-specific implementations.
//!
//! This module provides the NUL-framed wire codec spoken by bspwm's control
//! socket, a [`WindowManager`](crate::traits::WindowManager) backend built on
//! it, and the plugin that exposes window-manager verbs.
//!
//! Nothing outside this module should reference bspwm directly.

pub mod actions;
pub mod wire;
pub mod wm;
