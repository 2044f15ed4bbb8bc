//! Platform abstraction layer
//!
//! The core is platform-independent. The browser binding provides:
//! - Canvas 2D drawing surface
//! - `setInterval`-backed scheduler with `performance.now()` clock
//! - Pointer/key/resize listeners with teardown
//! - Auto-pause on page visibility

#[cfg(target_arch = "wasm32")]
pub mod web;
