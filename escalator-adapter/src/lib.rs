//! Adapter utilities for the `escalator` crate.
//!
//! The `escalator` crate is UI-agnostic and focuses on the grid state. This crate provides
//! small, framework-neutral helpers commonly needed by adapters:
//!
//! - Touch inertia: single-finger drag tracking and flick deceleration (`std` only)
//! - Tween-based smooth scrolling helpers
//! - A [`Controller`] that feeds both into a [`escalator::Grid`] as synthetic scroll events
//!
//! This crate is intentionally framework-agnostic (no ratatui/egui bindings).
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod controller;
#[cfg(feature = "std")]
mod touch;
mod tween;

#[cfg(all(test, feature = "std"))]
mod tests;

pub use controller::Controller;
#[cfg(feature = "std")]
pub use touch::{
    Deceleration, ScrollExtent, TouchConfig, TouchInertiaController, TouchPhase, TouchPoint,
    TouchScroll,
};
pub use tween::{Easing, Tween};
