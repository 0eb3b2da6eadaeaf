// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Control Algorithms
//!
//! This module provides the closed-loop tracking logic for the pan/tilt head.
//!
//! ## Modules
//!
//! - [`pd`] - PD controller with dead zone.
//! - [`tracker`] - Two-axis tracking controller producing signed angle increments.
//! - [`pan_tilt_tracker`] - Tracking controller wired to the smoothed servo output stage.

pub mod pan_tilt_tracker;
pub mod pd;
pub mod tracker;

pub use pan_tilt_tracker::{PanTiltTracker, PositionSource, TrackingMode};
pub use pd::{Pd, PdGains};
pub use tracker::{AngleDelta, Direction, Point, TrackingController};
