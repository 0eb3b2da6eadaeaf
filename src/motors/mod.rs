// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Actuator Abstractions
//!
//! This module contains the servo-level wrappers that sit above the raw PWM channels.
//!
//! ## Modules
//!
//! - [`servo`] - Angle to pulse-width to duty encoding for one PWM channel.
//! - [`axis`] - Commanded/target angle pair with smoothing.
//! - [`pan_tilt`] - Two-axis output stage built on `Servo`.

pub mod axis;
pub mod pan_tilt;
pub mod servo;

pub use axis::AxisState;
pub use pan_tilt::PanTilt;
pub use servo::{PwmTiming, Servo, TimerFrame};
