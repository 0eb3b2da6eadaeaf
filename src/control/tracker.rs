// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Two-axis tracking controller.
//!
//! Turns the offset between an observed point and the desired center into signed angle increments
//! for the pan and tilt servos. Each axis runs its own [`Pd`]; the axes are not coupled.

use crate::config::TrackerConfig;
use crate::control::{Pd, PdGains};

/// A point in the position source's coordinate space.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Which way a positive controller output turns the servo. Depends on how the servo is mounted.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Output is added to the angle.
    Forward,
    /// Output is subtracted from the angle.
    Reverse,
}

impl Direction {
    #[inline]
    pub fn apply(self, output: f32) -> f32 {
        match self {
            Direction::Forward => output,
            Direction::Reverse => -output,
        }
    }
}

/// Signed angle increments (deg) for both axes.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct AngleDelta {
    pub pan: f32,
    pub tilt: f32,
}

/// PD tracking on two independent axes: horizontal error drives pan, vertical error drives tilt.
pub struct TrackingController {
    pan: Pd,
    tilt: Pd,
    pan_direction: Direction,
    tilt_direction: Direction,
}

impl TrackingController {
    /// Create a controller with the same dead zone on both axes.
    pub fn new(
        pan: PdGains,
        tilt: PdGains,
        pan_direction: Direction,
        tilt_direction: Direction,
        dead_zone: f32,
    ) -> Self {
        Self {
            pan: Pd::new(pan).with_dead_zone(dead_zone),
            tilt: Pd::new(tilt).with_dead_zone(dead_zone),
            pan_direction,
            tilt_direction,
        }
    }

    /// Build from a tracker configuration.
    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(
            config.pan.gains,
            config.tilt.gains,
            config.pan.direction,
            config.tilt.direction,
            config.dead_zone,
        )
    }

    /// Run both PD loops on one observation.
    ///
    /// The per-axis error is `observed - center`. The returned increments already carry the mounting
    /// direction and are meant to be added to the current commanded angles.
    pub fn evaluate(&mut self, observed: Point, center: Point) -> AngleDelta {
        let error_x = observed.x as f32 - center.x as f32;
        let error_y = observed.y as f32 - center.y as f32;

        AngleDelta {
            pan: self.pan_direction.apply(self.pan.update(error_x)),
            tilt: self.tilt_direction.apply(self.tilt.update(error_y)),
        }
    }

    /// Forget the derivative history of both axes.
    pub fn reset(&mut self) {
        self.pan.reset();
        self.tilt.reset();
    }

    #[inline]
    pub fn pan(&self) -> &Pd {
        &self.pan
    }

    #[inline]
    pub fn tilt(&self) -> &Pd {
        &self.tilt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const CENTER: Point = Point::new(160, 120);

    fn controller() -> TrackingController {
        TrackingController::from_config(&TrackerConfig::default())
    }

    #[test]
    fn centered_target_gives_no_motion() {
        let mut ctl = controller();
        let delta = ctl.evaluate(CENTER, CENTER);
        assert_eq!(delta, AngleDelta::default());
    }

    #[test]
    fn dead_zone_boundary() {
        let mut ctl = controller();

        // |error| = 2 < 3: zeroed.
        let delta = ctl.evaluate(Point::new(162, 120), CENTER);
        assert_eq!(delta.pan, 0.0);
        assert_eq!(ctl.pan().prev_error(), 0.0);

        // |error| = 3 is not below the dead zone: kept.
        let delta = ctl.evaluate(Point::new(163, 120), CENTER);
        assert!(delta.pan != 0.0);
        assert_eq!(ctl.pan().prev_error(), 3.0);
    }

    #[test]
    fn default_directions_pan_subtracts_tilt_adds() {
        let mut ctl = controller();
        let delta = ctl.evaluate(Point::new(170, 130), CENTER);

        // kp * 10 + kd * 10 = 1.7 on each axis
        assert_relative_eq!(delta.pan, -1.7, epsilon = 1e-6);
        assert_relative_eq!(delta.tilt, 1.7, epsilon = 1e-6);
    }

    #[test]
    fn directions_are_configurable() {
        let cfg = TrackerConfig::default().with_directions(Direction::Forward, Direction::Reverse);
        let mut ctl = TrackingController::from_config(&cfg);
        let delta = ctl.evaluate(Point::new(170, 130), CENTER);

        assert_relative_eq!(delta.pan, 1.7, epsilon = 1e-6);
        assert_relative_eq!(delta.tilt, -1.7, epsilon = 1e-6);
    }

    #[test]
    fn axes_are_independent() {
        let mut ctl = controller();
        let delta = ctl.evaluate(Point::new(260, 121), CENTER);

        assert!(delta.pan != 0.0);
        assert_eq!(delta.tilt, 0.0);
        assert_eq!(ctl.tilt().prev_error(), 0.0);
        assert_eq!(ctl.pan().prev_error(), 100.0);
    }

    #[test]
    fn out_of_frame_observation_is_just_a_large_error() {
        let mut ctl = controller();
        let delta = ctl.evaluate(Point::new(-10_000, 50_000), CENTER);
        assert!(delta.pan > 0.0);
        assert!(delta.tilt > 0.0);
    }

    #[test]
    fn reset_clears_both_axes() {
        let mut ctl = controller();
        ctl.evaluate(Point::new(200, 200), CENTER);
        ctl.reset();
        assert_eq!(ctl.pan().prev_error(), 0.0);
        assert_eq!(ctl.tilt().prev_error(), 0.0);
    }
}
