// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pan/tilt configuration.
//!
//! Compile-time defaults for the tracker, plus the [`TrackerConfig`] aggregate that is built once at
//! startup and validated before any hardware is touched.

use core::fmt;

use crate::control::{Direction, PdGains};
use crate::motors::servo::PwmTiming;

// ----- Coordinate space of the position source -----
pub const CAMERA_MAX_X: i32 = 1600;
pub const CAMERA_MAX_Y: i32 = 1200;

// ----- Servo PWM -----
pub const SERVO_FREQUENCY_HZ: u32 = 50;
pub const SERVO_RESOLUTION_BITS: u8 = 14;
pub const SERVO_MIN_PULSE_US: u32 = 500;
pub const SERVO_MAX_PULSE_US: u32 = 2500;
pub const SERVO_MAX_ANGLE_DEG: f32 = 180.0;

// ----- Mechanical travel -----
pub const SERVO_MIN_TRAVEL_DEG: f32 = 0.0;
pub const SERVO_MAX_TRAVEL_DEG: f32 = 180.0;

// ----- Smoothing -----
pub const SERVO_UPDATE_MS: u32 = 20;
pub const SERVO_SMOOTH_FACTOR: f32 = 0.02;
pub const SERVO_SNAP_DEG: f32 = 0.1;

// ----- PD tracking -----
pub const KP_PAN: f32 = 0.07;
pub const KD_PAN: f32 = 0.10;
pub const KP_TILT: f32 = 0.07;
pub const KD_TILT: f32 = 0.10;

/// Errors smaller than this (in source units) are treated as zero.
pub const DEAD_ZONE: f32 = 3.0;

/// Why a configuration was rejected.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// PWM frequency of 0 Hz.
    ZeroFrequency,
    /// Duty resolution outside 1..=16 bits.
    Resolution,
    /// `min_pulse_us >= max_pulse_us`.
    PulseRange,
    /// Longest pulse does not fit in one PWM period.
    PulseExceedsPeriod,
    /// Maximum servo angle is not a positive number.
    MaxAngle,
    /// Travel limits inverted or outside `[0, max_angle]`.
    Travel,
    /// Smoothing factor outside (0, 1).
    SmoothingFactor,
    /// Snap threshold not strictly positive.
    SnapThreshold,
    /// Negative dead zone.
    DeadZone,
    /// A PD gain is NaN or infinite.
    Gains,
    /// Coordinate space with a non-positive extent.
    CoordinateSpace,
    /// The PWM timer cannot realize the requested frequency and resolution.
    TimerPrescaler,
    /// A PWM channel's full-scale duty differs from the configured resolution.
    DutyScale,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ConfigError::ZeroFrequency => "PWM frequency must be non-zero",
            ConfigError::Resolution => "duty resolution must be 1..=16 bits",
            ConfigError::PulseRange => "min pulse width must be below max pulse width",
            ConfigError::PulseExceedsPeriod => "max pulse width exceeds the PWM period",
            ConfigError::MaxAngle => "max servo angle must be positive",
            ConfigError::Travel => "travel limits must satisfy 0 <= min <= max <= max angle",
            ConfigError::SmoothingFactor => "smoothing factor must be in (0, 1)",
            ConfigError::SnapThreshold => "snap threshold must be positive",
            ConfigError::DeadZone => "dead zone must be non-negative",
            ConfigError::Gains => "PD gains must be finite",
            ConfigError::CoordinateSpace => "coordinate space must have a positive extent",
            ConfigError::TimerPrescaler => "PWM timer cannot realize frequency at this resolution",
            ConfigError::DutyScale => "PWM channel duty scale does not match the resolution",
        };
        f.write_str(msg)
    }
}

/// Hardware travel limits in degrees (closed interval).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Travel {
    pub min_deg: f32,
    pub max_deg: f32,
}

impl Travel {
    /// Saturating clamp into the travel range.
    #[inline]
    pub fn clamp(&self, angle: f32) -> f32 {
        angle.clamp(self.min_deg, self.max_deg)
    }

    /// Midpoint of the travel range, used as the neutral position.
    #[inline]
    pub fn neutral(&self) -> f32 {
        (self.min_deg + self.max_deg) * 0.5
    }
}

/// Rate limiting for the output stage.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Smoothing {
    /// Fraction of the remaining distance covered per tick.
    pub factor: f32,
    /// Distance below which the commanded angle snaps onto the target.
    pub snap_deg: f32,
    /// Minimum time between effective ticks.
    pub interval_ms: u32,
}

/// Extent of the input coordinate space used by `set_target`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CoordinateSpace {
    pub max_x: i32,
    pub max_y: i32,
}

/// Gains and mounting direction for one axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AxisControl {
    pub gains: PdGains,
    pub direction: Direction,
}

/// Everything needed to build a tracker.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TrackerConfig {
    pub timing: PwmTiming,
    pub travel: Travel,
    pub smoothing: Smoothing,
    pub coordinates: CoordinateSpace,
    pub pan: AxisControl,
    pub tilt: AxisControl,
    pub dead_zone: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            timing: PwmTiming {
                frequency_hz: SERVO_FREQUENCY_HZ,
                resolution_bits: SERVO_RESOLUTION_BITS,
                min_pulse_us: SERVO_MIN_PULSE_US,
                max_pulse_us: SERVO_MAX_PULSE_US,
                max_angle_deg: SERVO_MAX_ANGLE_DEG,
                realized_period_us: None,
            },
            travel: Travel {
                min_deg: SERVO_MIN_TRAVEL_DEG,
                max_deg: SERVO_MAX_TRAVEL_DEG,
            },
            smoothing: Smoothing {
                factor: SERVO_SMOOTH_FACTOR,
                snap_deg: SERVO_SNAP_DEG,
                interval_ms: SERVO_UPDATE_MS,
            },
            coordinates: CoordinateSpace {
                max_x: CAMERA_MAX_X,
                max_y: CAMERA_MAX_Y,
            },
            // Positive horizontal error turns the pan servo back on the stock mount.
            pan: AxisControl {
                gains: PdGains::new(KP_PAN, KD_PAN),
                direction: Direction::Reverse,
            },
            tilt: AxisControl {
                gains: PdGains::new(KP_TILT, KD_TILT),
                direction: Direction::Forward,
            },
            dead_zone: DEAD_ZONE,
        }
    }
}

impl TrackerConfig {
    /// Replace the PD gains of both axes.
    pub fn with_gains(mut self, pan: PdGains, tilt: PdGains) -> Self {
        self.pan.gains = pan;
        self.tilt.gains = tilt;
        self
    }

    /// Replace the mounting direction of both axes.
    pub fn with_directions(mut self, pan: Direction, tilt: Direction) -> Self {
        self.pan.direction = pan;
        self.tilt.direction = tilt;
        self
    }

    /// Set the dead zone in source units.
    pub fn with_dead_zone(mut self, dead_zone: f32) -> Self {
        self.dead_zone = dead_zone;
        self
    }

    /// Set the travel limits in degrees.
    pub fn with_travel(mut self, min_deg: f32, max_deg: f32) -> Self {
        self.travel = Travel { min_deg, max_deg };
        self
    }

    /// Set the smoothing parameters.
    pub fn with_smoothing(mut self, factor: f32, snap_deg: f32, interval_ms: u32) -> Self {
        self.smoothing = Smoothing {
            factor,
            snap_deg,
            interval_ms,
        };
        self
    }

    /// Set the input coordinate space used by `set_target`.
    pub fn with_coordinates(mut self, max_x: i32, max_y: i32) -> Self {
        self.coordinates = CoordinateSpace { max_x, max_y };
        self
    }

    /// Replace the PWM timing.
    pub fn with_timing(mut self, timing: PwmTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Check every field. Must pass before the output stage is attached.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timing.validate()?;

        let t = self.travel;
        // `!(a <= b)` also rejects NaN.
        if !(0.0 <= t.min_deg && t.min_deg <= t.max_deg && t.max_deg <= self.timing.max_angle_deg) {
            return Err(ConfigError::Travel);
        }

        let s = self.smoothing;
        if !(s.factor > 0.0 && s.factor < 1.0) {
            return Err(ConfigError::SmoothingFactor);
        }
        // A zero threshold lets the commanded angle stall short of the target.
        if !(s.snap_deg > 0.0) {
            return Err(ConfigError::SnapThreshold);
        }

        if !(self.dead_zone >= 0.0) {
            return Err(ConfigError::DeadZone);
        }

        for gains in [self.pan.gains, self.tilt.gains] {
            if !(gains.kp.is_finite() && gains.kd.is_finite()) {
                return Err(ConfigError::Gains);
            }
        }

        if self.coordinates.max_x <= 0 || self.coordinates.max_y <= 0 {
            return Err(ConfigError::CoordinateSpace);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = TrackerConfig::default();
        assert_eq!(cfg.validate(), Ok(()));
        assert_eq!(cfg.travel.neutral(), 90.0);
        assert_eq!(cfg.pan.direction, Direction::Reverse);
        assert_eq!(cfg.tilt.direction, Direction::Forward);
    }

    #[test]
    fn travel_clamp_saturates() {
        let travel = Travel {
            min_deg: 10.0,
            max_deg: 170.0,
        };
        assert_eq!(travel.clamp(-45.0), 10.0);
        assert_eq!(travel.clamp(500.0), 170.0);
        assert_eq!(travel.clamp(42.5), 42.5);
    }

    #[test]
    fn rejects_inverted_travel() {
        let cfg = TrackerConfig::default().with_travel(120.0, 60.0);
        assert_eq!(cfg.validate(), Err(ConfigError::Travel));
    }

    #[test]
    fn rejects_travel_beyond_servo_range() {
        let cfg = TrackerConfig::default().with_travel(0.0, 270.0);
        assert_eq!(cfg.validate(), Err(ConfigError::Travel));
    }

    #[test]
    fn rejects_smoothing_outside_unit_interval() {
        for factor in [0.0, 1.0, -0.5, f32::NAN] {
            let cfg = TrackerConfig::default().with_smoothing(factor, 0.1, 20);
            assert_eq!(cfg.validate(), Err(ConfigError::SmoothingFactor));
        }
    }

    #[test]
    fn rejects_negative_thresholds() {
        let cfg = TrackerConfig::default().with_smoothing(0.02, -0.1, 20);
        assert_eq!(cfg.validate(), Err(ConfigError::SnapThreshold));

        let cfg = TrackerConfig::default().with_dead_zone(-1.0);
        assert_eq!(cfg.validate(), Err(ConfigError::DeadZone));
    }

    #[test]
    fn rejects_zero_snap_threshold() {
        let cfg = TrackerConfig::default().with_smoothing(0.02, 0.0, 20);
        assert_eq!(cfg.validate(), Err(ConfigError::SnapThreshold));
    }

    #[test]
    fn rejects_non_finite_gains() {
        let ok = PdGains::new(KP_TILT, KD_TILT);
        for bad in [
            PdGains::new(f32::NAN, 0.1),
            PdGains::new(0.07, f32::INFINITY),
            PdGains::new(f32::NEG_INFINITY, 0.1),
        ] {
            let cfg = TrackerConfig::default().with_gains(bad, ok);
            assert_eq!(cfg.validate(), Err(ConfigError::Gains));

            let cfg = TrackerConfig::default().with_gains(ok, bad);
            assert_eq!(cfg.validate(), Err(ConfigError::Gains));
        }
    }

    #[test]
    fn rejects_empty_coordinate_space() {
        let cfg = TrackerConfig::default().with_coordinates(0, 1200);
        assert_eq!(cfg.validate(), Err(ConfigError::CoordinateSpace));
    }

    #[test]
    fn timing_errors_surface_through_tracker_config() {
        let mut timing = TrackerConfig::default().timing;
        timing.resolution_bits = 20;
        let cfg = TrackerConfig::default().with_timing(timing);
        assert_eq!(cfg.validate(), Err(ConfigError::Resolution));
    }
}
