// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Two-axis servo output stage.
//!
//! [`PanTilt`] owns the commanded and target angle of both axes. Targets are written by
//! [`set_target`](PanTilt::set_target) (or by the tracking controller) and approached by a
//! rate-limited [`tick`](PanTilt::tick), which re-encodes the commanded angles to duty values on every
//! effective step.
//!
//! Typical usage pattern:
//!
//! ```ignore
//! let mut pan_tilt = PanTilt::new(pan_pwm, tilt_pwm, &TrackerConfig::default())?;
//! pan_tilt.attach()?;
//! pan_tilt.set_target(800, 600);
//!
//! loop {
//!     pan_tilt.tick(clock.now_ms());
//!     delay.delay_ms(10_u32);
//! }
//! ```

use embedded_hal::pwm::SetDutyCycle;

use crate::config::{ConfigError, CoordinateSpace, Smoothing, TrackerConfig, Travel};
use crate::motors::axis::AxisState;
use crate::motors::servo::Servo;

/// Pan/tilt output stage. Nothing moves until [`attach`](Self::attach) succeeds; before that every
/// operation is a no-op.
pub struct PanTilt<Pan, Tilt> {
    pan_servo: Servo<Pan>,
    tilt_servo: Servo<Tilt>,

    pan: AxisState,
    tilt: AxisState,

    travel: Travel,
    smoothing: Smoothing,
    coordinates: CoordinateSpace,

    /// Time of the last effective tick (ms)
    last_tick_ms: Option<u32>,
}

impl<Pan, Tilt> PanTilt<Pan, Tilt>
where
    Pan: SetDutyCycle,
    Tilt: SetDutyCycle,
{
    /// Build the output stage with both axes at the neutral angle. Nothing is written yet.
    pub fn new(pan_pwm: Pan, tilt_pwm: Tilt, config: &TrackerConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let neutral = config.travel.neutral();
        Ok(Self {
            pan_servo: Servo::new(pan_pwm, config.timing),
            tilt_servo: Servo::new(tilt_pwm, config.timing),
            pan: AxisState::at(neutral, &config.travel),
            tilt: AxisState::at(neutral, &config.travel),
            travel: config.travel,
            smoothing: config.smoothing,
            coordinates: config.coordinates,
            last_tick_ms: None,
        })
    }

    /// Enable both outputs and write the current commanded angles.
    ///
    /// Both channels are checked before either is written, so a failure leaves both detached.
    /// Calling this again re-checks the channels and re-writes the outputs.
    pub fn attach(&mut self) -> Result<(), ConfigError> {
        self.pan_servo.check()?;
        self.tilt_servo.check()?;

        self.pan_servo.attach(self.pan.commanded())?;
        self.tilt_servo.attach(self.tilt.commanded())?;
        Ok(())
    }

    /// True once both servos are attached.
    #[inline]
    pub fn is_attached(&self) -> bool {
        self.pan_servo.is_attached() && self.tilt_servo.is_attached()
    }

    /// Aim at a point in the input coordinate space.
    ///
    /// Coordinates are clamped to `[0, max]` and mapped inversely, so `(0, 0)` is full travel on both
    /// axes. Only the targets change; [`tick`](Self::tick) does the moving.
    pub fn set_target(&mut self, x: i32, y: i32) {
        let max_angle = self.pan_servo.timing().max_angle_deg;
        let pan = coordinate_to_angle(x, self.coordinates.max_x, max_angle);
        let tilt = coordinate_to_angle(y, self.coordinates.max_y, max_angle);
        self.set_target_angles(pan, tilt);
    }

    /// Set both targets in degrees, clamped to travel.
    pub fn set_target_angles(&mut self, pan_deg: f32, tilt_deg: f32) {
        if !self.is_attached() {
            return;
        }
        self.pan.retarget(pan_deg, &self.travel);
        self.tilt.retarget(tilt_deg, &self.travel);
    }

    /// Offset both targets from the current commanded angles.
    pub fn offset_target(&mut self, pan_delta: f32, tilt_delta: f32) {
        let pan = self.pan.commanded() + pan_delta;
        let tilt = self.tilt.commanded() + tilt_delta;
        self.set_target_angles(pan, tilt);
    }

    /// Offset both commanded angles and write them out immediately, bypassing smoothing.
    pub fn offset_commanded(&mut self, pan_delta: f32, tilt_delta: f32) {
        if !self.is_attached() {
            return;
        }
        self.pan.command(self.pan.commanded() + pan_delta, &self.travel);
        self.tilt.command(self.tilt.commanded() + tilt_delta, &self.travel);
        self.emit();
    }

    /// Send both axes to 0°, the far corner of the coordinate space.
    pub fn park(&mut self) {
        self.set_target(self.coordinates.max_x, self.coordinates.max_y);
    }

    /// Send both axes back to the neutral angle.
    pub fn center(&mut self) {
        let neutral = self.travel.neutral();
        self.set_target_angles(neutral, neutral);
    }

    /// Run one smoothing step if at least `interval_ms` has passed since the last one.
    ///
    /// `now_ms` is a free-running millisecond counter; wrap-around is handled. Safe to call more
    /// often than the interval. Returns `true` if the step ran and the outputs were rewritten.
    pub fn tick(&mut self, now_ms: u32) -> bool {
        if !self.is_attached() {
            return false;
        }

        if let Some(last) = self.last_tick_ms {
            if now_ms.wrapping_sub(last) < self.smoothing.interval_ms {
                return false;
            }
        }
        self.last_tick_ms = Some(now_ms);

        self.pan.approach(&self.smoothing, &self.travel);
        self.tilt.approach(&self.smoothing, &self.travel);
        self.emit();
        true
    }

    fn emit(&mut self) {
        self.pan_servo.write_angle(self.pan.commanded());
        self.tilt_servo.write_angle(self.tilt.commanded());
    }

    #[inline]
    pub fn pan(&self) -> &AxisState {
        &self.pan
    }

    #[inline]
    pub fn tilt(&self) -> &AxisState {
        &self.tilt
    }

    /// Last duty values written, `(pan, tilt)`.
    #[inline]
    pub fn duty(&self) -> (u16, u16) {
        (self.pan_servo.duty(), self.tilt_servo.duty())
    }

    /// True when both axes have reached their targets.
    #[inline]
    pub fn settled(&self) -> bool {
        self.pan.settled() && self.tilt.settled()
    }

    /// Release the PWM channels.
    pub fn free(self) -> (Pan, Tilt) {
        (self.pan_servo.free(), self.tilt_servo.free())
    }
}

/// Inverse linear map from `[0, max_coord]` to `[max_angle, 0]`, clamping the coordinate first.
pub fn coordinate_to_angle(coord: i32, max_coord: i32, max_angle_deg: f32) -> f32 {
    let coord = coord.clamp(0, max_coord);
    max_angle_deg - (coord as f32 * max_angle_deg / max_coord as f32)
}
