// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Closed-loop pan/tilt tracker.
//!
//! This combines a [`TrackingController`] with the [`PanTilt`] output stage. Observations go in
//! through [`evaluate`](PanTiltTracker::evaluate); absolute aiming goes through
//! [`set_target`](PanTiltTracker::set_target). In both cases [`tick`](PanTiltTracker::tick) must be
//! called periodically to drive the smoothing step.
//!
//! Typical usage pattern:
//!
//! ```ignore
//! let mut tracker = PanTiltTracker::new(pan_pwm, tilt_pwm, &TrackerConfig::default())?;
//! tracker.attach()?;
//!
//! loop {
//!     if let Some(seen) = camera.poll() {
//!         tracker.evaluate(seen, frame_center);
//!     }
//!     tracker.tick(clock.now_ms());
//!     delay.delay_ms(10_u32);
//! }
//! ```

use embedded_hal::pwm::SetDutyCycle;

use crate::config::{ConfigError, TrackerConfig};
use crate::control::{AngleDelta, Point, TrackingController};
use crate::motors::PanTilt;

/// Where the controller output goes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TrackingMode {
    /// Increments are applied to the commanded angle and written out at once.
    Direct,

    /// Increments move the target; [`PanTiltTracker::tick`] approaches it smoothly.
    Smoothed,
}

/// Anything that can report where the tracked object currently is.
pub trait PositionSource {
    /// Latest observation, or `None` if nothing new has been seen.
    fn poll(&mut self) -> Option<Point>;
}

/// PD tracking on top of a smoothed pan/tilt output stage.
pub struct PanTiltTracker<Pan, Tilt> {
    controller: TrackingController,
    stage: PanTilt<Pan, Tilt>,
    mode: TrackingMode,
}

impl<Pan, Tilt> PanTiltTracker<Pan, Tilt>
where
    Pan: SetDutyCycle,
    Tilt: SetDutyCycle,
{
    /// Create a tracker in [`TrackingMode::Direct`]. Fails if `config` does not validate.
    pub fn new(pan_pwm: Pan, tilt_pwm: Tilt, config: &TrackerConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            controller: TrackingController::from_config(config),
            stage: PanTilt::new(pan_pwm, tilt_pwm, config)?,
            mode: TrackingMode::Direct,
        })
    }

    /// Select where controller output is applied.
    pub fn with_mode(mut self, mode: TrackingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Switch mode at runtime. The derivative history is kept.
    pub fn set_mode(&mut self, mode: TrackingMode) {
        self.mode = mode;
    }

    #[inline]
    pub fn mode(&self) -> TrackingMode {
        self.mode
    }

    /// Enable the servos at the neutral angle.
    pub fn attach(&mut self) -> Result<(), ConfigError> {
        self.stage.attach()
    }

    #[inline]
    pub fn is_attached(&self) -> bool {
        self.stage.is_attached()
    }

    /// Run one PD update for an observed point against the desired center.
    ///
    /// Does nothing, and returns `None`, until the servos are attached; the derivative history is
    /// left untouched in that case. Otherwise returns the increments that were applied.
    pub fn evaluate(&mut self, observed: Point, center: Point) -> Option<AngleDelta> {
        if !self.stage.is_attached() {
            return None;
        }

        let delta = self.controller.evaluate(observed, center);
        match self.mode {
            TrackingMode::Direct => self.stage.offset_commanded(delta.pan, delta.tilt),
            TrackingMode::Smoothed => self.stage.offset_target(delta.pan, delta.tilt),
        }
        Some(delta)
    }

    /// Poll `source` once and evaluate the observation if there is one.
    pub fn follow<S: PositionSource>(
        &mut self,
        source: &mut S,
        center: Point,
    ) -> Option<AngleDelta> {
        let observed = source.poll()?;
        self.evaluate(observed, center)
    }

    /// Aim at an absolute point in the coordinate space. See [`PanTilt::set_target`].
    pub fn set_target(&mut self, x: i32, y: i32) {
        self.stage.set_target(x, y);
    }

    /// Move both axes to 0°.
    pub fn park(&mut self) {
        self.stage.park();
    }

    /// Move both axes to neutral and drop the derivative history.
    pub fn center(&mut self) {
        self.controller.reset();
        self.stage.center();
    }

    /// Periodic smoothing step. See [`PanTilt::tick`].
    #[inline]
    pub fn tick(&mut self, now_ms: u32) -> bool {
        self.stage.tick(now_ms)
    }

    /// Access the output stage.
    #[inline]
    pub fn stage(&self) -> &PanTilt<Pan, Tilt> {
        &self.stage
    }

    /// Access the controller.
    #[inline]
    pub fn controller(&self) -> &TrackingController {
        &self.controller
    }

    /// Release the PWM channels.
    pub fn free(self) -> (Pan, Tilt) {
        self.stage.free()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motors::servo::tests::RecordingPwm;
    use approx::assert_relative_eq;

    const CENTER: Point = Point::new(800, 600);

    fn tracker(mode: TrackingMode) -> PanTiltTracker<RecordingPwm, RecordingPwm> {
        PanTiltTracker::new(
            RecordingPwm::new(14),
            RecordingPwm::new(14),
            &TrackerConfig::default(),
        )
        .unwrap()
        .with_mode(mode)
    }

    struct Script<'a> {
        points: &'a [Point],
        next: usize,
    }

    impl PositionSource for Script<'_> {
        fn poll(&mut self) -> Option<Point> {
            let p = self.points.get(self.next).copied();
            self.next += 1;
            p
        }
    }

    #[test]
    fn evaluate_before_attach_is_a_no_op() {
        let mut t = tracker(TrackingMode::Direct);

        assert_eq!(t.evaluate(Point::new(900, 700), CENTER), None);
        assert_eq!(t.controller().pan().prev_error(), 0.0);
        assert_eq!(t.stage().pan().commanded(), 90.0);

        let (pan, tilt) = t.free();
        assert!(pan.writes.is_empty());
        assert!(tilt.writes.is_empty());
    }

    #[test]
    fn direct_mode_writes_immediately() {
        let mut t = tracker(TrackingMode::Direct);
        t.attach().unwrap();

        let delta = t.evaluate(Point::new(810, 610), CENTER).unwrap();
        assert_relative_eq!(delta.pan, -1.7, epsilon = 1e-6);
        assert_relative_eq!(delta.tilt, 1.7, epsilon = 1e-6);

        assert_relative_eq!(t.stage().pan().commanded(), 88.3, epsilon = 1e-4);
        assert_relative_eq!(t.stage().tilt().commanded(), 91.7, epsilon = 1e-4);
        assert!(t.stage().settled());

        let (pan, _) = t.free();
        assert_eq!(pan.writes.len(), 2);
    }

    #[test]
    fn smoothed_mode_moves_target_only() {
        let mut t = tracker(TrackingMode::Smoothed);
        t.attach().unwrap();

        t.evaluate(Point::new(810, 610), CENTER);
        assert_eq!(t.stage().pan().commanded(), 90.0);
        assert_relative_eq!(t.stage().pan().target(), 88.3, epsilon = 1e-4);

        assert!(t.tick(0));
        let pan = t.stage().pan().commanded();
        assert!(pan < 90.0 && pan > 88.3);
    }

    #[test]
    fn direct_mode_clamps_at_travel_limits() {
        let mut t = tracker(TrackingMode::Direct);
        t.attach().unwrap();

        for _ in 0..50 {
            t.evaluate(Point::new(1600, 0), CENTER);
            let pan = t.stage().pan().commanded();
            let tilt = t.stage().tilt().commanded();
            assert!((0.0..=180.0).contains(&pan));
            assert!((0.0..=180.0).contains(&tilt));
        }

        assert_eq!(t.stage().pan().commanded(), 0.0);
        assert_eq!(t.stage().tilt().commanded(), 0.0);
    }

    #[test]
    fn dead_zone_holds_position() {
        let mut t = tracker(TrackingMode::Direct);
        t.attach().unwrap();

        let delta = t.evaluate(Point::new(802, 598), CENTER).unwrap();
        assert_eq!(delta, AngleDelta::default());
        assert_eq!(t.stage().pan().commanded(), 90.0);
        assert_eq!(t.stage().tilt().commanded(), 90.0);
    }

    #[test]
    fn set_target_path_still_works_alongside_tracking() {
        let mut t = tracker(TrackingMode::Smoothed);
        t.attach().unwrap();

        t.set_target(0, 0);
        assert_eq!(t.stage().pan().target(), 180.0);

        t.park();
        assert_eq!(t.stage().tilt().target(), 0.0);
    }

    #[test]
    fn center_resets_history_and_target() {
        let mut t = tracker(TrackingMode::Smoothed);
        t.attach().unwrap();

        t.evaluate(Point::new(900, 700), CENTER);
        t.center();

        assert_eq!(t.controller().pan().prev_error(), 0.0);
        assert_eq!(t.stage().pan().target(), 90.0);
        assert_eq!(t.stage().tilt().target(), 90.0);
    }

    #[test]
    fn follow_consumes_source() {
        let mut t = tracker(TrackingMode::Direct);
        t.attach().unwrap();

        let points = [Point::new(820, 600)];
        let mut source = Script {
            points: &points,
            next: 0,
        };

        assert!(t.follow(&mut source, CENTER).is_some());
        assert!(t.stage().pan().commanded() < 90.0);

        assert_eq!(t.follow(&mut source, CENTER), None);
    }

    #[test]
    fn non_finite_gains_are_rejected_up_front() {
        let cfg = TrackerConfig::default().with_gains(
            crate::control::PdGains::new(f32::NAN, 0.1),
            crate::control::PdGains::new(0.07, 0.1),
        );
        let result = PanTiltTracker::new(RecordingPwm::new(14), RecordingPwm::new(14), &cfg);
        assert_eq!(result.err(), Some(ConfigError::Gains));
    }
}
