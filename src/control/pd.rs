// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! PD controller with a dead zone, for incremental position tracking.
//!
//! Works in `no_std` and does not allocate memory.

#[allow(unused_imports)]
use micromath::F32Ext;

/// Proportional and derivative gains. Fixed once the controller is built.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PdGains {
    /// Proportional gain
    pub kp: f32,
    /// Derivative gain
    pub kd: f32,
}

impl PdGains {
    pub const fn new(kp: f32, kd: f32) -> Self {
        Self { kp, kd }
    }
}

/// PD controller acting on a raw error signal.
///
/// Errors with magnitude below the dead zone are replaced by exactly zero before anything else,
/// including what is remembered for the next derivative. Crossing the dead-zone edge therefore
/// produces a step in the derivative term.
pub struct Pd {
    gains: PdGains,

    /// Errors with `|e| < dead_zone` are treated as zero
    dead_zone: f32,

    /// Last (post-dead-zone) error, for the derivative term
    prev_error: f32,
}

impl Pd {
    /// Create a new PD controller with no dead zone.
    pub fn new(gains: PdGains) -> Self {
        Self {
            gains,
            dead_zone: 0.0,
            prev_error: 0.0,
        }
    }

    /// Set the dead zone.
    pub fn with_dead_zone(mut self, dead_zone: f32) -> Self {
        self.dead_zone = dead_zone;
        self
    }

    /// Forget the derivative history.
    pub fn reset(&mut self) {
        self.prev_error = 0.0;
    }

    /// Update the controller with a new error sample.
    ///
    /// `error`: observed minus desired, in source units.
    ///
    /// Returns `kp * e + kd * (e - e_prev)`, where `e` is the error after the dead zone. Called once
    /// per observation; there is no time step, so `kd` is in units of "per sample".
    pub fn update(&mut self, error: f32) -> f32 {
        let error = if error.abs() < self.dead_zone { 0.0 } else { error };

        // ----- P term -----
        let p = self.gains.kp * error;

        // ----- D term -----
        let d = self.gains.kd * (error - self.prev_error);
        self.prev_error = error;

        p + d
    }

    #[inline]
    pub fn gains(&self) -> PdGains {
        self.gains
    }

    #[inline]
    pub fn dead_zone(&self) -> f32 {
        self.dead_zone
    }

    /// Error remembered from the last update (after the dead zone).
    #[inline]
    pub fn prev_error(&self) -> f32 {
        self.prev_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn controller() -> Pd {
        Pd::new(PdGains::new(0.07, 0.10)).with_dead_zone(3.0)
    }

    #[test]
    fn starts_with_zero_history() {
        assert_eq!(controller().prev_error(), 0.0);
    }

    #[test]
    fn first_update_uses_zero_previous_error() {
        let mut pd = controller();
        // 0.07 * 10 + 0.10 * (10 - 0)
        assert_relative_eq!(pd.update(10.0), 1.7, epsilon = 1e-6);
        assert_eq!(pd.prev_error(), 10.0);
    }

    #[test]
    fn derivative_uses_previous_sample() {
        let mut pd = controller();
        pd.update(10.0);
        // 0.07 * 4 + 0.10 * (4 - 10)
        assert_relative_eq!(pd.update(4.0), -0.32, epsilon = 1e-6);
    }

    #[test]
    fn error_at_dead_zone_edge_is_kept() {
        let mut pd = controller();
        let out = pd.update(3.0);
        assert!(out != 0.0);
        assert_eq!(pd.prev_error(), 3.0);

        let mut pd = controller();
        pd.update(-3.0);
        assert_eq!(pd.prev_error(), -3.0);
    }

    #[test]
    fn error_inside_dead_zone_is_zeroed() {
        let mut pd = controller();
        for e in [2.0, -2.0, 2.999, 0.0] {
            assert_eq!(pd.update(e), 0.0);
            assert_eq!(pd.prev_error(), 0.0);
        }
    }

    #[test]
    fn entering_dead_zone_kicks_derivative() {
        let mut pd = controller();
        pd.update(20.0);

        // Error drops to 2, which is zeroed: output is purely -kd * 20.
        assert_relative_eq!(pd.update(2.0), -2.0, epsilon = 1e-6);
        assert_eq!(pd.prev_error(), 0.0);
    }

    #[test]
    fn reset_clears_history() {
        let mut pd = controller();
        pd.update(50.0);
        pd.reset();
        assert_eq!(pd.prev_error(), 0.0);
        assert_relative_eq!(pd.update(10.0), 1.7, epsilon = 1e-6);
    }
}
