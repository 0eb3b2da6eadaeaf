// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Commanded/target angle pair for one servo axis.

#[allow(unused_imports)]
use micromath::F32Ext;

use crate::config::{Smoothing, Travel};

/// Angle state of one axis. Both angles stay inside the travel range.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AxisState {
    /// Angle last written to the servo (deg)
    commanded: f32,
    /// Angle the smoothing step is approaching (deg)
    target: f32,
}

impl AxisState {
    /// Start with both angles at `angle_deg`, clamped into `travel`.
    pub fn at(angle_deg: f32, travel: &Travel) -> Self {
        let angle = travel.clamp(angle_deg);
        Self {
            commanded: angle,
            target: angle,
        }
    }

    #[inline]
    pub fn commanded(&self) -> f32 {
        self.commanded
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Set a new goal; the commanded angle is untouched.
    pub fn retarget(&mut self, angle_deg: f32, travel: &Travel) {
        self.target = travel.clamp(angle_deg);
    }

    /// Jump straight to `angle_deg`, leaving nothing for the smoothing step to do.
    pub fn command(&mut self, angle_deg: f32, travel: &Travel) {
        let angle = travel.clamp(angle_deg);
        self.commanded = angle;
        self.target = angle;
    }

    /// Move the commanded angle one step toward the target.
    ///
    /// Within `snap_deg` the target is assigned exactly, otherwise a fixed fraction of the
    /// remaining distance is covered. Returns the new commanded angle.
    pub fn approach(&mut self, smoothing: &Smoothing, travel: &Travel) -> f32 {
        let diff = self.target - self.commanded;
        if diff.abs() < smoothing.snap_deg {
            self.commanded = self.target;
        } else {
            self.commanded = travel.clamp(self.commanded + diff * smoothing.factor);
        }
        self.commanded
    }

    #[inline]
    pub fn settled(&self) -> bool {
        self.commanded == self.target
    }
}
