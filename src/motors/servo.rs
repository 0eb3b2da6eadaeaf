// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Hobby servo on a single PWM channel.
//!
//! This module converts between a servo angle and the duty value written to the timer, using the
//! pulse-width range and duty resolution from [`PwmTiming`].
//!
//! Standard timing at 50 Hz (20 ms period), 0.5 ms = 0°, 2.5 ms = 180°.

use embedded_hal::pwm::SetDutyCycle;

use crate::config::ConfigError;

/// PWM frame and pulse-width range of a servo.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PwmTiming {
    /// PWM frequency (Hz)
    pub frequency_hz: u32,
    /// Duty resolution (bits)
    pub resolution_bits: u8,
    /// Pulse width at 0° (µs)
    pub min_pulse_us: u32,
    /// Pulse width at `max_angle_deg` (µs)
    pub max_pulse_us: u32,
    /// Angle reached at `max_pulse_us`
    pub max_angle_deg: f32,
    /// Frame length the timer actually produces (µs), if it differs from `1 / frequency_hz`
    pub realized_period_us: Option<f64>,
}

/// Timer divider settings that realize a [`PwmTiming`] from a given kernel clock.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TimerFrame {
    /// Clock divider, `PSC + 1`
    pub prescaler: u32,
    /// Auto-reload value, equal to the full-scale duty
    pub reload: u32,
    /// Frame length produced by `prescaler` and `reload` (µs)
    pub period_us: f64,
}

impl PwmTiming {
    /// Reject timings that cannot be encoded.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frequency_hz == 0 {
            return Err(ConfigError::ZeroFrequency);
        }
        if !(1..=16).contains(&self.resolution_bits) {
            return Err(ConfigError::Resolution);
        }
        if self.min_pulse_us >= self.max_pulse_us {
            return Err(ConfigError::PulseRange);
        }
        if self.max_pulse_us > self.period_us() {
            return Err(ConfigError::PulseExceedsPeriod);
        }
        if let Some(realized) = self.realized_period_us {
            if !(realized.is_finite() && realized >= self.max_pulse_us as f64) {
                return Err(ConfigError::PulseExceedsPeriod);
            }
        }
        if !(self.max_angle_deg > 0.0) {
            return Err(ConfigError::MaxAngle);
        }
        Ok(())
    }

    /// Encode against the frame length the timer really produces.
    pub fn with_realized_period_us(mut self, period_us: f64) -> Self {
        self.realized_period_us = Some(period_us);
        self
    }

    /// Full-scale duty value, `2^bits - 1`.
    #[inline]
    pub fn max_duty(&self) -> u16 {
        ((1u32 << self.resolution_bits) - 1) as u16
    }

    /// Nominal PWM period in microseconds.
    #[inline]
    pub fn period_us(&self) -> u32 {
        1_000_000 / self.frequency_hz
    }

    /// Period the duty is scaled against: the realized one if known, else nominal.
    #[inline]
    pub fn frame_us(&self) -> f64 {
        self.realized_period_us.unwrap_or(self.period_us() as f64)
    }

    /// Divider settings for a timer clocked at `timer_clock_hz` whose auto-reload equals
    /// [`max_duty`](Self::max_duty).
    ///
    /// The prescaler is truncated, so the realized frame can be shorter than the nominal one; feed
    /// [`TimerFrame::period_us`] back through [`with_realized_period_us`](Self::with_realized_period_us)
    /// so duty values still produce the intended pulse widths.
    pub fn timer_frame(&self, timer_clock_hz: u32) -> Result<TimerFrame, ConfigError> {
        self.validate()?;

        let reload = self.max_duty() as u32;
        let ticks_per_frame = (reload as u64 + 1) * self.frequency_hz as u64;
        let prescaler = timer_clock_hz as u64 / ticks_per_frame;
        if prescaler == 0 || prescaler > 0x1_0000 {
            return Err(ConfigError::TimerPrescaler);
        }

        let period_us = (prescaler * (reload as u64 + 1)) as f64 * 1e6 / timer_clock_hz as f64;
        if period_us < self.max_pulse_us as f64 {
            return Err(ConfigError::TimerPrescaler);
        }

        Ok(TimerFrame {
            prescaler: prescaler as u32,
            reload,
            period_us,
        })
    }

    /// Pulse width for an angle in `[0, max_angle_deg]`.
    ///
    /// The width is kept fractional rather than rounded to whole microseconds, so the duty below is
    /// truncated exactly once. This differs from an integer-µs pipeline by one duty step at some
    /// angles (0.4° gives 413 here, 412 there).
    pub fn pulse_width_us(&self, angle_deg: f32) -> f64 {
        let alpha = angle_deg as f64 / self.max_angle_deg as f64;
        let span = (self.max_pulse_us - self.min_pulse_us) as f64;
        self.min_pulse_us as f64 + alpha * span
    }

    /// Quantize a pulse width to the timer's duty resolution, truncating toward zero.
    pub fn pulse_to_duty(&self, pulse_us: f64) -> u16 {
        let duty = pulse_us * self.max_duty() as f64 / self.frame_us();
        // `as` truncates, which is the floor for the non-negative pulses produced above.
        duty as u16
    }

    /// Encode an angle as a duty value.
    ///
    /// The angle must already be clamped to `[0, max_angle_deg]`; no clamping happens here.
    #[inline]
    pub fn angle_to_duty(&self, angle_deg: f32) -> u16 {
        self.pulse_to_duty(self.pulse_width_us(angle_deg))
    }
}

/// A servo driven by one PWM channel.
///
/// Stays detached (no output written) until [`attach`](Self::attach) is called.
pub struct Servo<P> {
    pwm: P,
    timing: PwmTiming,
    attached: bool,
    /// Last duty value written
    duty: u16,
}

impl<P: SetDutyCycle> Servo<P> {
    /// Wrap a PWM channel. Nothing is written yet.
    pub fn new(pwm: P, timing: PwmTiming) -> Self {
        Self {
            pwm,
            timing,
            attached: false,
            duty: 0,
        }
    }

    /// Enable output and move to `angle_deg` immediately.
    ///
    /// Fails if the channel's full-scale duty does not match the configured resolution, since every
    /// later write would land at the wrong pulse width.
    pub fn attach(&mut self, angle_deg: f32) -> Result<u16, ConfigError> {
        self.check()?;
        self.attached = true;
        Ok(self.write_angle(angle_deg))
    }

    /// Check the timing and the channel's duty scale without writing anything.
    pub fn check(&self) -> Result<(), ConfigError> {
        self.timing.validate()?;
        if self.pwm.max_duty_cycle() != self.timing.max_duty() {
            return Err(ConfigError::DutyScale);
        }
        Ok(())
    }

    /// Encode `angle_deg` and write it to the channel. Returns the duty written.
    pub fn write_angle(&mut self, angle_deg: f32) -> u16 {
        let duty = self.timing.angle_to_duty(angle_deg);
        // Writes to a configured compare register do not fail.
        self.pwm.set_duty_cycle(duty).ok();
        self.duty = duty;
        duty
    }

    #[inline]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Last duty value written.
    #[inline]
    pub fn duty(&self) -> u16 {
        self.duty
    }

    #[inline]
    pub fn timing(&self) -> &PwmTiming {
        &self.timing
    }

    /// Release the PWM channel.
    pub fn free(self) -> P {
        self.pwm
    }
}
