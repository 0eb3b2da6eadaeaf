// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Servo PWM via TIM4 in PWM mode 1.
//!
//! This module configures TIM4 registers so that the auto-reload value equals the full-scale duty of
//! the configured resolution (`2^bits - 1`), and the prescaler brings the frame rate as close as
//! possible to the configured frequency. The frame is usually a little short of nominal; the
//! realized length is exposed so the encoder can scale against it. CH1 (PD12) drives pan, CH2 (PD13) drives tilt.

use core::convert::Infallible;

use embedded_hal::pwm::{ErrorType, SetDutyCycle};
use stm32f7xx_hal::pac;

use crate::config::ConfigError;
use crate::motors::PwmTiming;

pub struct ServoTimer {
    tim: pac::TIM4,
    /// Frame rate actually produced (Hz)
    frequency_hz: u32,
    /// Frame length actually produced (µs)
    period_us: f64,
}

/// One TIM4 compare channel. `CH` is 1 or 2.
pub struct Tim4Channel<const CH: u8> {
    max_duty: u16,
}

impl ServoTimer {
    /// Configure TIM4 for `timing` and hand out the pan (CH1) and tilt (CH2) channels.
    ///
    /// `timer_clock_hz` is the TIM4 kernel clock. Fails if no 16-bit prescaler can reach the
    /// requested frequency at this resolution.
    pub fn tim4(
        tim4: pac::TIM4,
        timer_clock_hz: u32,
        timing: &PwmTiming,
    ) -> Result<(Self, Tim4Channel<1>, Tim4Channel<2>), ConfigError> {
        let frame = timing.timer_frame(timer_clock_hz)?;
        let prescaler = frame.prescaler;
        let arr = frame.reload;

        // Enable the TIM4 kernel clock
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim4en().set_bit());

        let tim = tim4;

        // Disable counter while configuring
        tim.cr1.modify(|_, w| w.cen().clear_bit());

        tim.psc.write(|w| unsafe { w.bits(prescaler - 1) });
        tim.arr.write(|w| unsafe { w.bits(arr) });

        // CH1/CH2: PWM mode 1 (OCxM = 0b110) with compare preload (OCxPE)
        tim.ccmr1_output()
            .write(|w| unsafe { w.bits((0b110 << 4) | (1 << 3) | (0b110 << 12) | (1 << 11)) });

        // Outputs stay low until the first duty write
        tim.ccr1.write(|w| unsafe { w.bits(0) });
        tim.ccr2.write(|w| unsafe { w.bits(0) });

        tim.ccer.modify(|_, w| w.cc1e().set_bit().cc2e().set_bit());

        // Buffer ARR, latch PSC/ARR with an update event, then start
        tim.cr1.modify(|_, w| w.arpe().set_bit());
        tim.egr.write(|w| w.ug().set_bit());
        tim.cr1.modify(|_, w| w.cen().set_bit());

        let max_duty = timing.max_duty();
        Ok((
            Self {
                tim,
                frequency_hz: timer_clock_hz / (prescaler * (arr + 1)),
                period_us: frame.period_us,
            },
            Tim4Channel { max_duty },
            Tim4Channel { max_duty },
        ))
    }

    /// Frame rate actually produced after prescaler truncation.
    #[inline]
    pub fn frequency_hz(&self) -> u32 {
        self.frequency_hz
    }

    /// Frame length actually produced. Encode duty against this, see
    /// [`PwmTiming::with_realized_period_us`].
    #[inline]
    pub fn period_us(&self) -> f64 {
        self.period_us
    }

    /// Consume the wrapper and return the underlying timer peripheral.
    #[inline]
    pub fn free(self) -> pac::TIM4 {
        self.tim
    }
}

impl<const CH: u8> ErrorType for Tim4Channel<CH> {
    type Error = Infallible;
}

impl<const CH: u8> SetDutyCycle for Tim4Channel<CH> {
    #[inline]
    fn max_duty_cycle(&self) -> u16 {
        self.max_duty
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        // Each channel only ever touches its own compare register.
        let tim = unsafe { &*pac::TIM4::ptr() };
        match CH {
            1 => tim.ccr1.write(|w| unsafe { w.bits(duty as u32) }),
            _ => tim.ccr2.write(|w| unsafe { w.bits(duty as u32) }),
        }
        Ok(())
    }
}
