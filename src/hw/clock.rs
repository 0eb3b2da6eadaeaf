// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Free-running millisecond clock from the Cortex-M7 DWT cycle counter.
//!
//! The 32-bit cycle counter wraps quickly at full core clock, so elapsed cycles are folded into a
//! millisecond count on every call. Call [`Millis::now_ms`] at least once per counter wrap (about
//! 20 s at 216 MHz); the main loop does so every few milliseconds.

use cortex_m::peripheral::{DCB, DWT};

pub struct Millis {
    cycles_per_ms: u32,
    last_cycles: u32,
    /// Cycles not yet folded into `ms`
    residual: u32,
    ms: u32,
}

impl Millis {
    /// Start the cycle counter. `core_clock_hz` is SYSCLK.
    pub fn new(dcb: &mut DCB, dwt: &mut DWT, core_clock_hz: u32) -> Self {
        dcb.enable_trace();
        // The M7 DWT is write-locked out of reset
        DWT::unlock();
        dwt.enable_cycle_counter();

        Self {
            cycles_per_ms: core_clock_hz / 1_000,
            last_cycles: DWT::cycle_count(),
            residual: 0,
            ms: 0,
        }
    }

    /// Milliseconds since [`Millis::new`], wrapping at `u32::MAX`.
    pub fn now_ms(&mut self) -> u32 {
        let now = DWT::cycle_count();
        let elapsed = now.wrapping_sub(self.last_cycles);
        self.last_cycles = now;

        let total = self.residual as u64 + elapsed as u64;
        let whole_ms = total / self.cycles_per_ms as u64;
        self.residual = (total % self.cycles_per_ms as u64) as u32;
        self.ms = self.ms.wrapping_add(whole_ms as u32);
        self.ms
    }
}
