// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

#![no_main]
#![no_std]

use core::fmt::Write;

use cortex_m::delay::Delay;
use cortex_m_rt::entry;
use panic_halt as _;

use hal::{
    pac,
    prelude::*,
    serial::{Config, Serial},
};
use stm32f7xx_hal as hal;

use pantilt::config::TrackerConfig;
use pantilt::control::{PanTiltTracker, TrackingMode};
use pantilt::hw::{Millis, ServoTimer, Usart};
use pantilt::protocol::{Command, Parser};

/// Control loop period (ms)
const LOOP_MS: u32 = 10;

/// Status line period (ms)
const STATUS_MS: u32 = 500;

#[entry]
fn main() -> ! {
    // Peripherals
    let dp = pac::Peripherals::take().unwrap();
    let mut cp = cortex_m::Peripherals::take().unwrap();

    // Clocks. With the default tree APB1 is undivided, so TIM4 runs at SYSCLK.
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze();
    let sysclk = clocks.sysclk().raw();

    let mut delay = Delay::new(cp.SYST, sysclk);
    let mut clock = Millis::new(&mut cp.DCB, &mut cp.DWT, sysclk);

    // GPIO
    let gpioa = dp.GPIOA.split();
    let gpiod = dp.GPIOD.split();

    // USART1 (DBG + commands)
    let tx = gpioa.pa9.into_alternate::<7>();
    let rx = gpioa.pa10.into_alternate::<7>();
    let usart_cfg = Config {
        baud_rate: 115_200.bps(),
        ..Default::default()
    };
    let serial = Serial::new(dp.USART1, (tx, rx), &clocks, usart_cfg);
    let mut usart = Usart::new(serial);

    usart.println("pantilt: boot");

    // TIM4 CH1 (PD12) = pan, CH2 (PD13) = tilt
    let _pan_pin = gpiod.pd12.into_alternate::<2>();
    let _tilt_pin = gpiod.pd13.into_alternate::<2>();

    let mut config = TrackerConfig::default();
    if let Err(e) = config.validate() {
        let _ = writeln!(usart, "config: {}\r", e);
        panic!();
    }

    let (timer, pan_pwm, tilt_pwm) = match ServoTimer::tim4(dp.TIM4, sysclk, &config.timing) {
        Ok(parts) => parts,
        Err(e) => {
            let _ = writeln!(usart, "servo timer: {}\r", e);
            panic!();
        }
    };
    // Scale duty against the frame the prescaler really produces.
    config.timing = config.timing.with_realized_period_us(timer.period_us());
    let _ = writeln!(
        usart,
        "servo timer: {} Hz ({:.1} us), {}-bit, pulse {}..{} us\r",
        timer.frequency_hz(),
        timer.period_us(),
        config.timing.resolution_bits,
        config.timing.min_pulse_us,
        config.timing.max_pulse_us,
    );

    let mut tracker = match PanTiltTracker::new(pan_pwm, tilt_pwm, &config) {
        Ok(t) => t.with_mode(TrackingMode::Smoothed),
        Err(e) => {
            let _ = writeln!(usart, "tracker: {}\r", e);
            panic!();
        }
    };

    if let Err(e) = tracker.attach() {
        let _ = writeln!(usart, "attach: {}\r", e);
        panic!();
    }
    let (pan_duty, tilt_duty) = tracker.stage().duty();
    let _ = writeln!(usart, "attached: duty pan={} tilt={}\r", pan_duty, tilt_duty);

    let mut parser = Parser::default();
    let mut last_status_ms = clock.now_ms();

    loop {
        while let Some(byte) = usart.read_byte() {
            match parser.push(byte) {
                Some(Command::Track { observed, center }) => {
                    tracker.evaluate(observed, center);
                }
                Some(Command::Aim(p)) => {
                    tracker.set_target(p.x, p.y);
                    let _ = writeln!(usart, "aim: x={} y={}\r", p.x, p.y);
                }
                Some(Command::Park) => {
                    tracker.park();
                    usart.println("park");
                }
                Some(Command::Center) => {
                    tracker.center();
                    usart.println("center");
                }
                None => {}
            }
        }

        let now = clock.now_ms();
        tracker.tick(now);

        if now.wrapping_sub(last_status_ms) >= STATUS_MS {
            last_status_ms = now;
            let stage = tracker.stage();
            let (pan_duty, tilt_duty) = stage.duty();
            let _ = writeln!(
                usart,
                "pan={:.1}->{:.1} ({}) tilt={:.1}->{:.1} ({})\r",
                stage.pan().commanded(),
                stage.pan().target(),
                pan_duty,
                stage.tilt().commanded(),
                stage.tilt().target(),
                tilt_duty,
            );
        }

        delay.delay_ms(LOOP_MS);
    }
}
