// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! MCU-level wrappers for the STM32F777 board.

pub mod clock;
pub mod servo_pwm;
pub mod usart;

pub use clock::Millis;
pub use servo_pwm::{ServoTimer, Tim4Channel};
pub use usart::Usart;
