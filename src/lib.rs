// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Pan/Tilt Tracker Firmware
//!
//! This crate contains the firmware for a two-axis servo pan/tilt head that keeps a tracked object
//! centered, written in Rust, targeting an STM32F777 MCU.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`config`] | Default constants and validated tracker configuration |
//! | [`control`] | Control algorithms (PD with dead zone, two-axis tracking) |
//! | [`motors`] | Servo encoding and the smoothed pan/tilt output stage |
//! | [`protocol`] | Framed serial command protocol |
//! | `hw` | MCU-level wrappers around TIM4 PWM, USART and the cycle counter (`board` feature) |
//!
//! Everything except `hw` is hardware independent and runs on the host under `cargo test`.
//!
//! ## Getting Started
//!
//! Run the tests:
//!
//! ```bash
//! cargo test
//! ```
//!
//! Flash the board:
//!
//! ```bash
//! cargo run --release --features board --target thumbv7em-none-eabihf
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![no_std]

pub mod config;
pub mod control;
#[cfg(feature = "board")]
pub mod hw;
pub mod motors;
pub mod protocol;
