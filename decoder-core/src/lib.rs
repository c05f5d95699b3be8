#![no_std]

// Shared logic for the two-pulse gate controller.
//
// This crate stays portable across MCU firmware and host tooling by avoiding
// the Rust standard library. The firmware tasks and the host emulator both
// drive the same controller state machine defined here, which keeps the
// timing-sensitive decode and sequencing behavior testable off-target.

pub mod controller;
pub mod decoder;
pub mod sequencer;
pub mod telemetry;
pub mod timeout;
pub mod timing;
