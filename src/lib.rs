//! PadHunter library: Wii U GamePad acquisition engine.
//!
//! Finds one GamePad by its hardware address, stops hopping once it shows
//! up, and stands up a WPS pairing access point keyed by a code shown on a
//! character LCD. Everything here is platform-free and testable on the host
//! with `cargo test`; the ESP-IDF binary in `firmware-std/` supplies the
//! radio, the LCD pins and the console.
//!
//! - `pin`, `wps`: pairing code and the vendor element the AP advertises.
//! - `state`, `scanner`, `filter`: the capture path and the one-way lock.
//! - `hopper`: channel schedule and the capture-safe retune.
//! - `assoc`, `display`: AP lifecycle events and the HD44780 status screen.
//! - `protocol`, `comm`: NDJSON reports on the serial console.
//! - `defaults`, `board`: compile-time hunt parameters and pin maps.

#![cfg_attr(not(test), no_std)]

pub mod assoc;
pub mod board;
pub mod comm;
pub mod defaults;
pub mod display;
pub mod filter;
pub mod hopper;
pub mod pin;
pub mod protocol;
pub mod scanner;
pub mod state;
pub mod wps;

pub use defaults::HunterConfig;
