//! Hardware abstraction for supported boards.
//!
//! The board module defines the character LCD wiring (HD44780, 4-bit
//! mode) selected at compile time via feature flags. Pin numbers are GPIO
//! indices; the firmware maps them onto its HAL pin types. The channel plan
//! is 5 GHz only, so only dual-band parts are listed here.

#[cfg(feature = "board-c5-devkit")]
mod hw {
    pub const LCD_RS_PIN: u8 = 6;
    pub const LCD_EN_PIN: u8 = 7;
    pub const LCD_D4_PIN: u8 = 0;
    pub const LCD_D5_PIN: u8 = 1;
    pub const LCD_D6_PIN: u8 = 2;
    pub const LCD_D7_PIN: u8 = 3;
    pub const BOARD_NAME: &str = "esp32c5_devkit";
}

#[cfg(not(feature = "board-c5-devkit"))]
mod hw {
    pub const BOARD_NAME: &str = "unknown";
}

pub use hw::*;
