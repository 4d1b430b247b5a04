//! Character LCD output.
//!
//! [`StatusDisplay`] is the seam the rest of the crate talks to. [`Hd44780`]
//! implements it for a 16x2 HD44780-compatible module wired in 4-bit mode
//! (RS, EN, D4-D7; RW tied low) over embedded-hal pins.
//!
//! The two screens the device ever shows live here as well: the pairing
//! prompt with the four suit glyphs, and the handshake notice.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};

use crate::pin::{PairingSymbols, Suit};

/// Something that can show status text and custom glyphs.
pub trait StatusDisplay {
    type Error: core::fmt::Debug;

    fn clear(&mut self) -> Result<(), Self::Error>;

    /// Move the cursor. Row 0 is the top line.
    fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), Self::Error>;

    /// Print ASCII text at the cursor.
    fn print(&mut self, text: &str) -> Result<(), Self::Error>;

    /// Print the custom glyph stored in `slot` (0-7).
    fn write_glyph(&mut self, slot: u8) -> Result<(), Self::Error>;

    /// Store a 5x8 bitmap (one byte per row, low 5 bits) in `slot` (0-7).
    fn define_glyph(&mut self, slot: u8, bitmap: &[u8; 8]) -> Result<(), Self::Error>;
}

// ── Screens ──────────────────────────────────────────────────────────

pub const PAIRING_PROMPT: &str = "Pair GamePad:";
pub const FOUND_TEXT: &str = "GamePad Found!";
pub const HANDSHAKE_TEXT: &str = "Handshaking...";

/// 5x8 suit bitmaps, indexed by [`Suit`] discriminant.
pub const SUIT_GLYPHS: [[u8; 8]; 4] = [
    [0x04, 0x0E, 0x1F, 0x1F, 0x04, 0x0E, 0x00, 0x00], // spade
    [0x00, 0x0A, 0x1F, 0x1F, 0x0E, 0x04, 0x00, 0x00], // heart
    [0x04, 0x0E, 0x1F, 0x0E, 0x04, 0x00, 0x00, 0x00], // diamond
    [0x0E, 0x0E, 0x1F, 0x1F, 0x04, 0x0E, 0x00, 0x00], // club
];

/// Load the four suit glyphs into CGRAM slots 0-3.
pub fn load_suit_glyphs<D: StatusDisplay>(display: &mut D) -> Result<(), D::Error> {
    for suit in Suit::ALL {
        display.define_glyph(suit.index(), &SUIT_GLYPHS[suit.index() as usize])?;
    }
    Ok(())
}

/// Prompt on the top line, the four symbols spaced out below.
/// Expects [`load_suit_glyphs`] to have run.
pub fn show_pairing_screen<D: StatusDisplay>(
    display: &mut D,
    symbols: &PairingSymbols,
) -> Result<(), D::Error> {
    display.clear()?;
    display.set_cursor(0, 0)?;
    display.print(PAIRING_PROMPT)?;
    display.set_cursor(1, 0)?;
    for (i, suit) in symbols.suits().iter().enumerate() {
        if i > 0 {
            display.print(" ")?;
        }
        display.write_glyph(suit.index())?;
    }
    Ok(())
}

/// Shown once the target has associated with the pairing AP.
pub fn show_handshake<D: StatusDisplay>(display: &mut D) -> Result<(), D::Error> {
    display.clear()?;
    display.set_cursor(0, 0)?;
    display.print(FOUND_TEXT)?;
    display.set_cursor(1, 0)?;
    display.print(HANDSHAKE_TEXT)
}

// ── HD44780 driver ───────────────────────────────────────────────────

const CMD_CLEAR: u8 = 0x01;
const CMD_HOME: u8 = 0x02;
const CMD_DISPLAY_ON: u8 = 0x0C;
const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
const CMD_SET_CGRAM: u8 = 0x40;
const CMD_SET_DDRAM: u8 = 0x80;

/// DDRAM address of the first column of each row.
const ROW_OFFSETS: [u8; 2] = [0x00, 0x40];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Register {
    Command,
    Data,
}

/// HD44780 in 4-bit mode. All six lines share one pin type; erase them to
/// a common type (e.g. `AnyOutputPin`) at the call site.
pub struct Hd44780<P, D> {
    rs: P,
    en: P,
    data: [P; 4],
    delay: D,
}

impl<P: OutputPin, D: DelayNs> Hd44780<P, D> {
    /// `data` is D4, D5, D6, D7 in that order.
    pub fn new(rs: P, en: P, data: [P; 4], delay: D) -> Self {
        Self { rs, en, data, delay }
    }

    /// Power-on reset into 4-bit, two-line mode, display on, cleared.
    pub fn init(&mut self) -> Result<(), P::Error> {
        self.delay.delay_ms(50);
        self.rs.set_low()?;
        self.en.set_low()?;

        // Three 8-bit function sets, then the switch to 4-bit.
        self.write_nibble(0x03)?;
        self.delay.delay_ms(5);
        self.write_nibble(0x03)?;
        self.delay.delay_us(150);
        self.write_nibble(0x03)?;
        self.write_nibble(0x02)?;

        self.send(CMD_FUNCTION_4BIT_2LINE, Register::Command)?;
        self.send(CMD_DISPLAY_ON, Register::Command)?;
        self.send(CMD_CLEAR, Register::Command)
    }

    /// Give back the pins and the delay.
    pub fn release(self) -> (P, P, [P; 4], D) {
        (self.rs, self.en, self.data, self.delay)
    }

    fn pulse(&mut self) -> Result<(), P::Error> {
        self.en.set_high()?;
        self.delay.delay_us(1);
        self.en.set_low()?;
        self.delay.delay_us(50);
        Ok(())
    }

    fn write_nibble(&mut self, nibble: u8) -> Result<(), P::Error> {
        for (bit, pin) in self.data.iter_mut().enumerate() {
            pin.set_state(PinState::from((nibble >> bit) & 1 == 1))?;
        }
        self.pulse()
    }

    fn send(&mut self, value: u8, register: Register) -> Result<(), P::Error> {
        self.rs.set_state(PinState::from(register == Register::Data))?;
        self.write_nibble(value >> 4)?;
        self.write_nibble(value & 0x0F)?;
        if register == Register::Command && (value == CMD_CLEAR || value == CMD_HOME) {
            self.delay.delay_ms(2);
        }
        Ok(())
    }
}

impl<P: OutputPin, D: DelayNs> StatusDisplay for Hd44780<P, D> {
    type Error = P::Error;

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.send(CMD_CLEAR, Register::Command)
    }

    fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), Self::Error> {
        let addr = ROW_OFFSETS[(row & 1) as usize] + (col & 0x3F);
        self.send(CMD_SET_DDRAM | addr, Register::Command)
    }

    fn print(&mut self, text: &str) -> Result<(), Self::Error> {
        for byte in text.bytes() {
            self.send(byte, Register::Data)?;
        }
        Ok(())
    }

    fn write_glyph(&mut self, slot: u8) -> Result<(), Self::Error> {
        self.send(slot & 0x07, Register::Data)
    }

    fn define_glyph(&mut self, slot: u8, bitmap: &[u8; 8]) -> Result<(), Self::Error> {
        self.send(CMD_SET_CGRAM | ((slot & 0x07) << 3), Register::Command)?;
        for &row in bitmap {
            self.send(row, Register::Data)?;
        }
        Ok(())
    }
}
