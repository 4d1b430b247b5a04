//! Pairing code generation.
//!
//! The console shows four card-suit symbols; the GamePad user keys them in
//! and the GamePad derives an 8-digit WPS PIN from them. We run the same
//! derivation so the PIN we advertise is the one the GamePad will try.

use core::fmt;

use heapless::String;

/// Number of symbols shown to the user.
pub const SYMBOL_COUNT: usize = 4;

/// Size of the symbol alphabet.
pub const ALPHABET_LEN: u8 = 4;

/// Payload digits before the checksum.
pub const PAYLOAD_DIGITS: usize = 7;

/// Total PIN length (payload + checksum).
pub const PIN_LEN: usize = PAYLOAD_DIGITS + 1;

/// The four symbols, in alphabet order. The discriminant is the symbol
/// value and the LCD glyph slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Suit {
    Spade = 0,
    Heart = 1,
    Diamond = 2,
    Club = 3,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spade, Suit::Heart, Suit::Diamond, Suit::Club];

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn index(self) -> u8 {
        self as u8
    }
}

/// Four symbols drawn once per boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairingSymbols([Suit; SYMBOL_COUNT]);

impl PairingSymbols {
    /// Build from raw symbol indices. Returns `None` if any index is
    /// outside the alphabet.
    pub fn new(s0: u8, s1: u8, s2: u8, s3: u8) -> Option<Self> {
        Some(Self([
            Suit::from_index(s0)?,
            Suit::from_index(s1)?,
            Suit::from_index(s2)?,
            Suit::from_index(s3)?,
        ]))
    }

    /// Pick the four symbols from the low byte of a boot-time random word,
    /// two bits per symbol.
    pub fn from_random(r: u32) -> Self {
        let pick = |shift: u32| Suit::ALL[((r >> shift) % ALPHABET_LEN as u32) as usize];
        Self([pick(0), pick(2), pick(4), pick(6)])
    }

    pub fn suits(&self) -> &[Suit; SYMBOL_COUNT] {
        &self.0
    }

    /// Mixed base value `s0*64 + s1*16 + s2*4 + s3`, always below 256.
    pub fn base(&self) -> u32 {
        let [s0, s1, s2, s3] = self.0.map(|s| s.index() as u32);
        s0 * 64 + s1 * 16 + s2 * 4 + s3
    }

    /// Derive the pairing code for these symbols.
    pub fn code(&self) -> PairingCode {
        PairingCode::from_base(self.base())
    }
}

/// Checksum digit over the 7 payload digits of `base`: weights 3,1,3,1,...
/// from the most significant digit, then the ten's complement of the sum.
pub fn checksum_digit(base: u32) -> u8 {
    let mut accum = 0u32;
    let mut divisor = 1_000_000u32;
    for i in 0..PAYLOAD_DIGITS {
        let digit = (base / divisor) % 10;
        let weight = if i % 2 == 0 { 3 } else { 1 };
        accum += weight * digit;
        divisor /= 10;
    }
    ((10 - (accum % 10)) % 10) as u8
}

/// An 8-digit decimal PIN: 7 zero-padded payload digits and a checksum.
///
/// Doubles as the on-screen hint and the WPA2 passphrase of the pairing AP,
/// so it is kept as ASCII ready to hand to either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingCode(String<PIN_LEN>);

impl PairingCode {
    fn from_base(base: u32) -> Self {
        use core::fmt::Write;

        let mut s = String::new();
        // Payload is below 10^7 and the checksum is one digit, so this fits.
        let _ = write!(s, "{:07}{}", base % 10_000_000, checksum_digit(base));
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PairingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
