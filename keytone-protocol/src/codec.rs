//! Key code tables
//!
//! Host → board: each symbol maps to a 4-bit key code, one byte per key.
//!
//! Board → host: the board reports a decoded tone as its keypad position,
//! `row << 4 | column`, with one exception: the marker byte 0x55 stands for
//! '0'. The '0' cell at row 3 column 1 (0x31) decodes to '0' as well, and
//! the origin cell 0x00, which would be '1', is never sent. So '1' cannot
//! be received. In the other direction '0' encodes to 0x0. Both tables are
//! kept exactly as the board implements them.

use core::fmt;

use heapless::Vec;

use crate::symbol::Symbol;

/// Longest dial string accepted by [`encode_dial`]
pub const MAX_DIAL_LEN: usize = 32;

/// Marker byte the board sends for the keypad origin
pub const REPLY_MARKER: u8 = 0x55;

/// Codec errors
///
/// Reported per item; none of them ends a session by itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    /// Character is not one of the 16 DTMF symbols
    UnknownSymbol(char),
    /// Byte is not in the table being decoded against
    UnknownCode(u8),
    /// Dial string longer than `MAX_DIAL_LEN`
    DialTooLong,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::UnknownSymbol(ch) => write!(f, "unknown DTMF symbol {ch:?}"),
            CodecError::UnknownCode(code) => write!(f, "unknown device code 0x{code:02X}"),
            CodecError::DialTooLong => {
                write!(f, "dial string longer than {MAX_DIAL_LEN} symbols")
            }
        }
    }
}

/// Host → board key codes
const KEY_CODES: [(Symbol, u8); 16] = [
    (Symbol::One, 0x1),
    (Symbol::Two, 0x2),
    (Symbol::Three, 0x3),
    (Symbol::A, 0xA),
    (Symbol::Four, 0x4),
    (Symbol::Five, 0x5),
    (Symbol::Six, 0x6),
    (Symbol::B, 0xB),
    (Symbol::Seven, 0x7),
    (Symbol::Eight, 0x8),
    (Symbol::Nine, 0x9),
    (Symbol::C, 0xC),
    (Symbol::Star, 0xE),
    (Symbol::Zero, 0x0),
    (Symbol::Pound, 0xF),
    (Symbol::D, 0xD),
];

/// Board → host reply bytes, in keypad order
const REPLY_CODES: [(u8, Symbol); 16] = [
    (REPLY_MARKER, Symbol::Zero),
    (0x01, Symbol::Two),
    (0x02, Symbol::Three),
    (0x03, Symbol::A),
    (0x10, Symbol::Four),
    (0x11, Symbol::Five),
    (0x12, Symbol::Six),
    (0x13, Symbol::B),
    (0x20, Symbol::Seven),
    (0x21, Symbol::Eight),
    (0x22, Symbol::Nine),
    (0x23, Symbol::C),
    (0x30, Symbol::Star),
    (0x31, Symbol::Zero),
    (0x32, Symbol::Pound),
    (0x33, Symbol::D),
];

impl Symbol {
    /// Key code sent to the board
    pub fn code(self) -> u8 {
        match self {
            Symbol::Zero => 0x0,
            Symbol::One => 0x1,
            Symbol::Two => 0x2,
            Symbol::Three => 0x3,
            Symbol::Four => 0x4,
            Symbol::Five => 0x5,
            Symbol::Six => 0x6,
            Symbol::Seven => 0x7,
            Symbol::Eight => 0x8,
            Symbol::Nine => 0x9,
            Symbol::A => 0xA,
            Symbol::B => 0xB,
            Symbol::C => 0xC,
            Symbol::D => 0xD,
            Symbol::Star => 0xE,
            Symbol::Pound => 0xF,
        }
    }
}

/// Encode a keypad character into its key code
pub fn encode(ch: char) -> Result<u8, CodecError> {
    Symbol::from_char(ch).map(Symbol::code)
}

/// Decode a key code back into its symbol
pub fn decode(code: u8) -> Result<Symbol, CodecError> {
    KEY_CODES
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(symbol, _)| *symbol)
        .ok_or(CodecError::UnknownCode(code))
}

/// Decode a reply byte from the board
pub fn decode_reply(byte: u8) -> Result<Symbol, CodecError> {
    REPLY_CODES
        .iter()
        .find(|(b, _)| *b == byte)
        .map(|(_, symbol)| *symbol)
        .ok_or(CodecError::UnknownCode(byte))
}

/// Encode a whole dial string
///
/// Fails on the first character outside the table; nothing is returned
/// for a partially valid string.
pub fn encode_dial(digits: &str) -> Result<Vec<u8, MAX_DIAL_LEN>, CodecError> {
    let mut codes = Vec::new();
    for ch in digits.chars() {
        let code = encode(ch)?;
        codes.push(code).map_err(|_| CodecError::DialTooLong)?;
    }
    Ok(codes)
}
