//! DTMF keypad symbols

use core::fmt;

use crate::codec::CodecError;

/// One of the 16 DTMF keypad symbols
///
/// The keypad is laid out as the board sees it:
///
/// ```text
///  1 2 3 A
///  4 5 6 B
///  7 8 9 C
///  * 0 # D
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Symbol {
    Zero,
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    A,
    B,
    C,
    D,
    Star,
    Pound,
}

impl Symbol {
    /// All symbols, in key code order
    pub const ALL: [Symbol; 16] = [
        Symbol::Zero,
        Symbol::One,
        Symbol::Two,
        Symbol::Three,
        Symbol::Four,
        Symbol::Five,
        Symbol::Six,
        Symbol::Seven,
        Symbol::Eight,
        Symbol::Nine,
        Symbol::A,
        Symbol::B,
        Symbol::C,
        Symbol::D,
        Symbol::Star,
        Symbol::Pound,
    ];

    /// Parse the exact keypad character
    pub fn from_char(ch: char) -> Result<Self, CodecError> {
        let symbol = match ch {
            '0' => Symbol::Zero,
            '1' => Symbol::One,
            '2' => Symbol::Two,
            '3' => Symbol::Three,
            '4' => Symbol::Four,
            '5' => Symbol::Five,
            '6' => Symbol::Six,
            '7' => Symbol::Seven,
            '8' => Symbol::Eight,
            '9' => Symbol::Nine,
            'A' => Symbol::A,
            'B' => Symbol::B,
            'C' => Symbol::C,
            'D' => Symbol::D,
            '*' => Symbol::Star,
            '#' => Symbol::Pound,
            other => return Err(CodecError::UnknownSymbol(other)),
        };
        Ok(symbol)
    }

    /// Parse a keystroke
    ///
    /// Like [`Symbol::from_char`], but accepts `a`-`d` for the letter keys.
    pub fn from_key(key: char) -> Result<Self, CodecError> {
        Self::from_char(key.to_ascii_uppercase()).map_err(|_| CodecError::UnknownSymbol(key))
    }

    /// Keypad character
    pub fn as_char(self) -> char {
        match self {
            Symbol::Zero => '0',
            Symbol::One => '1',
            Symbol::Two => '2',
            Symbol::Three => '3',
            Symbol::Four => '4',
            Symbol::Five => '5',
            Symbol::Six => '6',
            Symbol::Seven => '7',
            Symbol::Eight => '8',
            Symbol::Nine => '9',
            Symbol::A => 'A',
            Symbol::B => 'B',
            Symbol::C => 'C',
            Symbol::D => 'D',
            Symbol::Star => '*',
            Symbol::Pound => '#',
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl TryFrom<char> for Symbol {
    type Error = CodecError;

    fn try_from(ch: char) -> Result<Self, Self::Error> {
        Symbol::from_char(ch)
    }
}
