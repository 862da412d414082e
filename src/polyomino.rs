//! The 21 Blokus polyominoes and their orientations.
//!
//! Every orientation is stored as a list of cell offsets relative to the
//! pattern origin, using the board's 16-cell row stride (offset 17 is one row
//! down, one column right). Offsets are normalised so the pattern touches
//! row 0 and column 0.

use std::fmt;

use crate::bitboard::ShiftedMask;
use crate::constants::{CELLS, NUM_POLYOMINOES, W, WORD_BITS, WORDS};

/// One of the 21 piece kinds. The discriminant is the inventory bit index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Polyomino {
    I1,
    I2,
    I3,
    V3,
    I4,
    L4,
    T4,
    O4,
    Z4,
    I5,
    L5,
    Y5,
    N5,
    P5,
    U5,
    V5,
    W5,
    X5,
    F5,
    T5,
    Z5,
}

impl Polyomino {
    /// All kinds in inventory-bit order.
    pub const ALL: [Polyomino; NUM_POLYOMINOES] = [
        Polyomino::I1,
        Polyomino::I2,
        Polyomino::I3,
        Polyomino::V3,
        Polyomino::I4,
        Polyomino::L4,
        Polyomino::T4,
        Polyomino::O4,
        Polyomino::Z4,
        Polyomino::I5,
        Polyomino::L5,
        Polyomino::Y5,
        Polyomino::N5,
        Polyomino::P5,
        Polyomino::U5,
        Polyomino::V5,
        Polyomino::W5,
        Polyomino::X5,
        Polyomino::F5,
        Polyomino::T5,
        Polyomino::Z5,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Inventory bit for this kind.
    #[inline]
    pub const fn bit(self) -> u32 {
        1 << (self as u32)
    }

    pub fn from_index(index: usize) -> Option<Polyomino> {
        Self::ALL.get(index).copied()
    }

    /// Number of cells.
    pub fn size(self) -> usize {
        VARIANTS[self.index()][0].len()
    }

    /// Every distinct reflection/rotation as cell offsets.
    pub fn variants(self) -> &'static [&'static [u8]] {
        VARIANTS[self.index()]
    }

    pub fn name(self) -> &'static str {
        match self {
            Polyomino::I1 => "I1",
            Polyomino::I2 => "I2",
            Polyomino::I3 => "I3",
            Polyomino::V3 => "V3",
            Polyomino::I4 => "I4",
            Polyomino::L4 => "L4",
            Polyomino::T4 => "T4",
            Polyomino::O4 => "O4",
            Polyomino::Z4 => "Z4",
            Polyomino::I5 => "I5",
            Polyomino::L5 => "L5",
            Polyomino::Y5 => "Y5",
            Polyomino::N5 => "N5",
            Polyomino::P5 => "P5",
            Polyomino::U5 => "U5",
            Polyomino::V5 => "V5",
            Polyomino::W5 => "W5",
            Polyomino::X5 => "X5",
            Polyomino::F5 => "F5",
            Polyomino::T5 => "T5",
            Polyomino::Z5 => "Z5",
        }
    }
}

impl fmt::Display for Polyomino {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bit encoding of one orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Cells fit in one word; placing is a shift by the board position.
    Bits(u64),
    /// The 5-tall vertical line. Its last cell sits 64 bits after the first,
    /// past the end of a single word, so it is built one row at a time.
    VerticalFive,
}

impl Pattern {
    /// Encode a list of cell offsets.
    pub fn from_offsets(offsets: &[u8]) -> Pattern {
        if offsets.iter().any(|&o| o as usize >= WORD_BITS) {
            return Pattern::VerticalFive;
        }
        Pattern::Bits(offsets.iter().fold(0u64, |acc, &o| acc | 1 << o))
    }
}

/// Place `pattern` with its origin at board cell `pos`.
///
/// Returns `None` if any cell would fall past the last board cell.
pub fn shift(pattern: Pattern, pos: usize) -> Option<ShiftedMask> {
    let word = pos / WORD_BITS;
    if word >= WORDS {
        return None;
    }
    let mut out = ShiftedMask {
        word,
        ..ShiftedMask::default()
    };
    match pattern {
        Pattern::Bits(bits) => {
            let low = pos % WORD_BITS;
            out.first = bits << low;
            if low != 0 {
                out.second = bits >> (WORD_BITS - low);
            }
        }
        Pattern::VerticalFive => {
            for row in 0..5 {
                let cell = pos + row * W;
                if cell >= CELLS {
                    return None;
                }
                let bit = 1u64 << (cell % WORD_BITS);
                if cell / WORD_BITS == word {
                    out.first |= bit;
                } else {
                    out.second |= bit;
                }
            }
        }
    }
    if word + 1 == WORDS && out.second != 0 {
        return None;
    }
    Some(out)
}

const I1: &[&[u8]] = &[&[0]];
const I2: &[&[u8]] = &[&[0, 1], &[0, 16]];
const I3: &[&[u8]] = &[&[0, 1, 2], &[0, 16, 32]];
const V3: &[&[u8]] = &[&[0, 1, 16], &[0, 1, 17], &[1, 16, 17], &[0, 16, 17]];
const I4: &[&[u8]] = &[&[0, 1, 2, 3], &[0, 16, 32, 48]];
const L4: &[&[u8]] = &[
    &[0, 16, 32, 33],
    &[1, 17, 32, 33],
    &[0, 1, 2, 16],
    &[0, 1, 2, 18],
    &[0, 1, 17, 33],
    &[0, 1, 16, 32],
    &[2, 16, 17, 18],
    &[0, 16, 17, 18],
];
const T4: &[&[u8]] = &[&[0, 16, 17, 32], &[1, 16, 17, 33], &[0, 1, 2, 17], &[1, 16, 17, 18]];
const O4: &[&[u8]] = &[&[0, 1, 16, 17]];
const Z4: &[&[u8]] = &[&[0, 16, 17, 33], &[1, 16, 17, 32], &[1, 2, 16, 17], &[0, 1, 17, 18]];
const I5: &[&[u8]] = &[&[0, 1, 2, 3, 4], &[0, 16, 32, 48, 64]];
const L5: &[&[u8]] = &[
    &[0, 16, 32, 48, 49],
    &[1, 17, 33, 48, 49],
    &[0, 1, 2, 3, 16],
    &[0, 1, 2, 3, 19],
    &[0, 1, 17, 33, 49],
    &[0, 1, 16, 32, 48],
    &[3, 16, 17, 18, 19],
    &[0, 16, 17, 18, 19],
];
const Y5: &[&[u8]] = &[
    &[0, 16, 17, 32, 48],
    &[1, 16, 17, 33, 49],
    &[0, 1, 2, 3, 18],
    &[0, 1, 2, 3, 17],
    &[1, 17, 32, 33, 49],
    &[0, 16, 32, 33, 48],
    &[1, 16, 17, 18, 19],
    &[2, 16, 17, 18, 19],
];
const N5: &[&[u8]] = &[
    &[0, 16, 32, 33, 49],
    &[1, 17, 32, 33, 48],
    &[1, 2, 3, 16, 17],
    &[0, 1, 2, 18, 19],
    &[0, 16, 17, 33, 49],
    &[1, 16, 17, 32, 48],
    &[2, 3, 16, 17, 18],
    &[0, 1, 17, 18, 19],
];
const P5: &[&[u8]] = &[
    &[0, 1, 16, 17, 33],
    &[0, 1, 16, 17, 32],
    &[1, 2, 16, 17, 18],
    &[0, 1, 16, 17, 18],
    &[0, 16, 17, 32, 33],
    &[1, 16, 17, 32, 33],
    &[0, 1, 2, 16, 17],
    &[0, 1, 2, 17, 18],
];
const U5: &[&[u8]] = &[
    &[0, 1, 2, 16, 18],
    &[0, 1, 17, 32, 33],
    &[0, 1, 16, 32, 33],
    &[0, 2, 16, 17, 18],
];
const V5: &[&[u8]] = &[
    &[0, 16, 32, 33, 34],
    &[2, 18, 32, 33, 34],
    &[0, 1, 2, 16, 32],
    &[0, 1, 2, 18, 34],
];
const W5: &[&[u8]] = &[
    &[0, 16, 17, 33, 34],
    &[2, 17, 18, 32, 33],
    &[1, 2, 16, 17, 32],
    &[0, 1, 17, 18, 34],
];
const X5: &[&[u8]] = &[&[1, 16, 17, 18, 33]];
const F5: &[&[u8]] = &[
    &[0, 16, 17, 18, 33],
    &[2, 16, 17, 18, 33],
    &[1, 2, 16, 17, 33],
    &[0, 1, 17, 18, 33],
    &[1, 16, 17, 18, 34],
    &[1, 16, 17, 18, 32],
    &[1, 17, 18, 32, 33],
    &[1, 16, 17, 33, 34],
];
const T5: &[&[u8]] = &[
    &[0, 1, 2, 17, 33],
    &[2, 16, 17, 18, 34],
    &[0, 16, 17, 18, 32],
    &[1, 17, 32, 33, 34],
];
const Z5: &[&[u8]] = &[
    &[0, 16, 17, 18, 34],
    &[2, 16, 17, 18, 32],
    &[1, 2, 17, 32, 33],
    &[0, 1, 17, 33, 34],
];

/// Orientation table indexed by [`Polyomino::index`].
static VARIANTS: [&[&[u8]]; NUM_POLYOMINOES] = [
    I1, I2, I3, V3, I4, L4, T4, O4, Z4, I5, L5, Y5, N5, P5, U5, V5, W5, X5, F5, T5, Z5,
];
