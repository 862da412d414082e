//! 256-cell bitboards.
//!
//! Cell `i` lives in word `i / 64`, bit `i % 64`. Rows are 16 cells wide, so
//! every word holds exactly four rows and neighbour shifts are plain word
//! shifts with a carry from the adjacent word.

use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

use crate::constants::{CELLS, CENTER_MAX, CENTER_MIN, W, WORD_BITS, WORDS};

/// Clears column 0 of every row (destination of a `+1` shift that wrapped).
const NOT_FIRST_COL: u64 = 0xFFFE_FFFE_FFFE_FFFE;

/// Clears column 15 of every row (destination of a `-1` shift that wrapped).
const NOT_LAST_COL: u64 = 0x7FFF_7FFF_7FFF_7FFF;

/// Bits in the word above/below that move across a word boundary on a row shift.
const ROW_CARRY: u32 = (WORD_BITS - W) as u32;

/// Fixed-size bit vector over the padded 16x16 board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bitboard {
    words: [u64; WORDS],
}

impl Bitboard {
    /// The empty bitboard.
    pub const EMPTY: Bitboard = Bitboard { words: [0; WORDS] };

    pub const fn from_words(words: [u64; WORDS]) -> Self {
        Self { words }
    }

    /// Bitboard with a single cell set.
    pub const fn from_cell(cell: usize) -> Self {
        let mut words = [0; WORDS];
        words[cell / WORD_BITS] = 1 << (cell % WORD_BITS);
        Self { words }
    }

    #[inline]
    pub const fn words(&self) -> &[u64; WORDS] {
        &self.words
    }

    #[inline]
    pub fn set(&mut self, cell: usize) {
        self.words[cell / WORD_BITS] |= 1 << (cell % WORD_BITS);
    }

    #[inline]
    pub fn clear(&mut self, cell: usize) {
        self.words[cell / WORD_BITS] &= !(1 << (cell % WORD_BITS));
    }

    #[inline]
    pub fn get(&self, cell: usize) -> bool {
        (self.words[cell / WORD_BITS] >> (cell % WORD_BITS)) & 1 == 1
    }

    /// Population count.
    #[inline]
    pub fn count(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// True if any cell is set in both bitboards.
    #[inline]
    pub fn intersects(&self, other: &Bitboard) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .any(|(a, b)| a & b != 0)
    }

    /// Shift every cell one column to the right (`+1`), dropping wrapped cells.
    #[inline]
    fn east(&self) -> Bitboard {
        let mut out = [0; WORDS];
        for (o, w) in out.iter_mut().zip(self.words) {
            *o = (w << 1) & NOT_FIRST_COL;
        }
        Bitboard { words: out }
    }

    /// Shift every cell one column to the left (`-1`), dropping wrapped cells.
    #[inline]
    fn west(&self) -> Bitboard {
        let mut out = [0; WORDS];
        for (o, w) in out.iter_mut().zip(self.words) {
            *o = (w >> 1) & NOT_LAST_COL;
        }
        Bitboard { words: out }
    }

    /// Shift every cell one row down (`+16`).
    #[inline]
    fn south(&self) -> Bitboard {
        let mut out = [0; WORDS];
        for i in 0..WORDS {
            let carry = if i > 0 { self.words[i - 1] >> ROW_CARRY } else { 0 };
            out[i] = (self.words[i] << W) | carry;
        }
        Bitboard { words: out }
    }

    /// Shift every cell one row up (`-16`).
    #[inline]
    fn north(&self) -> Bitboard {
        let mut out = [0; WORDS];
        for i in 0..WORDS {
            let carry = if i + 1 < WORDS { self.words[i + 1] << ROW_CARRY } else { 0 };
            out[i] = (self.words[i] >> W) | carry;
        }
        Bitboard { words: out }
    }

    /// Cells sharing an edge with at least one set cell.
    pub fn orthogonal_neighbors(&self) -> Bitboard {
        self.east() | self.west() | self.north() | self.south()
    }

    /// Cells touching at least one set cell only at a corner of that cell.
    ///
    /// A result cell may still be orthogonally adjacent to some *other* set
    /// cell; callers subtract [`orthogonal_neighbors`](Self::orthogonal_neighbors)
    /// when they need strictly diagonal contact.
    pub fn diagonal_neighbors(&self) -> Bitboard {
        let north = self.north();
        let south = self.south();
        north.east() | north.west() | south.east() | south.west()
    }

    /// Iterate over the indices of set cells in ascending order.
    pub fn iter_ones(&self) -> BitboardIter {
        BitboardIter {
            words: self.words,
            word_idx: 0,
        }
    }
}

impl BitOr for Bitboard {
    type Output = Bitboard;

    fn bitor(self, rhs: Bitboard) -> Bitboard {
        let mut out = self;
        out |= rhs;
        out
    }
}

impl BitOrAssign for Bitboard {
    fn bitor_assign(&mut self, rhs: Bitboard) {
        for (a, b) in self.words.iter_mut().zip(rhs.words) {
            *a |= b;
        }
    }
}

impl BitAnd for Bitboard {
    type Output = Bitboard;

    fn bitand(self, rhs: Bitboard) -> Bitboard {
        let mut out = self;
        out &= rhs;
        out
    }
}

impl BitAndAssign for Bitboard {
    fn bitand_assign(&mut self, rhs: Bitboard) {
        for (a, b) in self.words.iter_mut().zip(rhs.words) {
            *a &= b;
        }
    }
}

impl Not for Bitboard {
    type Output = Bitboard;

    fn not(self) -> Bitboard {
        let mut out = self;
        for w in out.words.iter_mut() {
            *w = !*w;
        }
        out
    }
}

/// Iterator over set cells of a [`Bitboard`].
pub struct BitboardIter {
    words: [u64; WORDS],
    word_idx: usize,
}

impl Iterator for BitboardIter {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.word_idx < WORDS {
            let word = &mut self.words[self.word_idx];
            if *word != 0 {
                let bit = word.trailing_zeros() as usize;
                *word &= *word - 1;
                return Some(self.word_idx * WORD_BITS + bit);
            }
            self.word_idx += 1;
        }
        None
    }
}

/// A piece pattern placed at an absolute board position.
///
/// A placed piece spans at most two adjacent words: `first` is applied to
/// word `word` and `second` to word `word + 1`. When `word` is the last word,
/// `second` is always zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ShiftedMask {
    pub first: u64,
    pub second: u64,
    pub word: usize,
}

impl ShiftedMask {
    /// True if any cell of the mask is set in `board`.
    #[inline]
    pub fn intersects(&self, board: &Bitboard) -> bool {
        let w = board.words();
        (w[self.word] & self.first) != 0
            || (self.word + 1 < WORDS && (w[self.word + 1] & self.second) != 0)
    }

    /// Number of cells covered.
    #[inline]
    pub fn count(&self) -> u32 {
        self.first.count_ones() + self.second.count_ones()
    }

    /// Expand to a full bitboard.
    pub fn to_bitboard(&self) -> Bitboard {
        let mut words = [0; WORDS];
        words[self.word] = self.first;
        if self.word + 1 < WORDS {
            words[self.word + 1] = self.second;
        }
        Bitboard::from_words(words)
    }

    /// Set the mask's cells in `board`.
    #[inline]
    pub fn place_on(&self, board: &mut Bitboard) {
        board.words[self.word] |= self.first;
        if self.word + 1 < WORDS {
            board.words[self.word + 1] |= self.second;
        }
    }

    /// Clear the mask's cells from `board`.
    #[inline]
    pub fn remove_from(&self, board: &mut Bitboard) {
        board.words[self.word] &= !self.first;
        if self.word + 1 < WORDS {
            board.words[self.word + 1] &= !self.second;
        }
    }
}

/// Row-major cell index.
#[inline]
pub const fn cell(row: usize, col: usize) -> usize {
    row * W + col
}

const fn build_border() -> Bitboard {
    let mut words = [0u64; WORDS];
    let mut i = 0;
    while i < CELLS {
        let (row, col) = (i / W, i % W);
        if row == 0 || row == W - 1 || col == 0 || col == W - 1 {
            words[i / WORD_BITS] |= 1 << (i % WORD_BITS);
        }
        i += 1;
    }
    Bitboard::from_words(words)
}

const fn build_center() -> Bitboard {
    let mut words = [0u64; WORDS];
    let mut row = CENTER_MIN;
    while row < CENTER_MAX {
        let mut col = CENTER_MIN;
        while col < CENTER_MAX {
            let i = cell(row, col);
            words[i / WORD_BITS] |= 1 << (i % WORD_BITS);
            col += 1;
        }
        row += 1;
    }
    Bitboard::from_words(words)
}

/// The static one-cell ring around the playing area.
pub const BORDER: Bitboard = build_border();

/// Central 8x8 region used for the centre-control heuristic.
pub const CENTER: Bitboard = build_center();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_border_mask() {
        assert_eq!(BORDER.count(), 4 * (W as u32) - 4);
        assert!(BORDER.get(cell(0, 7)));
        assert!(BORDER.get(cell(15, 15)));
        assert!(BORDER.get(cell(8, 0)));
        assert!(!BORDER.get(cell(1, 1)));
        assert_eq!(
            BORDER.words(),
            &[
                9223794255762423807,
                9223794255762391041,
                9223794255762391041,
                18446603342663745537
            ]
        );
    }

    #[test]
    fn test_center_mask() {
        assert_eq!(CENTER.count(), 64);
        assert!(CENTER.get(cell(4, 4)));
        assert!(CENTER.get(cell(11, 11)));
        assert!(!CENTER.get(cell(3, 4)));
        assert!(!CENTER.get(cell(4, 12)));
    }

    #[test]
    fn test_neighbors_of_single_cell() {
        let b = Bitboard::from_cell(cell(6, 6));
        let orth: Vec<usize> = b.orthogonal_neighbors().iter_ones().collect();
        assert_eq!(orth, vec![cell(5, 6), cell(6, 5), cell(6, 7), cell(7, 6)]);
        let diag: Vec<usize> = b.diagonal_neighbors().iter_ones().collect();
        assert_eq!(diag, vec![cell(5, 5), cell(5, 7), cell(7, 5), cell(7, 7)]);
    }

    #[test]
    fn test_neighbors_cross_word_boundary() {
        // Row 3 is the last row of word 0, row 4 the first of word 1.
        let b = Bitboard::from_cell(cell(3, 8));
        let orth = b.orthogonal_neighbors();
        assert!(orth.get(cell(4, 8)));
        assert!(orth.get(cell(2, 8)));
        let up = Bitboard::from_cell(cell(4, 8)).orthogonal_neighbors();
        assert!(up.get(cell(3, 8)));
        let diag = Bitboard::from_cell(cell(4, 8)).diagonal_neighbors();
        assert!(diag.get(cell(3, 7)));
        assert!(diag.get(cell(3, 9)));
    }

    #[test]
    fn test_shifts_do_not_wrap_rows() {
        let b = Bitboard::from_cell(cell(5, 15));
        assert!(!b.orthogonal_neighbors().get(cell(6, 0)));
        let b = Bitboard::from_cell(cell(5, 0));
        assert!(!b.orthogonal_neighbors().get(cell(4, 15)));
    }

    #[test]
    fn test_iter_ones_and_ops() {
        let mut b = Bitboard::EMPTY;
        b.set(3);
        b.set(64);
        b.set(255);
        assert_eq!(b.iter_ones().collect::<Vec<_>>(), vec![3, 64, 255]);
        assert_eq!(b.count(), 3);
        b.clear(64);
        assert!(!b.get(64));
        assert_eq!((b & !Bitboard::from_cell(3)).count(), 1);
        assert!(b.intersects(&Bitboard::from_cell(255)));
    }

    #[test]
    fn test_shifted_mask_roundtrip() {
        let mask = ShiftedMask {
            first: 1 << 63,
            second: 1,
            word: 1,
        };
        let mut board = Bitboard::EMPTY;
        mask.place_on(&mut board);
        assert_eq!(board, mask.to_bitboard());
        assert!(board.get(127) && board.get(128));
        assert!(mask.intersects(&Bitboard::from_cell(128)));
        mask.remove_from(&mut board);
        assert!(board.is_empty());
    }
}
