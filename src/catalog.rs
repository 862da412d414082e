//! The placement catalog: every distinct piece placement on the board.
//!
//! The catalog is the action address space. It is built once from the
//! orientation tables by trying every orientation at every position that
//! puts one of its cells on an interior cell, and keeping the placements that
//! fit on the empty board. Entries are grouped by piece kind, in
//! [`Polyomino::ALL`] order, so legal-move generation can skip whole groups of
//! pieces that are no longer in a player's inventory.

use std::ops::Range;
use std::sync::Arc;

use log::debug;

use crate::bitboard::{BORDER, Bitboard, ShiftedMask};
use crate::constants::{NUM_POLYOMINOES, PASS_ACTION};
use crate::polyomino::{Pattern, Polyomino, shift};
use crate::position::is_legal;

/// One entry of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub piece: Polyomino,
    /// Index into [`Polyomino::variants`].
    pub variant: u8,
    /// Board cell of the pattern origin.
    pub position: u16,
    pub mask: ShiftedMask,
}

impl Placement {
    /// Board cells covered by this placement.
    pub fn cells(&self) -> Bitboard {
        self.mask.to_bitboard()
    }
}

/// Immutable table of all placements, indexed by action id.
#[derive(Debug)]
pub struct Catalog {
    placements: Vec<Placement>,
    ranges: [Range<usize>; NUM_POLYOMINOES],
}

impl Catalog {
    /// Enumerate every placement that fits on the empty board.
    pub fn build() -> Self {
        // Every interior cell stands in as an anchor, so any placement that
        // avoids the border is reachable.
        let anchors = !BORDER;
        let empty = Bitboard::EMPTY;
        let mut placements = Vec::new();
        let mut ranges: [Range<usize>; NUM_POLYOMINOES] = Default::default();

        for piece in Polyomino::ALL {
            let start = placements.len();
            for (variant, offsets) in piece.variants().iter().enumerate() {
                let pattern = Pattern::from_offsets(offsets);
                let mut tested = Bitboard::EMPTY;
                for anchor in anchors.iter_ones() {
                    for &offset in offsets.iter() {
                        let Some(pos) = anchor.checked_sub(offset as usize) else {
                            continue;
                        };
                        if tested.get(pos) {
                            continue;
                        }
                        tested.set(pos);
                        let Some(mask) = shift(pattern, pos) else {
                            continue;
                        };
                        if is_legal(&mask, &empty, &BORDER, &anchors, &empty) {
                            placements.push(Placement {
                                piece,
                                variant: variant as u8,
                                position: pos as u16,
                                mask,
                            });
                        }
                    }
                }
            }
            ranges[piece.index()] = start..placements.len();
        }

        debug!("built placement catalog with {} entries", placements.len());
        Self { placements, ranges }
    }

    /// Build a catalog behind shared ownership, ready to hand to game states.
    pub fn shared() -> Arc<Catalog> {
        Arc::new(Self::build())
    }

    /// Number of placements (pass excluded).
    #[inline]
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Placement for an action id, or `None` for pass and out-of-range ids.
    #[inline]
    pub fn get(&self, action: usize) -> Option<&Placement> {
        self.placements.get(action)
    }

    /// Action ids of one piece kind.
    #[inline]
    pub fn range(&self, piece: Polyomino) -> Range<usize> {
        self.ranges[piece.index()].clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Placement)> {
        self.placements.iter().enumerate()
    }

    /// Look up the action id of a given piece/orientation/position.
    pub fn find(&self, piece: Polyomino, variant: u8, position: usize) -> Option<usize> {
        self.range(piece).find(|&i| {
            let p = &self.placements[i];
            p.variant == variant && p.position as usize == position
        })
    }

    /// Human-readable action description.
    pub fn action_to_string(&self, player: usize, action: usize) -> String {
        if action == PASS_ACTION {
            return format!("P{player} passes");
        }
        match self.get(action) {
            Some(p) => format!(
                "P{player} plays {} (variant {}) at cell {} [action {action}]",
                p.piece, p.variant, p.position
            ),
            None => format!("P{player} invalid action {action}"),
        }
    }
}
