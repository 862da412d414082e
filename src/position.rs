//! Board state engine for Blokus Duo.
//!
//! This module provides the placement rules on packed bitboards:
//! - Per-player occupancy, combined occupancy and the static border
//! - Per-player anchor masks (cells where a new piece may touch a corner)
//! - Per-player piece inventories
//! - Apply/undo of a catalog placement and legal-move generation
//!
//! A new piece must not overlap any occupied or border cell, must not share
//! an edge with the mover's own pieces, and must cover at least one of the
//! mover's anchor cells.

use crate::bitboard::{BORDER, Bitboard, CENTER, ShiftedMask};
use crate::catalog::{Catalog, Placement};
use crate::constants::{
    FULL_INVENTORY, NUM_PLAYERS, START_CELL_P0, START_CELL_P1, TOTAL_PIECE_CELLS,
};
use crate::polyomino::Polyomino;

/// Index of a player (0 or 1).
pub type PlayerId = usize;

/// Set of piece kinds a player has not placed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Inventory(u32);

impl Inventory {
    pub const FULL: Inventory = Inventory(FULL_INVENTORY);
    pub const EMPTY: Inventory = Inventory(0);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits & FULL_INVENTORY)
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn has(self, piece: Polyomino) -> bool {
        self.0 & piece.bit() != 0
    }

    #[inline]
    pub fn remove(&mut self, piece: Polyomino) {
        self.0 &= !piece.bit();
    }

    #[inline]
    pub fn restore(&mut self, piece: Polyomino) {
        self.0 |= piece.bit();
    }

    /// Number of kinds still available.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Available kinds in inventory-bit order.
    pub fn pieces(self) -> impl Iterator<Item = Polyomino> {
        Polyomino::ALL.into_iter().filter(move |p| self.has(*p))
    }

    /// Total cells of the pieces still available.
    pub fn remaining_cells(self) -> u32 {
        self.pieces().map(|p| p.size() as u32).sum()
    }
}

/// Fixed first-move cell of each player.
pub const START_CELLS: [usize; NUM_PLAYERS] = [START_CELL_P0, START_CELL_P1];

/// The four-part placement rule.
///
/// A placement is legal iff it overlaps neither `board` (all occupied cells)
/// nor `border`, shares no edge with `own_board`, and covers at least one cell
/// of `anchors`.
pub fn is_legal(
    mask: &ShiftedMask,
    board: &Bitboard,
    border: &Bitboard,
    anchors: &Bitboard,
    own_board: &Bitboard,
) -> bool {
    !mask.intersects(board)
        && !mask.intersects(border)
        && !mask.intersects(&own_board.orthogonal_neighbors())
        && mask.intersects(anchors)
}

/// Anchor mask recomputed from scratch: cells diagonal to an own piece (or
/// the start cell), excluding cells that share an edge with an own piece and
/// cells that are occupied or on the border.
fn derive_anchors(start: usize, own: &Bitboard, combined: &Bitboard) -> Bitboard {
    (Bitboard::from_cell(start) | own.diagonal_neighbors())
        & !own.orthogonal_neighbors()
        & !*combined
        & !BORDER
}

/// Per-player board, anchors and inventory.
///
/// Invariants: `combined == boards[0] | boards[1]`, `boards[0] & boards[1]`
/// is empty and no piece cell lies on [`BORDER`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    pub combined: Bitboard,
    pub boards: [Bitboard; NUM_PLAYERS],
    pub anchors: [Bitboard; NUM_PLAYERS],
    pub inventories: [Inventory; NUM_PLAYERS],
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Position {
    /// Empty board, full inventories, each player anchored at its start cell.
    pub fn new() -> Self {
        Position {
            combined: Bitboard::EMPTY,
            boards: [Bitboard::EMPTY; NUM_PLAYERS],
            anchors: START_CELLS.map(Bitboard::from_cell),
            inventories: [Inventory::FULL; NUM_PLAYERS],
        }
    }

    /// Whether `player` may place `placement` now (inventory included).
    pub fn can_place(&self, placement: &Placement, player: PlayerId) -> bool {
        self.inventories[player].has(placement.piece)
            && is_legal(
                &placement.mask,
                &self.combined,
                &BORDER,
                &self.anchors[player],
                &self.boards[player],
            )
    }

    /// Place a piece for `player`. The caller has checked legality.
    ///
    /// The mover's anchors are updated incrementally from the new piece;
    /// the opponent only loses anchors the piece now covers.
    pub fn apply(&mut self, placement: &Placement, player: PlayerId) {
        let mask = &placement.mask;
        mask.place_on(&mut self.combined);
        mask.place_on(&mut self.boards[player]);

        let own = self.boards[player];
        let piece = placement.cells();
        self.anchors[player] = (self.anchors[player] | piece.diagonal_neighbors())
            & !own.orthogonal_neighbors()
            & !self.combined
            & !BORDER;
        self.anchors[1 - player] &= !piece;

        self.inventories[player].remove(placement.piece);
    }

    /// Revert [`apply`](Self::apply) of `placement` by `player`.
    ///
    /// Removing a piece can re-expose anchors on both sides, so anchors are
    /// recomputed from the boards rather than patched.
    pub fn undo(&mut self, placement: &Placement, player: PlayerId) {
        placement.mask.remove_from(&mut self.boards[player]);
        self.combined = self.boards[0] | self.boards[1];
        self.inventories[player].restore(placement.piece);
        self.recompute_anchors();
    }

    /// Rebuild both anchor masks from the boards.
    pub fn recompute_anchors(&mut self) {
        for player in 0..NUM_PLAYERS {
            self.anchors[player] =
                derive_anchors(START_CELLS[player], &self.boards[player], &self.combined);
        }
    }

    /// Catalog ids of every placement `player` may make now (pass excluded).
    ///
    /// Only walks catalog groups of pieces still in the inventory; the
    /// per-placement test is two masked word comparisons.
    pub fn legal_placements<'a>(
        &'a self,
        catalog: &'a Catalog,
        player: PlayerId,
    ) -> impl Iterator<Item = usize> + 'a {
        let blocked = self.combined | BORDER | self.boards[player].orthogonal_neighbors();
        let anchors = self.anchors[player];
        self.inventories[player]
            .pieces()
            .flat_map(move |piece| catalog.range(piece))
            .filter(move |&id| {
                catalog.get(id).is_some_and(|p| {
                    p.mask.intersects(&anchors) && !p.mask.intersects(&blocked)
                })
            })
    }

    /// Number of legal placements for `player`.
    pub fn count_legal_placements(&self, catalog: &Catalog, player: PlayerId) -> usize {
        self.legal_placements(catalog, player).count()
    }

    /// Cells covered by `player`'s pieces.
    #[inline]
    pub fn placed_cells(&self, player: PlayerId) -> u32 {
        self.boards[player].count()
    }

    /// Cells of `player`'s pieces not yet placed.
    pub fn remaining_cells(&self, player: PlayerId) -> u32 {
        self.inventories[player].remaining_cells()
    }

    /// Own cells minus opponent cells inside the central region.
    pub fn center_control(&self, player: PlayerId) -> i32 {
        let own = (self.boards[player] & CENTER).count() as i32;
        let opp = (self.boards[1 - player] & CENTER).count() as i32;
        own - opp
    }

    /// Check the structural invariants of the position.
    pub fn is_consistent(&self) -> bool {
        self.combined == (self.boards[0] | self.boards[1])
            && !self.boards[0].intersects(&self.boards[1])
            && !self.combined.intersects(&BORDER)
            && (0..NUM_PLAYERS).all(|p| {
                self.placed_cells(p) + self.remaining_cells(p) == TOTAL_PIECE_CELLS
            })
    }
}
