//! Constants for board geometry, the action space, search defaults and the
//! heuristic evaluation.
//!
//! The board is a 16x16 grid stored row-major in a 256-bit vector. The outer
//! ring of cells is a permanent border, leaving the 14x14 Blokus Duo playing
//! area in rows and columns 1..=14.

use std::time::Duration;

// =============================================================================
// Board Geometry
// =============================================================================

/// Width of the padded board (playing area plus one border cell per side).
pub const W: usize = 16;

/// Width of the playing area.
pub const N: usize = W - 2;

/// Total number of cells in the padded board.
pub const CELLS: usize = W * W;

/// Bits per bitboard word.
pub const WORD_BITS: usize = 64;

/// Number of 64-bit words needed for [`CELLS`].
pub const WORDS: usize = CELLS / WORD_BITS;

/// Number of players.
pub const NUM_PLAYERS: usize = 2;

/// Cell where player 0 must place its first piece (row 5, column 10).
pub const START_CELL_P0: usize = 5 * W + 10;

/// Cell where player 1 must place its first piece (row 10, column 5).
pub const START_CELL_P1: usize = 10 * W + 5;

/// First row/column (inclusive) of the central control region.
pub const CENTER_MIN: usize = 4;

/// Last row/column (exclusive) of the central control region.
pub const CENTER_MAX: usize = 12;

// =============================================================================
// Pieces and Action Space
// =============================================================================

/// Number of distinct polyomino kinds each player owns.
pub const NUM_POLYOMINOES: usize = 21;

/// Inventory mask with every piece still available.
pub const FULL_INVENTORY: u32 = (1 << NUM_POLYOMINOES) - 1;

/// Total cells covered by a complete piece set.
pub const TOTAL_PIECE_CELLS: u32 = 89;

/// Number of distinct placements in the catalog.
pub const NUM_PLACEMENTS: usize = 13_729;

/// Action id reserved for passing.
pub const PASS_ACTION: usize = NUM_PLACEMENTS;

/// Size of the whole action space (placements plus pass).
pub const NUM_DISTINCT_ACTIONS: usize = NUM_PLACEMENTS + 1;

/// Upper bound on game length: 42 placements, at most one pass before each
/// of them, and the two closing passes.
pub const MAX_GAME_LENGTH: usize = 2 * 2 * NUM_POLYOMINOES + 2;

// =============================================================================
// Observation Tensor
// =============================================================================

/// Board planes: own cells, opponent cells, own anchors, opponent anchors.
pub const NUM_BOARD_CHANNELS: usize = 4;

/// One constant plane per piece kind and player.
pub const NUM_INVENTORY_CHANNELS: usize = 2 * NUM_POLYOMINOES;

/// Channels in the observation tensor.
pub const NUM_CHANNELS: usize = NUM_BOARD_CHANNELS + NUM_INVENTORY_CHANNELS;

/// Number of floats in one observation.
pub const OBSERVATION_SIZE: usize = NUM_CHANNELS * N * N;

// =============================================================================
// Heuristic Evaluation
// =============================================================================

/// Weight of the placed-cell differential.
pub const CELL_WEIGHT: f64 = 10.0;

/// Divisor applied to the legal-move differential.
pub const MOBILITY_DIVISOR: f64 = 11.0;

/// Weight of the centre-control differential.
pub const CENTER_WEIGHT: f64 = 1.0;

/// Strict upper bound on the magnitude of the heuristic. Dividing by it maps
/// every non-terminal score into `(-1, 1)`, below a terminal win or loss.
pub const HEURISTIC_BOUND: f64 = CELL_WEIGHT * TOTAL_PIECE_CELLS as f64
    + NUM_PLACEMENTS as f64 / MOBILITY_DIVISOR
    + CENTER_WEIGHT * CELLS as f64
    + 1.0;

// =============================================================================
// Search Defaults
// =============================================================================

/// Default wall-clock budget for iterative deepening.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(10);

/// Default maximum depth for iterative deepening.
pub const DEFAULT_DEPTH_LIMIT: u32 = 10;

/// Estimated cost ratio between depth `d + 1` and depth `d`. The driver only
/// starts another depth if `elapsed + last_depth * multiplier` fits the budget.
pub const BRANCHING_MULTIPLIER: u32 = 60;
