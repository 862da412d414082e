//! Blokus Duo as a searchable [`Game`].
//!
//! `DuoState` wraps a [`Position`] with turn order, pass tracking and the
//! move history. The game ends after two consecutive passes, i.e. when
//! neither player can place a piece. Each state holds a shared handle to
//! the placement catalog, so cloning a state never copies the catalog.

use std::fmt;
use std::sync::Arc;

use log::warn;

use crate::bitboard::{BORDER, Bitboard, cell};
use crate::catalog::Catalog;
use crate::constants::{
    CELL_WEIGHT, CENTER_WEIGHT, MAX_GAME_LENGTH, MOBILITY_DIVISOR, N, NUM_BOARD_CHANNELS, NUM_CHANNELS,
    NUM_DISTINCT_ACTIONS, NUM_PLAYERS, NUM_POLYOMINOES, OBSERVATION_SIZE, PASS_ACTION, W,
};
use crate::position::{PlayerId, Position};
use crate::state::{
    Action, ActionError, ChanceMode, Dynamics, Game, GameType, Information, RewardModel, State,
    Turn, Utility,
};

/// Static description of Blokus Duo.
pub const GAME_TYPE: GameType = GameType {
    short_name: "blokus_duo",
    long_name: "Blokus Duo",
    dynamics: Dynamics::Sequential,
    chance_mode: ChanceMode::Deterministic,
    information: Information::PerfectInformation,
    utility: Utility::ZeroSum,
    reward_model: RewardModel::Terminal,
};

/// Game object: owns the shared placement catalog.
#[derive(Debug, Clone)]
pub struct DuoGame {
    catalog: Arc<Catalog>,
}

impl Default for DuoGame {
    fn default() -> Self {
        Self::new()
    }
}

impl DuoGame {
    /// Build the catalog and the game.
    pub fn new() -> Self {
        Self::with_catalog(Catalog::shared())
    }

    /// Reuse an existing catalog.
    pub fn with_catalog(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// `[channels, rows, cols]` of [`DuoState::observation_tensor`].
    pub fn observation_tensor_shape(&self) -> [usize; 3] {
        [NUM_CHANNELS, N, N]
    }

    pub fn action_to_string(&self, player: PlayerId, action: Action) -> String {
        self.catalog.action_to_string(player, action)
    }
}

impl Game for DuoGame {
    type State = DuoState;

    fn game_type(&self) -> &GameType {
        &GAME_TYPE
    }

    fn num_players(&self) -> usize {
        NUM_PLAYERS
    }

    fn num_distinct_actions(&self) -> usize {
        NUM_DISTINCT_ACTIONS
    }

    fn new_initial_state(&self) -> DuoState {
        DuoState::new(Arc::clone(&self.catalog))
    }

    fn min_utility(&self) -> f64 {
        -1.0
    }

    fn max_utility(&self) -> f64 {
        1.0
    }

    fn max_game_length(&self) -> usize {
        MAX_GAME_LENGTH
    }
}

/// One played ply, kept for undo and history queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ply {
    player: PlayerId,
    action: Action,
    passes_before: u8,
}

/// State of a game in progress.
#[derive(Clone)]
pub struct DuoState {
    catalog: Arc<Catalog>,
    position: Position,
    current_player: PlayerId,
    consecutive_passes: u8,
    history: Vec<Ply>,
}

impl DuoState {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self::from_position(catalog, Position::new(), 0)
    }

    /// Start from an arbitrary position with `current_player` to move.
    pub fn from_position(catalog: Arc<Catalog>, position: Position, current_player: PlayerId) -> Self {
        Self {
            catalog,
            position,
            current_player,
            consecutive_passes: 0,
            history: Vec::new(),
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Actions played so far, oldest first.
    pub fn history(&self) -> Vec<Action> {
        self.history.iter().map(|p| p.action).collect()
    }

    pub fn move_number(&self) -> usize {
        self.history.len()
    }

    pub fn consecutive_passes(&self) -> u8 {
        self.consecutive_passes
    }

    /// Player and action of the most recent ply.
    pub fn last_move(&self) -> Option<(PlayerId, Action)> {
        self.history.last().map(|p| (p.player, p.action))
    }

    /// Cells covered by `player` (the final score).
    pub fn placed_cells(&self, player: PlayerId) -> u32 {
        self.position.placed_cells(player)
    }

    /// Cells of `player`'s unplaced pieces.
    pub fn remaining_cells(&self, player: PlayerId) -> u32 {
        self.position.remaining_cells(player)
    }

    /// Heuristic value of the position for `player`: weighted placed-cell,
    /// mobility and centre-control differentials.
    pub fn evaluate(&self, player: PlayerId) -> f64 {
        let opponent = 1 - player;
        let cells = self.placed_cells(player) as f64 - self.placed_cells(opponent) as f64;
        let own_moves = self.position.count_legal_placements(&self.catalog, player) as f64;
        let opp_moves = self.position.count_legal_placements(&self.catalog, opponent) as f64;
        let center = self.position.center_control(player) as f64;
        CELL_WEIGHT * cells + (own_moves - opp_moves) / MOBILITY_DIVISOR + CENTER_WEIGHT * center
    }

    pub fn action_to_string(&self, player: PlayerId, action: Action) -> String {
        self.catalog.action_to_string(player, action)
    }

    /// Board and status rendered from `player`'s perspective.
    pub fn observation_string(&self, player: PlayerId) -> String {
        self.render(player)
    }

    /// Fill `values` (length [`OBSERVATION_SIZE`]) with the observation of
    /// `player` in `[channel][row][col]` order over the 14x14 interior.
    ///
    /// Channels: own cells, opponent cells, own anchors, opponent anchors,
    /// then one constant plane per piece kind for the own inventory and
    /// one per kind for the opponent inventory.
    pub fn observation_tensor(&self, player: PlayerId, values: &mut [f32]) {
        assert_eq!(values.len(), OBSERVATION_SIZE, "observation buffer has wrong size");
        let opponent = 1 - player;
        let plane = N * N;
        let planes: [&Bitboard; NUM_BOARD_CHANNELS] = [
            &self.position.boards[player],
            &self.position.boards[opponent],
            &self.position.anchors[player],
            &self.position.anchors[opponent],
        ];

        values.fill(0.0);
        for (channel, board) in planes.iter().enumerate() {
            for c in board.iter_ones() {
                let (row, col) = (c / W - 1, c % W - 1);
                values[channel * plane + row * N + col] = 1.0;
            }
        }

        let inventories = [self.position.inventories[player], self.position.inventories[opponent]];
        for (side, inventory) in inventories.iter().enumerate() {
            for piece in inventory.pieces() {
                let channel = NUM_BOARD_CHANNELS + side * NUM_POLYOMINOES + piece.index();
                values[channel * plane..(channel + 1) * plane].fill(1.0);
            }
        }
    }

    /// Convenience wrapper that allocates the observation buffer.
    pub fn observation(&self, player: PlayerId) -> Vec<f32> {
        let mut values = vec![0.0; OBSERVATION_SIZE];
        self.observation_tensor(player, &mut values);
        values
    }

    fn validate(&self, action: Action) -> Result<(), ActionError> {
        if self.is_terminal() {
            return Err(ActionError::GameOver);
        }
        if action >= NUM_DISTINCT_ACTIONS {
            return Err(ActionError::OutOfRange {
                action,
                limit: NUM_DISTINCT_ACTIONS,
            });
        }
        if action == PASS_ACTION {
            return Ok(());
        }
        match self.catalog.get(action) {
            Some(p) if self.position.can_place(p, self.current_player) => Ok(()),
            _ => Err(ActionError::Illegal { action }),
        }
    }

    fn render(&self, player: PlayerId) -> String {
        let own = &self.position.boards[player];
        let opp = &self.position.boards[1 - player];
        let mut board = String::with_capacity(W * (W + 1));
        for row in 0..W {
            for col in 0..W {
                let c = cell(row, col);
                board.push(if own.get(c) {
                    'X'
                } else if opp.get(c) {
                    'O'
                } else if BORDER.get(c) {
                    '#'
                } else {
                    '.'
                });
            }
            board.push('\n');
        }
        let returns = self.returns();
        format!(
            "Player to move: {}\nMoves made: {}\nConsecutive passes: {}\n\
             Player 0 pieces: {:#07x}\nPlayer 1 pieces: {:#07x}\n\
             Board (X=P{}, O=P{}):\n{}Terminal: {}\nReturns: {}, {}\n",
            self.current_player,
            self.move_number(),
            self.consecutive_passes,
            self.position.inventories[0].bits(),
            self.position.inventories[1].bits(),
            player,
            1 - player,
            board,
            if self.is_terminal() { "yes" } else { "no" },
            returns[0],
            returns[1],
        )
    }
}

impl State for DuoState {
    fn current_player(&self) -> Turn {
        if self.is_terminal() {
            Turn::Terminal
        } else {
            Turn::Player(self.current_player)
        }
    }

    fn is_terminal(&self) -> bool {
        self.consecutive_passes as usize >= NUM_PLAYERS
    }

    fn legal_actions(&self) -> Vec<Action> {
        if self.is_terminal() {
            return Vec::new();
        }
        let mut actions: Vec<Action> = self
            .position
            .legal_placements(&self.catalog, self.current_player)
            .collect();
        if actions.is_empty() {
            actions.push(PASS_ACTION);
        }
        actions
    }

    fn apply_action(&mut self, action: Action) -> Result<(), ActionError> {
        self.validate(action)?;
        let player = self.current_player;
        self.history.push(Ply {
            player,
            action,
            passes_before: self.consecutive_passes,
        });
        match self.catalog.get(action) {
            Some(placement) => {
                self.position.apply(placement, player);
                self.consecutive_passes = 0;
            }
            None => self.consecutive_passes += 1,
        }
        self.current_player = 1 - player;
        Ok(())
    }

    /// Reverts the most recent ply recorded in the history. The arguments
    /// only serve as a check; a mismatch is logged and the recorded ply wins.
    fn undo_action(&mut self, player: PlayerId, action: Action) {
        let Some(ply) = self.history.pop() else {
            warn!("undo of P{player} action {action} with an empty history ignored");
            return;
        };
        if (ply.player, ply.action) != (player, action) {
            warn!(
                "undo of P{player} action {action} out of order; reverting P{} action {} instead",
                ply.player, ply.action
            );
        }
        if let Some(placement) = self.catalog.get(ply.action) {
            self.position.undo(placement, ply.player);
        }
        self.consecutive_passes = ply.passes_before;
        self.current_player = ply.player;
    }

    /// Exact `+1/-1/0` outcome at terminal states, [`evaluate`](Self::evaluate)
    /// otherwise.
    fn player_return(&self, player: PlayerId) -> f64 {
        if self.is_terminal() {
            self.returns()[player]
        } else {
            self.evaluate(player)
        }
    }

    fn returns(&self) -> Vec<f64> {
        if !self.is_terminal() {
            return vec![0.0; NUM_PLAYERS];
        }
        let (s0, s1) = (self.placed_cells(0), self.placed_cells(1));
        match s0.cmp(&s1) {
            std::cmp::Ordering::Greater => vec![1.0, -1.0],
            std::cmp::Ordering::Less => vec![-1.0, 1.0],
            std::cmp::Ordering::Equal => vec![0.0, 0.0],
        }
    }
}

impl PartialEq for DuoState {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
            && self.current_player == other.current_player
            && self.consecutive_passes == other.consecutive_passes
            && self.history == other.history
    }
}

impl fmt::Debug for DuoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DuoState")
            .field("position", &self.position)
            .field("current_player", &self.current_player)
            .field("consecutive_passes", &self.consecutive_passes)
            .field("moves", &self.history.len())
            .finish()
    }
}

impl fmt::Display for DuoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(self.current_player))
    }
}
