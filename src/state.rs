//! The game-agnostic state interface consumed by the search algorithms.
//!
//! Any deterministic or stochastic two-player game can be searched by
//! implementing [`Game`] and [`State`]. Actions are plain integer ids in the
//! range `0..Game::num_distinct_actions()`.

use thiserror::Error;

pub use crate::position::PlayerId;

/// Integer action id.
pub type Action = usize;

/// Whose turn it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Turn {
    Player(PlayerId),
    /// Nature picks the next action according to `chance_outcomes`.
    Chance,
    Terminal,
}

impl Turn {
    /// The player to move, if it is a player's turn.
    pub fn player(self) -> Option<PlayerId> {
        match self {
            Turn::Player(p) => Some(p),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dynamics {
    Sequential,
    Simultaneous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanceMode {
    Deterministic,
    /// Chance nodes list their outcomes and probabilities explicitly.
    ExplicitStochastic,
    SampledStochastic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Information {
    PerfectInformation,
    ImperfectInformation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utility {
    ZeroSum,
    ConstantSum,
    GeneralSum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardModel {
    /// Rewards only at the end of the game.
    Terminal,
    Rewards,
}

/// Static facts about a game, checked by search preconditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameType {
    pub short_name: &'static str,
    pub long_name: &'static str,
    pub dynamics: Dynamics,
    pub chance_mode: ChanceMode,
    pub information: Information,
    pub utility: Utility,
    pub reward_model: RewardModel,
}

/// Rejected action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("action {action} is outside the action space (0..{limit})")]
    OutOfRange { action: Action, limit: usize },
    #[error("action {action} is not legal in this state")]
    Illegal { action: Action },
    #[error("the game is already over")]
    GameOver,
}

/// A game: rules metadata plus a factory for initial states.
pub trait Game {
    type State: State;

    fn game_type(&self) -> &GameType;

    fn num_players(&self) -> usize;

    /// Size of the action id space.
    fn num_distinct_actions(&self) -> usize;

    fn new_initial_state(&self) -> Self::State;

    fn min_utility(&self) -> f64;

    fn max_utility(&self) -> f64;

    /// Maximum number of plies in one game.
    fn max_game_length(&self) -> usize;
}

/// A mutable game state.
///
/// `clone` must produce an independent deep copy.
pub trait State: Clone {
    fn current_player(&self) -> Turn;

    fn is_terminal(&self) -> bool;

    fn is_chance_node(&self) -> bool {
        self.current_player() == Turn::Chance
    }

    /// Actions available to the player to move; empty iff terminal.
    fn legal_actions(&self) -> Vec<Action>;

    /// Play `action` and advance one ply. On error the state is unchanged.
    fn apply_action(&mut self, action: Action) -> Result<(), ActionError>;

    /// Revert the most recent `apply_action(action)` made by `player`.
    /// Callers must undo in LIFO order.
    fn undo_action(&mut self, player: PlayerId, action: Action);

    /// Value of the state for `player`. Exact at terminal states; games may
    /// return a heuristic estimate elsewhere.
    fn player_return(&self, player: PlayerId) -> f64;

    /// Terminal returns of every player.
    fn returns(&self) -> Vec<f64>;

    /// Outcomes and probabilities at a chance node.
    fn chance_outcomes(&self) -> Vec<(Action, f64)> {
        Vec::new()
    }

    /// A copy of this state with `action` applied.
    fn child(&self, action: Action) -> Result<Self, ActionError> {
        let mut child = self.clone();
        child.apply_action(action)?;
        Ok(child)
    }
}
