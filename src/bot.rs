//! Move-choosing agents.
//!
//! - [`AlphaBetaBot`] - time-bounded iterative-deepening alpha-beta
//! - [`RandomBot`] - uniform choice among legal actions

use crate::constants::HEURISTIC_BOUND;
use crate::minimax::{SearchConfig, SearchError, alpha_beta_search_iterative};
use crate::state::{Action, ActionError, Game, State};

/// Chooses an action for the player to move.
pub trait Bot<S: State> {
    /// Pick an action in `state`. The state itself is not modified.
    fn step(&mut self, state: &S) -> Result<Action, SearchError>;

    fn name(&self) -> &str;
}

/// Searches with [`alpha_beta_search_iterative`], scoring cutoff nodes with
/// the state's own `player_return` seen from the player to move at the root.
///
/// Cutoff scores are divided by [`HEURISTIC_BOUND`] so that a heuristic
/// never outranks a terminal `+1/-1`.
pub struct AlphaBetaBot<G> {
    game: G,
    config: SearchConfig,
}

impl<G: Game> AlphaBetaBot<G> {
    pub fn new(game: G, config: SearchConfig) -> Self {
        Self { game, config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SearchConfig {
        &mut self.config
    }
}

impl<G: Game> Bot<G::State> for AlphaBetaBot<G> {
    fn step(&mut self, state: &G::State) -> Result<Action, SearchError> {
        let player = state
            .current_player()
            .player()
            .ok_or(SearchError::Action(ActionError::GameOver))?;
        let actions = state.legal_actions();
        if let [only] = actions.as_slice() {
            return Ok(*only);
        }

        let value_fn = move |s: &G::State| s.player_return(player) / HEURISTIC_BOUND;
        let (_, action) = alpha_beta_search_iterative(
            &self.game,
            Some(state),
            Some(&value_fn),
            self.config.time_limit,
            self.config.depth_limit,
            Some(player),
            self.config.traversal,
        )?;
        action
            .or_else(|| actions.first().copied())
            .ok_or(SearchError::Action(ActionError::GameOver))
    }

    fn name(&self) -> &str {
        "alpha-beta"
    }
}

/// Plays a uniformly random legal action.
pub struct RandomBot {
    rng: fastrand::Rng,
}

impl RandomBot {
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }
}

impl Default for RandomBot {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> Bot<S> for RandomBot {
    fn step(&mut self, state: &S) -> Result<Action, SearchError> {
        let actions = state.legal_actions();
        if actions.is_empty() {
            return Err(SearchError::Action(ActionError::GameOver));
        }
        Ok(actions[self.rng.usize(..actions.len())])
    }

    fn name(&self) -> &str {
        "random"
    }
}
