//! Exact game-tree search over the [`State`] interface.
//!
//! This module provides:
//! - Alpha-beta search, walking the tree either on cloned children or on one
//!   shared state with apply/undo
//! - A time-bounded iterative-deepening driver on top of alpha-beta
//! - Expectiminimax for games with explicit chance nodes
//!
//! All values are from the point of view of the maximizing player. Any other
//! player is treated as the minimizer.

use std::time::{Duration, Instant};

use log::debug;
use thiserror::Error;

use crate::constants::{BRANCHING_MULTIPLIER, DEFAULT_DEPTH_LIMIT, DEFAULT_TIME_LIMIT};
use crate::state::{
    Action, ActionError, ChanceMode, Dynamics, Game, Information, PlayerId, RewardModel, State,
    Turn, Utility,
};

/// Optional heuristic used at the depth cutoff.
pub type ValueFn<'a, S> = Option<&'a dyn Fn(&S) -> f64>;

/// Search outcome: value for the maximizing player and the root action
/// achieving it (`None` when the root had no children to choose from).
pub type SearchOutput = (f64, Option<Action>);

/// How the recursion recovers the parent state after visiting a child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Traversal {
    /// Every child is an independent clone.
    Clone,
    /// One shared state, `apply_action` before and `undo_action` after
    /// each child.
    #[default]
    Undo,
}

/// Runtime knobs for the iterative-deepening driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    pub time_limit: Duration,
    pub depth_limit: u32,
    pub traversal: Traversal,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            time_limit: DEFAULT_TIME_LIMIT,
            depth_limit: DEFAULT_DEPTH_LIMIT,
            traversal: Traversal::default(),
        }
    }
}

impl SearchConfig {
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }

    pub fn with_depth_limit(mut self, depth_limit: u32) -> Self {
        self.depth_limit = depth_limit;
        self
    }

    pub fn with_traversal(mut self, traversal: Traversal) -> Self {
        self.traversal = traversal;
        self
    }
}

/// Configuration errors and action failures that abort a search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("search supports at most two players")]
    TooManyPlayers,
    #[error("depth limit reached at a non-terminal state and no value function was given")]
    DepthExhausted,
    #[error("game does not satisfy the search requirement: {requirement}")]
    UnsupportedGame { requirement: &'static str },
    #[error("maximizing player {player} is not one of the {num_players} players")]
    InvalidPlayer { player: PlayerId, num_players: usize },
    #[error("{bots} bots given for a game of {num_players} players")]
    MissingBots { bots: usize, num_players: usize },
    #[error("no maximizing player given and the root has no player to move")]
    NoMaximizingPlayer,
    #[error("alpha-beta reached a chance node")]
    UnexpectedChanceNode,
    #[error("iterative deepening needs a depth limit of at least 1")]
    InvalidDepthLimit,
    #[error(transparent)]
    Action(#[from] ActionError),
}

fn check_players<G: Game>(game: &G) -> Result<(), SearchError> {
    if game.num_players() > 2 {
        return Err(SearchError::TooManyPlayers);
    }
    Ok(())
}

fn search_root<G: Game>(game: &G, state: Option<&G::State>) -> G::State {
    match state {
        Some(s) => s.clone(),
        None => game.new_initial_state(),
    }
}

fn resolve_player<S: State>(
    root: &S,
    player: Option<PlayerId>,
    num_players: usize,
) -> Result<PlayerId, SearchError> {
    match player {
        Some(p) if p >= num_players => Err(SearchError::InvalidPlayer {
            player: p,
            num_players,
        }),
        Some(p) => Ok(p),
        None => root
            .current_player()
            .player()
            .ok_or(SearchError::NoMaximizingPlayer),
    }
}

/// Recursion context shared by every node of one alpha-beta call.
struct AlphaBeta<'a, S> {
    value_fn: ValueFn<'a, S>,
    maximizing_player: PlayerId,
    traversal: Traversal,
    nodes: u64,
}

impl<S: State> AlphaBeta<'_, S> {
    fn search(
        &mut self,
        state: &mut S,
        depth: u32,
        mut alpha: f64,
        mut beta: f64,
        best_action: &mut Option<Action>,
    ) -> Result<f64, SearchError> {
        self.nodes += 1;
        if state.is_terminal() {
            return Ok(state.player_return(self.maximizing_player));
        }
        if depth == 0 {
            return match self.value_fn {
                Some(f) => Ok(f(&*state)),
                None => Err(SearchError::DepthExhausted),
            };
        }

        let player = match state.current_player() {
            Turn::Player(p) => p,
            Turn::Chance => return Err(SearchError::UnexpectedChanceNode),
            Turn::Terminal => return Ok(state.player_return(self.maximizing_player)),
        };
        let maximizing = player == self.maximizing_player;
        let mut value = if maximizing {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };

        for action in state.legal_actions() {
            let child_value = self.visit_child(state, player, action, depth - 1, alpha, beta)?;
            if maximizing {
                if child_value > value {
                    value = child_value;
                    *best_action = Some(action);
                }
                alpha = alpha.max(value);
            } else {
                if child_value < value {
                    value = child_value;
                    *best_action = Some(action);
                }
                beta = beta.min(value);
            }
            if alpha >= beta {
                break;
            }
        }
        Ok(value)
    }

    fn visit_child(
        &mut self,
        state: &mut S,
        player: PlayerId,
        action: Action,
        depth: u32,
        alpha: f64,
        beta: f64,
    ) -> Result<f64, SearchError> {
        let mut unused = None;
        match self.traversal {
            Traversal::Clone => {
                let mut child = state.child(action)?;
                self.search(&mut child, depth, alpha, beta, &mut unused)
            }
            Traversal::Undo => {
                state.apply_action(action)?;
                let result = self.search(state, depth, alpha, beta, &mut unused);
                state.undo_action(player, action);
                result
            }
        }
    }
}

/// Depth-limited alpha-beta search.
///
/// Searches from `state` (or the initial state when `None`) on a private
/// copy, so the caller's state is never modified. `maximizing_player`
/// defaults to the player to move at the root. A non-terminal state at the
/// depth cutoff is scored with `value_fn`; without one the search fails
/// with [`SearchError::DepthExhausted`].
pub fn alpha_beta_search<G: Game>(
    game: &G,
    state: Option<&G::State>,
    value_fn: ValueFn<'_, G::State>,
    depth_limit: u32,
    maximizing_player: Option<PlayerId>,
    traversal: Traversal,
) -> Result<SearchOutput, SearchError> {
    check_players(game)?;
    let mut root = search_root(game, state);
    let maximizing_player = resolve_player(&root, maximizing_player, game.num_players())?;

    let mut searcher = AlphaBeta {
        value_fn,
        maximizing_player,
        traversal,
        nodes: 0,
    };
    let mut best_action = None;
    let value = searcher.search(
        &mut root,
        depth_limit,
        f64::NEG_INFINITY,
        f64::INFINITY,
        &mut best_action,
    )?;
    debug!(
        "alpha-beta depth {depth_limit}: value {value:.3}, action {best_action:?}, {} nodes",
        searcher.nodes
    );
    Ok((value, best_action))
}

/// Iterative-deepening alpha-beta under a wall-clock budget.
///
/// Runs [`alpha_beta_search`] at depth 1, 2, ... and returns the result of
/// the deepest completed depth. After each depth, the next one is started
/// only if the elapsed time plus [`BRANCHING_MULTIPLIER`] times the last
/// depth's duration stays below `max_time`. A depth in progress is never
/// interrupted, so a single long depth may overrun the budget.
pub fn alpha_beta_search_iterative<G: Game>(
    game: &G,
    state: Option<&G::State>,
    value_fn: ValueFn<'_, G::State>,
    max_time: Duration,
    depth_limit: u32,
    maximizing_player: Option<PlayerId>,
    traversal: Traversal,
) -> Result<SearchOutput, SearchError> {
    if depth_limit == 0 {
        return Err(SearchError::InvalidDepthLimit);
    }
    check_players(game)?;
    let root = search_root(game, state);
    let maximizing_player = resolve_player(&root, maximizing_player, game.num_players())?;
    if root.is_terminal() {
        return Ok((root.player_return(maximizing_player), None));
    }

    let start = Instant::now();
    let mut depth = 1;
    loop {
        let depth_start = Instant::now();
        let result = alpha_beta_search(
            game,
            Some(&root),
            value_fn,
            depth,
            Some(maximizing_player),
            traversal,
        )?;
        let depth_time = depth_start.elapsed();
        let total = start.elapsed();
        debug!(
            "depth {depth} done in {depth_time:?} (total {total:?}): value {:.3}, action {:?}",
            result.0, result.1
        );

        if depth == depth_limit {
            debug!("stopping: depth limit {depth_limit} reached");
            return Ok(result);
        }
        let projected = depth_time.saturating_mul(BRANCHING_MULTIPLIER);
        if total.saturating_add(projected) >= max_time {
            debug!("stopping after depth {depth}: next depth projected past {max_time:?}");
            return Ok(result);
        }
        depth += 1;
    }
}

fn expectiminimax<S: State>(
    state: &S,
    depth: u32,
    value_fn: ValueFn<'_, S>,
    maximizing_player: PlayerId,
    best_action: &mut Option<Action>,
) -> Result<f64, SearchError> {
    if state.is_terminal() {
        return Ok(state.player_return(maximizing_player));
    }
    if depth == 0 {
        return match value_fn {
            Some(f) => Ok(f(state)),
            None => Err(SearchError::DepthExhausted),
        };
    }

    let mut unused = None;
    let player = match state.current_player() {
        Turn::Chance => {
            // Chance plies do not consume depth.
            let mut value = 0.0;
            for (action, prob) in state.chance_outcomes() {
                let child = state.child(action)?;
                value +=
                    prob * expectiminimax(&child, depth, value_fn, maximizing_player, &mut unused)?;
            }
            return Ok(value);
        }
        Turn::Player(p) => p,
        Turn::Terminal => return Ok(state.player_return(maximizing_player)),
    };

    let maximizing = player == maximizing_player;
    let mut value = if maximizing {
        f64::NEG_INFINITY
    } else {
        f64::INFINITY
    };
    for action in state.legal_actions() {
        let child = state.child(action)?;
        let child_value = expectiminimax(&child, depth - 1, value_fn, maximizing_player, &mut unused)?;
        let better = if maximizing {
            child_value > value
        } else {
            child_value < value
        };
        if better {
            value = child_value;
            *best_action = Some(action);
        }
    }
    Ok(value)
}

/// Depth-limited expectiminimax for sequential, perfect-information,
/// zero-sum games with explicit chance nodes and terminal rewards.
///
/// Chance nodes take the probability-weighted mean of their outcomes and do
/// not count towards `depth_limit`. There is no pruning.
pub fn expectiminimax_search<G: Game>(
    game: &G,
    state: Option<&G::State>,
    value_fn: ValueFn<'_, G::State>,
    depth_limit: u32,
    maximizing_player: Option<PlayerId>,
) -> Result<SearchOutput, SearchError> {
    check_players(game)?;
    let info = game.game_type();
    let requirement = if info.chance_mode != ChanceMode::ExplicitStochastic {
        Some("explicit stochastic chance mode")
    } else if info.information != Information::PerfectInformation {
        Some("perfect information")
    } else if info.dynamics != Dynamics::Sequential {
        Some("sequential dynamics")
    } else if info.utility != Utility::ZeroSum {
        Some("zero-sum utility")
    } else if info.reward_model != RewardModel::Terminal {
        Some("terminal rewards")
    } else {
        None
    };
    if let Some(requirement) = requirement {
        return Err(SearchError::UnsupportedGame { requirement });
    }

    let root = search_root(game, state);
    let maximizing_player = resolve_player(&root, maximizing_player, game.num_players())?;
    let mut best_action = None;
    let value = expectiminimax(&root, depth_limit, value_fn, maximizing_player, &mut best_action)?;
    Ok((value, best_action))
}
