//! Random playouts and bot-vs-bot games.
//!
//! A playout plays uniformly random legal actions until the game ends. Any
//! [`State`] works; passing is just another legal action, so a playout
//! always terminates once neither side can place a piece.

use log::debug;

use crate::bot::Bot;
use crate::minimax::SearchError;
use crate::state::{Action, Game, State};

/// Play random legal actions from `state` until it is terminal.
///
/// Returns the number of plies played.
pub fn random_playout<S: State>(state: &mut S, rng: &mut fastrand::Rng) -> usize {
    let mut plies = 0;
    while !state.is_terminal() {
        let actions = state.legal_actions();
        if actions.is_empty() {
            break;
        }
        let action = actions[rng.usize(..actions.len())];
        if state.apply_action(action).is_err() {
            break;
        }
        plies += 1;
    }
    plies
}

/// Actions played and final returns of a finished game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub actions: Vec<Action>,
    pub returns: Vec<f64>,
}

/// Play one game from the initial state, `bots[p]` choosing for player `p`.
///
/// Fails with [`SearchError::MissingBots`] unless every player has a bot.
pub fn play_game<G: Game>(
    game: &G,
    bots: &mut [&mut dyn Bot<G::State>],
) -> Result<GameRecord, SearchError> {
    if bots.len() < game.num_players() {
        return Err(SearchError::MissingBots {
            bots: bots.len(),
            num_players: game.num_players(),
        });
    }
    let mut state = game.new_initial_state();
    let mut actions = Vec::new();
    while let Some(player) = state.current_player().player() {
        let bot = &mut bots[player];
        let action = bot.step(&state)?;
        debug!("ply {}: player {player} ({}) plays {action}", actions.len(), bot.name());
        state.apply_action(action)?;
        actions.push(action);
    }
    Ok(GameRecord {
        actions,
        returns: state.returns(),
    })
}
