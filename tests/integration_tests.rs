//! Integration tests for blokus-rust
//!
//! These tests drive the tiling engine and the game facade through the
//! public API: move generation against a cell-by-cell reference, apply/undo
//! symmetry, pass and termination rules, scoring and observations.

use blokus_rust::bitboard::{BORDER, cell};
use blokus_rust::catalog::Catalog;
use blokus_rust::constants::{
    HEURISTIC_BOUND, NUM_DISTINCT_ACTIONS, NUM_PLACEMENTS, OBSERVATION_SIZE, PASS_ACTION, START_CELL_P0,
    START_CELL_P1, TOTAL_PIECE_CELLS, W,
};
use blokus_rust::game::{DuoGame, DuoState};
use blokus_rust::polyomino::Polyomino;
use blokus_rust::position::{Inventory, Position, START_CELLS};
use blokus_rust::state::{ActionError, ChanceMode, Game, State, Turn, Utility};

// =============================================================================
// Helpers
// =============================================================================

/// Play `plies` random actions (or fewer if the game ends) from the start.
fn random_state(game: &DuoGame, seed: u64, plies: usize) -> DuoState {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut state = game.new_initial_state();
    for _ in 0..plies {
        if state.is_terminal() {
            break;
        }
        let actions = state.legal_actions();
        let action = actions[rng.usize(..actions.len())];
        state.apply_action(action).unwrap();
    }
    state
}

/// Legal placements computed cell by cell, without bitboard shifts.
fn reference_legal_placements(catalog: &Catalog, position: &Position, player: usize) -> Vec<usize> {
    let own = &position.boards[player];
    let mut legal = Vec::new();
    for (id, placement) in catalog.iter() {
        if !position.inventories[player].has(placement.piece) {
            continue;
        }
        let mut fits = true;
        let mut touches_corner = false;
        for c in placement.cells().iter_ones() {
            if position.combined.get(c) || BORDER.get(c) {
                fits = false;
                break;
            }
            if [c - 1, c + 1, c - W, c + W].iter().any(|&n| own.get(n)) {
                fits = false;
                break;
            }
            if c == START_CELLS[player]
                || [c - W - 1, c - W + 1, c + W - 1, c + W + 1]
                    .iter()
                    .any(|&n| own.get(n))
            {
                touches_corner = true;
            }
        }
        if fits && touches_corner {
            legal.push(id);
        }
    }
    legal
}

fn current(state: &DuoState) -> usize {
    state.current_player().player().unwrap()
}

// =============================================================================
// Catalog and game metadata
// =============================================================================

#[test]
fn test_action_space() {
    let game = DuoGame::new();
    assert_eq!(game.catalog().len(), NUM_PLACEMENTS);
    assert_eq!(game.num_distinct_actions(), NUM_DISTINCT_ACTIONS);
    assert_eq!(PASS_ACTION, NUM_PLACEMENTS);
    assert!(game.catalog().get(PASS_ACTION).is_none());
    assert_eq!(game.num_players(), 2);
    assert_eq!(game.max_game_length(), 86);
    assert_eq!((game.min_utility(), game.max_utility()), (-1.0, 1.0));

    let info = game.game_type();
    assert_eq!(info.short_name, "blokus_duo");
    assert_eq!(info.chance_mode, ChanceMode::Deterministic);
    assert_eq!(info.utility, Utility::ZeroSum);
}

#[test]
fn test_catalog_covers_every_piece_orientation() {
    let game = DuoGame::new();
    let catalog = game.catalog();
    for piece in Polyomino::ALL {
        let variants: std::collections::HashSet<u8> =
            catalog.range(piece).filter_map(|i| catalog.get(i)).map(|p| p.variant).collect();
        assert_eq!(variants.len(), piece.variants().len(), "{piece}");
    }
}

// =============================================================================
// Move generation
// =============================================================================

#[test]
fn test_first_move_covers_start_anchor() {
    let game = DuoGame::new();
    let mut state = game.new_initial_state();
    let actions = state.legal_actions();
    assert_eq!(actions.len(), 414);
    let monomino = game.catalog().find(Polyomino::I1, 0, START_CELL_P0).unwrap();
    assert!(actions.contains(&monomino));
    for &id in &actions {
        assert!(game.catalog().get(id).unwrap().cells().get(START_CELL_P0));
    }

    state.apply_action(monomino).unwrap();
    let replies = state.legal_actions();
    assert_eq!(replies.len(), 414);
    for &id in &replies {
        assert!(game.catalog().get(id).unwrap().cells().get(START_CELL_P1));
    }
}

#[test]
fn test_monomino_opening_anchors() {
    let game = DuoGame::new();
    let mut state = game.new_initial_state();
    let monomino = game.catalog().find(Polyomino::I1, 0, START_CELL_P0).unwrap();
    state.apply_action(monomino).unwrap();
    let anchors: Vec<usize> = state.position().anchors[0].iter_ones().collect();
    assert_eq!(anchors, vec![cell(4, 9), cell(4, 11), cell(6, 9), cell(6, 11)]);
}

#[test]
fn test_legal_moves_match_reference() {
    let game = DuoGame::new();
    for (seed, plies) in [(1, 2), (2, 5), (3, 9), (4, 14), (5, 20), (6, 30)] {
        let state = random_state(&game, seed, plies);
        if state.is_terminal() {
            continue;
        }
        for player in 0..2 {
            let fast: Vec<usize> = state
                .position()
                .legal_placements(game.catalog(), player)
                .collect();
            let reference = reference_legal_placements(game.catalog(), state.position(), player);
            assert_eq!(fast, reference, "seed {seed}, player {player}");
        }
    }
}

#[test]
fn test_edge_contact_with_own_piece_is_illegal() {
    let game = DuoGame::new();
    let catalog = game.catalog();
    let mut state = game.new_initial_state();
    state
        .apply_action(catalog.find(Polyomino::I1, 0, START_CELL_P0).unwrap())
        .unwrap();
    state.apply_action(PASS_ACTION).unwrap();

    // Right next to the monomino: shares an edge.
    let beside = catalog.find(Polyomino::I1, 0, START_CELL_P0 + 1).unwrap();
    assert_eq!(
        state.apply_action(beside),
        Err(ActionError::Illegal { action: beside })
    );
    // Corner contact only: legal.
    let diagonal = catalog.find(Polyomino::I2, 0, START_CELL_P0 + W + 1).unwrap();
    assert!(catalog.get(diagonal).unwrap().cells().get(START_CELL_P0 + W + 1));
    assert!(state.legal_actions().contains(&diagonal));
    state.apply_action(diagonal).unwrap();
    assert!(state.position().boards[0].get(START_CELL_P0 + W + 1));
}

// =============================================================================
// Apply / undo
// =============================================================================

#[test]
fn test_apply_undo_restores_state() {
    let game = DuoGame::new();
    for (seed, plies) in [(11, 0), (12, 3), (13, 8), (14, 16)] {
        let mut state = random_state(&game, seed, plies);
        if state.is_terminal() {
            continue;
        }
        let before = state.clone();
        let player = current(&state);
        for action in state.legal_actions() {
            state.apply_action(action).unwrap();
            state.undo_action(player, action);
            assert_eq!(state, before, "seed {seed}, action {action}");
        }
        state.apply_action(PASS_ACTION).unwrap();
        state.undo_action(player, PASS_ACTION);
        assert_eq!(state, before);
    }
}

#[test]
fn test_invariants_during_random_games() {
    let game = DuoGame::new();
    for seed in 0..4 {
        let mut rng = fastrand::Rng::with_seed(100 + seed);
        let mut state = game.new_initial_state();
        while !state.is_terminal() {
            let position = state.position();
            assert!(position.is_consistent());
            for player in 0..2 {
                assert_eq!(
                    state.placed_cells(player) + state.remaining_cells(player),
                    TOTAL_PIECE_CELLS
                );
                assert!(!position.anchors[player].intersects(&position.combined));
            }
            let mut recomputed = position.clone();
            recomputed.recompute_anchors();
            assert_eq!(&recomputed, position);

            let actions = state.legal_actions();
            let action = actions[rng.usize(..actions.len())];
            state.apply_action(action).unwrap();
        }
        assert!(state.move_number() <= game.max_game_length());
    }
}

#[test]
fn test_child_leaves_parent_untouched() {
    let game = DuoGame::new();
    let state = random_state(&game, 21, 4);
    let snapshot = state.clone();
    let action = state.legal_actions()[0];
    let child = state.child(action).unwrap();
    assert_eq!(state, snapshot);
    assert_eq!(child.move_number(), state.move_number() + 1);
    assert_eq!(child.history().last(), Some(&action));
}

// =============================================================================
// Passing, termination and scoring
// =============================================================================

#[test]
fn test_pass_is_the_only_action_without_placements() {
    let game = DuoGame::new();
    let mut position = Position::new();
    position.inventories[0] = Inventory::EMPTY;
    let state = DuoState::from_position(game.catalog().clone(), position, 0);
    assert_eq!(state.legal_actions(), vec![PASS_ACTION]);
    assert_eq!(
        state.position().count_legal_placements(game.catalog(), 1),
        414
    );
}

#[test]
fn test_pass_counter_resets_on_placement() {
    let game = DuoGame::new();
    let mut state = game.new_initial_state();
    state.apply_action(PASS_ACTION).unwrap();
    assert_eq!(state.consecutive_passes(), 1);
    let action = state.legal_actions()[0];
    state.apply_action(action).unwrap();
    assert_eq!(state.consecutive_passes(), 0);
    state.apply_action(PASS_ACTION).unwrap();
    assert!(!state.is_terminal());
    state.apply_action(PASS_ACTION).unwrap();
    assert!(state.is_terminal());
    assert_eq!(state.history(), vec![PASS_ACTION, action, PASS_ACTION, PASS_ACTION]);
}

#[test]
fn test_terminal_returns() {
    let game = DuoGame::new();
    for seed in 0..3 {
        let mut state = game.new_initial_state();
        let mut rng = fastrand::Rng::with_seed(200 + seed);
        blokus_rust::playout::random_playout(&mut state, &mut rng);
        assert_eq!(state.current_player(), Turn::Terminal);

        let returns = state.returns();
        assert_eq!(returns.iter().sum::<f64>(), 0.0);
        let (s0, s1) = (state.placed_cells(0), state.placed_cells(1));
        let expected = match s0.cmp(&s1) {
            std::cmp::Ordering::Greater => 1.0,
            std::cmp::Ordering::Less => -1.0,
            std::cmp::Ordering::Equal => 0.0,
        };
        assert_eq!(returns[0], expected);
        assert_eq!(state.player_return(0), returns[0]);
        assert_eq!(state.player_return(1), returns[1]);
    }
}

#[test]
fn test_heuristic_is_antisymmetric() {
    let game = DuoGame::new();
    assert_eq!(game.new_initial_state().player_return(0), 0.0);
    for seed in 30..34 {
        let state = random_state(&game, seed, 6);
        if state.is_terminal() {
            continue;
        }
        assert_eq!(state.player_return(0), -state.player_return(1));
    }
}

#[test]
fn test_heuristic_stays_below_terminal_scale() {
    let game = DuoGame::new();
    for seed in 50..56 {
        for plies in [0, 4, 12, 24] {
            let state = random_state(&game, seed, plies);
            if state.is_terminal() {
                continue;
            }
            for player in 0..2 {
                let scaled = state.player_return(player) / HEURISTIC_BOUND;
                assert!(scaled.abs() < 1.0, "seed {seed} plies {plies}: {scaled}");
            }
        }
    }
}

#[test]
fn test_rejected_actions_do_not_mutate() {
    let game = DuoGame::new();
    let mut state = random_state(&game, 41, 5);
    let before = state.clone();
    assert!(matches!(
        state.apply_action(NUM_DISTINCT_ACTIONS + 7),
        Err(ActionError::OutOfRange { .. })
    ));
    let corner = game.catalog().find(Polyomino::I1, 0, cell(14, 14)).unwrap();
    if !state.legal_actions().contains(&corner) {
        assert_eq!(
            state.apply_action(corner),
            Err(ActionError::Illegal { action: corner })
        );
    }
    assert_eq!(state, before);
}

#[test]
fn test_piece_cannot_be_placed_twice() {
    let game = DuoGame::new();
    let catalog = game.catalog();
    let mut state = game.new_initial_state();
    state
        .apply_action(catalog.find(Polyomino::I1, 0, START_CELL_P0).unwrap())
        .unwrap();
    state.apply_action(PASS_ACTION).unwrap();
    for id in state.legal_actions() {
        assert_ne!(catalog.get(id).unwrap().piece, Polyomino::I1);
    }
}

// =============================================================================
// Observations and rendering
// =============================================================================

#[test]
fn test_observation_perspective() {
    let game = DuoGame::new();
    let state = random_state(&game, 51, 4);
    let plane = OBSERVATION_SIZE / game.observation_tensor_shape()[0];
    let sum = |obs: &[f32], channel: usize| -> f32 {
        obs[channel * plane..(channel + 1) * plane].iter().sum()
    };

    let obs0 = state.observation(0);
    let obs1 = state.observation(1);
    assert_eq!(sum(&obs0, 0), state.placed_cells(0) as f32);
    assert_eq!(sum(&obs0, 1), state.placed_cells(1) as f32);
    assert_eq!(sum(&obs1, 0), state.placed_cells(1) as f32);
    assert_eq!(sum(&obs1, 1), state.placed_cells(0) as f32);
    assert_eq!(sum(&obs0, 2), state.position().anchors[0].count() as f32);
    assert_eq!(sum(&obs1, 2), state.position().anchors[1].count() as f32);
    assert_eq!(sum(&obs0, 3), sum(&obs1, 2));

    let own_planes: f32 = (4..25).map(|c| sum(&obs0, c)).sum();
    assert_eq!(own_planes, (state.position().inventories[0].len() * plane) as f32);
}

#[test]
fn test_observation_string_marks_perspective() {
    let game = DuoGame::new();
    let mut state = game.new_initial_state();
    let monomino = game.catalog().find(Polyomino::I1, 0, START_CELL_P0).unwrap();
    state.apply_action(monomino).unwrap();

    let row = |text: &str, r: usize| -> String {
        text.lines()
            .skip_while(|l| !l.starts_with("Board"))
            .nth(r + 1)
            .unwrap()
            .to_string()
    };
    let p0 = state.observation_string(0);
    let p1 = state.observation_string(1);
    assert_eq!(row(&p0, 5).chars().nth(10), Some('X'));
    assert_eq!(row(&p1, 5).chars().nth(10), Some('O'));
    assert!(game.action_to_string(0, monomino).contains("I1"));
}
