//! Line-oriented text protocol for driving the engine from another program.
//!
//! The framing follows GTP: one command per line, an optional numeric id in
//! front, and a reply of `=[id] message` on success or `?[id] message` on
//! failure, terminated by an empty line. Actions are catalog ids; `pass`
//! is accepted wherever an action is expected.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`
//! - `list_commands`, `known_command <cmd>`, `quit`
//! - `clear_board` - start a new game
//! - `play <id|pass>` - play an action for the player to move
//! - `undo` - take back the last action
//! - `genmove` - search, play and print an action for the player to move
//! - `legal_moves` - list the legal action ids
//! - `showboard` - print the board
//! - `score` - placed cells of player 0 and player 1
//! - `time_limit <secs>`, `depth_limit <n>` - search budget

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::bot::{AlphaBetaBot, Bot};
use crate::constants::PASS_ACTION;
use crate::game::{DuoGame, DuoState};
use crate::minimax::SearchConfig;
use crate::state::{Action, Game, State};

const PROTOCOL_VERSION: &str = "1";

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "clear_board",
    "depth_limit",
    "genmove",
    "known_command",
    "legal_moves",
    "list_commands",
    "name",
    "play",
    "protocol_version",
    "quit",
    "score",
    "showboard",
    "time_limit",
    "undo",
    "version",
];

/// Protocol engine state.
pub struct ProtocolEngine {
    game: DuoGame,
    state: DuoState,
    bot: AlphaBetaBot<DuoGame>,
}

impl ProtocolEngine {
    pub fn new(game: DuoGame, config: SearchConfig) -> Self {
        let state = game.new_initial_state();
        let bot = AlphaBetaBot::new(game.clone(), config);
        Self { game, state, bot }
    }

    pub fn state(&self) -> &DuoState {
        &self.state
    }

    /// Run the command loop on stdin/stdout.
    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_with(stdin.lock(), stdout.lock())
    }

    /// Run the command loop until `quit` or end of input.
    pub fn run_with<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        for line in input.lines() {
            let line = line.context("failed to read command")?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();

            let (success, message) = self.execute(&command, args);
            if !success {
                warn!("command '{command_line}' failed: {message}");
            }
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            write!(output, "{prefix}{id_str} {message}\n\n").context("failed to write reply")?;
            output.flush().context("failed to flush reply")?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command id from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end > 0 {
            if let Ok(id) = trimmed[..end].parse::<u32>() {
                return (Some(id), trimmed[end..].trim());
            }
        }
        (None, trimmed)
    }

    fn parse_action(arg: &str) -> Option<Action> {
        if arg.eq_ignore_ascii_case("pass") {
            Some(PASS_ACTION)
        } else {
            arg.parse().ok()
        }
    }

    fn format_action(action: Action) -> String {
        if action == PASS_ACTION {
            "pass".to_string()
        } else {
            action.to_string()
        }
    }

    /// Execute a command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, PROTOCOL_VERSION.to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => match args.first() {
                Some(cmd) => {
                    let known = KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str());
                    (true, known.to_string())
                }
                None => (false, "missing argument".to_string()),
            },

            "quit" => (true, String::new()),

            "clear_board" => {
                self.state = self.game.new_initial_state();
                (true, String::new())
            }

            "play" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let Some(action) = Self::parse_action(arg) else {
                    return (false, format!("invalid action: {arg}"));
                };
                match self.state.apply_action(action) {
                    Ok(()) => (true, String::new()),
                    Err(e) => (false, e.to_string()),
                }
            }

            "undo" => match self.state.last_move() {
                Some((player, action)) => {
                    self.state.undo_action(player, action);
                    (true, String::new())
                }
                None => (false, "cannot undo".to_string()),
            },

            "genmove" => {
                let player = match self.state.current_player().player() {
                    Some(p) => p,
                    None => return (false, "game is over".to_string()),
                };
                let action = match self.bot.step(&self.state) {
                    Ok(a) => a,
                    Err(e) => return (false, e.to_string()),
                };
                if let Err(e) = self.state.apply_action(action) {
                    return (false, e.to_string());
                }
                info!("genmove: {}", self.game.action_to_string(player, action));
                (true, Self::format_action(action))
            }

            "legal_moves" => {
                let moves: Vec<String> = self
                    .state
                    .legal_actions()
                    .into_iter()
                    .map(Self::format_action)
                    .collect();
                (true, moves.join(" "))
            }

            "showboard" => (true, format!("\n{}", self.state)),

            "score" => (
                true,
                format!("{} {}", self.state.placed_cells(0), self.state.placed_cells(1)),
            ),

            "time_limit" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match arg.parse::<f64>().ok().and_then(|s| Duration::try_from_secs_f64(s).ok()) {
                    Some(limit) => {
                        self.bot.config_mut().time_limit = limit;
                        (true, String::new())
                    }
                    None => (false, format!("invalid time limit: {arg}")),
                }
            }

            "depth_limit" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match arg.parse::<u32>() {
                    Ok(depth) if depth > 0 => {
                        self.bot.config_mut().depth_limit = depth;
                        (true, String::new())
                    }
                    _ => (false, format!("invalid depth limit: {arg}")),
                }
            }

            _ => (false, format!("unknown command: {command}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ProtocolEngine {
        let config = SearchConfig::default()
            .with_depth_limit(1)
            .with_time_limit(Duration::from_secs(60));
        ProtocolEngine::new(DuoGame::new(), config)
    }

    #[test]
    fn test_parse_id_with_id() {
        let (id, cmd) = ProtocolEngine::parse_id("123 name");
        assert_eq!(id, Some(123));
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_parse_id_without_id() {
        let (id, cmd) = ProtocolEngine::parse_id("name");
        assert_eq!(id, None);
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_known_command() {
        let mut engine = engine();
        assert_eq!(engine.execute("known_command", &["genmove"]), (true, "true".to_string()));
        assert_eq!(engine.execute("known_command", &["boardsize"]), (true, "false".to_string()));
        assert!(!engine.execute("known_command", &[]).0);
    }

    #[test]
    fn test_play_undo_and_clear() {
        let mut engine = engine();
        let first = engine.state().legal_actions()[0].to_string();
        let first = first.as_str();
        assert!(engine.execute("play", &[first]).0);
        assert_eq!(engine.state().move_number(), 1);
        assert!(engine.execute("play", &["pass"]).0);
        assert!(engine.execute("undo", &[]).0);
        assert_eq!(engine.state().move_number(), 1);
        assert!(engine.execute("clear_board", &[]).0);
        assert_eq!(engine.state().move_number(), 0);
        assert!(!engine.execute("undo", &[]).0);
    }

    #[test]
    fn test_play_rejects_bad_actions() {
        let mut engine = engine();
        assert!(!engine.execute("play", &[]).0);
        assert!(!engine.execute("play", &["e5"]).0);
        assert!(!engine.execute("play", &["99999"]).0);
        assert_eq!(engine.state().move_number(), 0);
    }

    #[test]
    fn test_limits() {
        let mut engine = engine();
        assert!(engine.execute("time_limit", &["2.5"]).0);
        assert_eq!(engine.bot.config().time_limit, Duration::from_millis(2500));
        assert!(!engine.execute("time_limit", &["-1"]).0);
        assert!(engine.execute("depth_limit", &["3"]).0);
        assert_eq!(engine.bot.config().depth_limit, 3);
        assert!(!engine.execute("depth_limit", &["0"]).0);
    }

    #[test]
    fn test_run_with_ids_and_quit() {
        let mut engine = engine();
        let input = "1 name\n# comment\n\n2 score\n3 bogus\nquit\nname\n";
        let mut output = Vec::new();
        engine.run_with(input.as_bytes(), &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert_eq!(
            text,
            "=1 blokus-rust\n\n=2 0 0\n\n?3 unknown command: bogus\n\n= \n\n"
        );
    }

    #[test]
    fn test_genmove_plays_legal_action() {
        let mut engine = engine();
        let legal = engine.state().legal_actions();
        let (success, reply) = engine.execute("genmove", &[]);
        assert!(success);
        let action: Action = reply.parse().unwrap();
        assert!(legal.contains(&action));
        assert_eq!(engine.state().move_number(), 1);
    }
}
