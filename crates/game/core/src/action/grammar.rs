//! Command surface grammar.
//!
//! ```text
//! move     {dir}{pas?}            pas defaults to 1
//! door     p{dir}
//! wall     m{dir}
//! kill     k{dir}
//! mine     b{dir}{power?}         power defaults to 1
//! grenade  g{dir}{range}-{power}
//! globals  h a q c r
//! ```
//!
//! Every letter comes from an injectable [`CommandAlphabet`]; the table above
//! shows the default one. Parsing is case-insensitive.

use super::command::{Action, ActionKind, Command, GlobalCommand};
use super::error::CommandError;
use crate::grid::{Direction, Impact};

/// Character table of the command grammar.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CommandAlphabet {
    pub north: char,
    pub south: char,
    pub west: char,
    pub east: char,
    pub door: char,
    pub wall: char,
    pub kill: char,
    pub mine: char,
    pub grenade: char,
    pub help: char,
    pub menu: char,
    pub quit: char,
    pub start: char,
    pub reset: char,
    /// Separator between grenade range and power.
    pub separator: char,
}

impl Default for CommandAlphabet {
    fn default() -> Self {
        Self {
            north: 'n',
            south: 's',
            west: 'o',
            east: 'e',
            door: 'p',
            wall: 'm',
            kill: 'k',
            mine: 'b',
            grenade: 'g',
            help: 'h',
            menu: 'a',
            quit: 'q',
            start: 'c',
            reset: 'r',
            separator: '-',
        }
    }
}

impl CommandAlphabet {
    pub fn direction_char(&self, direction: Direction) -> char {
        match direction {
            Direction::North => self.north,
            Direction::South => self.south,
            Direction::West => self.west,
            Direction::East => self.east,
        }
    }

    pub fn direction(&self, c: char) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|direction| self.direction_char(*direction) == c)
    }

    fn action_char(&self, kind: ActionKind) -> Option<char> {
        match kind {
            ActionKind::Move => None,
            ActionKind::CreateDoor => Some(self.door),
            ActionKind::CreateWall => Some(self.wall),
            ActionKind::Kill => Some(self.kill),
            ActionKind::Mine => Some(self.mine),
            ActionKind::Grenade => Some(self.grenade),
        }
    }

    fn action_kind(&self, c: char) -> Option<ActionKind> {
        [
            ActionKind::CreateDoor,
            ActionKind::CreateWall,
            ActionKind::Kill,
            ActionKind::Mine,
            ActionKind::Grenade,
        ]
        .into_iter()
        .find(|kind| self.action_char(*kind) == Some(c))
    }

    fn global_char(&self, global: GlobalCommand) -> char {
        match global {
            GlobalCommand::Help => self.help,
            GlobalCommand::Menu => self.menu,
            GlobalCommand::Quit => self.quit,
            GlobalCommand::Start => self.start,
            GlobalCommand::Reset => self.reset,
        }
    }

    fn global(&self, c: char) -> Option<GlobalCommand> {
        [
            GlobalCommand::Help,
            GlobalCommand::Menu,
            GlobalCommand::Quit,
            GlobalCommand::Start,
            GlobalCommand::Reset,
        ]
        .into_iter()
        .find(|global| self.global_char(*global) == c)
    }

    /// Returns true when no letter is bound twice.
    pub fn is_consistent(&self) -> bool {
        let mut letters = vec![
            self.north,
            self.south,
            self.west,
            self.east,
            self.door,
            self.wall,
            self.kill,
            self.mine,
            self.grenade,
            self.help,
            self.menu,
            self.quit,
            self.start,
            self.reset,
        ];
        let total = letters.len();
        letters.sort_unstable();
        letters.dedup();
        letters.len() == total && !self.separator.is_ascii_alphanumeric()
    }

    /// Parses a command string.
    pub fn parse(&self, input: &str) -> Result<Command, CommandError> {
        let lowered = input.trim().to_lowercase();
        let mut chars = lowered.chars();
        let first = chars
            .next()
            .ok_or_else(|| CommandError::parse(input, "empty command"))?;
        let rest = chars.as_str();

        if let Some(direction) = self.direction(first) {
            let distance = parse_number(input, rest, 1)?;
            if distance == 0 {
                return Err(CommandError::parse(input, "move distance must be positive"));
            }
            return Ok(Action::moves(direction, distance).into());
        }

        if let Some(kind) = self.action_kind(first) {
            let mut chars = rest.chars();
            let direction = chars
                .next()
                .and_then(|c| self.direction(c))
                .ok_or_else(|| CommandError::parse(input, "missing direction"))?;
            let tail = chars.as_str();
            let action = match kind {
                ActionKind::CreateDoor | ActionKind::CreateWall | ActionKind::Kill => {
                    if !tail.is_empty() {
                        return Err(CommandError::parse(input, "unexpected trailing characters"));
                    }
                    Action::new(kind, direction, 1, Impact::Point)
                }
                ActionKind::Mine => {
                    let power = parse_impact(input, tail, 1)?;
                    Action::mine(direction, power)
                }
                ActionKind::Grenade => {
                    let (range, power) = tail
                        .split_once(self.separator)
                        .ok_or_else(|| CommandError::parse(input, "missing range separator"))?;
                    if range.is_empty() || power.is_empty() {
                        return Err(CommandError::parse(input, "missing range or power"));
                    }
                    let range = parse_number(input, range, 1)?;
                    if range == 0 {
                        return Err(CommandError::parse(input, "grenade range must be positive"));
                    }
                    Action::grenade(direction, range, parse_impact(input, power, 1)?)
                }
                ActionKind::Move => {
                    return Err(CommandError::parse(input, "unknown command letter"));
                }
            };
            return Ok(action.into());
        }

        if let Some(global) = self.global(first) {
            if rest.is_empty() {
                return Ok(Command::Global(global));
            }
            return Err(CommandError::parse(input, "unexpected trailing characters"));
        }

        Err(CommandError::parse(input, "unknown command letter"))
    }

    /// Formats a command in canonical form. Moves always carry their distance.
    pub fn format(&self, command: &Command) -> String {
        match command {
            Command::Global(global) => self.global_char(*global).to_string(),
            Command::Action(action) => self.format_action(action),
        }
    }

    pub fn format_action(&self, action: &Action) -> String {
        let dir = self.direction_char(action.direction);
        match action.kind {
            ActionKind::Move => format!("{dir}{}", action.distance),
            ActionKind::CreateDoor => format!("{}{dir}", self.door),
            ActionKind::CreateWall => format!("{}{dir}", self.wall),
            ActionKind::Kill => format!("{}{dir}", self.kill),
            ActionKind::Mine => format!("{}{dir}{}", self.mine, action.power),
            ActionKind::Grenade => format!(
                "{}{dir}{}{}{}",
                self.grenade, action.distance, self.separator, action.power
            ),
        }
    }
}

fn parse_number(input: &str, digits: &str, default: u32) -> Result<u32, CommandError> {
    if digits.is_empty() {
        return Ok(default);
    }
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(CommandError::parse(input, "expected digits"));
    }
    digits
        .parse()
        .map_err(|_| CommandError::parse(input, "number out of range"))
}

fn parse_impact(input: &str, digits: &str, default: u32) -> Result<Impact, CommandError> {
    let value = parse_number(input, digits, default)?;
    Impact::from_value(value).ok_or_else(|| CommandError::parse(input, "unknown power"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_move_defaults_to_one() {
        let alphabet = CommandAlphabet::default();
        assert_eq!(
            alphabet.parse("e").unwrap(),
            Command::Action(Action::step(Direction::East))
        );
        assert_eq!(
            alphabet.parse("N3").unwrap(),
            Command::Action(Action::moves(Direction::North, 3))
        );
    }

    #[test]
    fn test_parse_grenade_and_mine() {
        let alphabet = CommandAlphabet::default();
        assert_eq!(
            alphabet.parse("ge2-5").unwrap(),
            Command::Action(Action::grenade(Direction::East, 2, Impact::SmallDiamond))
        );
        assert_eq!(
            alphabet.parse("bs").unwrap(),
            Command::Action(Action::mine(Direction::South, Impact::Point))
        );
        assert!(alphabet.parse("ge2-7").is_err());
        assert!(alphabet.parse("ge2").is_err());
        assert!(alphabet.parse("ge-5").is_err());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let alphabet = CommandAlphabet::default();
        for input in ["", "x", "kx", "pe1", "e0", "n1a", "hq"] {
            assert!(alphabet.parse(input).is_err(), "{input} should not parse");
        }
    }

    #[test]
    fn test_globals() {
        let alphabet = CommandAlphabet::default();
        assert_eq!(alphabet.parse("Q").unwrap(), Command::Global(GlobalCommand::Quit));
        assert_eq!(alphabet.format(&Command::Global(GlobalCommand::Reset)), "r");
    }

    #[test]
    fn test_remapped_alphabet() {
        let alphabet = CommandAlphabet {
            west: 'w',
            ..CommandAlphabet::default()
        };
        assert!(alphabet.is_consistent());
        let command = alphabet.parse("kw").unwrap();
        assert_eq!(command, Command::Action(Action::kill(Direction::West)));
        assert_eq!(alphabet.format(&command), "kw");
        assert!(alphabet.parse("ko").is_err());
    }

    #[test]
    fn test_format_reparse_is_stable() {
        let alphabet = CommandAlphabet::default();
        for input in ["e1", "s4", "pn", "mo", "ke", "bn9", "gs3-13"] {
            let command = alphabet.parse(input).unwrap();
            let text = alphabet.format(&command);
            assert_eq!(text, input);
            assert_eq!(alphabet.parse(&text).unwrap(), command);
        }
    }
}
