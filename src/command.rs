//! Command table and line parser
//!
//! A line whose first whitespace-separated token starts with `!` and
//! matches an entry of `COMMANDS` (case-sensitive) is a command. Any
//! other line, including an unrecognized `!token`, is a plain message.

/// Command prefix character
pub const COMMAND_PREFIX: char = '!';

/// Maximum length in bytes of the command token and of its argument.
/// Longer tokens are truncated, not rejected.
pub const MAX_TOKEN_LENGTH: usize = 100;

/// A recognized command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Welcome,
    Nick,
    Room,
    List,
    Help,
}

/// The command table, in dispatch and help order
pub const COMMANDS: [CommandKind; 5] = [
    CommandKind::Welcome,
    CommandKind::Nick,
    CommandKind::Room,
    CommandKind::List,
    CommandKind::Help,
];

impl CommandKind {
    /// Token that selects this command
    pub fn token(self) -> &'static str {
        match self {
            CommandKind::Welcome => "!welcome",
            CommandKind::Nick => "!nick",
            CommandKind::Room => "!room",
            CommandKind::List => "!list",
            CommandKind::Help => "!help",
        }
    }

    /// Name of the required argument, if the command takes one
    pub fn argument(self) -> Option<&'static str> {
        match self {
            CommandKind::Nick => Some("newnick"),
            CommandKind::Room => Some("roomname"),
            _ => None,
        }
    }

    /// One help line describing the syntax
    pub fn help(self) -> String {
        let syntax = match self.argument() {
            Some(arg) => format!("{} {}", self.token(), arg),
            None => self.token().to_string(),
        };
        let description = match self {
            CommandKind::Welcome => "prints server's welcome message.",
            CommandKind::Nick => "sets 'newnick' as your nickname.",
            CommandKind::Room => "moves you to room 'roomname'.",
            CommandKind::List => "prints available rooms and their occupancy.",
            CommandKind::Help => "prints list of available commands and their syntax.",
        };
        format!("'{syntax}' - {description}")
    }

    /// Look up a token in the command table
    pub fn from_token(token: &str) -> Option<Self> {
        COMMANDS.into_iter().find(|cmd| cmd.token() == token)
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// Result of parsing one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Nothing but whitespace
    Empty,
    /// A recognized command with its optional (truncated) argument.
    /// Anything after the argument is ignored.
    Command {
        kind: CommandKind,
        arg: Option<String>,
    },
    /// Anything else, to be broadcast verbatim
    Message(String),
}

/// Parse a line into a command or a plain message
pub fn parse_line(line: &str) -> Input {
    let mut tokens = line.split_whitespace();
    let Some(first) = tokens.next() else {
        return Input::Empty;
    };

    if first.starts_with(COMMAND_PREFIX) {
        if let Some(kind) = CommandKind::from_token(truncate(first, MAX_TOKEN_LENGTH)) {
            let arg = tokens
                .next()
                .map(|arg| truncate(arg, MAX_TOKEN_LENGTH).to_string());
            return Input::Command { kind, arg };
        }
    }

    Input::Message(line.to_string())
}

/// Cut `s` to at most `max` bytes on a char boundary
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
