//! UCI wire grammar: outbound commands and inbound line parsing.
//!
//! The parsers are stateless and work one line at a time. Callers accumulate
//! lines themselves and decide when a response is complete.

use cozy_chess::Color;
use std::fmt;

use crate::descriptor::{EngineOption, OptionKind};

/// Sent by the engine once it has listed its id and options
pub const UCI_OK: &str = "uciok";
/// Answer to `isready`
pub const READY_OK: &str = "readyok";
/// Marks the end of a search
pub const BEST_MOVE: &str = "bestmove";

/// Commands the arena sends to an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Uci,
    IsReady,
    NewGame,
    SetOption { name: String, value: String },
    Position { fen: String },
    Go(GoLimit),
    Quit,
}

/// Search limit carried by a `go` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoLimit {
    /// Fixed time for this move
    MoveTime(u64),
    /// Remaining clock time and increment of the side to move
    Clock {
        side: Color,
        remaining_ms: u64,
        increment_ms: u64,
    },
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Uci => f.write_str("uci"),
            Command::IsReady => f.write_str("isready"),
            Command::NewGame => f.write_str("ucinewgame"),
            Command::SetOption { name, value } => {
                write!(f, "setoption name {} value {}", name, value)
            }
            Command::Position { fen } => write!(f, "position fen {}", fen),
            Command::Go(GoLimit::MoveTime(ms)) => write!(f, "go movetime {}", ms),
            Command::Go(GoLimit::Clock {
                side: Color::White,
                remaining_ms,
                increment_ms,
            }) => write!(f, "go wtime {} winc {}", remaining_ms, increment_ms),
            Command::Go(GoLimit::Clock {
                side: Color::Black,
                remaining_ms,
                increment_ms,
            }) => write!(f, "go btime {} binc {}", remaining_ms, increment_ms),
            Command::Quit => f.write_str("quit"),
        }
    }
}

/// True if the line is exactly the given handshake token.
pub fn is_token(line: &str, token: &str) -> bool {
    line.trim() == token
}

/// Extract the move following a `bestmove` token, if the line carries one.
pub fn parse_bestmove(line: &str) -> Option<&str> {
    line.split_whitespace()
        .skip_while(|&token| token != BEST_MOVE)
        .nth(1)
}

// =============================================================================
// Option declarations
// =============================================================================

/// Parse an `option name <N> type <T> [default <D>] [min <m>] [max <M>] [var <v>]*` line.
///
/// The name may contain spaces; it runs up to the first `type` token. Every
/// other field is present only if its keyword is followed by a value token.
pub fn parse_option_line(line: &str) -> Option<EngineOption> {
    let mut tokens = line.split_whitespace();
    if tokens.next()? != "option" {
        return None;
    }
    let tokens: Vec<&str> = tokens.collect();

    let name_at = tokens.iter().position(|&t| t == "name")?;
    let type_at = name_at + 1 + tokens[name_at + 1..].iter().position(|&t| t == "type")?;
    if type_at == name_at + 1 {
        return None;
    }
    let name = tokens[name_at + 1..type_at].join(" ");
    let kind = OptionKind::from_token(tokens.get(type_at + 1)?);

    let mut default = None;
    let mut min = None;
    let mut max = None;
    let mut choices = Vec::new();

    let rest = &tokens[type_at + 2..];
    let mut i = 0;
    while i < rest.len() {
        let value = rest.get(i + 1).copied();
        match (rest[i], value) {
            ("default", Some(v)) => {
                default.get_or_insert_with(|| v.to_string());
                i += 2;
            }
            ("min", Some(v)) => {
                min = min.or_else(|| v.parse().ok());
                i += 2;
            }
            ("max", Some(v)) => {
                max = max.or_else(|| v.parse().ok());
                i += 2;
            }
            ("var", Some(v)) => {
                choices.push(v.to_string());
                i += 2;
            }
            _ => i += 1,
        }
    }

    let value = default.clone().unwrap_or_default();
    Some(EngineOption {
        name,
        kind,
        default,
        min,
        max,
        choices,
        value,
    })
}

/// Add an option unless one with the same name was already declared.
pub fn add_option(options: &mut Vec<EngineOption>, option: EngineOption) -> bool {
    if options.iter().any(|o| o.name == option.name) {
        return false;
    }
    options.push(option);
    true
}

/// Collect the options declared in a batch of engine output, first name wins.
pub fn collect_options<'a, I>(lines: I) -> Vec<EngineOption>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut options = Vec::new();
    for option in lines.into_iter().filter_map(parse_option_line) {
        add_option(&mut options, option);
    }
    options
}

// =============================================================================
// Search progress
// =============================================================================

/// Engine evaluation from the side to move's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    Centipawns(i32),
    /// Moves to mate, negative when being mated
    Mate(i32),
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Centipawns(cp) => write!(f, "{} cp", cp),
            Score::Mate(moves) => write!(f, "{} mate", moves),
        }
    }
}

/// Progress snapshot of one search. Every field is optional because engines
/// report whatever subset they like.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchInfo {
    pub depth: Option<u32>,
    pub seldepth: Option<u32>,
    pub multipv: Option<u32>,
    pub score: Option<Score>,
    pub nodes: Option<u64>,
    pub nps: Option<u64>,
    pub tbhits: Option<u64>,
    pub time_ms: Option<u64>,
}

impl SearchInfo {
    /// Overwrite fields with the ones present in `newer`.
    pub fn merge(&mut self, newer: &SearchInfo) {
        self.depth = newer.depth.or(self.depth);
        self.seldepth = newer.seldepth.or(self.seldepth);
        self.multipv = newer.multipv.or(self.multipv);
        self.score = newer.score.or(self.score);
        self.nodes = newer.nodes.or(self.nodes);
        self.nps = newer.nps.or(self.nps);
        self.tbhits = newer.tbhits.or(self.tbhits);
        self.time_ms = newer.time_ms.or(self.time_ms);
    }

    /// Fold every `info` line of a search into one snapshot.
    pub fn from_lines<'a, I>(lines: I) -> SearchInfo
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut info = SearchInfo::default();
        for parsed in lines.into_iter().filter_map(parse_info_line) {
            info.merge(&parsed);
        }
        info
    }

    pub fn is_empty(&self) -> bool {
        *self == SearchInfo::default()
    }

    /// `Depth: 12 | Score: 31 cp | Time: 40ms`, present fields only.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(v) = self.depth {
            parts.push(format!("Depth: {}", v));
        }
        if let Some(v) = self.seldepth {
            parts.push(format!("Seldepth: {}", v));
        }
        if let Some(v) = self.multipv {
            parts.push(format!("MultiPV: {}", v));
        }
        if let Some(v) = self.score {
            parts.push(format!("Score: {}", v));
        }
        if let Some(v) = self.nodes {
            parts.push(format!("Nodes: {}", v));
        }
        if let Some(v) = self.nps {
            parts.push(format!("NPS: {}", v));
        }
        if let Some(v) = self.tbhits {
            parts.push(format!("TBHits: {}", v));
        }
        if let Some(v) = self.time_ms {
            parts.push(format!("Time: {}ms", v));
        }
        parts.join(" | ")
    }
}

/// Parse one `info ...` line. Returns None for any other line.
pub fn parse_info_line(line: &str) -> Option<SearchInfo> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.first() != Some(&"info") {
        return None;
    }

    let mut info = SearchInfo::default();
    let mut i = 1;
    while i < tokens.len() {
        let next = tokens.get(i + 1).copied();
        match (tokens[i], next) {
            // The rest of the line is free text
            ("string", _) => break,
            ("depth", Some(v)) => i += parsed(v, &mut info.depth),
            ("seldepth", Some(v)) => i += parsed(v, &mut info.seldepth),
            ("multipv", Some(v)) => i += parsed(v, &mut info.multipv),
            ("nodes", Some(v)) => i += parsed(v, &mut info.nodes),
            ("nps", Some(v)) => i += parsed(v, &mut info.nps),
            ("tbhits", Some(v)) => i += parsed(v, &mut info.tbhits),
            ("time", Some(v)) => i += parsed(v, &mut info.time_ms),
            ("score", Some(kind)) => {
                let value = tokens.get(i + 2).and_then(|v| v.parse::<i32>().ok());
                match (kind, value) {
                    ("cp", Some(v)) => {
                        info.score = Some(Score::Centipawns(v));
                        i += 3;
                    }
                    ("mate", Some(v)) => {
                        info.score = Some(Score::Mate(v));
                        i += 3;
                    }
                    _ => i += 1,
                }
            }
            _ => i += 1,
        }
    }
    Some(info)
}

/// Store a parsed value and report how many tokens were consumed.
fn parsed<T: std::str::FromStr>(text: &str, slot: &mut Option<T>) -> usize {
    match text.parse() {
        Ok(v) => {
            *slot = Some(v);
            2
        }
        Err(_) => 1,
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod protocol_tests;
