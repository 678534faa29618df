//! Engine descriptors and the options an engine declares.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::protocol::Command;

/// Everything needed to launch one engine. Read-only once a session starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineDescriptor {
    /// Unique key within a tournament
    pub name: String,
    /// Executable to launch
    pub command: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
    /// Directory the process starts in (None = inherit)
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    /// Raw directives sent, in order, before the first game starts
    #[serde(default, rename = "init")]
    pub init_directives: Vec<String>,
}

impl EngineDescriptor {
    pub fn new(name: impl Into<String>, command: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: Vec::new(),
            working_dir: None,
            init_directives: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Append a `setoption` directive for this engine.
    pub fn with_option(mut self, name: &str, value: &str) -> Self {
        self.init_directives.push(
            Command::SetOption {
                name: name.to_string(),
                value: value.to_string(),
            }
            .to_string(),
        );
        self
    }
}

/// UCI option type token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionKind {
    /// `check`: boolean
    Check,
    /// `spin`: integer within bounds
    Spin,
    /// `combo`: one of the declared `var` values
    Combo,
    Button,
    String,
    /// Anything else an engine invents, kept verbatim
    Other(String),
}

impl OptionKind {
    pub fn from_token(token: &str) -> Self {
        match token {
            "check" => OptionKind::Check,
            "spin" => OptionKind::Spin,
            "combo" => OptionKind::Combo,
            "button" => OptionKind::Button,
            "string" => OptionKind::String,
            other => OptionKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            OptionKind::Check => "check",
            OptionKind::Spin => "spin",
            OptionKind::Combo => "combo",
            OptionKind::Button => "button",
            OptionKind::String => "string",
            OptionKind::Other(token) => token,
        };
        f.write_str(token)
    }
}

/// An option declared by an engine during option discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOption {
    pub name: String,
    pub kind: OptionKind,
    pub default: Option<String>,
    pub min: Option<i64>,
    pub max: Option<i64>,
    /// Choices of a combo option, in declaration order
    pub choices: Vec<String>,
    /// Value to apply; starts out as the default
    pub value: String,
}

impl EngineOption {
    /// `min/max` column text, empty unless both bounds are known.
    pub fn bounds_label(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("{}/{}", min, max),
            _ => String::new(),
        }
    }
}

/// Render a `setoption` directive for every option carrying a value.
///
/// Buttons have no value and are skipped along with blank entries.
pub fn init_directives(options: &[EngineOption]) -> Vec<String> {
    options
        .iter()
        .filter(|opt| opt.kind != OptionKind::Button)
        .filter(|opt| !opt.value.trim().is_empty())
        .map(|opt| {
            Command::SetOption {
                name: opt.name.clone(),
                value: opt.value.trim().to_string(),
            }
            .to_string()
        })
        .collect()
}

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod descriptor_tests;
