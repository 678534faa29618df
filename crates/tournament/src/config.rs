//! Loading tournament configuration from TOML.

use anyhow::Context;
use arena_core::TournamentConfig;
use std::path::Path;

pub fn read_tournament_config(path: &Path) -> anyhow::Result<TournamentConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("could not read config file {}", path.display()))?;
    parse_tournament_config(&text).with_context(|| format!("invalid config file {}", path.display()))
}

pub fn parse_tournament_config(text: &str) -> anyhow::Result<TournamentConfig> {
    let config: TournamentConfig = toml::from_str(text)?;
    Ok(config)
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Engines to play, in this order. Empty keeps every configured engine.
    pub engines: Vec<String>,
    pub rounds: Option<u32>,
    pub concurrency: Option<usize>,
}

impl Overrides {
    /// Apply the overrides and validate the result.
    pub fn apply(&self, config: &mut TournamentConfig) -> anyhow::Result<()> {
        if !self.engines.is_empty() {
            config.select(&self.engines)?;
        }
        if let Some(rounds) = self.rounds {
            config.rounds = rounds;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        config.validate()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
