//! Tournament score table.

use serde::{Deserialize, Serialize};

use crate::record::GameResult;

/// Per-engine tally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineScore {
    pub name: String,
    /// 1 per win, 0.5 per draw
    pub points: f64,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub aborts: u32,
}

impl EngineScore {
    pub fn games(&self) -> u32 {
        self.wins + self.draws + self.losses + self.aborts
    }
}

/// Scores of every engine in a tournament, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Standings {
    entries: Vec<EngineScore>,
}

impl Standings {
    /// Start a table listing every participant with zero points.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut standings = Standings::default();
        for name in names {
            let name: String = name.into();
            standings.entry(&name);
        }
        standings
    }

    fn entry(&mut self, name: &str) -> &mut EngineScore {
        let index = match self.entries.iter().position(|e| e.name == name) {
            Some(i) => i,
            None => {
                self.entries.push(EngineScore {
                    name: name.to_string(),
                    ..Default::default()
                });
                self.entries.len() - 1
            }
        };
        &mut self.entries[index]
    }

    /// Fold one finished game into the table.
    pub fn record(&mut self, white: &str, black: &str, result: GameResult) {
        let (white_points, black_points) = result.points();
        for (name, points, won, lost) in [
            (white, white_points, GameResult::WhiteWins, GameResult::BlackWins),
            (black, black_points, GameResult::BlackWins, GameResult::WhiteWins),
        ] {
            let entry = self.entry(name);
            entry.points += points;
            match result {
                GameResult::Draw => entry.draws += 1,
                GameResult::Abort => entry.aborts += 1,
                r if r == won => entry.wins += 1,
                r if r == lost => entry.losses += 1,
                _ => {}
            }
        }
    }

    pub fn score(&self, name: &str) -> Option<f64> {
        self.entries.iter().find(|e| e.name == name).map(|e| e.points)
    }

    pub fn get(&self, name: &str) -> Option<&EngineScore> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Entries in selection order.
    pub fn entries(&self) -> &[EngineScore] {
        &self.entries
    }

    /// Entries sorted by points (highest first), ties by name.
    pub fn ranked(&self) -> Vec<&EngineScore> {
        let mut ranked: Vec<&EngineScore> = self.entries.iter().collect();
        ranked.sort_by(|a, b| b.points.total_cmp(&a.points).then_with(|| a.name.cmp(&b.name)));
        ranked
    }

    /// `Tournament finished. Results:` block with one line per engine.
    pub fn summary(&self) -> String {
        let mut out = String::from("Tournament finished. Results:\n");
        for entry in &self.entries {
            out.push_str(&format!("{}: {} points\n", entry.name, entry.points));
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.entries)
    }
}

#[cfg(test)]
#[path = "standings_tests.rs"]
mod standings_tests;
