//! Text and JSON reports for the command line.

use arena_core::{EngineOption, EngineScore, GameRecord, Standings};
use arena_runner::{Fixture, TournamentReport};
use serde::Serialize;

/// Standings table, best engine first.
pub fn standings_table(standings: &Standings) -> String {
    let mut table = String::new();
    table.push_str(&format!(
        "{:<4} {:<20} {:>7} {:>4} {:>4} {:>4} {:>6} {:>6}\n",
        "#", "Engine", "Points", "W", "D", "L", "Abort", "Games"
    ));
    table.push_str(&"-".repeat(62));
    table.push('\n');

    for (rank, entry) in standings.ranked().into_iter().enumerate() {
        table.push_str(&format!(
            "{:<4} {:<20} {:>7.1} {:>4} {:>4} {:>4} {:>6} {:>6}\n",
            rank + 1,
            entry.name,
            entry.points,
            entry.wins,
            entry.draws,
            entry.losses,
            entry.aborts,
            entry.games()
        ));
    }
    table
}

/// Full end-of-run report: header, standings table and summary.
pub fn tournament_report(report: &TournamentReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "=== Tournament: {} games played of {} ===\n",
        report.games_played, report.games_scheduled
    ));
    if report.cancelled {
        out.push_str("Cancelled before all games were played.\n");
    }
    let elapsed = report.finished - report.started;
    out.push_str(&format!(
        "Started {}, took {}s\n\n",
        report.started.format("%Y-%m-%d %H:%M:%S"),
        elapsed.num_seconds()
    ));
    out.push_str(&standings_table(&report.standings));
    out.push('\n');
    out.push_str(&report.summary);
    out
}

/// Options an engine declared, one row each.
pub fn options_table(engine: &str, options: &[EngineOption]) -> String {
    let mut table = format!("Options of {} ({} declared)\n", engine, options.len());
    table.push_str(&format!(
        "{:<24} {:<8} {:<16} {:<14} {}\n",
        "Name", "Type", "Default", "Min/Max", "Choices"
    ));
    table.push_str(&"-".repeat(72));
    table.push('\n');

    for option in options {
        table.push_str(&format!(
            "{:<24} {:<8} {:<16} {:<14} {}\n",
            option.name,
            option.kind.to_string(),
            option.default.as_deref().unwrap_or(""),
            option.bounds_label(),
            option.choices.join(" ")
        ));
    }
    table
}

pub fn schedule_listing(fixtures: &[Fixture]) -> String {
    let mut out = String::new();
    for fixture in fixtures {
        out.push_str(&format!(
            "Round {} Game {}/{}: {} (White) vs. {} (Black)\n",
            fixture.round,
            fixture.index,
            fixtures.len(),
            fixture.white.name,
            fixture.black.name
        ));
    }
    out
}

#[derive(Debug, Serialize)]
struct GameSummary<'a> {
    round: u32,
    white: &'a str,
    black: &'a str,
    result: String,
    termination: String,
    plies: usize,
}

impl<'a> From<&'a GameRecord> for GameSummary<'a> {
    fn from(record: &'a GameRecord) -> Self {
        Self {
            round: record.round,
            white: &record.white,
            black: &record.black,
            result: record.result.pgn_tag().to_string(),
            termination: record.termination.to_string(),
            plies: record.moves.len(),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    standings: &'a [EngineScore],
    games: Vec<GameSummary<'a>>,
    cancelled: bool,
}

/// Standings and per-game outcomes as pretty JSON.
pub fn json_report(report: &TournamentReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        standings: report.standings.entries(),
        games: report.records.iter().map(GameSummary::from).collect(),
        cancelled: report.cancelled,
    })
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod report_tests;
