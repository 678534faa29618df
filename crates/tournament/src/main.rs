//! Tournament CLI
//!
//! Play round-robin tournaments between UCI engines described in a TOML file.

use anyhow::{anyhow, Context, Result};
use arena_core::init_directives;
use arena_runner::{probe_options, ProcessLauncher, Scheduler, SessionSettings};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tournament::{
    json_report, options_table, read_tournament_config, schedule_listing, tournament_report,
    ConsoleObserver, Overrides,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "tournament")]
#[command(version, about = "Round-robin tournaments between UCI chess engines", long_about = None)]
struct Cli {
    /// Debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a double round-robin
    Run {
        /// Tournament configuration file
        config: PathBuf,

        #[command(flatten)]
        selection: Selection,

        /// Games played at the same time
        #[arg(long)]
        concurrency: Option<usize>,

        /// Print the games as PGN
        #[arg(long)]
        pgn: bool,

        /// Print standings and game outcomes as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the options an engine declares
    Options {
        config: PathBuf,
        /// Engine name from the configuration
        engine: String,
    },
    /// Print the fixture list without playing
    Schedule {
        config: PathBuf,

        #[command(flatten)]
        selection: Selection,
    },
}

#[derive(Args, Debug)]
struct Selection {
    /// Comma separated engine names, in pairing order
    #[arg(long, value_delimiter = ',')]
    engines: Vec<String>,

    /// Number of double round-robin cycles
    #[arg(long)]
    rounds: Option<u32>,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter);
    tracing_subscriber::registry().with(layer).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            config,
            selection,
            concurrency,
            pgn,
            json,
        } => {
            let overrides = Overrides {
                engines: selection.engines,
                rounds: selection.rounds,
                concurrency,
            };
            run(config, overrides, pgn, json).await
        }
        Commands::Options { config, engine } => options(config, &engine).await,
        Commands::Schedule { config, selection } => {
            let overrides = Overrides {
                engines: selection.engines,
                rounds: selection.rounds,
                concurrency: None,
            };
            schedule(config, overrides)
        }
    }
}

async fn run(path: PathBuf, overrides: Overrides, pgn: bool, json: bool) -> Result<()> {
    let mut config = read_tournament_config(&path)?;
    overrides.apply(&mut config)?;

    info!(
        engines = config.engines.len(),
        rounds = config.rounds,
        time_control = %config.time_control,
        "loaded {}",
        path.display()
    );

    let scheduler = Scheduler::with_processes(config)?.observer(Arc::new(ConsoleObserver::new()));

    let cancel = scheduler.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, stopping after the running games");
            cancel.cancel();
        }
    });

    let report = scheduler.run().await;

    println!();
    println!("{}", tournament_report(&report));
    if pgn {
        println!("{}", report.pgn);
    }
    if json {
        println!("{}", json_report(&report).context("could not serialize the report")?);
    }
    Ok(())
}

async fn options(path: PathBuf, engine: &str) -> Result<()> {
    let config = read_tournament_config(&path)?;
    let descriptor = config
        .engine(engine)
        .ok_or_else(|| anyhow!("no engine named '{}' in {}", engine, path.display()))?;

    config.protocol.validate()?;
    let settings = SessionSettings::new(config.protocol, false);
    let options = probe_options(&ProcessLauncher, descriptor, settings)
        .await
        .with_context(|| format!("could not query options of '{}'", engine))?;

    println!("{}", options_table(engine, &options));
    let directives = init_directives(&options);
    if !directives.is_empty() {
        println!("Defaults as init directives:");
        for directive in directives {
            println!("  {}", directive);
        }
    }
    Ok(())
}

fn schedule(path: PathBuf, overrides: Overrides) -> Result<()> {
    let mut config = read_tournament_config(&path)?;
    overrides.apply(&mut config)?;
    let fixtures = arena_runner::double_round_robin(&config.engines, config.rounds);
    print!("{}", schedule_listing(&fixtures));
    Ok(())
}
