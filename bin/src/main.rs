//! CLI for the volsynth volatility engine.
//!
//! Rewrites the 7-day and 30-day change figures of every asset class
//! dataset and stamps the consolidated dataset, or inspects the parameter
//! table.

use clap::{Parser, Subcommand};
use rand::{SeedableRng, rngs::StdRng};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use volsynth::{
    AssetClass, ClassOutcome, GaussianTable, Horizon, InMemoryHistory, NoHistory, Orchestrator,
    PriceHistoryProvider, ProfileTable, SimulatedHistory, VolatilityModel, VolsynthConfig,
};

#[derive(Parser)]
#[command(name = "volsynth")]
#[command(about = "Synthesize 7d/30d volatility figures for asset datasets", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the dataset files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Seed for reproducible output
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// JSON snapshot of closing prices per symbol
    #[arg(long, global = true, conflicts_with = "simulate_history")]
    history: Option<PathBuf>,

    /// Estimate from simulated random-walk price history
    #[arg(long, global = true)]
    simulate_history: bool,

    /// Change model: synthetic or gaussian
    #[arg(long, global = true)]
    model: Option<VolatilityModel>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Update every asset class and the consolidated dataset (default)
    Run,
    /// Update a single asset class
    Class {
        /// stocks, cryptocurrencies, commodities or indices
        class: AssetClass,
    },
    /// Print the parameter table of the selected model
    Profiles,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match execute(cli) {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "volsynth failed");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn execute(cli: Cli) -> volsynth::Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => VolsynthConfig::load(path)?,
        None => VolsynthConfig::default(),
    };
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if cli.history.is_some() {
        config.history_file = cli.history;
    }
    if let Some(model) = cli.model {
        config.model = model;
    }

    let table = config.profile_table()?;
    let command = cli.command.unwrap_or(Commands::Run);
    if let Commands::Profiles = command {
        match config.model {
            VolatilityModel::Synthetic => print_profiles(&table),
            VolatilityModel::Gaussian => print_gaussian_table(GaussianTable::builtin()),
        }
        return Ok(ExitCode::SUCCESS);
    }

    let history: Box<dyn PriceHistoryProvider> = match (&config.history_file, cli.simulate_history) {
        (Some(path), _) => Box::new(InMemoryHistory::load(path)?),
        (None, true) => Box::new(SimulatedHistory::new(config.seed.unwrap_or_default())),
        (None, false) => Box::new(NoHistory),
    };
    let mut rng = config
        .seed
        .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
    let orchestrator = Orchestrator::new(&config, &table, history.as_ref());

    match command {
        Commands::Class { class } => {
            let outcome = orchestrator.class_outcome(class, &mut rng);
            println!("{class}: {outcome}");
            Ok(exit_code(matches!(outcome, ClassOutcome::Updated(_))))
        }
        Commands::Run | Commands::Profiles => {
            let report = orchestrator.run(&mut rng);
            for (class, outcome) in &report.classes {
                println!("{class}: {outcome}");
            }
            println!("consolidated: {}", report.consolidated);
            info!(updated = report.updated_classes(), "volatility run finished");
            Ok(exit_code(report.updated_classes() > 0))
        }
    }
}

const fn exit_code(success: bool) -> ExitCode {
    if success { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

/// Print every category's parameters, default first.
fn print_profiles(table: &ProfileTable) {
    let default = table.default_profile();
    println!("{:<20} {:>8} {:>8} {:>8}", "category", "7d", "30d", "jitter");
    println!(
        "{:<20} {:>8.3} {:>8.3} {:>8.2}",
        "(default)", default.base_volatility_7d, default.base_volatility_30d, default.random_factor
    );
    for (category, profile) in table.entries() {
        println!(
            "{:<20} {:>8.3} {:>8.3} {:>8.2}",
            category, profile.base_volatility_7d, profile.base_volatility_30d, profile.random_factor
        );
    }
}

fn print_gaussian_table(table: &GaussianTable) {
    println!("{:<18} {:<20} {:>8} {:>8}", "class", "category", "σ 7d", "σ 30d");
    for class in AssetClass::ALL {
        for category in table.categories(class) {
            // Ignores the major-symbol restriction on stocks
            let Some(profile) = table.profile(class, category) else {
                continue;
            };
            println!(
                "{:<18} {:<20} {:>8.2} {:>8.2}",
                class,
                category,
                profile.sigma(Horizon::SevenDay),
                profile.sigma(Horizon::ThirtyDay)
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_class_command() {
        let cli = Cli::try_parse_from(["volsynth", "class", "crypto", "--seed", "5"]).unwrap();
        assert_eq!(cli.seed, Some(5));
        assert!(matches!(
            cli.command,
            Some(Commands::Class {
                class: AssetClass::Cryptocurrencies
            })
        ));
    }

    #[test]
    fn test_default_command_is_run() {
        let cli = Cli::try_parse_from(["volsynth", "--data-dir", "/tmp/data"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/data")));
    }

    #[test]
    fn test_history_sources_conflict() {
        assert!(Cli::try_parse_from(["volsynth", "--history", "h.json", "--simulate-history"]).is_err());
    }

    #[test]
    fn test_model_flag() {
        let cli = Cli::try_parse_from(["volsynth", "run", "--model", "gaussian"]).unwrap();
        assert_eq!(cli.model, Some(VolatilityModel::Gaussian));
        assert!(matches!(cli.command, Some(Commands::Run)));

        let cli = Cli::try_parse_from(["volsynth", "profiles"]).unwrap();
        assert_eq!(cli.model, None);
        assert!(Cli::try_parse_from(["volsynth", "--model", "garch"]).is_err());
    }

    #[test]
    fn test_unknown_class_rejected() {
        assert!(Cli::try_parse_from(["volsynth", "class", "bonds"]).is_err());
    }
}
