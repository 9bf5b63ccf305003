pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use atelier_core::config::{AppConfig, ConfigOverrides, LoadOptions, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "atelier",
    about = "Atelier pricing engine CLI",
    long_about = "Compose list prices, reconcile quote breakdowns, and split commission payouts from the command line.",
    after_help = "Examples:\n  atelier compose --cost 1000 --expense 200\n  atelier reconcile quote.json\n  atelier distribute promise.json\n  atelier config"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to an atelier.toml config file")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Log level override (trace|debug|info|warn|error)")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Compose a list price from a cost basis and the configured policy")]
    Compose {
        #[arg(long)]
        cost: Decimal,
        #[arg(long, default_value = "0")]
        expense: Decimal,
        #[arg(long, help = "Override the configured profit percentage")]
        profit_percent: Option<Decimal>,
        #[arg(long, help = "Override the configured commission percentage")]
        commission_percent: Option<Decimal>,
        #[arg(long, help = "Override the configured overprice percentage")]
        overprice_percent: Option<Decimal>,
    },
    #[command(about = "Reconcile a quote JSON file into a financial breakdown")]
    Reconcile {
        quote: PathBuf,
        #[arg(long, help = "Closing-price fallback, typically a composed final price")]
        fallback: Option<Decimal>,
        #[arg(
            long,
            help = "Report courtesy savings separately instead of folding them into discounts"
        )]
        separate_courtesy: bool,
        #[arg(long, help = "Apply an unlabeled legacy discount value through the migration shim")]
        legacy_discount: Option<Decimal>,
    },
    #[command(about = "Split the commission pool for a promise snapshot JSON file")]
    Distribute { promise: PathBuf },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        LogFormat::Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let load_options = LoadOptions {
        config_path: cli.config.clone(),
        require_file: cli.config.is_some(),
        overrides: ConfigOverrides {
            log_level: cli.log_level.clone(),
            ..ConfigOverrides::default()
        },
    };
    let config = match AppConfig::load(load_options) {
        Ok(config) => config,
        Err(error) => {
            let result = commands::CommandResult::failure(
                "atelier",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
            println!("{}", result.output);
            return ExitCode::from(result.exit_code);
        }
    };
    init_logging(&config);
    tracing::info!(
        event_name = "system.cli.config_loaded",
        settings_version = config.settings_version,
        "effective configuration loaded"
    );

    let result = match cli.command {
        Command::Compose { cost, expense, profit_percent, commission_percent, overprice_percent } => {
            commands::compose::run(
                &config,
                commands::compose::ComposeArgs {
                    cost,
                    expense,
                    profit_percent,
                    commission_percent,
                    overprice_percent,
                },
            )
        }
        Command::Reconcile { quote, fallback, separate_courtesy, legacy_discount } => {
            commands::reconcile::run(
                commands::reconcile::ReconcileArgs {
                    quote_path: quote,
                    fallback,
                    separate_courtesy,
                    legacy_discount,
                },
            )
        }
        Command::Distribute { promise } => commands::distribute::run(&config, &promise),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run(&config) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
