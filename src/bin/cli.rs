use std::path::{Path, PathBuf};
use std::process;

use clap::builder::BoolishValueParser;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use swaggerguard::config::{Config, DEFAULT_CONFIG_FILE};
use swaggerguard::document::path_guard::ALLOW_UNSAFE_PATHS_ENV;
use swaggerguard::error::GuardError;
use swaggerguard::metrics::{CounterStore, MemoryStore, RedisStore};
use swaggerguard::output::OutputFormat;
use swaggerguard::rules::{RuleEngine, SeverityCatalogue};
use swaggerguard::{RunOptions, RunOutcome};

#[derive(Parser)]
#[command(
    name = "swagger-guard",
    about = "Security linter for OpenAPI/Swagger documents",
    version,
    author
)]
struct Cli {
    /// Disable coloured output
    #[arg(long, global = true)]
    no_color: bool,

    /// Config file path
    #[arg(long, short = 'c', global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan an OpenAPI/Swagger document for security issues
    Scan {
        /// Path to the OpenAPI spec file (.yaml or .json)
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,

        /// Output format (cli, json, markdown, sarif)
        #[arg(long, short = 'o', default_value = "cli")]
        output: String,

        /// Also write a markdown report to this file
        #[arg(long)]
        output_file: Option<PathBuf>,

        /// Show accumulated metrics instead of scanning
        #[arg(long)]
        metrics: bool,

        /// Accept absolute paths and `..` in --file
        #[arg(long, env = ALLOW_UNSAFE_PATHS_ENV, value_parser = BoolishValueParser::new())]
        allow_unsafe_paths: bool,
    },

    /// Show accumulated metrics from the counter store
    Metrics,

    /// List all available detection rules
    ListRules {
        /// Output format (table, json)
        #[arg(long, short = 'f', default_value = "table")]
        format: String,
    },

    /// Generate a starter .swagger-guard.toml config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    let ansi = use_ansi(cli.no_color, std::env::var_os("NO_COLOR").is_some());
    init_tracing(ansi);

    if !ansi {
        colored::control::set_override(false);
    }

    let result = match cli.command {
        Commands::Scan {
            file,
            output,
            output_file,
            metrics,
            allow_unsafe_paths,
        } => cmd_scan(
            &cli.config,
            file,
            output,
            output_file,
            metrics,
            allow_unsafe_paths,
        ),
        Commands::Metrics => cmd_scan(&cli.config, None, "cli".into(), None, true, false),
        Commands::ListRules { format } => cmd_list_rules(format),
        Commands::Init { force } => cmd_init(force),
    };

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

/// Colour is off when `--no-color` is passed or `NO_COLOR` is set.
fn use_ansi(no_color_flag: bool, no_color_env: bool) -> bool {
    !no_color_flag && !no_color_env
}

/// Logs go to stderr so stdout carries only the report.
fn init_tracing(ansi: bool) {
    let filter = EnvFilter::try_from_env("SWAGGER_GUARD_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(ansi)
        .init();
}

fn cmd_scan(
    config_path: &Path,
    file: Option<PathBuf>,
    format_str: String,
    output_file: Option<PathBuf>,
    metrics_only: bool,
    allow_unsafe_paths: bool,
) -> Result<i32, GuardError> {
    let format = OutputFormat::from_str_lenient(&format_str).unwrap_or_else(|| {
        eprintln!("Warning: unknown format '{}', using cli", format_str);
        OutputFormat::Cli
    });

    let mut config = Config::load(config_path)?;
    config
        .metrics
        .apply_env(std::env::var("REDIS_HOST").ok(), std::env::var("REDIS_PORT").ok());

    let options = RunOptions {
        input: file,
        format,
        output_file,
        metrics_only,
        allow_unsafe_paths,
        record_metrics: config.metrics.enabled,
    };

    let store = open_store(&config);
    let outcome = swaggerguard::run(&options, store.as_ref());
    Ok(emit(outcome))
}

fn open_store(config: &Config) -> Box<dyn CounterStore> {
    if !config.metrics.enabled {
        return Box::new(MemoryStore::new());
    }
    let metrics = &config.metrics;
    let url = RedisStore::url(&metrics.host, metrics.port, metrics.db);
    match RedisStore::open(&url, metrics.connect_timeout()) {
        Ok(store) => Box::new(store),
        Err(e) => {
            tracing::warn!(error = %e, "metrics store unavailable, using in-memory counters");
            Box::new(MemoryStore::new())
        }
    }
}

fn emit(outcome: RunOutcome) -> i32 {
    if outcome.state.is_failed() {
        eprint!("{}", outcome.output);
    } else {
        print!("{}", outcome.output);
    }
    outcome.exit_code
}

fn cmd_list_rules(format_str: String) -> Result<i32, GuardError> {
    let engine = RuleEngine::new();
    let catalogue = SeverityCatalogue::builtin();
    let rules = engine.list_rules();

    match format_str.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&rules)?;
            println!("{}", json);
        }
        _ => {
            println!(
                "{:<10} {:<24} {:<10} {:<8} NAME",
                "ID", "CATEGORY", "SEVERITY", "CWE"
            );
            println!("{}", "-".repeat(80));
            for rule in &rules {
                println!(
                    "{:<10} {:<24} {:<10} {:<8} {}",
                    rule.id,
                    rule.category.tag(),
                    catalogue.severity_of(rule.category)?.to_string(),
                    rule.cwe_id.as_deref().unwrap_or("-"),
                    rule.name,
                );
            }
        }
    }

    Ok(0)
}

fn cmd_init(force: bool) -> Result<i32, GuardError> {
    let path = PathBuf::from(DEFAULT_CONFIG_FILE);

    if path.exists() && !force {
        eprintln!("{} already exists. Use --force to overwrite.", DEFAULT_CONFIG_FILE);
        return Ok(1);
    }

    std::fs::write(&path, Config::starter_toml())?;
    println!("Created {}", DEFAULT_CONFIG_FILE);

    Ok(0)
}
