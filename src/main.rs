//! modulizer CLI - Bottom-up module formation engine
//!
//! Runs scripted requests against an in-memory registry, or serves the
//! request surface over HTTP.
//!
//! Usage:
//!   modulizer run [OPTIONS] <SCRIPT>
//!   modulizer serve [OPTIONS]
//!   modulizer info

use std::fs;
use std::io::{self, BufWriter, Read, Write, stdout};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use modulizer::{
    FormationCriteria, ModulizerConfig, Registry, ScriptRunner, SharedRegistry, generate_summary,
    load_config, parse_script, skill_info,
    web::{ServerConfig, start_server},
};

/// modulizer - Encapsulate mature, related components into modules
#[derive(Parser, Debug)]
#[command(name = "modulizer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute a script of JSON requests against a fresh registry
    Run {
        /// JSON array or JSON-lines file of requests ('-' for stdin)
        script: PathBuf,

        /// Pretty-print each response
        #[arg(long)]
        pretty: bool,

        /// Print a text summary of the final registry instead of responses
        #[arg(short, long)]
        summary: bool,
    },

    /// Serve the request surface over HTTP
    Serve {
        /// Port for the HTTP server
        #[arg(long, default_value = "3000")]
        port: u16,

        /// Bind on all interfaces
        #[arg(long)]
        public: bool,
    },

    /// Print skill information as JSON
    Info,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Config file or directory to search (default: search for .modulizer.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    // === Formation criteria ===
    /// Minimum average cohesion of a module
    #[arg(long, global = true)]
    cohesion_threshold: Option<f64>,

    /// Minimum maturity score of a candidate and a module
    #[arg(long, global = true)]
    maturity_threshold: Option<f64>,

    /// Minimum connectivity to the seed for joining a cluster
    #[arg(long, global = true)]
    connectivity_threshold: Option<f64>,

    /// Minimum members per module
    #[arg(long, global = true)]
    min_members: Option<usize>,

    /// Maximum members per module
    #[arg(long, global = true)]
    max_members: Option<usize>,

    /// Let components already in a module be grouped again
    #[arg(long, global = true)]
    allow_regrouping: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let registry = build_registry(&cli.global)?;

    match cli.command {
        Commands::Run {
            script,
            pretty,
            summary,
        } => run_script(registry, &script, pretty, summary),
        Commands::Serve { port, public } => {
            let server_config = ServerConfig { port, public };
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(SharedRegistry::new(registry), server_config))
                .map_err(|e| e as Box<dyn std::error::Error>)
        }
        Commands::Info => {
            println!("{}", serde_json::to_string_pretty(&skill_info())?);
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "modulizer=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

/// Build the registry - CLI args override config, which overrides defaults
fn build_registry(args: &GlobalArgs) -> Result<Registry, Box<dyn std::error::Error>> {
    let config_path = args.config.clone().unwrap_or_else(|| PathBuf::from("."));
    let config = match load_config(&config_path) {
        Ok(config) => config,
        Err(e) if args.config.is_none() => {
            if args.verbose {
                eprintln!("Note: No config file loaded: {}", e);
            }
            ModulizerConfig::default()
        }
        Err(e) => return Err(e.into()),
    };

    let defaults = config.criteria;
    let criteria = FormationCriteria {
        cohesion_threshold: args
            .cohesion_threshold
            .unwrap_or(defaults.cohesion_threshold),
        maturity_threshold: args
            .maturity_threshold
            .unwrap_or(defaults.maturity_threshold),
        connectivity_threshold: args
            .connectivity_threshold
            .unwrap_or(defaults.connectivity_threshold),
        min_members: args.min_members.unwrap_or(defaults.min_members),
        max_members: args.max_members.unwrap_or(defaults.max_members),
    };
    criteria.validate()?;

    let config = ModulizerConfig {
        criteria,
        formation: config.formation,
    };
    let mut registry = Registry::from_config(&config);
    if args.allow_regrouping {
        registry.set_allow_regrouping(true);
    }

    if args.verbose {
        eprintln!(
            "Criteria: cohesion={}, maturity={}, connectivity={}, members={}..={}, regrouping={}",
            criteria.cohesion_threshold,
            criteria.maturity_threshold,
            criteria.connectivity_threshold,
            criteria.min_members,
            criteria.max_members,
            registry.allow_regrouping()
        );
    }

    Ok(registry)
}

fn run_script(
    registry: Registry,
    script: &Path,
    pretty: bool,
    summary: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = if script == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(script)?
    };
    let requests = parse_script(&content)?;

    let start = Instant::now();
    let mut writer = BufWriter::new(stdout().lock());
    let mut runner = ScriptRunner::new(registry);

    for request in requests {
        let response = runner.execute(request);
        if summary {
            continue;
        }
        if pretty {
            serde_json::to_writer_pretty(&mut writer, &response)?;
        } else {
            serde_json::to_writer(&mut writer, &response)?;
        }
        writeln!(writer)?;
    }

    if summary {
        generate_summary(runner.registry(), &mut writer)?;
    }
    writer.flush()?;

    eprintln!(
        "Executed script: {} module(s) formed, {} failed request(s) (took {:.2?})",
        runner.registry().modules().len(),
        runner.failures(),
        start.elapsed()
    );

    Ok(())
}
