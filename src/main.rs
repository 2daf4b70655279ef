//! Dataprep - preprocessing for split/class image-classification datasets
//!
//! A CLI tool that reorganizes, downsizes, renames and consolidates the
//! class folders of a `train`/`validation`/`test` image dataset.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (missing dataset, failed step, bad arguments, etc.)

mod cli;
mod config;
mod dataset;
mod error;
mod pipeline;
mod report;
mod steps;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, Command};
use config::{Config, DEFAULT_CONFIG_FILE};
use dataset::Dataset;
use report::RunSummary;
use steps::{StepContext, StepReport};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if args.command == Command::InitConfig {
        return handle_init_config();
    }

    init_logging(&args);

    debug!("Dataprep v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("{:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle init-config: generate a default .dataprep.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", DEFAULT_CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to customize class mappings, extensions and more.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the selected command and write the summary. Returns the exit code.
fn run(args: Args) -> Result<i32> {
    let started_at = Utc::now();

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    let mut summary = RunSummary::new(args.command.name(), &config.general.dataset, started_at);

    let result = dispatch(&args, config, &mut summary);

    summary.success = matches!(result, Ok(0));
    if let Some(ref path) = args.summary {
        report::write_json_summary(&summary, path)?;
        info!("Summary written to {}", path.display());
    }

    result
}

/// Dispatch the selected command.
fn dispatch(args: &Args, config: Config, summary: &mut RunSummary) -> Result<i32> {
    match args.command {
        Command::Run {
            max_per_class,
            no_downsize,
        } => run_pipeline(args, &config, max_per_class, no_downsize, summary),
        Command::Reorganize => run_step(args, config, summary, steps::reorganize::run),
        Command::DeleteToN { target, .. } => run_step(args, config, summary, |ctx| {
            steps::downsize::run(ctx, target.unsigned_abs() as usize)
        }),
        Command::MapClassNames => run_step(args, config, summary, steps::map_names::run),
        Command::UnderscoreToDash => run_step(args, config, summary, steps::underscore::run),
        Command::ReduceClasses => run_step(args, config, summary, steps::reduce::run),
        Command::Check => Ok(handle_check(&config)),
        Command::InitConfig => handle_init_config().map(|_| 0),
    }
}

/// Run a single step in this process.
fn run_step<F>(args: &Args, config: Config, summary: &mut RunSummary, step: F) -> Result<i32>
where
    F: FnOnce(&StepContext) -> Result<StepReport>,
{
    let ctx = StepContext::new(config, !args.quiet);
    let report = step(&ctx)?;

    if !args.quiet {
        println!("\n{}", report::format_step_report(&report));
    }
    summary.steps.push(report);
    Ok(0)
}

/// Run the full pipeline, each step in a child process.
fn run_pipeline(
    args: &Args,
    config: &Config,
    max_per_class: Option<i64>,
    no_downsize: bool,
    summary: &mut RunSummary,
) -> Result<i32> {
    let dataset = Dataset::new(&config.general.dataset);
    if let Err(e) = dataset.check_structure() {
        println!("Error: {}", e);
        println!("\nPreprocessing stopped due to missing dataset structure.");
        return Ok(1);
    }

    let downsize = match (max_per_class, no_downsize) {
        (Some(max), _) => Some(max.unsigned_abs() as usize),
        (None, true) => None,
        (None, false) => {
            let stdin = std::io::stdin();
            let mut stdout = std::io::stdout();
            pipeline::prompt::ask_downsize(&mut stdin.lock(), &mut stdout)?
        }
    };

    let plan = pipeline::plan(downsize);
    let mut runner =
        pipeline::SubprocessRunner::current_exe(args.forwarded_args(&config.general.dataset))?;

    summary.pipeline = pipeline::run_steps(&plan, &mut runner);

    if pipeline::all_succeeded(&plan, &summary.pipeline) {
        println!("\nAll preprocessing steps completed successfully!");
        Ok(0)
    } else {
        println!("\nPreprocessing stopped due to an error.");
        Ok(1)
    }
}

/// Handle check: verify the layout and print per-split counts.
fn handle_check(config: &Config) -> i32 {
    let dataset = Dataset::new(&config.general.dataset);

    if let Err(e) = dataset.check_structure() {
        println!("❌ {}", e);
        return 1;
    }

    println!("✅ Dataset layout OK: {}", dataset.root().display());
    for stats in dataset.stats(&config.reduce.extensions) {
        println!(
            "   {:<10} {:>4} classes {:>8} images",
            stats.split.as_str(),
            stats.classes,
            stats.images
        );
    }
    0
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
