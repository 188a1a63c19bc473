//! vocabaudit - quality checker for SKOS vocabularies
//!
//! Loads an N-Triples vocabulary, evaluates the requested quality issues and
//! writes a text or JSON report.
//!
//! Exit codes:
//!   0 - Success (no problems found, or no --fail-on-problems set)
//!   1 - Runtime error (unreadable input, bad configuration, failed issue in fail-fast mode)
//!   2 - Potential problems found with --fail-on-problems

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::reload;
use vocabaudit::cli::{Args, OutputFormat};
use vocabaudit::config::{Config, DEFAULT_CONFIG_FILE};
use vocabaudit::engine::{BarProgress, Engine};
use vocabaudit::issues;
use vocabaudit::links::{HttpProbe, LinkChecker, PacingGate};
use vocabaudit::models::ReportMetadata;
use vocabaudit::report::{self, TextOptions};
use vocabaudit::store::MemoryStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config and --list-issues early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }
    if args.list_issues {
        handle_list_issues();
        return Ok(());
    }

    let set_level = init_logging(&args)?;

    info!("vocabaudit v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_audit(args, set_level).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Audit failed: {:#}", e);
            eprintln!("\nError: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .vocabaudit.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!("{} already exists. Remove it first or edit it manually.", DEFAULT_CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml()?;
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to customize sampling, link checks, issue selection and more.");
    Ok(())
}

/// Handle --list-issues: print the catalog.
fn handle_list_issues() {
    for meta in issues::all_issues() {
        println!("{:<5} {:<12} {}", meta.code, meta.category.to_string(), meta.name);
    }
}

/// Changes the log level after the subscriber is installed.
type LevelSetter = Box<dyn Fn(Level) -> Result<()> + Send + Sync>;

/// Initialize logging based on verbosity settings.
///
/// The level can be raised later, once the config file has been read.
fn init_logging(args: &Args) -> Result<LevelSetter> {
    let level = args.log_level();

    let (filter, handle) = reload::Layer::new(LevelFilter::from_level(level));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact();
    let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    Ok(Box::new(move |level| {
        handle
            .reload(LevelFilter::from_level(level))
            .context("Failed to change log level")
    }))
}

/// Run the complete audit workflow. Returns exit code (0 or 2).
async fn run_audit(args: Args, set_level: LevelSetter) -> Result<i32> {
    let start_time = Instant::now();

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate().context("Invalid configuration")?;
    set_level(config.log_level(args.quiet))?;

    // Step 1: Load the vocabulary
    let input = args.input.clone().context("No input vocabulary given")?;
    println!("Loading vocabulary: {}", input.display());
    let content = std::fs::read_to_string(&input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let store = MemoryStore::from_ntriples(&content)
        .with_context(|| format!("Failed to parse {}", input.display()))?;
    let triples = store.len();
    info!("Loaded {} triples", triples);

    // Step 2: Wire the engine
    let catalog = issues::catalog(&config.issue_settings())?;
    let gate = Arc::new(PacingGate::new(config.links.delay_millis)?);
    let probe = HttpProbe::new(config.link_timeout(), &config.links.user_agent)
        .context("Failed to create HTTP client")?;
    let checker = LinkChecker::new(Arc::new(probe), gate, config.links.concurrency);

    let mut engine = Engine::new(catalog, Arc::new(store))?
        .with_links(Arc::new(checker))
        .with_mode(config.general.run_mode);

    let bar = (!args.quiet).then(BarProgress::new);
    if let Some(ref bar) = bar {
        engine = engine.with_monitor(bar.clone());
    }

    // Step 3: Evaluate
    println!("Evaluating quality issues ({})...", config.general.run_mode);
    let requested: Vec<&str> = config.general.issues.iter().map(String::as_str).collect();
    let run = engine.run(&requested).await;
    if let Some(ref bar) = bar {
        bar.finish();
    }
    let run = run.context("Evaluation stopped")?;

    for failure in run.failures() {
        if let Err(e) = &failure.result {
            warn!("{} could not be evaluated: {}", failure.meta.code, e);
        }
    }

    // Step 4: Build and save the report
    let metadata = ReportMetadata {
        input: input.display().to_string(),
        analysis_date: Utc::now(),
        triples,
        base_uri: config.vocabulary.base_uri.clone(),
        subset_percent: config.sampling.subset_percent,
        run_mode: config.general.run_mode,
        duration_seconds: start_time.elapsed().as_secs_f64(),
    };
    let report = report::build_report(metadata, &run);

    let output = match config.report.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Text => {
            let options = TextOptions {
                style: config.report.style,
                include_summary: config.report.include_summary,
            };
            report::generate_text_report(&report, &run, options)?
        }
    };

    let output_path = Path::new(&config.general.output);
    report::write_report(&output, output_path)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    if config.report.write_graphs {
        let dir = Path::new(&config.report.graphs_dir);
        let written = report::write_graphs(&report, dir)
            .with_context(|| format!("Failed to write graphs to {}", dir.display()))?;
        info!("Wrote {} graph files to {}", written.len(), dir.display());
    }

    // Print summary
    let summary = &report.summary;
    println!("\nAudit Summary:");
    println!("   Issues evaluated: {}", summary.total);
    println!(
        "   Statistics: {} | OK: {} | Potential problems: {} | Not evaluated: {}",
        summary.informational, summary.ok, summary.problematic, summary.failed
    );
    println!("   Duration: {:.1}s", report.metadata.duration_seconds);
    println!("\nAudit complete! Report saved to: {}", output_path.display());

    if args.fail_on_problems && run.has_problems() {
        eprintln!("\nPotential problems found. Failing (exit code 2).");
        return Ok(2);
    }

    Ok(0)
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
