use address_validator::app::wiring;
use address_validator::config::{RegistryKind, ValidatorConfig};
use address_validator::utils::logger;
use address_validator::utils::validation::Validate;
use address_validator::{BatchEngine, BatchValidator, LocalStorage};
use anyhow::Context;
use clap::Parser;

#[derive(Parser)]
#[command(name = "batch-validate")]
#[command(about = "Validate a CSV or JSON file of addresses against the address registry")]
struct Args {
    /// Input file (.csv with a name,street,house_number,city,zip,country header, or .json)
    #[arg(short, long)]
    input: String,

    /// Path to TOML configuration file
    #[arg(short, long, default_value = "validator.toml")]
    config: String,

    /// Override batch.output_path from config
    #[arg(short, long)]
    output: Option<String>,

    /// Override batch.concurrent_requests from config
    #[arg(long)]
    concurrency: Option<usize>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Show what would be processed without contacting the registry
    #[arg(long)]
    dry_run: bool,
}

fn display_config_summary(config: &ValidatorConfig, args: &Args) {
    tracing::info!("📋 Batch summary:");
    tracing::info!("   Input: {}", args.input);
    match config.registry.kind {
        RegistryKind::Http => tracing::info!(
            "   Registry: HTTP {}",
            config.registry.endpoint.as_deref().unwrap_or("-")
        ),
        RegistryKind::Dataset => tracing::info!(
            "   Registry: dataset {}",
            config.registry.dataset_path.as_deref().unwrap_or("-")
        ),
    }
    tracing::info!("   Auto-correct threshold: {}", config.threshold());
    tracing::info!("   Concurrent requests: {}", config.concurrent_requests());
    tracing::info!("   Output: {} {:?}", config.output_path(), config.output_formats());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = ValidatorConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load config file '{}'", args.config))?;
    config.apply_env_overrides()?;
    if let Some(output) = &args.output {
        config.batch.output_path = Some(output.clone());
    }
    if let Some(concurrency) = args.concurrency {
        config.batch.concurrent_requests = Some(concurrency);
    }

    if config.json_logs() {
        logger::init_json_logger(args.verbose, config.logging.level.as_deref());
    } else {
        logger::init_cli_logger(args.verbose, config.logging.level.as_deref());
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config, &args);

    let input = std::fs::canonicalize(&args.input)
        .with_context(|| format!("Input file '{}' not found", args.input))?;
    let input = input.to_string_lossy().to_string();

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No registry calls will be made");
        return Ok(());
    }

    let classifier = wiring::build_classifier(&config)?;
    let engine = BatchEngine::new(
        LocalStorage::new(config.output_path()),
        BatchValidator::new(classifier, config.concurrent_requests()),
        config.output_formats(),
    );

    let outcome = engine.run(&input).await?;
    let counts = &outcome.report.summary.counts;

    println!(
        "✅ {} addresses: {} valid, {} corrected, {} ambiguous, {} invalid, {} failed",
        outcome.report.summary.total,
        counts.valid,
        counts.corrected,
        counts.ambiguous,
        counts.invalid,
        counts.failed
    );
    for name in &outcome.written {
        println!("📁 {}/{}", config.output_path(), name);
    }

    Ok(())
}
