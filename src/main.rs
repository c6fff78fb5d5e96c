use address_validator::app::wiring;
use address_validator::utils::error::{ErrorSeverity, ValidatorError};
use address_validator::utils::logger;
use address_validator::{CliConfig, ValidationStatus};
use clap::Parser;

const EXIT_AMBIGUOUS: i32 = 4;
const EXIT_INVALID: i32 = 5;

fn exit_code_for(e: &ValidatorError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn fail(e: ValidatorError) -> ! {
    tracing::error!(
        "❌ Validation failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(exit_code_for(&e));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            logger::init_cli_logger(cli.verbose, None);
            fail(e)
        }
    };

    if config.json_logs() {
        logger::init_json_logger(cli.verbose, config.logging.level.as_deref());
    } else {
        logger::init_cli_logger(cli.verbose, config.logging.level.as_deref());
    }
    if cli.verbose {
        tracing::debug!("Resolved config: {:?}", config);
    }

    let classifier = wiring::build_classifier(&config).unwrap_or_else(|e| fail(e));
    let result = classifier
        .classify(&cli.candidate())
        .await
        .unwrap_or_else(|e| fail(e));

    println!("{}", serde_json::to_string_pretty(&result)?);

    match result.status {
        ValidationStatus::Valid | ValidationStatus::Corrected => Ok(()),
        ValidationStatus::Ambiguous => std::process::exit(EXIT_AMBIGUOUS),
        ValidationStatus::Invalid => std::process::exit(EXIT_INVALID),
    }
}
