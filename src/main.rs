use clap::Parser;
use household_ledger::app::commands;
use household_ledger::utils::error::{ErrorSeverity, HouseholdError};
use household_ledger::utils::{logger, validation::Validate};
use household_ledger::{Cli, Household, HouseholdConfig};

fn exit_code(e: &HouseholdError) -> i32 {
    match e.severity() {
        ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    }
}

fn fail(context: &str, e: HouseholdError) -> ! {
    tracing::error!(
        "❌ {}: {} (Category: {:?}, Severity: {:?})",
        context,
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(exit_code(&e));
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match HouseholdConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            logger::init_cli_logger(cli.verbose, Default::default());
            fail(&format!("Failed to load config file '{}'", cli.config), e);
        }
    };
    logger::init_cli_logger(cli.verbose, config.logging.format);
    tracing::debug!("📁 Loaded configuration from {}", cli.config);

    if let Err(e) = config.validate() {
        fail("Configuration validation failed", e);
    }

    let roster = match config.roster() {
        Ok(roster) => roster,
        Err(e) => fail("Invalid roster", e),
    };
    let store = match config.build_store() {
        Ok(store) => store,
        Err(e) => fail("Cannot open the store", e),
    };
    tracing::debug!(
        "🏠 {} with {} members",
        config.display_name(),
        roster.len()
    );

    let household = Household::new(store, roster, config.layout());
    match commands::execute(&household, &cli.command, &config.chore_seeds()).await {
        Ok(output) => print!("{}", output),
        Err(e) => fail("Command failed", e),
    }
}
