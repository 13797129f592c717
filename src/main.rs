use caixa::app::{self, Outcome};
use caixa::utils::error::ErrorSeverity;
use caixa::utils::{logger, validation::Validate};
use caixa::CliConfig;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose, config.log_json);

    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let mut stdout = std::io::stdout().lock();

    match app::execute(&config.command, &mut stdout).await {
        Ok(Outcome::Success) => Ok(()),
        Ok(Outcome::Rejected) => std::process::exit(1),
        Err(e) => {
            tracing::error!("{} (severity: {:?})", e, e.severity());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }
}
