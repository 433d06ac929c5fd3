use clap::Parser;
use offerguard::cli::{Cli, Commands, RegistryCommands};
use offerguard::config::AppConfig;
use offerguard::domain::VerificationResult;
use offerguard::error::{GuardError, Result};
use offerguard::runtime::{self, Components};
use offerguard::TerminalSurface;
use std::sync::Arc;
use tracing::info;

mod main_runtime;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_from(&cli.config)?;
    if cli.session_cookie.is_some() {
        config.monitor.session_cookie = cli.session_cookie.clone();
    }
    if let Err(errors) = config.validate() {
        return Err(GuardError::Validation(errors.join("; ")));
    }
    main_runtime::init_logging(&config.logging);

    let surface = Arc::new(TerminalSurface::new(&config.surface));
    let components = Components::from_config(config, surface)?;

    match cli.command {
        Commands::Verify { page } => {
            let context = page
                .to_payload()?
                .into_context()
                .map_err(|e| GuardError::NotATradeContext(e.to_string()))?;

            let result = components
                .verifier
                .verify_and_render(&context.partner, components.surface.as_ref())
                .await;
            if result == VerificationResult::CheckSkipped {
                info!(
                    name = %context.partner.display_name,
                    "Partner name makes no claim to be an official bot, nothing to verify"
                );
            }
            runtime::verification_outcome(&context.partner.identity, &result)?;
        }
        Commands::Watch {
            profile_url,
            offer_id,
        } => {
            let context = runtime::watch_offer(&components, &profile_url, &offer_id).await?;
            runtime::monitor_outcome(&context)?;
        }
        Commands::Guard { page } => {
            let context = page
                .to_payload()?
                .into_context()
                .map_err(|e| GuardError::NotATradeContext(e.to_string()))?;
            let partner_id = context.partner.identity.clone();

            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let report = runtime::guard_trade(&components, context, stdin).await?;
            info!(
                verification = %report.verification,
                offers = report.offers.len(),
                "Trade page guard finished"
            );
            report.into_result(&partner_id)?;
        }
        Commands::Registry { action } => match action {
            RegistryCommands::Status => main_runtime::print_registry_status(&components).await?,
            RegistryCommands::Refresh => {
                let entries = components.refresh_registry().await?;
                println!("Registry refreshed: {} official bots", entries);
            }
        },
    }

    Ok(())
}
