use clap::{Parser, Subcommand};
use partsight_service::{ScreenerService, legacy, simulation};

#[derive(Parser)]
#[command(name = "partsight", version, about = "Supply-chain patent-risk screening")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a component against the upstream patent service
    Analyze {
        /// Component name (query title)
        name: String,
        /// Component description (query summary)
        description: String,
        /// Query reference tag
        #[arg(long, default_value = "PARTSIGHT")]
        reference: String,
        /// Emit the legacy report shape instead of the analysis result
        #[arg(long)]
        legacy: bool,
        /// With --legacy, emit a simulated report when the live path fails
        #[arg(long, requires = "legacy")]
        simulate_on_failure: bool,
    },
    /// Show service configuration
    Status,
    /// Remove all cached analysis results
    ClearCache,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let service = ScreenerService::from_env()?;

    match cli.command {
        Command::Analyze {
            name,
            description,
            reference,
            legacy: legacy_shape,
            simulate_on_failure,
        } => {
            let result = service.analyze(&name, &description, &reference).await;
            if legacy_shape {
                match legacy::from_analysis(&result) {
                    Some(report) => println!("{}", serde_json::to_string_pretty(&report)?),
                    None if simulate_on_failure => {
                        tracing::warn!(
                            error = result.error.as_deref().unwrap_or("unknown"),
                            "live analysis failed, emitting simulated report"
                        );
                        let report = simulation::simulated_report(&name);
                        println!("{}", serde_json::to_string_pretty(&report)?);
                    }
                    None => {
                        println!("{}", serde_json::to_string_pretty(&result)?);
                        std::process::exit(1);
                    }
                }
            } else {
                println!("{}", serde_json::to_string_pretty(&result)?);
                if !result.success {
                    std::process::exit(1);
                }
            }
        }
        Command::Status => {
            println!("{}", serde_json::to_string_pretty(&service.status())?);
        }
        Command::ClearCache => {
            service.clear_cache()?;
            tracing::info!("cache cleared");
        }
    }
    Ok(())
}
