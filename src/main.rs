use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use helio::catalog::default_catalog;
use helio::config::{self, PersonaConfig};
use helio::provider::provider_from_env;
use helio::session::Session;
use helio::web_server::{start_web_server, AppState};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the chat API server.
    Serve {
        #[arg(long, default_value_t = 9900, help = "Port for the web server.")]
        port: u16,
    },
    /// Chat with Dr. Helio in the terminal.
    Chat {
        #[arg(long, help = "Your name, for the onboarding handoff.")]
        name: Option<String>,
        #[arg(long, help = "Your age, for the onboarding handoff.")]
        age: Option<String>,
        #[arg(long, help = "Health concern to open the conversation with.")]
        concern: Option<String>,
    },
}

// Builds the opening message the onboarding form would have carried over.
fn handoff_message(
    name: Option<String>,
    age: Option<String>,
    concern: Option<String>,
) -> Option<String> {
    let concern = concern?;
    match (name, age) {
        (Some(name), Some(age)) => Some(format!(
            "My name is {}, my age is {}, and my problem is: {}",
            name, age, concern
        )),
        _ => Some(concern),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for environment variables like API keys)
    dotenvy::dotenv().ok();

    // Reads log level from RUST_LOG (e.g. RUST_LOG=info,helio=debug)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    info!("Helio starting with command: {:?}", cli.command);

    let persona = Arc::new(PersonaConfig::default());
    let catalog = Arc::new(default_catalog());
    let provider = provider_from_env(&persona.system_prompt)
        .context("Failed to configure completion provider")?;

    match cli.command {
        Commands::Serve { port } => {
            let state = AppState::new(persona, catalog, provider, *config::RECOMMEND_CAP);

            let mut server_handle = tokio::spawn(async move {
                if let Err(e) = start_web_server(port, state).await {
                    error!("Web server failed: {:?}", e);
                }
            });

            let ctrl_c = tokio::signal::ctrl_c();
            tokio::pin!(ctrl_c);

            tokio::select! {
                _ = &mut ctrl_c => {
                    info!("Ctrl-C received, shutting down...");
                }
                res = &mut server_handle => {
                    match res {
                        Ok(_) => info!("Web server task completed unexpectedly."),
                        Err(e) if e.is_panic() => error!("Web server task panicked: {:?}", e),
                        Err(e) => error!("Web server task failed: {:?}", e),
                    }
                }
            }
        }
        Commands::Chat { name, age, concern } => {
            let session = Session::new(persona, catalog, provider, *config::RECOMMEND_CAP);
            helio::chat::run_chat(session, handoff_message(name, age, concern)).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handoff_message_full() {
        let msg = handoff_message(
            Some("Ada".to_string()),
            Some("34".to_string()),
            Some("frequent headaches".to_string()),
        );
        assert_eq!(
            msg.as_deref(),
            Some("My name is Ada, my age is 34, and my problem is: frequent headaches")
        );
    }

    #[test]
    fn test_handoff_message_concern_only() {
        let msg = handoff_message(None, None, Some("a cough".to_string()));
        assert_eq!(msg.as_deref(), Some("a cough"));
    }

    #[test]
    fn test_handoff_message_requires_concern() {
        assert!(handoff_message(Some("Ada".to_string()), Some("34".to_string()), None).is_none());
    }
}
