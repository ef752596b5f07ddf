use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;

use crate::api::types::{ErrorResponse, PredictResponse};
use crate::error::{BodyEchoError, Result};
use crate::food::FoodSearchClient;
use crate::ml::{ModelRegistry, ModelStatus};
use crate::risk;

#[derive(Parser)]
#[command(name = "bodyecho")]
#[command(version)]
#[command(about = "Health-risk inference service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config directory (default.toml plus per-environment overrides)
    #[arg(short, long, default_value = "config")]
    pub config: PathBuf,

    /// Override the model artifact directory
    #[arg(long)]
    pub models_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP service (default)
    Serve {
        /// Port to listen on (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Score one request body from a file, or `-` for stdin
    Predict {
        #[arg(short, long, default_value = "-")]
        input: String,
    },
    /// Load every category and show its artifact status
    Models,
    /// Search the food database
    Search {
        /// Free-text search expression
        query: String,
    },
}

fn read_input(input: &str) -> Result<Vec<u8>> {
    if input == "-" {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        Ok(std::fs::read(input)?)
    }
}

/// Run the full pipeline on one body and print the JSON envelope.
pub fn run_predict(registry: &ModelRegistry, input: &str) -> Result<()> {
    let body = read_input(input)?;
    match risk::assess(registry, &body) {
        Ok(results) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&PredictResponse::new(results))?
            );
            Ok(())
        }
        Err(e) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&ErrorResponse::new(e.to_string()))?
            );
            Err(e)
        }
    }
}

/// Print per-category load status; fails when any category is unusable.
pub fn show_models(registry: &ModelRegistry) -> Result<()> {
    registry.ensure_loaded();

    println!("Model artifacts:\n");
    let mut failed = 0usize;
    for (category, status) in registry.statuses() {
        match status {
            ModelStatus::Loaded {
                model_sha256,
                scaler_sha256,
            } => {
                println!("  \x1b[32m✓\x1b[0m {:<18} model {}", category, short(&model_sha256));
                println!("    {:<18} scaler {}", "", short(&scaler_sha256));
            }
            ModelStatus::Failed { error } => {
                failed += 1;
                println!("  \x1b[31m✗\x1b[0m {:<18} {}", category, error);
            }
            ModelStatus::Pending => println!("  - {:<18} pending", category),
        }
    }
    println!();

    if failed > 0 {
        return Err(BodyEchoError::Internal(format!(
            "{} of {} categories failed to load",
            failed,
            risk::RiskCategory::ALL.len()
        )));
    }
    Ok(())
}

fn short(digest: &str) -> &str {
    digest.get(..12).unwrap_or(digest)
}

/// Search foods and print the upstream JSON.
pub async fn search_foods(client: &FoodSearchClient, query: &str) -> Result<()> {
    println!("Searching for: \"{}\"\n", query);
    let data = client.search(query).await?;
    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["bodyecho", "serve", "--port", "9000"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve { port: Some(9000) })));
        assert_eq!(cli.config, PathBuf::from("config"));

        let cli = Cli::try_parse_from(["bodyecho", "--config", "/etc/bodyecho", "predict"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Predict { ref input }) if input == "-"));
        assert_eq!(cli.config, PathBuf::from("/etc/bodyecho"));

        let cli = Cli::try_parse_from(["bodyecho"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_short_digest() {
        assert_eq!(short("ba7816bf8f01cfea414140de5dae2223"), "ba7816bf8f01");
        assert_eq!(short("abc"), "abc");
    }

    #[test]
    fn test_run_predict_rejects_malformed_file() {
        let path = std::env::temp_dir().join(format!("bodyecho-cli-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, b"{not json").unwrap();
        let registry = ModelRegistry::from_dir(std::env::temp_dir().join("bodyecho-no-models"));
        let result = run_predict(&registry, path.to_str().unwrap());
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(BodyEchoError::Request(_))));
    }
}
