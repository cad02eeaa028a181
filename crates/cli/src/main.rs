use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use shelf_app::modules::books::schema::{update_policy, BookSchemas};
use shelf_kernel::settings::Settings;
use shelf_schema::{validate, ValidationResult};

#[derive(Parser, Debug)]
#[command(name = "shelf", version, about = "Operate the shelf book catalogue")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service
    Serve,
    /// Print the migrations every module contributes, in apply order
    Migrations,
    /// Check a JSON book payload against the create (or update) schema
    Validate {
        /// File holding the JSON payload
        path: PathBuf,
        /// Use the update schema under the configured update policy
        #[arg(long)]
        update: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let settings = Settings::load().with_context(|| "failed to load shelf settings")?;

    match cli.command {
        Command::Serve => {
            shelf_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "shelf serve starting");
            shelf_app::serve(&settings).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Migrations => {
            let resources = shelf_app::default_resources();
            let registry = shelf_app::build_registry(&resources, &settings)?;
            for (module, migration) in registry.collect_migrations() {
                println!("-- {}/{}: {}", module, migration.id, migration.description);
                println!("{}", migration.up.trim());
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Validate { path, update } => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let payload: serde_json::Value = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not valid JSON", path.display()))?;

            let schemas = BookSchemas::new(update_policy(settings.books.update_policy));
            let schema = if update {
                &schemas.update
            } else {
                &schemas.create
            };

            match validate(&payload, schema) {
                ValidationResult::Valid => {
                    println!("{}: valid {}", path.display(), schema.name);
                    Ok(ExitCode::SUCCESS)
                }
                ValidationResult::Invalid(violations) => {
                    for violation in &violations {
                        println!("{}: {}", path.display(), violation);
                    }
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}
