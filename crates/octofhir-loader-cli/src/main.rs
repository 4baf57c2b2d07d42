mod cli;
mod commands;
mod config;
mod observability;
mod output;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use octofhir_loader::BundleSize;

use cli::{Cli, Commands};
use config::Overrides;
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    observability::init_tracing_with_level(&cli.log_level);

    let profile = &cli.profile;
    let format = cli.format.unwrap_or_default();

    match &cli.command {
        Commands::Convert(args) => {
            let overrides = Overrides {
                bundle_size: args.bundle_size,
                output_dir: args.output_dir.clone(),
                parallelism: args.parallel,
            };
            let loader_config = config::resolve(&config::load_profile(profile)?, overrides)?;
            tracing::debug!(?loader_config, profile = %profile, "Resolved loader configuration");
            commands::convert::convert(&args.paths, &loader_config, format).await?;
        }
        Commands::Inspect(args) => {
            let overrides = Overrides {
                bundle_size: args.bundle_size,
                ..Overrides::default()
            };
            let loader_config = config::resolve(&config::load_profile(profile)?, overrides)?;
            commands::inspect::inspect(&args.path, loader_config.bundle_size, format)?;
        }
        Commands::Config(args) => match &args.command {
            cli::ConfigCommands::Show => {
                let cfg = config::load_profile(profile)?;
                println!("{}: {}", "Profile".cyan(), profile);
                println!(
                    "{}: {}",
                    "Bundle size".cyan(),
                    cfg.bundle_size
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| format!("{} (default)", BundleSize::DEFAULT))
                );
                println!(
                    "{}: {}",
                    "Output dir".cyan(),
                    cfg.output_dir
                        .as_deref()
                        .map(|d| d.display().to_string())
                        .unwrap_or_else(|| "(not set)".to_string())
                );
                println!(
                    "{}: {}",
                    "Parallelism".cyan(),
                    cfg.parallelism.unwrap_or(1)
                );
            }
            cli::ConfigCommands::Set(set_args) => {
                let mut cfg = config::load_profile(profile)?;
                config::set_key(&mut cfg, &set_args.key, &set_args.value)?;
                config::save_profile(profile, &cfg)?;
                output::print_success(&format!("Set {} = {}", set_args.key, set_args.value));
            }
        },
    }

    Ok(())
}
