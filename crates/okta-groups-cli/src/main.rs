mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use okta_groups::{OktaGroupProvider, OktaProviderConfig, load_signing_key};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve(args) => {
            let contents = std::fs::read_to_string(&args.config)
                .with_context(|| format!("reading config file {}", args.config.display()))?;
            let mut config: OktaProviderConfig =
                toml::from_str(&contents).context("parsing config file")?;
            if let Some(pattern) = args.pattern {
                config = config.with_group_pattern(pattern);
            }

            let provider = OktaGroupProvider::new(&config).context("building group provider")?;

            let mut groups: Vec<String> =
                provider.get_groups(&args.user).await.into_iter().collect();
            groups.sort();

            if groups.is_empty() {
                eprintln!("no groups resolved for {}", args.user);
            } else {
                for group in groups {
                    println!("{group}");
                }
            }
        }
        Commands::CheckKey(args) => {
            let key = load_signing_key(&args.key)
                .with_context(|| format!("loading private key {}", args.key.display()))?;
            println!(
                "{}: key loaded, client assertions will use {:?}",
                args.key.display(),
                key.algorithm()
            );
        }
    }

    Ok(())
}
