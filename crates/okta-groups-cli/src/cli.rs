use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Command-line interface for verifying Okta group resolution before wiring
/// it into a query engine.
#[derive(Parser)]
#[command(name = "okta-groups", version, about = "Resolve Okta authorization groups for a user")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the authorization groups for a user
    Resolve(ResolveArgs),
    /// Verify that a private key file parses into a usable signing key
    CheckKey(CheckKeyArgs),
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "OKTA_GROUPS_CONFIG")]
    pub config: PathBuf,

    /// Override the configured group name pattern
    #[arg(long)]
    pub pattern: Option<String>,

    /// User to resolve (Okta login or email)
    pub user: String,
}

#[derive(Args)]
pub struct CheckKeyArgs {
    /// Path to the private key file
    pub key: PathBuf,
}
