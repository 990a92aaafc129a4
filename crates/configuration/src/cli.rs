//! Command-line arguments shared by the binary's subcommands.

use crate::Settings;
use clap::Args;
use std::path::PathBuf;

/// Selects the configuration file.
#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// Path to a TOML configuration file (defaults to ./bookshelf.toml if present).
    #[arg(long, short)]
    pub config: Option<PathBuf>,
}

/// Per-run overrides for the listening address.
#[derive(Debug, Clone, Args)]
pub struct ServerArgs {
    /// Interface to bind, overriding `server.host`.
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind, overriding `server.port`.
    #[arg(long)]
    pub port: Option<u16>,
}

impl ServerArgs {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(host) = &self.host {
            settings.server.host = host.clone();
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
    }
}
