use std::path::PathBuf;

use clap::Parser;

/// Flags read once at process start and passed down by reference.
#[derive(Debug, Clone, Parser)]
#[command(name = "server")]
#[command(about = "Generic backend service")]
pub struct StartupArgs {
    /// Configuration directory or file; repeat to merge several in order
    #[arg(long = "config", required = true)]
    pub config: Vec<PathBuf>,

    /// Application name, also the prefix of environment overrides
    #[arg(long = "appname")]
    pub app_name: String,

    /// Environment name selecting `<env>.yaml`
    #[arg(short = 'e', long = "env", default_value = "")]
    pub env: String,

    /// Run schema migration before serving
    #[arg(long)]
    pub migrate: bool,
}
