use clap::Parser;
use server::{bootstrap, StartupArgs};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let args = StartupArgs::parse();

    let services = match bootstrap(&args, &[]).await {
        Ok(services) => services,
        Err(e) => {
            eprintln!("❌ Failed to start {}: {e}", args.app_name);
            std::process::exit(1);
        }
    };

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "server=signal_failed");
    }
    info!("server=shutdown_requested");

    if let Err(e) = services.shutdown().await {
        eprintln!("❌ Shutdown failed: {e}");
        std::process::exit(1);
    }
}
