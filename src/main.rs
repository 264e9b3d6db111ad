use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use feedhook::app::AppContext;
use feedhook::cli::Cli;
use feedhook::daemon::{shutdown_channel, wait_for_signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("feedhook=info")))
        .init();

    let cli = Cli::parse();
    let Some(settings) = cli.settings() else {
        println!("Please specify a configuration file to read (--config <path>)");
        return Ok(());
    };

    let ctx = AppContext::new(settings).context("Failed to start")?;

    if ctx.feeds.is_empty() {
        tracing::warn!("No feeds configured in {}", ctx.settings.config_path.display());
    }
    for entry in &ctx.feeds {
        tracing::info!("Monitoring feed {} posting to {}", entry.feed_url, entry.hook_url);
    }

    let scheduler = ctx.scheduler();

    if cli.once {
        scheduler.run_once().await;
    } else {
        let (tx, rx) = shutdown_channel();

        tokio::spawn(async move {
            if let Err(e) = wait_for_signal().await {
                tracing::error!("Failed to install signal handlers: {}", e);
                // Keep the sender alive so the scheduler keeps running.
                std::future::pending::<()>().await;
            }
            let _ = tx.send(true);
        });

        scheduler.run(rx).await;
    }

    drop(scheduler);
    ctx.close().context("Failed to close cache")?;

    Ok(())
}
