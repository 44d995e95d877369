use clap::Parser;
use tracing::{error, info};

use tubewatch::{Config, DiscordNotifier, Monitor, StateStore, YoutubeFeedSource};

/// YouTube channel monitor: one pass of fetch, detect, notify.
#[derive(Parser, Debug)]
#[command(name = "tubewatch", version, about)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Path to the JSON state file.
    #[arg(long, default_value = "state.json")]
    state: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {e}", cli.config);
            std::process::exit(1);
        }
    };

    if let Err(e) = tubewatch::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        tubewatch::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("{e}");
        std::process::exit(1);
    }

    let source = match YoutubeFeedSource::new(&config.monitor) {
        Ok(source) => source,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };
    let notifier = match DiscordNotifier::new(config.webhook_url.clone(), &config.monitor) {
        Ok(notifier) => notifier,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };
    let store = StateStore::new(&cli.state);

    let mut monitor = Monitor::new(source, notifier, store, &config.monitor);
    match monitor.run_pass(&config.channels).await {
        Ok(summary) => {
            info!(
                "pass complete: {} checked, {} notified, {} fetch failures, {} send failures",
                summary.channels_checked,
                summary.notifications_sent,
                summary.fetch_failures,
                summary.send_failures
            );
        }
        Err(e) => {
            error!("pass aborted: {e}");
            std::process::exit(1);
        }
    }
}
