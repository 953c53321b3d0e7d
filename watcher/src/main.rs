//! Homework Watcher Entry Point

use clap::Parser;
use homework_watcher::cli::Cli;
use homework_watcher::common::config::WatcherConfig;
use homework_watcher::logging;
use homework_watcher::poller::Poller;
use homework_watcher::shutdown::{listen_for_signals, ShutdownController};
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    // .env があれば読み込む（既存の環境変数が優先）
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let _log_guard = match logging::init(cli.log_dir.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Homework watcher v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match WatcherConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Program stopped: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = cli.apply(&mut config) {
        error!("Program stopped: {}", e);
        return ExitCode::FAILURE;
    }

    let mut poller = match Poller::from_config(&config) {
        Ok(poller) => poller,
        Err(e) => {
            error!("Failed to initialize watcher: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if cli.once {
        let outcome = poller.run_cycle().await;
        info!(?outcome, "Single check finished");
        return ExitCode::SUCCESS;
    }

    let shutdown = ShutdownController::default();
    tokio::spawn(listen_for_signals(shutdown.clone()));

    poller.run(&shutdown).await;
    ExitCode::SUCCESS
}
