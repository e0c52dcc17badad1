//! `sorter` executable.
//!
//! - `sorter` (or `sorter serve`) runs the backend until Ctrl+C / SIGTERM.
//! - `sorter ping` and `sorter --version` print deterministic probe lines.

use log::error;
use sorter_server::config::ServerConfig;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let command = std::env::args().nth(1);
    match command.as_deref() {
        None | Some("serve") => serve().await,
        Some("ping") => {
            println!("sorter_core ping={}", sorter_core::ping());
            ExitCode::SUCCESS
        }
        Some("--version" | "-V") => {
            println!("sorter_core version={}", sorter_core::core_version());
            ExitCode::SUCCESS
        }
        Some(other) => {
            eprintln!("unknown command `{other}`; expected serve, ping or --version");
            ExitCode::from(2)
        }
    }
}

async fn serve() -> ExitCode {
    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let log_dir = config
        .log_dir
        .as_ref()
        .map(|dir| dir.to_string_lossy().into_owned());
    if let Err(err) = sorter_core::init_logging(&config.log_level, log_dir.as_deref()) {
        eprintln!("failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    match sorter_server::start_server(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=server_exit module=cli status=error error={err}");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
