use std::process::ExitCode;

use push_listener::{logger, server, Config, Console};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = logger::init() {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match server::run(&config, Console::stdout()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
