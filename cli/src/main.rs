use std::process::ExitCode;

use clap::Parser;
use posts_cli::app::{self, Outcome};
use posts_cli::config::CliArgs;
use posts_core::{FetchController, PostClient, PostSource};
use tokio::io::BufReader;
use tokio::runtime::Handle;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = args.validate() {
        eprintln!("Error: {e}");
        return ExitCode::from(2);
    }
    let transport = match args.transport() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(2);
        }
    };

    tracing::info!(base_url = %args.base_url, "starting");
    let source = PostSource::new(PostClient::new(&args.base_url), transport);
    let controller = FetchController::new(source, Handle::current());

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    match app::run(&controller, stdin, &mut stdout).await {
        Ok(Outcome::Loaded) => ExitCode::SUCCESS,
        Ok(Outcome::GaveUp | Outcome::Closed) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "terminal I/O failed");
            ExitCode::FAILURE
        }
    }
}
