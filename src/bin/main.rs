use barrage::config::Args;
use barrage::executor::HttpTransport;
use barrage::shutdown::Shutdown;
use barrage::Error;

use clap::{CommandFactory, Parser};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if matches!(e, Error::MissingApiKey) {
                eprintln!("{}", Args::command().render_help());
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> barrage::Result<()> {
    let config = args.into_config()?;
    let transport = HttpTransport::new(&config)?;

    tracing::info!(
        workers = config.workers,
        endpoint = transport.endpoint(),
        model = %config.model,
        interval = ?config.interval,
        timeout = ?config.timeout,
        "Starting load"
    );

    let shutdown = Shutdown::new();
    let listener = shutdown.listen_for_interrupt();
    barrage::run(&config, Arc::new(transport), &shutdown).await;
    listener.abort();

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
