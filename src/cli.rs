use crate::app;
use crate::configuration::Settings;
use clap::Parser;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

pub async fn run() -> color_eyre::Result<()> {
    let cli = Cli::parse();
    init_tracing()?;

    let mut settings = Settings::build();
    if let Some(timeout) = cli.timeout {
        settings.http.timeout_secs = timeout;
    }

    app::exec(&settings).await
}

/// Logging is opt-in via RUST_LOG and goes to a file; the terminal is in
/// raw mode on the alternate screen, so writing to stderr would corrupt it.
fn init_tracing() -> color_eyre::Result<()> {
    let Ok(filter) = EnvFilter::try_from_default_env() else {
        return Ok(());
    };
    let file = std::fs::File::create("courier.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
