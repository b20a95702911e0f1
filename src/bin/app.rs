//! Wisp application binary.
//!
//! Initializes logging, loads configuration, runs the shell, and performs
//! the shutdown handover (plain exit, or relaunch of the installed binary).

use tracing_subscriber::EnvFilter;
use wisp::{App, Shutdown, WispConfig};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wisp=info")),
        )
        .init();

    tracing::info!("app starting...");

    let config = WispConfig::load();
    let app = App::new(config);

    match app.run()? {
        Shutdown::Exit => {}
        Shutdown::Restart { binary } => {
            tracing::info!("restarting as {}", binary.display());
            std::process::Command::new(&binary).spawn()?;
        }
    }

    Ok(())
}
