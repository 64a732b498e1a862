// ocarina - point it at a folder and press play

mod audio;
mod config;
mod ui;

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use config::Config;
use ui::App;

#[derive(Parser, Debug)]
#[command(name = "ocarina", about = "Minimal folder-based audio player")]
struct Args {
    /// Folder to load at startup; same behavior as opening it from the UI
    folder: Option<PathBuf>,

    /// Override the configured volume (0.0 to 1.0)
    #[arg(long)]
    volume: Option<f32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // The TUI owns stdout, so logs go to a file under the config dir.
    let app_dir = Config::app_dir()?;
    fs::create_dir_all(&app_dir)?;
    let file_appender = tracing_appender::rolling::never(&app_dir, "ocarina.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(writer)
        .with_ansi(false)
        .init();

    let mut config = Config::load()?;
    if let Some(volume) = args.volume {
        config.audio.volume = volume.clamp(0.0, 1.0);
    }

    let mut app = App::new(config, args.folder).await?;
    app.run().await?;

    Ok(())
}
