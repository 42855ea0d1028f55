//! Runnable demo server binary. Loads an optional TOML config file, binds
//! the configured port, and serves sync sessions forever.

use clap::Parser;
use deltasync::Config;

#[derive(Parser)]
struct Args {
    /// Path to a TOML config file; falls back to built-in defaults when absent.
    #[arg(long)]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = match args.config {
        Some(path) => Config::from_file(path)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err.to_string()))?,
        None => Config::default(),
    };

    deltasync::serve(config).await
}
