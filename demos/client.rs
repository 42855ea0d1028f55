//! Runnable demo client binary. Connects to a deltasync server and uploads
//! one local file under a given remote name.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpStream;

#[derive(Parser)]
struct Args {
    /// Server address, e.g. 127.0.0.1:9000
    #[arg(long, default_value = "127.0.0.1:9000")]
    addr: String,

    /// Local file to upload.
    file: PathBuf,

    /// Name to register the file under on the server; defaults to the
    /// local file's own basename.
    #[arg(long)]
    remote_name: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let remote_name = args.remote_name.unwrap_or_else(|| {
        args.file.file_name().expect("file has a name").to_string_lossy().into_owned()
    });

    let stream = TcpStream::connect(&args.addr)
        .await
        .unwrap_or_else(|err| panic!("connecting to {}: {err}", args.addr));

    let outcome = deltasync::client::upload_file(stream, &args.file, &remote_name)
        .await
        .unwrap_or_else(|err| panic!("sync failed: {err}"));

    println!(
        "requested {} block(s); server acknowledged: {}",
        outcome.requested_blocks, outcome.acknowledged
    );
    Ok(())
}
