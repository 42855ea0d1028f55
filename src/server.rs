//! The server accept loop (spec section 4.1), generalizing the teacher's
//! `handle_forever`/`process_socket` spawn-per-connection model onto
//! [`session::handle_connection`].

use tokio::net::{TcpListener, TcpStream};

use crate::config::Config;
use crate::index::Store;

/// Binds `config.tcp_port` and serves connections forever, spawning one
/// task per connection. Returns only on a listener bind/accept failure.
pub async fn serve(config: Config) -> std::io::Result<()> {
    let index = Store::open(config.index_path()).map_err(|err| {
        std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
    })?;
    let listener = TcpListener::bind(("0.0.0.0", config.tcp_port)).await?;
    tracing::info!(port = config.tcp_port, sync_dir = %config.sync_dir.display(), "listening");
    handle_forever(listener, index, config.sync_dir).await
}

/// Accepts connections from an already-bound `listener` forever.
pub async fn handle_forever(
    listener: TcpListener,
    index: Store,
    sync_dir: std::path::PathBuf,
) -> std::io::Result<()> {
    loop {
        let (socket, peer) = listener.accept().await?;
        socket.set_nodelay(true)?;
        let index = index.clone();
        let sync_dir = sync_dir.clone();
        tokio::spawn(async move {
            if let Err(err) = process_socket(socket, index, sync_dir).await {
                tracing::warn!(%peer, error = %err, "session aborted");
            }
        });
    }
}

async fn process_socket(
    socket: TcpStream,
    index: Store,
    sync_dir: std::path::PathBuf,
) -> crate::error::Result<()> {
    crate::session::handle_connection(socket, index, sync_dir).await
}
