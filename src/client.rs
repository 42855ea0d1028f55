//! The client-side sync mirror (spec section 4.4).

use std::num::NonZeroUsize;
use std::path::Path;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt, AsyncWrite, AsyncWriteExt};

use crate::compress::compress_block;
use crate::error::{Result, SyncError};
use crate::pool::Pool;
use crate::protocol::{self, FramedReader};
use crate::signature::{nblocks_for, signatures_for, Signature};
use crate::wire::BLOCK_SIZE;

/// Outcome of a client upload, reported back to whatever external
/// collaborator invoked it (spec section 7: "the client prints the count of
/// requested blocks and the server's final acknowledgement").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub requested_blocks: usize,
    pub acknowledged: bool,
}

/// Uploads `local_path` under `remote_name` over `stream`, following spec
/// section 4.4 steps 1-7.
///
/// Reads the file block-by-block through a one-buffer [`Pool`] rather than
/// loading it whole, so memory use stays bounded by `BLOCK_SIZE` regardless
/// of file size — the same scratch-buffer discipline `session::receive_blocks`
/// uses on the inbound side.
pub async fn upload_file<S>(stream: S, local_path: &Path, remote_name: &str) -> Result<UploadOutcome>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut file = tokio::fs::File::open(local_path).await.map_err(SyncError::Io)?;
    let filesize = file.metadata().await.map_err(SyncError::Io)?.len();
    let nblocks = nblocks_for(filesize, BLOCK_SIZE);

    let mut pool = Pool::new(NonZeroUsize::new(BLOCK_SIZE).unwrap(), NonZeroUsize::new(1).unwrap()).await;
    let sigs = signatures_over_file(&mut file, filesize, nblocks, &mut pool).await?;

    let mut framed = FramedReader::new(stream);
    framed
        .get_mut()
        .write_all(protocol::format_file_hdr(remote_name, filesize, nblocks).as_bytes())
        .await
        .map_err(SyncError::ShortWrite)?;
    for sig in &sigs {
        framed.get_mut().write_all(&sig.to_wire()).await.map_err(SyncError::ShortWrite)?;
    }

    let count_line = framed.read_line().await?;
    let count = protocol::parse_block_req_count(&count_line)?;
    let indices_line = framed.read_line().await?;
    let indices = protocol::parse_block_req_indices(&indices_line, count)?;

    for idx in &indices {
        send_block(&mut framed, &mut file, filesize, *idx, &mut pool).await?;
    }
    framed
        .get_mut()
        .write_all(protocol::BLOCK_END_LINE.as_bytes())
        .await
        .map_err(SyncError::ShortWrite)?;

    let ack = framed.read_line().await?;
    let acknowledged = ack == "FILE_OK";
    Ok(UploadOutcome { requested_blocks: indices.len(), acknowledged })
}

/// Length of block `idx` in a file of `filesize` bytes — `BLOCK_SIZE` for
/// every block but the last, which may be shorter (spec section 3).
fn block_len(idx: u64, filesize: u64) -> usize {
    if filesize == 0 {
        return 0;
    }
    let start = idx * BLOCK_SIZE as u64;
    (filesize - start).min(BLOCK_SIZE as u64) as usize
}

async fn signatures_over_file(
    file: &mut tokio::fs::File,
    filesize: u64,
    nblocks: u64,
    pool: &mut Pool,
) -> Result<Vec<Signature>> {
    let mut sigs = Vec::with_capacity(nblocks as usize);
    for idx in 0..nblocks {
        let len = block_len(idx, filesize);
        let mut buf = pool.checkout().await;
        file.seek(std::io::SeekFrom::Start(idx * BLOCK_SIZE as u64)).await.map_err(SyncError::Io)?;
        file.read_exact(&mut buf[..len]).await.map_err(SyncError::Io)?;
        sigs.push(Signature::of(&buf[..len]));
    }
    Ok(sigs)
}

async fn send_block<S>(
    framed: &mut FramedReader<S>,
    file: &mut tokio::fs::File,
    filesize: u64,
    idx: u64,
    pool: &mut Pool,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let len = block_len(idx, filesize);
    let mut buf = pool.checkout().await;
    file.seek(std::io::SeekFrom::Start(idx * BLOCK_SIZE as u64)).await.map_err(SyncError::Io)?;
    file.read_exact(&mut buf[..len]).await.map_err(SyncError::Io)?;
    let block = &buf[..len];

    // Always sent as a valid deflate stream, even when it does not shrink
    // the block (see DESIGN.md: the raw `clen == olen` fallback spec section
    // 4.4 allows is not used here, since the server has no way to tell a raw
    // payload apart from a compressed one without a dedicated marker, and a
    // deflate stream round-trips correctly regardless of how compressible
    // the input was).
    let compressed = compress_block(block).map_err(SyncError::Io)?;

    framed
        .get_mut()
        .write_all(protocol::format_block_data(idx, compressed.len(), block.len()).as_bytes())
        .await
        .map_err(SyncError::ShortWrite)?;
    framed.get_mut().write_all(&compressed).await.map_err(SyncError::ShortWrite)?;
    Ok(())
}

/// Computes the signature vector a local file would present to the server,
/// without performing any network I/O. Useful for tests and for operators
/// diagnosing a sync without contacting the server.
pub async fn local_signatures(path: &Path) -> Result<Vec<Signature>> {
    let data = tokio::fs::read(path).await.map_err(SyncError::Io)?;
    Ok(signatures_for(&data, BLOCK_SIZE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::stale_blocks;
    use crate::index::{FileEntry, Store};
    use crate::session::handle_connection;

    #[tokio::test]
    async fn uploads_against_a_real_session() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("source.bin");
        let content = vec![3u8; 2050];
        tokio::fs::write(&src, &content).await.unwrap();

        let sync_dir = dir.path().join("syncedData");
        let index = Store::open(dir.path().join("index.db")).unwrap();

        let (server_side, client_side) = tokio::io::duplex(1 << 16);
        let server = tokio::spawn(handle_connection(server_side, index.clone(), sync_dir.clone()));

        let outcome = upload_file(client_side, &src, "source.bin").await.unwrap();
        assert_eq!(outcome.requested_blocks, 3);
        assert!(outcome.acknowledged);

        server.await.unwrap().unwrap();
        let on_disk = tokio::fs::read(sync_dir.join("source.bin")).await.unwrap();
        assert_eq!(on_disk, content);
    }

    #[tokio::test]
    async fn second_upload_of_unchanged_file_requests_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("source.bin");
        let content = vec![1u8; 500];
        tokio::fs::write(&src, &content).await.unwrap();

        let sync_dir = dir.path().join("syncedData");
        let index = Store::open(dir.path().join("index.db")).unwrap();

        for _ in 0..2 {
            let (server_side, client_side) = tokio::io::duplex(1 << 16);
            let server =
                tokio::spawn(handle_connection(server_side, index.clone(), sync_dir.clone()));
            let outcome = upload_file(client_side, &src, "source.bin").await.unwrap();
            server.await.unwrap().unwrap();
            if outcome.requested_blocks == 0 {
                return;
            }
        }
        panic!("second upload of an unchanged file should have requested zero blocks");
    }

    #[tokio::test]
    async fn local_signatures_matches_diff_input() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.bin");
        tokio::fs::write(&src, b"some content").await.unwrap();
        let sigs = local_signatures(&src).await.unwrap();
        let entry = FileEntry::new("a.bin".into(), 12, sigs.clone());
        assert_eq!(stale_blocks(Some(&entry), &sigs), Vec::<u64>::new());
    }
}
