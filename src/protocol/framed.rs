//! A small buffered reader over an async stream that understands the
//! protocol's mix of LF-terminated text lines and fixed-length binary runs.
//!
//! Adapted from the teacher's `parser::read_buffer::CountBuffer`, but
//! stripped down: every binary run here has a length known up front (the
//! signature vector is `nblocks * SIG_WIRE_LEN` bytes, a block payload is
//! `clen` bytes), so there is no need for the teacher's double-buffered
//! retry-on-EOF machinery. What *is* kept is the core requirement from spec
//! section 4.3 AWAIT_HEADER: "the initial read is a bulk recv that MAY
//! return more bytes than the header line... any trailing bytes... MUST be
//! buffered and prepended to READ_SIGS."

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::SyncError;

/// Wraps an `AsyncRead` stream, carrying any bytes read past a line
/// boundary forward into the next binary read.
pub struct FramedReader<S> {
    stream: S,
    carry: Vec<u8>,
}

impl<S: AsyncRead + Unpin> FramedReader<S> {
    pub fn new(stream: S) -> Self {
        Self { stream, carry: Vec::new() }
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Reads one LF-terminated line (the LF is consumed but not included in
    /// the returned string). Any bytes read past the LF are kept for the
    /// next read (binary or line).
    pub async fn read_line(&mut self) -> Result<String, SyncError> {
        let mut line = Vec::new();
        loop {
            if let Some(pos) = self.carry.iter().position(|&b| b == b'\n') {
                line.extend_from_slice(&self.carry[..pos]);
                self.carry.drain(..=pos);
                return String::from_utf8(line)
                    .map_err(|_| SyncError::ProtocolViolation("header line is not UTF-8".into()));
            }
            line.append(&mut self.carry);
            self.carry.clear();

            let mut chunk = [0u8; 4096];
            let n = self
                .stream
                .read(&mut chunk)
                .await
                .map_err(SyncError::ShortRead)?;
            if n == 0 {
                return Err(SyncError::ShortRead(std::io::Error::from(
                    std::io::ErrorKind::UnexpectedEof,
                )));
            }
            self.carry.extend_from_slice(&chunk[..n]);
        }
    }

    /// Reads exactly `n` bytes, first draining any carried-over bytes from a
    /// preceding [`Self::read_line`] call.
    pub async fn read_exact_n(&mut self, n: usize) -> Result<Vec<u8>, SyncError> {
        let mut out = Vec::with_capacity(n);
        let from_carry = n.min(self.carry.len());
        out.extend(self.carry.drain(..from_carry));
        let remaining = n - out.len();
        if remaining > 0 {
            let mut buf = vec![0u8; remaining];
            self.stream.read_exact(&mut buf).await.map_err(SyncError::ShortRead)?;
            out.extend_from_slice(&buf);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn reads_a_single_line() {
        let mut r = FramedReader::new(Cursor::new(b"FILE_HDR a.bin 10 1\n".to_vec()));
        let line = r.read_line().await.unwrap();
        assert_eq!(line, "FILE_HDR a.bin 10 1");
    }

    #[tokio::test]
    async fn carries_trailing_bytes_past_the_newline() {
        let mut data = b"HDR\n".to_vec();
        let payload = [1u8, 2, 3, 4, 5];
        data.extend_from_slice(&payload);
        let mut r = FramedReader::new(Cursor::new(data));

        let line = r.read_line().await.unwrap();
        assert_eq!(line, "HDR");
        let got = r.read_exact_n(5).await.unwrap();
        assert_eq!(got, payload);
    }

    #[tokio::test]
    async fn read_exact_spans_carry_and_socket() {
        let mut data = b"H\n".to_vec();
        data.extend_from_slice(&[1, 2]);
        let mut r = FramedReader::new(Cursor::new(data));
        let _ = r.read_line().await.unwrap();
        // Only 2 bytes are available total; asking for more is a short read.
        assert!(r.read_exact_n(5).await.is_err());
    }

    #[tokio::test]
    async fn short_read_on_eof_before_newline() {
        let mut r = FramedReader::new(Cursor::new(b"no newline here".to_vec()));
        assert!(r.read_line().await.is_err());
    }
}
