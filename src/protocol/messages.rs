//! The ASCII line grammar and fixed binary frames of spec section 6.
//!
//! Header lines are plain ASCII, space-separated, LF-terminated. Number
//! parsing deliberately goes through [`str::parse`] on ASCII digit slices —
//! never a locale-sensitive formatter — per the Design Notes in spec
//! section 9.

use crate::error::SyncError;
use crate::wire::MAX_PATH_LEN;

/// A parsed `AWAIT_HEADER` line (spec section 4.3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Header {
    /// `FILE_HDR <basename> <filesize> <nblocks>`
    FileHdr { name: String, filesize: u64, nblocks: u64 },
    /// `FILE_GET <basename>` — external collaborator; recognized here only
    /// so the state machine does not mistake it for a protocol violation.
    FileGet { name: String },
}

/// Strips any directory prefix up to and including the last `/`
/// (spec section 6: "The server parses `basename`... by stripping any
/// directory prefix up to and including the last `/`").
pub fn basename(raw: &str) -> &str {
    match raw.rfind('/') {
        Some(idx) => &raw[idx + 1..],
        None => raw,
    }
}

/// Parses one already-dechomped header line.
pub fn parse_header_line(line: &str) -> Result<Header, SyncError> {
    let mut parts = line.split(' ');
    let tag = parts.next().unwrap_or("");
    match tag {
        "FILE_HDR" => {
            let raw_name = parts.next().ok_or_else(|| bad("FILE_HDR missing name"))?;
            let filesize: u64 = parts
                .next()
                .ok_or_else(|| bad("FILE_HDR missing filesize"))?
                .parse()
                .map_err(|_| bad("FILE_HDR filesize not a number"))?;
            let nblocks: u64 = parts
                .next()
                .ok_or_else(|| bad("FILE_HDR missing nblocks"))?
                .parse()
                .map_err(|_| bad("FILE_HDR nblocks not a number"))?;
            if parts.next().is_some() {
                return Err(bad("FILE_HDR has trailing tokens"));
            }
            let name = basename(raw_name);
            if name.is_empty() || name.len() > MAX_PATH_LEN {
                return Err(bad("FILE_HDR name out of bounds"));
            }
            Ok(Header::FileHdr { name: name.to_string(), filesize, nblocks })
        }
        "FILE_GET" => {
            let raw_name = parts.next().ok_or_else(|| bad("FILE_GET missing name"))?;
            if parts.next().is_some() {
                return Err(bad("FILE_GET has trailing tokens"));
            }
            Ok(Header::FileGet { name: basename(raw_name).to_string() })
        }
        _ => Err(bad("unrecognized header line")),
    }
}

/// Formats the `FILE_HDR` request line the client sends (spec section 4.4
/// step 3).
pub fn format_file_hdr(name: &str, filesize: u64, nblocks: u64) -> String {
    format!("FILE_HDR {name} {filesize} {nblocks}\n")
}

/// Formats the two-line `BLOCK_REQ` reply (spec section 4.3 SEND_REQ).
/// When `indices` is empty a bare newline is still sent for the second line.
pub fn format_block_req(indices: &[u64]) -> String {
    let mut out = format!("BLOCK_REQ {}\n", indices.len());
    for idx in indices {
        out.push_str(&idx.to_string());
        out.push(' ');
    }
    out.push('\n');
    out
}

/// Parses the `BLOCK_REQ <count>` line, returning the declared count.
pub fn parse_block_req_count(line: &str) -> Result<usize, SyncError> {
    let mut parts = line.split(' ');
    if parts.next() != Some("BLOCK_REQ") {
        return Err(bad("expected BLOCK_REQ"));
    }
    let count: usize = parts
        .next()
        .ok_or_else(|| bad("BLOCK_REQ missing count"))?
        .parse()
        .map_err(|_| bad("BLOCK_REQ count not a number"))?;
    Ok(count)
}

/// Parses the second `BLOCK_REQ` line: `count` space-separated indices.
pub fn parse_block_req_indices(line: &str, count: usize) -> Result<Vec<u64>, SyncError> {
    let indices: Result<Vec<u64>, _> = line
        .split(' ')
        .filter(|tok| !tok.is_empty())
        .map(|tok| tok.parse::<u64>().map_err(|_| bad("BLOCK_REQ index not a number")))
        .collect();
    let indices = indices?;
    if indices.len() != count {
        return Err(bad("BLOCK_REQ index count mismatch"));
    }
    Ok(indices)
}

/// A parsed `BLOCK_DATA <idx> <clen> <olen>` header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockDataHeader {
    pub idx: u64,
    pub clen: usize,
    pub olen: usize,
}

/// The per-block header line the client sends, or [`None`] for `BLOCK_END`,
/// or [`Unknown`](BlockFrame::Unknown) for anything else (spec section 4.3:
/// "Any other line → log and skip").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockFrame {
    Data(BlockDataHeader),
    End,
    Unknown,
}

pub fn parse_block_frame_line(line: &str) -> BlockFrame {
    if line == "BLOCK_END" {
        return BlockFrame::End;
    }
    let mut parts = line.split(' ');
    if parts.next() != Some("BLOCK_DATA") {
        return BlockFrame::Unknown;
    }
    let Some(Ok(idx)) = parts.next().map(str::parse::<u64>) else {
        return BlockFrame::Unknown;
    };
    let Some(Ok(clen)) = parts.next().map(str::parse::<usize>) else {
        return BlockFrame::Unknown;
    };
    let Some(Ok(olen)) = parts.next().map(str::parse::<usize>) else {
        return BlockFrame::Unknown;
    };
    if parts.next().is_some() {
        return BlockFrame::Unknown;
    }
    BlockFrame::Data(BlockDataHeader { idx, clen, olen })
}

pub fn format_block_data(idx: u64, clen: usize, olen: usize) -> String {
    format!("BLOCK_DATA {idx} {clen} {olen}\n")
}

pub const BLOCK_END_LINE: &str = "BLOCK_END\n";
pub const FILE_OK_LINE: &str = "FILE_OK\n";

fn bad(msg: &str) -> SyncError {
    SyncError::ProtocolViolation(msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_file_hdr() {
        let got = parse_header_line("FILE_HDR foo.bin 2500 3").unwrap();
        assert_eq!(got, Header::FileHdr { name: "foo.bin".into(), filesize: 2500, nblocks: 3 });
    }

    #[test]
    fn file_hdr_strips_directory_prefix() {
        let got = parse_header_line("FILE_HDR a/b/foo.bin 0 1").unwrap();
        assert_eq!(got, Header::FileHdr { name: "foo.bin".into(), filesize: 0, nblocks: 1 });
    }

    #[test]
    fn parses_file_get() {
        let got = parse_header_line("FILE_GET foo.bin").unwrap();
        assert_eq!(got, Header::FileGet { name: "foo.bin".into() });
    }

    #[test]
    fn rejects_unrecognized_line() {
        assert!(parse_header_line("NONSENSE foo").is_err());
    }

    #[test]
    fn block_req_round_trips_nonempty() {
        let line = format_block_req(&[0, 1, 2]);
        let mut lines = line.lines();
        let count = parse_block_req_count(lines.next().unwrap()).unwrap();
        assert_eq!(count, 3);
        let indices = parse_block_req_indices(lines.next().unwrap(), count).unwrap();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn block_req_round_trips_empty() {
        let line = format_block_req(&[]);
        let mut lines = line.lines();
        let count = parse_block_req_count(lines.next().unwrap()).unwrap();
        assert_eq!(count, 0);
        let indices = parse_block_req_indices(lines.next().unwrap_or(""), count).unwrap();
        assert!(indices.is_empty());
    }

    #[test]
    fn parses_block_data_frame() {
        let frame = parse_block_frame_line("BLOCK_DATA 2 40 1024");
        assert_eq!(frame, BlockFrame::Data(BlockDataHeader { idx: 2, clen: 40, olen: 1024 }));
    }

    #[test]
    fn parses_block_end_frame() {
        assert_eq!(parse_block_frame_line("BLOCK_END"), BlockFrame::End);
    }

    #[test]
    fn unknown_frame_is_not_an_error() {
        assert_eq!(parse_block_frame_line("WHAT_IS_THIS"), BlockFrame::Unknown);
    }
}
