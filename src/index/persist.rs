//! Durable snapshot format for the [`super::Registry`] (spec section 4.2).
//!
//! The format is a small fixed binary layout, little-endian throughout, that
//! embeds per entry: the filename bytes, the filesize, nblocks, and the raw
//! signature array — exactly what spec section 4.2 requires and nothing
//! more. `save` writes to a temporary file in the same directory and renames
//! it over the target so a reader never observes a torn snapshot.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::entry::FileEntry;
use super::registry::Registry;
use crate::error::{IndexError, IndexResult};
use crate::signature::Signature;
use crate::wire::SIG_WIRE_LEN;

const MAGIC: &[u8; 4] = b"DSX1";

/// Loads the registry from `path`. Returns an empty registry if the file
/// does not exist or is empty (spec section 4.2).
pub fn load(path: &Path) -> IndexResult<Registry> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Registry::new()),
        Err(err) => return Err(IndexError::IoError(err)),
    };
    if bytes.is_empty() {
        return Ok(Registry::new());
    }
    decode(&bytes).map_err(|err| IndexError::CorruptIndex(err.to_string()))
}

/// Atomically rewrites `path` with a snapshot of `registry`: write-temp,
/// flush, rename-over-target.
pub fn save(path: &Path, registry: &Registry) -> IndexResult<()> {
    let bytes = encode(registry);
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;
    let tmp_path = dir.join(format!(
        ".{}.tmp",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("index")
    ));
    {
        let mut tmp = fs::File::create(&tmp_path)?;
        tmp.write_all(&bytes)?;
        tmp.flush()?;
        tmp.sync_all()?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}

fn encode(registry: &Registry) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(MAGIC);
    out.write_u32::<LittleEndian>(registry.len() as u32).expect("write to Vec cannot fail");
    for entry in registry.iter() {
        let name_bytes = entry.filename.as_bytes();
        out.write_u16::<LittleEndian>(name_bytes.len() as u16).unwrap();
        out.extend_from_slice(name_bytes);
        out.write_u64::<LittleEndian>(entry.filesize).unwrap();
        out.write_u64::<LittleEndian>(entry.nblocks).unwrap();
        for sig in &entry.sigs {
            out.extend_from_slice(&sig.to_wire());
        }
    }
    out
}

fn decode(bytes: &[u8]) -> io::Result<Registry> {
    let mut cursor = io::Cursor::new(bytes);
    let mut magic = [0u8; 4];
    cursor.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "bad magic"));
    }
    let count = cursor.read_u32::<LittleEndian>()?;
    let mut registry = Registry::new();
    for _ in 0..count {
        let name_len = cursor.read_u16::<LittleEndian>()? as usize;
        let mut name_bytes = vec![0u8; name_len];
        cursor.read_exact(&mut name_bytes)?;
        let filename = String::from_utf8(name_bytes)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        let filesize = cursor.read_u64::<LittleEndian>()?;
        let nblocks = cursor.read_u64::<LittleEndian>()?;
        let mut sigs = Vec::with_capacity(nblocks as usize);
        for _ in 0..nblocks {
            let mut buf = [0u8; SIG_WIRE_LEN];
            cursor.read_exact(&mut buf)?;
            sigs.push(Signature::from_wire(&buf));
        }
        registry.replace_or_add(FileEntry { filename, filesize, nblocks, sigs });
    }
    Ok(registry)
}
