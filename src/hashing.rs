use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;

use crate::error::SkipReason;

/// Number of leading bytes hashed in the prefix stage
pub const PREFIX_LEN: usize = 1024;

/// Read buffer size for full-content hashing
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// BLAKE3 content digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest([u8; 32]);

impl Digest {
    pub fn to_hex(&self) -> String {
        blake3::Hash::from(self.0).to_hex().to_string()
    }
}

impl From<blake3::Hash> for Digest {
    fn from(hash: blake3::Hash) -> Self {
        Self(*hash.as_bytes())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Hash at most `prefix_len` leading bytes of a file.
pub fn prefix_digest(path: &Path, prefix_len: usize) -> Result<Digest, SkipReason> {
    let file = fs::File::open(path).map_err(|e| SkipReason::Open(e.kind()))?;

    let mut buffer = Vec::new();
    file.take(prefix_len as u64)
        .read_to_end(&mut buffer)
        .map_err(|e| SkipReason::Read(e.kind()))?;

    Ok(blake3::hash(&buffer).into())
}

/// Hash the whole file, reading `chunk_size` bytes at a time.
pub fn full_digest(path: &Path, chunk_size: usize) -> Result<Digest, SkipReason> {
    let mut file = fs::File::open(path).map_err(|e| SkipReason::Open(e.kind()))?;

    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0; chunk_size.max(1)];

    loop {
        let bytes_read = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(SkipReason::Read(e.kind())),
        };

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize().into())
}
