use crate::core::model::Fingerprint;
use md5::{Digest, Md5};
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

pub const BLOCK_SIZE: u64 = 64 * 1024;

#[derive(thiserror::Error, Debug)]
pub enum FingerprintError {
    #[error("open {path}: {source}")]
    Open { path: PathBuf, source: std::io::Error },

    #[error("{path} is {len} bytes, need at least {min} to fingerprint")]
    TooSmall { path: PathBuf, len: u64, min: u64 },

    #[error("read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
}

/// MD5 of the first 64KiB followed by the last 64KiB of the file.
///
/// Files shorter than two blocks are rejected rather than hashed over
/// overlapping ranges.
pub async fn fingerprint(path: &Path) -> Result<Fingerprint, FingerprintError> {
    let mut file = File::open(path).await.map_err(|source| FingerprintError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let read_err = |source| FingerprintError::Read { path: path.to_path_buf(), source };

    let len = file.metadata().await.map_err(read_err)?.len();
    if len < 2 * BLOCK_SIZE {
        return Err(FingerprintError::TooSmall {
            path: path.to_path_buf(),
            len,
            min: 2 * BLOCK_SIZE,
        });
    }

    let mut hasher = Md5::new();
    let mut block = vec![0u8; BLOCK_SIZE as usize];

    file.read_exact(&mut block).await.map_err(read_err)?;
    hasher.update(&block);

    file.seek(SeekFrom::End(-(BLOCK_SIZE as i64))).await.map_err(read_err)?;
    file.read_exact(&mut block).await.map_err(read_err)?;
    hasher.update(&block);

    Ok(Fingerprint::from_hex(hex::encode(hasher.finalize())))
}
