//! Integration tests for lutlab crates.
//!
//! End-to-end exports through every codec, read back with the small
//! readers in [`decode`].

pub mod decode;

use sha2::{Digest, Sha256};
use std::path::Path;

/// SHA-256 of a file, as lowercase hex.
pub fn file_digest(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}
