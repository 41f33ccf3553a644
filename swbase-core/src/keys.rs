//! Public-key material for the SSH pubkey block.

use std::fs;
use std::path::Path;

/// Supplies public-key material for the SSH pubkey block.
///
/// Failures are returned as a diagnostic string; the synthesizer turns them
/// into a warning comment rather than aborting.
pub trait KeySource {
    fn read_key(&self, path: &Path) -> Result<String, String>;
}

/// Reads keys from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsKeySource;

impl KeySource for FsKeySource {
    fn read_key(&self, path: &Path) -> Result<String, String> {
        let raw = fs::read_to_string(path).map_err(|err| format!("{}: {err}", path.display()))?;
        let key = raw.trim();
        if key.is_empty() {
            return Err(format!("{}: key file is empty", path.display()));
        }
        Ok(key.to_string())
    }
}
