//! File I/O primitives with consistent error handling.

use crate::error::{Error, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Read file contents with standardized error handling.
pub fn read_file(path: &Path, operation: &str) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| Error::internal_io(e.to_string(), Some(operation.to_string())))
}

/// Write content to file with standardized error handling.
pub fn write_file(path: &Path, content: &str, operation: &str) -> Result<()> {
    fs::write(path, content)
        .map_err(|e| Error::internal_io(e.to_string(), Some(operation.to_string())))
}

/// Create `dir` (and missing ancestors) if absent.
///
/// Returns the directory when it had to be created, `None` when it already existed.
pub fn ensure_dir(dir: &Path) -> Result<Option<PathBuf>> {
    if dir.is_dir() {
        return Ok(None);
    }

    fs::create_dir_all(dir).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("create {}", dir.display())))
    })?;

    Ok(Some(dir.to_path_buf()))
}

/// Add execute permission for everyone who can read `path`. No-op off Unix.
pub fn make_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let context = || Some(format!("chmod +x {}", path.display()));
        let mut perms = fs::metadata(path)
            .map_err(|e| Error::internal_io(e.to_string(), context()))?
            .permissions();
        let mode = perms.mode();
        perms.set_mode(mode | ((mode & 0o444) >> 2));
        fs::set_permissions(path, perms)
            .map_err(|e| Error::internal_io(e.to_string(), context()))?;
    }
    #[cfg(not(unix))]
    let _ = path;

    Ok(())
}

/// Hex-encoded SHA-256 of `content`.
pub fn sha256_hex(content: &[u8]) -> String {
    format!("{:x}", Sha256::digest(content))
}

/// Whether a file or directory name is dot-prefixed.
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}
