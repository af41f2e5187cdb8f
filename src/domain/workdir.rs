use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use super::error::ConversionError;

/// Working directory of a set of compose files.
///
/// Only the first file is taken into account. A relative path is resolved
/// against the current directory of the process.
pub fn compose_file_dir(files: &[PathBuf]) -> Result<PathBuf, ConversionError> {
    let first = files.first().ok_or_else(|| {
        ConversionError::io(
            "resolving compose file directory",
            io::Error::new(io::ErrorKind::InvalidInput, "no compose file given"),
        )
    })?;

    let file = if first.is_absolute() {
        first.clone()
    } else {
        std::env::current_dir()
            .map_err(|e| ConversionError::io("reading current directory", e))?
            .join(first)
    };

    let dir = file
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            ConversionError::io(
                "resolving compose file directory",
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} has no parent directory", file.display()),
                ),
            )
        })?;
    debug!("Compose file dir: {}", dir.display());
    Ok(dir)
}
