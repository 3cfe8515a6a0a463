//! Owner token export

use std::path::{Path, PathBuf};

use crate::errors::{Result, TtlinkError};

/// Write the owner UUID to `file_name` in the current working directory
///
/// Returns the full path of the written file.
pub fn save_token(uuid: &str, file_name: &str) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    save_token_in(&cwd, uuid, file_name)
}

/// Write the owner UUID to `file_name` inside `dir`
///
/// `file_name` must be a bare file name; paths are rejected.
pub fn save_token_in(dir: &Path, uuid: &str, file_name: &str) -> Result<PathBuf> {
    let file_name = file_name.trim();
    let is_bare = !file_name.is_empty()
        && Path::new(file_name).file_name().and_then(|f| f.to_str()) == Some(file_name);
    if !is_bare || file_name == "." || file_name == ".." {
        return Err(TtlinkError::invalid_input(format!(
            "token file must be a plain file name, got '{}'",
            file_name
        )));
    }

    let path = dir.join(file_name);
    std::fs::write(&path, format!("{}\n", uuid)).map_err(|e| {
        TtlinkError::file_operation(format!("Failed to write {}: {}", path.display(), e))
    })?;
    Ok(path)
}
