use std::path::Path;

use crate::error::{GuardError, Result};

/// Environment toggle that disables [`check_input_path`].
pub const ALLOW_UNSAFE_PATHS_ENV: &str = "SWAGGER_GUARD_ALLOW_ABS_PATH";

/// Reject absolute input paths and anything containing `..`.
///
/// Runs before the document is read, so a rejected path is never opened.
pub fn check_input_path(path: &Path, allow_unsafe: bool) -> Result<()> {
    if allow_unsafe {
        return Ok(());
    }
    if path.is_absolute() {
        return Err(GuardError::Input(format!(
            "absolute paths are not allowed: {} (set {}=1 to override)",
            path.display(),
            ALLOW_UNSAFE_PATHS_ENV
        )));
    }
    if path.to_string_lossy().contains("..") {
        return Err(GuardError::Input(format!(
            "path traversal is not allowed: {}",
            path.display()
        )));
    }
    Ok(())
}
