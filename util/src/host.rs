//! Host platform utility functions

use std::path::PathBuf;

/// Get the root directory of the software from the `BRACCIO_SW_ROOT`
/// environment variable.
///
/// Parameter files and session directories are resolved relative to this
/// root.
pub fn get_braccio_sw_root() -> Result<PathBuf, std::env::VarError> {
    Ok(PathBuf::from(std::env::var("BRACCIO_SW_ROOT")?))
}
