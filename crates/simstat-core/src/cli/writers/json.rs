use crate::errors::{Result, SimstatError};
use std::fs;
use std::path::Path;

pub trait JsonWrite {
    /// Writes serialized statistics to `path`, creating missing parent directories.
    fn write_json(&self, path: &Path) -> Result<()>;
}

impl JsonWrite for str {
    fn write_json(&self, path: &Path) -> Result<()> {
        let fail = |source| SimstatError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(fail)?;
        }
        fs::write(path, self).map_err(fail)
    }
}

impl JsonWrite for String {
    #[inline]
    fn write_json(&self, path: &Path) -> Result<()> {
        self.as_str().write_json(path)
    }
}
