use std::fs;
use std::io::Write;

use camino::Utf8Path;
use tempfile::Builder;

use crate::error::KiraError;

pub fn write_text_atomic(path: &Utf8Path, content: &str) -> Result<(), KiraError> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    fs::create_dir_all(parent.as_std_path())
        .map_err(|err| KiraError::Filesystem(format!("create {parent}: {err}")))?;
    let mut temp = Builder::new()
        .prefix("kira-panelsync")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| KiraError::Filesystem(err.to_string()))?;
    temp.write_all(content.as_bytes())
        .map_err(|err| KiraError::Filesystem(err.to_string()))?;
    temp.persist(path.as_std_path())
        .map_err(|err| KiraError::Filesystem(format!("persist {path}: {err}")))?;
    Ok(())
}

pub fn read_text(path: &Utf8Path) -> Result<String, KiraError> {
    fs::read_to_string(path.as_std_path())
        .map_err(|err| KiraError::Filesystem(format!("read {path}: {err}")))
}
