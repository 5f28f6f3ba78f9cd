use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum KiraError {
    #[error("invalid panel version: {0}")]
    InvalidVersion(String),

    #[error("invalid confidence tier: {0}")]
    InvalidTier(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("PanelApp request failed: {0}")]
    CatalogHttp(String),

    #[error("PanelApp returned status {status}: {message}")]
    CatalogStatus { status: u16, message: String },

    #[error("PanelApp response could not be decoded: {0}")]
    CatalogDecode(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("malformed snapshot line {line}: {message}")]
    #[diagnostic(help("snapshot lines look like <panelID>_<name>_<version>_<tier>:[...]"))]
    SnapshotParse { line: usize, message: String },

    #[error("database error: {0}")]
    Database(String),

    #[error("item category '{0}' could not be read back after insertion")]
    MissingCategory(String),

    #[error("version {0} is not registered in the item table")]
    MissingVersionItem(String),

    #[error("panel item {0} is indexed but has no item row")]
    MissingPanelItem(String),
}

impl From<rusqlite::Error> for KiraError {
    fn from(err: rusqlite::Error) -> Self {
        KiraError::Database(err.to_string())
    }
}
