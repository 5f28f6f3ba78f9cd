use std::fs;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::error::KiraError;

pub const DEFAULT_CONFIG_FILE: &str = "kira-panelsync.json";
pub const DEFAULT_LIST_URL: &str =
    "https://panelapp.genomicsengland.co.uk/WebServices/list_panels/?format=json";
pub const DEFAULT_PANEL_URL: &str =
    "https://panelapp.genomicsengland.co.uk/WebServices/get_panel/{id}/?format=json";
pub const DEFAULT_VERSION_CATEGORY: &str = "NGS Panel version";
pub const DEFAULT_PANEL_ITEM_CATEGORY: i64 = 48;
pub const DEFAULT_AUDIT_EXCLUSION: &str = "Mitochondrial disorders";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub catalog: Option<CatalogEntry>,
    #[serde(default)]
    pub output_dir: Option<Utf8PathBuf>,
    #[serde(default)]
    pub database: Option<Utf8PathBuf>,
    #[serde(default)]
    pub version_category: Option<String>,
    #[serde(default)]
    pub panel_item_category: Option<i64>,
    #[serde(default)]
    pub checker_id: Option<i64>,
    #[serde(default)]
    pub audit_exclusion_prefix: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CatalogEntry {
    #[serde(default)]
    pub list_url: Option<String>,
    #[serde(default)]
    pub panel_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct CatalogSettings {
    pub list_url: String,
    pub panel_url: String,
    pub timeout_secs: u64,
}

impl CatalogSettings {
    pub fn panel_url_for(&self, panel_id: &str) -> String {
        self.panel_url.replace("{id}", panel_id)
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub catalog: CatalogSettings,
    pub output_dir: Utf8PathBuf,
    pub database: Utf8PathBuf,
    pub version_category: String,
    pub panel_item_category: i64,
    pub checker_id: i64,
    pub audit_exclusion_prefix: String,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, KiraError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Self::resolve_config(Config::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| KiraError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| KiraError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, KiraError> {
        let schema_version = config.schema_version.unwrap_or(1);
        let catalog = config.catalog.unwrap_or_default();

        let panel_url = catalog
            .panel_url
            .unwrap_or_else(|| DEFAULT_PANEL_URL.to_string());
        if !panel_url.contains("{id}") {
            return Err(KiraError::ConfigParse(format!(
                "catalog.panel_url must contain an {{id}} placeholder: {panel_url}"
            )));
        }

        let output_dir = match config.output_dir {
            Some(dir) => dir,
            None => default_output_dir()?,
        };

        Ok(ResolvedConfig {
            schema_version,
            catalog: CatalogSettings {
                list_url: catalog
                    .list_url
                    .unwrap_or_else(|| DEFAULT_LIST_URL.to_string()),
                panel_url,
                timeout_secs: catalog.timeout_secs.unwrap_or(60),
            },
            output_dir,
            database: config
                .database
                .unwrap_or_else(|| Utf8PathBuf::from("moka.sqlite")),
            version_category: config
                .version_category
                .unwrap_or_else(|| DEFAULT_VERSION_CATEGORY.to_string()),
            panel_item_category: config
                .panel_item_category
                .unwrap_or(DEFAULT_PANEL_ITEM_CATEGORY),
            checker_id: config.checker_id.unwrap_or(0),
            audit_exclusion_prefix: config
                .audit_exclusion_prefix
                .unwrap_or_else(|| DEFAULT_AUDIT_EXCLUSION.to_string()),
        })
    }
}

pub fn default_output_dir() -> Result<Utf8PathBuf, KiraError> {
    BaseDirs::new()
        .and_then(|dirs| {
            Utf8PathBuf::from_path_buf(dirs.data_local_dir().join("kira-panelsync")).ok()
        })
        .ok_or_else(|| KiraError::Filesystem("unable to resolve output directory".to_string()))
}
