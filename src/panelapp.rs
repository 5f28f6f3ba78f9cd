use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::config::CatalogSettings;
use crate::domain::{PanelId, PanelVersion, sanitize_panel_name};
use crate::error::KiraError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPanel {
    pub id: PanelId,
    pub name: String,
    pub version: PanelVersion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogGene {
    pub ensembl_ids: Vec<String>,
    pub symbol: String,
    pub confidence: String,
}

pub trait CatalogClient: Send + Sync {
    fn list_panels(&self) -> Result<Vec<CatalogPanel>, KiraError>;
    fn panel_genes(&self, panel_id: &PanelId) -> Result<Vec<CatalogGene>, KiraError>;
}

#[derive(Clone)]
pub struct PanelAppHttpClient {
    client: Client,
    settings: CatalogSettings,
}

impl PanelAppHttpClient {
    pub fn new(settings: CatalogSettings) -> Result<Self, KiraError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("kira-panelsync/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| KiraError::CatalogHttp(err.to_string()))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|err| KiraError::CatalogHttp(err.to_string()))?;
        Ok(Self { client, settings })
    }

    fn get_text(&self, url: &str) -> Result<String, KiraError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| KiraError::CatalogHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "PanelApp request failed".to_string());
            return Err(KiraError::CatalogStatus { status, message });
        }
        response
            .text()
            .map_err(|err| KiraError::CatalogHttp(err.to_string()))
    }
}

impl CatalogClient for PanelAppHttpClient {
    fn list_panels(&self) -> Result<Vec<CatalogPanel>, KiraError> {
        let body = self.get_text(&self.settings.list_url)?;
        parse_panel_list(&body)
    }

    fn panel_genes(&self, panel_id: &PanelId) -> Result<Vec<CatalogGene>, KiraError> {
        let body = self.get_text(&self.settings.panel_url_for(panel_id.as_str()))?;
        parse_panel_genes(&body)
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    result: Vec<RawPanel>,
}

#[derive(Debug, Deserialize)]
struct RawPanel {
    #[serde(rename = "Panel_Id", deserialize_with = "scalar_string")]
    id: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "CurrentVersion", deserialize_with = "scalar_string")]
    version: String,
}

#[derive(Debug, Deserialize)]
struct PanelResponse {
    result: RawPanelDetail,
}

#[derive(Debug, Deserialize)]
struct RawPanelDetail {
    #[serde(rename = "Genes", default)]
    genes: Vec<RawGene>,
}

#[derive(Debug, Deserialize)]
struct RawGene {
    #[serde(rename = "EnsembleGeneIds", default)]
    ensembl_ids: Option<Vec<String>>,
    #[serde(rename = "GeneSymbol")]
    symbol: String,
    #[serde(rename = "LevelOfConfidence", default)]
    confidence: Option<String>,
}

fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(value) => Ok(value),
        Value::Number(value) => Ok(value.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, found {other}"
        ))),
    }
}

pub fn parse_panel_list(body: &str) -> Result<Vec<CatalogPanel>, KiraError> {
    let response: ListResponse =
        serde_json::from_str(body).map_err(|err| KiraError::CatalogDecode(err.to_string()))?;
    response
        .result
        .into_iter()
        .map(|raw| {
            let id = raw.id.parse::<PanelId>().map_err(|_| {
                KiraError::CatalogDecode(format!("unusable panel id '{}'", raw.id))
            })?;
            let name = sanitize_panel_name(&raw.name).ok_or_else(|| {
                KiraError::CatalogDecode(format!("unusable name for panel '{id}': {:?}", raw.name))
            })?;
            Ok(CatalogPanel {
                id,
                name,
                version: raw.version.parse()?,
            })
        })
        .collect()
}

pub fn parse_panel_genes(body: &str) -> Result<Vec<CatalogGene>, KiraError> {
    let response: PanelResponse =
        serde_json::from_str(body).map_err(|err| KiraError::CatalogDecode(err.to_string()))?;
    Ok(response
        .result
        .genes
        .into_iter()
        .map(|raw| CatalogGene {
            ensembl_ids: raw.ensembl_ids.unwrap_or_default(),
            symbol: raw.symbol.trim().to_string(),
            confidence: raw.confidence.unwrap_or_default(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_version_is_accepted() {
        let body = r#"{"result": [{"Panel_Id": "abc123", "Name": "Long_QT", "CurrentVersion": 1.2}]}"#;
        let panels = parse_panel_list(body).unwrap();
        assert_eq!(panels[0].name, "Long-QT");
        assert_eq!(panels[0].version.to_string(), "1.2");
    }
}
