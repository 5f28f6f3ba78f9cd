use std::collections::HashMap;
use std::sync::LazyLock;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use crate::domain::{PanelId, PanelTierKey, PanelVersion, Tier, panel_label, panel_tier_name};
use crate::error::KiraError;
use crate::fs_util::{read_text, write_text_atomic};
use crate::panelapp::CatalogPanel;

const IDENTIFIER_SUFFIX: &str = "_PanelAppOut.txt";
const SYMBOL_SUFFIX: &str = "_PanelAppOut_symbols.txt";
const MIN_IDENTIFIER_LEN: usize = 5;

static LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<id>[^_:]+)_(?P<name>[^_]+)_(?P<version>[^_]+)_(?P<tier>[A-Za-z]+)(?P<symbols>_symbols)?:(?P<list>\[.*\])\s*$",
    )
    .expect("snapshot line pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotGene {
    pub ensembl_ids: Vec<String>,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierGenes {
    pub tier: Tier,
    pub genes: Vec<SnapshotGene>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSnapshot {
    pub panel: CatalogPanel,
    pub tiers: Vec<TierGenes>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotFiles {
    pub identifiers: Utf8PathBuf,
    pub symbols: Utf8PathBuf,
}

impl SnapshotFiles {
    pub fn dated(dir: &Utf8Path, date: NaiveDate) -> Self {
        let stamp = date.format("%Y%m%d").to_string();
        Self {
            identifiers: dir.join(format!("{stamp}{IDENTIFIER_SUFFIX}")),
            symbols: dir.join(format!("{stamp}{SYMBOL_SUFFIX}")),
        }
    }

    pub fn today(dir: &Utf8Path) -> Self {
        Self::dated(dir, chrono::Local::now().date_naive())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SnapshotSummary {
    pub identifier_lines: usize,
    pub symbol_lines: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RecordHeader {
    pub panel_id: PanelId,
    pub name: String,
    pub version: PanelVersion,
    pub tier: Tier,
}

impl RecordHeader {
    pub fn key(&self) -> PanelTierKey {
        PanelTierKey::new(&self.panel_id, self.tier)
    }

    pub fn label(&self) -> String {
        panel_label(&self.name, self.tier, &self.version)
    }

    pub fn tier_name(&self) -> String {
        panel_tier_name(&self.name, self.tier)
    }

    fn prefix(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.panel_id, self.name, self.version, self.tier
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierRecord {
    pub header: RecordHeader,
    pub identifiers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRecord {
    pub header: RecordHeader,
    pub symbols: Vec<String>,
}

#[derive(Debug, Default)]
pub struct SymbolIndex {
    entries: HashMap<(PanelId, Tier, PanelVersion), Vec<String>>,
}

impl SymbolIndex {
    pub fn from_records(records: &[SymbolRecord]) -> Self {
        let entries = records
            .iter()
            .map(|record| {
                let header = &record.header;
                (
                    (header.panel_id.clone(), header.tier, header.version.clone()),
                    record.symbols.clone(),
                )
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, header: &RecordHeader) -> Option<&[String]> {
        self.entries
            .get(&(header.panel_id.clone(), header.tier, header.version.clone()))
            .map(Vec::as_slice)
    }
}

pub fn write_snapshot(
    files: &SnapshotFiles,
    panels: &[PanelSnapshot],
) -> Result<SnapshotSummary, KiraError> {
    let identifiers = render_identifier_lines(panels);
    let symbols = render_symbol_lines(panels);
    write_text_atomic(&files.identifiers, &identifiers)?;
    write_text_atomic(&files.symbols, &symbols)?;
    Ok(SnapshotSummary {
        identifier_lines: identifiers.lines().count(),
        symbol_lines: symbols.lines().count(),
    })
}

pub fn render_identifier_lines(panels: &[PanelSnapshot]) -> String {
    render_lines(panels, "", |gene| {
        // Multiple ids collapse into one quoted token: 'A','B'
        let token = format!("'{}'", gene.ensembl_ids.join("','"));
        format!("\"{token}\"")
    })
}

pub fn render_symbol_lines(panels: &[PanelSnapshot]) -> String {
    render_lines(panels, "_symbols", |gene| quote_item(&gene.symbol))
}

fn render_lines<F>(panels: &[PanelSnapshot], suffix: &str, render: F) -> String
where
    F: Fn(&SnapshotGene) -> String,
{
    let mut out = String::new();
    for snapshot in panels {
        for tier_genes in &snapshot.tiers {
            if tier_genes.genes.is_empty() {
                continue;
            }
            let header = RecordHeader {
                panel_id: snapshot.panel.id.clone(),
                name: snapshot.panel.name.clone(),
                version: snapshot.panel.version.clone(),
                tier: tier_genes.tier,
            };
            let items = tier_genes
                .genes
                .iter()
                .map(&render)
                .collect::<Vec<_>>()
                .join(", ");
            out.push_str(&format!("{}{suffix}:[{items}]\n", header.prefix()));
        }
    }
    out
}

fn quote_item(value: &str) -> String {
    if value.contains('\'') {
        format!("\"{value}\"")
    } else {
        format!("'{value}'")
    }
}

pub fn read_identifier_file(path: &Utf8Path) -> Result<Vec<IdentifierRecord>, KiraError> {
    parse_identifier_snapshot(&read_text(path)?)
}

pub fn read_symbol_file(path: &Utf8Path) -> Result<Vec<SymbolRecord>, KiraError> {
    parse_symbol_snapshot(&read_text(path)?)
}

pub fn parse_identifier_snapshot(text: &str) -> Result<Vec<IdentifierRecord>, KiraError> {
    let mut records = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let Some((header, is_symbols, list)) = parse_line(index + 1, line)? else {
            continue;
        };
        if is_symbols {
            return Err(KiraError::SnapshotParse {
                line: index + 1,
                message: "symbol line found in identifier file".to_string(),
            });
        }
        records.push(IdentifierRecord {
            header,
            identifiers: clean_identifiers(list),
        });
    }
    Ok(records)
}

pub fn parse_symbol_snapshot(text: &str) -> Result<Vec<SymbolRecord>, KiraError> {
    let mut records = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let Some((header, is_symbols, list)) = parse_line(index + 1, line)? else {
            continue;
        };
        if !is_symbols {
            return Err(KiraError::SnapshotParse {
                line: index + 1,
                message: "identifier line found in symbol file".to_string(),
            });
        }
        records.push(SymbolRecord {
            header,
            symbols: clean_symbols(list),
        });
    }
    Ok(records)
}

fn parse_line(number: usize, line: &str) -> Result<Option<(RecordHeader, bool, &str)>, KiraError> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    let parse_err = |message: String| KiraError::SnapshotParse {
        line: number,
        message,
    };
    let captures = LINE_RE
        .captures(line.trim_end())
        .ok_or_else(|| parse_err(format!("unrecognised line '{line}'")))?;

    let panel_id = captures["id"]
        .parse::<PanelId>()
        .map_err(|_| parse_err(format!("invalid panel id '{}'", &captures["id"])))?;
    let version = captures["version"]
        .parse::<PanelVersion>()
        .map_err(|err| parse_err(err.to_string()))?;
    let tier = captures["tier"]
        .parse::<Tier>()
        .map_err(|err| parse_err(err.to_string()))?;
    let header = RecordHeader {
        panel_id,
        name: captures["name"].to_string(),
        version,
        tier,
    };
    let list = captures.name("list").map(|m| m.as_str()).unwrap_or("[]");
    Ok(Some((header, captures.name("symbols").is_some(), list)))
}

fn split_list(list: &str) -> impl Iterator<Item = String> + '_ {
    list.split(',').map(|item| {
        item.chars()
            .filter(|ch| !matches!(ch, '[' | ']' | '"' | '\'') && !ch.is_whitespace())
            .collect::<String>()
    })
}

pub fn clean_identifiers(list: &str) -> Vec<String> {
    split_list(list)
        .filter(|id| id.len() >= MIN_IDENTIFIER_LEN)
        .collect()
}

pub fn clean_symbols(list: &str) -> Vec<String> {
    split_list(list).filter(|symbol| !symbol.is_empty()).collect()
}
