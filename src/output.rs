use std::io::{self, Write};

use serde::Serialize;

use crate::app::{FetchResult, InitResult, LoadResult, ProgressEvent, ProgressSink};
use crate::audit::AuditReport;
use crate::reconcile::Action;

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Text,
    Json,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_fetch(result: &FetchResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_load(result: &LoadResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_audit(report: &AuditReport) -> io::Result<()> {
        Self::print_json(report)
    }

    pub fn print_init(result: &InitResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

pub struct TextOutput;

impl TextOutput {
    pub fn print_fetch(result: &FetchResult) {
        println!("{CYAN}KIRA panelsync fetch{RESET}");
        println!("{GREEN}panels fetched: {}{RESET}", result.panels);
        println!(
            "{GREEN}identifier file: {} ({} lines){RESET}",
            result.identifier_file, result.identifier_lines
        );
        println!(
            "{GREEN}symbol file:     {} ({} lines){RESET}",
            result.symbol_file, result.symbol_lines
        );
    }

    pub fn print_load(result: &LoadResult) {
        println!("{CYAN}KIRA panelsync load{RESET}");
        if result.category.created {
            println!("{YELLOW}created version category #{}{RESET}", result.category.id);
        }
        if !result.versions_registered.is_empty() {
            let versions = result
                .versions_registered
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            println!("{YELLOW}registered versions: {versions}{RESET}");
        }
        println!(
            "{GREEN}records: {} inserted: {} skipped: {}{RESET}",
            result.records, result.inserted, result.skipped
        );
        for action in &result.actions {
            if let Action::InsertNew(insert) = action {
                let superseded = insert
                    .superseded
                    .as_ref()
                    .map(|version| format!(", supersedes {version}"))
                    .unwrap_or_default();
                println!(
                    "{CYAN}  {} {} genes={} curated={}{superseded}{RESET}",
                    insert.panel_code,
                    insert.label,
                    insert.genes.attached.len(),
                    insert.symbols.curated.len(),
                );
            }
        }
        for gene in &result.unresolved {
            println!("{RED}  unresolved {} in {}{RESET}", gene.symbol, gene.panel);
        }
    }

    pub fn print_audit(report: &AuditReport) {
        println!("{CYAN}KIRA panelsync audit{RESET}");
        println!(
            "{GREEN}panels checked: {} excluded: {}{RESET}",
            report.panels_checked, report.panels_excluded
        );
        if report.is_clean() {
            println!("{GREEN}no discrepancies{RESET}");
            return;
        }
        for discrepancy in &report.discrepancies {
            println!("{YELLOW}{}{RESET}", discrepancy.panel);
            for symbol in &discrepancy.missing_from_store {
                println!("  {symbol} not in db");
            }
            for symbol in &discrepancy.missing_from_catalog {
                println!("  {symbol} not in api");
            }
        }
    }

    pub fn print_init(result: &InitResult) {
        println!("{GREEN}schema ready in {}{RESET}", result.database);
    }
}

impl ProgressSink for TextOutput {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => eprintln!("[{:>6.1}s] {}", elapsed.as_secs_f64(), event.message),
            None => eprintln!("          {}", event.message),
        }
    }
}
