use camino::Utf8Path;
use rusqlite::{Connection, params};
use serde::Serialize;

use crate::error::KiraError;

pub const PANEL_TYPE_PANELAPP: i64 = 2;
const PANEL_CODE_PREFIX: &str = "Pan";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T> {
    Found(Vec<T>),
    NotFound,
}

impl<T> Selection<T> {
    pub fn from_rows(rows: Vec<T>) -> Self {
        if rows.is_empty() {
            Selection::NotFound
        } else {
            Selection::Found(rows)
        }
    }

    pub fn into_rows(self) -> Vec<T> {
        match self {
            Selection::Found(rows) => rows,
            Selection::NotFound => Vec::new(),
        }
    }

    pub fn first(self) -> Option<T> {
        self.into_rows().into_iter().next()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneTranslation {
    pub hgnc_id: String,
    pub symbol: String,
}

#[derive(Debug, Clone)]
pub struct NewPanelRecord<'a> {
    pub panel_item_id: i64,
    pub version_item_id: i64,
    pub label: &'a str,
    pub checker_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelRecordRow {
    pub id: i64,
    pub panel_item_id: i64,
    pub version_item_id: i64,
    pub label: String,
    pub panel_code: String,
    pub active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TranslationRow {
    pub hgnc_id: String,
    pub approved_symbol: Option<String>,
    pub ensembl_id: Option<String>,
    pub catalog_symbol: Option<String>,
    pub curated_symbol_check: Option<String>,
}

pub trait PanelStore {
    fn item_categories(&self) -> Result<Selection<String>, KiraError>;
    fn insert_item_category(&self, name: &str) -> Result<i64, KiraError>;
    fn item_category_id(&self, name: &str) -> Result<Selection<i64>, KiraError>;

    fn items_in_category(&self, category_id: i64) -> Result<Selection<String>, KiraError>;
    fn item_id(&self, item: &str, category_id: i64) -> Result<Selection<i64>, KiraError>;
    fn insert_item(&self, item: &str, category_id: i64) -> Result<i64, KiraError>;

    fn panel_versions(
        &self,
        panel_category: i64,
        version_category: i64,
    ) -> Result<Selection<(String, String)>, KiraError>;
    fn deactivate_panel_records(&self, panel_item_id: i64) -> Result<usize, KiraError>;
    fn insert_panel_record(&self, record: &NewPanelRecord<'_>) -> Result<i64, KiraError>;
    fn assign_panel_code(&self, record_id: i64) -> Result<String, KiraError>;

    fn translate_ensembl_id(
        &self,
        ensembl_id: &str,
    ) -> Result<Selection<GeneTranslation>, KiraError>;
    fn curated_symbols(&self) -> Result<Selection<String>, KiraError>;
    fn curated_hgnc_id(&self, symbol: &str) -> Result<Selection<String>, KiraError>;
    fn insert_panel_gene(
        &self,
        record_id: i64,
        gene: &GeneTranslation,
        checker_id: i64,
    ) -> Result<(), KiraError>;
    fn panel_record_symbols(&self, record_id: i64) -> Result<Selection<String>, KiraError>;
    fn panel_record_hgnc_ids(&self, record_id: i64) -> Result<Selection<String>, KiraError>;

    fn stored_catalog_symbols(&self, label: &str) -> Result<Selection<String>, KiraError>;
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Utf8Path) -> Result<Self, KiraError> {
        let conn = Connection::open(path.as_std_path())?;
        Self::configure(conn)
    }

    pub fn open_in_memory() -> Result<Self, KiraError> {
        Self::configure(Connection::open_in_memory()?)
    }

    fn configure(conn: Connection) -> Result<Self, KiraError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    pub fn ensure_schema(&self) -> Result<(), KiraError> {
        self.conn.execute_batch(
            "BEGIN;
            CREATE TABLE IF NOT EXISTS item_category (
                item_category_id INTEGER PRIMARY KEY AUTOINCREMENT,
                item_category TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS item (
                item_id INTEGER PRIMARY KEY AUTOINCREMENT,
                item TEXT NOT NULL,
                item_category_index1_id INTEGER
            );
            CREATE TABLE IF NOT EXISTS ngs_panel (
                ngs_panel_id INTEGER PRIMARY KEY AUTOINCREMENT,
                category INTEGER NOT NULL REFERENCES item(item_id),
                sub_category INTEGER NOT NULL REFERENCES item(item_id),
                panel TEXT NOT NULL,
                panel_code TEXT NOT NULL,
                active INTEGER NOT NULL,
                checker1 INTEGER,
                check_date TEXT,
                panel_type INTEGER
            );
            CREATE TABLE IF NOT EXISTS ngs_panel_genes (
                ngs_panel_genes_id INTEGER PRIMARY KEY AUTOINCREMENT,
                ngs_panel_id INTEGER NOT NULL REFERENCES ngs_panel(ngs_panel_id),
                hgnc_id TEXT NOT NULL,
                symbol TEXT NOT NULL,
                checker INTEGER,
                check_date TEXT
            );
            CREATE TABLE IF NOT EXISTS genes_hgnc_current_translation (
                hgnc_id TEXT NOT NULL,
                approved_symbol TEXT,
                ensembl_id_mapped TEXT,
                panelapp_symbol TEXT,
                panelapp_symbol_check TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_translation_ensembl
                ON genes_hgnc_current_translation(ensembl_id_mapped);
            CREATE INDEX IF NOT EXISTS idx_item_category
                ON item(item_category_index1_id, item);
            COMMIT;",
        )?;
        Ok(())
    }

    pub fn insert_translation(&self, row: &TranslationRow) -> Result<(), KiraError> {
        self.conn.execute(
            "INSERT INTO genes_hgnc_current_translation
                (hgnc_id, approved_symbol, ensembl_id_mapped, panelapp_symbol, panelapp_symbol_check)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                row.hgnc_id,
                row.approved_symbol,
                row.ensembl_id,
                row.catalog_symbol,
                row.curated_symbol_check,
            ],
        )?;
        Ok(())
    }

    pub fn panel_records(&self) -> Result<Vec<PanelRecordRow>, KiraError> {
        let mut stmt = self.conn.prepare(
            "SELECT ngs_panel_id, category, sub_category, panel, panel_code, active
             FROM ngs_panel ORDER BY ngs_panel_id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(PanelRecordRow {
                    id: row.get(0)?,
                    panel_item_id: row.get(1)?,
                    version_item_id: row.get(2)?,
                    label: row.get(3)?,
                    panel_code: row.get(4)?,
                    active: row.get::<_, i64>(5)? != 0,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn panel_gene_count(&self) -> Result<i64, KiraError> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM ngs_panel_genes", [], |row| row.get(0))?)
    }

    fn select_strings<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Selection<String>, KiraError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Selection::from_rows(rows))
    }

    fn select_ids<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Selection<i64>, KiraError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Selection::from_rows(rows))
    }
}

impl PanelStore for SqliteStore {
    fn item_categories(&self) -> Result<Selection<String>, KiraError> {
        self.select_strings("SELECT item_category FROM item_category", [])
    }

    fn insert_item_category(&self, name: &str) -> Result<i64, KiraError> {
        self.conn.execute(
            "INSERT INTO item_category (item_category) VALUES (?1)",
            params![name],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn item_category_id(&self, name: &str) -> Result<Selection<i64>, KiraError> {
        self.select_ids(
            "SELECT item_category_id FROM item_category WHERE item_category = ?1
             ORDER BY item_category_id",
            params![name],
        )
    }

    fn items_in_category(&self, category_id: i64) -> Result<Selection<String>, KiraError> {
        self.select_strings(
            "SELECT item FROM item WHERE item_category_index1_id = ?1 ORDER BY item_id",
            params![category_id],
        )
    }

    fn item_id(&self, item: &str, category_id: i64) -> Result<Selection<i64>, KiraError> {
        self.select_ids(
            "SELECT item_id FROM item WHERE item = ?1 AND item_category_index1_id = ?2
             ORDER BY item_id",
            params![item, category_id],
        )
    }

    fn insert_item(&self, item: &str, category_id: i64) -> Result<i64, KiraError> {
        self.conn.execute(
            "INSERT INTO item (item, item_category_index1_id) VALUES (?1, ?2)",
            params![item, category_id],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn panel_versions(
        &self,
        panel_category: i64,
        version_category: i64,
    ) -> Result<Selection<(String, String)>, KiraError> {
        let mut stmt = self.conn.prepare(
            "SELECT panel_item.item, version_item.item
             FROM ngs_panel
             JOIN item AS panel_item ON panel_item.item_id = ngs_panel.category
             JOIN item AS version_item ON version_item.item_id = ngs_panel.sub_category
             WHERE panel_item.item_category_index1_id = ?1
               AND version_item.item_category_index1_id = ?2
             ORDER BY ngs_panel.ngs_panel_id",
        )?;
        let rows = stmt
            .query_map(params![panel_category, version_category], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Selection::from_rows(rows))
    }

    fn deactivate_panel_records(&self, panel_item_id: i64) -> Result<usize, KiraError> {
        Ok(self.conn.execute(
            "UPDATE ngs_panel SET active = 0 WHERE category = ?1 AND active <> 0",
            params![panel_item_id],
        )?)
    }

    fn insert_panel_record(&self, record: &NewPanelRecord<'_>) -> Result<i64, KiraError> {
        self.conn.execute(
            "INSERT INTO ngs_panel
                (category, sub_category, panel, panel_code, active, checker1, check_date, panel_type)
             VALUES (?1, ?2, ?3, ?4, 1, ?5, CURRENT_TIMESTAMP, ?6)",
            params![
                record.panel_item_id,
                record.version_item_id,
                record.label,
                PANEL_CODE_PREFIX,
                record.checker_id,
                PANEL_TYPE_PANELAPP,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn assign_panel_code(&self, record_id: i64) -> Result<String, KiraError> {
        self.conn.execute(
            "UPDATE ngs_panel SET panel_code = panel_code || CAST(ngs_panel_id AS TEXT)
             WHERE ngs_panel_id = ?1",
            params![record_id],
        )?;
        Ok(self.conn.query_row(
            "SELECT panel_code FROM ngs_panel WHERE ngs_panel_id = ?1",
            params![record_id],
            |row| row.get(0),
        )?)
    }

    fn translate_ensembl_id(
        &self,
        ensembl_id: &str,
    ) -> Result<Selection<GeneTranslation>, KiraError> {
        let mut stmt = self.conn.prepare(
            "SELECT hgnc_id, COALESCE(panelapp_symbol, approved_symbol)
             FROM genes_hgnc_current_translation
             WHERE ensembl_id_mapped = ?1
               AND COALESCE(panelapp_symbol, approved_symbol) IS NOT NULL",
        )?;
        let rows = stmt
            .query_map(params![ensembl_id], |row| {
                Ok(GeneTranslation {
                    hgnc_id: row.get(0)?,
                    symbol: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Selection::from_rows(rows))
    }

    fn curated_symbols(&self) -> Result<Selection<String>, KiraError> {
        self.select_strings(
            "SELECT DISTINCT panelapp_symbol FROM genes_hgnc_current_translation
             WHERE panelapp_symbol_check IS NOT NULL AND panelapp_symbol IS NOT NULL",
            [],
        )
    }

    fn curated_hgnc_id(&self, symbol: &str) -> Result<Selection<String>, KiraError> {
        self.select_strings(
            "SELECT hgnc_id FROM genes_hgnc_current_translation
             WHERE panelapp_symbol = ?1
             ORDER BY panelapp_symbol_check IS NULL",
            params![symbol],
        )
    }

    fn insert_panel_gene(
        &self,
        record_id: i64,
        gene: &GeneTranslation,
        checker_id: i64,
    ) -> Result<(), KiraError> {
        self.conn.execute(
            "INSERT INTO ngs_panel_genes (ngs_panel_id, hgnc_id, symbol, checker, check_date)
             VALUES (?1, ?2, ?3, ?4, CURRENT_TIMESTAMP)",
            params![record_id, gene.hgnc_id, gene.symbol, checker_id],
        )?;
        Ok(())
    }

    fn panel_record_symbols(&self, record_id: i64) -> Result<Selection<String>, KiraError> {
        self.select_strings(
            "SELECT symbol FROM ngs_panel_genes WHERE ngs_panel_id = ?1",
            params![record_id],
        )
    }

    fn panel_record_hgnc_ids(&self, record_id: i64) -> Result<Selection<String>, KiraError> {
        self.select_strings(
            "SELECT hgnc_id FROM ngs_panel_genes WHERE ngs_panel_id = ?1",
            params![record_id],
        )
    }

    fn stored_catalog_symbols(&self, label: &str) -> Result<Selection<String>, KiraError> {
        self.select_strings(
            "SELECT DISTINCT translation.panelapp_symbol
             FROM ngs_panel
             JOIN ngs_panel_genes ON ngs_panel_genes.ngs_panel_id = ngs_panel.ngs_panel_id
             JOIN genes_hgnc_current_translation AS translation
                ON translation.hgnc_id = ngs_panel_genes.hgnc_id
             WHERE ngs_panel.panel = ?1 AND translation.panelapp_symbol IS NOT NULL",
            params![label],
        )
    }
}
