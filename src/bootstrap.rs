use std::collections::HashSet;

use serde::Serialize;
use tracing::info;

use crate::domain::PanelVersion;
use crate::error::KiraError;
use crate::snapshot::IdentifierRecord;
use crate::store::PanelStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryMarker {
    pub id: i64,
    pub created: bool,
}

pub fn ensure_category_marker<S: PanelStore + ?Sized>(
    store: &S,
    name: &str,
) -> Result<CategoryMarker, KiraError> {
    let existing = store.item_categories()?.into_rows();
    let created = if existing.iter().any(|category| category == name) {
        false
    } else {
        store.insert_item_category(name)?;
        info!(category = name, "item category created");
        true
    };

    let id = store
        .item_category_id(name)?
        .first()
        .ok_or_else(|| KiraError::MissingCategory(name.to_string()))?;
    Ok(CategoryMarker { id, created })
}

pub fn register_new_versions<S: PanelStore + ?Sized>(
    store: &S,
    category: &CategoryMarker,
    records: &[IdentifierRecord],
) -> Result<Vec<PanelVersion>, KiraError> {
    // Compared on the canonical text, which is what version lookups use.
    let mut known = store
        .items_in_category(category.id)?
        .into_rows()
        .into_iter()
        .collect::<HashSet<_>>();

    let mut inserted = Vec::new();
    for record in records {
        let version = &record.header.version;
        if known.insert(version.to_string()) {
            store.insert_item(&version.to_string(), category.id)?;
            inserted.push(version.clone());
        }
    }
    if !inserted.is_empty() {
        info!(count = inserted.len(), "panel versions registered");
    }
    Ok(inserted)
}
