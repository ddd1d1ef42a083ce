//! Checklist view model.
//!
//! [`visible_rows`] derives the filtered row set for one menu: items in
//! catalog order, each cell the user's override if one is stored, else the
//! catalog value. Filtering never re-sorts.

use serde_json::Value;

use crate::keys::KeySpace;
use crate::model::{CatalogItem, Column, ColumnKind, Menu, Rarity};
use crate::store::{self, KeyValueStore, StoreError};

/// Filter state for a checklist view.
#[derive(Clone, Debug)]
pub struct RowFilter {
    /// Case-insensitive substring match against every static field value.
    pub query: String,
    pub show_checked: bool,
    pub show_unchecked: bool,
    /// Detail level; only meaningful on constrained layouts.
    pub show_details: bool,
}

impl Default for RowFilter {
    fn default() -> Self {
        Self {
            query: String::new(),
            show_checked: true,
            show_unchecked: true,
            show_details: false,
        }
    }
}

/// One visible row, cells aligned with `menu.columns`.
#[derive(Clone, Debug)]
pub struct RenderRow {
    pub item_id: String,
    pub name: String,
    pub checked: bool,
    pub cells: Vec<String>,
    pub desc: Option<String>,
    pub rarity: Option<Rarity>,
}

/// Compute the visible rows for a menu under a filter.
///
/// Visibility is exactly `(checked ∧ show_checked) ∨ (¬checked ∧
/// show_unchecked)`, then the text query. Row order is catalog order.
pub fn visible_rows(
    menu: &Menu,
    filter: &RowFilter,
    keys: &KeySpace,
    store: &dyn KeyValueStore,
) -> Vec<RenderRow> {
    let query = filter.query.trim().to_lowercase();
    let mut rows = Vec::new();

    for item in &menu.items {
        let is_checked = checked(store, keys, &item.id);
        if (is_checked && !filter.show_checked) || (!is_checked && !filter.show_unchecked) {
            continue;
        }
        if !item.matches_query(&query) {
            continue;
        }

        rows.push(RenderRow {
            item_id: item.id.clone(),
            name: item.display_name().to_string(),
            checked: is_checked,
            cells: menu
                .columns
                .iter()
                .map(|col| cell_value(item, col, keys, store))
                .collect(),
            desc: item.desc.clone(),
            rarity: item.rarity_tag(),
        });
    }

    rows
}

/// Resolve one cell: override when the column is editable and one is stored,
/// else the static catalog value.
fn cell_value(
    item: &CatalogItem,
    column: &Column,
    keys: &KeySpace,
    store: &dyn KeyValueStore,
) -> String {
    let catalog_value = || item.field(&column.key).unwrap_or("").to_string();
    match &column.kind {
        ColumnKind::Text => catalog_value(),
        ColumnKind::Select { .. } | ColumnKind::Input => {
            match override_value(store, keys, &item.id, &column.key) {
                Some(v) => value_text(&v),
                None => catalog_value(),
            }
        }
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

pub fn checked(store: &dyn KeyValueStore, keys: &KeySpace, item_id: &str) -> bool {
    store::get_json(store, &keys.checked(item_id), false)
}

/// Persist a checked toggle immediately.
pub fn set_checked(
    store: &mut dyn KeyValueStore,
    keys: &KeySpace,
    item_id: &str,
    checked: bool,
) -> Result<(), StoreError> {
    store::set_json(store, &keys.checked(item_id), &checked)
}

pub fn override_value(
    store: &dyn KeyValueStore,
    keys: &KeySpace,
    item_id: &str,
    column_key: &str,
) -> Option<Value> {
    store
        .get(keys.override_value(item_id, column_key).as_str())
        .and_then(|raw| serde_json::from_str(&raw).ok())
}

/// Persist a per-column override under `(itemId, columnKey)`.
pub fn set_override(
    store: &mut dyn KeyValueStore,
    keys: &KeySpace,
    item_id: &str,
    column_key: &str,
    value: &Value,
) -> Result<(), StoreError> {
    store::set_json(store, &keys.override_value(item_id, column_key), value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::store::MemoryStore;

    fn sample_menu() -> Menu {
        let text = r#"{
            "menus": [{
                "id": "primary",
                "title": "Primary",
                "columns": [
                    {"key": "name", "label": "Name", "type": "text", "mobileDefault": true},
                    {"key": "rank", "label": "Rank", "type": "select", "options": ["0", "50"], "mobileDefault": false},
                    {"key": "note", "label": "Note", "type": "input", "mobileDefault": false}
                ],
                "items": [
                    {"id": "alpha", "name": "Alpha", "rank": "0"},
                    {"id": "beta", "name": "Beta", "rank": "0"}
                ]
            }]
        }"#;
        catalog::parse(text).unwrap().menus.remove(0)
    }

    #[test]
    fn test_visibility_matrix() {
        let menu = sample_menu();
        let keys = KeySpace::default();
        let mut store = MemoryStore::new();
        set_checked(&mut store, &keys, "beta", true).unwrap();

        let both = visible_rows(&menu, &RowFilter::default(), &keys, &store);
        let ids: Vec<&str> = both.iter().map(|r| r.item_id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "beta"]);

        let filter = RowFilter {
            show_unchecked: false,
            ..Default::default()
        };
        let only_checked = visible_rows(&menu, &filter, &keys, &store);
        assert_eq!(only_checked.len(), 1);
        assert_eq!(only_checked[0].item_id, "beta");

        let filter = RowFilter {
            show_checked: false,
            ..Default::default()
        };
        let only_unchecked = visible_rows(&menu, &filter, &keys, &store);
        assert_eq!(only_unchecked.len(), 1);
        assert_eq!(only_unchecked[0].item_id, "alpha");

        let filter = RowFilter {
            show_checked: false,
            show_unchecked: false,
            ..Default::default()
        };
        assert!(visible_rows(&menu, &filter, &keys, &store).is_empty());
    }

    #[test]
    fn test_query_is_case_insensitive_substring() {
        let menu = sample_menu();
        let keys = KeySpace::default();
        let store = MemoryStore::new();

        let filter = RowFilter {
            query: "alp".into(),
            ..Default::default()
        };
        let rows = visible_rows(&menu, &filter, &keys, &store);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Alpha");

        let filter = RowFilter {
            query: "  BET  ".into(),
            ..Default::default()
        };
        let rows = visible_rows(&menu, &filter, &keys, &store);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].item_id, "beta");
    }

    #[test]
    fn test_override_supersedes_catalog_value() {
        let menu = sample_menu();
        let keys = KeySpace::default();
        let mut store = MemoryStore::new();

        let rows = visible_rows(&menu, &RowFilter::default(), &keys, &store);
        assert_eq!(rows[0].cells, vec!["Alpha", "0", ""]);

        set_override(&mut store, &keys, "alpha", "rank", &Value::from(50)).unwrap();
        set_override(&mut store, &keys, "alpha", "note", &Value::from("riven")).unwrap();
        let rows = visible_rows(&menu, &RowFilter::default(), &keys, &store);
        assert_eq!(rows[0].cells, vec!["Alpha", "50", "riven"]);

        // The override is not searched; the static catalog value is.
        let filter = RowFilter {
            query: "riven".into(),
            ..Default::default()
        };
        assert!(visible_rows(&menu, &filter, &keys, &store).is_empty());
    }

    #[test]
    fn test_malformed_checked_value_reads_unchecked() {
        let menu = sample_menu();
        let keys = KeySpace::default();
        let mut store = MemoryStore::new();
        store
            .set(keys.checked("alpha").as_str(), "{oops".into())
            .unwrap();
        let rows = visible_rows(&menu, &RowFilter::default(), &keys, &store);
        assert!(!rows[0].checked);
    }
}
