//! Catalog loading and normalization.
//!
//! The catalog document is loosely typed on the wire: column `mobileDefault`
//! may be a boolean or a `"true"/"false"` string, and item-list entries may be
//! bare id strings referencing an item defined inline elsewhere. Everything is
//! normalized here, once, into the read-only [`Catalog`] model.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::model::{Catalog, CatalogItem, Column, ColumnKind, Menu};

#[derive(Debug)]
pub enum CatalogError {
    Io(std::io::Error),
    Json(serde_json::Error),
    UnknownItemRef { menu: String, item: String },
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Json(e) => write!(f, "JSON parse error: {}", e),
            Self::UnknownItemRef { menu, item } => {
                write!(f, "menu '{}' references unknown item '{}'", menu, item)
            }
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        CatalogError::Io(e)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Json(e)
    }
}

/// Where the catalog document comes from. Fetched exactly once at startup;
/// a failure is terminal for the session (no retry).
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch(&self) -> Result<String, CatalogError>;
}

/// Catalog read from a local JSON file.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CatalogSource for FileSource {
    async fn fetch(&self) -> Result<String, CatalogError> {
        Ok(std::fs::read_to_string(&self.path)?)
    }
}

/// Fetch, parse, and normalize in one step.
pub async fn fetch_catalog(
    source: &dyn CatalogSource,
    menu_order: &[String],
) -> Result<Catalog, CatalogError> {
    let text = source.fetch().await?;
    let mut catalog = parse(&text)?;
    catalog.reorder_menus(menu_order);
    Ok(catalog)
}

// --- Raw wire format ---

#[derive(Deserialize)]
struct RawCatalog {
    #[serde(default)]
    menus: Vec<RawMenu>,
}

#[derive(Deserialize)]
struct RawMenu {
    id: String,
    title: String,
    #[serde(default)]
    columns: Vec<RawColumn>,
    #[serde(default)]
    items: Vec<RawEntry>,
}

#[derive(Deserialize)]
struct RawColumn {
    key: String,
    label: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default, rename = "mobileDefault")]
    mobile_default: Value,
}

/// Item-list entries are inline objects or bare id strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Reference(String),
    Inline(RawItem),
}

#[derive(Deserialize)]
struct RawItem {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    desc: Option<String>,
    #[serde(default)]
    rarity: Option<String>,
    #[serde(flatten)]
    attrs: BTreeMap<String, Value>,
}

/// `mobileDefault` arrives as a boolean or a case-insensitive `"true"/"false"`
/// string. Anything else counts as false.
fn normalize_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn attr_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn convert_item(raw: RawItem) -> CatalogItem {
    CatalogItem {
        id: raw.id,
        name: raw.name,
        label: raw.label,
        desc: raw.desc,
        rarity: raw.rarity,
        attrs: raw
            .attrs
            .into_iter()
            .map(|(k, v)| (k, attr_text(&v)))
            .collect(),
    }
}

fn convert_column(raw: RawColumn) -> Column {
    // Unknown type strings degrade to plain text, matching how the original
    // rendered anything it did not recognize.
    let kind = match raw.kind.as_str() {
        "select" => ColumnKind::Select {
            options: raw.options,
        },
        "input" => ColumnKind::Input,
        _ => ColumnKind::Text,
    };
    Column {
        key: raw.key,
        label: raw.label,
        kind,
        mobile_default: normalize_flag(&raw.mobile_default),
    }
}

enum Entry {
    Reference(String),
    Item(CatalogItem),
}

/// Parse and normalize a catalog document.
pub fn parse(text: &str) -> Result<Catalog, CatalogError> {
    let raw: RawCatalog = serde_json::from_str(text)?;

    let mut menus = Vec::with_capacity(raw.menus.len());
    let mut entries = Vec::with_capacity(raw.menus.len());
    for menu in raw.menus {
        entries.push(
            menu.items
                .into_iter()
                .map(|e| match e {
                    RawEntry::Reference(id) => Entry::Reference(id),
                    RawEntry::Inline(item) => Entry::Item(convert_item(item)),
                })
                .collect::<Vec<_>>(),
        );
        menus.push(Menu {
            id: menu.id,
            title: menu.title,
            columns: menu.columns.into_iter().map(convert_column).collect(),
            items: Vec::new(),
        });
    }

    // Dictionary of every inline item across all menus; bare id entries are
    // resolved against it. Later definitions win, as in the original.
    let mut dict: BTreeMap<&str, &CatalogItem> = BTreeMap::new();
    for menu_entries in &entries {
        for entry in menu_entries {
            if let Entry::Item(item) = entry {
                dict.insert(item.id.as_str(), item);
            }
        }
    }

    let mut resolved = Vec::with_capacity(entries.len());
    for (menu, menu_entries) in menus.iter().zip(&entries) {
        let mut items = Vec::with_capacity(menu_entries.len());
        for entry in menu_entries {
            match entry {
                Entry::Item(item) => items.push(item.clone()),
                // A clone, so edits to the resolved entry never reach the
                // dictionary original.
                Entry::Reference(id) => match dict.get(id.as_str()) {
                    Some(item) => items.push((*item).clone()),
                    None => {
                        return Err(CatalogError::UnknownItemRef {
                            menu: menu.id.clone(),
                            item: id.clone(),
                        });
                    }
                },
            }
        }
        resolved.push(items);
    }

    for (menu, items) in menus.iter_mut().zip(resolved) {
        menu.items = items;
    }

    Ok(Catalog { menus })
}

/// Synchronous load, used by the doctor command and tests.
pub fn load(path: &Path) -> Result<Catalog, CatalogError> {
    parse(&std::fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "menus": [
            {
                "id": "primary",
                "title": "Primary",
                "columns": [
                    {"key": "name", "label": "Name", "type": "text", "mobileDefault": "TRUE"},
                    {"key": "rank", "label": "Rank", "type": "select", "options": ["0", "50", "100"], "mobileDefault": "false"},
                    {"key": "note", "label": "Note", "type": "input", "mobileDefault": false},
                    {"key": "mastery", "label": "Mastery", "type": "sparkline"}
                ],
                "items": [
                    {"id": "soma", "name": "Soma", "mastery": 7},
                    {"id": "boltor", "name": "Boltor", "rarity": "rare"}
                ]
            },
            {
                "id": "kuva",
                "title": "Kuva",
                "columns": [],
                "items": ["soma"]
            }
        ]
    }"#;

    #[test]
    fn test_mobile_default_string_normalization() {
        let catalog = parse(SAMPLE).unwrap();
        let cols = &catalog.menus[0].columns;
        assert!(cols[0].mobile_default);
        assert!(!cols[1].mobile_default);
        assert!(!cols[2].mobile_default);
    }

    #[test]
    fn test_unknown_column_type_is_text() {
        let catalog = parse(SAMPLE).unwrap();
        assert_eq!(catalog.menus[0].columns[3].kind, ColumnKind::Text);
        assert_eq!(
            catalog.menus[0].columns[1].kind,
            ColumnKind::Select {
                options: vec!["0".into(), "50".into(), "100".into()]
            }
        );
    }

    #[test]
    fn test_bare_id_resolves_to_clone() {
        let catalog = parse(SAMPLE).unwrap();
        let kuva = &catalog.menus[1];
        assert_eq!(kuva.items.len(), 1);
        assert_eq!(kuva.items[0].name.as_deref(), Some("Soma"));
        // Numeric attr normalized to display text.
        assert_eq!(kuva.items[0].attrs.get("mastery").map(String::as_str), Some("7"));

        // Mutating the resolved copy must not reach the original.
        let mut catalog = catalog;
        catalog.menus[1].items[0].name = Some("Renamed".into());
        assert_eq!(catalog.menus[0].items[0].name.as_deref(), Some("Soma"));
    }

    #[test]
    fn test_unknown_item_ref_errors() {
        let text = r#"{"menus": [{"id": "m", "title": "M", "items": ["ghost"]}]}"#;
        let err = parse(text).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownItemRef { .. }));
    }

    #[test]
    fn test_malformed_document_errors() {
        assert!(matches!(parse("not json"), Err(CatalogError::Json(_))));
    }

    #[tokio::test]
    async fn test_fetch_catalog_missing_file() {
        let source = FileSource::new("/nonexistent/items.json");
        let err = fetch_catalog(&source, &[]).await.unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }
}
