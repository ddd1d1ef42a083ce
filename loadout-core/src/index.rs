//! Derived indexes built once after catalog load.
//!
//! [`AppState`] replaces the original's global mutable holder: it is
//! constructed once, treated as read-mostly, and any re-derivation goes
//! through [`AppState::rebuild`].

use crate::model::{Catalog, CatalogItem, Column, ColumnKind, Menu};

pub const SEARCH_ALL_ID: &str = "search_all";

/// Attribute key under which search-all rows carry their source category.
pub const CATEGORY_KEY: &str = "category";

#[derive(Clone, Debug)]
pub struct AppState {
    pub catalog: Catalog,
    /// Every item across all menus, in menu order; autocomplete and
    /// display-value lookups scan this linearly (catalog sizes are low
    /// hundreds).
    pub flat: Vec<CatalogItem>,
    /// Synthetic menu unioning every non-excluded menu, sorted by name.
    pub search_all: Menu,
}

impl AppState {
    pub fn build(catalog: Catalog, title: &str, exclude: &[String]) -> Self {
        let mut state = Self {
            catalog,
            flat: Vec::new(),
            search_all: Menu {
                id: SEARCH_ALL_ID.to_string(),
                title: title.to_string(),
                columns: Vec::new(),
                items: Vec::new(),
            },
        };
        state.rebuild(title, exclude);
        state
    }

    /// Re-derive the flat index and the search-all menu from the catalog.
    pub fn rebuild(&mut self, title: &str, exclude: &[String]) {
        self.flat = self
            .catalog
            .menus
            .iter()
            .flat_map(|m| m.items.iter().cloned())
            .collect();
        self.search_all = build_search_all(&self.catalog, title, exclude);
    }

    /// Autocomplete suggestions, one per catalog item.
    pub fn suggestions(&self) -> Vec<&str> {
        self.flat.iter().map(|it| it.suggest_label()).collect()
    }

    /// Resolve a display value back to its item (first match by label or
    /// name), e.g. to show the description for a build slot entry.
    pub fn find_by_display(&self, value: &str) -> Option<&CatalogItem> {
        self.flat
            .iter()
            .find(|it| it.label.as_deref() == Some(value) || it.name.as_deref() == Some(value))
    }
}

fn build_search_all(catalog: &Catalog, title: &str, exclude: &[String]) -> Menu {
    let mut items: Vec<CatalogItem> = Vec::new();
    for menu in catalog
        .menus
        .iter()
        .filter(|m| !exclude.contains(&m.id))
    {
        for item in &menu.items {
            let mut tagged = item.clone();
            tagged
                .attrs
                .insert(CATEGORY_KEY.to_string(), menu.title.clone());
            items.push(tagged);
        }
    }
    items.sort_by(|a, b| sort_key(a).cmp(sort_key(b)));

    Menu {
        id: SEARCH_ALL_ID.to_string(),
        title: title.to_string(),
        columns: vec![
            Column {
                key: "name".to_string(),
                label: "Name".to_string(),
                kind: ColumnKind::Text,
                mobile_default: true,
            },
            Column {
                key: CATEGORY_KEY.to_string(),
                label: "Category".to_string(),
                kind: ColumnKind::Text,
                mobile_default: true,
            },
        ],
        items,
    }
}

/// Display sort key: name, falling back to label then id.
fn sort_key(item: &CatalogItem) -> &str {
    item.name
        .as_deref()
        .or(item.label.as_deref())
        .unwrap_or(&item.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;

    fn sample_state() -> AppState {
        let text = r#"{
            "menus": [
                {
                    "id": "primary",
                    "title": "Primary",
                    "items": [
                        {"id": "soma", "name": "Soma"},
                        {"id": "boltor", "name": "Boltor", "desc": "Bolt rifle"}
                    ]
                },
                {
                    "id": "mods",
                    "title": "Mods",
                    "items": [{"id": "serration", "label": "Serration"}]
                },
                {
                    "id": "kuva",
                    "title": "Kuva",
                    "items": [{"id": "kuva-karak", "name": "Kuva Karak"}]
                }
            ]
        }"#;
        let catalog = catalog::parse(text).unwrap();
        AppState::build(catalog, "Item Tracker", &["kuva".to_string()])
    }

    #[test]
    fn test_flat_covers_all_menus() {
        let state = sample_state();
        assert_eq!(state.flat.len(), 4);
        assert_eq!(
            state.suggestions(),
            vec!["Soma", "Boltor", "Serration", "Kuva Karak"]
        );
    }

    #[test]
    fn test_search_all_excludes_and_tags() {
        let state = sample_state();
        let menu = &state.search_all;
        assert_eq!(menu.id, SEARCH_ALL_ID);
        assert_eq!(menu.items.len(), 3);
        assert!(menu.items.iter().all(|it| it.id != "kuva-karak"));
        let soma = menu.items.iter().find(|it| it.id == "soma").unwrap();
        assert_eq!(
            soma.attrs.get(CATEGORY_KEY).map(String::as_str),
            Some("Primary")
        );
    }

    #[test]
    fn test_search_all_sorted_by_display_name() {
        let state = sample_state();
        let names: Vec<&str> = state
            .search_all
            .items
            .iter()
            .map(|it| it.display_name())
            .collect();
        assert_eq!(names, vec!["Boltor", "Serration", "Soma"]);
    }

    #[test]
    fn test_find_by_display_matches_label_or_name() {
        let state = sample_state();
        assert_eq!(state.find_by_display("Serration").unwrap().id, "serration");
        assert_eq!(
            state.find_by_display("Boltor").unwrap().desc.as_deref(),
            Some("Bolt rifle")
        );
        assert!(state.find_by_display("Nikana").is_none());
    }
}
