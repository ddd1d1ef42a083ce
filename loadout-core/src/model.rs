use std::collections::BTreeMap;

pub type MenuId = String;
pub type ItemId = String;

/// Rendering kind for a checklist column. Closed set: the view model matches
/// on this exhaustively instead of branching on a type string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    /// Static text from the catalog.
    Text,
    /// Single choice from an enumerated option list; the selection is
    /// persisted as a per-item override.
    Select { options: Vec<String> },
    /// Free-text override field.
    Input,
}

impl ColumnKind {
    pub fn is_editable(&self) -> bool {
        !matches!(self, ColumnKind::Text)
    }
}

#[derive(Clone, Debug)]
pub struct Column {
    pub key: String,
    pub label: String,
    pub kind: ColumnKind,
    /// Whether the column is shown in the constrained (compact) layout.
    pub mobile_default: bool,
}

/// Rarity tag carried by some catalog items. Unknown tags normalize to none.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

impl Rarity {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.to_lowercase().as_str() {
            "common" => Some(Rarity::Common),
            "uncommon" => Some(Rarity::Uncommon),
            "rare" => Some(Rarity::Rare),
            "legendary" => Some(Rarity::Legendary),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Legendary => "legendary",
        }
    }
}

/// One catalog entry. Immutable after load; all user state lives in the
/// key-value store, keyed by `id`.
#[derive(Clone, Debug, Default)]
pub struct CatalogItem {
    pub id: ItemId,
    pub name: Option<String>,
    pub label: Option<String>,
    pub desc: Option<String>,
    pub rarity: Option<String>,
    /// Category-specific attributes, normalized to display strings.
    pub attrs: BTreeMap<String, String>,
}

impl CatalogItem {
    /// Display name: name, falling back to label then id.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.label.as_deref())
            .unwrap_or(&self.id)
    }

    /// Autocomplete label: label, falling back to name then id.
    pub fn suggest_label(&self) -> &str {
        self.label
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(&self.id)
    }

    pub fn rarity_tag(&self) -> Option<Rarity> {
        self.rarity.as_deref().and_then(Rarity::parse)
    }

    /// Static field value for a column key.
    pub fn field(&self, key: &str) -> Option<&str> {
        match key {
            "id" => Some(&self.id),
            "name" => self.name.as_deref(),
            "label" => self.label.as_deref(),
            "desc" => self.desc.as_deref(),
            "rarity" => self.rarity.as_deref(),
            _ => self.attrs.get(key).map(String::as_str),
        }
    }

    /// Concatenation of every static field value, lowercased, for the
    /// free-text filter.
    pub fn search_blob(&self) -> String {
        let mut parts: Vec<&str> = vec![&self.id];
        for opt in [&self.name, &self.label, &self.desc, &self.rarity] {
            if let Some(v) = opt {
                parts.push(v);
            }
        }
        parts.extend(self.attrs.values().map(String::as_str));
        parts.join(" ").to_lowercase()
    }

    pub fn matches_query(&self, query_lower: &str) -> bool {
        query_lower.is_empty() || self.search_blob().contains(query_lower)
    }
}

#[derive(Clone, Debug)]
pub struct Menu {
    pub id: MenuId,
    pub title: String,
    pub columns: Vec<Column>,
    pub items: Vec<CatalogItem>,
}

impl Menu {
    pub fn column(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.key == key)
    }
}

/// The normalized item catalog: created once at load, read-only thereafter.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub menus: Vec<Menu>,
}

impl Catalog {
    pub fn menu(&self, id: &str) -> Option<&Menu> {
        self.menus.iter().find(|m| m.id == id)
    }

    /// Reorder menus to follow `order`; ids not named keep their relative
    /// position after all named ones.
    pub fn reorder_menus(&mut self, order: &[String]) {
        let rank = |id: &str| {
            order
                .iter()
                .position(|o| o == id)
                .unwrap_or(usize::MAX)
        };
        self.menus.sort_by_key(|m| rank(&m.id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, name: Option<&str>, label: Option<&str>) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            name: name.map(str::to_string),
            label: label.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_display_name_fallback() {
        assert_eq!(item("x", Some("Alpha"), Some("L")).display_name(), "Alpha");
        assert_eq!(item("x", None, Some("L")).display_name(), "L");
        assert_eq!(item("x", None, None).display_name(), "x");
    }

    #[test]
    fn test_suggest_label_prefers_label() {
        assert_eq!(item("x", Some("Alpha"), Some("L")).suggest_label(), "L");
        assert_eq!(item("x", Some("Alpha"), None).suggest_label(), "Alpha");
    }

    #[test]
    fn test_search_blob_covers_attrs() {
        let mut it = item("serration", Some("Serration"), None);
        it.attrs.insert("polarity".into(), "Madurai".into());
        let blob = it.search_blob();
        assert!(blob.contains("serration"));
        assert!(blob.contains("madurai"));
        assert!(it.matches_query("madu"));
        assert!(!it.matches_query("vazarin"));
    }

    #[test]
    fn test_rarity_unknown_is_none() {
        let mut it = item("a", None, None);
        it.rarity = Some("Mythic".into());
        assert_eq!(it.rarity_tag(), None);
        it.rarity = Some("LEGENDARY".into());
        assert_eq!(it.rarity_tag(), Some(Rarity::Legendary));
    }

    #[test]
    fn test_reorder_menus_unknown_last() {
        let menu = |id: &str| Menu {
            id: id.into(),
            title: id.into(),
            columns: vec![],
            items: vec![],
        };
        let mut catalog = Catalog {
            menus: vec![menu("mods"), menu("primary"), menu("all")],
        };
        catalog.reorder_menus(&["all".into(), "primary".into()]);
        let ids: Vec<&str> = catalog.menus.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["all", "primary", "mods"]);
    }
}
