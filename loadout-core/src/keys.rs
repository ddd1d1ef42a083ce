//! Typed persistence keys.
//!
//! Every stored value lives under `<namespace>:<scope>:<id>`. The original
//! wire format is kept byte-for-byte (default namespace `wf`, record lists
//! under their historical ids) so exported data stays interchangeable; the
//! typed constructor just makes accidental collisions impossible.

pub const DEFAULT_NAMESPACE: &str = "wf";

/// Scope segment of a persistence key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    /// Per-item checked flag.
    Checked,
    /// Per-item, per-column override value.
    Val,
    Todo,
    Wish,
    Build,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Checked => "checked",
            Scope::Val => "val",
            Scope::Todo => "todo",
            Scope::Wish => "wish",
            Scope::Build => "build",
        }
    }
}

/// A fully-qualified store key. Only constructible through [`KeySpace`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct StoreKey(String);

impl StoreKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key constructor bound to one namespace.
#[derive(Clone, Debug)]
pub struct KeySpace {
    namespace: String,
}

impl Default for KeySpace {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl KeySpace {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Prefix shared by every key in this namespace, trailing separator
    /// included.
    pub fn prefix(&self) -> String {
        format!("{}:", self.namespace)
    }

    /// Whether a raw key belongs to this namespace.
    pub fn owns(&self, raw: &str) -> bool {
        raw.starts_with(&self.prefix())
    }

    fn key(&self, scope: Scope, id: &str) -> StoreKey {
        StoreKey(format!("{}:{}:{}", self.namespace, scope.as_str(), id))
    }

    pub fn checked(&self, item_id: &str) -> StoreKey {
        self.key(Scope::Checked, item_id)
    }

    pub fn override_value(&self, item_id: &str, column_key: &str) -> StoreKey {
        self.key(Scope::Val, &format!("{}:{}", item_id, column_key))
    }

    pub fn todo_list(&self) -> StoreKey {
        self.key(Scope::Todo, "todo:list")
    }

    pub fn wish_list(&self) -> StoreKey {
        self.key(Scope::Wish, "wishlist:list")
    }

    pub fn build_list(&self) -> StoreKey {
        self.key(Scope::Build, "builds:list")
    }
}

/// Checked-state id for an item referenced by display name (build slots):
/// every whitespace run becomes a single underscore.
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_matches_original() {
        let keys = KeySpace::default();
        assert_eq!(keys.checked("soma").as_str(), "wf:checked:soma");
        assert_eq!(keys.override_value("soma", "rank").as_str(), "wf:val:soma:rank");
        assert_eq!(keys.todo_list().as_str(), "wf:todo:todo:list");
        assert_eq!(keys.wish_list().as_str(), "wf:wish:wishlist:list");
        assert_eq!(keys.build_list().as_str(), "wf:build:builds:list");
    }

    #[test]
    fn test_owns_requires_separator() {
        let keys = KeySpace::new("wf");
        assert!(keys.owns("wf:checked:x"));
        assert!(!keys.owns("wfx:checked:x"));
        assert!(!keys.owns("other:checked:x"));
    }

    #[test]
    fn test_slug_collapses_whitespace() {
        assert_eq!(slug("Primed Flow"), "Primed_Flow");
        assert_eq!(slug("a  b\tc"), "a_b_c");
        assert_eq!(slug("plain"), "plain");
    }
}
