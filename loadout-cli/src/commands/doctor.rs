//! `loadout doctor` command - sanity-checks config, catalog, and storage

use std::path::Path;

use loadout_core::catalog;
use loadout_core::config::{ConfigError, LoadoutConfig};
use loadout_core::keys::KeySpace;
use loadout_core::store::FileStore;

#[derive(Debug)]
pub struct Check {
    pub name: String,
    pub passed: bool,
    pub message: String,
    pub hint: Option<String>,
}

impl Check {
    fn ok(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            message: message.into(),
            hint: None,
        }
    }

    fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            message: message.into(),
            hint: None,
        }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

pub fn run_doctor() -> Result<(), String> {
    println!("Loadout Doctor\n");

    let cwd =
        std::env::current_dir().map_err(|e| format!("Failed to get current directory: {}", e))?;

    let mut checks: Vec<Check> = Vec::new();

    let config = match LoadoutConfig::discover(&cwd) {
        Ok((path, config)) => {
            checks.push(Check::ok("config", format!("{}", path.display())));
            config
        }
        Err(ConfigError::NotFound { .. }) => {
            checks.push(
                Check::ok("config", "not found, using defaults")
                    .with_hint("Run `loadout init` to create one"),
            );
            LoadoutConfig::default()
        }
        Err(e) => {
            checks.push(Check::fail("config", e.to_string()));
            LoadoutConfig::default()
        }
    };

    checks.push(check_catalog(&config.catalog));
    checks.push(check_storage(&config));

    println!("Checks:");
    for check in &checks {
        print_check(check);
    }
    println!();

    let failed: Vec<_> = checks.iter().filter(|c| !c.passed).collect();
    if failed.is_empty() {
        println!("All checks passed!");
    } else {
        println!("Issues found:");
        for check in &failed {
            println!("  - {}: {}", check.name, check.message);
            if let Some(hint) = &check.hint {
                println!("    Hint: {}", hint);
            }
        }
    }

    Ok(())
}

fn print_check(check: &Check) {
    let icon = if check.passed { "✓" } else { "✗" };
    let color = if check.passed { "\x1b[32m" } else { "\x1b[31m" };
    let reset = "\x1b[0m";

    println!(
        "  {}{}{} {}: {}",
        color, icon, reset, check.name, check.message
    );

    if let Some(hint) = &check.hint {
        println!("    └─ {}", hint);
    }
}

fn check_catalog(path: &Path) -> Check {
    if !path.exists() {
        return Check::fail("catalog", format!("{} not found", path.display()))
            .with_hint("Run `loadout init` to create a sample catalog");
    }

    match catalog::load(path) {
        Ok(catalog) => {
            let items: usize = catalog.menus.iter().map(|m| m.items.len()).sum();
            Check::ok(
                "catalog",
                format!("{} menu(s), {} item(s)", catalog.menus.len(), items),
            )
        }
        Err(e) => Check::fail("catalog", e.to_string()),
    }
}

fn check_storage(config: &LoadoutConfig) -> Check {
    match FileStore::open(&config.storage) {
        Ok(store) => {
            let keys = KeySpace::new(&config.namespace);
            let owned = loadout_core::transfer::export(&store, &keys).len();
            Check::ok(
                "storage",
                format!("{} ({} key(s))", config.storage.display(), owned),
            )
        }
        Err(e) => Check::fail("storage", e.to_string())
            .with_hint("Fix or remove the store file; a missing file is recreated on first write"),
    }
}
