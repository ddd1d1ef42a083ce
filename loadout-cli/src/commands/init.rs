//! `loadout init` command - writes a starter config and sample catalog

use std::fs;

use loadout_core::config::LoadoutConfig;

/// Run the init command
pub fn run_init(yes: bool) -> Result<(), String> {
    let cwd =
        std::env::current_dir().map_err(|e| format!("Failed to get current directory: {}", e))?;

    // Check if config already exists
    let config_names = [
        "loadout.yaml",
        "loadout.yml",
        ".loadout.yaml",
        ".loadout.yml",
    ];
    for name in &config_names {
        let path = cwd.join(name);
        if path.exists() {
            if !yes {
                return Err(format!(
                    "Config file {} already exists. Use --yes to overwrite.",
                    path.display()
                ));
            }
            println!("Overwriting existing config: {}", path.display());
        }
    }

    let config = LoadoutConfig::default();
    let yaml = generate_yaml(&config);

    let config_path = cwd.join("loadout.yaml");
    fs::write(&config_path, &yaml).map_err(|e| format!("Failed to write config: {}", e))?;
    println!("Created: {}", config_path.display());

    // Only seed the catalog when none exists; a real one should never be
    // clobbered by init.
    let catalog_path = cwd.join(&config.catalog);
    if catalog_path.exists() {
        println!("Catalog already present: {}", catalog_path.display());
    } else {
        fs::write(&catalog_path, SAMPLE_CATALOG)
            .map_err(|e| format!("Failed to write catalog: {}", e))?;
        println!("Created sample catalog: {}", catalog_path.display());
    }

    println!("\nNext steps:");
    println!("  1. Review and customize loadout.yaml");
    println!("  2. Replace {} with your item data", config.catalog.display());
    println!("  3. Run `loadout` to start the TUI");

    Ok(())
}

/// Generate YAML configuration text
fn generate_yaml(config: &LoadoutConfig) -> String {
    let mut yaml = String::new();

    yaml.push_str("# Loadout Configuration\n");
    yaml.push_str("# Generated by `loadout init`\n\n");

    yaml.push_str(&format!("title: \"{}\"\n", config.title));
    yaml.push_str(&format!("namespace: {}\n", config.namespace));
    yaml.push_str(&format!("catalog: {}\n", config.catalog.display()));
    yaml.push_str(&format!("storage: {}\n", config.storage.display()));
    yaml.push_str(&format!(
        "search_debounce_ms: {}\n\n",
        config.search_debounce_ms
    ));

    yaml.push_str("# Sidebar ordering; menus not listed here go last\n");
    yaml.push_str("menu_order:\n");
    for id in &config.menu_order {
        yaml.push_str(&format!("  - {}\n", id));
    }
    yaml.push('\n');

    yaml.push_str("# Menus left out of the combined search view\n");
    yaml.push_str("exclude_from_search:\n");
    for id in &config.exclude_from_search {
        yaml.push_str(&format!("  - {}\n", id));
    }

    yaml
}

const SAMPLE_CATALOG: &str = r#"{
  "menus": [
    {
      "id": "primary",
      "title": "Primary",
      "columns": [
        {"key": "name", "label": "Name", "type": "text", "mobileDefault": true},
        {"key": "rank", "label": "Rank", "type": "select", "options": ["0", "30", "40"], "mobileDefault": false},
        {"key": "note", "label": "Note", "type": "input", "mobileDefault": false}
      ],
      "items": [
        {"id": "braton", "name": "Braton", "desc": "Standard issue rifle.", "rank": "0"},
        {"id": "boltor", "name": "Boltor", "desc": "Fires bolts that pin targets.", "rank": "0"}
      ]
    },
    {
      "id": "mods",
      "title": "Mods",
      "columns": [
        {"key": "name", "label": "Name", "type": "text", "mobileDefault": true},
        {"key": "rarity", "label": "Rarity", "type": "text", "mobileDefault": false}
      ],
      "items": [
        {"id": "serration", "label": "Serration", "desc": "+Damage", "rarity": "uncommon"},
        {"id": "vigilante-armaments", "label": "Vigilante Armaments", "desc": "+Multishot", "rarity": "common"}
      ]
    }
  ]
}
"#;
