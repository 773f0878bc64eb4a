//! `hubmatch doctor`: Diagnose system health.

use hubmatch_config::AppConfig;
use hubmatch_core::Category;
use hubmatch_resolver::AliasConfigStore;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 HubMatch Doctor: System Diagnostics");
    println!("======================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_path();
    let config = if config_path.exists() {
        match AppConfig::load() {
            Ok(config) => {
                println!("  ✅ Config file valid");
                Some(config)
            }
            Err(e) => {
                println!("  ❌ Config file invalid: {e}");
                issues += 1;
                None
            }
        }
    } else {
        println!("  ⚠️  No config file, defaults in use (run `hubmatch onboard`)");
        issues += 1;
        Some(AppConfig::default())
    };

    if let Some(config) = config {
        match config.alias_table() {
            Ok(table) => {
                let generic_collisions: Vec<&String> = config
                    .resolver
                    .policy
                    .generic_names
                    .iter()
                    .filter(|name| table.get(Category::DeviceName).contains_key(name.as_str()))
                    .collect();

                match AliasConfigStore::new(
                    table,
                    config.resolver.thresholds,
                    config.resolver.policy.clone(),
                ) {
                    Ok(store) => {
                        let snapshot = store.snapshot();
                        println!(
                            "  ✅ Alias table compiles ({} synonyms)",
                            snapshot.aliases.synonym_count()
                        );
                    }
                    Err(e) => {
                        println!("  ❌ Alias table rejected: {e}");
                        issues += 1;
                    }
                }

                for name in generic_collisions {
                    println!("  ⚠️  Device name alias '{name}' is also a generic name and will never pin one device");
                    issues += 1;
                }
            }
            Err(e) => {
                println!("  ❌ Alias table unreadable: {e}");
                issues += 1;
            }
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
