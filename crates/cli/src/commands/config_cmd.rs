//! `hubmatch config`: Configuration management commands.

use hubmatch_config::AppConfig;
use hubmatch_resolver::Normalizer;

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let mut warnings = Vec::new();

            let thresholds = &config.resolver.thresholds;
            if thresholds.room < thresholds.floor {
                warnings.push("Room threshold is below floor threshold; room collisions are the usual false positive");
            }

            let policy = &config.resolver.policy;
            if policy.disambiguation_gap == 0.0 {
                warnings.push("disambiguation_gap is 0; near-tied single-target matches are never flagged");
            }

            let alias_status = match config.alias_table() {
                Ok(table) => match Normalizer::new(&table) {
                    Ok(_) => format!("{} synonyms", table.synonym_count()),
                    Err(e) => {
                        println!("   ❌ Alias table error: {e}");
                        return Err(e.into());
                    }
                },
                Err(e) => {
                    println!("   ❌ Alias table error: {e}");
                    return Err(e.into());
                }
            };

            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            println!();
            println!(
                "   Thresholds: floor {:.2}  room {:.2}  type {:.2}  name {:.2}",
                thresholds.floor, thresholds.room, thresholds.device_type, thresholds.device_name
            );
            println!(
                "   Selection:  min confidence {:.2}, disambiguation gap {:.2}",
                policy.min_confidence, policy.disambiguation_gap
            );
            println!(
                "   Aliases:    {} ({alias_status})",
                config
                    .aliases
                    .path
                    .as_ref()
                    .map_or_else(|| "bundled".to_string(), |p| p.display().to_string())
            );
            println!("   Logging:    {:?}", config.logging.format);
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", AppConfig::config_path().display());
    Ok(())
}
