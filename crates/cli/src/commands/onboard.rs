//! `hubmatch onboard`: First-time setup.

use hubmatch_config::{AppConfig, DEFAULT_ALIASES_JSON};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = AppConfig::config_path();
    let alias_path = AppConfig::default_alias_path();

    println!("🏠 HubMatch: First-Time Setup");
    println!("==============================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if alias_path.exists() {
        println!("  Alias table exists: {}", alias_path.display());
    } else {
        std::fs::write(&alias_path, DEFAULT_ALIASES_JSON)?;
        println!("✅ Created aliases.json at: {}", alias_path.display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        let mut config = AppConfig::default();
        config.aliases.path = Some(alias_path.clone());
        std::fs::write(&config_path, toml::to_string_pretty(&config)?)?;
        println!("✅ Created config.toml at: {}", config_path.display());
        println!("\n📝 Next steps:");
        println!("   1. Add your own room and device synonyms to {}", alias_path.display());
        println!("   2. Run `hubmatch aliases validate` to check them for overlaps");
        println!("   3. Pipe a payload into `hubmatch resolve --pretty`\n");
    }

    Ok(())
}
