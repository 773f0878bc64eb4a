//! `hubmatch aliases`: Alias table inspection.

use std::path::{Path, PathBuf};

use hubmatch_config::{AppConfig, ConfigError, load_alias_table};
use hubmatch_core::{AliasTable, Category};
use hubmatch_resolver::Normalizer;

pub async fn validate(file: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating alias table...");

    let table = load(file.as_deref())?;
    match Normalizer::new(&table) {
        Ok(normalizer) => {
            println!("   ✅ No overlapping synonyms");
            println!();
            for category in Category::ALL {
                println!(
                    "   {:<12} {:>3} canonical, {:>4} folded keys",
                    category.as_str(),
                    table.get(category).len(),
                    normalizer.len(category)
                );
            }
        }
        Err(e) => {
            println!("   ❌ {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub async fn show(file: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let table = load(file.as_deref())?;
    println!("{}", serde_json::to_string_pretty(&table)?);
    Ok(())
}

fn load(file: Option<&Path>) -> Result<AliasTable, ConfigError> {
    match file {
        Some(path) => load_alias_table(path),
        None => AppConfig::load()?.alias_table(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alias_file(json: &str) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), json).unwrap();
        file
    }

    #[tokio::test]
    async fn validate_accepts_disjoint_synonyms() {
        let file = alias_file(r#"{"room": {"study": ["office"], "den": ["snug"]}}"#);
        assert!(validate(Some(file.path().to_path_buf())).await.is_ok());
    }

    #[tokio::test]
    async fn validate_rejects_shared_synonym() {
        let file = alias_file(r#"{"room": {"study": ["office"], "den": ["Office"]}}"#);
        let err = validate(Some(file.path().to_path_buf())).await.unwrap_err();
        assert!(err.to_string().contains("ambiguous_exact_alias"));
    }

    #[tokio::test]
    async fn show_reports_unparsable_file() {
        let file = alias_file("{ not json");
        assert!(show(Some(file.path().to_path_buf())).await.is_err());
    }
}
