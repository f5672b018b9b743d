//! Engine config files and named presets.
//!
//! `.yaml`/`.yml` files go through `serde_yaml`, anything else through
//! `serde_json`. Every section is `#[serde(default)]`, so a file only lists
//! what it overrides.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use bb_core::config::EngineConfig;

pub const PRESETS: [&str; 3] = ["regular-season", "playoffs", "arcade"];

pub fn preset(name: &str) -> Result<EngineConfig> {
    match name.trim().to_ascii_lowercase().replace('_', "-").as_str() {
        "regular-season" | "regular" | "default" => Ok(EngineConfig::regular_season()),
        "playoffs" | "playoff" => Ok(EngineConfig::playoffs()),
        "arcade" => Ok(EngineConfig::arcade()),
        other => bail!("Unknown preset '{other}' (expected one of {})", PRESETS.join(", ")),
    }
}

pub fn load_config(path: &Path) -> Result<EngineConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
    let cfg = if yaml {
        EngineConfig::from_yaml_str(&raw)
    } else {
        EngineConfig::from_json_str(&raw)
    };
    cfg.with_context(|| format!("Invalid config file: {}", path.display()))
}

/// A config file wins over the preset; neither means the regular-season
/// defaults.
pub fn resolve(file: Option<&Path>, preset_name: Option<&str>) -> Result<EngineConfig> {
    match (file, preset_name) {
        (Some(path), _) => load_config(path),
        (None, Some(name)) => preset(name),
        (None, None) => Ok(EngineConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_presets() {
        assert_eq!(preset("playoffs").unwrap(), EngineConfig::playoffs());
        assert_eq!(preset("Regular_Season").unwrap(), EngineConfig::regular_season());
        assert!(preset("pickup").is_err());
    }

    #[test]
    fn test_partial_yaml_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("engine.yaml");
        fs::write(&path, "star_rating: 80\nclock:\n  quarters: 4\n").unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.star_rating, 80);
        assert_eq!(cfg.shot, EngineConfig::default().shot);
    }

    #[test]
    fn test_json_and_invalid_files() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("engine.json");
        fs::write(&good, r#"{"star_rating": 85}"#).unwrap();
        assert_eq!(load_config(&good).unwrap().star_rating, 85);

        let bad = dir.path().join("bad.json");
        fs::write(&bad, r#"{"clock": {"quarters": 0}}"#).unwrap();
        let err = load_config(&bad).unwrap_err();
        assert!(format!("{err:#}").contains("bad.json"));
    }

    #[test]
    fn test_file_wins_over_preset() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("engine.json");
        fs::write(&path, r#"{"star_rating": 91}"#).unwrap();
        let cfg = resolve(Some(&path), Some("arcade")).unwrap();
        assert_eq!(cfg.star_rating, 91);
        assert_eq!(resolve(None, None).unwrap(), EngineConfig::default());
    }
}
