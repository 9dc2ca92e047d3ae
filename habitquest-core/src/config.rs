//! Preference persistence: `~/.habitquest/preferences.json`.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::user::Preferences;

/// `$HABITQUEST_HOME` if set, else `$HOME/.habitquest`.
pub fn habitquest_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("HABITQUEST_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".habitquest"))
}

pub fn ensure_habitquest_home() -> Result<PathBuf> {
    let dir = habitquest_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn preferences_path() -> Result<PathBuf> {
    Ok(ensure_habitquest_home()?.join("preferences.json"))
}

pub fn load_preferences() -> Result<Preferences> {
    load_preferences_from(&preferences_path()?)
}

pub fn save_preferences(prefs: &Preferences) -> Result<()> {
    save_preferences_to(&preferences_path()?, prefs)
}

/// Missing file means defaults; missing fields are filled from defaults.
pub fn load_preferences_from(path: &Path) -> Result<Preferences> {
    if !path.exists() {
        debug!(path = %path.display(), "no preferences file, using defaults");
        return Ok(Preferences::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn save_preferences_to(path: &Path, prefs: &Preferences) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(prefs).context("serialize preferences")?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    debug!(path = %path.display(), "preferences saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Importance;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = load_preferences_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(prefs, Preferences::default());
    }

    #[test]
    fn saved_preferences_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.json");

        let mut prefs = Preferences::default();
        prefs.timezone = "Europe/Berlin".into();
        prefs.weights.vacation_mode = true;
        prefs.weights.importance.insert(Importance::DefconOne, 10.0);
        prefs.weights.tag_multipliers.insert("deep-work".into(), 1.25);

        save_preferences_to(&path, &prefs).unwrap();
        assert_eq!(load_preferences_from(&path).unwrap(), prefs);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, r#"{ "timezone": "Asia/Tokyo", "weights": { "is_next": 4.0 } }"#)
            .unwrap();

        let prefs = load_preferences_from(&path).unwrap();
        assert_eq!(prefs.timezone, "Asia/Tokyo");
        assert_eq!(prefs.weights.is_next, 4.0);
        assert_eq!(prefs.weights.due_date, 2.0);
        assert!(prefs.show_xp_notifications);
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_preferences_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("preferences.json"));
    }
}
