// Preset store
// Loaded from ~/.config/billmerge/presets.json
//
// File layout: {"presets": {"<name>": {<preset>}, ...}}. Object order is the
// order presets are listed in.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::preset::{Mapping, Preset, DEFAULT_SEARCH_COLUMN, DEFAULT_SEARCH_KEYWORD};
use crate::ConfigError;

#[derive(Debug, Default, Serialize, Deserialize)]
struct PresetFile {
    #[serde(default)]
    presets: Map<String, Value>,
}

/// Partial edit of an existing preset; `None` fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct PresetUpdate {
    pub description: Option<String>,
    pub mappings: Option<Vec<Mapping>>,
    pub settlement_search_column: Option<String>,
    pub settlement_search_keyword: Option<String>,
}

/// Ordered collection of presets backed by a JSON file.
#[derive(Debug, Clone)]
pub struct PresetStore {
    path: PathBuf,
    presets: Vec<Preset>,
}

impl PresetStore {
    /// Get the default preset file path
    pub fn default_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("billmerge");
        config_dir.join("presets.json")
    }

    /// Load presets from `path`. A missing file yields the built-in default;
    /// an unreadable or malformed file is an error, so it is never overwritten.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        if !path.exists() {
            debug!(path = %path.display(), "no preset file, using built-in default");
            return Ok(Self::with_defaults(path));
        }
        let presets = Self::read(&path)?;
        Ok(Self { path, presets })
    }

    fn with_defaults(path: PathBuf) -> Self {
        Self {
            path,
            presets: vec![Preset::builtin_default()],
        }
    }

    fn read(path: &Path) -> Result<Vec<Preset>, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let parse_err = |source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        };

        let file: PresetFile = serde_json::from_str(&contents).map_err(parse_err)?;
        let mut presets = Vec::with_capacity(file.presets.len());
        for (key, value) in file.presets {
            let mut preset: Preset = serde_json::from_value(value).map_err(parse_err)?;
            // the object key is authoritative
            preset.name = key;
            presets.push(preset);
        }
        Ok(presets)
    }

    /// Save current presets to disk
    pub fn save(&self) -> Result<(), ConfigError> {
        Self::write(&self.path, &self.presets)
    }

    /// Atomic write: save to a sibling temp file first, then rename
    fn write(path: &Path, presets: &[Preset]) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_err)?;
            }
        }

        let mut map = Map::new();
        for preset in presets {
            let value = serde_json::to_value(preset).map_err(ConfigError::Serialize)?;
            map.insert(preset.name.clone(), value);
        }
        let json = serde_json::to_string_pretty(&PresetFile { presets: map }).map_err(ConfigError::Serialize)?;

        let tmp_path = temp_sibling(path);
        if let Err(e) = fs::write(&tmp_path, json).and_then(|()| fs::rename(&tmp_path, path)) {
            if tmp_path.exists() {
                if let Err(cleanup) = fs::remove_file(&tmp_path) {
                    warn!(path = %tmp_path.display(), error = %cleanup, "could not remove temporary preset file");
                }
            }
            return Err(write_err(e));
        }
        debug!(path = %path.display(), count = presets.len(), "presets saved");
        Ok(())
    }

    /// Persist `presets` and adopt them only once they are on disk.
    fn commit(&mut self, presets: Vec<Preset>) -> Result<(), ConfigError> {
        Self::write(&self.path, &presets)?;
        self.presets = presets;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn list_preset_names(&self) -> Vec<String> {
        self.presets.iter().map(|p| p.name.clone()).collect()
    }

    pub fn get_preset(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.name == name)
    }

    fn position(&self, name: &str) -> Result<usize, ConfigError> {
        self.presets
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| ConfigError::NotFound(name.to_string()))
    }

    fn ensure_free(&self, name: &str) -> Result<(), ConfigError> {
        if self.get_preset(name).is_some() {
            return Err(ConfigError::AlreadyExists(name.to_string()));
        }
        Ok(())
    }

    pub fn add_preset(&mut self, preset: Preset) -> Result<(), ConfigError> {
        preset.validate()?;
        self.ensure_free(&preset.name)?;
        let mut presets = self.presets.clone();
        presets.push(preset);
        self.commit(presets)
    }

    pub fn update_preset(&mut self, name: &str, update: PresetUpdate) -> Result<(), ConfigError> {
        let idx = self.position(name)?;

        let mut preset = self.presets[idx].clone();
        if let Some(description) = update.description {
            preset.description = description;
        }
        if let Some(mappings) = update.mappings {
            preset.mappings = mappings;
        }
        if let Some(column) = update.settlement_search_column {
            preset.settlement_search_column = column;
        }
        if let Some(keyword) = update.settlement_search_keyword {
            preset.settlement_search_keyword = keyword;
        }
        preset.validate()?;

        let mut presets = self.presets.clone();
        presets[idx] = preset;
        self.commit(presets)
    }

    pub fn delete_preset(&mut self, name: &str) -> Result<(), ConfigError> {
        let idx = self.position(name)?;
        let mut presets = self.presets.clone();
        presets.remove(idx);
        self.commit(presets)
    }

    /// Rename in place; the preset keeps its position in the list.
    pub fn rename_preset(&mut self, old_name: &str, new_name: &str) -> Result<(), ConfigError> {
        let idx = self.position(old_name)?;
        if old_name == new_name {
            return Ok(());
        }
        if new_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                preset: old_name.to_string(),
                issues: vec!["preset name is empty".to_string()],
            });
        }
        self.ensure_free(new_name)?;
        let mut presets = self.presets.clone();
        presets[idx].name = new_name.to_string();
        self.commit(presets)
    }

    /// Copy a preset under a new name. Copies made from presets written before
    /// settlement search existed pick up the default search settings.
    pub fn duplicate_preset(&mut self, name: &str, new_name: &str) -> Result<(), ConfigError> {
        let idx = self.position(name)?;
        self.ensure_free(new_name)?;

        let mut copy = self.presets[idx].clone();
        copy.name = new_name.to_string();
        if copy.settlement_search_column.is_empty() {
            copy.settlement_search_column = DEFAULT_SEARCH_COLUMN.to_string();
        }
        if copy.settlement_search_keyword.is_empty() {
            copy.settlement_search_keyword = DEFAULT_SEARCH_KEYWORD.to_string();
        }
        copy.validate()?;

        let mut presets = self.presets.clone();
        presets.push(copy);
        self.commit(presets)
    }
}

/// `conf/presets.json` -> `conf/.presets.json.tmp`
fn temp_sibling(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "presets.json".to_string());
    path.with_file_name(format!(".{file_name}.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hotel() -> Preset {
        let mut p = Preset::new("Hotel");
        p.description = "hotel folios".into();
        p.settlement_search_keyword = "after-discount total".into();
        p.mappings = vec![Mapping::new("date", "A1"), Mapping::new("room", "B7")];
        p
    }

    fn store_in(dir: &Path) -> PresetStore {
        PresetStore::open(dir.join("presets.json")).unwrap()
    }

    #[test]
    fn missing_file_yields_default_preset() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        assert_eq!(store.list_preset_names(), vec!["Default"]);
        assert!(!store.path().exists());
    }

    #[test]
    fn corrupt_file_is_an_error_and_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("presets.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(PresetStore::open(&path), Err(ConfigError::Parse { .. })));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn add_then_reload_preserves_order_and_content() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());
        store.add_preset(hotel()).unwrap();
        let mut zeta = hotel();
        zeta.name = "Zeta".into();
        store.add_preset(zeta).unwrap();
        let mut alpha = hotel();
        alpha.name = "Alpha".into();
        store.add_preset(alpha).unwrap();

        let reloaded = store_in(dir.path());
        assert_eq!(reloaded.list_preset_names(), vec!["Default", "Hotel", "Zeta", "Alpha"]);
        assert_eq!(reloaded.get_preset("Hotel"), Some(&hotel()));
    }

    #[test]
    fn object_key_wins_over_inner_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("presets.json");
        fs::write(
            &path,
            r#"{"presets": {"Outer": {"name": "Inner", "mappings": [{"name": "d", "cell": "A1"}]}}}"#,
        )
        .unwrap();

        let store = PresetStore::open(&path).unwrap();
        assert_eq!(store.list_preset_names(), vec!["Outer"]);
        assert!(store.get_preset("Inner").is_none());
    }

    #[test]
    fn add_rejects_duplicates_and_invalid_presets() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());
        store.add_preset(hotel()).unwrap();

        assert!(matches!(store.add_preset(hotel()), Err(ConfigError::AlreadyExists(_))));

        let mut bad = hotel();
        bad.name = "Bad".into();
        bad.mappings.push(Mapping::new("x", "??"));
        assert!(matches!(store.add_preset(bad), Err(ConfigError::Invalid { .. })));
        assert_eq!(store.list_preset_names(), vec!["Default", "Hotel"]);
    }

    #[test]
    fn update_changes_only_given_fields() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());
        store.add_preset(hotel()).unwrap();

        store
            .update_preset(
                "Hotel",
                PresetUpdate {
                    settlement_search_column: Some("F".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        let p = store_in(dir.path()).get_preset("Hotel").cloned().unwrap();
        assert_eq!(p.settlement_search_column, "F");
        assert_eq!(p.settlement_search_keyword, "after-discount total");
        assert_eq!(p.mappings.len(), 2);
    }

    #[test]
    fn invalid_update_leaves_preset_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());
        store.add_preset(hotel()).unwrap();

        let result = store.update_preset(
            "Hotel",
            PresetUpdate {
                mappings: Some(vec![]),
                ..Default::default()
            },
        );
        assert!(result.is_err());
        assert_eq!(store.get_preset("Hotel").unwrap().mappings.len(), 2);
    }

    #[test]
    fn rename_keeps_position() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());
        store.add_preset(hotel()).unwrap();

        store.rename_preset("Default", "Basic").unwrap();
        assert_eq!(store.list_preset_names(), vec!["Basic", "Hotel"]);
        assert!(matches!(
            store.rename_preset("Basic", "Hotel"),
            Err(ConfigError::AlreadyExists(_))
        ));
        assert!(matches!(
            store.rename_preset("Missing", "X"),
            Err(ConfigError::NotFound(_))
        ));
    }

    #[test]
    fn duplicate_is_a_deep_copy() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());
        store.add_preset(hotel()).unwrap();

        store.duplicate_preset("Hotel", "Hotel 2").unwrap();
        store
            .update_preset(
                "Hotel 2",
                PresetUpdate {
                    mappings: Some(vec![Mapping::new("total", "E9")]),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(store.get_preset("Hotel").unwrap().mappings.len(), 2);
        assert_eq!(store.get_preset("Hotel 2").unwrap().mappings.len(), 1);
    }

    #[test]
    fn delete_removes_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());
        store.add_preset(hotel()).unwrap();
        store.delete_preset("Default").unwrap();

        assert_eq!(store_in(dir.path()).list_preset_names(), vec!["Hotel"]);
        assert!(matches!(store.delete_preset("Default"), Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = PresetStore::open(dir.path().join("nested/deeper/presets.json")).unwrap();
        store.save().unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());
        store.add_preset(hotel()).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["presets.json"]);
    }

    #[test]
    fn failed_save_keeps_memory_in_step_with_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("presets.json");
        // a directory where the file should go makes every save fail
        fs::create_dir(&path).unwrap();
        let mut store = PresetStore {
            path,
            presets: vec![Preset::builtin_default()],
        };

        assert!(matches!(store.add_preset(hotel()), Err(ConfigError::Write { .. })));
        assert_eq!(store.list_preset_names(), vec!["Default"]);

        assert!(matches!(store.delete_preset("Default"), Err(ConfigError::Write { .. })));
        assert_eq!(store.list_preset_names(), vec!["Default"]);

        assert!(store.rename_preset("Default", "Basic").is_err());
        assert_eq!(store.list_preset_names(), vec!["Default"]);
        assert!(!dir.path().join(".presets.json.tmp").exists());
    }
}
