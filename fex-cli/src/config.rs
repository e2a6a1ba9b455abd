//! Settings file for the `fex` binary.
//!
//! Read from `~/.config/fex/config.toml` unless `--config` points elsewhere.
//! A missing file means defaults; command-line flags are applied on top.

use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use fex_core::{
    ActionsConfiguration, Configuration, FileSpecification, FileSpecifications,
    FilteringConfiguration, SortMode,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Log filter directive, e.g. "debug" or "fex_core=trace"
    pub log_level: Option<String>,
    /// Initial sort mode of every directory
    pub sort: SortMode,
    pub actions: ActionsConfiguration,
    pub filtering: FilteringConfiguration,
    /// Preview classifications consulted before the built-in ones
    pub specifications: Vec<FileSpecification>,
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fex")
        .join("config.toml")
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&contents)
            .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn configuration(&self) -> Configuration {
        Configuration {
            actions: self.actions.clone(),
            filtering: self.filtering.clone(),
        }
    }

    /// Custom entries in file order, ahead of the built-ins
    pub fn file_specifications(&self) -> FileSpecifications {
        self.specifications
            .iter()
            .rev()
            .cloned()
            .fold(FileSpecifications::default(), |specs, spec| {
                specs.with_specification(spec)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fex_core::{Filter, Item, ItemKind, PreviewKind};
    use std::time::SystemTime;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let settings = Settings::load(&temp.path().join("config.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_full_file() {
        let settings = Settings::from_toml(
            r#"
            log_level = "debug"
            sort = "date"

            [actions]
            can_remove_files = true
            can_choose_files = true
            allows_multiple_selection = true

            [filtering]
            include_filters = [{ by = "kind", value = "file" }]
            exclude_filters = [{ by = "extension", value = "tmp" }]

            [[specifications]]
            kind = "audio"
            extensions = ["flac"]

            [[specifications]]
            kind = "video"
            extensions = ["flac", "webm"]
            "#,
        )
        .unwrap();

        assert_eq!(settings.log_level.as_deref(), Some("debug"));
        assert_eq!(settings.sort, SortMode::Date);

        let configuration = settings.configuration();
        assert!(configuration.actions.can_remove_files);
        assert!(!configuration.actions.can_remove_directories);
        assert_eq!(
            configuration.filtering.include_filters,
            vec![Filter::Kind(ItemKind::File)]
        );

        let specs = settings.file_specifications();
        let flac = Item::file("/music/a.flac", SystemTime::UNIX_EPOCH);
        let webm = Item::file("/video/a.webm", SystemTime::UNIX_EPOCH);
        let png = Item::file("/img/a.png", SystemTime::UNIX_EPOCH);
        assert_eq!(specs.kind_for(&flac), Some(PreviewKind::Audio));
        assert_eq!(specs.kind_for(&webm), Some(PreviewKind::Video));
        assert_eq!(specs.kind_for(&png), Some(PreviewKind::Image));
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "sort = \"size\"").unwrap();

        let err = Settings::load(&path).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }
}
