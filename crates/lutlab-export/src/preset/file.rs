//! Preset files and environment discovery.
//!
//! Presets are stored as JSON (`.json`) or YAML (`.yaml`, `.yml`) mappings.
//! Directories listed in [`PRESETS_ENV`] are scanned for such files.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{RawPreset, default_preset};
use crate::{LutError, LutResult};

/// Environment variable holding the preset search path.
pub const PRESETS_ENV: &str = "LUTLAB_PRESETS";

const PRESET_PATTERNS: [&str; 3] = ["*.json", "*.yaml", "*.yml"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PresetFormat {
    Json,
    Yaml,
}

impl PresetFormat {
    fn from_path(path: &Path) -> LutResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "json" => Ok(PresetFormat::Json),
            "yaml" | "yml" => Ok(PresetFormat::Yaml),
            _ => Err(LutError::Format {
                format: "preset",
                reason: format!("{}: expected a .json, .yaml or .yml file", path.display()),
            }),
        }
    }
}

/// Reads a preset file.
///
/// # Errors
///
/// Fails on unknown extensions, I/O errors and malformed content. The
/// attributes are not validated.
pub fn read_preset(path: impl AsRef<Path>) -> LutResult<RawPreset> {
    let path = path.as_ref();
    let format = PresetFormat::from_path(path)?;
    let content = fs::read_to_string(path)?;
    let preset = match format {
        PresetFormat::Json => serde_json::from_str(&content)?,
        PresetFormat::Yaml => serde_yaml::from_str(&content)?,
    };
    Ok(preset)
}

/// Writes a preset file, choosing JSON or YAML from the extension.
pub fn write_preset(path: impl AsRef<Path>, preset: &RawPreset) -> LutResult<()> {
    let path = path.as_ref();
    let content = match PresetFormat::from_path(path)? {
        PresetFormat::Json => serde_json::to_string_pretty(preset)?,
        PresetFormat::Yaml => serde_yaml::to_string(preset)?,
    };
    fs::write(path, content)?;
    debug!(path = %path.display(), "Wrote preset");
    Ok(())
}

/// Loads presets from the directories listed in [`PRESETS_ENV`].
///
/// Presets are keyed by file stem. The library default preset is always
/// available under `default` unless a file overrides it.
pub fn presets_from_env() -> LutResult<BTreeMap<String, RawPreset>> {
    let dirs: Vec<PathBuf> = env::var_os(PRESETS_ENV)
        .map(|paths| env::split_paths(&paths).collect())
        .unwrap_or_default();
    presets_from_dirs(dirs)
}

/// Loads presets from `dirs`. Later directories override earlier ones.
///
/// Files that cannot be read or parsed are skipped with a warning.
pub fn presets_from_dirs<I, P>(dirs: I) -> LutResult<BTreeMap<String, RawPreset>>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut presets = BTreeMap::new();
    presets.insert("default".to_string(), default_preset());

    for dir in dirs {
        let dir = dir.as_ref();
        let Some(dir_str) = dir.to_str() else {
            warn!(dir = %dir.display(), "Skipping non UTF-8 preset directory");
            continue;
        };
        let escaped = glob::Pattern::escape(dir_str);

        for pattern in PRESET_PATTERNS {
            let pattern = format!("{}/{}", escaped, pattern);
            for entry in glob::glob(&pattern)? {
                let path = match entry {
                    Ok(path) => path,
                    Err(e) => {
                        warn!("Skipping unreadable preset entry: {}", e);
                        continue;
                    }
                };
                let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                match read_preset(&path) {
                    Ok(preset) => {
                        debug!(name, path = %path.display(), "Loaded preset");
                        presets.insert(name.to_string(), preset);
                    }
                    Err(e) => warn!(path = %path.display(), "Skipping preset: {}", e),
                }
            }
        }
    }

    Ok(presets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::{self, LutType, Range};
    use tempfile::tempdir;

    #[test]
    fn json_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("curve.json");
        let raw = RawPreset::new()
            .with(preset::TYPE, "1D")
            .with_range(preset::IN_RANGE, Range::int(0, 1023));
        let raw = preset::complete_preset(&raw).unwrap().to_raw();

        write_preset(&path, &raw).unwrap();
        let back = read_preset(&path).unwrap();
        assert_eq!(back, raw);
        assert!(preset::check_preset(&back).unwrap().is_input_int());
    }

    #[test]
    fn yaml_roundtrip_keeps_number_kinds() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cube.yaml");
        let raw = preset::default_preset()
            .with(preset::TYPE, "3D")
            .with_range(preset::OUT_RANGE, Range::int(0, 4095));

        write_preset(&path, &raw).unwrap();
        let back = read_preset(&path).unwrap();
        let checked = preset::check_preset(&back).unwrap();
        assert_eq!(checked.lut_type(), LutType::ThreeD);
        assert_eq!(checked.out_range, Range::int(0, 4095));
        assert_eq!(checked.in_range, Range::float(0.0, 1.0));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempdir().unwrap();
        let err = write_preset(dir.path().join("preset.txt"), &RawPreset::new()).unwrap_err();
        assert!(matches!(err, LutError::Format { format: "preset", .. }));
    }

    #[test]
    fn directory_scan() {
        let dir = tempdir().unwrap();
        write_preset(
            dir.path().join("log.yml"),
            &RawPreset::new().with(preset::TYPE, "1D"),
        )
        .unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let presets = presets_from_dirs([dir.path()]).unwrap();
        assert!(presets.contains_key("default"));
        assert!(presets.contains_key("log"));
        assert!(!presets.contains_key("broken"));
        assert_eq!(presets.len(), 2);
    }
}
