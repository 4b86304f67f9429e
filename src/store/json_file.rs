use super::{ManualMatch, MatchRepository};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Read a JSON array. A missing or blank file reads as empty; a leading BOM
/// is ignored.
pub(crate) fn read_json_array<T: DeserializeOwned>(path: &Path, what: &str) -> Result<Vec<T>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {what}: {}", path.display()))
        }
    };
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(content)
        .with_context(|| format!("Failed to parse {what}: {}", path.display()))
}

/// Write to a sibling temp file, then rename over the target.
pub(crate) fn write_json_array<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

/// Manual matches kept as a JSON array on disk. A missing file reads as empty.
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MatchRepository for JsonFileRepository {
    fn load(&self) -> Result<Vec<ManualMatch>> {
        read_json_array(&self.path, "manual matches")
    }

    fn save(&self, matches: &[ManualMatch]) -> Result<()> {
        write_json_array(&self.path, matches)
    }
}
