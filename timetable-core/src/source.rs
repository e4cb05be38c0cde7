// Render source abstraction
//
// This module defines the boundary between obtaining render data (network,
// disk) and reconstructing lessons from it. Everything after this point works
// with RenderData and does not care where it came from.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// The vendor's render document: two flat lists of graphical primitives.
///
/// Records are kept as raw JSON so that a malformed record is reported by
/// the primitive parser with its index, instead of failing the whole document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderData {
    #[serde(rename = "textList")]
    pub text_list: Vec<Value>,
    #[serde(rename = "boxList")]
    pub box_list: Vec<Value>,
}

impl RenderData {
    /// Accepts both the bare `{textList, boxList}` document and the
    /// response envelope `{"data": {textList, boxList}}`.
    pub fn from_value(value: Value) -> Result<Self> {
        let document = match value {
            Value::Object(mut map) if map.contains_key("data") => map
                .remove("data")
                .ok_or_else(|| anyhow!("Render envelope without data"))?,
            other => other,
        };
        serde_json::from_value(document).context("Render data lacks textList/boxList arrays")
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json).context("Render data is not valid JSON")?;
        Self::from_value(value)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read render data {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Failed to load render data {}", path.display()))
    }
}

/// Supplies the render of one ISO week.
///
/// Implementations own transport concerns (authentication, retries,
/// timeouts); the reconstruction core never retries.
pub trait RenderSource {
    fn fetch_week(&self, iso_year: i32, week: u32) -> Result<RenderData>;

    /// Source name for logging
    fn name(&self) -> &str;
}

/// Reads renders saved on disk.
///
/// A file path serves the same snapshot for every week. A directory path
/// serves `week-<year>-<ww>.json` from that directory.
pub struct FileRenderSource {
    path: PathBuf,
}

impl FileRenderSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn week_file_name(iso_year: i32, week: u32) -> String {
        format!("week-{iso_year}-{week:02}.json")
    }
}

impl RenderSource for FileRenderSource {
    fn fetch_week(&self, iso_year: i32, week: u32) -> Result<RenderData> {
        let path = if self.path.is_dir() {
            self.path.join(Self::week_file_name(iso_year, week))
        } else {
            self.path.clone()
        };
        log::debug!("Loading week {iso_year}-W{week:02} from {}", path.display());
        RenderData::from_file(&path)
    }

    fn name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_and_enveloped_documents() {
        let bare = json!({"textList": [{"x": 1}], "boxList": []});
        let data = RenderData::from_value(bare.clone()).unwrap();
        assert_eq!(data.text_list.len(), 1);

        let enveloped = json!({"data": bare});
        let data = RenderData::from_value(enveloped).unwrap();
        assert_eq!(data.text_list.len(), 1);
        assert!(data.box_list.is_empty());
    }

    #[test]
    fn test_missing_lists_fail() {
        assert!(RenderData::from_value(json!({"textList": []})).is_err());
        assert!(RenderData::from_json_str("not json").is_err());
    }

    #[test]
    fn test_directory_source_picks_week_file() {
        let dir = tempfile::tempdir().unwrap();
        let name = FileRenderSource::week_file_name(2026, 3);
        assert_eq!(name, "week-2026-03.json");
        std::fs::write(
            dir.path().join(&name),
            r#"{"textList": [], "boxList": [{"x": 0}]}"#,
        )
        .unwrap();

        let source = FileRenderSource::new(dir.path());
        let data = source.fetch_week(2026, 3).unwrap();
        assert_eq!(data.box_list.len(), 1);
        assert!(source.fetch_week(2026, 4).is_err());
    }
}
