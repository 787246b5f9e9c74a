use crate::filename::DATE_TIME_FORMAT;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

pub type TagMap = BTreeMap<String, String>;

pub const FILE_NAME: &str = "FileName";
pub const DATE_TIME_ORIGINAL: &str = "DateTimeOriginal";
pub const OFFSET_TIME_ORIGINAL: &str = "OffsetTimeOriginal";
pub const MAKE: &str = "Make";
pub const MODEL: &str = "Model";
pub const FILE_TYPE: &str = "FileType";

pub trait MetadataReader {
    /// One map per file under `path` (a directory or a single file) with the
    /// given extension. Each map carries `FileName`. No match gives an empty list.
    fn query_tags(&mut self, path: &Path, extension: &str, tags: &[&str]) -> Result<Vec<TagMap>>;

    fn dump_mie(&mut self, extension: &str, source: &Path, output: &Path) -> Result<()>;

    fn html_dump(&mut self, extension: &str, source: &Path) -> Result<String>;
}

pub fn parse_tag_json(raw: &str) -> Result<Vec<TagMap>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    let entries: Vec<serde_json::Map<String, Value>> =
        serde_json::from_str(raw).context("exiftoolのJSON出力を解析できませんでした")?;

    Ok(entries
        .into_iter()
        .map(|entry| {
            entry
                .into_iter()
                .filter_map(|(key, value)| value_to_string(&value).map(|v| (key, v)))
                .collect()
        })
        .collect())
}

pub fn capture_timestamp(tags: &TagMap) -> Option<String> {
    let raw = tags.get(DATE_TIME_ORIGINAL)?;
    parse_date(raw).map(|dt| dt.format(DATE_TIME_FORMAT).to_string())
}

fn parse_date(input: &str) -> Option<NaiveDateTime> {
    let normalized = input.trim();

    let zoned = [
        "%Y:%m:%d %H:%M:%S%:z",
        "%Y:%m:%d %H:%M:%S%.f%:z",
        "%Y-%m-%dT%H:%M:%S%:z",
        "%Y-%m-%dT%H:%M:%S%.f%:z",
    ];
    for fmt in zoned {
        if let Ok(dt) = DateTime::parse_from_str(normalized, fmt) {
            return Some(dt.naive_local());
        }
    }

    let naive = [
        "%Y:%m:%d %H:%M:%S",
        "%Y:%m:%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    naive
        .into_iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(normalized, fmt).ok())
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(value_to_string)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exiftool_json() {
        let raw = r#"[
  {"SourceFile": "./DSCF0001.JPG", "FileName": "DSCF0001.JPG", "ISO": 400, "Keywords": ["a", "b"]},
  {"SourceFile": "./DSCF0002.JPG", "FileName": "DSCF0002.JPG", "Make": "FUJIFILM"}
]"#;
        let maps = parse_tag_json(raw).expect("must parse");
        assert_eq!(maps.len(), 2);
        assert_eq!(maps[0].get("ISO").map(String::as_str), Some("400"));
        assert_eq!(maps[0].get("Keywords").map(String::as_str), Some("a, b"));
        assert_eq!(maps[1].get(MAKE).map(String::as_str), Some("FUJIFILM"));
    }

    #[test]
    fn empty_output_means_no_files() {
        assert!(parse_tag_json("").expect("empty").is_empty());
        assert!(parse_tag_json("not json").is_err());
    }

    #[test]
    fn capture_timestamp_normalizes_exif_dates() {
        let mut tags = TagMap::new();
        tags.insert(DATE_TIME_ORIGINAL.to_string(), "2024:01:01 12:00:05".to_string());
        assert_eq!(capture_timestamp(&tags).as_deref(), Some("20240101-120005"));

        tags.insert(
            DATE_TIME_ORIGINAL.to_string(),
            "2024:03:10 08:15:00+09:00".to_string(),
        );
        assert_eq!(capture_timestamp(&tags).as_deref(), Some("20240310-081500"));

        tags.insert(DATE_TIME_ORIGINAL.to_string(), "0000:00:00 00:00:00".to_string());
        assert_eq!(capture_timestamp(&tags), None);

        tags.remove(DATE_TIME_ORIGINAL);
        assert_eq!(capture_timestamp(&tags), None);
    }
}
