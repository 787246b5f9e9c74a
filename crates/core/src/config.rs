use crate::sequence::SENTINEL_TIMESTAMP;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_EXTENSION: &str = "JPG";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub exiftool_path: String,
    pub default_extension: String,
    pub preset_dir: Option<PathBuf>,
    pub defaults: ChunkDefaults,
    pub preset_auto: PresetAutoConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            exiftool_path: "exiftool".to_string(),
            default_extension: DEFAULT_EXTENSION.to_string(),
            preset_dir: None,
            defaults: ChunkDefaults::default(),
            preset_auto: PresetAutoConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn resolve_preset_dir(&self, paths: &AppPaths) -> PathBuf {
        self.preset_dir
            .clone()
            .unwrap_or_else(|| paths.preset_dir.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkDefaults {
    pub initials: String,
    pub date_time: String,
    pub sequence: String,
    pub style: String,
    pub rating: String,
    pub original: String,
}

impl Default for ChunkDefaults {
    fn default() -> Self {
        Self {
            initials: "XX".to_string(),
            date_time: SENTINEL_TIMESTAMP.to_string(),
            sequence: "00".to_string(),
            style: "none".to_string(),
            rating: "none".to_string(),
            original: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetAutoConfig {
    pub make: BTreeMap<String, String>,
    pub model: BTreeMap<String, String>,
    pub file_type: BTreeMap<String, String>,
}

impl Default for PresetAutoConfig {
    fn default() -> Self {
        let table = |pairs: &[(&str, &str)]| {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>()
        };
        Self {
            make: table(&[("FUJIFILM", "fujifilm")]),
            model: table(&[("X-T5", "xt5")]),
            file_type: table(&[("JPEG", "still"), ("RAF", "still"), ("MOV", "video")]),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub config_path: PathBuf,
    pub preset_dir: PathBuf,
}

pub fn app_paths() -> Result<AppPaths> {
    let proj = ProjectDirs::from("com", "pthree", "pthree")
        .context("OS標準設定ディレクトリを取得できませんでした")?;
    let config_dir = proj.config_dir().to_path_buf();
    Ok(AppPaths {
        config_path: config_dir.join("config.toml"),
        preset_dir: config_dir.join("presets"),
        config_dir,
    })
}

pub fn load_config() -> Result<AppConfig> {
    let paths = app_paths()?;
    if !paths.config_path.exists() {
        return Ok(AppConfig::default());
    }

    let raw = fs::read_to_string(&paths.config_path).with_context(|| {
        format!(
            "設定ファイルを読めませんでした: {}",
            paths.config_path.display()
        )
    })?;

    parse_config(&raw)
}

pub fn save_config(config: &AppConfig) -> Result<()> {
    let paths = app_paths()?;
    fs::create_dir_all(&paths.config_dir).with_context(|| {
        format!(
            "設定ディレクトリを作成できませんでした: {}",
            paths.config_dir.display()
        )
    })?;
    let body = toml::to_string_pretty(config).context("設定のシリアライズに失敗しました")?;
    fs::write(&paths.config_path, body).with_context(|| {
        format!(
            "設定ファイルを書き込めませんでした: {}",
            paths.config_path.display()
        )
    })?;
    Ok(())
}

fn parse_config(raw: &str) -> Result<AppConfig> {
    toml::from_str::<AppConfig>(raw).context("設定ファイルのパースに失敗しました")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = parse_config(
            r#"
exiftool_path = "/usr/local/bin/exiftool"

[defaults]
initials = "JD"

[preset_auto.model]
"X-H2" = "xh2"
"#,
        )
        .expect("must parse");

        assert_eq!(config.exiftool_path, "/usr/local/bin/exiftool");
        assert_eq!(config.default_extension, DEFAULT_EXTENSION);
        assert_eq!(config.defaults.initials, "JD");
        assert_eq!(config.defaults.date_time, SENTINEL_TIMESTAMP);
        assert_eq!(config.preset_auto.model.get("X-H2").map(String::as_str), Some("xh2"));
        assert!(config.preset_auto.make.contains_key("FUJIFILM"));
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let body = toml::to_string_pretty(&AppConfig::default()).expect("serialize");
        let parsed = parse_config(&body).expect("parse");
        assert_eq!(parsed.preset_auto.file_type.len(), 3);
        assert_eq!(parsed.defaults.style, "none");
    }
}
