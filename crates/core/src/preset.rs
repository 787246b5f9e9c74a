use crate::config::PresetAutoConfig;
use crate::context::{BatchContext, BatchError};
use crate::filter::FileFilter;
use crate::metadata::{MetadataReader, TagMap, FILE_TYPE, MAKE, MODEL};
use crate::template::{escape_literal, parse_template, slot_count, TemplateError, TemplatePart};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const LEVEL_COUNT: u8 = 3;
pub const PRESET_EXTENSION: &str = "json";
pub const AUTO_PRESET: &str = "auto";

const BUNDLED_PRESETS: [(&str, &str); 2] = [
    (
        "fujifilm_xt5_still",
        include_str!("../../../presets/fujifilm_xt5_still.json"),
    ),
    (
        "fujifilm_xt5_video",
        include_str!("../../../presets/fujifilm_xt5_video.json"),
    ),
];

#[derive(Debug, Error)]
pub enum PresetError {
    #[error("プリセットのJSONが不正です: {0}")]
    Json(#[from] serde_json::Error),
    #[error("プリセットにレベル [{0}] がありません")]
    MissingLevel(u8),
    #[error("プリセットのテンプレートが不正です: {0}")]
    Template(#[from] TemplateError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetCell {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
}

pub type PresetLine = Vec<PresetCell>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preset {
    pub name: String,
    levels: BTreeMap<String, Vec<PresetLine>>,
}

impl Preset {
    pub fn from_json(name: &str, raw: &str) -> Result<Self, PresetError> {
        let levels = serde_json::from_str::<BTreeMap<String, Vec<PresetLine>>>(raw)?;
        Ok(Self {
            name: name.to_string(),
            levels,
        })
    }

    /// Reads `<dir>/<name>.json`, falling back to the presets built into the binary.
    pub fn load(dir: &Path, name: &str) -> Result<Self> {
        let path = dir.join(format!("{name}.{PRESET_EXTENSION}"));
        if !path.is_file() {
            let raw = bundled_preset(name)
                .ok_or_else(|| BatchError::UnknownPreset(name.to_string()))?;
            debug!("組み込みプリセット [{name}] を使用します");
            return Preset::from_json(name, raw)
                .with_context(|| format!("組み込みプリセットを読み込めませんでした: {name}"));
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("プリセットを読めませんでした: {}", path.display()))?;
        Preset::from_json(name, &raw)
            .with_context(|| format!("プリセットを読み込めませんでした: {}", path.display()))
    }

    pub fn level(&self, level: u8) -> Option<&[PresetLine]> {
        self.levels.get(&level.to_string()).map(Vec::as_slice)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledLine {
    pub template: String,
    pub arguments: Vec<String>,
    parts: Vec<TemplatePart>,
}

impl CompiledLine {
    pub fn parts(&self) -> &[TemplatePart] {
        &self.parts
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPreset {
    pub name: String,
    levels: Vec<Vec<CompiledLine>>,
    required_tags: BTreeSet<String>,
}

impl CompiledPreset {
    pub fn level(&self, level: u8) -> &[CompiledLine] {
        usize::from(level)
            .checked_sub(1)
            .and_then(|index| self.levels.get(index))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn required_tags(&self) -> &BTreeSet<String> {
        &self.required_tags
    }
}

pub fn compile_preset(preset: &Preset) -> Result<CompiledPreset, PresetError> {
    info!("プリセット [{}] をコンパイルします", preset.name);
    let mut levels = Vec::with_capacity(usize::from(LEVEL_COUNT));
    let mut required_tags = BTreeSet::new();

    for level in 1..=LEVEL_COUNT {
        let lines = preset.level(level).ok_or(PresetError::MissingLevel(level))?;
        let mut compiled = Vec::with_capacity(lines.len());
        for line in lines {
            let line = compile_line(line)?;
            required_tags.extend(line.arguments.iter().cloned());
            compiled.push(line);
        }
        levels.push(compiled);
    }

    info!("必要なタグ: {:?}", required_tags);
    Ok(CompiledPreset {
        name: preset.name.clone(),
        levels,
        required_tags,
    })
}

fn compile_line(line: &[PresetCell]) -> Result<CompiledLine, PresetError> {
    let delimiter = line
        .first()
        .and_then(|cell| cell.delimiter.as_deref())
        .unwrap_or_default();

    let cells: Vec<String> = line.iter().map(compile_cell).collect();
    let template = cells.join(&escape_literal(delimiter));
    let arguments: Vec<String> = line.iter().map(|cell| cell.tag.clone()).collect();

    let parts = parse_template(&template)?;
    let slots = slot_count(&parts);
    if slots != arguments.len() {
        return Err(TemplateError::ArgumentCount {
            slots,
            arguments: arguments.len(),
        }
        .into());
    }

    Ok(CompiledLine {
        template,
        arguments,
        parts,
    })
}

fn compile_cell(cell: &PresetCell) -> String {
    let prefix = cell.prefix.as_deref().unwrap_or_default();
    let suffix = cell.suffix.as_deref().unwrap_or_default();
    let name = match cell.name.as_deref() {
        Some(name) if !name.is_empty() => format!("{name}: "),
        _ => String::new(),
    };
    format!(
        "{}{}{{}}{}",
        escape_literal(prefix),
        escape_literal(&name),
        escape_literal(suffix)
    )
}

fn bundled_preset(name: &str) -> Option<&'static str> {
    BUNDLED_PRESETS
        .iter()
        .find(|(bundled, _)| *bundled == name)
        .map(|(_, raw)| *raw)
}

pub fn bundled_preset_names() -> Vec<&'static str> {
    BUNDLED_PRESETS.iter().map(|(name, _)| *name).collect()
}

pub fn install_bundled_presets(dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("プリセットフォルダを作成できませんでした: {}", dir.display()))?;

    let mut written = Vec::new();
    for (name, raw) in BUNDLED_PRESETS {
        let path = dir.join(format!("{name}.{PRESET_EXTENSION}"));
        if path.exists() {
            debug!("既存のプリセットを残します: {}", path.display());
            continue;
        }
        fs::write(&path, raw)
            .with_context(|| format!("プリセットを書き込めませんでした: {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

pub fn available_presets(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let entries = fs::read_dir(dir)
        .with_context(|| format!("プリセットフォルダを読めませんでした: {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("エントリ読み取り失敗: {}", dir.display()))?;
        let path = entry.path();
        let is_preset = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case(PRESET_EXTENSION))
            .unwrap_or(false);
        if !is_preset {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|v| v.to_str()) {
            names.push(stem.to_string());
        }
    }
    names.sort();
    Ok(names)
}

pub fn select_preset(auto: &PresetAutoConfig, tags: &TagMap) -> Result<String, BatchError> {
    let lookup = |table: &BTreeMap<String, String>, tag: &str| {
        let value = tags.get(tag).map(|v| v.trim()).unwrap_or_default();
        table
            .get(value)
            .cloned()
            .ok_or_else(|| BatchError::PresetSelection(format!("{tag}={value}")))
    };

    let make = lookup(&auto.make, MAKE)?;
    let model = lookup(&auto.model, MODEL)?;
    let file_type = lookup(&auto.file_type, FILE_TYPE)?;
    Ok(format!("{make}_{model}_{file_type}"))
}

pub fn detect_preset(
    reader: &mut dyn MetadataReader,
    ctx: &BatchContext,
    file_names: &[String],
    auto: &PresetAutoConfig,
) -> Result<String> {
    let visible = FileFilter::new().any(file_names);
    let first = visible
        .accepted
        .first()
        .ok_or(BatchError::NothingToProcess)?;
    let path = ctx.path_of(first);
    let tags = reader
        .query_tags(&path, ctx.extension(), &[MAKE, MODEL, FILE_TYPE])?
        .into_iter()
        .next()
        .ok_or_else(|| BatchError::PresetSelection(first.clone()))?;

    let name = select_preset(auto, &tags)?;
    info!("プリセット [{name}] を自動選択しました ({})", path.display());
    Ok(name)
}
