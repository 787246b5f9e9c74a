use crate::context::BatchContext;
use crate::metadata::{MetadataReader, TagMap, DATE_TIME_ORIGINAL, FILE_NAME, OFFSET_TIME_ORIGINAL};
use crate::preset::CompiledPreset;
use crate::template::render_template;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const REPORT_EXTENSION: &str = "txt";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportLevel {
    Low,
    Medium,
    #[default]
    High,
}

impl ReportLevel {
    pub fn max_level(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub lines: Vec<String>,
    pub missing_tags: Vec<String>,
}

impl RenderedReport {
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }
}

fn begin_marker(level: u8) -> String {
    format!("================ BEGIN LEVEL {level} ================")
}

fn end_marker(level: u8) -> String {
    format!("================= END LEVEL {level} =================")
}

pub fn render_report(compiled: &CompiledPreset, tags: &TagMap, max_level: u8) -> RenderedReport {
    let missing_tags = compiled
        .required_tags()
        .iter()
        .filter(|tag| !tags.contains_key(tag.as_str()))
        .cloned()
        .collect();

    let file_name = tags.get(FILE_NAME).map(String::as_str).unwrap_or_default();
    let mut lines = Vec::new();
    for level in 1..=max_level {
        lines.push(begin_marker(level));
        lines.push(file_name.to_string());
        for line in compiled.level(level) {
            let arguments: Vec<&str> = line
                .arguments
                .iter()
                .map(|tag| tags.get(tag).map(String::as_str).unwrap_or_default())
                .collect();
            lines.push(render_template(line.parts(), &arguments));
        }
        lines.push(end_marker(level));
        lines.push(String::new());
    }

    RenderedReport {
        lines,
        missing_tags,
    }
}

fn report_header(tags: &TagMap) -> String {
    let get = |tag: &str| tags.get(tag).map(String::as_str).unwrap_or_default();
    format!(
        "Media filename: {}\nMedia created: {}{}\n\n",
        get(FILE_NAME),
        get(DATE_TIME_ORIGINAL),
        get(OFFSET_TIME_ORIGINAL)
    )
}

fn report_path(output_dir: &Path, file_name: &str) -> PathBuf {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|v| v.to_str())
        .unwrap_or(file_name);
    output_dir.join(format!("{stem}.{REPORT_EXTENSION}"))
}

pub fn write_texif_simple(
    reader: &mut dyn MetadataReader,
    ctx: &BatchContext,
    file_names: &[String],
    compiled: &CompiledPreset,
    level: ReportLevel,
    output_dir: &Path,
) -> Result<usize> {
    info!(
        "TEXIF simple: {}件 (プリセット {}, レベル {})",
        file_names.len(),
        compiled.name,
        level.max_level()
    );

    let mut query: Vec<&str> = compiled.required_tags().iter().map(String::as_str).collect();
    for tag in [FILE_NAME, DATE_TIME_ORIGINAL, OFFSET_TIME_ORIGINAL] {
        if !query.contains(&tag) {
            query.push(tag);
        }
    }

    let mut skipped = 0;
    for file_name in file_names {
        let path = ctx.path_of(file_name);
        debug!("TEXIF生成: {}", path.display());

        let Some(tags) = reader
            .query_tags(&path, ctx.extension(), &query)?
            .into_iter()
            .next()
        else {
            warn!("タグを取得できないためスキップ: {}", path.display());
            skipped += 1;
            continue;
        };

        let report = render_report(compiled, &tags, level.max_level());
        for tag in &report.missing_tags {
            warn!("タグ [{tag}] が見つかりません: {}", path.display());
        }

        let target = report_path(output_dir, file_name);
        let body = format!("{}{}", report_header(&tags), report.to_text());
        fs::write(&target, body)
            .with_context(|| format!("TEXIFを書き込めませんでした: {}", target.display()))?;
    }

    Ok(skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::fake::FakeReader;
    use crate::preset::{compile_preset, Preset};
    use tempfile::tempdir;

    fn camera_preset() -> CompiledPreset {
        let preset = Preset::from_json(
            "camera",
            r#"{
                "1": [[{"tag": "Make", "name": "Camera"}]],
                "2": [[{"tag": "LensModel", "name": "Lens"}]],
                "3": [[{"tag": "ISO", "name": "ISO"}]]
            }"#,
        )
        .expect("must parse");
        compile_preset(&preset).expect("must compile")
    }

    fn tags(pairs: &[(&str, &str)]) -> TagMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn renders_level_one_section() {
        let compiled = camera_preset();
        let report = render_report(
            &compiled,
            &tags(&[("FileName", "IMG_1.JPG"), ("Make", "FUJIFILM")]),
            1,
        );

        assert_eq!(
            report.lines,
            vec![
                "================ BEGIN LEVEL 1 ================",
                "IMG_1.JPG",
                "Camera: FUJIFILM",
                "================= END LEVEL 1 =================",
                "",
            ]
        );
    }

    #[test]
    fn missing_tags_render_empty_and_are_reported() {
        let compiled = camera_preset();
        let report = render_report(&compiled, &tags(&[("FileName", "IMG_1.JPG")]), 3);

        assert!(report.lines.contains(&"Camera: ".to_string()));
        assert!(report.lines.contains(&"Lens: ".to_string()));
        assert!(report.lines.contains(&end_marker(3)));
        assert_eq!(report.missing_tags, vec!["ISO", "LensModel", "Make"]);
    }

    #[test]
    fn rendering_is_deterministic() {
        let compiled = camera_preset();
        let input = tags(&[("FileName", "A.JPG"), ("Make", "FUJIFILM"), ("ISO", "400")]);
        assert_eq!(
            render_report(&compiled, &input, 3),
            render_report(&compiled, &input, 3)
        );
    }

    #[test]
    fn writes_one_report_per_file() {
        let temp = tempdir().expect("tempdir");
        let out = tempdir().expect("tempdir");
        fs::write(temp.path().join("A.JPG"), b"a").expect("write");
        fs::write(temp.path().join("B.JPG"), b"b").expect("write");

        let mut reader = FakeReader::default()
            .file(
                "A.JPG",
                &[
                    ("Make", "FUJIFILM"),
                    ("DateTimeOriginal", "2024:01:01 12:00:00"),
                    ("OffsetTimeOriginal", "+09:00"),
                ],
            )
            .file("B.JPG", &[]);
        let ctx = BatchContext::with_names(
            temp.path(),
            "JPG",
            vec!["A.JPG".to_string(), "B.JPG".to_string(), "C.JPG".to_string()],
        );

        let skipped = write_texif_simple(
            &mut reader,
            &ctx,
            ctx.file_names(),
            &camera_preset(),
            ReportLevel::Low,
            out.path(),
        )
        .expect("must write");

        // The reader knows nothing about C.JPG.
        assert_eq!(skipped, 1);
        let body = fs::read_to_string(out.path().join("A.txt")).expect("read");
        assert!(body.starts_with(
            "Media filename: A.JPG\nMedia created: 2024:01:01 12:00:00+09:00\n\n"
        ));
        assert!(body.contains("Camera: FUJIFILM\n"));
        assert!(!body.contains("BEGIN LEVEL 2"));
        assert!(out.path().join("B.txt").exists());
        assert!(!out.path().join("C.txt").exists());
    }
}
