use crate::context::BatchContext;
use crate::metadata::MetadataReader;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const HTML_EXTENSION: &str = "html";
pub const MIE_EXTENSION: &str = "mie";

fn sidecar_path(output_dir: &Path, file_name: &str, extension: &str) -> PathBuf {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|v| v.to_str())
        .unwrap_or(file_name);
    output_dir.join(format!("{stem}.{extension}"))
}

pub fn write_texif_full(
    reader: &mut dyn MetadataReader,
    ctx: &BatchContext,
    file_names: &[String],
    output_dir: &Path,
) -> Result<usize> {
    info!("TEXIF full: {}件", file_names.len());

    let mut skipped = 0;
    for file_name in file_names {
        let source = ctx.path_of(file_name);
        debug!("HTMLダンプ生成: {}", source.display());

        let dump = reader.html_dump(ctx.extension(), &source)?;
        if dump.trim().is_empty() {
            warn!("データが無いためスキップ: {}", source.display());
            skipped += 1;
            continue;
        }

        let target = sidecar_path(output_dir, file_name, HTML_EXTENSION);
        fs::write(&target, dump)
            .with_context(|| format!("HTMLダンプを書き込めませんでした: {}", target.display()))?;
    }

    Ok(skipped)
}

pub fn write_exif_sidecars(
    reader: &mut dyn MetadataReader,
    ctx: &BatchContext,
    file_names: &[String],
    output_dir: &Path,
) -> Result<usize> {
    info!("EXIF sidecar: {}件", file_names.len());

    let mut skipped = 0;
    for file_name in file_names {
        let source = ctx.path_of(file_name);
        let target = sidecar_path(output_dir, file_name, MIE_EXTENSION);
        debug!("MIE生成: {} -> {}", source.display(), target.display());

        reader.dump_mie(ctx.extension(), &source, &target)?;
        if !target.is_file() {
            warn!("MIEが生成されませんでした: {}", source.display());
            skipped += 1;
        }
    }

    Ok(skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::fake::FakeReader;
    use crate::metadata::{MetadataReader, TagMap};
    use tempfile::tempdir;

    fn context(dir: &Path, names: &[&str]) -> BatchContext {
        BatchContext::with_names(dir, "JPG", names.iter().map(|v| v.to_string()).collect())
    }

    #[test]
    fn html_dumps_are_written_per_file() {
        let source = tempdir().expect("tempdir");
        let out = tempdir().expect("tempdir");
        let mut reader = FakeReader {
            html: Some("<html>dump</html>".to_string()),
            ..FakeReader::default()
        };
        let ctx = context(source.path(), &["A.JPG", "ab-20240101-120000-00-S00-R0-B.JPG"]);

        let skipped =
            write_texif_full(&mut reader, &ctx, ctx.file_names(), out.path()).expect("must write");

        assert_eq!(skipped, 0);
        assert_eq!(
            fs::read_to_string(out.path().join("A.html")).expect("read"),
            "<html>dump</html>"
        );
        assert!(out
            .path()
            .join("ab-20240101-120000-00-S00-R0-B.html")
            .exists());
    }

    #[test]
    fn empty_html_dump_is_skipped() {
        let source = tempdir().expect("tempdir");
        let out = tempdir().expect("tempdir");
        let mut reader = FakeReader::default();
        let ctx = context(source.path(), &["A.JPG"]);

        let skipped =
            write_texif_full(&mut reader, &ctx, ctx.file_names(), out.path()).expect("must write");

        assert_eq!(skipped, 1);
        assert!(!out.path().join("A.html").exists());
    }

    #[test]
    fn mie_sidecars_are_written_per_file() {
        let source = tempdir().expect("tempdir");
        let out = tempdir().expect("tempdir");
        let mut reader = FakeReader::default();
        let ctx = context(source.path(), &["A.JPG", "B.JPG"]);

        let skipped = write_exif_sidecars(&mut reader, &ctx, ctx.file_names(), out.path())
            .expect("must write");

        assert_eq!(skipped, 0);
        assert_eq!(reader.dumps.len(), 2);
        assert_eq!(reader.dumps[0].0, source.path().join("A.JPG"));
        assert_eq!(fs::read(out.path().join("B.mie")).expect("read"), b"MIE");
    }

    struct SilentReader;

    impl MetadataReader for SilentReader {
        fn query_tags(&mut self, _: &Path, _: &str, _: &[&str]) -> Result<Vec<TagMap>> {
            Ok(Vec::new())
        }

        fn dump_mie(&mut self, _: &str, _: &Path, _: &Path) -> Result<()> {
            Ok(())
        }

        fn html_dump(&mut self, _: &str, _: &Path) -> Result<String> {
            Ok(String::new())
        }
    }

    #[test]
    fn missing_mie_counts_as_skipped() {
        let source = tempdir().expect("tempdir");
        let out = tempdir().expect("tempdir");
        let ctx = context(source.path(), &["A.JPG", "B.JPG"]);

        let skipped = write_exif_sidecars(&mut SilentReader, &ctx, ctx.file_names(), out.path())
            .expect("must write");

        assert_eq!(skipped, 2);
    }
}
