use crate::prompt::Prompter;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const FILE_LIST_NAME: &str = "output.txt";

/// Makes `dir` an empty directory. An existing one is replaced only after
/// the prompter confirms. Refuses directories that contain any of `sources`.
pub fn prepare_output_dir(
    dir: &Path,
    sources: &[&Path],
    prompter: &mut dyn Prompter,
) -> Result<()> {
    if !dir.is_dir() {
        info!("出力フォルダを作成します: {}", dir.display());
        return fs::create_dir_all(dir)
            .with_context(|| format!("出力フォルダを作成できませんでした: {}", dir.display()));
    }

    let target = absolute(dir)?;
    for source in sources {
        if absolute(source)?.starts_with(&target) {
            bail!(
                "出力フォルダ [{}] が入力フォルダ [{}] を含むため置き換えできません",
                dir.display(),
                source.display()
            );
        }
    }

    warn!("出力フォルダが既に存在します: {}", dir.display());
    let question = format!("[{}] を上書きします。続行しますか?", dir.display());
    if !prompter.confirm(&question)? {
        bail!("中止しました");
    }

    fs::remove_dir_all(dir)
        .with_context(|| format!("出力フォルダを削除できませんでした: {}", dir.display()))?;
    fs::create_dir_all(dir)
        .with_context(|| format!("出力フォルダを作成できませんでした: {}", dir.display()))
}

pub fn write_file_list(dir: &Path, lines: &[String]) -> Result<PathBuf> {
    let path = dir.join(FILE_LIST_NAME);
    let mut body = lines.join("\n");
    if !body.is_empty() {
        body.push('\n');
    }
    fs::write(&path, body)
        .with_context(|| format!("一覧を書き込めませんでした: {}", path.display()))?;
    Ok(path)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path)
        .with_context(|| format!("パスを解決できませんでした: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::scripted::ScriptedPrompter;
    use tempfile::tempdir;

    #[test]
    fn creates_missing_directory_without_asking() {
        let temp = tempdir().expect("tempdir");
        let out = temp.path().join("output").join("jpg");
        let mut prompter = ScriptedPrompter::new(&[]);

        prepare_output_dir(&out, &[temp.path()], &mut prompter).expect("must create");

        assert!(out.is_dir());
        assert!(prompter.asked.is_empty());
    }

    #[test]
    fn replaces_existing_directory_after_confirmation() {
        let temp = tempdir().expect("tempdir");
        let source = temp.path().join("photos");
        let out = temp.path().join("output");
        fs::create_dir_all(&source).expect("mkdir");
        fs::create_dir_all(&out).expect("mkdir");
        fs::write(out.join("stale.txt"), b"x").expect("write");
        let mut prompter = ScriptedPrompter::new(&["y"]);

        prepare_output_dir(&out, &[source.as_path()], &mut prompter).expect("must replace");

        assert!(out.is_dir());
        assert!(!out.join("stale.txt").exists());
        assert_eq!(prompter.asked.len(), 1);
    }

    #[test]
    fn declined_confirmation_keeps_directory() {
        let temp = tempdir().expect("tempdir");
        let out = temp.path().join("output");
        fs::create_dir_all(&out).expect("mkdir");
        fs::write(out.join("keep.txt"), b"x").expect("write");
        let mut prompter = ScriptedPrompter::new(&["n"]);

        assert!(prepare_output_dir(&out, &[], &mut prompter).is_err());
        assert!(out.join("keep.txt").exists());
    }

    #[test]
    fn refuses_to_replace_the_input_directory() {
        let temp = tempdir().expect("tempdir");
        let source = temp.path().join("photos");
        fs::create_dir_all(&source).expect("mkdir");
        fs::write(source.join("A.JPG"), b"a").expect("write");
        let mut prompter = ScriptedPrompter::new(&["y"]);

        assert!(prepare_output_dir(temp.path(), &[source.as_path()], &mut prompter).is_err());
        assert!(source.join("A.JPG").exists());
        assert!(prompter.asked.is_empty());
    }

    #[test]
    fn file_list_has_one_name_per_line() {
        let temp = tempdir().expect("tempdir");
        let path =
            write_file_list(temp.path(), &["A.JPG".to_string(), "B.JPG".to_string()]).expect("write");
        assert_eq!(fs::read_to_string(path).expect("read"), "A.JPG\nB.JPG\n");
    }
}
