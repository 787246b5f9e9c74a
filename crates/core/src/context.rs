use crate::metadata::{MetadataReader, FILE_NAME};
use anyhow::Result;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BatchError {
    #[error("フォルダが存在しません: {0}")]
    MissingDirectory(PathBuf),
    #[error("フォルダ [{directory}] に拡張子 [{extension}] のファイルがありません")]
    NoMatchingFiles { directory: PathBuf, extension: String },
    #[error("処理対象のファイルがありません")]
    NothingToProcess,
    #[error("プリセット [{0}] が見つかりません")]
    UnknownPreset(String),
    #[error("プリセットを自動選択できませんでした: [{0}] を判別できません")]
    PresetSelection(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchContext {
    directory: PathBuf,
    extension: String,
    file_names: Vec<String>,
}

impl BatchContext {
    pub fn load(
        reader: &mut dyn MetadataReader,
        directory: &Path,
        extension: &str,
    ) -> Result<Self> {
        if !directory.is_dir() {
            return Err(BatchError::MissingDirectory(directory.to_path_buf()).into());
        }

        info!("作業フォルダ: {}", directory.display());
        let tags = reader.query_tags(directory, extension, &[FILE_NAME])?;
        let file_names: Vec<String> = tags
            .into_iter()
            .filter_map(|mut tags| tags.remove(FILE_NAME))
            .collect();

        if file_names.is_empty() {
            return Err(BatchError::NoMatchingFiles {
                directory: directory.to_path_buf(),
                extension: extension.to_string(),
            }
            .into());
        }

        Ok(Self::with_names(directory, extension, file_names))
    }

    pub fn with_names(directory: &Path, extension: &str, mut file_names: Vec<String>) -> Self {
        file_names.sort();
        file_names.dedup();
        Self {
            directory: directory.to_path_buf(),
            extension: extension.to_string(),
            file_names,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn file_names(&self) -> &[String] {
        &self.file_names
    }

    pub fn path_of(&self, file_name: &str) -> PathBuf {
        self.directory.join(file_name)
    }
}


#[cfg(test)]
mod tests {
    use super::fake::FakeReader;
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_sorts_names() {
        let temp = tempdir().expect("tempdir");
        let mut reader = FakeReader::default().file("B.JPG", &[]).file("A.JPG", &[]);
        let ctx = BatchContext::load(&mut reader, temp.path(), "JPG").expect("must load");
        assert_eq!(ctx.file_names(), &["A.JPG".to_string(), "B.JPG".to_string()]);
        assert_eq!(ctx.path_of("A.JPG"), temp.path().join("A.JPG"));
    }

    #[test]
    fn load_fails_without_matches() {
        let temp = tempdir().expect("tempdir");
        let mut reader = FakeReader::default();
        let err = BatchContext::load(&mut reader, temp.path(), "RAF").expect_err("must fail");
        assert!(matches!(
            err.downcast_ref::<BatchError>(),
            Some(BatchError::NoMatchingFiles { .. })
        ));
    }

    #[test]
    fn load_fails_for_missing_directory() {
        let temp = tempdir().expect("tempdir");
        let mut reader = FakeReader::default().file("A.JPG", &[]);
        let missing = temp.path().join("nope");
        let err = BatchContext::load(&mut reader, &missing, "JPG").expect_err("must fail");
        assert_eq!(
            err.downcast_ref::<BatchError>(),
            Some(&BatchError::MissingDirectory(missing))
        );
        assert_eq!(reader.queries, 0);
    }
}
