use crate::planner::{RenameCandidate, RenamePlan};
use anyhow::{bail, Context, Result};
use filetime::FileTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApplyResult {
    pub applied: usize,
    pub unchanged: usize,
}

pub trait Transfer {
    fn transfer(&mut self, from: &Path, to: &Path) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferMode {
    Copy,
    #[default]
    Move,
}

impl TransferMode {
    pub fn keep_original(keep: bool) -> Self {
        if keep {
            Self::Copy
        } else {
            Self::Move
        }
    }
}

impl Transfer for TransferMode {
    fn transfer(&mut self, from: &Path, to: &Path) -> Result<()> {
        match self {
            TransferMode::Copy => {
                debug!("コピー: {} -> {}", from.display(), to.display());
                fs::copy(from, to).with_context(|| {
                    format!("コピーに失敗しました: {} -> {}", from.display(), to.display())
                })?;
                copy_file_times(from, to)?;
            }
            TransferMode::Move => {
                debug!("移動: {} -> {}", from.display(), to.display());
                if fs::rename(from, to).is_err() {
                    // Crossing filesystems.
                    fs::copy(from, to).with_context(|| {
                        format!("移動に失敗しました: {} -> {}", from.display(), to.display())
                    })?;
                    copy_file_times(from, to)?;
                    fs::remove_file(from).with_context(|| {
                        format!("移動元の削除に失敗しました: {}", from.display())
                    })?;
                }
            }
        }
        Ok(())
    }
}

fn copy_file_times(from: &Path, to: &Path) -> Result<()> {
    let metadata = fs::metadata(from)
        .with_context(|| format!("ファイル情報を読めませんでした: {}", from.display()))?;
    let atime = FileTime::from_last_access_time(&metadata);
    let mtime = FileTime::from_last_modification_time(&metadata);
    filetime::set_file_times(to, atime, mtime)
        .with_context(|| format!("タイムスタンプを設定できませんでした: {}", to.display()))
}

/// Transfers every candidate in order. Transfers already done stay in place
/// when a later one fails.
pub fn apply_plan(plan: &RenamePlan, transfer: &mut dyn Transfer) -> Result<ApplyResult> {
    validate_apply_candidates(&plan.candidates)?;

    let mut applied = 0usize;
    let mut unchanged = 0usize;
    for candidate in &plan.candidates {
        if same_file(&candidate.original_path, &candidate.target_path) {
            info!(
                "移動元と移動先が同じため何もしません: {}",
                candidate.original_path.display()
            );
            unchanged += 1;
            continue;
        }

        if let Some(parent) = candidate.target_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("出力フォルダを作成できませんでした: {}", parent.display())
            })?;
        }
        transfer.transfer(&candidate.original_path, &candidate.target_path)?;
        applied += 1;
    }

    info!("適用完了: {applied}件 (変更なし {unchanged}件)");
    Ok(ApplyResult { applied, unchanged })
}

fn validate_apply_candidates(candidates: &[RenameCandidate]) -> Result<()> {
    let mut seen_original_paths = HashSet::<PathBuf>::new();
    let mut seen_target_paths = HashSet::<PathBuf>::new();

    for candidate in candidates {
        if !candidate.original_path.is_file() {
            bail!(
                "元ファイルが存在しません: {}",
                candidate.original_path.display()
            );
        }
        if !seen_original_paths.insert(candidate.original_path.clone()) {
            bail!(
                "重複した元ファイルが含まれています: {}",
                candidate.original_path.display()
            );
        }
        if !seen_target_paths.insert(candidate.target_path.clone()) {
            bail!(
                "重複したリネーム先が含まれています: {}",
                candidate.target_path.display()
            );
        }
    }

    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
