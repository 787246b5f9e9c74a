use crate::checker::{chunk_default, prompt_chunk_value};
use crate::config::ChunkDefaults;
use crate::context::{BatchContext, BatchError};
use crate::filename::{validate_initials, CanonicalName, FileNameChunk};
use crate::filter::{FileFilter, FormattedEntry};
use crate::metadata::{capture_timestamp, MetadataReader, DATE_TIME_ORIGINAL, FILE_NAME};
use crate::prompt::Prompter;
use crate::rating::Rating;
use crate::sequence::{SequenceAssigner, SENTINEL_TIMESTAMP};
use crate::style::Style;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameCandidate {
    pub original_path: PathBuf,
    pub target_path: PathBuf,
    pub new_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameStats {
    pub scanned: usize,
    pub planned: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamePlan {
    pub candidates: Vec<RenameCandidate>,
    pub stats: RenameStats,
}

impl RenamePlan {
    pub fn ensure_not_empty(&self) -> Result<(), BatchError> {
        if self.candidates.is_empty() {
            return Err(BatchError::NothingToProcess);
        }
        Ok(())
    }

    pub fn new_names(&self) -> Vec<String> {
        self.candidates.iter().map(|c| c.new_name.clone()).collect()
    }

    fn push(&mut self, ctx: &BatchContext, raw: &str, name: &CanonicalName, output_dir: &Path) {
        let new_name = name.to_string();
        self.candidates.push(RenameCandidate {
            original_path: ctx.path_of(raw),
            target_path: output_dir.join(&new_name),
            new_name,
        });
        self.stats.planned += 1;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    #[default]
    Bulk,
    PerFile,
}

pub fn plan_full_rename(
    reader: &mut dyn MetadataReader,
    ctx: &BatchContext,
    initials: &str,
    output_dir: &Path,
) -> Result<RenamePlan> {
    let initials = validate_initials(initials)?;
    let filtered = FileFilter::new().unformatted(ctx.file_names());
    if filtered.is_empty() {
        return Err(BatchError::NothingToProcess.into());
    }

    let mut plan = RenamePlan {
        stats: RenameStats {
            scanned: ctx.file_names().len(),
            skipped: filtered.skipped,
            ..RenameStats::default()
        },
        ..RenamePlan::default()
    };

    let timestamps: HashMap<String, Option<String>> = reader
        .query_tags(ctx.directory(), ctx.extension(), &[DATE_TIME_ORIGINAL])?
        .into_iter()
        .filter_map(|tags| {
            let file_name = tags.get(FILE_NAME)?.clone();
            Some((file_name, capture_timestamp(&tags)))
        })
        .collect();

    let mut assigner = SequenceAssigner::new();
    let mut planned = HashSet::new();
    for raw in &filtered.accepted {
        let timestamp = timestamps.get(raw).and_then(|ts| ts.as_deref());
        if timestamp.is_none() {
            warn!("[{raw}] の撮影日時が取得できないため {SENTINEL_TIMESTAMP} を使用します");
        }
        let sequence = assigner.assign_or_sentinel(timestamp);

        let name = match CanonicalName::new(
            &initials,
            timestamp.unwrap_or(SENTINEL_TIMESTAMP),
            sequence,
            Style::None,
            Rating::None,
            raw,
        ) {
            Ok(name) => name,
            Err(err) => {
                warn!("[{raw}] をスキップします: {err}");
                plan.stats.skipped += 1;
                continue;
            }
        };

        if !planned.insert(name.to_string()) {
            warn!("[{raw}] の変更先 [{name}] が重複するためスキップします");
            plan.stats.skipped += 1;
            continue;
        }

        debug!("{raw} -> {name}");
        plan.push(ctx, raw, &name, output_dir);
    }

    info!(
        "リネーム計画: {}件 (スキップ {}件)",
        plan.stats.planned, plan.stats.skipped
    );
    Ok(plan)
}

pub fn plan_field_edit(
    ctx: &BatchContext,
    filter: &FileFilter,
    chunks: &[FileNameChunk],
    mode: EditMode,
    prompter: &mut dyn Prompter,
    defaults: &ChunkDefaults,
    output_dir: &Path,
) -> Result<RenamePlan> {
    let filtered = filter.formatted(ctx.file_names());
    if filtered.is_empty() {
        return Err(BatchError::NothingToProcess.into());
    }

    let mut plan = RenamePlan {
        stats: RenameStats {
            scanned: ctx.file_names().len(),
            skipped: filtered.skipped,
            ..RenameStats::default()
        },
        ..RenamePlan::default()
    };

    let mut bulk_values = Vec::new();
    if mode == EditMode::Bulk {
        for chunk in chunks {
            let value = prompt_chunk_value(*chunk, prompter, chunk_default(*chunk, defaults))?;
            bulk_values.push((*chunk, value));
        }
    }

    let mut planned = HashSet::new();
    for FormattedEntry { raw, mut name } in filtered.accepted {
        let values = match mode {
            EditMode::Bulk => bulk_values.clone(),
            EditMode::PerFile => {
                info!("[{raw}] を編集します");
                let mut values = Vec::with_capacity(chunks.len());
                for chunk in chunks {
                    let current = name.value_of(*chunk);
                    values.push((*chunk, prompt_chunk_value(*chunk, prompter, &current)?));
                }
                values
            }
        };

        let updated = values
            .iter()
            .try_for_each(|(chunk, value)| name.update(*chunk, value));
        if let Err(err) = updated {
            warn!("[{raw}] をスキップします: {err}");
            plan.stats.skipped += 1;
            continue;
        }

        if !planned.insert(name.to_string()) {
            warn!("[{raw}] の変更先 [{name}] が重複するためスキップします");
            plan.stats.skipped += 1;
            continue;
        }

        debug!("{raw} -> {name}");
        plan.push(ctx, &raw, &name, output_dir);
    }

    info!(
        "編集計画: {}件 (スキップ {}件)",
        plan.stats.planned, plan.stats.skipped
    );
    Ok(plan)
}

pub fn plan_transfer(ctx: &BatchContext, file_names: &[String], output_dir: &Path) -> RenamePlan {
    let mut plan = RenamePlan {
        stats: RenameStats {
            scanned: ctx.file_names().len(),
            skipped: ctx.file_names().len().saturating_sub(file_names.len()),
            ..RenameStats::default()
        },
        ..RenamePlan::default()
    };
    for raw in file_names {
        plan.candidates.push(RenameCandidate {
            original_path: ctx.path_of(raw),
            target_path: output_dir.join(raw),
            new_name: raw.clone(),
        });
        plan.stats.planned += 1;
    }
    plan
}
