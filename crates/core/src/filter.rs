use crate::checker::Checker;
use crate::config::ChunkDefaults;
use crate::filename::{CanonicalName, FileNameChunk};
use crate::prompt::Prompter;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    #[default]
    None,
    Formatted,
    Unformatted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedEntry {
    pub raw: String,
    pub name: CanonicalName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filtered<T> {
    pub accepted: Vec<T>,
    pub skipped: usize,
}

impl<T> Filtered<T> {
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct FileFilter {
    checkers: Vec<Checker>,
}

impl Default for FileFilter {
    fn default() -> Self {
        Self {
            checkers: vec![Checker::Hidden],
        }
    }
}

impl FileFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_checker(mut self, checker: Checker) -> Self {
        self.checkers.push(checker);
        self
    }

    pub fn checkers(&self) -> &[Checker] {
        &self.checkers
    }

    pub fn prompt_checkers(
        mut self,
        chunks: &[FileNameChunk],
        prompter: &mut dyn Prompter,
        defaults: &ChunkDefaults,
    ) -> Result<Self> {
        for chunk in chunks {
            self.checkers
                .push(Checker::prompt_build(*chunk, prompter, defaults)?);
        }
        Ok(self)
    }

    pub fn formatted(&self, names: &[String]) -> Filtered<FormattedEntry> {
        info!("整形済みファイル名で絞り込みます");
        let mut accepted = Vec::new();
        let mut skipped = 0usize;

        for raw in sorted(names) {
            debug!("チェック中: {raw}");
            if let Some(rejected) = self.reject_raw(&raw) {
                skip(&raw, &rejected.message());
                skipped += 1;
                continue;
            }

            let name = match CanonicalName::decode(&raw) {
                Ok(name) => name,
                Err(err) => {
                    warn!("[{raw}] は未整形のためスキップします: {err}");
                    skipped += 1;
                    continue;
                }
            };

            if let Some(rejected) = self
                .checkers
                .iter()
                .filter(|c| !c.checks_raw())
                .find(|c| !c.check(&name))
            {
                skip(&raw, &rejected.message());
                skipped += 1;
                continue;
            }

            accepted.push(FormattedEntry { raw, name });
        }

        report_skipped(skipped);
        Filtered { accepted, skipped }
    }

    pub fn unformatted(&self, names: &[String]) -> Filtered<String> {
        info!("未整形ファイル名で絞り込みます");
        let mut accepted = Vec::new();
        let mut skipped = 0usize;

        for raw in sorted(names) {
            debug!("チェック中: {raw}");
            if let Some(rejected) = self.reject_raw(&raw) {
                skip(&raw, &rejected.message());
                skipped += 1;
                continue;
            }

            if CanonicalName::decode(&raw).is_ok() {
                warn!("[{raw}] は整形済みのためスキップします");
                skipped += 1;
                continue;
            }

            accepted.push(raw);
        }

        report_skipped(skipped);
        Filtered { accepted, skipped }
    }

    pub fn any(&self, names: &[String]) -> Filtered<String> {
        let mut accepted = Vec::new();
        let mut skipped = 0usize;

        for raw in sorted(names) {
            if let Some(rejected) = self.reject_raw(&raw) {
                skip(&raw, &rejected.message());
                skipped += 1;
                continue;
            }
            accepted.push(raw);
        }

        Filtered { accepted, skipped }
    }

    pub fn select(&self, mode: FilterMode, names: &[String]) -> Filtered<String> {
        match mode {
            FilterMode::None => self.any(names),
            FilterMode::Unformatted => self.unformatted(names),
            FilterMode::Formatted => {
                let filtered = self.formatted(names);
                Filtered {
                    accepted: filtered.accepted.into_iter().map(|e| e.raw).collect(),
                    skipped: filtered.skipped,
                }
            }
        }
    }

    fn reject_raw(&self, raw: &str) -> Option<&Checker> {
        self.checkers
            .iter()
            .filter(|c| c.checks_raw())
            .find(|c| !c.check_raw(raw))
    }
}

fn sorted(names: &[String]) -> Vec<String> {
    let mut names = names.to_vec();
    names.sort();
    names
}

fn skip(raw: &str, reason: &str) {
    warn!("[{raw}] をスキップします: {reason}");
}

fn report_skipped(skipped: usize) {
    if skipped > 0 {
        warn!("{skipped}件のファイルをスキップしました");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Style;
    use std::collections::BTreeSet;

    fn batch() -> Vec<String> {
        [
            "JD-20240101-120000-01-S00-R0-B.JPG",
            "DSCF0003.JPG",
            ".DS_Store",
            "JD-20240101-120000-00-S11-R3-A.JPG",
            "JD-2024-broken.JPG",
            ".JD-20240101-120000-00-S00-R0-hidden.JPG",
            "AB-20240102-080000-00-S11-R0-C.JPG",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[test]
    fn formatted_keeps_decodable_names_in_sorted_order() {
        let filtered = FileFilter::new().formatted(&batch());
        let raws: Vec<&str> = filtered.accepted.iter().map(|e| e.raw.as_str()).collect();
        assert_eq!(
            raws,
            vec![
                "AB-20240102-080000-00-S11-R0-C.JPG",
                "JD-20240101-120000-00-S11-R3-A.JPG",
                "JD-20240101-120000-01-S00-R0-B.JPG",
            ]
        );
        assert_eq!(filtered.skipped, 4);
    }

    #[test]
    fn checkers_are_anded() {
        let filter = FileFilter::new()
            .with_checker(Checker::Initials("JD".to_string()))
            .with_checker(Checker::Style(Style::Landscape));
        let filtered = filter.formatted(&batch());
        assert_eq!(filtered.accepted.len(), 1);
        assert_eq!(filtered.accepted[0].name.original(), "A.JPG");
    }

    #[test]
    fn unformatted_inverts_polarity_but_keeps_hidden_check() {
        let filtered = FileFilter::new().unformatted(&batch());
        assert_eq!(
            filtered.accepted,
            vec!["DSCF0003.JPG".to_string(), "JD-2024-broken.JPG".to_string()]
        );
        assert_eq!(filtered.skipped, 5);
    }

    #[test]
    fn formatted_and_unformatted_partition_visible_names() {
        let names = batch();
        let filter = FileFilter::new();
        let formatted: BTreeSet<String> = filter
            .formatted(&names)
            .accepted
            .into_iter()
            .map(|e| e.raw)
            .collect();
        let unformatted: BTreeSet<String> = filter.unformatted(&names).accepted.into_iter().collect();

        assert!(formatted.is_disjoint(&unformatted));
        let union: BTreeSet<String> = formatted.union(&unformatted).cloned().collect();
        let visible: BTreeSet<String> = names.into_iter().filter(|n| !n.starts_with('.')).collect();
        assert_eq!(union, visible);
    }

    #[test]
    fn select_none_only_drops_hidden() {
        let filtered = FileFilter::new().select(FilterMode::None, &batch());
        assert_eq!(filtered.accepted.len(), 5);
        assert_eq!(filtered.skipped, 2);
        assert_eq!(filtered.accepted[0], "AB-20240102-080000-00-S11-R0-C.JPG");
    }

    #[test]
    fn empty_batch_is_not_an_error() {
        let filtered = FileFilter::new().formatted(&[]);
        assert!(filtered.is_empty());
        assert_eq!(filtered.skipped, 0);
    }
}
