use std::fmt;

use catalog_search_shared::RecordSummary;
use serde::Serialize;

/// Which records a rebuild covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebuildSelector {
    /// One record, removed and reinserted.
    One(String),
    /// An explicit list of records, upserted in order.
    Many(Vec<String>),
    /// Every record that is not deleted in the store of record.
    All,
}

/// Switches for a rebuild run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildOptions {
    /// Only index records the index does not already hold. `All` only.
    pub only_missing: bool,
    /// Log per-record failures and keep going instead of aborting.
    pub force: bool,
    /// Leave the index commit to a later `commit()` call.
    pub defer_commit: bool,
    /// Clear the index before repopulating. `All` only, ignored with `only_missing`.
    pub clear_first: bool,
    /// Suppress progress events.
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RebuildOutcome {
    Completed,
    /// `only_missing` found every record already indexed.
    NothingMissing,
}

/// What a rebuild did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RebuildSummary {
    pub total: usize,
    pub indexed: usize,
    pub failed_ids: Vec<String>,
    pub outcome: RebuildOutcome,
}

impl RebuildSummary {
    pub(crate) fn nothing_missing() -> Self {
        Self {
            total: 0,
            indexed: 0,
            failed_ids: Vec::new(),
            outcome: RebuildOutcome::NothingMissing,
        }
    }

    pub fn failed(&self) -> usize {
        self.failed_ids.len()
    }
}

impl fmt::Display for RebuildSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            RebuildOutcome::NothingMissing => write!(f, "All datasets are already indexed"),
            RebuildOutcome::Completed => write!(
                f,
                "Indexed {} of {} datasets ({} failed)",
                self.indexed,
                self.total,
                self.failed()
            ),
        }
    }
}

/// Drift between the store of record and the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub total_active: usize,
    pub missing: Vec<RecordSummary>,
}

impl CheckReport {
    pub fn missing_count(&self) -> usize {
        self.missing.len()
    }

    pub fn is_consistent(&self) -> bool {
        self.missing.is_empty()
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Datasets not indexed = {} out of {}",
            self.missing_count(),
            self.total_active
        )?;
        for record in &self.missing {
            let modified = record
                .metadata_modified
                .map(|m| m.to_rfc3339())
                .unwrap_or_else(|| "-".to_string());
            write!(f, "\n{} {}", modified, record.name)?;
        }
        Ok(())
    }
}

/// Steps of a bulk run, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RebuildPhase {
    Enumerating,
    Diffing,
    Clearing,
    Processing,
    Committing,
    Done,
    Aborted,
}

impl RebuildPhase {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Enumerating => "enumerating",
            Self::Diffing => "diffing",
            Self::Clearing => "clearing",
            Self::Processing => "processing",
            Self::Committing => "committing",
            Self::Done => "done",
            Self::Aborted => "aborted",
        }
    }
}
