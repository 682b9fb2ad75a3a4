//! Batch driver over a source directory tree.
//!
//! Computes the candidate path set once, recreates the destination tree,
//! then runs every source file through the filter and rewriter
//! sequentially. There is no retry and no partial-batch checkpointing; a
//! file that cannot be read aborts the whole run.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::context::RunContext;
use crate::detector::find_transform_targets_in_file;
use crate::errors::RewrapError;
use crate::filter::applicable_paths;
use crate::rewriter::{rewrite, DocumentOutcome, DocumentRewrite};
use crate::schema::read_documents;
use crate::store::{object_key, ObjectStore};
use crate::types::{SchemaPathString, StoreKey};
use crate::utils::readable_time;

/// Optional upload destination for rewritten documents.
pub struct UploadTarget {
    /// Store receiving rewritten documents.
    pub store: Arc<dyn ObjectStore>,
    /// Key prefix uploads are placed under.
    pub key_prefix: StoreKey,
}

/// Batch run configuration.
pub struct BatchConfig {
    /// Directory tree of source documents.
    pub source_dir: PathBuf,
    /// Destination tree, recreated on every run.
    pub dest_dir: PathBuf,
    /// Representative corpus schema used to flag candidate paths.
    pub schema_path: PathBuf,
    /// Optional upload destination.
    pub upload: Option<UploadTarget>,
}

/// Outcome of one processed source file.
#[derive(Serialize)]
pub struct DocumentReport {
    /// Source file path.
    pub source: PathBuf,
    /// Terminal state, including upload failures.
    pub outcome: DocumentOutcome,
    /// Rewrite tallies for the file's documents.
    pub rewrite: DocumentRewrite,
}

/// Tallies for one batch run.
#[derive(Serialize)]
pub struct RunSummary {
    /// Wall-clock start of the run.
    pub started_at: DateTime<Utc>,
    /// Documents written (and uploaded, when configured).
    pub success: usize,
    /// Documents left unwritten or failed during upload.
    pub failed: usize,
    /// Elapsed wall-clock time.
    pub elapsed: Duration,
    /// Per-file reports in traversal order.
    pub reports: Vec<DocumentReport>,
}

impl RunSummary {
    /// Total number of processed files.
    pub fn total(&self) -> usize {
        self.success + self.failed
    }
}

/// Run the full normalization batch.
pub fn run(ctx: &RunContext, config: &BatchConfig) -> Result<RunSummary, RewrapError> {
    let started_at = Utc::now();
    let started = Instant::now();

    let candidates = find_transform_targets_in_file(&config.schema_path)?;
    debug!(candidates = candidates.len(), "computed candidate path set");

    reset_dest_dir(&config.dest_dir)?;

    let mut reports = Vec::new();
    let (mut success, mut failed) = (0usize, 0usize);
    for entry in WalkDir::new(&config.source_dir).sort_by_file_name() {
        let entry = entry.map_err(|error| {
            RewrapError::Storage(format!("source traversal failed: {error}"))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let report = process_document(ctx, config, &candidates, entry.path())?;
        match report.outcome {
            DocumentOutcome::Success => success += 1,
            DocumentOutcome::Failed => failed += 1,
        }
        reports.push(report);
    }

    let elapsed = started.elapsed();
    info!(
        success,
        failed,
        elapsed = %readable_time(elapsed.as_secs_f64()),
        "batch complete"
    );
    Ok(RunSummary {
        started_at,
        success,
        failed,
        elapsed,
        reports,
    })
}

fn process_document(
    ctx: &RunContext,
    config: &BatchConfig,
    candidates: &BTreeSet<SchemaPathString>,
    source_path: &Path,
) -> Result<DocumentReport, RewrapError> {
    debug!(path = %source_path.display(), "processing document");
    let applicable = applicable_paths(source_path, candidates)?;
    let mut documents = read_documents(source_path)?;

    let mut outcome = DocumentOutcome::Success;
    let mut paths = Vec::new();
    for document in &mut documents {
        let result = rewrite(document, &applicable);
        if !result.is_success() {
            outcome = DocumentOutcome::Failed;
        }
        paths.extend(result.paths);
    }
    let rewrite_result = DocumentRewrite { outcome, paths };

    if rewrite_result.outcome == DocumentOutcome::Failed {
        debug!(path = %source_path.display(), "transformation failed; document left unwritten");
        return Ok(DocumentReport {
            source: source_path.to_path_buf(),
            outcome: DocumentOutcome::Failed,
            rewrite: rewrite_result,
        });
    }

    let file_name = source_path.file_name().ok_or_else(|| {
        RewrapError::Storage(format!("'{}' has no file name", source_path.display()))
    })?;
    let staged = ctx.scratch_path(file_name);
    fs::write(&staged, serialize_documents(&documents, source_path)?)?;

    let destination = destination_path(config, source_path)?;
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }
    promote(&staged, &destination)?;
    debug!(path = %destination.display(), "rewritten document written");

    let mut report_outcome = rewrite_result.outcome;
    if let Some(target) = &config.upload {
        let key = object_key(&target.key_prefix, &file_name.to_string_lossy());
        match target.store.put_file(&destination, &key) {
            Ok(()) => {
                debug!(store = target.store.id(), key = %key, "rewritten document uploaded");
            }
            Err(error) => {
                warn!(store = target.store.id(), key = %key, %error, "upload failed");
                report_outcome = DocumentOutcome::Failed;
            }
        }
    }

    Ok(DocumentReport {
        source: source_path.to_path_buf(),
        outcome: report_outcome,
        rewrite: rewrite_result,
    })
}

fn reset_dest_dir(dest_dir: &Path) -> Result<(), RewrapError> {
    if dest_dir.exists() {
        fs::remove_dir_all(dest_dir).map_err(|error| {
            RewrapError::Storage(format!(
                "cannot clear destination '{}': {error}",
                dest_dir.display()
            ))
        })?;
    }
    fs::create_dir_all(dest_dir).map_err(|error| {
        RewrapError::Storage(format!(
            "cannot create destination '{}': {error}",
            dest_dir.display()
        ))
    })
}

fn destination_path(config: &BatchConfig, source_path: &Path) -> Result<PathBuf, RewrapError> {
    let relative = source_path
        .strip_prefix(&config.source_dir)
        .map_err(|_| {
            RewrapError::Storage(format!(
                "'{}' is outside the source tree",
                source_path.display()
            ))
        })?;
    Ok(config.dest_dir.join(relative))
}

fn serialize_documents(documents: &[Value], source_path: &Path) -> Result<String, RewrapError> {
    let mut lines = Vec::with_capacity(documents.len());
    for document in documents {
        lines.push(
            serde_json::to_string(document).map_err(|source| RewrapError::Json {
                path: source_path.display().to_string(),
                source,
            })?,
        );
    }
    Ok(match lines.len() {
        0 => String::new(),
        1 => lines.pop().unwrap_or_default(),
        _ => lines.join("\n") + "\n",
    })
}

fn promote(staged: &Path, destination: &Path) -> Result<(), RewrapError> {
    if fs::rename(staged, destination).is_ok() {
        return Ok(());
    }
    fs::copy(staged, destination).map_err(|error| {
        RewrapError::Storage(format!(
            "cannot place rewritten document at '{}': {error}",
            destination.display()
        ))
    })?;
    let _ = fs::remove_file(staged);
    Ok(())
}
