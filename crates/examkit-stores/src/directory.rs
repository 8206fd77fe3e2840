//! Exam source and result store over local directories.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;

use examkit_core::model::Exam;
use examkit_core::parser::{load_exam_directory, parse_exam};
use examkit_core::traits::{ExamSource, ResultStore, SaveResultRequest};

use crate::error::StoreError;

/// Reads exams from TOML or JSON files under a directory.
///
/// `<id>.toml` and `<id>.json` are tried first. Otherwise every exam file
/// under the directory is parsed and matched on its `id`.
pub struct DirectoryExamSource {
    root: PathBuf,
}

impl DirectoryExamSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn find_exam(root: &Path, id: &str) -> anyhow::Result<Option<Exam>> {
    if !root.is_dir() {
        anyhow::bail!("exam directory not found: {}", root.display());
    }

    for ext in ["toml", "json"] {
        let candidate = root.join(format!("{id}.{ext}"));
        if candidate.is_file() {
            let exam = parse_exam(&candidate)?;
            if exam.id == id {
                return Ok(Some(exam));
            }
        }
    }

    Ok(load_exam_directory(root)?.into_iter().find(|e| e.id == id))
}

#[async_trait]
impl ExamSource for DirectoryExamSource {
    fn name(&self) -> &str {
        "directory"
    }

    async fn get_exam_by_id(&self, id: &str) -> anyhow::Result<Option<Exam>> {
        // Ids are looked up as file names; keep them inside the root.
        if id.contains(['/', '\\']) || id.contains("..") {
            return Ok(None);
        }
        let root = self.root.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || find_exam(&root, &id))
            .await
            .context("exam lookup task failed")?
    }
}

/// Writes each result to `<root>/<exam_id>/<attempt_id>.json`.
pub struct DirectoryResultStore {
    root: PathBuf,
}

impl DirectoryResultStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path a request will be written to.
    pub fn path_for(&self, request: &SaveResultRequest) -> PathBuf {
        self.root
            .join(sanitize(&request.test_id))
            .join(format!("{}.json", request.attempt_id))
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[async_trait]
impl ResultStore for DirectoryResultStore {
    fn name(&self) -> &str {
        "directory"
    }

    async fn save_result(&self, request: &SaveResultRequest) -> anyhow::Result<()> {
        let path = self.path_for(request);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }

        let json = serde_json::to_string_pretty(request).context("failed to serialize result")?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| StoreError::io(&path, e))?;

        tracing::debug!(path = %path.display(), "result written");
        Ok(())
    }
}
