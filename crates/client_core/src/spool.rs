//! JSON-lines file of answer sets whose submission failed, so they can be
//! imported into the store later.

use std::{
    fs::{self, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::protocol::AnswerSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpoolEntry {
    pub spooled_at: DateTime<Utc>,
    pub answer_set: AnswerSet,
}

#[derive(Debug, Clone)]
pub struct LocalSpool {
    path: PathBuf,
}

impl LocalSpool {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, answer_set: &AnswerSet) -> Result<SpoolEntry> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create spool directory '{}'", parent.display()))?;
        }

        let entry = SpoolEntry {
            spooled_at: Utc::now(),
            answer_set: answer_set.clone(),
        };
        let mut line = serde_json::to_string(&entry).context("failed to encode spool entry")?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open spool '{}'", self.path.display()))?;
        file.write_all(line.as_bytes())
            .with_context(|| format!("failed to write spool '{}'", self.path.display()))?;
        Ok(entry)
    }

    /// Reads every entry; a missing file is an empty spool.
    pub fn read_all(&self) -> Result<Vec<SpoolEntry>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read spool '{}'", self.path.display()))
            }
        };

        raw.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(number, line)| {
                serde_json::from_str(line).with_context(|| {
                    format!(
                        "malformed spool entry at {}:{}",
                        self.path.display(),
                        number + 1
                    )
                })
            })
            .collect()
    }
}
