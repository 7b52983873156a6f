//! Append-only logs of image/prompt pairs.

use std::collections::HashSet;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Database, DbError};

/// Which log a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    /// Every image returned by the generation provider.
    Generated,
    /// Images picked in the chooser and shown on the frame.
    Chosen,
}

impl LogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generated => "generated",
            Self::Chosen => "chosen",
        }
    }
}

/// An image and the prompt that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub image_path: PathBuf,
    pub prompt: String,
}

impl ImageRecord {
    pub fn new(image_path: impl Into<PathBuf>, prompt: impl Into<String>) -> Self {
        Self {
            image_path: image_path.into(),
            prompt: prompt.into(),
        }
    }
}

impl Database {
    /// Append records to the end of a log, in order.
    pub fn append_images(&self, kind: LogKind, records: &[ImageRecord]) -> Result<(), DbError> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO image_log (log_kind, image_path, prompt) VALUES (?1, ?2, ?3)",
                )?;
                for record in records {
                    stmt.execute(rusqlite::params![
                        kind.as_str(),
                        record.image_path.to_string_lossy(),
                        record.prompt,
                    ])?;
                }
            }
            tx.commit()?;
            Ok(())
        })?;
        tracing::debug!(kind = kind.as_str(), count = records.len(), "Appended image records");
        Ok(())
    }

    /// Most recent distinct images of a log, newest first.
    ///
    /// An image logged several times is reported once, with the prompt of its
    /// latest entry.
    pub fn recent_unique_images(&self, kind: LogKind, limit: usize) -> Result<Vec<ImageRecord>, DbError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT image_path, prompt FROM image_log
                 WHERE log_kind = ?1
                 ORDER BY id DESC",
            )?;
            let rows = stmt.query_map([kind.as_str()], |row| {
                Ok(ImageRecord {
                    image_path: PathBuf::from(row.get::<_, String>(0)?),
                    prompt: row.get(1)?,
                })
            })?;

            let mut seen = HashSet::new();
            let mut records = Vec::new();
            for row in rows {
                let record = row?;
                if seen.insert(record.image_path.clone()) {
                    records.push(record);
                }
                if records.len() >= limit {
                    break;
                }
            }
            Ok(records)
        })
    }

    /// Number of entries in a log, duplicates included.
    pub fn count_images(&self, kind: LogKind) -> Result<usize, DbError> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM image_log WHERE log_kind = ?1",
                [kind.as_str()],
                |row| row.get(0),
            )?;
            Ok(count as usize)
        })
    }

    /// Delete every entry of a log. Returns the number removed.
    pub fn clear_log(&self, kind: LogKind) -> Result<usize, DbError> {
        let removed = self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM image_log WHERE log_kind = ?1", [kind.as_str()])?;
            Ok(n)
        })?;
        tracing::info!(kind = kind.as_str(), removed, "Cleared image log");
        Ok(removed)
    }

    /// Import a plain-text log of `file_name,prompt` lines.
    ///
    /// File names are resolved against `image_dir`. The prompt is everything
    /// after the first comma. Blank lines are skipped; a line without a comma
    /// is rejected.
    pub fn import_text_log(&self, kind: LogKind, log_path: &Path, image_dir: &Path) -> Result<usize, DbError> {
        let file = std::fs::File::open(log_path)?;
        let mut records = Vec::new();
        for (i, line) in std::io::BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let (name, prompt) = line.split_once(',').ok_or_else(|| {
                DbError::InvalidData(format!("{}:{}: expected `file,prompt`", log_path.display(), i + 1))
            })?;
            records.push(ImageRecord::new(image_dir.join(name.trim()), prompt));
        }
        self.append_images(kind, &records)?;
        tracing::info!(
            kind = kind.as_str(),
            count = records.len(),
            path = %log_path.display(),
            "Imported text log"
        );
        Ok(records.len())
    }
}
