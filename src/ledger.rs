//! Persisted set of post ids that already received a reply.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug)]
pub struct ReplyLedger {
    path: PathBuf,
    replied: BTreeSet<String>,
}

impl ReplyLedger {
    /// Load the ledger at `path`. A missing file is an empty ledger; an
    /// unreadable or malformed one is an error so duplicates cannot slip
    /// through after a bad write.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let replied = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("reading ledger {}", path.display()))?;
            let ids: Vec<String> = serde_json::from_str(&contents)
                .with_context(|| format!("parsing ledger {}", path.display()))?;
            ids.into_iter().collect()
        } else {
            BTreeSet::new()
        };

        tracing::debug!(path = %path.display(), entries = replied.len(), "Loaded reply ledger");
        Ok(Self { path, replied })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, post_id: &str) -> bool {
        self.replied.contains(post_id)
    }

    pub fn len(&self) -> usize {
        self.replied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replied.is_empty()
    }

    /// Add `post_id` and rewrite the file. The id stays recorded in memory
    /// even when the write fails.
    pub fn record(&mut self, post_id: &str) -> Result<()> {
        self.replied.insert(post_id.to_string());
        self.save()
    }

    /// Rewrite the whole file through a sibling temp file and a rename, so
    /// a crash mid-write leaves the previous ledger intact.
    pub fn save(&self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

        let ids: Vec<&String> = self.replied.iter().collect();
        let json = serde_json::to_string(&ids)?;

        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("creating temp file in {}", dir.display()))?;
        tmp.write_all(json.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .with_context(|| format!("writing ledger {}", self.path.display()))?;
        tmp.persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| format!("replacing ledger {}", self.path.display()))?;
        Ok(())
    }
}
