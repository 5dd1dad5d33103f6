//! 히스토리 파일 저장소 어댑터.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::application::history::dedupe_keep_last;
use crate::application::ports::HistoryStore;

const HISTORY_FILE_NAME: &str = "history";

/// 줄 단위 UTF-8 히스토리 파일.
#[derive(Debug, Clone)]
pub struct FileHistory {
    path: PathBuf,
    max_entries: usize,
}

impl FileHistory {
    pub fn new(path: impl Into<PathBuf>, max_entries: usize) -> Self {
        Self {
            path: path.into(),
            max_entries,
        }
    }

    /// 설정 경로가 없으면 사용자 설정 디렉터리를 사용한다.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|base| base.join("cmdshell").join(HISTORY_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for FileHistory {
    fn load(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read history at {}", self.path.display()))?;
        Ok(dedupe_keep_last(raw.lines().map(ToString::to_string).collect()))
    }

    fn save(&self, entries: &[String]) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }

        let start = entries.len().saturating_sub(self.max_entries);
        let mut body = entries[start..].join("\n");
        if !body.is_empty() {
            body.push('\n');
        }
        fs::write(&self.path, body)
            .with_context(|| format!("failed to write history at {}", self.path.display()))?;
        debug!(path = %self.path.display(), count = entries.len() - start, "history saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileHistory::new(dir.path().join("none"), 10);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_keeps_latest_entries_and_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileHistory::new(dir.path().join("nested").join("history"), 2);

        store.save(&strings(&["one", "two", "three"])).unwrap();

        assert_eq!(store.load().unwrap(), strings(&["two", "three"]));
    }

    #[test]
    fn load_keeps_last_occurrence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history");
        fs::write(&path, "a\nb\n\na\nc\n").unwrap();

        let store = FileHistory::new(&path, 10);
        assert_eq!(store.load().unwrap(), strings(&["b", "a", "c"]));
    }
}
