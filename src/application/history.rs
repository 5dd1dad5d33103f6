//! 입력 히스토리 버퍼(순수 데이터 규칙).

use std::collections::HashSet;

/// 오래된 것 → 최신 순서의 중복 없는 입력 기록.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryBuffer {
    entries: Vec<String>,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 빈 줄은 무시하고, 이미 있던 항목은 맨 뒤(최신)로 옮긴다.
    pub fn add(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        self.entries.retain(|entry| entry != line);
        self.entries.push(line.to_string());
    }

    /// 나중에 도착한 파일 기록을 세션 기록 앞에 합친다.
    pub fn merge_loaded(&mut self, loaded: Vec<String>) {
        let mut combined = loaded;
        combined.append(&mut self.entries);
        self.entries = dedupe_keep_last(combined);
    }

    /// 저장 대상: 최근 `max` 개.
    pub fn recent(&self, max: usize) -> &[String] {
        let start = self.entries.len().saturating_sub(max);
        &self.entries[start..]
    }
}

/// 같은 항목이 여러 번 나오면 마지막 위치만 남긴다.
pub fn dedupe_keep_last(entries: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut kept: Vec<String> = entries
        .into_iter()
        .rev()
        .filter(|entry| !entry.trim().is_empty() && seen.insert(entry.clone()))
        .collect();
    kept.reverse();
    kept
}
