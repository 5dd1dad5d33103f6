//! 애플리케이션이 사용하는 설정 스키마(순수 데이터).
//!
//! 주의: 파일/환경변수/프로세스 접근은 `infrastructure`에서만 수행한다.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::cancellation::{
    CancelTiming, DEFAULT_CANCEL_DELAY_MS, DEFAULT_CANCEL_INTERVAL_MS,
};
use crate::domain::stack::StackTokens;

pub const DEFAULT_PROMPT: &str = "> ";
pub const DEFAULT_HISTORY_MAX_ENTRIES: usize = 100;
pub const DEFAULT_MAX_SUGGESTIONS: usize = 10;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ShellConfig {
    /// 입력 프롬프트 문자열
    pub prompt: Option<String>,
    /// 인자 스택 제어 토큰
    #[serde(default)]
    pub stack: StackConfig,
    /// 히스토리 파일 설정
    #[serde(default)]
    pub history: HistoryConfig,
    /// 실행 취소 폴링 설정
    #[serde(default)]
    pub cancel: CancelConfig,
    /// 자동완성 표시 설정
    #[serde(default)]
    pub suggestions: SuggestionsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct StackConfig {
    pub push: Option<String>,
    pub pop: Option<String>,
    pub clear: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct HistoryConfig {
    /// 히스토리 사용 여부(기본 true)
    pub enabled: Option<bool>,
    /// 히스토리 파일 경로(미지정 시 사용자 설정 디렉터리)
    pub path: Option<String>,
    /// 저장 시 유지할 최근 항목 수
    pub max_entries: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CancelConfig {
    /// 실행 시작 후 폴링 시작까지 지연(ms)
    pub delay_ms: Option<u64>,
    /// 폴링 주기(ms)
    pub interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct SuggestionsConfig {
    /// 화면에 표시할 최대 추천 수
    pub max: Option<usize>,
}

impl ShellConfig {
    pub fn prompt(&self) -> String {
        self.prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_PROMPT.to_string())
    }

    /// 미지정 토큰은 기본값(`\`, `..`, `...`)을 사용한다.
    pub fn stack_tokens(&self) -> StackTokens {
        let defaults = StackTokens::default();
        StackTokens {
            push: self.stack.push.clone().unwrap_or(defaults.push),
            pop: self.stack.pop.clone().unwrap_or(defaults.pop),
            clear: self.stack.clear.clone().unwrap_or(defaults.clear),
        }
    }

    pub fn history_enabled(&self) -> bool {
        self.history.enabled.unwrap_or(true)
    }

    pub fn history_max_entries(&self) -> usize {
        self.history
            .max_entries
            .unwrap_or(DEFAULT_HISTORY_MAX_ENTRIES)
    }

    pub fn cancel_timing(&self) -> CancelTiming {
        CancelTiming {
            delay: Duration::from_millis(self.cancel.delay_ms.unwrap_or(DEFAULT_CANCEL_DELAY_MS)),
            interval: Duration::from_millis(
                self.cancel.interval_ms.unwrap_or(DEFAULT_CANCEL_INTERVAL_MS),
            ),
        }
    }

    pub fn max_suggestions(&self) -> usize {
        self.suggestions.max.unwrap_or(DEFAULT_MAX_SUGGESTIONS)
    }

    /// 후순위(나중 파일) 값으로 덮어쓰는 병합 규칙.
    pub fn merge_from(&mut self, other: ShellConfig) {
        if other.prompt.is_some() {
            self.prompt = other.prompt;
        }
        self.stack.merge_from(other.stack);
        self.history.merge_from(other.history);
        self.cancel.merge_from(other.cancel);
        if other.suggestions.max.is_some() {
            self.suggestions.max = other.suggestions.max;
        }
    }
}

impl StackConfig {
    pub fn merge_from(&mut self, other: StackConfig) {
        if other.push.is_some() {
            self.push = other.push;
        }
        if other.pop.is_some() {
            self.pop = other.pop;
        }
        if other.clear.is_some() {
            self.clear = other.clear;
        }
    }
}

impl HistoryConfig {
    pub fn merge_from(&mut self, other: HistoryConfig) {
        if other.enabled.is_some() {
            self.enabled = other.enabled;
        }
        if other.path.is_some() {
            self.path = other.path;
        }
        if other.max_entries.is_some() {
            self.max_entries = other.max_entries;
        }
    }
}

impl CancelConfig {
    pub fn merge_from(&mut self, other: CancelConfig) {
        if other.delay_ms.is_some() {
            self.delay_ms = other.delay_ms;
        }
        if other.interval_ms.is_some() {
            self.interval_ms = other.interval_ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let config = ShellConfig::default();
        assert_eq!(config.prompt(), "> ");
        assert_eq!(config.stack_tokens(), StackTokens::default());
        assert_eq!(config.history_max_entries(), 100);
        assert_eq!(config.cancel_timing(), CancelTiming::default());
        assert!(config.history_enabled());
    }

    #[test]
    fn later_values_override_field_by_field() {
        let mut base: ShellConfig =
            serde_json::from_str(r#"{"prompt":"$ ","stack":{"push":">>"},"history":{"max_entries":5}}"#)
                .unwrap();
        let overlay: ShellConfig =
            serde_json::from_str(r#"{"stack":{"pop":"<"},"history":{"enabled":false}}"#).unwrap();
        base.merge_from(overlay);

        assert_eq!(base.prompt(), "$ ");
        let tokens = base.stack_tokens();
        assert_eq!(tokens.push, ">>");
        assert_eq!(tokens.pop, "<");
        assert_eq!(tokens.clear, "...");
        assert_eq!(base.history_max_entries(), 5);
        assert!(!base.history_enabled());
    }
}
