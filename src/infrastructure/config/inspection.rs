//! 적용 설정 진단(inspection) 뷰 모델.

use serde::Serialize;

use super::loader::LoadedConfig;
use crate::application::config::ShellConfig;
use crate::domain::stack::StackTokens;

#[derive(Debug, Clone, Serialize)]
pub struct ConfigInspection {
    pub searched_paths: Vec<String>,
    pub loaded_paths: Vec<String>,
    /// 파일에 실제로 적힌 값(병합 결과)
    pub config: ShellConfig,
    /// 기본값까지 채운 실제 적용 값
    pub effective: EffectiveSettings,
}

#[derive(Debug, Clone, Serialize)]
pub struct EffectiveSettings {
    pub prompt: String,
    pub stack: StackTokens,
    pub history_enabled: bool,
    pub history_path: Option<String>,
    pub history_max_entries: usize,
    pub cancel_delay_ms: u128,
    pub cancel_interval_ms: u128,
    pub max_suggestions: usize,
}

impl ConfigInspection {
    pub(crate) fn from_loaded(loaded: LoadedConfig) -> Self {
        let config = loaded.config;
        let timing = config.cancel_timing();

        Self {
            searched_paths: loaded
                .searched_paths
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            loaded_paths: loaded
                .loaded_paths
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            effective: EffectiveSettings {
                prompt: config.prompt(),
                stack: config.stack_tokens(),
                history_enabled: config.history_enabled(),
                history_path: config.history.path.clone(),
                history_max_entries: config.history_max_entries(),
                cancel_delay_ms: timing.delay.as_millis(),
                cancel_interval_ms: timing.poll_interval().as_millis(),
                max_suggestions: config.max_suggestions(),
            },
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::loader::merge_paths;

    #[test]
    fn effective_values_fill_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"stack":{"push":">>"},"cancel":{"delay_ms":50}}"#).unwrap();

        let inspection = ConfigInspection::from_loaded(merge_paths(vec![path]).unwrap());

        assert_eq!(inspection.loaded_paths.len(), 1);
        assert_eq!(inspection.effective.stack.push, ">>");
        assert_eq!(inspection.effective.stack.pop, "..");
        assert_eq!(inspection.effective.cancel_delay_ms, 50);
        assert_eq!(inspection.effective.cancel_interval_ms, 100);
        assert_eq!(inspection.effective.prompt, "> ");

        let json = serde_json::to_value(&inspection).unwrap();
        assert_eq!(json["config"]["stack"]["push"], ">>");
    }
}
