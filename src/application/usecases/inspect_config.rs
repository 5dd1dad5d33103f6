//! 병합된 설정과 탐색 경로를 점검하는 유스케이스.

use anyhow::{Context, Result};
use serde_json::Value;

use crate::application::ports::ConfigRepository;

/// 시작 배너에 표시하는 설정 요약.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSummary {
    pub loaded_files: usize,
    /// 설정에 명시된 히스토리 경로(미지정 시 `None`)
    pub history_path: Option<String>,
}

pub struct InspectConfigUseCase<'a> {
    pub config_repo: &'a dyn ConfigRepository,
}

impl InspectConfigUseCase<'_> {
    /// `--inspect-config` 출력용 JSON 문자열을 생성한다.
    pub fn execute(&self) -> Result<String> {
        self.config_repo.inspect_pretty_json()
    }

    pub fn summary(&self) -> Result<ConfigSummary> {
        let raw = self.execute()?;
        let value: Value = serde_json::from_str(&raw).context("failed to parse config inspection")?;

        Ok(ConfigSummary {
            loaded_files: value
                .get("loaded_paths")
                .and_then(Value::as_array)
                .map_or(0, Vec::len),
            history_path: value
                .pointer("/effective/history_path")
                .and_then(Value::as_str)
                .map(ToString::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::config::ShellConfig;

    struct FixedRepository(&'static str);

    impl ConfigRepository for FixedRepository {
        fn load(&self) -> Result<ShellConfig> {
            Ok(ShellConfig::default())
        }

        fn inspect_pretty_json(&self) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn summary_reads_inspection_fields() {
        let repo = FixedRepository(
            r#"{"loaded_paths":["a","b"],"effective":{"history_path":"/tmp/h"}}"#,
        );
        let usecase = InspectConfigUseCase { config_repo: &repo };
        assert_eq!(
            usecase.summary().unwrap(),
            ConfigSummary {
                loaded_files: 2,
                history_path: Some("/tmp/h".into()),
            }
        );
    }

    #[test]
    fn summary_tolerates_missing_fields() {
        let repo = FixedRepository(r#"{"effective":{"history_path":null}}"#);
        let usecase = InspectConfigUseCase { config_repo: &repo };
        let summary = usecase.summary().unwrap();
        assert_eq!(summary.loaded_files, 0);
        assert_eq!(summary.history_path, None);
    }
}
