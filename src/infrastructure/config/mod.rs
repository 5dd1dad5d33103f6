//! 사용자 설정(JSON) 로딩/병합 모듈.
//! 여러 경로의 설정을 우선순위대로 병합하고, 실행 진단용 정보를 함께 제공한다.

mod inspection;
mod loader;

use std::path::PathBuf;

use anyhow::Result;

use crate::application::config::ShellConfig;

pub use inspection::{ConfigInspection, EffectiveSettings};
pub use loader::{CONFIG_ENV, config_paths};

/// 설정 탐색 경로 집합. CLI `--config`로 지정한 파일이 최우선이다.
#[derive(Debug, Clone, Default)]
pub struct ConfigSource {
    pub explicit: Option<PathBuf>,
}

impl ConfigSource {
    pub fn new(explicit: Option<PathBuf>) -> Self {
        Self { explicit }
    }

    /// 병합된 최종 설정을 로딩한다.
    pub fn load(&self) -> Result<ShellConfig> {
        Ok(loader::load_merged_config(self.explicit.as_deref())?.config)
    }

    /// 디버깅/진단용 설정 정보를 구성한다.
    pub fn inspect(&self) -> Result<ConfigInspection> {
        let loaded = loader::load_merged_config(self.explicit.as_deref())?;
        Ok(ConfigInspection::from_loaded(loaded))
    }

    /// 설정 진단 결과를 사람이 읽기 쉬운 JSON으로 반환한다.
    pub fn inspect_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.inspect()?)?)
    }
}
