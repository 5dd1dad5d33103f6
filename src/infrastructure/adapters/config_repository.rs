//! 설정 저장소 포트 구현 어댑터.

use anyhow::Result;

use crate::application::config::ShellConfig;
use crate::application::ports::ConfigRepository;
use crate::infrastructure::config::ConfigSource;

/// JSON 기반 설정 저장소 어댑터.
#[derive(Debug, Clone, Default)]
pub struct JsonConfigRepository {
    source: ConfigSource,
}

impl JsonConfigRepository {
    pub fn new(source: ConfigSource) -> Self {
        Self { source }
    }
}

impl ConfigRepository for JsonConfigRepository {
    fn load(&self) -> Result<ShellConfig> {
        self.source.load()
    }

    fn inspect_pretty_json(&self) -> Result<String> {
        self.source.inspect_pretty_json()
    }
}
