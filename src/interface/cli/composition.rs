//! 애플리케이션 조립(composition root) 모듈.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tracing::debug;

use crate::application::config::ShellConfig;
use crate::application::dispatcher::Dispatcher;
use crate::application::history::HistoryBuffer;
use crate::application::ports::{CancelInput, ConfigRepository, HistoryStore};
use crate::application::usecases::inspect_config::InspectConfigUseCase;
use crate::domain::command::CommandTable;
use crate::infrastructure::adapters::{ConsoleReporter, FileHistory, JsonConfigRepository};
use crate::infrastructure::config::ConfigSource;
use crate::interface::cli::builtin::{UserDirectory, builtin_commands, builtin_conversions};

/// 실행 시점 의존성을 한 곳에서 조립하는 컨테이너.
pub struct AppComposition {
    config_repo: JsonConfigRepository,
    reporter: Arc<ConsoleReporter>,
}

impl Default for AppComposition {
    fn default() -> Self {
        Self::new(None)
    }
}

impl AppComposition {
    /// `--config`로 지정한 추가 설정 파일을 받아 실행 조합을 생성한다.
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self {
            config_repo: JsonConfigRepository::new(ConfigSource::new(config_path)),
            reporter: Arc::new(ConsoleReporter::new()),
        }
    }

    /// 설정 점검 유스케이스를 생성한다.
    pub fn inspect_config_usecase(&self) -> InspectConfigUseCase<'_> {
        InspectConfigUseCase {
            config_repo: &self.config_repo,
        }
    }

    pub fn load_config(&self) -> Result<ShellConfig> {
        self.config_repo.load()
    }

    pub fn command_table(&self) -> Result<CommandTable> {
        CommandTable::builder()
            .commands(builtin_commands())
            .build()
            .context("invalid built-in command table")
    }

    /// 기본 제공 명령과 콘솔 어댑터로 디스패처를 조립한다.
    /// 세션 히스토리가 주어지면 `history` 명령에서 조회할 수 있도록 주입한다.
    pub fn dispatcher(
        &self,
        config: &ShellConfig,
        cancel_input: Arc<dyn CancelInput>,
        session_history: Option<Arc<Mutex<HistoryBuffer>>>,
    ) -> Result<Dispatcher> {
        let mut builder = Dispatcher::builder(
            self.command_table()?,
            self.reporter.clone(),
            self.reporter.clone(),
        )
        .conversions(builtin_conversions())
        .inject(Arc::new(UserDirectory::default()))
        .stack_tokens(config.stack_tokens())
        .cancel_input(cancel_input)
        .cancel_timing(config.cancel_timing())
        .on_stack_changed(|items| debug!(stack = ?items, "argument stack changed"));

        if let Some(history) = session_history {
            builder = builder.inject(history);
        }
        Ok(builder.build())
    }

    /// 히스토리 비활성화(설정 또는 `--no-history`) 시 `None`.
    pub fn history_store(&self, config: &ShellConfig, no_history: bool) -> Option<Arc<dyn HistoryStore>> {
        if no_history || !config.history_enabled() {
            return None;
        }
        let path = config
            .history
            .path
            .as_ref()
            .map(PathBuf::from)
            .or_else(FileHistory::default_path)?;
        debug!(path = %path.display(), "history file");
        Some(Arc::new(FileHistory::new(path, config.history_max_entries())))
    }
}
