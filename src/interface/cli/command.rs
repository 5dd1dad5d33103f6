//! CLI 명령 파싱 모듈.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "cmdshell")]
#[command(about = "Interactive command shell with argument binding and suggestions")]
pub struct Cli {
    /// Extra JSON config file, merged last
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Read commands from stdin and echo each line before running it
    #[arg(long)]
    batch: bool,

    /// Do not load or save input history
    #[arg(long)]
    no_history: bool,

    /// Print the effective merged config as JSON and exit
    #[arg(long)]
    inspect_config: bool,
}

/// 실행 모드 결정에 필요한 옵션.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub config: Option<PathBuf>,
    /// 명시적 배치 모드 요청(stdin이 TTY가 아니면 자동으로 배치)
    pub batch: bool,
    pub no_history: bool,
}

pub enum CliAction {
    InspectConfig(Option<PathBuf>),
    Run(RunOptions),
}

impl Cli {
    pub fn parse_action() -> CliAction {
        Cli::parse().into_action()
    }

    fn into_action(self) -> CliAction {
        if self.inspect_config {
            return CliAction::InspectConfig(self.config);
        }
        CliAction::Run(RunOptions {
            config: self.config,
            batch: self.batch,
            no_history: self.no_history,
        })
    }
}
