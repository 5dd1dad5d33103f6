//! 디스패치 실패 분류(taxonomy).

use thiserror::Error;

/// 한 줄 디스패치 중 발생할 수 있는 모든 실패.
/// 엔진 경계에서 모두 복구되며 REPL 밖으로 전파되지 않는다.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("unknown parameter: -{flag}")]
    UnknownFlag {
        flag: String,
        /// 랭킹된 파라미터 이름 후보
        suggestions: Vec<String>,
    },

    #[error("parameter specified more than once: {0}")]
    DuplicateParameter(String),

    #[error("missing value for parameter: {0}")]
    MissingValue(String),

    #[error("cannot convert '{value}' to {type_name} for parameter: {parameter}")]
    ConversionError {
        parameter: String,
        value: String,
        type_name: String,
        /// enum 대상일 때 허용 가능한 이름 목록
        valid_values: Vec<String>,
        /// 호스트 변환기가 돌려준 실패 사유
        detail: Option<String>,
    },

    /// 남은 위치 파라미터 슬롯이 없는 위치 인자
    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),

    #[error("missing required parameters: {}", names.join(", "))]
    MissingRequiredParameters { names: Vec<String> },

    #[error("command not found: {name}")]
    CommandNotFound {
        name: String,
        suggestions: Vec<String>,
    },

    #[error("{0}")]
    Invocation(anyhow::Error),

    #[error("command canceled")]
    Canceled,
}

impl DispatchError {
    /// 바인딩 단계 실패인지 여부. 문법 요약을 함께 출력해야 하는 경우다.
    pub fn is_binding_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownFlag { .. }
                | Self::DuplicateParameter(_)
                | Self::MissingValue(_)
                | Self::ConversionError { .. }
                | Self::UnexpectedArgument(_)
                | Self::MissingRequiredParameters { .. }
        )
    }
}

/// 명령 테이블 구성 시점 실패. 호스트 프로그래밍 오류이므로 시작을 중단한다.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("duplicate command name: {0}")]
    DuplicateCommand(String),

    #[error("more than one default command: {first}, {second}")]
    MultipleDefaultCommands { first: String, second: String },

    #[error("duplicate parameter '{parameter}' in command: {command}")]
    DuplicateParameter { command: String, parameter: String },
}
