//! cmdshell library root.
//! 명령 디스패치 엔진을 Clean Architecture 계층으로 외부에 노출한다.
//!
//! - `domain`: 토큰화, 명령 테이블, 후보 순위, 인자 스택
//! - `application`: 바인딩, 디스패치, 취소, 자동완성, REPL 루프
//! - `infrastructure`: 설정 파일, 콘솔 출력, 히스토리 파일, 시그널
//! - `interface`: CLI 인자, 터미널 입력, 조립

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interface;

pub use application::dispatcher::{DispatchOutcome, Dispatcher, DispatcherBuilder, ShellControl};
pub use domain::command::{CommandDescriptor, CommandTable, ParamType, ParameterSpec};
pub use domain::error::{DispatchError, TableError};
pub use domain::value::{ArgValue, BoundArgs, Output};
