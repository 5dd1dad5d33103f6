//! Application layer
//! 명령 바인딩/디스패치/자동완성 규칙을 정의하고 포트(추상 인터페이스)를 통해 인프라를 사용한다.

pub mod binder;
pub mod cancellation;
pub mod config;
pub mod conversion;
pub mod dispatcher;
pub mod history;
pub mod ports;
pub mod repl;
pub mod suggest;
pub mod usecases;
