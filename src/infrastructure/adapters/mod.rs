//! 애플리케이션 포트를 실제 인프라 구현체로 연결하는 어댑터 계층.

mod cancel_input;
mod config_repository;
mod history;
mod reporter;

pub use cancel_input::CtrlCCancelInput;
pub use config_repository::JsonConfigRepository;
pub use history::FileHistory;
pub use reporter::ConsoleReporter;
