//! 애플리케이션 계층이 의존하는 포트(추상 인터페이스) 모음.

use anyhow::Result;
use async_trait::async_trait;

use crate::application::config::ShellConfig;
use crate::domain::value::Output;

/// 설정 로딩/점검을 담당하는 저장소 포트.
pub trait ConfigRepository: Send + Sync {
    fn load(&self) -> Result<ShellConfig>;
    fn inspect_pretty_json(&self) -> Result<String>;
}

/// 오류/안내 메시지 출력 포트.
pub trait Reporter: Send + Sync {
    fn error(&self, message: &str);
    fn hint(&self, message: &str);
    /// 배치 모드에서 실행 직전 입력 줄을 에코한다.
    fn echo(&self, prompt: &str, line: &str);
}

/// 핸들러 반환 값을 출력하는 포트. 엔진은 직접 포맷하지 않는다.
pub trait ResultRenderer: Send + Sync {
    fn render(&self, output: &Output);
}

/// 실행 중 취소 입력 감지 포트. `poll_cancel`은 블로킹하지 않아야 한다.
pub trait CancelInput: Send + Sync {
    /// 취소 입력이 도착했으면 소비하고 true를 반환한다.
    fn poll_cancel(&self) -> bool;

    /// 실행 시작 전에 남아 있는 입력을 버린다.
    fn reset(&self) {}
}

/// 취소 입력이 없는 환경(배치/테스트)용 구현.
pub struct NoCancelInput;

impl CancelInput for NoCancelInput {
    fn poll_cancel(&self) -> bool {
        false
    }
}

/// 이름이 일치하는 명령이 없을 때 호스트가 처리하는 대체 동작.
#[async_trait]
pub trait DefaultAction: Send + Sync {
    async fn run(&self, name: &str, args: &[String]) -> Result<Output>;
}

/// 라인 에디터가 호출하는 자동완성 콜백.
pub trait Completer {
    fn suggestions(&self, text: &str, cursor: usize) -> Vec<String>;
}

/// 대화형 한 줄 입력 포트.
pub trait LineEditor {
    /// EOF이면 `None`.
    fn read_line(&mut self, prompt: &str, completer: &dyn Completer) -> Result<Option<String>>;
    /// 다음 `read_line` 입력창을 미리 채운다.
    fn set_prefill(&mut self, text: &str);
    fn add_history(&mut self, line: &str);
    /// 오래된 것 → 최신 순서.
    fn history(&self) -> Vec<String>;
    /// 비동기로 로딩된 과거 기록을 현재 세션 기록 앞에 병합한다.
    fn merge_history(&mut self, loaded: Vec<String>);
}

/// 히스토리 영속화 포트.
pub trait HistoryStore: Send + Sync {
    fn load(&self) -> Result<Vec<String>>;
    fn save(&self, entries: &[String]) -> Result<()>;
}
