//! Ctrl-C 기반 취소 입력 어댑터.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use crate::application::ports::CancelInput;

/// 백그라운드 태스크가 Ctrl-C를 감지해 플래그를 세우고, 폴링 시 소비한다.
pub struct CtrlCCancelInput {
    pressed: Arc<AtomicBool>,
}

impl CtrlCCancelInput {
    /// tokio 런타임 안에서 호출해야 한다. 리스너는 프로세스 수명 동안 유지된다.
    pub fn spawn() -> Self {
        let pressed = Arc::new(AtomicBool::new(false));
        let flag = pressed.clone();
        tokio::spawn(async move {
            loop {
                if let Err(err) = tokio::signal::ctrl_c().await {
                    warn!(error = %err, "failed to listen for ctrl-c");
                    return;
                }
                debug!("ctrl-c received");
                flag.store(true, Ordering::SeqCst);
            }
        });
        Self { pressed }
    }
}

impl CancelInput for CtrlCCancelInput {
    fn poll_cancel(&self) -> bool {
        self.pressed.swap(false, Ordering::SeqCst)
    }

    fn reset(&self) {
        self.pressed.store(false, Ordering::SeqCst);
    }
}
