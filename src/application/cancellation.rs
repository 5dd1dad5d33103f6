//! 명령 실행 단위의 협조적 취소 컨텍스트.
//!
//! 취소는 권고(advisory)일 뿐이다. 신호를 확인하지 않는 핸들러는
//! 엔진이 "canceled"를 보고한 뒤에도 백그라운드에서 끝까지 실행된다.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::application::ports::CancelInput;

pub const DEFAULT_CANCEL_DELAY_MS: u64 = 200;
pub const DEFAULT_CANCEL_INTERVAL_MS: u64 = 100;
/// 폴링 주기 하한. `tokio::time::interval`은 0 주기를 허용하지 않는다.
pub const MIN_CANCEL_INTERVAL: Duration = Duration::from_millis(1);

/// 핸들러에 주입되는 취소 신호.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelSignal {
    pub fn new() -> Self {
        Self {
            tx: Arc::new(watch::Sender::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_canceled(&self) -> bool {
        *self.tx.borrow()
    }

    /// 취소될 때까지 대기한다. 이미 취소된 경우 즉시 반환한다.
    pub async fn canceled(&self) {
        let mut rx = self.tx.subscribe();
        let _ = rx.wait_for(|canceled| *canceled).await;
    }
}

/// 취소 입력 폴링 주기.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelTiming {
    pub delay: Duration,
    pub interval: Duration,
}

impl CancelTiming {
    /// 실제 폴링에 쓰이는 주기(하한 적용).
    pub fn poll_interval(&self) -> Duration {
        self.interval.max(MIN_CANCEL_INTERVAL)
    }
}

impl Default for CancelTiming {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(DEFAULT_CANCEL_DELAY_MS),
            interval: Duration::from_millis(DEFAULT_CANCEL_INTERVAL_MS),
        }
    }
}

/// 실행 하나에 묶인 취소 폴러. drop 시 폴러는 항상 정리된다.
pub struct CancellationContext {
    signal: CancelSignal,
    poller: JoinHandle<()>,
}

impl CancellationContext {
    /// 지연 후 주기적으로 취소 입력을 확인하는 폴러를 시작한다.
    pub fn start(signal: CancelSignal, input: Arc<dyn CancelInput>, timing: CancelTiming) -> Self {
        // 이전 실행 시점에 들어온 입력이 새 실행을 취소하지 않도록 비운다.
        input.reset();

        let poller_signal = signal.clone();
        let interval = timing.poll_interval();
        let poller = tokio::spawn(async move {
            tokio::time::sleep(timing.delay).await;
            trace!("cancel poller started");

            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if input.poll_cancel() {
                    debug!("cancel input received");
                    poller_signal.cancel();
                    break;
                }
            }
        });

        Self { signal, poller }
    }

    pub fn signal(&self) -> &CancelSignal {
        &self.signal
    }
}

impl Drop for CancellationContext {
    fn drop(&mut self) {
        self.poller.abort();
        trace!("cancel poller stopped");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use super::*;

    #[derive(Default)]
    struct ScriptedInput {
        pending: AtomicBool,
        polls: AtomicUsize,
    }

    impl CancelInput for ScriptedInput {
        fn poll_cancel(&self) -> bool {
            self.polls.fetch_add(1, Ordering::SeqCst);
            self.pending.swap(false, Ordering::SeqCst)
        }
    }

    fn fast() -> CancelTiming {
        CancelTiming {
            delay: Duration::from_millis(5),
            interval: Duration::from_millis(5),
        }
    }

    #[tokio::test]
    async fn cancel_input_signals_context() {
        let input = Arc::new(ScriptedInput::default());
        let ctx = CancellationContext::start(CancelSignal::new(), input.clone(), fast());
        input.pending.store(true, Ordering::SeqCst);

        tokio::time::timeout(Duration::from_secs(2), ctx.signal().canceled())
            .await
            .expect("signal was not raised");
        assert!(ctx.signal().is_canceled());
    }

    #[tokio::test]
    async fn poller_stops_when_context_drops() {
        let input = Arc::new(ScriptedInput::default());
        let ctx = CancellationContext::start(CancelSignal::new(), input.clone(), fast());
        tokio::time::sleep(Duration::from_millis(40)).await;
        drop(ctx);

        tokio::time::sleep(Duration::from_millis(20)).await;
        let polls = input.polls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(input.polls.load(Ordering::SeqCst), polls);
    }

    #[tokio::test]
    async fn zero_interval_still_polls() {
        let input = Arc::new(ScriptedInput::default());
        let timing = CancelTiming {
            delay: Duration::ZERO,
            interval: Duration::ZERO,
        };
        assert_eq!(timing.poll_interval(), MIN_CANCEL_INTERVAL);

        let ctx = CancellationContext::start(CancelSignal::new(), input.clone(), timing);
        input.pending.store(true, Ordering::SeqCst);

        tokio::time::timeout(Duration::from_secs(2), ctx.signal().canceled())
            .await
            .expect("poller should survive a zero interval");
    }

    #[tokio::test]
    async fn already_canceled_signal_resolves_immediately() {
        let signal = CancelSignal::new();
        signal.cancel();
        tokio::time::timeout(Duration::from_millis(100), signal.canceled())
            .await
            .expect("canceled() should resolve");
    }
}
