//! 디스패치 엔진.
//! 파싱 → 스택 제어 → 명령 해석 → 바인딩 → 취소 가능한 실행 → 결과/오류 보고를 한 줄 단위로 수행한다.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use anyhow::Result;
use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{debug, trace};

use crate::application::binder::bind;
use crate::application::cancellation::{CancelSignal, CancelTiming, CancellationContext};
use crate::application::conversion::ConversionRegistry;
use crate::application::ports::{CancelInput, DefaultAction, NoCancelInput, Reporter, ResultRenderer};
use crate::application::suggest::SuggestionEngine;
use crate::domain::command::{CommandDescriptor, CommandTable, Handler};
use crate::domain::error::DispatchError;
use crate::domain::injectables::InjectableRegistry;
use crate::domain::ranker::rank_all;
use crate::domain::stack::{ArgumentStack, StackTokens};
use crate::domain::tokenizer::{tokenize, unquote};
use crate::domain::value::{BoundArgs, Output};

/// "did you mean"에 표시하는 최대 후보 수.
const MAX_DID_YOU_MEAN: usize = 3;

/// 입력 줄 치환 훅(호스트 제공).
pub type Substitution = Box<dyn Fn(&str) -> String + Send + Sync>;
/// 스택 변경 알림(오래된 것 → 최신 순서).
pub type StackObserver = Box<dyn Fn(&[String]) + Send + Sync>;

/// 핸들러에 주입되는 셸 제어 객체. 종료 요청과 종료 코드를 보관한다.
#[derive(Debug)]
pub struct ShellControl {
    running: AtomicBool,
    exit_code: AtomicI32,
}

impl Default for ShellControl {
    fn default() -> Self {
        Self {
            running: AtomicBool::new(true),
            exit_code: AtomicI32::new(0),
        }
    }
}

impl ShellControl {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// 현재 명령이 끝난 뒤 루프를 종료하도록 요청한다.
    pub fn request_exit(&self, code: i32) {
        self.exit_code.store(code, Ordering::SeqCst);
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn exit_requested(&self) -> bool {
        !self.is_running()
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code.load(Ordering::SeqCst)
    }
}

/// 한 줄 디스패치의 최종 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// 빈 줄/주석
    Empty,
    /// push/pop/clear만 수행
    StackChanged,
    Completed,
    /// 실행 전 단계(파싱/명령 해석/바인딩)에서 거부됨
    Rejected,
    Canceled,
    /// 핸들러가 오류를 반환함
    Failed,
}

impl DispatchOutcome {
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Rejected | Self::Failed | Self::Canceled)
    }
}

enum Plan {
    Invoke {
        handler: Handler,
        args: BoundArgs,
    },
    Fallback {
        action: Arc<dyn DefaultAction>,
        name: String,
        args: Vec<String>,
    },
}

/// 명령 테이블과 인자 스택을 소유하는 단일 스레드 디스패처.
/// 한 번에 하나의 명령만 바인딩/실행한다.
pub struct Dispatcher {
    table: Arc<CommandTable>,
    conversions: ConversionRegistry,
    injectables: InjectableRegistry,
    stack: ArgumentStack,
    shell: Arc<ShellControl>,
    reporter: Arc<dyn Reporter>,
    renderer: Arc<dyn ResultRenderer>,
    cancel_input: Arc<dyn CancelInput>,
    cancel_timing: CancelTiming,
    default_action: Option<Arc<dyn DefaultAction>>,
    substitution: Option<Substitution>,
    stack_observer: Option<StackObserver>,
}

impl Dispatcher {
    pub fn builder(
        table: CommandTable,
        reporter: Arc<dyn Reporter>,
        renderer: Arc<dyn ResultRenderer>,
    ) -> DispatcherBuilder {
        DispatcherBuilder {
            table,
            reporter,
            renderer,
            conversions: ConversionRegistry::new(),
            injectables: InjectableRegistry::new(),
            stack_tokens: StackTokens::default(),
            cancel_input: Arc::new(NoCancelInput),
            cancel_timing: CancelTiming::default(),
            default_action: None,
            substitution: None,
            stack_observer: None,
        }
    }

    pub fn table(&self) -> &Arc<CommandTable> {
        &self.table
    }

    pub fn stack(&self) -> &ArgumentStack {
        &self.stack
    }

    pub fn shell(&self) -> &Arc<ShellControl> {
        &self.shell
    }

    pub fn reporter(&self) -> &Arc<dyn Reporter> {
        &self.reporter
    }

    pub fn injectables(&self) -> &InjectableRegistry {
        &self.injectables
    }

    /// 디스패치 사이에 호스트 서비스를 등록/교체할 때 사용한다.
    pub fn injectables_mut(&mut self) -> &mut InjectableRegistry {
        &mut self.injectables
    }

    pub fn is_running(&self) -> bool {
        self.shell.is_running()
    }

    /// 라인 에디터 자동완성 콜백을 만든다.
    pub fn completer<'a>(&'a self, history: &'a [String]) -> SuggestionEngine<'a> {
        SuggestionEngine {
            table: &self.table,
            injectables: &self.injectables,
            stack: &self.stack,
            history,
        }
    }

    /// 한 줄을 끝까지 처리한다. 모든 실패는 여기서 보고되고 전파되지 않는다.
    pub async fn dispatch(&mut self, line: &str) -> DispatchOutcome {
        let line = match &self.substitution {
            Some(substitute) => substitute(line),
            None => line.to_string(),
        };

        let tokens = match tokenize(&line) {
            Ok(tokens) => tokens,
            Err(err) => {
                self.report(&err, None);
                return DispatchOutcome::Rejected;
            }
        };
        trace!(?tokens, "tokenized");
        if tokens.is_empty() {
            return DispatchOutcome::Empty;
        }

        if let Some(control) = self.stack.classify(&tokens) {
            debug!(?control, "stack control");
            self.stack.apply(control);
            if let Some(observer) = &self.stack_observer {
                observer(self.stack.items());
            }
            return DispatchOutcome::StackChanged;
        }

        let context = self.stack.combine(tokens);
        let signal = CancelSignal::new();
        let Some(plan) = self.plan(&context, &signal) else {
            return DispatchOutcome::Rejected;
        };

        let unit: BoxFuture<'static, Result<Output>> = match plan {
            Plan::Invoke { handler, args } => handler(args),
            Plan::Fallback { action, name, args } => {
                async move { action.run(&name, &args).await }.boxed()
            }
        };

        match self.invoke(unit, signal).await {
            Ok(output) => {
                self.renderer.render(&output);
                DispatchOutcome::Completed
            }
            Err(err) => {
                self.report(&err, None);
                if matches!(err, DispatchError::Canceled) {
                    DispatchOutcome::Canceled
                } else {
                    DispatchOutcome::Failed
                }
            }
        }
    }

    /// 명령 이름 해석 후 바인딩까지 수행한다. 실패 시 보고 후 `None`.
    /// 이름 불일치 시: 기본 명령 → 호스트 대체 동작 → "command not found" 순서.
    fn plan(&self, context: &[String], signal: &CancelSignal) -> Option<Plan> {
        let (raw_name, args) = context.split_first()?;
        let name = unquote(raw_name);

        let mut injectables = self.injectables.clone();
        injectables.register(Arc::new(signal.clone()));

        let (command, tokens) = match self.table.get(&name) {
            Some(command) => (command, args),
            None => match self.table.default_command() {
                Some(command) => (command, context),
                None => {
                    if let Some(action) = &self.default_action {
                        debug!(%name, "delegating to default action");
                        return Some(Plan::Fallback {
                            action: action.clone(),
                            name,
                            args: args.iter().map(|a| unquote(a)).collect(),
                        });
                    }
                    let err = DispatchError::CommandNotFound {
                        suggestions: rank_all(self.table.names(), &name),
                        name,
                    };
                    self.report(&err, None);
                    return None;
                }
            },
        };

        debug!(command = %command.name, args = tokens.len(), "resolved");
        match bind(tokens, command, &injectables, &self.conversions) {
            Ok(args) => Some(Plan::Invoke {
                handler: command.handler.clone(),
                args,
            }),
            Err(err) => {
                debug!(command = %command.name, error = %err, "binding failed");
                self.report(&err, Some(command));
                None
            }
        }
    }

    /// 실행 단위를 별도 태스크로 띄우고 완료 또는 취소 신호를 기다린다.
    async fn invoke(
        &self,
        unit: BoxFuture<'static, Result<Output>>,
        signal: CancelSignal,
    ) -> Result<Output, DispatchError> {
        let context = CancellationContext::start(signal, self.cancel_input.clone(), self.cancel_timing);
        let mut task = tokio::spawn(unit);

        let result = tokio::select! {
            biased;
            joined = &mut task => match joined {
                Ok(Ok(output)) => Ok(output),
                Ok(Err(err)) => Err(DispatchError::Invocation(err)),
                Err(join_err) => Err(DispatchError::Invocation(
                    anyhow::Error::new(join_err).context("command handler aborted"),
                )),
            },
            _ = context.signal().canceled() => {
                // 신호를 무시하는 핸들러는 분리된 채 계속 실행된다.
                debug!("command canceled; handler left running in background");
                Err(DispatchError::Canceled)
            }
        };

        drop(context);
        result
    }

    fn report(&self, err: &DispatchError, command: Option<&CommandDescriptor>) {
        match err {
            DispatchError::Invocation(inner) => {
                // 가장 안쪽 원인부터 보고한다.
                let causes: Vec<String> = inner.chain().map(ToString::to_string).collect();
                for cause in causes.iter().rev() {
                    self.reporter.error(cause);
                }
            }
            other => self.reporter.error(&other.to_string()),
        }

        match err {
            DispatchError::UnknownFlag { suggestions, .. } if !suggestions.is_empty() => {
                let flags: Vec<String> = suggestions
                    .iter()
                    .take(MAX_DID_YOU_MEAN)
                    .map(|s| format!("-{s}"))
                    .collect();
                self.reporter.hint(&format!("did you mean: {}", flags.join(", ")));
            }
            DispatchError::ConversionError {
                valid_values,
                detail,
                ..
            } => {
                if let Some(detail) = detail {
                    self.reporter.hint(&format!("reason: {detail}"));
                }
                if !valid_values.is_empty() {
                    self.reporter
                        .hint(&format!("valid values: {}", valid_values.join(", ")));
                }
            }
            DispatchError::CommandNotFound { suggestions, .. } if !suggestions.is_empty() => {
                let names: Vec<&str> = suggestions
                    .iter()
                    .take(MAX_DID_YOU_MEAN)
                    .map(String::as_str)
                    .collect();
                self.reporter.hint(&format!("did you mean: {}", names.join(", ")));
            }
            _ => {}
        }

        if err.is_binding_error()
            && let Some(command) = command
        {
            self.reporter.hint(&format!("syntax: {}", command.syntax()));
        }
    }
}

/// 디스패처 조립기. 필수 협력자는 `Dispatcher::builder` 인자로 받는다.
pub struct DispatcherBuilder {
    table: CommandTable,
    reporter: Arc<dyn Reporter>,
    renderer: Arc<dyn ResultRenderer>,
    conversions: ConversionRegistry,
    injectables: InjectableRegistry,
    stack_tokens: StackTokens,
    cancel_input: Arc<dyn CancelInput>,
    cancel_timing: CancelTiming,
    default_action: Option<Arc<dyn DefaultAction>>,
    substitution: Option<Substitution>,
    stack_observer: Option<StackObserver>,
}

impl DispatcherBuilder {
    pub fn conversions(mut self, conversions: ConversionRegistry) -> Self {
        self.conversions = conversions;
        self
    }

    pub fn inject<T: std::any::Any + Send + Sync>(mut self, instance: Arc<T>) -> Self {
        self.injectables.register(instance);
        self
    }

    pub fn stack_tokens(mut self, tokens: StackTokens) -> Self {
        self.stack_tokens = tokens;
        self
    }

    pub fn cancel_input(mut self, input: Arc<dyn CancelInput>) -> Self {
        self.cancel_input = input;
        self
    }

    pub fn cancel_timing(mut self, timing: CancelTiming) -> Self {
        self.cancel_timing = timing;
        self
    }

    pub fn default_action(mut self, action: Arc<dyn DefaultAction>) -> Self {
        self.default_action = Some(action);
        self
    }

    pub fn substitution<F>(mut self, substitute: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.substitution = Some(Box::new(substitute));
        self
    }

    pub fn on_stack_changed<F>(mut self, observer: F) -> Self
    where
        F: Fn(&[String]) + Send + Sync + 'static,
    {
        self.stack_observer = Some(Box::new(observer));
        self
    }

    /// 셸 제어 객체와 명령 테이블은 기본 주입 대상으로 등록된다.
    pub fn build(self) -> Dispatcher {
        let table = Arc::new(self.table);
        let shell = Arc::new(ShellControl::default());

        let mut injectables = self.injectables;
        injectables.register(shell.clone());
        injectables.register(table.clone());

        Dispatcher {
            table,
            conversions: self.conversions,
            injectables,
            stack: ArgumentStack::new(self.stack_tokens),
            shell,
            reporter: self.reporter,
            renderer: self.renderer,
            cancel_input: self.cancel_input,
            cancel_timing: self.cancel_timing,
            default_action: self.default_action,
            substitution: self.substitution,
            stack_observer: self.stack_observer,
        }
    }
}
