//! 최상위 입력 루프.
//! - 배치: 리다이렉트된 입력을 끝까지 한 줄씩 에코 후 실행
//! - 대화형: 라인 에디터로 한 줄 읽고 실행, 종료 요청까지 반복

use std::io::BufRead;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::application::dispatcher::{DispatchOutcome, Dispatcher};
use crate::application::ports::{HistoryStore, LineEditor};

const STACK_PATH_SEPARATOR: &str = "/";

/// 스택이 비어 있지 않으면 스택 경로를 프롬프트 앞에 붙인다. (예: `users/list> `)
pub fn prompt_for(prompt: &str, stack: &[String]) -> String {
    if stack.is_empty() {
        return prompt.to_string();
    }
    format!("{}{}", stack.join(STACK_PATH_SEPARATOR), prompt)
}

/// 입력 끝까지 모든 줄을 실행하고 종료 코드를 반환한다.
/// 명시적 종료 요청이 없으면 실패한 줄이 하나라도 있을 때 1.
pub async fn run_batch<R: BufRead>(
    dispatcher: &mut Dispatcher,
    reader: R,
    prompt: &str,
) -> Result<i32> {
    let mut failed = false;

    for line in reader.lines() {
        let line = line.context("failed to read input line")?;
        let shown_prompt = prompt_for(prompt, dispatcher.stack().items());
        dispatcher.reporter().echo(&shown_prompt, &line);

        let outcome = dispatcher.dispatch(&line).await;
        debug!(?outcome, "batch line dispatched");
        failed |= outcome.is_failure();

        if !dispatcher.is_running() {
            break;
        }
    }

    if dispatcher.shell().exit_requested() {
        return Ok(dispatcher.shell().exit_code());
    }
    Ok(i32::from(failed))
}

/// 종료 요청 또는 EOF까지 한 줄씩 읽어 실행한다.
/// 히스토리는 백그라운드에서 로딩되며, 로딩 완료를 기다리지 않고 입력을 받는다.
pub async fn run_interactive(
    dispatcher: &mut Dispatcher,
    editor: &mut dyn LineEditor,
    history_store: Option<Arc<dyn HistoryStore>>,
    prompt: &str,
) -> Result<i32> {
    let mut pending_load = history_store.clone().map(|store| {
        tokio::task::spawn_blocking(move || store.load())
    });

    while dispatcher.is_running() {
        if pending_load.as_ref().is_some_and(|handle| handle.is_finished())
            && let Some(handle) = pending_load.take()
        {
            merge_loaded_history(editor, handle.await);
        }

        let shown_prompt = prompt_for(prompt, dispatcher.stack().items());
        let history = editor.history();
        let line = {
            let completer = dispatcher.completer(&history);
            editor.read_line(&shown_prompt, &completer)?
        };
        let Some(line) = line else {
            debug!("end of interactive input");
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        editor.add_history(&line);
        let outcome = dispatcher.dispatch(&line).await;
        debug!(?outcome, "interactive line dispatched");
        if outcome == DispatchOutcome::Rejected {
            // 거부된 입력은 고쳐서 다시 실행할 수 있도록 입력창에 되돌린다.
            editor.set_prefill(&line);
        }
    }

    if let Some(store) = history_store {
        // 로딩이 끝나기 전에 저장하면 과거 기록을 덮어쓰므로 먼저 병합한다.
        if let Some(handle) = pending_load.take() {
            merge_loaded_history(editor, handle.await);
        }
        if let Err(err) = store.save(&editor.history()) {
            warn!(error = %format!("{err:#}"), "failed to save history");
        }
    }

    Ok(dispatcher.shell().exit_code())
}

fn merge_loaded_history(
    editor: &mut dyn LineEditor,
    loaded: Result<Result<Vec<String>>, tokio::task::JoinError>,
) {
    match loaded {
        Ok(Ok(entries)) => {
            debug!(count = entries.len(), "history loaded");
            editor.merge_history(entries);
        }
        Ok(Err(err)) => warn!(error = %format!("{err:#}"), "failed to load history"),
        Err(err) => warn!(error = %err, "history loader stopped"),
    }
}
