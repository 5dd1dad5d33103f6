//! 배치/대화형 루프: 에코, 종료 코드, 히스토리 병합과 저장, 거부된 입력 재입력.

use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};

use cmdshell::application::history::HistoryBuffer;
use cmdshell::application::ports::{Completer, HistoryStore, LineEditor, Reporter, ResultRenderer};
use cmdshell::application::repl::{run_batch, run_interactive};
use cmdshell::infrastructure::adapters::FileHistory;
use cmdshell::infrastructure::render::render_output;
use cmdshell::{
    ArgValue, BoundArgs, CommandDescriptor, CommandTable, Dispatcher, Output, ParameterSpec,
    ShellControl,
};

#[derive(Default)]
struct Capture {
    lines: Mutex<Vec<String>>,
}

impl Capture {
    fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl Reporter for Capture {
    fn error(&self, message: &str) {
        self.lines.lock().unwrap().push(format!("error: {message}"));
    }

    fn hint(&self, message: &str) {
        self.lines.lock().unwrap().push(format!("hint: {message}"));
    }

    fn echo(&self, prompt: &str, line: &str) {
        self.lines.lock().unwrap().push(format!("{prompt}{line}"));
    }
}

impl ResultRenderer for Capture {
    fn render(&self, output: &Output) {
        let mut lines = self.lines.lock().unwrap();
        lines.extend(render_output(output));
    }
}

fn dispatcher(capture: &Arc<Capture>) -> Dispatcher {
    let table = CommandTable::builder()
        .command(
            CommandDescriptor::new("say", |args: BoundArgs| async move {
                Ok(Output::Text(args.str("text").unwrap_or_default().to_string()))
            })
            .param(ParameterSpec::string("text")),
        )
        .command(
            CommandDescriptor::new("exit", |args: BoundArgs| async move {
                let shell = args
                    .injected::<ShellControl>()
                    .ok_or_else(|| anyhow!("no shell"))?;
                shell.request_exit(args.int("code").unwrap_or_default() as i32);
                Ok(Output::Nothing)
            })
            .param(ParameterSpec::integer("code").with_default(ArgValue::Int(0)))
            .param(ParameterSpec::injected::<ShellControl>("shell")),
        )
        .build()
        .unwrap();
    Dispatcher::builder(table, capture.clone(), capture.clone()).build()
}

#[tokio::test]
async fn batch_echoes_each_line_with_prompt() {
    let capture = Arc::new(Capture::default());
    let mut shell = dispatcher(&capture);

    let input = Cursor::new("say one\nsay \\\ntwo\n");
    let code = run_batch(&mut shell, input, "> ").await.unwrap();

    assert_eq!(code, 0);
    assert_eq!(
        capture.lines(),
        vec!["> say one", "one", "> say \\", "say> two", "two"]
    );
}

#[tokio::test]
async fn batch_exit_code_reflects_failures() {
    let capture = Arc::new(Capture::default());
    let mut shell = dispatcher(&capture);

    let code = run_batch(&mut shell, Cursor::new("say a\nbogus\nsay b\n"), "> ")
        .await
        .unwrap();

    assert_eq!(code, 1);
    assert!(capture.lines().contains(&"b".to_string()));
}

#[tokio::test]
async fn batch_stops_at_exit_with_its_code() {
    let capture = Arc::new(Capture::default());
    let mut shell = dispatcher(&capture);

    let code = run_batch(&mut shell, Cursor::new("bogus\nexit 3\nsay never\n"), "> ")
        .await
        .unwrap();

    assert_eq!(code, 3);
    assert!(!capture.lines().iter().any(|line| line.contains("never")));
}

/// 미리 준비한 입력 줄을 차례로 돌려주는 에디터.
struct ScriptedEditor {
    script: VecDeque<String>,
    history: HistoryBuffer,
    prompts: Vec<String>,
    prefills: Vec<String>,
}

impl ScriptedEditor {
    fn new(lines: &[&str]) -> Self {
        Self {
            script: lines.iter().map(ToString::to_string).collect(),
            history: HistoryBuffer::new(),
            prompts: Vec::new(),
            prefills: Vec::new(),
        }
    }
}

impl LineEditor for ScriptedEditor {
    fn read_line(&mut self, prompt: &str, completer: &dyn Completer) -> Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        // 자동완성 콜백은 읽기 중 언제든 호출될 수 있다.
        let _ = completer.suggestions("sa", 2);
        Ok(self.script.pop_front())
    }

    fn set_prefill(&mut self, text: &str) {
        self.prefills.push(text.to_string());
    }

    fn add_history(&mut self, line: &str) {
        self.history.add(line);
    }

    fn history(&self) -> Vec<String> {
        self.history.entries().to_vec()
    }

    fn merge_history(&mut self, loaded: Vec<String>) {
        self.history.merge_loaded(loaded);
    }
}

#[tokio::test]
async fn interactive_session_merges_and_saves_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history");
    std::fs::write(&path, "say old\nsay shared\n").unwrap();
    let store: Arc<dyn HistoryStore> = Arc::new(FileHistory::new(&path, 10));

    let capture = Arc::new(Capture::default());
    let mut shell = dispatcher(&capture);
    let mut editor = ScriptedEditor::new(&["say shared", "", "bogus", "exit 4", "say unreachable"]);

    let code = run_interactive(&mut shell, &mut editor, Some(store.clone()), "$ ")
        .await
        .unwrap();

    assert_eq!(code, 4);
    assert_eq!(editor.prefills, vec!["bogus"]);
    assert_eq!(editor.script.len(), 1);
    assert_eq!(
        store.load().unwrap(),
        vec!["say old", "say shared", "bogus", "exit 4"]
    );
}

#[tokio::test]
async fn interactive_prompt_follows_stack() {
    let capture = Arc::new(Capture::default());
    let mut shell = dispatcher(&capture);
    let mut editor = ScriptedEditor::new(&["say \\", "hi", "..", "say bye"]);

    let code = run_interactive(&mut shell, &mut editor, None, "> ").await.unwrap();

    assert_eq!(code, 0);
    assert_eq!(editor.prompts, vec!["> ", "say> ", "say> ", "> ", "> "]);
    assert_eq!(capture.lines(), vec!["hi", "bye"]);
}

#[tokio::test]
async fn history_cap_keeps_latest_lines() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn HistoryStore> = Arc::new(FileHistory::new(dir.path().join("h"), 2));

    let capture = Arc::new(Capture::default());
    let mut shell = dispatcher(&capture);
    let mut editor = ScriptedEditor::new(&["say a", "say b", "say c"]);

    run_interactive(&mut shell, &mut editor, Some(store.clone()), "> ")
        .await
        .unwrap();

    assert_eq!(store.load().unwrap(), vec!["say b", "say c"]);
}
