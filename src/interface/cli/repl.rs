//! `cmdshell` 대화형 쉘(REPL)/배치 실행 인터페이스.

use std::io::{self, BufReader, IsTerminal, Write};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use tracing::debug;

use crate::application::config::ShellConfig;
use crate::application::history::HistoryBuffer;
use crate::application::ports::NoCancelInput;
use crate::application::repl::{run_batch, run_interactive};
use crate::infrastructure::adapters::CtrlCCancelInput;
use crate::interface::cli::command::RunOptions;
use crate::interface::cli::composition::AppComposition;
use crate::interface::cli::repl_input::CrosstermLineEditor;

const BOX_WIDTH: usize = 58;

/// stdin이 TTY가 아니거나 `--batch`이면 배치, 아니면 대화형으로 실행하고 종료 코드를 반환한다.
pub async fn run_shell(composition: &AppComposition, options: &RunOptions) -> Result<i32> {
    let config = composition.load_config()?;
    let batch = options.batch || !io::stdin().is_terminal();
    debug!(batch, "starting shell");

    if batch {
        let mut dispatcher = composition.dispatcher(&config, Arc::new(NoCancelInput), None)?;
        return run_batch(&mut dispatcher, BufReader::new(io::stdin()), &config.prompt()).await;
    }

    let session_history: Arc<Mutex<HistoryBuffer>> = Arc::default();
    let mut dispatcher = composition.dispatcher(
        &config,
        Arc::new(CtrlCCancelInput::spawn()),
        Some(session_history.clone()),
    )?;
    let mut editor = CrosstermLineEditor::new(config.max_suggestions(), session_history);
    let store = composition.history_store(&config, options.no_history);

    print_welcome(composition, &config, store.is_some());
    io::stdout().flush()?;

    let code = run_interactive(&mut dispatcher, &mut editor, store, &config.prompt()).await?;
    println!();
    Ok(code)
}

fn print_welcome(composition: &AppComposition, config: &ShellConfig, history_enabled: bool) {
    let interactive = io::stdout().is_terminal();
    let title = paint("cmdshell interactive shell", "1;36", interactive);
    let subtitle = paint("type a command, Tab completes, ctrl-c cancels", "2;37", interactive);
    let tokens = config.stack_tokens();

    println!("+------------------------------------------------------------+");
    println!("| {} |", pad_box_line(&title, "cmdshell interactive shell"));
    println!(
        "| {} |",
        pad_box_line(&subtitle, "type a command, Tab completes, ctrl-c cancels")
    );
    println!("+------------------------------------------------------------+");
    for line in build_status_lines(composition, history_enabled) {
        println!("| {:<58} |", fit_box_line(&line, BOX_WIDTH));
    }
    println!("+------------------------------------------------------------+");
    println!("| Quick start                                                 |");
    let quick_start = [
        "help [command]".to_string(),
        format!("<args> {}   push onto the argument stack", tokens.push),
        format!("{}  pop   {}  clear", tokens.pop, tokens.clear),
        "exit [code]".to_string(),
    ];
    for (idx, line) in quick_start.iter().enumerate() {
        println!("|  {idx}) {:<54} |", fit_box_line(line, 54));
    }
    println!("+------------------------------------------------------------+");
    println!();
}

fn paint(text: &str, ansi: &str, interactive: bool) -> String {
    if interactive {
        format!("\x1b[{ansi}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

/// 색상 코드는 폭에 포함되지 않으므로 원문 길이로 채운다.
fn pad_box_line(painted: &str, plain: &str) -> String {
    let pad = BOX_WIDTH.saturating_sub(plain.chars().count());
    format!("{painted}{}", " ".repeat(pad))
}

fn build_status_lines(composition: &AppComposition, history_enabled: bool) -> Vec<String> {
    let mut lines = Vec::new();

    let summary = match composition.inspect_config_usecase().summary() {
        Ok(summary) => summary,
        Err(err) => {
            lines.push("Config: error".to_string());
            lines.push(format!("detail: {err}"));
            lines.push("hint: run with --inspect-config to check".to_string());
            return lines;
        }
    };
    lines.push(format!("Config: ok (loaded files: {})", summary.loaded_files));

    let history = match (history_enabled, summary.history_path) {
        (false, _) => "disabled".to_string(),
        (true, Some(path)) => path,
        (true, None) => "default location".to_string(),
    };
    lines.push(format!("History: {history}"));

    if let Ok(table) = composition.command_table() {
        lines.push(format!("Commands: {}", table.names().join(", ")));
    }
    lines
}

fn fit_box_line(text: &str, width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= width {
        return text.to_string();
    }

    if width <= 3 {
        return ".".repeat(width);
    }

    let keep = width - 3;
    let head: String = chars.into_iter().take(keep).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_status_lines_are_clipped() {
        assert_eq!(fit_box_line("short", 10), "short");
        assert_eq!(fit_box_line("abcdefghijkl", 8), "abcde...");
    }

    #[test]
    fn painted_title_pads_by_plain_width() {
        let padded = pad_box_line("\x1b[1mhi\x1b[0m", "hi");
        assert!(padded.ends_with(&" ".repeat(BOX_WIDTH - 2)));
    }
}
