//! REPL 입력 처리기.
//! 입력 중 커서 위치 토큰의 추천을 프롬프트 아래에 실시간으로 표시한다.

use std::env;
use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use crossterm::cursor;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::style::{Color, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, ClearType};
use tracing::debug;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::application::config::DEFAULT_MAX_SUGGESTIONS;
use crate::application::history::HistoryBuffer;
use crate::application::ports::{Completer, LineEditor};

/// crossterm raw mode 기반 한 줄 에디터.
/// - TTY + 지원 터미널: 실시간 추천 + Tab 완성 + 히스토리 탐색
/// - non-TTY/미지원 터미널: 일반 라인 입력
pub struct CrosstermLineEditor {
    /// `history` 명령과 공유하는 세션 기록
    history: Arc<Mutex<HistoryBuffer>>,
    prefill: Option<String>,
    max_suggestions: usize,
}

impl Default for CrosstermLineEditor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SUGGESTIONS, Arc::default())
    }
}

impl CrosstermLineEditor {
    pub fn new(max_suggestions: usize, history: Arc<Mutex<HistoryBuffer>>) -> Self {
        Self {
            history,
            prefill: None,
            max_suggestions,
        }
    }
}

impl LineEditor for CrosstermLineEditor {
    fn read_line(&mut self, prompt: &str, completer: &dyn Completer) -> Result<Option<String>> {
        let initial = self.prefill.take().unwrap_or_default();

        if !supports_interactive_input() {
            return read_line_fallback(prompt, &initial);
        }

        match self.read_line_interactive(prompt, &initial, completer) {
            Ok(v) => Ok(v),
            Err(err) => {
                debug!(error = %err, "interactive input failed; falling back to plain input");
                read_line_fallback(prompt, &initial)
            }
        }
    }

    fn set_prefill(&mut self, text: &str) {
        self.prefill = Some(text.to_string());
    }

    fn add_history(&mut self, line: &str) {
        if let Ok(mut history) = self.history.lock() {
            history.add(line);
        }
    }

    fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .map(|history| history.entries().to_vec())
            .unwrap_or_default()
    }

    fn merge_history(&mut self, loaded: Vec<String>) {
        if let Ok(mut history) = self.history.lock() {
            history.merge_loaded(loaded);
        }
    }
}

impl CrosstermLineEditor {
    fn read_line_interactive(
        &self,
        prompt: &str,
        initial: &str,
        completer: &dyn Completer,
    ) -> Result<Option<String>> {
        let mut stdout = io::stdout();
        let mut frame = Frame::default();
        let _guard = InputGuard::enter(&mut stdout)?;

        let mut input = initial.to_string();
        let mut cursor_chars = input.chars().count();
        let entries = self.history();
        let mut browser = HistoryBrowser::new(&entries);

        loop {
            let mut suggestions = completer.suggestions(&input, cursor_chars);
            suggestions.truncate(self.max_suggestions);
            frame.render(&mut stdout, prompt, &input, cursor_chars, &suggestions)?;

            let key = match event::read()? {
                Event::Paste(text) => {
                    for ch in text.chars().filter(|ch| !ch.is_control()) {
                        insert_char_at(&mut input, cursor_chars, ch);
                        cursor_chars += 1;
                    }
                    continue;
                }
                Event::Key(key) if key.kind == KeyEventKind::Press => key,
                _ => continue,
            };

            match key.code {
                KeyCode::Enter => {
                    frame.finish(&mut stdout, prompt, &input)?;
                    return Ok(Some(input));
                }
                KeyCode::Backspace => {
                    if cursor_chars > 0 {
                        remove_char_at(&mut input, cursor_chars - 1);
                        cursor_chars -= 1;
                    }
                }
                KeyCode::Delete => {
                    if cursor_chars < input.chars().count() {
                        remove_char_at(&mut input, cursor_chars);
                    }
                }
                KeyCode::Left => {
                    cursor_chars = cursor_chars.saturating_sub(1);
                }
                KeyCode::Right => {
                    cursor_chars = (cursor_chars + 1).min(input.chars().count());
                }
                KeyCode::Home => {
                    cursor_chars = 0;
                }
                KeyCode::End => {
                    cursor_chars = input.chars().count();
                }
                KeyCode::Up => {
                    if let Some(entry) = browser.older(&input) {
                        input = entry;
                        cursor_chars = input.chars().count();
                    }
                }
                KeyCode::Down => {
                    if let Some(entry) = browser.newer() {
                        input = entry;
                        cursor_chars = input.chars().count();
                    }
                }
                KeyCode::Tab => {
                    if let Some(candidate) = suggestions.first() {
                        let (completed, cursor) =
                            apply_completion(&input, cursor_chars, candidate, suggestions.len() == 1);
                        input = completed;
                        cursor_chars = cursor;
                    }
                }
                KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    if input.is_empty() {
                        frame.finish(&mut stdout, prompt, &input)?;
                        return Ok(None);
                    }
                    if cursor_chars < input.chars().count() {
                        remove_char_at(&mut input, cursor_chars);
                    }
                }
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    // 현재 입력을 버리고 새 프롬프트를 띄운다.
                    frame.finish(&mut stdout, prompt, &input)?;
                    return Ok(Some(String::new()));
                }
                KeyCode::Char(ch) => {
                    if !key.modifiers.contains(KeyModifiers::CONTROL)
                        && !key.modifiers.contains(KeyModifiers::ALT)
                    {
                        insert_char_at(&mut input, cursor_chars, ch);
                        cursor_chars += 1;
                    }
                }
                _ => {}
            }
        }
    }
}

fn supports_interactive_input() -> bool {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        return false;
    }

    // dumb 터미널에서는 제어 시퀀스 기반 UI를 비활성화한다.
    if let Ok(term) = env::var("TERM")
        && term.eq_ignore_ascii_case("dumb")
    {
        return false;
    }

    true
}

fn read_line_fallback(prompt: &str, initial: &str) -> Result<Option<String>> {
    print!("{prompt}{initial}");
    io::stdout().flush()?;

    let mut line = String::new();
    let read = io::stdin().read_line(&mut line)?;
    if read == 0 {
        return Ok(None);
    }

    // 프리필은 화면에만 보이므로 입력 앞에 다시 붙인다.
    Ok(Some(format!("{initial}{}", trim_newline(line))))
}

/// 위/아래 키로 과거 입력을 탐색한다. 탐색 시작 시 입력 중이던 초안을 보관한다.
struct HistoryBrowser<'a> {
    entries: &'a [String],
    position: Option<usize>,
    draft: String,
}

impl<'a> HistoryBrowser<'a> {
    fn new(entries: &'a [String]) -> Self {
        Self {
            entries,
            position: None,
            draft: String::new(),
        }
    }

    fn older(&mut self, current: &str) -> Option<String> {
        let next = match self.position {
            None => {
                self.draft = current.to_string();
                self.entries.len().checked_sub(1)?
            }
            Some(0) => return None,
            Some(pos) => pos - 1,
        };
        self.position = Some(next);
        self.entries.get(next).cloned()
    }

    fn newer(&mut self) -> Option<String> {
        let pos = self.position?;
        if pos + 1 < self.entries.len() {
            self.position = Some(pos + 1);
            return self.entries.get(pos + 1).cloned();
        }
        self.position = None;
        Some(std::mem::take(&mut self.draft))
    }
}

/// 커서가 속한 토큰의 시작 위치(문자 단위). 따옴표 안의 공백은 구분자가 아니다.
fn token_start(input: &str, cursor_chars: usize) -> usize {
    let mut start = 0usize;
    let mut in_quotes = false;
    let mut at_field_start = true;

    for (idx, ch) in input.chars().take(cursor_chars).enumerate() {
        if in_quotes {
            if ch == '"' {
                in_quotes = false;
            }
            continue;
        }
        match ch {
            ' ' => {
                start = idx + 1;
                at_field_start = true;
            }
            '"' if at_field_start => {
                in_quotes = true;
                at_field_start = false;
            }
            _ => at_field_start = false,
        }
    }
    start
}

/// 커서 위치 토큰을 후보로 교체한다. 유일 후보이면 뒤에 공백을 붙인다.
fn apply_completion(
    input: &str,
    cursor_chars: usize,
    candidate: &str,
    unique: bool,
) -> (String, usize) {
    let start = token_start(input, cursor_chars);
    let head: String = input.chars().take(start).collect();
    let tail: String = input.chars().skip(cursor_chars).collect();

    let mut completed = head;
    completed.push_str(candidate);
    if unique && !tail.starts_with(' ') {
        completed.push(' ');
    }
    let cursor = completed.chars().count();
    completed.push_str(&tail);
    (completed, cursor)
}

/// 직전 프레임이 차지한 줄 수를 기억해 다음 프레임에서 덮어쓴다.
#[derive(Default)]
struct Frame {
    /// 입력 줄 아래에 그려진 추천 줄 수
    rendered_below: u16,
}

impl Frame {
    fn render(
        &mut self,
        stdout: &mut io::Stdout,
        prompt: &str,
        input: &str,
        cursor_chars: usize,
        suggestions: &[String],
    ) -> Result<()> {
        let (w, _) = terminal::size().unwrap_or((120, 40));
        let width = (w as usize).max(20);

        execute!(
            stdout,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::FromCursorDown)
        )?;
        write!(stdout, "{}", render_prompt_line(prompt, input, width))?;

        for (idx, item) in suggestions.iter().enumerate() {
            let marker = if idx == 0 { ">" } else { " " };
            let color = if idx == 0 { Color::White } else { Color::DarkGrey };
            write!(stdout, "\r\n")?;
            execute!(stdout, SetForegroundColor(color))?;
            write!(
                stdout,
                "{}",
                clip_line_display(&format!("  {marker} {item}"), width.saturating_sub(1))
            )?;
            execute!(stdout, ResetColor)?;
        }

        self.rendered_below = u16::try_from(suggestions.len()).unwrap_or(u16::MAX);
        if self.rendered_below > 0 {
            execute!(stdout, cursor::MoveUp(self.rendered_below))?;
        }
        let col = u16::try_from(prompt_cursor_col(prompt, input, cursor_chars, width)).unwrap_or(0);
        execute!(stdout, cursor::MoveToColumn(col), cursor::Show)?;
        stdout.flush()?;
        Ok(())
    }

    /// 추천 목록을 지우고 최종 입력만 남긴 뒤 다음 줄로 이동한다.
    fn finish(&mut self, stdout: &mut io::Stdout, prompt: &str, input: &str) -> Result<()> {
        let (w, _) = terminal::size().unwrap_or((120, 40));
        execute!(
            stdout,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::FromCursorDown)
        )?;
        write!(stdout, "{}\r\n", render_prompt_line(prompt, input, (w as usize).max(20)))?;
        stdout.flush()?;
        self.rendered_below = 0;
        Ok(())
    }
}

fn render_prompt_line(prompt: &str, input: &str, width: usize) -> String {
    let prefix_width = display_width(prompt);
    let available = width.saturating_sub(prefix_width + 1);
    let shown = tail_with_ellipsis_display(input, available);
    clip_line_display(&format!("{prompt}{shown}"), width.saturating_sub(1))
}

fn prompt_cursor_col(prompt: &str, input: &str, cursor_chars: usize, width: usize) -> usize {
    let prefix_width = display_width(prompt);
    let input_width = display_width(input);
    let before_cursor: String = input.chars().take(cursor_chars).collect();
    let before_cursor_width = display_width(&before_cursor);
    let available = width.saturating_sub(prefix_width + 1);

    if input_width <= available {
        return (prefix_width + before_cursor_width).min(width.saturating_sub(1));
    }

    // 오버플로우 상태에서는 tail 표시 정책상 커서를 입력 끝쪽으로 정렬한다.
    (prefix_width + display_width(&tail_with_ellipsis_display(input, available)))
        .min(width.saturating_sub(1))
}

fn tail_with_ellipsis_display(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }

    if display_width(text) <= max_width {
        return text.to_string();
    }

    if max_width <= 3 {
        return ".".repeat(max_width);
    }

    let target = max_width - 3;
    let mut tail_rev = String::new();
    let mut used = 0usize;

    for ch in text.chars().rev() {
        let cw = char_display_width(ch);
        if used + cw > target {
            break;
        }
        tail_rev.push(ch);
        used += cw;
    }

    let tail: String = tail_rev.chars().rev().collect();
    format!("...{tail}")
}

fn clip_line_display(line: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }

    if display_width(line) <= max_width {
        return line.to_string();
    }

    if max_width <= 3 {
        return ".".repeat(max_width);
    }

    let mut out = String::new();
    let mut used = 0usize;
    let cap = max_width - 3;

    for ch in line.chars() {
        let cw = char_display_width(ch);
        if used + cw > cap {
            break;
        }
        out.push(ch);
        used += cw;
    }

    out.push_str("...");
    out
}

fn trim_newline(mut s: String) -> String {
    while matches!(s.chars().last(), Some('\n' | '\r')) {
        s.pop();
    }
    s
}

fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

fn char_display_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(0)
}

struct InputGuard;

impl InputGuard {
    fn enter(stdout: &mut io::Stdout) -> Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(stdout, cursor::Show)?;
        Ok(Self)
    }
}

impl Drop for InputGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, cursor::Show, ResetColor);
        let _ = terminal::disable_raw_mode();
        let _ = stdout.flush();
    }
}

fn insert_char_at(input: &mut String, char_idx: usize, ch: char) {
    let byte_idx = byte_index_at_char(input, char_idx);
    input.insert(byte_idx, ch);
}

fn remove_char_at(input: &mut String, char_idx: usize) {
    let start = byte_index_at_char(input, char_idx);
    let end = byte_index_at_char(input, char_idx + 1);
    if start < end && end <= input.len() {
        input.replace_range(start..end, "");
    }
}

fn byte_index_at_char(input: &str, char_idx: usize) -> usize {
    input
        .char_indices()
        .nth(char_idx)
        .map(|(idx, _)| idx)
        .unwrap_or(input.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn completion_replaces_token_under_cursor() {
        assert_eq!(
            apply_completion("echo hi -co", 11, "-color", true),
            ("echo hi -color ".to_string(), 15)
        );
        assert_eq!(
            apply_completion("conn", 4, "connect", false),
            ("connect".to_string(), 7)
        );
    }

    #[test]
    fn completion_keeps_text_after_cursor() {
        let (line, cursor) = apply_completion("ec hello", 2, "echo", true);
        assert_eq!(line, "echo hello");
        assert_eq!(cursor, 4);
    }

    #[test]
    fn quoted_spaces_stay_in_one_token() {
        assert_eq!(token_start("get \"my fi", 10), 4);
        assert_eq!(token_start("a b", 3), 2);
        assert_eq!(token_start("a b ", 4), 4);
    }

    #[test]
    fn history_browsing_restores_draft() {
        let entries = strings(&["first", "second"]);
        let mut browser = HistoryBrowser::new(&entries);

        assert_eq!(browser.older("draft").as_deref(), Some("second"));
        assert_eq!(browser.older("second").as_deref(), Some("first"));
        assert_eq!(browser.older("first"), None);
        assert_eq!(browser.newer().as_deref(), Some("second"));
        assert_eq!(browser.newer().as_deref(), Some("draft"));
        assert_eq!(browser.newer(), None);
    }

    #[test]
    fn multibyte_edits_use_char_positions() {
        let mut input = "가나".to_string();
        insert_char_at(&mut input, 1, 'x');
        assert_eq!(input, "가x나");
        remove_char_at(&mut input, 0);
        assert_eq!(input, "x나");
    }

    #[test]
    fn long_input_shows_tail() {
        assert_eq!(tail_with_ellipsis_display("abcdefgh", 6), "...fgh");
        assert_eq!(clip_line_display("abcdefgh", 6), "abc...");
        assert_eq!(render_prompt_line("> ", "hi", 40), "> hi");
    }

    #[test]
    fn history_is_shared_with_owner() {
        let shared: Arc<Mutex<HistoryBuffer>> = Arc::default();
        let mut editor = CrosstermLineEditor::new(5, shared.clone());
        editor.add_history("echo a");
        editor.merge_history(strings(&["old"]));
        assert_eq!(shared.lock().unwrap().entries(), ["old", "echo a"]);
    }

    #[test]
    fn prefill_is_consumed_once() {
        let mut editor = CrosstermLineEditor::default();
        editor.set_prefill("echo ");
        assert_eq!(editor.prefill.take().as_deref(), Some("echo "));
        assert!(editor.prefill.is_none());
    }
}
