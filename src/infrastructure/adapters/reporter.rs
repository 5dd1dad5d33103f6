//! 콘솔 리포터/결과 렌더러 포트 구현 어댑터.

use std::io::{self, IsTerminal};

use crate::application::ports::{Reporter, ResultRenderer};
use crate::domain::value::Output;
use crate::infrastructure::render::render_output;

/// 콘솔 전용 리포터 어댑터. 오류는 stderr, 결과는 stdout으로 출력한다.
pub struct ConsoleReporter {
    color: bool,
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleReporter {
    /// stderr가 TTY일 때만 색상을 사용한다.
    pub fn new() -> Self {
        Self::with_color(io::stderr().is_terminal())
    }

    pub fn with_color(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}

impl Reporter for ConsoleReporter {
    fn error(&self, message: &str) {
        eprintln!("{} {}", self.paint("31", "error:"), message);
    }

    fn hint(&self, message: &str) {
        eprintln!("  {}", self.paint("33", message));
    }

    fn echo(&self, prompt: &str, line: &str) {
        println!("{prompt}{line}");
    }
}

impl ResultRenderer for ConsoleReporter {
    fn render(&self, output: &Output) {
        for line in render_output(output) {
            println!("{line}");
        }
    }
}
