//! 반복 입력 접두어를 고정하는 인자 스택.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PUSH_TOKEN: &str = "\\";
pub const DEFAULT_POP_TOKEN: &str = "..";
pub const DEFAULT_CLEAR_TOKEN: &str = "...";

/// 스택 제어 토큰 설정.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StackTokens {
    pub push: String,
    pub pop: String,
    pub clear: String,
}

impl Default for StackTokens {
    fn default() -> Self {
        Self {
            push: DEFAULT_PUSH_TOKEN.to_string(),
            pop: DEFAULT_POP_TOKEN.to_string(),
            clear: DEFAULT_CLEAR_TOKEN.to_string(),
        }
    }
}

/// 명령 대신 스택만 바꾸는 입력.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackControl {
    Push(Vec<String>),
    Pop,
    Clear,
}

/// LIFO 컨텍스트 버퍼. 내용은 오래된 것부터 보관한다.
#[derive(Debug, Clone, Default)]
pub struct ArgumentStack {
    items: Vec<String>,
    tokens: StackTokens,
}

impl ArgumentStack {
    pub fn new(tokens: StackTokens) -> Self {
        Self {
            items: Vec::new(),
            tokens,
        }
    }

    pub fn tokens(&self) -> &StackTokens {
        &self.tokens
    }

    /// 오래된 것 → 최신 순서의 현재 내용.
    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 줄이 스택 제어 입력인지 판별한다.
    /// - 마지막 토큰이 push 토큰: 앞선 토큰 전부 push
    /// - 줄 전체가 pop/clear 토큰
    pub fn classify(&self, tokens: &[String]) -> Option<StackControl> {
        let (last, preceding) = tokens.split_last()?;

        if *last == self.tokens.push {
            return Some(StackControl::Push(preceding.to_vec()));
        }
        if !preceding.is_empty() {
            return None;
        }
        if *last == self.tokens.pop {
            return Some(StackControl::Pop);
        }
        if *last == self.tokens.clear {
            return Some(StackControl::Clear);
        }
        None
    }

    pub fn apply(&mut self, control: StackControl) {
        match control {
            StackControl::Push(tokens) => self.items.extend(tokens),
            StackControl::Pop => {
                self.items.pop();
            }
            StackControl::Clear => self.items.clear(),
        }
    }

    /// 스택 내용 뒤에 새 토큰을 이어 붙여 디스패치 문맥을 만든다.
    pub fn combine(&self, tokens: Vec<String>) -> Vec<String> {
        let mut combined = self.items.clone();
        combined.extend(tokens);
        combined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(line: &str) -> Vec<String> {
        line.split_whitespace().map(ToString::to_string).collect()
    }

    #[test]
    fn push_then_combine_prefixes_context() {
        let mut stack = ArgumentStack::default();
        let control = stack.classify(&toks("users \\")).unwrap();
        assert_eq!(control, StackControl::Push(vec!["users".into()]));
        stack.apply(control);

        assert_eq!(stack.combine(toks("list")), vec!["users", "list"]);
    }

    #[test]
    fn push_keeps_oldest_first() {
        let mut stack = ArgumentStack::default();
        stack.apply(StackControl::Push(toks("a b")));
        stack.apply(StackControl::Push(toks("c")));
        assert_eq!(stack.items(), ["a", "b", "c"]);

        stack.apply(StackControl::Pop);
        assert_eq!(stack.items(), ["a", "b"]);
    }

    #[test]
    fn pop_on_empty_is_noop() {
        let mut stack = ArgumentStack::default();
        stack.apply(StackControl::Pop);
        assert!(stack.is_empty());
    }

    #[test]
    fn clear_empties_any_depth() {
        let mut stack = ArgumentStack::default();
        for depth in 0..5 {
            stack.apply(StackControl::Push(vec![format!("level{depth}")]));
        }
        let control = stack.classify(&toks("...")).unwrap();
        stack.apply(control);
        assert!(stack.is_empty());
    }

    #[test]
    fn pop_and_clear_only_match_whole_line() {
        let stack = ArgumentStack::default();
        assert_eq!(stack.classify(&toks("..")), Some(StackControl::Pop));
        assert_eq!(stack.classify(&toks("cd ..")), None);
        assert_eq!(stack.classify(&toks("echo ...")), None);
        assert_eq!(stack.classify(&[]), None);
    }

    #[test]
    fn custom_tokens_are_honored() {
        let stack = ArgumentStack::new(StackTokens {
            push: ">>".into(),
            pop: "<".into(),
            clear: "<<".into(),
        });
        assert_eq!(
            stack.classify(&toks("db >>")),
            Some(StackControl::Push(vec!["db".into()]))
        );
        assert_eq!(stack.classify(&toks("<<")), Some(StackControl::Clear));
        assert_eq!(stack.classify(&toks("\\")), None);
    }
}
