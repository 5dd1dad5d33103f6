//! 입력 중인 줄에 대한 자동완성 후보 계산.

use crate::application::binder::{flag_name, is_flag};
use crate::application::conversion::BOOLEAN_LITERALS;
use crate::application::ports::Completer;
use crate::domain::command::{CommandDescriptor, CommandTable, ParamType, same_name};
use crate::domain::injectables::InjectableRegistry;
use crate::domain::ranker::rank_all;
use crate::domain::stack::ArgumentStack;
use crate::domain::tokenizer::{quote_if_needed, tokenize, tokenize_partial, unquote};

/// 명령 테이블/스택/히스토리를 근거로 커서 위치 토큰의 후보를 만든다.
pub struct SuggestionEngine<'a> {
    pub table: &'a CommandTable,
    pub injectables: &'a InjectableRegistry,
    pub stack: &'a ArgumentStack,
    pub history: &'a [String],
}

/// 인자 스캔 후 다음 토큰이 채울 자리(파라미터 인덱스).
enum Slot {
    /// 값이 필요한 플래그 바로 뒤
    FlagValue(usize),
    Positional(usize),
    None,
}

/// 바인더와 같은 규칙으로 인자를 훑은 결과.
struct Walk<'t> {
    next: Slot,
    /// 파라미터별로 바인딩된 값 토큰
    values: Vec<Option<&'t String>>,
}

impl Completer for SuggestionEngine<'_> {
    fn suggestions(&self, text: &str, cursor: usize) -> Vec<String> {
        let before: String = text.chars().take(cursor).collect();
        let (mut tokens, fresh) = tokenize_partial(&before);
        let hint = if fresh {
            String::new()
        } else {
            tokens.pop().map(|t| unquote(&t)).unwrap_or_default()
        };

        let context = self.stack.combine(tokens);
        let Some((name, args)) = context.split_first() else {
            return rank_all(self.table.names(), &hint);
        };

        let (command, args) = match self.table.get(&unquote(name)) {
            Some(command) => (command, args),
            None => match self.table.default_command() {
                Some(command) => (command, context.as_slice()),
                None => return Vec::new(),
            },
        };

        if is_flag(&hint) {
            return self.flag_suggestions(command, args, flag_name(&hint));
        }

        let candidates = match walk(command, args).next {
            Slot::FlagValue(slot) | Slot::Positional(slot) => {
                self.value_candidates(command, slot, &hint)
            }
            Slot::None => Vec::new(),
        };
        rank_all(candidates, &hint)
            .iter()
            .map(|candidate| quote_if_needed(candidate))
            .collect()
    }
}

impl SuggestionEngine<'_> {
    fn flag_suggestions(&self, command: &CommandDescriptor, args: &[String], hint: &str) -> Vec<String> {
        let used: Vec<String> = args
            .iter()
            .filter(|t| is_flag(t))
            .map(|t| flag_name(t).to_lowercase())
            .collect();
        let names = command
            .visible_params()
            .map(|p| p.name.as_str())
            .filter(|name| !used.contains(&name.to_lowercase()));
        rank_all(names, hint)
            .into_iter()
            .map(|name| format!("-{name}"))
            .collect()
    }

    /// 제공자 → enum 이름 → 불리언 리터럴 → 히스토리 순으로 후보를 모은다.
    fn value_candidates(&self, command: &CommandDescriptor, slot: usize, hint: &str) -> Vec<String> {
        let param = &command.params[slot];
        if let Some(provider) = &param.suggestions {
            let provided = provider(self.injectables, hint);
            if !provided.is_empty() {
                return provided;
            }
        }

        match &param.param_type {
            ParamType::Enum { variants, .. } => variants.clone(),
            ParamType::Boolean => BOOLEAN_LITERALS.iter().map(ToString::to_string).collect(),
            _ => self.history_candidates(command, slot),
        }
    }

    /// 같은 명령으로 시작한 과거 입력을 같은 규칙으로 훑어
    /// 같은 파라미터에 바인딩됐던 값을 모은다(최신 우선).
    fn history_candidates(&self, command: &CommandDescriptor, slot: usize) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for entry in self.history.iter().rev() {
            let Ok(tokens) = tokenize(entry) else {
                continue;
            };
            let Some((first, rest)) = tokens.split_first() else {
                continue;
            };
            if !same_name(&unquote(first), &command.name) {
                continue;
            }

            let bound = walk(command, rest).values[slot];
            if let Some(value) = bound.map(|v| unquote(v))
                && !value.is_empty()
                && !out.contains(&value)
            {
                out.push(value);
            }
        }
        out
    }
}

/// 바인더와 같은 규칙으로 인자를 훑어 파라미터별 값과 다음 토큰의 자리를 계산한다.
fn walk<'t>(command: &CommandDescriptor, args: &'t [String]) -> Walk<'t> {
    let params = &command.params;
    let mut values: Vec<Option<&'t String>> = vec![None; params.len()];
    let mut used = vec![false; params.len()];
    let mut cursor = 0usize;
    let mut idx = 0usize;

    while idx < args.len() {
        let token = &args[idx];
        if is_flag(token) {
            let slot = command
                .param_index(flag_name(token))
                .filter(|slot| !params[*slot].is_injectable());
            if let Some(slot) = slot {
                used[slot] = true;
                let is_boolean = params[slot].param_type.is_boolean();
                let next = args.get(idx + 1);
                if next.is_none() && !is_boolean {
                    return Walk {
                        next: Slot::FlagValue(slot),
                        values,
                    };
                }
                if is_boolean && next.is_none_or(|t| is_flag(t)) {
                    idx += 1;
                    continue;
                }
                values[slot] = next.filter(|t| !is_flag(t));
            }
            idx += 2;
            continue;
        }

        while cursor < params.len() && (used[cursor] || params[cursor].is_injectable()) {
            cursor += 1;
        }
        if cursor < params.len() {
            used[cursor] = true;
            values[cursor] = Some(token);
            cursor += 1;
        }
        idx += 1;
    }

    while cursor < params.len() && (used[cursor] || params[cursor].is_injectable()) {
        cursor += 1;
    }
    let next = if cursor < params.len() {
        Slot::Positional(cursor)
    } else {
        Slot::None
    };
    Walk { next, values }
}
