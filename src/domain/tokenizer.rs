//! 입력 한 줄을 토큰 목록으로 분리하는 토크나이저.
//!
//! 토큰은 원형(따옴표 포함)으로 반환되며, 따옴표 제거는 바인딩 직전 `unquote`에서 수행한다.

use crate::domain::error::DispatchError;

const DELIMITER: char = ' ';
const QUOTE: char = '"';
const COMMENT_PREFIX: char = '#';

/// 한 줄을 공백 구분 토큰으로 분리한다.
/// - 빈 줄/공백 줄/`#` 주석 줄은 빈 목록
/// - `"..."` 내부 공백은 보존, `""`는 리터럴 따옴표
/// - 닫히지 않은 따옴표는 `MalformedInput`
pub fn tokenize(line: &str) -> Result<Vec<String>, DispatchError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim_start();
    if trimmed.trim().is_empty() || trimmed.starts_with(COMMENT_PREFIX) {
        return Ok(Vec::new());
    }

    let mut tokens = Vec::new();
    let mut chars = trimmed.chars().peekable();

    while let Some(&ch) = chars.peek() {
        if ch == DELIMITER {
            chars.next();
            continue;
        }

        let mut token = String::new();
        if ch == QUOTE {
            token.push(QUOTE);
            chars.next();
            loop {
                match chars.next() {
                    None => return Err(DispatchError::MalformedInput("unclosed quotes".into())),
                    Some(QUOTE) => {
                        token.push(QUOTE);
                        // `""`는 이스케이프된 따옴표, 단독 따옴표는 필드 종료.
                        if chars.peek() == Some(&QUOTE) {
                            token.push(QUOTE);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    Some(c) => token.push(c),
                }
            }
        }

        while let Some(&c) = chars.peek() {
            if c == DELIMITER {
                break;
            }
            token.push(c);
            chars.next();
        }
        tokens.push(token);
    }

    Ok(tokens)
}

/// 입력 중인(미완성) 줄을 관대하게 분리한다. 자동완성 전용.
/// 반환값의 두 번째 요소는 줄이 구분자로 끝나 새 토큰을 시작하는 상태인지 여부.
pub fn tokenize_partial(line: &str) -> (Vec<String>, bool) {
    let trailing_delimiter = line.is_empty() || line.ends_with(DELIMITER);
    let tokens = match tokenize(line) {
        Ok(tokens) => tokens,
        // 닫히지 않은 따옴표는 임시로 닫아 현재 토큰을 살린다.
        Err(_) => tokenize(&format!("{line}{QUOTE}")).unwrap_or_default(),
    };
    let in_open_quote = tokenize(line).is_err();
    (tokens, trailing_delimiter && !in_open_quote)
}

/// 감싸는 따옴표 한 겹을 벗기고 `""`를 `"`로 되돌린다.
pub fn unquote(token: &str) -> String {
    let wrapped = token.len() >= 2 && token.starts_with(QUOTE) && token.ends_with(QUOTE);
    if !wrapped {
        return token.to_string();
    }
    token[1..token.len() - 1].replace("\"\"", "\"")
}

/// 공백/따옴표가 있는 값을 토큰 하나로 다시 쓸 수 있게 감싼다.
pub fn quote_if_needed(value: &str) -> String {
    if value.contains(DELIMITER) || value.starts_with(QUOTE) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unquoted(line: &str) -> Vec<String> {
        tokenize(line)
            .expect("tokenize failed")
            .iter()
            .map(|t| unquote(t))
            .collect()
    }

    #[test]
    fn splits_simple_words() {
        assert_eq!(tokenize("echo hi").unwrap(), vec!["echo", "hi"]);
    }

    #[test]
    fn keeps_raw_quotes_until_unquoted() {
        assert_eq!(tokenize("echo \"hi\"").unwrap(), vec!["echo", "\"hi\""]);
        assert_eq!(unquoted("echo \"hi\""), vec!["echo", "hi"]);
    }

    #[test]
    fn preserves_whitespace_inside_quotes() {
        assert_eq!(unquoted("echo \"Hello World\""), vec!["echo", "Hello World"]);
        assert_eq!(unquoted("echo \"  padded  \""), vec!["echo", "  padded  "]);
    }

    #[test]
    fn doubled_quote_is_literal() {
        assert_eq!(
            unquoted("echo \"Hello \"\"World\"\"!\""),
            vec!["echo", "Hello \"World\"!"]
        );
    }

    #[test]
    fn unclosed_quote_is_malformed() {
        let err = tokenize("echo \"hi").unwrap_err();
        assert!(matches!(err, DispatchError::MalformedInput(_)));
    }

    #[test]
    fn runs_of_spaces_do_not_create_empty_tokens() {
        assert_eq!(tokenize("  echo    a   b  ").unwrap(), vec!["echo", "a", "b"]);
    }

    #[test]
    fn blank_and_comment_lines_are_empty() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize("   \t ").unwrap().is_empty());
        assert!(tokenize("  # echo \"unclosed").unwrap().is_empty());
    }

    #[test]
    fn empty_quoted_field_is_a_token() {
        assert_eq!(unquoted("echo \"\""), vec!["echo", ""]);
    }

    #[test]
    fn partial_line_closes_open_quote() {
        let (tokens, fresh) = tokenize_partial("echo \"hel");
        assert_eq!(tokens, vec!["echo", "\"hel\""]);
        assert!(!fresh);

        let (tokens, fresh) = tokenize_partial("echo ");
        assert_eq!(tokens, vec!["echo"]);
        assert!(fresh);
    }

    #[test]
    fn quote_if_needed_round_trips_through_tokenizer() {
        let quoted = quote_if_needed("say \"hi\" now");
        let tokens = tokenize(&format!("echo {quoted}")).unwrap();
        assert_eq!(unquote(&tokens[1]), "say \"hi\" now");
        assert_eq!(quote_if_needed("plain"), "plain");
    }
}
