//! 토큰 목록을 명령 파라미터에 바인딩하는 인자 바인더.

use tracing::trace;

use crate::application::conversion::ConversionRegistry;
use crate::domain::command::{CommandDescriptor, ParamType};
use crate::domain::error::DispatchError;
use crate::domain::injectables::InjectableRegistry;
use crate::domain::ranker::rank_all;
use crate::domain::value::{ArgValue, BoundArgs};

const FLAG_PREFIX: char = '-';

/// `-` 로 시작하는 토큰은 파라미터 이름을 지정하는 플래그다.
pub fn is_flag(token: &str) -> bool {
    token.starts_with(FLAG_PREFIX)
}

/// 플래그 토큰에서 앞쪽 대시만 제거한다. 이름 중간의 대시는 보존된다.
pub fn flag_name(token: &str) -> &str {
    token.trim_start_matches(FLAG_PREFIX)
}

/// 토큰 목록을 명령 서술자의 파라미터 순서대로 완성된 인자 목록으로 만든다.
///
/// 1. 주입 → 기본값 → 빈 슬롯 순으로 초기화
/// 2. 왼쪽부터 스캔: 플래그는 이름으로, 나머지는 위치 커서로 바인딩
/// 3. 필수 파라미터 누락 검사
pub fn bind(
    tokens: &[String],
    command: &CommandDescriptor,
    injectables: &InjectableRegistry,
    conversions: &ConversionRegistry,
) -> Result<BoundArgs, DispatchError> {
    let params = &command.params;
    let mut values: Vec<ArgValue> = params
        .iter()
        .map(|param| match &param.param_type {
            ParamType::Injected { type_id, .. } => injectables
                .get_by_id(*type_id)
                .map(ArgValue::Injected)
                .unwrap_or(ArgValue::Absent),
            _ => param.default.clone().unwrap_or(ArgValue::Absent),
        })
        .collect();
    let mut used = vec![false; params.len()];
    let mut cursor = 0usize;
    let mut idx = 0usize;

    while idx < tokens.len() {
        let token = &tokens[idx];

        if is_flag(token) {
            let name = flag_name(token);
            let Some(slot) = command
                .param_index(name)
                .filter(|slot| !params[*slot].is_injectable())
            else {
                return Err(DispatchError::UnknownFlag {
                    flag: name.to_string(),
                    suggestions: rank_all(command.visible_params().map(|p| p.name.as_str()), name),
                });
            };
            let param = &params[slot];
            if used[slot] {
                return Err(DispatchError::DuplicateParameter(param.name.clone()));
            }

            let next = tokens.get(idx + 1);
            if param.param_type.is_boolean() && next.is_none_or(|t| is_flag(t)) {
                // 스위치 형태: 값 토큰을 소비하지 않는다.
                values[slot] = ArgValue::Bool(true);
                used[slot] = true;
                idx += 1;
                continue;
            }

            let Some(raw) = next else {
                return Err(DispatchError::MissingValue(param.name.clone()));
            };
            values[slot] = conversions.convert(param, raw)?;
            used[slot] = true;
            trace!(parameter = %param.name, "bound by flag");
            idx += 2;
            continue;
        }

        while cursor < params.len() && (used[cursor] || params[cursor].is_injectable()) {
            cursor += 1;
        }
        let Some(param) = params.get(cursor) else {
            return Err(DispatchError::UnexpectedArgument(token.clone()));
        };
        values[cursor] = conversions.convert(param, token)?;
        used[cursor] = true;
        trace!(parameter = %param.name, position = cursor, "bound by position");
        cursor += 1;
        idx += 1;
    }

    let missing: Vec<String> = params
        .iter()
        .zip(&used)
        .filter(|(param, used)| param.is_required() && !**used)
        .map(|(param, _)| param.name.clone())
        .collect();
    if !missing.is_empty() {
        return Err(DispatchError::MissingRequiredParameters { names: missing });
    }

    let names = params.iter().map(|p| p.name.clone()).collect();
    Ok(BoundArgs::new(names, values))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::command::ParameterSpec;
    use crate::domain::value::Output;

    fn toks(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    fn echo() -> CommandDescriptor {
        CommandDescriptor::new("echo", |_| async { Ok(Output::Nothing) })
            .param(ParameterSpec::string("text"))
            .param(
                ParameterSpec::new("color", ParamType::enumeration("Color", ["White", "Red"]))
                    .with_default(ArgValue::Enum("White".into())),
            )
    }

    fn connect() -> CommandDescriptor {
        CommandDescriptor::new("connect", |_| async { Ok(Output::Nothing) })
            .param(ParameterSpec::string("host"))
            .param(ParameterSpec::integer("port"))
            .param(ParameterSpec::boolean("secure").with_default(false))
            .param(ParameterSpec::string("log-level").with_default("info"))
    }

    fn run(tokens: &[&str], command: &CommandDescriptor) -> Result<BoundArgs, DispatchError> {
        bind(
            &toks(tokens),
            command,
            &InjectableRegistry::new(),
            &ConversionRegistry::new(),
        )
    }

    #[test]
    fn flag_before_positional() {
        let args = run(&["-color", "Red", "hi"], &echo()).unwrap();
        assert_eq!(args.str("text"), Some("hi"));
        assert_eq!(args.get("color"), Some(&ArgValue::Enum("Red".into())));
    }

    #[test]
    fn default_is_used_when_not_supplied() {
        let args = run(&["\"hi there\""], &echo()).unwrap();
        assert_eq!(args.str("text"), Some("hi there"));
        assert_eq!(args.str("color"), Some("White"));
    }

    #[test]
    fn trailing_non_boolean_flag_is_missing_value() {
        let err = run(&["hi", "-color"], &echo()).unwrap_err();
        assert!(matches!(err, DispatchError::MissingValue(ref name) if name == "color"));
    }

    #[test]
    fn unknown_flag_suggests_parameter_names() {
        let err = run(&["hi", "-colr", "Red"], &echo()).unwrap_err();
        match err {
            DispatchError::UnknownFlag { flag, suggestions } => {
                assert_eq!(flag, "colr");
                assert_eq!(suggestions.first().map(String::as_str), Some("color"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn repeated_flag_is_duplicate() {
        let err = run(&["-color", "Red", "-COLOR", "White", "hi"], &echo()).unwrap_err();
        assert!(matches!(err, DispatchError::DuplicateParameter(_)));
    }

    #[test]
    fn flag_after_positional_binding_is_duplicate() {
        let err = run(&["hi", "-text", "again"], &echo()).unwrap_err();
        assert!(matches!(err, DispatchError::DuplicateParameter(ref name) if name == "text"));
    }

    #[test]
    fn positional_cursor_skips_flag_bound_parameters() {
        let args = run(&["-host", "db", "5432"], &connect()).unwrap();
        assert_eq!(args.str("host"), Some("db"));
        assert_eq!(args.int("port"), Some(5432));
    }

    #[test]
    fn boolean_switch_does_not_consume_next_flag() {
        let args = run(&["db", "-secure", "-port", "443"], &connect()).unwrap();
        assert_eq!(args.bool("secure"), Some(true));
        assert_eq!(args.int("port"), Some(443));

        let args = run(&["db", "80", "-secure"], &connect()).unwrap();
        assert_eq!(args.bool("secure"), Some(true));
    }

    #[test]
    fn boolean_flag_consumes_explicit_value() {
        let args = run(&["db", "80", "-secure", "n"], &connect()).unwrap();
        assert_eq!(args.bool("secure"), Some(false));
    }

    #[test]
    fn missing_required_lists_names() {
        let err = run(&[], &connect()).unwrap_err();
        match err {
            DispatchError::MissingRequiredParameters { names } => {
                assert_eq!(names, vec!["host", "port"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn only_leading_dashes_are_stripped() {
        let args = run(&["db", "80", "--log-level", "debug"], &connect()).unwrap();
        assert_eq!(args.str("log-level"), Some("debug"));

        let err = run(&["db", "80", "-loglevel", "debug"], &connect()).unwrap_err();
        assert!(matches!(err, DispatchError::UnknownFlag { .. }));
    }

    #[test]
    fn extra_positional_is_rejected() {
        let err = run(&["hi", "Red", "more"], &echo()).unwrap_err();
        assert!(matches!(err, DispatchError::UnexpectedArgument(ref t) if t == "more"));
    }

    #[test]
    fn conversion_failure_names_parameter() {
        let err = run(&["db", "eighty"], &connect()).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::ConversionError { ref parameter, .. } if parameter == "port"
        ));
    }

    #[test]
    fn injected_parameters_are_filled_and_invisible() {
        #[derive(Debug)]
        struct Session;

        let command = echo().param(ParameterSpec::injected::<Session>("session"));
        let mut injectables = InjectableRegistry::new();
        let session = Arc::new(Session);
        injectables.register(session.clone());

        let args = bind(&toks(&["hi"]), &command, &injectables, &ConversionRegistry::new()).unwrap();
        assert!(args.injected::<Session>().is_some());

        let err = bind(
            &toks(&["hi", "-session", "x"]),
            &command,
            &injectables,
            &ConversionRegistry::new(),
        )
        .unwrap_err();
        assert!(matches!(err, DispatchError::UnknownFlag { .. }));

        let args = run(&["hi"], &command).unwrap();
        assert_eq!(args.get("session"), Some(&ArgValue::Absent));
    }

    #[test]
    fn binding_is_repeatable() {
        let command = echo();
        let first = run(&["-color", "Red", "hi"], &command).unwrap();
        let second = run(&["-color", "Red", "hi"], &command).unwrap();
        assert_eq!(first, second);
    }
}
