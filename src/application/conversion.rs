//! 타입 태그 기반 문자열 → 값 변환 레지스트리.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;

use crate::domain::command::{ParamType, ParameterSpec, same_name};
use crate::domain::error::DispatchError;
use crate::domain::tokenizer::unquote;
use crate::domain::value::ArgValue;

/// 호스트 정의 타입 변환기.
pub type Converter = Arc<dyn Fn(&str) -> Result<ArgValue> + Send + Sync>;

/// 불리언 파라미터에 허용되는 입력(대소문자 무시).
pub const BOOLEAN_LITERALS: [&str; 4] = ["Y", "N", "true", "false"];

/// 기본 타입(string/int/float/bool/enum)은 내장 규칙으로,
/// 커스텀 태그는 등록된 변환기로 처리한다.
#[derive(Clone, Default)]
pub struct ConversionRegistry {
    custom: HashMap<String, Converter>,
}

impl ConversionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 커스텀 타입 태그 변환기를 등록한다. 태그는 대소문자를 구분하지 않는다.
    pub fn register<F>(&mut self, tag: &str, converter: F)
    where
        F: Fn(&str) -> Result<ArgValue> + Send + Sync + 'static,
    {
        self.custom.insert(tag.to_lowercase(), Arc::new(converter));
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.custom.contains_key(&tag.to_lowercase())
    }

    /// 원형 토큰을 파라미터 선언 타입으로 변환한다.
    /// 감싸는 따옴표 한 겹은 변환 전에 제거된다.
    pub fn convert(&self, param: &ParameterSpec, raw: &str) -> Result<ArgValue, DispatchError> {
        let text = unquote(raw);
        let rejected = |valid_values: Vec<String>, detail: Option<String>| {
            DispatchError::ConversionError {
                parameter: param.name.clone(),
                value: text.clone(),
                type_name: param.param_type.display_name().to_string(),
                valid_values,
                detail,
            }
        };
        let failed = |valid_values: Vec<String>| rejected(valid_values, None);

        match &param.param_type {
            ParamType::String => Ok(ArgValue::Str(text.clone())),
            ParamType::Integer => text
                .trim()
                .parse()
                .map(ArgValue::Int)
                .map_err(|_| failed(Vec::new())),
            ParamType::Float => text
                .trim()
                .parse()
                .map(ArgValue::Float)
                .map_err(|_| failed(Vec::new())),
            ParamType::Boolean => parse_bool(&text)
                .map(ArgValue::Bool)
                .ok_or_else(|| failed(BOOLEAN_LITERALS.iter().map(ToString::to_string).collect())),
            ParamType::Enum { variants, .. } => variants
                .iter()
                .find(|v| same_name(v, text.trim()))
                .map(|v| ArgValue::Enum(v.clone()))
                .ok_or_else(|| failed(variants.clone())),
            ParamType::Custom(tag) => match self.custom.get(&tag.to_lowercase()) {
                Some(converter) => converter(&text)
                    .map_err(|err| rejected(Vec::new(), Some(format!("{err:#}")))),
                None => Ok(generic_conversion(&text)),
            },
            // 주입 파라미터는 사용자 입력으로 채울 수 없다.
            ParamType::Injected { .. } => Err(failed(Vec::new())),
        }
    }
}

/// `y`/`n`/`yes`/`no`/`true`/`false` (대소문자 무시).
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" => Some(true),
        "n" | "no" | "false" => Some(false),
        _ => None,
    }
}

/// 등록되지 않은 커스텀 태그용 범용 변환: 정수 → 실수 → 불리언 → 문자열.
fn generic_conversion(text: &str) -> ArgValue {
    let trimmed = text.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return ArgValue::Int(n);
    }
    if let Ok(n) = trimmed.parse::<f64>() {
        return ArgValue::Float(n);
    }
    if let Some(b) = parse_bool(trimmed) {
        return ArgValue::Bool(b);
    }
    ArgValue::Str(text.to_string())
}
